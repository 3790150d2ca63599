use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::Error;
use crate::filter::FilterPolicy;
use crate::progress::ProgressReporter;
use crate::scanner::{ScanWarnings, Scanner};
use crate::seen::SeenStore;
use crate::selector::{self, DedupMode, Pick};

/// One invocation's worth of input.
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub root: PathBuf,
    pub count: usize,
    pub dedup: DedupMode,
    /// Fixed seed for reproducible selection; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub config: AppConfig,
}

#[derive(Debug)]
pub struct SessionOutcome {
    /// Chosen candidates in selection order.
    pub picks: Vec<Pick>,
    pub total_candidates: usize,
    /// Fewer picks than requested, even after recycling.
    pub shortfall: bool,
    /// Pool-exhaustion recycling fired during this run.
    pub recycled: bool,
    pub scan_duration: Duration,
    pub scan_warnings: ScanWarnings,
    /// The persisted seen set was corrupt and has been reset.
    pub seen_recovered: bool,
    /// Selection succeeded but the updated seen set could not be persisted.
    pub save_error: Option<String>,
}

/// Ties one invocation together: load seen set, scan, select, record the
/// selections, save. The seen set is written at most once per run, after
/// selection completes, so an aborted scan never corrupts it.
pub struct SessionEngine {
    store: SeenStore,
}

impl SessionEngine {
    pub fn new(store: SeenStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SeenStore {
        &self.store
    }

    pub fn run(
        &self,
        request: &SelectionRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<SessionOutcome, Error> {
        validate_root(&request.root)?;

        let loaded = self.store.load();
        let mut seen = loaded.set;
        debug!(
            "Loaded seen set from {}: {} keys, {} resets",
            self.store.path().display(),
            seen.len(),
            seen.reset_count()
        );

        let policy = FilterPolicy::new(&request.config);
        let scanner = Scanner::new(&request.root, &policy, &request.config);
        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        info!("Scanning {}...", request.root.display());
        reporter.on_scan_start();
        let scan_start = Instant::now();
        let mut stream = scanner.stream(reporter);
        let selection = selector::select(
            &mut stream,
            &seen,
            request.count,
            request.dedup,
            &mut rng,
        );
        let scan_duration = scan_start.elapsed();
        let scan_warnings = stream.warnings();
        reporter.on_scan_complete(selection.total_candidates, scan_duration.as_secs_f64());

        debug!(
            "Scan completed in {:.2}s: {} candidates, {} skipped, {} denied",
            scan_duration.as_secs_f64(),
            selection.total_candidates,
            scan_warnings.skipped,
            scan_warnings.denied,
        );

        if selection.total_candidates == 0 {
            return Err(Error::EmptyTree(request.root.clone()));
        }

        reporter.on_selection_complete(selection.picks.len(), selection.recycled);

        let mut save_error = None;
        if request.dedup == DedupMode::Enabled {
            if selection.recycled {
                let keep: Vec<&str> = selection
                    .picks
                    .iter()
                    .map(|p| p.candidate.identity.as_str())
                    .collect();
                seen.retain_only(&keep);
                info!(
                    "Every candidate has been opened before; recycling the pool (reset #{})",
                    seen.reset_count()
                );
            }
            for pick in &selection.picks {
                seen.record(&pick.candidate.identity);
            }
            // Batched, all-or-nothing write. A failure here must not cost the
            // user their selection.
            if let Err(err) = self.store.save(&seen) {
                warn!("{}", err);
                save_error = Some(err.to_string());
            }
        }

        Ok(SessionOutcome {
            picks: selection.picks,
            total_candidates: selection.total_candidates,
            shortfall: selection.shortfall,
            recycled: selection.recycled,
            scan_duration,
            scan_warnings,
            seen_recovered: loaded.recovered,
            save_error,
        })
    }
}

fn validate_root(path: &Path) -> Result<(), Error> {
    match fs::metadata(path) {
        Ok(md) if md.is_dir() => Ok(()),
        Ok(_) => Err(Error::InvalidRoot {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        }),
        Err(err) => Err(Error::InvalidRoot {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}
