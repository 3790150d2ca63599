use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{AppConfig, IdentityMode};
use crate::filter::{EntryFacts, FilterPolicy};
use crate::identity;
use crate::progress::ProgressReporter;

/// One file that passed the filter. Lives for the duration of a single scan.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub identity: String,
}

/// Counters for entries the walk recovered from instead of aborting on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanWarnings {
    /// Permission-denied subtrees that were skipped.
    pub denied: usize,
    /// Other skipped entries: walk errors, link cycles, unreadable metadata,
    /// symlink targets escaping the root.
    pub skipped: usize,
}

impl ScanWarnings {
    pub fn total(&self) -> usize {
        self.denied + self.skipped
    }
}

/// Lazy directory walker. Each `stream` call walks the tree from scratch;
/// no state is carried between calls.
pub struct Scanner<'a> {
    root: &'a Path,
    policy: &'a FilterPolicy,
    config: &'a AppConfig,
}

impl<'a> Scanner<'a> {
    pub fn new(root: &'a Path, policy: &'a FilterPolicy, config: &'a AppConfig) -> Self {
        Self {
            root,
            policy,
            config,
        }
    }

    pub fn stream<'r>(&'r self, reporter: &'r dyn ProgressReporter) -> CandidateStream<'r> {
        let walker = WalkDir::new(self.root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(self.config.max_depth.unwrap_or(usize::MAX))
            .into_iter();

        // Resolved root for the symlink-escape check. Only needed when links
        // are followed; a root that cannot be canonicalized disables the
        // check rather than failing the scan.
        let canonical_root = if self.config.follow_symlinks {
            fs::canonicalize(self.root).ok()
        } else {
            None
        };

        CandidateStream {
            walker,
            policy: self.policy,
            identity_mode: self.config.identity,
            follow_symlinks: self.config.follow_symlinks,
            canonical_root,
            reporter,
            warnings: ScanWarnings::default(),
            found: 0,
        }
    }
}

/// Pull-based candidate sequence. Yields incrementally so very large trees
/// never have to be materialized before the first result.
pub struct CandidateStream<'a> {
    walker: walkdir::IntoIter,
    policy: &'a FilterPolicy,
    identity_mode: IdentityMode,
    follow_symlinks: bool,
    canonical_root: Option<PathBuf>,
    reporter: &'a dyn ProgressReporter,
    warnings: ScanWarnings,
    found: usize,
}

impl CandidateStream<'_> {
    pub fn warnings(&self) -> ScanWarnings {
        self.warnings
    }

    pub fn found(&self) -> usize {
        self.found
    }

    fn record_walk_error(&mut self, err: walkdir::Error) {
        let denied = err
            .io_error()
            .map(|io| io.kind() == std::io::ErrorKind::PermissionDenied)
            .unwrap_or(false);
        if denied {
            self.warnings.denied += 1;
            warn!("Access denied, skipping: {}", err);
        } else if err.loop_ancestor().is_some() {
            self.warnings.skipped += 1;
            warn!("Symlink cycle detected, skipping: {}", err);
        } else {
            self.warnings.skipped += 1;
            warn!("Skipping unreadable entry: {}", err);
        }
    }

    /// Reject followed symlinks whose target resolves outside the scan root.
    fn escapes_root(&self, path: &Path) -> bool {
        let Some(root) = self.canonical_root.as_deref() else {
            return false;
        };
        match fs::canonicalize(path) {
            Ok(resolved) => !resolved.starts_with(root),
            Err(_) => true,
        }
    }
}

impl Iterator for CandidateStream<'_> {
    type Item = FileCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    self.record_walk_error(err);
                    continue;
                }
            };

            // Depth 0 is the root itself.
            if entry.depth() == 0 {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();

            if entry.file_type().is_dir() {
                let metadata = entry.metadata().ok();
                let hidden = is_hidden(&file_name, metadata.as_ref());
                if self.policy.prunes_directory(&file_name, hidden) {
                    debug!("Pruning directory {}", entry.path().display());
                    self.walker.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_file() {
                // Unfollowed symlinks, sockets, fifos. Not candidates.
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    self.warnings.skipped += 1;
                    warn!(
                        "Cannot read metadata for {}: {}",
                        entry.path().display(),
                        err
                    );
                    continue;
                }
            };

            let facts = EntryFacts {
                file_name: &file_name,
                size: metadata.len(),
                hidden: is_hidden(&file_name, Some(&metadata)),
                is_symlink: entry.path_is_symlink(),
            };
            if !self.policy.admits(&facts) {
                continue;
            }

            if self.follow_symlinks && entry.path_is_symlink() && self.escapes_root(entry.path()) {
                self.warnings.skipped += 1;
                warn!(
                    "Symlink target outside scan root, skipping: {}",
                    entry.path().display()
                );
                continue;
            }

            let identity = match identity::identity_key(entry.path(), self.identity_mode) {
                Ok(key) => key,
                Err(err) => {
                    self.warnings.skipped += 1;
                    warn!(
                        "Cannot derive identity for {}: {}",
                        entry.path().display(),
                        err
                    );
                    continue;
                }
            };

            self.found += 1;
            self.reporter
                .on_scan_progress(self.found, &entry.path().to_string_lossy());

            return Some(FileCandidate {
                path: entry.path().to_path_buf(),
                size: metadata.len(),
                modified: metadata.modified().ok(),
                identity,
            });
        }
    }
}

fn is_hidden(file_name: &str, metadata: Option<&fs::Metadata>) -> bool {
    if file_name.starts_with('.') {
        return true;
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
        if let Some(md) = metadata {
            return md.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0;
        }
    }
    #[cfg(not(windows))]
    let _ = metadata;
    false
}
