use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;

/// Bump when the persisted layout changes incompatibly. Old state is reset
/// rather than migrated; the seen set is history, not data.
const SCHEMA_VERSION: u32 = 1;

/// In-memory set of previously selected identity keys. Owned by one
/// `SeenStore` per invocation and passed by reference to collaborators.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    keys: HashSet<String>,
    reset_count: u64,
    last_recorded: Option<DateTime<Utc>>,
}

impl SeenSet {
    pub fn contains(&self, identity: &str) -> bool {
        self.keys.contains(identity)
    }

    pub fn record(&mut self, identity: &str) {
        self.keys.insert(identity.to_string());
        self.last_recorded = Some(Utc::now());
    }

    /// Partial reset used by pool-exhaustion recycling: only the keys chosen
    /// in the current pass stay remembered, everything else becomes eligible
    /// again.
    pub fn retain_only(&mut self, keep: &[&str]) {
        let keep: HashSet<&str> = keep.iter().copied().collect();
        self.keys.retain(|k| keep.contains(k.as_str()));
        self.reset_count += 1;
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.reset_count += 1;
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn reset_count(&self) -> u64 {
        self.reset_count
    }

    pub fn last_recorded(&self) -> Option<DateTime<Utc>> {
        self.last_recorded
    }
}

/// Result of loading persisted state. `recovered` is set when an unparsable
/// or incompatible file was replaced with an empty set.
pub struct LoadedSeen {
    pub set: SeenSet,
    pub recovered: bool,
}

#[derive(Serialize, Deserialize)]
struct SeenFile {
    schema_version: u32,
    reset_count: u64,
    last_recorded: Option<DateTime<Utc>>,
    keys: Vec<String>,
}

/// Flat-file persistence for the seen set. One file per configured root.
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty set. A present-but-unparsable file is reset
    /// to empty with a warning; losing history is acceptable, aborting the
    /// session is not.
    pub fn load(&self) -> LoadedSeen {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No seen-set file at {}, starting empty", self.path.display());
                return LoadedSeen {
                    set: SeenSet::default(),
                    recovered: false,
                };
            }
            Err(err) => {
                warn!(
                    "Cannot read seen-set file {}: {}. Resetting to empty.",
                    self.path.display(),
                    err
                );
                return LoadedSeen {
                    set: SeenSet::default(),
                    recovered: true,
                };
            }
        };

        match serde_json::from_str::<SeenFile>(&raw) {
            Ok(file) if file.schema_version == SCHEMA_VERSION => LoadedSeen {
                set: SeenSet {
                    keys: file.keys.into_iter().collect(),
                    reset_count: file.reset_count,
                    last_recorded: file.last_recorded,
                },
                recovered: false,
            },
            Ok(file) => {
                warn!(
                    "Seen-set file {} has schema version {}, expected {}. Resetting to empty.",
                    self.path.display(),
                    file.schema_version,
                    SCHEMA_VERSION
                );
                LoadedSeen {
                    set: SeenSet::default(),
                    recovered: true,
                }
            }
            Err(err) => {
                warn!(
                    "Seen-set file {} is corrupt: {}. Resetting to empty.",
                    self.path.display(),
                    err
                );
                LoadedSeen {
                    set: SeenSet::default(),
                    recovered: true,
                }
            }
        }
    }

    /// Write-then-rename so concurrent readers never observe a half-written
    /// file. Keys are sorted, so repeated saves of an unchanged set produce
    /// byte-identical output.
    pub fn save(&self, set: &SeenSet) -> Result<(), Error> {
        let mut keys: Vec<String> = set.keys.iter().cloned().collect();
        keys.sort();

        let file = SeenFile {
            schema_version: SCHEMA_VERSION,
            reset_count: set.reset_count,
            last_recorded: set.last_recorded,
            keys,
        };

        let storage_err = |source: io::Error| Error::StorageWrite {
            path: self.path.clone(),
            source,
        };

        let body = serde_json::to_string_pretty(&file)
            .map_err(|e| storage_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let tmp_path = self
            .path
            .with_extension(format!("tmp.{}", std::process::id()));
        fs::write(&tmp_path, body).map_err(storage_err)?;
        fs::rename(&tmp_path, &self.path).map_err(|err| {
            let _ = fs::remove_file(&tmp_path);
            storage_err(err)
        })?;

        debug!(
            "Saved {} seen keys to {}",
            set.keys.len(),
            self.path.display()
        );
        Ok(())
    }
}
