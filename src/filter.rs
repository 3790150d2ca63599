use glob::Pattern;
use tracing::warn;

use crate::config::{AppConfig, CONFIG_FILE_NAME};

/// Everything the policy is allowed to look at for one directory entry.
///
/// The scanner fills this in from real metadata; tests construct it directly
/// so the policy stays a pure function with no filesystem access.
#[derive(Debug, Clone)]
pub struct EntryFacts<'a> {
    pub file_name: &'a str,
    pub size: u64,
    /// Dot-prefixed name, or the platform hidden attribute.
    pub hidden: bool,
    pub is_symlink: bool,
}

/// Compiled include/exclude predicate. Built once per session.
pub struct FilterPolicy {
    exclude_patterns: Vec<Pattern>,
    deny_extensions: Vec<String>,
    allow_extensions: Vec<String>,
    include_hidden: bool,
    include_zero_byte: bool,
    min_file_size: u64,
    max_file_size: Option<u64>,
    follow_symlinks: bool,
    own_files: Vec<String>,
}

impl FilterPolicy {
    pub fn new(config: &AppConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Invalid exclude pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            exclude_patterns,
            deny_extensions: lowercase_all(&config.deny_extensions),
            allow_extensions: lowercase_all(&config.allow_extensions),
            include_hidden: config.include_hidden,
            include_zero_byte: config.include_zero_byte,
            min_file_size: config.min_file_size,
            max_file_size: config.max_file_size,
            follow_symlinks: config.follow_symlinks,
            // The tool's own state files are never candidates, whatever the
            // hidden-file policy says.
            own_files: vec![CONFIG_FILE_NAME.to_string(), config.seen_file.clone()],
        }
    }

    /// Whether a file may become a selection candidate.
    pub fn admits(&self, facts: &EntryFacts) -> bool {
        if facts.file_name.is_empty() {
            return false;
        }
        if self.own_files.iter().any(|f| f == facts.file_name) {
            return false;
        }
        if facts.hidden && !self.include_hidden {
            return false;
        }
        if facts.is_symlink && !self.follow_symlinks {
            return false;
        }
        if self.matches_exclude(facts.file_name) {
            return false;
        }

        let ext = extension_of(facts.file_name);
        if let Some(ext) = ext.as_deref() {
            if self.deny_extensions.iter().any(|d| d == ext) {
                return false;
            }
        }
        if !self.allow_extensions.is_empty() {
            match ext.as_deref() {
                Some(ext) if self.allow_extensions.iter().any(|a| a == ext) => {}
                _ => return false,
            }
        }

        if facts.size == 0 && !self.include_zero_byte {
            return false;
        }
        if facts.size < self.min_file_size {
            return false;
        }
        if let Some(max) = self.max_file_size {
            if facts.size > max {
                return false;
            }
        }

        true
    }

    /// Whether a directory should be pruned before descending into it.
    pub fn prunes_directory(&self, dir_name: &str, hidden: bool) -> bool {
        if hidden && !self.include_hidden {
            return true;
        }
        self.matches_exclude(dir_name)
    }

    fn matches_exclude(&self, name: &str) -> bool {
        self.exclude_patterns.iter().any(|p| p.matches(name))
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}
