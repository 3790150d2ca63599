use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid root directory {}: {reason}", .path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("no files passed the filter under {}", .0.display())]
    EmptyTree(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("failed to persist seen set to {}: {source}", .path.display())]
    StorageWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    Unsupported(String),
}
