use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;

use twox_hash::XxHash64;

use crate::config::IdentityMode;

const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Derive the stable identity key used for seen-set membership.
pub fn identity_key(path: &Path, mode: IdentityMode) -> io::Result<String> {
    match mode {
        IdentityMode::Path => Ok(path_key(path)),
        IdentityMode::Content => content_key(path),
    }
}

/// Path normalized for separator and (on Windows) case conventions, so the
/// same file yields the same key however the root was spelled.
pub fn path_key(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    if cfg!(windows) {
        normalized.to_lowercase()
    } else {
        normalized
    }
}

fn content_key(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = XxHash64::with_seed(0);
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.write(&buffer[..read]);
    }
    Ok(format!("xx64:{:016x}", hasher.finish()))
}
