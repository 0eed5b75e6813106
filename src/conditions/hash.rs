// src/conditions/hash.rs

//! Content hashing for change detection.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::trace;

use crate::fs::FileSystem;

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut reader = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("reading file for hashing: {:?}", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let hash = hasher.finalize().to_hex().to_string();
    trace!(?path, hash = %hash, "hashed file");
    Ok(hash)
}

/// Hash of the file at `path`, or `None` when there is no regular file there.
pub fn hash_if_file(fs: &dyn FileSystem, path: &Path) -> Result<Option<String>> {
    if !fs.is_file(path) {
        return Ok(None);
    }
    compute_file_hash(fs, path).map(Some)
}
