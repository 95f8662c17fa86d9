//! # Hash Module
//!
//! SHA-256 digests for published artifacts and signature snapshots.
//!
//! ```
//! use versionstamp::hash::calculate_hash;
//!
//! let hash = calculate_hash(b"<versions/>");
//! assert_eq!(hash.len(), 64);
//! ```

use crate::error::Result;
use crate::utils::safe_open_file;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Hex-encoded SHA-256 of `data`
pub fn calculate_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Hex-encoded SHA-256 of a file, read in chunks
pub fn calculate_file_hash(path: impl AsRef<Path>) -> Result<String> {
    let file = safe_open_file(path.as_ref(), false)?;
    hash_reader::<Sha256, _>(file)
}

fn hash_reader<D: Digest, R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = D::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
