//! Content-derived ids for local songs.
//!
//! Positional ids (`static-1`, `static-2`, ...) shift whenever a file is
//! added or removed. The content scheme hashes the file name instead, so a
//! song keeps its id as long as it keeps its name.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest
const ID_HEX_LEN: usize = 12;

/// `static-<12 hex>` from a SHA-256 of the file name
pub fn content_id(file_name: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(file_name.as_bytes()));
    format!("static-{}", &digest[..ID_HEX_LEN])
}

/// `static-<n>` for the n-th (1-based) file in listing order
pub fn positional_id(position: usize) -> String {
    format!("static-{}", position)
}
