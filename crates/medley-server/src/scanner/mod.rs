//! Local library scanner.
//!
//! Lists the library directory, reads tags from every allowed audio file and
//! turns each one into a [`medley_core::Song`]. Tag failures never drop a
//! file: it is kept with filename-derived fallbacks and the failure is
//! logged.

pub mod fingerprint;
pub mod library;
pub mod metadata;

use std::path::Path;
use thiserror::Error;

pub use library::LibraryScanner;

/// Scanner error types
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata extraction error: {0}")]
    Metadata(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Check if a path has an extension from `extensions` (lowercase, no dot)
pub fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            extensions.iter().any(|allowed| *allowed == ext_lower)
        })
        .unwrap_or(false)
}
