//! medley-core: Core library for the medley song aggregator
//!
//! This crate contains the pure data-transformation logic shared by the
//! server: the song record model, paging arithmetic, query matching and
//! the field extraction rules used to normalize remote provider JSON.
//! Nothing in here performs I/O.
//!
//! # Architecture
//!
//! The crate is organized as follows:
//! - `song`: the normalized `Song` record and its source tag
//! - `paging`: page request clamping and slicing
//! - `query`: search query parsing and matching
//! - `filename`: title/artist heuristics for untagged local files
//! - `text`: small string helpers (title case, HTTPS rewriting, durations)
//! - `chain`: ordered extraction rules over loosely-typed JSON
//! - `providers`: rule sets for each remote catalog
//!
//! # Usage
//!
//! ```ignore
//! use medley_core::providers::jiosaavn;
//!
//! let page = jiosaavn::normalize_page(&body, 0);
//! println!("found {} returned {}", page.examined, page.songs.len());
//! ```

pub mod chain;
pub mod filename;
pub mod paging;
pub mod providers;
pub mod query;
pub mod song;
pub mod text;

use thiserror::Error;

// Re-export commonly used types at crate root for convenience
pub use chain::{FieldChain, Rule};
pub use paging::{Page, PageRequest};
pub use query::SearchQuery;
pub use song::{Song, SongSource, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TITLE};

/// Core error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Query parameter required")]
    InvalidQuery,

    #[error("Invalid song: {0}")]
    InvalidSong(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
