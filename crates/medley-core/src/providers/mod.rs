//! Field rule sets for the remote catalogs.
//!
//! Each provider module turns raw response JSON into [`crate::Song`] records.
//! Records without a title or a playable URL are dropped here, so every song
//! that leaves a provider satisfies the record invariant.

pub mod archive;
pub mod jiosaavn;

use crate::Song;

/// Songs normalized from one provider response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPage {
    pub songs: Vec<Song>,
    /// Raw provider results looked at, including dropped ones
    pub examined: usize,
}
