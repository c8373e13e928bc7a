//! The normalized song record shared by every source.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Sentinel artist for records whose artist cannot be resolved
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Sentinel album for local files without an album tag
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Sentinel title for remote records without a name
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Where a song record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SongSource {
    /// A file in the local library directory
    #[serde(rename = "static")]
    Static,
    /// The JioSaavn-style search provider
    #[serde(rename = "jiosaavn")]
    JioSaavn,
    /// The Internet Archive provider
    #[serde(rename = "api")]
    Archive,
}

impl SongSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SongSource::Static => "static",
            SongSource::JioSaavn => "jiosaavn",
            SongSource::Archive => "api",
        }
    }
}

/// Normalized unit of playable metadata
///
/// `title`, `artist` and `url` are never empty for records produced by the
/// scanner or the providers; [`Song::validate`] checks the same for records
/// coming from clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    /// Duration in whole seconds
    #[serde(default)]
    pub duration: Option<u32>,
    pub url: String,
    pub source: SongSource,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Song {
    /// Check the record invariant: non-empty id, title, artist and url
    pub fn validate(self) -> CoreResult<Self> {
        let missing = [
            ("id", &self.id),
            ("title", &self.title),
            ("artist", &self.artist),
            ("url", &self.url),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        match missing {
            Some((field, _)) => Err(CoreError::InvalidSong(format!("{} must not be empty", field))),
            None => Ok(self),
        }
    }
}
