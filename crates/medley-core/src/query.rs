//! Search query parsing and local matching.

use crate::{CoreError, CoreResult, Song};

/// A non-blank search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    needle: String,
}

impl SearchQuery {
    /// Parse a raw `q` parameter; blank or missing is an error
    pub fn parse(raw: Option<&str>) -> CoreResult<Self> {
        let text = raw.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(CoreError::InvalidQuery);
        }

        Ok(Self {
            text: text.to_string(),
            needle: text.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Case-insensitive substring match against title or artist
    pub fn matches(&self, song: &Song) -> bool {
        song.title.to_lowercase().contains(&self.needle)
            || song.artist.to_lowercase().contains(&self.needle)
    }

    /// Keep the songs that match, preserving their order
    pub fn filter(&self, songs: Vec<Song>) -> Vec<Song> {
        songs.into_iter().filter(|song| self.matches(song)).collect()
    }
}
