//! Title and artist heuristics for local files without usable tags.

use std::path::Path;

use crate::text::title_case;

/// Separator between artist and title in "Artist - Title.mp3" names
const ARTIST_TITLE_SEPARATOR: &str = " - ";

/// Metadata guessed from a file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameHints {
    /// Title-cased stem with `_`/`-` turned into spaces
    pub pretty_title: String,
    /// `(artist, title)` when the stem looks like "Artist - Title"
    pub artist_title: Option<(String, String)>,
}

impl FilenameHints {
    /// Title to use when the tag has none
    pub fn title(&self) -> Option<&str> {
        self.artist_title
            .as_ref()
            .map(|(_, title)| title.as_str())
            .or_else(|| Some(self.pretty_title.as_str()).filter(|t| !t.is_empty()))
    }

    /// Artist to use when the tag has none
    pub fn artist(&self) -> Option<&str> {
        self.artist_title.as_ref().map(|(artist, _)| artist.as_str())
    }
}

/// File name without its final extension
pub fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Derive a display title from a stem: `_` and `-` become spaces, words are
/// title-cased
pub fn pretty_title(stem: &str) -> String {
    title_case(&stem.replace(['_', '-'], " "))
}

/// Split "Artist - Title" on the first separator. Both halves must be
/// non-empty after cleanup.
pub fn split_artist_title(stem: &str) -> Option<(String, String)> {
    let (left, right) = stem.split_once(ARTIST_TITLE_SEPARATOR)?;
    let artist = clean_part(left);
    let title = clean_part(right);

    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some((artist, title))
}

fn clean_part(part: &str) -> String {
    part.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build all filename hints for a file name (extension included)
pub fn hints_from_filename(file_name: &str) -> FilenameHints {
    let stem = file_stem(file_name);
    FilenameHints {
        pretty_title: pretty_title(stem),
        artist_title: split_artist_title(stem),
    }
}
