//! Tag extraction using lofty.
//!
//! Supports parallel extraction of larger batches using rayon.

use lofty::prelude::*;
use lofty::probe::Probe;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::scanner::{ScanError, ScanResult};

/// Batches smaller than this are parsed serially
const PARALLEL_THRESHOLD: usize = 20;

/// Tag values read from one audio file. Blank text tags count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagData {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    /// Whole seconds, rounded
    pub duration: Option<u32>,
}

fn text(value: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.into_owned())
}

/// Read tags and duration from a single audio file
pub fn read_tags(path: &Path) -> ScanResult<TagData> {
    let tagged_file = Probe::open(path)
        .map_err(|e| ScanError::Metadata(format!("Failed to open file: {}", e)))?
        .read()
        .map_err(|e| ScanError::Metadata(format!("Failed to read file: {}", e)))?;

    let duration = tagged_file.properties().duration();
    let mut data = TagData {
        duration: Some(duration.as_secs_f64().round() as u32).filter(|secs| *secs > 0),
        ..Default::default()
    };

    // Get tag (primary or first available)
    if let Some(tag) = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
    {
        data.title = text(tag.title());
        data.artist = text(tag.artist());
        data.album = text(tag.album());
        data.year = known_year(tag.year());
    }

    Ok(data)
}

/// A year of 0 is what some taggers write for "unset"
fn known_year(year: Option<u32>) -> Option<u32> {
    year.filter(|year| *year > 0)
}

/// Read tags for many files, preserving input order. Uses rayon for large
/// batches.
pub fn read_tags_batch(paths: &[PathBuf]) -> Vec<ScanResult<TagData>> {
    if paths.len() < PARALLEL_THRESHOLD {
        paths.iter().map(|path| read_tags(path)).collect()
    } else {
        paths.par_iter().map(|path| read_tags(path)).collect()
    }
}
