//! Directory listing and Song Record assembly for the local library.

use medley_core::filename::hints_from_filename;
use medley_core::{Song, SongSource, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{IdScheme, ServerConfig};
use crate::scanner::fingerprint::{content_id, positional_id};
use crate::scanner::metadata::{read_tags_batch, TagData};
use crate::scanner::{is_audio_file, ScanError, ScanResult};

/// Scanner bound to one library directory
#[derive(Debug, Clone)]
pub struct LibraryScanner {
    root: PathBuf,
    songs_route: String,
    extensions: Vec<String>,
    id_scheme: IdScheme,
}

impl LibraryScanner {
    pub fn new(
        root: impl Into<PathBuf>,
        songs_route: impl Into<String>,
        extensions: Vec<String>,
        id_scheme: IdScheme,
    ) -> Self {
        Self {
            root: root.into(),
            songs_route: songs_route.into(),
            extensions,
            id_scheme,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.library_dir.clone(),
            config.songs_route.clone(),
            config.extensions.clone(),
            config.id_scheme,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the library directory.
    ///
    /// A missing directory is created and yields an empty library. Files
    /// whose tags cannot be read are still returned, with fallbacks taken
    /// from the file name.
    pub fn scan(&self) -> ScanResult<Vec<Song>> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
            debug!(dir = %self.root.display(), "created library directory");
            return Ok(Vec::new());
        }
        if !self.root.is_dir() {
            return Err(ScanError::PathNotFound(self.root.display().to_string()));
        }

        let files = self.list_audio_files();
        let tags = read_tags_batch(&files);

        let songs = files
            .iter()
            .zip(tags)
            .enumerate()
            .map(|(index, (path, tags))| {
                let file_name = display_name(path);
                let tags = match tags {
                    Ok(tags) => Some(tags),
                    Err(e) => {
                        warn!(file = %file_name, error = %e, "could not read tags, using filename fallbacks");
                        None
                    }
                };
                let id = match self.id_scheme {
                    IdScheme::Positional => positional_id(index + 1),
                    IdScheme::Content => content_id(&file_name),
                };
                let url = self.song_url(&file_name);
                build_song(id, &file_name, url, tags)
            })
            .collect::<Vec<_>>();

        debug!(dir = %self.root.display(), count = songs.len(), "scanned library");
        Ok(songs)
    }

    /// Allowed audio files directly under the root, ordered by file name
    fn list_audio_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable library entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_audio_file(path, &self.extensions))
            .collect()
    }

    fn song_url(&self, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.songs_route.trim_end_matches('/'),
            urlencoding::encode(file_name)
        )
    }
}

/// File name as text. Names that are not valid UTF-8 are kept with the
/// invalid bytes replaced.
fn display_name(path: &Path) -> String {
    let raw = path.file_name().unwrap_or(path.as_os_str());
    if raw.to_str().is_none() {
        warn!(file = %raw.to_string_lossy(), "file name is not valid UTF-8");
    }
    raw.to_string_lossy().into_owned()
}

/// Assemble a local Song Record from tags (when readable) and the file name
pub fn build_song(id: String, file_name: &str, url: String, tags: Option<TagData>) -> Song {
    let tags = tags.unwrap_or_default();
    let hints = hints_from_filename(file_name);

    let title = tags
        .title
        .or_else(|| hints.title().map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let artist = tags
        .artist
        .or_else(|| hints.artist().map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    Song {
        id,
        title,
        artist,
        album: Some(tags.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string())),
        year: tags.year,
        duration: tags.duration,
        url,
        source: SongSource::Static,
        thumbnail: None,
    }
}
