//! Internet Archive advanced-search and item-files responses.

use serde::Serialize;
use serde_json::Value;

use crate::chain::{id_text, non_empty_str, path, str_at, FieldChain};
use crate::text::{force_https, is_placeholder_artist, leading_year};
use crate::{Song, SongSource, UNKNOWN_ARTIST, UNKNOWN_TITLE};

/// File formats tried in order when picking an item's audio file
pub const AUDIO_FORMATS: &[&str] = &[
    "VBR MP3",
    "MP3",
    "Ogg Vorbis",
    "MPEG Audio",
    "WAVE",
    "FLAC",
    "M4A",
    "AAC",
];

/// File extensions tried when no format label matches
pub const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".ogg", ".wav", ".flac", ".m4a", ".aac"];

const AUDIO_KEYWORDS: &[&str] = &["audio", "song", "music", "track"];

const NON_AUDIO_MARKERS: &[&str] = &[".txt", ".pdf", ".jpg", ".png", ".gif", ".xml", ".json"];

pub static TITLE: FieldChain<String> = FieldChain::new("title", &[title_plain, title_first]);

pub static ARTIST: FieldChain<String> = FieldChain::new("artist", &[creator_plain, creator_first]);

pub static ALBUM: FieldChain<String> =
    FieldChain::new("album", &[collection_plain, collection_first]);

pub static YEAR: FieldChain<u32> = FieldChain::new("year", &[date_year, year_plain]);

fn title_plain(doc: &Value) -> Option<String> {
    str_at(doc, &["title"])
}

fn title_first(doc: &Value) -> Option<String> {
    first_string(doc.get("title")?)
}

fn creator_plain(doc: &Value) -> Option<String> {
    str_at(doc, &["creator"]).filter(|c| !is_placeholder_artist(c))
}

fn creator_first(doc: &Value) -> Option<String> {
    first_string(doc.get("creator")?).filter(|c| !is_placeholder_artist(c))
}

fn collection_plain(doc: &Value) -> Option<String> {
    str_at(doc, &["collection"])
}

fn collection_first(doc: &Value) -> Option<String> {
    first_string(doc.get("collection")?)
}

fn date_year(doc: &Value) -> Option<u32> {
    str_at(doc, &["date"]).and_then(|d| leading_year(&d))
}

fn year_plain(doc: &Value) -> Option<u32> {
    str_at(doc, &["year"]).and_then(|d| leading_year(&d))
}

fn first_string(value: &Value) -> Option<String> {
    value.as_array()?.first().and_then(non_empty_str)
}

/// Result docs of an advanced-search response
pub fn docs(body: &Value) -> &[Value] {
    path(body, &["response", "docs"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Item identifier of a search doc
pub fn identifier(doc: &Value) -> Option<String> {
    str_at(doc, &["identifier"])
}

fn file_name(file: &Value) -> Option<&str> {
    file.get("name").and_then(Value::as_str).filter(|n| !n.is_empty())
}

fn file_format(file: &Value) -> &str {
    file.get("format").and_then(Value::as_str).unwrap_or_default()
}

/// Entries of an item-files response, under `files` or `result`
pub fn file_list(files_body: &Value) -> &[Value] {
    files_body
        .get("files")
        .or_else(|| files_body.get("result"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// One entry of an item's file listing, as shown by the files inspector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub format: String,
    pub size: Option<String>,
    pub is_audio: bool,
}

/// Summaries of the first `limit` files of an item
pub fn summarize_files(files_body: &Value, limit: usize) -> Vec<FileSummary> {
    file_list(files_body)
        .iter()
        .take(limit)
        .map(|file| {
            let name = file_name(file).unwrap_or_default();
            let format = file_format(file);
            let lower_name = name.to_lowercase();
            FileSummary {
                name: name.to_string(),
                format: format.to_string(),
                size: file.get("size").and_then(id_text),
                is_audio: AUDIO_FORMATS.iter().any(|f| format.eq_ignore_ascii_case(f))
                    || AUDIO_EXTENSIONS.iter().any(|ext| lower_name.ends_with(ext)),
            }
        })
        .collect()
}

/// Choose the audio file of an item from its `files` listing (`files` or
/// `result` key): by format label first, then by extension, then by
/// audio-ish keywords
pub fn pick_audio_file(files_body: &Value) -> Option<String> {
    let files = file_list(files_body);

    let by_format = AUDIO_FORMATS.iter().find_map(|format| {
        files
            .iter()
            .filter(|file| file_format(file).eq_ignore_ascii_case(format))
            .find_map(file_name)
    });

    let by_extension = || {
        AUDIO_EXTENSIONS.iter().find_map(|ext| {
            files
                .iter()
                .filter_map(file_name)
                .find(|name| name.to_lowercase().ends_with(ext))
        })
    };

    let by_keyword = || {
        files.iter().find_map(|file| {
            let name = file_name(file)?;
            let lower_name = name.to_lowercase();
            let lower_format = file_format(file).to_lowercase();

            let audio_like = AUDIO_KEYWORDS
                .iter()
                .any(|kw| lower_name.contains(kw) || lower_format.contains(kw));
            let other_media = NON_AUDIO_MARKERS.iter().any(|ext| lower_name.contains(ext));

            (audio_like && !other_media).then_some(name)
        })
    };

    by_format
        .or_else(by_extension)
        .or_else(by_keyword)
        .map(str::to_string)
}

/// Download URL for a file inside an item. Path separators inside the file
/// name are kept, every segment is percent-encoded.
pub fn download_url(base_url: &str, identifier: &str, file_name: &str) -> String {
    let encoded: Vec<String> = file_name
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();

    force_https(&format!(
        "{}/download/{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(identifier),
        encoded.join("/")
    ))
}

/// Cover image URL for an item
pub fn thumbnail_url(base_url: &str, identifier: &str) -> String {
    force_https(&format!(
        "{}/services/img/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(identifier)
    ))
}

/// Build a song from a search doc once its audio URL is known
pub fn song_from_doc(doc: &Value, base_url: &str, audio_url: &str) -> Option<Song> {
    let id = identifier(doc)?;
    let url = force_https(audio_url);
    if url.is_empty() {
        return None;
    }

    Some(Song {
        title: TITLE.resolve(doc).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        artist: ARTIST
            .resolve(doc)
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        album: ALBUM.resolve(doc),
        year: YEAR.resolve(doc),
        duration: None,
        url,
        source: SongSource::Archive,
        thumbnail: Some(thumbnail_url(base_url, &id)),
        id,
    })
}
