//! JioSaavn-style search responses.
//!
//! The provider (and the community wrappers around it) return songs in a few
//! slightly different shapes: camelCase or snake_case keys, artists as a
//! structured list or a flat string, images and download links as quality
//! ladders. The chains below cover the shapes seen in practice.

use serde_json::Value;

use crate::chain::{id_text, joined_names, non_empty_str, path, str_at, u32_value, FieldChain};
use crate::providers::NormalizedPage;
use crate::text::{
    decode_html_entities, force_https, is_placeholder_artist, leading_year, parse_duration,
    upgrade_thumbnail,
};
use crate::{Song, SongSource, UNKNOWN_ARTIST, UNKNOWN_TITLE};

/// Download qualities in order of preference
pub const QUALITY_LADDER: &[&str] = &["320kbps", "160kbps", "96kbps", "48kbps", "12kbps"];

pub static TITLE: FieldChain<String> = FieldChain::new("title", &[title_name, title_title, title_unknown]);

pub static ARTIST: FieldChain<String> = FieldChain::new(
    "artist",
    &[
        artist_primary_list,
        artist_primary_camel,
        artist_primary_snake,
        artist_singers,
        artist_plain,
        artist_more_info_map,
        artist_more_info_primary,
        artist_more_info_singers,
    ],
);

pub static ALBUM: FieldChain<String> = FieldChain::new(
    "album",
    &[album_object, album_plain, album_more_info, album_name],
);

pub static THUMBNAIL: FieldChain<String> = FieldChain::new(
    "thumbnail",
    &[image_ladder, image_plain, thumbnail_plain, image_more_info],
);

pub static YEAR: FieldChain<u32> = FieldChain::new(
    "year",
    &[year_plain, year_release_camel, year_release_snake],
);

pub static DURATION: FieldChain<u32> = FieldChain::new(
    "duration",
    &[duration_plain, duration_more_info],
);

pub static MEDIA_URL: FieldChain<String> = FieldChain::new(
    "url",
    &[
        download_camel,
        download_snake,
        media_url,
        stream_url,
        perma_url,
        plain_url,
    ],
);

fn title_name(raw: &Value) -> Option<String> {
    str_at(raw, &["name"]).map(|s| decode_html_entities(&s))
}

fn title_title(raw: &Value) -> Option<String> {
    str_at(raw, &["title"]).map(|s| decode_html_entities(&s))
}

fn title_unknown(_: &Value) -> Option<String> {
    Some(UNKNOWN_TITLE.to_string())
}

fn artist_primary_list(raw: &Value) -> Option<String> {
    path(raw, &["artists", "primary"])
        .and_then(joined_names)
        .and_then(real_artist)
}

fn artist_primary_camel(raw: &Value) -> Option<String> {
    str_at(raw, &["primaryArtists"]).and_then(real_artist)
}

fn artist_primary_snake(raw: &Value) -> Option<String> {
    str_at(raw, &["primary_artists"]).and_then(real_artist)
}

fn artist_singers(raw: &Value) -> Option<String> {
    str_at(raw, &["singers"]).and_then(real_artist)
}

fn artist_plain(raw: &Value) -> Option<String> {
    str_at(raw, &["artist"]).and_then(real_artist)
}

fn artist_more_info_map(raw: &Value) -> Option<String> {
    path(raw, &["more_info", "artistMap", "primary_artists"])
        .and_then(joined_names)
        .and_then(real_artist)
}

fn artist_more_info_primary(raw: &Value) -> Option<String> {
    str_at(raw, &["more_info", "primary_artists"]).and_then(real_artist)
}

fn artist_more_info_singers(raw: &Value) -> Option<String> {
    str_at(raw, &["more_info", "singers"]).and_then(real_artist)
}

fn album_object(raw: &Value) -> Option<String> {
    str_at(raw, &["album", "name"])
}

fn album_plain(raw: &Value) -> Option<String> {
    str_at(raw, &["album"])
}

fn album_more_info(raw: &Value) -> Option<String> {
    str_at(raw, &["more_info", "album"])
}

fn album_name(raw: &Value) -> Option<String> {
    str_at(raw, &["albumName"])
}

/// Highest quality image: the last ladder entry with a URL
fn image_ladder(raw: &Value) -> Option<String> {
    raw.get("image")?.as_array()?.iter().rev().find_map(entry_url)
}

fn image_plain(raw: &Value) -> Option<String> {
    str_at(raw, &["image"])
}

fn thumbnail_plain(raw: &Value) -> Option<String> {
    str_at(raw, &["thumbnail"])
}

fn image_more_info(raw: &Value) -> Option<String> {
    str_at(raw, &["more_info", "image"])
}

fn year_plain(raw: &Value) -> Option<u32> {
    raw.get("year").and_then(year_value)
}

fn year_release_camel(raw: &Value) -> Option<u32> {
    str_at(raw, &["releaseDate"]).and_then(|d| leading_year(&d))
}

fn year_release_snake(raw: &Value) -> Option<u32> {
    str_at(raw, &["release_date"]).and_then(|d| leading_year(&d))
}

fn duration_plain(raw: &Value) -> Option<u32> {
    raw.get("duration").and_then(duration_value)
}

fn duration_more_info(raw: &Value) -> Option<u32> {
    path(raw, &["more_info", "duration"]).and_then(duration_value)
}

fn download_camel(raw: &Value) -> Option<String> {
    raw.get("downloadUrl").and_then(best_download)
}

fn download_snake(raw: &Value) -> Option<String> {
    raw.get("download_url").and_then(best_download)
}

fn media_url(raw: &Value) -> Option<String> {
    str_at(raw, &["media_url"])
}

fn stream_url(raw: &Value) -> Option<String> {
    str_at(raw, &["streamUrl"])
}

fn perma_url(raw: &Value) -> Option<String> {
    str_at(raw, &["perma_url"])
}

fn plain_url(raw: &Value) -> Option<String> {
    str_at(raw, &["url"])
}

fn real_artist(name: String) -> Option<String> {
    let name = decode_html_entities(&name);
    if is_placeholder_artist(&name) {
        None
    } else {
        Some(name)
    }
}

/// URL of a ladder entry: `{ "quality": .., "url"|"link": .. }` or a bare string
fn entry_url(entry: &Value) -> Option<String> {
    non_empty_str(entry)
        .or_else(|| entry.get("url").and_then(non_empty_str))
        .or_else(|| entry.get("link").and_then(non_empty_str))
}

/// Walk the quality ladder; without any labelled match take the first entry
/// that has a URL at all
fn best_download(value: &Value) -> Option<String> {
    let entries = value.as_array()?;

    QUALITY_LADDER
        .iter()
        .find_map(|quality| {
            entries
                .iter()
                .filter(|entry| {
                    entry
                        .get("quality")
                        .and_then(Value::as_str)
                        .is_some_and(|q| q.trim().eq_ignore_ascii_case(quality))
                })
                .find_map(entry_url)
        })
        .or_else(|| entries.iter().find_map(entry_url))
}

fn year_value(value: &Value) -> Option<u32> {
    u32_value(value)
        .or_else(|| value.as_str().and_then(leading_year))
        .filter(|year| *year > 0)
}

fn duration_value(value: &Value) -> Option<u32> {
    match value {
        Value::String(s) => parse_duration(s),
        other => u32_value(other),
    }
}

/// Locate the raw result list in a response body
pub fn raw_results(body: &Value) -> &[Value] {
    path(body, &["data", "results"])
        .and_then(Value::as_array)
        .or_else(|| body.get("results").and_then(Value::as_array))
        .or_else(|| body.get("data").and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Normalize one raw result. `position` is the 1-based absolute position of
/// the result, used for the placeholder id when the provider sends none.
pub fn normalize(raw: &Value, position: usize) -> Option<Song> {
    if !raw.is_object() {
        return None;
    }

    let title = TITLE.resolve(raw)?;
    let url = MEDIA_URL.resolve(raw).map(|u| force_https(&u))?;

    let id = raw
        .get("id")
        .and_then(id_text)
        .unwrap_or_else(|| format!("{}-{}", SongSource::JioSaavn.as_str(), position));

    Some(Song {
        id,
        title,
        artist: ARTIST
            .resolve(raw)
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        album: ALBUM.resolve(raw).map(|a| decode_html_entities(&a)),
        year: YEAR.resolve(raw),
        duration: DURATION.resolve(raw),
        url,
        source: SongSource::JioSaavn,
        thumbnail: THUMBNAIL
            .resolve(raw)
            .map(|t| force_https(&upgrade_thumbnail(&t))),
    })
}

/// Normalize a whole response; `offset` is the number of results on
/// earlier pages
pub fn normalize_page(body: &Value, offset: usize) -> NormalizedPage {
    let raw = raw_results(body);
    let songs = raw
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| normalize(item, offset + idx + 1))
        .collect();

    NormalizedPage {
        songs,
        examined: raw.len(),
    }
}
