//! Inspectors for the remote catalogs.

use axum::extract::{Path, State};
use axum::Json;
use medley_core::providers::archive::{file_list, pick_audio_file, summarize_files, FileSummary};
use medley_core::SearchQuery;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiResult;
use crate::service::DebugSearchResponse;
use crate::state::AppState;

const RAW_ROWS: usize = 3;
const FILES_SHOWN: usize = 20;

#[derive(Debug, Serialize)]
pub struct RawSearchResponse {
    pub status: &'static str,
    pub query: String,
    pub response_keys: Vec<String>,
    pub raw_response: Value,
    pub url_used: String,
}

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub identifier: String,
    pub total_files: usize,
    pub files_shown: usize,
    pub files: Vec<FileSummary>,
    /// The file a search hit for this item would play
    pub picked: Option<String>,
    pub metadata_url: String,
}

pub async fn debug_search(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> ApiResult<Json<DebugSearchResponse>> {
    let query = SearchQuery::parse(Some(&query))?;
    Ok(Json(state.songs.debug_search(&query).await))
}

pub async fn debug_raw(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> ApiResult<Json<RawSearchResponse>> {
    let query = SearchQuery::parse(Some(&query))?;
    let raw = state.archive.raw_search(query.as_str(), RAW_ROWS).await?;

    let response_keys = raw
        .body
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();

    Ok(Json(RawSearchResponse {
        status: "success",
        query: query.as_str().to_string(),
        response_keys,
        raw_response: raw.body,
        url_used: raw.url,
    }))
}

pub async fn debug_files(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<Json<FilesResponse>> {
    let listing = state.archive.file_listing(&identifier).await?;
    let files = summarize_files(&listing, FILES_SHOWN);

    Ok(Json(FilesResponse {
        total_files: file_list(&listing).len(),
        files_shown: files.len(),
        files,
        picked: pick_audio_file(&listing),
        metadata_url: state.archive.metadata_url(&identifier),
        identifier,
    }))
}
