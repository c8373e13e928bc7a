//! Song listing, search and random pick.

use axum::extract::{Query, State};
use axum::Json;
use medley_core::{PageRequest, SearchQuery, Song};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::service::{SearchResponse, SongListResponse};
use crate::state::AppState;

/// Raw query values; unparsable numbers fall back to defaults
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub shuffle: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

fn flag(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|v| v.trim().to_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "medley" }))
}

pub async fn list_songs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<SongListResponse> {
    let config = &state.config;
    let request = PageRequest::from_params(
        params.page.as_deref(),
        params.per_page.as_deref(),
        config.list_per_page,
        config.max_per_page,
    );
    let shuffle = flag(params.shuffle.as_deref(), config.shuffle_by_default);

    Json(state.songs.list(request, shuffle).await)
}

pub async fn search_songs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let query = SearchQuery::parse(params.q.as_deref())?;
    let config = &state.config;
    let request = PageRequest::from_params(
        params.page.as_deref(),
        params.per_page.as_deref(),
        config.search_per_page,
        config.max_per_page,
    );

    Ok(Json(state.songs.search(&query, request).await))
}

pub async fn random_song(State(state): State<AppState>) -> ApiResult<Json<Song>> {
    state
        .songs
        .random()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No songs available".to_string()))
}
