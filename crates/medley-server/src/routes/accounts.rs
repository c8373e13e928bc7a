//! Register/login/logout and the signed-in user's playlist.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use medley_core::Song;
use serde::Deserialize;

use crate::auth::{self, AuthUser, SessionGrant};
use crate::db::{playlists, Playlist};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const PLAYLIST_NAME_MAX: usize = 100;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddSongRequest {
    pub song: Song,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route(
            "/api/playlist",
            get(get_playlist).put(rename_playlist).delete(clear_playlist),
        )
        .route("/api/playlist/songs", post(add_song))
        .route("/api/playlist/songs/{id}", delete(remove_song))
}

/// 1-100 characters after trimming
pub fn validate_playlist_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > PLAYLIST_NAME_MAX {
        return Err(ApiError::BadRequest(format!(
            "Playlist name must be 1-{} characters",
            PLAYLIST_NAME_MAX
        )));
    }
    Ok(name.to_string())
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SessionGrant>)> {
    let Json(body) = payload?;
    let grant = auth::register(state.db()?, body.username, body.password, state.config.session_ttl).await?;
    Ok((StatusCode::CREATED, Json(grant)))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<SessionGrant>> {
    let Json(body) = payload?;
    let grant = auth::login(state.db()?, body.username, body.password, state.config.session_ttl).await?;
    Ok(Json(grant))
}

async fn logout(State(state): State<AppState>, user: AuthUser) -> ApiResult<StatusCode> {
    auth::logout(state.db()?, user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_playlist(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Playlist>> {
    let user_id = user.user.id;
    let playlist = state
        .db()?
        .run(move |conn| playlists::get_playlist(conn, user_id, Utc::now().timestamp()))
        .await?;
    Ok(Json(playlist))
}

async fn rename_playlist(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> ApiResult<Json<Playlist>> {
    let Json(body) = payload?;
    let name = validate_playlist_name(&body.name)?;
    let user_id = user.user.id;

    let playlist = state
        .db()?
        .run(move |conn| {
            let now = Utc::now().timestamp();
            playlists::rename_playlist(conn, user_id, &name, now)?;
            playlists::get_playlist(conn, user_id, now)
        })
        .await?;
    Ok(Json(playlist))
}

async fn add_song(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<AddSongRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Playlist>)> {
    let Json(body) = payload?;
    let song = body.song.validate()?;
    let user_id = user.user.id;

    let playlist = state
        .db()?
        .run(move |conn| {
            let now = Utc::now().timestamp();
            playlists::add_song(conn, user_id, &song, now)?;
            playlists::get_playlist(conn, user_id, now)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

async fn remove_song(
    State(state): State<AppState>,
    user: AuthUser,
    Path(song_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = user.user.id;
    state
        .db()?
        .run(move |conn| playlists::remove_song(conn, user_id, &song_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_playlist(State(state): State<AppState>, user: AuthUser) -> ApiResult<StatusCode> {
    let user_id = user.user.id;
    state
        .db()?
        .run(move |conn| playlists::clear_playlist(conn, user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
