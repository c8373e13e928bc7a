//! HTTP surface.

pub mod accounts;
pub mod debug;
pub mod media;
pub mod songs;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the application router
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(songs::health))
        .route("/api/songs", get(songs::list_songs))
        .route("/api/search", get(songs::search_songs))
        .route("/api/random", get(songs::random_song))
        .route("/api/debug/search/{query}", get(debug::debug_search))
        .route("/api/debug/raw/{query}", get(debug::debug_raw))
        .route("/api/debug/files/{identifier}", get(debug::debug_files))
        .route("/api/proxy", get(media::proxy_audio));

    if state.db.is_some() {
        router = router.merge(accounts::router());
    }

    let files = ServeDir::new(&state.config.library_dir);
    let router = match state.config.songs_route.as_str() {
        "/" => router.fallback_service(files),
        route => router.nest_service(route, files),
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
