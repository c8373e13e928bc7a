//! Medley server: serves a local song library next to results from remote
//! catalogs through one JSON API, with optional accounts that each own a
//! playlist.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;
pub mod scanner;
pub mod service;
pub mod state;

use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::ServerConfig;
pub use error::StartupError;
pub use routes::build_router;
pub use state::AppState;

/// Build the application from `config` and serve it until Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<(), StartupError> {
    info!(
        bind = %config.bind,
        library = %config.library_dir.display(),
        songs_route = %config.songs_route,
        search_provider = ?config.search_provider,
        featured_provider = ?config.featured_provider,
        accounts = config.accounts_enabled,
        "starting medley"
    );

    let bind = config.bind;
    let router = build_router(AppState::from_config(config)?);

    let listener = TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            warn!(error = %e, "could not listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
