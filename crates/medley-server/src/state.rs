use std::sync::Arc;
use tracing::info;

use crate::catalog::{build_catalog, http_client, ArchiveCatalog, CatalogError};
use crate::config::ServerConfig;
use crate::db::Database;
use crate::error::{ApiError, ApiResult, StartupError};
use crate::scanner::LibraryScanner;
use crate::service::SongService;

/// Shared, read-only application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub songs: Arc<SongService>,
    /// Present only when accounts are enabled
    pub db: Option<Database>,
    /// Archive client behind the raw-search and item-files inspectors
    pub archive: Arc<ArchiveCatalog>,
    /// Client for the audio proxy: connect timeout only, bodies may stream
    /// for as long as the listener keeps reading
    pub proxy_http: reqwest::Client,
}

impl AppState {
    /// Build clients, catalogs and the store from configuration
    pub fn from_config(config: ServerConfig) -> Result<Self, StartupError> {
        let catalog_http = http_client(config.search_timeout)?;
        let search = build_catalog(config.search_provider, &config, catalog_http.clone())?;
        let featured = build_catalog(config.featured_provider, &config, catalog_http.clone())?;
        let archive = Arc::new(ArchiveCatalog::new(
            catalog_http,
            &config.archive_url,
            config.metadata_timeout,
        )?);

        let songs = SongService::new(
            LibraryScanner::from_config(&config),
            search,
            featured,
            config.featured_limit,
        );

        let db = if config.accounts_enabled {
            info!(path = %config.db_path, "opening account store");
            Some(Database::open(&config.db_path)?)
        } else {
            None
        };

        let proxy_http = proxy_client(&config)?;
        Ok(Self::new(config, songs, db, archive, proxy_http))
    }

    pub fn new(
        config: ServerConfig,
        songs: SongService,
        db: Option<Database>,
        archive: Arc<ArchiveCatalog>,
        proxy_http: reqwest::Client,
    ) -> Self {
        Self {
            config: Arc::new(config),
            songs: Arc::new(songs),
            db,
            archive,
            proxy_http,
        }
    }

    /// The account store, or an error when accounts are disabled
    pub fn db(&self) -> ApiResult<&Database> {
        self.db
            .as_ref()
            .ok_or_else(|| ApiError::NotFound("Accounts are disabled".to_string()))
    }
}

pub fn proxy_client(config: &ServerConfig) -> Result<reqwest::Client, CatalogError> {
    reqwest::Client::builder()
        .user_agent(concat!("medley/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(config.proxy_timeout)
        .build()
        .map_err(|e| CatalogError::NotConfigured(e.to_string()))
}
