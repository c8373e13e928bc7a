//! Remote song catalogs.
//!
//! A [`Catalog`] turns a query into normalized songs. Implementations return
//! errors as values; deciding that a failure means "no remote results" is
//! left to the caller.

pub mod archive;
pub mod jiosaavn;
pub mod rate_limiter;

use async_trait::async_trait;
use medley_core::{PageRequest, SearchQuery, Song};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ProviderKind, ServerConfig};

pub use archive::ArchiveCatalog;
pub use jiosaavn::JioSaavnCatalog;

/// Catalog client errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Http(u16),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Catalog not configured: {0}")]
    NotConfigured(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// One page of remote results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    pub songs: Vec<Song>,
    /// Raw results the provider examined for this page, dropped ones included
    pub total_matches: usize,
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    async fn search(&self, query: &SearchQuery, request: PageRequest) -> CatalogResult<CatalogPage>;

    /// Small supplementary set shown next to the local library
    async fn featured(&self, limit: usize) -> CatalogResult<Vec<Song>>;
}

/// Shared outbound HTTP client
pub fn http_client(timeout: Duration) -> CatalogResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("medley/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| CatalogError::NotConfigured(e.to_string()))
}

/// Build the catalog for a provider kind from the server configuration
pub fn build_catalog(
    kind: ProviderKind,
    config: &ServerConfig,
    client: reqwest::Client,
) -> CatalogResult<Arc<dyn Catalog>> {
    let catalog: Arc<dyn Catalog> = match kind {
        ProviderKind::JioSaavn => Arc::new(JioSaavnCatalog::new(
            client,
            &config.search_api_url,
            &config.featured_query,
        )?),
        ProviderKind::Archive => Arc::new(ArchiveCatalog::new(
            client,
            &config.archive_url,
            config.metadata_timeout,
        )?),
    };
    Ok(catalog)
}

/// Base URL without trailing slashes; blank is a configuration error
pub(crate) fn base_url(name: &str, raw: &str) -> CatalogResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(CatalogError::NotConfigured(format!("{} base URL is empty", name)));
    }
    Ok(trimmed.to_string())
}

/// Send a prepared request and decode a JSON body from a 2xx response
pub(crate) async fn fetch_json(request: reqwest::RequestBuilder) -> CatalogResult<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Http(status.as_u16()));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;

    serde_json::from_slice(&body).map_err(|e| CatalogError::Parse(e.to_string()))
}
