//! Aggregation of the local library and the remote catalogs.
//!
//! This is the one place where source failures turn into empty
//! contributions: a failing scan or provider is logged and the other source
//! still answers.

use medley_core::paging::{paginate, total_pages};
use medley_core::{PageRequest, SearchQuery, Song};
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogPage};
use crate::scanner::LibraryScanner;

/// Rows requested by the debug search
const DEBUG_SEARCH_ROWS: usize = 5;

/// Envelope for list responses
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SongListResponse {
    pub songs: Vec<Song>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// Envelope for search responses
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub list: SongListResponse,
    pub query: String,
    pub static_matches: usize,
    /// Songs the provider returned on this page
    pub api_matches: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DebugSearchResponse {
    pub query: String,
    pub songs_found: usize,
    pub total_available: usize,
    pub songs: Vec<Song>,
}

pub struct SongService {
    scanner: LibraryScanner,
    search_catalog: Arc<dyn Catalog>,
    featured_catalog: Arc<dyn Catalog>,
    featured_limit: usize,
}

impl SongService {
    pub fn new(
        scanner: LibraryScanner,
        search_catalog: Arc<dyn Catalog>,
        featured_catalog: Arc<dyn Catalog>,
        featured_limit: usize,
    ) -> Self {
        Self {
            scanner,
            search_catalog,
            featured_catalog,
            featured_limit,
        }
    }

    /// Scan the library on the blocking pool; failures yield no songs
    pub async fn local_songs(&self) -> Vec<Song> {
        let scanner = self.scanner.clone();
        match tokio::task::spawn_blocking(move || scanner.scan()).await {
            Ok(Ok(songs)) => songs,
            Ok(Err(e)) => {
                warn!(dir = %self.scanner.root().display(), error = %e, "library scan failed");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "library scan task failed");
                Vec::new()
            }
        }
    }

    /// Supplementary songs from the featured catalog; failures yield none
    pub async fn featured_songs(&self) -> Vec<Song> {
        match self.featured_catalog.featured(self.featured_limit).await {
            Ok(songs) => songs,
            Err(e) => {
                warn!(provider = self.featured_catalog.name(), error = %e, "featured songs unavailable");
                Vec::new()
            }
        }
    }

    async fn provider_search(&self, query: &SearchQuery, request: PageRequest) -> CatalogPage {
        match self.search_catalog.search(query, request).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    provider = self.search_catalog.name(),
                    query = %query.as_str(),
                    error = %e,
                    "provider search failed"
                );
                CatalogPage::default()
            }
        }
    }

    /// Local songs followed by the featured set, optionally shuffled, one
    /// page of it
    pub async fn list(&self, request: PageRequest, shuffle: bool) -> SongListResponse {
        let (mut songs, featured) = tokio::join!(self.local_songs(), self.featured_songs());
        songs.extend(featured);

        if shuffle {
            songs.shuffle(&mut rand::rng());
        }

        let page = paginate(songs, request);
        SongListResponse {
            songs: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
        }
    }

    /// Local matches first, then the provider's page. Local matches are
    /// included on every page; `total` adds them to the provider's count.
    pub async fn search(&self, query: &SearchQuery, request: PageRequest) -> SearchResponse {
        let (local, remote) = tokio::join!(self.local_songs(), self.provider_search(query, request));
        let mut songs = query.filter(local);
        let static_matches = songs.len();
        let api_matches = remote.songs.len();
        let total = static_matches + remote.total_matches;

        info!(
            query = %query.as_str(),
            static_matches,
            found = remote.total_matches,
            returned = api_matches,
            "search"
        );

        songs.extend(remote.songs);
        SearchResponse {
            list: SongListResponse {
                songs,
                total,
                page: request.page,
                per_page: request.per_page,
                total_pages: total_pages(total, request.per_page),
            },
            query: query.as_str().to_string(),
            static_matches,
            api_matches,
        }
    }

    /// A uniformly chosen local song, else one from the featured set
    pub async fn random(&self) -> Option<Song> {
        let local = self.local_songs().await;
        if let Some(song) = local.choose(&mut rand::rng()) {
            return Some(song.clone());
        }

        let featured = self.featured_songs().await;
        featured.choose(&mut rand::rng()).cloned()
    }

    /// First page of the search provider, unfiltered by the local library
    pub async fn debug_search(&self, query: &SearchQuery) -> DebugSearchResponse {
        let request = PageRequest::new(1, DEBUG_SEARCH_ROWS, DEBUG_SEARCH_ROWS);
        let page = self.provider_search(query, request).await;
        DebugSearchResponse {
            query: query.as_str().to_string(),
            songs_found: page.songs.len(),
            total_available: page.total_matches,
            songs: page.songs,
        }
    }
}
