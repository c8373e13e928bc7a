//! Client for the Internet Archive audio collections.
//!
//! Search goes through `advancedsearch.php`; every hit is then resolved to a
//! playable file through the item's `files` listing. Items without an audio
//! file are dropped.

use async_trait::async_trait;
use medley_core::providers::archive::{docs, download_url, identifier, pick_audio_file, song_from_doc};
use medley_core::{PageRequest, SearchQuery, Song};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::catalog::rate_limiter::RateLimiter;
use crate::catalog::{base_url, fetch_json, Catalog, CatalogError, CatalogPage, CatalogResult};

const SEARCH_FIELDS: &str = "identifier,title,creator,date,description,downloads,collection";
const POPULAR_QUERY: &str = "mediatype:audio AND (collection:opensource_audio OR collection:etree)";
const RAW_FIELDS: &str = "identifier,title,creator";

/// Unprocessed advanced-search response and the URL that produced it
#[derive(Debug, Clone)]
pub struct RawSearch {
    pub url: String,
    pub body: Value,
}

pub struct ArchiveCatalog {
    client: reqwest::Client,
    base_url: String,
    metadata_timeout: Duration,
    rate_limiter: RateLimiter,
}

impl ArchiveCatalog {
    pub fn new(client: reqwest::Client, base: &str, metadata_timeout: Duration) -> CatalogResult<Self> {
        Ok(Self {
            client,
            base_url: base_url("archive", base)?,
            metadata_timeout,
            rate_limiter: RateLimiter::default(),
        })
    }

    async fn advanced_search(&self, q: &str, rows: usize, start: usize) -> CatalogResult<Value> {
        let params = [
            ("q", q.to_string()),
            ("fl", SEARCH_FIELDS.to_string()),
            ("sort", "downloads desc".to_string()),
            ("rows", rows.to_string()),
            ("start", start.to_string()),
            ("output", "json".to_string()),
        ];

        self.rate_limiter.wait_if_needed().await;
        fetch_json(
            self.client
                .get(format!("{}/advancedsearch.php", self.base_url))
                .query(&params),
        )
        .await
    }

    /// Advanced search with a minimal field list, returned untouched
    pub async fn raw_search(&self, query: &str, rows: usize) -> CatalogResult<RawSearch> {
        let params = [
            ("q", format!("{} AND mediatype:audio", query)),
            ("fl", RAW_FIELDS.to_string()),
            ("rows", rows.to_string()),
            ("output", "json".to_string()),
        ];
        let url = reqwest::Url::parse_with_params(&format!("{}/advancedsearch.php", self.base_url), &params)
            .map_err(|e| CatalogError::NotConfigured(e.to_string()))?;

        self.rate_limiter.wait_if_needed().await;
        let body = fetch_json(self.client.get(url.clone())).await?;
        Ok(RawSearch {
            url: url.to_string(),
            body,
        })
    }

    pub fn metadata_url(&self, identifier: &str) -> String {
        format!(
            "{}/metadata/{}/files",
            self.base_url,
            urlencoding::encode(identifier)
        )
    }

    /// The item's `files` listing as returned by the metadata API
    pub async fn file_listing(&self, identifier: &str) -> CatalogResult<Value> {
        self.rate_limiter.wait_if_needed().await;
        fetch_json(
            self.client
                .get(self.metadata_url(identifier))
                .timeout(self.metadata_timeout),
        )
        .await
    }

    /// Resolve one search doc to a playable song. Lookup failures drop the
    /// doc.
    async fn resolve(&self, doc: &Value) -> Option<Song> {
        let id = identifier(doc)?;

        let files = match self.file_listing(&id).await {
            Ok(files) => files,
            Err(e) => {
                debug!(identifier = %id, error = %e, "archive file listing failed");
                return None;
            }
        };

        let Some(file_name) = pick_audio_file(&files) else {
            debug!(identifier = %id, "archive item has no audio file");
            return None;
        };

        song_from_doc(doc, &self.base_url, &download_url(&self.base_url, &id, &file_name))
    }
}

#[async_trait]
impl Catalog for ArchiveCatalog {
    fn name(&self) -> &'static str {
        "archive"
    }

    async fn search(&self, query: &SearchQuery, request: PageRequest) -> CatalogResult<CatalogPage> {
        let q = format!("{} AND mediatype:audio", query.as_str());
        let body = self
            .advanced_search(&q, request.per_page, request.offset())
            .await?;
        let docs = docs(&body);

        let mut songs = Vec::with_capacity(docs.len());
        for doc in docs {
            if let Some(song) = self.resolve(doc).await {
                songs.push(song);
            }
        }

        debug!(
            query = %query.as_str(),
            found = docs.len(),
            returned = songs.len(),
            "archive search"
        );

        Ok(CatalogPage {
            songs,
            total_matches: docs.len(),
        })
    }

    async fn featured(&self, limit: usize) -> CatalogResult<Vec<Song>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let body = self.advanced_search(POPULAR_QUERY, limit * 3, 0).await?;
        let max_examined = limit * 2;

        let mut songs = Vec::with_capacity(limit);
        for (examined, doc) in docs(&body).iter().enumerate() {
            if songs.len() >= limit || examined >= max_examined {
                break;
            }
            if let Some(song) = self.resolve(doc).await {
                songs.push(song);
            }
        }

        Ok(songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{serve, UNREACHABLE};
    use crate::catalog::http_client;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use medley_core::SongSource;
    use serde_json::json;
    use std::collections::HashMap;

    async fn fake_advanced_search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let rows: usize = params.get("rows").and_then(|r| r.parse().ok()).unwrap_or(0);
        let q = params.get("q").cloned().unwrap_or_default();

        let mut docs = vec![
            json!({"identifier": "gd1977", "title": format!("hit for {}", q), "creator": ["Grateful Dead"], "date": "1977-05-08", "collection": ["etree"]}),
            json!({"identifier": "pictures", "title": "Only Images"}),
            json!({"title": "No identifier"}),
            json!({"identifier": "broken", "title": "Listing Fails"}),
            json!({"identifier": "second", "title": "Second Hit", "creator": "Someone"}),
        ];
        docs.truncate(rows);
        Json(json!({"response": {"numFound": 500, "docs": docs}}))
    }

    async fn fake_files(Path(id): Path<String>) -> Response {
        match id.as_str() {
            "gd1977" => Json(json!({"files": [
                {"name": "cover.jpg", "format": "JPEG"},
                {"name": "d1t01 Bertha.mp3", "format": "VBR MP3"}
            ]}))
            .into_response(),
            "second" => Json(json!({"result": [{"name": "a.ogg", "format": "Ogg Vorbis"}]})).into_response(),
            "pictures" => Json(json!({"files": [{"name": "a.png", "format": "PNG"}]})).into_response(),
            _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    async fn catalog() -> (ArchiveCatalog, String) {
        let router = Router::new()
            .route("/advancedsearch.php", get(fake_advanced_search))
            .route("/metadata/{id}/files", get(fake_files));
        let base = serve(router).await;
        let client = http_client(Duration::from_secs(5)).unwrap();
        let catalog = ArchiveCatalog::new(client, &base, Duration::from_secs(5)).unwrap();
        (catalog, base)
    }

    #[tokio::test]
    async fn test_search_resolves_audio_files() {
        let (catalog, base) = catalog().await;
        let query = SearchQuery::parse(Some("dead")).unwrap();

        let page = catalog.search(&query, PageRequest::new(1, 5, 100)).await.unwrap();

        assert_eq!(page.total_matches, 5);
        assert_eq!(page.songs.len(), 2);

        let first = &page.songs[0];
        assert_eq!(first.id, "gd1977");
        assert_eq!(first.title, "hit for dead AND mediatype:audio");
        assert_eq!(first.artist, "Grateful Dead");
        assert_eq!(first.year, Some(1977));
        assert_eq!(first.album.as_deref(), Some("etree"));
        assert_eq!(first.source, SongSource::Archive);
        // The fake upstream is plain http; every emitted url is upgraded
        let https_base = base.replacen("http://", "https://", 1);
        assert_eq!(first.url, format!("{}/download/gd1977/d1t01%20Bertha.mp3", https_base));
        assert_eq!(first.thumbnail.as_deref(), Some(format!("{}/services/img/gd1977", https_base).as_str()));

        assert_eq!(page.songs[1].id, "second");
        assert!(page.songs.iter().all(|s| !s.url.starts_with("http://")));
    }

    #[tokio::test]
    async fn test_featured_stops_at_limit() {
        let (catalog, _) = catalog().await;

        let songs = catalog.featured(1).await.unwrap();

        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, "gd1977");
        assert!(songs[0].title.contains("collection:etree"));
    }

    #[tokio::test]
    async fn test_featured_examines_at_most_twice_the_limit() {
        let (catalog, _) = catalog().await;

        // rows = 6 gives all five docs; only the first four are examined,
        // and "second" is the fifth
        let songs = catalog.featured(2).await.unwrap();

        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, "gd1977");
    }

    #[tokio::test]
    async fn test_raw_search_returns_body_and_url() {
        let (catalog, base) = catalog().await;

        let raw = catalog.raw_search("jazz", 3).await.unwrap();

        assert!(raw.url.starts_with(&format!("{}/advancedsearch.php?", base)));
        assert!(raw.url.contains("rows=3"));
        assert!(raw.url.contains("output=json"));
        assert_eq!(raw.body["response"]["numFound"], 500);
        assert_eq!(raw.body["response"]["docs"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_file_listing() {
        let (catalog, base) = catalog().await;

        let listing = catalog.file_listing("second").await.unwrap();
        assert_eq!(listing["result"][0]["name"], "a.ogg");
        assert_eq!(catalog.metadata_url("a b"), format!("{}/metadata/a%20b/files", base));

        let err = catalog.file_listing("broken").await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(500)));
    }

    #[tokio::test]
    async fn test_search_unreachable() {
        let client = http_client(Duration::from_secs(5)).unwrap();
        let catalog = ArchiveCatalog::new(client, UNREACHABLE, Duration::from_secs(1)).unwrap();
        let query = SearchQuery::parse(Some("x")).unwrap();

        let err = catalog.search(&query, PageRequest::new(1, 5, 100)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Network(_)));
    }
}
