//! Client for JioSaavn-style song search APIs.

use async_trait::async_trait;
use medley_core::providers::jiosaavn::normalize_page;
use medley_core::{PageRequest, SearchQuery, Song};
use tracing::debug;

use crate::catalog::{base_url, fetch_json, Catalog, CatalogError, CatalogPage, CatalogResult};

pub struct JioSaavnCatalog {
    client: reqwest::Client,
    base_url: String,
    featured_query: SearchQuery,
}

impl JioSaavnCatalog {
    pub fn new(client: reqwest::Client, base: &str, featured_query: &str) -> CatalogResult<Self> {
        let featured_query = SearchQuery::parse(Some(featured_query))
            .map_err(|_| CatalogError::NotConfigured("featured query is empty".to_string()))?;

        Ok(Self {
            client,
            base_url: base_url("jiosaavn", base)?,
            featured_query,
        })
    }

    fn search_endpoint(&self) -> String {
        format!("{}/api/search/songs", self.base_url)
    }
}

#[async_trait]
impl Catalog for JioSaavnCatalog {
    fn name(&self) -> &'static str {
        "jiosaavn"
    }

    async fn search(&self, query: &SearchQuery, request: PageRequest) -> CatalogResult<CatalogPage> {
        let params = [
            ("query", query.as_str().to_string()),
            ("page", request.page.to_string()),
            ("limit", request.per_page.to_string()),
        ];
        let body = fetch_json(self.client.get(self.search_endpoint()).query(&params)).await?;

        let page = normalize_page(&body, request.offset());
        debug!(
            query = %query.as_str(),
            found = page.examined,
            returned = page.songs.len(),
            "jiosaavn search"
        );

        Ok(CatalogPage {
            songs: page.songs,
            total_matches: page.examined,
        })
    }

    async fn featured(&self, limit: usize) -> CatalogResult<Vec<Song>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let request = PageRequest::new(1, limit, limit);
        let mut page = self.search(&self.featured_query, request).await?;
        page.songs.truncate(limit);
        Ok(page.songs)
    }
}
