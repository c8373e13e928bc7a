//! Pagination arithmetic for list and search responses.

use serde::Serialize;

/// A clamped page request (1-based page number)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    /// Create a request, clamping `page` to at least 1 and `per_page` to
    /// `1..=max_per_page`
    pub fn new(page: usize, per_page: usize, max_per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, max_per_page.max(1)),
        }
    }

    /// Build a request from raw query-string values. Missing or unparsable
    /// values fall back to page 1 and `default_per_page`.
    pub fn from_params(
        page: Option<&str>,
        per_page: Option<&str>,
        default_per_page: usize,
        max_per_page: usize,
    ) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| p.max(1) as usize)
            .unwrap_or(1);
        let per_page = per_page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| p.max(1) as usize)
            .unwrap_or(default_per_page);

        Self::new(page, per_page, max_per_page)
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of items plus the numbers needed to render a pager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// `ceil(total / per_page)`, zero for an empty set
pub fn total_pages(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1))
}

/// Slice out one page. Out-of-range pages are empty, never an error.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let start = request.offset().min(total);
    let end = start.saturating_add(request.per_page).min(total);

    let items = items.into_iter().skip(start).take(end - start).collect();

    Page {
        items,
        total,
        page: request.page,
        per_page: request.per_page,
        total_pages: total_pages(total, request.per_page),
    }
}
