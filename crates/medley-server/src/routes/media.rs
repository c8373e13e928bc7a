//! Audio proxy for remote media.
//!
//! Streams an upstream audio URL through this server so browsers can seek
//! (the client `Range` header is forwarded) and play it cross-origin.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE,
};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Upstream headers copied onto the proxied response
const PASSTHROUGH_HEADERS: [axum::http::HeaderName; 4] =
    [CONTENT_TYPE, CONTENT_LENGTH, CONTENT_RANGE, ACCEPT_RANGES];

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

/// Parse and check a proxy target: only absolute http(s) URLs
pub fn parse_upstream(raw: Option<&str>) -> ApiResult<reqwest::Url> {
    let raw = raw
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("url parameter required".to_string()))?;

    let url = reqwest::Url::parse(raw)
        .map_err(|e| ApiError::BadRequest(format!("Invalid url: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::BadRequest(format!(
            "Unsupported url scheme '{}'",
            other
        ))),
    }
}

pub async fn proxy_audio(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let upstream = parse_upstream(params.url.as_deref())?;
    debug!(url = %upstream, range = ?headers.get(RANGE), "proxying audio");

    let mut request = state.proxy_http.get(upstream.clone());
    if let Some(range) = headers.get(RANGE) {
        request = request.header(RANGE, range.clone());
    }

    let response = request.send().await.map_err(|e| {
        warn!(url = %upstream, error = %e, "proxy upstream unreachable");
        ApiError::Upstream(e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!(url = %upstream, status = status.as_u16(), "proxy upstream refused");
        return Err(ApiError::Upstream(format!("upstream returned {}", status)));
    }

    let mut builder = Response::builder().status(status);
    for name in PASSTHROUGH_HEADERS {
        if let Some(value) = response.headers().get(&name) {
            builder = builder.header(name, value.clone());
        }
    }

    builder
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Body::from_stream(response.bytes_stream()))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
