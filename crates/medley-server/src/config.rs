//! Server configuration.
//!
//! Every value is read from a `MEDLEY_*` environment variable with a default,
//! once at startup. The resulting [`ServerConfig`] is shared read-only.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// How local songs get their ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdScheme {
    /// `static-<n>` in listing order; changes when files are added or removed
    #[default]
    Positional,
    /// `static-<hash>` derived from the file name
    Content,
}

impl FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positional" => Ok(IdScheme::Positional),
            "content" => Ok(IdScheme::Content),
            other => Err(format!("expected positional or content, got {}", other)),
        }
    }
}

/// Remote catalog implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    JioSaavn,
    Archive,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jiosaavn" | "saavn" => Ok(ProviderKind::JioSaavn),
            "archive" | "internet_archive" => Ok(ProviderKind::Archive),
            other => Err(format!("expected jiosaavn or archive, got {}", other)),
        }
    }
}

/// Everything the server needs to know at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub library_dir: PathBuf,
    /// URL prefix under which library files are served
    pub songs_route: String,
    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
    pub id_scheme: IdScheme,
    pub search_provider: ProviderKind,
    pub featured_provider: ProviderKind,
    pub search_api_url: String,
    pub archive_url: String,
    pub featured_query: String,
    pub featured_limit: usize,
    pub search_timeout: Duration,
    pub metadata_timeout: Duration,
    pub proxy_timeout: Duration,
    pub list_per_page: usize,
    pub search_per_page: usize,
    pub max_per_page: usize,
    pub shuffle_by_default: bool,
    /// SQLite file, or `:memory:`
    pub db_path: String,
    pub accounts_enabled: bool,
    pub session_ttl: chrono::Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5600)),
            library_dir: PathBuf::from("static/songs"),
            songs_route: "/songs".to_string(),
            extensions: vec!["mp3".to_string(), "wav".to_string(), "ogg".to_string()],
            id_scheme: IdScheme::Positional,
            search_provider: ProviderKind::JioSaavn,
            featured_provider: ProviderKind::Archive,
            search_api_url: "https://saavn.dev".to_string(),
            archive_url: "https://archive.org".to_string(),
            featured_query: "top hits".to_string(),
            featured_limit: 5,
            search_timeout: Duration::from_secs(15),
            metadata_timeout: Duration::from_secs(10),
            proxy_timeout: Duration::from_secs(30),
            list_per_page: 10,
            search_per_page: 20,
            max_per_page: 100,
            shuffle_by_default: false,
            db_path: "medley.db".to_string(),
            accounts_enabled: true,
            session_ttl: chrono::Duration::hours(168),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let extensions = match get("MEDLEY_EXTENSIONS") {
            Some(raw) => parse_extensions(&raw)?,
            None => defaults.extensions,
        };

        let songs_route = get("MEDLEY_SONGS_ROUTE")
            .map(|route| normalize_route(&route))
            .unwrap_or(defaults.songs_route);

        Ok(Self {
            bind: parse_or("MEDLEY_BIND", get("MEDLEY_BIND"), defaults.bind)?,
            library_dir: get("MEDLEY_LIBRARY_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.library_dir),
            songs_route,
            extensions,
            id_scheme: parse_or("MEDLEY_ID_SCHEME", get("MEDLEY_ID_SCHEME"), defaults.id_scheme)?,
            search_provider: parse_or(
                "MEDLEY_SEARCH_PROVIDER",
                get("MEDLEY_SEARCH_PROVIDER"),
                defaults.search_provider,
            )?,
            featured_provider: parse_or(
                "MEDLEY_FEATURED_PROVIDER",
                get("MEDLEY_FEATURED_PROVIDER"),
                defaults.featured_provider,
            )?,
            search_api_url: get("MEDLEY_SEARCH_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.search_api_url),
            archive_url: get("MEDLEY_ARCHIVE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.archive_url),
            featured_query: get("MEDLEY_FEATURED_QUERY").unwrap_or(defaults.featured_query),
            featured_limit: parse_or(
                "MEDLEY_FEATURED_LIMIT",
                get("MEDLEY_FEATURED_LIMIT"),
                defaults.featured_limit,
            )?,
            search_timeout: parse_secs(
                "MEDLEY_SEARCH_TIMEOUT_SECS",
                get("MEDLEY_SEARCH_TIMEOUT_SECS"),
                defaults.search_timeout,
            )?,
            metadata_timeout: parse_secs(
                "MEDLEY_METADATA_TIMEOUT_SECS",
                get("MEDLEY_METADATA_TIMEOUT_SECS"),
                defaults.metadata_timeout,
            )?,
            proxy_timeout: parse_secs(
                "MEDLEY_PROXY_TIMEOUT_SECS",
                get("MEDLEY_PROXY_TIMEOUT_SECS"),
                defaults.proxy_timeout,
            )?,
            list_per_page: parse_positive(
                "MEDLEY_LIST_PER_PAGE",
                get("MEDLEY_LIST_PER_PAGE"),
                defaults.list_per_page,
            )?,
            search_per_page: parse_positive(
                "MEDLEY_SEARCH_PER_PAGE",
                get("MEDLEY_SEARCH_PER_PAGE"),
                defaults.search_per_page,
            )?,
            max_per_page: parse_positive(
                "MEDLEY_MAX_PER_PAGE",
                get("MEDLEY_MAX_PER_PAGE"),
                defaults.max_per_page,
            )?,
            shuffle_by_default: parse_bool(
                "MEDLEY_SHUFFLE",
                get("MEDLEY_SHUFFLE"),
                defaults.shuffle_by_default,
            )?,
            db_path: get("MEDLEY_DB_PATH").unwrap_or(defaults.db_path),
            accounts_enabled: parse_bool(
                "MEDLEY_ACCOUNTS",
                get("MEDLEY_ACCOUNTS"),
                defaults.accounts_enabled,
            )?,
            session_ttl: parse_or::<i64>(
                "MEDLEY_SESSION_TTL_HOURS",
                get("MEDLEY_SESSION_TTL_HOURS"),
                defaults.session_ttl.num_hours(),
            )
            .and_then(|hours| {
                chrono::Duration::try_hours(hours)
                    .filter(|ttl| *ttl > chrono::Duration::zero())
                    .ok_or_else(|| ConfigError::Invalid {
                        key: "MEDLEY_SESSION_TTL_HOURS",
                        value: hours.to_string(),
                        reason: "expected a positive number of hours".to_string(),
                    })
            })?,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: value.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_positive(key: &'static str, raw: Option<String>, default: usize) -> ConfigResult<usize> {
    let value = parse_or(key, raw, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

fn parse_secs(key: &'static str, raw: Option<String>, default: Duration) -> ConfigResult<Duration> {
    parse_positive(key, raw, default.as_secs() as usize).map(|secs| Duration::from_secs(secs as u64))
}

fn parse_bool(key: &'static str, raw: Option<String>, default: bool) -> ConfigResult<bool> {
    match raw.as_deref().map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(ConfigError::Invalid {
            key,
            value: v,
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_extensions(raw: &str) -> ConfigResult<Vec<String>> {
    let extensions: Vec<String> = raw
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();

    if extensions.is_empty() {
        return Err(ConfigError::Invalid {
            key: "MEDLEY_EXTENSIONS",
            value: raw.to_string(),
            reason: "expected at least one extension".to_string(),
        });
    }
    Ok(extensions)
}

fn normalize_route(route: &str) -> String {
    let trimmed = route.trim().trim_matches('/');
    format!("/{}", trimmed)
}
