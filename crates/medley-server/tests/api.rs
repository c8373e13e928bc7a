//! End-to-end tests through the axum router.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE, RANGE,
};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use medley_core::{PageRequest, SearchQuery, Song, SongSource};
use medley_server::catalog::{ArchiveCatalog, Catalog, CatalogPage, CatalogResult};
use medley_server::config::{IdScheme, ServerConfig};
use medley_server::db::Database;
use medley_server::scanner::LibraryScanner;
use medley_server::service::SongService;
use medley_server::{build_router, AppState};
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

struct FixedCatalog {
    songs: Vec<Song>,
    examined: usize,
}

#[async_trait]
impl Catalog for FixedCatalog {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn search(&self, _query: &SearchQuery, _request: PageRequest) -> CatalogResult<CatalogPage> {
        Ok(CatalogPage {
            songs: self.songs.clone(),
            total_matches: self.examined,
        })
    }

    async fn featured(&self, limit: usize) -> CatalogResult<Vec<Song>> {
        Ok(self.songs.iter().take(limit).cloned().collect())
    }
}

fn remote(id: &str) -> Song {
    Song {
        id: id.to_string(),
        title: format!("Remote {}", id),
        artist: "Remote Artist".to_string(),
        album: None,
        year: None,
        duration: Some(100),
        url: format!("https://cdn.example/{}.mp3", id),
        source: SongSource::JioSaavn,
        thumbnail: None,
    }
}

struct TestApp {
    router: Router,
    library: TempDir,
}

impl TestApp {
    fn new(local_files: &[&str], remote_songs: Vec<Song>, accounts: bool) -> Self {
        Self::with_archive(local_files, remote_songs, accounts, "http://127.0.0.1:1")
    }

    fn with_archive(local_files: &[&str], remote_songs: Vec<Song>, accounts: bool, archive_url: &str) -> Self {
        medley_server::logging::init_tracing();
        let library = TempDir::new().unwrap();
        for name in local_files {
            fs::write(library.path().join(name), b"not really audio").unwrap();
        }

        let config = ServerConfig {
            library_dir: library.path().to_path_buf(),
            accounts_enabled: accounts,
            ..ServerConfig::default()
        };
        let catalog: Arc<dyn Catalog> = Arc::new(FixedCatalog {
            examined: remote_songs.len(),
            songs: remote_songs,
        });
        let scanner = LibraryScanner::new(
            library.path(),
            config.songs_route.clone(),
            config.extensions.clone(),
            IdScheme::Positional,
        );
        let songs = SongService::new(scanner, catalog.clone(), catalog, config.featured_limit);
        let db = accounts.then(|| Database::new_in_memory().unwrap());

        let archive = Arc::new(
            ArchiveCatalog::new(reqwest::Client::new(), archive_url, Duration::from_secs(5)).unwrap(),
        );

        let state = AppState::new(config, songs, db, archive, reqwest::Client::new());
        Self {
            router: build_router(state),
            library,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }
}

fn track_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("track_{:02}.mp3", i)).collect()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(&[], vec![], false);
    let (status, body) = app.get_json("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "service": "medley"}));
}

#[tokio::test]
async fn test_list_second_page_of_25() {
    let names = track_names(20);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let featured = (1..=5).map(|i| remote(&format!("r{}", i))).collect();
    let app = TestApp::new(&refs, featured, false);

    let (status, body) = app.get_json("/api/songs?page=2&per_page=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 25);
    assert_eq!(body["page"], 2);
    assert_eq!(body["per_page"], 10);
    assert_eq!(body["total_pages"], 3);
    let ids: Vec<&str> = body["songs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    let expected: Vec<String> = (11..=20).map(|i| format!("static-{}", i)).collect();
    assert_eq!(ids, expected);
    assert_eq!(body["songs"][0]["title"], "Track 11");
    assert_eq!(body["songs"][0]["url"], "/songs/track_11.mp3");
}

#[tokio::test]
async fn test_list_clamps_paging_params() {
    let app = TestApp::new(&["a.mp3"], vec![], false);

    let (_, body) = app.get_json("/api/songs?page=0&per_page=100000").await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 100);

    let (_, body) = app.get_json("/api/songs?page=abc&per_page=-5").await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 1);
}

#[tokio::test]
async fn test_list_out_of_range_page_is_empty() {
    let app = TestApp::new(&["a.mp3"], vec![], false);
    let (status, body) = app.get_json("/api/songs?page=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"], json!([]));
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = TestApp::new(&[], vec![], false);

    for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
        let (status, body) = app.get_json(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, json!({"error": "Query parameter required"}));
    }
}

#[tokio::test]
async fn test_search_with_no_local_matches() {
    let app = TestApp::new(&["a.mp3", "b.mp3"], vec![remote("r1"), remote("r2")], false);

    let (status, body) = app.get_json("/api/search?q=unknown_artist_xyz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "unknown_artist_xyz");
    assert_eq!(body["static_matches"], 0);
    assert_eq!(body["api_matches"], 2);
    assert_eq!(body["total"], 2);
    assert_eq!(body["per_page"], 20);
}

#[tokio::test]
async fn test_search_case_insensitive_local_first() {
    let app = TestApp::new(&["Nina Simone - Feeling Good.mp3"], vec![remote("r1")], false);

    let (_, body) = app.get_json("/api/search?q=NINA").await;

    assert_eq!(body["static_matches"], 1);
    assert_eq!(body["songs"][0]["artist"], "Nina Simone");
    assert_eq!(body["songs"][0]["source"], "static");
    assert_eq!(body["songs"][1]["source"], "jiosaavn");
}

#[tokio::test]
async fn test_random_not_found_when_empty() {
    let app = TestApp::new(&[], vec![], false);
    let (status, body) = app.get_json("/api/random").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "No songs available"}));
}

#[tokio::test]
async fn test_random_returns_a_song() {
    let app = TestApp::new(&[], vec![remote("r1")], false);
    let (status, body) = app.get_json("/api/random").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "r1");
}

#[tokio::test]
async fn test_debug_search() {
    let app = TestApp::new(&[], vec![remote("r1")], false);
    let (status, body) = app.get_json("/api/debug/search/hello").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "hello");
    assert_eq!(body["songs_found"], 1);
    assert_eq!(body["total_available"], 1);
}

#[tokio::test]
async fn test_serves_library_files_with_ranges() {
    let app = TestApp::new(&[], vec![], false);
    fs::write(app.library.path().join("my song.mp3"), b"0123456789").unwrap();

    let request = Request::builder().uri("/songs/my%20song.mp3").body(Body::empty()).unwrap();
    let (status, headers, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "audio/mpeg");
    assert_eq!(body, b"0123456789");

    let request = Request::builder()
        .uri("/songs/my%20song.mp3")
        .header(RANGE, "bytes=2-4")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = app.send(request).await;
    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(body, b"234");

    let request = Request::builder().uri("/songs/missing.mp3").body(Body::empty()).unwrap();
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn upstream_audio(headers: HeaderMap) -> Response {
    match headers.get(RANGE).and_then(|v| v.to_str().ok()) {
        Some("bytes=0-1") => (
            StatusCode::PARTIAL_CONTENT,
            [
                (CONTENT_TYPE, "audio/mpeg"),
                (CONTENT_RANGE, "bytes 0-1/4"),
                (ACCEPT_RANGES, "bytes"),
            ],
            vec![1u8, 2],
        )
            .into_response(),
        _ => ([(CONTENT_TYPE, "audio/mpeg")], vec![1u8, 2, 3, 4]).into_response(),
    }
}

async fn spawn_upstream() -> String {
    let router = Router::new()
        .route("/audio.mp3", get(upstream_audio))
        .route("/gone.mp3", get(|| async { StatusCode::NOT_FOUND }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_proxy_streams_and_forwards_range() {
    let upstream = spawn_upstream().await;
    let app = TestApp::new(&[], vec![], false);
    let uri = format!("/api/proxy?url={}", urlencoding::encode(&format!("{}/audio.mp3", upstream)));

    let request = Request::builder().uri(&uri).body(Body::empty()).unwrap();
    let (status, headers, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[CONTENT_TYPE], "audio/mpeg");
    assert_eq!(body, vec![1, 2, 3, 4]);

    let request = Request::builder()
        .uri(&uri)
        .header(RANGE, "bytes=0-1")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = app.send(request).await;
    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(headers[CONTENT_RANGE], "bytes 0-1/4");
    assert_eq!(headers[ACCEPT_RANGES], "bytes");
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body, vec![1, 2]);
}

#[tokio::test]
async fn test_proxy_errors() {
    let upstream = spawn_upstream().await;
    let app = TestApp::new(&[], vec![], false);

    let (status, _) = app.get_json("/api/proxy").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get_json("/api/proxy?url=ftp%3A%2F%2Fexample.com%2Fa.mp3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/proxy?url={}", urlencoding::encode(&format!("{}/gone.mp3", upstream)));
    let (status, body) = app.get_json(&uri).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}

async fn spawn_archive() -> String {
    let router = Router::new()
        .route(
            "/advancedsearch.php",
            get(|| async {
                Json(json!({
                    "responseHeader": {"status": 0},
                    "response": {"numFound": 1, "docs": [{"identifier": "gd1977", "title": "Live"}]}
                }))
            }),
        )
        .route(
            "/metadata/gd1977/files",
            get(|| async {
                Json(json!({"result": [
                    {"name": "gd1977.jpg", "format": "JPEG", "size": "100"},
                    {"name": "d1t01.mp3", "format": "VBR MP3", "size": "4000"}
                ]}))
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_debug_raw_search() {
    let archive = spawn_archive().await;
    let app = TestApp::with_archive(&[], vec![], false, &archive);

    let (status, body) = app.get_json("/api/debug/raw/grateful%20dead").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["query"], "grateful dead");
    let keys: Vec<&str> = body["response_keys"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k.as_str().unwrap())
        .collect();
    assert!(keys.contains(&"response"));
    assert_eq!(body["raw_response"]["response"]["docs"][0]["identifier"], "gd1977");
    assert!(body["url_used"].as_str().unwrap().contains("rows=3"));
}

#[tokio::test]
async fn test_debug_files() {
    let archive = spawn_archive().await;
    let app = TestApp::with_archive(&[], vec![], false, &archive);

    let (status, body) = app.get_json("/api/debug/files/gd1977").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identifier"], "gd1977");
    assert_eq!(body["total_files"], 2);
    assert_eq!(body["files_shown"], 2);
    assert_eq!(body["files"][0]["is_audio"], false);
    assert_eq!(body["files"][1]["is_audio"], true);
    assert_eq!(body["files"][1]["size"], "4000");
    assert_eq!(body["picked"], "d1t01.mp3");
    assert_eq!(body["metadata_url"], format!("{}/metadata/gd1977/files", archive));
}

#[tokio::test]
async fn test_debug_inspectors_report_upstream_failure() {
    let app = TestApp::new(&[], vec![], false);

    let (status, body) = app.get_json("/api/debug/raw/anything").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());

    let (status, _) = app.get_json("/api/debug/files/gd1977").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_accounts_disabled_hides_routes() {
    let app = TestApp::new(&[], vec![], false);
    let (status, _) = app.call(Method::GET, "/api/playlist", Some("token"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new(&[], vec![], true);
    let credentials = json!({"username": "alice", "password": "password1"});

    let (status, body) = app.call(Method::POST, "/api/auth/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert!(body["token"].is_string());
    assert!(body["expires_at"].is_string());

    let (status, _) = app.call(Method::POST, "/api/auth/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(Method::POST, "/api/auth/register", None, Some(json!({"username": "x", "password": "password1"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::POST, "/api/auth/register", None, Some(json!({"username": "bobby", "password": "short"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.call(Method::POST, "/api/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");

    let (status, body) = app
        .call(Method::POST, "/api/auth/login", None, Some(json!({"username": "alice", "password": "nope-nope"})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app.call(Method::POST, "/api/auth/login", None, Some(json!({"username": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_playlist_flow() {
    let app = TestApp::new(&[], vec![], true);
    let (_, grant) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"username": "alice", "password": "password1"})),
        )
        .await;
    let token = grant["token"].as_str().unwrap().to_string();
    let token = Some(token.as_str());

    let (status, _) = app.call(Method::GET, "/api/playlist", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.call(Method::GET, "/api/playlist", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.call(Method::GET, "/api/playlist", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"name": "My Playlist", "songs": [], "count": 0}));

    let song = serde_json::to_value(remote("r1")).unwrap();
    let (status, body) = app
        .call(Method::POST, "/api/playlist/songs", token, Some(json!({"song": song})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 1);
    assert_eq!(body["songs"][0]["id"], "r1");

    let (status, _) = app
        .call(Method::POST, "/api/playlist/songs", token, Some(json!({"song": song})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut invalid = song.clone();
    invalid["id"] = json!("r2");
    invalid["url"] = json!("");
    let (status, _) = app
        .call(Method::POST, "/api/playlist/songs", token, Some(json!({"song": invalid})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(Method::PUT, "/api/playlist", token, Some(json!({"name": "Road Trip"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Road Trip");

    let (status, _) = app
        .call(Method::PUT, "/api/playlist", token, Some(json!({"name": ""})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call(Method::DELETE, "/api/playlist/songs/r1", token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::DELETE, "/api/playlist/songs/r1", token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.call(Method::POST, "/api/playlist/songs", token, Some(json!({"song": song})))
        .await;
    let (status, _) = app.call(Method::DELETE, "/api/playlist", token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.call(Method::GET, "/api/playlist", token, None).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["name"], "Road Trip");

    let (status, _) = app.call(Method::POST, "/api/auth/logout", token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::GET, "/api/playlist", token, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cors_is_permissive() {
    let app = TestApp::new(&[], vec![], false);
    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "https://player.example")
        .body(Body::empty())
        .unwrap();

    let (_, headers, _) = app.send(request).await;
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
