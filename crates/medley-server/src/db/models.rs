//! Rows of the account store.

use medley_core::Song;
use serde::Serialize;

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub created_at: i64,
}

/// A bearer session; timestamps are Unix seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub expires_at: i64,
}

/// A user's playlist with its songs in insertion order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Playlist {
    #[serde(skip)]
    pub id: i64,
    pub name: String,
    pub songs: Vec<Song>,
    pub count: usize,
}
