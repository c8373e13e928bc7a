//! Per-user playlist operations.
//!
//! Every user owns exactly one playlist, created on first access. Songs are
//! stored as JSON snapshots of the record the client sent.

use medley_core::Song;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{is_constraint_violation, DbError, DbResult, Playlist};

pub const DEFAULT_PLAYLIST_NAME: &str = "My Playlist";

/// Playlist id for a user, creating the playlist when it does not exist
fn ensure_playlist(conn: &Connection, user_id: i64, now: i64) -> DbResult<(i64, String)> {
    conn.execute(
        "INSERT OR IGNORE INTO playlists (user_id, name, created_at) VALUES (?, ?, ?)",
        params![user_id, DEFAULT_PLAYLIST_NAME, now],
    )?;

    Ok(conn.query_row(
        "SELECT id, name FROM playlists WHERE user_id = ?",
        [user_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?)
}

/// Get a user's playlist with its songs
pub fn get_playlist(conn: &Connection, user_id: i64, now: i64) -> DbResult<Playlist> {
    let (id, name) = ensure_playlist(conn, user_id, now)?;

    let mut stmt = conn.prepare(
        "SELECT song_json FROM playlist_items WHERE playlist_id = ? ORDER BY position ASC, id ASC",
    )?;
    let rows: Vec<String> = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    let songs = rows
        .iter()
        .map(|json| serde_json::from_str::<Song>(json).map_err(|e| DbError::Corrupt(e.to_string())))
        .collect::<DbResult<Vec<_>>>()?;

    Ok(Playlist {
        id,
        name,
        count: songs.len(),
        songs,
    })
}

pub fn rename_playlist(conn: &Connection, user_id: i64, name: &str, now: i64) -> DbResult<()> {
    ensure_playlist(conn, user_id, now)?;
    conn.execute(
        "UPDATE playlists SET name = ? WHERE user_id = ?",
        params![name, user_id],
    )?;
    Ok(())
}

/// Append a song. A song with the same id already in the playlist is a
/// [`DbError::Constraint`].
pub fn add_song(conn: &Connection, user_id: i64, song: &Song, now: i64) -> DbResult<()> {
    let (playlist_id, _) = ensure_playlist(conn, user_id, now)?;
    let json = serde_json::to_string(song).map_err(|e| DbError::Corrupt(e.to_string()))?;

    let next_position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM playlist_items WHERE playlist_id = ?",
        [playlist_id],
        |row| row.get(0),
    )?;

    match conn.execute(
        "INSERT INTO playlist_items (playlist_id, song_id, song_json, position, added_at)
         VALUES (?, ?, ?, ?, ?)",
        params![playlist_id, song.id, json, next_position, now],
    ) {
        Ok(_) => Ok(()),
        Err(e) if is_constraint_violation(&e) => Err(DbError::Constraint(format!(
            "Song '{}' is already in the playlist",
            song.id
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Remove a song by id; [`DbError::NotFound`] when it is not in the playlist
pub fn remove_song(conn: &Connection, user_id: i64, song_id: &str) -> DbResult<()> {
    let playlist_id: Option<i64> = conn
        .query_row(
            "SELECT id FROM playlists WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )
        .optional()?;

    let deleted = match playlist_id {
        Some(playlist_id) => conn.execute(
            "DELETE FROM playlist_items WHERE playlist_id = ? AND song_id = ?",
            params![playlist_id, song_id],
        )?,
        None => 0,
    };

    if deleted == 0 {
        return Err(DbError::NotFound(format!("Song '{}' is not in the playlist", song_id)));
    }
    Ok(())
}

/// Remove every song; returns how many were removed
pub fn clear_playlist(conn: &Connection, user_id: i64) -> DbResult<usize> {
    Ok(conn.execute(
        "DELETE FROM playlist_items
         WHERE playlist_id IN (SELECT id FROM playlists WHERE user_id = ?)",
        [user_id],
    )?)
}
