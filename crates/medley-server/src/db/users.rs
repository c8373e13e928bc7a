//! User and session operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{is_constraint_violation, DbError, DbResult, Session, User};

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
        salt: row.get("salt")?,
        created_at: row.get("created_at")?,
    })
}

/// Insert a new user. A taken username (case-insensitive) is a
/// [`DbError::Constraint`].
pub fn create_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    salt: &str,
    now: i64,
) -> DbResult<User> {
    match conn.execute(
        "INSERT INTO users (username, password_hash, salt, created_at) VALUES (?, ?, ?, ?)",
        params![username, password_hash, salt, now],
    ) {
        Ok(_) => Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            salt: salt.to_string(),
            created_at: now,
        }),
        Err(e) if is_constraint_violation(&e) => {
            Err(DbError::Constraint(format!("Username '{}' is already taken", username)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Look up a user by name (case-insensitive)
pub fn get_user_by_username(conn: &Connection, username: &str) -> DbResult<Option<User>> {
    Ok(conn
        .query_row(
            "SELECT id, username, password_hash, salt, created_at FROM users WHERE username = ?",
            [username],
            user_from_row,
        )
        .optional()?)
}

pub fn create_session(conn: &Connection, session: &Session, now: i64) -> DbResult<()> {
    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        params![session.token, session.user_id, now, session.expires_at],
    )?;
    Ok(())
}

/// Resolve a token to its user. Unknown and expired tokens give `None`;
/// an expired session is removed on the way.
pub fn get_session_user(conn: &Connection, token: &str, now: i64) -> DbResult<Option<User>> {
    let row = conn
        .query_row(
            "SELECT u.id, u.username, u.password_hash, u.salt, u.created_at, s.expires_at
             FROM sessions s
             JOIN users u ON s.user_id = u.id
             WHERE s.token = ?",
            [token],
            |row| Ok((user_from_row(row)?, row.get::<_, i64>("expires_at")?)),
        )
        .optional()?;

    match row {
        Some((user, expires_at)) if expires_at > now => Ok(Some(user)),
        Some(_) => {
            delete_session(conn, token)?;
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Remove a session. Returns whether a row was deleted.
pub fn delete_session(conn: &Connection, token: &str) -> DbResult<bool> {
    let deleted = conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
    Ok(deleted > 0)
}

/// Drop every session that expired at or before `now`
pub fn purge_expired_sessions(conn: &Connection, now: i64) -> DbResult<usize> {
    Ok(conn.execute("DELETE FROM sessions WHERE expires_at <= ?", [now])?)
}
