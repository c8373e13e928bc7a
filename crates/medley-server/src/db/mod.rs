//! Account and playlist store.
//!
//! SQLite behind an r2d2 pool. All statements are synchronous; async
//! callers go through [`Database::run`], which moves the work onto the
//! blocking thread pool.

pub mod models;
pub mod playlists;
pub mod schema;
pub mod users;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub use models::*;

/// Path value that selects an in-memory store
pub const MEMORY_PATH: &str = ":memory:";

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Stored data is invalid: {0}")]
    Corrupt(String),

    #[error("Blocking task failed: {0}")]
    Task(String),
}

pub type DbResult<T> = Result<T, DbError>;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// True for UNIQUE/FOREIGN KEY/CHECK failures
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Main database interface with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: Arc<DbPool>,
}

impl Database {
    /// Open the account store named by configuration
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite file, or [`MEMORY_PATH`] for a store
    ///   that lives only as long as the process
    ///
    /// # Returns
    /// A Database with the schema created, or the pool/SQLite error that
    /// prevented opening it
    pub fn open(db_path: &str) -> DbResult<Self> {
        if db_path == MEMORY_PATH {
            Self::new_in_memory()
        } else {
            Self::new(db_path)
        }
    }

    /// Create a file-backed connection pool
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file, created if missing
    ///
    /// # Returns
    /// A Database in WAL mode with foreign keys on and the schema created
    pub fn new<P: AsRef<Path>>(db_path: P) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(8)
            .min_idle(Some(1))
            .build(manager)?;

        let db = Self {
            pool: Arc::new(pool),
        };
        db.init()?;

        Ok(db)
    }

    /// Create an in-memory database.
    ///
    /// Each SQLite `:memory:` connection is its own database, so the pool
    /// holds exactly one connection.
    pub fn new_in_memory() -> DbResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;

        let db = Self {
            pool: Arc::new(pool),
        };
        db.init()?;

        Ok(db)
    }

    fn init(&self) -> DbResult<()> {
        let conn = self.pool.get()?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        schema::create_tables(&conn)?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> DbResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Execute a function with a connection, enabling foreign keys
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.conn()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        f(&conn)
    }

    /// Execute a function within a transaction
    pub fn transaction<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let mut conn = self.conn()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;

        Ok(result)
    }

    /// Run `f` in a transaction on the blocking thread pool
    ///
    /// # Returns
    /// Whatever `f` returns once committed. A panicking or cancelled task
    /// surfaces as [`DbError::Task`].
    pub async fn run<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.transaction(f))
            .await
            .map_err(|e| DbError::Task(e.to_string()))?
    }
}
