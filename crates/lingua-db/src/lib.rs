//! SQLite store for users and their practice messages.

pub mod migrations;
pub mod models;
pub mod queries;

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use tracing::info;

pub use queries::is_unique_violation;

/// One connection shared by all handlers; callers serialize on the mutex.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens or creates the file at `path` and ensures both tables exist.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        // messages.user_id must point at an existing user
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Lingua database ready at {}", path.display());
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow!("database mutex poisoned: {}", e))?;
        f(&conn)
    }
}
