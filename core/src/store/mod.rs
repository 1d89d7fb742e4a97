//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Ledgers call store methods and never execute SQL directly.
//! Every mutating write runs in its own transaction, so a reader never
//! sees a half-written record.

mod mention;
mod names;
mod timeout;

use crate::error::BotResult;
use rusqlite::Connection;

pub struct BotStore {
    conn: Connection,
}

impl BotStore {
    pub fn open(path: &str) -> BotResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        log::debug!("store opened at {path}");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> BotResult<Self> {
        let conn = Connection::open(":memory:")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> BotResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }
}

/// Unix seconds back to a timestamp; out-of-range values surface as a
/// conversion error on `column`.
fn timestamp_from_secs(column: usize, secs: i64) -> rusqlite::Result<crate::types::Timestamp> {
    chrono::DateTime::from_timestamp(secs, 0)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, secs))
}
