//! Repository layer for SQLite persistence.
//!
//! The database is a serialization target for the in-memory [`Registry`],
//! not a live store: saving rewrites every row, loading rebuilds the whole
//! hierarchy. All access is synchronous rusqlite on the calling thread.
//!
//! [`Registry`]: crate::registry::Registry

mod registry;

pub use registry::RegistryRepository;

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::Connection;
use thiserror::Error;

use crate::models::DATE_FORMAT;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Open a connection with foreign keys enforced.
pub(crate) fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(conn)
}

/// Parse a `dd.mm.yyyy` date string from the database.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}
