//! Repository layer: ledger store and collaborator stand-ins.
//!
//! # Responsibility
//! - Define the ledger store contract used by the lifecycle engine.
//! - Keep SQLite query details out of the service layer.
//! - Provide SQLite-backed menu and user lookups for the collaborator
//!   boundary.
//!
//! # Invariants
//! - Every ledger mutation goes through `LedgerStore::write`, which holds the
//!   database write lock from first read to commit.
//! - Read paths reject corrupt persisted rows instead of masking them.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod ledger_repo;
pub mod menu_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-level failure. Never a business-rule rejection.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Targeted write found no row for the id.
    NotFound(Uuid),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_stored_date(value: &str, column: &str) -> RepoResult<chrono::NaiveDate> {
    crate::model::calendar::parse_date(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid date value `{value}` in {column}")))
}
