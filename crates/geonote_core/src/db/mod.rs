//! SQLite bootstrap for the durable key-value backend.
//!
//! # Responsibility
//! - Open and configure SQLite connections used by `SqliteKeyValueStore`.
//! - Create the slot table in a versioned, deterministic way.
//!
//! # Invariants
//! - Bootstrap version is tracked via `PRAGMA user_version`.
//! - Slots must not be read or written before bootstrap succeeds.
//! - Only the slot table is versioned; slot payloads are opaque here.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Slot operation issued against the `kv_slots` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOp {
    Read,
    Write,
    Delete,
}

impl SlotOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug)]
pub enum DbError {
    /// Opening or bootstrapping the slot database failed.
    Sqlite(rusqlite::Error),
    /// A statement against one slot failed.
    Slot {
        op: SlotOp,
        key: String,
        source: rusqlite::Error,
    },
    /// The file was bootstrapped by a newer binary.
    NewerSlotVersion { found: u32, supported: u32 },
}

impl DbError {
    /// Returns the slot key when the failure is tied to one slot.
    pub fn slot_key(&self) -> Option<&str> {
        match self {
            Self::Slot { key, .. } => Some(key.as_str()),
            Self::Sqlite(_) | Self::NewerSlotVersion { .. } => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "slot database: {err}"),
            Self::Slot { op, key, source } => {
                write!(f, "slot `{key}` {} failed: {source}", op.as_str())
            }
            Self::NewerSlotVersion { found, supported } => write!(
                f,
                "slot database version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Slot { source: err, .. } => Some(err),
            Self::NewerSlotVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
