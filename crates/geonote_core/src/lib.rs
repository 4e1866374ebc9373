//! Core domain logic for GeoNote.
//! This crate is the single source of truth for marker invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::collection::{decode_markers, encode_markers, CodecError};
pub use model::marker::{Coordinate, Marker, MarkerId, MarkerValidationError};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use store::{
    MarkerEvent, MarkerStore, ReadError, StoreConfig, StoreError, StoreResult, DEFAULT_SLOT_KEY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
