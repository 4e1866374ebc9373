//! Marker store use-case layer.
//!
//! # Responsibility
//! - Orchestrate validation, id allocation and full-collection persistence.
//! - Keep editors decoupled from adapter and serialization details.

mod error;
mod ids;
mod marker_store;

pub use error::{ReadError, StoreError, StoreResult};
pub use ids::system_clock_millis;
pub use marker_store::{Clock, MarkerEvent, MarkerStore, StoreConfig, DEFAULT_SLOT_KEY};
