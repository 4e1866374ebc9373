//! Marker domain model and its persisted representation.
//!
//! # Responsibility
//! - Define the canonical marker record used by every editor.
//! - Own the JSON encoding of the full marker collection.
//!
//! # Invariants
//! - Every marker is identified by a stable `MarkerId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod collection;
pub mod marker;
