//! Serialization boundary for the persisted marker collection.
//!
//! # Responsibility
//! - Encode the full collection into the UTF-8 JSON slot payload.
//! - Decode slot payloads and reject anything that breaks collection
//!   invariants.
//!
//! # Invariants
//! - `decode_markers(&encode_markers(c)?)? == c` for every valid collection.
//! - Decoded collections have pairwise distinct ids and valid fields.

use crate::model::marker::{Marker, MarkerId, MarkerValidationError};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure while converting between markers and slot bytes.
#[derive(Debug)]
pub enum CodecError {
    /// Payload is not JSON of the expected shape (or could not be written).
    Json(serde_json::Error),
    /// An element decoded but violates a field invariant.
    InvalidMarker {
        id: MarkerId,
        reason: MarkerValidationError,
    },
    /// Two elements share the same id.
    DuplicateId(MarkerId),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed marker payload: {err}"),
            Self::InvalidMarker { id, reason } => {
                write!(f, "invalid persisted marker {id}: {reason}")
            }
            Self::DuplicateId(id) => write!(f, "duplicate marker id {id} in payload"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidMarker { reason, .. } => Some(reason),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Serializes the whole collection as a JSON array.
pub fn encode_markers(markers: &[Marker]) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(markers)?)
}

/// Parses a slot payload back into a collection, preserving order.
pub fn decode_markers(bytes: &[u8]) -> Result<Vec<Marker>, CodecError> {
    let markers: Vec<Marker> = serde_json::from_slice(bytes)?;
    check_collection(&markers)?;
    Ok(markers)
}

/// Verifies id uniqueness and per-marker field invariants.
fn check_collection(markers: &[Marker]) -> Result<(), CodecError> {
    let mut seen = HashSet::with_capacity(markers.len());
    for marker in markers {
        marker
            .validate()
            .map_err(|reason| CodecError::InvalidMarker {
                id: marker.id,
                reason,
            })?;
        if !seen.insert(marker.id) {
            return Err(CodecError::DuplicateId(marker.id));
        }
    }
    Ok(())
}
