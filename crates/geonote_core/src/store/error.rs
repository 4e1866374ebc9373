use crate::model::collection::CodecError;
use crate::model::marker::{MarkerId, MarkerValidationError};
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Why the persisted slot could not be turned into a collection.
#[derive(Debug)]
pub enum ReadError {
    /// The adapter itself failed; the snapshot was left untouched.
    Backend(StorageError),
    /// The slot holds bytes that are not a valid marker collection.
    Malformed(CodecError),
}

impl Display for ReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "{err}"),
            Self::Malformed(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::Malformed(err) => Some(err),
        }
    }
}

/// Error returned by marker store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Rejected editor input. No state changed.
    Validation(MarkerValidationError),
    /// Target marker does not exist in the current snapshot.
    NotFound(MarkerId),
    /// Loading the persisted slot failed.
    StorageRead(ReadError),
    /// Persisting the collection failed. The snapshot was not changed.
    StorageWrite(StorageError),
    /// The collection could not be encoded for persistence.
    Codec(CodecError),
    /// No id above the highest one in use is left. Nothing was written.
    IdsExhausted,
}

impl StoreError {
    /// Returns whether the persisted payload was unreadable (as opposed to
    /// the backend being unavailable).
    pub fn is_malformed_payload(&self) -> bool {
        matches!(self, Self::StorageRead(ReadError::Malformed(_)))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "marker not found: {id}"),
            Self::StorageRead(err) => write!(f, "failed to read markers: {err}"),
            Self::StorageWrite(err) => write!(f, "failed to save markers: {err}"),
            Self::Codec(err) => write!(f, "failed to encode markers: {err}"),
            Self::IdsExhausted => write!(
                f,
                "marker id space exhausted: id {} is already taken",
                MarkerId::MAX
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::StorageRead(err) => Some(err),
            Self::StorageWrite(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::IdsExhausted => None,
        }
    }
}

impl From<MarkerValidationError> for StoreError {
    fn from(value: MarkerValidationError) -> Self {
        Self::Validation(value)
    }
}
