//! Marker domain model.
//!
//! # Responsibility
//! - Define the canonical geotagged note record shared by map and list views.
//! - Own field-level validation for marker text and coordinates.
//!
//! # Invariants
//! - `id` is stable and never reused for another marker.
//! - `id` and `coordinate` never change after creation.
//! - `title` and `description` are stored trimmed and non-empty.
//! - Coordinates are finite so the JSON payload round-trips losslessly.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of a marker.
///
/// Derived from the creation timestamp in Unix epoch milliseconds, then
/// bumped forward when needed to stay unique.
pub type MarkerId = i64;

/// Geographic position picked on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns whether both components can be represented in JSON.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Field validation failure for marker input.
///
/// `Display` output is user-facing and may be shown verbatim by editors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerValidationError {
    EmptyTitle,
    EmptyDescription,
    NonFiniteCoordinate { latitude: f64, longitude: f64 },
}

impl Display for MarkerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::NonFiniteCoordinate {
                latitude,
                longitude,
            } => write!(
                f,
                "coordinate must be finite, got ({latitude}, {longitude})"
            ),
        }
    }
}

impl Error for MarkerValidationError {}

/// Geotagged note persisted by the marker store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub coordinate: Coordinate,
    pub title: String,
    pub description: String,
}

impl Marker {
    /// Builds a marker from raw editor input.
    ///
    /// Title and description are trimmed before the emptiness check, and the
    /// trimmed values are what gets stored.
    ///
    /// # Errors
    /// - `EmptyTitle` / `EmptyDescription` when a field is blank after trim.
    /// - `NonFiniteCoordinate` when latitude or longitude is NaN or infinite.
    pub(crate) fn from_input(
        id: MarkerId,
        coordinate: Coordinate,
        title: &str,
        description: &str,
    ) -> Result<Self, MarkerValidationError> {
        validate_coordinate(coordinate)?;
        let (title, description) = normalize_text_fields(title, description)?;
        Ok(Self {
            id,
            coordinate,
            title,
            description,
        })
    }

    /// Checks the field invariants of an already-built marker.
    ///
    /// Used on read paths, where persisted data may have been tampered with.
    pub fn validate(&self) -> Result<(), MarkerValidationError> {
        validate_coordinate(self.coordinate)?;
        if self.title.trim().is_empty() {
            return Err(MarkerValidationError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(MarkerValidationError::EmptyDescription);
        }
        Ok(())
    }
}

/// Trims title and description and rejects blank values.
///
/// Title is checked first, so a call with both fields blank reports
/// `EmptyTitle`.
pub fn normalize_text_fields(
    title: &str,
    description: &str,
) -> Result<(String, String), MarkerValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(MarkerValidationError::EmptyTitle);
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(MarkerValidationError::EmptyDescription);
    }
    Ok((title.to_string(), description.to_string()))
}

fn validate_coordinate(coordinate: Coordinate) -> Result<(), MarkerValidationError> {
    if coordinate.is_finite() {
        Ok(())
    } else {
        Err(MarkerValidationError::NonFiniteCoordinate {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_text_fields, Coordinate, Marker, MarkerValidationError};

    #[test]
    fn from_input_trims_text_fields() {
        let marker = Marker::from_input(
            7,
            Coordinate::new(47.2, 38.9),
            "  Home ",
            "\tMy place\n",
        )
        .expect("valid input");
        assert_eq!(marker.title, "Home");
        assert_eq!(marker.description, "My place");
    }

    #[test]
    fn blank_title_is_reported_before_blank_description() {
        assert_eq!(
            normalize_text_fields(" ", " "),
            Err(MarkerValidationError::EmptyTitle)
        );
    }

    #[test]
    fn nan_coordinate_is_rejected() {
        let err = Marker::from_input(1, Coordinate::new(f64::NAN, 0.0), "a", "b")
            .expect_err("NaN must be rejected");
        assert!(matches!(
            err,
            MarkerValidationError::NonFiniteCoordinate { .. }
        ));
    }
}
