//! Geolocation outcomes reported by the browser alongside an analysis upload.
//!
//! A failed lookup never blocks analysis: it turns into an advisory notice and
//! the prompt falls back to general environmental advice.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns `None` for non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Coordinates {
            latitude,
            longitude,
        })
    }
}

/// Failure categories of the browser Geolocation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unsupported,
    #[serde(other)]
    Unknown,
}

impl GeolocationError {
    pub fn message(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Location access denied. Please enable it in your browser settings."
            }
            GeolocationError::PositionUnavailable => "Location information is unavailable.",
            GeolocationError::Timeout => "The request to get user location timed out.",
            GeolocationError::Unsupported => "Geolocation is not supported by your browser.",
            GeolocationError::Unknown => "Failed to retrieve location.",
        }
    }

    /// Parses the client's error code; unrecognized codes map to `Unknown`.
    pub fn from_code(code: &str) -> Self {
        serde_json::from_value(serde_json::Value::String(code.trim().to_ascii_lowercase()))
            .unwrap_or(GeolocationError::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationOutcome {
    Located(Coordinates),
    Failed(GeolocationError),
    NotProvided,
}

impl LocationOutcome {
    /// Coordinates win over an error code; an error code wins over nothing.
    pub fn resolve(coordinates: Option<Coordinates>, error: Option<GeolocationError>) -> Self {
        match (coordinates, error) {
            (Some(coords), _) => LocationOutcome::Located(coords),
            (None, Some(err)) => LocationOutcome::Failed(err),
            (None, None) => LocationOutcome::NotProvided,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            LocationOutcome::Located(coords) => Some(*coords),
            _ => None,
        }
    }

    /// Advisory shown next to the analysis when the lookup failed.
    pub fn notice(&self) -> Option<String> {
        match self {
            LocationOutcome::Failed(err) => Some(format!(
                "Note: {} Providing general environmental advice.",
                err.message()
            )),
            _ => None,
        }
    }
}
