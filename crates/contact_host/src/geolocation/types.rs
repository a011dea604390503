//! Position, permission, and sensor-error models.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timeout applied to one-shot requests and continuous observation unless configured otherwise.
pub const DEFAULT_POSITION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Platform permission state for the geolocation capability.
pub enum PermissionState {
    /// Access is allowed.
    Granted,
    /// The platform will ask the user on the next request.
    Prompt,
    /// Access is refused.
    Denied,
}

impl PermissionState {
    /// Returns the stable wire token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Prompt => "prompt",
            Self::Denied => "denied",
        }
    }

    /// Parses a platform permission token.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "granted" => Some(Self::Granted),
            "prompt" => Some(Self::Prompt),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Closed vocabulary reported to the UI for sensor failures.
pub enum SensorErrorCode {
    /// The user or platform refused location access.
    PermissionDenied,
    /// No position could be determined.
    PositionUnavailable,
    /// The request exceeded its timeout.
    Timeout,
    /// Any other failure.
    Unknown,
}

impl SensorErrorCode {
    /// Maps a platform numeric error code into the vocabulary.
    ///
    /// Unrecognized codes map to [`SensorErrorCode::Unknown`].
    pub const fn from_platform_code(code: i32) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unknown,
        }
    }

    /// Returns the stable wire token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::PositionUnavailable => "position_unavailable",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
/// Typed sensor failure.
pub enum SensorError {
    /// Sensor access was refused.
    #[error("location permission denied")]
    PermissionDenied,
    /// The sensor could not produce a position.
    #[error("position unavailable")]
    SensorUnavailable,
    /// The request timed out.
    #[error("position request timed out")]
    SensorTimeout,
    /// Unclassified sensor failure.
    #[error("unknown sensor failure")]
    SensorUnknown,
}

impl SensorError {
    /// Builds a sensor error from a platform numeric code.
    pub const fn from_platform_code(code: i32) -> Self {
        match SensorErrorCode::from_platform_code(code) {
            SensorErrorCode::PermissionDenied => Self::PermissionDenied,
            SensorErrorCode::PositionUnavailable => Self::SensorUnavailable,
            SensorErrorCode::Timeout => Self::SensorTimeout,
            SensorErrorCode::Unknown => Self::SensorUnknown,
        }
    }

    /// Returns the UI-facing vocabulary code.
    pub const fn code(self) -> SensorErrorCode {
        match self {
            Self::PermissionDenied => SensorErrorCode::PermissionDenied,
            Self::SensorUnavailable => SensorErrorCode::PositionUnavailable,
            Self::SensorTimeout => SensorErrorCode::Timeout,
            Self::SensorUnknown => SensorErrorCode::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Successful sensor fix.
pub struct PositionFix {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Accuracy radius in the unit reported by the sensor.
    pub accuracy: f64,
}

/// Outcome of one position request or one observation callback.
pub type PositionReading = Result<PositionFix, SensorError>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
/// `PositionUpdated` payload. Coordinates and error are mutually exclusive.
pub struct PositionSample {
    /// Longitude, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Latitude, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Accuracy, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Error code, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SensorErrorCode>,
}

impl PositionSample {
    /// Normalizes a sensor reading into an event payload.
    pub fn from_reading(reading: PositionReading) -> Self {
        match reading {
            Ok(fix) => Self {
                longitude: Some(fix.longitude),
                latitude: Some(fix.latitude),
                accuracy: Some(fix.accuracy),
                error: None,
            },
            Err(err) => Self {
                error: Some(err.code()),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// `GeoLocationPermissionChanged` payload.
pub struct PermissionChange {
    /// Newly entered permission state.
    pub permission: PermissionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Options passed to one-shot and continuous position requests.
pub struct PositionOptions {
    /// Upper bound for a single position acquisition.
    pub timeout: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POSITION_TIMEOUT,
        }
    }
}
