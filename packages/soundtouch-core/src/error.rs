//! Centralized error types for the SoundTouch core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Maps relay errors to HTTP status codes and JSON bodies
//! - Defines the user-facing errors reported by the control client

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::device::DeviceError;
use crate::directory::DirectoryError;
use crate::session::StoreError;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

impl ErrorCode for DeviceError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_, _) => "http_error_status",
            Self::Rejected(_) => "device_rejected",
            Self::Relay(_) => "relay_error",
        }
    }
}

impl ErrorCode for DirectoryError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_) => "http_error_status",
            Self::Payload(_) => "unexpected_payload",
        }
    }
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "store_io_failed",
            Self::Serialization(_) => "store_serialization_failed",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Relay Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by the relay's HTTP endpoints.
#[derive(Debug, Error)]
pub enum RelayError {
    /// `endpoint` or `ip` query parameter missing or empty.
    #[error("Missing parameters: endpoint and ip are required")]
    MissingParameters,

    /// `endpoint` is not an absolute path.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Device could not be reached (connection refused, timeout, bad address).
    #[error("Device unreachable: {0}")]
    DeviceUnreachable(String),

    /// Client sent an invalid or malformed request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns a machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParameters => "missing_parameters",
            Self::InvalidEndpoint(_) => "invalid_endpoint",
            Self::DeviceUnreachable(_) => "device_unreachable",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameters | Self::InvalidEndpoint(_) | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::DeviceUnreachable(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ErrorCode for RelayError {
    fn code(&self) -> &'static str {
        RelayError::code(self)
    }
}

/// Convenient Result alias for relay handlers.
pub type RelayResult<T> = Result<T, RelayError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        let mut response = (status, Json(body)).into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        response
    }
}

impl From<DeviceError> for RelayError {
    fn from(err: DeviceError) -> Self {
        Self::DeviceUnreachable(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Control Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failures of control-client operations.
///
/// `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("Failed to connect. Make sure you're on the same network and the address is correct.")]
    ConnectFailed,

    #[error("Enter a device address to connect")]
    MissingAddress,

    #[error("Not connected to a device")]
    NotConnected,

    #[error("Failed to read device status")]
    StatusFailed,

    #[error("Failed to send command")]
    CommandFailed,

    #[error("Failed to set volume")]
    VolumeFailed,

    #[error("Failed to select preset")]
    PresetSelectFailed,

    #[error("Preset slot must be between 1 and 6 (got {0})")]
    InvalidPresetSlot(u8),

    #[error("No station currently playing to save")]
    NothingPlaying,

    #[error("Failed to save preset")]
    SavePresetFailed,

    #[error("This station has no source or location to play")]
    NotPlayable,

    #[error("Failed to play station")]
    PlayFailed,

    #[error("Failed to play favorite")]
    PlayFavoriteFailed,

    #[error("No station currently playing to add to favorites")]
    NothingToFavorite,

    #[error("Favorite {0} not found")]
    FavoriteNotFound(u64),

    #[error("Search is not available")]
    SearchUnavailable,

    #[error("Enter a station name to search")]
    EmptyQuery,

    #[error("No stations found. Try a different search.")]
    NoStationsFound,

    #[error("Failed to save settings: {0}")]
    Storage(String),
}

impl ErrorCode for ControlError {
    fn code(&self) -> &'static str {
        match self {
            Self::ConnectFailed => "connect_failed",
            Self::MissingAddress => "missing_address",
            Self::NotConnected => "not_connected",
            Self::StatusFailed => "status_failed",
            Self::CommandFailed => "command_failed",
            Self::VolumeFailed => "volume_failed",
            Self::PresetSelectFailed => "preset_select_failed",
            Self::InvalidPresetSlot(_) => "invalid_preset_slot",
            Self::NothingPlaying => "nothing_playing",
            Self::SavePresetFailed => "save_preset_failed",
            Self::NotPlayable => "not_playable",
            Self::PlayFailed => "play_failed",
            Self::PlayFavoriteFailed => "play_favorite_failed",
            Self::NothingToFavorite => "nothing_to_favorite",
            Self::FavoriteNotFound(_) => "favorite_not_found",
            Self::SearchUnavailable => "search_unavailable",
            Self::EmptyQuery => "empty_query",
            Self::NoStationsFound => "no_stations_found",
            Self::Storage(_) => "storage_failed",
        }
    }
}

impl From<StoreError> for ControlError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Convenient Result alias for control-client operations.
pub type ControlResult<T> = Result<T, ControlError>;

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

// Re-export Result type aliases from their defining modules
pub use crate::device::DeviceResult;
pub use crate::directory::DirectoryResult;
pub use crate::session::StoreResult;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameters_maps_to_400() {
        let err = RelayError::MissingParameters;
        assert_eq!(err.code(), "missing_parameters");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn device_error_maps_to_bad_gateway() {
        let err: RelayError = DeviceError::Relay("refused".into()).into();
        assert_eq!(err.code(), "device_unreachable");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn relay_error_response_carries_wildcard_origin() {
        let response = RelayError::InvalidEndpoint("info".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("*"))
        );
    }

    #[test]
    fn control_error_messages_are_user_facing() {
        assert_eq!(
            ControlError::NothingPlaying.to_string(),
            "No station currently playing to save"
        );
        assert_eq!(
            ControlError::NoStationsFound.to_string(),
            "No stations found. Try a different search."
        );
        assert_eq!(ControlError::InvalidPresetSlot(7).code(), "invalid_preset_slot");
    }
}
