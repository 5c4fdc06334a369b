//! Tracker error types with HTTP status code mapping.
//!
//! [`TrackerError`] is what every service call and handler returns. Each
//! variant maps to a numeric code, an HTTP status and the structured JSON
//! error body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ValidationError;
use crate::persistence::StorageError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "device not found: 7"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Field the error refers to, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Boundary error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                  |
/// |-----------|---------------------|------------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request              |
/// | 2000–2999 | Not Found/Conflict  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server              | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// A field failed shape or enum validation.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The request body or query string could not be decoded.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Device with the given id was not found.
    #[error("device not found: {0}")]
    DeviceNotFound(i64),

    /// Alert with the given id was not found.
    #[error("alert not found: {0}")]
    AlertNotFound(i64),

    /// User with the given id or username was not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// An alert referenced a device that does not exist.
    #[error("related device not found: {0}")]
    RelatedDeviceNotFound(i64),

    /// Another user already holds the requested username.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Storage layer failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::MalformedRequest(_) => 1002,
            Self::DeviceNotFound(_) => 2001,
            Self::AlertNotFound(_) => 2002,
            Self::UserNotFound(_) => 2003,
            Self::RelatedDeviceNotFound(_) => 2004,
            Self::UsernameTaken(_) => 2005,
            Self::Internal(_) => 3000,
            Self::Storage(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::DeviceNotFound(_)
            | Self::AlertNotFound(_)
            | Self::UserNotFound(_)
            | Self::RelatedDeviceNotFound(_) => StatusCode::NOT_FOUND,
            Self::UsernameTaken(_) => StatusCode::CONFLICT,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Validation(e) => Some(e.field.clone()),
            _ => None,
        }
    }
}

impl From<JsonRejection> for TrackerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for TrackerError {
    fn from(rejection: QueryRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for TrackerError {
    fn from(rejection: PathRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_their_ranges() {
        let cases = [
            (TrackerError::Validation(ValidationError::new("name", "must not be empty")), 400),
            (TrackerError::MalformedRequest("bad json".to_string()), 400),
            (TrackerError::DeviceNotFound(1), 404),
            (TrackerError::AlertNotFound(1), 404),
            (TrackerError::UserNotFound("7".to_string()), 404),
            (TrackerError::RelatedDeviceNotFound(999), 404),
            (TrackerError::UsernameTaken("admin".to_string()), 409),
            (TrackerError::Internal("boom".to_string()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err}");
            let range = match status {
                400 => 1000..2000,
                404 | 409 => 2000..3000,
                _ => 3000..4000,
            };
            assert!(range.contains(&err.error_code()), "{err}");
        }
    }

    #[test]
    fn missing_device_and_missing_related_device_differ() {
        assert_ne!(
            TrackerError::DeviceNotFound(5).error_code(),
            TrackerError::RelatedDeviceNotFound(5).error_code()
        );
    }

    #[test]
    fn storage_faults_are_server_errors() {
        let err = TrackerError::from(StorageError::Corrupt {
            table: "devices",
            reason: "bad status".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn response_carries_status() {
        let response = TrackerError::AlertNotFound(3).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            TrackerError::Validation(ValidationError::new("message", "too short")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
