//! API error types and response handling.
//!
//! One unified error type for all handlers, converted from the core error
//! enum by exhaustive match and rendered as a consistent JSON envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rollcall_core::RollcallError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type.
///
/// Each variant maps to one HTTP status code and produces the standard
/// JSON error response.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// 400 Bad Request - invalid input from the client.
    BadRequest {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 401 Unauthorized - missing or garbled caller identity.
    Unauthenticated {
        /// Human-readable error message.
        message: String,
    },

    /// 403 Forbidden - the caller is known but the operation is refused.
    Forbidden {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 404 Not Found - resource or required configuration missing.
    NotFound {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 409 Conflict - the operation clashes with current state.
    Conflict {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 500 Internal Server Error.
    Internal {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },
}

/// Standard JSON error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "beacon_mismatch",
    "message": "Invalid beacon - you are not near the class"
}))]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "already_marked").
    #[schema(example = "beacon_mismatch")]
    pub error: String,

    /// Human-readable error message.
    #[schema(example = "Invalid beacon - you are not near the class")]
    pub message: String,
}

impl ApiError {
    fn parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            Self::BadRequest {
                error_code,
                message,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: error_code,
                    message,
                },
            ),
            Self::Unauthenticated { message } => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: "unauthenticated".to_string(),
                    message,
                },
            ),
            Self::Forbidden {
                error_code,
                message,
            } => (
                StatusCode::FORBIDDEN,
                ErrorResponse {
                    error: error_code,
                    message,
                },
            ),
            Self::NotFound {
                error_code,
                message,
            } => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: error_code,
                    message,
                },
            ),
            Self::Conflict {
                error_code,
                message,
            } => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: error_code,
                    message,
                },
            ),
            Self::Internal {
                error_code,
                message,
            } => {
                tracing::error!(error_code = %error_code, message = %message, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: error_code,
                        message,
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest { message, .. } => write!(f, "Bad Request: {message}"),
            Self::Unauthenticated { message } => write!(f, "Unauthorized: {message}"),
            Self::Forbidden { message, .. } => write!(f, "Forbidden: {message}"),
            Self::NotFound { message, .. } => write!(f, "Not Found: {message}"),
            Self::Conflict { message, .. } => write!(f, "Conflict: {message}"),
            Self::Internal { message, .. } => write!(f, "Internal Error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Convert core errors by exhaustive match on the closed variant set.
/// No branch inspects message text.
impl From<RollcallError> for ApiError {
    fn from(err: RollcallError) -> Self {
        let error_code = err.error_code().to_string();
        let message = err.to_string();

        match &err {
            RollcallError::InvalidDate(_)
            | RollcallError::InvalidBeaconId(_)
            | RollcallError::UnknownRole(_)
            | RollcallError::UnsupportedShape { .. } => Self::BadRequest {
                error_code,
                message,
            },

            RollcallError::NotEnrolled
            | RollcallError::BeaconMismatch
            | RollcallError::NotAuthorized => Self::Forbidden {
                error_code,
                message,
            },

            RollcallError::ClassNotFound(_)
            | RollcallError::RecordNotFound(_)
            | RollcallError::GeofenceNotConfigured(_) => Self::NotFound {
                error_code,
                message,
            },

            RollcallError::AlreadyMarked => Self::Conflict {
                error_code,
                message,
            },

            RollcallError::ConfigParse(_)
            | RollcallError::Storage(_)
            | RollcallError::Io(_) => Self::Internal {
                error_code,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_from_core_errors() {
        let cases: Vec<(RollcallError, StatusCode)> = vec![
            (RollcallError::NotEnrolled, StatusCode::FORBIDDEN),
            (RollcallError::BeaconMismatch, StatusCode::FORBIDDEN),
            (RollcallError::AlreadyMarked, StatusCode::CONFLICT),
            (RollcallError::ClassNotFound(1), StatusCode::NOT_FOUND),
            (
                RollcallError::GeofenceNotConfigured(1),
                StatusCode::NOT_FOUND,
            ),
            (
                RollcallError::InvalidDate("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                RollcallError::Storage("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (core_err, expected) in cases {
            let (status, _) = ApiError::from(core_err).parts();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_error_code_survives_conversion() {
        let (_, body) = ApiError::from(RollcallError::AlreadyMarked).parts();
        assert_eq!(body.error, "already_marked");
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse {
            error: "not_enrolled".to_string(),
            message: "You are not enrolled in this class".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("not_enrolled"));
    }
}
