//! Unified error type for the rollcall core library.
//!
//! Every failure the admission subsystem can produce is one variant of
//! [`RollcallError`]. The transport layer matches on the enum exhaustively;
//! nothing anywhere discriminates on error message text.
//!
//! # Design Principles
//!
//! - **Closed set**: each variant captures exactly one failure mode
//! - **Structured fields**: variants carry the ids needed for debugging
//! - **HTTP-ready**: every variant maps to a status code and an error code

use thiserror::Error;
use uuid::Uuid;

use crate::types::ClassId;

/// The unified error type for all rollcall core operations.
#[derive(Debug, Error)]
pub enum RollcallError {
    // =========================================================================
    // ADMISSION REJECTIONS
    // =========================================================================
    /// The student is not currently enrolled in the class.
    #[error("You are not enrolled in this class")]
    NotEnrolled,

    /// The supplied beacon id does not match the class's registered beacon.
    #[error("Invalid beacon - you are not near the class")]
    BeaconMismatch,

    /// An attendance record for this student, class, and day already exists.
    #[error("Attendance already marked for today")]
    AlreadyMarked,

    // =========================================================================
    // AUTHORIZATION
    // =========================================================================
    /// The caller's role or class ownership does not permit the operation.
    #[error("You are not authorized to perform this action")]
    NotAuthorized,

    /// The supplied role string is not a member of the closed role set.
    #[error("Unknown role: '{0}'. Expected one of 'student', 'teacher', 'admin'.")]
    UnknownRole(String),

    // =========================================================================
    // MISSING CONFIGURATION / RESOURCES
    // =========================================================================
    /// No class with the given id exists.
    #[error("Class {0} not found")]
    ClassNotFound(ClassId),

    /// No attendance record with the given id exists.
    #[error("Attendance record {0} not found")]
    RecordNotFound(Uuid),

    /// The class has no geofence registered, so containment cannot be decided.
    #[error("No geofence configured for class {0}")]
    GeofenceNotConfigured(ClassId),

    /// The registered geofence shape cannot be evaluated.
    #[error("Unsupported geofence shape for class {class_id}: {detail}")]
    UnsupportedShape {
        /// The class whose geofence is malformed.
        class_id: ClassId,
        /// What made the shape unevaluable.
        detail: String,
    },

    // =========================================================================
    // VALIDATION
    // =========================================================================
    /// A date string was not in `YYYY-MM-DD` form.
    #[error("Invalid date: '{0}'. Expected ISO 8601 format 'YYYY-MM-DD'.")]
    InvalidDate(String),

    /// A beacon identifier failed the boundary shape check.
    #[error("Invalid beacon id: '{0}'")]
    InvalidBeaconId(String),

    // =========================================================================
    // CONFIGURATION & PERSISTENCE
    // =========================================================================
    /// The configuration file exists but could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// An error occurred while persisting or reading directory data.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for rollcall core operations.
pub type Result<T> = std::result::Result<T, RollcallError>;

impl RollcallError {
    /// Returns `true` if this error is a role or ownership rejection.
    #[inline]
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotAuthorized | Self::NotEnrolled)
    }

    /// Returns `true` if this error reports a missing resource or
    /// configuration.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ClassNotFound(_) | Self::RecordNotFound(_) | Self::GeofenceNotConfigured(_)
        )
    }

    /// Returns `true` if this error is a user-facing conflict rather than a
    /// system failure.
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyMarked)
    }

    /// Returns `true` if this error reports malformed input.
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate(_)
                | Self::InvalidBeaconId(_)
                | Self::UnknownRole(_)
                | Self::UnsupportedShape { .. }
        )
    }

    /// Returns `true` if retrying the operation may succeed. Only storage
    /// failures qualify; rejections and validation errors are final.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_))
    }

    /// Returns an HTTP-appropriate status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::InvalidDate(_)
            | Self::InvalidBeaconId(_)
            | Self::UnknownRole(_)
            | Self::UnsupportedShape { .. } => 400,

            // 403 Forbidden - understood but refused
            Self::NotEnrolled | Self::BeaconMismatch | Self::NotAuthorized => 403,

            // 404 Not Found
            Self::ClassNotFound(_) | Self::RecordNotFound(_) | Self::GeofenceNotConfigured(_) => {
                404
            }

            // 409 Conflict - duplicate daily record
            Self::AlreadyMarked => 409,

            // 500 Internal Server Error
            Self::ConfigParse(_) | Self::Storage(_) | Self::Io(_) => 500,
        }
    }

    /// Returns a machine-readable error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotEnrolled => "not_enrolled",
            Self::BeaconMismatch => "beacon_mismatch",
            Self::AlreadyMarked => "already_marked",
            Self::NotAuthorized => "not_authorized",
            Self::UnknownRole(_) => "unknown_role",
            Self::ClassNotFound(_) => "class_not_found",
            Self::RecordNotFound(_) => "record_not_found",
            Self::GeofenceNotConfigured(_) => "geofence_not_configured",
            Self::UnsupportedShape { .. } => "unsupported_shape",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidBeaconId(_) => "invalid_beacon_id",
            Self::ConfigParse(_) => "config_parse_error",
            Self::Storage(_) => "storage_error",
            Self::Io(_) => "io_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoErr, ErrorKind};

    #[test]
    fn test_admission_rejection_status_codes() {
        assert_eq!(RollcallError::NotEnrolled.http_status_code(), 403);
        assert_eq!(RollcallError::BeaconMismatch.http_status_code(), 403);
        assert_eq!(RollcallError::AlreadyMarked.http_status_code(), 409);
    }

    #[test]
    fn test_not_found_classification() {
        assert!(RollcallError::ClassNotFound(7).is_not_found());
        assert!(RollcallError::GeofenceNotConfigured(7).is_not_found());
        assert!(RollcallError::RecordNotFound(Uuid::nil()).is_not_found());
        assert!(!RollcallError::AlreadyMarked.is_not_found());
    }

    #[test]
    fn test_validation_classification() {
        assert!(RollcallError::InvalidDate("yesterday".into()).is_validation());
        assert!(RollcallError::UnknownRole("root".into()).is_validation());
        assert!(RollcallError::UnsupportedShape {
            class_id: 1,
            detail: "polygon with 2 vertices".into()
        }
        .is_validation());
        assert!(!RollcallError::NotEnrolled.is_validation());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(RollcallError::Storage("disk full".into()).is_retryable());
        assert!(RollcallError::Io(IoErr::new(ErrorKind::Other, "x")).is_retryable());
        assert!(!RollcallError::AlreadyMarked.is_retryable());
        assert!(!RollcallError::BeaconMismatch.is_retryable());
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(RollcallError::NotEnrolled.error_code(), "not_enrolled");
        assert_eq!(RollcallError::AlreadyMarked.error_code(), "already_marked");
        assert_eq!(
            RollcallError::GeofenceNotConfigured(3).error_code(),
            "geofence_not_configured"
        );
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<RollcallError>();
        assert_sync::<RollcallError>();
    }
}
