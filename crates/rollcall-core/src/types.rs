//! Shared domain types.
//!
//! Identifier aliases, the closed role and status enums, and the attendance
//! record shape used by both the admission service and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RollcallError;

/// Identifier of a registered class.
pub type ClassId = i64;

/// Identifier of a user (student, teacher, or admin).
pub type UserId = i64;

/// Caller role, resolved by the authentication layer before a request
/// reaches the core.
///
/// The role is validated into this closed enum exactly once, at the
/// transport boundary. Core code matches on it exhaustively and never
/// sees a raw role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May mark their own attendance in classes they are enrolled in.
    Student,
    /// May manage broadcasts and attendance for classes they own.
    Teacher,
    /// May view and edit attendance for any class.
    Admin,
}

impl Role {
    /// Whether this role is allowed to read or edit class attendance at all.
    /// Ownership of the specific class is checked separately for teachers.
    #[must_use]
    pub fn can_manage_attendance(self) -> bool {
        matches!(self, Self::Teacher | Self::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "admin" => Ok(Self::Admin),
            other => Err(RollcallError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        };
        f.write_str(s)
    }
}

/// Attendance status recorded for a student on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// Student was present.
    Present,
    /// Student was absent.
    Absent,
    /// Student arrived late.
    Late,
}

/// A GPS coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "latitude": 36.0, "longitude": -86.0 }))]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    #[schema(example = 36.0)]
    pub latitude: f64,

    /// Longitude in decimal degrees.
    #[schema(example = -86.0)]
    pub longitude: f64,
}

/// A saved attendance record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    /// Unique record identifier.
    pub id: Uuid,

    /// The student this record belongs to.
    pub student_id: UserId,

    /// The class the attendance was marked for.
    pub class_id: ClassId,

    /// Recorded status.
    pub status: AttendanceStatus,

    /// When the record was created (UTC).
    pub recorded_at: DateTime<Utc>,

    /// Whether the record was entered or edited manually by a teacher,
    /// as opposed to admitted through the beacon check.
    pub is_manual: bool,

    /// Location reported by the student's device, if any.
    pub location: Option<GeoPoint>,
}

/// Fields needed to insert a new attendance record.
#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    /// The student marking attendance.
    pub student_id: UserId,

    /// The class being attended.
    pub class_id: ClassId,

    /// Status supplied with the request.
    pub status: AttendanceStatus,

    /// Reported device location, if any.
    pub location: Option<GeoPoint>,

    /// True only for records entered by a teacher.
    pub is_manual: bool,
}
