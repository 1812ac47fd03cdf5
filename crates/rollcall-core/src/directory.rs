//! Collaborator interfaces consumed by the admission subsystem.
//!
//! Class and enrollment bookkeeping and attendance persistence live outside
//! the core. The admission service only ever talks to these two traits; the
//! in-process implementation in [`crate::storage`] is one backend, a
//! relational store would be another.

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::Result;
use crate::geofence::GeofenceShape;
use crate::types::{
    AttendanceRecord, AttendanceStatus, ClassId, GeoPoint, NewAttendanceRecord, UserId,
};

/// Lookup interface over class registration data.
///
/// All methods are read-only from the admission path's point of view.
pub trait ClassDirectory: Send + Sync {
    /// Whether the student has a currently active enrollment in the class.
    fn is_enrolled(&self, student_id: UserId, class_id: ClassId) -> Result<bool>;

    /// The class's statically registered beacon id.
    ///
    /// # Errors
    ///
    /// Returns [`RollcallError::ClassNotFound`](crate::RollcallError::ClassNotFound)
    /// when no such class exists.
    fn registered_beacon(&self, class_id: ClassId) -> Result<String>;

    /// The set of beacon UUIDs registered as classroom hardware.
    /// An empty set is a normal outcome, not an error.
    fn registered_beacons(&self, class_id: ClassId) -> Result<HashSet<String>>;

    /// The class's geofence boundary, if one has been registered.
    fn geofence(&self, class_id: ClassId) -> Result<Option<GeofenceShape>>;

    /// Whether the given teacher owns the class.
    fn owns_class(&self, teacher_id: UserId, class_id: ClassId) -> Result<bool>;
}

/// Persistence interface for attendance records.
pub trait AttendanceLog: Send + Sync {
    /// Whether the student already has a record for the class on the given
    /// calendar date.
    fn has_record_on(&self, student_id: UserId, class_id: ClassId, date: NaiveDate)
        -> Result<bool>;

    /// Persist a new attendance record and return it with its assigned id.
    fn insert(&self, record: NewAttendanceRecord) -> Result<AttendanceRecord>;

    /// All records for a class, newest first.
    fn records_for_class(&self, class_id: ClassId) -> Result<Vec<AttendanceRecord>>;

    /// Records for a class on a specific calendar date, newest first.
    fn records_for_class_on(
        &self,
        class_id: ClassId,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>>;

    /// Update status, location, and the manual flag of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`RollcallError::RecordNotFound`](crate::RollcallError::RecordNotFound)
    /// when no record with the given id exists.
    fn update_record(
        &self,
        record_id: Uuid,
        status: AttendanceStatus,
        location: Option<GeoPoint>,
        is_manual: bool,
    ) -> Result<()>;
}
