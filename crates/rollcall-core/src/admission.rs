//! Attendance admission orchestration.
//!
//! Combines the collaborators into the two admission protocols:
//!
//! 1. **Mark attendance** - enrollment, then beacon equality against the
//!    class's statically registered beacon, then daily dedup, then insert.
//!    The order is fixed and short-circuiting.
//! 2. **Dual-factor check** - geofence containment AND beacon presence, a
//!    pre-check primitive that never writes a record.
//!
//! It also owns the broadcast session lifecycle and the authorization rule
//! for attendance read and update paths.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::info;
use uuid::Uuid;

use crate::beacon::{is_plausible_beacon_id, BeaconMatcher};
use crate::directory::{AttendanceLog, ClassDirectory};
use crate::error::{Result, RollcallError};
use crate::geofence::GeofenceEvaluator;
use crate::session::SessionStore;
use crate::types::{
    AttendanceRecord, AttendanceStatus, ClassId, GeoPoint, NewAttendanceRecord, Role, UserId,
};

/// The attendance admission service.
///
/// Cloning is cheap; clones share the collaborators and the session store.
#[derive(Clone)]
pub struct AdmissionService {
    directory: Arc<dyn ClassDirectory>,
    log: Arc<dyn AttendanceLog>,
    geofence: GeofenceEvaluator,
    beacons: BeaconMatcher,
    sessions: SessionStore,
    timezone: Tz,
    broadcast_ttl: Duration,
}

impl AdmissionService {
    /// Create the service.
    ///
    /// `timezone` determines which calendar date "today" is for the daily
    /// dedup check and for broadcast session keys. `broadcast_ttl` is how
    /// long a started broadcast stays live.
    pub fn new(
        directory: Arc<dyn ClassDirectory>,
        log: Arc<dyn AttendanceLog>,
        timezone: Tz,
        broadcast_ttl: Duration,
    ) -> Self {
        Self {
            geofence: GeofenceEvaluator::new(Arc::clone(&directory)),
            beacons: BeaconMatcher::new(Arc::clone(&directory)),
            directory,
            log,
            sessions: SessionStore::new(),
            timezone,
            broadcast_ttl,
        }
    }

    /// Today's calendar date in the configured timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    // =========================================================================
    // MARK-ATTENDANCE PROTOCOL
    // =========================================================================

    /// Admit or reject a student's attendance mark.
    ///
    /// Checks run in fixed order, each short-circuiting: enrollment, beacon
    /// equality against the class's *statically registered* beacon, daily
    /// dedup. On success a record with `is_manual = false` is persisted.
    ///
    /// The ephemeral broadcast session is deliberately not consulted here;
    /// it only feeds the session lookup read path.
    ///
    /// # Errors
    ///
    /// [`RollcallError::NotEnrolled`], [`RollcallError::BeaconMismatch`],
    /// [`RollcallError::AlreadyMarked`], [`RollcallError::ClassNotFound`],
    /// or a storage failure.
    pub fn mark_attendance(
        &self,
        student_id: UserId,
        class_id: ClassId,
        status: AttendanceStatus,
        location: Option<GeoPoint>,
        beacon_id: &str,
    ) -> Result<AttendanceRecord> {
        if !self.directory.is_enrolled(student_id, class_id)? {
            return Err(RollcallError::NotEnrolled);
        }

        let expected = self.directory.registered_beacon(class_id)?;
        if expected != beacon_id {
            return Err(RollcallError::BeaconMismatch);
        }

        if self.log.has_record_on(student_id, class_id, self.today())? {
            return Err(RollcallError::AlreadyMarked);
        }

        let record = self.log.insert(NewAttendanceRecord {
            student_id,
            class_id,
            status,
            location,
            is_manual: false,
        })?;

        info!(student_id, class_id, status = ?status, "attendance admitted");
        Ok(record)
    }

    // =========================================================================
    // DUAL-FACTOR VERIFICATION
    // =========================================================================

    /// Combined geofence + beacon presence check.
    ///
    /// Geofence evaluation runs first and its failures propagate; a missing
    /// or malformed geofence is never treated as a pass. The result is true
    /// only when the caller is inside the boundary AND a detected beacon
    /// matches the classroom registry.
    ///
    /// Does not write an attendance record.
    pub fn check_dual_factor(
        &self,
        class_id: ClassId,
        lat: f64,
        lon: f64,
        detected_uuids: &[String],
    ) -> Result<bool> {
        let in_geofence = self.geofence.is_within(class_id, lat, lon)?;
        let beacon_present = self.beacons.is_present(class_id, detected_uuids);
        Ok(in_geofence && beacon_present)
    }

    // =========================================================================
    // BROADCAST SESSIONS
    // =========================================================================

    /// Start (or restart) the beacon broadcast for a class and date.
    ///
    /// The beacon stays live for the configured TTL; starting again before
    /// expiry overwrites the value and resets the clock.
    ///
    /// # Errors
    ///
    /// [`RollcallError::InvalidBeaconId`] when the id fails the boundary
    /// shape check.
    pub fn start_broadcast(
        &self,
        class_id: ClassId,
        date: NaiveDate,
        beacon_id: &str,
    ) -> Result<()> {
        if !is_plausible_beacon_id(beacon_id) {
            return Err(RollcallError::InvalidBeaconId(beacon_id.to_string()));
        }
        self.sessions
            .start(class_id, date, beacon_id.to_string(), self.broadcast_ttl);
        Ok(())
    }

    /// The beacon id currently live for a class and date, if any.
    #[must_use]
    pub fn active_beacon(&self, class_id: ClassId, date: NaiveDate) -> Option<String> {
        self.sessions.get(class_id, date)
    }

    // =========================================================================
    // AUTHORIZED READ & UPDATE PATHS
    // =========================================================================

    /// Full attendance history for a class.
    ///
    /// Admins may read any class; teachers only classes they own; any other
    /// role is rejected.
    pub fn class_attendance(
        &self,
        caller_id: UserId,
        role: Role,
        class_id: ClassId,
    ) -> Result<Vec<AttendanceRecord>> {
        self.authorize_class_access(caller_id, role, class_id)?;
        self.log.records_for_class(class_id)
    }

    /// Attendance for a class on a specific calendar date, same
    /// authorization rule as [`Self::class_attendance`].
    pub fn class_attendance_on(
        &self,
        caller_id: UserId,
        role: Role,
        class_id: ClassId,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        self.authorize_class_access(caller_id, role, class_id)?;
        self.log.records_for_class_on(class_id, date)
    }

    /// Edit an existing attendance record.
    ///
    /// The caller must own the class (teacher) or be an admin.
    pub fn update_record(
        &self,
        caller_id: UserId,
        role: Role,
        class_id: ClassId,
        record_id: Uuid,
        status: AttendanceStatus,
        location: Option<GeoPoint>,
        is_manual: bool,
    ) -> Result<()> {
        self.authorize_class_access(caller_id, role, class_id)?;
        self.log
            .update_record(record_id, status, location, is_manual)?;
        info!(class_id, %record_id, "attendance record updated");
        Ok(())
    }

    fn authorize_class_access(
        &self,
        caller_id: UserId,
        role: Role,
        class_id: ClassId,
    ) -> Result<()> {
        match role {
            Role::Admin => Ok(()),
            Role::Teacher => {
                if self.directory.owns_class(caller_id, class_id)? {
                    Ok(())
                } else {
                    Err(RollcallError::NotAuthorized)
                }
            }
            Role::Student => Err(RollcallError::NotAuthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geofence::GeofenceShape;
    use crate::storage::MemoryDirectory;

    const TEACHER: UserId = 100;
    const STUDENT: UserId = 200;
    const CLASS: ClassId = 7;

    fn seeded_service() -> (Arc<MemoryDirectory>, AdmissionService) {
        let directory = Arc::new(MemoryDirectory::new(chrono_tz::UTC));
        directory.register_class(CLASS, TEACHER, "BEACON-7");
        directory.enroll(STUDENT, CLASS);
        let service = AdmissionService::new(
            Arc::clone(&directory) as Arc<dyn ClassDirectory>,
            Arc::clone(&directory) as Arc<dyn AttendanceLog>,
            chrono_tz::UTC,
            Duration::from_secs(300),
        );
        (directory, service)
    }

    #[test]
    fn test_mark_succeeds_once_then_conflicts() {
        let (_, service) = seeded_service();

        let record = service
            .mark_attendance(STUDENT, CLASS, AttendanceStatus::Present, None, "BEACON-7")
            .unwrap();
        assert!(!record.is_manual);
        assert_eq!(record.class_id, CLASS);

        let err = service
            .mark_attendance(STUDENT, CLASS, AttendanceStatus::Present, None, "BEACON-7")
            .unwrap_err();
        assert!(matches!(err, RollcallError::AlreadyMarked));
    }

    #[test]
    fn test_mark_rejects_unenrolled_student() {
        let (_, service) = seeded_service();
        let err = service
            .mark_attendance(999, CLASS, AttendanceStatus::Present, None, "BEACON-7")
            .unwrap_err();
        assert!(matches!(err, RollcallError::NotEnrolled));
    }

    #[test]
    fn test_mark_rejects_wrong_beacon() {
        let (_, service) = seeded_service();
        let err = service
            .mark_attendance(STUDENT, CLASS, AttendanceStatus::Present, None, "BEACON-8")
            .unwrap_err();
        assert!(matches!(err, RollcallError::BeaconMismatch));
    }

    #[test]
    fn test_mark_enrollment_is_checked_before_beacon() {
        // Unenrolled student with a wrong beacon: the enrollment rejection
        // must win because the checks short-circuit in order.
        let (_, service) = seeded_service();
        let err = service
            .mark_attendance(999, CLASS, AttendanceStatus::Present, None, "WRONG")
            .unwrap_err();
        assert!(matches!(err, RollcallError::NotEnrolled));
    }

    #[test]
    fn test_mark_unknown_class_rejected_at_enrollment() {
        let (directory, service) = seeded_service();
        directory.enroll(STUDENT, 8); // no-op: class 8 does not exist
        let err = service
            .mark_attendance(STUDENT, 8, AttendanceStatus::Present, None, "BEACON-7")
            .unwrap_err();
        assert!(matches!(err, RollcallError::NotEnrolled));
    }

    #[test]
    fn test_dual_factor_concrete_case() {
        let (directory, service) = seeded_service();
        directory.set_geofence(
            CLASS,
            GeofenceShape::Circle {
                center: GeoPoint {
                    latitude: 36.0,
                    longitude: -86.0,
                },
                radius_m: 50.0,
            },
        );
        directory.add_classroom_beacon(CLASS, "ROOM-UUID-1");

        // ~5.5m from center, matching beacon: validated.
        let validated = service
            .check_dual_factor(CLASS, 36.000_05, -86.0, &["ROOM-UUID-1".to_string()])
            .unwrap();
        assert!(validated);

        // Same location, no matching beacon: not validated.
        let validated = service
            .check_dual_factor(CLASS, 36.000_05, -86.0, &["OTHER".to_string()])
            .unwrap();
        assert!(!validated);

        // Outside the circle, matching beacon: not validated.
        let validated = service
            .check_dual_factor(CLASS, 36.01, -86.0, &["ROOM-UUID-1".to_string()])
            .unwrap();
        assert!(!validated);
    }

    #[test]
    fn test_dual_factor_propagates_missing_geofence() {
        let (_, service) = seeded_service();
        let err = service
            .check_dual_factor(CLASS, 36.0, -86.0, &["ROOM-UUID-1".to_string()])
            .unwrap_err();
        assert!(matches!(err, RollcallError::GeofenceNotConfigured(CLASS)));
    }

    #[test]
    fn test_read_authorization_matrix() {
        let (_, service) = seeded_service();

        // Owner teacher and admin succeed.
        assert!(service.class_attendance(TEACHER, Role::Teacher, CLASS).is_ok());
        assert!(service.class_attendance(1, Role::Admin, CLASS).is_ok());

        // Non-owning teacher and students are rejected.
        let err = service
            .class_attendance(101, Role::Teacher, CLASS)
            .unwrap_err();
        assert!(matches!(err, RollcallError::NotAuthorized));
        let err = service
            .class_attendance(STUDENT, Role::Student, CLASS)
            .unwrap_err();
        assert!(matches!(err, RollcallError::NotAuthorized));
    }

    #[test]
    fn test_attendance_on_date_filters() {
        let (_, service) = seeded_service();
        service
            .mark_attendance(STUDENT, CLASS, AttendanceStatus::Present, None, "BEACON-7")
            .unwrap();

        let today = service.today();
        let yesterday = today.pred_opt().unwrap();
        assert_eq!(
            service
                .class_attendance_on(TEACHER, Role::Teacher, CLASS, today)
                .unwrap()
                .len(),
            1
        );
        assert!(service
            .class_attendance_on(TEACHER, Role::Teacher, CLASS, yesterday)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_update_requires_ownership() {
        let (_, service) = seeded_service();
        let record = service
            .mark_attendance(STUDENT, CLASS, AttendanceStatus::Absent, None, "BEACON-7")
            .unwrap();

        let err = service
            .update_record(
                101,
                Role::Teacher,
                CLASS,
                record.id,
                AttendanceStatus::Present,
                None,
                true,
            )
            .unwrap_err();
        assert!(matches!(err, RollcallError::NotAuthorized));

        service
            .update_record(
                TEACHER,
                Role::Teacher,
                CLASS,
                record.id,
                AttendanceStatus::Present,
                None,
                true,
            )
            .unwrap();
        let records = service.class_attendance(TEACHER, Role::Teacher, CLASS).unwrap();
        assert_eq!(records[0].status, AttendanceStatus::Present);
        assert!(records[0].is_manual);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_lifecycle() {
        let (_, service) = seeded_service();
        let date = service.today();

        assert_eq!(service.active_beacon(CLASS, date), None);
        service.start_broadcast(CLASS, date, "LIVE-1").unwrap();
        assert_eq!(service.active_beacon(CLASS, date), Some("LIVE-1".into()));

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(service.active_beacon(CLASS, date), None);
    }

    #[tokio::test]
    async fn test_broadcast_rejects_malformed_beacon_id() {
        let (_, service) = seeded_service();
        let err = service
            .start_broadcast(CLASS, service.today(), "not a beacon id!")
            .unwrap_err();
        assert!(matches!(err, RollcallError::InvalidBeaconId(_)));
    }
}
