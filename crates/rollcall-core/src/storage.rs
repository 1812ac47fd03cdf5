//! In-process directory backend.
//!
//! Implements both collaborator traits over a lock-guarded data set, with an
//! optional JSON snapshot on disk so class registration and attendance
//! records survive a restart. This backend stands in for a relational store;
//! the admission service only sees the traits.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::directory::{AttendanceLog, ClassDirectory};
use crate::error::{Result, RollcallError};
use crate::geofence::GeofenceShape;
use crate::types::{
    AttendanceRecord, AttendanceStatus, ClassId, GeoPoint, NewAttendanceRecord, UserId,
};

/// Registration data held for one class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntry {
    /// The teacher who owns the class.
    pub teacher_id: UserId,

    /// The statically registered beacon id students mark against.
    pub beacon_id: String,

    /// Registered geofence boundary, if any.
    pub geofence: Option<GeofenceShape>,

    /// UUIDs of beacon hardware installed in the classroom.
    pub classroom_beacons: HashSet<String>,

    /// Students with a currently active enrollment.
    pub enrolled: HashSet<UserId>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DirectoryData {
    classes: HashMap<ClassId, ClassEntry>,
    records: Vec<AttendanceRecord>,
}

/// Get the default data directory for snapshots.
///
/// On Linux deployments: `/var/lib/rollcall/`.
/// Elsewhere: the platform data dir for development.
pub fn default_data_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        Ok(PathBuf::from("/var/lib/rollcall"))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let dirs = directories::ProjectDirs::from("", "", "rollcall").ok_or_else(|| {
            RollcallError::Storage("cannot determine data directory".to_string())
        })?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Lock-guarded class directory and attendance log.
#[derive(Debug)]
pub struct MemoryDirectory {
    data: RwLock<DirectoryData>,
    timezone: Tz,
    snapshot_path: Option<PathBuf>,
}

impl MemoryDirectory {
    /// Create an empty directory with no snapshot persistence.
    ///
    /// The timezone determines which calendar date an attendance timestamp
    /// falls on for the daily dedup check.
    #[must_use]
    pub fn new(timezone: Tz) -> Self {
        Self {
            data: RwLock::new(DirectoryData::default()),
            timezone,
            snapshot_path: None,
        }
    }

    /// Create a directory backed by a JSON snapshot file.
    ///
    /// Loads existing data if the file is present; every mutation rewrites
    /// the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing snapshot cannot be read or parsed.
    pub fn with_snapshot(timezone: Tz, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|err| {
                RollcallError::Storage(format!(
                    "failed to parse snapshot {}: {err}",
                    path.display()
                ))
            })?
        } else {
            DirectoryData::default()
        };

        let directory = Self {
            data: RwLock::new(data),
            timezone,
            snapshot_path: Some(path),
        };
        {
            let data = directory.data.read().expect("directory lock poisoned");
            info!(
                classes = data.classes.len(),
                records = data.records.len(),
                "directory snapshot loaded"
            );
        }
        Ok(directory)
    }

    /// Register a class with its owner and static beacon id, replacing any
    /// previous registration under the same id.
    pub fn register_class(&self, class_id: ClassId, teacher_id: UserId, beacon_id: &str) {
        {
            let mut data = self.data.write().expect("directory lock poisoned");
            data.classes.insert(
                class_id,
                ClassEntry {
                    teacher_id,
                    beacon_id: beacon_id.to_string(),
                    geofence: None,
                    classroom_beacons: HashSet::new(),
                    enrolled: HashSet::new(),
                },
            );
        }
        self.persist();
    }

    /// Enroll a student in a class. No-op for an unknown class.
    pub fn enroll(&self, student_id: UserId, class_id: ClassId) {
        {
            let mut data = self.data.write().expect("directory lock poisoned");
            if let Some(class) = data.classes.get_mut(&class_id) {
                class.enrolled.insert(student_id);
            }
        }
        self.persist();
    }

    /// Set or replace the geofence boundary for a class.
    pub fn set_geofence(&self, class_id: ClassId, shape: GeofenceShape) {
        {
            let mut data = self.data.write().expect("directory lock poisoned");
            if let Some(class) = data.classes.get_mut(&class_id) {
                class.geofence = Some(shape);
            }
        }
        self.persist();
    }

    /// Register a piece of classroom beacon hardware for a class.
    pub fn add_classroom_beacon(&self, class_id: ClassId, uuid: &str) {
        {
            let mut data = self.data.write().expect("directory lock poisoned");
            if let Some(class) = data.classes.get_mut(&class_id) {
                class.classroom_beacons.insert(uuid.to_string());
            }
        }
        self.persist();
    }

    fn local_date_of(&self, record: &AttendanceRecord) -> NaiveDate {
        record.recorded_at.with_timezone(&self.timezone).date_naive()
    }

    fn persist(&self) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        if let Err(err) = self.write_snapshot(path) {
            // A failed snapshot must not fail the request that triggered it;
            // the in-memory state is still authoritative.
            tracing::error!(path = %path.display(), error = %err, "failed to write directory snapshot");
        }
    }

    fn write_snapshot(&self, path: &Path) -> Result<()> {
        let data = self.data.read().expect("directory lock poisoned");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&*data)
            .map_err(|err| RollcallError::Storage(err.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ClassDirectory for MemoryDirectory {
    fn is_enrolled(&self, student_id: UserId, class_id: ClassId) -> Result<bool> {
        let data = self.data.read().expect("directory lock poisoned");
        Ok(data
            .classes
            .get(&class_id)
            .is_some_and(|class| class.enrolled.contains(&student_id)))
    }

    fn registered_beacon(&self, class_id: ClassId) -> Result<String> {
        let data = self.data.read().expect("directory lock poisoned");
        data.classes
            .get(&class_id)
            .map(|class| class.beacon_id.clone())
            .ok_or(RollcallError::ClassNotFound(class_id))
    }

    fn registered_beacons(&self, class_id: ClassId) -> Result<HashSet<String>> {
        let data = self.data.read().expect("directory lock poisoned");
        Ok(data
            .classes
            .get(&class_id)
            .map(|class| class.classroom_beacons.clone())
            .unwrap_or_default())
    }

    fn geofence(&self, class_id: ClassId) -> Result<Option<GeofenceShape>> {
        let data = self.data.read().expect("directory lock poisoned");
        Ok(data
            .classes
            .get(&class_id)
            .and_then(|class| class.geofence.clone()))
    }

    fn owns_class(&self, teacher_id: UserId, class_id: ClassId) -> Result<bool> {
        let data = self.data.read().expect("directory lock poisoned");
        Ok(data
            .classes
            .get(&class_id)
            .is_some_and(|class| class.teacher_id == teacher_id))
    }
}

impl AttendanceLog for MemoryDirectory {
    fn has_record_on(
        &self,
        student_id: UserId,
        class_id: ClassId,
        date: NaiveDate,
    ) -> Result<bool> {
        let data = self.data.read().expect("directory lock poisoned");
        Ok(data.records.iter().any(|record| {
            record.student_id == student_id
                && record.class_id == class_id
                && self.local_date_of(record) == date
        }))
    }

    fn insert(&self, record: NewAttendanceRecord) -> Result<AttendanceRecord> {
        let saved = AttendanceRecord {
            id: Uuid::new_v4(),
            student_id: record.student_id,
            class_id: record.class_id,
            status: record.status,
            recorded_at: Utc::now(),
            is_manual: record.is_manual,
            location: record.location,
        };
        {
            let mut data = self.data.write().expect("directory lock poisoned");
            data.records.push(saved.clone());
        }
        self.persist();
        Ok(saved)
    }

    fn records_for_class(&self, class_id: ClassId) -> Result<Vec<AttendanceRecord>> {
        let data = self.data.read().expect("directory lock poisoned");
        let mut records: Vec<AttendanceRecord> = data
            .records
            .iter()
            .filter(|record| record.class_id == class_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(records)
    }

    fn records_for_class_on(
        &self,
        class_id: ClassId,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut records = self.records_for_class(class_id)?;
        records.retain(|record| self.local_date_of(record) == date);
        Ok(records)
    }

    fn update_record(
        &self,
        record_id: Uuid,
        status: AttendanceStatus,
        location: Option<GeoPoint>,
        is_manual: bool,
    ) -> Result<()> {
        {
            let mut data = self.data.write().expect("directory lock poisoned");
            let record = data
                .records
                .iter_mut()
                .find(|record| record.id == record_id)
                .ok_or(RollcallError::RecordNotFound(record_id))?;
            record.status = status;
            record.location = location;
            record.is_manual = is_manual;
        }
        self.persist();
        Ok(())
    }
}
