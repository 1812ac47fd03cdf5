//! # rollcall-core
//!
//! Core attendance admission logic for the rollcall presence tracking
//! system.
//!
//! A teacher opens a time-bounded beacon broadcast for a class; students
//! prove physical presence through two independent signals - beacon identity
//! and GPS geofence containment - before an attendance record is admitted.
//!
//! ## Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`geo`] - great-circle distance and point-in-polygon primitives
//! - [`geofence`] - boundary shapes and containment evaluation
//! - [`beacon`] - beacon presence matching against the classroom registry
//! - [`session`] - expiring in-memory broadcast sessions
//! - [`admission`] - the admission protocols and authorization rules
//! - [`directory`] - collaborator traits for class data and attendance records
//! - [`storage`] - in-process directory backend with JSON snapshots
//! - [`config`] - application configuration loading and validation
//! - [`error`] - unified error type for the crate
//! - [`types`] - shared identifiers, roles, and record shapes

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod admission;
pub mod beacon;
pub mod config;
pub mod directory;
pub mod error;
pub mod geo;
pub mod geofence;
pub mod session;
pub mod storage;
pub mod types;

// Re-export primary types for convenience
pub use admission::AdmissionService;
pub use beacon::{is_plausible_beacon_id, BeaconMatcher};
pub use config::{RollcallConfig, ServerConfig};
pub use directory::{AttendanceLog, ClassDirectory};
pub use error::{Result, RollcallError};
pub use geofence::{GeofenceEvaluator, GeofenceShape};
pub use session::SessionStore;
pub use storage::{default_data_dir, MemoryDirectory};
pub use types::{
    AttendanceRecord, AttendanceStatus, ClassId, GeoPoint, NewAttendanceRecord, Role, UserId,
};
