//! OpenAPI specification generation for the rollcall API.

use axum::Json;
use utoipa::OpenApi;

use rollcall_core::{AttendanceRecord, AttendanceStatus, GeoPoint, GeofenceShape, Role};

use super::attendance::{
    ActiveBeaconResponse, AttendanceListResponse, MarkAttendanceRequest, MarkAttendanceResponse,
    StartBroadcastRequest, StartBroadcastResponse, UpdateAttendanceRequest,
    UpdateAttendanceResponse,
};
use super::error::ErrorResponse;
use super::geofence::{CheckGeofenceRequest, CheckGeofenceResponse};
use super::health::HealthResponse;

/// Serve the OpenAPI specification as JSON at `/api/openapi.json`.
pub async fn get_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Returns the OpenAPI specification as a string (for writing to file).
/// Used by the gen-openapi binary.
#[allow(dead_code)]
pub fn get_openapi_json() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .expect("Failed to serialize OpenAPI spec")
}

/// Main OpenAPI document structure for rollcall.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "rollcall API",
        version = "0.1.0",
        description = r#"
# rollcall API

rollcall admits classroom attendance only after students prove physical
presence.

## Overview

1. **Broadcast sessions**: a teacher marks a beacon id as live for a class
   and date; it expires automatically.
2. **Attendance marking**: students are admitted after enrollment, beacon
   identity, and one-record-per-day checks.
3. **Dual-factor verification**: GPS geofence containment AND beacon
   presence, usable as a pre-check before marking.

## Identity

Authentication happens upstream; requests carry the caller as
`X-User-Id` and `X-User-Role` headers. Roles are `student`, `teacher`,
and `admin`.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local rollcall server")
    ),
    tags(
        (
            name = "system",
            description = "Health checks"
        ),
        (
            name = "attendance",
            description = "Attendance marking, broadcast sessions, history, and edits"
        ),
        (
            name = "geofence",
            description = "Dual-factor presence verification"
        )
    ),
    paths(
        // Health endpoints
        super::health::health_check,
        // Attendance endpoints
        super::attendance::start_broadcast,
        super::attendance::active_beacon,
        super::attendance::mark_attendance,
        super::attendance::class_attendance,
        super::attendance::attendance_by_date,
        super::attendance::previous_attendance,
        super::attendance::update_attendance,
        // Geofence endpoints
        super::geofence::check_geofence,
    ),
    components(
        schemas(
            // Error types
            ErrorResponse,
            // Health types
            HealthResponse,
            // Attendance types
            StartBroadcastRequest,
            StartBroadcastResponse,
            ActiveBeaconResponse,
            MarkAttendanceRequest,
            MarkAttendanceResponse,
            AttendanceListResponse,
            UpdateAttendanceRequest,
            UpdateAttendanceResponse,
            // Geofence types
            CheckGeofenceRequest,
            CheckGeofenceResponse,
            // Core types
            AttendanceRecord,
            AttendanceStatus,
            GeofenceShape,
            GeoPoint,
            Role,
        )
    )
)]
pub struct ApiDoc;
