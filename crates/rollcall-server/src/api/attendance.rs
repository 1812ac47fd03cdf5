//! Attendance API endpoints.
//!
//! Marking, broadcast session control, history reads, and record edits for
//! a class. Role gates mirror the admission rules: students mark, teachers
//! and admins broadcast, read, and edit.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use rollcall_core::{AttendanceRecord, AttendanceStatus, ClassId, GeoPoint, Role};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::auth::CallerIdentity;
use crate::state::SharedState;

/// Creates the attendance router, nested under `/classes/{id}/attendance`.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session", get(active_beacon))
        .route("/start", post(start_broadcast))
        .route("/mark", post(mark_attendance))
        .route("/", get(class_attendance))
        .route("/by-date", get(attendance_by_date))
        .route("/previous", get(previous_attendance))
        .route("/{record_id}", put(update_attendance))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for starting a beacon broadcast.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "date": "2025-03-14",
    "beacon_id": "BLE-ROOM-101"
}))]
pub struct StartBroadcastRequest {
    /// Calendar date the broadcast is valid for, `YYYY-MM-DD`.
    #[schema(example = "2025-03-14")]
    pub date: String,

    /// The beacon id being advertised in the classroom.
    #[schema(example = "BLE-ROOM-101")]
    pub beacon_id: String,
}

/// Response after starting a broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartBroadcastResponse {
    /// Human-readable confirmation.
    pub message: String,

    /// How long the broadcast stays live, in seconds.
    #[schema(example = 300)]
    pub expires_in_secs: u64,
}

/// Query parameters carrying a calendar date.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DateQuery {
    /// Calendar date, `YYYY-MM-DD`.
    #[param(example = "2025-03-14")]
    pub date: String,
}

/// The beacon currently live for a class and date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "beacon_id": "BLE-ROOM-101" }))]
pub struct ActiveBeaconResponse {
    /// The live beacon id, or null when no session is active.
    pub beacon_id: Option<String>,
}

/// Request body for marking attendance.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "present",
    "beacon_id": "BLE-ROOM-101",
    "location": { "latitude": 36.0, "longitude": -86.0 }
}))]
pub struct MarkAttendanceRequest {
    /// Attendance status being claimed.
    pub status: AttendanceStatus,

    /// Beacon id observed by the student's device.
    #[schema(example = "BLE-ROOM-101")]
    pub beacon_id: String,

    /// Device location at the time of marking, if available.
    pub location: Option<GeoPoint>,
}

/// Response after a successful mark.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAttendanceResponse {
    /// Human-readable confirmation.
    pub message: String,

    /// The persisted record.
    pub record: AttendanceRecord,
}

/// A list of attendance records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceListResponse {
    /// Records, newest first.
    pub attendance: Vec<AttendanceRecord>,
}

/// Request body for editing an attendance record.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "late",
    "is_manual": true
}))]
pub struct UpdateAttendanceRequest {
    /// New status.
    pub status: AttendanceStatus,

    /// Updated location, if any.
    pub location: Option<GeoPoint>,

    /// Whether the record is a manual edit. Teachers editing records set
    /// this to true.
    pub is_manual: bool,
}

/// Response after updating a record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateAttendanceResponse {
    /// Human-readable confirmation.
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Start a beacon broadcast for a class.
#[utoipa::path(
    post,
    path = "/classes/{id}/attendance/start",
    tag = "attendance",
    operation_id = "startBroadcast",
    summary = "Start a beacon broadcast",
    description = "Marks a beacon id as live for the class and date for the \
        configured TTL. Starting again before expiry overwrites the beacon \
        and resets the clock. Teachers and admins only.",
    params(("id" = i64, Path, description = "Class ID")),
    request_body = StartBroadcastRequest,
    responses(
        (status = 200, description = "Broadcast started", body = StartBroadcastResponse),
        (status = 400, description = "Malformed date or beacon id"),
        (status = 403, description = "Caller may not start broadcasts")
    )
)]
pub async fn start_broadcast(
    State(state): State<SharedState>,
    Path(class_id): Path<ClassId>,
    caller: CallerIdentity,
    Json(request): Json<StartBroadcastRequest>,
) -> ApiResult<Json<StartBroadcastResponse>> {
    if !caller.role.can_manage_attendance() {
        return Err(ApiError::Forbidden {
            error_code: "not_authorized".to_string(),
            message: "Only teachers or admins can start an attendance broadcast".to_string(),
        });
    }

    let date = parse_date(&request.date)?;
    state
        .admissions
        .start_broadcast(class_id, date, &request.beacon_id)?;

    let expires_in_secs = state.config.broadcast_ttl_secs;
    Ok(Json(StartBroadcastResponse {
        message: format!("Beacon broadcast started for {expires_in_secs} seconds"),
        expires_in_secs,
    }))
}

/// Get the beacon currently live for a class and date.
///
/// This read path is served from the ephemeral session store and is the
/// only consumer of it; marking validates against the class's registered
/// beacon instead.
#[utoipa::path(
    get,
    path = "/classes/{id}/attendance/session",
    tag = "attendance",
    operation_id = "getActiveBeacon",
    summary = "Get the live broadcast beacon",
    params(("id" = i64, Path, description = "Class ID"), DateQuery),
    responses(
        (status = 200, description = "Current beacon, null when none is live", body = ActiveBeaconResponse),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn active_beacon(
    State(state): State<SharedState>,
    Path(class_id): Path<ClassId>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<ActiveBeaconResponse>> {
    let date = parse_date(&query.date)?;
    Ok(Json(ActiveBeaconResponse {
        beacon_id: state.admissions.active_beacon(class_id, date),
    }))
}

/// Mark attendance for the calling student.
#[utoipa::path(
    post,
    path = "/classes/{id}/attendance/mark",
    tag = "attendance",
    operation_id = "markAttendance",
    summary = "Mark attendance",
    description = "Admits the student's attendance after checking enrollment, \
        beacon identity, and the one-record-per-day rule, in that order. \
        Students only.",
    params(("id" = i64, Path, description = "Class ID")),
    request_body = MarkAttendanceRequest,
    responses(
        (status = 200, description = "Attendance admitted", body = MarkAttendanceResponse),
        (status = 403, description = "Not a student, not enrolled, or wrong beacon"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Already marked today")
    )
)]
pub async fn mark_attendance(
    State(state): State<SharedState>,
    Path(class_id): Path<ClassId>,
    caller: CallerIdentity,
    Json(request): Json<MarkAttendanceRequest>,
) -> ApiResult<Json<MarkAttendanceResponse>> {
    if caller.role != Role::Student {
        return Err(ApiError::Forbidden {
            error_code: "not_authorized".to_string(),
            message: "Only students can mark attendance".to_string(),
        });
    }

    let record = state.admissions.mark_attendance(
        caller.user_id,
        class_id,
        request.status,
        request.location,
        &request.beacon_id,
    )?;

    Ok(Json(MarkAttendanceResponse {
        message: "Attendance marked successfully".to_string(),
        record,
    }))
}

/// Get all attendance records for a class.
#[utoipa::path(
    get,
    path = "/classes/{id}/attendance",
    tag = "attendance",
    operation_id = "getClassAttendance",
    summary = "Get class attendance history",
    description = "Admins may read any class; teachers only classes they own.",
    params(("id" = i64, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Records, newest first", body = AttendanceListResponse),
        (status = 403, description = "Caller may not read this class")
    )
)]
pub async fn class_attendance(
    State(state): State<SharedState>,
    Path(class_id): Path<ClassId>,
    caller: CallerIdentity,
) -> ApiResult<Json<AttendanceListResponse>> {
    let attendance = state
        .admissions
        .class_attendance(caller.user_id, caller.role, class_id)?;
    Ok(Json(AttendanceListResponse { attendance }))
}

/// Get attendance for a class on a specific date.
#[utoipa::path(
    get,
    path = "/classes/{id}/attendance/by-date",
    tag = "attendance",
    operation_id = "getAttendanceByDate",
    summary = "Get attendance for a date",
    params(("id" = i64, Path, description = "Class ID"), DateQuery),
    responses(
        (status = 200, description = "Records for the date", body = AttendanceListResponse),
        (status = 400, description = "Malformed date"),
        (status = 403, description = "Caller may not read this class")
    )
)]
pub async fn attendance_by_date(
    State(state): State<SharedState>,
    Path(class_id): Path<ClassId>,
    caller: CallerIdentity,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<AttendanceListResponse>> {
    let date = parse_date(&query.date)?;
    let attendance =
        state
            .admissions
            .class_attendance_on(caller.user_id, caller.role, class_id, date)?;
    Ok(Json(AttendanceListResponse { attendance }))
}

/// Get the full attendance history for a class.
///
/// Alias of the class attendance read kept for client compatibility.
#[utoipa::path(
    get,
    path = "/classes/{id}/attendance/previous",
    tag = "attendance",
    operation_id = "getPreviousAttendance",
    summary = "Get full attendance history",
    params(("id" = i64, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Records, newest first", body = AttendanceListResponse),
        (status = 403, description = "Caller may not read this class")
    )
)]
pub async fn previous_attendance(
    State(state): State<SharedState>,
    Path(class_id): Path<ClassId>,
    caller: CallerIdentity,
) -> ApiResult<Json<AttendanceListResponse>> {
    let attendance = state
        .admissions
        .class_attendance(caller.user_id, caller.role, class_id)?;
    Ok(Json(AttendanceListResponse { attendance }))
}

/// Edit an attendance record.
#[utoipa::path(
    put,
    path = "/classes/{id}/attendance/{record_id}",
    tag = "attendance",
    operation_id = "updateAttendance",
    summary = "Edit an attendance record",
    description = "The caller must own the class (teacher) or be an admin.",
    params(
        ("id" = i64, Path, description = "Class ID"),
        ("record_id" = Uuid, Path, description = "Attendance record ID")
    ),
    request_body = UpdateAttendanceRequest,
    responses(
        (status = 200, description = "Record updated", body = UpdateAttendanceResponse),
        (status = 403, description = "Caller may not edit this class"),
        (status = 404, description = "Record not found")
    )
)]
pub async fn update_attendance(
    State(state): State<SharedState>,
    Path((class_id, record_id)): Path<(ClassId, Uuid)>,
    caller: CallerIdentity,
    Json(request): Json<UpdateAttendanceRequest>,
) -> ApiResult<Json<UpdateAttendanceResponse>> {
    state.admissions.update_record(
        caller.user_id,
        caller.role,
        class_id,
        record_id,
        request.status,
        request.location,
        request.is_manual,
    )?;

    Ok(Json(UpdateAttendanceResponse {
        message: "Attendance updated successfully".to_string(),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    raw.parse::<NaiveDate>()
        .map_err(|_| ApiError::from(rollcall_core::RollcallError::InvalidDate(raw.to_string())))
}
