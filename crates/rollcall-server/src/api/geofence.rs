//! Geofence verification API endpoint.
//!
//! The dual-factor pre-check: GPS geofence containment AND beacon presence.
//! Callers can use it before invoking the mark protocol; it never writes an
//! attendance record.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use rollcall_core::ClassId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::ApiResult;
use crate::state::SharedState;

/// Creates the geofence router.
pub fn router() -> Router<SharedState> {
    Router::new().route("/check/{class_id}", post(check_geofence))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request payload for dual-factor verification.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "latitude": 36.00005,
    "longitude": -86.0,
    "ble_uuids": ["f7826da6-4fa2-4e98-8024-bc5b71e0893e"]
}))]
pub struct CheckGeofenceRequest {
    /// Caller latitude in decimal degrees.
    #[schema(example = 36.00005)]
    pub latitude: f64,

    /// Caller longitude in decimal degrees.
    #[schema(example = -86.0)]
    pub longitude: f64,

    /// Beacon UUIDs detected by the caller's device.
    #[serde(default)]
    pub ble_uuids: Vec<String>,
}

/// Result of dual-factor verification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "class_id": 7, "validated": true }))]
pub struct CheckGeofenceResponse {
    /// The class that was checked.
    pub class_id: ClassId,

    /// True only when the caller is inside the geofence AND a detected
    /// beacon matches the classroom registry.
    pub validated: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Run the dual-factor presence check for a class.
#[utoipa::path(
    post,
    path = "/geofence/check/{class_id}",
    tag = "geofence",
    operation_id = "checkGeofence",
    summary = "Dual-factor presence check",
    description = "Evaluates geofence containment and beacon presence and \
        returns their conjunction. A missing or malformed geofence is an \
        error, never a silent pass.",
    params(("class_id" = i64, Path, description = "Class ID")),
    request_body = CheckGeofenceRequest,
    responses(
        (status = 200, description = "Check evaluated", body = CheckGeofenceResponse),
        (status = 400, description = "Geofence shape cannot be evaluated"),
        (status = 404, description = "No geofence configured for the class")
    )
)]
pub async fn check_geofence(
    State(state): State<SharedState>,
    Path(class_id): Path<ClassId>,
    Json(request): Json<CheckGeofenceRequest>,
) -> ApiResult<Json<CheckGeofenceResponse>> {
    let validated = state.admissions.check_dual_factor(
        class_id,
        request.latitude,
        request.longitude,
        &request.ble_uuids,
    )?;

    Ok(Json(CheckGeofenceResponse {
        class_id,
        validated,
    }))
}
