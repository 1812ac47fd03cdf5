//! End-to-end tests for the HTTP API against a seeded in-memory directory.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use rollcall_core::{GeoPoint, GeofenceShape, MemoryDirectory, RollcallConfig};
use rollcall_server::api;
use rollcall_server::api::attendance::{ActiveBeaconResponse, AttendanceListResponse};
use rollcall_server::api::geofence::CheckGeofenceResponse;
use rollcall_server::state::AppState;

const CLASS: i64 = 7;
const TEACHER: i64 = 100;
const OTHER_TEACHER: i64 = 101;
const STUDENT: i64 = 200;
const ADMIN: i64 = 1;

fn identity(user_id: i64, role: &'static str) -> [(HeaderName, HeaderValue); 2] {
    [
        (
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_str(&user_id.to_string()).unwrap(),
        ),
        (
            HeaderName::from_static("x-user-role"),
            HeaderValue::from_static(role),
        ),
    ]
}

fn seeded_server() -> TestServer {
    let directory = Arc::new(MemoryDirectory::new(chrono_tz::UTC));
    directory.register_class(CLASS, TEACHER, "BEACON-7");
    directory.enroll(STUDENT, CLASS);
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

    // Class 8 has no geofence and no enrollments.
    directory.register_class(8, OTHER_TEACHER, "BEACON-8");

    let state = AppState::with_directory(RollcallConfig::default(), directory);
    TestServer::new(api::create_router(state)).unwrap()
}

fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

#[tokio::test]
async fn health_check_is_open() {
    let server = seeded_server();
    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
    response.assert_json_contains(&serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn mark_attendance_succeeds_once_then_conflicts() {
    let server = seeded_server();
    let [id, role] = identity(STUDENT, "student");
    let body = serde_json::json!({ "status": "present", "beacon_id": "BEACON-7" });

    let response = server
        .post(&format!("/api/classes/{CLASS}/attendance/mark"))
        .add_header(id.0.clone(), id.1.clone())
        .add_header(role.0.clone(), role.1.clone())
        .json(&body)
        .await;
    response.assert_status(StatusCode::OK);

    let response = server
        .post(&format!("/api/classes/{CLASS}/attendance/mark"))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .json(&body)
        .await;
    response.assert_status(StatusCode::CONFLICT);
    response.assert_json_contains(&serde_json::json!({ "error": "already_marked" }));
}

#[tokio::test]
async fn mark_attendance_rejects_wrong_beacon() {
    let server = seeded_server();
    let [id, role] = identity(STUDENT, "student");

    let response = server
        .post(&format!("/api/classes/{CLASS}/attendance/mark"))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .json(&serde_json::json!({ "status": "present", "beacon_id": "WRONG" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    response.assert_json_contains(&serde_json::json!({ "error": "beacon_mismatch" }));
}

#[tokio::test]
async fn mark_attendance_is_student_only() {
    let server = seeded_server();
    let [id, role] = identity(TEACHER, "teacher");

    let response = server
        .post(&format!("/api/classes/{CLASS}/attendance/mark"))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .json(&serde_json::json!({ "status": "present", "beacon_id": "BEACON-7" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn mark_attendance_requires_identity() {
    let server = seeded_server();
    let response = server
        .post(&format!("/api/classes/{CLASS}/attendance/mark"))
        .json(&serde_json::json!({ "status": "present", "beacon_id": "BEACON-7" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_role_is_rejected_at_the_boundary() {
    let server = seeded_server();
    let [id, _] = identity(STUDENT, "student");

    let response = server
        .post(&format!("/api/classes/{CLASS}/attendance/mark"))
        .add_header(id.0, id.1)
        .add_header(
            HeaderName::from_static("x-user-role"),
            HeaderValue::from_static("principal"),
        )
        .json(&serde_json::json!({ "status": "present", "beacon_id": "BEACON-7" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json_contains(&serde_json::json!({ "error": "unknown_role" }));
}

#[tokio::test]
async fn broadcast_start_and_session_lookup() {
    let server = seeded_server();
    let [id, role] = identity(TEACHER, "teacher");
    let date = today();

    let response = server
        .post(&format!("/api/classes/{CLASS}/attendance/start"))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .json(&serde_json::json!({ "date": date, "beacon_id": "LIVE-1" }))
        .await;
    response.assert_status(StatusCode::OK);

    // The session lookup is unauthenticated.
    let response = server
        .get(&format!(
            "/api/classes/{CLASS}/attendance/session?date={date}"
        ))
        .await;
    response.assert_status(StatusCode::OK);
    let body: ActiveBeaconResponse = response.json();
    assert_eq!(body.beacon_id, Some("LIVE-1".to_string()));

    // No session on another date.
    let response = server
        .get(&format!(
            "/api/classes/{CLASS}/attendance/session?date=1999-01-01"
        ))
        .await;
    let body: ActiveBeaconResponse = response.json();
    assert_eq!(body.beacon_id, None);
}

#[tokio::test]
async fn broadcast_start_is_not_for_students() {
    let server = seeded_server();
    let [id, role] = identity(STUDENT, "student");

    let response = server
        .post(&format!("/api/classes/{CLASS}/attendance/start"))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .json(&serde_json::json!({ "date": today(), "beacon_id": "LIVE-1" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn geofence_check_returns_conjunction() {
    let server = seeded_server();

    // Inside the circle with a matching beacon.
    let response = server
        .post(&format!("/api/geofence/check/{CLASS}"))
        .json(&serde_json::json!({
            "latitude": 36.00005,
            "longitude": -86.0,
            "ble_uuids": ["ROOM-UUID-1"]
        }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: CheckGeofenceResponse = response.json();
    assert!(body.validated);

    // Inside the circle but no matching beacon.
    let response = server
        .post(&format!("/api/geofence/check/{CLASS}"))
        .json(&serde_json::json!({
            "latitude": 36.00005,
            "longitude": -86.0,
            "ble_uuids": ["NOPE"]
        }))
        .await;
    let body: CheckGeofenceResponse = response.json();
    assert!(!body.validated);
}

#[tokio::test]
async fn geofence_check_without_configuration_is_not_found() {
    let server = seeded_server();
    let response = server
        .post("/api/geofence/check/8")
        .json(&serde_json::json!({ "latitude": 36.0, "longitude": -86.0 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json_contains(&serde_json::json!({ "error": "geofence_not_configured" }));
}

#[tokio::test]
async fn history_applies_ownership_rule() {
    let server = seeded_server();

    let [id, role] = identity(ADMIN, "admin");
    let response = server
        .get(&format!("/api/classes/{CLASS}/attendance"))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .await;
    response.assert_status(StatusCode::OK);

    let [id, role] = identity(OTHER_TEACHER, "teacher");
    let response = server
        .get(&format!("/api/classes/{CLASS}/attendance"))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let [id, role] = identity(TEACHER, "teacher");
    let response = server
        .get(&format!("/api/classes/{CLASS}/attendance"))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn by_date_rejects_malformed_dates() {
    let server = seeded_server();
    let [id, role] = identity(TEACHER, "teacher");

    let response = server
        .get(&format!(
            "/api/classes/{CLASS}/attendance/by-date?date=03/14/2025"
        ))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json_contains(&serde_json::json!({ "error": "invalid_date" }));
}

#[tokio::test]
async fn teacher_can_edit_a_record_in_their_class() {
    let server = seeded_server();

    let [id, role] = identity(STUDENT, "student");
    let response = server
        .post(&format!("/api/classes/{CLASS}/attendance/mark"))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .json(&serde_json::json!({ "status": "absent", "beacon_id": "BEACON-7" }))
        .await;
    response.assert_status(StatusCode::OK);

    let [id, role] = identity(TEACHER, "teacher");
    let response = server
        .get(&format!("/api/classes/{CLASS}/attendance"))
        .add_header(id.0.clone(), id.1.clone())
        .add_header(role.0.clone(), role.1.clone())
        .await;
    let body: AttendanceListResponse = response.json();
    let record_id = body.attendance[0].id;

    let response = server
        .put(&format!("/api/classes/{CLASS}/attendance/{record_id}"))
        .add_header(id.0.clone(), id.1.clone())
        .add_header(role.0.clone(), role.1.clone())
        .json(&serde_json::json!({ "status": "late", "is_manual": true }))
        .await;
    response.assert_status(StatusCode::OK);

    let response = server
        .get(&format!("/api/classes/{CLASS}/attendance"))
        .add_header(id.0, id.1)
        .add_header(role.0, role.1)
        .await;
    let body: AttendanceListResponse = response.json();
    assert!(body.attendance[0].is_manual);
}
