//! Router-level tests: status codes and response envelopes.

use std::{net::SocketAddr, sync::Arc};

use attendance_codes::{
    app::{
        api::{AppContext, create_api_router},
        state::AppState,
    },
    clock::ManualClock,
    config::GlobalConfig,
    models::user::{Role, UserProfile},
    stores::InMemoryUserDirectory,
    utils::rate_limiter::RateLimiter,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with_limit(requests_per_minute: u32) -> (Router, Arc<ManualClock>) {
    let config = GlobalConfig::default();
    let clock = Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_718_000_000, 0).unwrap(),
    ));
    let directory = InMemoryUserDirectory::with_users([
        UserProfile {
            id: "LT001".into(),
            name: "Dr. John Smith".into(),
            role: Role::Lecturer,
        },
        UserProfile {
            id: "ST001".into(),
            name: "Alice".into(),
            role: Role::Student,
        },
    ]);

    let state = AppState::in_memory(&config.attendance, Arc::new(directory), clock.clone());
    let context = AppContext {
        state,
        config,
        rate_limiter: RateLimiter::per_minute(requests_per_minute),
    };

    let router = create_api_router(context)
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
    (router, clock)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_session(app: &Router, duration: i64) -> (StatusCode, Value) {
    call(
        app,
        "POST",
        "/sessions",
        Some(json!({
            "ownerId": "LT001",
            "unitCode": "CS302",
            "unitName": "Web Development",
            "duration": duration,
        })),
    )
    .await
}

#[tokio::test]
async fn create_then_scan_then_duplicate() {
    let (app, _clock) = app_with_limit(1_000);

    let (status, body) = create_session(&app, 60).await;
    assert_eq!(status, StatusCode::CREATED);
    let payload = body["data"]["qrCode"].clone();
    assert_eq!(payload["lecturerName"], "Dr. John Smith");
    assert_eq!(payload["classType"], "lecture");
    let code = payload["sessionCode"].as_str().unwrap().to_string();

    let scan = json!({ "participantId": "ST001", "qrCode": payload.to_string() });
    let (status, body) = call(&app, "POST", "/attendance/scan", Some(scan.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["attendance"]["classification"], "on-time");

    let (status, body) = call(&app, "POST", "/attendance/scan", Some(scan)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "duplicate_scan");

    let (status, body) = call(&app, "GET", &format!("/sessions/{}", code), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["attendanceCount"], 1);
    assert_eq!(body["data"]["live"], true);
}

#[tokio::test]
async fn rejections_carry_their_kind() {
    let (app, clock) = app_with_limit(1_000);

    let (status, body) = create_session(&app, 500).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");

    let (status, body) = call(
        &app,
        "POST",
        "/attendance/scan",
        Some(json!({ "participantId": "ST001", "qrCode": { "sessionCode": "  " } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "malformed_input");

    let (status, body) = call(
        &app,
        "POST",
        "/attendance/scan",
        Some(json!({ "participantId": "ST001", "qrCode": { "sessionCode": "QR_NOPE" } })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "session_not_found");

    let (_, body) = create_session(&app, 10).await;
    let code = body["data"]["qrCode"]["sessionCode"].as_str().unwrap().to_string();
    clock.advance(Duration::minutes(11));

    let (status, body) = call(
        &app,
        "POST",
        "/attendance/scan",
        Some(json!({ "participantId": "ST001", "qrCode": { "sessionCode": code } })),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["kind"], "session_expired");
}

#[tokio::test]
async fn deactivate_twice_and_unknown_owner() {
    let (app, _clock) = app_with_limit(1_000);

    let (_, body) = create_session(&app, 30).await;
    let code = body["data"]["qrCode"]["sessionCode"].as_str().unwrap().to_string();
    let uri = format!("/sessions/{}/deactivate", code);

    for _ in 0..2 {
        let (status, body) = call(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["active"], false);
    }

    let (status, body) = call(
        &app,
        "POST",
        "/sessions",
        Some(json!({ "ownerId": "GHOST", "unitCode": "X1", "unitName": "X", "duration": 30 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "unknown_user");
}

#[tokio::test]
async fn student_owner_is_forbidden() {
    let (app, _clock) = app_with_limit(1_000);

    let (status, body) = call(
        &app,
        "POST",
        "/sessions",
        Some(json!({ "ownerId": "ST001", "unitCode": "CS302", "unitName": "Web", "duration": 30 })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn far_future_scan_time_is_refused() {
    let (app, _clock) = app_with_limit(1_000);
    let (_, body) = create_session(&app, 60).await;
    let code = body["data"]["qrCode"]["sessionCode"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        "/attendance/scan",
        Some(json!({
            "participantId": "ST001",
            "qrCode": { "sessionCode": code },
            "scanTime": "2099-01-01T00:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");

    let (_, body) = call(&app, "GET", &format!("/sessions/{}", code), None).await;
    assert_eq!(body["data"]["live"], true);
    assert_eq!(body["data"]["active"], true);
}

#[tokio::test]
async fn rate_limit_applies_per_client() {
    let (app, _clock) = app_with_limit(2);

    assert_eq!(call(&app, "GET", "/health", None).await.0, StatusCode::OK);
    assert_eq!(call(&app, "GET", "/health", None).await.0, StatusCode::OK);

    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["kind"], "rate_limited");
}
