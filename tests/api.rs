//! HTTP control surface tests

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use focus_bell::{
    api::create_router,
    config::SessionSettings,
    engine::ManualClock,
    services::{AudioBackend, RecordingAudio},
    state::AppState,
};

struct Harness {
    app: Router,
    clock: ManualClock,
    audio: Arc<RecordingAudio>,
}

impl Harness {
    fn new() -> Self {
        let clock = ManualClock::new(0);
        let audio = Arc::new(RecordingAudio::new());
        let backend: Arc<dyn AudioBackend> = audio.clone();
        let state = AppState::spawn(
            20554,
            "127.0.0.1".to_string(),
            &SessionSettings::default(),
            clock.clone(),
            backend,
        );
        Self {
            app: create_router(Arc::new(state)),
            clock,
            audio,
        }
    }

    async fn call(&self, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

/// Give the ambience worker time to apply queued volume changes
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn start_rings_and_status_tracks_elapsed_time() {
    let harness = Harness::new();

    let (status, body) = harness.call("POST", "/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["session"]["phase"], "running");
    assert_eq!(harness.audio.chime_count(), 1);

    harness.clock.advance(61_000);
    let (status, body) = harness.call("GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["elapsed_seconds"], 61);
    assert_eq!(body["session"]["elapsed_display"], "01:01");
    assert_eq!(body["session"]["interval_minutes"], 10);
    assert_eq!(body["last_action"], "start");
    assert_eq!(body["interval_choices"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn toggle_alternates_running_and_paused() {
    let harness = Harness::new();

    let (_, body) = harness.call("POST", "/toggle", None).await;
    assert_eq!(body["session"]["phase"], "running");

    harness.clock.advance(5_000);
    let (_, body) = harness.call("POST", "/toggle", None).await;
    assert_eq!(body["session"]["phase"], "paused");
    assert_eq!(body["session"]["elapsed_seconds"], 5);

    harness.clock.advance(30_000);
    let (_, body) = harness.call("GET", "/status", None).await;
    assert_eq!(body["session"]["elapsed_seconds"], 5);
}

#[tokio::test]
async fn interval_is_locked_once_started() {
    let harness = Harness::new();

    let (status, body) = harness.call("PUT", "/interval", Some(r#"{"minutes":15}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["interval_minutes"], 15);

    let (status, body) = harness.call("PUT", "/interval", Some(r#"{"minutes":7}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    harness.call("POST", "/start", None).await;
    let (status, _) = harness.call("PUT", "/interval", Some(r#"{"minutes":30}"#)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = harness.call("POST", "/reset", None).await;
    assert_eq!(body["session"]["phase"], "idle");
    assert_eq!(body["session"]["elapsed_ms"], 0);
    // Reset keeps the chosen interval
    assert_eq!(body["session"]["interval_minutes"], 15);

    let (status, _) = harness.call("PUT", "/interval", Some(r#"{"minutes":30}"#)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn mute_and_visibility_shape_the_ambience() {
    let harness = Harness::new();

    let (_, body) = harness.call("POST", "/mute", None).await;
    assert_eq!(body["session"]["muted"], true);

    harness.call("POST", "/start", None).await;
    settle().await;
    assert_eq!(harness.audio.chime_count(), 0);
    assert_eq!(harness.audio.last_background(), Some(0.0));

    let (_, body) = harness.call("POST", "/toggle-mute", None).await;
    assert_eq!(body["session"]["muted"], false);
    settle().await;
    assert_eq!(harness.audio.last_background(), Some(0.6));

    let (_, body) = harness
        .call("POST", "/visibility", Some(r#"{"visible":false}"#))
        .await;
    assert_eq!(body["session"]["visible"], false);
    settle().await;
    assert_eq!(harness.audio.last_background(), Some(0.0));
}

#[tokio::test]
async fn health_reports_version_and_phase() {
    let harness = Harness::new();

    let (status, body) = harness.call("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["phase"], "idle");
}
