use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use flywheel_runloop::{
    EventQueue, Scheduler, SchedulerConfig, SharedState, StatValue, TickOutcome, WorkError, Worker,
    builtin, STAT_ITERATIONS, STAT_RUN_START,
};

use crate::routes::control_router;

use super::*;

fn test_router() -> (Router, Arc<EventQueue>, Arc<SharedState>) {
    let queue = Arc::new(EventQueue::new());
    let shared = Arc::new(SharedState::default());
    let state = Arc::new(ControlState::new(queue.clone(), shared.clone()));
    (control_router(state), queue, shared)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder().method("POST").uri(uri);
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

struct NullWorker;

#[async_trait::async_trait]
impl Worker for NullWorker {
    async fn tick(&mut self) -> Result<TickOutcome, WorkError> {
        Ok(TickOutcome::Continue)
    }
}

#[tokio::test]
async fn test_get_log_level_reads_current_value() {
    let (router, _queue, _shared) = test_router();

    let response = router.oneshot(get("/v1/control/log-level")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["level"], "info");
}

#[tokio::test]
async fn test_set_log_level_enqueues_without_applying() {
    let (router, queue, shared) = test_router();

    let response = router
        .oneshot(post(
            "/v1/control/log-level",
            Some(serde_json::json!({"level": "debug"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "queued");
    assert_eq!(body["event"], builtin::SET_LOG_LEVEL);

    // The mutation travels through the queue; nothing changed yet.
    assert_eq!(shared.log_level().as_str(), "info");
    let drained = queue.drain_all();
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].event_type, builtin::SET_LOG_LEVEL);
    assert_eq!(drained[0].payload, Some(serde_json::json!("debug")));
}

#[tokio::test]
async fn test_set_log_level_rejects_bad_level() {
    let (router, queue, _shared) = test_router();

    let response = router
        .oneshot(post(
            "/v1/control/log-level",
            Some(serde_json::json!({"level": "loud"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "invalid_log_level");
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_pause_enqueues_and_scheduler_applies() {
    let (router, queue, shared) = test_router();

    let response = router
        .clone()
        .oneshot(post("/v1/control/pause", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(!shared.is_paused());

    // One scheduler tick applies the queued event.
    let config = SchedulerConfig {
        tick_interval_ms: 1,
        max_ticks: Some(1),
        ..Default::default()
    };
    let mut scheduler = Scheduler::new(config, queue.clone(), shared.clone()).unwrap();
    scheduler.run(&mut NullWorker).await.unwrap();

    let response = router.oneshot(get("/v1/control/paused")).await.unwrap();
    assert_eq!(body_json(response).await["paused"], true);
}

#[tokio::test]
async fn test_resume_enqueues_resume_event() {
    let (router, queue, _shared) = test_router();

    router
        .oneshot(post("/v1/control/resume", None))
        .await
        .unwrap();

    let drained = queue.drain_all();
    assert_eq!(drained[0].event_type, builtin::RESUME);
}

#[tokio::test]
async fn test_set_delay_carries_ticks_payload() {
    let (router, queue, _shared) = test_router();

    let response = router
        .clone()
        .oneshot(post("/v1/control/delay", Some(serde_json::json!({"ticks": 5}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // Zero is normalized to "run every tick": no payload.
    router
        .oneshot(post("/v1/control/delay", Some(serde_json::json!({"ticks": 0}))))
        .await
        .unwrap();

    let drained = queue.drain_all();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].payload, Some(serde_json::json!(5)));
    assert_eq!(drained[1].payload, None);
}

#[tokio::test]
async fn test_quit_enqueues_quit_event() {
    let (router, queue, _shared) = test_router();

    let response = router.oneshot(post("/v1/control/quit", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let drained = queue.drain_all();
    assert_eq!(drained.len(), 1);
    assert!(drained[0].is_quit());
}

#[tokio::test]
async fn test_debugger_roundtrip() {
    let (router, queue, _shared) = test_router();

    let response = router
        .clone()
        .oneshot(post("/v1/control/debugger", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(queue.drain_all()[0].event_type, builtin::START_REMOTE_DEBUGGER);

    // Not attached until the scheduler applies the event.
    let response = router.oneshot(get("/v1/control/debugger")).await.unwrap();
    assert_eq!(body_json(response).await["active"], false);
}

#[tokio::test]
async fn test_stats_zero_iterations_sentinel() {
    let (router, _queue, _shared) = test_router();

    let response = router.oneshot(get("/v1/control/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["seconds_per_iteration"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_stats_reports_derived_rate() {
    let (router, _queue, shared) = test_router();

    let run_start = chrono::Utc::now() - chrono::Duration::seconds(10);
    shared.stats().set(STAT_RUN_START, StatValue::Time(run_start));
    shared.stats().set(STAT_ITERATIONS, StatValue::Integer(5));

    let response = router.oneshot(get("/v1/control/stats")).await.unwrap();
    let body = body_json(response).await;

    assert_eq!(body["iterations"], 5);
    let rate = body["seconds_per_iteration"].as_f64().unwrap();
    assert!((rate - 2.0).abs() < 0.1, "rate was {}", rate);
}

#[tokio::test]
async fn test_custom_event_with_payload() {
    let (router, queue, _shared) = test_router();

    let response = router
        .oneshot(post(
            "/v1/control/event/reindex",
            Some(serde_json::json!({"shard": 3})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let drained = queue.drain_all();
    assert_eq!(drained[0].event_type, "reindex");
    assert_eq!(drained[0].payload, Some(serde_json::json!({"shard": 3})));
}

#[tokio::test]
async fn test_custom_event_without_body() {
    let (router, queue, _shared) = test_router();

    let response = router
        .oneshot(post("/v1/control/event/compact", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let drained = queue.drain_all();
    assert_eq!(drained[0].event_type, "compact");
    assert_eq!(drained[0].payload, None);
}

#[tokio::test]
async fn test_custom_event_rejects_bad_json() {
    let (router, queue, _shared) = test_router();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/control/event/reindex")
        .body(Body::from("not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "invalid_payload");
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (router, _queue, _shared) = test_router();

    let response = router
        .oneshot(get("/v1/control/self-destruct"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "unknown_operation");
}
