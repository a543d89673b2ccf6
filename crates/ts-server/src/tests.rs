use crate::{app_with_state, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use ts_analytics::{AnalyticsStore, MemoryStore};
use ts_core::{ModelDescriptor, PerformanceRecord, RouterConfig};
use ts_router::{AdapterResponse, AdapterSet, ProviderAdapter};

struct EchoAdapter;

#[async_trait]
impl ProviderAdapter for EchoAdapter {
    async fn invoke(
        &self,
        model_id: &str,
        message: &str,
        _system_prompt: Option<&str>,
        _timeout: Duration,
    ) -> anyhow::Result<AdapterResponse> {
        Ok(AdapterResponse { text: format!("{model_id}: {message}"), tokens_used: 12 })
    }
}

struct DownAdapter;

#[async_trait]
impl ProviderAdapter for DownAdapter {
    async fn invoke(&self, _: &str, _: &str, _: Option<&str>, _: Duration) -> anyhow::Result<AdapterResponse> {
        anyhow::bail!("upstream 502")
    }
}

fn state_with(adapter: Arc<dyn ProviderAdapter>, store: Arc<MemoryStore>) -> AppState {
    AppState::from_config(&RouterConfig::default(), AdapterSet::new().with_default(adapter), store).unwrap()
}

fn echo_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (state_with(Arc::new(EchoAdapter), store.clone()), store)
}

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app_with_state(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health() {
    let (state, _) = echo_state();
    let (status, body) = send(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_secs"].is_u64());
}

// ========== Models ==========

#[tokio::test]
async fn test_list_models_sorted_by_id() {
    let (state, _) = echo_state();
    let (status, body) = send(&state, get("/api/v1/models")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["models"].as_array().unwrap().iter().map(|m| m["id"].as_str().unwrap()).collect();
    assert_eq!(ids.len(), 7);
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

// ========== Routing ==========

#[tokio::test]
async fn test_route_message_success() {
    let (state, store) = echo_state();
    let body = json!({
        "message": "hello",
        "context": { "user_id": "u1", "session_id": "s1" },
        "criteria": { "task_type": "chat", "user_tier": "premium" }
    });
    let (status, resp) = send(&state, post_json("/api/v1/route", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["fallback"], false);
    assert_eq!(resp["attempts"], 1);
    let model = resp["model_used"].as_str().unwrap();
    assert_eq!(resp["message"], format!("{model}: hello"));

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].model_id, model);
    assert_eq!(records[0].user_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_route_defaults_criteria() {
    let (state, _) = echo_state();
    let (status, resp) = send(&state, post_json("/api/v1/route", json!({ "message": "hi" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(resp["model_used"].is_string());
}

#[tokio::test]
async fn test_route_crisis_picks_crisis_model() {
    let (state, _) = echo_state();
    let body = json!({ "message": "help", "criteria": { "task_type": "crisis" } });
    let (status, resp) = send(&state, post_json("/api/v1/route", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["model_used"], "claude-3-opus");
}

#[tokio::test]
async fn test_route_empty_message_rejected() {
    let (state, _) = echo_state();
    let (status, resp) = send(&state, post_json("/api/v1/route", json!({ "message": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_route_all_providers_down_returns_fallback() {
    let store = Arc::new(MemoryStore::new());
    let state = state_with(Arc::new(DownAdapter), store.clone());
    let (status, resp) = send(&state, post_json("/api/v1/route", json!({ "message": "hello" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["fallback"], true);
    assert_eq!(resp["model_used"], "fallback");
    assert_eq!(resp["confidence"], 0.5);
    assert_eq!(store.records().len(), 2);
    assert!(store.records().iter().all(|r| !r.success));
}

#[tokio::test]
async fn test_route_no_models_is_service_unavailable() {
    let mut config = RouterConfig::default();
    config.models = vec![ModelDescriptor::new("solo", "local", 0.8, 0.0, 100).unavailable()];
    let store: Arc<dyn AnalyticsStore> = Arc::new(MemoryStore::new());
    let state = AppState::from_config(&config, AdapterSet::new().with_default(Arc::new(EchoAdapter)), store).unwrap();

    let (status, resp) = send(&state, post_json("/api/v1/route", json!({ "message": "hello" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp["error"]["code"], "no_models_available");
}

// ========== Analytics ==========

#[tokio::test]
async fn test_analytics_after_routing() {
    let (state, _) = echo_state();
    for _ in 0..3 {
        let (status, _) = send(&state, post_json("/api/v1/route", json!({ "message": "hello" }))).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&state, get("/api/v1/analytics")).await;
    assert_eq!(status, StatusCode::OK);
    let stats = body["stats"].as_object().unwrap();
    let total: u64 = stats.values().map(|s| s["total_requests"].as_u64().unwrap()).sum();
    assert_eq!(total, 3);
    assert!(stats.values().all(|s| s["success_rate"] == 100.0));
}

#[tokio::test]
async fn test_analytics_by_task_and_window() {
    let (state, store) = echo_state();
    let old = PerformanceRecord::new("gpt-4o", "openai", "analysis", 900, true)
        .at(chrono::Utc::now() - chrono::Duration::hours(48));
    let fresh = PerformanceRecord::new("gpt-4o", "openai", "chat", 300, false);
    store.append(&old).await.unwrap();
    store.append(&fresh).await.unwrap();

    let (status, body) = send(&state, get("/api/v1/analytics?by=task")).await;
    assert_eq!(status, StatusCode::OK);
    let stats = body["stats"].as_object().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats["chat"]["success_rate"], 0.0);

    let (_, body) = send(&state, get("/api/v1/analytics?hours=72&by=task")).await;
    assert_eq!(body["stats"].as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_analytics_rejects_bad_params() {
    let (state, _) = echo_state();
    let (status, body) = send(&state, get("/api/v1/analytics?hours=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _) = send(&state, get("/api/v1/analytics?by=user")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for hours in ["3000000000", "9223372036854775807"] {
        let (status, body) = send(&state, get(&format!("/api/v1/analytics?hours={hours}"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "hours={hours}");
        assert_eq!(body["error"]["message"], "hours out of range");
    }
}

// ========== Error mapping ==========

#[test]
fn test_router_error_status_mapping() {
    use crate::error::ApiError;
    use ts_core::RouterError;

    assert_eq!(ApiError::from(RouterError::NoModelsAvailable).status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(ApiError::from(RouterError::Config("bad".into())).status, StatusCode::BAD_REQUEST);
    let timeout = ApiError::from(RouterError::Timeout { model_id: "m".into(), timeout_ms: 5 });
    assert_eq!(timeout.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(timeout.code, "timeout");
    assert_eq!(ApiError::from(RouterError::Storage("x".into())).code, "internal_error");
}
