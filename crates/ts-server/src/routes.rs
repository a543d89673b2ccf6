use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use ts_core::{RequestContext, RoutingResult, SelectionCriteria, TimeRange};

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub fn model_routes() -> Router<AppState> {
    Router::new().route("/api/v1/models", get(list_models))
}

pub fn routing_routes() -> Router<AppState> {
    Router::new().route("/api/v1/route", post(route_message))
}

pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/api/v1/analytics", get(model_analytics))
}

#[derive(Debug, Deserialize)]
pub struct RouteBody {
    pub message: String,
    #[serde(default)]
    pub context: RequestContext,
    #[serde(default)]
    pub criteria: SelectionCriteria,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub hours: Option<i64>,
    /// `model` (default) or `task`.
    pub by: Option<String>,
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

async fn list_models(State(state): State<AppState>) -> Json<Value> {
    let mut models = state.router.registry().list_all();
    models.sort_by(|a, b| a.id.cmp(&b.id));
    Json(json!({ "models": models }))
}

async fn route_message(
    State(state): State<AppState>,
    Json(body): Json<RouteBody>,
) -> Result<Json<RoutingResult>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }
    let request = ts_core::RoutingRequest { message: body.message, context: body.context };
    let result = state.router.route_message(&request, &body.criteria).await.map_err(|e| {
        tracing::error!(error = %e, "route request failed");
        ApiError::from(e)
    })?;
    if result.fallback {
        tracing::warn!(attempts = result.attempts, "served fallback response");
    }
    Ok(Json(result))
}

async fn model_analytics(
    State(state): State<AppState>,
    Query(q): Query<AnalyticsQuery>,
) -> Result<Json<Value>, ApiError> {
    let hours = q.hours.unwrap_or(24);
    if hours <= 0 {
        return Err(ApiError::bad_request("hours must be positive"));
    }
    let range = chrono::Duration::try_hours(hours)
        .and_then(TimeRange::try_last)
        .ok_or_else(|| ApiError::bad_request("hours out of range"))?;
    let stats = match q.by.as_deref() {
        None | Some("model") => state.aggregator.get_model_analytics(range).await,
        Some("task") => state.aggregator.get_task_analytics(range).await,
        Some(other) => return Err(ApiError::bad_request(format!("unknown grouping: {other}"))),
    };
    Ok(Json(json!({
        "range": range,
        "stats": stats,
    })))
}
