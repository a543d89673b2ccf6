//! TherapySync router HTTP API (Axum).
//!
//! Exposes model routing, the model catalog, per-model analytics and a
//! health probe to application call sites.

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use state::AppState;

/// Build the application router with a custom state.
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::model_routes())
        .merge(routes::routing_routes())
        .merge(routes::analytics_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests;
