//! Application state shared across all handlers.

use std::sync::Arc;
use ts_analytics::{AnalyticsAggregator, AnalyticsRecorder, AnalyticsStore};
use ts_core::error::Result;
use ts_core::RouterConfig;
use ts_router::{AdapterSet, ModelRouter, StaticRegistry};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ModelRouter>,
    pub aggregator: AnalyticsAggregator,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(router: Arc<ModelRouter>, aggregator: AnalyticsAggregator) -> Self {
        Self { router, aggregator, start_time: std::time::Instant::now() }
    }

    /// Wire registry, router and analytics from configuration around one store.
    pub fn from_config(config: &RouterConfig, adapters: AdapterSet, store: Arc<dyn AnalyticsStore>) -> Result<Self> {
        config.validate()?;
        let registry = StaticRegistry::from_config(config)?;
        let router = ModelRouter::new(Arc::new(registry), adapters, AnalyticsRecorder::new(store.clone()))
            .with_config(config);
        Ok(Self::new(Arc::new(router), AnalyticsAggregator::new(store)))
    }
}
