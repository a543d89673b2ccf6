//! Analytics recorder. Write failures never reach the caller.

use crate::store::AnalyticsStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use ts_core::types::PerformanceRecord;

#[derive(Clone)]
pub struct AnalyticsRecorder {
    store: Arc<dyn AnalyticsStore>,
}

impl AnalyticsRecorder {
    pub fn new(store: Arc<dyn AnalyticsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn AnalyticsStore> {
        &self.store
    }

    /// Append one record, logging and swallowing any storage error.
    pub async fn record(&self, record: PerformanceRecord) {
        if let Err(e) = self.store.append(&record).await {
            tracing::warn!(
                model_id = %record.model_id,
                record_id = %record.id,
                error = %e,
                "failed to persist performance record"
            );
        }
    }

    /// Spawn the write so it completes even if the caller's future is dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn record_detached(&self, record: PerformanceRecord) -> JoinHandle<()> {
        let recorder = self.clone();
        tokio::spawn(async move { recorder.record(record).await })
    }
}
