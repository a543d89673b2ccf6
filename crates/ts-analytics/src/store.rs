//! Analytics storage seam and the in-memory store.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use ts_core::error::{Result, RouterError};
use ts_core::types::{PerformanceRecord, TimeRange};

/// Append-only persistence for performance records.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn append(&self, record: &PerformanceRecord) -> Result<()>;
    async fn query(&self, range: TimeRange) -> Result<Vec<PerformanceRecord>>;
}

/// Process-local store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Vec<PerformanceRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every record in insertion order.
    pub fn records(&self) -> Vec<PerformanceRecord> {
        self.inner.read().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn append(&self, record: &PerformanceRecord) -> Result<()> {
        self.inner
            .write()
            .map_err(|e| RouterError::Storage(format!("memory store poisoned: {e}")))?
            .push(record.clone());
        Ok(())
    }

    async fn query(&self, range: TimeRange) -> Result<Vec<PerformanceRecord>> {
        let records = self
            .inner
            .read()
            .map_err(|e| RouterError::Storage(format!("memory store poisoned: {e}")))?;
        Ok(records.iter().filter(|r| range.contains(&r.timestamp)).cloned().collect())
    }
}
