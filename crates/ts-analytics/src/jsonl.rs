//! JSONL-file analytics store: one serialized record per line.

use crate::store::AnalyticsStore;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use ts_core::error::{Result, RouterError};
use ts_core::types::{PerformanceRecord, TimeRange};

pub struct JsonlStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AnalyticsStore for JsonlStore {
    async fn append(&self, record: &PerformanceRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RouterError::Storage(format!("mkdir {}: {e}", parent.display())))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| RouterError::Storage(format!("open {}: {e}", self.path.display())))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| RouterError::Storage(format!("append {}: {e}", self.path.display())))?;
        file.flush()
            .await
            .map_err(|e| RouterError::Storage(format!("flush {}: {e}", self.path.display())))
    }

    async fn query(&self, range: TimeRange) -> Result<Vec<PerformanceRecord>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RouterError::Storage(format!("read {}: {e}", self.path.display()))),
        };

        let mut records = Vec::new();
        for (lineno, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PerformanceRecord>(line) {
                Ok(record) if range.contains(&record.timestamp) => records.push(record),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), line = lineno + 1, error = %e, "skipping corrupt analytics line");
                }
            }
        }
        Ok(records)
    }
}
