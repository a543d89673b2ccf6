//! Per-model and per-task summaries over a time range.

use crate::store::AnalyticsStore;
use std::collections::HashMap;
use std::sync::Arc;
use ts_core::types::{ModelStats, PerformanceRecord, TimeRange};

#[derive(Clone)]
pub struct AnalyticsAggregator {
    store: Arc<dyn AnalyticsStore>,
}

impl AnalyticsAggregator {
    pub fn new(store: Arc<dyn AnalyticsStore>) -> Self {
        Self { store }
    }

    /// Stats keyed by model id. Query errors yield an empty map.
    pub async fn get_model_analytics(&self, range: TimeRange) -> HashMap<String, ModelStats> {
        match self.store.query(range).await {
            Ok(records) => summarize_by(&records, |r| r.model_id.as_str()),
            Err(e) => {
                tracing::warn!(error = %e, "analytics query failed, returning empty model stats");
                HashMap::new()
            }
        }
    }

    /// Stats keyed by task type. Query errors yield an empty map.
    pub async fn get_task_analytics(&self, range: TimeRange) -> HashMap<String, ModelStats> {
        match self.store.query(range).await {
            Ok(records) => summarize_by(&records, |r| r.task_type.as_str()),
            Err(e) => {
                tracing::warn!(error = %e, "analytics query failed, returning empty task stats");
                HashMap::new()
            }
        }
    }
}

#[derive(Default)]
struct Accumulator {
    total: u64,
    successes: u64,
    latency_sum: u128,
    tokens: u64,
    cost: f64,
}

/// Group records by `key` and compute summary statistics.
pub fn summarize_by<'a, F>(records: &'a [PerformanceRecord], key: F) -> HashMap<String, ModelStats>
where
    F: Fn(&'a PerformanceRecord) -> &'a str,
{
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();
    for record in records {
        let acc = groups.entry(key(record)).or_default();
        acc.total += 1;
        if record.success {
            acc.successes += 1;
        }
        acc.latency_sum += u128::from(record.response_time_ms);
        acc.tokens = acc.tokens.saturating_add(record.tokens_used);
        acc.cost += record.cost;
    }

    groups
        .into_iter()
        .map(|(k, acc)| {
            let total = acc.total as f64;
            let stats = ModelStats {
                total_requests: acc.total,
                avg_response_time: acc.latency_sum as f64 / total,
                success_rate: 100.0 * acc.successes as f64 / total,
                total_tokens: acc.tokens,
                total_cost: acc.cost,
            };
            (k.to_string(), stats)
        })
        .collect()
}
