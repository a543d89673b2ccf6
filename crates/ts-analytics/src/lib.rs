//! Performance analytics: storage, recording and aggregation of dispatch attempts.

pub mod aggregator;
pub mod jsonl;
pub mod recorder;
pub mod store;

pub use aggregator::{summarize_by, AnalyticsAggregator};
pub use jsonl::JsonlStore;
pub use recorder::AnalyticsRecorder;
pub use store::{AnalyticsStore, MemoryStore};
