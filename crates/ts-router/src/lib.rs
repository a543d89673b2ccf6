//! TherapySync model router: registry, selection policy and fallback dispatch.

pub mod adapter;
pub mod catalog;
pub mod dispatcher;
pub mod openai;
pub mod policy;
pub mod registry;

pub use adapter::{AdapterResponse, AdapterSet, ProviderAdapter};
pub use catalog::{default_catalog, DEFAULT_CATALOG};
pub use dispatcher::{ModelRouter, FALLBACK_MODEL};
pub use openai::OpenAiCompatAdapter;
pub use policy::{select_optimal_model, Ranking, SelectionPolicy};
pub use registry::{api_key_probe, AvailabilityProbe, ModelRegistry, StaticRegistry};
