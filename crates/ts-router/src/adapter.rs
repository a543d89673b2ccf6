//! Provider adapter seam. Adapters own the provider wire formats.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Text and token usage returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterResponse {
    pub text: String,
    pub tokens_used: u64,
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Invoke `model_id`. `timeout` is the attempt budget the router enforces;
    /// adapters may pass it on to their transport.
    async fn invoke(
        &self,
        model_id: &str,
        message: &str,
        system_prompt: Option<&str>,
        timeout: Duration,
    ) -> anyhow::Result<AdapterResponse>;
}

/// Adapters keyed by provider name, with an optional catch-all.
#[derive(Clone, Default)]
pub struct AdapterSet {
    by_provider: HashMap<String, Arc<dyn ProviderAdapter>>,
    default: Option<Arc<dyn ProviderAdapter>>,
}

impl AdapterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl Into<String>, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.by_provider.insert(provider.into(), adapter);
        self
    }

    /// Adapter used for providers without a dedicated entry.
    pub fn with_default(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.default = Some(adapter);
        self
    }

    pub fn get(&self, provider: &str) -> Option<&Arc<dyn ProviderAdapter>> {
        self.by_provider.get(provider).or(self.default.as_ref())
    }

    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_provider.keys().cloned().collect();
        names.sort();
        names
    }
}
