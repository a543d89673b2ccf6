use crate::error::{Result, RouterError};
use crate::types::UserTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Well-known capability tags.
pub mod capability {
    pub const CHAT: &str = "chat";
    pub const CRISIS: &str = "crisis";
    pub const CULTURAL: &str = "cultural";
    pub const ANALYSIS: &str = "analysis";
}

/// One upstream model option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub provider: String,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    pub quality_score: f64,
    pub cost_per_token: f64,
    pub average_latency_ms: u64,
    #[serde(default = "default_available")]
    pub available: bool,
    /// Lowest subscription tier allowed to use this model.
    #[serde(default)]
    pub min_tier: UserTier,
}

fn default_available() -> bool {
    true
}

impl ModelDescriptor {
    pub fn new(
        id: impl Into<String>,
        provider: impl Into<String>,
        quality_score: f64,
        cost_per_token: f64,
        average_latency_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            capabilities: BTreeSet::new(),
            quality_score,
            cost_per_token,
            average_latency_ms,
            available: true,
            min_tier: UserTier::Free,
        }
    }

    pub fn with_capabilities(mut self, tags: &[&str]) -> Self {
        self.capabilities.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_min_tier(mut self, tier: UserTier) -> Self {
        self.min_tier = tier;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn has_capability(&self, tag: &str) -> bool {
        self.capabilities.contains(tag)
    }

    /// Quality per unit of cost. `epsilon` keeps free models finite.
    pub fn value_score(&self, epsilon: f64) -> f64 {
        self.quality_score / (self.cost_per_token + epsilon)
    }

    /// Estimated cost of a call that consumed `tokens`.
    pub fn cost_for(&self, tokens: u64) -> f64 {
        self.cost_per_token * tokens as f64
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| RouterError::InvalidModel {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }
        if !(0.0..=1.0).contains(&self.quality_score) {
            return Err(invalid("quality_score must be within [0, 1]"));
        }
        if !self.cost_per_token.is_finite() || self.cost_per_token < 0.0 {
            return Err(invalid("cost_per_token must be non-negative"));
        }
        Ok(())
    }
}
