use crate::error::{Result, RouterError};
use crate::model::ModelDescriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FALLBACK_MESSAGE: &str = "I apologize, but I'm experiencing technical difficulties right now. \
Please try again in a moment. If you are in crisis, please contact your local emergency number or a crisis hotline.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub policy: PolicyConfig,
    pub dispatch: DispatchConfig,
    /// Catalog override. Empty means the built-in catalog.
    pub models: Vec<ModelDescriptor>,
}

/// Selection thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum quality a free-tier pick must reach.
    pub free_quality_floor: f64,
    /// Minimum quality preferred for complex tasks.
    pub complex_quality_floor: f64,
    /// Latency ceiling preferred for high and critical urgency.
    pub latency_threshold_ms: u64,
    pub epsilon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub attempt_timeout_ms: u64,
    /// Primary plus fallbacks.
    pub max_attempts: u32,
    pub fallback_message: String,
    pub fallback_confidence: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            free_quality_floor: 0.5,
            complex_quality_floor: 0.88,
            latency_threshold_ms: 1500,
            epsilon: 1e-9,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: 30_000,
            max_attempts: 2,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.into(),
            fallback_confidence: 0.5,
        }
    }
}

impl DispatchConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

impl RouterConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading router config");
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.policy.free_quality_floor) {
            return Err(RouterError::Config("free_quality_floor must be within [0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.policy.complex_quality_floor) {
            return Err(RouterError::Config("complex_quality_floor must be within [0, 1]".into()));
        }
        if self.policy.epsilon <= 0.0 {
            return Err(RouterError::Config("epsilon must be positive".into()));
        }
        if self.dispatch.max_attempts == 0 {
            return Err(RouterError::Config("max_attempts must be at least 1".into()));
        }
        if self.dispatch.attempt_timeout_ms == 0 {
            return Err(RouterError::Config("attempt_timeout_ms must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.dispatch.fallback_confidence) {
            return Err(RouterError::Config("fallback_confidence must be within [0, 1]".into()));
        }
        for model in &self.models {
            model.validate()?;
        }
        Ok(())
    }
}
