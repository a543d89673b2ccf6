//! Model registry: which models exist and which are reachable right now.

use crate::catalog::DEFAULT_CATALOG;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use ts_core::error::{Result, RouterError};
use ts_core::{ModelDescriptor, RouterConfig};

/// Catalog lookup injected into the router.
pub trait ModelRegistry: Send + Sync {
    /// Available models, optionally restricted to one capability tag.
    /// Never returns a model with `available == false`.
    fn list_available(&self, capability: Option<&str>) -> Vec<ModelDescriptor>;

    /// Every model, with availability evaluated now.
    fn list_all(&self) -> Vec<ModelDescriptor>;

    fn get(&self, id: &str) -> Option<ModelDescriptor> {
        self.list_all().into_iter().find(|m| m.id == id)
    }
}

/// Extra availability check run on every listing, e.g. "is the API key set".
pub type AvailabilityProbe = Arc<dyn Fn(&ModelDescriptor) -> bool + Send + Sync>;

/// Probe that requires `<PROVIDER>_API_KEY` to be set and non-empty.
pub fn api_key_probe() -> AvailabilityProbe {
    Arc::new(|model: &ModelDescriptor| {
        let var = format!("{}_API_KEY", model.provider.to_uppercase().replace('-', "_"));
        std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false)
    })
}

/// In-memory registry with runtime availability toggles.
pub struct StaticRegistry {
    models: RwLock<Vec<ModelDescriptor>>,
    probe: Option<AvailabilityProbe>,
}

impl StaticRegistry {
    pub fn from_models(models: Vec<ModelDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for m in &models {
            m.validate()?;
            if !seen.insert(m.id.clone()) {
                return Err(RouterError::DuplicateModel(m.id.clone()));
            }
        }
        Ok(Self { models: RwLock::new(models), probe: None })
    }

    pub fn with_default_catalog() -> Self {
        Self { models: RwLock::new(DEFAULT_CATALOG.clone()), probe: None }
    }

    /// Use the configured catalog, or the built-in one when none is given.
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        if config.models.is_empty() {
            Ok(Self::with_default_catalog())
        } else {
            Self::from_models(config.models.clone())
        }
    }

    pub fn with_probe(mut self, probe: AvailabilityProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Flip a model's declared availability. Returns false for unknown ids.
    pub fn set_available(&self, id: &str, available: bool) -> bool {
        let mut models = self.models.write().unwrap_or_else(|p| p.into_inner());
        match models.iter_mut().find(|m| m.id == id) {
            Some(m) => {
                m.available = available;
                tracing::info!(model_id = id, available, "model availability changed");
                true
            }
            None => false,
        }
    }

    fn evaluate(&self, model: &ModelDescriptor) -> ModelDescriptor {
        let mut m = model.clone();
        if m.available {
            if let Some(probe) = &self.probe {
                m.available = probe(model);
            }
        }
        m
    }
}

impl ModelRegistry for StaticRegistry {
    fn list_available(&self, capability: Option<&str>) -> Vec<ModelDescriptor> {
        let models = self.models.read().unwrap_or_else(|p| p.into_inner());
        models
            .iter()
            .filter(|m| capability.map_or(true, |tag| m.has_capability(tag)))
            .map(|m| self.evaluate(m))
            .filter(|m| m.available)
            .collect()
    }

    fn list_all(&self) -> Vec<ModelDescriptor> {
        let models = self.models.read().unwrap_or_else(|p| p.into_inner());
        models.iter().map(|m| self.evaluate(m)).collect()
    }
}
