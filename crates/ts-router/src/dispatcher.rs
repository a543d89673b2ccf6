//! Dispatcher: invoke the selected model, retry down the ranking, degrade to
//! a canned response when every attempt fails.

use crate::adapter::{AdapterResponse, AdapterSet};
use crate::policy::SelectionPolicy;
use crate::registry::ModelRegistry;
use std::sync::Arc;
use std::time::Instant;
use ts_analytics::AnalyticsRecorder;
use ts_core::error::{Result, RouterError};
use ts_core::{
    DispatchConfig, ModelDescriptor, PerformanceRecord, RouterConfig, RoutingRequest, RoutingResult,
    SelectionCriteria,
};

pub const FALLBACK_MODEL: &str = "fallback";

/// Dispatch progress for one request.
#[derive(Debug)]
enum DispatchState {
    Selecting,
    Invoking { index: usize, attempt: u32 },
    Retrying { failed: String, next: usize, attempt: u32 },
    Succeeded(RoutingResult),
    Fallback { attempts: u32 },
}

/// Policy-driven router between call sites and provider adapters.
pub struct ModelRouter {
    registry: Arc<dyn ModelRegistry>,
    adapters: AdapterSet,
    policy: SelectionPolicy,
    recorder: AnalyticsRecorder,
    dispatch: DispatchConfig,
}

impl ModelRouter {
    pub fn new(registry: Arc<dyn ModelRegistry>, adapters: AdapterSet, recorder: AnalyticsRecorder) -> Self {
        Self {
            registry,
            adapters,
            policy: SelectionPolicy::default(),
            recorder,
            dispatch: DispatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: &RouterConfig) -> Self {
        self.policy = SelectionPolicy::new(config.policy.clone());
        self.dispatch = config.dispatch.clone();
        self
    }

    pub fn registry(&self) -> &Arc<dyn ModelRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    pub fn select_optimal_model(&self, criteria: &SelectionCriteria) -> Result<ModelDescriptor> {
        self.policy.select(criteria, self.registry.as_ref())
    }

    /// Route one message. Only a selection failure (no available model at
    /// all) is returned as an error; dispatch failures degrade to the
    /// fallback result.
    pub async fn route_message(&self, request: &RoutingRequest, criteria: &SelectionCriteria) -> Result<RoutingResult> {
        let started = Instant::now();
        let mut ranked: Vec<ModelDescriptor> = Vec::new();
        let mut state = DispatchState::Selecting;

        loop {
            state = match state {
                DispatchState::Selecting => {
                    let ranking = self.policy.rank(criteria, &self.registry.list_available(None));
                    if ranking.is_empty() {
                        tracing::error!(task_type = %criteria.task_type, "no models available for routing");
                        return Err(RouterError::NoModelsAvailable);
                    }
                    tracing::debug!(
                        primary = %ranking.models[0].id,
                        candidates = ranking.models.len(),
                        reasoning = %ranking.reasoning(),
                        "model selected"
                    );
                    ranked = ranking.models;
                    DispatchState::Invoking { index: 0, attempt: 1 }
                }
                DispatchState::Invoking { index, attempt } => {
                    let model = &ranked[index];
                    let attempt_started = Instant::now();
                    let outcome = self.invoke(model, request).await;
                    let elapsed_ms = attempt_started.elapsed().as_millis() as u64;

                    match outcome {
                        Ok(response) => {
                            let record = PerformanceRecord::new(&model.id, &model.provider, &criteria.task_type, elapsed_ms, true)
                                .with_usage(response.tokens_used, model.cost_for(response.tokens_used))
                                .with_context(&request.context);
                            self.record(record).await;
                            tracing::info!(model_id = %model.id, attempt, elapsed_ms, "request served");
                            DispatchState::Succeeded(RoutingResult {
                                message: response.text,
                                model_used: model.id.clone(),
                                provider: model.provider.clone(),
                                response_time_ms: started.elapsed().as_millis() as u64,
                                confidence: model.quality_score,
                                tokens_used: response.tokens_used,
                                attempts: attempt,
                                fallback: false,
                            })
                        }
                        Err(e) => {
                            let record = PerformanceRecord::new(&model.id, &model.provider, &criteria.task_type, elapsed_ms, false)
                                .with_error(e.to_string())
                                .with_context(&request.context);
                            self.record(record).await;
                            tracing::warn!(model_id = %model.id, attempt, error = %e, "model attempt failed");

                            if attempt < self.dispatch.max_attempts && index + 1 < ranked.len() {
                                DispatchState::Retrying { failed: model.id.clone(), next: index + 1, attempt }
                            } else {
                                DispatchState::Fallback { attempts: attempt }
                            }
                        }
                    }
                }
                DispatchState::Retrying { failed, next, attempt } => {
                    tracing::info!(failed = %failed, next = %ranked[next].id, "retrying with next candidate");
                    DispatchState::Invoking { index: next, attempt: attempt + 1 }
                }
                DispatchState::Succeeded(result) => return Ok(result),
                DispatchState::Fallback { attempts } => {
                    tracing::error!(attempts, task_type = %criteria.task_type, "all model attempts failed, returning fallback response");
                    return Ok(self.fallback_result(started, attempts));
                }
            };
        }
    }

    async fn invoke(&self, model: &ModelDescriptor, request: &RoutingRequest) -> Result<AdapterResponse> {
        let adapter = self
            .adapters
            .get(&model.provider)
            .ok_or_else(|| RouterError::AdapterMissing(model.provider.clone()))?;
        let timeout = self.dispatch.attempt_timeout();
        let call = adapter.invoke(&model.id, &request.message, request.context.system_prompt.as_deref(), timeout);

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(response)) if response.text.trim().is_empty() => Err(RouterError::Provider {
                model_id: model.id.clone(),
                message: "empty response".into(),
            }),
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(RouterError::Provider { model_id: model.id.clone(), message: format!("{e:#}") }),
            Err(_) => Err(RouterError::Timeout { model_id: model.id.clone(), timeout_ms: self.dispatch.attempt_timeout_ms }),
        }
    }

    /// Hand the record to a detached write; the write finishes even if this
    /// request is abandoned while waiting on it.
    async fn record(&self, record: PerformanceRecord) {
        if let Err(e) = self.recorder.record_detached(record).await {
            tracing::warn!(error = %e, "analytics task failed");
        }
    }

    fn fallback_result(&self, started: Instant, attempts: u32) -> RoutingResult {
        RoutingResult {
            message: self.dispatch.fallback_message.clone(),
            model_used: FALLBACK_MODEL.into(),
            provider: FALLBACK_MODEL.into(),
            response_time_ms: started.elapsed().as_millis() as u64,
            confidence: self.dispatch.fallback_confidence,
            tokens_used: 0,
            attempts,
            fallback: true,
        }
    }
}
