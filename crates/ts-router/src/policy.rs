//! Selection policy: deterministic ranking of models for a request.
//!
//! Each stage narrows the candidate set. A stage that would remove every
//! candidate is skipped and the previous set is kept.

use crate::registry::ModelRegistry;
use std::cmp::Ordering;
use ts_core::error::{Result, RouterError};
use ts_core::model::capability;
use ts_core::{Complexity, ModelDescriptor, PolicyConfig, SelectionCriteria, UserTier};

/// Ordered candidates plus the signals that shaped the order.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    pub models: Vec<ModelDescriptor>,
    pub signals: Vec<String>,
}

impl Ranking {
    pub fn primary(&self) -> Option<&ModelDescriptor> {
        self.models.first()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn reasoning(&self) -> String {
        self.signals.join(" | ")
    }
}

/// Ordering applied once narrowing is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RankKey {
    Cheapest,
    BestQuality,
    FastQuality,
    Value,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionPolicy {
    config: PolicyConfig,
}

impl SelectionPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Pick exactly one available model.
    pub fn select(&self, criteria: &SelectionCriteria, registry: &dyn ModelRegistry) -> Result<ModelDescriptor> {
        let ranking = self.rank(criteria, &registry.list_available(None));
        ranking.models.into_iter().next().ok_or(RouterError::NoModelsAvailable)
    }

    /// Rank every available model. The narrowed set comes first; the rest of
    /// the pool follows so a dispatcher always has a next candidate.
    pub fn rank(&self, criteria: &SelectionCriteria, models: &[ModelDescriptor]) -> Ranking {
        let pool: Vec<&ModelDescriptor> = models.iter().filter(|m| m.available).collect();
        let mut signals = Vec::new();
        if pool.is_empty() {
            return Ranking { models: Vec::new(), signals };
        }

        let task = criteria.task_type.as_str();
        let mut candidates = narrow(&pool, |m| m.has_capability(task));
        if pool.iter().any(|m| m.has_capability(task)) {
            signals.push(format!("task '{task}'"));
        } else {
            signals.push(format!("task '{task}' unmatched -> balanced"));
        }

        if criteria.is_crisis() {
            signals.push("crisis -> highest quality".into());
            sort_models(&mut candidates, |a, b| by_quality(a, b).then(a.average_latency_ms.cmp(&b.average_latency_ms)));
            let mut rest = remainder(&pool, &candidates);
            sort_models(&mut rest, by_quality);
            return finish(candidates, rest, signals);
        }

        let tier = criteria.user_tier;
        let tier_ok = |m: &ModelDescriptor| m.min_tier <= tier;
        let before = candidates.len();
        candidates = narrow(&candidates, tier_ok);
        if candidates.len() < before {
            signals.push(format!("tier {tier} gate"));
        }

        if tier == UserTier::Free {
            let floor = self.config.free_quality_floor;
            candidates = narrow(&candidates, |m| m.quality_score >= floor);
            signals.push(format!("free tier -> cheapest with quality >= {floor}"));
        }
        if criteria.complexity == Complexity::Complex {
            let floor = self.config.complex_quality_floor;
            candidates = narrow(&candidates, |m| m.quality_score >= floor);
            signals.push("complex -> quality first".into());
        }
        if criteria.urgency.is_pressing() {
            let limit = self.config.latency_threshold_ms;
            candidates = narrow(&candidates, |m| m.average_latency_ms < limit);
            signals.push(format!("urgency {:?} -> latency < {limit}ms", criteria.urgency));
        }

        let key = if tier == UserTier::Free {
            RankKey::Cheapest
        } else if criteria.complexity == Complexity::Complex {
            RankKey::BestQuality
        } else if criteria.urgency.is_pressing() {
            RankKey::FastQuality
        } else {
            RankKey::Value
        };

        let cultural = criteria.cultural_context.as_deref();
        if let Some(ctx) = cultural {
            signals.push(format!("cultural '{ctx}' preferred"));
        }
        let epsilon = self.config.epsilon;
        sort_models(&mut candidates, |a, b| {
            cultural_first(a, b, cultural).then_with(|| compare(key, a, b, epsilon))
        });

        let mut rest: Vec<&ModelDescriptor> = remainder(&pool, &candidates);
        if rest.iter().any(|m| tier_ok(*m)) {
            rest.retain(|m| tier_ok(*m));
        }
        sort_models(&mut rest, |a, b| compare(RankKey::Value, a, b, epsilon));

        finish(candidates, rest, signals)
    }
}

/// Select one model from the registry with the given thresholds.
pub fn select_optimal_model(
    criteria: &SelectionCriteria,
    registry: &dyn ModelRegistry,
    config: &PolicyConfig,
) -> Result<ModelDescriptor> {
    SelectionPolicy::new(config.clone()).select(criteria, registry)
}

fn narrow<'a, F>(set: &[&'a ModelDescriptor], keep: F) -> Vec<&'a ModelDescriptor>
where
    F: Fn(&ModelDescriptor) -> bool,
{
    let kept: Vec<&ModelDescriptor> = set.iter().copied().filter(|m| keep(*m)).collect();
    if kept.is_empty() {
        set.to_vec()
    } else {
        kept
    }
}

fn remainder<'a>(pool: &[&'a ModelDescriptor], taken: &[&'a ModelDescriptor]) -> Vec<&'a ModelDescriptor> {
    pool.iter()
        .copied()
        .filter(|m| !taken.iter().any(|t| t.id == m.id))
        .collect()
}

fn finish(head: Vec<&ModelDescriptor>, tail: Vec<&ModelDescriptor>, signals: Vec<String>) -> Ranking {
    let models = head.into_iter().chain(tail).cloned().collect();
    Ranking { models, signals }
}

/// Sort with the model id as the final tie-break so ranking is deterministic.
fn sort_models<F>(set: &mut [&ModelDescriptor], cmp: F)
where
    F: Fn(&ModelDescriptor, &ModelDescriptor) -> Ordering,
{
    set.sort_by(|a, b| cmp(*a, *b).then_with(|| a.id.cmp(&b.id)));
}

fn by_quality(a: &ModelDescriptor, b: &ModelDescriptor) -> Ordering {
    b.quality_score.total_cmp(&a.quality_score)
}

fn cultural_first(a: &ModelDescriptor, b: &ModelDescriptor, ctx: Option<&str>) -> Ordering {
    match ctx {
        Some(ctx) => {
            let fits = |m: &ModelDescriptor| m.has_capability(capability::CULTURAL) || m.has_capability(ctx);
            fits(b).cmp(&fits(a))
        }
        None => Ordering::Equal,
    }
}

fn compare(key: RankKey, a: &ModelDescriptor, b: &ModelDescriptor, epsilon: f64) -> Ordering {
    match key {
        RankKey::Cheapest => a.cost_per_token.total_cmp(&b.cost_per_token).then_with(|| by_quality(a, b)),
        RankKey::BestQuality => by_quality(a, b).then_with(|| a.cost_per_token.total_cmp(&b.cost_per_token)),
        RankKey::FastQuality => by_quality(a, b).then(a.average_latency_ms.cmp(&b.average_latency_ms)),
        RankKey::Value => b.value_score(epsilon).total_cmp(&a.value_score(epsilon)),
    }
}
