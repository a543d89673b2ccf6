//! Built-in model catalog.

use ts_core::model::capability::{ANALYSIS, CHAT, CRISIS, CULTURAL};
use ts_core::{ModelDescriptor, UserTier};

fn model(
    id: &str,
    provider: &str,
    quality: f64,
    cost: f64,
    latency_ms: u64,
    caps: &[&str],
) -> ModelDescriptor {
    ModelDescriptor::new(id, provider, quality, cost, latency_ms).with_capabilities(caps)
}

/// Default catalog. Costs are USD per token.
pub fn default_catalog() -> Vec<ModelDescriptor> {
    vec![
        model("claude-3-opus", "anthropic", 0.95, 0.000075, 2500, &[CHAT, CRISIS, ANALYSIS, CULTURAL])
            .with_min_tier(UserTier::Premium),
        model("gpt-4o", "openai", 0.92, 0.00003, 1200, &[CHAT, CRISIS, ANALYSIS, CULTURAL]),
        model("claude-3-sonnet", "anthropic", 0.88, 0.000015, 1400, &[CHAT, ANALYSIS, CULTURAL]),
        model("llama-3-70b", "groq", 0.82, 0.0000008, 500, &[CHAT, ANALYSIS]),
        model("gpt-4o-mini", "openai", 0.80, 0.0000006, 800, &[CHAT, ANALYSIS]),
        model("claude-3-haiku", "anthropic", 0.75, 0.00000125, 600, &[CHAT, CULTURAL]),
        model("gpt-3.5-turbo", "openai", 0.70, 0.000002, 700, &[CHAT]),
    ]
}

/// The default catalog instance.
pub static DEFAULT_CATALOG: std::sync::LazyLock<Vec<ModelDescriptor>> = std::sync::LazyLock::new(default_catalog);
