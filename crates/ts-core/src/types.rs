use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::model::capability;

/// How quickly the caller needs an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn is_pressing(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

/// Subscription tier. Ordered from least to most privileged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    #[default]
    Free,
    Premium,
    Enterprise,
}

impl fmt::Display for UserTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserTier::Free => write!(f, "free"),
            UserTier::Premium => write!(f, "premium"),
            UserTier::Enterprise => write!(f, "enterprise"),
        }
    }
}

fn default_task_type() -> String {
    capability::CHAT.to_string()
}

/// Caller's description of a task, built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    #[serde(default = "default_task_type")]
    pub task_type: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub user_tier: UserTier,
    #[serde(default)]
    pub cultural_context: Option<String>,
}

impl SelectionCriteria {
    pub fn new(task_type: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            urgency: Urgency::default(),
            complexity: Complexity::default(),
            user_tier: UserTier::default(),
            cultural_context: None,
        }
    }

    pub fn urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn tier(mut self, tier: UserTier) -> Self {
        self.user_tier = tier;
        self
    }

    pub fn cultural_context(mut self, context: impl Into<String>) -> Self {
        self.cultural_context = Some(context.into());
        self
    }

    pub fn is_crisis(&self) -> bool {
        self.task_type == capability::CRISIS
    }
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self::new(capability::CHAT)
    }
}

/// Who is asking, and with which system prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// Message plus context payload handed to the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRequest {
    pub message: String,
    #[serde(default)]
    pub context: RequestContext,
}

impl RoutingRequest {
    pub fn new(message: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: RequestContext {
                user_id: user_id.into(),
                ..RequestContext::default()
            },
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.context.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.context.session_id = Some(session_id.into());
        self
    }
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult {
    pub message: String,
    pub model_used: String,
    pub provider: String,
    pub response_time_ms: u64,
    pub confidence: f64,
    pub tokens_used: u64,
    /// Number of adapter invocations made for this request.
    pub attempts: u32,
    /// True when every model failed and the canned response was returned.
    pub fallback: bool,
}

/// One logged dispatch attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub id: Uuid,
    pub model_id: String,
    pub provider: String,
    pub task_type: String,
    pub response_time_ms: u64,
    pub success: bool,
    #[serde(default)]
    pub tokens_used: u64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceRecord {
    pub fn new(
        model_id: impl Into<String>,
        provider: impl Into<String>,
        task_type: impl Into<String>,
        response_time_ms: u64,
        success: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            model_id: model_id.into(),
            provider: provider.into(),
            task_type: task_type.into(),
            response_time_ms,
            success,
            tokens_used: 0,
            cost: 0.0,
            error: None,
            user_id: None,
            session_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_usage(mut self, tokens_used: u64, cost: f64) -> Self {
        self.tokens_used = tokens_used;
        self.cost = cost;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        if !ctx.user_id.is_empty() {
            self.user_id = Some(ctx.user_id.clone());
        }
        self.session_id = ctx.session_id.clone();
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The window ending now and reaching `span` into the past. A span
    /// older than the representable range starts at `MIN_UTC`.
    pub fn last(span: Duration) -> Self {
        Self::try_last(span).unwrap_or_else(|| Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: Utc::now() + Duration::milliseconds(1),
        })
    }

    /// Like [`TimeRange::last`], but `None` when `span` reaches past `MIN_UTC`.
    pub fn try_last(span: Duration) -> Option<Self> {
        let now = Utc::now();
        let start = now.checked_sub_signed(span)?;
        // Include records stamped in the same instant the window was built.
        Some(Self { start, end: now + Duration::milliseconds(1) })
    }

    pub fn all() -> Self {
        Self { start: DateTime::<Utc>::MIN_UTC, end: DateTime::<Utc>::MAX_UTC }
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts < self.end
    }
}

/// Summary statistics for one group of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub total_requests: u64,
    /// Arithmetic mean of `response_time_ms`.
    pub avg_response_time: f64,
    /// Percentage in [0, 100].
    pub success_rate: f64,
    pub total_tokens: u64,
    pub total_cost: f64,
}
