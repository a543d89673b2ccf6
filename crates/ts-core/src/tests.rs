use crate::*;
use chrono::{Duration, Utc};
use std::io::Write;

// ========== Selection Criteria ==========

#[test]
fn test_criteria_defaults_from_empty_json() {
    let c: SelectionCriteria = serde_json::from_str("{}").unwrap();
    assert_eq!(c.task_type, "chat");
    assert_eq!(c.urgency, Urgency::Medium);
    assert_eq!(c.complexity, Complexity::Moderate);
    assert_eq!(c.user_tier, UserTier::Free);
    assert!(c.cultural_context.is_none());
}

#[test]
fn test_criteria_lowercase_enums() {
    let c: SelectionCriteria = serde_json::from_str(
        r#"{"task_type":"crisis","urgency":"critical","complexity":"complex","user_tier":"enterprise","cultural_context":"latinx"}"#,
    )
    .unwrap();
    assert!(c.is_crisis());
    assert_eq!(c.urgency, Urgency::Critical);
    assert_eq!(c.user_tier, UserTier::Enterprise);
    assert_eq!(c.cultural_context.as_deref(), Some("latinx"));
}

#[test]
fn test_criteria_rejects_unknown_urgency() {
    let r: std::result::Result<SelectionCriteria, _> = serde_json::from_str(r#"{"urgency":"asap"}"#);
    assert!(r.is_err());
}

#[test]
fn test_urgency_pressing() {
    assert!(Urgency::High.is_pressing());
    assert!(Urgency::Critical.is_pressing());
    assert!(!Urgency::Medium.is_pressing());
}

#[test]
fn test_tier_ordering() {
    assert!(UserTier::Free < UserTier::Premium);
    assert!(UserTier::Premium < UserTier::Enterprise);
    assert_eq!(UserTier::Premium.to_string(), "premium");
}

// ========== Model Descriptor ==========

#[test]
fn test_descriptor_capabilities() {
    let m = ModelDescriptor::new("m", "p", 0.8, 0.00001, 900).with_capabilities(&["chat", "crisis"]);
    assert!(m.has_capability(capability::CRISIS));
    assert!(!m.has_capability(capability::CULTURAL));
    assert!(m.available);
}

#[test]
fn test_descriptor_validate() {
    assert!(ModelDescriptor::new("m", "p", 0.8, 0.0, 100).validate().is_ok());
    assert!(ModelDescriptor::new("m", "p", 1.2, 0.0, 100).validate().is_err());
    assert!(ModelDescriptor::new("m", "p", 0.5, -0.1, 100).validate().is_err());
    assert!(ModelDescriptor::new("  ", "p", 0.5, 0.0, 100).validate().is_err());
    assert!(ModelDescriptor::new("m", "p", f64::NAN, 0.0, 100).validate().is_err());
}

#[test]
fn test_descriptor_value_and_cost() {
    let m = ModelDescriptor::new("m", "p", 0.5, 0.001, 100);
    assert!((m.cost_for(1000) - 1.0).abs() < 1e-9);
    assert!(m.value_score(1e-9) > 499.0);
}

#[test]
fn test_descriptor_json_defaults() {
    let m: ModelDescriptor = serde_json::from_str(
        r#"{"id":"x","provider":"openai","quality_score":0.7,"cost_per_token":0.000002,"average_latency_ms":700}"#,
    )
    .unwrap();
    assert!(m.available);
    assert_eq!(m.min_tier, UserTier::Free);
    assert!(m.capabilities.is_empty());
}

// ========== Records and Ranges ==========

#[test]
fn test_record_builder() {
    let ctx = RequestContext { user_id: "u1".into(), session_id: Some("s1".into()), system_prompt: None };
    let r = PerformanceRecord::new("gpt-4o", "openai", "chat", 1200, false)
        .with_usage(100, 0.003)
        .with_error("boom")
        .with_context(&ctx);
    assert_eq!(r.user_id.as_deref(), Some("u1"));
    assert_eq!(r.session_id.as_deref(), Some("s1"));
    assert_eq!(r.error.as_deref(), Some("boom"));
    assert_eq!(r.tokens_used, 100);
}

#[test]
fn test_time_range_contains() {
    let now = Utc::now();
    let range = TimeRange::new(now - Duration::hours(1), now);
    assert!(range.contains(&(now - Duration::minutes(5))));
    assert!(!range.contains(&now));
    assert!(!range.contains(&(now - Duration::hours(2))));
    assert!(TimeRange::all().contains(&now));
}

#[test]
fn test_time_range_last_includes_now() {
    let r = PerformanceRecord::new("m", "p", "chat", 1, true);
    assert!(TimeRange::last(Duration::hours(24)).contains(&r.timestamp));
}

#[test]
fn test_time_range_span_past_min_utc() {
    let huge = Duration::try_hours(3_000_000_000).unwrap();
    assert!(TimeRange::try_last(huge).is_none());
    let clamped = TimeRange::last(huge);
    assert_eq!(clamped.start, chrono::DateTime::<Utc>::MIN_UTC);
    assert!(clamped.contains(&Utc::now()));
    assert!(TimeRange::try_last(Duration::hours(24)).is_some());
}

// ========== Configuration ==========

#[test]
fn test_config_defaults() {
    let c = RouterConfig::default();
    assert_eq!(c.policy.latency_threshold_ms, 1500);
    assert_eq!(c.dispatch.max_attempts, 2);
    assert_eq!(c.dispatch.fallback_confidence, 0.5);
    assert!(c.validate().is_ok());
}

#[test]
fn test_config_partial_json() {
    let c = RouterConfig::from_json_str(r#"{"dispatch":{"attempt_timeout_ms":500}}"#).unwrap();
    assert_eq!(c.dispatch.attempt_timeout_ms, 500);
    assert_eq!(c.dispatch.max_attempts, 2);
    assert_eq!(c.policy.free_quality_floor, 0.5);
}

#[test]
fn test_config_rejects_zero_attempts() {
    let err = RouterConfig::from_json_str(r#"{"dispatch":{"max_attempts":0}}"#).unwrap_err();
    assert!(matches!(err, RouterError::Config(_)));
}

#[test]
fn test_config_rejects_bad_model() {
    let raw = r#"{"models":[{"id":"x","provider":"p","quality_score":3.0,"cost_per_token":0.0,"average_latency_ms":1}]}"#;
    assert!(matches!(RouterConfig::from_json_str(raw), Err(RouterError::InvalidModel { .. })));
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"policy":{{"latency_threshold_ms":900}}}}"#).unwrap();
    let c = RouterConfig::from_file(file.path()).unwrap();
    assert_eq!(c.policy.latency_threshold_ms, 900);
}

#[test]
fn test_config_missing_file() {
    assert!(matches!(RouterConfig::from_file("/nonexistent/router.json"), Err(RouterError::Io(_))));
}
