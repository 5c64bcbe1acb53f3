// Health checks: live probes combined with service presence

use std::time::Duration;

use sitepulse::config::AppConfig;
use sitepulse::model::{HealthState, OverallHealth};
use sitepulse::telemetry::{HealthTarget, ProbeOutcome, StaticHealthProbe};

use super::test_harness::TestContext;

#[tokio::test]
async fn test_all_healthy_after_initialize() {
    let harness = TestContext::initialized().await;
    let report = harness.ctx.perform_health_check().await;

    assert_eq!(report.overall, OverallHealth::Healthy);
    assert!(report.errors.is_empty());
    assert!(report.checks.values().all(|ok| *ok));
    assert!(harness.ctx.coordinator().get_service_status().initialized);
}

#[tokio::test]
async fn test_slow_and_failing_probes() {
    let probe = StaticHealthProbe::healthy()
        .with_outcome(HealthTarget::Database, ProbeOutcome::ok(1_500.0))
        .with_outcome(HealthTarget::Api, ProbeOutcome::failed(40.0));
    let harness = TestContext::with(AppConfig::default(), probe);
    harness.ctx.initialize().await.unwrap();

    let health = harness.ctx.get_system_health().await;
    assert_eq!(health.database, HealthState::Warning);
    assert_eq!(health.api, HealthState::Critical);
    assert_eq!(health.overall, OverallHealth::Degraded);
}

#[tokio::test]
async fn test_three_tracked_failures_are_critical() {
    let probe = StaticHealthProbe::healthy()
        .with_error(HealthTarget::Server, "connection refused")
        .with_error(HealthTarget::Database, "connection refused")
        .with_error(HealthTarget::Cdn, "dns failure");
    let harness = TestContext::with(AppConfig::default(), probe);

    let health = harness.ctx.get_system_health().await;
    assert_eq!(health.overall, OverallHealth::Critical);

    let report = harness.ctx.perform_health_check().await;
    assert_eq!(report.errors.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_hung_probe_times_out_as_warning() {
    let mut config = AppConfig::default();
    config.health.probe_timeout_ms = 5_000;
    let probe = StaticHealthProbe::healthy().with_hang(HealthTarget::Cdn);
    let harness = TestContext::with(config, probe);

    let started = tokio::time::Instant::now();
    let health = harness.ctx.get_system_health().await;
    assert!(started.elapsed() >= Duration::from_millis(5_000));
    assert_eq!(health.cdn, HealthState::Warning);
    assert_eq!(health.overall, OverallHealth::Degraded);
}

#[tokio::test]
async fn test_uninitialized_presence_checks_fail() {
    let harness = TestContext::new();
    let status = harness.ctx.coordinator().get_service_status();
    assert!(!status.initialized);
    assert!(status.health_checker);

    let report = harness.ctx.perform_health_check().await;
    assert_eq!(report.checks.get("service.web_vitals"), Some(&false));
    assert_eq!(report.overall, OverallHealth::Degraded);
}
