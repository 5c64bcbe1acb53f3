// Configuration through the context: file loading, updates, import/export

use std::io::Write;

use sitepulse::config::{AnalyticsConfig, AppConfig, ConfigUpdate, Environment, ImportOutcome};
use sitepulse::ConfigError;
use tempfile::NamedTempFile;

use super::test_harness::TestContext;

#[test]
fn test_load_config_file_with_env_substitution() {
    std::env::set_var("SITEPULSE_IT_REFRESH", "45000");
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "environment: production\nanalytics:\n  refresh_interval: ${{SITEPULSE_IT_REFRESH}}\n"
    )
    .unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(config.analytics.refresh_interval, 45_000);
    tokio_test::assert_ok!(config.validate());
}

#[test]
fn test_missing_config_file_is_io_error() {
    let err = tokio_test::assert_err!(AppConfig::from_file("/definitely/not/here/sitepulse.yaml"));
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_invalid_update_leaves_config_unchanged() {
    let harness = TestContext::new();
    let before = harness.ctx.get_config();

    let err = harness
        .ctx
        .update_config(ConfigUpdate::refresh_interval(500))
        .unwrap_err();
    assert!(err.to_string().contains("refresh_interval"));
    assert_eq!(harness.ctx.get_config(), before);
}

#[test]
fn test_environment_projection_is_read_only() {
    let config = AppConfig {
        environment: Environment::Development,
        ..Default::default()
    };
    let harness = TestContext::with(config, sitepulse::telemetry::StaticHealthProbe::healthy());

    let projected = harness.ctx.get_environment_config();
    assert_eq!(projected.refresh_interval, 10_000);
    assert!(projected.enable_console_logging);
    assert_eq!(harness.ctx.get_config(), AnalyticsConfig::default());
}

#[test]
fn test_import_garbage_resets_to_defaults() {
    let harness = TestContext::new();
    let manager = harness.ctx.config_manager();
    manager.update_config(ConfigUpdate::max_data_points(42)).unwrap();

    let outcome = manager.import_config("{{{ not json");
    assert!(matches!(outcome, ImportOutcome::ResetToDefaults(_)));
    assert_eq!(harness.ctx.get_config(), AnalyticsConfig::default());
}

#[test]
fn test_import_invalid_values_is_rejected() {
    let harness = TestContext::new();
    let manager = harness.ctx.config_manager();
    manager.update_config(ConfigUpdate::max_data_points(42)).unwrap();

    let outcome = manager.import_config(r#"{"max_data_points": 5, "refresh_interval": 60000}"#);
    assert!(matches!(outcome, ImportOutcome::Rejected(_)));
    assert_eq!(harness.ctx.get_config().max_data_points, 42);
    assert_eq!(harness.ctx.get_config().refresh_interval, 30_000);
}

#[test]
fn test_import_unknown_field_is_rejected() {
    let harness = TestContext::new();
    let outcome = harness.ctx.config_manager().import_config(r#"{"theme": "dark"}"#);
    assert_eq!(
        outcome,
        ImportOutcome::Rejected(ConfigError::UnknownField("theme".to_string()))
    );
}

#[tokio::test]
async fn test_subscribers_see_committed_updates_only() {
    let harness = TestContext::new();
    let mut rx = harness.ctx.config_manager().subscribe();

    let _ = harness.ctx.update_config(ConfigUpdate::refresh_interval(10));
    assert!(!rx.has_changed().unwrap());

    harness
        .ctx
        .update_config(ConfigUpdate::refresh_interval(15_000))
        .unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().refresh_interval, 15_000);
}

#[tokio::test]
async fn test_max_data_points_applies_after_restart() {
    let harness = TestContext::initialized().await;
    harness
        .ctx
        .update_config(ConfigUpdate::max_data_points(10))
        .unwrap();
    harness.ctx.restart().await.unwrap();

    for n in 0..15 {
        harness
            .ctx
            .track_page_view(sitepulse::collectors::PageViewInput::new(format!("/p{}", n)));
    }
    let visitors = harness
        .ctx
        .get_real_visitor_data(sitepulse::model::TimeRange::Day)
        .await;
    assert_eq!(visitors.page_views, 10);
}
