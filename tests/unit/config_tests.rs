// Configuration unit tests

use serde_json::json;
use sitepulse::config::*;
use sitepulse::ConfigError;

#[test]
fn test_can_deserialize_minimal_yaml_config() {
    let config = AppConfig::from_yaml_with_env("environment: development\n").expect("Failed to parse YAML");
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.analytics, AnalyticsConfig::default());
    assert_eq!(config.cache.ttl_ms, 30_000);
    assert_eq!(config.cache.health_ttl_ms, 10_000);
    assert_eq!(config.orchestrator.drain_interval_ms, 5_000);
    assert_eq!(config.orchestrator.page_history_limit, 100);
}

#[test]
fn test_can_deserialize_full_yaml_config() {
    let yaml = r#"
environment: production
analytics:
  enable_real_time_tracking: false
  refresh_interval: 60000
  max_data_points: 500
  enable_console_logging: true
logging:
  level: debug
  format: json
cache:
  ttl_ms: 15000
  health_ttl_ms: 5000
health:
  probe_timeout_ms: 2500
orchestrator:
  drain_interval_ms: 1000
  page_history_limit: 50
  bootstrap_delay_ms: 0
"#;
    let config = AppConfig::from_yaml_with_env(yaml).expect("Failed to parse YAML");
    assert!(!config.analytics.enable_real_time_tracking);
    assert_eq!(config.analytics.max_data_points, 500);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.health.probe_timeout_ms, 2_500);
    assert_eq!(config.orchestrator.page_history_limit, 50);
    assert!(config.validate().is_ok());
}

#[test]
fn test_yaml_with_out_of_range_refresh_fails_validation() {
    let config = AppConfig::from_yaml_with_env("analytics:\n  refresh_interval: 500\n").unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_yaml_references_missing_env_var() {
    let yaml = "logging:\n  level: ${SITEPULSE_UNIT_TEST_SURELY_UNSET}\n";
    let err = AppConfig::from_yaml_with_env(yaml).unwrap_err();
    assert_eq!(err, ConfigError::MissingEnvVar("SITEPULSE_UNIT_TEST_SURELY_UNSET".to_string()));
}

#[test]
fn test_environment_parses_aliases() {
    assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
    assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
    assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);
    assert!("staging".parse::<Environment>().is_err());
}

#[test]
fn test_environment_projections() {
    let base = AnalyticsConfig::default();

    let dev = base.project(Environment::Development);
    assert_eq!(dev.refresh_interval, 10_000);
    assert!(dev.enable_console_logging);

    let test = base.project(Environment::Test);
    assert_eq!(test.refresh_interval, 1_000);
    assert!(!test.enable_real_time_tracking);

    assert_eq!(base.project(Environment::Production), base);
}

#[test]
fn test_update_rejects_low_refresh_interval() {
    let manager = ConfigManager::new(Environment::Production);
    let err = manager.update_config(ConfigUpdate::refresh_interval(500)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "refresh_interval"));
    assert_eq!(manager.get_config().refresh_interval, 30_000);
}

#[test]
fn test_update_accepts_boundaries() {
    let manager = ConfigManager::default();
    assert!(manager.update_config(ConfigUpdate::refresh_interval(1_000)).is_ok());
    assert!(manager.update_config(ConfigUpdate::refresh_interval(300_000)).is_ok());
    assert!(manager.update_config(ConfigUpdate::max_data_points(10)).is_ok());
    assert!(manager.update_config(ConfigUpdate::max_data_points(10_001)).is_err());
    assert_eq!(manager.get_config().max_data_points, 10);
}

#[test]
fn test_set_single_field() {
    let manager = ConfigManager::default();
    manager.set("enable_console_logging", json!(true)).unwrap();
    assert!(manager.get_config().enable_console_logging);

    assert!(matches!(
        manager.set("colour", json!("blue")),
        Err(ConfigError::UnknownField(_))
    ));
    assert!(manager.set("max_data_points", json!("many")).is_err());
}

#[test]
fn test_import_outcomes() {
    let manager = ConfigManager::default();
    manager.update_config(ConfigUpdate::max_data_points(250)).unwrap();

    let rejected = manager.import_config(r#"{"refresh_interval": 5}"#);
    assert!(matches!(rejected, ImportOutcome::Rejected(_)));
    assert_eq!(manager.get_config().max_data_points, 250);

    let reset = manager.import_config("not json at all");
    assert!(matches!(reset, ImportOutcome::ResetToDefaults(_)));
    assert_eq!(manager.get_config(), AnalyticsConfig::default());
}

#[test]
fn test_export_then_import_restores_config() {
    let source = ConfigManager::default();
    source.update_config(ConfigUpdate::refresh_interval(45_000)).unwrap();
    let exported = source.export_config().unwrap();

    let target = ConfigManager::default();
    assert_eq!(target.import_config(&exported), ImportOutcome::Applied);
    assert_eq!(target.get_config().refresh_interval, 45_000);
}

#[test]
fn test_schema_lists_every_field() {
    let names: Vec<&str> = SCHEMA.iter().map(|rule| rule.name).collect();
    assert!(names.contains(&"enable_real_time_tracking"));
    assert!(names.contains(&"refresh_interval"));
    assert!(names.contains(&"max_data_points"));
    assert!(names.contains(&"enable_console_logging"));
}
