// Error type unit tests

use std::error::Error as _;

use sitepulse::{AnalyticsError, ConfigError, TelemetryError};

#[test]
fn test_config_error_variants_display() {
    assert!(ConfigError::UnknownField("colour".into()).to_string().contains("colour"));
    assert!(ConfigError::MissingEnvVar("HOME_DIR".into()).to_string().contains("HOME_DIR"));
    assert!(ConfigError::Io("denied".into()).to_string().contains("denied"));
    assert!(ConfigError::Parse("bad indent".into()).to_string().contains("bad indent"));
}

#[test]
fn test_telemetry_error_converts_into_analytics_error() {
    let err: AnalyticsError = TelemetryError::Storage("quota exceeded".into()).into();
    assert!(matches!(err, AnalyticsError::Telemetry(TelemetryError::Storage(_))));
    // transparent: message is the inner one
    assert_eq!(err.to_string(), "storage error: quota exceeded");
}

#[test]
fn test_collector_init_chains_source() {
    let err = AnalyticsError::CollectorInit {
        collector: "performance",
        source: TelemetryError::Unavailable("no timing api".into()),
    };
    let source = err.source().expect("source error");
    assert!(source.to_string().contains("no timing api"));
}

#[test]
fn test_not_initialized_names_service() {
    let err = AnalyticsError::NotInitialized("page_views");
    assert_eq!(err.to_string(), "service 'page_views' is not initialized");
}
