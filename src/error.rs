// Error types module

use thiserror::Error;

/// Errors raised while loading, validating or changing configuration.
///
/// These are the only errors that reach callers of the public configuration
/// surface; the prior configuration stays authoritative whenever one is raised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A field failed its type or range rule
    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },

    /// A field name that the schema does not know
    #[error("unknown configuration field '{0}'")]
    UnknownField(String),

    /// YAML/JSON could not be parsed
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A referenced environment variable is not set
    #[error("environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    /// The configuration file could not be read
    #[error("failed to read config file: {0}")]
    Io(String),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failures reported by external collaborators (telemetry source, key-value
/// store, health probes).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
    #[error("telemetry source unavailable: {0}")]
    Unavailable(String),

    #[error("metric '{0}' is not supported by this source")]
    Unsupported(String),

    #[error("probe '{target}' failed: {reason}")]
    ProbeFailed { target: String, reason: String },

    #[error("storage error: {0}")]
    Storage(String),
}

/// Centralized error type for the analytics core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A collector failed to start; the coordinator stays not-ready
    #[error("collector '{collector}' failed to initialize: {source}")]
    CollectorInit {
        collector: &'static str,
        #[source]
        source: TelemetryError,
    },

    /// A service was used before `initialize` completed
    #[error("service '{0}' is not initialized")]
    NotInitialized(&'static str),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// Rejected tracking input (empty page name, non-finite value, ...)
    #[error("tracking rejected: {0}")]
    Tracking(String),

    /// The Prometheus registry refused a collector
    #[error("metrics registry error: {0}")]
    Metrics(String),
}

impl From<prometheus::Error> for AnalyticsError {
    fn from(e: prometheus::Error) -> Self {
        AnalyticsError::Metrics(e.to_string())
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
