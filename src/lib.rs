// sitepulse analytics core library

pub mod aggregator;
pub mod calculators;
pub mod clock;
pub mod collectors;
pub mod config;
pub mod constants;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod metrics; // Prometheus metrics
pub mod model;
pub mod orchestrator;
pub mod telemetry;

pub use context::{AnalyticsContext, AnalyticsContextBuilder};
pub use error::{AnalyticsError, AnalyticsResult, ConfigError, TelemetryError};
