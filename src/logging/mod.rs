// Logging module for structured logging using the tracing crate

use std::error::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Default filter directive for the configured level.
///
/// `verbose` (the analytics console-logging flag) raises the crate's own
/// level to debug without touching other targets.
pub fn default_directive(config: &LoggingConfig, verbose: bool) -> String {
    let level = config.level.to_ascii_lowercase();
    if verbose && level != "trace" && level != "debug" {
        format!("{},sitepulse=debug", level)
    } else {
        level
    }
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stdout, as text or one JSON object per line.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed or the
/// filter directive cannot be parsed.
///
/// # Examples
///
/// ```no_run
/// use sitepulse::config::LoggingConfig;
/// use sitepulse::logging::init_subscriber;
///
/// init_subscriber(&LoggingConfig::default(), false).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(config: &LoggingConfig, verbose: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(config, verbose))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_current_span(false))
            .try_init()?,
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init()?,
    }

    Ok(())
}
