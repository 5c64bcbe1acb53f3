//! Process-level configuration sections.
//!
//! These are read once from the application config file:
//! - `LoggingConfig`: level and output format for the tracing subscriber
//! - `CacheSettings`: aggregator TTLs
//! - `HealthSettings`: health probe timeout
//! - `OrchestratorSettings`: drain timer, queue bound, per-page history and
//!   bootstrap delay
//! - `VisitorSettings`: active-session window

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_ACTIVE_WINDOW_MS, DEFAULT_BOOTSTRAP_DELAY_MS, DEFAULT_CACHE_TTL_MS,
    DEFAULT_DRAIN_INTERVAL_MS, DEFAULT_HEALTH_CACHE_TTL_MS, DEFAULT_MAX_QUEUE_LEN,
    DEFAULT_PAGE_HISTORY_LIMIT, DEFAULT_PROBE_TIMEOUT_MS,
};
use crate::error::ConfigError;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level; `RUST_LOG` overrides it (default: info)
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "logging.level",
                format!(
                    "'{}' is not one of {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }
        Ok(())
    }
}

fn default_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

fn default_health_ttl_ms() -> u64 {
    DEFAULT_HEALTH_CACHE_TTL_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// TTL for metrics, page and visitor payloads (default: 30000)
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
    /// TTL for health payloads (default: 10000)
    #[serde(default = "default_health_ttl_ms")]
    pub health_ttl_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            health_ttl_ms: default_health_ttl_ms(),
        }
    }
}

impl CacheSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_ms == 0 {
            return Err(ConfigError::invalid("cache.ttl_ms", "must be > 0"));
        }
        if self.health_ttl_ms == 0 {
            return Err(ConfigError::invalid("cache.health_ttl_ms", "must be > 0"));
        }
        Ok(())
    }
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSettings {
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl HealthSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::invalid("health.probe_timeout_ms", "must be > 0"));
        }
        Ok(())
    }
}

fn default_drain_interval_ms() -> u64 {
    DEFAULT_DRAIN_INTERVAL_MS
}

fn default_page_history_limit() -> usize {
    DEFAULT_PAGE_HISTORY_LIMIT
}

fn default_max_queue_len() -> usize {
    DEFAULT_MAX_QUEUE_LEN
}

fn default_bootstrap_delay_ms() -> u64 {
    DEFAULT_BOOTSTRAP_DELAY_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    /// Event queue drain interval (default: 5000)
    #[serde(default = "default_drain_interval_ms")]
    pub drain_interval_ms: u64,
    /// Events kept per page (default: 100)
    #[serde(default = "default_page_history_limit")]
    pub page_history_limit: usize,
    /// Undrained events held before the oldest are dropped (default: 10000)
    #[serde(default = "default_max_queue_len")]
    pub max_queue_len: usize,
    /// Delay before the bootstrap health probe (default: 2000)
    #[serde(default = "default_bootstrap_delay_ms")]
    pub bootstrap_delay_ms: u64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            drain_interval_ms: default_drain_interval_ms(),
            page_history_limit: default_page_history_limit(),
            max_queue_len: default_max_queue_len(),
            bootstrap_delay_ms: default_bootstrap_delay_ms(),
        }
    }
}

impl OrchestratorSettings {
    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(self.drain_interval_ms)
    }

    pub fn bootstrap_delay(&self) -> Duration {
        Duration::from_millis(self.bootstrap_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drain_interval_ms == 0 {
            return Err(ConfigError::invalid("orchestrator.drain_interval_ms", "must be > 0"));
        }
        if self.page_history_limit == 0 {
            return Err(ConfigError::invalid("orchestrator.page_history_limit", "must be > 0"));
        }
        if self.max_queue_len == 0 {
            return Err(ConfigError::invalid("orchestrator.max_queue_len", "must be > 0"));
        }
        Ok(())
    }
}

fn default_active_window_ms() -> u64 {
    DEFAULT_ACTIVE_WINDOW_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorSettings {
    /// Sessions seen within this window count as current visitors (default: 300000)
    #[serde(default = "default_active_window_ms")]
    pub active_window_ms: u64,
}

impl Default for VisitorSettings {
    fn default() -> Self {
        Self {
            active_window_ms: default_active_window_ms(),
        }
    }
}

impl VisitorSettings {
    pub fn active_window(&self) -> Duration {
        Duration::from_millis(self.active_window_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.active_window_ms == 0 {
            return Err(ConfigError::invalid("visitors.active_window_ms", "must be > 0"));
        }
        Ok(())
    }
}
