//! Analytics runtime tunables and their schema.
//!
//! This module defines:
//! - `AnalyticsConfig`: the four tunables every service reads
//! - `ConfigUpdate`: a partial update merged onto the current config
//! - `Environment`: deployment environment driving read-only projections
//! - `FieldRule`: the declarative per-field type and range rules
//!
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_MAX_DATA_POINTS, DEFAULT_REFRESH_INTERVAL_MS, DEVELOPMENT_REFRESH_CAP_MS,
    MAX_MAX_DATA_POINTS, MAX_REFRESH_INTERVAL_MS, MIN_MAX_DATA_POINTS, MIN_REFRESH_INTERVAL_MS,
};
use crate::error::ConfigError;

fn default_enable_real_time_tracking() -> bool {
    true
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

fn default_max_data_points() -> u64 {
    DEFAULT_MAX_DATA_POINTS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Collect and forward events as they happen (default: true)
    #[serde(default = "default_enable_real_time_tracking")]
    pub enable_real_time_tracking: bool,
    /// Dashboard refresh interval in milliseconds (default: 30000).
    /// Consumers poll `get_dashboard_summary` at this pace; see
    /// `AnalyticsContext::refresh_interval`.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Maximum retained page views (default: 1000)
    #[serde(default = "default_max_data_points")]
    pub max_data_points: u64,
    /// Verbose analytics logging (default: false)
    #[serde(default)]
    pub enable_console_logging: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enable_real_time_tracking: default_enable_real_time_tracking(),
            refresh_interval: default_refresh_interval(),
            max_data_points: default_max_data_points(),
            enable_console_logging: false,
        }
    }
}

impl AnalyticsConfig {
    /// Check every field against its schema rule
    pub fn validate(&self) -> Result<(), ConfigError> {
        let value = serde_json::to_value(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        for rule in SCHEMA {
            let field = value
                .get(rule.name)
                .ok_or_else(|| ConfigError::invalid(rule.name, "missing"))?;
            rule.check(field)?;
        }
        Ok(())
    }

    /// Merge `update` onto a copy of this config. The result is not validated.
    pub fn merged(&self, update: &ConfigUpdate) -> Self {
        Self {
            enable_real_time_tracking: update
                .enable_real_time_tracking
                .unwrap_or(self.enable_real_time_tracking),
            refresh_interval: update.refresh_interval.unwrap_or(self.refresh_interval),
            max_data_points: update.max_data_points.unwrap_or(self.max_data_points),
            enable_console_logging: update
                .enable_console_logging
                .unwrap_or(self.enable_console_logging),
        }
    }

    /// Read-only view of this config as seen in `environment`
    pub fn project(&self, environment: Environment) -> Self {
        let mut projected = self.clone();
        match environment {
            Environment::Development => {
                projected.refresh_interval = projected.refresh_interval.min(DEVELOPMENT_REFRESH_CAP_MS);
                projected.enable_console_logging = true;
            }
            Environment::Test => {
                projected.refresh_interval = MIN_REFRESH_INTERVAL_MS;
                projected.enable_real_time_tracking = false;
            }
            Environment::Production => {}
        }
        projected
    }
}

/// Partial configuration update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_real_time_tracking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_data_points: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_console_logging: Option<bool>,
}

impl ConfigUpdate {
    pub fn refresh_interval(ms: u64) -> Self {
        Self {
            refresh_interval: Some(ms),
            ..Default::default()
        }
    }

    pub fn max_data_points(points: u64) -> Self {
        Self {
            max_data_points: Some(points),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build an update from a JSON object, checking every field against the
    /// schema first so type and range errors name the offending field.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let object = value
            .as_object()
            .ok_or_else(|| ConfigError::Parse("expected a JSON object".to_string()))?;

        for (name, field) in object {
            FieldRule::lookup(name)?.check(field)?;
        }

        serde_json::from_value(value.clone()).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
    #[default]
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::invalid(
                "environment",
                format!("'{}' is not one of development, test, production", other),
            )),
        }
    }
}

/// Type rule for a config field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    /// Unsigned integer within an inclusive range
    Integer { min: u64, max: u64 },
}

/// Declarative validation rule for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
}

pub const SCHEMA: &[FieldRule] = &[
    FieldRule {
        name: "enable_real_time_tracking",
        kind: FieldKind::Bool,
    },
    FieldRule {
        name: "refresh_interval",
        kind: FieldKind::Integer {
            min: MIN_REFRESH_INTERVAL_MS,
            max: MAX_REFRESH_INTERVAL_MS,
        },
    },
    FieldRule {
        name: "max_data_points",
        kind: FieldKind::Integer {
            min: MIN_MAX_DATA_POINTS,
            max: MAX_MAX_DATA_POINTS,
        },
    },
    FieldRule {
        name: "enable_console_logging",
        kind: FieldKind::Bool,
    },
];

impl FieldRule {
    pub fn lookup(name: &str) -> Result<&'static FieldRule, ConfigError> {
        SCHEMA
            .iter()
            .find(|rule| rule.name == name)
            .ok_or_else(|| ConfigError::UnknownField(name.to_string()))
    }

    pub fn check(&self, value: &Value) -> Result<(), ConfigError> {
        match self.kind {
            FieldKind::Bool => {
                if !value.is_boolean() {
                    return Err(ConfigError::invalid(
                        self.name,
                        format!("expected a boolean, got {}", value),
                    ));
                }
            }
            FieldKind::Integer { min, max } => {
                let n = value.as_u64().ok_or_else(|| {
                    ConfigError::invalid(
                        self.name,
                        format!("expected a non-negative integer, got {}", value),
                    )
                })?;
                if n < min || n > max {
                    return Err(ConfigError::invalid(
                        self.name,
                        format!("{} is outside [{}, {}]", n, min, max),
                    ));
                }
            }
        }
        Ok(())
    }
}
