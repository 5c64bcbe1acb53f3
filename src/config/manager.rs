//! Config manager
//!
//! Owns the live `AnalyticsConfig`. Every change is merged onto a copy,
//! validated as a whole, and only then committed; a rejected change leaves
//! the previous config in place. Subscribers get the committed value through
//! a `watch` channel.

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::watch;

use super::analytics::{AnalyticsConfig, ConfigUpdate, Environment, FieldRule};
use crate::error::ConfigError;

/// What `import_config` did with its input
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// Input merged and committed
    Applied,
    /// Input parsed but failed validation; previous config kept
    Rejected(ConfigError),
    /// Input could not be parsed; config reset to defaults
    ResetToDefaults(String),
}

pub struct ConfigManager {
    environment: Environment,
    current: RwLock<AnalyticsConfig>,
    notify: watch::Sender<AnalyticsConfig>,
}

impl ConfigManager {
    pub fn new(environment: Environment) -> Self {
        let (notify, _) = watch::channel(AnalyticsConfig::default());
        Self {
            environment,
            current: RwLock::new(AnalyticsConfig::default()),
            notify,
        }
    }

    /// Start from `initial`, which must pass validation
    pub fn with_config(environment: Environment, initial: AnalyticsConfig) -> Result<Self, ConfigError> {
        initial.validate()?;
        let (notify, _) = watch::channel(initial.clone());
        Ok(Self {
            environment,
            current: RwLock::new(initial),
            notify,
        })
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn get_config(&self) -> AnalyticsConfig {
        self.current.read().clone()
    }

    /// Merge, validate and commit. On error nothing changes.
    pub fn update_config(&self, update: ConfigUpdate) -> Result<AnalyticsConfig, ConfigError> {
        let mut current = self.current.write();
        let candidate = current.merged(&update);
        if let Err(e) = candidate.validate() {
            tracing::warn!(error = %e, "Rejected config update");
            return Err(e);
        }

        *current = candidate.clone();
        self.notify.send_replace(candidate.clone());
        tracing::info!(
            refresh_interval = candidate.refresh_interval,
            max_data_points = candidate.max_data_points,
            "Config updated"
        );
        Ok(candidate)
    }

    /// Set a single field from a JSON value
    pub fn set(&self, field: &str, value: Value) -> Result<AnalyticsConfig, ConfigError> {
        FieldRule::lookup(field)?.check(&value)?;
        let mut object = serde_json::Map::new();
        object.insert(field.to_string(), value);
        let update = ConfigUpdate::from_json(&Value::Object(object))?;
        self.update_config(update)
    }

    /// The config as seen by the current environment
    pub fn get_environment_config(&self) -> AnalyticsConfig {
        self.get_config().project(self.environment)
    }

    pub fn export_config(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(&*self.current.read()).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Import a JSON document. Never fails: parseable-but-invalid input is
    /// rejected, unparseable input resets to defaults.
    pub fn import_config(&self, text: &str) -> ImportOutcome {
        let parsed = match serde_json::from_str::<Value>(text) {
            Ok(value) if value.is_object() => value,
            Ok(other) => return self.reset_after_bad_import(format!("expected a JSON object, got {}", other)),
            Err(e) => return self.reset_after_bad_import(e.to_string()),
        };

        let result = ConfigUpdate::from_json(&parsed).and_then(|update| self.update_config(update));
        match result {
            Ok(_) => ImportOutcome::Applied,
            Err(e) => {
                tracing::warn!(error = %e, "Config import rejected, keeping previous config");
                ImportOutcome::Rejected(e)
            }
        }
    }

    pub fn reset(&self) -> AnalyticsConfig {
        let defaults = AnalyticsConfig::default();
        *self.current.write() = defaults.clone();
        self.notify.send_replace(defaults.clone());
        defaults
    }

    /// Receiver that observes every committed config
    pub fn subscribe(&self) -> watch::Receiver<AnalyticsConfig> {
        self.notify.subscribe()
    }

    fn reset_after_bad_import(&self, reason: String) -> ImportOutcome {
        tracing::warn!(reason = %reason, "Config import unparseable, resetting to defaults");
        self.reset();
        ImportOutcome::ResetToDefaults(reason)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}
