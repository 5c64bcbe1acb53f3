// Configuration module

pub mod analytics;
pub mod manager;
pub mod runtime;

pub use analytics::{AnalyticsConfig, ConfigUpdate, Environment, FieldKind, FieldRule, SCHEMA};
pub use manager::{ConfigManager, ImportOutcome};
pub use runtime::{
    CacheSettings, HealthSettings, LogFormat, LoggingConfig, OrchestratorSettings, VisitorSettings,
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Application config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub health: HealthSettings,
    #[serde(default)]
    pub orchestrator: OrchestratorSettings,
    #[serde(default)]
    pub visitors: VisitorSettings,
}

impl AppConfig {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| ConfigError::Parse(e.to_string()))?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| ConfigError::MissingEnvVar(var_name.to_string()))?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        serde_yaml::from_str(&substituted).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analytics.validate()?;
        self.logging.validate()?;
        self.cache.validate()?;
        self.health.validate()?;
        self.orchestrator.validate()?;
        self.visitors.validate()?;
        Ok(())
    }
}
