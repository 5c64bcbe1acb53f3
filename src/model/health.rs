// System health status types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::to_datetime;

/// Result of a single synthetic health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Warning,
    Critical,
}

impl HealthState {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthState::Healthy)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Warning => write!(f, "warning"),
            HealthState::Critical => write!(f, "critical"),
        }
    }
}

/// Rolled-up health across several checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    Healthy,
    Degraded,
    Critical,
}

impl OverallHealth {
    /// Rate by the share of healthy checks: all → healthy, at least half →
    /// degraded, otherwise critical. No checks at all is critical since
    /// nothing could be verified.
    pub fn from_ratio(healthy: usize, total: usize) -> Self {
        if total == 0 {
            return OverallHealth::Critical;
        }
        if healthy >= total {
            OverallHealth::Healthy
        } else if healthy * 2 >= total {
            OverallHealth::Degraded
        } else {
            OverallHealth::Critical
        }
    }

    pub fn from_states(states: &[HealthState]) -> Self {
        let healthy = states.iter().filter(|s| s.is_healthy()).count();
        Self::from_ratio(healthy, states.len())
    }
}

impl fmt::Display for OverallHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallHealth::Healthy => write!(f, "healthy"),
            OverallHealth::Degraded => write!(f, "degraded"),
            OverallHealth::Critical => write!(f, "critical"),
        }
    }
}

/// Health of the site's backing services.
///
/// `overall` is derived from exactly four tracked services (server, database,
/// cdn, api); `deployment` is reported alongside but does not count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealthStatus {
    pub server: HealthState,
    pub database: HealthState,
    pub cdn: HealthState,
    pub api: HealthState,
    pub deployment: HealthState,
    pub overall: OverallHealth,
    pub last_check: DateTime<Utc>,
}

impl SystemHealthStatus {
    pub fn new(
        server: HealthState,
        database: HealthState,
        cdn: HealthState,
        api: HealthState,
        deployment: HealthState,
        checked_at_ms: u64,
    ) -> Self {
        Self {
            server,
            database,
            cdn,
            api,
            deployment,
            overall: OverallHealth::from_states(&[server, database, cdn, api]),
            last_check: to_datetime(checked_at_ms),
        }
    }

    /// The four services that feed `overall`
    pub fn tracked(&self) -> [HealthState; 4] {
        [self.server, self.database, self.cdn, self.api]
    }

    pub fn all_tracked_healthy(&self) -> bool {
        self.tracked().iter().all(HealthState::is_healthy)
    }
}
