//! External telemetry collaborators
//!
//! The analytics core never measures anything itself. It consumes:
//! - `TelemetrySource`: Web Vitals subscriptions plus navigation/resource timing
//! - `KeyValueStore`: session-scoped string storage
//! - `HealthProbe`: synthetic reachability checks for backing services
//!
//! In-memory implementations live in `simulated` and `store`; the CLI and the
//! test suites drive the whole stack through them.

pub mod simulated;
pub mod store;

pub use simulated::{SimulatedTelemetry, StaticHealthProbe};
pub use store::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::TelemetryError;
use crate::model::MetricStatus;

/// The standardized Web Vitals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VitalName {
    Fcp,
    Lcp,
    Cls,
    Fid,
    Inp,
    Ttfb,
}

impl VitalName {
    pub const ALL: [VitalName; 6] = [
        VitalName::Fcp,
        VitalName::Lcp,
        VitalName::Cls,
        VitalName::Fid,
        VitalName::Inp,
        VitalName::Ttfb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VitalName::Fcp => "FCP",
            VitalName::Lcp => "LCP",
            VitalName::Cls => "CLS",
            VitalName::Fid => "FID",
            VitalName::Inp => "INP",
            VitalName::Ttfb => "TTFB",
        }
    }
}

impl fmt::Display for VitalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VitalName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VitalName::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown web vital '{}'", s))
    }
}

/// One Web Vital sample as delivered by the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebVital {
    pub name: VitalName,
    pub value: f64,
    /// Source-assigned identifier for the page load the sample belongs to
    pub id: String,
    pub delta: f64,
    pub rating: MetricStatus,
}

/// Raw navigation timing, milliseconds relative to navigation start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationTiming {
    pub fetch_start: f64,
    pub domain_lookup_start: f64,
    pub domain_lookup_end: f64,
    pub connect_start: f64,
    pub connect_end: f64,
    pub request_start: f64,
    pub response_start: f64,
    pub response_end: f64,
    pub dom_content_loaded_event_end: f64,
    pub load_event_end: f64,
    pub transfer_size: u64,
}

/// One resource timing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    pub initiator_type: String,
    pub duration_ms: f64,
    pub transfer_size: u64,
}

pub type VitalCallback = Arc<dyn Fn(WebVital) + Send + Sync>;

/// Handle returned by `subscribe`; pass it back to `unsubscribe`
pub type SubscriptionId = u64;

/// Browser-style performance measurement surface
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Register for samples of one vital; the callback may fire many times
    fn subscribe(
        &self,
        vital: VitalName,
        callback: VitalCallback,
    ) -> Result<SubscriptionId, TelemetryError>;

    /// Release a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, vital: VitalName, id: SubscriptionId);

    /// Navigation timing for the current document, if the load has finished
    async fn navigation_timing(&self) -> Result<Option<NavigationTiming>, TelemetryError>;

    /// Resource timing entries recorded so far
    async fn resource_entries(&self) -> Result<Vec<ResourceEntry>, TelemetryError>;
}

/// Session-scoped string storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, TelemetryError>;
    fn set(&self, key: &str, value: &str) -> Result<(), TelemetryError>;
}

/// Services covered by the synthetic health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthTarget {
    Server,
    Database,
    Cdn,
    Api,
    Deployment,
}

impl HealthTarget {
    pub const ALL: [HealthTarget; 5] = [
        HealthTarget::Server,
        HealthTarget::Database,
        HealthTarget::Cdn,
        HealthTarget::Api,
        HealthTarget::Deployment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthTarget::Server => "server",
            HealthTarget::Database => "database",
            HealthTarget::Cdn => "cdn",
            HealthTarget::Api => "api",
            HealthTarget::Deployment => "deployment",
        }
    }
}

impl fmt::Display for HealthTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single probe observed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub ok: bool,
    pub latency_ms: f64,
}

impl ProbeOutcome {
    pub fn ok(latency_ms: f64) -> Self {
        Self { ok: true, latency_ms }
    }

    pub fn failed(latency_ms: f64) -> Self {
        Self {
            ok: false,
            latency_ms,
        }
    }
}

/// Synthetic reachability check for one backing service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, target: HealthTarget) -> Result<ProbeOutcome, TelemetryError>;
}
