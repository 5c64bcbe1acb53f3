//! Dashboard-facing data model
//!
//! Everything the UI layer reads is defined here:
//! - `TimeRange`: the four dashboard windows
//! - `MetricRecord` / `RealMetrics`: status-annotated performance snapshots
//! - `RealPageData` / `VisitorData`: per-page and visitor aggregates
//! - `SystemHealthStatus`: synthetic health check results
//! - `DashboardSummary`: the combined feed with a data-quality rating
//!
//! All of these are immutable snapshots; they are recomputed on every read
//! and never mutated in place.

mod health;

pub use health::{HealthState, OverallHealth, SystemHealthStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{HIGH_QUALITY_LOAD_MS, MEDIUM_QUALITY_LOAD_MS};

/// Dashboard time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    OneHour,
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::OneHour,
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
    ];

    /// Length of the window in milliseconds
    pub fn window_ms(&self) -> u64 {
        match self {
            TimeRange::OneHour => 60 * 60 * 1000,
            TimeRange::Day => 24 * 60 * 60 * 1000,
            TimeRange::Week => 7 * 24 * 60 * 60 * 1000,
            TimeRange::Month => 30 * 24 * 60 * 60 * 1000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneHour => "1h",
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
        }
    }

    /// True if `timestamp` falls inside the window ending at `now`
    pub fn contains(&self, timestamp: u64, now: u64) -> bool {
        timestamp <= now && now - timestamp <= self.window_ms()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(TimeRange::OneHour),
            "24h" => Ok(TimeRange::Day),
            "7d" => Ok(TimeRange::Week),
            "30d" => Ok(TimeRange::Month),
            other => Err(format!(
                "Invalid time range '{}': expected one of 1h, 24h, 7d, 30d",
                other
            )),
        }
    }
}

/// Threshold rating attached to every metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricStatus {
    Good,
    NeedsImprovement,
    Poor,
}

impl MetricStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricStatus::Good => "good",
            MetricStatus::NeedsImprovement => "needs-improvement",
            MetricStatus::Poor => "poor",
        }
    }
}

impl fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single dashboard metric card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    pub value: f64,
    pub unit: String,
    /// Percentage change against the previously observed value
    pub change: f64,
    pub status: MetricStatus,
    pub icon: String,
}

/// Durations derived from navigation timing, all in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationMetrics {
    pub dns_ms: f64,
    pub tcp_ms: f64,
    pub ttfb_ms: f64,
    pub download_ms: f64,
    pub dom_content_loaded_ms: f64,
    pub load_complete_ms: f64,
    pub transfer_size_bytes: u64,
}

/// Aggregate view over resource timing entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub count: usize,
    pub total_transfer_bytes: u64,
    /// Resources slower than the slow-resource threshold
    pub slow_count: usize,
    /// Resource count per initiator type (script, img, css, ...)
    pub by_type: BTreeMap<String, usize>,
    /// Name of the largest resource by transfer size
    pub largest: Option<String>,
}

/// Performance snapshot shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealMetrics {
    /// Weighted 0-100 score over the observed Web Vitals
    pub performance_score: u8,
    pub web_vitals: Vec<MetricRecord>,
    pub page_load: MetricRecord,
    pub navigation: NavigationMetrics,
    pub resources: ResourceSummary,
    /// Epoch milliseconds when the snapshot was taken
    pub captured_at: u64,
}

/// Per-page traffic and performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealPageData {
    pub page: String,
    pub views: u64,
    pub unique_visitors: u64,
    pub avg_load_time_ms: f64,
    pub bounce_rate: u8,
    pub status: MetricStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCount {
    pub page: String,
    pub views: u64,
}

/// Visitor and session aggregates for a time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorData {
    /// Sessions with activity in the active window
    pub current_visitors: u64,
    pub page_views: u64,
    /// Distinct sessions in the range
    pub unique_visitors: u64,
    pub bounce_rate: u8,
    pub avg_session_duration_secs: u64,
    pub pages_per_session: f64,
    pub engagement_score: u8,
    pub top_pages: Vec<PageCount>,
}

/// Overall confidence in a dashboard payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    High,
    Medium,
    Low,
}

impl DataQuality {
    /// Rate a dashboard load.
    ///
    /// High needs a sub-500ms load, all four tracked health checks healthy and
    /// no fallback payloads. Medium needs a sub-2s load and at least one live
    /// payload. Everything else is low.
    pub fn assess(load_time_ms: u64, health: &SystemHealthStatus, fallbacks: usize, total: usize) -> Self {
        let all_fell_back = total > 0 && fallbacks >= total;
        if all_fell_back {
            return DataQuality::Low;
        }
        if load_time_ms < HIGH_QUALITY_LOAD_MS && health.all_tracked_healthy() && fallbacks == 0 {
            DataQuality::High
        } else if load_time_ms < MEDIUM_QUALITY_LOAD_MS {
            DataQuality::Medium
        } else {
            DataQuality::Low
        }
    }
}

/// Combined dashboard feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub time_range: TimeRange,
    pub metrics: RealMetrics,
    pub pages: Vec<RealPageData>,
    pub visitors: VisitorData,
    pub system_health: SystemHealthStatus,
    pub load_time_ms: u64,
    pub data_quality: DataQuality,
    /// Payload kinds that were served from fallbacks
    pub degraded_sources: Vec<String>,
    pub generated_at: DateTime<Utc>,
}
