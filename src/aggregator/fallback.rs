// Fallback payloads
//
// Served when a live fetch fails so the dashboard always has a complete,
// well-typed payload. Every value is fixed; only timestamps follow the clock.

use crate::calculators::{MetricKind, MetricsCalculator};
use crate::constants::BASELINE_SESSION_DURATION_SECS;
use crate::model::{
    HealthState, NavigationMetrics, RealMetrics, RealPageData, ResourceSummary,
    SystemHealthStatus, VisitorData,
};

pub fn metrics(now: u64) -> RealMetrics {
    RealMetrics {
        performance_score: 0,
        web_vitals: Vec::new(),
        page_load: MetricsCalculator::record(MetricKind::PageLoad, 0.0, None),
        navigation: NavigationMetrics::default(),
        resources: ResourceSummary::default(),
        captured_at: now,
    }
}

pub fn pages() -> Vec<RealPageData> {
    Vec::new()
}

pub fn visitors() -> VisitorData {
    VisitorData {
        current_visitors: 0,
        page_views: 0,
        unique_visitors: 0,
        bounce_rate: 0,
        avg_session_duration_secs: BASELINE_SESSION_DURATION_SECS,
        pages_per_session: 0.0,
        engagement_score: 0,
        top_pages: Vec::new(),
    }
}

/// Nothing could be verified, so every check is reported as a warning
pub fn health(now: u64) -> SystemHealthStatus {
    SystemHealthStatus::new(
        HealthState::Warning,
        HealthState::Warning,
        HealthState::Warning,
        HealthState::Warning,
        HealthState::Warning,
        now,
    )
}
