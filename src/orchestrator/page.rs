// Per-page records folded by the orchestrator

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::event::UnifiedAnalyticsEvent;
use crate::calculators::{round_to, MetricKind};
use crate::model::{MetricRecord, MetricStatus, RealMetrics};

/// Descriptive metadata supplied when a page registers.
/// Replaced wholesale on re-registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRegistration {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PageRegistration {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePerformance {
    pub score: u8,
    pub status: MetricStatus,
    pub load_time_ms: f64,
    pub web_vitals: Vec<MetricRecord>,
    pub measured_at: u64,
}

impl PagePerformance {
    pub fn from_metrics(metrics: &RealMetrics) -> Self {
        Self {
            score: metrics.performance_score,
            status: MetricKind::PerformanceScore.status(f64::from(metrics.performance_score)),
            load_time_ms: metrics.page_load.value,
            web_vitals: metrics.web_vitals.clone(),
            measured_at: metrics.captured_at,
        }
    }
}

/// Raw accessibility audit counts for one page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityAudit {
    pub passes: u32,
    pub violations: u32,
    /// Violations that block a user outright; any of these rates the page poor
    pub critical_violations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAccessibility {
    pub score: u8,
    pub status: MetricStatus,
    pub violations: u32,
    pub critical_violations: u32,
    pub audited_at: u64,
}

impl PageAccessibility {
    /// Score is the pass share of all audited rules; an empty audit scores 100
    pub fn from_audit(audit: AccessibilityAudit, audited_at: u64) -> Self {
        let total = u64::from(audit.passes) + u64::from(audit.violations);
        let score = if total == 0 {
            100
        } else {
            round_to(100.0 * f64::from(audit.passes) / total as f64, 0) as u8
        };
        let status = if audit.critical_violations > 0 {
            MetricStatus::Poor
        } else {
            MetricKind::PerformanceScore.status(f64::from(score))
        };

        Self {
            score,
            status,
            violations: audit.violations,
            critical_violations: audit.critical_violations,
            audited_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedPageMetrics {
    pub page: String,
    pub registration: PageRegistration,
    /// Drained events, oldest first
    pub analytics: VecDeque<UnifiedAnalyticsEvent>,
    pub performance: Option<PagePerformance>,
    pub accessibility: Option<PageAccessibility>,
    pub last_updated: u64,
}

impl UnifiedPageMetrics {
    pub fn new(page: impl Into<String>, now: u64) -> Self {
        Self {
            page: page.into(),
            registration: PageRegistration::default(),
            analytics: VecDeque::new(),
            performance: None,
            accessibility: None,
            last_updated: now,
        }
    }

    /// Append in order, keeping only the most recent `limit` events
    pub(crate) fn append_events(&mut self, events: impl IntoIterator<Item = UnifiedAnalyticsEvent>, limit: usize) {
        self.analytics.extend(events);
        let excess = self.analytics.len().saturating_sub(limit);
        self.analytics.drain(..excess);
    }
}
