//! Metric records and status thresholds
//!
//! Every metric's status is a pure function of its identity and value:
//!
//! | Metric            | Good      | Poor above | Unit  |
//! |-------------------|-----------|------------|-------|
//! | FCP               | ≤ 1800    | 3000       | ms    |
//! | LCP               | ≤ 2500    | 4000       | ms    |
//! | CLS               | ≤ 0.1     | 0.25       |       |
//! | FID               | ≤ 100     | 300        | ms    |
//! | INP               | ≤ 200     | 500        | ms    |
//! | TTFB              | ≤ 800     | 1800       | ms    |
//! | Page load         | ≤ 2500    | 4000       | ms    |
//! | Performance score | ≥ 90      | below 50   | score |

use serde::{Deserialize, Serialize};

use super::round_to;
use crate::collectors::VitalSnapshot;
use crate::model::{MetricRecord, MetricStatus};
use crate::telemetry::VitalName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Fcp,
    Lcp,
    Cls,
    Fid,
    Inp,
    Ttfb,
    PageLoad,
    PerformanceScore,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub good: f64,
    pub poor: f64,
    pub higher_is_better: bool,
}

impl From<VitalName> for MetricKind {
    fn from(name: VitalName) -> Self {
        match name {
            VitalName::Fcp => MetricKind::Fcp,
            VitalName::Lcp => MetricKind::Lcp,
            VitalName::Cls => MetricKind::Cls,
            VitalName::Fid => MetricKind::Fid,
            VitalName::Inp => MetricKind::Inp,
            VitalName::Ttfb => MetricKind::Ttfb,
        }
    }
}

impl MetricKind {
    pub fn thresholds(&self) -> Thresholds {
        let lower = |good, poor| Thresholds {
            good,
            poor,
            higher_is_better: false,
        };
        match self {
            MetricKind::Fcp => lower(1_800.0, 3_000.0),
            MetricKind::Lcp => lower(2_500.0, 4_000.0),
            MetricKind::Cls => lower(0.1, 0.25),
            MetricKind::Fid => lower(100.0, 300.0),
            MetricKind::Inp => lower(200.0, 500.0),
            MetricKind::Ttfb => lower(800.0, 1_800.0),
            MetricKind::PageLoad => lower(2_500.0, 4_000.0),
            MetricKind::PerformanceScore => Thresholds {
                good: 90.0,
                poor: 50.0,
                higher_is_better: true,
            },
        }
    }

    pub fn status(&self, value: f64) -> MetricStatus {
        let t = self.thresholds();
        let (good, needs_improvement) = if t.higher_is_better {
            (value >= t.good, value >= t.poor)
        } else {
            (value <= t.good, value <= t.poor)
        };

        if good {
            MetricStatus::Good
        } else if needs_improvement {
            MetricStatus::NeedsImprovement
        } else {
            MetricStatus::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Fcp => "First Contentful Paint",
            MetricKind::Lcp => "Largest Contentful Paint",
            MetricKind::Cls => "Cumulative Layout Shift",
            MetricKind::Fid => "First Input Delay",
            MetricKind::Inp => "Interaction to Next Paint",
            MetricKind::Ttfb => "Time to First Byte",
            MetricKind::PageLoad => "Page Load Time",
            MetricKind::PerformanceScore => "Performance Score",
        }
    }

    /// Stable key for remembering previous values
    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::Fcp => "fcp",
            MetricKind::Lcp => "lcp",
            MetricKind::Cls => "cls",
            MetricKind::Fid => "fid",
            MetricKind::Inp => "inp",
            MetricKind::Ttfb => "ttfb",
            MetricKind::PageLoad => "page_load",
            MetricKind::PerformanceScore => "performance_score",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Cls => "",
            MetricKind::PerformanceScore => "score",
            _ => "ms",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MetricKind::Fcp => "paint-brush",
            MetricKind::Lcp => "image",
            MetricKind::Cls => "layout",
            MetricKind::Fid | MetricKind::Inp => "pointer",
            MetricKind::Ttfb => "server",
            MetricKind::PageLoad => "clock",
            MetricKind::PerformanceScore => "gauge",
        }
    }

    fn precision(&self) -> i32 {
        match self {
            MetricKind::Cls => 3,
            _ => 0,
        }
    }
}

pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Percentage change from `previous` to `current`, one decimal.
    /// Zero when there is no usable previous value.
    pub fn change_percent(current: f64, previous: Option<f64>) -> f64 {
        match previous {
            Some(prev) if prev != 0.0 && prev.is_finite() && current.is_finite() => {
                round_to((current - prev) / prev * 100.0, 1)
            }
            _ => 0.0,
        }
    }

    pub fn record(kind: MetricKind, value: f64, previous: Option<f64>) -> MetricRecord {
        MetricRecord {
            name: kind.label().to_string(),
            value: round_to(value, kind.precision()),
            unit: kind.unit().to_string(),
            change: Self::change_percent(value, previous),
            status: kind.status(value),
            icon: kind.icon().to_string(),
        }
    }

    /// One record per observed vital, in `VitalName::ALL` order
    pub fn web_vital_records<F>(snapshot: &VitalSnapshot, previous: F) -> Vec<MetricRecord>
    where
        F: Fn(MetricKind) -> Option<f64>,
    {
        VitalName::ALL
            .into_iter()
            .filter_map(|name| {
                let value = *snapshot.get(&name)?;
                let kind = MetricKind::from(name);
                Some(Self::record(kind, value, previous(kind)))
            })
            .collect()
    }
}
