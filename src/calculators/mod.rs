// Calculators module
//
// Pure functions from raw collector output to normalized, status-annotated
// records. No calculator reads a clock or touches shared state; callers pass
// `now` and any previously observed values in.

pub mod metrics;
pub mod performance;
pub mod visitor;

pub use metrics::{MetricKind, MetricsCalculator, Thresholds};
pub use performance::PerformanceCalculator;
pub use visitor::{SessionSummary, VisitorAnalytics};

/// Round to `decimals` places
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
