// Calculator unit tests
// Cover the public calculator surface from outside the crate

use rstest::rstest;
use sitepulse::calculators::{MetricKind, MetricsCalculator, PerformanceCalculator, VisitorAnalytics};
use sitepulse::collectors::{PageViewEntry, VitalSnapshot};
use sitepulse::model::{MetricStatus, TimeRange};
use sitepulse::telemetry::VitalName;

const NOW: u64 = 1_700_000_000_000;

fn view(path: &str, session: &str, ts: u64, load: Option<f64>) -> PageViewEntry {
    PageViewEntry {
        url: format!("https://example.com{}", path),
        pathname: path.to_string(),
        referrer: None,
        timestamp: ts,
        session_id: Some(session.to_string()),
        client_id: None,
        load_time_ms: load,
        view_type: None,
    }
}

#[rstest]
#[case(MetricKind::Lcp, 2_500.0, MetricStatus::Good)]
#[case(MetricKind::Lcp, 2_501.0, MetricStatus::NeedsImprovement)]
#[case(MetricKind::Lcp, 4_001.0, MetricStatus::Poor)]
#[case(MetricKind::Cls, 0.1, MetricStatus::Good)]
#[case(MetricKind::Cls, 0.3, MetricStatus::Poor)]
#[case(MetricKind::Ttfb, 900.0, MetricStatus::NeedsImprovement)]
#[case(MetricKind::PerformanceScore, 92.0, MetricStatus::Good)]
#[case(MetricKind::PerformanceScore, 49.0, MetricStatus::Poor)]
fn test_status_thresholds(#[case] kind: MetricKind, #[case] value: f64, #[case] expected: MetricStatus) {
    assert_eq!(kind.status(value), expected);
}

#[test]
fn test_change_percent_handles_missing_history() {
    assert_eq!(MetricsCalculator::change_percent(120.0, Some(100.0)), 20.0);
    assert_eq!(MetricsCalculator::change_percent(120.0, None), 0.0);
    assert_eq!(MetricsCalculator::change_percent(120.0, Some(0.0)), 0.0);
}

#[test]
fn test_record_carries_unit_and_icon() {
    let record = MetricsCalculator::record(MetricKind::Cls, 0.04, None);
    assert_eq!(record.unit, "");
    assert_eq!(record.status, MetricStatus::Good);
    assert!(!record.icon.is_empty());
}

#[test]
fn test_performance_score_all_good_is_full() {
    let mut snapshot = VitalSnapshot::new();
    snapshot.insert(VitalName::Fcp, 1_000.0);
    snapshot.insert(VitalName::Lcp, 2_000.0);
    snapshot.insert(VitalName::Cls, 0.01);
    snapshot.insert(VitalName::Inp, 100.0);
    snapshot.insert(VitalName::Ttfb, 300.0);
    assert_eq!(PerformanceCalculator::performance_score(&snapshot), 100);
}

#[test]
fn test_performance_score_without_vitals_is_zero() {
    assert_eq!(PerformanceCalculator::performance_score(&VitalSnapshot::new()), 0);
}

#[test]
fn test_performance_score_degrades_with_poor_lcp() {
    let mut good = VitalSnapshot::new();
    good.insert(VitalName::Lcp, 2_000.0);
    good.insert(VitalName::Cls, 0.01);
    let mut poor = good.clone();
    poor.insert(VitalName::Lcp, 6_000.0);

    assert!(PerformanceCalculator::performance_score(&poor) < PerformanceCalculator::performance_score(&good));
}

#[test]
fn test_bounce_rate_from_three_views() {
    let entries = vec![
        view("/", "A", NOW - 2_000, None),
        view("/pricing", "A", NOW - 1_000, None),
        view("/", "B", NOW - 500, None),
    ];
    let sessions = VisitorAnalytics::group_sessions(&entries);
    assert_eq!(VisitorAnalytics::bounce_rate(&sessions), 50);
}

#[test]
fn test_bounce_rate_without_sessions_is_zero() {
    assert_eq!(VisitorAnalytics::bounce_rate(&[]), 0);
}

#[test]
fn test_engagement_score_is_clamped() {
    assert_eq!(VisitorAnalytics::engagement_score(10.0, 60.0, 0), 100);
    assert_eq!(VisitorAnalytics::engagement_score(0.0, 0.0, 100), 0);
}

#[test]
fn test_visitor_summary_over_range() {
    let analytics = VisitorAnalytics::default();
    let entries = vec![
        view("/", "A", NOW - 120_000, None),
        view("/docs", "A", NOW - 60_000, None),
        view("/", "B", NOW - 2 * 3_600_000, None),
    ];
    let hour = analytics.summarize(&entries, TimeRange::OneHour, NOW);
    assert_eq!(hour.page_views, 2);
    assert_eq!(hour.unique_visitors, 1);
    assert_eq!(hour.current_visitors, 1);
    assert_eq!(hour.avg_session_duration_secs, 60);

    let day = analytics.summarize(&entries, TimeRange::Day, NOW);
    assert_eq!(day.page_views, 3);
    assert_eq!(day.bounce_rate, 50);
}

#[test]
fn test_page_data_uses_fallback_load_time() {
    let entries = vec![
        view("/", "A", NOW - 1_000, Some(1_200.0)),
        view("/", "B", NOW - 900, Some(1_400.0)),
        view("/blog", "A", NOW - 800, None),
    ];
    let pages = PerformanceCalculator::page_data(&entries, TimeRange::Day, NOW, 2_000.0);

    assert_eq!(pages[0].page, "/");
    assert_eq!(pages[0].views, 2);
    assert_eq!(pages[0].avg_load_time_ms, 1_300.0);
    assert_eq!(pages[1].page, "/blog");
    assert_eq!(pages[1].avg_load_time_ms, 2_000.0);
}
