// Unified event stream: immediate forward, queued fold, drain lifecycle

use std::time::Duration;

use sitepulse::orchestrator::{
    AccessibilityAudit, EventCategory, EventPayload, OrchestratorState, PageRegistration,
    UnifiedAnalyticsEvent,
};

use super::test_harness::{TestContext, T0};

fn cta(page: &str, n: u64) -> UnifiedAnalyticsEvent {
    UnifiedAnalyticsEvent::new(page, EventPayload::cta("subscribe"), T0 + n, "session-1")
        .with_metadata("sequence", n as i64)
}

#[test]
fn test_drain_keeps_most_recent_hundred() {
    let harness = TestContext::new();
    let orchestrator = harness.ctx.orchestrator();
    for n in 0..150 {
        harness.ctx.track_unified_event(cta("/landing", n));
    }
    orchestrator.drain();

    let record = orchestrator.get_page_metrics("/landing").unwrap();
    assert_eq!(record.analytics.len(), 100);
    assert_eq!(record.analytics.front().unwrap().timestamp, T0 + 50);
    assert_eq!(record.analytics.back().unwrap().timestamp, T0 + 149);
    assert!(record
        .analytics
        .iter()
        .zip(record.analytics.iter().skip(1))
        .all(|(a, b)| a.timestamp < b.timestamp));
}

#[test]
fn test_history_cap_spans_drains() {
    let harness = TestContext::new();
    let orchestrator = harness.ctx.orchestrator();
    for n in 0..80 {
        harness.ctx.track_unified_event(cta("/", n));
    }
    orchestrator.drain();
    for n in 80..130 {
        harness.ctx.track_unified_event(cta("/", n));
    }
    orchestrator.drain();

    let record = orchestrator.get_page_metrics("/").unwrap();
    assert_eq!(record.analytics.len(), 100);
    assert_eq!(record.analytics.front().unwrap().timestamp, T0 + 30);
}

#[test]
fn test_live_counters_see_events_before_drain() {
    let harness = TestContext::new();
    harness.ctx.track_unified_event(cta("/pricing", 1));
    harness.ctx.track_unified_event(
        UnifiedAnalyticsEvent::new("/signup", EventPayload::conversion("trial"), T0 + 2, "session-1")
            .with_value(99.0),
    );

    let summary = harness.ctx.get_unified_dashboard_summary();
    assert_eq!(summary.queue_length, 2);
    assert_eq!(summary.live.total_events, 2);
    assert_eq!(summary.live.cta_clicks, 1);
    assert_eq!(summary.live.by_category.get(&EventCategory::Conversion), Some(&1));
    assert_eq!(summary.live.conversion_value, 99.0);
}

#[test]
fn test_navigation_events_reach_integration() {
    let harness = TestContext::new();
    for (from, to) in [(None, "/"), (Some("/"), "/docs"), (Some("/docs"), "/docs/api")] {
        harness.ctx.track_unified_event(UnifiedAnalyticsEvent::new(
            to,
            EventPayload::navigation(from, to),
            T0,
            "session-1",
        ));
    }

    let navigation = harness.ctx.get_unified_dashboard_summary().navigation;
    assert_eq!(navigation.total_navigations, 3);
    assert_eq!(navigation.unique_routes, 3);
}

#[test]
fn test_page_records_fold_performance_and_accessibility() {
    let harness = TestContext::new();
    let orchestrator = harness.ctx.orchestrator();
    orchestrator.register_page_analytics("/", PageRegistration::titled("Home"));
    orchestrator.update_page_performance("/", &sitepulse::aggregator::fallback::metrics(T0));
    orchestrator.update_page_accessibility(
        "/",
        AccessibilityAudit {
            passes: 30,
            violations: 10,
            critical_violations: 0,
        },
    );

    let summary = harness.ctx.get_unified_dashboard_summary();
    let home = &summary.pages[0];
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert_eq!(home.performance_score, Some(0));
    assert_eq!(home.accessibility_score, Some(75));
}

#[tokio::test(start_paused = true)]
async fn test_drain_runs_every_interval() {
    let harness = TestContext::initialized().await;
    assert_eq!(harness.ctx.orchestrator().state(), OrchestratorState::Ready);

    harness.ctx.track_unified_event(cta("/", 1));
    tokio::time::sleep(Duration::from_millis(5_050)).await;
    tokio::task::yield_now().await;

    assert_eq!(harness.ctx.orchestrator().queue_len(), 0);
    assert_eq!(harness.ctx.metrics().drain_cycles.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_drain_stops_after_shutdown() {
    let harness = TestContext::initialized().await;
    harness.ctx.shutdown();
    harness.ctx.shutdown();

    harness.ctx.track_unified_event(cta("/", 1));
    tokio::time::sleep(Duration::from_secs(30)).await;
    tokio::task::yield_now().await;

    assert_eq!(harness.ctx.orchestrator().queue_len(), 1);
    assert_eq!(harness.ctx.metrics().drain_cycles.get(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_probe_warms_health_cache() {
    let harness = TestContext::initialized().await;
    tokio::time::sleep(Duration::from_millis(2_100)).await;
    tokio::task::yield_now().await;

    assert_eq!(harness.ctx.aggregator().cache_stats().entries, 1);
    harness.ctx.get_system_health().await;
    assert_eq!(harness.ctx.aggregator().cache_stats().hits, 1);
}
