// Dashboard read path: collectors -> coordinator -> aggregator

use std::sync::Arc;

use sitepulse::aggregator::{DataAggregator, DataKind};
use sitepulse::clock::ManualClock;
use sitepulse::collectors::PageViewInput;
use sitepulse::config::{AppConfig, CacheSettings, VisitorSettings};
use sitepulse::metrics::AnalyticsMetrics;
use sitepulse::model::{DataQuality, OverallHealth, TimeRange};
use sitepulse::telemetry::StaticHealthProbe;

use super::test_harness::{CountingSource, TestContext, T0};

fn aggregator_over(source: Arc<CountingSource>) -> (ManualClock, DataAggregator) {
    let clock = ManualClock::new(T0);
    let aggregator = DataAggregator::new(
        source,
        Arc::new(clock.clone()),
        Arc::new(AnalyticsMetrics::new().unwrap()),
        CacheSettings::default(),
    );
    (clock, aggregator)
}

#[tokio::test]
async fn test_page_view_shows_up_in_visitor_data() {
    let harness = TestContext::initialized().await;
    harness.ctx.track_page_view(PageViewInput::new("/x"));

    let visitors = harness.ctx.get_real_visitor_data(TimeRange::OneHour).await;
    assert!(visitors.page_views >= 1);
    assert!(visitors.current_visitors >= 1);
    assert_eq!(visitors.top_pages[0].page, "/x");
}

#[tokio::test]
async fn test_active_window_comes_from_config() {
    let config = AppConfig {
        visitors: VisitorSettings {
            active_window_ms: 60_000,
        },
        ..Default::default()
    };
    let short = TestContext::with(config, StaticHealthProbe::healthy());
    let default = TestContext::new();
    for harness in [&short, &default] {
        harness.ctx.initialize().await.unwrap();
        harness.ctx.track_page_view(PageViewInput::new("/pricing"));
        harness.clock.advance(120_000);
    }

    let visitors = short.ctx.get_real_visitor_data(TimeRange::OneHour).await;
    assert_eq!(visitors.page_views, 1);
    assert_eq!(visitors.current_visitors, 0);

    // Two minutes is still inside the default five-minute window
    let visitors = default.ctx.get_real_visitor_data(TimeRange::OneHour).await;
    assert_eq!(visitors.current_visitors, 1);
}

#[tokio::test]
async fn test_cached_payload_until_ttl_expires() {
    let source = Arc::new(CountingSource::healthy());
    let (clock, aggregator) = aggregator_over(source.clone());

    let first = aggregator.get_real_metrics(TimeRange::Day).await;
    clock.set(T0 + 29_999);
    let second = aggregator.get_real_metrics(TimeRange::Day).await;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.calls(), 1);

    clock.set(T0 + 30_001);
    let third = aggregator.get_real_metrics(TimeRange::Day).await;
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_health_uses_shorter_ttl() {
    let source = Arc::new(CountingSource::healthy());
    let (clock, aggregator) = aggregator_over(source.clone());

    aggregator.get_system_health().await;
    clock.advance(9_999);
    aggregator.get_system_health().await;
    assert_eq!(source.calls(), 1);

    clock.advance(2);
    aggregator.get_system_health().await;
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_all_sources_failing_still_resolves() {
    let source = Arc::new(CountingSource::failing());
    let (_, aggregator) = aggregator_over(source.clone());

    let summary = aggregator.get_dashboard_summary(TimeRange::Day).await;
    assert_eq!(summary.data_quality, DataQuality::Low);
    assert_eq!(summary.degraded_sources.len(), 4);
    assert_eq!(summary.metrics.performance_score, 0);
    assert!(summary.pages.is_empty());
    assert_eq!(summary.visitors.avg_session_duration_secs, 180);
    assert_eq!(summary.system_health.overall, OverallHealth::Critical);

    // Fallbacks are not cached: the next read tries the source again
    aggregator.get_dashboard_summary(TimeRange::Day).await;
    assert_eq!(source.calls(), 8);
    assert_eq!(aggregator.cache_stats().fallbacks, 8);
}

#[tokio::test]
async fn test_every_read_falls_back_individually() {
    let source = Arc::new(CountingSource::failing());
    let (_, aggregator) = aggregator_over(source);

    assert_eq!(aggregator.get_real_metrics(TimeRange::Week).await.web_vitals.len(), 0);
    assert!(aggregator.get_real_page_data(TimeRange::Week).await.is_empty());
    assert_eq!(aggregator.get_real_visitor_data(TimeRange::Week).await.page_views, 0);
    assert_eq!(aggregator.get_system_health().await.overall, OverallHealth::Critical);
}

#[tokio::test]
async fn test_healthy_dashboard_is_high_quality() {
    let source = Arc::new(CountingSource::healthy());
    let (_, aggregator) = aggregator_over(source);

    let summary = aggregator.get_dashboard_summary(TimeRange::Month).await;
    assert_eq!(summary.data_quality, DataQuality::High);
    assert!(summary.degraded_sources.is_empty());
    assert_eq!(summary.time_range, TimeRange::Month);
}

#[tokio::test]
async fn test_expired_entries_are_swept() {
    let source = Arc::new(CountingSource::healthy());
    let (clock, aggregator) = aggregator_over(source);

    aggregator.get_real_metrics(TimeRange::Day).await;
    aggregator.get_system_health().await;
    clock.advance(15_000);
    assert_eq!(aggregator.clear_expired_cache(), 1);
    assert_eq!(aggregator.cache_stats().entries, 1);
    assert_eq!(aggregator.clear_cache(), 1);
}

#[tokio::test]
async fn test_uninitialized_context_serves_fallbacks() {
    let harness = TestContext::new();
    let summary = harness.ctx.get_dashboard_summary(TimeRange::Day).await;

    assert!(summary.degraded_sources.contains(&DataKind::Metrics.as_str().to_string()));
    assert!(summary.degraded_sources.contains(&DataKind::Visitors.as_str().to_string()));
    assert_eq!(summary.data_quality, DataQuality::Medium);
}

#[tokio::test]
async fn test_live_metrics_after_vitals() {
    let harness = TestContext::initialized().await;
    harness.telemetry.emit_typical_vitals();

    let metrics = harness.ctx.get_real_metrics(TimeRange::Day).await;
    assert_eq!(metrics.web_vitals.len(), 6);
    assert!(metrics.performance_score >= 90);
    assert_eq!(metrics.navigation.ttfb_ms, 178.0);
}
