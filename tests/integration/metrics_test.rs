// Prometheus exposition driven by real reads and tracking calls

use sitepulse::collectors::PageViewInput;
use sitepulse::model::TimeRange;

use super::test_harness::TestContext;

#[tokio::test]
async fn test_render_reflects_activity() {
    let harness = TestContext::initialized().await;
    harness.ctx.track_page_view(PageViewInput::new("/"));
    harness.ctx.track_page_view(PageViewInput::new("no-slash"));

    harness.ctx.get_dashboard_summary(TimeRange::Day).await;
    harness.ctx.get_dashboard_summary(TimeRange::Day).await;

    let metrics = harness.ctx.metrics();
    assert_eq!(metrics.cache_misses.get(), 4);
    assert_eq!(metrics.cache_hits.get(), 4);
    assert_eq!(metrics.tracking_error_count("page_view"), 1);

    let rendered = metrics.render();
    assert!(rendered.contains("sitepulse_cache_hits_total 4"));
    assert!(rendered.contains("sitepulse_dashboard_load_seconds_count 2"));
}

#[tokio::test]
async fn test_fallbacks_counted_per_kind() {
    let harness = TestContext::new();
    harness.ctx.get_real_metrics(TimeRange::Day).await;
    harness.ctx.get_real_page_data(TimeRange::Day).await;

    let metrics = harness.ctx.metrics();
    assert_eq!(metrics.fallback_count("metrics"), 1);
    assert_eq!(metrics.fallback_count("pages"), 1);
    assert_eq!(metrics.fallback_count("health"), 0);
}
