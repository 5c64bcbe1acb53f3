// Collector unit tests

use std::sync::Arc;

use sitepulse::clock::ManualClock;
use sitepulse::collectors::*;
use sitepulse::model::MetricStatus;
use sitepulse::telemetry::{MemoryStore, NavigationTiming, SimulatedTelemetry, VitalName, WebVital};

fn vital(name: VitalName, value: f64) -> WebVital {
    WebVital {
        name,
        value,
        id: "v1".to_string(),
        delta: value,
        rating: MetricStatus::Good,
    }
}

#[tokio::test]
async fn test_web_vitals_rerate_source_samples() {
    let source = SimulatedTelemetry::new();
    let tracker = Arc::new(WebVitalsTracker::new(10));
    tracker.start(&source).await.unwrap();

    source.emit(vital(VitalName::Lcp, 5_000.0));
    let latest = tracker.latest(VitalName::Lcp).unwrap();
    assert_eq!(latest.rating, MetricStatus::Poor);
    assert_eq!(tracker.snapshot().get(&VitalName::Lcp), Some(&5_000.0));
}

#[tokio::test]
async fn test_dropped_tracker_stops_receiving() {
    let source = SimulatedTelemetry::new();
    let tracker = Arc::new(WebVitalsTracker::new(10));
    tracker.start(&source).await.unwrap();
    drop(tracker);

    // Callbacks are still registered but upgrade fails silently
    assert_eq!(source.emit(vital(VitalName::Cls, 0.02)), 1);
}

#[test]
fn test_web_vitals_reject_negative_values() {
    let tracker = WebVitalsTracker::new(10);
    assert!(tracker.record(vital(VitalName::Fcp, -1.0)).is_err());
    assert!(tracker.record(vital(VitalName::Fcp, f64::NAN)).is_err());
    assert_eq!(tracker.sample_count(), 0);
}

#[test]
fn test_navigation_derive_clamps_out_of_order() {
    let timing = NavigationTiming {
        fetch_start: 10.0,
        domain_lookup_start: 50.0,
        domain_lookup_end: 40.0,
        load_event_end: 1_010.0,
        ..Default::default()
    };
    let metrics = NavigationTimingTracker::derive(&timing);
    assert_eq!(metrics.dns_ms, 0.0);
    assert_eq!(metrics.load_complete_ms, 1_000.0);
}

#[tokio::test]
async fn test_navigation_keeps_last_known_while_loading() {
    let source = Arc::new(SimulatedTelemetry::new());
    let tracker = NavigationTimingTracker::new(source.clone());
    assert_eq!(tracker.refresh().await.unwrap().load_complete_ms, 0.0);

    let typical = SimulatedTelemetry::typical();
    let tracker = NavigationTimingTracker::new(Arc::new(typical));
    let metrics = tracker.refresh().await.unwrap();
    assert_eq!(metrics.ttfb_ms, 178.0);
    assert_eq!(tracker.last(), Some(metrics));
}

#[tokio::test]
async fn test_resource_summary() {
    let tracker = ResourceTimingTracker::new(Arc::new(SimulatedTelemetry::typical()));
    let summary = tracker.refresh().await.unwrap();
    assert_eq!(summary.count, 5);
    assert_eq!(summary.slow_count, 1);
    assert_eq!(summary.largest.as_deref(), Some("/images/hero.webp"));
}

#[test]
fn test_page_view_log_evicts_oldest() {
    let tracker = PageViewTracker::new(2);
    for (i, path) in ["/a", "/b", "/c"].iter().enumerate() {
        tracker.record(PageViewInput::new(*path).into_entry(i as u64, None));
    }
    let paths: Vec<String> = tracker.entries().into_iter().map(|e| e.pathname).collect();
    assert_eq!(paths, vec!["/b", "/c"]);
    assert_eq!(tracker.total_recorded(), 3);
}

#[test]
fn test_page_view_input_validation() {
    assert!(PageViewInput::new("pricing").validate().is_err());
    assert!(PageViewInput::new("/pricing").with_load_time(-3.0).validate().is_err());
    assert!(PageViewInput::new("/pricing").with_load_time(800.0).validate().is_ok());
}

#[test]
fn test_session_survives_restart_on_same_store() {
    let store = Arc::new(MemoryStore::new());
    let clock = ManualClock::new(1_000);

    let first = SessionManager::start(store.clone(), &clock);
    assert!(!first.is_returning());
    first.remember_metric("lcp", 2_100.0).unwrap();

    clock.advance(60_000);
    let second = SessionManager::start(store, &clock);
    assert_eq!(second.session_id(), first.session_id());
    assert_eq!(second.previous_metric("lcp"), Some(2_100.0));
}

#[test]
fn test_session_without_storage_still_has_id() {
    let clock = ManualClock::new(0);
    let session = SessionManager::start(Arc::new(MemoryStore::unavailable()), &clock);
    assert!(!session.session_id().is_empty());
    assert_eq!(session.previous_metric("lcp"), None);
}
