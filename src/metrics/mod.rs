// Metrics module - Prometheus metrics for the analytics core
//
// Counters, gauges and one histogram registered on a per-instance Registry,
// so several contexts (tests, CLI replays) never share or collide on
// process-global metrics.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct AnalyticsMetrics {
    registry: Registry,

    /// Aggregator cache hits
    pub cache_hits: IntCounter,

    /// Aggregator cache misses
    pub cache_misses: IntCounter,

    /// Fallback payloads served, by data kind
    pub fallbacks: IntCounterVec,

    /// Events accepted by the orchestrator
    pub events_enqueued: IntCounter,

    /// Events folded into page records by drain cycles
    pub events_drained: IntCounter,

    pub drain_cycles: IntCounter,

    /// Events waiting for the next drain
    pub queue_depth: IntGauge,

    /// Tracking calls that failed and were discarded, by operation
    pub tracking_errors: IntCounterVec,

    /// Dashboard summary load time in seconds
    pub dashboard_load_seconds: Histogram,
}

impl AnalyticsMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("sitepulse".to_string()), None)?;

        let cache_hits = IntCounter::new("cache_hits_total", "Aggregator cache hits")?;
        let cache_misses = IntCounter::new("cache_misses_total", "Aggregator cache misses")?;
        let fallbacks = IntCounterVec::new(
            Opts::new("fallbacks_total", "Fallback payloads served by data kind"),
            &["kind"], // metrics, pages, visitors, health
        )?;
        let events_enqueued = IntCounter::new("events_enqueued_total", "Events accepted for batching")?;
        let events_drained = IntCounter::new("events_drained_total", "Events folded into page records")?;
        let drain_cycles = IntCounter::new("drain_cycles_total", "Completed drain cycles")?;
        let queue_depth = IntGauge::new("event_queue_depth", "Events waiting for the next drain")?;
        let tracking_errors = IntCounterVec::new(
            Opts::new("tracking_errors_total", "Discarded tracking failures by operation"),
            &["operation"], // web_vital, page_view, unified_event, navigation, event_queue
        )?;
        let dashboard_load_seconds = Histogram::with_opts(
            HistogramOpts::new("dashboard_load_seconds", "Dashboard summary load time")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0]),
        )?;

        registry.register(Box::new(cache_hits.clone()))?;
        registry.register(Box::new(cache_misses.clone()))?;
        registry.register(Box::new(fallbacks.clone()))?;
        registry.register(Box::new(events_enqueued.clone()))?;
        registry.register(Box::new(events_drained.clone()))?;
        registry.register(Box::new(drain_cycles.clone()))?;
        registry.register(Box::new(queue_depth.clone()))?;
        registry.register(Box::new(tracking_errors.clone()))?;
        registry.register(Box::new(dashboard_load_seconds.clone()))?;

        Ok(Self {
            registry,
            cache_hits,
            cache_misses,
            fallbacks,
            events_enqueued,
            events_drained,
            drain_cycles,
            queue_depth,
            tracking_errors,
            dashboard_load_seconds,
        })
    }

    pub fn record_fallback(&self, kind: &str) {
        self.fallbacks.with_label_values(&[kind]).inc();
    }

    pub fn record_tracking_error(&self, operation: &str) {
        self.tracking_errors.with_label_values(&[operation]).inc();
    }

    pub fn fallback_count(&self, kind: &str) -> u64 {
        self.fallbacks.with_label_values(&[kind]).get()
    }

    pub fn tracking_error_count(&self, operation: &str) -> u64 {
        self.tracking_errors.with_label_values(&[operation]).get()
    }

    /// Text exposition format
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
