//! Data aggregator
//!
//! Read-through TTL cache plus typed fallbacks in front of an
//! `AnalyticsSource`. Every read resolves: a failed fetch is logged, counted
//! and answered with a fallback payload, which is never cached.
//!
//! Cache keys are `"{kind}-{scope}"` (`metrics-24h`, `health-current`, ...),
//! so no two payload kinds or ranges can share an entry.

pub mod cache;
pub mod fallback;

pub use cache::{CacheEntry, CacheKey, CacheStats, Cacheable, CachedPayload, DataKind, TtlCache};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use crate::clock::{to_datetime, Clock};
use crate::config::CacheSettings;
use crate::error::AnalyticsResult;
use crate::metrics::AnalyticsMetrics;
use crate::model::{
    DashboardSummary, DataQuality, RealMetrics, RealPageData, SystemHealthStatus, TimeRange,
    VisitorData,
};
use crate::orchestrator::event::{EventCategory, UnifiedAnalyticsEvent};

/// Where the aggregator gets live data from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn real_metrics(&self, range: TimeRange) -> AnalyticsResult<RealMetrics>;

    async fn page_data(&self, range: TimeRange) -> AnalyticsResult<Vec<RealPageData>>;

    async fn visitor_data(&self, range: TimeRange) -> AnalyticsResult<VisitorData>;

    async fn system_health(&self) -> AnalyticsResult<SystemHealthStatus>;
}

/// Counters fed by the orchestrator's immediate event forward
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveEventStats {
    pub total_events: u64,
    pub by_category: BTreeMap<EventCategory, u64>,
    pub cta_clicks: u64,
    pub conversions: u64,
    /// Sum of the values attached to conversion events
    pub conversion_value: f64,
    pub last_event_at: Option<u64>,
}

/// A payload plus whether it came from a fallback
struct Served<T> {
    data: Arc<T>,
    fallback: bool,
}

pub struct DataAggregator {
    source: Arc<dyn AnalyticsSource>,
    cache: TtlCache,
    clock: Arc<dyn Clock>,
    metrics: Arc<AnalyticsMetrics>,
    settings: CacheSettings,
    live: RwLock<LiveEventStats>,
}

impl DataAggregator {
    pub fn new(
        source: Arc<dyn AnalyticsSource>,
        clock: Arc<dyn Clock>,
        metrics: Arc<AnalyticsMetrics>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            source,
            cache: TtlCache::new(Arc::clone(&clock)),
            clock,
            metrics,
            settings,
            live: RwLock::new(LiveEventStats::default()),
        }
    }

    async fn read_through<T, F, Fut>(
        &self,
        key: CacheKey,
        ttl_ms: u64,
        fetch: F,
        fallback: impl FnOnce() -> T,
    ) -> Served<T>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AnalyticsResult<T>>,
    {
        if let Some(data) = self.cache.get::<T>(&key) {
            self.metrics.cache_hits.inc();
            tracing::trace!(key = %key, "Cache hit");
            return Served { data, fallback: false };
        }
        self.metrics.cache_misses.inc();

        match fetch().await {
            Ok(value) => {
                let data = Arc::new(value);
                self.cache.insert(key, Arc::clone(&data), ttl_ms);
                Served { data, fallback: false }
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Fetch failed, serving fallback");
                self.cache.record_fallback();
                self.metrics.record_fallback(T::KIND.as_str());
                Served {
                    data: Arc::new(fallback()),
                    fallback: true,
                }
            }
        }
    }

    async fn fetch_metrics(&self, range: TimeRange) -> Served<RealMetrics> {
        let now = self.clock.now_ms();
        self.read_through(
            CacheKey::for_range(DataKind::Metrics, range),
            self.settings.ttl_ms,
            || self.source.real_metrics(range),
            || fallback::metrics(now),
        )
        .await
    }

    async fn fetch_pages(&self, range: TimeRange) -> Served<Vec<RealPageData>> {
        self.read_through(
            CacheKey::for_range(DataKind::Pages, range),
            self.settings.ttl_ms,
            || self.source.page_data(range),
            fallback::pages,
        )
        .await
    }

    async fn fetch_visitors(&self, range: TimeRange) -> Served<VisitorData> {
        self.read_through(
            CacheKey::for_range(DataKind::Visitors, range),
            self.settings.ttl_ms,
            || self.source.visitor_data(range),
            fallback::visitors,
        )
        .await
    }

    async fn fetch_health(&self) -> Served<SystemHealthStatus> {
        let now = self.clock.now_ms();
        self.read_through(
            CacheKey::health(),
            self.settings.health_ttl_ms,
            || self.source.system_health(),
            || fallback::health(now),
        )
        .await
    }

    pub async fn get_real_metrics(&self, range: TimeRange) -> Arc<RealMetrics> {
        self.fetch_metrics(range).await.data
    }

    pub async fn get_real_page_data(&self, range: TimeRange) -> Arc<Vec<RealPageData>> {
        self.fetch_pages(range).await.data
    }

    pub async fn get_real_visitor_data(&self, range: TimeRange) -> Arc<VisitorData> {
        self.fetch_visitors(range).await.data
    }

    pub async fn get_system_health(&self) -> Arc<SystemHealthStatus> {
        self.fetch_health().await.data
    }

    /// Fetch all four payloads concurrently and rate the result
    pub async fn get_dashboard_summary(&self, range: TimeRange) -> DashboardSummary {
        let started = tokio::time::Instant::now();
        let (metrics, pages, visitors, health) = tokio::join!(
            self.fetch_metrics(range),
            self.fetch_pages(range),
            self.fetch_visitors(range),
            self.fetch_health(),
        );
        let elapsed = started.elapsed();
        let load_time_ms = elapsed.as_millis() as u64;
        self.metrics.dashboard_load_seconds.observe(elapsed.as_secs_f64());

        let degraded_sources: Vec<String> = [
            (DataKind::Metrics, metrics.fallback),
            (DataKind::Pages, pages.fallback),
            (DataKind::Visitors, visitors.fallback),
            (DataKind::Health, health.fallback),
        ]
        .into_iter()
        .filter(|(_, fell_back)| *fell_back)
        .map(|(kind, _)| kind.as_str().to_string())
        .collect();

        let data_quality = DataQuality::assess(load_time_ms, &health.data, degraded_sources.len(), 4);
        tracing::debug!(
            range = %range,
            load_time_ms,
            quality = ?data_quality,
            degraded = degraded_sources.len(),
            "Dashboard summary assembled"
        );

        DashboardSummary {
            time_range: range,
            metrics: (*metrics.data).clone(),
            pages: (*pages.data).clone(),
            visitors: (*visitors.data).clone(),
            system_health: (*health.data).clone(),
            load_time_ms,
            data_quality,
            degraded_sources,
            generated_at: to_datetime(self.clock.now_ms()),
        }
    }

    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.clear();
        tracing::debug!(removed, "Cache cleared");
        removed
    }

    pub fn clear_expired_cache(&self) -> usize {
        let removed = self.cache.clear_expired();
        if removed > 0 {
            tracing::debug!(removed, "Expired cache entries removed");
        }
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Immediate sink for tracked events
    pub fn record_live_event(&self, event: &UnifiedAnalyticsEvent) {
        let mut live = self.live.write();
        live.total_events += 1;
        *live.by_category.entry(event.category()).or_insert(0) += 1;
        match event.category() {
            EventCategory::Cta => live.cta_clicks += 1,
            EventCategory::Conversion => {
                live.conversions += 1;
                live.conversion_value += event.value.unwrap_or(0.0);
            }
            _ => {}
        }
        live.last_event_at = Some(live.last_event_at.map_or(event.timestamp, |t| t.max(event.timestamp)));
    }

    pub fn live_stats(&self) -> LiveEventStats {
        self.live.read().clone()
    }
}
