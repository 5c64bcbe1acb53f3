//! Service coordinator
//!
//! Starts the collectors in order and is the single entry point for
//! readiness, health and tracking:
//! 1. Web Vitals and performance (navigation + resource timing) start
//!    concurrently; both must succeed.
//! 2. The visitor collectors (page view log, session) start afterwards.
//!
//! A failure in step 1 is returned once from `initialize` and the coordinator
//! stays not-ready. Tracking goes through `try_track_*`, which return
//! `Result`; the `track_*` adapters log and count failures instead of
//! propagating them.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::AnalyticsSource;
use crate::calculators::{MetricKind, MetricsCalculator, PerformanceCalculator, VisitorAnalytics};
use crate::clock::Clock;
use crate::collectors::{
    NavigationTimingTracker, PageViewInput, PageViewTracker, ResourceTimingTracker,
    SessionManager, SystemHealthChecker, WebVitalsTracker,
};
use crate::config::AnalyticsConfig;
use crate::constants::WEB_VITAL_HISTORY_LIMIT;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::metrics::AnalyticsMetrics;
use crate::model::{
    OverallHealth, RealMetrics, RealPageData, SystemHealthStatus, TimeRange, VisitorData,
};
use crate::telemetry::{HealthProbe, KeyValueStore, TelemetrySource, WebVital};

/// Presence of each service instance; not a deep probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub initialized: bool,
    pub web_vitals: bool,
    pub performance: bool,
    pub page_views: bool,
    pub session: bool,
    pub health_checker: bool,
}

/// Static presence checks combined with live probe results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorHealthReport {
    pub overall: OverallHealth,
    /// Check name to pass/fail
    pub checks: BTreeMap<String, bool>,
    pub errors: Vec<String>,
    pub system: SystemHealthStatus,
}

struct Collectors {
    web_vitals: Arc<WebVitalsTracker>,
    navigation: NavigationTimingTracker,
    resources: ResourceTimingTracker,
    page_views: PageViewTracker,
    session: SessionManager,
}

pub struct ServiceCoordinator {
    telemetry: Arc<dyn TelemetrySource>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    metrics: Arc<AnalyticsMetrics>,
    health: SystemHealthChecker,
    visitors: VisitorAnalytics,
    collectors: RwLock<Option<Arc<Collectors>>>,
    // Serializes initialize/restart; held across the collector start-up awaits
    lifecycle: tokio::sync::Mutex<()>,
}

impl ServiceCoordinator {
    pub fn new(
        telemetry: Arc<dyn TelemetrySource>,
        store: Arc<dyn KeyValueStore>,
        probe: Arc<dyn HealthProbe>,
        clock: Arc<dyn Clock>,
        metrics: Arc<AnalyticsMetrics>,
        probe_timeout: Duration,
        active_window: Duration,
    ) -> Self {
        Self {
            health: SystemHealthChecker::new(probe, Arc::clone(&clock), probe_timeout),
            telemetry,
            store,
            clock,
            metrics,
            visitors: VisitorAnalytics::new(active_window.as_millis() as u64),
            collectors: RwLock::new(None),
            lifecycle: tokio::sync::Mutex::new(()),
        }
    }

    /// Start all collectors. A second call once initialized is a no-op.
    pub async fn initialize(&self, config: &AnalyticsConfig) -> AnalyticsResult<()> {
        let _guard = self.lifecycle.lock().await;
        if self.is_initialized() {
            tracing::debug!("Coordinator already initialized");
            return Ok(());
        }
        self.start_collectors(config).await
    }

    /// Drop all collector state and initialize again with `config`
    pub async fn restart(&self, config: &AnalyticsConfig) -> AnalyticsResult<()> {
        let _guard = self.lifecycle.lock().await;
        let previous = self.collectors.write().take();
        if let Some(previous) = previous {
            previous.web_vitals.stop(self.telemetry.as_ref());
        }
        tracing::info!("Coordinator restarting");
        self.start_collectors(config).await
    }

    async fn start_collectors(&self, config: &AnalyticsConfig) -> AnalyticsResult<()> {
        let web_vitals = Arc::new(WebVitalsTracker::new(WEB_VITAL_HISTORY_LIMIT));
        let navigation = NavigationTimingTracker::new(Arc::clone(&self.telemetry));
        let resources = ResourceTimingTracker::new(Arc::clone(&self.telemetry));

        let started = tokio::try_join!(
            async {
                web_vitals
                    .start(self.telemetry.as_ref())
                    .await
                    .map_err(|source| AnalyticsError::CollectorInit {
                        collector: "web_vitals",
                        source,
                    })
            },
            async {
                tokio::try_join!(navigation.start(), resources.start()).map_err(|source| {
                    AnalyticsError::CollectorInit {
                        collector: "performance",
                        source,
                    }
                })
            },
        );
        if let Err(e) = started {
            web_vitals.stop(self.telemetry.as_ref());
            tracing::error!(error = %e, "Collector initialization failed");
            return Err(e);
        }

        let page_views = PageViewTracker::new(config.max_data_points as usize);
        let session = SessionManager::start(Arc::clone(&self.store), self.clock.as_ref());

        tracing::info!(
            session_id = %session.session_id(),
            max_data_points = config.max_data_points,
            "Analytics collectors initialized"
        );

        *self.collectors.write() = Some(Arc::new(Collectors {
            web_vitals,
            navigation,
            resources,
            page_views,
            session,
        }));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.collectors.read().is_some()
    }

    fn collectors(&self, service: &'static str) -> AnalyticsResult<Arc<Collectors>> {
        self.collectors
            .read()
            .clone()
            .ok_or(AnalyticsError::NotInitialized(service))
    }

    pub fn session_id(&self) -> Option<String> {
        self.collectors
            .read()
            .as_ref()
            .map(|c| c.session.session_id().to_string())
    }

    pub fn get_service_status(&self) -> ServiceStatus {
        let initialized = self.is_initialized();
        ServiceStatus {
            initialized,
            web_vitals: initialized,
            performance: initialized,
            page_views: initialized,
            session: initialized,
            health_checker: true,
        }
    }

    /// Presence checks plus a live health sweep. Probe failures land in
    /// `errors`; they never abort the other checks.
    pub async fn perform_health_check(&self) -> CoordinatorHealthReport {
        let status = self.get_service_status();
        let report = self.health.check().await;

        let mut checks = BTreeMap::new();
        checks.insert("service.web_vitals".to_string(), status.web_vitals);
        checks.insert("service.performance".to_string(), status.performance);
        checks.insert("service.page_views".to_string(), status.page_views);
        checks.insert("service.session".to_string(), status.session);
        for (target, state) in &report.per_target {
            checks.insert(format!("probe.{}", target), state.is_healthy());
        }

        let healthy = checks.values().filter(|ok| **ok).count();
        let overall = OverallHealth::from_ratio(healthy, checks.len());
        tracing::info!(overall = %overall, healthy, total = checks.len(), "Health check complete");

        CoordinatorHealthReport {
            overall,
            checks,
            errors: report.errors,
            system: report.status,
        }
    }

    pub fn try_track_web_vital(&self, vital: WebVital) -> AnalyticsResult<()> {
        self.collectors("web_vitals")?.web_vitals.record(vital)
    }

    /// Fire-and-forget; failures are logged and counted
    pub fn track_web_vital(&self, vital: WebVital) {
        let name = vital.name;
        if let Err(e) = self.try_track_web_vital(vital) {
            tracing::warn!(vital = %name, error = %e, "Web vital not tracked");
            self.metrics.record_tracking_error("web_vital");
        }
    }

    pub fn try_track_page_view(&self, input: PageViewInput) -> AnalyticsResult<()> {
        input.validate()?;
        let collectors = self.collectors("page_views")?;
        let entry = input.into_entry(
            self.clock.now_ms(),
            Some(collectors.session.session_id().to_string()),
        );
        tracing::debug!(pathname = %entry.pathname, "Page view tracked");
        if let Some(evicted) = collectors.page_views.record(entry) {
            tracing::trace!(pathname = %evicted.pathname, "Page view log full, oldest evicted");
        }
        Ok(())
    }

    /// Fire-and-forget; failures are logged and counted
    pub fn track_page_view(&self, input: PageViewInput) {
        let pathname = input.pathname.clone();
        if let Err(e) = self.try_track_page_view(input) {
            tracing::warn!(pathname = %pathname, error = %e, "Page view not tracked");
            self.metrics.record_tracking_error("page_view");
        }
    }
}

#[async_trait]
impl AnalyticsSource for ServiceCoordinator {
    /// Latest performance snapshot; the range does not narrow it
    async fn real_metrics(&self, _range: TimeRange) -> AnalyticsResult<RealMetrics> {
        let c = self.collectors("performance")?;
        let (navigation, resources) = tokio::try_join!(c.navigation.refresh(), c.resources.refresh())?;

        let snapshot = c.web_vitals.snapshot();
        let previous = |kind: MetricKind| c.session.previous_metric(kind.key());
        let web_vitals = MetricsCalculator::web_vital_records(&snapshot, previous);
        let page_load = MetricsCalculator::record(
            MetricKind::PageLoad,
            navigation.load_complete_ms,
            previous(MetricKind::PageLoad),
        );

        let observed = snapshot
            .iter()
            .map(|(name, value)| (MetricKind::from(*name), *value))
            .chain(std::iter::once((MetricKind::PageLoad, navigation.load_complete_ms)));
        for (kind, value) in observed {
            if let Err(e) = c.session.remember_metric(kind.key(), value) {
                tracing::debug!(metric = kind.key(), error = %e, "Could not remember metric value");
            }
        }

        Ok(RealMetrics {
            performance_score: PerformanceCalculator::performance_score(&snapshot),
            web_vitals,
            page_load,
            navigation,
            resources,
            captured_at: self.clock.now_ms(),
        })
    }

    async fn page_data(&self, range: TimeRange) -> AnalyticsResult<Vec<RealPageData>> {
        let c = self.collectors("page_views")?;
        let fallback_load = c
            .navigation
            .last()
            .map(|n| n.load_complete_ms)
            .unwrap_or(0.0);
        Ok(PerformanceCalculator::page_data(
            &c.page_views.entries(),
            range,
            self.clock.now_ms(),
            fallback_load,
        ))
    }

    async fn visitor_data(&self, range: TimeRange) -> AnalyticsResult<VisitorData> {
        let c = self.collectors("page_views")?;
        Ok(self
            .visitors
            .summarize(&c.page_views.entries(), range, self.clock.now_ms()))
    }

    async fn system_health(&self) -> AnalyticsResult<SystemHealthStatus> {
        Ok(self.health.check().await.status)
    }
}
