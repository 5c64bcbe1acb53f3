//! Analytics context
//!
//! Owns one isolated instance of every service and wires them together:
//!
//! ```text
//! ConfigManager ──► ServiceCoordinator ──► DataAggregator ──► UnifiedAnalyticsOrchestrator
//!                      (collectors)        (TTL cache)         (event queue, drain task)
//! ```
//!
//! Two contexts never share state; tests build as many as they need.

use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::{AnalyticsSource, DataAggregator};
use crate::clock::{Clock, SystemClock};
use crate::collectors::PageViewInput;
use crate::config::{AnalyticsConfig, AppConfig, ConfigManager, ConfigUpdate};
use crate::coordinator::{CoordinatorHealthReport, ServiceCoordinator};
use crate::error::{AnalyticsResult, ConfigError};
use crate::metrics::AnalyticsMetrics;
use crate::model::{
    DashboardSummary, RealMetrics, RealPageData, SystemHealthStatus, TimeRange, VisitorData,
};
use crate::orchestrator::{
    NavigationIntegration, RouteNavigationIntegration, UnifiedAnalyticsEvent,
    UnifiedAnalyticsOrchestrator, UnifiedDashboardSummary,
};
use crate::telemetry::{
    HealthProbe, KeyValueStore, MemoryStore, SimulatedTelemetry, StaticHealthProbe,
    TelemetrySource, WebVital,
};

/// Routes kept in the navigation top list when no integration is supplied
const DEFAULT_TOP_ROUTES: usize = 5;

pub struct AnalyticsContextBuilder {
    config: AppConfig,
    telemetry: Option<Arc<dyn TelemetrySource>>,
    store: Option<Arc<dyn KeyValueStore>>,
    probe: Option<Arc<dyn HealthProbe>>,
    navigation: Option<Arc<dyn NavigationIntegration>>,
    clock: Option<Arc<dyn Clock>>,
}

impl AnalyticsContextBuilder {
    pub fn telemetry(mut self, telemetry: Arc<dyn TelemetrySource>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn health_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn navigation(mut self, navigation: Arc<dyn NavigationIntegration>) -> Self {
        self.navigation = Some(navigation);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the config and wire the services. Collaborators that were
    /// not supplied default to the in-memory implementations.
    pub fn build(self) -> AnalyticsResult<AnalyticsContext> {
        self.config.validate()?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let telemetry = self
            .telemetry
            .unwrap_or_else(|| Arc::new(SimulatedTelemetry::typical()));
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let probe = self
            .probe
            .unwrap_or_else(|| Arc::new(StaticHealthProbe::healthy()));
        let navigation = self
            .navigation
            .unwrap_or_else(|| Arc::new(RouteNavigationIntegration::new(DEFAULT_TOP_ROUTES)));

        let metrics = Arc::new(AnalyticsMetrics::new()?);
        let config = Arc::new(ConfigManager::with_config(
            self.config.environment,
            self.config.analytics.clone(),
        )?);
        let coordinator = Arc::new(ServiceCoordinator::new(
            telemetry,
            store,
            probe,
            Arc::clone(&clock),
            Arc::clone(&metrics),
            self.config.health.probe_timeout(),
            self.config.visitors.active_window(),
        ));
        let source: Arc<dyn AnalyticsSource> = coordinator.clone();
        let aggregator = Arc::new(DataAggregator::new(
            source,
            Arc::clone(&clock),
            Arc::clone(&metrics),
            self.config.cache.clone(),
        ));
        let orchestrator = Arc::new(UnifiedAnalyticsOrchestrator::new(
            Arc::clone(&aggregator),
            navigation,
            Arc::clone(&clock),
            Arc::clone(&metrics),
            self.config.orchestrator.clone(),
        ));

        tracing::debug!(environment = %self.config.environment, "Analytics context built");

        Ok(AnalyticsContext {
            config,
            coordinator,
            aggregator,
            orchestrator,
            metrics,
            clock,
        })
    }
}

pub struct AnalyticsContext {
    config: Arc<ConfigManager>,
    coordinator: Arc<ServiceCoordinator>,
    aggregator: Arc<DataAggregator>,
    orchestrator: Arc<UnifiedAnalyticsOrchestrator>,
    metrics: Arc<AnalyticsMetrics>,
    clock: Arc<dyn Clock>,
}

impl AnalyticsContext {
    pub fn builder(config: AppConfig) -> AnalyticsContextBuilder {
        AnalyticsContextBuilder {
            config,
            telemetry: None,
            store: None,
            probe: None,
            navigation: None,
            clock: None,
        }
    }

    /// Start the collectors with the environment projection of the current
    /// config, then the orchestrator's background tasks.
    pub async fn initialize(&self) -> AnalyticsResult<()> {
        let effective = self.config.get_environment_config();
        self.coordinator.initialize(&effective).await?;
        self.orchestrator
            .set_real_time_tracking(effective.enable_real_time_tracking);
        self.orchestrator.initialize();
        Ok(())
    }

    /// Re-create collector state with the current config and drop cached
    /// payloads
    pub async fn restart(&self) -> AnalyticsResult<()> {
        let effective = self.config.get_environment_config();
        self.coordinator.restart(&effective).await?;
        self.aggregator.clear_cache();
        self.orchestrator
            .set_real_time_tracking(effective.enable_real_time_tracking);
        Ok(())
    }

    pub fn shutdown(&self) {
        self.orchestrator.shutdown();
    }

    pub async fn get_real_metrics(&self, range: TimeRange) -> Arc<RealMetrics> {
        self.aggregator.get_real_metrics(range).await
    }

    pub async fn get_real_page_data(&self, range: TimeRange) -> Arc<Vec<RealPageData>> {
        self.aggregator.get_real_page_data(range).await
    }

    pub async fn get_real_visitor_data(&self, range: TimeRange) -> Arc<VisitorData> {
        self.aggregator.get_real_visitor_data(range).await
    }

    pub async fn get_system_health(&self) -> Arc<SystemHealthStatus> {
        self.aggregator.get_system_health().await
    }

    pub async fn get_dashboard_summary(&self, range: TimeRange) -> DashboardSummary {
        self.aggregator.get_dashboard_summary(range).await
    }

    pub fn get_unified_dashboard_summary(&self) -> UnifiedDashboardSummary {
        self.orchestrator.get_unified_dashboard_summary()
    }

    pub async fn perform_health_check(&self) -> CoordinatorHealthReport {
        self.coordinator.perform_health_check().await
    }

    pub fn track_web_vital(&self, vital: WebVital) {
        self.coordinator.track_web_vital(vital);
    }

    pub fn track_page_view(&self, input: PageViewInput) {
        self.coordinator.track_page_view(input);
    }

    pub fn track_unified_event(&self, event: UnifiedAnalyticsEvent) {
        self.orchestrator.track_unified_event(event);
    }

    pub fn get_config(&self) -> AnalyticsConfig {
        self.config.get_config()
    }

    /// Commit a partial update. The real-time flag applies at once;
    /// `max_data_points` applies on the next `restart`.
    pub fn update_config(&self, update: ConfigUpdate) -> Result<AnalyticsConfig, ConfigError> {
        let committed = self.config.update_config(update)?;
        self.orchestrator.set_real_time_tracking(
            self.config
                .get_environment_config()
                .enable_real_time_tracking,
        );
        Ok(committed)
    }

    pub fn get_environment_config(&self) -> AnalyticsConfig {
        self.config.get_environment_config()
    }

    /// Dashboard polling pace for the current environment
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.config.get_environment_config().refresh_interval)
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config
    }

    pub fn coordinator(&self) -> &ServiceCoordinator {
        &self.coordinator
    }

    pub fn aggregator(&self) -> &DataAggregator {
        &self.aggregator
    }

    pub fn orchestrator(&self) -> &Arc<UnifiedAnalyticsOrchestrator> {
        &self.orchestrator
    }

    pub fn metrics(&self) -> &AnalyticsMetrics {
        &self.metrics
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

impl Drop for AnalyticsContext {
    fn drop(&mut self) {
        self.orchestrator.shutdown();
    }
}
