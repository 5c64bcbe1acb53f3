// Test harness for integration tests
// Builds isolated analytics contexts over in-memory collaborators

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sitepulse::aggregator::AnalyticsSource;
use sitepulse::clock::ManualClock;
use sitepulse::config::AppConfig;
use sitepulse::model::{
    HealthState, RealMetrics, RealPageData, SystemHealthStatus, TimeRange, VisitorData,
};
use sitepulse::telemetry::{SimulatedTelemetry, StaticHealthProbe};
use sitepulse::{AnalyticsContext, AnalyticsError, AnalyticsResult, TelemetryError};

/// Fixed wall-clock start for every harness
pub const T0: u64 = 1_700_000_000_000;

pub struct TestContext {
    pub ctx: AnalyticsContext,
    pub clock: ManualClock,
    pub telemetry: Arc<SimulatedTelemetry>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with(AppConfig::default(), StaticHealthProbe::healthy())
    }

    pub fn with(config: AppConfig, probe: StaticHealthProbe) -> Self {
        let clock = ManualClock::new(T0);
        let telemetry = Arc::new(SimulatedTelemetry::typical());
        let ctx = AnalyticsContext::builder(config)
            .clock(Arc::new(clock.clone()))
            .telemetry(telemetry.clone())
            .health_probe(Arc::new(probe))
            .build()
            .expect("Failed to build analytics context");
        Self {
            ctx,
            clock,
            telemetry,
        }
    }

    pub async fn initialized() -> Self {
        let harness = Self::new();
        harness.ctx.initialize().await.expect("Failed to initialize");
        harness
    }
}

/// Source that counts calls and optionally fails every one
pub struct CountingSource {
    pub calls: AtomicUsize,
    fail: bool,
}

impl CountingSource {
    pub fn healthy() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit<T>(&self, value: impl FnOnce() -> T) -> AnalyticsResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AnalyticsError::Telemetry(TelemetryError::Unavailable(
                "backend offline".to_string(),
            )));
        }
        Ok(value())
    }
}

#[async_trait]
impl AnalyticsSource for CountingSource {
    async fn real_metrics(&self, _range: TimeRange) -> AnalyticsResult<RealMetrics> {
        self.hit(|| sitepulse::aggregator::fallback::metrics(T0))
    }

    async fn page_data(&self, _range: TimeRange) -> AnalyticsResult<Vec<RealPageData>> {
        self.hit(Vec::new)
    }

    async fn visitor_data(&self, _range: TimeRange) -> AnalyticsResult<VisitorData> {
        self.hit(sitepulse::aggregator::fallback::visitors)
    }

    async fn system_health(&self) -> AnalyticsResult<SystemHealthStatus> {
        self.hit(|| {
            SystemHealthStatus::new(
                HealthState::Healthy,
                HealthState::Healthy,
                HealthState::Healthy,
                HealthState::Healthy,
                HealthState::Healthy,
                T0,
            )
        })
    }
}
