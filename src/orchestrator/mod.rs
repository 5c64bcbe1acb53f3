//! Unified analytics orchestrator
//!
//! Business events (CTA clicks, conversions, navigations) take two paths:
//! 1. Immediate forward: the aggregator's live counters and, for navigation
//!    events, the navigation integration see the event at once.
//! 2. Queued fold: the event is appended to a FIFO queue that a background
//!    task drains every `drain_interval` into per-page history.
//!
//! The drain is the only writer of `UnifiedPageMetrics::analytics`. Each page
//! keeps its most recent `page_history_limit` events in arrival order.
//!
//! Background tasks (drain interval, one-shot bootstrap health probe) hold a
//! weak reference and are cancelled by `shutdown()` or by dropping the
//! orchestrator.

pub mod event;
pub mod navigation;
pub mod page;

pub use event::{EventCategory, EventPayload, MetadataValue, UnifiedAnalyticsEvent};
pub use navigation::{
    NavigationDashboardMetrics, NavigationIntegration, RouteCount, RouteNavigationIntegration,
};
pub use page::{
    AccessibilityAudit, PageAccessibility, PagePerformance, PageRegistration, UnifiedPageMetrics,
};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::aggregator::{DataAggregator, LiveEventStats};
use crate::clock::{to_datetime, Clock};
use crate::config::OrchestratorSettings;
use crate::metrics::AnalyticsMetrics;
use crate::model::RealMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestratorState {
    Uninitialized,
    Initializing,
    Ready,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorState::Uninitialized => write!(f, "uninitialized"),
            OrchestratorState::Initializing => write!(f, "initializing"),
            OrchestratorState::Ready => write!(f, "ready"),
        }
    }
}

/// One row of the unified dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageOverview {
    pub page: String,
    pub title: Option<String>,
    pub events: usize,
    pub performance_score: Option<u8>,
    pub accessibility_score: Option<u8>,
    pub last_updated: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedDashboardSummary {
    pub state: OrchestratorState,
    pub total_pages: usize,
    /// Events waiting for the next drain
    pub queue_length: usize,
    /// Events held in page histories
    pub retained_events: usize,
    pub pages: Vec<PageOverview>,
    pub live: LiveEventStats,
    pub navigation: NavigationDashboardMetrics,
    pub generated_at: DateTime<Utc>,
}

struct BackgroundTasks {
    drain_shutdown: oneshot::Sender<()>,
    drain: JoinHandle<()>,
    bootstrap: JoinHandle<()>,
}

pub struct UnifiedAnalyticsOrchestrator {
    aggregator: Arc<DataAggregator>,
    navigation: Arc<dyn NavigationIntegration>,
    clock: Arc<dyn Clock>,
    metrics: Arc<AnalyticsMetrics>,
    settings: OrchestratorSettings,
    real_time: AtomicBool,
    state: RwLock<OrchestratorState>,
    queue: Mutex<VecDeque<UnifiedAnalyticsEvent>>,
    pages: RwLock<BTreeMap<String, UnifiedPageMetrics>>,
    tasks: Mutex<Option<BackgroundTasks>>,
}

impl UnifiedAnalyticsOrchestrator {
    pub fn new(
        aggregator: Arc<DataAggregator>,
        navigation: Arc<dyn NavigationIntegration>,
        clock: Arc<dyn Clock>,
        metrics: Arc<AnalyticsMetrics>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            aggregator,
            navigation,
            clock,
            metrics,
            settings,
            real_time: AtomicBool::new(true),
            state: RwLock::new(OrchestratorState::Uninitialized),
            queue: Mutex::new(VecDeque::new()),
            pages: RwLock::new(BTreeMap::new()),
            tasks: Mutex::new(None),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        *self.state.read()
    }

    /// Toggle the immediate forward to the aggregator's live counters.
    /// Queueing and the navigation forward are unaffected.
    pub fn set_real_time_tracking(&self, enabled: bool) {
        self.real_time.store(enabled, Ordering::Relaxed);
    }

    /// Start the drain task and the bootstrap health probe.
    ///
    /// Must be called from within a Tokio runtime. Any call while
    /// initializing or ready is a no-op.
    pub fn initialize(self: &Arc<Self>) {
        {
            let mut state = self.state.write();
            if *state != OrchestratorState::Uninitialized {
                tracing::debug!(state = %*state, "Orchestrator already initialized");
                return;
            }
            *state = OrchestratorState::Initializing;
        }

        let (drain_shutdown, shutdown_rx) = oneshot::channel();
        let drain = self.spawn_drain_task(shutdown_rx);
        let bootstrap = self.spawn_bootstrap_probe();
        *self.tasks.lock() = Some(BackgroundTasks {
            drain_shutdown,
            drain,
            bootstrap,
        });

        *self.state.write() = OrchestratorState::Ready;
        tracing::info!(
            drain_interval_ms = self.settings.drain_interval_ms,
            page_history_limit = self.settings.page_history_limit,
            "Unified analytics orchestrator ready"
        );
    }

    fn spawn_drain_task(self: &Arc<Self>, mut shutdown_rx: oneshot::Receiver<()>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.settings.drain_interval();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(orchestrator) = weak.upgrade() else {
                            break;
                        };
                        orchestrator.drain();
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Event drain task shutting down");
                        break;
                    }
                }
            }
        })
    }

    fn spawn_bootstrap_probe(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let delay = self.settings.bootstrap_delay();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(orchestrator) = weak.upgrade() else {
                return;
            };
            let health = orchestrator.aggregator.get_system_health().await;
            tracing::info!(overall = %health.overall, "Bootstrap health probe complete");
        })
    }

    /// Stop background tasks. Queued events stay queued until `drain` is
    /// called or the orchestrator is initialized again.
    pub fn shutdown(&self) {
        let Some(tasks) = self.tasks.lock().take() else {
            return;
        };
        let _ = tasks.drain_shutdown.send(());
        tasks.bootstrap.abort();
        drop(tasks.drain);

        *self.state.write() = OrchestratorState::Uninitialized;
        tracing::info!("Unified analytics orchestrator shut down");
    }

    /// Create the page record if absent; otherwise replace its registration
    /// and keep its history.
    pub fn register_page_analytics(&self, page: &str, registration: PageRegistration) {
        let now = self.clock.now_ms();
        let mut pages = self.pages.write();
        let record = pages
            .entry(page.to_string())
            .or_insert_with(|| UnifiedPageMetrics::new(page, now));
        record.registration = registration;
        record.last_updated = now;
        tracing::debug!(page = %page, "Page registered for analytics");
    }

    /// Enqueue an event and forward it immediately. Never fails: invalid
    /// events are logged and counted.
    ///
    /// The queue holds at most `max_queue_len` events. When nothing drains it
    /// (before `initialize`, after `shutdown`) the oldest are dropped and
    /// counted under `event_queue`.
    pub fn track_unified_event(&self, event: UnifiedAnalyticsEvent) {
        if let Err(e) = event.validate() {
            tracing::warn!(page = %event.page, category = %event.category(), error = %e, "Unified event rejected");
            self.metrics.record_tracking_error("unified_event");
            return;
        }

        if self.real_time.load(Ordering::Relaxed) {
            self.aggregator.record_live_event(&event);
        }
        if event.category() == EventCategory::Navigation {
            if let Err(e) = self.navigation.update_analytics(std::slice::from_ref(&event)) {
                tracing::warn!(page = %event.page, error = %e, "Navigation integration rejected event");
                self.metrics.record_tracking_error("navigation");
            }
        }

        let (depth, dropped) = {
            let mut queue = self.queue.lock();
            queue.push_back(event);
            let dropped = queue.len().saturating_sub(self.settings.max_queue_len);
            queue.drain(..dropped);
            (queue.len(), dropped)
        };
        if dropped > 0 {
            tracing::warn!(dropped, state = %self.state(), "Event queue full, oldest events dropped");
            self.metrics.record_tracking_error("event_queue");
        }
        self.metrics.events_enqueued.inc();
        self.metrics.queue_depth.set(depth as i64);
    }

    /// Fold every queued event into its page history. Returns the number of
    /// events drained.
    pub fn drain(&self) -> usize {
        let batch = std::mem::take(&mut *self.queue.lock());
        self.metrics.drain_cycles.inc();
        self.metrics.queue_depth.set(0);
        if batch.is_empty() {
            return 0;
        }

        let drained = batch.len();
        let mut by_page: BTreeMap<String, Vec<UnifiedAnalyticsEvent>> = BTreeMap::new();
        for event in batch {
            by_page.entry(event.page.clone()).or_default().push(event);
        }

        let now = self.clock.now_ms();
        let limit = self.settings.page_history_limit;
        {
            let mut pages = self.pages.write();
            for (page, events) in by_page {
                let record = pages
                    .entry(page)
                    .or_insert_with_key(|page| UnifiedPageMetrics::new(page.as_str(), now));
                record.append_events(events, limit);
                record.last_updated = now;
            }
        }

        self.metrics.events_drained.inc_by(drained as u64);
        tracing::debug!(events = drained, "Drained unified event queue");
        drained
    }

    pub fn update_page_performance(&self, page: &str, metrics: &RealMetrics) {
        let now = self.clock.now_ms();
        let mut pages = self.pages.write();
        let record = pages
            .entry(page.to_string())
            .or_insert_with(|| UnifiedPageMetrics::new(page, now));
        record.performance = Some(PagePerformance::from_metrics(metrics));
        record.last_updated = now;
    }

    pub fn update_page_accessibility(&self, page: &str, audit: AccessibilityAudit) {
        let now = self.clock.now_ms();
        let mut pages = self.pages.write();
        let record = pages
            .entry(page.to_string())
            .or_insert_with(|| UnifiedPageMetrics::new(page, now));
        record.accessibility = Some(PageAccessibility::from_audit(audit, now));
        record.last_updated = now;
    }

    pub fn get_page_metrics(&self, page: &str) -> Option<UnifiedPageMetrics> {
        self.pages.read().get(page).cloned()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn get_unified_dashboard_summary(&self) -> UnifiedDashboardSummary {
        let queue_length = self.queue_len();
        let pages: Vec<PageOverview> = self
            .pages
            .read()
            .values()
            .map(|record| PageOverview {
                page: record.page.clone(),
                title: record.registration.title.clone(),
                events: record.analytics.len(),
                performance_score: record.performance.as_ref().map(|p| p.score),
                accessibility_score: record.accessibility.as_ref().map(|a| a.score),
                last_updated: record.last_updated,
            })
            .collect();

        UnifiedDashboardSummary {
            state: self.state(),
            total_pages: pages.len(),
            queue_length,
            retained_events: pages.iter().map(|p| p.events).sum(),
            pages,
            live: self.aggregator.live_stats(),
            navigation: self.navigation.navigation_metrics_for_dashboard(),
            generated_at: to_datetime(self.clock.now_ms()),
        }
    }
}

impl Drop for UnifiedAnalyticsOrchestrator {
    fn drop(&mut self) {
        if let Some(tasks) = self.tasks.get_mut().take() {
            tasks.bootstrap.abort();
            tasks.drain.abort();
        }
    }
}
