//! Web Vitals collector
//!
//! Subscribes to every vital on the telemetry source and keeps the latest
//! sample per vital plus a bounded history. Ratings delivered by the source
//! are ignored: every sample is re-rated with the fixed thresholds in
//! `MetricKind`, so a sample's status depends only on its name and value.

use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::calculators::metrics::MetricKind;
use crate::error::{AnalyticsError, TelemetryError};
use crate::telemetry::{SubscriptionId, TelemetrySource, VitalName, WebVital};

/// Latest value per vital
pub type VitalSnapshot = BTreeMap<VitalName, f64>;

pub struct WebVitalsTracker {
    latest: RwLock<HashMap<VitalName, WebVital>>,
    history: Mutex<VecDeque<WebVital>>,
    history_limit: usize,
    samples: AtomicU64,
    subscriptions: Mutex<Vec<(VitalName, SubscriptionId)>>,
}

impl WebVitalsTracker {
    pub fn new(history_limit: usize) -> Self {
        Self {
            latest: RwLock::new(HashMap::new()),
            history: Mutex::new(VecDeque::new()),
            history_limit: history_limit.max(1),
            samples: AtomicU64::new(0),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to every vital on `source`.
    ///
    /// If any subscription fails, the ones already made are released before
    /// the error is returned. Callbacks hold a weak reference; `stop` is what
    /// actually frees them on the source.
    pub async fn start(
        self: &Arc<Self>,
        source: &dyn TelemetrySource,
    ) -> Result<(), TelemetryError> {
        for vital in VitalName::ALL {
            let weak: Weak<Self> = Arc::downgrade(self);
            let subscribed = source.subscribe(
                vital,
                Arc::new(move |sample: WebVital| {
                    if let Some(tracker) = weak.upgrade() {
                        if let Err(e) = tracker.record(sample) {
                            tracing::debug!(error = %e, "Dropped web vital sample from source");
                        }
                    }
                }),
            );
            match subscribed {
                Ok(id) => self.subscriptions.lock().push((vital, id)),
                Err(e) => {
                    self.stop(source);
                    return Err(e);
                }
            }
        }

        tracing::debug!(vitals = VitalName::ALL.len(), "Web vitals tracker subscribed");
        Ok(())
    }

    /// Release every subscription made by `start`. Safe to call repeatedly.
    pub fn stop(&self, source: &dyn TelemetrySource) {
        let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        if subscriptions.is_empty() {
            return;
        }
        for (vital, id) in &subscriptions {
            source.unsubscribe(*vital, *id);
        }
        tracing::debug!(released = subscriptions.len(), "Web vitals tracker unsubscribed");
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Record one sample. Rejects negative or non-finite values.
    pub fn record(&self, mut vital: WebVital) -> Result<(), AnalyticsError> {
        if !vital.value.is_finite() || vital.value < 0.0 {
            return Err(AnalyticsError::Tracking(format!(
                "{} value must be a finite, non-negative number (got {})",
                vital.name, vital.value
            )));
        }

        vital.rating = MetricKind::from(vital.name).status(vital.value);

        {
            let mut history = self.history.lock();
            history.push_back(vital.clone());
            while history.len() > self.history_limit {
                history.pop_front();
            }
        }
        self.latest.write().insert(vital.name, vital);
        self.samples.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn latest(&self, name: VitalName) -> Option<WebVital> {
        self.latest.read().get(&name).cloned()
    }

    pub fn snapshot(&self) -> VitalSnapshot {
        self.latest
            .read()
            .iter()
            .map(|(name, vital)| (*name, vital.value))
            .collect()
    }

    /// Samples in arrival order, oldest first
    pub fn history(&self) -> Vec<WebVital> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn sample_count(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }
}
