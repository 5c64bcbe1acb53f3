// Simulated telemetry source and health probe
//
// Deterministic stand-ins for the browser measurement APIs and network
// probes. The CLI replays a synthetic visit through them; tests use them to
// script success and failure.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{
    HealthProbe, HealthTarget, NavigationTiming, ProbeOutcome, ResourceEntry, SubscriptionId,
    TelemetrySource, VitalCallback, VitalName, WebVital,
};
use crate::error::TelemetryError;
use crate::model::MetricStatus;

/// Scriptable telemetry source
pub struct SimulatedTelemetry {
    subscribers: Mutex<HashMap<VitalName, Vec<(SubscriptionId, VitalCallback)>>>,
    next_subscription: AtomicU64,
    navigation: RwLock<Option<NavigationTiming>>,
    resources: RwLock<Vec<ResourceEntry>>,
    failing: AtomicBool,
}

impl Default for SimulatedTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTelemetry {
    /// An empty source: no navigation entry, no resources
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_subscription: AtomicU64::new(1),
            navigation: RwLock::new(None),
            resources: RwLock::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// A source pre-loaded with a typical marketing page load
    pub fn typical() -> Self {
        let source = Self::new();
        source.set_navigation(NavigationTiming {
            fetch_start: 2.0,
            domain_lookup_start: 4.0,
            domain_lookup_end: 22.0,
            connect_start: 22.0,
            connect_end: 61.0,
            request_start: 63.0,
            response_start: 241.0,
            response_end: 298.0,
            dom_content_loaded_event_end: 1_120.0,
            load_event_end: 1_860.0,
            transfer_size: 48_211,
        });
        source.set_resources(vec![
            resource("/static/app.js", "script", 312.0, 184_330),
            resource("/static/app.css", "link", 96.0, 22_104),
            resource("/images/hero.webp", "img", 1_240.0, 402_877),
            resource("/fonts/inter.woff2", "css", 140.0, 31_200),
            resource("/api/cta-config", "fetch", 88.0, 1_204),
        ]);
        source
    }

    /// A source whose every call fails
    pub fn failing() -> Self {
        let source = Self::new();
        source.set_failing(true);
        source
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    pub fn set_navigation(&self, timing: NavigationTiming) {
        *self.navigation.write() = Some(timing);
    }

    pub fn set_resources(&self, entries: Vec<ResourceEntry>) {
        *self.resources.write() = entries;
    }

    pub fn subscriber_count(&self, vital: VitalName) -> usize {
        self.subscribers
            .lock()
            .get(&vital)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Deliver a sample to every subscriber of its vital.
    /// Returns the number of callbacks invoked.
    pub fn emit(&self, vital: WebVital) -> usize {
        // Clone callbacks out so subscribers may re-enter the source
        let callbacks: Vec<VitalCallback> = self
            .subscribers
            .lock()
            .get(&vital.name)
            .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();

        for callback in &callbacks {
            callback(vital.clone());
        }
        callbacks.len()
    }

    /// Emit one good-looking sample for every vital
    pub fn emit_typical_vitals(&self) {
        let samples = [
            (VitalName::Fcp, 1_240.0),
            (VitalName::Lcp, 2_180.0),
            (VitalName::Cls, 0.04),
            (VitalName::Fid, 12.0),
            (VitalName::Inp, 168.0),
            (VitalName::Ttfb, 241.0),
        ];
        for (name, value) in samples {
            self.emit(WebVital {
                name,
                value,
                id: format!("v3-{}", name.as_str().to_lowercase()),
                delta: value,
                rating: MetricStatus::Good,
            });
        }
    }

    fn check_available(&self) -> Result<(), TelemetryError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(TelemetryError::Unavailable(
                "simulated telemetry failure".to_string(),
            ));
        }
        Ok(())
    }
}

fn resource(name: &str, initiator_type: &str, duration_ms: f64, transfer_size: u64) -> ResourceEntry {
    ResourceEntry {
        name: name.to_string(),
        initiator_type: initiator_type.to_string(),
        duration_ms,
        transfer_size,
    }
}

#[async_trait]
impl TelemetrySource for SimulatedTelemetry {
    fn subscribe(
        &self,
        vital: VitalName,
        callback: VitalCallback,
    ) -> Result<SubscriptionId, TelemetryError> {
        self.check_available()?;
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .entry(vital)
            .or_default()
            .push((id, callback));
        Ok(id)
    }

    fn unsubscribe(&self, vital: VitalName, id: SubscriptionId) {
        if let Some(subs) = self.subscribers.lock().get_mut(&vital) {
            subs.retain(|(sub, _)| *sub != id);
        }
    }

    async fn navigation_timing(&self) -> Result<Option<NavigationTiming>, TelemetryError> {
        self.check_available()?;
        Ok(self.navigation.read().clone())
    }

    async fn resource_entries(&self) -> Result<Vec<ResourceEntry>, TelemetryError> {
        self.check_available()?;
        Ok(self.resources.read().clone())
    }
}

/// Scripted probe results per target
#[derive(Debug, Clone)]
enum Scripted {
    Outcome(ProbeOutcome),
    Error(String),
    Hang,
}

/// Health probe with fixed, per-target answers. Unscripted targets are
/// healthy with a 42ms latency.
#[derive(Debug, Default)]
pub struct StaticHealthProbe {
    scripted: RwLock<HashMap<HealthTarget, Scripted>>,
}

impl StaticHealthProbe {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn with_outcome(self, target: HealthTarget, outcome: ProbeOutcome) -> Self {
        self.scripted.write().insert(target, Scripted::Outcome(outcome));
        self
    }

    pub fn with_error(self, target: HealthTarget, reason: &str) -> Self {
        self.scripted
            .write()
            .insert(target, Scripted::Error(reason.to_string()));
        self
    }

    /// The probe for `target` never resolves on its own
    pub fn with_hang(self, target: HealthTarget) -> Self {
        self.scripted.write().insert(target, Scripted::Hang);
        self
    }
}

#[async_trait]
impl HealthProbe for StaticHealthProbe {
    async fn probe(&self, target: HealthTarget) -> Result<ProbeOutcome, TelemetryError> {
        let scripted = self.scripted.read().get(&target).cloned();
        match scripted {
            None => Ok(ProbeOutcome::ok(42.0)),
            Some(Scripted::Outcome(outcome)) => Ok(outcome),
            Some(Scripted::Error(reason)) => Err(TelemetryError::ProbeFailed {
                target: target.to_string(),
                reason,
            }),
            Some(Scripted::Hang) => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Ok(ProbeOutcome::ok(f64::MAX))
            }
        }
    }
}
