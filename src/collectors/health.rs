//! System health checker
//!
//! Probes every `HealthTarget` concurrently. Each probe is raced against a
//! fixed timer: a probe that has not answered when the timer fires is rated
//! `warning`. This bounds the wait but does not cancel anything the probe
//! started on the other side.
//!
//! Rating per probe:
//! - answered ok, latency below the slow threshold → healthy
//! - answered ok but slow, or timed out → warning
//! - answered not-ok, or errored → critical
//!
//! The latest result overwrites the previous one wholesale.

use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::constants::SLOW_PROBE_LATENCY_MS;
use crate::model::{HealthState, SystemHealthStatus};
use crate::telemetry::{HealthProbe, HealthTarget, ProbeOutcome};

/// Result of one full health sweep
#[derive(Debug, Clone)]
pub struct HealthCheckReport {
    pub status: SystemHealthStatus,
    pub per_target: BTreeMap<&'static str, HealthState>,
    /// Probe errors and timeouts, in target order
    pub errors: Vec<String>,
}

pub struct SystemHealthChecker {
    probe: Arc<dyn HealthProbe>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    last: RwLock<Option<SystemHealthStatus>>,
}

impl SystemHealthChecker {
    pub fn new(probe: Arc<dyn HealthProbe>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            probe,
            clock,
            timeout,
            last: RwLock::new(None),
        }
    }

    /// Rate a probe that answered
    pub fn rate(outcome: &ProbeOutcome) -> HealthState {
        if !outcome.ok {
            HealthState::Critical
        } else if outcome.latency_ms >= SLOW_PROBE_LATENCY_MS {
            HealthState::Warning
        } else {
            HealthState::Healthy
        }
    }

    async fn check_target(&self, target: HealthTarget) -> (HealthTarget, HealthState, Option<String>) {
        match tokio::time::timeout(self.timeout, self.probe.probe(target)).await {
            Ok(Ok(outcome)) => (target, Self::rate(&outcome), None),
            Ok(Err(e)) => (target, HealthState::Critical, Some(e.to_string())),
            Err(_) => (
                target,
                HealthState::Warning,
                Some(format!(
                    "{} probe timed out after {}ms",
                    target,
                    self.timeout.as_millis()
                )),
            ),
        }
    }

    /// Probe all targets concurrently and store the result
    pub async fn check(&self) -> HealthCheckReport {
        let results = join_all(HealthTarget::ALL.into_iter().map(|t| self.check_target(t))).await;

        let mut per_target = BTreeMap::new();
        let mut errors = Vec::new();
        for (target, state, error) in results {
            per_target.insert(target.as_str(), state);
            if let Some(e) = error {
                tracing::warn!(target = %target, error = %e, "Health probe failed");
                errors.push(e);
            }
        }

        let state_of = |t: HealthTarget| {
            per_target
                .get(t.as_str())
                .copied()
                .unwrap_or(HealthState::Critical)
        };
        let status = SystemHealthStatus::new(
            state_of(HealthTarget::Server),
            state_of(HealthTarget::Database),
            state_of(HealthTarget::Cdn),
            state_of(HealthTarget::Api),
            state_of(HealthTarget::Deployment),
            self.clock.now_ms(),
        );

        tracing::debug!(overall = %status.overall, errors = errors.len(), "Health check complete");
        *self.last.write() = Some(status.clone());

        HealthCheckReport {
            status,
            per_target,
            errors,
        }
    }

    pub fn last_status(&self) -> Option<SystemHealthStatus> {
        self.last.read().clone()
    }
}
