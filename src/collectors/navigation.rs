// Navigation timing collector

use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::TelemetryError;
use crate::model::NavigationMetrics;
use crate::telemetry::{NavigationTiming, TelemetrySource};

/// Turns raw navigation timestamps into phase durations
pub struct NavigationTimingTracker {
    source: Arc<dyn TelemetrySource>,
    last: RwLock<Option<NavigationMetrics>>,
}

impl NavigationTimingTracker {
    pub fn new(source: Arc<dyn TelemetrySource>) -> Self {
        Self {
            source,
            last: RwLock::new(None),
        }
    }

    /// Prime the tracker with the current navigation entry
    pub async fn start(&self) -> Result<(), TelemetryError> {
        self.refresh().await.map(|_| ())
    }

    /// Re-read navigation timing from the source.
    ///
    /// While the document is still loading the source has no entry; the last
    /// known metrics (or zeros) are returned in that case.
    pub async fn refresh(&self) -> Result<NavigationMetrics, TelemetryError> {
        match self.source.navigation_timing().await? {
            Some(timing) => {
                let metrics = Self::derive(&timing);
                *self.last.write() = Some(metrics.clone());
                Ok(metrics)
            }
            None => Ok(self.last.read().clone().unwrap_or_default()),
        }
    }

    pub fn last(&self) -> Option<NavigationMetrics> {
        self.last.read().clone()
    }

    /// Phase durations from raw timestamps. Out-of-order timestamps clamp to 0.
    pub fn derive(timing: &NavigationTiming) -> NavigationMetrics {
        let span = |start: f64, end: f64| (end - start).max(0.0);

        NavigationMetrics {
            dns_ms: span(timing.domain_lookup_start, timing.domain_lookup_end),
            tcp_ms: span(timing.connect_start, timing.connect_end),
            ttfb_ms: span(timing.request_start, timing.response_start),
            download_ms: span(timing.response_start, timing.response_end),
            dom_content_loaded_ms: span(timing.fetch_start, timing.dom_content_loaded_event_end),
            load_complete_ms: span(timing.fetch_start, timing.load_event_end),
            transfer_size_bytes: timing.transfer_size,
        }
    }
}
