// Resource timing collector

use parking_lot::RwLock;
use std::sync::Arc;

use crate::constants::SLOW_RESOURCE_MS;
use crate::error::TelemetryError;
use crate::model::ResourceSummary;
use crate::telemetry::{ResourceEntry, TelemetrySource};

pub struct ResourceTimingTracker {
    source: Arc<dyn TelemetrySource>,
    last: RwLock<ResourceSummary>,
}

impl ResourceTimingTracker {
    pub fn new(source: Arc<dyn TelemetrySource>) -> Self {
        Self {
            source,
            last: RwLock::new(ResourceSummary::default()),
        }
    }

    pub async fn start(&self) -> Result<(), TelemetryError> {
        self.refresh().await.map(|_| ())
    }

    pub async fn refresh(&self) -> Result<ResourceSummary, TelemetryError> {
        let entries = self.source.resource_entries().await?;
        let summary = Self::summarize(&entries);
        *self.last.write() = summary.clone();
        Ok(summary)
    }

    pub fn last(&self) -> ResourceSummary {
        self.last.read().clone()
    }

    pub fn summarize(entries: &[ResourceEntry]) -> ResourceSummary {
        let mut summary = ResourceSummary {
            count: entries.len(),
            ..Default::default()
        };

        let mut largest: Option<&ResourceEntry> = None;
        for entry in entries {
            summary.total_transfer_bytes += entry.transfer_size;
            if entry.duration_ms > SLOW_RESOURCE_MS {
                summary.slow_count += 1;
            }
            *summary
                .by_type
                .entry(entry.initiator_type.clone())
                .or_insert(0) += 1;

            if largest.map_or(true, |l| entry.transfer_size > l.transfer_size) {
                largest = Some(entry);
            }
        }
        summary.largest = largest.map(|e| e.name.clone());
        summary
    }
}
