//! Page view collector
//!
//! An append-only log of page views with ring-buffer semantics: once the
//! configured capacity is reached, every new entry evicts the oldest one.
//! Insertion order defines recency.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AnalyticsError;

/// How the page was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageViewType {
    Navigate,
    Reload,
    BackForward,
    Prerender,
}

/// One recorded page view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageViewEntry {
    pub url: String,
    pub pathname: String,
    pub referrer: Option<String>,
    /// Epoch milliseconds
    pub timestamp: u64,
    pub session_id: Option<String>,
    /// Network identity used when no session id is known
    pub client_id: Option<String>,
    pub load_time_ms: Option<f64>,
    pub view_type: Option<PageViewType>,
}

/// Page view as reported by the host page; the coordinator fills in the
/// timestamp and the current session id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageViewInput {
    pub pathname: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub load_time_ms: Option<f64>,
    #[serde(default)]
    pub view_type: Option<PageViewType>,
}

impl PageViewInput {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            ..Default::default()
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_load_time(mut self, load_time_ms: f64) -> Self {
        self.load_time_ms = Some(load_time_ms);
        self
    }

    /// Check the input before it is turned into an entry
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if !self.pathname.starts_with('/') {
            return Err(AnalyticsError::Tracking(format!(
                "pathname '{}' must start with '/'",
                self.pathname
            )));
        }
        if let Some(load) = self.load_time_ms {
            if !load.is_finite() || load < 0.0 {
                return Err(AnalyticsError::Tracking(format!(
                    "load_time_ms must be a finite, non-negative number (got {})",
                    load
                )));
            }
        }
        Ok(())
    }

    /// Build the log entry. `default_session` is used when the input has no
    /// session id of its own.
    pub fn into_entry(self, timestamp: u64, default_session: Option<String>) -> PageViewEntry {
        PageViewEntry {
            url: self.url.unwrap_or_else(|| self.pathname.clone()),
            pathname: self.pathname,
            referrer: self.referrer,
            timestamp,
            session_id: self.session_id.or(default_session),
            client_id: self.client_id,
            load_time_ms: self.load_time_ms,
            view_type: self.view_type,
        }
    }
}

pub struct PageViewTracker {
    entries: RwLock<VecDeque<PageViewEntry>>,
    capacity: usize,
    total_recorded: AtomicU64,
}

impl PageViewTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            total_recorded: AtomicU64::new(0),
        }
    }

    /// Append an entry, returning the evicted oldest entry if the log was full
    pub fn record(&self, entry: PageViewEntry) -> Option<PageViewEntry> {
        let mut entries = self.entries.write();
        let evicted = if entries.len() >= self.capacity {
            entries.pop_front()
        } else {
            None
        };
        entries.push_back(entry);
        self.total_recorded.fetch_add(1, Ordering::Relaxed);
        evicted
    }

    /// Retained entries, oldest first
    pub fn entries(&self) -> Vec<PageViewEntry> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Views recorded over the tracker's lifetime, including evicted ones
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded.load(Ordering::Relaxed)
    }
}
