//! Aggregator cache key and entry types
//!
//! This module defines the read-through cache behind `DataAggregator`:
//! - `CacheKey`: `"{kind}-{scope}"`, where scope is a time range literal or
//!   `current` for health
//! - `CacheEntry`: a shared payload with its capture time and TTL
//! - `TtlCache`: the keyed store with hit/miss accounting
//!
//! An entry is fresh while `now - captured_at < ttl`. The expiry sweep removes
//! entries with `now - captured_at > ttl`, so an entry exactly `ttl` old is
//! no longer served but survives one more sweep.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::clock::Clock;
use crate::model::{RealMetrics, RealPageData, SystemHealthStatus, TimeRange, VisitorData};

/// Payload kind, the first half of every cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Metrics,
    Pages,
    Visitors,
    Health,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Metrics => "metrics",
            DataKind::Pages => "pages",
            DataKind::Visitors => "visitors",
            DataKind::Health => "health",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    pub kind: DataKind,
    pub scope: String,
}

impl CacheKey {
    pub fn for_range(kind: DataKind, range: TimeRange) -> Self {
        Self {
            kind,
            scope: range.as_str().to_string(),
        }
    }

    pub fn health() -> Self {
        Self {
            kind: DataKind::Health,
            scope: "current".to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.scope)
    }
}

/// Cached payload; entries share their data with every reader
#[derive(Debug, Clone)]
pub enum CachedPayload {
    Metrics(Arc<RealMetrics>),
    Pages(Arc<Vec<RealPageData>>),
    Visitors(Arc<VisitorData>),
    Health(Arc<SystemHealthStatus>),
}

/// Payload types the cache knows how to store
pub trait Cacheable: Sized + Send + Sync + 'static {
    const KIND: DataKind;

    fn into_payload(data: Arc<Self>) -> CachedPayload;

    fn from_payload(payload: &CachedPayload) -> Option<Arc<Self>>;
}

impl Cacheable for RealMetrics {
    const KIND: DataKind = DataKind::Metrics;

    fn into_payload(data: Arc<Self>) -> CachedPayload {
        CachedPayload::Metrics(data)
    }

    fn from_payload(payload: &CachedPayload) -> Option<Arc<Self>> {
        match payload {
            CachedPayload::Metrics(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }
}

impl Cacheable for Vec<RealPageData> {
    const KIND: DataKind = DataKind::Pages;

    fn into_payload(data: Arc<Self>) -> CachedPayload {
        CachedPayload::Pages(data)
    }

    fn from_payload(payload: &CachedPayload) -> Option<Arc<Self>> {
        match payload {
            CachedPayload::Pages(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }
}

impl Cacheable for VisitorData {
    const KIND: DataKind = DataKind::Visitors;

    fn into_payload(data: Arc<Self>) -> CachedPayload {
        CachedPayload::Visitors(data)
    }

    fn from_payload(payload: &CachedPayload) -> Option<Arc<Self>> {
        match payload {
            CachedPayload::Visitors(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }
}

impl Cacheable for SystemHealthStatus {
    const KIND: DataKind = DataKind::Health;

    fn into_payload(data: Arc<Self>) -> CachedPayload {
        CachedPayload::Health(data)
    }

    fn from_payload(payload: &CachedPayload) -> Option<Arc<Self>> {
        match payload {
            CachedPayload::Health(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub data: CachedPayload,
    /// Epoch milliseconds when the payload was stored
    pub captured_at: u64,
    pub ttl_ms: u64,
}

impl CacheEntry {
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.captured_at)
    }

    pub fn is_fresh(&self, now: u64) -> bool {
        self.age_ms(now) < self.ttl_ms
    }

    /// Eligible for the expiry sweep
    pub fn is_expired(&self, now: u64) -> bool {
        self.age_ms(now) > self.ttl_ms
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
    /// Fallback payloads served instead of live data
    pub fallbacks: u64,
}

impl CacheStats {
    /// Hit rate (hits / lookups), 0.0 when nothing was looked up
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    fallbacks: AtomicU64,
}

impl TtlCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
        }
    }

    /// Fresh payload for `key`, counting the lookup as a hit or miss.
    /// Stale entries are never returned.
    pub fn get<T: Cacheable>(&self, key: &CacheKey) -> Option<Arc<T>> {
        let now = self.clock.now_ms();
        let found = self
            .entries
            .read()
            .get(&key.to_string())
            .filter(|entry| entry.is_fresh(now))
            .and_then(|entry| T::from_payload(&entry.data));

        match found {
            Some(data) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(data)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `data` under `key`, replacing any previous entry
    pub fn insert<T: Cacheable>(&self, key: CacheKey, data: Arc<T>, ttl_ms: u64) {
        let entry = CacheEntry {
            data: T::into_payload(data),
            captured_at: self.clock.now_ms(),
            ttl_ms,
            key: key.clone(),
        };
        self.entries.write().insert(key.to_string(), entry);
    }

    /// Remove every entry, returning how many were dropped
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        count
    }

    /// Remove entries older than their TTL, returning how many were dropped
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub fn contains_key(&self, key: &CacheKey) -> bool {
        self.entries.read().contains_key(&key.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len() as u64,
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }
}
