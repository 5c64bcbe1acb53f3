// Constants module - centralized default values for configuration
//
// This module defines the default values used throughout the codebase.
// Using constants instead of magic numbers keeps the collectors, cache and
// orchestrator in agreement about windows, thresholds and limits.

// =============================================================================
// Analytics config defaults
// =============================================================================

/// Default dashboard refresh interval in milliseconds
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 30_000;

/// Smallest refresh interval the config schema accepts
pub const MIN_REFRESH_INTERVAL_MS: u64 = 1_000;

/// Largest refresh interval the config schema accepts (5 minutes)
pub const MAX_REFRESH_INTERVAL_MS: u64 = 300_000;

/// Development environments never refresh slower than this
pub const DEVELOPMENT_REFRESH_CAP_MS: u64 = 10_000;

/// Default maximum number of retained page views
pub const DEFAULT_MAX_DATA_POINTS: u64 = 1_000;

/// Smallest page-view log the config schema accepts
pub const MIN_MAX_DATA_POINTS: u64 = 10;

/// Largest page-view log the config schema accepts
pub const MAX_MAX_DATA_POINTS: u64 = 10_000;

// =============================================================================
// Cache defaults
// =============================================================================

/// TTL for metrics, page and visitor payloads (30 seconds)
pub const DEFAULT_CACHE_TTL_MS: u64 = 30_000;

/// TTL for system health payloads (10 seconds)
pub const DEFAULT_HEALTH_CACHE_TTL_MS: u64 = 10_000;

// =============================================================================
// Dashboard quality thresholds
// =============================================================================

/// Dashboard loads faster than this can be rated high quality
pub const HIGH_QUALITY_LOAD_MS: u64 = 500;

/// Dashboard loads faster than this can be rated medium quality
pub const MEDIUM_QUALITY_LOAD_MS: u64 = 2_000;

// =============================================================================
// Health check defaults
// =============================================================================

/// Upper bound on a single health probe before it is rated as a warning
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Probe latency at or above this is rated as a warning
pub const SLOW_PROBE_LATENCY_MS: f64 = 1_000.0;

// =============================================================================
// Visitor analytics defaults
// =============================================================================

/// Sessions with activity inside this window count as active (5 minutes)
pub const DEFAULT_ACTIVE_WINDOW_MS: u64 = 5 * 60 * 1000;

/// Average session duration reported when no multi-view session exists
pub const BASELINE_SESSION_DURATION_SECS: u64 = 180;

/// Session key used when neither a session id nor a client id is known
pub const UNKNOWN_SESSION: &str = "unknown";

/// Number of pages reported in visitor top-page lists
pub const TOP_PAGES_LIMIT: usize = 5;

// =============================================================================
// Collector defaults
// =============================================================================

/// Web vital samples kept per tracker
pub const WEB_VITAL_HISTORY_LIMIT: usize = 500;

/// Resources slower than this are reported as slow
pub const SLOW_RESOURCE_MS: f64 = 1_000.0;

// =============================================================================
// Orchestrator defaults
// =============================================================================

/// Event queue drain interval in milliseconds
pub const DEFAULT_DRAIN_INTERVAL_MS: u64 = 5_000;

/// Events retained per page after each drain
pub const DEFAULT_PAGE_HISTORY_LIMIT: usize = 100;

/// Queued events kept between drains; the oldest are dropped beyond this
pub const DEFAULT_MAX_QUEUE_LEN: usize = 10_000;

/// Delay before the one-shot bootstrap health probe fires
pub const DEFAULT_BOOTSTRAP_DELAY_MS: u64 = 2_000;

// =============================================================================
// Session storage keys
// =============================================================================

/// Key under which the current session id is stored
pub const SESSION_ID_KEY: &str = "sitepulse:session-id";

/// Key under which the session start timestamp is stored
pub const SESSION_START_KEY: &str = "sitepulse:session-start";

/// Key marking a browser that has visited before
pub const RETURNING_VISITOR_KEY: &str = "sitepulse:returning";

/// Prefix for previously observed metric values
pub const PREVIOUS_METRIC_PREFIX: &str = "sitepulse:previous:";
