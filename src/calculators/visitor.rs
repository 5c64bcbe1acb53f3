//! Session and visitor analytics
//!
//! Sessions are not stored anywhere; they are derived on demand by grouping
//! page views on the session id, then the client id, then `"unknown"`.
//! A session with exactly one view is a bounce.

use std::collections::{BTreeMap, HashMap};

use super::round_to;
use crate::collectors::PageViewEntry;
use crate::constants::{
    BASELINE_SESSION_DURATION_SECS, DEFAULT_ACTIVE_WINDOW_MS, TOP_PAGES_LIMIT, UNKNOWN_SESSION,
};
use crate::model::{PageCount, TimeRange, VisitorData};

/// One derived session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub key: String,
    pub views: usize,
    pub first_seen: u64,
    pub last_seen: u64,
    /// Pathname of the first view in the session
    pub landing_page: String,
}

impl SessionSummary {
    pub fn is_bounce(&self) -> bool {
        self.views == 1
    }

    pub fn duration_ms(&self) -> u64 {
        self.last_seen.saturating_sub(self.first_seen)
    }
}

#[derive(Debug, Clone)]
pub struct VisitorAnalytics {
    active_window_ms: u64,
}

impl Default for VisitorAnalytics {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVE_WINDOW_MS)
    }
}

impl VisitorAnalytics {
    pub fn new(active_window_ms: u64) -> Self {
        Self { active_window_ms }
    }

    pub fn session_key(entry: &PageViewEntry) -> &str {
        entry
            .session_id
            .as_deref()
            .or(entry.client_id.as_deref())
            .unwrap_or(UNKNOWN_SESSION)
    }

    /// Group entries into sessions, ordered by session key.
    /// Entries are expected oldest first, as the page view log returns them.
    pub fn group_sessions(entries: &[PageViewEntry]) -> Vec<SessionSummary> {
        let mut sessions: BTreeMap<&str, SessionSummary> = BTreeMap::new();

        for entry in entries {
            let key = Self::session_key(entry);
            sessions
                .entry(key)
                .and_modify(|s| {
                    s.views += 1;
                    if entry.timestamp < s.first_seen {
                        s.first_seen = entry.timestamp;
                        s.landing_page = entry.pathname.clone();
                    }
                    s.last_seen = s.last_seen.max(entry.timestamp);
                })
                .or_insert_with(|| SessionSummary {
                    key: key.to_string(),
                    views: 1,
                    first_seen: entry.timestamp,
                    last_seen: entry.timestamp,
                    landing_page: entry.pathname.clone(),
                });
        }

        sessions.into_values().collect()
    }

    /// Percentage of single-view sessions, 0 when there are none
    pub fn bounce_rate(sessions: &[SessionSummary]) -> u8 {
        if sessions.is_empty() {
            return 0;
        }
        let bounces = sessions.iter().filter(|s| s.is_bounce()).count();
        (100.0 * bounces as f64 / sessions.len() as f64).round() as u8
    }

    /// Mean of the positive session durations in seconds, or the baseline
    pub fn avg_session_duration_secs(sessions: &[SessionSummary]) -> u64 {
        let durations: Vec<u64> = sessions
            .iter()
            .map(SessionSummary::duration_ms)
            .filter(|d| *d > 0)
            .collect();

        if durations.is_empty() {
            return BASELINE_SESSION_DURATION_SECS;
        }
        let mean_ms = durations.iter().sum::<u64>() as f64 / durations.len() as f64;
        (mean_ms / 1000.0).round() as u64
    }

    /// Sessions with at least one view inside the active window
    pub fn active_sessions(&self, sessions: &[SessionSummary], now: u64) -> u64 {
        sessions
            .iter()
            .filter(|s| s.last_seen <= now && now - s.last_seen <= self.active_window_ms)
            .count() as u64
    }

    pub fn pages_per_session(page_views: usize, sessions: usize) -> f64 {
        if sessions == 0 {
            return 0.0;
        }
        round_to(page_views as f64 / sessions as f64, 1)
    }

    /// clamp(20·pps + 5·minutes + 0.4·(100 − bounce), 0, 100), rounded
    pub fn engagement_score(pages_per_session: f64, duration_minutes: f64, bounce_rate: u8) -> u8 {
        let raw = 20.0 * pages_per_session
            + 5.0 * duration_minutes
            + 0.4 * (100.0 - f64::from(bounce_rate));
        raw.clamp(0.0, 100.0).round() as u8
    }

    /// Most viewed pathnames, ties broken alphabetically
    pub fn top_pages(entries: &[PageViewEntry], limit: usize) -> Vec<PageCount> {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for entry in entries {
            *counts.entry(entry.pathname.as_str()).or_insert(0) += 1;
        }

        let mut pages: Vec<PageCount> = counts
            .into_iter()
            .map(|(page, views)| PageCount {
                page: page.to_string(),
                views,
            })
            .collect();
        pages.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.page.cmp(&b.page)));
        pages.truncate(limit);
        pages
    }

    /// Visitor aggregates over the views that fall inside `range`
    pub fn summarize(&self, entries: &[PageViewEntry], range: TimeRange, now: u64) -> VisitorData {
        let in_range: Vec<PageViewEntry> = entries
            .iter()
            .filter(|e| range.contains(e.timestamp, now))
            .cloned()
            .collect();
        let sessions = Self::group_sessions(&in_range);

        let bounce_rate = Self::bounce_rate(&sessions);
        let avg_duration = Self::avg_session_duration_secs(&sessions);
        let pps = Self::pages_per_session(in_range.len(), sessions.len());

        VisitorData {
            current_visitors: self.active_sessions(&sessions, now),
            page_views: in_range.len() as u64,
            unique_visitors: sessions.len() as u64,
            bounce_rate,
            avg_session_duration_secs: avg_duration,
            pages_per_session: pps,
            engagement_score: Self::engagement_score(pps, avg_duration as f64 / 60.0, bounce_rate),
            top_pages: Self::top_pages(&in_range, TOP_PAGES_LIMIT),
        }
    }
}
