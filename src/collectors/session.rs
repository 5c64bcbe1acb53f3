// Session manager
//
// Owns the visitor's session identity. The id lives in session storage so a
// reload keeps the same session; if storage is unavailable the manager falls
// back to an in-memory id rather than failing page tracking.

use std::sync::Arc;

use crate::clock::Clock;
use crate::constants::{
    PREVIOUS_METRIC_PREFIX, RETURNING_VISITOR_KEY, SESSION_ID_KEY, SESSION_START_KEY,
};
use crate::error::TelemetryError;
use crate::telemetry::KeyValueStore;

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    session_id: String,
    started_at: u64,
    returning: bool,
}

impl SessionManager {
    /// Resume the stored session or start a new one
    pub fn start(store: Arc<dyn KeyValueStore>, clock: &dyn Clock) -> Self {
        let now = clock.now_ms();

        let stored_id = store.get(SESSION_ID_KEY).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Session storage unreadable, using in-memory session");
            None
        });

        let (session_id, started_at) = match stored_id {
            Some(id) => {
                let started_at = store
                    .get(SESSION_START_KEY)
                    .ok()
                    .flatten()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(now);
                (id, started_at)
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                if let Err(e) = store
                    .set(SESSION_ID_KEY, &id)
                    .and_then(|_| store.set(SESSION_START_KEY, &now.to_string()))
                {
                    tracing::warn!(error = %e, "Failed to persist session id");
                }
                (id, now)
            }
        };

        let returning = matches!(store.get(RETURNING_VISITOR_KEY), Ok(Some(_)));
        if !returning {
            if let Err(e) = store.set(RETURNING_VISITOR_KEY, "1") {
                tracing::warn!(error = %e, "Failed to persist returning-visitor flag");
            }
        }

        tracing::debug!(session_id = %session_id, returning, "Session started");

        Self {
            store,
            session_id,
            started_at,
            returning,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn is_returning(&self) -> bool {
        self.returning
    }

    pub fn duration_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.started_at)
    }

    /// Value of `metric` recorded by an earlier read, if any
    pub fn previous_metric(&self, metric: &str) -> Option<f64> {
        self.store
            .get(&format!("{}{}", PREVIOUS_METRIC_PREFIX, metric))
            .ok()
            .flatten()
            .and_then(|v| v.parse().ok())
    }

    pub fn remember_metric(&self, metric: &str, value: f64) -> Result<(), TelemetryError> {
        self.store
            .set(&format!("{}{}", PREVIOUS_METRIC_PREFIX, metric), &value.to_string())
    }
}
