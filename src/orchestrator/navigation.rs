// Navigation integration
//
// The navigation subsystem is a sibling of the analytics core. The
// orchestrator forwards navigation events to it as they arrive and reads its
// dashboard metrics back when composing the unified summary.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::event::{EventPayload, UnifiedAnalyticsEvent};
use crate::error::TelemetryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCount {
    pub route: String,
    pub visits: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationDashboardMetrics {
    pub total_navigations: u64,
    pub unique_routes: usize,
    pub top_routes: Vec<RouteCount>,
    /// Most travelled `from -> to` transition
    pub top_transition: Option<String>,
    pub last_navigation_at: Option<u64>,
}

pub trait NavigationIntegration: Send + Sync {
    fn update_analytics(&self, events: &[UnifiedAnalyticsEvent]) -> Result<(), TelemetryError>;

    fn navigation_metrics_for_dashboard(&self) -> NavigationDashboardMetrics;
}

#[derive(Default)]
struct RouteState {
    total: u64,
    routes: HashMap<String, u64>,
    transitions: HashMap<String, u64>,
    last_at: Option<u64>,
}

/// In-memory route counter
#[derive(Default)]
pub struct RouteNavigationIntegration {
    state: RwLock<RouteState>,
    top_limit: usize,
}

impl RouteNavigationIntegration {
    pub fn new(top_limit: usize) -> Self {
        Self {
            state: RwLock::new(RouteState::default()),
            top_limit,
        }
    }
}

impl NavigationIntegration for RouteNavigationIntegration {
    fn update_analytics(&self, events: &[UnifiedAnalyticsEvent]) -> Result<(), TelemetryError> {
        let mut state = self.state.write();
        for event in events {
            let EventPayload::Navigation { from, to } = &event.payload else {
                continue;
            };
            state.total += 1;
            *state.routes.entry(to.clone()).or_insert(0) += 1;
            if let Some(from) = from {
                *state
                    .transitions
                    .entry(format!("{} -> {}", from, to))
                    .or_insert(0) += 1;
            }
            state.last_at = Some(state.last_at.map_or(event.timestamp, |t| t.max(event.timestamp)));
        }
        Ok(())
    }

    fn navigation_metrics_for_dashboard(&self) -> NavigationDashboardMetrics {
        let state = self.state.read();

        let mut top_routes: Vec<RouteCount> = state
            .routes
            .iter()
            .map(|(route, visits)| RouteCount {
                route: route.clone(),
                visits: *visits,
            })
            .collect();
        top_routes.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.route.cmp(&b.route)));
        top_routes.truncate(self.top_limit);

        let top_transition = state
            .transitions
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(t, _)| t.clone());

        NavigationDashboardMetrics {
            total_navigations: state.total,
            unique_routes: state.routes.len(),
            top_routes,
            top_transition,
            last_navigation_at: state.last_at,
        }
    }
}
