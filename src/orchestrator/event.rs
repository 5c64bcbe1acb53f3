//! Business analytics events
//!
//! `EventPayload` is a closed set of categories; anything not covered goes
//! through `Custom`. The free-form `metadata` bag only holds JSON-safe
//! primitives.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Navigation,
    Cta,
    Conversion,
    Engagement,
    Performance,
    Error,
    Custom,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Navigation => "navigation",
            EventCategory::Cta => "cta",
            EventCategory::Conversion => "conversion",
            EventCategory::Engagement => "engagement",
            EventCategory::Performance => "performance",
            EventCategory::Error => "error",
            EventCategory::Custom => "custom",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum EventPayload {
    Navigation {
        #[serde(default)]
        from: Option<String>,
        to: String,
    },
    Cta {
        action: String,
        #[serde(default)]
        target: Option<String>,
    },
    Conversion {
        goal: String,
    },
    Engagement {
        action: String,
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    Performance {
        metric: String,
        measured: f64,
    },
    Error {
        message: String,
        #[serde(default)]
        fatal: bool,
    },
    Custom {
        name: String,
    },
}

impl EventPayload {
    pub fn category(&self) -> EventCategory {
        match self {
            EventPayload::Navigation { .. } => EventCategory::Navigation,
            EventPayload::Cta { .. } => EventCategory::Cta,
            EventPayload::Conversion { .. } => EventCategory::Conversion,
            EventPayload::Engagement { .. } => EventCategory::Engagement,
            EventPayload::Performance { .. } => EventCategory::Performance,
            EventPayload::Error { .. } => EventCategory::Error,
            EventPayload::Custom { .. } => EventCategory::Custom,
        }
    }

    pub fn navigation(from: Option<&str>, to: impl Into<String>) -> Self {
        EventPayload::Navigation {
            from: from.map(str::to_string),
            to: to.into(),
        }
    }

    pub fn cta(action: impl Into<String>) -> Self {
        EventPayload::Cta {
            action: action.into(),
            target: None,
        }
    }

    pub fn conversion(goal: impl Into<String>) -> Self {
        EventPayload::Conversion { goal: goal.into() }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        EventPayload::Custom { name: name.into() }
    }
}

/// JSON-safe metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Number(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Number(v as f64)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Text(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Text(v)
    }
}

impl<T: Into<MetadataValue>> From<Option<T>> for MetadataValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(MetadataValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedAnalyticsEvent {
    /// Epoch milliseconds
    pub timestamp: u64,
    pub session_id: String,
    pub page: String,
    #[serde(flatten)]
    pub payload: EventPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl UnifiedAnalyticsEvent {
    pub fn new(
        page: impl Into<String>,
        payload: EventPayload,
        timestamp: u64,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            session_id: session_id.into(),
            page: page.into(),
            payload,
            label: None,
            value: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn category(&self) -> EventCategory {
        self.payload.category()
    }

    /// Reject events that cannot be folded into a page record
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.page.trim().is_empty() {
            return Err(AnalyticsError::Tracking("event page must not be empty".to_string()));
        }
        if let Some(value) = self.value {
            if !value.is_finite() {
                return Err(AnalyticsError::Tracking(format!(
                    "event value must be finite (got {})",
                    value
                )));
            }
        }
        let non_finite = self
            .metadata
            .iter()
            .find(|(_, v)| matches!(v, MetadataValue::Number(n) if !n.is_finite()));
        if let Some((key, _)) = non_finite {
            return Err(AnalyticsError::Tracking(format!(
                "metadata '{}' is not a finite number",
                key
            )));
        }
        Ok(())
    }
}
