// In-memory key-value store standing in for browser session storage

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::KeyValueStore;
use crate::error::TelemetryError;

/// Session-lifetime string store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    /// When set, every operation fails (storage disabled / quota exceeded)
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.unavailable.store(true, Ordering::Relaxed);
        store
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn check_available(&self) -> Result<(), TelemetryError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(TelemetryError::Storage("session storage is unavailable".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, TelemetryError> {
        self.check_available()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TelemetryError> {
        self.check_available()?;
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
