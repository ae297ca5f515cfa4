//! In-process store for embedding hosts without a filesystem, and for tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::KeyValueStore;
use crate::error::StoreError;

const BACKEND: &str = "memory";

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.values
            .lock()
            .map_err(|_| StoreError::unavailable(BACKEND, "lock poisoned"))
    }

    pub fn len(&self) -> usize {
        self.values().map(|v| v.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values()?.remove(key);
        Ok(())
    }

    fn clear_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let mut values = self.values()?;
        let before = values.len();
        values.retain(|k, _| !k.starts_with(prefix));
        Ok(before - values.len())
    }
}
