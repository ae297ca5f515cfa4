//! Stand-in for a backend that could not be opened.

use super::KeyValueStore;
use crate::error::StoreError;

/// Fails every call with `StoreError::Unavailable`, so the two-tier store
/// runs on its fallback alone.
pub struct DisabledStore {
    backend: &'static str,
    reason: String,
}

impl DisabledStore {
    pub fn new(backend: &'static str, reason: impl Into<String>) -> Self {
        Self {
            backend,
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::unavailable(self.backend, self.reason.clone())
    }
}

impl KeyValueStore for DisabledStore {
    fn name(&self) -> &'static str {
        self.backend
    }

    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(self.error())
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(self.error())
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(self.error())
    }

    fn clear_prefix(&self, _prefix: &str) -> Result<usize, StoreError> {
        Err(self.error())
    }
}
