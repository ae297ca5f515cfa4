mod config;
pub mod database;
pub mod disabled;
pub mod durable;
pub mod flat;
pub mod memory;

pub use config::{Config, CooldownConfig, StorageConfig, StreakConfig};
pub use database::SqliteStore;
pub use disabled::DisabledStore;
pub use durable::{DurableStore, SaveOutcome, StoreTier};
pub use flat::FlatFileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StoreError;

/// Returns `~/.config/claimstreak[-dev]/` based on CLAIMSTREAK_ENV.
///
/// Set CLAIMSTREAK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CLAIMSTREAK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("claimstreak-dev")
    } else {
        base_dir.join("claimstreak")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// String key-value backend. Every write replaces the whole value.
pub trait KeyValueStore: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every key starting with `prefix`; returns how many went.
    fn clear_prefix(&self, prefix: &str) -> Result<usize, StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn clear_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        (**self).clear_prefix(prefix)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn clear_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        (**self).clear_prefix(prefix)
    }
}
