//! Two-tier record store.
//!
//! Every save goes to the primary backend and is mirrored to the fallback.
//! Loads prefer the primary and drop to the fallback when the primary is
//! unavailable, holds unparseable data, or fails its integrity check.
//! Backend faults are logged here and never reach the caller.

use serde::Serialize;
use std::sync::Mutex;

use super::KeyValueStore;
use crate::streak::ClaimRecord;
use crate::user::UserKey;

/// Default key prefix for streak records.
pub const DEFAULT_RECORD_PREFIX: &str = "streak_data_";

/// Which tier a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreTier {
    Primary,
    Fallback,
}

/// Which tiers accepted a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Both,
    PrimaryOnly,
    FallbackOnly,
    Failed,
}

impl SaveOutcome {
    pub fn is_persisted(&self) -> bool {
        !matches!(self, SaveOutcome::Failed)
    }
}

pub struct DurableStore {
    primary: Box<dyn KeyValueStore>,
    fallback: Box<dyn KeyValueStore>,
    prefix: String,
    io: Mutex<()>,
}

impl DurableStore {
    pub fn new(primary: Box<dyn KeyValueStore>, fallback: Box<dyn KeyValueStore>) -> Self {
        Self::with_prefix(primary, fallback, DEFAULT_RECORD_PREFIX)
    }

    pub fn with_prefix(
        primary: Box<dyn KeyValueStore>,
        fallback: Box<dyn KeyValueStore>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            primary,
            fallback,
            prefix: prefix.into(),
            io: Mutex::new(()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Retag `record` and write it to both tiers.
    pub fn save(&self, user: &UserKey, record: &ClaimRecord) -> SaveOutcome {
        let mut record = record.clone();
        record.retag();
        let key = user.storage_key(&self.prefix);

        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(%user, error = %e, "failed to serialize claim record");
                return SaveOutcome::Failed;
            }
        };

        let _io = self.io.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let primary_ok = match self.primary.set(&key, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    %user,
                    backend = self.primary.name(),
                    error = %e,
                    "primary store write failed; keeping fallback copy only"
                );
                false
            }
        };
        let fallback_ok = match self.fallback.set(&key, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    %user,
                    backend = self.fallback.name(),
                    error = %e,
                    "fallback store write failed"
                );
                false
            }
        };

        match (primary_ok, fallback_ok) {
            (true, true) => SaveOutcome::Both,
            (true, false) => SaveOutcome::PrimaryOnly,
            (false, true) => SaveOutcome::FallbackOnly,
            (false, false) => {
                tracing::error!(%user, "claim record could not be persisted to any tier");
                SaveOutcome::Failed
            }
        }
    }

    /// Load the record for `user`, or `None` when no tier holds a usable copy.
    pub fn load(&self, user: &UserKey) -> Option<ClaimRecord> {
        self.load_with_tier(user).map(|(record, _)| record)
    }

    pub fn load_with_tier(&self, user: &UserKey) -> Option<(ClaimRecord, StoreTier)> {
        let key = user.storage_key(&self.prefix);
        let _io = self.io.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(record) = read_verified(self.primary.as_ref(), &key, user) {
            tracing::debug!(%user, "loaded claim record from primary store");
            return Some((record, StoreTier::Primary));
        }
        let record = read_verified(self.fallback.as_ref(), &key, user)?;
        tracing::debug!(%user, "loaded claim record from fallback store");
        Some((record, StoreTier::Fallback))
    }

    /// Remove every record from the primary tier. The fallback is left as is.
    pub fn clear_all(&self) {
        let _io = self.io.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match self.primary.clear_prefix(&self.prefix) {
            Ok(removed) => tracing::info!(removed, "cleared claim records from primary store"),
            Err(e) => tracing::warn!(
                backend = self.primary.name(),
                error = %e,
                "failed to clear primary store"
            ),
        }
    }
}

fn read_verified(store: &dyn KeyValueStore, key: &str, user: &UserKey) -> Option<ClaimRecord> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(%user, backend = store.name(), error = %e, "store unavailable on read");
            return None;
        }
    };

    let mut record: ClaimRecord = match serde_json::from_str(&raw) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(%user, backend = store.name(), error = %e, "stored claim record is unreadable");
            return None;
        }
    };

    if !record.is_intact() {
        tracing::warn!(
            %user,
            backend = store.name(),
            "claim record failed integrity check; ignoring this copy"
        );
        return None;
    }

    // Catalog may have grown since the record was written.
    record.reconcile_badges();
    record.retag();
    Some(record)
}
