//! Manual backup and restore of a user's streak record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{BackupError, StoreError};
use crate::integrity::{decode_backup, encode_backup, BackupPayload};
use crate::storage::DurableStore;
use crate::user::UserKey;

/// Result of an import as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// Restored user, empty on failure
    pub user_key: String,
    pub success: bool,
    pub message: String,
}

pub struct BackupWorkflow<'a> {
    store: &'a DurableStore,
}

impl<'a> BackupWorkflow<'a> {
    pub fn new(store: &'a DurableStore) -> Self {
        Self { store }
    }

    /// Encode the stored record for `user` as a copy-paste code.
    pub fn export_backup(&self, user: &UserKey, now: DateTime<Utc>) -> Result<String, BackupError> {
        let record = self.store.load(user).ok_or_else(|| BackupError::NoData {
            user: user.to_string(),
        })?;
        let payload = BackupPayload::new(user.clone(), record, now);
        let code = encode_backup(&payload)?;
        tracing::info!(%user, "backup exported");
        Ok(code)
    }

    /// Decode `code` and overwrite the stored record for its user.
    ///
    /// Nothing is written unless the whole payload decodes and verifies.
    pub fn try_import_backup(&self, code: &str) -> Result<UserKey, BackupError> {
        let payload = decode_backup(code)?;
        let outcome = self.store.save(&payload.user_key, &payload.record);
        if !outcome.is_persisted() {
            return Err(StoreError::unavailable("durable", "no storage tier accepted the record").into());
        }
        tracing::info!(user = %payload.user_key, ?outcome, "backup restored");
        Ok(payload.user_key)
    }

    /// Import that reports failure as a value instead of an error.
    pub fn import_backup(&self, code: &str) -> ImportOutcome {
        match self.try_import_backup(code) {
            Ok(user) => ImportOutcome {
                user_key: user.to_string(),
                success: true,
                message: "streak data restored".into(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "backup import rejected");
                let message = match e {
                    BackupError::Decode(_) => "invalid backup code".to_string(),
                    other => other.to_string(),
                };
                ImportOutcome {
                    user_key: String::new(),
                    success: false,
                    message,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::streak::{ClaimRecord, StreakEngine};
    use chrono::{FixedOffset, TimeZone};

    fn store() -> DurableStore {
        DurableStore::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    fn claimed_record(days: u32) -> ClaimRecord {
        let engine = StreakEngine::new();
        let offset = FixedOffset::east_opt(0).unwrap();
        (0..days).fold(ClaimRecord::fresh(), |record, day| {
            let at = offset.with_ymd_and_hms(2025, 1, 1 + day, 9, 0, 0).unwrap();
            engine.apply_claim(&record, at).into_record()
        })
    }

    #[test]
    fn export_without_data_is_no_data() {
        let store = store();
        let flow = BackupWorkflow::new(&store);
        let err = flow
            .export_backup(&UserKey::parse("0xabc").unwrap(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, BackupError::NoData { .. }));
        assert!(err.to_string().contains("no streak data found"));
    }

    #[test]
    fn export_then_import_into_fresh_store() {
        let user = UserKey::parse("0xAbC").unwrap();
        let source = store();
        source.save(&user, &claimed_record(3));
        let code = BackupWorkflow::new(&source)
            .export_backup(&user, Utc::now())
            .unwrap();

        let target = store();
        let outcome = BackupWorkflow::new(&target).import_backup(&code);
        assert!(outcome.success);
        assert_eq!(outcome.user_key, "0xabc");
        assert_eq!(target.load(&user).unwrap(), claimed_record(3));
    }

    #[test]
    fn import_overwrites_existing_record() {
        let user = UserKey::parse("0xabc").unwrap();
        let store = store();
        store.save(&user, &claimed_record(2));
        let code = BackupWorkflow::new(&store)
            .export_backup(&user, Utc::now())
            .unwrap();

        store.save(&user, &claimed_record(5));
        let restored = BackupWorkflow::new(&store).try_import_backup(&code).unwrap();
        assert_eq!(restored, user);
        assert_eq!(store.load(&user).unwrap().current_streak, 2);
    }

    #[test]
    fn invalid_code_reports_failure_without_writing() {
        let user = UserKey::parse("0xabc").unwrap();
        let store = store();
        store.save(&user, &claimed_record(4));

        let flow = BackupWorkflow::new(&store);
        for code in ["", "%%%", "aGVsbG8=", "eyJ1c2VyS2V5Ijoi"] {
            let outcome = flow.import_backup(code);
            assert!(!outcome.success, "accepted {code:?}");
            assert!(outcome.user_key.is_empty());
            assert_eq!(outcome.message, "invalid backup code");
        }
        assert_eq!(store.load(&user).unwrap().current_streak, 4);
    }

    #[test]
    fn encode_failures_are_not_reported_as_bad_codes() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = BackupError::from(cause);
        assert!(matches!(err, BackupError::Encode(_)));
        assert!(err.to_string().starts_with("failed to encode backup"));
    }
}
