//! The handle a host application holds to report claims and query state.
//!
//! A host confirms the on-chain claim itself and then calls
//! [`ClaimTracker::record_claim`] exactly once. Nothing here ever initiates
//! a claim, and polling for countdowns or risk warnings only reads.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::backup::{BackupWorkflow, ImportOutcome};
use crate::cooldown::{ChainClaimStatus, ClaimEligibility, CooldownGate};
use crate::error::{BackupError, CoreError, StoreError};
use crate::storage::{
    Config, DisabledStore, DurableStore, FlatFileStore, KeyValueStore, SaveOutcome, SqliteStore,
    StoreTier,
};
use crate::streak::{
    reward_multiplier, BadgeState, ClaimRecord, StreakEngine, StreakRisk, StreakTier,
    StreakTransition, StreakUpdate,
};
use crate::user::UserKey;

/// What happened when a successful claim was reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimOutcome {
    pub user: UserKey,
    pub record: ClaimRecord,
    /// `None` when the claim fell on a day that was already counted
    pub transition: Option<StreakTransition>,
    pub new_badge: Option<BadgeState>,
    /// `None` when nothing needed saving
    pub saved: Option<SaveOutcome>,
    /// `None` when the cooldown timer could not be stored
    pub next_eligible_at: Option<DateTime<Utc>>,
}

/// Read-only view for display.
#[derive(Debug, Clone, Serialize)]
pub struct StreakStatus {
    pub user: UserKey,
    pub record: ClaimRecord,
    /// Tier the record came from; `None` for a user with no stored record
    pub source: Option<StoreTier>,
    pub tier: StreakTier,
    pub title: &'static str,
    pub multiplier: u32,
    pub claimed_today: bool,
    pub risk: Option<StreakRisk>,
    pub cooldown: ClaimEligibility,
}

pub struct ClaimTracker {
    store: DurableStore,
    gate: CooldownGate<Arc<dyn KeyValueStore>>,
    engine: StreakEngine,
}

impl ClaimTracker {
    pub fn new(
        store: DurableStore,
        gate: CooldownGate<Arc<dyn KeyValueStore>>,
        engine: StreakEngine,
    ) -> Self {
        Self {
            store,
            gate,
            engine,
        }
    }

    /// Build the SQLite primary and flat-file fallback described by `config`.
    ///
    /// A primary that cannot be opened is replaced by a disabled backend so
    /// the tracker keeps working on the fallback alone. Cooldown timers live
    /// in the fallback file.
    pub fn open(config: &Config) -> Result<Self, CoreError> {
        config.validate()?;

        let primary: Box<dyn KeyValueStore> =
            match Config::resolve_path(&config.storage.primary_db)
                .map_err(StoreError::from)
                .and_then(|path| SqliteStore::open_at(path))
            {
                Ok(db) => Box::new(db),
                Err(e) => {
                    tracing::warn!(error = %e, "primary store unavailable; running on fallback only");
                    Box::new(DisabledStore::new("sqlite", e.to_string()))
                }
            };

        let fallback: Arc<dyn KeyValueStore> = Arc::new(FlatFileStore::at(
            Config::resolve_path(&config.storage.fallback_file)?,
        ));

        let store = DurableStore::with_prefix(
            primary,
            Box::new(fallback.clone()),
            config.storage.record_prefix.clone(),
        );
        let gate = CooldownGate::with_period(fallback, config.cooldown_period())
            .with_prefix(config.storage.cooldown_prefix.clone());
        let engine = StreakEngine::with_risk_window(config.risk_window());

        Ok(Self::new(store, gate, engine))
    }

    /// Tracker backed entirely by process memory.
    pub fn in_memory() -> Self {
        use crate::storage::MemoryStore;

        let store = DurableStore::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()));
        let timers: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        Self::new(store, CooldownGate::new(timers), StreakEngine::new())
    }

    pub fn store(&self) -> &DurableStore {
        &self.store
    }

    pub fn gate(&self) -> &CooldownGate<Arc<dyn KeyValueStore>> {
        &self.gate
    }

    pub fn engine(&self) -> &StreakEngine {
        &self.engine
    }

    pub fn check_eligibility(&self, user: &UserKey, now: DateTime<Utc>) -> ClaimEligibility {
        self.gate.eligibility(user, now)
    }

    /// Stored record, or a fresh one for a user who never claimed.
    pub fn load_or_fresh(&self, user: &UserKey) -> ClaimRecord {
        self.store.load(user).unwrap_or_else(ClaimRecord::fresh)
    }

    /// Report a claim that already succeeded on chain.
    ///
    /// Advances the streak at most once per local day and always re-arms the
    /// cooldown from `at`.
    pub fn record_claim(&self, user: &UserKey, at: DateTime<FixedOffset>) -> ClaimOutcome {
        let prior = self.load_or_fresh(user);
        let update = self.engine.apply_claim(&prior, at);

        let (record, transition, new_badge, saved) = match update {
            StreakUpdate::AlreadyClaimedToday(record) => (record, None, None, None),
            StreakUpdate::Advanced {
                record,
                transition,
                new_badge,
            } => {
                let saved = self.store.save(user, &record);
                (record, Some(transition), new_badge, Some(saved))
            }
        };

        let next_eligible_at = match self.gate.arm(user, at.with_timezone(&Utc)) {
            Ok(next) => Some(next),
            Err(e) => {
                tracing::warn!(%user, error = %e, "failed to arm cooldown timer");
                None
            }
        };

        ClaimOutcome {
            user: user.clone(),
            record,
            transition,
            new_badge,
            saved,
            next_eligible_at,
        }
    }

    pub fn status(&self, user: &UserKey, at: DateTime<FixedOffset>) -> StreakStatus {
        let (record, source) = match self.store.load_with_tier(user) {
            Some((record, tier)) => (record, Some(tier)),
            None => (ClaimRecord::fresh(), None),
        };
        let tier = StreakTier::for_streak(record.current_streak);

        StreakStatus {
            user: user.clone(),
            source,
            tier,
            title: tier.title(),
            multiplier: reward_multiplier(record.current_streak),
            claimed_today: self.engine.claimed_today(&record, at),
            risk: self.engine.streak_risk(&record, at),
            cooldown: self.gate.eligibility(user, at.with_timezone(&Utc)),
            record,
        }
    }

    pub fn sync_chain_status(
        &self,
        user: &UserKey,
        status: &ChainClaimStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.gate.sync_chain_status(user, status, now)
    }

    pub fn reset_cooldown(&self, user: &UserKey) -> Result<(), StoreError> {
        self.gate.reset(user)
    }

    pub fn export_backup(&self, user: &UserKey, now: DateTime<Utc>) -> Result<String, BackupError> {
        BackupWorkflow::new(&self.store).export_backup(user, now)
    }

    pub fn import_backup(&self, code: &str) -> ImportOutcome {
        BackupWorkflow::new(&self.store).import_backup(code)
    }

    pub fn clear_all(&self) {
        self.store.clear_all();
    }
}
