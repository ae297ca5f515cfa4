//! # claimstreak Core Library
//!
//! Daily-claim streak and cooldown engine for a token-claim rewards app.
//! The host confirms claims on chain; this crate decides whether a claim may
//! be attempted, counts consecutive claim days, awards milestone badges, and
//! keeps the per-user record safe across two storage tiers.
//!
//! ## Architecture
//!
//! - **Streak Engine**: calendar-day state machine over a [`ClaimRecord`]
//! - **Cooldown Gate**: rolling per-user timer, independent of the streak
//! - **Storage**: SQLite primary tier mirrored to a flat JSON file, with an
//!   integrity tag verified on every read
//! - **Backup**: single-line base64 codes for manual export/import
//!
//! ## Key Components
//!
//! - [`ClaimTracker`]: the handle a host holds to report claims
//! - [`StreakEngine`]: pure streak transitions
//! - [`DurableStore`]: two-tier record persistence
//! - [`CooldownGate`]: claim eligibility
//! - [`Config`]: TOML configuration

pub mod backup;
pub mod cooldown;
pub mod error;
pub mod integrity;
pub mod storage;
pub mod streak;
pub mod tracker;
pub mod user;

pub use backup::{BackupWorkflow, ImportOutcome};
pub use cooldown::{ChainClaimStatus, ClaimEligibility, CooldownGate};
pub use error::{BackupError, ConfigError, CoreError, DecodeError, StoreError, ValidationError};
pub use integrity::{compute_tag, decode_backup, encode_backup, verify, BackupPayload};
pub use storage::{
    Config, DurableStore, FlatFileStore, KeyValueStore, MemoryStore, SaveOutcome, SqliteStore,
    StoreTier,
};
pub use streak::{
    reward_multiplier, Badge, BadgeState, ClaimRecord, StreakEngine, StreakRisk, StreakTier,
    StreakTransition, StreakUpdate, BADGE_CATALOG, BADGE_CATALOG_VERSION,
};
pub use tracker::{ClaimOutcome, ClaimTracker, StreakStatus};
pub use user::UserKey;
