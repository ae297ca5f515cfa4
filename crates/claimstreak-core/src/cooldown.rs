//! Rolling claim cooldown.
//!
//! Independent of the calendar-day streak: the gate decides whether a claim
//! may be attempted at all, the streak engine only counts claims that went
//! through. Timers are stored as epoch milliseconds and expire lazily on read.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::KeyValueStore;
use crate::user::UserKey;

/// Default key prefix for cooldown timers.
pub const DEFAULT_COOLDOWN_PREFIX: &str = "claim_timer_";

/// Default length of the cooldown window.
pub const DEFAULT_COOLDOWN_HOURS: i64 = 24;

/// Claim status as reported by the on-chain contract, however obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainClaimStatus {
    pub can_claim: bool,
    #[serde(default)]
    pub next_eligible_at: Option<DateTime<Utc>>,
    /// Seconds until eligible, when the contract reports a relative value
    #[serde(default)]
    pub time_left_secs: Option<i64>,
}

/// Eligibility snapshot for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClaimEligibility {
    pub eligible: bool,
    pub next_eligible_at: Option<DateTime<Utc>>,
    pub remaining_secs: i64,
}

pub struct CooldownGate<S> {
    store: S,
    prefix: String,
    period: Duration,
}

impl<S: KeyValueStore> CooldownGate<S> {
    pub fn new(store: S) -> Self {
        Self::with_period(store, Duration::hours(DEFAULT_COOLDOWN_HOURS))
    }

    pub fn with_period(store: S, period: Duration) -> Self {
        Self {
            store,
            prefix: DEFAULT_COOLDOWN_PREFIX.to_string(),
            period,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Active timer for `user`, clearing it if it has run out.
    pub fn next_eligible_at(&self, user: &UserKey, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let key = user.storage_key(&self.prefix);
        let raw = match self.store.get(&key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(%user, error = %e, "cooldown timer unreadable; treating as unset");
                return None;
            }
        };

        let at = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        match at {
            Some(at) if at > now => Some(at),
            expired_or_garbage => {
                if expired_or_garbage.is_none() {
                    tracing::warn!(%user, raw = %raw, "discarding malformed cooldown timer");
                } else {
                    tracing::debug!(%user, "cooldown timer expired");
                }
                if let Err(e) = self.store.remove(&key) {
                    tracing::warn!(%user, error = %e, "failed to clear expired cooldown timer");
                }
                None
            }
        }
    }

    pub fn is_eligible(&self, user: &UserKey, now: DateTime<Utc>) -> bool {
        self.next_eligible_at(user, now).is_none()
    }

    /// Time until the user may claim again; zero when eligible.
    pub fn remaining(&self, user: &UserKey, now: DateTime<Utc>) -> Duration {
        self.next_eligible_at(user, now)
            .map(|at| at - now)
            .unwrap_or_else(Duration::zero)
    }

    pub fn eligibility(&self, user: &UserKey, now: DateTime<Utc>) -> ClaimEligibility {
        let next = self.next_eligible_at(user, now);
        ClaimEligibility {
            eligible: next.is_none(),
            next_eligible_at: next,
            remaining_secs: next.map(|at| (at - now).num_seconds()).unwrap_or(0),
        }
    }

    /// Start a new cooldown window at `now`.
    pub fn arm(&self, user: &UserKey, now: DateTime<Utc>) -> Result<DateTime<Utc>, StoreError> {
        let next = now.checked_add_signed(self.period).ok_or_else(|| {
            StoreError::unavailable("cooldown", format!("period {} overflows the clock", self.period))
        })?;
        self.store_timer(user, next)?;
        tracing::info!(%user, next_eligible_at = %next, "cooldown armed");
        Ok(next)
    }

    /// Drop the timer immediately.
    pub fn reset(&self, user: &UserKey) -> Result<(), StoreError> {
        self.store.remove(&user.storage_key(&self.prefix))?;
        tracing::info!(%user, "cooldown reset");
        Ok(())
    }

    /// Adopt the contract's view of the cooldown.
    ///
    /// An absolute future time wins; otherwise a positive relative time while
    /// the contract says the user cannot claim. Anything else leaves the
    /// local timer alone. Returns the timer now in effect.
    pub fn sync_chain_status(
        &self,
        user: &UserKey,
        status: &ChainClaimStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let adopted = match (status.next_eligible_at, status.time_left_secs) {
            (Some(at), _) if at > now => Some(at),
            (_, Some(secs)) if !status.can_claim && secs > 0 => {
                let at = Duration::try_seconds(secs).and_then(|left| now.checked_add_signed(left));
                if at.is_none() {
                    tracing::warn!(
                        %user,
                        time_left_secs = secs,
                        "chain time left out of range; keeping local timer"
                    );
                }
                at
            }
            _ => None,
        };

        if let Some(at) = adopted {
            self.store_timer(user, at)?;
            tracing::info!(%user, next_eligible_at = %at, "cooldown synced from chain status");
            return Ok(Some(at));
        }
        Ok(self.next_eligible_at(user, now))
    }

    fn store_timer(&self, user: &UserKey, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.store.set(
            &user.storage_key(&self.prefix),
            &at.timestamp_millis().to_string(),
        )
    }
}
