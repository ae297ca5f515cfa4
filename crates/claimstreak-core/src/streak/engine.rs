//! Daily claim streak state machine.
//!
//! Days are compared as local calendar dates, never as elapsed time: a claim
//! at 23:59 followed by one at 00:01 is consecutive, and so is a claim at
//! 00:01 followed by one at 23:59 the next day.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::badge::BadgeState;
use super::record::ClaimRecord;

/// How a claim moved the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// First recorded claim for the user
    Started,
    /// Last claim was yesterday
    Continued,
    /// Gap of two or more days
    Reset,
    /// Last claim date is after today; treated as a reset
    ClockRollback,
}

/// Result of feeding one successful claim into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreakUpdate {
    /// A claim was already counted today; the record is returned unchanged.
    AlreadyClaimedToday(ClaimRecord),
    Advanced {
        record: ClaimRecord,
        transition: StreakTransition,
        /// At most one badge flips to earned per claim
        new_badge: Option<BadgeState>,
    },
}

impl StreakUpdate {
    pub fn record(&self) -> &ClaimRecord {
        match self {
            StreakUpdate::AlreadyClaimedToday(record) => record,
            StreakUpdate::Advanced { record, .. } => record,
        }
    }

    pub fn into_record(self) -> ClaimRecord {
        match self {
            StreakUpdate::AlreadyClaimedToday(record) => record,
            StreakUpdate::Advanced { record, .. } => record,
        }
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, StreakUpdate::Advanced { .. })
    }

    pub fn new_badge(&self) -> Option<&BadgeState> {
        match self {
            StreakUpdate::Advanced { new_badge, .. } => new_badge.as_ref(),
            StreakUpdate::AlreadyClaimedToday(_) => None,
        }
    }
}

/// Display tier derived from the current streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTier {
    Newcomer,
    Starter,
    Regular,
    Expert,
    Master,
    Legend,
}

impl StreakTier {
    pub fn for_streak(streak: u32) -> Self {
        match streak {
            365.. => StreakTier::Legend,
            100.. => StreakTier::Master,
            30.. => StreakTier::Expert,
            7.. => StreakTier::Regular,
            3.. => StreakTier::Starter,
            _ => StreakTier::Newcomer,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StreakTier::Newcomer => "Newcomer",
            StreakTier::Starter => "Starter",
            StreakTier::Regular => "Regular",
            StreakTier::Expert => "Expert",
            StreakTier::Master => "Master",
            StreakTier::Legend => "Legend",
        }
    }
}

/// Reward multiplier applied by the host app to the claimed amount.
pub fn reward_multiplier(streak: u32) -> u32 {
    match streak {
        100.. => 5,
        30.. => 3,
        7.. => 2,
        _ => 1,
    }
}

/// A streak that will break at local midnight unless the user claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakRisk {
    pub current_streak: u32,
    /// Time left until the end of the local day
    #[serde(serialize_with = "serialize_duration_secs")]
    pub time_left: Duration,
}

fn serialize_duration_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}

/// Window before local midnight in which an unclaimed streak is flagged.
pub const DEFAULT_RISK_WINDOW_HOURS: i64 = 6;

#[derive(Debug, Clone)]
pub struct StreakEngine {
    risk_window: Duration,
}

impl Default for StreakEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StreakEngine {
    pub fn new() -> Self {
        Self {
            risk_window: Duration::hours(DEFAULT_RISK_WINDOW_HOURS),
        }
    }

    pub fn with_risk_window(risk_window: Duration) -> Self {
        Self { risk_window }
    }

    pub fn risk_window(&self) -> Duration {
        self.risk_window
    }

    /// Apply one successful claim made at `at` (claimant's local time).
    pub fn apply_claim(&self, prior: &ClaimRecord, at: DateTime<FixedOffset>) -> StreakUpdate {
        let today = at.date_naive();

        if prior.last_claim_date == Some(today) {
            tracing::debug!(%today, "claim already counted today; streak unchanged");
            return StreakUpdate::AlreadyClaimedToday(prior.clone());
        }

        let transition = classify(prior.last_claim_date, today);
        if transition == StreakTransition::ClockRollback {
            tracing::warn!(
                last_claim_date = ?prior.last_claim_date,
                %today,
                "last claim date is in the future; resetting streak"
            );
        }

        let mut record = prior.clone();
        record.reconcile_badges();
        record.current_streak = match transition {
            StreakTransition::Continued => prior.current_streak.saturating_add(1),
            _ => 1,
        };
        record.longest_streak = record.longest_streak.max(record.current_streak);
        record.total_claims = record.total_claims.saturating_add(1);
        record.last_claim_date = Some(today);

        let new_badge = award_highest_badge(&mut record, at.with_timezone(&Utc));
        record.retag();

        tracing::info!(
            current_streak = record.current_streak,
            longest_streak = record.longest_streak,
            total_claims = record.total_claims,
            ?transition,
            badge = new_badge.as_ref().map(|b| b.id.as_str()),
            "claim applied to streak"
        );

        StreakUpdate::Advanced {
            record,
            transition,
            new_badge,
        }
    }

    /// True when the record already holds a claim for the local date of `at`.
    pub fn claimed_today(&self, record: &ClaimRecord, at: DateTime<FixedOffset>) -> bool {
        record.last_claim_date == Some(at.date_naive())
    }

    /// Advisory check: the last claim was yesterday and local midnight is
    /// closer than the risk window.
    pub fn streak_risk(&self, record: &ClaimRecord, now: DateTime<FixedOffset>) -> Option<StreakRisk> {
        if record.current_streak == 0 {
            return None;
        }
        let today = now.date_naive();
        if record.last_claim_date != today.pred_opt() {
            return None;
        }
        let midnight = today
            .succ_opt()?
            .and_hms_opt(0, 0, 0)?
            .and_local_timezone(*now.offset())
            .single()?;
        let time_left = midnight - now;
        (time_left < self.risk_window).then_some(StreakRisk {
            current_streak: record.current_streak,
            time_left,
        })
    }
}

fn classify(last: Option<NaiveDate>, today: NaiveDate) -> StreakTransition {
    match last {
        None => StreakTransition::Started,
        Some(last) if Some(last) == today.pred_opt() => StreakTransition::Continued,
        Some(last) if last > today => StreakTransition::ClockRollback,
        Some(_) => StreakTransition::Reset,
    }
}

/// Mark the highest unearned badge the streak qualifies for. Lower badges
/// crossed in the same jump stay unearned.
fn award_highest_badge(record: &mut ClaimRecord, now: DateTime<Utc>) -> Option<BadgeState> {
    let streak = record.current_streak;
    let (_, slot) = record
        .badges
        .iter_mut()
        .filter(|b| !b.earned)
        .filter_map(|b| {
            let requirement = b.template()?.requirement;
            (requirement <= streak).then_some((requirement, b))
        })
        .max_by_key(|(requirement, _)| *requirement)?;

    slot.earned = true;
    slot.earned_at = Some(now);
    tracing::info!(badge = %slot.id, streak, "badge earned");
    Some(slot.clone())
}
