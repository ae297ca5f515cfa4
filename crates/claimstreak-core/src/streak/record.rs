use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::badge::{self, BadgeState, BADGE_CATALOG};
use crate::integrity;

/// Persisted streak state for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Local calendar date of the most recent successful claim
    #[serde(default)]
    pub last_claim_date: Option<NaiveDate>,
    pub total_claims: u32,
    #[serde(default)]
    pub badges: Vec<BadgeState>,
    #[serde(default)]
    pub integrity_tag: String,
}

impl Default for ClaimRecord {
    fn default() -> Self {
        Self::fresh()
    }
}

impl ClaimRecord {
    /// Zeroed record with every catalog badge unearned and a valid tag.
    pub fn fresh() -> Self {
        let mut record = Self {
            current_streak: 0,
            longest_streak: 0,
            last_claim_date: None,
            total_claims: 0,
            badges: badge::catalog_states(),
            integrity_tag: String::new(),
        };
        record.retag();
        record
    }

    /// Recompute `integrity_tag` from the other fields.
    pub fn retag(&mut self) {
        self.integrity_tag = integrity::compute_tag(self);
    }

    /// True when `integrity_tag` matches the record's contents.
    pub fn is_intact(&self) -> bool {
        integrity::verify(self, &self.integrity_tag)
    }

    /// Align `badges` with the current catalog. Does not retag.
    pub fn reconcile_badges(&mut self) {
        self.badges = badge::reconcile(&self.badges);
    }

    pub fn badge(&self, id: &str) -> Option<&BadgeState> {
        self.badges.iter().find(|b| b.id == id)
    }

    pub fn earned_badges(&self) -> impl Iterator<Item = &BadgeState> {
        self.badges.iter().filter(|b| b.earned)
    }

    /// Report the first violated record invariant, if any.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.longest_streak < self.current_streak {
            return Err(format!(
                "longest streak {} is below current streak {}",
                self.longest_streak, self.current_streak
            ));
        }
        if self.total_claims < self.longest_streak {
            return Err(format!(
                "total claims {} is below longest streak {}",
                self.total_claims, self.longest_streak
            ));
        }
        if self.current_streak > 0 && self.last_claim_date.is_none() {
            return Err("active streak without a last claim date".into());
        }
        if let Some(missing) = BADGE_CATALOG
            .iter()
            .find(|template| self.badge(template.id).is_none())
        {
            return Err(format!("badge '{}' is missing", missing.id));
        }
        Ok(())
    }
}
