//! Streak milestone badges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bumped whenever a catalog entry is added or its requirement changes.
pub const BADGE_CATALOG_VERSION: &str = "1";

/// A milestone template. The catalog is static; only earned state is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Minimum `current_streak` that unlocks the badge
    pub requirement: u32,
}

/// Fixed catalog, ascending by requirement.
pub const BADGE_CATALOG: &[Badge] = &[
    Badge {
        id: "first_steps",
        name: "First Steps",
        description: "Complete your first daily claim",
        requirement: 1,
    },
    Badge {
        id: "getting_started",
        name: "Getting Started",
        description: "Maintain a 3-day streak",
        requirement: 3,
    },
    Badge {
        id: "weekly_warrior",
        name: "Weekly Warrior",
        description: "Achieve a 7-day streak",
        requirement: 7,
    },
    Badge {
        id: "dedicated_user",
        name: "Dedicated User",
        description: "Reach a 14-day streak",
        requirement: 14,
    },
    Badge {
        id: "streak_master",
        name: "Streak Master",
        description: "Maintain a 30-day streak",
        requirement: 30,
    },
    Badge {
        id: "consistency_king",
        name: "Consistency King",
        description: "Achieve a 60-day streak",
        requirement: 60,
    },
    Badge {
        id: "century_achiever",
        name: "Century Achiever",
        description: "Reach the legendary 100-day streak",
        requirement: 100,
    },
    Badge {
        id: "streak_legend",
        name: "Streak Legend",
        description: "The ultimate 365-day streak",
        requirement: 365,
    },
];

/// Look up a catalog entry by id.
pub fn find_badge(id: &str) -> Option<&'static Badge> {
    BADGE_CATALOG.iter().find(|b| b.id == id)
}

/// Per-user earned state of one badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeState {
    pub id: String,
    pub earned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_at: Option<DateTime<Utc>>,
}

impl BadgeState {
    pub fn unearned(id: &str) -> Self {
        Self {
            id: id.to_string(),
            earned: false,
            earned_at: None,
        }
    }

    /// Catalog template for this entry, if it is still in the catalog.
    pub fn template(&self) -> Option<&'static Badge> {
        find_badge(&self.id)
    }
}

/// Unearned state for every catalog badge, in catalog order.
pub fn catalog_states() -> Vec<BadgeState> {
    BADGE_CATALOG
        .iter()
        .map(|b| BadgeState::unearned(b.id))
        .collect()
}

/// Rebuild a stored badge list against the current catalog.
///
/// Catalog entries come first in catalog order, reusing stored state by id.
/// Earned entries that left the catalog are kept after them; unearned ones
/// are dropped.
pub fn reconcile(stored: &[BadgeState]) -> Vec<BadgeState> {
    let mut badges: Vec<BadgeState> = BADGE_CATALOG
        .iter()
        .map(|template| {
            stored
                .iter()
                .find(|s| s.id == template.id)
                .cloned()
                .unwrap_or_else(|| BadgeState::unearned(template.id))
        })
        .collect();

    for legacy in stored {
        if legacy.earned
            && find_badge(&legacy.id).is_none()
            && !badges.iter().any(|b| b.id == legacy.id)
        {
            badges.push(legacy.clone());
        }
    }
    badges
}
