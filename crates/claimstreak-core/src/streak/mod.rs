mod badge;
mod engine;
mod record;

pub use badge::{
    catalog_states, find_badge, reconcile, Badge, BadgeState, BADGE_CATALOG, BADGE_CATALOG_VERSION,
};
pub use engine::{
    reward_multiplier, StreakEngine, StreakRisk, StreakTier, StreakTransition, StreakUpdate,
    DEFAULT_RISK_WINDOW_HOURS,
};
pub use record::ClaimRecord;
