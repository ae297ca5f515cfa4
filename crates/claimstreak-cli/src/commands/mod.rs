pub mod backup;
pub mod badges;
pub mod claim;
pub mod config;
pub mod cooldown;
pub mod clear;
pub mod status;

use chrono::{DateTime, FixedOffset, Local};
use claimstreak_core::{ClaimTracker, Config, UserKey};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Tracker over the configured SQLite primary and flat-file fallback.
pub fn open_tracker() -> Result<ClaimTracker, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    Ok(ClaimTracker::open(&config)?)
}

pub fn parse_user(address: &str) -> Result<UserKey, Box<dyn std::error::Error>> {
    Ok(UserKey::parse(address)?)
}

/// Parse `--at` as RFC 3339, defaulting to the local clock.
pub fn local_time(at: Option<&str>) -> Result<DateTime<FixedOffset>, Box<dyn std::error::Error>> {
    match at {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| format!("invalid --at timestamp {raw:?}: {e}").into()),
        None => Ok(Local::now().fixed_offset()),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
