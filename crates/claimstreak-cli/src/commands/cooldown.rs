use chrono::{DateTime, Utc};
use clap::Subcommand;
use claimstreak_core::ChainClaimStatus;
use serde_json::json;

use super::{open_tracker, parse_user, print_json, CmdResult};

#[derive(Subcommand)]
pub enum CooldownAction {
    /// Show whether the address may claim now
    Status {
        /// Wallet address
        address: String,
    },
    /// Clear the cooldown timer
    Reset {
        /// Wallet address
        address: String,
    },
    /// Adopt the contract's reported claim status
    Sync {
        /// Wallet address
        address: String,
        /// Whether the contract allows a claim right now
        #[arg(long)]
        can_claim: bool,
        /// Absolute next-eligible time as RFC 3339
        #[arg(long)]
        next_eligible_at: Option<String>,
        /// Seconds until eligible
        #[arg(long)]
        time_left: Option<i64>,
    },
}

pub fn run(action: CooldownAction) -> CmdResult {
    let tracker = open_tracker()?;
    let now = Utc::now();

    match action {
        CooldownAction::Status { address } => {
            let user = parse_user(&address)?;
            print_json(&tracker.check_eligibility(&user, now))?;
        }
        CooldownAction::Reset { address } => {
            let user = parse_user(&address)?;
            tracker.reset_cooldown(&user)?;
            println!("cooldown reset for {user}");
        }
        CooldownAction::Sync {
            address,
            can_claim,
            next_eligible_at,
            time_left,
        } => {
            let user = parse_user(&address)?;
            let next_eligible_at = next_eligible_at
                .map(|raw| {
                    DateTime::parse_from_rfc3339(&raw)
                        .map(|t| t.with_timezone(&Utc))
                        .map_err(|e| format!("invalid --next-eligible-at {raw:?}: {e}"))
                })
                .transpose()?;
            let status = ChainClaimStatus {
                can_claim,
                next_eligible_at,
                time_left_secs: time_left,
            };
            let effective = tracker.sync_chain_status(&user, &status, now)?;
            print_json(&json!({
                "user": user,
                "nextEligibleAt": effective,
            }))?;
        }
    }
    Ok(())
}
