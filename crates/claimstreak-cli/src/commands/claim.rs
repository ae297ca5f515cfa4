use chrono::Utc;
use clap::Args;

use super::{local_time, open_tracker, parse_user, print_json, CmdResult};

#[derive(Args)]
pub struct ClaimArgs {
    /// Wallet address that claimed
    address: String,
    /// Claim time as RFC 3339 (defaults to now)
    #[arg(long)]
    at: Option<String>,
    /// Record even while the cooldown is running
    #[arg(long)]
    force: bool,
}

pub fn run(args: ClaimArgs) -> CmdResult {
    let tracker = open_tracker()?;
    let user = parse_user(&args.address)?;
    let at = local_time(args.at.as_deref())?;

    let eligibility = tracker.check_eligibility(&user, at.with_timezone(&Utc));
    if !eligibility.eligible && !args.force {
        let next = eligibility
            .next_eligible_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        return Err(format!("{user} is on cooldown until {next} (use --force to override)").into());
    }

    let outcome = tracker.record_claim(&user, at);
    if let Some(badge) = &outcome.new_badge {
        if let Some(template) = badge.template() {
            eprintln!("badge earned: {} ({})", template.name, template.description);
        }
    }
    print_json(&outcome)
}
