use clap::Args;
use claimstreak_core::{BADGE_CATALOG, BADGE_CATALOG_VERSION};
use serde_json::json;

use super::{open_tracker, parse_user, print_json, CmdResult};

#[derive(Args)]
pub struct BadgesArgs {
    /// Show progress for this address instead of the bare catalog
    address: Option<String>,
}

pub fn run(args: BadgesArgs) -> CmdResult {
    let Some(address) = args.address else {
        return print_json(&json!({
            "catalogVersion": BADGE_CATALOG_VERSION,
            "badges": BADGE_CATALOG,
        }));
    };

    let tracker = open_tracker()?;
    let user = parse_user(&address)?;
    let record = tracker.load_or_fresh(&user);

    let progress: Vec<_> = record
        .badges
        .iter()
        .map(|state| {
            let template = state.template();
            json!({
                "id": state.id,
                "name": template.map(|b| b.name),
                "requirement": template.map(|b| b.requirement),
                "earned": state.earned,
                "earnedAt": state.earned_at,
            })
        })
        .collect();
    print_json(&json!({
        "catalogVersion": BADGE_CATALOG_VERSION,
        "user": user,
        "badges": progress,
    }))
}
