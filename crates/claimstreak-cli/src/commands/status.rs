use clap::Args;

use super::{local_time, open_tracker, parse_user, print_json, CmdResult};

#[derive(Args)]
pub struct StatusArgs {
    /// Wallet address
    address: String,
    /// Evaluate as of this RFC 3339 time (defaults to now)
    #[arg(long)]
    at: Option<String>,
}

pub fn run(args: StatusArgs) -> CmdResult {
    let tracker = open_tracker()?;
    let user = parse_user(&args.address)?;
    let at = local_time(args.at.as_deref())?;

    let status = tracker.status(&user, at);
    if let Some(risk) = &status.risk {
        eprintln!(
            "streak of {} ends in {}h{:02}m unless you claim",
            risk.current_streak,
            risk.time_left.num_hours(),
            risk.time_left.num_minutes() % 60
        );
    }
    print_json(&status)
}
