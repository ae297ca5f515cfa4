use clap::Args;

use super::{open_tracker, CmdResult};

#[derive(Args)]
pub struct ClearArgs {
    /// Confirm the deletion
    #[arg(long)]
    yes: bool,
}

pub fn run(args: ClearArgs) -> CmdResult {
    if !args.yes {
        return Err("refusing to clear streak data without --yes".into());
    }
    let tracker = open_tracker()?;
    tracker.clear_all();
    println!("primary store cleared; fallback copies are kept");
    Ok(())
}
