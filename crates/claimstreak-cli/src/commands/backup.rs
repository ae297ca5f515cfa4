use chrono::Utc;
use clap::Subcommand;

use super::{open_tracker, parse_user, print_json, CmdResult};

#[derive(Subcommand)]
pub enum BackupAction {
    /// Print a backup code for an address
    Export {
        /// Wallet address
        address: String,
    },
    /// Restore from a backup code
    Import {
        /// Code produced by `backup export`
        code: String,
    },
}

pub fn run(action: BackupAction) -> CmdResult {
    let tracker = open_tracker()?;

    match action {
        BackupAction::Export { address } => {
            let user = parse_user(&address)?;
            let code = tracker.export_backup(&user, Utc::now())?;
            println!("{code}");
        }
        BackupAction::Import { code } => {
            let outcome = tracker.import_backup(&code);
            print_json(&outcome)?;
            if !outcome.success {
                return Err(outcome.message.into());
            }
        }
    }
    Ok(())
}
