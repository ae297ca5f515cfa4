use clap::Subcommand;
use claimstreak_core::Config;

use super::{print_json, CmdResult};

/// Keys are `<section>.<field>`, with sections `storage`
/// (primary_db, fallback_file, record_prefix, cooldown_prefix), `cooldown`
/// (period_hours) and `streak` (risk_warning_hours).
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, e.g. `cooldown.period_hours`
    Get {
        /// Dotted key such as `storage.primary_db` or `streak.risk_warning_hours`
        key: String,
    },
    /// Validate and persist one value
    Set {
        /// Dotted key such as `cooldown.period_hours` (1..=8760)
        key: String,
        /// New value
        value: String,
    },
    /// Print the [storage], [cooldown] and [streak] sections as JSON
    List,
    /// Overwrite config.toml with the defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List => print_json(&Config::load()?)?,
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
