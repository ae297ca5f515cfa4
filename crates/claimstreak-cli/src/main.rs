use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "claimstreak-cli", version, about = "Daily claim streak tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a claim that succeeded on chain
    Claim(commands::claim::ClaimArgs),
    /// Show streak, tier and cooldown for an address
    Status(commands::status::StatusArgs),
    /// Cooldown timer management
    Cooldown {
        #[command(subcommand)]
        action: commands::cooldown::CooldownAction,
    },
    /// Export or import a backup code
    Backup {
        #[command(subcommand)]
        action: commands::backup::BackupAction,
    },
    /// Badge catalog and progress
    Badges(commands::badges::BadgesArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Remove every streak record from the primary store
    Clear(commands::clear::ClearArgs),
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("CLAIMSTREAK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Claim(args) => commands::claim::run(args),
        Commands::Status(args) => commands::status::run(args),
        Commands::Cooldown { action } => commands::cooldown::run(action),
        Commands::Backup { action } => commands::backup::run(action),
        Commands::Badges(args) => commands::badges::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Clear(args) => commands::clear::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
