//! NavLayer CLI - Command-line interface
//!
//! This binary exposes the NavLayer library: maneuver icons, SKU billing
//! tokens, route requests and the configuration file.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use console::style;
use navlayer::config::ConfigFile;
use navlayer::logging::{init_logging, LoggingConfig};

use commands::config::ConfigCommands;
use commands::maneuver::ManeuverArgs;
use commands::route::RouteArgs;
use commands::sku::SkuArgs;
use commands::tokens::TokensAction;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "navlayer", version, about = "Turn-by-turn navigation toolkit")]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve the icon for a maneuver and optionally render it
    Maneuver(ManeuverArgs),

    /// Append the billing token to a resource URL
    Sku(SkuArgs),

    /// Issue or show billing tokens
    Tokens {
        #[command(subcommand)]
        action: TokensAction,
    },

    /// Request routes between two points
    Route(RouteArgs),

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // A broken config file must not prevent `config set` from fixing it.
    let logging = match ConfigFile::load() {
        Ok(config) => LoggingConfig::from(&config.logging),
        Err(_) => LoggingConfig::default(),
    };
    let logging = if cli.verbose {
        logging.with_level("debug")
    } else {
        logging
    };
    let _guard = init_logging(&logging)?;
    tracing::debug!(command = ?cli.command, "Starting");

    match cli.command {
        Commands::Maneuver(args) => commands::maneuver::run(args),
        Commands::Sku(args) => commands::sku::run(args),
        Commands::Tokens { action } => commands::tokens::run(action),
        Commands::Route(args) => commands::route::run(args),
        Commands::Config { command } => commands::config::run(command),
    }
}
