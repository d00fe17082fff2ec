use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxarchive::core::log::init_logging;
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Override the rate archive directory
    #[arg(long, global = true)]
    rates_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxarchive::AppCommand {
    fn from(cmd: Commands) -> fxarchive::AppCommand {
        match cmd {
            Commands::Fetch {
                start_year,
                end_year,
            } => fxarchive::AppCommand::Fetch {
                start_year,
                end_year,
            },
            Commands::Convert {
                amount,
                currency,
                date,
            } => fxarchive::AppCommand::Convert {
                amount,
                currency,
                date,
            },
            Commands::List { json } => fxarchive::AppCommand::List { json },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Download rates from every central bank into the archive
    Fetch {
        /// First year to request (defaults to the configured start year)
        #[arg(long)]
        start_year: Option<i32>,
        /// Last year to request (defaults to the current year)
        #[arg(long)]
        end_year: Option<i32>,
    },
    /// Convert a USD amount using the rate archived for a date
    Convert {
        /// Amount in USD
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
        /// Target currency code, e.g. PLN
        currency: String,
        /// Date such as 2024-01-15 or 01/15/2024
        date: String,
    },
    /// Show archived currencies and their date coverage
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxarchive::cli::setup::setup(),
        Some(cmd) => {
            fxarchive::run_command(
                cmd.into(),
                cli.config_path.as_deref(),
                cli.rates_dir.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
