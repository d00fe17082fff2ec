pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{Archive, Converter, Registry, YearRange};
use crate::store::RateStore;
use anyhow::Result;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

pub enum AppCommand {
    Fetch {
        start_year: Option<i32>,
        end_year: Option<i32>,
    },
    Convert {
        amount: Decimal,
        currency: String,
        date: String,
    },
    List {
        json: bool,
    },
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    rates_dir: Option<&str>,
) -> Result<()> {
    info!("fxarchive starting...");

    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    if let Some(dir) = rates_dir {
        config.rates_dir = Some(dir.to_string());
    }
    debug!("Loaded config: {config:#?}");

    let store = RateStore::new(config.rates_path()?);
    let registry = Registry::standard();
    debug!("Rate archive at {}", store.root().display());

    match command {
        AppCommand::Fetch {
            start_year,
            end_year,
        } => {
            let years = YearRange::new(
                start_year.unwrap_or(config.start_year),
                end_year.unwrap_or_else(|| Utc::now().year()),
            )?;
            let sources = providers::build_sources(&config, &registry)?;
            let summary = cli::fetch::run_fetch(&store, &sources, years).await;
            println!("{}", summary.display_as_table());
            Ok(())
        }
        AppCommand::Convert {
            amount,
            currency,
            date,
        } => {
            let converter = Converter::new(Archive::load(&store, &registry)?);
            let result = cli::convert::run_convert(&converter, amount, &currency, &date);
            println!("{}", cli::convert::result_json(&result)?);
            match result.error() {
                Some(e) => anyhow::bail!("Conversion failed: {e}"),
                None => Ok(()),
            }
        }
        AppCommand::List { json } => {
            let converter = Converter::new(Archive::load(&store, &registry)?);
            if json {
                println!("{}", cli::list::coverage_json(&converter)?);
            } else {
                println!("{}", cli::list::display_coverage(&converter));
            }
            Ok(())
        }
    }
}
