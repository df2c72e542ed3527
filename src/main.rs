use anyhow::Context;
use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand};
use indeptax::cmd::{
    annual::AnnualCommand, profile::ProfileCommand, rates::RatesCommand, record::RecordCommand,
    schema::SchemaCommand, serve::ServeCommand, summary::SummaryCommand,
    validate::ValidateCommand, Env,
};
use indeptax::config::{Paths, Settings};
use indeptax::core::rates::{RateTable, LATEST_BUILTIN_YEAR};
use indeptax::tax::CalculationContext;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "indeptax")]
#[command(about = "Belgian self-employed VAT, social contribution and income tax estimator")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Settings file (defaults to config.json in the config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rate table JSON file (defaults to the built-in table)
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    /// Year against which years of activity are counted (defaults to the current year)
    #[arg(long, global = true)]
    reference_year: Option<i32>,

    /// Directory holding the yearly data files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Totals to set aside for one period
    Summary(SummaryCommand),
    /// Compute a period and save it into the yearly data
    Record(RecordCommand),
    /// Per-period and whole-year totals
    Annual(AnnualCommand),
    /// Apply a profile to every period of a year
    Profile(ProfileCommand),
    /// Show the rate table in use
    Rates(RatesCommand),
    /// Print the expected input formats
    Schema(SchemaCommand),
    /// Report data quality issues in a period file
    Validate(ValidateCommand),
    /// Run the HTTP API
    Serve(ServeCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    let env = cli.global.resolve()?;
    match cli.command {
        Command::Summary(cmd) => cmd.exec(&env),
        Command::Record(cmd) => cmd.exec(&env),
        Command::Annual(cmd) => cmd.exec(&env),
        Command::Profile(cmd) => cmd.exec(&env),
        Command::Rates(cmd) => cmd.exec(&env),
        Command::Validate(cmd) => cmd.exec(&env),
        Command::Serve(cmd) => cmd.exec(&env),
        Command::Schema(cmd) => cmd.exec(),
    }
}

impl GlobalArgs {
    /// Combine flags with the settings file; flags win.
    fn resolve(&self) -> anyhow::Result<Env> {
        let paths = Paths::new()?;
        let settings_file = self.config.clone().unwrap_or_else(|| paths.settings_file());
        let settings = Settings::load(&settings_file)?;

        let reference_year = self.reference_year.unwrap_or_else(|| Local::now().year());
        let rates = match self.rates.as_ref().or(settings.rates_file.as_ref()) {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open rate table {}", path.display()))?;
                RateTable::load(BufReader::new(file))?
            }
            None => RateTable::builtin(reference_year).or_else(|err| {
                log::warn!("{}, using {}", err, LATEST_BUILTIN_YEAR);
                RateTable::builtin(LATEST_BUILTIN_YEAR)
            })?,
        };

        let data_dir = self
            .data_dir
            .clone()
            .or_else(|| settings.data_dir.clone())
            .unwrap_or_else(|| paths.data_dir().to_path_buf());

        log::debug!(
            "reference year {}, rates {}, data in {}",
            reference_year,
            rates.fiscal_year,
            data_dir.display()
        );

        Ok(Env {
            context: CalculationContext::new(reference_year).with_policy(settings.status_table_policy),
            settings,
            rates,
            data_dir,
        })
    }
}
