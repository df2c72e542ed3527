pub mod annual;
pub mod profile;
pub mod rates;
pub mod record;
pub mod schema;
pub mod serve;
pub mod summary;
pub mod validate;

use crate::config::Settings;
use crate::core::period::{read_period_json, PeriodInput};
use crate::core::profile::UserInfo;
use crate::core::rates::RateTable;
use crate::core::transaction::{read_transactions_csv, TransactionInput};
use crate::store::JsonFileStore;
use crate::tax::totals::{CalculationContext, Calculator};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// Everything a command needs beyond its own arguments
#[derive(Debug, Clone)]
pub struct Env {
    pub settings: Settings,
    pub rates: RateTable,
    pub context: CalculationContext,
    pub data_dir: PathBuf,
}

impl Env {
    pub fn calculator(&self) -> Calculator<'_> {
        Calculator::new(&self.rates, self.context)
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.data_dir)
    }
}

/// Read a period (JSON), or stdin with "-"
pub fn read_period(path: &Path) -> anyhow::Result<PeriodInput> {
    read_period_json(open_input(path)?)
}

/// Read transactions from CSV (by extension) or a JSON array
pub fn read_transactions(path: &Path) -> anyhow::Result<Vec<TransactionInput>> {
    let reader = open_input(path)?;
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
        read_transactions_csv(reader)
    } else {
        Ok(serde_json::from_reader(reader)?)
    }
}

pub fn read_profile(path: &Path) -> anyhow::Result<UserInfo> {
    Ok(serde_json::from_reader(open_input(path)?)?)
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        read_stdin()
    } else {
        let file = File::open(path)
            .map_err(|err| anyhow::anyhow!("Failed to open {}: {}", path.display(), err))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn read_stdin() -> anyhow::Result<Box<dyn Read>> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }
    Ok(Box::new(Cursor::new(buffer)))
}

pub(crate) fn format_eur(amount: Decimal) -> String {
    let amount = amount.round_dp(2);
    if amount < Decimal::ZERO {
        format!("-€{:.2}", amount.abs())
    } else {
        format!("€{:.2}", amount)
    }
}

pub(crate) fn format_rate(fraction: Decimal) -> String {
    format!("{}%", (fraction * Decimal::ONE_HUNDRED).normalize())
}
