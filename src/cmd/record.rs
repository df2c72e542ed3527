//! Record command - compute a period and save it into the yearly store

use super::{format_eur, read_period, Env};
use crate::store::{PeriodData, Store};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RecordCommand {
    /// Fiscal year the period belongs to
    #[arg(short, long)]
    year: i32,

    /// Period label (e.g. 2024-03)
    #[arg(short, long)]
    period: String,

    /// Period JSON file. Reads from stdin if not specified.
    #[arg(short, long, default_value = "-")]
    input: PathBuf,
}

impl RecordCommand {
    pub fn exec(&self, env: &Env) -> anyhow::Result<()> {
        let period = read_period(&self.input)?.parse(&env.rates, env.context.reference_year)?;
        for warning in &period.warnings {
            log::warn!("{}", warning);
        }

        let totals = env
            .calculator()
            .compute_totals(&period.transactions, &period.user_info)
            .rounded();

        let store = env.store();
        let mut data = store.load(self.year)?;
        let replaced = data
            .insert(
                self.period.clone(),
                PeriodData {
                    transactions: period.transactions,
                    balances: period.balances,
                    user_info: period.user_info,
                    totals: Some(totals),
                },
            )
            .is_some();
        store.save(self.year, &data)?;

        println!(
            "{} period {} of {}: {} to set aside",
            if replaced { "Updated" } else { "Recorded" },
            self.period,
            self.year,
            format_eur(totals.to_set_aside)
        );
        Ok(())
    }
}
