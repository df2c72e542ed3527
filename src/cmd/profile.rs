//! Profile command - apply a profile to every period of a year

use super::{format_eur, read_profile, Env};
use crate::store::Store;
use crate::tax::totals::Totals;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ProfileCommand {
    /// Fiscal year whose periods are updated
    #[arg(short, long)]
    year: i32,

    /// Profile JSON file (userInfo). Reads from stdin if not specified.
    #[arg(short, long, default_value = "-")]
    file: PathBuf,
}

impl ProfileCommand {
    pub fn exec(&self, env: &Env) -> anyhow::Result<()> {
        let profile = read_profile(&self.file)?;
        profile.validate(env.context.reference_year)?;

        let store = env.store();
        let mut data = store.load(self.year)?;
        if data.is_empty() {
            anyhow::bail!("No periods recorded for {}", self.year);
        }

        data.apply_profile(&profile, &env.calculator());
        store.save(self.year, &data)?;

        let total: Totals = data.periods().filter_map(|(_, p)| p.totals).sum();
        println!(
            "Updated {} period(s) of {}: {} to set aside",
            data.len(),
            self.year,
            format_eur(total.to_set_aside)
        );
        Ok(())
    }
}
