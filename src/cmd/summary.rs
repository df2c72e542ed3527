//! Summary command - totals to set aside for one period

use super::{format_eur, read_period, read_profile, read_transactions, Env};
use crate::core::period::{Balances, ParsedPeriod, PeriodInput};
use crate::core::profile::UserInfo;
use crate::core::transaction::{Direction, Transaction};
use crate::tax::totals::Breakdown;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// Period JSON file with transactions and userInfo. Reads from stdin if not specified.
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Transactions file (CSV or JSON array) instead of a period file
    #[arg(long, conflicts_with = "input")]
    transactions: Option<PathBuf>,

    /// Profile JSON used with --transactions (a new principal activity if omitted)
    #[arg(long, requires = "transactions")]
    profile: Option<PathBuf>,

    /// Show each transaction and the intermediate figures
    #[arg(long)]
    details: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SummaryData {
    reference_year: i32,
    fiscal_year: i32,
    gross_revenue: String,
    taxable_base: String,
    professional_expenses: String,
    vat: String,
    social_contributions: String,
    income_tax: String,
    to_set_aside: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

#[derive(Debug, Tabled)]
struct AmountRow {
    #[tabled(rename = "")]
    item: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Debug, Tabled)]
struct TransactionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Direction")]
    direction: &'static str,
    #[tabled(rename = "Gross")]
    gross: String,
    #[tabled(rename = "VAT %")]
    vat_rate: String,
    #[tabled(rename = "Net")]
    net: String,
    #[tabled(rename = "VAT")]
    vat: String,
    #[tabled(rename = "Fee")]
    fee: String,
}

impl SummaryCommand {
    pub fn exec(&self, env: &Env) -> anyhow::Result<()> {
        let input = self.read_input(env)?;
        let period = input.parse(&env.rates, env.context.reference_year)?;
        for warning in &period.warnings {
            log::warn!("{}", warning);
        }

        let breakdown = env
            .calculator()
            .breakdown(&period.transactions, &period.user_info);

        if self.json {
            self.print_json(env, &period, &breakdown)
        } else {
            self.print_summary(env, &period, &breakdown);
            Ok(())
        }
    }

    fn read_input(&self, env: &Env) -> anyhow::Result<PeriodInput> {
        match &self.transactions {
            Some(path) => {
                let user_info = match &self.profile {
                    Some(profile) => read_profile(profile)?,
                    None => UserInfo::starting_in(env.context.reference_year),
                };
                Ok(PeriodInput {
                    transactions: read_transactions(path)?,
                    user_info,
                    balances: Balances::default(),
                })
            }
            None => read_period(&self.input),
        }
    }

    fn print_summary(&self, env: &Env, period: &ParsedPeriod, breakdown: &Breakdown) {
        println!();
        println!(
            "TAX SUMMARY ({} rates) - {}, {} year(s) of activity",
            env.rates.fiscal_year,
            period.user_info.status,
            period.user_info.years_of_activity(env.context.reference_year)
        );
        println!();

        if self.details {
            print_transactions(&period.transactions);
            println!("  Gross revenue:          {}", format_eur(breakdown.gross_revenue));
            println!("  Taxable base:           {}", format_eur(breakdown.taxable_base));
            println!(
                "  Professional expenses:  {} (informational)",
                format_eur(breakdown.professional_expenses)
            );
            println!();
        }

        let totals = breakdown.totals;
        let rows = vec![
            AmountRow {
                item: "VAT",
                amount: format_eur(totals.vat),
            },
            AmountRow {
                item: "Social contributions",
                amount: format_eur(totals.social_contributions),
            },
            AmountRow {
                item: "Income tax",
                amount: format_eur(totals.income_tax),
            },
            AmountRow {
                item: "To set aside",
                amount: format_eur(totals.to_set_aside),
            },
        ];
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);

        if !period.warnings.is_empty() {
            println!();
            println!("\u{26A0} {} warning(s), run `validate` for details", period.warnings.len());
        }
        println!();
    }

    fn print_json(&self, env: &Env, period: &ParsedPeriod, breakdown: &Breakdown) -> anyhow::Result<()> {
        let totals = breakdown.totals;
        let data = SummaryData {
            reference_year: env.context.reference_year,
            fiscal_year: env.rates.fiscal_year,
            gross_revenue: format!("{:.2}", breakdown.gross_revenue.round_dp(2)),
            taxable_base: format!("{:.2}", breakdown.taxable_base.round_dp(2)),
            professional_expenses: format!("{:.2}", breakdown.professional_expenses.round_dp(2)),
            vat: format!("{:.2}", totals.vat.round_dp(2)),
            social_contributions: format!("{:.2}", totals.social_contributions.round_dp(2)),
            income_tax: format!("{:.2}", totals.income_tax.round_dp(2)),
            to_set_aside: format!("{:.2}", totals.to_set_aside.round_dp(2)),
            warnings: period.warnings.iter().map(|w| w.to_string()).collect(),
        };

        println!("{}", serde_json::to_string_pretty(&data)?);
        Ok(())
    }
}

fn print_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("  (no transactions)");
        println!();
        return;
    }

    let rows: Vec<TransactionRow> = transactions
        .iter()
        .map(|t| TransactionRow {
            date: t.date().format("%Y-%m-%d").to_string(),
            label: t.label().to_string(),
            direction: match t.direction() {
                Direction::Inflow => "In",
                Direction::Outflow => "Out",
            },
            gross: format_eur(t.gross()),
            vat_rate: format!("{}", t.vat_rate().normalize()),
            net: format_eur(t.net()),
            vat: format_eur(t.vat()),
            fee: format_eur(t.fee()),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();
}
