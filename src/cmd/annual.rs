//! Annual command - per-period totals and the whole-year recomputation

use super::{format_eur, Env};
use crate::store::Store;
use crate::tax::annual::{annual_summary, AnnualSummary};
use crate::tax::totals::Totals;
use clap::Args;
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct AnnualCommand {
    /// Fiscal year to summarise
    #[arg(short, long)]
    year: i32,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct PeriodTableRow {
    #[tabled(rename = "Period")]
    label: String,
    #[tabled(rename = "Txns")]
    transactions: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "VAT")]
    vat: String,
    #[tabled(rename = "Social")]
    social: String,
    #[tabled(rename = "Income Tax")]
    income_tax: String,
    #[tabled(rename = "Set Aside")]
    set_aside: String,
}

impl PeriodTableRow {
    fn new(label: &str, transactions: String, revenue: String, totals: &Totals) -> Self {
        PeriodTableRow {
            label: label.to_string(),
            transactions,
            revenue,
            vat: format_eur(totals.vat),
            social: format_eur(totals.social_contributions),
            income_tax: format_eur(totals.income_tax),
            set_aside: format_eur(totals.to_set_aside),
        }
    }
}

#[derive(Debug, Serialize)]
struct AnnualOutput<'a> {
    year: i32,
    #[serde(flatten)]
    summary: &'a AnnualSummary,
}

impl AnnualCommand {
    pub fn exec(&self, env: &Env) -> anyhow::Result<()> {
        let mut data = env.store().load(self.year)?;
        data.fill_totals(&env.calculator());
        let summary = annual_summary(&data, &env.calculator());

        if self.json {
            let output = AnnualOutput {
                year: self.year,
                summary: &summary,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            self.print_summary(&summary);
        }
        Ok(())
    }

    fn print_summary(&self, summary: &AnnualSummary) {
        if summary.periods.is_empty() {
            println!("No periods recorded for {}", self.year);
            return;
        }

        println!();
        println!("ANNUAL SUMMARY ({})", self.year);
        println!();

        let mut rows: Vec<PeriodTableRow> = summary
            .periods
            .iter()
            .map(|p| {
                PeriodTableRow::new(
                    &p.label,
                    p.transaction_count.to_string(),
                    format_eur(p.gross_revenue),
                    &p.totals,
                )
            })
            .collect();
        rows.push(PeriodTableRow::new(
            "Sum of periods",
            String::new(),
            String::new(),
            &summary.period_totals,
        ));
        rows.push(PeriodTableRow::new(
            "Annual basis",
            String::new(),
            format_eur(summary.annual.gross_revenue),
            &summary.annual.totals,
        ));

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!();

        println!("  Treasury:               {}", format_eur(summary.treasury));
        println!("  Net income:             {}", format_eur(summary.net_income));
        println!(
            "  Professional expenses:  {} (informational)",
            format_eur(summary.annual.professional_expenses)
        );
        println!();
    }
}
