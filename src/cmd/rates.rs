//! Rates command - show the rate table in use

use super::{format_eur, format_rate, Env};
use crate::core::rates::{Bracket, ForfeitTier, RateTable};
use clap::Args;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct RatesCommand {
    /// Output the table as JSON, usable as a template for --rates
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct BracketRow {
    #[tabled(rename = "Slice")]
    slice: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

#[derive(Debug, Tabled)]
struct StatusRow {
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Exempt up to")]
    exemption: String,
    #[tabled(rename = "Minimum")]
    minimum: String,
}

#[derive(Debug, Tabled)]
struct ForfeitRow {
    #[tabled(rename = "Revenue up to")]
    ceiling: String,
    #[tabled(rename = "Forfeit")]
    forfeit: String,
}

impl RatesCommand {
    pub fn exec(&self, env: &Env) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&env.rates)?);
        } else {
            print_rates(&env.rates);
        }
        Ok(())
    }
}

fn print_rates(rates: &RateTable) {
    let social = &rates.social_contributions;
    let income = &rates.income_tax;

    println!();
    println!("RATE TABLE (fiscal year {})", rates.fiscal_year);
    println!();
    println!(
        "VAT rates: {}%, {}%, {}%",
        rates.vat.standard.normalize(),
        rates.vat.intermediate.normalize(),
        rates.vat.reduced.normalize()
    );
    println!();

    println!("SOCIAL CONTRIBUTIONS");
    print_table(bracket_rows(&social.tiers));
    let statuses = [
        ("Principal", &social.principal),
        ("Secondary", &social.secondary),
        ("Active retiree", &social.active_retiree),
    ];
    print_table(statuses.into_iter().map(|(status, t)| StatusRow {
        status,
        exemption: t.exemption_threshold.map_or("-".to_string(), format_eur),
        minimum: format_eur(t.minimum_contribution),
    }));
    println!(
        "  New activity: x{} during the first {} years",
        social.new_activity_factor.normalize(),
        social.new_activity_years
    );
    println!();

    println!("INCOME TAX");
    print_table(bracket_rows(&income.brackets));
    println!(
        "  Per dependent: -{} | Marital quotient: {} capped at {}",
        format_eur(income.per_dependent_reduction),
        format_rate(income.marital_quotient_rate),
        format_eur(income.marital_quotient_cap)
    );
    println!();

    println!("PROFESSIONAL EXPENSES (flat)");
    print_table(rates.professional_expenses.iter().map(|tier| ForfeitRow {
        ceiling: tier.ceiling().map_or("-".to_string(), format_eur),
        forfeit: match *tier {
            ForfeitTier::Proportional { rate, .. } => format_rate(rate),
            ForfeitTier::Fixed {
                base, marginal_rate, ..
            } if marginal_rate.is_zero() => format_eur(base),
            ForfeitTier::Fixed {
                base, marginal_rate, ..
            } => format!("{} + {}", format_eur(base), format_rate(marginal_rate)),
        },
    }));
    println!();
}

fn bracket_rows(brackets: &[Bracket]) -> Vec<BracketRow> {
    brackets
        .iter()
        .map(|b| BracketRow {
            slice: b.ceiling.map_or("remainder".to_string(), format_eur),
            rate: format_rate(b.rate),
        })
        .collect()
}

fn print_table<T: Tabled>(rows: impl IntoIterator<Item = T>) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}
