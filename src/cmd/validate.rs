//! Validate command - surface data quality issues without computing totals

use super::{read_period, Env};
use crate::core::warnings::Warning;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Period JSON file. Reads from stdin if not specified.
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ValidationOutput<'a> {
    transaction_count: usize,
    issue_count: usize,
    issues: &'a [Warning],
}

impl ValidateCommand {
    pub fn exec(&self, env: &Env) -> anyhow::Result<()> {
        let period = read_period(&self.input)?.parse(&env.rates, env.context.reference_year)?;
        let issues = &period.warnings;

        if self.json {
            let output = ValidationOutput {
                transaction_count: period.transactions.len(),
                issue_count: issues.len(),
                issues,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_text(issues, period.transactions.len());
        }

        // Exit with code 1 if issues found
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}

fn print_text(issues: &[Warning], transaction_count: usize) {
    println!();
    println!("VALIDATION RESULTS ({} transactions)", transaction_count);
    println!();

    if issues.is_empty() {
        println!("\u{2713} No issues found.");
        return;
    }

    println!("\u{26A0} {} issue(s) found:", issues.len());
    println!();
    for (i, issue) in issues.iter().enumerate() {
        println!("  {}. [{}] {}", i + 1, issue.kind(), issue.transaction_id());
        println!("     {}", issue);
        println!();
    }
}
