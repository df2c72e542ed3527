use super::totals::{Breakdown, Calculator, Totals};
use crate::core::profile::UserInfo;
use crate::core::transaction::Transaction;
use crate::store::YearlyData;
use rust_decimal::Decimal;
use serde::Serialize;

/// One period of the year as reported in the annual summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRow {
    pub label: String,
    pub transaction_count: usize,
    pub gross_revenue: Decimal,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualSummary {
    pub periods: Vec<PeriodRow>,
    /// Sum of the per-period totals
    pub period_totals: Totals,
    /// All of the year's transactions computed as a single period
    pub annual: Breakdown,
    /// Total balances of the latest period
    pub treasury: Decimal,
    pub net_income: Decimal,
}

/// Summarise a year of periods.
///
/// Brackets and tiers are annual, so the annual basis is recomputed over the
/// union of all transactions with the profile of the latest period rather
/// than summed from the periods.
pub fn annual_summary(data: &YearlyData, calculator: &Calculator) -> AnnualSummary {
    let periods: Vec<PeriodRow> = data
        .periods()
        .map(|(label, period)| {
            let breakdown = calculator.breakdown(&period.transactions, &period.user_info);
            PeriodRow {
                label: label.clone(),
                transaction_count: period.transactions.len(),
                gross_revenue: breakdown.gross_revenue,
                totals: period.totals.unwrap_or(breakdown.totals),
            }
        })
        .collect();

    let period_totals: Totals = periods.iter().map(|p| p.totals).sum();

    let latest = data.latest();
    let profile = latest
        .map(|(_, p)| p.user_info.clone())
        .unwrap_or_else(|| UserInfo::starting_in(calculator.context().reference_year));
    let transactions: Vec<Transaction> = data
        .periods()
        .flat_map(|(_, p)| p.transactions.iter().cloned())
        .collect();
    let annual = calculator.breakdown(&transactions, &profile);

    let treasury = latest
        .map(|(_, p)| p.balances.total())
        .unwrap_or(Decimal::ZERO);
    let net_income =
        annual.gross_revenue - annual.totals.social_contributions - annual.totals.income_tax;

    log::debug!(
        "annual summary over {} periods, {} transactions",
        periods.len(),
        transactions.len()
    );

    AnnualSummary {
        periods,
        period_totals,
        annual,
        treasury,
        net_income,
    }
}
