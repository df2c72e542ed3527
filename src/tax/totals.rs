use super::expenses::professional_expenses;
use super::income::income_tax;
use super::social::{social_contributions, StatusTablePolicy};
use super::vat::{gross_revenue, net_vat};
use crate::core::profile::UserInfo;
use crate::core::rates::RateTable;
use crate::core::transaction::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Amounts owed for a period and the sum to set aside for them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub vat: Decimal,
    pub social_contributions: Decimal,
    pub income_tax: Decimal,
    pub to_set_aside: Decimal,
}

impl Totals {
    pub fn new(vat: Decimal, social_contributions: Decimal, income_tax: Decimal) -> Self {
        Totals {
            vat,
            social_contributions,
            income_tax,
            to_set_aside: vat + social_contributions + income_tax,
        }
    }

    /// Same totals in cents, for display and storage.
    pub fn rounded(&self) -> Self {
        Totals {
            vat: cents(self.vat),
            social_contributions: cents(self.social_contributions),
            income_tax: cents(self.income_tax),
            to_set_aside: cents(self.to_set_aside),
        }
    }
}

fn cents(amount: Decimal) -> Decimal {
    let mut amount = amount.round_dp(2);
    amount.rescale(2);
    amount
}

impl std::ops::Add for Totals {
    type Output = Totals;

    fn add(self, other: Totals) -> Totals {
        Totals {
            vat: self.vat + other.vat,
            social_contributions: self.social_contributions + other.social_contributions,
            income_tax: self.income_tax + other.income_tax,
            to_set_aside: self.to_set_aside + other.to_set_aside,
        }
    }
}

impl std::iter::Sum for Totals {
    fn sum<I: Iterator<Item = Totals>>(iter: I) -> Totals {
        iter.fold(Totals::default(), |acc, t| acc + t)
    }
}

/// Inputs to the computation that are not part of the data itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculationContext {
    /// Year against which years of activity are counted
    pub reference_year: i32,
    pub policy: StatusTablePolicy,
}

impl CalculationContext {
    pub fn new(reference_year: i32) -> Self {
        CalculationContext {
            reference_year,
            policy: StatusTablePolicy::default(),
        }
    }

    pub fn with_policy(self, policy: StatusTablePolicy) -> Self {
        CalculationContext { policy, ..self }
    }
}

/// Every intermediate figure of one computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub gross_revenue: Decimal,
    pub taxable_base: Decimal,
    pub professional_expenses: Decimal,
    pub totals: Totals,
}

/// The fiscal engine bound to one rate table and context.
///
/// Holds no mutable state: identical inputs always give identical totals.
#[derive(Debug, Clone, Copy)]
pub struct Calculator<'a> {
    rates: &'a RateTable,
    context: CalculationContext,
}

impl<'a> Calculator<'a> {
    pub fn new(rates: &'a RateTable, context: CalculationContext) -> Self {
        Calculator { rates, context }
    }

    pub fn rates(&self) -> &'a RateTable {
        self.rates
    }

    pub fn context(&self) -> CalculationContext {
        self.context
    }

    pub fn social_contributions(&self, gross_revenue: Decimal, profile: &UserInfo) -> Decimal {
        social_contributions(
            gross_revenue,
            profile,
            &self.rates.social_contributions,
            self.context.reference_year,
            self.context.policy,
        )
    }

    pub fn income_tax(&self, taxable_base: Decimal, profile: &UserInfo) -> Decimal {
        income_tax(taxable_base, profile, &self.rates.income_tax)
    }

    pub fn professional_expenses(&self, gross_revenue: Decimal, profile: &UserInfo) -> Decimal {
        professional_expenses(gross_revenue, profile, &self.rates.professional_expenses)
    }

    pub fn compute_totals(&self, transactions: &[Transaction], profile: &UserInfo) -> Totals {
        self.breakdown(transactions, profile).totals
    }

    /// Run the pipeline: VAT, revenue, contributions on revenue, income tax
    /// on revenue less contributions.
    pub fn breakdown(&self, transactions: &[Transaction], profile: &UserInfo) -> Breakdown {
        let vat = net_vat(transactions);
        let gross_revenue = gross_revenue(transactions);
        let social = self.social_contributions(gross_revenue, profile);
        let taxable_base = gross_revenue - social;
        let tax = self.income_tax(taxable_base, profile);

        log::debug!(
            "{} transactions: vat {} revenue {} contributions {} tax {}",
            transactions.len(),
            vat,
            gross_revenue,
            social,
            tax
        );

        Breakdown {
            gross_revenue,
            taxable_base,
            professional_expenses: self.professional_expenses(gross_revenue, profile),
            totals: Totals::new(vat, social, tax),
        }
    }
}

/// One-shot totals for a transaction set.
pub fn compute_totals(
    transactions: &[Transaction],
    profile: &UserInfo,
    rates: &RateTable,
    context: CalculationContext,
) -> Totals {
    Calculator::new(rates, context).compute_totals(transactions, profile)
}
