use super::transaction::MAX_AMOUNT;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{field} must not be negative: {value}")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error("{field} exceeds {max}: {value}")]
    AmountTooLarge {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },
    #[error("activity start year {start} is after the reference year {reference}")]
    StartInFuture { start: i32, reference: i32 },
    #[error("activity start year {start} is before {min}")]
    StartTooEarly { start: i32, min: i32 },
}

/// Earliest accepted activity start year
pub const MIN_START_YEAR: i32 = 1900;

/// Independence status under the self-employed social security regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum IndependentStatus {
    #[default]
    Principal,
    /// Self-employment alongside salaried work
    Secondary,
    /// Self-employment after retirement
    ActiveRetiree,
}

impl fmt::Display for IndependentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndependentStatus::Principal => "principal",
            IndependentStatus::Secondary => "secondary",
            IndependentStatus::ActiveRetiree => "active retiree",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum MaritalStatus {
    #[default]
    Single,
    MarriedOrLegalPartner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum ExpenseMode {
    /// Forfeit computed from the rate table
    #[default]
    Flat,
    /// Declared actual expenses
    Actual,
}

/// Personal situation used by the contribution and income tax calculations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub status: IndependentStatus,
    /// Year the self-employed activity began
    pub activity_start_year: i32,
    #[serde(default)]
    pub marital_status: MaritalStatus,
    #[serde(default)]
    pub dependents: u32,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub spouse_income: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    #[serde(default)]
    pub expense_mode: ExpenseMode,
    /// Only used when `expense_mode` is `Actual`
    #[serde(default)]
    #[schemars(with = "f64")]
    pub actual_expenses: Decimal,
}

impl UserInfo {
    /// Default profile for someone who started this year.
    pub fn starting_in(year: i32) -> Self {
        UserInfo {
            status: IndependentStatus::default(),
            activity_start_year: year,
            marital_status: MaritalStatus::default(),
            dependents: 0,
            spouse_income: Decimal::ZERO,
            other_income: Decimal::ZERO,
            expense_mode: ExpenseMode::default(),
            actual_expenses: Decimal::ZERO,
        }
    }

    pub fn is_married(&self) -> bool {
        self.marital_status == MaritalStatus::MarriedOrLegalPartner
    }

    /// Full years of activity as of `reference_year`.
    pub fn years_of_activity(&self, reference_year: i32) -> i32 {
        reference_year.saturating_sub(self.activity_start_year)
    }

    /// Boundary check for externally supplied profiles.
    pub fn validate(&self, reference_year: i32) -> Result<(), ProfileError> {
        let amounts = [
            ("spouseIncome", self.spouse_income),
            ("otherIncome", self.other_income),
            ("actualExpenses", self.actual_expenses),
        ];
        for (field, value) in amounts {
            if value < Decimal::ZERO {
                return Err(ProfileError::NegativeAmount { field, value });
            }
            if value > MAX_AMOUNT {
                return Err(ProfileError::AmountTooLarge {
                    field,
                    value,
                    max: MAX_AMOUNT,
                });
            }
        }
        if self.activity_start_year < MIN_START_YEAR {
            return Err(ProfileError::StartTooEarly {
                start: self.activity_start_year,
                min: MIN_START_YEAR,
            });
        }
        if self.activity_start_year > reference_year {
            return Err(ProfileError::StartInFuture {
                start: self.activity_start_year,
                reference: reference_year,
            });
        }
        Ok(())
    }
}
