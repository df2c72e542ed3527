use super::profile::{ProfileError, UserInfo};
use super::rates::RateTable;
use super::transaction::{
    parse_transactions, Transaction, TransactionError, TransactionInput, MAX_AMOUNT,
};
use super::warnings::Warning;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("{account} balance exceeds {max} in magnitude: {value}")]
    BalanceTooLarge {
        account: &'static str,
        value: Decimal,
        max: Decimal,
    },
}

/// Account balances at the end of a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    #[serde(default)]
    #[schemars(with = "f64")]
    pub business: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub savings: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub private: Decimal,
}

impl Balances {
    pub fn total(&self) -> Decimal {
        self.business + self.savings + self.private
    }

    /// Balances may be negative but are bounded like every other amount.
    pub fn validate(&self) -> Result<(), InputError> {
        let accounts = [
            ("business", self.business),
            ("savings", self.savings),
            ("private", self.private),
        ];
        for (account, value) in accounts {
            if value.abs() > MAX_AMOUNT {
                return Err(InputError::BalanceTooLarge {
                    account,
                    value,
                    max: MAX_AMOUNT,
                });
            }
        }
        Ok(())
    }
}

/// Input root for one period: the transactions and the profile they are
/// taxed under.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInput {
    pub transactions: Vec<TransactionInput>,
    pub user_info: UserInfo,
    #[serde(default)]
    pub balances: Balances,
}

/// A period that passed boundary validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPeriod {
    pub transactions: Vec<Transaction>,
    pub user_info: UserInfo,
    pub balances: Balances,
    pub warnings: Vec<Warning>,
}

impl PeriodInput {
    pub fn parse(self, rates: &RateTable, reference_year: i32) -> Result<ParsedPeriod, InputError> {
        self.user_info.validate(reference_year)?;
        self.balances.validate()?;
        let (transactions, mut warnings) = parse_transactions(self.transactions)?;
        warnings.extend(quality_warnings(&transactions, rates));
        Ok(ParsedPeriod {
            transactions,
            user_info: self.user_info,
            balances: self.balances,
            warnings,
        })
    }
}

/// Read a period from JSON
pub fn read_period_json<R: Read>(reader: R) -> anyhow::Result<PeriodInput> {
    let input: PeriodInput = serde_json::from_reader(reader)?;
    log::debug!("read period with {} transactions", input.transactions.len());
    Ok(input)
}

/// Rate-table dependent checks on already validated transactions.
pub fn quality_warnings(transactions: &[Transaction], rates: &RateTable) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for tx in transactions {
        if tx.gross().is_zero() {
            warnings.push(Warning::ZeroAmount {
                id: tx.id().to_string(),
            });
        }
        if !rates.vat.is_known(tx.vat_rate()) {
            warnings.push(Warning::NonStandardVatRate {
                id: tx.id().to_string(),
                rate: tx.vat_rate(),
            });
        }
    }
    warnings
}
