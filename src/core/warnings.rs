use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data-quality issues found while reading input. None of them block the
/// computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Warning {
    /// VAT rate is not one of the rates in the table (nor zero).
    NonStandardVatRate {
        id: String,
        #[schemars(with = "f64")]
        rate: Decimal,
    },
    /// Transaction has a zero gross amount.
    ZeroAmount { id: String },
    /// A supplied net or VAT amount disagrees with the recomputed one.
    DerivedMismatch {
        id: String,
        field: String,
        #[schemars(with = "f64")]
        supplied: Decimal,
        #[schemars(with = "f64")]
        computed: Decimal,
    },
}

impl Warning {
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::NonStandardVatRate { .. } => "NonStandardVatRate",
            Warning::ZeroAmount { .. } => "ZeroAmount",
            Warning::DerivedMismatch { .. } => "DerivedMismatch",
        }
    }

    pub fn transaction_id(&self) -> &str {
        match self {
            Warning::NonStandardVatRate { id, .. }
            | Warning::ZeroAmount { id }
            | Warning::DerivedMismatch { id, .. } => id,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NonStandardVatRate { rate, .. } => {
                write!(f, "VAT rate {}% is not a standard rate", rate)
            }
            Warning::ZeroAmount { .. } => write!(f, "gross amount is zero"),
            Warning::DerivedMismatch {
                field,
                supplied,
                computed,
                ..
            } => write!(
                f,
                "supplied {} {:.2} replaced by recomputed {:.2}",
                field, supplied, computed
            ),
        }
    }
}
