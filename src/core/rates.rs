use super::profile::IndependentStatus;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateTableError {
    #[error("{table}: bracket list is empty")]
    Empty { table: &'static str },
    #[error("{table}: ceilings must be strictly ascending (bracket {index})")]
    Unsorted { table: &'static str, index: usize },
    #[error("{table}: only the last bracket may be unbounded (bracket {index})")]
    UnboundedNotLast { table: &'static str, index: usize },
    #[error("{table}: last bracket must be unbounded")]
    BoundedLast { table: &'static str },
    #[error("{table}: negative rate in bracket {index}")]
    NegativeRate { table: &'static str, index: usize },
    #[error("no built-in rate table for fiscal year {0}")]
    UnknownYear(i32),
    #[error("invalid rate table json: {0}")]
    Json(String),
}

/// One slice of a progressive levy.
///
/// `ceiling` is the width of the slice taxed at `rate`; `None` absorbs
/// whatever remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Bracket {
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub ceiling: Option<Decimal>,
    #[schemars(with = "f64")]
    pub rate: Decimal,
}

impl Bracket {
    pub const fn new(ceiling: Decimal, rate: Decimal) -> Self {
        Bracket {
            ceiling: Some(ceiling),
            rate,
        }
    }

    pub const fn unbounded(rate: Decimal) -> Self {
        Bracket {
            ceiling: None,
            rate,
        }
    }
}

/// Exemption threshold and minimum contribution for one independence status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusThresholds {
    /// Gross revenue at or below which no contribution is due
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub exemption_threshold: Option<Decimal>,
    #[schemars(with = "f64")]
    pub minimum_contribution: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocialContributionRates {
    /// Principal-status tiers, applied to every status above its exemption
    pub tiers: Vec<Bracket>,
    pub principal: StatusThresholds,
    pub secondary: StatusThresholds,
    pub active_retiree: StatusThresholds,
    /// Years of activity during which the new-activity reduction applies
    pub new_activity_years: i32,
    /// Multiplier applied during the new-activity period (0.7 = 30% off)
    #[schemars(with = "f64")]
    pub new_activity_factor: Decimal,
}

impl SocialContributionRates {
    pub fn thresholds(&self, status: IndependentStatus) -> &StatusThresholds {
        match status {
            IndependentStatus::Principal => &self.principal,
            IndependentStatus::Secondary => &self.secondary,
            IndependentStatus::ActiveRetiree => &self.active_retiree,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxRates {
    pub brackets: Vec<Bracket>,
    #[schemars(with = "f64")]
    pub per_dependent_reduction: Decimal,
    /// Share of the taxable base notionally attributed to the spouse
    #[schemars(with = "f64")]
    pub marital_quotient_rate: Decimal,
    #[schemars(with = "f64")]
    pub marital_quotient_cap: Decimal,
}

/// Flat professional-expense tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ForfeitTier {
    /// `gross * rate` for revenue up to `ceiling`
    #[serde(rename_all = "camelCase")]
    Proportional {
        #[serde(default)]
        #[schemars(with = "Option<f64>")]
        ceiling: Option<Decimal>,
        #[schemars(with = "f64")]
        rate: Decimal,
    },
    /// `base + (gross - previous ceiling) * marginal_rate`
    #[serde(rename_all = "camelCase")]
    Fixed {
        #[serde(default)]
        #[schemars(with = "Option<f64>")]
        ceiling: Option<Decimal>,
        #[schemars(with = "f64")]
        base: Decimal,
        #[schemars(with = "f64")]
        marginal_rate: Decimal,
    },
}

impl ForfeitTier {
    pub fn ceiling(&self) -> Option<Decimal> {
        match self {
            ForfeitTier::Proportional { ceiling, .. } | ForfeitTier::Fixed { ceiling, .. } => {
                *ceiling
            }
        }
    }

    fn rates(&self) -> [Decimal; 2] {
        match self {
            ForfeitTier::Proportional { rate, .. } => [*rate, Decimal::ZERO],
            ForfeitTier::Fixed {
                base,
                marginal_rate,
                ..
            } => [*base, *marginal_rate],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VatRates {
    #[schemars(with = "f64")]
    pub standard: Decimal,
    #[schemars(with = "f64")]
    pub intermediate: Decimal,
    #[schemars(with = "f64")]
    pub reduced: Decimal,
}

impl VatRates {
    /// Whether `rate` (a percentage) is one of the legal rates or zero.
    pub fn is_known(&self, rate: Decimal) -> bool {
        rate.is_zero() || [self.standard, self.intermediate, self.reduced].contains(&rate)
    }
}

/// Every parameter of the fiscal computation for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub fiscal_year: i32,
    pub vat: VatRates,
    pub social_contributions: SocialContributionRates,
    pub income_tax: IncomeTaxRates,
    pub professional_expenses: Vec<ForfeitTier>,
}

/// Most recent fiscal year with a built-in table
pub const LATEST_BUILTIN_YEAR: i32 = 2024;

impl RateTable {
    /// Built-in table for a fiscal year, if one ships with the binary.
    pub fn builtin(year: i32) -> Result<RateTable, RateTableError> {
        match year {
            2024 => Ok(Self::fiscal_2024()),
            _ => Err(RateTableError::UnknownYear(year)),
        }
    }

    /// Read and validate a table from JSON.
    pub fn load<R: Read>(reader: R) -> Result<RateTable, RateTableError> {
        let table: RateTable =
            serde_json::from_reader(reader).map_err(|e| RateTableError::Json(e.to_string()))?;
        table.validate()?;
        log::debug!("loaded rate table for fiscal year {}", table.fiscal_year);
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), RateTableError> {
        validate_ceilings(
            "social contribution tiers",
            self.social_contributions
                .tiers
                .iter()
                .map(|b| (b.ceiling, [b.rate, Decimal::ZERO])),
        )?;
        validate_ceilings(
            "income tax brackets",
            self.income_tax
                .brackets
                .iter()
                .map(|b| (b.ceiling, [b.rate, Decimal::ZERO])),
        )?;
        validate_ceilings(
            "professional expense tiers",
            self.professional_expenses
                .iter()
                .map(|t| (t.ceiling(), t.rates())),
        )
    }

    fn fiscal_2024() -> RateTable {
        RateTable {
            fiscal_year: 2024,
            vat: VatRates {
                standard: dec!(21),
                intermediate: dec!(12),
                reduced: dec!(6),
            },
            social_contributions: SocialContributionRates {
                tiers: vec![
                    Bracket::new(dec!(60427.75), dec!(0.2068)),
                    Bracket::new(dec!(89051.37), dec!(0.1416)),
                    Bracket::unbounded(dec!(0.1207)),
                ],
                principal: StatusThresholds {
                    exemption_threshold: None,
                    minimum_contribution: dec!(785.34),
                },
                secondary: StatusThresholds {
                    exemption_threshold: Some(dec!(1621.72)),
                    minimum_contribution: dec!(82.05),
                },
                active_retiree: StatusThresholds {
                    exemption_threshold: Some(dec!(3107.24)),
                    minimum_contribution: dec!(116.46),
                },
                new_activity_years: 3,
                new_activity_factor: dec!(0.7),
            },
            income_tax: IncomeTaxRates {
                brackets: vec![
                    Bracket::new(dec!(13870), dec!(0.25)),
                    Bracket::new(dec!(24480), dec!(0.40)),
                    Bracket::new(dec!(42370), dec!(0.45)),
                    Bracket::unbounded(dec!(0.50)),
                ],
                per_dependent_reduction: dec!(1650),
                marital_quotient_rate: dec!(0.30),
                marital_quotient_cap: dec!(11450),
            },
            professional_expenses: vec![
                ForfeitTier::Proportional {
                    ceiling: Some(dec!(16400)),
                    rate: dec!(0.3),
                },
                ForfeitTier::Fixed {
                    ceiling: Some(dec!(32200)),
                    base: dec!(4920),
                    marginal_rate: dec!(0.11),
                },
                ForfeitTier::Fixed {
                    ceiling: None,
                    base: dec!(6700),
                    marginal_rate: dec!(0),
                },
            ],
        }
    }
}

fn validate_ceilings<I>(table: &'static str, entries: I) -> Result<(), RateTableError>
where
    I: IntoIterator<Item = (Option<Decimal>, [Decimal; 2])>,
{
    let entries: Vec<_> = entries.into_iter().collect();
    let last = entries.len().checked_sub(1).ok_or(RateTableError::Empty { table })?;
    let mut previous: Option<Decimal> = None;

    for (index, (ceiling, rates)) in entries.iter().enumerate() {
        if rates.iter().any(|r| *r < Decimal::ZERO) {
            return Err(RateTableError::NegativeRate { table, index });
        }
        match ceiling {
            None if index != last => return Err(RateTableError::UnboundedNotLast { table, index }),
            None => {}
            Some(_) if index == last => return Err(RateTableError::BoundedLast { table }),
            Some(c) => {
                if previous.is_some_and(|p| *c <= p) || *c <= Decimal::ZERO {
                    return Err(RateTableError::Unsorted { table, index });
                }
                previous = Some(*c);
            }
        }
    }
    Ok(())
}
