//! Yearly persistence of periods and their totals

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::core::period::{Balances, InputError};
use crate::core::profile::UserInfo;
use crate::core::transaction::Transaction;
use crate::tax::totals::{Calculator, Totals};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store data error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything recorded for one period of a year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodData {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub balances: Balances,
    pub user_info: UserInfo,
    /// Totals as last computed; filled in on load when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,
}

/// Periods of a fiscal year keyed by label, e.g. `2024-03` or `March`.
///
/// Labels are free-form; ordering is lexical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearlyData(BTreeMap<String, PeriodData>);

impl YearlyData {
    pub fn insert(&mut self, label: impl Into<String>, period: PeriodData) -> Option<PeriodData> {
        self.0.insert(label.into(), period)
    }

    pub fn get(&self, label: &str) -> Option<&PeriodData> {
        self.0.get(label)
    }

    pub fn periods(&self) -> impl Iterator<Item = (&String, &PeriodData)> {
        self.0.iter()
    }

    /// The period with the greatest label
    pub fn latest(&self) -> Option<(&String, &PeriodData)> {
        self.0.last_key_value()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the profile and balances of every period. Transactions are
    /// validated as they are deserialized.
    pub fn validate(&self, reference_year: i32) -> Result<(), InputError> {
        for (label, period) in &self.0 {
            let checked = period
                .user_info
                .validate(reference_year)
                .map_err(InputError::from)
                .and_then(|()| period.balances.validate());
            if let Err(err) = checked {
                log::debug!("period {} rejected: {}", label, err);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Compute totals for periods stored without them.
    pub fn fill_totals(&mut self, calculator: &Calculator) {
        for (label, period) in self.0.iter_mut() {
            if period.totals.is_none() {
                log::debug!("filling totals for period {}", label);
                period.totals =
                    Some(calculator.compute_totals(&period.transactions, &period.user_info).rounded());
            }
        }
    }

    /// Apply `profile` to every period and recompute every total.
    pub fn apply_profile(&mut self, profile: &UserInfo, calculator: &Calculator) {
        for period in self.0.values_mut() {
            period.user_info = profile.clone();
            period.totals = Some(calculator.compute_totals(&period.transactions, profile).rounded());
        }
        log::info!("applied profile to {} periods", self.0.len());
    }
}

/// Whole-year persistence keyed by fiscal year
pub trait Store: Send + Sync {
    fn save(&self, year: i32, data: &YearlyData) -> Result<(), StoreError>;

    /// Load a year, empty when nothing was saved for it.
    fn load(&self, year: i32) -> Result<YearlyData, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::{IndependentStatus, ProfileError};
    use crate::core::rates::RateTable;
    use crate::core::transaction::TransactionEdit;
    use crate::tax::totals::CalculationContext;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    pub(super) fn sample() -> YearlyData {
        let tx = Transaction::new(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
            .with_id("inv-1")
            .with([
                TransactionEdit::Label("consulting".to_string()),
                TransactionEdit::Gross(dec!(1210)),
            ])
            .unwrap();
        let mut data = YearlyData::default();
        data.insert(
            "2024-03",
            PeriodData {
                transactions: vec![tx],
                balances: Balances {
                    business: dec!(2500),
                    savings: dec!(1000),
                    private: dec!(0),
                },
                user_info: UserInfo::starting_in(2024),
                totals: None,
            },
        );
        data
    }

    #[test]
    fn validate_checks_every_period() {
        let mut data = sample();
        assert_eq!(data.validate(2024), Ok(()));

        data.insert(
            "2024-04",
            PeriodData {
                user_info: UserInfo::starting_in(-40),
                ..sample().get("2024-03").unwrap().clone()
            },
        );
        assert!(matches!(
            data.validate(2024),
            Err(InputError::Profile(ProfileError::StartTooEarly { start: -40, .. }))
        ));
    }

    #[test]
    fn fill_totals_only_where_missing() {
        let rates = RateTable::builtin(2024).unwrap();
        let calc = Calculator::new(&rates, CalculationContext::new(2024));
        let mut data = sample();
        let kept = Totals::new(dec!(1), dec!(1), dec!(1));
        data.insert(
            "2024-04",
            PeriodData {
                totals: Some(kept),
                ..sample().get("2024-03").unwrap().clone()
            },
        );

        data.fill_totals(&calc);

        let filled = data.get("2024-03").unwrap().totals.unwrap();
        assert_eq!(filled.vat, dec!(210));
        assert_eq!(filled.social_contributions, dec!(785.34));
        assert_eq!(filled.income_tax, dec!(53.66));
        assert_eq!(data.get("2024-04").unwrap().totals, Some(kept));
    }

    #[test]
    fn apply_profile_recomputes_everything() {
        let rates = RateTable::builtin(2024).unwrap();
        let calc = Calculator::new(&rates, CalculationContext::new(2024));
        let mut data = sample();
        data.fill_totals(&calc);

        let profile = UserInfo {
            status: IndependentStatus::Secondary,
            ..UserInfo::starting_in(2020)
        };
        data.apply_profile(&profile, &calc);

        let period = data.get("2024-03").unwrap();
        assert_eq!(period.user_info, profile);
        assert_eq!(period.totals.unwrap().social_contributions, dec!(0));
        assert_eq!(period.totals.unwrap().income_tax, dec!(250));
    }

    #[test]
    fn latest_is_last_label() {
        let mut data = sample();
        data.insert("2024-01", sample().get("2024-03").unwrap().clone());
        assert_eq!(data.latest().map(|(l, _)| l.as_str()), Some("2024-03"));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn json_shape_is_a_label_map() {
        let json = serde_json::to_value(sample()).unwrap();
        let period = &json["2024-03"];
        assert_eq!(period["transactions"][0]["id"], "inv-1");
        assert_eq!(period["balances"]["business"], "2500");
        assert!(period.get("userInfo").is_some());
        assert!(period.get("totals").is_none());

        let back: YearlyData = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }
}
