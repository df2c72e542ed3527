use super::brackets::evaluate_brackets;
use crate::core::profile::{IndependentStatus, UserInfo};
use crate::core::rates::SocialContributionRates;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which minimum contribution applies once a status is above its exemption.
///
/// Only principal tiers exist, so every status is tiered on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StatusTablePolicy {
    /// Floor every status at the principal minimum
    #[default]
    PrincipalTable,
    /// Floor each status at its own minimum
    StatusMinimum,
}

/// Yearly social contribution due on `gross_revenue`.
pub fn social_contributions(
    gross_revenue: Decimal,
    profile: &UserInfo,
    rates: &SocialContributionRates,
    reference_year: i32,
    policy: StatusTablePolicy,
) -> Decimal {
    let thresholds = rates.thresholds(profile.status);

    if profile.status != IndependentStatus::Principal {
        if let Some(exemption) = thresholds.exemption_threshold {
            if gross_revenue <= exemption {
                log::debug!(
                    "{} revenue {} within exemption {}",
                    profile.status,
                    gross_revenue,
                    exemption
                );
                return Decimal::ZERO;
            }
        }
    }

    let mut contribution = evaluate_brackets(gross_revenue, &rates.tiers);

    if profile.years_of_activity(reference_year) <= rates.new_activity_years {
        contribution *= rates.new_activity_factor;
    }

    let minimum = match policy {
        StatusTablePolicy::PrincipalTable => rates.principal.minimum_contribution,
        StatusTablePolicy::StatusMinimum => thresholds.minimum_contribution,
    };
    contribution.max(minimum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::RateTable;
    use rust_decimal_macros::dec;

    fn rates() -> SocialContributionRates {
        RateTable::builtin(2024).unwrap().social_contributions
    }

    fn profile(status: IndependentStatus, start: i32) -> UserInfo {
        UserInfo {
            status,
            ..UserInfo::starting_in(start)
        }
    }

    #[test]
    fn principal_new_activity_reduction() {
        // 50,000 * 20.68% = 10,340, reduced by 30%
        let c = social_contributions(
            dec!(50000),
            &profile(IndependentStatus::Principal, 2024),
            &rates(),
            2024,
            StatusTablePolicy::PrincipalTable,
        );
        assert_eq!(c, dec!(7238));
    }

    #[test]
    fn reduction_applies_through_third_year() {
        let rates = rates();
        let p = profile(IndependentStatus::Principal, 2021);
        let c = social_contributions(dec!(50000), &p, &rates, 2024, StatusTablePolicy::PrincipalTable);
        assert_eq!(c, dec!(7238));

        let p = profile(IndependentStatus::Principal, 2020);
        let c = social_contributions(dec!(50000), &p, &rates, 2024, StatusTablePolicy::PrincipalTable);
        assert_eq!(c, dec!(10340));
    }

    #[test]
    fn principal_minimum_applies() {
        let c = social_contributions(
            dec!(1000),
            &profile(IndependentStatus::Principal, 2024),
            &rates(),
            2024,
            StatusTablePolicy::PrincipalTable,
        );
        assert_eq!(c, dec!(785.34));
    }

    #[test]
    fn principal_owes_minimum_on_zero_revenue() {
        let c = social_contributions(
            dec!(0),
            &profile(IndependentStatus::Principal, 2010),
            &rates(),
            2024,
            StatusTablePolicy::PrincipalTable,
        );
        assert_eq!(c, dec!(785.34));
    }

    #[test]
    fn secondary_exempt_below_threshold() {
        let c = social_contributions(
            dec!(1000),
            &profile(IndependentStatus::Secondary, 2024),
            &rates(),
            2024,
            StatusTablePolicy::PrincipalTable,
        );
        assert_eq!(c, Decimal::ZERO);
    }

    #[test]
    fn exemption_threshold_is_inclusive() {
        let rates = rates();
        let p = profile(IndependentStatus::ActiveRetiree, 2010);
        let at = social_contributions(dec!(3107.24), &p, &rates, 2024, StatusTablePolicy::PrincipalTable);
        assert_eq!(at, Decimal::ZERO);
    }

    #[test]
    fn secondary_above_threshold_uses_principal_table_and_minimum() {
        // 2,000 * 20.68% = 413.60, floored at the principal minimum
        let c = social_contributions(
            dec!(2000),
            &profile(IndependentStatus::Secondary, 2010),
            &rates(),
            2024,
            StatusTablePolicy::PrincipalTable,
        );
        assert_eq!(c, dec!(785.34));
    }

    #[test]
    fn status_minimum_policy_uses_own_minimum() {
        let c = social_contributions(
            dec!(2000),
            &profile(IndependentStatus::Secondary, 2010),
            &rates(),
            2024,
            StatusTablePolicy::StatusMinimum,
        );
        assert_eq!(c, dec!(413.60));

        // 4,000 * 20.68% * 0.7 = 579.04, above the retiree minimum
        let c = social_contributions(
            dec!(4000),
            &profile(IndependentStatus::ActiveRetiree, 2024),
            &rates(),
            2024,
            StatusTablePolicy::StatusMinimum,
        );
        assert_eq!(c, dec!(4000) * dec!(0.2068) * dec!(0.7));
    }

    #[test]
    fn status_minimum_policy_floors_small_contributions() {
        let mut rates = rates();
        rates.secondary.exemption_threshold = Some(dec!(100));
        let c = social_contributions(
            dec!(200),
            &profile(IndependentStatus::Secondary, 2010),
            &rates,
            2024,
            StatusTablePolicy::StatusMinimum,
        );
        assert_eq!(c, dec!(82.05));
    }

    #[test]
    fn high_revenue_crosses_tiers() {
        let c = social_contributions(
            dec!(200000),
            &profile(IndependentStatus::Principal, 2000),
            &rates(),
            2024,
            StatusTablePolicy::PrincipalTable,
        );
        let expected = dec!(60427.75) * dec!(0.2068)
            + dec!(89051.37) * dec!(0.1416)
            + (dec!(200000) - dec!(60427.75) - dec!(89051.37)) * dec!(0.1207);
        assert_eq!(c, expected);
    }
}
