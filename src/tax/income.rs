use super::brackets::evaluate_brackets;
use crate::core::profile::UserInfo;
use crate::core::rates::IncomeTaxRates;
use rust_decimal::Decimal;

/// Portion of the taxable base notionally attributed to a lower-earning
/// spouse, or zero when the quotient does not apply.
pub fn marital_quotient(taxable_base: Decimal, profile: &UserInfo, rates: &IncomeTaxRates) -> Decimal {
    if profile.is_married() && profile.spouse_income < taxable_base / Decimal::TWO {
        (taxable_base * rates.marital_quotient_rate).min(rates.marital_quotient_cap)
    } else {
        Decimal::ZERO
    }
}

/// Income tax on `taxable_base` after the marital quotient and dependent
/// reductions. Reductions never produce a refund.
pub fn income_tax(taxable_base: Decimal, profile: &UserInfo, rates: &IncomeTaxRates) -> Decimal {
    let quotient = marital_quotient(taxable_base, profile, rates);
    let remaining = taxable_base - quotient;

    let tax = evaluate_brackets(remaining, &rates.brackets);
    let reduction = Decimal::from(profile.dependents) * rates.per_dependent_reduction;
    log::debug!(
        "income tax: base {} quotient {} bracket tax {} reduction {}",
        taxable_base,
        quotient,
        tax,
        reduction
    );

    (tax - reduction).max(Decimal::ZERO)
}
