use crate::core::profile::{ExpenseMode, UserInfo};
use crate::core::rates::ForfeitTier;
use rust_decimal::Decimal;

/// Professional expenses for the year: the declared amount in `Actual` mode,
/// otherwise the forfeit from the tier table.
pub fn professional_expenses(gross_revenue: Decimal, profile: &UserInfo, tiers: &[ForfeitTier]) -> Decimal {
    match profile.expense_mode {
        ExpenseMode::Actual => profile.actual_expenses,
        ExpenseMode::Flat => forfeit(gross_revenue, tiers),
    }
}

/// Flat professional-expense forfeit on `gross_revenue`.
pub fn forfeit(gross_revenue: Decimal, tiers: &[ForfeitTier]) -> Decimal {
    if gross_revenue <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut floor = Decimal::ZERO;
    for tier in tiers {
        let within = tier.ceiling().is_none_or(|c| gross_revenue <= c);
        if within {
            return match *tier {
                ForfeitTier::Proportional { rate, .. } => gross_revenue * rate,
                ForfeitTier::Fixed {
                    base, marginal_rate, ..
                } => base + (gross_revenue - floor) * marginal_rate,
            };
        }
        if let Some(ceiling) = tier.ceiling() {
            floor = ceiling;
        }
    }
    Decimal::ZERO
}
