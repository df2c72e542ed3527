use crate::core::rates::Bracket;
use rust_decimal::Decimal;

/// Progressive levy on `amount`.
///
/// Each bracket's ceiling is the width of the slice it taxes, consumed in
/// order from the bottom. The unbounded bracket takes whatever remains.
/// Non-positive amounts owe nothing.
pub fn evaluate_brackets(amount: Decimal, brackets: &[Bracket]) -> Decimal {
    let mut total = Decimal::ZERO;
    let mut remaining = amount;

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }
        let slice = match bracket.ceiling {
            Some(ceiling) => remaining.min(ceiling),
            None => remaining,
        };
        total += slice * bracket.rate;
        remaining -= slice;
    }
    total
}
