use crate::core::transaction::Transaction;
use rust_decimal::Decimal;

/// VAT collected on inflows minus VAT paid on outflows.
///
/// A negative balance is a refund position.
pub fn net_vat(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .map(|t| t.vat() * t.direction().sign())
        .sum()
}

/// Sum of pre-VAT amounts over inflows; outflows never count as revenue.
pub fn gross_revenue(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.is_inflow())
        .map(|t| t.net())
        .sum()
}
