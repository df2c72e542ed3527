pub mod annual;
pub mod brackets;
pub mod expenses;
pub mod income;
pub mod social;
pub mod totals;
pub mod vat;

pub use annual::{annual_summary, AnnualSummary};
pub use social::StatusTablePolicy;
pub use totals::{compute_totals, Breakdown, CalculationContext, Calculator, Totals};
