pub mod period;
pub mod profile;
pub mod rates;
pub mod transaction;
pub mod warnings;

// Flat public surface for domain types and functions.
pub use period::{read_period_json, Balances, InputError, ParsedPeriod, PeriodInput};
pub use profile::{
    ExpenseMode, IndependentStatus, MaritalStatus, ProfileError, UserInfo, MIN_START_YEAR,
};
pub use rates::{Bracket, ForfeitTier, RateTable, RateTableError};
pub use transaction::{
    parse_transactions, read_transactions_csv, CsvField, Direction, Transaction,
    TransactionEdit, TransactionError, TransactionInput, TransactionRecord, MAX_AMOUNT,
};
pub use warnings::Warning;
