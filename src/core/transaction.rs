use super::warnings::Warning;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use indeptax_derive::CsvSchema;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::io::Read;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("duplicate transaction id: {0}")]
    DuplicateTransactionId(String),
    #[error("gross amount must not be negative: {id} ({amount})")]
    NegativeAmount { id: String, amount: Decimal },
    #[error("gross amount exceeds {max}: {id} ({amount})")]
    AmountTooLarge { id: String, amount: Decimal, max: Decimal },
    #[error("vat rate must be between 0 and 100: {id} ({rate})")]
    VatRateOutOfRange { id: String, rate: Decimal },
    #[error("fee rate must be between 0 and 100: {id} ({rate})")]
    FeeRateOutOfRange { id: String, rate: Decimal },
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Column description produced by `#[derive(CsvSchema)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Direction of a cash movement relative to the business accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum Direction {
    /// Money received
    #[default]
    Inflow,
    /// Money paid
    Outflow,
}

impl Direction {
    pub fn sign(self) -> Decimal {
        match self {
            Direction::Inflow => Decimal::ONE,
            Direction::Outflow => Decimal::NEGATIVE_ONE,
        }
    }
}

pub const DEFAULT_VAT_RATE: Decimal = dec!(21);

/// Largest accepted amount, in euros. Sums of any realistic number of
/// amounts stay far inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// A validated cash movement.
///
/// `net` and `vat` are derived from `gross` and `vat_rate` and are only ever
/// recomputed, never set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", try_from = "TransactionInput")]
pub struct Transaction {
    id: String,
    #[schemars(with = "String")]
    date: NaiveDate,
    label: String,
    direction: Direction,
    #[schemars(with = "f64")]
    gross: Decimal,
    #[schemars(with = "f64")]
    vat_rate: Decimal,
    #[schemars(with = "f64")]
    fee_rate: Decimal,
    #[schemars(with = "f64")]
    net: Decimal,
    #[schemars(with = "f64")]
    vat: Decimal,
}

/// A single field change on a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEdit {
    Date(NaiveDate),
    Label(String),
    Direction(Direction),
    Gross(Decimal),
    VatRate(Decimal),
    FeeRate(Decimal),
}

impl Transaction {
    /// New inflow dated `date` with the default VAT rate and a fresh id.
    pub fn new(date: NaiveDate) -> Self {
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            label: String::new(),
            direction: Direction::default(),
            gross: Decimal::ZERO,
            vat_rate: DEFAULT_VAT_RATE,
            fee_rate: Decimal::ZERO,
            net: Decimal::ZERO,
            vat: Decimal::ZERO,
        }
    }

    /// New transaction dated today.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Apply edits in order, stopping at the first invalid one.
    pub fn with(mut self, edits: impl IntoIterator<Item = TransactionEdit>) -> Result<Self, TransactionError> {
        for edit in edits {
            self.apply(edit)?;
        }
        Ok(self)
    }

    pub fn apply(&mut self, edit: TransactionEdit) -> Result<(), TransactionError> {
        match edit {
            TransactionEdit::Date(date) => self.date = date,
            TransactionEdit::Label(label) => self.label = label,
            TransactionEdit::Direction(direction) => self.direction = direction,
            TransactionEdit::Gross(gross) => {
                check_gross(&self.id, gross)?;
                self.gross = gross;
                self.recompute();
            }
            TransactionEdit::VatRate(rate) => {
                check_vat_rate(&self.id, rate)?;
                self.vat_rate = rate;
                self.recompute();
            }
            TransactionEdit::FeeRate(rate) => {
                check_fee_rate(&self.id, rate)?;
                self.fee_rate = rate;
            }
        }
        Ok(())
    }

    fn recompute(&mut self) {
        let divisor = Decimal::ONE + self.vat_rate / Decimal::ONE_HUNDRED;
        self.net = self.gross / divisor;
        self.vat = self.gross - self.net;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_inflow(&self) -> bool {
        self.direction == Direction::Inflow
    }

    /// VAT-inclusive amount
    pub fn gross(&self) -> Decimal {
        self.gross
    }

    pub fn vat_rate(&self) -> Decimal {
        self.vat_rate
    }

    pub fn fee_rate(&self) -> Decimal {
        self.fee_rate
    }

    /// Pre-VAT amount
    pub fn net(&self) -> Decimal {
        self.net
    }

    pub fn vat(&self) -> Decimal {
        self.vat
    }

    /// Fee charged on the gross amount.
    pub fn fee(&self) -> Decimal {
        self.gross * self.fee_rate / Decimal::ONE_HUNDRED
    }
}

/// Transaction as supplied by callers. Derived fields are optional and only
/// checked against the recomputed values.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    /// Unique identifier; generated when absent
    #[serde(default)]
    pub id: Option<String>,
    /// Date (YYYY-MM-DD) or RFC3339 datetime
    #[serde(deserialize_with = "deserialize_date")]
    #[schemars(with = "String")]
    pub date: NaiveDate,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub direction: Direction,
    /// VAT-inclusive amount
    #[schemars(with = "f64")]
    pub gross: Decimal,
    /// VAT rate in percent (defaults to 21)
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub vat_rate: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub fee_rate: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub net: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub vat: Option<Decimal>,
}

impl TransactionInput {
    /// Validate and build the transaction, reporting supplied derived fields
    /// that disagree with the recomputed ones.
    pub fn parse(self) -> Result<(Transaction, Vec<Warning>), TransactionError> {
        let TransactionInput {
            id,
            date,
            label,
            direction,
            gross,
            vat_rate,
            fee_rate,
            net,
            vat,
        } = self;

        let mut tx = Transaction::new(date);
        if let Some(id) = id {
            tx = tx.with_id(id);
        }
        let tx = tx.with([
            TransactionEdit::Label(label),
            TransactionEdit::Direction(direction),
            TransactionEdit::VatRate(vat_rate.unwrap_or(DEFAULT_VAT_RATE)),
            TransactionEdit::FeeRate(fee_rate.unwrap_or(Decimal::ZERO)),
            TransactionEdit::Gross(gross),
        ])?;

        let mut warnings = Vec::new();
        for (field, supplied, computed) in [("net", net, tx.net), ("vat", vat, tx.vat)] {
            match supplied {
                Some(supplied) if supplied.round_dp(2) != computed.round_dp(2) => {
                    warnings.push(Warning::DerivedMismatch {
                        id: tx.id.clone(),
                        field: field.to_string(),
                        supplied,
                        computed: computed.round_dp(2),
                    });
                }
                _ => {}
            }
        }
        Ok((tx, warnings))
    }
}

impl TryFrom<TransactionInput> for Transaction {
    type Error = TransactionError;

    fn try_from(input: TransactionInput) -> Result<Self, Self::Error> {
        input.parse().map(|(tx, _)| tx)
    }
}

/// One row of a transactions CSV file
#[derive(Debug, Clone, Serialize, Deserialize, CsvSchema)]
pub struct TransactionRecord {
    /// Unique identifier (generated when empty)
    #[serde(default)]
    pub id: Option<String>,
    /// Date as YYYY-MM-DD
    pub date: String,
    /// Free-text description
    #[serde(default)]
    pub label: String,
    /// Inflow or Outflow
    pub direction: Direction,
    /// VAT-inclusive amount
    pub gross: Decimal,
    /// VAT rate in percent (default 21)
    #[serde(default)]
    pub vat_rate: Option<Decimal>,
    /// Fee in percent of the gross amount
    #[serde(default)]
    pub fee_rate: Option<Decimal>,
}

impl TryFrom<TransactionRecord> for TransactionInput {
    type Error = TransactionError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        Ok(TransactionInput {
            id: record.id.filter(|id| !id.trim().is_empty()),
            date: parse_date(&record.date)?,
            label: record.label,
            direction: record.direction,
            gross: record.gross,
            vat_rate: record.vat_rate,
            fee_rate: record.fee_rate,
            net: None,
            vat: None,
        })
    }
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        TransactionRecord {
            id: Some(tx.id.clone()),
            date: tx.date.format("%Y-%m-%d").to_string(),
            label: tx.label.clone(),
            direction: tx.direction,
            gross: tx.gross,
            vat_rate: Some(tx.vat_rate),
            fee_rate: Some(tx.fee_rate),
        }
    }
}

/// Read transaction rows from CSV
pub fn read_transactions_csv<R: Read>(reader: R) -> anyhow::Result<Vec<TransactionInput>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut inputs = Vec::new();
    for record in rdr.deserialize::<TransactionRecord>() {
        inputs.push(TransactionInput::try_from(record?)?);
    }
    log::info!("Read {} csv records", inputs.len());
    Ok(inputs)
}

/// Validate a batch of inputs, rejecting duplicate ids.
pub fn parse_transactions(
    inputs: Vec<TransactionInput>,
) -> Result<(Vec<Transaction>, Vec<Warning>), TransactionError> {
    let mut seen = HashSet::new();
    let mut transactions = Vec::with_capacity(inputs.len());
    let mut warnings = Vec::new();

    for input in inputs {
        let (tx, mut tx_warnings) = input.parse()?;
        if !seen.insert(tx.id.clone()) {
            return Err(TransactionError::DuplicateTransactionId(tx.id));
        }
        warnings.append(&mut tx_warnings);
        transactions.push(tx);
    }

    transactions.sort_by_key(|t| t.date);
    Ok((transactions, warnings))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, TransactionError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return Ok(date);
    }
    Err(TransactionError::InvalidDate(s.to_string()))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    parse_date(&s).map_err(|err| serde::de::Error::custom(err.to_string()))
}

fn check_gross(id: &str, amount: Decimal) -> Result<(), TransactionError> {
    if amount < Decimal::ZERO {
        return Err(TransactionError::NegativeAmount {
            id: id.to_string(),
            amount,
        });
    }
    if amount > MAX_AMOUNT {
        return Err(TransactionError::AmountTooLarge {
            id: id.to_string(),
            amount,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

fn check_vat_rate(id: &str, rate: Decimal) -> Result<(), TransactionError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(TransactionError::VatRateOutOfRange {
            id: id.to_string(),
            rate,
        });
    }
    Ok(())
}

fn check_fee_rate(id: &str, rate: Decimal) -> Result<(), TransactionError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(TransactionError::FeeRateOutOfRange {
            id: id.to_string(),
            rate,
        });
    }
    Ok(())
}
