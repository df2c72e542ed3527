//! Schema command - print expected input formats

use crate::core::period::PeriodInput;
use crate::core::transaction::TransactionRecord;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for a period file
    JsonSchema,
    /// CSV header row for a transactions file
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(PeriodInput);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => {
                println!("{}", TransactionRecord::csv_header().join(","));
            }
            SchemaFormat::CsvFields => print_csv_fields(),
        }
        Ok(())
    }
}

fn print_csv_fields() {
    println!("Transactions CSV Format");
    println!("=======================");
    println!();
    for field in TransactionRecord::csv_schema() {
        let req = if field.required { "required" } else { "optional" };
        println!("{:12} ({:8})  {}", field.name, req, field.description);
    }
    println!();
    println!("Rates are percentages: vat_rate 21 means 21% VAT included in gross");
}
