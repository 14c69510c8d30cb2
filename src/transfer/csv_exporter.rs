use std::io::Write;

use crate::core::errors::Result;
use crate::domain::Subscription;

use super::Exporter;

pub const CSV_HEADER: [&str; 7] = [
    "Name",
    "Cost",
    "Billing Cycle",
    "Next Payment",
    "Start Date",
    "Category",
    "Notes",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row per subscription, cost to two decimals, plain dates.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(&self, subscriptions: &[Subscription], writer: &mut dyn Write) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CSV_HEADER)?;
        for sub in subscriptions {
            csv.write_record([
                sub.name.clone(),
                format!("{:.2}", sub.cost),
                sub.billing_cycle.as_str().to_string(),
                sub.next_payment.format(DATE_FORMAT).to_string(),
                sub.start_date.format(DATE_FORMAT).to_string(),
                sub.category.as_str().to_string(),
                sub.notes.clone(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}
