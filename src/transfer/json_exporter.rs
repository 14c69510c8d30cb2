use std::io::Write;

use crate::core::errors::Result;
use crate::domain::Subscription;

use super::Exporter;

/// Pretty-printed JSON array of subscriptions. Payments are not included.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export(&self, subscriptions: &[Subscription], writer: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, subscriptions)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
