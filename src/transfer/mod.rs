//! Moving subscription data in and out: flat exports and ZIP bundles.

pub mod bundle;
pub mod csv_exporter;
pub mod json_exporter;

use std::io::Write;

use crate::core::errors::Result;
use crate::domain::Subscription;

pub use bundle::{
    export_bundle, export_bundle_to_path, import_bundle, read_bundle, validate_bundle,
    BundleContents, ImportMode, ImportSummary,
};
pub use csv_exporter::CsvExporter;
pub use json_exporter::JsonExporter;

/// Writes a flat list of subscriptions in some format.
pub trait Exporter {
    fn export(&self, subscriptions: &[Subscription], writer: &mut dyn Write) -> Result<()>;

    /// Conventional file extension, without the dot.
    fn extension(&self) -> &'static str;
}
