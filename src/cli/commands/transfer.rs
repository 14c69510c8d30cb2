use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::domain::{FilterCriteria, SortField, SortOrder};
use crate::transfer::{
    export_bundle_to_path, import_bundle, validate_bundle, CsvExporter, Exporter, ImportMode,
    JsonExporter,
};

use super::required;

const EXPORT_USAGE: &str = "export <csv|json|bundle> <path>";
const IMPORT_USAGE: &str = "import <bundle> [--merge|--replace]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Export subscriptions to CSV, JSON, or a ZIP bundle",
            EXPORT_USAGE,
            cmd_export,
        ),
        CommandEntry::new(
            "import",
            "Import a ZIP bundle (merge by default)",
            IMPORT_USAGE,
            cmd_import,
        ),
        CommandEntry::new(
            "validate",
            "Check that a file is a usable bundle",
            "validate <bundle>",
            cmd_validate,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let format = required(args, 0, EXPORT_USAGE)?.to_lowercase();
    let path = Path::new(required(args, 1, EXPORT_USAGE)?);

    if format == "bundle" {
        let snapshot = context.store.load()?;
        let images = export_bundle_to_path(&snapshot, &context.images, path)?;
        output::success(format!(
            "Exported {} subscription(s) and {} image(s) to {}.",
            snapshot.subscriptions.len(),
            images.len(),
            path.display()
        ));
        return Ok(());
    }

    let exporter: Box<dyn Exporter> = match format.as_str() {
        "csv" => Box::new(CsvExporter),
        "json" => Box::new(JsonExporter),
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown export format `{other}`; usage: {EXPORT_USAGE}"
            )))
        }
    };
    let visible = FilterCriteria {
        show_paused: true,
        ..FilterCriteria::default()
    };
    let subs = context
        .subscriptions
        .list(&visible, SortField::Name, SortOrder::Asc)?;
    let mut writer = BufWriter::new(File::create(path)?);
    exporter.export(&subs, &mut writer)?;
    writer.flush()?;
    output::success(format!(
        "Exported {} subscription(s) as {} to {}.",
        subs.len(),
        exporter.extension(),
        path.display()
    ));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = Path::new(required(args, 0, IMPORT_USAGE)?);
    let mode = match args.get(1) {
        Some(raw) => raw.parse::<ImportMode>()?,
        None => ImportMode::default(),
    };

    validate_bundle(path)?;
    if mode == ImportMode::Replace
        && !context.confirm("Replace all existing subscriptions with the bundle?")?
    {
        output::info("Operation cancelled.");
        return Ok(());
    }

    let summary = import_bundle(
        path,
        mode,
        context.store.clone(),
        &context.images,
        context.now(),
    )?;
    output::success(format!(
        "Imported {} subscription(s), {} payment(s), {} image(s) ({}).",
        summary.subscriptions, summary.payments, summary.images, summary.mode
    ));
    if summary.generation.payments_created > 0 {
        output::info(format!(
            "Recorded {} new payment(s).",
            summary.generation.payments_created
        ));
    }
    Ok(())
}

fn cmd_validate(_context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = Path::new(required(args, 0, "validate <bundle>")?);
    validate_bundle(path)?;
    output::success(format!("{} is a valid bundle.", path.display()));
    Ok(())
}
