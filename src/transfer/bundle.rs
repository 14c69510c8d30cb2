//! ZIP bundles holding the whole snapshot plus the user's own images.

use std::{
    collections::BTreeSet,
    fmt,
    fs::{self, File},
    io::{Read, Seek, Write},
    path::Path,
    str::FromStr,
    sync::Arc,
};

use chrono::{DateTime, Utc};
use zip::{result::ZipError, write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::core::errors::{Result, SubscriptionError};
use crate::core::services::{GenerationSummary, PaymentService};
use crate::domain::Snapshot;
use crate::images::{file_name_only, is_default_image, ImageLibrary};
use crate::storage::SnapshotStore;

pub const BUNDLE_DATA_ENTRY: &str = "subscriptions.json";
const IMAGES_PREFIX: &str = "images/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Overwrite the stored snapshot with the bundle's.
    Replace,
    /// Append the bundle's subscriptions and payments as they are.
    #[default]
    Merge,
}

impl FromStr for ImportMode {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches("--").to_ascii_lowercase().as_str() {
            "replace" => Ok(ImportMode::Replace),
            "merge" => Ok(ImportMode::Merge),
            other => Err(SubscriptionError::InvalidInput(format!(
                "unknown import mode `{other}` (expected replace or merge)"
            ))),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Replace => f.write_str("replace"),
            ImportMode::Merge => f.write_str("merge"),
        }
    }
}

/// What an import brought in.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub mode: ImportMode,
    pub subscriptions: usize,
    pub payments: usize,
    pub images: usize,
    pub generation: GenerationSummary,
}

/// Contents of a bundle after its images were extracted.
#[derive(Debug, Clone)]
pub struct BundleContents {
    pub snapshot: Snapshot,
    pub images: Vec<String>,
}

/// Writes `snapshot` and every referenced non-default image that exists in
/// `images`. Returns the image names that were packed.
pub fn export_bundle<W: Write + Seek>(
    snapshot: &Snapshot,
    images: &ImageLibrary,
    writer: W,
) -> Result<Vec<String>> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(BUNDLE_DATA_ENTRY, options)
        .map_err(storage_failure)?;
    let json = serde_json::to_string_pretty(snapshot)?;
    zip.write_all(json.as_bytes())?;

    let referenced: BTreeSet<&str> = snapshot
        .subscriptions
        .iter()
        .filter(|sub| sub.has_image() && !is_default_image(&sub.image))
        .map(|sub| sub.image.as_str())
        .collect();

    let mut packed = Vec::new();
    for filename in referenced {
        let Some(path) = images.path_for(filename).filter(|path| path.is_file()) else {
            tracing::warn!(image = filename, "referenced image missing, skipped from bundle");
            continue;
        };
        let Some(name) = file_name_only(filename) else {
            continue;
        };
        let data = fs::read(&path)?;
        zip.start_file(format!("{IMAGES_PREFIX}{name}"), options)
            .map_err(storage_failure)?;
        zip.write_all(&data)?;
        packed.push(name.to_string());
    }

    zip.finish().map_err(storage_failure)?;
    tracing::info!(
        subscriptions = snapshot.subscriptions.len(),
        images = packed.len(),
        "bundle exported"
    );
    Ok(packed)
}

/// Writes the bundle to `path`.
pub fn export_bundle_to_path(
    snapshot: &Snapshot,
    images: &ImageLibrary,
    path: &Path,
) -> Result<Vec<String>> {
    let file = File::create(path)?;
    export_bundle(snapshot, images, file)
}

/// Checks that `path` is a readable archive with a data entry, without
/// extracting anything.
pub fn validate_bundle(path: &Path) -> Result<()> {
    let mut archive = open_archive(path)?;
    let found = archive.by_name(BUNDLE_DATA_ENTRY).map(|_| ());
    found.map_err(missing_data_entry)
}

/// Parses the bundle's snapshot, then extracts its images into `images`.
///
/// Nothing is extracted when the data entry is missing or does not parse.
pub fn read_bundle(path: &Path, images: &ImageLibrary) -> Result<BundleContents> {
    let mut archive = open_archive(path)?;
    let snapshot = read_snapshot(&mut archive)?;

    let mut extracted = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| SubscriptionError::BundleInvalid(err.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let entry_name = entry.name().replace('\\', "/");
        let Some(relative) = entry_name.strip_prefix(IMAGES_PREFIX) else {
            continue;
        };
        let Some(name) = file_name_only(relative).map(str::to_string) else {
            continue;
        };
        let mut data = Vec::new();
        entry.read_to_end(&mut data).map_err(|err| {
            SubscriptionError::BundleInvalid(format!("failed to read image {name}: {err}"))
        })?;
        images.write_bytes(&name, &data)?;
        extracted.push(name);
    }

    Ok(BundleContents {
        snapshot,
        images: extracted,
    })
}

/// Reads the bundle at `path` into `store` and regenerates payments as of `now`.
pub fn import_bundle(
    path: &Path,
    mode: ImportMode,
    store: Arc<dyn SnapshotStore>,
    images: &ImageLibrary,
    now: DateTime<Utc>,
) -> Result<ImportSummary> {
    let contents = read_bundle(path, images)?;
    let incoming = contents.snapshot;
    let subscriptions = incoming.subscriptions.len();
    let payments = incoming.payments.len();

    let mut target = match mode {
        ImportMode::Replace => incoming,
        ImportMode::Merge => {
            let mut current = store.load()?;
            current.subscriptions.extend(incoming.subscriptions);
            current.payments.extend(incoming.payments);
            current
        }
    };
    store.save(&mut target)?;
    tracing::info!(%mode, subscriptions, payments, images = contents.images.len(), "bundle imported");

    let generation = PaymentService::new(store).generate_all(now)?;
    Ok(ImportSummary {
        mode,
        subscriptions,
        payments,
        images: contents.images.len(),
        generation,
    })
}

fn open_archive(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path).map_err(|err| {
        SubscriptionError::BundleInvalid(format!("cannot open {}: {err}", path.display()))
    })?;
    ZipArchive::new(file)
        .map_err(|err| SubscriptionError::BundleInvalid(format!("not a valid ZIP file: {err}")))
}

fn read_snapshot<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Snapshot> {
    let mut entry = archive
        .by_name(BUNDLE_DATA_ENTRY)
        .map_err(missing_data_entry)?;
    let mut data = String::new();
    entry.read_to_string(&mut data).map_err(|err| {
        SubscriptionError::BundleInvalid(format!("failed to read {BUNDLE_DATA_ENTRY}: {err}"))
    })?;
    serde_json::from_str(&data).map_err(|err| {
        SubscriptionError::BundleInvalid(format!("failed to parse {BUNDLE_DATA_ENTRY}: {err}"))
    })
}

fn missing_data_entry(err: ZipError) -> SubscriptionError {
    match err {
        ZipError::FileNotFound => SubscriptionError::BundleInvalid(format!(
            "bundle does not contain {BUNDLE_DATA_ENTRY}"
        )),
        other => SubscriptionError::BundleInvalid(other.to_string()),
    }
}

fn storage_failure(err: ZipError) -> SubscriptionError {
    SubscriptionError::StorageFailure(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn import_mode_accepts_flag_spelling() {
        assert_eq!("--replace".parse::<ImportMode>().unwrap(), ImportMode::Replace);
        assert_eq!("Merge".parse::<ImportMode>().unwrap(), ImportMode::Merge);
        assert!("append".parse::<ImportMode>().is_err());
        assert_eq!(ImportMode::default(), ImportMode::Merge);
    }

    #[test]
    fn exported_archive_has_data_entry_first() {
        let temp = tempfile::TempDir::new().unwrap();
        let images = ImageLibrary::new(temp.path());
        let mut buffer = Cursor::new(Vec::new());
        export_bundle(&Snapshot::default(), &images, &mut buffer).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.by_index(0).unwrap().name(), BUNDLE_DATA_ENTRY);
        let snapshot = read_snapshot(&mut archive).unwrap();
        assert!(snapshot.subscriptions.is_empty());
    }
}
