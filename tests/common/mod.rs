#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, sync::Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use subscription_core::{
    domain::{BillingCycle, Category, Subscription},
    images::ImageLibrary,
    storage::{JsonStore, SnapshotStore},
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh application directory that outlives the test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// File-backed store and image library rooted in an isolated directory.
pub fn setup_test_env() -> (Arc<dyn SnapshotStore>, ImageLibrary, PathBuf) {
    let base = temp_base();
    let store: Arc<dyn SnapshotStore> = Arc::new(JsonStore::in_dir(Some(base.clone())));
    let images = ImageLibrary::new(base.join("images"));
    (store, images, base)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("valid instant")
}

pub fn subscription(
    name: &str,
    cost: f64,
    cycle: BillingCycle,
    start: NaiveDate,
    category: Category,
) -> Subscription {
    Subscription::new(name, cost, cycle, start).with_category(category)
}
