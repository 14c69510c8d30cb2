mod common;

use std::fs;

use common::{date, setup_test_env, subscription, temp_base};
use regex::Regex;
use subscription_core::{
    core::{errors::SubscriptionError, services::SubscriptionService},
    domain::{BillingCycle, Category, Snapshot, FORMAT_VERSION},
    storage::{load_snapshot_from_path, JsonStore, SnapshotStore},
};

const LEGACY_SNAPSHOT: &str = r#"{
  "subscriptions": [
    {
      "id": "7f1c2a4e-0000-4000-8000-000000000001",
      "name": "Spotify",
      "cost": 9.99,
      "billing_cycle": "monthly",
      "next_payment": "2024-03-05T00:00:00Z",
      "start_date": "2023-03-05T00:00:00+02:00",
      "category": "streaming",
      "notes": "duo",
      "image": "default_streaming.png",
      "paused": false,
      "deleted": false,
      "deleted_at": "0001-01-01T00:00:00Z",
      "created_at": "2023-03-05T10:00:00Z",
      "updated_at": "2023-03-05T10:00:00Z"
    }
  ]
}"#;

#[test]
fn legacy_file_without_payments_loads() {
    let base = temp_base();
    let store = JsonStore::in_dir(Some(base));
    fs::write(store.path(), LEGACY_SNAPSHOT).unwrap();

    let snapshot = store.load().unwrap();
    assert!(snapshot.payments.is_empty());
    assert_eq!(snapshot.version, FORMAT_VERSION);

    let sub = &snapshot.subscriptions[0];
    assert_eq!(sub.category, Category::Streaming);
    assert_eq!(sub.start_date, date(2023, 3, 5));
    assert_eq!(sub.next_payment, date(2024, 3, 5));
    assert!(sub.deleted_at.is_none());
}

#[test]
fn unknown_category_falls_back_to_other() {
    let base = temp_base();
    let store = JsonStore::in_dir(Some(base));
    fs::write(
        store.path(),
        LEGACY_SNAPSHOT.replace("\"streaming\"", "\"podcasts\""),
    )
    .unwrap();
    assert_eq!(
        store.load().unwrap().subscriptions[0].category,
        Category::Other
    );
}

#[test]
fn saves_stamp_version_and_write_midnight_dates() {
    let (store, _images, _base) = setup_test_env();
    let mut snapshot = Snapshot {
        version: "0.1".into(),
        ..Snapshot::default()
    };
    snapshot.subscriptions.push(subscription(
        "News",
        4.5,
        BillingCycle::Yearly,
        date(2024, 2, 29),
        Category::News,
    ));
    store.save(&mut snapshot).unwrap();
    assert_eq!(snapshot.version, FORMAT_VERSION);

    let path = store.location().expect("file-backed store").to_path_buf();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"start_date\": \"2024-02-29T00:00:00Z\""));
    assert!(raw.contains("\"billing_cycle\": \"yearly\""));
    assert!(raw.contains("\"deleted_at\": null"));
    assert!(!path.with_extension("json.tmp").exists());

    let reloaded = load_snapshot_from_path(&path).unwrap();
    assert_eq!(reloaded.version, FORMAT_VERSION);
    assert_eq!(reloaded.subscriptions, snapshot.subscriptions);
}

#[test]
fn created_ids_are_uuids() {
    let (store, _images, _base) = setup_test_env();
    let service = SubscriptionService::new(store);
    let created = service
        .create(subscription(
            "Backup",
            2.0,
            BillingCycle::Monthly,
            date(2024, 1, 1),
            Category::Utilities,
        ))
        .unwrap();

    let uuid = Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .unwrap();
    assert!(uuid.is_match(&created.id), "id = {}", created.id);
    assert_eq!(created.created_at, created.updated_at);
}

#[test]
fn corrupt_file_is_a_storage_failure() {
    let base = temp_base();
    let store = JsonStore::in_dir(Some(base));
    fs::write(store.path(), "[1, 2").unwrap();
    assert!(matches!(
        store.load(),
        Err(SubscriptionError::StorageFailure(_))
    ));
}

#[test]
fn deletion_survives_a_reload() {
    let base = temp_base();
    let first = SubscriptionService::new(std::sync::Arc::new(JsonStore::in_dir(Some(
        base.clone(),
    ))));
    let created = first
        .create(subscription(
            "Old",
            1.0,
            BillingCycle::Monthly,
            date(2024, 1, 1),
            Category::Other,
        ))
        .unwrap();
    first.delete(&created.id).unwrap();

    let second = SubscriptionService::new(std::sync::Arc::new(JsonStore::in_dir(Some(base))));
    let reloaded = second.get(&created.id).unwrap();
    assert!(reloaded.deleted);
    assert!(reloaded.deleted_at.is_some());
}
