use std::sync::Arc;
use std::time::Duration;

use grammarlab::GlabError;
use grammarlab::persistence::{
    LoadOutcome, MigrationStep, PersistenceManager, SaveOptions, StoredRecord, now_millis,
};
use grammarlab::storage::{KeyValueStore, SqliteStore};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::fixture::TestFixture;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Counter {
    count: u32,
    label: String,
}

#[test]
fn records_survive_reopening_the_database() {
    let fixture = TestFixture::new("records_survive_reopening_the_database");
    let counter = Counter {
        count: 3,
        label: "three".to_string(),
    };

    fixture
        .manager()
        .save("counter", &counter, &SaveOptions::default())
        .unwrap();

    let reopened = fixture.manager();
    assert_eq!(reopened.load::<Counter>("counter", Some("1.0.0")), Some(counter));
}

#[test]
fn debounced_writes_land_when_manager_drops() {
    let fixture = TestFixture::new("debounced_writes_land_when_manager_drops");
    {
        let manager = fixture.manager();
        let options = SaveOptions::default().with_save_delay(Duration::from_secs(30));
        for count in 0..5 {
            let state = Counter {
                count,
                label: "draft".to_string(),
            };
            manager.save_with_delay("draft", &state, &options).unwrap();
        }
        assert!(manager.raw("draft").unwrap().is_none());
    }

    let loaded: Counter = fixture.manager().load("draft", None).unwrap();
    assert_eq!(loaded.count, 4);
}

#[test]
fn quota_pressure_evicts_expired_records() {
    let fixture = TestFixture::new("quota_pressure_evicts_expired_records");
    let store = SqliteStore::open(&fixture.db_path).unwrap().with_quota(Some(600));
    let manager = PersistenceManager::new(Arc::new(store));

    let filler = "x".repeat(200);
    manager
        .save(
            "stale",
            &json!({"filler": filler}),
            &SaveOptions::default().with_ttl(Duration::from_millis(20)),
        )
        .unwrap();
    std::thread::sleep(Duration::from_millis(40));

    manager
        .save("fresh", &json!({"filler": filler}), &SaveOptions::default())
        .unwrap();
    assert!(manager.raw("stale").unwrap().is_none());
    assert!(manager.raw("fresh").unwrap().is_some());
}

#[test]
fn quota_error_surfaces_when_nothing_can_be_evicted() {
    let fixture = TestFixture::new("quota_error_surfaces_when_nothing_can_be_evicted");
    let store = SqliteStore::open(&fixture.db_path).unwrap().with_quota(Some(100));
    let manager = PersistenceManager::new(Arc::new(store));

    let err = manager
        .save("big", &json!({"filler": "y".repeat(500)}), &SaveOptions::default())
        .unwrap_err();
    assert!(matches!(err, GlabError::QuotaExceeded { .. }));
}

fn stored_bytes(store: &SqliteStore) -> u64 {
    store
        .keys()
        .unwrap()
        .iter()
        .map(|key| (key.len() + store.get(key).unwrap().unwrap_or_default().len()) as u64)
        .sum()
}

#[test]
fn nearly_full_store_recovers_after_reopen() {
    let fixture = TestFixture::new("nearly_full_store_recovers_after_reopen");
    {
        let store = SqliteStore::open(&fixture.db_path).unwrap();
        let stale = StoredRecord::with_expiry(json!({"filler": "s".repeat(200)}), "1.0.0", Some(1), 0);
        store.set("stale", &serde_json::to_string(&stale).unwrap()).unwrap();
        let live = StoredRecord::new(json!({"filler": "l".repeat(100)}), "1.0.0", None, now_millis());
        store.set("live", &serde_json::to_string(&live).unwrap()).unwrap();
    }

    let store = SqliteStore::open(&fixture.db_path).unwrap();
    let quota = stored_bytes(&store) + 20;
    let manager = PersistenceManager::new(Arc::new(store.with_quota(Some(quota))));

    assert!(manager.is_available());
    manager
        .save("fresh", &json!({"filler": "f".repeat(150)}), &SaveOptions::default())
        .unwrap();
    assert!(manager.raw("stale").unwrap().is_none());
    assert!(manager.load_value("live", None).is_some());
    assert!(manager.load_value("fresh", None).is_some());
}

#[test]
fn full_store_without_expired_records_can_still_be_cleared() {
    let fixture = TestFixture::new("full_store_without_expired_records_can_still_be_cleared");
    {
        let store = SqliteStore::open(&fixture.db_path).unwrap();
        let live = StoredRecord::new(json!("l".repeat(200)), "1.0.0", None, now_millis());
        store.set("live", &serde_json::to_string(&live).unwrap()).unwrap();
    }

    let store = SqliteStore::open(&fixture.db_path).unwrap();
    let quota = stored_bytes(&store) + 10;
    let manager = PersistenceManager::new(Arc::new(store.with_quota(Some(quota))));

    assert!(manager.is_available());
    let err = manager
        .save("more", &json!("m".repeat(50)), &SaveOptions::default())
        .unwrap_err();
    assert!(matches!(err, GlabError::QuotaExceeded { .. }));

    manager.remove("live").unwrap();
    manager
        .save("more", &json!("m".repeat(50)), &SaveOptions::default())
        .unwrap();
}

#[test]
fn migration_chain_upgrades_on_disk_record() {
    let fixture = TestFixture::new("migration_chain_upgrades_on_disk_record");
    fixture
        .manager()
        .save("settings", &json!({"theme": "dark"}), &SaveOptions::new("1.0.0"))
        .unwrap();

    let manager = fixture.manager();
    manager.register_migration(
        "settings",
        MigrationStep::map("1.0.0", "1.1.0", |mut data| {
            data["fontSize"] = json!(14);
            data
        }),
    );
    manager.register_migration(
        "settings",
        MigrationStep::map("1.1.0", "2.0.0", |data| json!({"ui": data})),
    );

    match manager.load_outcome("settings", Some("2.0.0")) {
        LoadOutcome::Loaded {
            data,
            version,
            migrated_from,
        } => {
            assert_eq!(data, json!({"ui": {"theme": "dark", "fontSize": 14}}));
            assert_eq!(version, "2.0.0");
            assert_eq!(migrated_from.as_deref(), Some("1.0.0"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    // The upgraded record was written back.
    let again = fixture.manager();
    assert_eq!(
        again.load_value("settings", Some("2.0.0")),
        Some(json!({"ui": {"theme": "dark", "fontSize": 14}}))
    );
}

#[test]
fn tampered_record_is_discarded() {
    let fixture = TestFixture::new("tampered_record_is_discarded");
    fixture
        .manager()
        .save("k", &json!({"count": 1}), &SaveOptions::default())
        .unwrap();

    let store = SqliteStore::open(&fixture.db_path).unwrap();
    let raw = store.get("k").unwrap().unwrap();
    store
        .set("k", &raw.replace("\"count\":1", "\"count\":2"))
        .unwrap();
    drop(store);

    let manager = fixture.manager();
    assert_eq!(manager.load_outcome("k", None), LoadOutcome::ChecksumMismatch);
    assert!(manager.raw("k").unwrap().is_none());
}

#[test]
fn unparsable_value_is_discarded() {
    let fixture = TestFixture::new("unparsable_value_is_discarded");
    let store = SqliteStore::open(&fixture.db_path).unwrap();
    store.set("junk", "{not json").unwrap();
    drop(store);

    let manager = fixture.manager();
    assert!(matches!(
        manager.load_outcome("junk", None),
        LoadOutcome::Corrupt { .. }
    ));
    assert!(manager.raw("junk").unwrap().is_none());
}

#[test]
fn export_import_round_trip_between_databases() {
    let source = TestFixture::new("export_import_source");
    let target = TestFixture::new("export_import_target");

    let manager = source.manager();
    manager.save("a", &json!([1, 2, 3]), &SaveOptions::default()).unwrap();
    manager.save("b", &json!({"nested": {"ok": true}}), &SaveOptions::new("2.0.0")).unwrap();
    let blob = manager.export_data(None).unwrap();

    let imported = target.manager().import_data(&blob).unwrap();
    assert_eq!(imported, 2);

    let manager = target.manager();
    assert_eq!(manager.load_value("a", None), Some(json!([1, 2, 3])));
    assert_eq!(
        manager.load_value("b", Some("2.0.0")),
        Some(json!({"nested": {"ok": true}}))
    );
}

#[test]
fn stats_report_sizes_from_disk() {
    let fixture = TestFixture::new("stats_report_sizes_from_disk");
    let manager = fixture.manager();
    manager.save("one", &json!("a"), &SaveOptions::default()).unwrap();
    manager.save("two", &json!("a".repeat(100)), &SaveOptions::default()).unwrap();

    let stats = manager.storage_stats();
    assert_eq!(stats.total_keys, 2);
    assert_eq!(stats.items[0].key, "two");
    assert!(stats.items.iter().all(|item| item.timestamp.is_some()));
    let raw_total: u64 = ["one", "two"]
        .iter()
        .map(|key| manager.raw(key).unwrap().unwrap().len() as u64)
        .sum();
    assert_eq!(stats.used_bytes, raw_total);
}
