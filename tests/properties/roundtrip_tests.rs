use std::sync::Arc;

use grammarlab::persistence::{PersistenceManager, SaveOptions, checksum, strip_internal_fields};
use grammarlab::state::overlay;
use grammarlab::storage::MemoryStore;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        ".{0,24}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Draft {
    productions: Vec<String>,
    input_string: String,
}

fn arb_draft() -> impl Strategy<Value = Draft> {
    (
        prop::collection::vec("[A-Z]->[a-zA-Z|@+*()]{1,12}", 0..8),
        "[a-z+*()]{0,16}",
    )
        .prop_map(|(productions, input_string)| Draft {
            productions,
            input_string,
        })
}

fn manager() -> PersistenceManager {
    PersistenceManager::new(Arc::new(MemoryStore::new()))
}

proptest! {
    #[test]
    fn save_then_load_returns_equal_value(data in arb_json(), version in r"[0-9]\.[0-9]\.[0-9]") {
        let manager = manager();
        manager.save("k", &data, &SaveOptions::new(version.clone())).unwrap();
        prop_assert_eq!(manager.load_value("k", Some(&version)), Some(data));
    }

    #[test]
    fn typed_drafts_round_trip(draft in arb_draft()) {
        let manager = manager();
        manager.save("draft", &draft, &SaveOptions::default()).unwrap();
        prop_assert_eq!(manager.load::<Draft>("draft", None), Some(draft));
    }

    #[test]
    fn checksum_ignores_key_order(entries in prop::collection::btree_map("[a-z]{1,6}", any::<i32>(), 1..10)) {
        let forward: Map<String, Value> = entries.iter().map(|(k, v)| (k.clone(), Value::from(*v))).collect();
        let reversed: Map<String, Value> = entries.iter().rev().map(|(k, v)| (k.clone(), Value::from(*v))).collect();
        prop_assert_eq!(checksum(&Value::Object(forward)), checksum(&Value::Object(reversed)));
    }

    #[test]
    fn checksum_detects_changed_values(data in arb_json(), extra in "[a-z]{1,8}") {
        let changed = Value::Array(vec![data.clone(), Value::String(extra)]);
        prop_assert_ne!(checksum(&data), checksum(&changed));
    }

    #[test]
    fn stripping_internal_fields_is_idempotent(data in arb_json()) {
        let once = strip_internal_fields(data);
        let twice = strip_internal_fields(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn overlay_with_own_snapshot_is_identity(draft in arb_draft()) {
        let snapshot = serde_json::to_value(&draft).unwrap();
        let mut target = Draft { productions: Vec::new(), input_string: String::new() };
        prop_assert!(overlay(&mut target, &snapshot));
        prop_assert_eq!(target, draft);
    }
}
