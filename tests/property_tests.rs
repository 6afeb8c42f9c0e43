//! Property-based tests for the metadata schema
//!
//! The invariant under test: any valid experiment record survives a
//! save-then-load round trip with every field intact.

use std::collections::BTreeMap;

use amnesis::experiment::Experiment;
use proptest::prelude::*;
use serde_json::Value;

// ============================================================================
// Strategies
// ============================================================================

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        (-1_000_000i64..1_000_000).prop_map(Value::from),
        (-1e9f64..1e9).prop_map(Value::from),
        "[a-zA-Z0-9_ .-]{0,24}".prop_map(Value::from),
    ]
}

fn arb_map() -> impl Strategy<Value = BTreeMap<String, Value>> {
    proptest::collection::btree_map("[a-z_][a-z0-9_]{0,15}", arb_value(), 0..8)
}

fn arb_experiment() -> impl Strategy<Value = Experiment> {
    (
        "[a-zA-Z0-9_-]{1,24}",
        "[a-zA-Z0-9_-]{1,24}",
        "[0-9a-f]{32}",
        "[ -~]{0,40}",
        0.0f64..1e6,
        arb_map(),
        arb_map(),
    )
        .prop_map(|(model, name, uuid, git, time, hyperparameters, metrics)| {
            Experiment::builder(model, name, uuid)
                .git(git)
                .date("2024-01-01T00:00:00.000000Z")
                .time(time)
                .hyperparameters(hyperparameters)
                .metrics(metrics)
                .build()
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: save followed by load yields a record equal in all fields
    #[test]
    fn prop_metadata_round_trip(experiment in arb_experiment()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");

        experiment.save(&path).unwrap();
        let loaded = Experiment::load(&path).unwrap();

        prop_assert_eq!(loaded, experiment);
    }

    /// Property: the JSON on disk always carries the full fixed schema
    #[test]
    fn prop_metadata_schema_fields_present(experiment in arb_experiment()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        experiment.save(&path).unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for field in ["git", "model_name", "name", "uuid", "date", "time", "hyperparameters", "metrics"] {
            prop_assert!(raw.get(field).is_some(), "missing field {}", field);
        }
    }
}
