//! Property-based coverage of the recorder and aggregation invariants
//!
//! Core properties exercised:
//! 1. Identifier resolution always terminates, cycles included
//! 2. Resolution is idempotent on a resolved identifier
//! 3. Plugin metrics equal the sum of recorded durations
//! 4. Invoke counters count every attempt, no-ops included
//! 5. Module-info assembly is deterministic and identifier-sorted
//! 6. Entry specification classification never panics

use mirador::context::InspectContext;
use mirador::entries::EntrySpec;
use mirador::metrics::plugin_metrics;
use mirador::modules::modules_info;
use mirador::options::InspectOptions;
use mirador::record::HookRecord;
use mirador::recorder::{BuildVariant, Recorder};
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[a-d]{1,2}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_resolution_terminates_even_with_cycles(
        edges in prop::collection::vec((identifier(), identifier()), 0..24),
        probe in identifier(),
    ) {
        let ctx = InspectContext::new(InspectOptions::new("/project"));
        let recorder = ctx.recorder(BuildVariant::Client);
        for (i, (from, to)) in edges.iter().enumerate() {
            let at = i as u64;
            recorder.record_resolve(from, HookRecord::ok("p", at, at + 1, to.clone()));
        }

        // dense short identifiers make cycles likely; this must still return
        let resolved = ctx.resolve_id(&probe, BuildVariant::Client);
        prop_assert!(!resolved.is_empty());
    }

    #[test]
    fn prop_resolution_idempotent_on_acyclic_chains(
        hops in prop::collection::vec("[a-z]{3,6}", 2..8),
    ) {
        // chain hops[0] -> hops[1] -> ... -> last, deduplicated so it is acyclic
        let mut hops = hops;
        hops.sort();
        hops.dedup();
        prop_assume!(hops.len() >= 2);

        let ctx = InspectContext::new(InspectOptions::new("/project"));
        let recorder = ctx.recorder(BuildVariant::Client);
        for window in hops.windows(2) {
            recorder.record_resolve(&window[0], HookRecord::ok("p", 0, 1, window[1].clone()));
        }

        let resolved = ctx.resolve_id(&hops[0], BuildVariant::Client);
        prop_assert_eq!(&resolved, hops.last().unwrap());
        // resolving the resolved identifier is a fixed point
        prop_assert_eq!(ctx.resolve_id(&resolved, BuildVariant::Client), resolved.clone());
    }

    #[test]
    fn prop_metric_totals_equal_sum_of_durations(
        records in prop::collection::vec(
            ("[a-c]", identifier(), 0u64..1_000),
            0..32,
        ),
    ) {
        let recorder = Recorder::new();
        let mut expected_total = 0u64;
        let mut expected_count = 0u64;
        for (plugin, id, duration) in &records {
            recorder.record_transform(
                id,
                HookRecord::ok(plugin.clone(), 0, *duration, "out"),
                "src",
            );
            expected_total += duration;
            expected_count += 1;
        }

        let metrics = plugin_metrics(&recorder, &[]);
        let total: u64 = metrics.iter().map(|m| m.transform.total_time).sum();
        let count: u64 = metrics.iter().map(|m| m.transform.invoke_count).sum();
        prop_assert_eq!(total, expected_total);
        prop_assert_eq!(count, expected_count);
    }

    #[test]
    fn prop_invoke_counter_counts_every_attempt(
        produced in prop::collection::vec(any::<bool>(), 0..32),
    ) {
        let recorder = Recorder::new();
        for (i, produced) in produced.iter().enumerate() {
            if *produced {
                recorder.record_transform("a", HookRecord::ok("p", i as u64, i as u64, "out"), "src");
            } else {
                recorder.count_transform("a");
            }
        }
        prop_assert_eq!(recorder.transform_count("a"), produced.len() as u64);
    }

    #[test]
    fn prop_module_info_sorted_and_deterministic(
        ids in prop::collection::vec("[a-z]{1,6}", 0..16),
    ) {
        let recorder = Recorder::new();
        for (i, id) in ids.iter().enumerate() {
            recorder.record_transform(id, HookRecord::ok("p", i as u64, i as u64 + 1, "out"), "src");
        }

        let first = modules_info(&recorder, None, None);
        let second = modules_info(&recorder, None, None);

        let first_ids: Vec<_> = first.iter().map(|m| m.id.clone()).collect();
        let mut sorted = first_ids.clone();
        sorted.sort();
        prop_assert_eq!(&first_ids, &sorted);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn prop_entry_spec_classification_never_panics(
        value in prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<i64>().prop_map(serde_json::Value::from),
            "[a-z./]{0,12}".prop_map(serde_json::Value::from),
            prop::collection::vec("[a-z.]{1,8}", 0..4)
                .prop_map(|paths| serde_json::json!(paths)),
        ],
    ) {
        match EntrySpec::from_json(Some(&value)) {
            Ok(spec) => {
                // classification succeeded; derivation is total
                let _ = spec.entries();
            }
            Err(_) => {
                // unrecognized shapes downgrade to "no entries to report"
            }
        }
    }
}

#[test]
fn prop_runner_smoke() {
    // keeps the harness honest if all proptest cases are filtered out
    let recorder = Recorder::new();
    recorder.record_transform("a", HookRecord::ok("p", 0, 5, "out"), "src");
    assert_eq!(plugin_metrics(&recorder, &[])[0].transform.total_time, 5);
}
