//! Property tests: replaying any script yields byte-identical traces.

use proptest::prelude::*;
use titlefit::{BadgeConfig, Variant};
use titlefit_harness::{GlyphMetrics, Scenario, ScenarioRunner, Step, init_test_logging};

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => Just(Step::Open),
        1 => Just(Step::Close),
        2 => prop::sample::select(vec!["Hi", "Hello", "*Big* news", ""]).prop_map(|t| Step::text([t])),
        3 => Just(Step::Measure),
        3 => (1u32..40).prop_map(|frames| Step::Tick { frames }),
    ]
}

fn variant_strategy() -> impl Strategy<Value = Variant> {
    prop::sample::select(Variant::ALL.to_vec())
}

proptest! {
    #[test]
    fn replay_is_byte_identical(
        variant in variant_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..30),
    ) {
        init_test_logging();
        let mut scenario = Scenario::new("replay", BadgeConfig::for_variant(variant), &["Start"]);
        scenario.steps = steps;
        scenario.steps.push(Step::Settle);

        let (a, _) = ScenarioRunner::new(GlyphMetrics::default()).run(&scenario).unwrap();
        let (b, _) = ScenarioRunner::new(GlyphMetrics::default()).run(&scenario).unwrap();
        prop_assert_eq!(a.len(), scenario.steps.len() + 1);
        prop_assert_eq!(a.to_jsonl().unwrap(), b.to_jsonl().unwrap());
        prop_assert_eq!(a.digest().unwrap(), b.digest().unwrap());
    }

    #[test]
    fn every_record_carries_the_schema_version(
        steps in prop::collection::vec(step_strategy(), 0..20),
    ) {
        let mut scenario = Scenario::new("schema", BadgeConfig::default(), &["Start"]);
        scenario.steps = steps;
        let (trace, _) = ScenarioRunner::new(GlyphMetrics::default()).run(&scenario).unwrap();
        for (i, line) in trace.to_jsonl().unwrap().lines().enumerate() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            prop_assert_eq!(value["schema_version"].as_u64(), Some(1));
            prop_assert_eq!(value["seq"].as_u64(), Some(i as u64));
        }
    }
}
