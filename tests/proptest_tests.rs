// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests use property-based testing to verify that key navigation,
//! merging and conversion hold up under arbitrary inputs.

use proptest::prelude::*;
use std::sync::Arc;
use treecfg::prelude::*;

mod common;

fn build(sources: Vec<(Arc<MapSource>, i32)>) -> Config {
    common::init_tracing();
    let mut builder = Config::builder();
    for (source, ordinal) in sources {
        builder = builder.with_source_ordinal(source, ordinal);
    }
    builder.build().unwrap()
}

// A dotted key made of plain lowercase segments, no placeholders involved.
fn key_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9]{0,7}", 1..4).prop_map(|segs| segs.join("."))
}

// Values that contain no placeholder syntax, so expansion is the identity.
fn plain_value_strategy() -> impl Strategy<Value = String> {
    "[^$\\{\\}]{0,32}"
}

proptest! {
    #[test]
    fn test_single_source_roundtrip(key in key_strategy(), value in plain_value_strategy()) {
        let config = build(vec![(
            Arc::new(MapSource::new("mem").with_entry(key.clone(), value.clone())),
            100,
        )]);
        prop_assert_eq!(config.get(&key).as_string().unwrap(), Some(value));
    }

    #[test]
    fn test_higher_ordinal_always_wins(
        key in key_strategy(),
        low in plain_value_strategy(),
        high in plain_value_strategy(),
        (lo, hi) in (0i32..1000, 1000i32..2000),
    ) {
        let config = build(vec![
            (Arc::new(MapSource::new("low").with_entry(key.clone(), low)), lo),
            (Arc::new(MapSource::new("high").with_entry(key.clone(), high.clone())), hi),
        ]);
        prop_assert_eq!(config.get(&key).as_string().unwrap(), Some(high));
    }

    #[test]
    fn test_navigation_segment_by_segment_matches_full_path(key in key_strategy(), value in plain_value_strategy()) {
        let config = build(vec![(
            Arc::new(MapSource::new("mem").with_entry(key.clone(), value)),
            100,
        )]);
        let mut node = config.clone();
        for segment in key.split('.') {
            node = node.get(segment);
        }
        prop_assert_eq!(
            node.as_string().unwrap(),
            config.get(&key).as_string().unwrap()
        );
    }

    #[test]
    fn test_key_join_and_parent_invert(key in key_strategy(), child in "[a-z][a-z0-9]{0,7}") {
        let base = Key::from(key.as_str());
        let joined = base.join(&child);
        prop_assert_eq!(joined.name(), child.as_str());
        prop_assert_eq!(joined.parent(), Some(base));
    }

    #[test]
    fn test_kebab_output_is_normalized(ident in "[a-zA-Z][a-zA-Z0-9_]{0,15}") {
        let kebab = Key::kebab(&ident);
        prop_assert!(!kebab.contains('_'));
        prop_assert!(!kebab.chars().any(|c| c.is_ascii_uppercase()));
        // Stable under repetition.
        prop_assert_eq!(Key::kebab(&kebab), kebab.clone());
    }

    #[test]
    fn test_i64_conversion_roundtrip(n in prop::num::i64::ANY) {
        let config = build(vec![(
            Arc::new(MapSource::new("mem").with_entry("n", n.to_string())),
            100,
        )]);
        prop_assert_eq!(config.get("n").as_type::<i64>().unwrap(), Some(n));
    }

    #[test]
    fn test_u64_conversion_roundtrip(n in prop::num::u64::ANY) {
        let config = build(vec![(
            Arc::new(MapSource::new("mem").with_entry("n", n.to_string())),
            100,
        )]);
        prop_assert_eq!(config.get("n").as_type::<u64>().unwrap(), Some(n));
    }

    #[test]
    fn test_non_numeric_fails_integer_conversion(s in "[a-zA-Z][a-zA-Z ]{0,16}") {
        let config = build(vec![(
            Arc::new(MapSource::new("mem").with_entry("n", s)),
            100,
        )]);
        prop_assert!(config.get("n").as_type::<i32>().unwrap_err().to_string().contains("n"));
    }

    #[test]
    fn test_properties_cover_every_inserted_key(
        entries in prop::collection::btree_map(key_strategy(), plain_value_strategy(), 1..8)
    ) {
        let mut source = MapSource::new("mem");
        for (k, v) in &entries {
            source = source.with_entry(k.clone(), v.clone());
        }
        let config = build(vec![(Arc::new(source), 100)]);
        let props = config.properties().unwrap();
        for (k, v) in &entries {
            prop_assert_eq!(props.get(k), Some(v));
        }
    }

    #[test]
    fn test_mutation_delivers_new_value(
        key in key_strategy(),
        before in plain_value_strategy(),
        after in plain_value_strategy(),
    ) {
        let source = Arc::new(MapSource::new("mem").with_entry(key.clone(), before));
        let config = Config::builder()
            .with_source(Arc::clone(&source) as Arc<dyn ConfigSource>)
            .build()
            .unwrap();

        let observed = Arc::new(std::sync::Mutex::new(None));
        let sink = Arc::clone(&observed);
        config.get(&key).on_change(move |node, _keys| {
            *sink.lock().unwrap() = node.as_string().unwrap();
            ChangeAction::Continue
        });

        source.set(key, after.clone());
        prop_assert_eq!(observed.lock().unwrap().clone(), Some(after));
    }
}
