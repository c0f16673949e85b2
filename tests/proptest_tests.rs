// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests use property-based testing to verify that names, values,
//! locations and profile expansion handle arbitrary inputs correctly.

use layercfg::domain::config_value::split_list;
use layercfg::domain::profiles::expand_profiles;
use layercfg::domain::{ConfigDataLocation, ConfigValue, PropertyName};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

fn element() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}(-[a-z0-9]{1,4})?"
}

fn valid_name() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(element(), 1..4),
        prop::option::of(0u32..100),
    )
        .prop_map(|(elements, index)| {
            let mut name = elements.join(".");
            if let Some(index) = index {
                name.push_str(&format!("[{}]", index));
            }
            name
        })
}

// Test that a parsed name renders back to its original form
proptest! {
    #[test]
    fn test_property_name_round_trip(s in valid_name()) {
        let name = PropertyName::parse(&s).unwrap();
        prop_assert_eq!(name.to_string(), s.clone());
        prop_assert!(PropertyName::is_valid(&s));
    }
}

// Test that removing dashes keeps names equal and their hashes consistent
proptest! {
    #[test]
    fn test_property_name_hash_consistent_with_eq(s in valid_name()) {
        let dashed = PropertyName::parse(&s).unwrap();
        let plain = PropertyName::parse(&s.replace('-', "")).unwrap();
        prop_assert_eq!(&dashed, &plain);
        prop_assert_eq!(dashed.hash_code(), plain.hash_code());
    }
}

// Test that adapting a parsed name with '.' gives an equal name
proptest! {
    #[test]
    fn test_adapt_matches_parse(s in valid_name()) {
        let parsed = PropertyName::parse(&s).unwrap();
        let adapted = PropertyName::adapt(&s, '.');
        prop_assert_eq!(parsed, adapted);
    }
}

// Test that numeric indices order numerically rather than lexically
proptest! {
    #[test]
    fn test_numeric_index_ordering(a in 0u64..100_000, b in 0u64..100_000) {
        let left = PropertyName::parse(&format!("list[{}]", a)).unwrap();
        let right = PropertyName::parse(&format!("list[{}]", b)).unwrap();
        prop_assert_eq!(left.cmp(&right), a.cmp(&b));
    }
}

// Test that a parent is always an ancestor and precedes its children
proptest! {
    #[test]
    fn test_parent_is_ancestor(s in valid_name()) {
        let name = PropertyName::parse(&s).unwrap();
        let parent = name.parent();
        prop_assert!(parent.is_ancestor_of(&name));
        prop_assert!(!name.is_ancestor_of(&name));
        prop_assert!(parent < name);
    }
}

// Test that arbitrary strings never panic the parser
proptest! {
    #[test]
    fn test_parse_any_string(s in "\\PC*") {
        let parsed = PropertyName::parse(&s);
        prop_assert_eq!(parsed.is_ok(), PropertyName::is_valid(&s));
        let _ = PropertyName::adapt(&s, '.');
    }
}

// Test that ConfigValue can be created from any string
proptest! {
    #[test]
    fn test_config_value_from_any_string(s in "\\PC*") {
        let value = ConfigValue::from(s.clone());
        prop_assert_eq!(value.as_str(), s.as_str());
        let back: String = value.into();
        prop_assert_eq!(back, s);
    }
}

// Test that list splitting trims entries and never yields empty ones
proptest! {
    #[test]
    fn test_split_list_trims(items in prop::collection::vec("[a-z0-9]{1,8}", 0..6), pad in " {0,3}") {
        let joined = items
            .iter()
            .map(|item| format!("{}{}{}", pad, item, pad))
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(split_list(&joined, ','), items);
    }
}

// Test that every split location keeps its own optional prefix
proptest! {
    #[test]
    fn test_location_split(parts in prop::collection::vec(("[a-z]{1,8}", any::<bool>()), 1..5)) {
        let raw = parts
            .iter()
            .map(|(path, optional)| format!("{}file:./{}/", if *optional { "optional:" } else { "" }, path))
            .collect::<Vec<_>>()
            .join(";");
        let location = ConfigDataLocation::parse(&raw).unwrap();
        let split = location.split_on(';');
        prop_assert_eq!(split.len(), parts.len());
        for (location, (path, optional)) in split.iter().zip(parts.iter()) {
            prop_assert_eq!(location.is_optional(), *optional);
            prop_assert_eq!(location.value(), format!("file:./{}/", path));
        }
    }
}

// Test that group expansion terminates on cycles and never repeats a profile
proptest! {
    #[test]
    fn test_expand_profiles_handles_cycles(
        edges in prop::collection::vec(("[a-e]", "[a-e]"), 0..12),
        start in prop::collection::vec("[a-e]", 0..4),
    ) {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (from, to) in edges {
            groups.entry(from).or_default().push(to);
        }
        let expanded = expand_profiles(&groups, &start);

        let unique: HashSet<&String> = expanded.iter().collect();
        prop_assert_eq!(unique.len(), expanded.len());
        for profile in &start {
            prop_assert!(expanded.contains(profile));
        }
        if let Some(first) = start.first() {
            prop_assert_eq!(&expanded[0], first);
        }
        for profile in &expanded {
            if let Some(members) = groups.get(profile) {
                for member in members {
                    prop_assert!(expanded.contains(member));
                }
            }
        }
    }
}
