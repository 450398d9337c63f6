//! Property-based tests for version gating.
//!
//! - `is_at_least` and `is_below` are complements when both sides coerce
//! - both are false when either side cannot be coerced
//! - a coercible dependency is always consistent with itself

use capkit_workspaces::Dependencies;
use indexmap::IndexMap;
use proptest::prelude::*;

fn version_strategy() -> impl Strategy<Value = String> {
    (0u64..50, 0u64..50, 0u64..50, prop_oneof![Just(""), Just("^"), Just("~"), Just(">=")])
        .prop_map(|(major, minor, patch, range)| format!("{range}{major}.{minor}.{patch}"))
}

fn uncoercible_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("latest".to_string()),
        Just("*".to_string()),
        Just("workspace:*".to_string()),
        Just("next".to_string()),
        Just("git+https://github.com/acme/pkg.git#v1.2.3".to_string()),
        Just("https://example.com/pkg-1.0.0.tgz".to_string()),
    ]
}

fn single(name: &str, specifier: &str) -> Dependencies {
    let mut entries = IndexMap::new();
    entries.insert(name.to_string(), specifier.to_string());
    Dependencies::merge(entries, IndexMap::new())
}

proptest! {
    #[test]
    fn at_least_is_complement_of_below(installed in version_strategy(), wanted in version_strategy()) {
        let deps = single("pkg", &installed);
        prop_assert_eq!(deps.is_at_least("pkg", &wanted), !deps.is_below("pkg", &wanted));
    }

    #[test]
    fn uncoercible_installed_never_gates(installed in uncoercible_strategy(), wanted in version_strategy()) {
        let deps = single("pkg", &installed);
        prop_assert!(!deps.is_at_least("pkg", &wanted));
        prop_assert!(!deps.is_below("pkg", &wanted));
        prop_assert!(!deps.is_at_most("pkg", &wanted));
    }

    #[test]
    fn uncoercible_wanted_never_gates(installed in version_strategy(), wanted in uncoercible_strategy()) {
        let deps = single("pkg", &installed);
        prop_assert!(!deps.is_at_least("pkg", &wanted));
        prop_assert!(!deps.is_below("pkg", &wanted));
    }

    #[test]
    fn dependency_is_consistent_with_itself(installed in version_strategy()) {
        let deps = single("pkg", &installed);
        prop_assert!(deps.versions_consistent("pkg", "pkg"));
    }

    #[test]
    fn at_most_includes_equality(installed in version_strategy()) {
        let deps = single("pkg", &installed);
        let bare = installed.trim_start_matches(['^', '~', '>', '=']);
        prop_assert!(deps.is_at_most("pkg", bare));
        prop_assert!(deps.is_at_least("pkg", bare));
    }
}
