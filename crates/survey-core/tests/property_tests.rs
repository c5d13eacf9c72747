//! # Property-Based Tests
//!
//! Catalog and validator invariants checked with proptest.

use proptest::prelude::*;
use survey_core::{Catalog, Step, is_valid_format, is_valid_system, validate_system_number};

fn catalog() -> Catalog {
    Catalog::builtin()
}

fn pair() -> impl Strategy<Value = (String, String)> {
    let pairs: Vec<(String, String)> = catalog()
        .pairs()
        .map(|(d, t)| (d.name.clone(), t.name.clone()))
        .collect();
    prop::sample::select(pairs)
}

// =============================================================================
// CATALOG INVARIANTS
// =============================================================================

#[test]
fn every_pair_has_users_and_systems() {
    let catalog = catalog();
    for (department, tool) in catalog.pairs() {
        assert!(!tool.users.is_empty(), "{} has no users", tool.name);
        assert!(
            catalog
                .allowed_systems(&department.name, &tool.name)
                .is_some_and(|s| !s.is_empty()),
            "{} has no systems",
            tool.name
        );
    }
}

#[test]
fn department_order_is_stable() {
    let binding = catalog();
    let names: Vec<&str> = binding.department_names().collect();
    assert_eq!(names, vec!["Finance", "CSD", "TSG"]);
}

#[test]
fn progress_is_monotonic() {
    let mut last = 0;
    for step in Step::ALL.into_iter().take(5) {
        let percent = step.progress_percent().expect("progress");
        assert!(percent > last);
        last = percent;
    }
    assert_eq!(last, 100);
    assert_eq!(Step::Confirmation.progress_percent(), None);
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Identifiers that are not on the allow-list never validate.
    #[test]
    fn unlisted_ids_are_rejected((department, tool) in pair(), id in "[A-Za-z0-9 ]{0,12}") {
        let catalog = catalog();
        let listed = catalog
            .allowed_systems(&department, &tool)
            .is_some_and(|s| s.contains(&id));
        prop_assert_eq!(is_valid_system(&catalog, &department, &tool, &id), listed);
    }

    /// Allow-list matching is case-sensitive.
    #[test]
    fn lowercased_ids_are_rejected((department, tool) in pair()) {
        let catalog = catalog();
        let systems = catalog
            .allowed_systems(&department, &tool)
            .cloned()
            .unwrap_or_default();
        for id in &systems {
            let lowered = id.to_lowercase();
            if lowered != *id && !systems.contains(&lowered) {
                prop_assert!(!is_valid_system(&catalog, &department, &tool, &lowered));
            }
        }
    }

    /// Every listed identifier of at least five characters passes both checks.
    #[test]
    fn listed_ids_validate((department, tool) in pair()) {
        let catalog = catalog();
        let systems = catalog
            .allowed_systems(&department, &tool)
            .cloned()
            .unwrap_or_default();
        for id in systems.iter().filter(|id| is_valid_format(id)) {
            prop_assert!(validate_system_number(&catalog, &department, &tool, id).is_ok());
        }
    }

    /// The format rule depends only on the character count.
    #[test]
    fn format_rule_counts_chars(id in "\\PC{0,10}") {
        prop_assert_eq!(is_valid_format(&id), id.chars().count() >= 5);
    }
}
