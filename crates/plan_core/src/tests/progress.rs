use super::*;
use crate::test_fixtures::area;
use std::collections::BTreeMap;

#[test]
fn test_scenario_category_goes_out_of_bounds_above_max() {
    let catalog = scenario_catalog();
    let categories = vec![requirement("X", 5, 10)];

    let set = selection_of(&catalog, &[("A", 1)]);
    assert_eq!(
        aggregate_progress(&catalog, &set, &categories),
        BTreeMap::from([(area("X"), 5)])
    );
    let progress = category_progress(&catalog, &set, &categories);
    assert_eq!(progress[0].credits, 5);
    assert!(!progress[0].out_of_bounds(), "exact min is in bounds");

    let set = add(&catalog, &set, "B", 2);
    assert_eq!(
        aggregate_progress(&catalog, &set, &categories),
        BTreeMap::from([(area("X"), 11)])
    );
    assert!(category_progress(&catalog, &set, &categories)[0].out_of_bounds());
}

#[test]
fn test_untouched_categories_stay_at_zero() {
    let catalog = scenario_catalog();
    let categories = vec![requirement("X", 0, 30), requirement("Y", 10, 20)];
    let set = selection_of(&catalog, &[("A", 1)]);

    let totals = aggregate_progress(&catalog, &set, &categories);
    assert_eq!(totals[&area("Y")], 0);

    let progress = category_progress(&catalog, &set, &categories);
    assert_eq!(progress[1].category, area("Y"));
    assert!(progress[1].out_of_bounds(), "below min");
    assert_eq!(progress[1].remaining(), 10);
}

#[test]
fn test_module_counts_toward_every_declared_area() {
    let catalog = catalog_of(vec![
        module_in("M", 8, &[], &["Math", "CS"]),
        module_in("N", 4, &[], &["CS", "CS"]),
    ]);
    let set = selection_of(&catalog, &[("M", 1), ("N", 1)]);
    let totals = aggregate_progress(&catalog, &set, &[]);
    assert_eq!(
        totals,
        BTreeMap::from([(area("CS"), 12), (area("Math"), 8)])
    );
}

#[test]
fn test_removal_subtracts_exactly_the_module_credits() {
    let catalog = catalog_of(vec![
        module_in("M", 8, &[], &["Math", "CS"]),
        module_in("P", 3, &[], &["CS"]),
    ]);
    let categories = vec![requirement("Math", 0, 100), requirement("CS", 0, 100)];
    let set = selection_of(&catalog, &[("M", 1), ("P", 2)]);
    let before = aggregate_progress(&catalog, &set, &categories);

    let plan = request_deselect(&catalog, &inst(&catalog, "M", 1), &set);
    let after = aggregate_progress(&catalog, &apply_deselection(&plan, &set), &categories);

    assert_eq!(before[&area("Math")] - after[&area("Math")], 8);
    assert_eq!(before[&area("CS")] - after[&area("CS")], 8);
}

#[test]
fn test_boundaries_are_inclusive() {
    let at_max = CategoryProgress {
        category: area("X"),
        credits: 10,
        min_credits: 5,
        max_credits: 10,
    };
    assert!(!at_max.out_of_bounds());
    assert_eq!(at_max.remaining(), 0);
}

#[test]
fn test_total_ects_and_semester_loads() {
    let mut config = base_config();
    config.max_ects_per_semester = Some(10);
    let catalog = catalog_with(
        vec![module("A", 5, &[]), module("B", 6, &[]), module("C", 4, &[])],
        &config,
    );
    let set = selection_of(&catalog, &[("A", 1), ("B", 1), ("C", 2)]);

    assert_eq!(total_ects(&catalog, &set), 15);
    let loads = semester_loads(&catalog, &set, &config);
    assert_eq!(loads.len(), 6);
    assert_eq!(loads[0].ects, 11);
    assert_eq!(loads[0].module_count, 2);
    assert!(loads[0].overloaded);
    assert_eq!(loads[1].ects, 4);
    assert!(!loads[1].overloaded);
    assert_eq!(loads[5].ects, 0);
}

#[test]
fn test_no_cap_never_overloads() {
    let catalog = catalog_of(vec![module("BIG", 60, &[])]);
    let set = selection_of(&catalog, &[("BIG", 1)]);
    assert!(semester_loads(&catalog, &set, &base_config())
        .iter()
        .all(|load| !load.overloaded));
}

#[test]
fn test_huge_credit_values_saturate() {
    let catalog = catalog_of(vec![
        module_in("A", u32::MAX, &[], &["X"]),
        module_in("B", 1, &[], &["X"]),
    ]);
    let set = selection_of(&catalog, &[("A", 1), ("B", 1)]);

    assert_eq!(aggregate_progress(&catalog, &set, &[])[&area("X")], u32::MAX);
    assert_eq!(total_ects(&catalog, &set), u32::MAX);
    assert_eq!(semester_loads(&catalog, &set, &base_config())[0].ects, u32::MAX);
}
