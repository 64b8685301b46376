use plan_core::test_fixtures::{catalog_of, code, inst, module};
use plan_core::{prerequisite_cycles, selected_dependents, SelectionSet};

#[test]
fn test_no_selection_no_dependents() {
    let catalog = catalog_of(vec![module("A", 5, &[]), module("B", 5, &["A"])]);
    assert!(selected_dependents(&catalog, &code("A"), &SelectionSet::new()).is_empty());
}

#[test]
fn test_direct_dependent() {
    let catalog = catalog_of(vec![module("A", 5, &[]), module("B", 5, &["A"])]);
    let mut set = SelectionSet::new();
    set.insert(1, inst(&catalog, "A", 1).id);
    set.insert(2, inst(&catalog, "B", 2).id);
    assert_eq!(
        selected_dependents(&catalog, &code("A"), &set),
        vec![inst(&catalog, "B", 2).id]
    );
}

#[test]
fn test_dependents_of_unknown_code() {
    let catalog = catalog_of(vec![module("B", 5, &["GHOST"])]);
    let mut set = SelectionSet::new();
    set.insert(2, inst(&catalog, "B", 2).id);
    assert_eq!(
        selected_dependents(&catalog, &code("GHOST"), &set),
        vec![inst(&catalog, "B", 2).id]
    );
}

#[test]
fn test_three_cycle_terminates() {
    let catalog = catalog_of(vec![
        module("A", 5, &["C"]),
        module("B", 5, &["A"]),
        module("C", 5, &["B"]),
    ]);
    let mut set = SelectionSet::new();
    set.insert(1, inst(&catalog, "A", 1).id);
    set.insert(2, inst(&catalog, "B", 2).id);
    set.insert(3, inst(&catalog, "C", 3).id);

    let dependents = selected_dependents(&catalog, &code("A"), &set);
    assert_eq!(
        dependents,
        vec![inst(&catalog, "B", 2).id, inst(&catalog, "C", 3).id]
    );
}

#[test]
fn test_cycle_detection_over_catalog_defs() {
    let catalog = catalog_of(vec![
        module("A", 5, &["C"]),
        module("B", 5, &["A"]),
        module("C", 5, &["B"]),
        module("D", 5, &["A"]),
    ]);
    let cycles = prerequisite_cycles(catalog.defs());
    assert_eq!(cycles, vec![vec![code("A"), code("C"), code("B")]]);
}
