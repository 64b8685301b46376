use super::*;
use crate::test_fixtures::{
    base_config, catalog_of, catalog_with, code, inst, module, module_in, requirement,
    scenario_catalog,
};

mod progress;

// --- Shared test helpers ------------------------------------------------

/// Adds `code_str` in `semester`, panicking if the engine refuses.
fn add(catalog: &Catalog, selection: &SelectionSet, code_str: &str, semester: Semester) -> SelectionSet {
    let instance = inst(catalog, code_str, semester);
    select(
        catalog,
        &instance,
        semester,
        selection,
        SelectMode::Add,
        &base_config(),
    )
    .unwrap_or_else(|err| panic!("select {code_str}@{semester} failed: {err}"))
    .selection
}

/// Builds a selection from `(code, semester)` pairs via `add`.
fn selection_of(catalog: &Catalog, picks: &[(&str, Semester)]) -> SelectionSet {
    picks.iter().fold(SelectionSet::new(), |set, (code_str, semester)| {
        add(catalog, &set, code_str, *semester)
    })
}

fn selected_codes(catalog: &Catalog, selection: &SelectionSet) -> Vec<(Semester, String)> {
    catalog
        .selected(selection)
        .map(|(semester, inst, _)| (semester, inst.code.0.clone()))
        .collect()
}
