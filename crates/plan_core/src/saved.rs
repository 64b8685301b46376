use crate::engine::prune_invalid;
use crate::{Catalog, ModuleCode, PlannerConfig, SavedPlan, Semester, SelectionSet};

/// Storage form of `selection`: codes per semester, sorted within a semester.
pub fn save_plan(catalog: &Catalog, selection: &SelectionSet) -> SavedPlan {
    let mut saved = SavedPlan {
        content_version: catalog.content_version().to_string(),
        ..SavedPlan::default()
    };
    for (semester, inst, _) in catalog.selected(selection) {
        saved
            .semesters
            .entry(semester)
            .or_default()
            .push(inst.code.clone());
    }
    for codes in saved.semesters.values_mut() {
        codes.sort();
    }
    saved
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredPlan {
    pub selection: SelectionSet,
    /// Saved entries with no instance of that code in that semester.
    pub unresolved: Vec<(Semester, ModuleCode)>,
    /// Resolved entries dropped to restore the selection invariants.
    pub pruned: Vec<ModuleCode>,
    /// The plan was saved against another catalog version.
    pub stale: bool,
}

/// Maps a saved plan onto `catalog`'s instances and repairs the result.
pub fn restore_plan(catalog: &Catalog, saved: &SavedPlan, config: &PlannerConfig) -> RestoredPlan {
    let mut resolved = SelectionSet::new();
    let mut unresolved = Vec::new();
    for (&semester, codes) in &saved.semesters {
        for code in codes {
            match catalog.instance_at(code, semester) {
                Some(inst) => {
                    resolved.insert(semester, inst.id);
                }
                None => unresolved.push((semester, code.clone())),
            }
        }
    }

    let (selection, removed) = prune_invalid(catalog, &resolved, config);
    let pruned = removed
        .iter()
        .filter_map(|id| catalog.instance(id))
        .map(|inst| inst.code.clone())
        .collect();

    RestoredPlan {
        selection,
        unresolved,
        pruned,
        stale: saved.content_version != catalog.content_version(),
    }
}
