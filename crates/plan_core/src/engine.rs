//! Selection rules: prerequisite gating, same-code conflicts, dependent
//! cascade. Every function here is pure; the caller owns the selection set
//! and swaps in whatever these return.

use ahash::AHashSet;

use crate::graph::selected_dependents;
use crate::{
    Catalog, ConflictRule, DeselectionPlan, InstanceId, ModuleCode, ModuleDef, ModuleInstance,
    PlannerConfig, PrerequisiteRule, SelectMode, SelectOutcome, Semester, SelectionError,
    SelectionSet, SelectionStatus,
};

/// Prerequisite codes of `def` not satisfied for placement in `target`.
/// Codes with no definition in the catalog are never satisfied.
pub fn missing_prerequisites(
    catalog: &Catalog,
    def: &ModuleDef,
    target: Semester,
    selection: &SelectionSet,
    rule: PrerequisiteRule,
) -> Vec<ModuleCode> {
    def.prerequisite_codes
        .iter()
        .filter(|code| {
            !catalog
                .selected_semester_of(code, selection)
                .is_some_and(|placed| rule.satisfied_by(placed, target))
        })
        .cloned()
        .collect()
}

/// Validates a select request. On success returns the same-code instance
/// the request displaces, if any.
fn check_select(
    catalog: &Catalog,
    instance: &ModuleInstance,
    target: Semester,
    selection: &SelectionSet,
    mode: SelectMode,
    config: &PlannerConfig,
) -> Result<Option<(InstanceId, Semester)>, SelectionError> {
    let known = catalog
        .instance(&instance.id)
        .ok_or(SelectionError::UnknownInstance(instance.id))?;
    let def = catalog
        .def(&known.code)
        .ok_or(SelectionError::UnknownInstance(instance.id))?;

    if known.semester != target {
        return Err(SelectionError::NotOffered {
            code: known.code.clone(),
            semester: target,
        });
    }

    let displaced = catalog
        .instances_of(&known.code)
        .filter(|other| other.id != known.id)
        .find_map(|other| selection.semester_of(&other.id).map(|s| (other.id, s)));

    let moving = mode == SelectMode::Move || config.conflict_rule == ConflictRule::Replace;
    let missing = match displaced {
        Some((old, _)) if moving => {
            let mut without_old = selection.clone();
            without_old.remove(&old);
            missing_prerequisites(catalog, def, target, &without_old, config.prerequisite_rule)
        }
        _ => missing_prerequisites(catalog, def, target, selection, config.prerequisite_rule),
    };
    if !missing.is_empty() {
        return Err(SelectionError::PrerequisitesNotMet {
            code: known.code.clone(),
            semester: target,
            missing,
        });
    }

    match displaced {
        Some((_, selected_in)) if !moving => Err(SelectionError::ConflictingSelection {
            code: known.code.clone(),
            selected_in,
        }),
        _ => Ok(displaced),
    }
}

/// True if `select` with the same arguments would succeed. No side effects.
pub fn can_select(
    catalog: &Catalog,
    instance: &ModuleInstance,
    target: Semester,
    selection: &SelectionSet,
    mode: SelectMode,
    config: &PlannerConfig,
) -> bool {
    check_select(catalog, instance, target, selection, mode, config).is_ok()
}

/// Places `instance` in `target`.
///
/// A move first drops the other instance of the same code; selections that
/// relied on the old placement and are no longer satisfied are pruned and
/// reported in `invalidated`. Selecting an already-selected instance is a
/// no-op.
pub fn select(
    catalog: &Catalog,
    instance: &ModuleInstance,
    target: Semester,
    selection: &SelectionSet,
    mode: SelectMode,
    config: &PlannerConfig,
) -> Result<SelectOutcome, SelectionError> {
    let displaced = check_select(catalog, instance, target, selection, mode, config)?;

    let mut next = selection.clone();
    next.insert(target, instance.id);

    let Some((old, _)) = displaced else {
        return Ok(SelectOutcome {
            selection: next,
            replaced: None,
            invalidated: Vec::new(),
        });
    };

    next.remove(&old);
    let (selection, invalidated) = prune_invalid(catalog, &next, config);
    Ok(SelectOutcome {
        selection,
        replaced: Some(old),
        invalidated,
    })
}

/// Plans the removal of `instance` together with every selected instance
/// that transitively depends on its code. Pure; apply with `apply_deselection`.
///
/// An instance that is not selected has no dependents, even when another
/// instance of its code is selected.
pub fn request_deselect(
    catalog: &Catalog,
    instance: &ModuleInstance,
    selection: &SelectionSet,
) -> DeselectionPlan {
    let dependents = if selection.contains(&instance.id) {
        selected_dependents(catalog, &instance.code, selection)
    } else {
        Vec::new()
    };
    DeselectionPlan {
        target: instance.id,
        dependents,
    }
}

/// Removes the plan's target and dependents. Absent ids are skipped, so
/// applying the same plan twice gives the same set.
pub fn apply_deselection(plan: &DeselectionPlan, selection: &SelectionSet) -> SelectionSet {
    let mut next = selection.clone();
    for id in plan.all() {
        next.remove(id);
    }
    next
}

/// Derived status of `instance` against `selection`. A same-code selection
/// elsewhere takes precedence over unmet prerequisites.
pub fn instance_status(
    catalog: &Catalog,
    instance: &ModuleInstance,
    selection: &SelectionSet,
    config: &PlannerConfig,
) -> SelectionStatus {
    if selection.contains(&instance.id) {
        return SelectionStatus::Selected;
    }
    let elsewhere = catalog
        .instances_of(&instance.code)
        .any(|other| other.id != instance.id && selection.contains(&other.id));
    if elsewhere {
        return SelectionStatus::AvailableElsewhere;
    }
    let Some(def) = catalog.def(&instance.code) else {
        return SelectionStatus::Unavailable;
    };
    if missing_prerequisites(
        catalog,
        def,
        instance.semester,
        selection,
        config.prerequisite_rule,
    )
    .is_empty()
    {
        SelectionStatus::Available
    } else {
        SelectionStatus::Unavailable
    }
}

/// Brings an arbitrary selection set back under the invariants: drops ids
/// the catalog does not know, ids sitting in a bucket other than their
/// offering semester, later duplicates of an already-selected code, then
/// repeatedly drops selections with unmet prerequisites until none remain.
///
/// Returns the repaired set and the removed ids in removal order.
pub fn prune_invalid(
    catalog: &Catalog,
    selection: &SelectionSet,
    config: &PlannerConfig,
) -> (SelectionSet, Vec<InstanceId>) {
    let mut pruned = SelectionSet::new();
    let mut removed = Vec::new();
    let mut codes: AHashSet<&ModuleCode> = AHashSet::new();

    for (semester, id) in selection.iter() {
        match catalog.instance(id) {
            Some(inst) if inst.semester == semester && codes.insert(&inst.code) => {
                pruned.insert(semester, *id);
            }
            _ => removed.push(*id),
        }
    }

    loop {
        let broken: Vec<InstanceId> = catalog
            .selected(&pruned)
            .filter(|(semester, _, def)| {
                !missing_prerequisites(catalog, def, *semester, &pruned, config.prerequisite_rule)
                    .is_empty()
            })
            .map(|(_, inst, _)| inst.id)
            .collect();
        if broken.is_empty() {
            break;
        }
        for id in broken {
            pruned.remove(&id);
            removed.push(id);
        }
    }
    (pruned, removed)
}
