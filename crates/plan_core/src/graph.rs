use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use crate::{Catalog, InstanceId, ModuleCode, ModuleDef, SelectionSet};

/// Selected instances that depend on `root`, directly or transitively, in
/// breadth-first discovery order.
///
/// B depends on A iff A's code is one of B's prerequisite codes and B is
/// currently selected. Instances of `root` itself are never reported. The
/// visited set keeps malformed (cyclic) catalogs finite.
pub fn selected_dependents(
    catalog: &Catalog,
    root: &ModuleCode,
    selection: &SelectionSet,
) -> Vec<InstanceId> {
    let selected: Vec<_> = catalog
        .selected(selection)
        .map(|(_, inst, def)| (inst, def))
        .collect();

    let mut visited: AHashSet<InstanceId> = AHashSet::new();
    let mut dependents = Vec::new();
    let mut queue = VecDeque::from([root.clone()]);

    while let Some(code) = queue.pop_front() {
        for (inst, def) in &selected {
            if inst.code == *root || !def.prerequisite_codes.contains(&code) {
                continue;
            }
            if visited.insert(inst.id) {
                dependents.push(inst.id);
                queue.push_back(inst.code.clone());
            }
        }
    }
    dependents
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

/// Prerequisite cycles among `defs`, each as the codes along the cycle in
/// prerequisite order. A module listing itself is a cycle of one.
/// Prerequisite codes with no definition are ignored here.
pub fn prerequisite_cycles(defs: &[ModuleDef]) -> Vec<Vec<ModuleCode>> {
    let index: AHashMap<&ModuleCode, &ModuleDef> = defs.iter().map(|d| (&d.code, d)).collect();
    let mut marks: AHashMap<&ModuleCode, Mark> = AHashMap::new();
    let mut cycles = Vec::new();

    for def in defs {
        if marks.contains_key(&def.code) {
            continue;
        }
        marks.insert(&def.code, Mark::Active);
        let mut stack: Vec<(&ModuleDef, usize)> = vec![(def, 0)];

        while let Some(frame) = stack.last_mut() {
            let current = frame.0;
            let Some(prereq) = current.prerequisite_codes.get(frame.1) else {
                marks.insert(&current.code, Mark::Done);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match marks.get(prereq) {
                Some(Mark::Active) => {
                    let start = stack
                        .iter()
                        .position(|(d, _)| d.code == *prereq)
                        .unwrap_or(0);
                    cycles.push(stack[start..].iter().map(|(d, _)| d.code.clone()).collect());
                }
                Some(Mark::Done) => {}
                None => {
                    if let Some(&next) = index.get(prereq) {
                        marks.insert(&next.code, Mark::Active);
                        stack.push((next, 0));
                    }
                }
            }
        }
    }
    cycles
}
