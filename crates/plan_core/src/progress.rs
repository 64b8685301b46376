use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Catalog, CategoryRequirement, PlannerConfig, Semester, SelectionSet, SubjectArea};

/// Credits per subject area over the selected instances.
///
/// Every requirement category is present, at 0 if nothing contributes.
/// Subject areas without a requirement still get their totals. An instance
/// listing the same area twice counts once for it. Totals saturate at
/// `u32::MAX`.
pub fn aggregate_progress(
    catalog: &Catalog,
    selection: &SelectionSet,
    categories: &[CategoryRequirement],
) -> BTreeMap<SubjectArea, u32> {
    let mut totals: BTreeMap<SubjectArea, u32> = categories
        .iter()
        .map(|req| (req.category.clone(), 0))
        .collect();

    for (_, _, def) in catalog.selected(selection) {
        let mut areas: Vec<&SubjectArea> = def.subject_areas.iter().collect();
        areas.sort();
        areas.dedup();
        for area in areas {
            let total = totals.entry(area.clone()).or_insert(0);
            *total = total.saturating_add(def.ects);
        }
    }
    totals
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub category: SubjectArea,
    pub credits: u32,
    pub min_credits: u32,
    pub max_credits: u32,
}

impl CategoryProgress {
    /// Below the minimum or above the maximum. Advisory; nothing enforces it.
    pub fn out_of_bounds(&self) -> bool {
        self.credits < self.min_credits || self.credits > self.max_credits
    }

    /// Credits still needed to reach the minimum.
    pub fn remaining(&self) -> u32 {
        self.min_credits.saturating_sub(self.credits)
    }
}

/// `aggregate_progress` joined with the requirement bounds, in requirement order.
pub fn category_progress(
    catalog: &Catalog,
    selection: &SelectionSet,
    categories: &[CategoryRequirement],
) -> Vec<CategoryProgress> {
    let totals = aggregate_progress(catalog, selection, categories);
    categories
        .iter()
        .map(|req| CategoryProgress {
            category: req.category.clone(),
            credits: totals.get(&req.category).copied().unwrap_or(0),
            min_credits: req.min_credits,
            max_credits: req.max_credits,
        })
        .collect()
}

pub fn total_ects(catalog: &Catalog, selection: &SelectionSet) -> u32 {
    catalog
        .selected(selection)
        .fold(0, |sum, (_, _, def)| sum.saturating_add(def.ects))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterLoad {
    pub semester: Semester,
    pub ects: u32,
    pub module_count: usize,
    /// Above `max_ects_per_semester`. Advisory only.
    pub overloaded: bool,
}

/// Credits placed in each semester of the planning horizon.
pub fn semester_loads(
    catalog: &Catalog,
    selection: &SelectionSet,
    config: &PlannerConfig,
) -> Vec<SemesterLoad> {
    config
        .semesters()
        .map(|semester| {
            let (ects, module_count) = selection
                .bucket(semester)
                .fold((0u32, 0), |(ects, count), id| {
                    (ects.saturating_add(catalog.ects_of(id)), count + 1)
                });
            SemesterLoad {
                semester,
                ects,
                module_count,
                overloaded: config.max_ects_per_semester.is_some_and(|cap| ects > cap),
            }
        })
        .collect()
}
