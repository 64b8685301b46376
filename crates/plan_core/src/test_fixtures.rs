//! Shared test fixtures for plan_core and downstream crates.
//!
//! `scenario_catalog()` is the two-module A → B catalog most engine tests
//! start from; `module()` builds ad-hoc definitions for everything else.

use crate::{
    Catalog, CatalogSnapshot, CategoryRequirement, ModuleCode, ModuleDef, ModuleInstance,
    PlannerConfig, Semester, SubjectArea,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn code(code: &str) -> ModuleCode {
    ModuleCode(code.to_string())
}

pub fn area(name: &str) -> SubjectArea {
    SubjectArea(name.to_string())
}

/// Module offered every semester, no subject areas.
pub fn module(code_str: &str, ects: u32, prereqs: &[&str]) -> ModuleDef {
    ModuleDef {
        code: code(code_str),
        id: None,
        name: format!("Module {code_str}"),
        ects,
        subject_areas: vec![],
        prerequisite_codes: prereqs.iter().map(|p| code(p)).collect(),
        additional_prerequisites: vec![],
        offered: vec![],
        programs: vec![],
    }
}

pub fn module_in(code_str: &str, ects: u32, prereqs: &[&str], areas: &[&str]) -> ModuleDef {
    ModuleDef {
        subject_areas: areas.iter().map(|a| area(a)).collect(),
        ..module(code_str, ects, prereqs)
    }
}

pub fn requirement(name: &str, min_credits: u32, max_credits: u32) -> CategoryRequirement {
    CategoryRequirement {
        category: area(name),
        min_credits,
        max_credits,
    }
}

/// Six semesters starting in winter, strictly-earlier prerequisites, blocking conflicts.
pub fn base_config() -> PlannerConfig {
    PlannerConfig::default()
}

pub fn catalog_of(modules: Vec<ModuleDef>) -> Catalog {
    catalog_with(modules, &base_config())
}

pub fn catalog_with(modules: Vec<ModuleDef>, config: &PlannerConfig) -> Catalog {
    Catalog::build(
        CatalogSnapshot {
            content_version: "test".to_string(),
            modules,
        },
        config,
        &mut make_rng(),
    )
}

/// A (5 ECTS, area X) and B (6 ECTS, area X, requires A), both offered every semester.
pub fn scenario_catalog() -> Catalog {
    catalog_of(vec![
        module_in("A", 5, &[], &["X"]),
        module_in("B", 6, &["A"], &["X"]),
    ])
}

/// Clone of the instance of `code_str` offered in `semester`. Panics if absent.
pub fn inst(catalog: &Catalog, code_str: &str, semester: Semester) -> ModuleInstance {
    catalog
        .instance_at(&code(code_str), semester)
        .unwrap_or_else(|| panic!("{code_str} not offered in semester {semester}"))
        .clone()
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
