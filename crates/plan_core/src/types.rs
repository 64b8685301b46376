//! Type definitions for `plan_core`.
//!
//! Catalog definitions, derived instances, the selection set, requirement
//! bounds and planner configuration.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// 1-based semester number within the planning horizon.
pub type Semester = u32;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(ModuleCode);
string_id!(ProgramId);
string_id!(SubjectArea);

/// Per-session identifier of one semester offering of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inst_{}", self.0.simple())
    }
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Winter,
    Summer,
}

impl Term {
    pub fn other(self) -> Self {
        match self {
            Term::Winter => Term::Summer,
            Term::Summer => Term::Winter,
        }
    }
}

/// When a module is offered: a concrete semester number or every semester
/// of a term type. Serialized untagged, so `3` and `"winter"` both parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offering {
    Semester(Semester),
    Term(Term),
}

/// Whether a prerequisite must be placed strictly before its dependent or
/// may share the dependent's semester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrerequisiteRule {
    #[default]
    StrictlyEarlier,
    SameOrEarlier,
}

impl PrerequisiteRule {
    /// True if a prerequisite selected in `prereq` satisfies a dependent in `target`.
    pub fn satisfied_by(self, prereq: Semester, target: Semester) -> bool {
        match self {
            PrerequisiteRule::StrictlyEarlier => prereq < target,
            PrerequisiteRule::SameOrEarlier => prereq <= target,
        }
    }
}

/// What a plain select does when the same code is already chosen elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictRule {
    /// Reject with `ConflictingSelection` unless the caller asks for a move.
    #[default]
    Block,
    /// Every select behaves as a move.
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMode {
    Add,
    /// Atomically drop the other instance of the same code before adding.
    Move,
}

/// Derived selection status of an instance against the current selection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    Unavailable,
    AvailableElsewhere,
    Available,
    Selected,
}

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDef {
    pub code: ModuleCode,
    /// Secondary numeric id used for grouping; not unique.
    #[serde(default)]
    pub id: Option<u32>,
    pub name: String,
    pub ects: u32,
    #[serde(default)]
    pub subject_areas: Vec<SubjectArea>,
    /// Mandatory prerequisites, by code.
    #[serde(default)]
    pub prerequisite_codes: Vec<ModuleCode>,
    /// Informational only. Never gates selection.
    #[serde(default)]
    pub additional_prerequisites: Vec<String>,
    /// Empty means offered every semester.
    #[serde(default)]
    pub offered: Vec<Offering>,
    /// Empty means part of every program.
    #[serde(default)]
    pub programs: Vec<ProgramId>,
}

/// What a catalog provider hands back for one fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub content_version: String,
    pub modules: Vec<ModuleDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInstance {
    pub id: InstanceId,
    pub code: ModuleCode,
    pub semester: Semester,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRequirement {
    pub category: SubjectArea,
    pub min_credits: u32,
    pub max_credits: u32,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Planning horizon; semesters are `1..=semester_count`.
    pub semester_count: Semester,
    /// Term of semester 1. Odd semesters share it, even ones get the other.
    pub first_term: Term,
    pub prerequisite_rule: PrerequisiteRule,
    pub conflict_rule: ConflictRule,
    /// Advisory cap used by `semester_loads`.
    pub max_ects_per_semester: Option<u32>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            semester_count: 6,
            first_term: Term::Winter,
            prerequisite_rule: PrerequisiteRule::StrictlyEarlier,
            conflict_rule: ConflictRule::Block,
            max_ects_per_semester: None,
        }
    }
}

impl PlannerConfig {
    pub fn term_of(&self, semester: Semester) -> Term {
        if semester % 2 == 1 {
            self.first_term
        } else {
            self.first_term.other()
        }
    }

    pub fn semesters(&self) -> impl Iterator<Item = Semester> {
        1..=self.semester_count
    }
}

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// Selected instance ids bucketed by semester. Empty buckets are dropped so
/// two sets holding the same selections compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    semesters: BTreeMap<Semester, BTreeSet<InstanceId>>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, semester: Semester, id: InstanceId) -> bool {
        self.semesters.entry(semester).or_default().insert(id)
    }

    /// Removes `id` from whichever bucket holds it. Returns that bucket.
    pub fn remove(&mut self, id: &InstanceId) -> Option<Semester> {
        let semester = self.semester_of(id)?;
        if let Some(bucket) = self.semesters.get_mut(&semester) {
            bucket.remove(id);
            if bucket.is_empty() {
                self.semesters.remove(&semester);
            }
        }
        Some(semester)
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.semesters.values().any(|bucket| bucket.contains(id))
    }

    pub fn semester_of(&self, id: &InstanceId) -> Option<Semester> {
        self.semesters
            .iter()
            .find(|(_, bucket)| bucket.contains(id))
            .map(|(semester, _)| *semester)
    }

    pub fn bucket(&self, semester: Semester) -> impl Iterator<Item = &InstanceId> {
        self.semesters.get(&semester).into_iter().flatten()
    }

    /// All selections in ascending semester order.
    pub fn iter(&self) -> impl Iterator<Item = (Semester, &InstanceId)> {
        self.semesters
            .iter()
            .flat_map(|(semester, bucket)| bucket.iter().map(move |id| (*semester, id)))
    }

    pub fn len(&self) -> usize {
        self.semesters.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.semesters.is_empty()
    }
}

/// Outcome of a successful select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOutcome {
    pub selection: SelectionSet,
    /// Same-code instance dropped by a move.
    pub replaced: Option<InstanceId>,
    /// Selections whose prerequisites the move broke; already removed.
    pub invalidated: Vec<InstanceId>,
}

/// Result of `request_deselect`: the target and its transitive dependents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeselectionPlan {
    pub target: InstanceId,
    pub dependents: Vec<InstanceId>,
}

impl DeselectionPlan {
    pub fn needs_confirmation(&self) -> bool {
        !self.dependents.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &InstanceId> {
        std::iter::once(&self.target).chain(self.dependents.iter())
    }
}

/// Storage form of a selection set. Instance ids are per-session, so plans
/// are persisted as codes per semester and resolved again on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlan {
    pub content_version: String,
    pub semesters: BTreeMap<Semester, Vec<ModuleCode>>,
}
