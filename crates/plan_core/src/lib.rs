//! `plan_core` — module selection engine.
//!
//! No IO, no logging. Callers pass the catalog and selection set in and get
//! new state back; instance ids come from the passed-in Rng.

mod catalog;
mod engine;
mod error;
mod graph;
mod id;
mod progress;
mod saved;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use catalog::{offered_semesters, Catalog};
pub use engine::{
    apply_deselection, can_select, instance_status, missing_prerequisites, prune_invalid,
    request_deselect, select,
};
pub use error::SelectionError;
pub use graph::{prerequisite_cycles, selected_dependents};
pub use id::{generate_instance_id, generate_uuid};
pub use progress::{
    aggregate_progress, category_progress, semester_loads, total_ects, CategoryProgress,
    SemesterLoad,
};
pub use saved::{restore_plan, save_plan, RestoredPlan};
pub use types::*;

#[cfg(test)]
mod tests;
