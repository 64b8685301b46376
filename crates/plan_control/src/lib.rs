//! `plan_control` — the caller side of the selection engine.
//!
//! Defines the collaborator seams (catalog, requirements, storage), the
//! stores, and `PlanSession`, which owns the selection set and persists it
//! after every mutation.

use plan_core::{CatalogSnapshot, CategoryRequirement, ProgramId, SavedPlan};

mod error;
mod session;
mod store;

pub use error::PlannerError;
pub use session::{CatalogState, DeselectOutcome, PlanSession};
pub use store::{JsonFileStore, MemoryStore};

/// Source of module definitions, optionally filtered to one program.
pub trait CatalogProvider {
    fn fetch_catalog(&self, program: Option<&ProgramId>) -> anyhow::Result<CatalogSnapshot>;
}

/// Source of per-category credit bounds for a program.
pub trait RequirementsProvider {
    fn fetch_requirements(&self, program: &ProgramId) -> anyhow::Result<Vec<CategoryRequirement>>;
}

/// Best-effort storage for the selection set. Implementations log and
/// swallow their own failures; callers never see them.
pub trait SelectionStore {
    fn load(&mut self) -> Option<SavedPlan>;
    fn save(&mut self, plan: &SavedPlan);
}
