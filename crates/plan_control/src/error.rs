use plan_core::SelectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// The engine refused the request; nothing changed.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// The catalog fetch failed. Not retried; the caller has to load again.
    #[error("failed to load catalog: {0}")]
    CatalogLoadFailure(String),

    #[error("failed to load requirements: {0}")]
    RequirementsLoadFailure(String),

    #[error("no catalog loaded")]
    CatalogNotLoaded,
}
