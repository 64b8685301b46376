use thiserror::Error;

use crate::{InstanceId, ModuleCode, Semester};

/// Why a selection request was refused. Every variant leaves the selection
/// set untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("{code} cannot go in semester {semester}: prerequisites not met ({})", join_codes(.missing))]
    PrerequisitesNotMet {
        code: ModuleCode,
        semester: Semester,
        missing: Vec<ModuleCode>,
    },

    #[error("{code} is already selected in semester {selected_in}")]
    ConflictingSelection {
        code: ModuleCode,
        selected_in: Semester,
    },

    #[error("{code} is not offered in semester {semester}")]
    NotOffered { code: ModuleCode, semester: Semester },

    #[error("unknown module instance {0}")]
    UnknownInstance(InstanceId),
}

fn join_codes(codes: &[ModuleCode]) -> String {
    codes
        .iter()
        .map(|c| c.0.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
