//! Tree construction errors.

use wg_core::WgError;

/// Tree construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Two nodes (groups or wells) share a name.
    DuplicateName { name: String },

    /// A group or well names a parent group that doesn't exist.
    UnknownParent { child: String, parent: String },

    /// A group cannot be reached from the root (it sits on a cycle).
    Unreachable { group: String },

    /// The tree is deeper than the supported limit.
    TooDeep { group: String, limit: usize },

    /// An efficiency factor is negative or not finite.
    InvalidEfficiency { name: String },

    /// A group declares two injection specifications for one phase.
    DuplicateInjectionPhase { group: String, phase: String },
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::DuplicateName { name } => {
                write!(f, "Name '{}' is used by more than one group or well", name)
            }
            TreeError::UnknownParent { child, parent } => {
                write!(f, "'{}' refers to non-existent parent group '{}'", child, parent)
            }
            TreeError::Unreachable { group } => {
                write!(f, "Group '{}' is not reachable from FIELD", group)
            }
            TreeError::TooDeep { group, limit } => {
                write!(f, "Group '{}' is nested deeper than {} levels", group, limit)
            }
            TreeError::InvalidEfficiency { name } => {
                write!(f, "'{}' has a negative or non-finite efficiency factor", name)
            }
            TreeError::DuplicateInjectionPhase { group, phase } => {
                write!(f, "Group '{}' has more than one {} injection control", group, phase)
            }
        }
    }
}

impl std::error::Error for TreeError {}

impl From<TreeError> for WgError {
    fn from(err: TreeError) -> Self {
        WgError::Invariant {
            what: err.to_string(),
        }
    }
}
