//! Network construction errors.

use wg_core::WgError;

/// Network construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Two nodes share a name.
    DuplicateNode { name: String },

    /// A branch names a node that was never added.
    UnknownNode { branch: String, node: String },

    /// A node has more than one uptree branch.
    MultipleUptree { node: String },

    /// No node, or more than one, lacks an uptree branch.
    RootCount { count: usize },

    /// The root has no fixed terminal pressure.
    RootWithoutPressure { root: String },

    /// A node cannot be reached from the root (it sits on a cycle).
    Unreachable { node: String },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::DuplicateNode { name } => {
                write!(f, "Network node '{}' is defined more than once", name)
            }
            NetworkError::UnknownNode { branch, node } => {
                write!(f, "Branch {} refers to non-existent node '{}'", branch, node)
            }
            NetworkError::MultipleUptree { node } => {
                write!(f, "Network node '{}' has more than one uptree branch", node)
            }
            NetworkError::RootCount { count } => {
                write!(f, "Network has {} root nodes (expected 1)", count)
            }
            NetworkError::RootWithoutPressure { root } => {
                write!(f, "Network root '{}' has no terminal pressure", root)
            }
            NetworkError::Unreachable { node } => {
                write!(f, "Network node '{}' is not reachable from the root", node)
            }
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<NetworkError> for WgError {
    fn from(err: NetworkError) -> Self {
        WgError::Invariant {
            what: err.to_string(),
        }
    }
}
