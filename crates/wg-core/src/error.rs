use thiserror::Error;

pub type WgResult<T> = Result<T, WgError>;

/// Errors surfaced by the group-control passes.
///
/// Every variant aborts the current step. Data sparsity (a well living on
/// another partition, a group outside the network) is not an error and never
/// reaches this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WgError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Not implemented: {what}")]
    Unimplemented { what: String },

    #[error("Invalid control mode {mode} in {context}")]
    InvalidControlMode { mode: String, context: String },

    #[error("Unknown group or well: {name}")]
    UnknownNode { name: String },

    #[error("Missing {what} for {name}")]
    MissingState { what: &'static str, name: String },

    #[error("Unknown summary quantity: {key}")]
    UnknownQuantity { key: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}

impl WgError {
    pub fn unknown_node(name: impl Into<String>) -> Self {
        WgError::UnknownNode { name: name.into() }
    }

    pub fn missing(what: &'static str, name: impl Into<String>) -> Self {
        WgError::MissingState {
            what,
            name: name.into(),
        }
    }
}
