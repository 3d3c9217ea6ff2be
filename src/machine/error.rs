//! State machine error types.

use thiserror::Error;

/// Errors reported by [`StateMachine`](crate::StateMachine) operations.
///
/// Gate rejections are not errors; they surface as
/// [`Transition::Vetoed`](crate::Transition::Vetoed).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateMachineError {
    /// The state type's variant table does not describe a closed enumeration.
    #[error("invalid state type `{type_name}`: {reason}")]
    InvalidConfiguration {
        type_name: &'static str,
        reason: String,
    },

    /// An ordinal outside `0..len` was requested.
    #[error("state index {index} out of range for {len} states")]
    InvalidArgument { index: usize, len: usize },

    /// The name found at an ordinal does not map back to a state.
    #[error("state name '{name}' at index {index} does not resolve to a state")]
    ResolutionFailure { index: usize, name: &'static str },
}
