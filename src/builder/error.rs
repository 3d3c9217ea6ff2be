//! Build errors for the state machine builder.

use crate::machine::StateMachineError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error(transparent)]
    Machine(#[from] StateMachineError),
}
