//! Core state machine types.
//!
//! This module contains the building blocks the machine is made of:
//! - State definitions via the `State` trait
//! - Gate predicates for transition control
//! - Bounded transition history

mod guard;
mod history;
mod state;

pub use guard::{allow_only, Guard, TransitionGuard};
pub use history::{HistoryError, StateChange, StateHistory};
pub use state::State;
