//! The state machine and its supporting types.
//!
//! # Key Concepts
//!
//! - **Transitions**: gated, ordered exit → commit → notify → enter sequences
//! - **Registry**: per-state callback lists and single-slot gates
//! - **Configuration**: serde-loadable tunables applied at construction

mod config;
mod error;
mod registry;
mod state_machine;

pub use config::{MachineConfig, DEFAULT_HISTORY_CAPACITY};
pub use error::StateMachineError;
pub use registry::{Callback, ChangeHandler, SubscriptionId};
pub use state_machine::{StateMachine, Transition};
