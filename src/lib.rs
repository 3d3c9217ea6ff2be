//! Stateflow: a generic enum state machine for component-driven code.
//!
//! A [`StateMachine`] owns one value of a closed enumeration and moves it
//! through gated transitions. Each transition runs exit callbacks of the old
//! state, commits the new state, notifies subscribers, then runs enter
//! callbacks of the new state. Presentation layers (UI controllers, tweening
//! animators) subscribe to the change notification and drive their own side
//! effects from it.
//!
//! # Core Concepts
//!
//! - **State**: a closed enumeration via the `State` trait or `state_enum!`
//! - **Gates**: predicates that veto a transition before anything runs
//! - **Callbacks**: accumulating enter/exit lists and change subscribers
//! - **History**: bounded record of committed transitions
//!
//! The machine is single-threaded: callbacks are `Rc<dyn Fn>` and all
//! operations take `&self`, so callbacks may call back into the machine.
//!
//! # Example
//!
//! ```rust
//! use stateflow::{state_enum, StateMachine};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! state_enum! {
//!     enum Tab { Home, Settings, About }
//! }
//!
//! let machine = StateMachine::new(Tab::Home).unwrap();
//! let changes = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&changes);
//! machine.subscribe(move |_, _| counter.set(counter.get() + 1));
//!
//! machine.set_state(Tab::Settings);
//! machine.set_state_index(2).unwrap();
//!
//! assert_eq!(machine.state(), Tab::About);
//! assert_eq!(changes.get(), 2);
//! assert_eq!(machine.names(), vec!["Home", "Settings", "About"]);
//! ```

pub mod builder;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use self::core::{
    Guard, HistoryError, State, StateChange, StateHistory, TransitionGuard,
};
pub use machine::{
    MachineConfig, StateMachine, StateMachineError, SubscriptionId, Transition,
    DEFAULT_HISTORY_CAPACITY,
};
