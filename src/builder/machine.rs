//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{State, TransitionGuard};
use crate::machine::{MachineConfig, StateMachine};

type Registration<S> = Box<dyn FnOnce(&StateMachine<S>)>;

/// Builder for constructing state machines with a fluent API.
///
/// Registrations are applied in the order they were added, so accumulated
/// enter/exit callbacks keep that order in the built machine.
///
/// # Example
///
/// ```rust
/// use stateflow::builder::StateMachineBuilder;
/// use stateflow::state_enum;
///
/// state_enum! {
///     enum Light { Red, Green, Yellow }
/// }
///
/// let machine = StateMachineBuilder::new()
///     .initial(Light::Red)
///     .allow(&[(Light::Red, Light::Green), (Light::Green, Light::Yellow), (Light::Yellow, Light::Red)])
///     .on_enter(Light::Green, || println!("go"))
///     .build()
///     .unwrap();
///
/// assert!(!machine.set_state(Light::Yellow).is_changed());
/// assert!(machine.set_state(Light::Green).is_changed());
/// ```
pub struct StateMachineBuilder<S: State> {
    initial: Option<S>,
    config: MachineConfig,
    registrations: Vec<Registration<S>>,
}

impl<S: State> StateMachineBuilder<S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            config: MachineConfig::default(),
            registrations: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn refresh_on_same_state(mut self, enabled: bool) -> Self {
        self.config.refresh_on_same_state = enabled;
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    pub fn on_enter<F>(self, state: S, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.register(move |machine| machine.on_enter(state, callback))
    }

    pub fn on_exit<F>(self, state: S, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.register(move |machine| machine.on_exit(state, callback))
    }

    pub fn gate<F>(self, state: S, gate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.register(move |machine| machine.set_gate(state, gate))
    }

    pub fn global_gate<F>(self, gate: F) -> Self
    where
        F: Fn(S, S) -> bool + 'static,
    {
        self.register(move |machine| machine.set_global_gate(gate))
    }

    /// Restrict transitions to the listed `(from, to)` pairs.
    /// Replaces any global gate added earlier.
    pub fn allow(self, pairs: &[(S, S)]) -> Self {
        let guard: TransitionGuard<S> = crate::core::allow_only(pairs);
        self.register(move |machine| machine.set_global_guard(guard))
    }

    pub fn subscribe<F>(self, handler: F) -> Self
    where
        F: Fn(S, S) + 'static,
    {
        self.register(move |machine| {
            machine.subscribe(handler);
        })
    }

    /// Build the state machine.
    /// Returns an error if the initial state is missing or `S` is malformed.
    pub fn build(self) -> Result<StateMachine<S>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let machine = StateMachine::with_config(initial, self.config)?;

        for registration in self.registrations {
            registration(&machine);
        }

        Ok(machine)
    }

    fn register<F>(mut self, registration: F) -> Self
    where
        F: FnOnce(&StateMachine<S>) + 'static,
    {
        self.registrations.push(Box::new(registration));
        self
    }
}

impl<S: State> Default for StateMachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
