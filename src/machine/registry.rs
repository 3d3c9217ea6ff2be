//! Callback bookkeeping for a state machine.
//!
//! The registry only stores callbacks. Every accessor hands out a cloned
//! snapshot so the machine can release its borrow before user code runs.

use crate::core::{Guard, State, TransitionGuard};
use std::collections::HashMap;
use std::rc::Rc;

/// Zero-argument lifecycle callback run on enter or exit.
pub type Callback = Rc<dyn Fn()>;

/// Change-notification subscriber, called with `(from, to)`.
pub type ChangeHandler<S> = Rc<dyn Fn(S, S)>;

/// Handle returned by [`StateMachine::subscribe`](crate::StateMachine::subscribe).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub(crate) struct CallbackRegistry<S: State> {
    enter: HashMap<S, Vec<Callback>>,
    exit: HashMap<S, Vec<Callback>>,
    gates: HashMap<S, Guard>,
    global_gate: Option<TransitionGuard<S>>,
    subscribers: Vec<(SubscriptionId, ChangeHandler<S>)>,
    next_subscription: u64,
}

impl<S: State> CallbackRegistry<S> {
    pub(crate) fn new() -> Self {
        Self {
            enter: HashMap::new(),
            exit: HashMap::new(),
            gates: HashMap::new(),
            global_gate: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub(crate) fn add_enter(&mut self, state: S, callback: Callback) {
        self.enter.entry(state).or_default().push(callback);
    }

    pub(crate) fn add_exit(&mut self, state: S, callback: Callback) {
        self.exit.entry(state).or_default().push(callback);
    }

    /// Replace the gate for `state`, returning the one it displaced.
    pub(crate) fn set_gate(&mut self, state: S, gate: Guard) -> Option<Guard> {
        self.gates.insert(state, gate)
    }

    pub(crate) fn clear_gate(&mut self, state: S) -> Option<Guard> {
        self.gates.remove(&state)
    }

    pub(crate) fn set_global_gate(&mut self, gate: Option<TransitionGuard<S>>) {
        self.global_gate = gate;
    }

    pub(crate) fn subscribe(&mut self, handler: ChangeHandler<S>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, handler));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn enter_callbacks(&self, state: S) -> Vec<Callback> {
        self.enter.get(&state).cloned().unwrap_or_default()
    }

    pub(crate) fn exit_callbacks(&self, state: S) -> Vec<Callback> {
        self.exit.get(&state).cloned().unwrap_or_default()
    }

    pub(crate) fn gate(&self, state: S) -> Option<Guard> {
        self.gates.get(&state).cloned()
    }

    pub(crate) fn global_gate(&self) -> Option<TransitionGuard<S>> {
        self.global_gate.clone()
    }

    pub(crate) fn subscribers(&self) -> Vec<ChangeHandler<S>> {
        self.subscribers
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect()
    }
}
