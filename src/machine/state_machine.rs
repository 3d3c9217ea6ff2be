//! State machine with gated transitions and lifecycle callbacks.

use crate::core::{Guard, State, StateChange, StateHistory, TransitionGuard};
use crate::machine::config::MachineConfig;
use crate::machine::error::StateMachineError;
use crate::machine::registry::{CallbackRegistry, SubscriptionId};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Outcome of a [`StateMachine::set_state`] request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition<S> {
    /// The state changed and every callback ran.
    Changed { from: S, to: S },

    /// The requested state was already current; enter callbacks re-ran.
    Refreshed(S),

    /// The requested state was already current; nothing ran.
    Unchanged(S),

    /// A gate rejected the request, or the target is not a declared
    /// variant. Nothing ran.
    Vetoed { from: S, to: S },
}

impl<S: Copy> Transition<S> {
    /// Whether the request committed a state change.
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }

    /// The state the machine was left in by this request.
    pub fn state(&self) -> S {
        match *self {
            Self::Changed { to, .. } => to,
            Self::Refreshed(s) | Self::Unchanged(s) => s,
            Self::Vetoed { from, .. } => from,
        }
    }
}

/// Finite state machine over a closed enumeration `S`.
///
/// Every operation takes `&self`, so callbacks that hold an `Rc` (or `Weak`)
/// to the machine may read [`state`](Self::state), register further
/// callbacks, or request another transition. No internal borrow is held
/// while user code runs.
///
/// A transition requested from inside a callback runs to completion before
/// the outer transition continues with its remaining callbacks, which still
/// see the outer `(from, to)` pair. Avoid nested requests from exit callbacks
/// and subscribers unless that interleaving is what you want.
///
/// Panics raised by callbacks are not caught. A panic in a gate or exit
/// callback leaves the old state in place; a panic in a subscriber or enter
/// callback leaves the new state committed and skips the callbacks after it.
///
/// # Example
///
/// ```rust
/// use stateflow::{state_enum, StateMachine, Transition};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// state_enum! {
///     enum Door { Closed, Open, Locked }
/// }
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let machine = StateMachine::new(Door::Closed).unwrap();
///
/// let exit_log = Rc::clone(&log);
/// machine.on_exit(Door::Closed, move || exit_log.borrow_mut().push("exit closed"));
/// let enter_log = Rc::clone(&log);
/// machine.on_enter(Door::Open, move || enter_log.borrow_mut().push("enter open"));
/// machine.set_gate(Door::Locked, || false);
///
/// assert_eq!(machine.set_state(Door::Locked), Transition::Vetoed { from: Door::Closed, to: Door::Locked });
/// assert!(machine.set_state(Door::Open).is_changed());
/// assert_eq!(machine.state(), Door::Open);
/// assert_eq!(*log.borrow(), vec!["exit closed", "enter open"]);
/// ```
pub struct StateMachine<S: State> {
    current: Cell<S>,
    current_index: Cell<usize>,
    previous: Cell<Option<S>>,
    refresh_on_same_state: Cell<bool>,
    registry: RefCell<CallbackRegistry<S>>,
    history: RefCell<StateHistory<S>>,
}

impl<S: State> StateMachine<S> {
    /// Create a machine in `initial` with the default configuration.
    ///
    /// No callbacks fire on construction. Fails with
    /// [`StateMachineError::InvalidConfiguration`] when `S::VARIANTS` is not a
    /// well-formed enumeration table or does not contain `initial`.
    pub fn new(initial: S) -> Result<Self, StateMachineError> {
        Self::with_config(initial, MachineConfig::default())
    }

    /// Create a machine in `initial` with an explicit configuration.
    pub fn with_config(initial: S, config: MachineConfig) -> Result<Self, StateMachineError> {
        let initial_index = validate_domain(initial)?;

        Ok(Self {
            current: Cell::new(initial),
            current_index: Cell::new(initial_index),
            previous: Cell::new(None),
            refresh_on_same_state: Cell::new(config.refresh_on_same_state),
            registry: RefCell::new(CallbackRegistry::new()),
            history: RefCell::new(StateHistory::with_capacity(config.history_capacity)),
        })
    }

    /// Current state.
    pub fn state(&self) -> S {
        self.current.get()
    }

    /// Ordinal of the current state in declaration order.
    pub fn state_index(&self) -> usize {
        self.current_index.get()
    }

    /// State held before the most recent committed transition.
    pub fn previous_state(&self) -> Option<S> {
        self.previous.get()
    }

    /// Member names of `S` in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        S::names()
    }

    pub fn refresh_on_same_state(&self) -> bool {
        self.refresh_on_same_state.get()
    }

    /// Toggle whether requesting the current state re-runs its enter callbacks.
    /// Takes effect on the next request.
    pub fn set_refresh_on_same_state(&self, enabled: bool) {
        self.refresh_on_same_state.set(enabled);
    }

    /// Request a transition to `desired`.
    ///
    /// Order of operations:
    /// 1. Same state: refresh (if enabled) or do nothing. No notification.
    /// 2. A target missing from `S::VARIANTS` is vetoed and logged.
    /// 3. Global gate with `(current, desired)`; `false` vetoes.
    /// 4. Gate registered for `desired`; `false` vetoes.
    /// 5. Exit callbacks of the current state, which is still current.
    /// 6. Commit `desired`.
    /// 7. Change subscribers with `(from, desired)`.
    /// 8. Enter callbacks of `desired`.
    pub fn set_state(&self, desired: S) -> Transition<S> {
        let from = self.current.get();

        if desired == from {
            if self.refresh_on_same_state.get() {
                self.refresh();
                return Transition::Refreshed(from);
            }
            return Transition::Unchanged(from);
        }

        let Some(desired_index) = desired.index() else {
            tracing::warn!(
                from = from.name(),
                to = desired.name(),
                "rejected transition to undeclared state"
            );
            return Transition::Vetoed { from, to: desired };
        };

        if !self.gates_allow(from, desired) {
            tracing::trace!(from = from.name(), to = desired.name(), "transition vetoed");
            return Transition::Vetoed { from, to: desired };
        }

        let exits = self.registry.borrow().exit_callbacks(from);
        for callback in exits {
            callback();
        }

        self.current.set(desired);
        self.current_index.set(desired_index);
        self.previous.set(Some(from));
        self.history
            .borrow_mut()
            .record(StateChange::now(from, desired));
        tracing::debug!(from = from.name(), to = desired.name(), "state changed");

        let subscribers = self.registry.borrow().subscribers();
        for subscriber in subscribers {
            subscriber(from, desired);
        }

        let enters = self.registry.borrow().enter_callbacks(desired);
        for callback in enters {
            callback();
        }

        Transition::Changed { from, to: desired }
    }

    /// Request a transition to the state at `index` in declaration order.
    ///
    /// Errors are logged and returned; the state is left unchanged.
    pub fn set_state_index(&self, index: usize) -> Result<Transition<S>, StateMachineError> {
        let names = S::names();

        let Some(&name) = names.get(index) else {
            let err = StateMachineError::InvalidArgument {
                index,
                len: names.len(),
            };
            tracing::warn!(error = %err, "rejected state index");
            return Err(err);
        };

        let Some(desired) = S::from_name(name) else {
            let err = StateMachineError::ResolutionFailure { index, name };
            tracing::warn!(error = %err, "rejected state index");
            return Err(err);
        };

        Ok(self.set_state(desired))
    }

    /// Re-run the enter callbacks of the current state.
    ///
    /// Exit callbacks, gates and subscribers are not involved.
    pub fn refresh(&self) {
        let current = self.current.get();
        tracing::debug!(state = current.name(), "state refreshed");

        let enters = self.registry.borrow().enter_callbacks(current);
        for callback in enters {
            callback();
        }
    }

    /// Run `callback` after every entry into `state`. Registrations accumulate.
    pub fn on_enter<F>(&self, state: S, callback: F)
    where
        F: Fn() + 'static,
    {
        self.registry
            .borrow_mut()
            .add_enter(state, Rc::new(callback));
    }

    /// Run `callback` just before every exit from `state`. Registrations accumulate.
    pub fn on_exit<F>(&self, state: S, callback: F)
    where
        F: Fn() + 'static,
    {
        self.registry.borrow_mut().add_exit(state, Rc::new(callback));
    }

    /// Gate entry into `state`, replacing any gate already registered for it.
    pub fn set_gate<F>(&self, state: S, gate: F)
    where
        F: Fn() -> bool + 'static,
    {
        self.registry.borrow_mut().set_gate(state, Guard::new(gate));
    }

    /// Remove the gate for `state`. Returns whether one was registered.
    pub fn clear_gate(&self, state: S) -> bool {
        self.registry.borrow_mut().clear_gate(state).is_some()
    }

    /// Gate every transition on `(from, to)`, replacing any previous global gate.
    pub fn set_global_gate<F>(&self, gate: F)
    where
        F: Fn(S, S) -> bool + 'static,
    {
        self.set_global_guard(TransitionGuard::new(gate));
    }

    /// Install a prebuilt global gate, e.g. from [`allow_only`](crate::core::allow_only).
    pub fn set_global_guard(&self, guard: TransitionGuard<S>) {
        self.registry.borrow_mut().set_global_gate(Some(guard));
    }

    pub fn clear_global_gate(&self) {
        self.registry.borrow_mut().set_global_gate(None);
    }

    /// Subscribe to committed state changes, called with `(from, to)`.
    ///
    /// Subscribers added or removed during a notification take effect from
    /// the next notification.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(S, S) + 'static,
    {
        self.registry.borrow_mut().subscribe(Rc::new(handler))
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.borrow_mut().unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().subscriber_count()
    }

    /// Snapshot of recently committed transitions.
    pub fn history(&self) -> StateHistory<S> {
        self.history.borrow().clone()
    }

    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }

    fn gates_allow(&self, from: S, to: S) -> bool {
        let (global, gate) = {
            let registry = self.registry.borrow();
            (registry.global_gate(), registry.gate(to))
        };

        if let Some(global) = global {
            if !global.check(from, to) {
                return false;
            }
        }

        gate.map_or(true, |g| g.check())
    }
}

impl<S: State> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("state", &self.current.get())
            .field("previous", &self.previous.get())
            .field("refresh_on_same_state", &self.refresh_on_same_state.get())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

/// Check that `S::VARIANTS` is a well-formed table containing `initial`,
/// returning the ordinal of `initial`.
fn validate_domain<S: State>(initial: S) -> Result<usize, StateMachineError> {
    let invalid = |reason: String| StateMachineError::InvalidConfiguration {
        type_name: std::any::type_name::<S>(),
        reason,
    };

    if S::VARIANTS.is_empty() {
        return Err(invalid("no variants declared".to_string()));
    }

    let mut seen = HashSet::with_capacity(S::VARIANTS.len());
    let mut names = HashSet::with_capacity(S::VARIANTS.len());
    for variant in S::VARIANTS {
        if !seen.insert(*variant) {
            return Err(invalid(format!("variant {variant:?} declared twice")));
        }
        if !names.insert(variant.name()) {
            return Err(invalid(format!("name '{}' used twice", variant.name())));
        }
    }

    initial
        .index()
        .ok_or_else(|| invalid(format!("initial state {initial:?} is not a declared variant")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    crate::state_enum! {
        enum Panel {
            Hidden,
            Shown,
            Expanded,
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    fn new_log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn push(log: &Log, entry: &str) -> impl Fn() + 'static {
        let log = Rc::clone(log);
        let entry = entry.to_string();
        move || log.borrow_mut().push(entry.clone())
    }

    #[test]
    fn new_starts_in_initial_without_callbacks() {
        let machine = StateMachine::new(Panel::Shown).unwrap();
        assert_eq!(machine.state(), Panel::Shown);
        assert_eq!(machine.state_index(), 1);
        assert_eq!(machine.previous_state(), None);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn same_state_without_refresh_is_noop() {
        let log = new_log();
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        machine.on_enter(Panel::Hidden, push(&log, "enter"));
        machine.on_exit(Panel::Hidden, push(&log, "exit"));
        let notified = Rc::new(Cell::new(0));
        let counter = Rc::clone(&notified);
        machine.subscribe(move |_, _| counter.set(counter.get() + 1));

        assert_eq!(
            machine.set_state(Panel::Hidden),
            Transition::Unchanged(Panel::Hidden)
        );
        assert!(log.borrow().is_empty());
        assert_eq!(notified.get(), 0);
    }

    #[test]
    fn same_state_with_refresh_reruns_enter_only() {
        let log = new_log();
        let machine = StateMachine::with_config(
            Panel::Hidden,
            MachineConfig {
                refresh_on_same_state: true,
                ..MachineConfig::default()
            },
        )
        .unwrap();
        machine.on_enter(Panel::Hidden, push(&log, "enter1"));
        machine.on_enter(Panel::Hidden, push(&log, "enter2"));
        machine.on_exit(Panel::Hidden, push(&log, "exit"));
        machine.set_gate(Panel::Hidden, || false);

        assert_eq!(
            machine.set_state(Panel::Hidden),
            Transition::Refreshed(Panel::Hidden)
        );
        assert_eq!(*log.borrow(), vec!["enter1", "enter2"]);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn refresh_flag_takes_effect_immediately() {
        let log = new_log();
        let machine = StateMachine::new(Panel::Shown).unwrap();
        machine.on_enter(Panel::Shown, push(&log, "enter"));

        machine.set_state(Panel::Shown);
        assert!(log.borrow().is_empty());

        machine.set_refresh_on_same_state(true);
        assert!(machine.refresh_on_same_state());
        machine.set_state(Panel::Shown);
        assert_eq!(*log.borrow(), vec!["enter"]);
    }

    #[test]
    fn explicit_refresh_skips_exit_and_notification() {
        let log = new_log();
        let machine = StateMachine::new(Panel::Shown).unwrap();
        machine.on_enter(Panel::Shown, push(&log, "enter"));
        machine.on_exit(Panel::Shown, push(&log, "exit"));
        let sub_log = Rc::clone(&log);
        machine.subscribe(move |_, _| sub_log.borrow_mut().push("notify".to_string()));

        machine.refresh();

        assert_eq!(*log.borrow(), vec!["enter"]);
        assert_eq!(machine.state(), Panel::Shown);
    }

    #[test]
    fn transition_runs_in_fixed_order() {
        let log = new_log();
        let machine = Rc::new(StateMachine::new(Panel::Hidden).unwrap());

        let weak = Rc::downgrade(&machine);
        let exit_log = Rc::clone(&log);
        machine.on_exit(Panel::Hidden, move || {
            let state = weak.upgrade().map(|m| m.state());
            exit_log.borrow_mut().push(format!("exit {state:?}"));
        });

        let weak = Rc::downgrade(&machine);
        let sub_log = Rc::clone(&log);
        machine.subscribe(move |from, to| {
            let state = weak.upgrade().map(|m| m.state());
            sub_log
                .borrow_mut()
                .push(format!("notify {from:?}->{to:?} in {state:?}"));
        });

        let weak = Rc::downgrade(&machine);
        let enter_log = Rc::clone(&log);
        machine.on_enter(Panel::Shown, move || {
            let state = weak.upgrade().map(|m| m.state());
            enter_log.borrow_mut().push(format!("enter {state:?}"));
        });

        let outcome = machine.set_state(Panel::Shown);

        assert_eq!(
            outcome,
            Transition::Changed {
                from: Panel::Hidden,
                to: Panel::Shown
            }
        );
        assert_eq!(
            *log.borrow(),
            vec![
                "exit Some(Hidden)",
                "notify Hidden->Shown in Some(Shown)",
                "enter Some(Shown)",
            ]
        );
    }

    #[test]
    fn global_gate_vetoes_before_state_gate() {
        let log = new_log();
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        let gate_log = Rc::clone(&log);
        machine.set_gate(Panel::Expanded, move || {
            gate_log.borrow_mut().push("state gate".to_string());
            true
        });
        machine.set_global_gate(|from, to| !(from == Panel::Hidden && to == Panel::Expanded));
        machine.on_exit(Panel::Hidden, push(&log, "exit"));

        let outcome = machine.set_state(Panel::Expanded);

        assert_eq!(
            outcome,
            Transition::Vetoed {
                from: Panel::Hidden,
                to: Panel::Expanded
            }
        );
        assert!(log.borrow().is_empty());
        assert_eq!(machine.state(), Panel::Hidden);
    }

    #[test]
    fn global_gate_receives_endpoints() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        let record = Rc::clone(&seen);
        machine.set_global_gate(move |from, to| {
            record.borrow_mut().push((from, to));
            true
        });

        machine.set_state(Panel::Shown);
        machine.set_state(Panel::Expanded);

        assert_eq!(
            *seen.borrow(),
            vec![
                (Panel::Hidden, Panel::Shown),
                (Panel::Shown, Panel::Expanded)
            ]
        );
    }

    #[test]
    fn later_gate_replaces_earlier() {
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        machine.set_gate(Panel::Shown, || false);
        machine.set_gate(Panel::Shown, || true);

        assert!(machine.set_state(Panel::Shown).is_changed());
    }

    #[test]
    fn later_global_gate_replaces_earlier() {
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        machine.set_global_gate(|_, _| false);
        machine.set_global_gate(|_, _| true);

        assert!(machine.set_state(Panel::Shown).is_changed());
    }

    #[test]
    fn cleared_gates_no_longer_veto() {
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        machine.set_gate(Panel::Shown, || false);
        machine.set_global_gate(|_, _| false);

        assert!(!machine.set_state(Panel::Shown).is_changed());

        machine.clear_global_gate();
        assert!(machine.clear_gate(Panel::Shown));
        assert!(!machine.clear_gate(Panel::Shown));
        assert!(machine.set_state(Panel::Shown).is_changed());
    }

    #[test]
    fn unsubscribed_handler_is_not_called() {
        let calls = Rc::new(Cell::new(0));
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        let counter = Rc::clone(&calls);
        let id = machine.subscribe(move |_, _| counter.set(counter.get() + 1));
        let counter = Rc::clone(&calls);
        machine.subscribe(move |_, _| counter.set(counter.get() + 10));

        machine.set_state(Panel::Shown);
        assert_eq!(calls.get(), 11);

        assert!(machine.unsubscribe(id));
        assert_eq!(machine.subscriber_count(), 1);
        machine.set_state(Panel::Hidden);
        assert_eq!(calls.get(), 21);
    }

    #[test]
    fn registration_during_transition_applies_next_time() {
        let log = new_log();
        let machine = Rc::new(StateMachine::new(Panel::Hidden).unwrap());

        let weak = Rc::downgrade(&machine);
        let late_log = Rc::clone(&log);
        machine.on_enter(Panel::Shown, move || {
            late_log.borrow_mut().push("enter".to_string());
            if let Some(m) = weak.upgrade() {
                m.on_enter(Panel::Shown, push(&late_log, "late enter"));
            }
        });

        machine.set_state(Panel::Shown);
        assert_eq!(*log.borrow(), vec!["enter"]);

        machine.set_state(Panel::Hidden);
        machine.set_state(Panel::Shown);
        assert_eq!(*log.borrow(), vec!["enter", "enter", "late enter"]);
    }

    #[test]
    fn nested_transition_completes_before_outer_enter() {
        let log = new_log();
        let machine = Rc::new(StateMachine::new(Panel::Hidden).unwrap());

        let weak = Rc::downgrade(&machine);
        let sub_log = Rc::clone(&log);
        machine.subscribe(move |from, to| {
            sub_log.borrow_mut().push(format!("{from:?}->{to:?}"));
            if to == Panel::Shown {
                if let Some(m) = weak.upgrade() {
                    m.set_state(Panel::Expanded);
                }
            }
        });
        machine.on_enter(Panel::Shown, push(&log, "enter Shown"));
        machine.on_enter(Panel::Expanded, push(&log, "enter Expanded"));

        machine.set_state(Panel::Shown);

        assert_eq!(
            *log.borrow(),
            vec![
                "Hidden->Shown",
                "Shown->Expanded",
                "enter Expanded",
                "enter Shown"
            ]
        );
        assert_eq!(machine.state(), Panel::Expanded);
    }

    #[test]
    fn set_state_index_resolves_ordinal() {
        let machine = StateMachine::new(Panel::Hidden).unwrap();

        let outcome = machine.set_state_index(2).unwrap();

        assert_eq!(outcome.state(), Panel::Expanded);
        assert_eq!(machine.state(), Panel::Expanded);
        assert_eq!(machine.names(), vec!["Hidden", "Shown", "Expanded"]);
    }

    #[test]
    fn set_state_index_rejects_out_of_range() {
        let machine = StateMachine::new(Panel::Shown).unwrap();

        let err = machine.set_state_index(3).unwrap_err();

        assert_eq!(err, StateMachineError::InvalidArgument { index: 3, len: 3 });
        assert_eq!(machine.state(), Panel::Shown);
    }

    #[test]
    fn history_tracks_committed_transitions_only() {
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        machine.set_gate(Panel::Expanded, || false);

        machine.set_state(Panel::Shown);
        machine.set_state(Panel::Expanded);
        machine.set_state(Panel::Shown);
        machine.set_state(Panel::Hidden);

        let history = machine.history();
        assert_eq!(
            history.path(),
            vec![Panel::Hidden, Panel::Shown, Panel::Hidden]
        );
        assert_eq!(machine.previous_state(), Some(Panel::Shown));

        machine.clear_history();
        assert!(machine.history().is_empty());
    }

    #[test]
    fn zero_history_capacity_disables_recording() {
        let machine = StateMachine::with_config(
            Panel::Hidden,
            MachineConfig {
                history_capacity: 0,
                ..MachineConfig::default()
            },
        )
        .unwrap();

        machine.set_state(Panel::Shown);

        assert!(machine.history().is_empty());
        assert_eq!(machine.previous_state(), Some(Panel::Hidden));
    }

    #[test]
    fn panic_in_exit_leaves_old_state() {
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        let notified = Rc::new(Cell::new(false));
        let flag = Rc::clone(&notified);
        machine.subscribe(move |_, _| flag.set(true));
        machine.on_exit(Panel::Hidden, || panic!("exit failed"));

        let result = panic::catch_unwind(AssertUnwindSafe(|| machine.set_state(Panel::Shown)));

        assert!(result.is_err());
        assert_eq!(machine.state(), Panel::Hidden);
        assert!(!notified.get());
    }

    #[test]
    fn panic_in_subscriber_leaves_new_state_committed() {
        let log = new_log();
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        machine.subscribe(|_, _| panic!("subscriber failed"));
        machine.on_enter(Panel::Shown, push(&log, "enter"));

        let result = panic::catch_unwind(AssertUnwindSafe(|| machine.set_state(Panel::Shown)));

        assert!(result.is_err());
        assert_eq!(machine.state(), Panel::Shown);
        assert!(log.borrow().is_empty());

        // The machine stays usable after the unwind.
        machine.on_enter(Panel::Hidden, push(&log, "enter hidden"));
        machine.set_state(Panel::Hidden);
        assert_eq!(machine.state(), Panel::Hidden);
    }

    #[test]
    fn panic_in_gate_leaves_old_state() {
        let log = new_log();
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        machine.on_exit(Panel::Hidden, push(&log, "exit"));
        machine.set_gate(Panel::Shown, || panic!("gate failed"));

        let result = panic::catch_unwind(AssertUnwindSafe(|| machine.set_state(Panel::Shown)));

        assert!(result.is_err());
        assert_eq!(machine.state(), Panel::Hidden);
        assert!(log.borrow().is_empty());
        assert!(machine.history().is_empty());
    }

    #[test]
    fn panic_in_enter_leaves_new_state_committed() {
        let log = new_log();
        let machine = StateMachine::new(Panel::Hidden).unwrap();
        machine.on_enter(Panel::Shown, push(&log, "enter 1"));
        machine.on_enter(Panel::Shown, || panic!("enter failed"));
        machine.on_enter(Panel::Shown, push(&log, "enter 3"));
        let sub_log = Rc::clone(&log);
        machine.subscribe(move |_, _| sub_log.borrow_mut().push("notify".to_string()));

        let result = panic::catch_unwind(AssertUnwindSafe(|| machine.set_state(Panel::Shown)));

        assert!(result.is_err());
        assert_eq!(machine.state(), Panel::Shown);
        assert_eq!(machine.state_index(), 1);
        assert_eq!(*log.borrow(), vec!["notify", "enter 1"]);
        assert_eq!(machine.history().len(), 1);
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum Partial {
        Listed,
        Other,
        Unlisted,
    }

    impl State for Partial {
        const VARIANTS: &'static [Self] = &[Self::Listed, Self::Other];

        fn name(&self) -> &'static str {
            match self {
                Self::Listed => "Listed",
                Self::Other => "Other",
                Self::Unlisted => "Unlisted",
            }
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum Undeclared {
        Only,
    }

    impl State for Undeclared {
        const VARIANTS: &'static [Self] = &[];

        fn name(&self) -> &'static str {
            "Only"
        }
    }

    #[test]
    fn new_rejects_empty_table() {
        let err = StateMachine::new(Undeclared::Only).unwrap_err();
        match err {
            StateMachineError::InvalidConfiguration { reason, .. } => {
                assert_eq!(reason, "no variants declared");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum Aliased {
        First,
        Second,
    }

    impl State for Aliased {
        const VARIANTS: &'static [Self] = &[Self::First, Self::Second];

        fn name(&self) -> &'static str {
            "Same"
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum Doubled {
        Once,
        Twice,
    }

    impl State for Doubled {
        const VARIANTS: &'static [Self] = &[Self::Once, Self::Twice, Self::Twice];

        fn name(&self) -> &'static str {
            match self {
                Self::Once => "Once",
                Self::Twice => "Twice",
            }
        }
    }

    #[test]
    fn new_rejects_repeated_variant() {
        let err = StateMachine::new(Doubled::Once).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn new_rejects_unlisted_initial() {
        let err = StateMachine::new(Partial::Unlisted).unwrap_err();
        assert!(matches!(
            err,
            StateMachineError::InvalidConfiguration { .. }
        ));
        assert!(StateMachine::new(Partial::Listed).is_ok());
    }

    #[test]
    fn set_state_rejects_unlisted_target() {
        let log = new_log();
        let machine = StateMachine::new(Partial::Other).unwrap();
        machine.on_exit(Partial::Other, push(&log, "exit"));
        machine.on_enter(Partial::Unlisted, push(&log, "enter"));
        let gate_log = Rc::clone(&log);
        machine.set_global_gate(move |_, _| {
            gate_log.borrow_mut().push("gate".to_string());
            true
        });

        let outcome = machine.set_state(Partial::Unlisted);

        assert_eq!(
            outcome,
            Transition::Vetoed {
                from: Partial::Other,
                to: Partial::Unlisted
            }
        );
        assert_eq!(machine.state(), Partial::Other);
        assert_eq!(machine.state_index(), 1);
        assert!(log.borrow().is_empty());
        assert!(machine.history().is_empty());
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let err = StateMachine::new(Aliased::First).unwrap_err();
        match err {
            StateMachineError::InvalidConfiguration { reason, .. } => {
                assert!(reason.contains("Same"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum Legacy {
        Old,
        Renamed,
    }

    impl State for Legacy {
        const VARIANTS: &'static [Self] = &[Self::Old, Self::Renamed];

        fn name(&self) -> &'static str {
            match self {
                Self::Old => "Old",
                Self::Renamed => "Renamed",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            match name {
                "Old" => Some(Self::Old),
                _ => None,
            }
        }
    }

    #[test]
    fn set_state_index_reports_unresolvable_name() {
        let machine = StateMachine::new(Legacy::Old).unwrap();

        let err = machine.set_state_index(1).unwrap_err();

        assert_eq!(
            err,
            StateMachineError::ResolutionFailure {
                index: 1,
                name: "Renamed"
            }
        );
        assert_eq!(machine.state(), Legacy::Old);
    }
}
