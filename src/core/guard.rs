//! Gate predicates for vetoing state transitions.
//!
//! Gates run before any callback or mutation. A gate returning `false`
//! cancels the transition silently.

use super::state::State;
use std::fmt;
use std::rc::Rc;

/// Per-state gate: decides whether its state may currently be entered.
///
/// # Example
///
/// ```rust
/// use stateflow::core::Guard;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let unlocked = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&unlocked);
/// let guard = Guard::new(move || flag.get());
///
/// assert!(!guard.check());
/// unlocked.set(true);
/// assert!(guard.check());
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Rc<dyn Fn() -> bool>,
}

impl Guard {
    /// Create a gate from a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Guard {
            predicate: Rc::new(predicate),
        }
    }

    /// Evaluate the predicate.
    pub fn check(&self) -> bool {
        (self.predicate)()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

/// Global gate consulted for every transition with `(from, to)`.
///
/// # Example
///
/// ```rust
/// use stateflow::core::TransitionGuard;
///
/// // Only allow moving forward through an ordered progression.
/// let forward_only = TransitionGuard::new(|from: u8, to: u8| to > from);
///
/// assert!(forward_only.check(1, 2));
/// assert!(!forward_only.check(2, 1));
/// ```
pub struct TransitionGuard<S> {
    predicate: Rc<dyn Fn(S, S) -> bool>,
}

impl<S> TransitionGuard<S> {
    /// Create a global gate from a predicate over `(from, to)`.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(S, S) -> bool + 'static,
    {
        TransitionGuard {
            predicate: Rc::new(predicate),
        }
    }

    /// Evaluate the predicate for a transition from `from` to `to`.
    pub fn check(&self, from: S, to: S) -> bool {
        (self.predicate)(from, to)
    }
}

impl<S> Clone for TransitionGuard<S> {
    fn clone(&self) -> Self {
        Self {
            predicate: Rc::clone(&self.predicate),
        }
    }
}

impl<S> fmt::Debug for TransitionGuard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionGuard").finish_non_exhaustive()
    }
}

/// Guard that only admits transitions listed in `allowed`.
///
/// Handy for declaring a fixed transition table as the global gate.
pub fn allow_only<S: State>(allowed: &[(S, S)]) -> TransitionGuard<S> {
    let allowed = allowed.to_vec();
    TransitionGuard::new(move |from, to| allowed.contains(&(from, to)))
}
