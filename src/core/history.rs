//! State transition history tracking.
//!
//! Keeps the most recent committed transitions in a bounded buffer. Refreshes
//! and vetoed requests never reach the history.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

/// Errors raised when loading a serialized history.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history holds {len} transitions but its capacity is {capacity}")]
    CapacityExceeded { len: usize, capacity: usize },
}

/// Record of a single committed transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange<S> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

impl<S: State> StateChange<S> {
    /// Record a change from `from` to `to` happening now.
    pub fn now(from: S, to: S) -> Self {
        Self {
            from,
            to,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded, ordered history of committed transitions.
///
/// Once `capacity` entries are stored, recording a new one evicts the oldest.
/// A capacity of zero records nothing.
///
/// # Example
///
/// ```rust
/// use stateflow::core::{StateChange, StateHistory};
/// use stateflow::state_enum;
///
/// state_enum! {
///     enum Phase { One, Two, Three }
/// }
///
/// let mut history = StateHistory::with_capacity(2);
/// history.record(StateChange::now(Phase::One, Phase::Two));
/// history.record(StateChange::now(Phase::Two, Phase::Three));
/// history.record(StateChange::now(Phase::Three, Phase::One));
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.path(), vec![Phase::Two, Phase::Three, Phase::One]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "HistoryData<S>",
    bound(deserialize = "S: Deserialize<'de>")
)]
pub struct StateHistory<S> {
    capacity: usize,
    transitions: VecDeque<StateChange<S>>,
}

/// Unchecked wire form of [`StateHistory`].
#[derive(Deserialize)]
struct HistoryData<S> {
    capacity: usize,
    transitions: VecDeque<StateChange<S>>,
}

impl<S> TryFrom<HistoryData<S>> for StateHistory<S> {
    type Error = HistoryError;

    fn try_from(data: HistoryData<S>) -> Result<Self, Self::Error> {
        if data.transitions.len() > data.capacity {
            return Err(HistoryError::CapacityExceeded {
                len: data.transitions.len(),
                capacity: data.capacity,
            });
        }
        Ok(Self {
            capacity: data.capacity,
            transitions: data.transitions,
        })
    }
}

impl<S: State> StateHistory<S> {
    /// Create an empty history holding at most `capacity` transitions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            transitions: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    /// Maximum number of retained transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a transition, evicting the oldest when full.
    pub fn record(&mut self, change: StateChange<S>) {
        if self.capacity == 0 {
            return;
        }
        while self.transitions.len() >= self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(change);
    }

    /// Number of retained transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Most recent transition, if any.
    pub fn last(&self) -> Option<&StateChange<S>> {
        self.transitions.back()
    }

    /// Retained transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &StateChange<S>> {
        self.transitions.iter()
    }

    /// Drop every retained transition.
    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    /// States traversed: the `from` of the oldest retained transition, then
    /// the `to` of each transition.
    pub fn path(&self) -> Vec<S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Time between the oldest and newest retained transitions.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.front()?;
        let last = self.transitions.back()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}
