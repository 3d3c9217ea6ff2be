//! Core State trait for state machine states.
//!
//! A state type is a closed enumeration: every member is listed once in
//! [`State::VARIANTS`], in declaration order. The ordinal and name helpers
//! are all derived from that table.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// Usually generated by [`state_enum!`](crate::state_enum), but it can be
/// implemented by hand. Hand-written tables are validated when a
/// [`StateMachine`](crate::StateMachine) is constructed.
///
/// # Example
///
/// ```rust
/// use stateflow::core::State;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum ButtonState {
///     Normal,
///     Hovered,
///     Pressed,
/// }
///
/// impl State for ButtonState {
///     const VARIANTS: &'static [Self] = &[Self::Normal, Self::Hovered, Self::Pressed];
///
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Normal => "Normal",
///             Self::Hovered => "Hovered",
///             Self::Pressed => "Pressed",
///         }
///     }
/// }
///
/// assert_eq!(ButtonState::names(), vec!["Normal", "Hovered", "Pressed"]);
/// assert_eq!(ButtonState::from_index(2), Some(ButtonState::Pressed));
/// assert_eq!(ButtonState::Hovered.index(), Some(1));
/// ```
pub trait State: Copy + Eq + Hash + Debug + 'static {
    /// Every member of the enumeration, in declaration order.
    const VARIANTS: &'static [Self];

    /// The member's declared name.
    fn name(&self) -> &'static str;

    /// Member names in declaration order.
    fn names() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(State::name).collect()
    }

    /// Resolve a zero-based ordinal to a member.
    fn from_index(index: usize) -> Option<Self> {
        Self::VARIANTS.get(index).copied()
    }

    /// Resolve a declared name to a member.
    fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|s| s.name() == name)
    }

    /// Ordinal of this member in declaration order.
    fn index(&self) -> Option<usize> {
        Self::VARIANTS.iter().position(|s| s == self)
    }
}
