//! Runtime configuration for a state machine.

use serde::{Deserialize, Serialize};

/// Number of committed transitions kept by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// Tunables applied when a machine is constructed.
///
/// Missing fields fall back to their defaults, so a host can load a partial
/// configuration from its own data files.
///
/// # Example
///
/// ```rust
/// use stateflow::MachineConfig;
///
/// let config: MachineConfig = serde_json::from_str(r#"{ "refresh_on_same_state": true }"#).unwrap();
/// assert!(config.refresh_on_same_state);
/// assert_eq!(config.history_capacity, stateflow::DEFAULT_HISTORY_CAPACITY);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Re-run enter callbacks when the requested state is already current.
    pub refresh_on_same_state: bool,
    /// Committed transitions to retain; 0 disables history.
    pub history_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            refresh_on_same_state: false,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
