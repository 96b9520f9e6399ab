//! Lifecycle phase of the driver itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational state of a [`FiniteStateMachine`](super::FiniteStateMachine).
///
/// `Uninitialized → Idle → Running → (Idle | TerminalReached)`;
/// `TerminalReached` is absorbing until the next `reset()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalState {
    #[default]
    Uninitialized,
    Idle,
    Running,
    TerminalReached,
}

impl OperationalState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::TerminalReached => "TerminalReached",
        }
    }

    /// Whether polling can no longer move the machine.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::TerminalReached)
    }
}

impl fmt::Display for OperationalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
