//! Engine-wide error type.

use crate::builder::BuildError;
use std::fmt;
use thiserror::Error;

/// Error raised by an application-supplied hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by hooks.
pub type HookResult = Result<(), HookError>;

/// Which lifecycle hook was running when a failure surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookPhase {
    Entering,
    InState,
    Exiting,
    Transiting,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Entering => "entering",
            Self::InState => "in-state",
            Self::Exiting => "exiting",
            Self::Transiting => "transiting",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by layouts and machines.
#[derive(Debug, Error)]
pub enum FsmError {
    /// A handle or value that cannot be used where it was passed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The graph is not well formed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The machine was polled before `reset()` gave it an applicative state.
    #[error("State machine is uninitialized. Call reset() first")]
    Uninitialized,

    /// An application hook failed; the current step was aborted.
    #[error("{phase} action of state '{state}' failed: {source}")]
    HookFailed {
        state: String,
        phase: HookPhase,
        #[source]
        source: HookError,
    },

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl FsmError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}
