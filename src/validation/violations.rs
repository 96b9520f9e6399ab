//! Problems a layout can have.

use crate::core::StateId;
use thiserror::Error;

/// A structural problem found while validating a [`Layout`](crate::core::Layout).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutViolation {
    #[error("No initial state is designated")]
    MissingInitialState,

    #[error("Non-terminal state '{name}' ({state}) has no outgoing transitions")]
    NoTransitions { state: StateId, name: String },
}
