//! Build errors for machine and transition builders.

use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Transition target state not specified. Call .to(state)")]
    MissingTarget,

    #[error("Transition condition not specified. Call .when(condition)")]
    MissingCondition,

    #[error("Layout not specified. Call .layout(layout) before .build()")]
    MissingLayout,
}
