//! Behavioral graph types.
//!
//! This module contains the data side of the engine:
//! - States with lifecycle hooks and optional monitoring
//! - Conditions guarding transitions
//! - The [`Layout`] arena that owns both and hands out handles
//! - Bounded transition history
//!
//! Nothing here decides *when* to move; that is the job of
//! [`FiniteStateMachine`](crate::machine::FiniteStateMachine).

mod condition;
mod history;
mod layout;
mod state;
mod transition;

pub use condition::{Condition, ConditionKind};
pub use history::{
    TransitionCause, TransitionHistory, TransitionRecord, DEFAULT_HISTORY_CAPACITY,
};
pub use layout::{ConditionId, Layout, StateId};
pub use state::{Action, Monitor, Parameters, State};
pub use transition::{Transition, TransitionMonitor};
