//! The driver that polls a layout.
//!
//! A [`FiniteStateMachine`] owns a [`Layout`](crate::core::Layout) and moves
//! through it one [`track`](FiniteStateMachine::track) call at a time. All
//! execution happens on the caller's thread; hooks must not block.

mod fsm;
mod operational;
mod options;

pub use fsm::FiniteStateMachine;
pub use operational::OperationalState;
pub use options::{RunOptions, StopHandle};
