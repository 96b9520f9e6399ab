//! Reusable on/off/blink timing patterns built on the core primitives.
//!
//! A [`Blinker`] is a [`FiniteStateMachine`](crate::machine::FiniteStateMachine)
//! over a generated graph; [`SideBlinkers`] pairs two of them.

#[allow(clippy::module_inception)]
mod blinker;
mod options;
mod side;

pub use blinker::{Blinker, BlinkerStates};
pub use options::{BlinkOptions, BlinkPlan};
pub use side::{Side, SideBlinkers};
