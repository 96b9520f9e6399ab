//! Statebot: a polled, hierarchical state-machine engine for robot behaviors
//!
//! A behavior is described as a graph of states joined by guarded
//! transitions. The graph is owned by a [`Layout`] and driven one poll at a
//! time by a [`FiniteStateMachine`]; applications decide when to poll.
//!
//! # Core Concepts
//!
//! - **State**: a node carrying entering, in-state and exiting hooks, and
//!   optionally a monitor of its entries and a custom value
//! - **Condition**: a boolean predicate (constant, timed, entry count,
//!   custom value, or a composite of other conditions)
//! - **Transition**: an edge to a target state guarded by a condition
//! - **Clock**: the time source behind every timed condition; swap in
//!   [`ManualClock`](clock::ManualClock) to simulate time in tests
//!
//! # Example
//!
//! ```rust
//! use statebot::builder::timed_transition;
//! use statebot::clock::ManualClock;
//! use statebot::core::{Layout, State};
//! use statebot::machine::FiniteStateMachine;
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! let clock = Rc::new(ManualClock::new());
//! let mut layout = Layout::with_clock(clock.clone());
//! let green = layout.add_state(State::monitored("green"));
//! let yellow = layout.add_state(State::monitored("yellow"));
//! let red = layout.add_state(State::monitored("red"));
//! timed_transition(&mut layout, green, yellow, Duration::from_secs(4)).unwrap();
//! timed_transition(&mut layout, yellow, red, Duration::from_secs(1)).unwrap();
//! timed_transition(&mut layout, red, green, Duration::from_secs(5)).unwrap();
//! layout.set_initial_state(green).unwrap();
//!
//! let mut machine = FiniteStateMachine::initialized(layout).unwrap();
//!
//! clock.advance(Duration::from_millis(4001));
//! machine.track().unwrap();
//! assert_eq!(machine.current_applicative_state(), Some(yellow));
//! ```

pub mod blinker;
pub mod builder;
pub mod clock;
pub mod core;
pub mod error;
pub mod machine;
pub mod validation;

// Re-export commonly used types
pub use crate::core::{Condition, Layout, Parameters, State, StateId, Transition};
pub use error::{FsmError, HookError, HookResult};
pub use machine::{FiniteStateMachine, OperationalState, RunOptions};
