//! Builder API for ergonomic machine construction.
//!
//! Fluent builders for transitions and machines, plus helpers for the
//! transition shapes most layouts are made of.

pub mod error;
pub mod machine;
pub mod transition;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Condition, Layout, StateId, Transition};
use crate::error::FsmError;
use std::time::Duration;

/// Add an unconditional transition `from → to`.
///
/// # Example
///
/// ```
/// use statebot::builder::always_transition;
/// use statebot::core::{Layout, State};
///
/// let mut layout = Layout::new();
/// let start = layout.add_state(State::new("start"));
/// let end = layout.add_state(State::new("end"));
///
/// let index = always_transition(&mut layout, start, end).unwrap();
/// assert_eq!(layout.transition(start, index).unwrap().target(), end);
/// ```
pub fn always_transition(
    layout: &mut Layout,
    from: StateId,
    to: StateId,
) -> Result<usize, FsmError> {
    let condition = layout.add_condition(Condition::always_true())?;
    layout.add_transition(from, Transition::new(to, condition))
}

/// Add a transition `from → to` firing once `from` has been occupied for
/// longer than `duration`. `from` must be monitored.
///
/// # Example
///
/// ```
/// use statebot::builder::timed_transition;
/// use statebot::core::{Layout, State};
/// use std::time::Duration;
///
/// let mut layout = Layout::new();
/// let green = layout.add_state(State::monitored("green"));
/// let yellow = layout.add_state(State::monitored("yellow"));
///
/// timed_transition(&mut layout, green, yellow, Duration::from_secs(4)).unwrap();
/// ```
pub fn timed_transition(
    layout: &mut Layout,
    from: StateId,
    to: StateId,
    duration: Duration,
) -> Result<usize, FsmError> {
    let condition = layout.add_condition(Condition::state_entry_duration(duration, from))?;
    layout.add_transition(from, Transition::new(to, condition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::core::State;
    use std::rc::Rc;

    #[test]
    fn timed_transition_requires_monitored_source() {
        let mut layout = Layout::new();
        let plain = layout.add_state(State::new("plain"));
        let other = layout.add_state(State::new("other"));

        let result = timed_transition(&mut layout, plain, other, Duration::from_secs(1));
        assert!(matches!(result, Err(FsmError::InvalidArgument(_))));
    }

    #[test]
    fn timed_transition_waits_for_duration() {
        let clock = Rc::new(ManualClock::new());
        let mut layout = Layout::with_clock(clock.clone());
        let from = layout.add_state(State::monitored("from"));
        let to = layout.add_state(State::new("to"));
        timed_transition(&mut layout, from, to, Duration::from_secs(2)).unwrap();

        layout.exec_entering_action(from).unwrap();
        assert_eq!(layout.first_transiting(from), None);

        clock.advance(Duration::from_millis(2001));
        assert_eq!(layout.first_transiting(from), Some(0));
    }

    #[test]
    fn always_transition_fires_immediately() {
        let mut layout = Layout::new();
        let from = layout.add_state(State::new("from"));
        let to = layout.add_state(State::new("to"));
        always_transition(&mut layout, from, to).unwrap();

        assert_eq!(layout.first_transiting(from), Some(0));
    }
}
