//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::core::{Layout, TransitionHistory, DEFAULT_HISTORY_CAPACITY};
use crate::error::FsmError;
use crate::machine::FiniteStateMachine;

/// Builder for configuring a [`FiniteStateMachine`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use statebot::core::{Condition, Layout, State, Transition};
/// use statebot::machine::{FiniteStateMachine, OperationalState};
///
/// let mut layout = Layout::new();
/// let ping = layout.add_state(State::new("ping"));
/// let pong = layout.add_state(State::new("pong"));
/// let go = layout.add_condition(Condition::always_true()).unwrap();
/// layout.add_transition(ping, Transition::new(pong, go)).unwrap();
/// layout.add_transition(pong, Transition::new(ping, go)).unwrap();
/// layout.set_initial_state(ping).unwrap();
///
/// let machine = FiniteStateMachine::builder()
///     .layout(layout)
///     .history_capacity(8)
///     .validated(true)
///     .start(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.current_operational_state(), OperationalState::Idle);
/// assert_eq!(machine.current_applicative_state(), Some(ping));
/// ```
#[derive(Debug)]
pub struct MachineBuilder {
    layout: Option<Layout>,
    history_capacity: usize,
    start: bool,
    validated: bool,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self {
            layout: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            start: false,
            validated: false,
        }
    }

    /// Set the layout to drive (required).
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Number of transitions kept in the history; 0 disables it.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Reset the machine as part of building it.
    pub fn start(mut self, start: bool) -> Self {
        self.start = start;
        self
    }

    /// Refuse to build over a layout that does not validate.
    pub fn validated(mut self, validated: bool) -> Self {
        self.validated = validated;
        self
    }

    /// Build the machine.
    pub fn build(self) -> Result<FiniteStateMachine, FsmError> {
        let layout = self.layout.ok_or(BuildError::MissingLayout)?;

        if self.validated {
            layout.ensure_valid()?;
        }

        let history = TransitionHistory::with_capacity(self.history_capacity);
        let mut machine = FiniteStateMachine::with_history(layout, history);
        if self.start {
            machine.reset()?;
        }
        Ok(machine)
    }
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
