//! The polling driver.

use super::operational::OperationalState;
use super::options::{RunOptions, StopHandle};
use crate::builder::MachineBuilder;
use crate::core::{
    Layout, State, StateId, TransitionCause, TransitionHistory, TransitionRecord,
};
use crate::error::FsmError;
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{debug, info, trace};

/// Drives a [`Layout`] one poll at a time.
///
/// The machine owns its layout and tracks two things: the applicative state
/// (which node of the graph it occupies) and its own operational state.
/// Every executed transition is appended to a bounded [`TransitionHistory`],
/// stamped with the layout's clock so simulated time shows up in the records.
///
/// # Example
///
/// ```rust
/// use statebot::core::{Condition, Layout, Parameters, State, Transition};
/// use statebot::machine::{FiniteStateMachine, OperationalState, RunOptions};
///
/// let mut layout = Layout::new();
/// let start = layout.add_state(State::new("start"));
/// let done = layout.add_state(State::new("done").with_parameters(Parameters::terminal()));
/// let go = layout.add_condition(Condition::always_true()).unwrap();
/// layout.add_transition(start, Transition::new(done, go)).unwrap();
/// layout.set_initial_state(start).unwrap();
///
/// let mut machine = FiniteStateMachine::new(layout);
/// let outcome = machine.run(RunOptions::default()).unwrap();
///
/// assert_eq!(outcome, OperationalState::TerminalReached);
/// assert_eq!(machine.current_applicative_state(), Some(done));
/// ```
#[derive(Debug)]
pub struct FiniteStateMachine {
    layout: Layout,
    operational_state: OperationalState,
    applicative_state: Option<StateId>,
    history: TransitionHistory,
    stop: StopHandle,
    epoch: (Instant, DateTime<Utc>),
}

impl FiniteStateMachine {
    /// An uninitialized machine; call [`reset`](Self::reset) before polling.
    pub fn new(layout: Layout) -> Self {
        Self::with_history(layout, TransitionHistory::new())
    }

    /// A machine already reset to the layout's initial state.
    pub fn initialized(layout: Layout) -> Result<Self, FsmError> {
        let mut machine = Self::new(layout);
        machine.reset()?;
        Ok(machine)
    }

    pub fn builder() -> MachineBuilder {
        MachineBuilder::new()
    }

    pub(crate) fn with_history(layout: Layout, history: TransitionHistory) -> Self {
        let epoch = (layout.now(), Utc::now());
        Self {
            epoch,
            layout,
            operational_state: OperationalState::Uninitialized,
            applicative_state: None,
            history,
            stop: StopHandle::new(),
        }
    }

    pub fn current_operational_state(&self) -> OperationalState {
        self.operational_state
    }

    pub fn current_applicative_state(&self) -> Option<StateId> {
        self.applicative_state
    }

    /// The state currently occupied, if any.
    pub fn current_state(&self) -> Option<&State> {
        self.applicative_state.and_then(|id| self.layout.state(id))
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Mutable access for between-poll changes (custom values, durations).
    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Handle that hooks can capture to request a stop of `run()`.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Snap to the layout's initial state and fire its entering actions.
    ///
    /// Allowed from any operational state; the machine ends up `Idle`.
    pub fn reset(&mut self) -> Result<(), FsmError> {
        let initial = self.layout.initial_state().ok_or_else(|| {
            FsmError::invalid_configuration("the layout has no initial state")
        })?;

        self.operational_state = OperationalState::Idle;
        self.applicative_state = Some(initial);
        self.stop.clear();
        info!(
            state = self.layout.state_name(initial),
            "State machine reset"
        );

        self.layout.exec_entering_action(initial)
    }

    /// Advance by one poll.
    ///
    /// Returns `Ok(false)` once the current state is terminal, in which case
    /// the machine is `TerminalReached` and nothing fires. Otherwise the
    /// first transition whose condition holds is executed (exit, transiting,
    /// enter) or, if none holds, the in-state actions run.
    pub fn track(&mut self) -> Result<bool, FsmError> {
        let current = self.applicative_state.ok_or(FsmError::Uninitialized)?;

        if self.layout.state(current).is_some_and(State::is_terminal) {
            if self.operational_state != OperationalState::TerminalReached {
                info!(
                    state = self.layout.state_name(current),
                    "Terminal state reached"
                );
            }
            self.operational_state = OperationalState::TerminalReached;
            return Ok(false);
        }

        match self.layout.first_transiting(current) {
            Some(index) => self.transit_by(current, index)?,
            None => {
                trace!(state = self.layout.state_name(current), "In-state poll");
                self.layout.exec_in_state_action(current)?;
            }
        }
        Ok(true)
    }

    /// Poll until a terminal state, a stop request or the time budget.
    ///
    /// Returns the operational state the loop ended in. A hook failure moves
    /// the machine back to `Idle` before the error is returned.
    pub fn run(&mut self, options: RunOptions) -> Result<OperationalState, FsmError> {
        if options.reset {
            self.reset()?;
        } else if self.applicative_state.is_none() {
            return Err(FsmError::Uninitialized);
        }

        self.stop.clear();
        self.operational_state = OperationalState::Running;
        let started = self.layout.now();
        info!(budget = ?options.time_budget, "State machine running");

        loop {
            match self.track() {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => {
                    self.stop();
                    return Err(error);
                }
            }

            if self.stop.take() {
                self.stop();
                break;
            }

            if let Some(budget) = options.time_budget {
                let elapsed = self.layout.now().saturating_duration_since(started);
                if elapsed >= budget {
                    debug!(?elapsed, ?budget, "Time budget exhausted");
                    self.stop();
                    break;
                }
            }
        }

        info!(outcome = %self.operational_state, "State machine finished");
        Ok(self.operational_state)
    }

    /// Leave `Running` for `Idle`; no effect in any other operational state.
    pub fn stop(&mut self) {
        if self.operational_state == OperationalState::Running {
            self.operational_state = OperationalState::Idle;
            info!("State machine stopped");
        }
    }

    /// Force a move to `state` without evaluating conditions.
    ///
    /// Runs the exiting actions of the current state, then the entering
    /// actions of `state`. No transiting action is involved.
    pub fn transit_to(&mut self, state: StateId) -> Result<(), FsmError> {
        if !self.layout.contains_state(state) {
            return Err(FsmError::invalid_argument(format!(
                "{state} is not part of this machine's layout"
            )));
        }
        let current = self.applicative_state.ok_or(FsmError::Uninitialized)?;

        self.layout.exec_exiting_action(current)?;
        self.move_to(current, state, TransitionCause::Forced);
        self.layout.exec_entering_action(state)
    }

    fn transit_by(&mut self, from: StateId, index: usize) -> Result<(), FsmError> {
        let target = self
            .layout
            .transition(from, index)
            .map(|transition| transition.target())
            .ok_or_else(|| {
                FsmError::invalid_argument(format!("{from} has no transition #{index}"))
            })?;

        self.layout.exec_exiting_action(from)?;
        self.layout.exec_transiting_action(from, index)?;
        self.move_to(from, target, TransitionCause::Condition { index });
        self.layout.exec_entering_action(target)
    }

    /// Wall time of the layout clock, anchored when the machine was built.
    fn wall_time(&self) -> DateTime<Utc> {
        let (instant, wall) = self.epoch;
        let elapsed = self.layout.now().saturating_duration_since(instant);
        chrono::Duration::from_std(elapsed)
            .ok()
            .and_then(|elapsed| wall.checked_add_signed(elapsed))
            .unwrap_or(wall)
    }

    fn move_to(&mut self, from: StateId, to: StateId, cause: TransitionCause) {
        debug!(
            from = self.layout.state_name(from),
            to = self.layout.state_name(to),
            ?cause,
            "Transition"
        );
        self.applicative_state = Some(to);
        self.history.record(TransitionRecord {
            from,
            to,
            cause,
            timestamp: self.wall_time(),
        });
    }
}
