//! States of the behavioral graph.
//!
//! A [`State`] carries its outgoing transitions, three ordered lists of
//! lifecycle hooks and, optionally, a [`Monitor`] recording entries, exits
//! and an application-owned custom value. States are compared by identity:
//! the [`StateId`](super::StateId) handed out by the owning layout.

use super::transition::Transition;
use crate::error::{FsmError, HookPhase, HookResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Instant;

/// Zero-argument hook run by the driver.
pub type Action = Box<dyn FnMut() -> HookResult>;

/// Static configuration of a state.
///
/// # Example
///
/// ```rust
/// use statebot::core::Parameters;
///
/// let parameters: Parameters =
///     serde_json::from_str(r#"{ "terminal": true }"#).unwrap();
/// assert!(parameters.terminal);
/// assert!(!parameters.do_in_state_action_when_entering);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Sink state: reaching it stops the machine.
    pub terminal: bool,
    /// Also run the in-state action right after the entering action.
    pub do_in_state_action_when_entering: bool,
    /// Also run the in-state action right before the exiting action.
    pub do_in_state_action_when_exiting: bool,
}

impl Parameters {
    /// Parameters of a terminal state.
    pub fn terminal() -> Self {
        Self {
            terminal: true,
            ..Self::default()
        }
    }
}

/// Entry/exit bookkeeping of a monitored state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Monitor {
    entry_count: u64,
    last_entry_time: Option<Instant>,
    last_exit_time: Option<Instant>,
    custom_value: Value,
}

impl Monitor {
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Instant of the latest entry, `None` before the first one.
    pub fn last_entry_time(&self) -> Option<Instant> {
        self.last_entry_time
    }

    /// Instant of the latest exit, `None` before the first one.
    pub fn last_exit_time(&self) -> Option<Instant> {
        self.last_exit_time
    }

    /// Application-owned value, `Value::Null` until set.
    pub fn custom_value(&self) -> &Value {
        &self.custom_value
    }

    pub fn set_custom_value(&mut self, value: impl Into<Value>) {
        self.custom_value = value.into();
    }

    pub fn reset_entry_count(&mut self) {
        self.entry_count = 0;
    }

    pub fn reset_last_times(&mut self) {
        self.last_entry_time = None;
        self.last_exit_time = None;
    }

    fn record_entry(&mut self, now: Instant) {
        self.last_entry_time = Some(now);
        self.entry_count += 1;
    }

    fn record_exit(&mut self, now: Instant) {
        self.last_exit_time = Some(now);
    }
}

/// A node of the behavioral graph.
///
/// # Example
///
/// ```rust
/// use statebot::core::{Parameters, State};
///
/// let mut blinking = State::monitored("blinking")
///     .with_entering_action(|| Ok(()));
/// blinking.add_exiting_action(|| Ok(()));
///
/// assert!(blinking.is_monitored());
/// assert!(!blinking.is_terminal());
///
/// let done = State::new("done").with_parameters(Parameters::terminal());
/// assert!(done.is_terminal());
/// ```
pub struct State {
    name: String,
    parameters: Parameters,
    transitions: Vec<Transition>,
    entering_actions: Vec<Action>,
    in_state_actions: Vec<Action>,
    exiting_actions: Vec<Action>,
    monitor: Option<Monitor>,
}

impl State {
    /// A state without monitoring and with default parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Parameters::default(),
            transitions: Vec::new(),
            entering_actions: Vec::new(),
            in_state_actions: Vec::new(),
            exiting_actions: Vec::new(),
            monitor: None,
        }
    }

    /// A state recording entries, exits and a custom value.
    pub fn monitored(name: impl Into<String>) -> Self {
        Self::new(name).with_monitoring()
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Turn on monitoring; keeps the existing monitor if there is one.
    pub fn with_monitoring(mut self) -> Self {
        self.monitor.get_or_insert_with(Monitor::default);
        self
    }

    pub fn with_entering_action<F>(mut self, action: F) -> Self
    where
        F: FnMut() -> HookResult + 'static,
    {
        self.add_entering_action(action);
        self
    }

    pub fn with_in_state_action<F>(mut self, action: F) -> Self
    where
        F: FnMut() -> HookResult + 'static,
    {
        self.add_in_state_action(action);
        self
    }

    pub fn with_exiting_action<F>(mut self, action: F) -> Self
    where
        F: FnMut() -> HookResult + 'static,
    {
        self.add_exiting_action(action);
        self
    }

    pub fn add_entering_action<F>(&mut self, action: F)
    where
        F: FnMut() -> HookResult + 'static,
    {
        self.entering_actions.push(Box::new(action));
    }

    pub fn add_in_state_action<F>(&mut self, action: F)
    where
        F: FnMut() -> HookResult + 'static,
    {
        self.in_state_actions.push(Box::new(action));
    }

    pub fn add_exiting_action<F>(&mut self, action: F)
    where
        F: FnMut() -> HookResult + 'static,
    {
        self.exiting_actions.push(Box::new(action));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> Parameters {
        self.parameters
    }

    pub fn is_terminal(&self) -> bool {
        self.parameters.terminal
    }

    pub fn is_monitored(&self) -> bool {
        self.monitor.is_some()
    }

    pub fn monitor(&self) -> Option<&Monitor> {
        self.monitor.as_ref()
    }

    pub fn monitor_mut(&mut self) -> Option<&mut Monitor> {
        self.monitor.as_mut()
    }

    /// Outgoing transitions in evaluation order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition_mut(&mut self, index: usize) -> Option<&mut Transition> {
        self.transitions.get_mut(index)
    }

    pub(crate) fn push_transition(&mut self, transition: Transition) -> usize {
        self.transitions.push(transition);
        self.transitions.len() - 1
    }

    /// Stamp monitoring, then run entering actions and, if configured, the
    /// in-state actions.
    pub(crate) fn exec_entering_action(&mut self, now: Instant) -> Result<(), FsmError> {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.record_entry(now);
        }

        run_actions(&mut self.entering_actions, &self.name, HookPhase::Entering)?;

        if self.parameters.do_in_state_action_when_entering {
            self.exec_in_state_action()?;
        }
        Ok(())
    }

    pub(crate) fn exec_in_state_action(&mut self) -> Result<(), FsmError> {
        run_actions(&mut self.in_state_actions, &self.name, HookPhase::InState)
    }

    /// Stamp monitoring, then run the in-state actions if configured and the
    /// exiting actions.
    pub(crate) fn exec_exiting_action(&mut self, now: Instant) -> Result<(), FsmError> {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.record_exit(now);
        }

        if self.parameters.do_in_state_action_when_exiting {
            self.exec_in_state_action()?;
        }

        run_actions(&mut self.exiting_actions, &self.name, HookPhase::Exiting)
    }
}

pub(crate) fn run_actions(
    actions: &mut [Action],
    state: &str,
    phase: HookPhase,
) -> Result<(), FsmError> {
    for action in actions.iter_mut() {
        action().map_err(|source| FsmError::HookFailed {
            state: state.to_string(),
            phase,
            source,
        })?;
    }
    Ok(())
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("transitions", &self.transitions.len())
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Action) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |label: &'static str| -> Action {
            let sink = sink.clone();
            Box::new(move || {
                sink.borrow_mut().push(label);
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn entering_runs_in_state_after_entering_when_configured() {
        let (log, make) = recorder();
        let mut state = State::new("s").with_parameters(Parameters {
            do_in_state_action_when_entering: true,
            ..Parameters::default()
        });
        state.entering_actions.push(make("enter"));
        state.in_state_actions.push(make("in"));

        state.exec_entering_action(Instant::now()).unwrap();

        assert_eq!(*log.borrow(), vec!["enter", "in"]);
    }

    #[test]
    fn exiting_runs_in_state_before_exiting_when_configured() {
        let (log, make) = recorder();
        let mut state = State::new("s").with_parameters(Parameters {
            do_in_state_action_when_exiting: true,
            ..Parameters::default()
        });
        state.exiting_actions.push(make("exit"));
        state.in_state_actions.push(make("in"));

        state.exec_exiting_action(Instant::now()).unwrap();

        assert_eq!(*log.borrow(), vec!["in", "exit"]);
    }

    #[test]
    fn actions_run_in_insertion_order() {
        let (log, make) = recorder();
        let mut state = State::new("s");
        state.entering_actions.push(make("first"));
        state.entering_actions.push(make("second"));

        state.exec_entering_action(Instant::now()).unwrap();

        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn monitored_state_stamps_before_running_hooks() {
        let mut state = State::monitored("watched")
            .with_entering_action(|| Err("entry refused".into()))
            .with_exiting_action(|| Err("exit refused".into()));
        let entered_at = Instant::now();

        let entered = state.exec_entering_action(entered_at);
        assert!(matches!(
            entered,
            Err(FsmError::HookFailed {
                phase: HookPhase::Entering,
                ..
            })
        ));
        let monitor = state.monitor().unwrap();
        assert_eq!(monitor.entry_count(), 1);
        assert_eq!(monitor.last_entry_time(), Some(entered_at));
        assert_eq!(monitor.last_exit_time(), None);

        assert!(state.exec_exiting_action(entered_at).is_err());
        assert_eq!(state.monitor().unwrap().last_exit_time(), Some(entered_at));
    }

    #[test]
    fn monitor_resets() {
        let mut state = State::monitored("watched");
        state.exec_entering_action(Instant::now()).unwrap();
        state.exec_exiting_action(Instant::now()).unwrap();

        let monitor = state.monitor_mut().unwrap();
        monitor.reset_entry_count();
        monitor.reset_last_times();

        assert_eq!(monitor.entry_count(), 0);
        assert!(monitor.last_entry_time().is_none());
        assert!(monitor.last_exit_time().is_none());
    }

    #[test]
    fn failing_hook_reports_state_and_phase() {
        let mut state = State::new("broken").with_entering_action(|| Err("boom".into()));

        let error = state.exec_entering_action(Instant::now()).unwrap_err();

        match error {
            FsmError::HookFailed { state, phase, .. } => {
                assert_eq!(state, "broken");
                assert_eq!(phase, HookPhase::Entering);
            }
            other => panic!("Expected HookFailed, got {other:?}"),
        }
    }

    #[test]
    fn with_monitoring_keeps_existing_monitor() {
        let mut state = State::monitored("watched");
        state.monitor_mut().unwrap().set_custom_value("kept");

        let state = state.with_monitoring();

        assert_eq!(state.monitor().unwrap().custom_value(), "kept");
    }

    #[test]
    fn plain_state_has_no_monitor() {
        let mut state = State::new("plain");
        state.exec_entering_action(Instant::now()).unwrap();

        assert!(!state.is_monitored());
        assert!(state.monitor().is_none());
    }
}
