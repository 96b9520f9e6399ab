//! The owned graph: states, conditions and the initial state.

use super::condition::{self, Condition, ConditionKind};
use super::state::{Monitor, State};
use super::transition::Transition;
use crate::clock::{Clock, SystemClock};
use crate::error::FsmError;
use crate::validation::{self, LayoutViolation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

static NEXT_LAYOUT: AtomicU64 = AtomicU64::new(0);

/// Handle of a state owned by a [`Layout`].
///
/// Handles remember the layout that issued them; a layout rejects handles
/// of any other layout, even when the index is in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId {
    layout: u64,
    index: usize,
}

impl StateId {
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.index)
    }
}

/// Handle of a condition owned by a [`Layout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConditionId {
    layout: u64,
    index: usize,
}

impl ConditionId {
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "condition#{}", self.index)
    }
}

/// Arena of states and conditions plus the designated initial state.
///
/// States moved into a layout are owned by it for its whole lifetime and
/// addressed through [`StateId`]s; transitions and conditions only hold
/// handles. Every time read (timed conditions, monitoring stamps) goes
/// through the layout's [`Clock`].
///
/// # Example
///
/// ```rust
/// use statebot::core::{Condition, Layout, State, Transition};
///
/// let mut layout = Layout::new();
/// let [idle, busy] = [State::new("idle"), State::new("busy")].map(|s| layout.add_state(s));
/// let go = layout.add_condition(Condition::always_true()).unwrap();
/// layout.add_transition(idle, Transition::new(busy, go)).unwrap();
/// layout.add_transition(busy, Transition::new(idle, go)).unwrap();
/// layout.set_initial_state(idle).unwrap();
///
/// assert!(layout.is_valid());
/// ```
pub struct Layout {
    id: u64,
    states: Vec<State>,
    conditions: Vec<Condition>,
    initial_state: Option<StateId>,
    clock: Rc<dyn Clock>,
}

impl Layout {
    /// An empty layout reading the system clock.
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock))
    }

    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            id: NEXT_LAYOUT.fetch_add(1, Ordering::Relaxed),
            states: Vec::new(),
            conditions: Vec::new(),
            initial_state: None,
            clock,
        }
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.clock)
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    // ---- states ----------------------------------------------------------

    /// Take ownership of `state`. Adding states never runs hooks.
    pub fn add_state(&mut self, state: State) -> StateId {
        self.states.push(state);
        StateId {
            layout: self.id,
            index: self.states.len() - 1,
        }
    }

    /// Take ownership of several states, returning handles in order.
    pub fn add_states(&mut self, states: impl IntoIterator<Item = State>) -> Vec<StateId> {
        states
            .into_iter()
            .map(|state| self.add_state(state))
            .collect()
    }

    pub fn contains_state(&self, id: StateId) -> bool {
        id.layout == self.id && id.index < self.states.len()
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        let owned = id.layout == self.id;
        self.states.get(id.index).filter(|_| owned)
    }

    pub fn state_mut(&mut self, id: StateId) -> Option<&mut State> {
        let owned = id.layout == self.id;
        self.states.get_mut(id.index).filter(|_| owned)
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        let layout = self.id;
        self.states
            .iter()
            .enumerate()
            .map(move |(index, state)| (StateId { layout, index }, state))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Name of a state, for diagnostics.
    pub fn state_name(&self, id: StateId) -> &str {
        self.state(id).map_or("<unknown>", State::name)
    }

    pub fn initial_state(&self) -> Option<StateId> {
        self.initial_state
    }

    /// Designate the initial state; it must belong to this layout.
    pub fn set_initial_state(&mut self, id: StateId) -> Result<(), FsmError> {
        if !self.contains_state(id) {
            return Err(FsmError::invalid_configuration(format!(
                "the initial state {id} must be part of the layout states"
            )));
        }
        self.initial_state = Some(id);
        Ok(())
    }

    /// Write the custom value of a monitored state.
    pub fn set_custom_value(
        &mut self,
        id: StateId,
        value: impl Into<Value>,
    ) -> Result<(), FsmError> {
        self.monitored_state_mut(id)?.set_custom_value(value);
        Ok(())
    }

    fn monitored_state_mut(&mut self, id: StateId) -> Result<&mut Monitor, FsmError> {
        self.check_state(id)?;
        self.states[id.index]
            .monitor_mut()
            .ok_or_else(|| FsmError::invalid_argument(format!("{id} is not a monitored state")))
    }

    // ---- transitions -----------------------------------------------------

    /// Append `transition` to the outgoing transitions of `from`.
    ///
    /// Insertion order is evaluation priority. Returns the transition's index
    /// within `from`.
    pub fn add_transition(
        &mut self,
        from: StateId,
        transition: Transition,
    ) -> Result<usize, FsmError> {
        self.check_state(from)?;
        self.check_state(transition.target())?;
        self.check_condition(transition.condition())?;

        Ok(self.states[from.index].push_transition(transition))
    }

    pub fn transition(&self, from: StateId, index: usize) -> Option<&Transition> {
        self.state(from).and_then(|state| state.transitions().get(index))
    }

    pub fn transition_mut(&mut self, from: StateId, index: usize) -> Option<&mut Transition> {
        self.state_mut(from).and_then(|state| state.transition_mut(index))
    }

    /// Index of the first transition of `from` whose condition holds now.
    ///
    /// Evaluated fresh on every call, in insertion order.
    pub fn first_transiting(&mut self, from: StateId) -> Option<usize> {
        let count = self.state(from)?.transitions().len();
        (0..count).find(|&index| {
            let condition = self.states[from.index].transitions()[index].condition();
            self.evaluate_unchecked(condition)
        })
    }

    // ---- conditions ------------------------------------------------------

    /// Take ownership of `condition`.
    ///
    /// Monitored-state conditions must name a monitored state of this layout
    /// and composite children must already exist. A timed condition without
    /// a reference starts counting now.
    pub fn add_condition(&mut self, mut condition: Condition) -> Result<ConditionId, FsmError> {
        if let Some(state) = condition.monitored_state() {
            self.monitored_state_mut(state)?;
        }
        for child in condition.children() {
            self.check_condition(*child)?;
        }

        let now = self.now();
        if let ConditionKind::Timed { reference, .. } = condition.kind_mut() {
            reference.get_or_insert(now);
        }

        self.conditions.push(condition);
        Ok(ConditionId {
            layout: self.id,
            index: self.conditions.len() - 1,
        })
    }

    pub fn condition(&self, id: ConditionId) -> Option<&Condition> {
        let owned = id.layout == self.id;
        self.conditions.get(id.index).filter(|_| owned)
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// Append `child` to the composite condition `parent`.
    pub fn add_child_condition(
        &mut self,
        parent: ConditionId,
        child: ConditionId,
    ) -> Result<(), FsmError> {
        self.check_condition(parent)?;
        self.check_condition(child)?;
        if self.reaches(child, parent) {
            return Err(FsmError::invalid_argument(format!(
                "adding {child} to {parent} would create a cycle"
            )));
        }

        match self.conditions[parent.index].kind_mut() {
            ConditionKind::AllOf(children)
            | ConditionKind::AnyOf(children)
            | ConditionKind::NoneOf(children) => {
                children.push(child);
                Ok(())
            }
            _ => Err(FsmError::invalid_argument(format!(
                "{parent} is not a composite condition"
            ))),
        }
    }

    /// Retune the duration of a timed-family condition.
    pub fn set_condition_duration(
        &mut self,
        id: ConditionId,
        value: Duration,
    ) -> Result<(), FsmError> {
        self.check_condition(id)?;
        match self.conditions[id.index].kind_mut() {
            ConditionKind::Timed { duration, .. }
            | ConditionKind::StateEntryDuration { duration, .. } => {
                *duration = value;
                Ok(())
            }
            _ => Err(FsmError::invalid_argument(format!("{id} has no duration"))),
        }
    }

    /// Restart a condition: a timed condition is rebased to now, an entry
    /// count condition zeroes its monitored counter.
    pub fn reset_condition(&mut self, id: ConditionId) -> Result<(), FsmError> {
        self.check_condition(id)?;
        let now = self.now();
        match self.conditions[id.index].kind_mut() {
            ConditionKind::Timed { reference, .. } => {
                *reference = Some(now);
                Ok(())
            }
            ConditionKind::StateEntryCount { state, .. } => {
                let state = *state;
                self.monitored_state_mut(state)?.reset_entry_count();
                Ok(())
            }
            _ => Err(FsmError::invalid_argument(format!("{id} cannot be reset"))),
        }
    }

    /// Change the value a state-value condition waits for.
    pub fn set_expected_value(
        &mut self,
        id: ConditionId,
        value: impl Into<Value>,
    ) -> Result<(), FsmError> {
        self.check_condition(id)?;
        match self.conditions[id.index].kind_mut() {
            ConditionKind::StateValue { expected, .. } => {
                *expected = value.into();
                Ok(())
            }
            _ => Err(FsmError::invalid_argument(format!(
                "{id} is not a state value condition"
            ))),
        }
    }

    /// Evaluate a condition now.
    ///
    /// Takes `&mut self` because an auto-resetting entry count zeroes its
    /// monitored counter when it succeeds.
    pub fn evaluate(&mut self, id: ConditionId) -> Result<bool, FsmError> {
        self.check_condition(id)?;
        Ok(self.evaluate_unchecked(id))
    }

    fn evaluate_unchecked(&mut self, id: ConditionId) -> bool {
        let now = self.now();
        condition::evaluate(&self.conditions, &mut self.states, id, now)
    }

    fn reaches(&self, from: ConditionId, target: ConditionId) -> bool {
        from == target
            || self.conditions[from.index]
                .children()
                .iter()
                .any(|child| self.reaches(*child, target))
    }

    // ---- validation ------------------------------------------------------

    /// Check the whole graph, accumulating every violation.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<LayoutViolation>> {
        validation::validate_layout(self)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_success()
    }

    /// [`validate`](Self::validate) folded into a single error.
    pub fn ensure_valid(&self) -> Result<(), FsmError> {
        match self.validate() {
            Validation::Success(_) => Ok(()),
            Validation::Failure(violations) => {
                let message = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(FsmError::InvalidConfiguration(message))
            }
        }
    }

    // ---- hooks -----------------------------------------------------------

    pub(crate) fn exec_entering_action(&mut self, id: StateId) -> Result<(), FsmError> {
        let now = self.now();
        self.states[id.index].exec_entering_action(now)
    }

    pub(crate) fn exec_in_state_action(&mut self, id: StateId) -> Result<(), FsmError> {
        self.states[id.index].exec_in_state_action()
    }

    pub(crate) fn exec_exiting_action(&mut self, id: StateId) -> Result<(), FsmError> {
        let now = self.now();
        self.states[id.index].exec_exiting_action(now)
    }

    pub(crate) fn exec_transiting_action(
        &mut self,
        from: StateId,
        index: usize,
    ) -> Result<(), FsmError> {
        let now = self.now();
        let state = &mut self.states[from.index];
        let name = state.name().to_string();
        match state.transition_mut(index) {
            Some(transition) => transition.exec_transiting_action(now, &name),
            None => Err(FsmError::invalid_argument(format!(
                "{from} has no transition #{index}"
            ))),
        }
    }

    fn check_state(&self, id: StateId) -> Result<(), FsmError> {
        if self.contains_state(id) {
            Ok(())
        } else {
            Err(FsmError::invalid_argument(format!(
                "{id} is not part of this layout"
            )))
        }
    }

    fn check_condition(&self, id: ConditionId) -> Result<(), FsmError> {
        if id.layout == self.id && id.index < self.conditions.len() {
            Ok(())
        } else {
            Err(FsmError::invalid_argument(format!(
                "{id} is not part of this layout"
            )))
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("states", &self.states)
            .field("conditions", &self.conditions)
            .field("initial_state", &self.initial_state)
            .finish_non_exhaustive()
    }
}
