//! Boolean predicates gating transitions.
//!
//! A [`Condition`] is a closed set of predicate kinds plus an `inverse` flag.
//! Conditions live in their [`Layout`](super::Layout) and refer to states and
//! to other conditions through handles, so one condition can guard several
//! transitions and be retuned between polls (for instance a duration).

use super::layout::{ConditionId, StateId};
use super::state::{Monitor, State};
use serde_json::Value;
use std::time::{Duration, Instant};

/// The predicate a [`Condition`] evaluates before `inverse` is applied.
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionKind {
    /// Constant `true`.
    AlwaysTrue,

    /// Equality of two values captured at construction.
    Value { actual: Value, expected: Value },

    /// True while less than `duration` has elapsed since `reference`.
    ///
    /// A `None` reference is stamped with the layout clock when the
    /// condition is added to a layout.
    Timed {
        duration: Duration,
        reference: Option<Instant>,
    },

    /// True once strictly more than `duration` has elapsed since the
    /// monitored state was last entered.
    StateEntryDuration { duration: Duration, state: StateId },

    /// True once the monitored state was entered at least `expected_count`
    /// times. With `auto_reset`, a successful comparison zeroes the counter.
    StateEntryCount {
        expected_count: u64,
        state: StateId,
        auto_reset: bool,
    },

    /// True when the monitored state's custom value equals `expected`.
    StateValue { expected: Value, state: StateId },

    /// True iff every child is true (vacuously true).
    AllOf(Vec<ConditionId>),

    /// True iff at least one child is true (vacuously false).
    AnyOf(Vec<ConditionId>),

    /// True iff no child is true (vacuously true).
    NoneOf(Vec<ConditionId>),
}

/// A predicate with an optional inversion.
///
/// The observable value is `inverse XOR compare()`.
///
/// # Example
///
/// ```rust
/// use statebot::core::{Condition, Layout};
///
/// let mut layout = Layout::new();
/// let yes = layout.add_condition(Condition::always_true()).unwrap();
/// let no = layout.add_condition(Condition::always_true().inverted()).unwrap();
/// let either = layout.add_condition(Condition::any([yes, no])).unwrap();
///
/// assert!(layout.evaluate(yes).unwrap());
/// assert!(!layout.evaluate(no).unwrap());
/// assert!(layout.evaluate(either).unwrap());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    kind: ConditionKind,
    inverse: bool,
}

impl Condition {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            inverse: false,
        }
    }

    pub fn always_true() -> Self {
        Self::new(ConditionKind::AlwaysTrue)
    }

    pub fn value(actual: impl Into<Value>, expected: impl Into<Value>) -> Self {
        Self::new(ConditionKind::Value {
            actual: actual.into(),
            expected: expected.into(),
        })
    }

    /// Timer starting when the condition is added to a layout.
    pub fn timed(duration: Duration) -> Self {
        Self::new(ConditionKind::Timed {
            duration,
            reference: None,
        })
    }

    /// Timer starting at an explicit reference instant.
    pub fn timed_since(duration: Duration, reference: Instant) -> Self {
        Self::new(ConditionKind::Timed {
            duration,
            reference: Some(reference),
        })
    }

    pub fn state_entry_duration(duration: Duration, state: StateId) -> Self {
        Self::new(ConditionKind::StateEntryDuration { duration, state })
    }

    pub fn state_entry_count(expected_count: u64, state: StateId, auto_reset: bool) -> Self {
        Self::new(ConditionKind::StateEntryCount {
            expected_count,
            state,
            auto_reset,
        })
    }

    pub fn state_value(expected: impl Into<Value>, state: StateId) -> Self {
        Self::new(ConditionKind::StateValue {
            expected: expected.into(),
            state,
        })
    }

    pub fn all(children: impl IntoIterator<Item = ConditionId>) -> Self {
        Self::new(ConditionKind::AllOf(children.into_iter().collect()))
    }

    pub fn any(children: impl IntoIterator<Item = ConditionId>) -> Self {
        Self::new(ConditionKind::AnyOf(children.into_iter().collect()))
    }

    pub fn none(children: impl IntoIterator<Item = ConditionId>) -> Self {
        Self::new(ConditionKind::NoneOf(children.into_iter().collect()))
    }

    /// Flip the inverse flag.
    pub fn inverted(mut self) -> Self {
        self.inverse = !self.inverse;
        self
    }

    pub fn with_inverse(mut self, inverse: bool) -> Self {
        self.inverse = inverse;
        self
    }

    pub fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    /// Duration of timed-family conditions.
    pub fn duration(&self) -> Option<Duration> {
        match &self.kind {
            ConditionKind::Timed { duration, .. }
            | ConditionKind::StateEntryDuration { duration, .. } => Some(*duration),
            _ => None,
        }
    }

    /// State observed by monitored-state conditions.
    pub fn monitored_state(&self) -> Option<StateId> {
        match &self.kind {
            ConditionKind::StateEntryDuration { state, .. }
            | ConditionKind::StateEntryCount { state, .. }
            | ConditionKind::StateValue { state, .. } => Some(*state),
            _ => None,
        }
    }

    /// Children of composite conditions, empty otherwise.
    pub fn children(&self) -> &[ConditionId] {
        match &self.kind {
            ConditionKind::AllOf(children)
            | ConditionKind::AnyOf(children)
            | ConditionKind::NoneOf(children) => children,
            _ => &[],
        }
    }

    pub(crate) fn kind_mut(&mut self) -> &mut ConditionKind {
        &mut self.kind
    }
}

fn monitor_of(states: &[State], state: StateId) -> Option<&Monitor> {
    states.get(state.index()).and_then(State::monitor)
}

/// Evaluate condition `id` at `now`.
///
/// An auto-resetting entry count zeroes its monitored counter as soon as it
/// succeeds, so later reads within the same evaluation see the reset.
pub(crate) fn evaluate(
    conditions: &[Condition],
    states: &mut [State],
    id: ConditionId,
    now: Instant,
) -> bool {
    let condition = &conditions[id.index()];

    let outcome = match &condition.kind {
        ConditionKind::AlwaysTrue => true,
        ConditionKind::Value { actual, expected } => actual == expected,
        ConditionKind::Timed {
            duration,
            reference,
        } => {
            let elapsed = reference.map_or(Duration::ZERO, |r| now.saturating_duration_since(r));
            elapsed < *duration
        }
        ConditionKind::StateEntryDuration { duration, state } => monitor_of(states, *state)
            .and_then(Monitor::last_entry_time)
            .is_some_and(|entered| now.saturating_duration_since(entered) > *duration),
        ConditionKind::StateEntryCount {
            expected_count,
            state,
            auto_reset,
        } => {
            let count = monitor_of(states, *state).map_or(0, Monitor::entry_count);
            let reached = count >= *expected_count;
            if reached && *auto_reset {
                let monitor = states.get_mut(state.index()).and_then(State::monitor_mut);
                if let Some(monitor) = monitor {
                    monitor.reset_entry_count();
                }
            }
            reached
        }
        ConditionKind::StateValue { expected, state } => {
            monitor_of(states, *state).is_some_and(|m| m.custom_value() == expected)
        }
        ConditionKind::AllOf(children) => children
            .iter()
            .all(|child| evaluate(conditions, states, *child, now)),
        ConditionKind::AnyOf(children) => children
            .iter()
            .any(|child| evaluate(conditions, states, *child, now)),
        ConditionKind::NoneOf(children) => !children
            .iter()
            .any(|child| evaluate(conditions, states, *child, now)),
    };

    condition.inverse ^ outcome
}
