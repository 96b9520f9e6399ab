//! Transition history tracking.
//!
//! A bounded log of the moves a machine made, oldest first. Used for
//! diagnostics and by tests asserting the path a machine took.

use super::layout::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Records kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// What made the machine move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionCause {
    /// The guard of the `index`-th transition of the source state held.
    Condition { index: usize },
    /// An explicit `transit_to` request.
    Forced,
}

/// Record of a single move from one state to another.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being left
    pub from: StateId,
    /// The state being entered
    pub to: StateId,
    pub cause: TransitionCause,
    /// Wall-clock time of the move
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered history of transitions.
///
/// When full, recording a new transition evicts the oldest one. A capacity
/// of zero disables recording.
///
/// # Example
///
/// ```rust
/// use statebot::core::{Layout, State, TransitionCause, TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut layout = Layout::new();
/// let ids = layout.add_states([State::new("a"), State::new("b"), State::new("c")]);
///
/// let mut history = TransitionHistory::with_capacity(2);
/// for pair in ids.windows(2) {
///     history.record(TransitionRecord {
///         from: pair[0],
///         to: pair[1],
///         cause: TransitionCause::Forced,
///         timestamp: Utc::now(),
///     });
/// }
///
/// assert_eq!(history.path(), vec![ids[0], ids[1], ids[2]]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionHistory {
    capacity: usize,
    records: VecDeque<TransitionRecord>,
}

impl Default for TransitionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&mut self, record: TransitionRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Recorded transitions, oldest first.
    pub fn records(&self) -> impl ExactSizeIterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// States traversed: the first source, then every destination.
    pub fn path(&self) -> Vec<StateId> {
        self.records
            .front()
            .map(|first| first.from)
            .into_iter()
            .chain(self.records.iter().map(|record| record.to))
            .collect()
    }

    /// Time between the oldest and the newest kept record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
