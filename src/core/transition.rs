//! Guarded edges between states.

use super::layout::{ConditionId, StateId};
use super::state::{run_actions, Action};
use crate::error::{FsmError, HookPhase, HookResult};
use std::fmt;
use std::time::Instant;

/// Transit bookkeeping of a monitored transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransitionMonitor {
    transit_count: u64,
    last_transit_time: Option<Instant>,
}

impl TransitionMonitor {
    pub fn transit_count(&self) -> u64 {
        self.transit_count
    }

    pub fn last_transit_time(&self) -> Option<Instant> {
        self.last_transit_time
    }

    pub fn reset_transit_count(&mut self) {
        self.transit_count = 0;
    }

    pub fn reset_last_transit_time(&mut self) {
        self.last_transit_time = None;
    }
}

/// An outgoing edge: destination, guard and optional transiting actions.
///
/// The driver first asks [`Layout`](super::Layout) whether the guard holds
/// and only then runs the transiting actions. A monitored transition counts
/// the transit and stamps its time before any action runs.
pub struct Transition {
    target: StateId,
    condition: ConditionId,
    actions: Vec<Action>,
    monitor: Option<TransitionMonitor>,
}

impl Transition {
    pub fn new(target: StateId, condition: ConditionId) -> Self {
        Self {
            target,
            condition,
            actions: Vec::new(),
            monitor: None,
        }
    }

    /// A transition counting and timestamping its transits.
    pub fn monitored(target: StateId, condition: ConditionId) -> Self {
        Self {
            monitor: Some(TransitionMonitor::default()),
            ..Self::new(target, condition)
        }
    }

    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: FnMut() -> HookResult + 'static,
    {
        self.add_transition_action(action);
        self
    }

    pub fn add_transition_action<F>(&mut self, action: F)
    where
        F: FnMut() -> HookResult + 'static,
    {
        self.actions.push(Box::new(action));
    }

    pub fn target(&self) -> StateId {
        self.target
    }

    pub fn condition(&self) -> ConditionId {
        self.condition
    }

    pub fn is_monitored(&self) -> bool {
        self.monitor.is_some()
    }

    pub fn monitor(&self) -> Option<&TransitionMonitor> {
        self.monitor.as_ref()
    }

    pub fn monitor_mut(&mut self) -> Option<&mut TransitionMonitor> {
        self.monitor.as_mut()
    }

    pub(crate) fn exec_transiting_action(
        &mut self,
        now: Instant,
        from: &str,
    ) -> Result<(), FsmError> {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.transit_count += 1;
            monitor.last_transit_time = Some(now);
        }

        run_actions(&mut self.actions, from, HookPhase::Transiting)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("target", &self.target)
            .field("condition", &self.condition)
            .field("actions", &self.actions.len())
            .field("monitor", &self.monitor)
            .finish()
    }
}
