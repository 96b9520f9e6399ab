//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::core::{Action, ConditionId, StateId, Transition};
use crate::error::HookResult;

/// Builder for constructing transitions with a fluent API.
#[derive(Default)]
pub struct TransitionBuilder {
    target: Option<StateId>,
    condition: Option<ConditionId>,
    actions: Vec<Action>,
    monitored: bool,
}

impl TransitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target state (required).
    pub fn to(mut self, state: StateId) -> Self {
        self.target = Some(state);
        self
    }

    /// Set the guarding condition (required).
    pub fn when(mut self, condition: ConditionId) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Append a transiting action (optional, repeatable).
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: FnMut() -> HookResult + 'static,
    {
        self.actions.push(Box::new(action));
        self
    }

    /// Count and timestamp transits.
    pub fn monitored(mut self) -> Self {
        self.monitored = true;
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition, BuildError> {
        let target = self.target.ok_or(BuildError::MissingTarget)?;
        let condition = self.condition.ok_or(BuildError::MissingCondition)?;

        let mut transition = if self.monitored {
            Transition::monitored(target, condition)
        } else {
            Transition::new(target, condition)
        };
        for action in self.actions {
            transition.add_transition_action(action);
        }
        Ok(transition)
    }
}
