//! Run configuration and cooperative stop requests.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// How [`FiniteStateMachine::run`](super::FiniteStateMachine::run) drives
/// the polling loop.
///
/// # Example
///
/// ```rust
/// use statebot::machine::RunOptions;
/// use std::time::Duration;
///
/// let options: RunOptions =
///     serde_json::from_str(r#"{ "time_budget": { "secs": 2, "nanos": 0 } }"#).unwrap();
/// assert!(options.reset);
/// assert_eq!(options.time_budget, Some(Duration::from_secs(2)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Reset the machine before entering the loop.
    pub reset: bool,
    /// Stop once this much clock time has passed since the loop started.
    pub time_budget: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            reset: true,
            time_budget: None,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from the current applicative state.
    pub fn without_reset(mut self) -> Self {
        self.reset = false;
        self
    }

    pub fn reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

/// Advisory stop flag shared between a machine and its hooks.
///
/// A request is honored by `run()` at the next poll boundary; it never
/// interrupts a hook.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.set(true);
    }

    pub fn is_requested(&self) -> bool {
        self.0.get()
    }

    /// Consume a pending request.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }

    pub fn clear(&self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reset_without_budget() {
        let options = RunOptions::default();
        assert!(options.reset);
        assert!(options.time_budget.is_none());
    }

    #[test]
    fn fluent_setters() {
        let options = RunOptions::new()
            .without_reset()
            .time_budget(Duration::from_millis(250));

        assert!(!options.reset);
        assert_eq!(options.time_budget, Some(Duration::from_millis(250)));
    }

    #[test]
    fn stop_handle_clones_share_the_flag() {
        let handle = StopHandle::new();
        let hook_side = handle.clone();

        hook_side.request_stop();
        assert!(handle.is_requested());
        assert!(handle.take());
        assert!(!hook_side.is_requested());
    }
}
