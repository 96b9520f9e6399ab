//! Blink configuration.

use crate::error::FsmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters of [`Blinker::blink`](super::Blinker::blink).
///
/// Exactly one of these combinations must be given:
///
/// | `total_duration` | `cycle_duration` | `n_cycles` | behavior                            |
/// |------------------|------------------|------------|-------------------------------------|
/// |                  | yes              |            | blink until told otherwise          |
/// | yes              | yes              |            | blink for `total_duration`          |
/// | yes              |                  | yes        | cycle is `total_duration / n_cycles`|
/// |                  | yes              | yes        | total is `cycle_duration * n_cycles`|
///
/// # Example
///
/// ```rust
/// use statebot::blinker::{BlinkOptions, BlinkPlan};
/// use std::time::Duration;
///
/// let options = BlinkOptions::new()
///     .total_duration(Duration::from_secs(3))
///     .n_cycles(3)
///     .percent_on(0.25);
///
/// assert_eq!(
///     options.plan().unwrap(),
///     BlinkPlan::Bounded {
///         total: Duration::from_secs(3),
///         cycle: Duration::from_secs(1),
///     }
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkOptions {
    pub total_duration: Option<Duration>,
    pub cycle_duration: Option<Duration>,
    pub n_cycles: Option<u32>,
    /// Fraction of each cycle spent on, within `[0, 1]`.
    pub percent_on: f64,
    /// Start each blink sequence on the "on" side.
    pub begin_on: bool,
    /// Land on "off" when a bounded sequence ends.
    pub end_off: bool,
}

impl Default for BlinkOptions {
    fn default() -> Self {
        Self {
            total_duration: None,
            cycle_duration: None,
            n_cycles: None,
            percent_on: 0.5,
            begin_on: true,
            end_off: true,
        }
    }
}

/// What a blink request resolves to once validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkPlan {
    Indefinite { cycle: Duration },
    Bounded { total: Duration, cycle: Duration },
}

impl BlinkPlan {
    pub fn cycle(&self) -> Duration {
        match self {
            Self::Indefinite { cycle } | Self::Bounded { cycle, .. } => *cycle,
        }
    }
}

impl BlinkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blink indefinitely with the given cycle.
    pub fn every(cycle: Duration) -> Self {
        Self::new().cycle_duration(cycle)
    }

    pub fn total_duration(mut self, total: Duration) -> Self {
        self.total_duration = Some(total);
        self
    }

    pub fn cycle_duration(mut self, cycle: Duration) -> Self {
        self.cycle_duration = Some(cycle);
        self
    }

    pub fn n_cycles(mut self, n_cycles: u32) -> Self {
        self.n_cycles = Some(n_cycles);
        self
    }

    pub fn percent_on(mut self, percent_on: f64) -> Self {
        self.percent_on = percent_on;
        self
    }

    pub fn begin_on(mut self, begin_on: bool) -> Self {
        self.begin_on = begin_on;
        self
    }

    pub fn end_off(mut self, end_off: bool) -> Self {
        self.end_off = end_off;
        self
    }

    /// The mirrored sequence: opposite starting and landing sides.
    pub fn reciprocal(self) -> Self {
        Self {
            begin_on: !self.begin_on,
            end_off: !self.end_off,
            ..self
        }
    }

    /// On and off times of one cycle. `percent_on` must already be valid.
    pub(crate) fn split(&self, cycle: Duration) -> (Duration, Duration) {
        let on = cycle.mul_f64(self.percent_on);
        (on, cycle.saturating_sub(on))
    }

    /// Validate the options and derive the missing duration.
    pub fn plan(&self) -> Result<BlinkPlan, FsmError> {
        if !(0.0..=1.0).contains(&self.percent_on) {
            return Err(FsmError::invalid_argument(format!(
                "percent_on must be between 0 and 1, got {}",
                self.percent_on
            )));
        }
        if self.n_cycles == Some(0) {
            return Err(FsmError::invalid_argument("n_cycles must be at least 1"));
        }

        match (self.total_duration, self.cycle_duration, self.n_cycles) {
            (None, Some(cycle), None) => Ok(BlinkPlan::Indefinite { cycle }),
            (Some(total), Some(cycle), None) => Ok(BlinkPlan::Bounded { total, cycle }),
            (Some(total), None, Some(n)) => Ok(BlinkPlan::Bounded {
                total,
                cycle: total / n,
            }),
            (None, Some(cycle), Some(n)) => {
                let total = cycle.checked_mul(n).ok_or_else(|| {
                    FsmError::invalid_argument("cycle_duration * n_cycles overflows")
                })?;
                Ok(BlinkPlan::Bounded { total, cycle })
            }
            _ => Err(FsmError::invalid_argument(
                "blink needs cycle_duration, or two of total_duration, cycle_duration and n_cycles",
            )),
        }
    }
}
