//! A left/right pair of blinkers driven together.

use super::blinker::Blinker;
use super::options::BlinkOptions;
use crate::clock::{Clock, SystemClock};
use crate::core::State;
use crate::error::FsmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Which blinker(s) a [`SideBlinkers`] command or query addresses.
///
/// The reciprocal sides pair one blinker with the opposite behavior of the
/// other: `LeftReciprocal` means left on and right off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Both,
    LeftReciprocal,
    RightReciprocal,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Both => "BOTH",
            Self::LeftReciprocal => "LEFT_RECIPROCAL",
            Self::RightReciprocal => "RIGHT_RECIPROCAL",
        };
        f.write_str(name)
    }
}

/// Two independent blinkers, addressed through [`Side`].
///
/// # Example
///
/// ```rust
/// use statebot::blinker::{Side, SideBlinkers};
/// use statebot::core::State;
///
/// let mut blinkers = SideBlinkers::new(
///     || State::new("left off"),
///     || State::new("left on"),
///     || State::new("right off"),
///     || State::new("right on"),
/// )
/// .unwrap();
///
/// blinkers.turn_on(Side::LeftReciprocal, None).unwrap();
/// assert!(blinkers.is_on(Side::LeftReciprocal));
/// assert!(blinkers.is_off(Side::Right));
/// ```
#[derive(Debug)]
pub struct SideBlinkers {
    left: Blinker,
    right: Blinker,
}

impl SideBlinkers {
    pub fn new<LOff, LOn, ROff, ROn>(
        left_off_state_generator: LOff,
        left_on_state_generator: LOn,
        right_off_state_generator: ROff,
        right_on_state_generator: ROn,
    ) -> Result<Self, FsmError>
    where
        LOff: FnMut() -> State,
        LOn: FnMut() -> State,
        ROff: FnMut() -> State,
        ROn: FnMut() -> State,
    {
        Self::with_clock(
            left_off_state_generator,
            left_on_state_generator,
            right_off_state_generator,
            right_on_state_generator,
            Rc::new(SystemClock),
        )
    }

    /// Both blinkers read `clock`.
    pub fn with_clock<LOff, LOn, ROff, ROn>(
        left_off_state_generator: LOff,
        left_on_state_generator: LOn,
        right_off_state_generator: ROff,
        right_on_state_generator: ROn,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, FsmError>
    where
        LOff: FnMut() -> State,
        LOn: FnMut() -> State,
        ROff: FnMut() -> State,
        ROn: FnMut() -> State,
    {
        Ok(Self {
            left: Blinker::with_clock(
                left_off_state_generator,
                left_on_state_generator,
                Rc::clone(&clock),
            )?,
            right: Blinker::with_clock(right_off_state_generator, right_on_state_generator, clock)?,
        })
    }

    pub fn left(&self) -> &Blinker {
        &self.left
    }

    pub fn right(&self) -> &Blinker {
        &self.right
    }

    pub fn left_mut(&mut self) -> &mut Blinker {
        &mut self.left
    }

    pub fn right_mut(&mut self) -> &mut Blinker {
        &mut self.right
    }

    pub fn is_on(&self, side: Side) -> bool {
        let (left, right) = (&self.left, &self.right);
        match side {
            Side::Left => left.is_on(),
            Side::Right => right.is_on(),
            Side::Both => left.is_on() && right.is_on(),
            Side::LeftReciprocal => left.is_on() && right.is_off(),
            Side::RightReciprocal => right.is_on() && left.is_off(),
        }
    }

    pub fn is_off(&self, side: Side) -> bool {
        let (left, right) = (&self.left, &self.right);
        match side {
            Side::Left => left.is_off(),
            Side::Right => right.is_off(),
            Side::Both => left.is_off() && right.is_off(),
            Side::LeftReciprocal => left.is_off() && right.is_on(),
            Side::RightReciprocal => right.is_off() && left.is_on(),
        }
    }

    /// Turn `side` on; a reciprocal side turns the other blinker off.
    pub fn turn_on(&mut self, side: Side, duration: Option<Duration>) -> Result<(), FsmError> {
        debug!(%side, ?duration, "Side blinkers turned on");
        match side {
            Side::Left => self.left.turn_on(duration),
            Side::Right => self.right.turn_on(duration),
            Side::Both => {
                self.left.turn_on(duration)?;
                self.right.turn_on(duration)
            }
            Side::LeftReciprocal => {
                self.left.turn_on(duration)?;
                self.right.turn_off(duration)
            }
            Side::RightReciprocal => {
                self.left.turn_off(duration)?;
                self.right.turn_on(duration)
            }
        }
    }

    /// Turn `side` off; a reciprocal side turns the other blinker on.
    pub fn turn_off(&mut self, side: Side, duration: Option<Duration>) -> Result<(), FsmError> {
        debug!(%side, ?duration, "Side blinkers turned off");
        match side {
            Side::Left => self.left.turn_off(duration),
            Side::Right => self.right.turn_off(duration),
            Side::Both => {
                self.left.turn_off(duration)?;
                self.right.turn_off(duration)
            }
            Side::LeftReciprocal => {
                self.left.turn_off(duration)?;
                self.right.turn_on(duration)
            }
            Side::RightReciprocal => {
                self.left.turn_on(duration)?;
                self.right.turn_off(duration)
            }
        }
    }

    /// Blink `side`; a reciprocal side blinks the other blinker in opposition.
    ///
    /// Options are validated before either blinker is touched.
    pub fn blink(&mut self, side: Side, options: BlinkOptions) -> Result<(), FsmError> {
        options.plan()?;
        debug!(%side, "Side blinkers blinking");

        let mirrored = options.reciprocal();
        match side {
            Side::Left => self.left.blink(options),
            Side::Right => self.right.blink(options),
            Side::Both => {
                self.left.blink(options)?;
                self.right.blink(options)
            }
            Side::LeftReciprocal => {
                self.left.blink(options)?;
                self.right.blink(mirrored)
            }
            Side::RightReciprocal => {
                self.right.blink(options)?;
                self.left.blink(mirrored)
            }
        }
    }

    /// Poll both blinkers, left first.
    pub fn track(&mut self) -> Result<(), FsmError> {
        self.left.track()?;
        self.right.track()?;
        Ok(())
    }
}
