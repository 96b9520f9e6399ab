use super::options::{BlinkOptions, BlinkPlan};
use crate::clock::{Clock, SystemClock};
use crate::core::{Condition, ConditionId, Layout, State, StateId, Transition};
use crate::error::FsmError;
use crate::machine::FiniteStateMachine;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

const ON: &str = "on";
const OFF: &str = "off";
const BOUNDED: &str = "bounded";
const UNBOUNDED: &str = "unbounded";

/// Handles of the states making up a blinker's graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlinkerStates {
    pub off: StateId,
    pub on: StateId,
    pub off_duration: StateId,
    pub on_duration: StateId,
    pub blink_begin: StateId,
    pub blink_on: StateId,
    pub blink_off: StateId,
    pub blink_stop_begin: StateId,
    pub blink_stop_end: StateId,
}

impl BlinkerStates {
    fn on_states(&self) -> [StateId; 3] {
        [self.on, self.on_duration, self.blink_on]
    }

    fn off_states(&self) -> [StateId; 3] {
        [self.off, self.off_duration, self.blink_off]
    }
}

#[derive(Clone, Copy, Debug)]
struct BlinkerConditions {
    on_duration: ConditionId,
    off_duration: ConditionId,
    blink_on: ConditionId,
    blink_off: ConditionId,
    blink_stop: ConditionId,
}

/// An on/off output with timed and blinking behaviors.
///
/// Four behaviors share one graph: steady on or off, on or off for a
/// duration before reverting, blinking until told otherwise, and blinking
/// for a bounded time before landing on a chosen side.
///
/// Both blink behaviors reuse the same `blink_on`/`blink_off` pair. Their
/// durations are retuned right before each request and the side a
/// sequence starts on is picked by `blink_begin`'s custom value. A bounded
/// sequence first passes through `blink_stop_begin`, whose entry time and
/// custom value arm the guard that ends the sequence in `blink_stop_end`.
///
/// The steady `on` and `off` states have no outgoing transitions, so the
/// blinker's layout never passes [`Layout::validate`](crate::core::Layout::validate)
/// and is not checked.
///
/// # Example
///
/// ```rust
/// use statebot::blinker::{BlinkOptions, Blinker};
/// use statebot::clock::ManualClock;
/// use statebot::core::State;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// let clock = Rc::new(ManualClock::new());
/// let mut blinker = Blinker::with_clock(
///     || State::new("lamp off"),
///     || State::new("lamp on"),
///     clock.clone(),
/// )
/// .unwrap();
/// assert!(blinker.is_off());
///
/// blinker.blink(BlinkOptions::every(Duration::from_secs(1))).unwrap();
/// blinker.track().unwrap();
/// blinker.track().unwrap();
/// assert!(blinker.is_on());
///
/// clock.advance(Duration::from_millis(501));
/// blinker.track().unwrap();
/// assert!(blinker.is_off());
/// ```
pub struct Blinker {
    machine: FiniteStateMachine,
    states: BlinkerStates,
    conditions: BlinkerConditions,
}

impl Blinker {
    /// A blinker reading the system clock, starting off.
    pub fn new<Off, On>(off_state_generator: Off, on_state_generator: On) -> Result<Self, FsmError>
    where
        Off: FnMut() -> State,
        On: FnMut() -> State,
    {
        Self::with_clock(off_state_generator, on_state_generator, Rc::new(SystemClock))
    }

    /// A blinker reading `clock`, starting off.
    ///
    /// Each generator is called once per off/on state of the graph; states
    /// without monitoring get it.
    pub fn with_clock<Off, On>(
        mut off_state_generator: Off,
        mut on_state_generator: On,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, FsmError>
    where
        Off: FnMut() -> State,
        On: FnMut() -> State,
    {
        let mut layout = Layout::with_clock(clock);

        let generated = [
            off_state_generator(),
            on_state_generator(),
            off_state_generator(),
            on_state_generator(),
            off_state_generator(),
            on_state_generator(),
        ];
        let [off, on, off_duration, on_duration, blink_off, blink_on] =
            generated.map(|state| layout.add_state(state.with_monitoring()));
        let [blink_begin, blink_stop_begin, blink_stop_end] = [
            "blink begin",
            "blink stop begin",
            "blink stop end",
        ]
        .map(|name| layout.add_state(State::monitored(name)));

        let states = BlinkerStates {
            off,
            on,
            off_duration,
            on_duration,
            blink_begin,
            blink_on,
            blink_off,
            blink_stop_begin,
            blink_stop_end,
        };
        let conditions = wire(&mut layout, &states)?;
        layout.set_initial_state(off)?;

        Ok(Self {
            machine: FiniteStateMachine::initialized(layout)?,
            states,
            conditions,
        })
    }

    pub fn states(&self) -> &BlinkerStates {
        &self.states
    }

    pub fn machine(&self) -> &FiniteStateMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut FiniteStateMachine {
        &mut self.machine
    }

    pub fn is_on(&self) -> bool {
        self.current_in(self.states.on_states())
    }

    pub fn is_off(&self) -> bool {
        self.current_in(self.states.off_states())
    }

    fn current_in(&self, states: [StateId; 3]) -> bool {
        self.machine
            .current_applicative_state()
            .is_some_and(|current| states.contains(&current))
    }

    /// Turn on; with a duration, turn back off once it has passed.
    pub fn turn_on(&mut self, duration: Option<Duration>) -> Result<(), FsmError> {
        debug!(?duration, "Blinker turned on");
        match duration {
            None => self.machine.transit_to(self.states.on),
            Some(duration) => {
                self.machine
                    .layout_mut()
                    .set_condition_duration(self.conditions.on_duration, duration)?;
                self.machine.transit_to(self.states.on_duration)
            }
        }
    }

    /// Turn off; with a duration, turn back on once it has passed.
    pub fn turn_off(&mut self, duration: Option<Duration>) -> Result<(), FsmError> {
        debug!(?duration, "Blinker turned off");
        match duration {
            None => self.machine.transit_to(self.states.off),
            Some(duration) => {
                self.machine
                    .layout_mut()
                    .set_condition_duration(self.conditions.off_duration, duration)?;
                self.machine.transit_to(self.states.off_duration)
            }
        }
    }

    /// Start a blink sequence; see [`BlinkOptions`] for accepted combinations.
    pub fn blink(&mut self, options: BlinkOptions) -> Result<(), FsmError> {
        let plan = options.plan()?;
        let (on_time, off_time) = options.split(plan.cycle());
        debug!(?plan, ?on_time, ?off_time, "Blinker blinking");

        let states = self.states;
        let conditions = self.conditions;
        let layout = self.machine.layout_mut();
        layout.set_condition_duration(conditions.blink_on, on_time)?;
        layout.set_condition_duration(conditions.blink_off, off_time)?;
        layout.set_custom_value(states.blink_begin, side(options.begin_on))?;

        match plan {
            BlinkPlan::Indefinite { .. } => {
                layout.set_custom_value(states.blink_stop_begin, UNBOUNDED)?;
                self.machine.transit_to(states.blink_begin)
            }
            BlinkPlan::Bounded { total, .. } => {
                layout.set_condition_duration(conditions.blink_stop, total)?;
                layout.set_custom_value(states.blink_stop_begin, BOUNDED)?;
                layout.set_custom_value(states.blink_stop_end, side(!options.end_off))?;
                self.machine.transit_to(states.blink_stop_begin)
            }
        }
    }

    /// Advance the underlying machine by one poll.
    pub fn track(&mut self) -> Result<bool, FsmError> {
        self.machine.track()
    }

    /// Return to steady off.
    pub fn reset(&mut self) -> Result<(), FsmError> {
        self.machine.reset()
    }
}

impl std::fmt::Debug for Blinker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blinker")
            .field("states", &self.states)
            .field("current", &self.machine.current_applicative_state())
            .finish_non_exhaustive()
    }
}

fn side(on: bool) -> &'static str {
    if on {
        ON
    } else {
        OFF
    }
}

fn link(
    layout: &mut Layout,
    from: StateId,
    to: StateId,
    condition: ConditionId,
) -> Result<usize, FsmError> {
    layout.add_transition(from, Transition::new(to, condition))
}

fn entry_timer(layout: &mut Layout, state: StateId) -> Result<ConditionId, FsmError> {
    layout.add_condition(Condition::state_entry_duration(Duration::ZERO, state))
}

fn wire(layout: &mut Layout, s: &BlinkerStates) -> Result<BlinkerConditions, FsmError> {
    // timed on/off revert to the opposite steady state
    let on_duration = entry_timer(layout, s.on_duration)?;
    let off_duration = entry_timer(layout, s.off_duration)?;
    link(layout, s.on_duration, s.off, on_duration)?;
    link(layout, s.off_duration, s.on, off_duration)?;

    // bounded sequences enter through blink_stop_begin
    let armed = layout.add_condition(Condition::state_value(BOUNDED, s.blink_stop_begin))?;
    let total = entry_timer(layout, s.blink_stop_begin)?;
    let blink_stop = layout.add_condition(Condition::all([armed, total]))?;
    let always = layout.add_condition(Condition::always_true())?;
    link(layout, s.blink_stop_begin, s.blink_begin, always)?;

    let begin_on = layout.add_condition(Condition::state_value(ON, s.blink_begin))?;
    let begin_off = layout.add_condition(Condition::state_value(OFF, s.blink_begin))?;
    link(layout, s.blink_begin, s.blink_on, begin_on)?;
    link(layout, s.blink_begin, s.blink_off, begin_off)?;

    // stop guard first: a finished sequence never toggles again
    let blink_on = entry_timer(layout, s.blink_on)?;
    let blink_off = entry_timer(layout, s.blink_off)?;
    link(layout, s.blink_on, s.blink_stop_end, blink_stop)?;
    link(layout, s.blink_on, s.blink_off, blink_on)?;
    link(layout, s.blink_off, s.blink_stop_end, blink_stop)?;
    link(layout, s.blink_off, s.blink_on, blink_off)?;

    let end_on = layout.add_condition(Condition::state_value(ON, s.blink_stop_end))?;
    let end_off = layout.add_condition(Condition::state_value(OFF, s.blink_stop_end))?;
    link(layout, s.blink_stop_end, s.on, end_on)?;
    link(layout, s.blink_stop_end, s.off, end_off)?;

    Ok(BlinkerConditions {
        on_duration,
        off_duration,
        blink_on,
        blink_off,
        blink_stop,
    })
}
