//! Blinker and side-blinker behaviors under simulated time.

use statebot::blinker::{BlinkOptions, Blinker, Side, SideBlinkers};
use statebot::clock::ManualClock;
use statebot::core::State;
use statebot::error::FsmError;
use std::rc::Rc;
use std::time::Duration;

const STEP: Duration = Duration::from_millis(10);

fn blinker() -> (Blinker, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new());
    let blinker = Blinker::with_clock(
        || State::new("led off"),
        || State::new("led on"),
        clock.clone(),
    )
    .unwrap();
    (blinker, clock)
}

/// Poll every `STEP` for `span`, returning how many polls saw the blinker on.
fn run_for(blinker: &mut Blinker, clock: &ManualClock, span: Duration) -> (u32, u32) {
    let (mut on, mut off) = (0, 0);
    let mut elapsed = Duration::ZERO;
    while elapsed < span {
        clock.advance(STEP);
        elapsed += STEP;
        blinker.track().unwrap();
        assert!(
            blinker.is_on() != blinker.is_off(),
            "a blinking output is either on or off"
        );
        if blinker.is_on() {
            on += 1;
        } else {
            off += 1;
        }
    }
    (on, off)
}

#[test]
fn indefinite_blink_follows_duty_cycle() {
    let (mut blinker, clock) = blinker();
    blinker
        .blink(
            BlinkOptions::every(Duration::from_secs(1))
                .percent_on(0.25)
                .begin_on(true),
        )
        .unwrap();
    blinker.track().unwrap();
    assert!(blinker.is_on());

    // the on side lasts 0.25s, the off side 0.75s, over and over
    let (on, off) = run_for(&mut blinker, &clock, Duration::from_secs(10));
    let ratio = f64::from(on) / f64::from(on + off);
    assert!((0.2..0.3).contains(&ratio), "on ratio was {ratio}");
}

#[test]
fn indefinite_blink_switches_at_the_boundaries() {
    let (mut blinker, clock) = blinker();
    blinker
        .blink(BlinkOptions::every(Duration::from_secs(1)).percent_on(0.25))
        .unwrap();
    blinker.track().unwrap();

    clock.advance(Duration::from_millis(250));
    blinker.track().unwrap();
    assert!(blinker.is_on(), "exactly the on time is not enough");

    clock.advance(Duration::from_millis(1));
    blinker.track().unwrap();
    assert!(blinker.is_off());

    clock.advance(Duration::from_millis(750));
    blinker.track().unwrap();
    assert!(blinker.is_off());

    clock.advance(Duration::from_millis(1));
    blinker.track().unwrap();
    assert!(blinker.is_on());
}

#[test]
fn bounded_blink_lands_off_and_stays_off() {
    let (mut blinker, clock) = blinker();
    blinker
        .blink(
            BlinkOptions::new()
                .total_duration(Duration::from_secs(3))
                .cycle_duration(Duration::from_secs(1))
                .end_off(true),
        )
        .unwrap();

    let mut toggles = 0;
    let mut was_on = false;
    for _ in 0..350 {
        clock.advance(STEP);
        blinker.track().unwrap();
        if blinker.is_on() && !was_on {
            toggles += 1;
        }
        was_on = blinker.is_on();
    }

    assert!(blinker.is_off());
    assert_eq!(
        blinker.machine().current_applicative_state(),
        Some(blinker.states().off)
    );
    assert_eq!(toggles, 3);

    let landed = blinker.machine().history().len();
    for _ in 0..200 {
        clock.advance(STEP);
        blinker.track().unwrap();
    }
    assert!(blinker.is_off());
    assert_eq!(blinker.machine().history().len(), landed);
}

#[test]
fn bounded_blink_can_land_on() {
    let (mut blinker, clock) = blinker();
    blinker
        .blink(
            BlinkOptions::new()
                .cycle_duration(Duration::from_millis(200))
                .n_cycles(5)
                .end_off(false),
        )
        .unwrap();

    for _ in 0..150 {
        clock.advance(STEP);
        blinker.track().unwrap();
    }

    assert!(blinker.is_on());
    assert_eq!(
        blinker.machine().current_applicative_state(),
        Some(blinker.states().on)
    );
}

#[test]
fn timed_turn_on_reverts_off() {
    let (mut blinker, clock) = blinker();
    blinker.turn_on(Some(Duration::from_millis(500))).unwrap();

    let (on, _) = run_for(&mut blinker, &clock, Duration::from_secs(1));

    assert!(blinker.is_off());
    assert_eq!(on, 50);
}

#[test]
fn invalid_blink_options_are_rejected() {
    let (mut blinker, _) = blinker();
    let cycle = Duration::from_secs(1);

    let cases = [
        BlinkOptions::every(cycle).percent_on(1.01),
        BlinkOptions::new().total_duration(cycle).n_cycles(0),
        BlinkOptions::new().total_duration(cycle),
        BlinkOptions::new()
            .total_duration(cycle)
            .cycle_duration(cycle)
            .n_cycles(2),
    ];

    for options in cases {
        assert!(matches!(
            blinker.blink(options),
            Err(FsmError::InvalidArgument(_))
        ));
        assert!(blinker.is_off());
    }
}

fn side_blinkers() -> (SideBlinkers, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new());
    let blinkers = SideBlinkers::with_clock(
        || State::new("left off"),
        || State::new("left on"),
        || State::new("right off"),
        || State::new("right on"),
        clock.clone(),
    )
    .unwrap();
    (blinkers, clock)
}

#[test]
fn left_reciprocal_turns_left_on_and_right_off() {
    let (mut blinkers, _) = side_blinkers();
    blinkers.turn_on(Side::Right, None).unwrap();

    blinkers.turn_on(Side::LeftReciprocal, None).unwrap();

    assert!(blinkers.left().is_on());
    assert!(blinkers.right().is_off());
    assert!(blinkers.is_on(Side::LeftReciprocal));
    assert!(!blinkers.is_on(Side::RightReciprocal));
    assert!(!blinkers.is_on(Side::Both));
    assert!(blinkers.is_off(Side::RightReciprocal));
}

#[test]
fn reciprocal_predicates_need_both_sides() {
    let (mut blinkers, _) = side_blinkers();

    blinkers.turn_on(Side::Both, None).unwrap();
    assert!(!blinkers.is_on(Side::LeftReciprocal));
    assert!(!blinkers.is_on(Side::RightReciprocal));
    assert!(blinkers.is_on(Side::Both));

    blinkers.turn_off(Side::Left, None).unwrap();
    assert!(blinkers.is_on(Side::RightReciprocal));
    assert!(blinkers.is_off(Side::LeftReciprocal));
}

#[test]
fn both_sides_blink_in_phase() {
    let (mut blinkers, clock) = side_blinkers();
    blinkers
        .blink(Side::Both, BlinkOptions::every(Duration::from_millis(400)))
        .unwrap();

    for _ in 0..100 {
        clock.advance(STEP);
        blinkers.track().unwrap();
        assert_eq!(blinkers.left().is_on(), blinkers.right().is_on());
    }
}
