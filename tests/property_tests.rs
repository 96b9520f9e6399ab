//! Property-based tests for conditions, history and blink options.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use chrono::Utc;
use proptest::prelude::*;
use statebot::blinker::{BlinkOptions, BlinkPlan};
use statebot::clock::ManualClock;
use statebot::core::{
    Condition, ConditionId, Layout, State, StateId, Transition, TransitionCause,
    TransitionHistory, TransitionRecord,
};
use statebot::machine::FiniteStateMachine;
use std::rc::Rc;
use std::time::Duration;

/// Shape of a condition tree, with the value each node should evaluate to.
#[derive(Clone, Debug)]
enum Tree {
    Always { inverse: bool },
    Value { actual: u8, expected: u8, inverse: bool },
    All { children: Vec<Tree>, inverse: bool },
    Any { children: Vec<Tree>, inverse: bool },
    None { children: Vec<Tree>, inverse: bool },
}

impl Tree {
    fn expected(&self) -> bool {
        match self {
            Tree::Always { inverse } => !inverse,
            Tree::Value {
                actual,
                expected,
                inverse,
            } => inverse ^ (actual == expected),
            Tree::All { children, inverse } => inverse ^ children.iter().all(Tree::expected),
            Tree::Any { children, inverse } => inverse ^ children.iter().any(Tree::expected),
            Tree::None { children, inverse } => inverse ^ !children.iter().any(Tree::expected),
        }
    }

    fn build(&self, layout: &mut Layout, flip_root: bool) -> ConditionId {
        match self {
            Tree::Always { inverse } => layout
                .add_condition(Condition::always_true().with_inverse(inverse ^ flip_root))
                .unwrap(),
            Tree::Value {
                actual,
                expected,
                inverse,
            } => layout
                .add_condition(
                    Condition::value(*actual, *expected).with_inverse(inverse ^ flip_root),
                )
                .unwrap(),
            Tree::All { children, inverse } => {
                composite(layout, children, |ids| Condition::all(ids), inverse ^ flip_root)
            }
            Tree::Any { children, inverse } => {
                composite(layout, children, |ids| Condition::any(ids), inverse ^ flip_root)
            }
            Tree::None { children, inverse } => {
                composite(layout, children, |ids| Condition::none(ids), inverse ^ flip_root)
            }
        }
    }
}

fn composite(
    layout: &mut Layout,
    children: &[Tree],
    make: fn(Vec<ConditionId>) -> Condition,
    inverse: bool,
) -> ConditionId {
    let ids: Vec<_> = children.iter().map(|c| c.build(layout, false)).collect();
    layout.add_condition(make(ids).with_inverse(inverse)).unwrap()
}

fn arbitrary_tree() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(|inverse| Tree::Always { inverse }),
        (0..3u8, 0..3u8, any::<bool>()).prop_map(|(actual, expected, inverse)| Tree::Value {
            actual,
            expected,
            inverse
        }),
    ];

    leaf.prop_recursive(4, 32, 4, |inner| {
        let children = prop::collection::vec(inner, 0..4);
        prop_oneof![
            (children.clone(), any::<bool>())
                .prop_map(|(children, inverse)| Tree::All { children, inverse }),
            (children.clone(), any::<bool>())
                .prop_map(|(children, inverse)| Tree::Any { children, inverse }),
            (children, any::<bool>())
                .prop_map(|(children, inverse)| Tree::None { children, inverse }),
        ]
    })
}

fn ids(n: usize) -> Vec<StateId> {
    let mut layout = Layout::new();
    layout.add_states((0..n).map(|i| State::new(format!("s{i}"))))
}

proptest! {
    #[test]
    fn condition_trees_evaluate_like_their_model(tree in arbitrary_tree()) {
        let mut layout = Layout::new();
        let id = tree.build(&mut layout, false);

        prop_assert_eq!(layout.evaluate(id).unwrap(), tree.expected());
    }

    #[test]
    fn inverse_negates_evaluation(tree in arbitrary_tree()) {
        let mut layout = Layout::new();
        let plain = tree.build(&mut layout, false);
        let flipped = tree.build(&mut layout, true);

        let plain = layout.evaluate(plain).unwrap();
        let flipped = layout.evaluate(flipped).unwrap();
        prop_assert_eq!(flipped, !plain);
    }

    #[test]
    fn evaluation_is_repeatable(tree in arbitrary_tree()) {
        let mut layout = Layout::new();
        let id = tree.build(&mut layout, false);

        let first = layout.evaluate(id).unwrap();
        let second = layout.evaluate(id).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn timed_condition_holds_only_before_its_duration(
        duration_ms in 0..5_000u64,
        elapsed_ms in 0..10_000u64,
    ) {
        let clock = Rc::new(ManualClock::new());
        let mut layout = Layout::with_clock(clock.clone());
        let timer = layout
            .add_condition(Condition::timed(Duration::from_millis(duration_ms)))
            .unwrap();

        clock.advance(Duration::from_millis(elapsed_ms));
        prop_assert_eq!(layout.evaluate(timer).unwrap(), elapsed_ms < duration_ms);
    }

    #[test]
    fn entry_duration_holds_only_strictly_after_its_duration(
        duration_ms in 0..5_000u64,
        elapsed_ms in 0..10_000u64,
    ) {
        let clock = Rc::new(ManualClock::new());
        let mut layout = Layout::with_clock(clock.clone());
        let watched = layout.add_state(State::monitored("watched"));
        let other = layout.add_state(State::new("other"));
        let waited = layout
            .add_condition(Condition::state_entry_duration(
                Duration::from_millis(duration_ms),
                watched,
            ))
            .unwrap();
        layout.add_transition(watched, Transition::new(other, waited)).unwrap();
        layout.set_initial_state(watched).unwrap();
        let mut machine = FiniteStateMachine::initialized(layout).unwrap();

        clock.advance(Duration::from_millis(elapsed_ms));
        prop_assert_eq!(
            machine.layout_mut().evaluate(waited).unwrap(),
            elapsed_ms > duration_ms
        );
    }

    #[test]
    fn entry_count_fires_once_per_batch_of_entries(expected in 1..6u64, entries in 0..30u64) {
        let mut layout = Layout::new();
        let watched = layout.add_state(State::monitored("watched"));
        let away = layout.add_state(State::new("away"));
        let counted = layout
            .add_condition(Condition::state_entry_count(expected, watched, true))
            .unwrap();
        let always = layout.add_condition(Condition::always_true()).unwrap();
        layout.add_transition(away, Transition::new(watched, always)).unwrap();
        layout.add_transition(watched, Transition::new(away, always)).unwrap();
        layout.set_initial_state(away).unwrap();
        let mut machine = FiniteStateMachine::initialized(layout).unwrap();

        let mut fired = 0;
        for _ in 0..entries {
            machine.transit_to(watched).unwrap();
            if machine.layout_mut().evaluate(counted).unwrap() {
                fired += 1;
                let monitor = machine.layout().state(watched).unwrap().monitor().unwrap();
                prop_assert_eq!(monitor.entry_count(), 0);
            }
        }

        prop_assert_eq!(fired, entries / expected);
    }

    #[test]
    fn history_keeps_the_most_recent_records(capacity in 0..8usize, moves in 0..20usize) {
        let states = ids(2);
        let mut history = TransitionHistory::with_capacity(capacity);

        for i in 0..moves {
            history.record(TransitionRecord {
                from: states[i % 2],
                to: states[(i + 1) % 2],
                cause: TransitionCause::Condition { index: i },
                timestamp: Utc::now(),
            });
        }

        prop_assert_eq!(history.len(), capacity.min(moves));
        if let Some(last) = history.last() {
            prop_assert_eq!(last.cause, TransitionCause::Condition { index: moves - 1 });
        }
    }

    #[test]
    fn indefinite_blink_accepts_any_valid_percent(
        cycle_ms in 0..10_000u64,
        percent in 0.0..=1.0f64,
    ) {
        let options = BlinkOptions::every(Duration::from_millis(cycle_ms)).percent_on(percent);
        let plan = options.plan().unwrap();
        prop_assert_eq!(plan, BlinkPlan::Indefinite { cycle: Duration::from_millis(cycle_ms) });
    }

    #[test]
    fn bounded_blink_derives_missing_duration(cycle_ms in 1..2_000u64, n_cycles in 1..20u32) {
        let cycle = Duration::from_millis(cycle_ms);
        let from_cycle = BlinkOptions::new()
            .cycle_duration(cycle)
            .n_cycles(n_cycles)
            .plan()
            .unwrap();
        let from_total = BlinkOptions::new()
            .total_duration(cycle * n_cycles)
            .n_cycles(n_cycles)
            .plan()
            .unwrap();

        prop_assert_eq!(from_cycle, BlinkPlan::Bounded { total: cycle * n_cycles, cycle });
        prop_assert_eq!(from_total, from_cycle);
    }
}
