//! Layout checks using Validation.

use crate::core::{Layout, State, StateId};
use crate::validation::violations::LayoutViolation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of a single layout check.
pub type LayoutCheck = Validation<(), NonEmptyVec<LayoutViolation>>;

/// Run every structural check, accumulating ALL violations.
pub fn validate_layout(layout: &Layout) -> LayoutCheck {
    let mut checks = vec![check_initial_state(layout)];
    checks.extend(layout.states().map(|(id, state)| check_transitions(id, state)));

    Validation::all_vec(checks).map(|_| ())
}

fn check_initial_state(layout: &Layout) -> LayoutCheck {
    match layout.initial_state() {
        Some(_) => Validation::success(()),
        None => Validation::fail(LayoutViolation::MissingInitialState),
    }
}

/// A state with no way out must be declared terminal.
fn check_transitions(id: StateId, state: &State) -> LayoutCheck {
    if state.is_terminal() || !state.transitions().is_empty() {
        Validation::success(())
    } else {
        Validation::fail(LayoutViolation::NoTransitions {
            state: id,
            name: state.name().to_string(),
        })
    }
}
