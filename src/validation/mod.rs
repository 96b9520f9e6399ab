//! Structural validation of layouts.
//!
//! Uses Stillwater's `Validation` type so a single pass reports every
//! problem instead of stopping at the first one.
//!
//! # Example
//!
//! ```rust
//! use statebot::core::{Layout, State};
//! use statebot::validation::LayoutViolation;
//! use stillwater::validation::Validation;
//!
//! let mut layout = Layout::new();
//! layout.add_state(State::new("nowhere to go"));
//!
//! match layout.validate() {
//!     Validation::Failure(violations) => assert_eq!(violations.len(), 2),
//!     Validation::Success(_) => unreachable!(),
//! }
//! ```

pub mod rules;
pub mod violations;

pub use rules::{validate_layout, LayoutCheck};
pub use violations::LayoutViolation;
