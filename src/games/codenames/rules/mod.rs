//! Game rules: scoring, win detection and the transition function.

mod scoring;
mod transition;

pub use scoring::{Consequence, score_reveal};
pub use transition::{Discard, Effect, Event, Transition, transition};
