//! Explanations for ranked candidates
//!
//! Reasoning statements and planting guidance. Everything here reads
//! computed values only; presentation (HTML, markdown) is left to callers.

pub mod types;
pub mod fragments;
pub mod generator;
pub mod planting;

pub use types::{FitLabel, ReasoningFragment};
pub use fragments::{generate_signal_fragment, generate_signal_fragments};
pub use generator::{ReasoningContext, ReasoningGenerator};
pub use planting::{estimated_cost_per_ha, expected_harvest, fertilizer_hints, plan, planting_window};
