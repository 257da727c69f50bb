//! Utility modules shared by the normalizer and the scoring metrics
//!
//! - Normalization: fixed scaling ranges onto [0, 1]
//! - Envelope: requirement-range comparison with linear decay

pub mod normalization;
pub mod envelope;

pub use normalization::{ScaleRange, NEUTRAL_VALUE, finite, clamp_unit};
pub use envelope::{RangeFit, RangeComparison, compare_to_range};
