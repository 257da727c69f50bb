//! Trait normalization
//!
//! Raw records in, [`FeatureVector`] out.

pub mod feature_vector;
pub mod normalizer;

pub use feature_vector::{Feature, FeatureSource, FeatureVector};
pub use normalizer::{normalize, validate_farm, HistorySummary, Normalizer, DEFAULT_HISTORY_WINDOW};
