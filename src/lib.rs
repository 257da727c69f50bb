//! Seed Recommender
//!
//! Ranks a catalog of seed varieties for one farm and one growing season.
//!
//! Pipeline per request:
//! - `features/`: farm + seed + climate history → bounded feature vector
//! - `metrics/`: climate, soil and market sub-scores, yield estimate, risk
//! - `scorer`: runs the metrics over the catalog (Rayon)
//! - `ranking`: composite score, budget and risk filters, total order
//! - `explanation/`: reasoning statements and planting guidance
//! - `engine`: the stateless pipeline; `service`: façade over collaborators
//!
//! The engine never fabricates precision: missing inputs are imputed with a
//! neutral value, flagged, and capped in every score they touch.

pub mod utils;
pub mod error;
pub mod config;
pub mod profiles;
pub mod features;
pub mod metrics;
pub mod recommendation;
pub mod scorer;
pub mod ranking;
pub mod explanation;
pub mod engine;
pub mod service;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::{recommend, RecommendationEngine, RecommendationRequest};
pub use error::{EngineError, Result};
pub use features::{normalize, Feature, FeatureVector, Normalizer};
pub use metrics::{RiskFactor, RiskLevel, ScoreBreakdown, YieldEstimate};
pub use profiles::*;
pub use recommendation::{
    ImputedDataWarning, NoCandidatesReason, Recommendation, RecommendationSet, RecommendationStatus,
};
pub use scorer::{CatalogScorer, Candidate};
pub use service::{
    FarmDirectory, InMemoryCatalog, InMemoryFarmDirectory, InMemoryRecommendationStore,
    RecommendationService, RecommendationStore, SeedCatalog,
};
