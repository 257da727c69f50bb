//! Scoring metrics for one (farm, seed) feature vector
//!
//! Each metric lives in its own module and is a pure function of the feature
//! vector and the engine configuration:
//!
//! - compatibility: climate and soil sub-scores
//! - market: market potential sub-score
//! - yield_prediction: expected yield and interval
//! - risk: bounded risk score and discrete risk factors
//! - confidence: data completeness → confidence level

pub mod compatibility;
pub mod market;
pub mod yield_prediction;
pub mod risk;
pub mod confidence;

pub use compatibility::{score, score_climate, score_soil, CompatibilityResult};
pub use market::score_market;
pub use yield_prediction::{predict, YieldEstimate, YieldMethod};
pub use risk::{assess, RiskAssessment, RiskFactor, RiskKind, RiskLevel};
pub use confidence::confidence_level;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::features::Feature;
use crate::utils::normalization::{clamp_unit, NEUTRAL_VALUE};

/// Individual contribution inside a sub-score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    Rainfall,
    Temperature,
    Altitude,
    ClimateTier,
    Drought,
    Waterlogging,
    SoilPh,
    OrganicMatter,
    Drainage,
    Texture,
    Nutrients,
    MarketDemand,
}

impl ScoreComponent {
    pub fn display_text(&self) -> &'static str {
        match self {
            ScoreComponent::Rainfall => "rainfall",
            ScoreComponent::Temperature => "temperature",
            ScoreComponent::Altitude => "altitude",
            ScoreComponent::ClimateTier => "climate zone",
            ScoreComponent::Drought => "drought",
            ScoreComponent::Waterlogging => "waterlogging",
            ScoreComponent::SoilPh => "soil pH",
            ScoreComponent::OrganicMatter => "organic matter",
            ScoreComponent::Drainage => "drainage",
            ScoreComponent::Texture => "soil texture",
            ScoreComponent::Nutrients => "soil nutrients",
            ScoreComponent::MarketDemand => "market demand",
        }
    }
}

/// Raw contributing signal kept for the explainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSignal {
    pub component: ScoreComponent,
    /// Component fit on [0, 1]
    pub score: f64,
    /// Share of the sub-score this component carries (weights sum to 1)
    pub weight: f64,
    pub imputed: bool,
    /// Factual statement with raw values, e.g. "soil pH 6.5 within required 5.5-7.5"
    pub detail: String,
}

impl ScoreSignal {
    pub fn new(component: ScoreComponent, score: f64, weight: f64, imputed: bool, detail: String) -> Self {
        Self { component, score: clamp_unit(score), weight, imputed, detail }
    }
}

/// Per-candidate component buffer; a sub-score never has more than six
pub type SignalBuffer = SmallVec<[ScoreSignal; 8]>;

/// One sub-score with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub score: f64,
    pub signals: Vec<ScoreSignal>,
    pub imputed_features: Vec<Feature>,
    /// Leaned on imputed data, or no requirement was stated at all
    pub imputed: bool,
}

impl SubScore {
    /// Neutral score for a seed that states no requirement
    pub fn unstated() -> Self {
        Self {
            score: NEUTRAL_VALUE,
            signals: Vec::new(),
            imputed_features: Vec::new(),
            imputed: true,
        }
    }

    /// Weighted mean of the signals, capped when any signal was imputed
    pub fn combine(signals: SignalBuffer, mut imputed_features: Vec<Feature>, imputed_cap: f64) -> Self {
        let total: f64 = signals.iter().map(|s| s.weight).filter(|w| *w > 0.0).sum();
        if signals.is_empty() || total <= 0.0 {
            return Self::unstated();
        }

        let mut raw = 0.0;
        let mut imputed = false;
        let mut normalized = Vec::with_capacity(signals.len());
        for mut s in signals {
            let w = s.weight.max(0.0) / total;
            raw += w * s.score;
            imputed |= s.imputed;
            s.weight = w;
            normalized.push(s);
        }

        let mut score = clamp_unit(raw);
        if imputed {
            score = score.min(imputed_cap);
        }

        imputed_features.sort();
        imputed_features.dedup();

        Self { score, signals: normalized, imputed_features, imputed }
    }
}

/// Sub-scores and provenance for one candidate. Every score lies in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub climate_score: f64,
    pub soil_score: f64,
    pub risk_score: f64,
    pub market_score: f64,
    pub confidence_level: f64,
    pub signals: Vec<ScoreSignal>,
    pub imputed_features: Vec<Feature>,
}
