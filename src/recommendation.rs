//! Recommendation output types
//!
//! Everything the engine hands back. These are the only records that
//! outlive a request: the caller's store persists the final list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Subject;
use crate::features::{Feature, FeatureSource};
use crate::metrics::{RiskFactor, RiskLevel, ScoreBreakdown, YieldEstimate};
use crate::profiles::{CropType, Season};

/// A feature that was imputed for one recommendation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImputedDataWarning {
    pub subject: Subject,
    pub field: Feature,
    pub message: String,
}

impl ImputedDataWarning {
    pub fn new(farm_id: &str, seed_id: &str, field: Feature) -> Self {
        let subject = match field.source() {
            FeatureSource::Farm => Subject::Farm(farm_id.to_string()),
            FeatureSource::Seed => Subject::Seed(seed_id.to_string()),
        };
        let message = format!("{} missing for {}; neutral value used", field.label(), subject);
        Self { subject, field, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReference {
    pub id: String,
    pub variety_name: String,
    pub crop_type: CropType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantingWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantingRecommendation {
    pub window: Option<PlantingWindow>,
    pub expected_harvest: Option<NaiveDate>,
    pub seed_rate_kg_ha: Option<f64>,
    pub fertilizer_hints: Vec<String>,
    pub estimated_cost_per_ha: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// `{farm}:{season}-{year}:{seed}`
    pub id: String,
    pub farm_id: String,
    pub seed: SeedReference,
    pub rank: usize,
    pub compatibility_score: f64,
    pub scores: ScoreBreakdown,
    pub predicted_yield: YieldEstimate,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<RiskFactor>,
    pub reasoning: Vec<String>,
    pub planting: PlantingRecommendation,
    pub exceeds_risk_tolerance: bool,
    pub low_confidence: bool,
    pub warnings: Vec<ImputedDataWarning>,
}

pub fn recommendation_id(farm_id: &str, season: Season, year: i32, seed_id: &str) -> String {
    format!("{}:{}-{}:{}", farm_id, season.code(), year, seed_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoCandidatesReason {
    EmptyCatalog,
    NoAvailableSeeds,
    NoCropMatch(CropType),
    OverBudget,
}

impl NoCandidatesReason {
    pub fn display_text(&self) -> String {
        match self {
            NoCandidatesReason::EmptyCatalog => "the seed catalog is empty".to_string(),
            NoCandidatesReason::NoAvailableSeeds => "no seed in the catalog is available".to_string(),
            NoCandidatesReason::NoCropMatch(crop) => {
                format!("no available seed matches crop type {}", crop.display_name())
            }
            NoCandidatesReason::OverBudget => "every candidate exceeds the budget per hectare".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Ranked,
    NoCandidates(NoCandidatesReason),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum ExclusionReason {
    Unavailable,
    CropTypeMismatch { crop_type: CropType },
    OverBudget { estimated_cost_per_ha: f64, budget_per_ha: f64 },
    ExceedsRiskTolerance { level: RiskLevel },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub seed_id: String,
    #[serde(flatten)]
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub farm_id: String,
    pub season: Season,
    pub year: i32,
    pub status: RecommendationStatus,
    pub recommendations: Vec<Recommendation>,
    pub excluded: Vec<Exclusion>,
}

impl RecommendationSet {
    pub fn no_candidates(
        farm_id: &str,
        season: Season,
        year: i32,
        reason: NoCandidatesReason,
        excluded: Vec<Exclusion>,
    ) -> Self {
        Self {
            farm_id: farm_id.to_string(),
            season,
            year,
            status: RecommendationStatus::NoCandidates(reason),
            recommendations: Vec::new(),
            excluded,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}
