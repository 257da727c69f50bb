//! Request parameters
//!
//! What the farmer asks for: season and year, optional targets and
//! constraints, and how much risk they are willing to carry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::seed::CropType;
use crate::metrics::risk::RiskLevel;

/// Growing season. A runs March–June, B September–December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "perennial")]
    Perennial,
}

impl Season {
    pub fn code(&self) -> &'static str {
        match self {
            Season::A => "A",
            Season::B => "B",
            Season::Perennial => "perennial",
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            Season::A => "Season A (March-June)",
            Season::B => "Season B (September-December)",
            Season::Perennial => "Perennial",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    /// Whether a candidate in the given risk bucket passes the hard filter
    pub fn admits(&self, level: RiskLevel) -> bool {
        match self {
            RiskTolerance::Conservative => level == RiskLevel::Low,
            RiskTolerance::Moderate => level <= RiskLevel::Medium,
            RiskTolerance::Aggressive => true,
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Moderate => "moderate",
            RiskTolerance::Aggressive => "aggressive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPreference {
    Local,
    Regional,
    Export,
}

/// Per-request composite weight overrides. Absent entries keep the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightOverrides {
    pub climate: Option<f64>,
    pub soil: Option<f64>,
    pub risk: Option<f64>,
    pub market: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    pub season: Season,
    pub year: i32,
    #[serde(default)]
    pub planting_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_yield_t_ha: Option<f64>,
    #[serde(default)]
    pub budget_per_hectare: Option<f64>,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
    #[serde(default)]
    pub crop_type: Option<CropType>,
    #[serde(default)]
    pub market_preference: Option<MarketPreference>,
    #[serde(default)]
    pub weights: Option<WeightOverrides>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl RequestParameters {
    pub fn new(season: Season, year: i32) -> Self {
        Self {
            season,
            year,
            planting_date: None,
            target_yield_t_ha: None,
            budget_per_hectare: None,
            risk_tolerance: RiskTolerance::default(),
            crop_type: None,
            market_preference: None,
            weights: None,
            max_results: None,
        }
    }

    pub fn with_crop_type(mut self, crop_type: CropType) -> Self {
        self.crop_type = Some(crop_type);
        self
    }

    pub fn with_budget(mut self, budget_per_hectare: f64) -> Self {
        self.budget_per_hectare = Some(budget_per_hectare);
        self
    }

    /// Budget usable for filtering; NaN, infinite and negative values count as no budget
    pub fn effective_budget(&self) -> Option<f64> {
        self.budget_per_hectare.filter(|b| b.is_finite() && *b >= 0.0)
    }

    pub fn with_risk_tolerance(mut self, tolerance: RiskTolerance) -> Self {
        self.risk_tolerance = tolerance;
        self
    }

    pub fn with_target_yield(mut self, target_t_ha: f64) -> Self {
        self.target_yield_t_ha = Some(target_t_ha);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_tolerance_admits() {
        assert!(RiskTolerance::Conservative.admits(RiskLevel::Low));
        assert!(!RiskTolerance::Conservative.admits(RiskLevel::Medium));
        assert!(RiskTolerance::Moderate.admits(RiskLevel::Medium));
        assert!(!RiskTolerance::Moderate.admits(RiskLevel::High));
        assert!(RiskTolerance::Aggressive.admits(RiskLevel::High));
    }

    #[test]
    fn test_season_serde_codes() {
        assert_eq!(serde_json::to_string(&Season::A).unwrap(), "\"A\"");
        let s: Season = serde_json::from_str("\"perennial\"").unwrap();
        assert_eq!(s, Season::Perennial);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let json = r#"{"season": "B", "year": 2025, "planting_date": "2025-09-10"}"#;
        let params: RequestParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.risk_tolerance, RiskTolerance::Moderate);
        assert_eq!(params.planting_date, NaiveDate::from_ymd_opt(2025, 9, 10));
        assert!(params.crop_type.is_none());
    }

    #[test]
    fn test_effective_budget() {
        let p = RequestParameters::new(Season::A, 2025);
        assert_eq!(p.effective_budget(), None);
        assert_eq!(p.clone().with_budget(0.0).effective_budget(), Some(0.0));
        assert_eq!(p.clone().with_budget(250.0).effective_budget(), Some(250.0));
        assert_eq!(p.clone().with_budget(f64::NAN).effective_budget(), None);
        assert_eq!(p.clone().with_budget(f64::INFINITY).effective_budget(), None);
        assert_eq!(p.with_budget(-1.0).effective_budget(), None);
    }
}
