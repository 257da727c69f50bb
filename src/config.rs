//! Engine configuration
//!
//! Every tunable constant of the scoring pipeline lives here so that the
//! engine itself stays a pure function of (inputs, config). `Default` holds
//! the production values; `load` reads a JSON override file where any
//! omitted field keeps its default.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::metrics::risk::RiskLevel;
use crate::profiles::{RiskTolerance, WeightOverrides};

/// Composite weights over the four sub-scores (risk enters as `1 - risk`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    pub climate: f64,
    pub soil: f64,
    pub risk: f64,
    pub market: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self { climate: 0.35, soil: 0.30, risk: 0.20, market: 0.15 }
    }
}

impl CompositeWeights {
    pub fn sum(&self) -> f64 {
        self.climate + self.soil + self.risk + self.market
    }

    /// Scale so the weights sum to 1
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total <= 0.0 || !total.is_finite() {
            return Self::default();
        }
        Self {
            climate: self.climate / total,
            soil: self.soil / total,
            risk: self.risk / total,
            market: self.market / total,
        }
    }

    /// Effective weights for one request: overrides clamped to `bounds`,
    /// risk weight scaled by the farmer's tolerance, then renormalized so
    /// that every effective weight still lies within `bounds`.
    pub fn resolve(
        &self,
        overrides: Option<&WeightOverrides>,
        tolerance: RiskTolerance,
        bounds: WeightBounds,
        multipliers: &ToleranceMultipliers,
    ) -> Self {
        let pick = |default: f64, over: Option<f64>| -> f64 {
            match over.filter(|v| v.is_finite()) {
                Some(v) => bounds.clamp(v),
                None => default,
            }
        };

        let o = overrides.copied().unwrap_or_default();
        let resolved = Self {
            climate: pick(self.climate, o.climate),
            soil: pick(self.soil, o.soil),
            risk: pick(self.risk, o.risk) * multipliers.for_tolerance(tolerance),
            market: pick(self.market, o.market),
        };
        resolved.normalized().within(bounds)
    }

    /// Pin out-of-bounds weights to the nearest bound and spread the rest of
    /// the unit mass over the free weights. Expects normalized weights and
    /// feasible bounds (`4 × min <= 1 <= 4 × max`).
    fn within(self, bounds: WeightBounds) -> Self {
        let mut w = [self.climate, self.soil, self.risk, self.market];
        let mut pinned = [false; 4];

        for _ in 0..=w.len() {
            let mut changed = false;
            for i in 0..w.len() {
                if !pinned[i] && (w[i] < bounds.min || w[i] > bounds.max) {
                    w[i] = bounds.clamp(w[i]);
                    pinned[i] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            let pinned_sum: f64 = (0..w.len()).filter(|i| pinned[*i]).map(|i| w[i]).sum();
            let free_sum: f64 = (0..w.len()).filter(|i| !pinned[*i]).map(|i| w[i]).sum();
            if free_sum <= 0.0 {
                break;
            }
            let scale = (1.0 - pinned_sum) / free_sum;
            for i in 0..w.len() {
                if !pinned[i] {
                    w[i] *= scale;
                }
            }
        }

        Self { climate: w[0], soil: w[1], risk: w[2], market: w[3] }
    }
}

/// Per-weight bounds for request overrides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self { min: 0.05, max: 0.60 }
    }
}

impl WeightBounds {
    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}

/// How strongly each tolerance weighs risk in the composite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceMultipliers {
    pub conservative: f64,
    pub moderate: f64,
    pub aggressive: f64,
}

impl Default for ToleranceMultipliers {
    fn default() -> Self {
        Self { conservative: 1.5, moderate: 1.0, aggressive: 0.6 }
    }
}

impl ToleranceMultipliers {
    pub fn for_tolerance(&self, tolerance: RiskTolerance) -> f64 {
        match tolerance {
            RiskTolerance::Conservative => self.conservative,
            RiskTolerance::Moderate => self.moderate,
            RiskTolerance::Aggressive => self.aggressive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateWeights {
    pub rainfall: f64,
    pub temperature: f64,
    pub altitude: f64,
    pub climate_tier: f64,
    pub drought: f64,
    pub waterlogging: f64,
    /// Drought weight multiplier while the farm is under climate stress
    pub drought_stress_multiplier: f64,
}

impl Default for ClimateWeights {
    fn default() -> Self {
        Self {
            rainfall: 0.25,
            temperature: 0.20,
            altitude: 0.10,
            climate_tier: 0.15,
            drought: 0.15,
            waterlogging: 0.15,
            drought_stress_multiplier: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilWeights {
    pub ph: f64,
    pub organic_matter: f64,
    pub drainage: f64,
    pub texture: f64,
    pub nutrients: f64,
}

impl Default for SoilWeights {
    fn default() -> Self {
        Self { ph: 0.40, organic_matter: 0.20, drainage: 0.20, texture: 0.10, nutrients: 0.10 }
    }
}

/// Distance beyond a requirement boundary at which a range fit reaches 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceMargins {
    pub ph: f64,
    pub organic_matter_pct: f64,
    pub drainage_classes: f64,
    pub texture_classes: f64,
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    pub altitude_m: f64,
}

impl Default for ToleranceMargins {
    fn default() -> Self {
        Self {
            ph: 1.5,
            organic_matter_pct: 2.0,
            drainage_classes: 1.0,
            texture_classes: 2.0,
            rainfall_mm: 300.0,
            temperature_c: 4.0,
            altitude_m: 400.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub drought: f64,
    pub heat: f64,
    pub climate_volatility: f64,
    pub pest_disease: f64,
    pub market: f64,
    pub soil_constraint: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            drought: 0.25,
            heat: 0.10,
            climate_volatility: 0.20,
            pest_disease: 0.20,
            market: 0.10,
            soil_constraint: 0.15,
        }
    }
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.drought
            + self.heat
            + self.climate_volatility
            + self.pest_disease
            + self.market
            + self.soil_constraint
    }
}

/// Upper bounds of the low and medium risk buckets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskBounds {
    pub low_below: f64,
    pub medium_below: f64,
}

impl Default for RiskBounds {
    fn default() -> Self {
        Self { low_below: 0.35, medium_below: 0.65 }
    }
}

impl RiskBounds {
    pub fn level(&self, risk_score: f64) -> RiskLevel {
        if risk_score < self.low_below {
            RiskLevel::Low
        } else if risk_score < self.medium_below {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub composite_weights: CompositeWeights,
    pub weight_bounds: WeightBounds,
    pub tolerance_multipliers: ToleranceMultipliers,
    pub climate_weights: ClimateWeights,
    pub soil_weights: SoilWeights,
    pub margins: ToleranceMargins,
    pub risk_weights: RiskWeights,
    pub risk_bounds: RiskBounds,

    /// Sub-risks above this severity are reported as risk factors
    pub risk_factor_threshold: f64,

    /// Most recent seasons compared against the long-term climate record
    pub history_window_seasons: usize,

    /// Performance records needed before the kernel regression is trusted
    pub min_history_samples: usize,

    /// Gaussian kernel bandwidth in normalized units
    pub similarity_bandwidth: f64,

    /// Confidence multiplier applied when yield comes from the fallback
    pub fallback_confidence_factor: f64,

    /// Interval half-width multiplier: base × (1 + widening × (1 − confidence))
    pub interval_widening: f64,

    /// Minimum normalized weight for a signal to be mentioned in reasoning
    pub significance_threshold: f64,

    /// Ceiling for any sub-score that leaned on imputed data
    pub imputed_score_cap: f64,

    /// Confidence below which a recommendation is flagged low-confidence
    pub low_confidence_threshold: f64,

    pub max_results: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            composite_weights: CompositeWeights::default(),
            weight_bounds: WeightBounds::default(),
            tolerance_multipliers: ToleranceMultipliers::default(),
            climate_weights: ClimateWeights::default(),
            soil_weights: SoilWeights::default(),
            margins: ToleranceMargins::default(),
            risk_weights: RiskWeights::default(),
            risk_bounds: RiskBounds::default(),
            risk_factor_threshold: 0.4,
            history_window_seasons: 3,
            min_history_samples: 5,
            similarity_bandwidth: 0.15,
            fallback_confidence_factor: 0.8,
            interval_widening: 2.0,
            significance_threshold: 0.10,
            imputed_score_cap: 0.89,
            low_confidence_threshold: 0.5,
            max_results: 10,
        }
    }
}

impl EngineConfig {
    /// Load configuration overrides from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {:?}", path))?;

        let config: EngineConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse engine config JSON")?;

        config
            .validate()
            .with_context(|| format!("Rejected engine config: {:?}", path))?;

        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));

        let weights = [
            ("composite_weights.climate", self.composite_weights.climate),
            ("composite_weights.soil", self.composite_weights.soil),
            ("composite_weights.risk", self.composite_weights.risk),
            ("composite_weights.market", self.composite_weights.market),
            ("climate_weights.rainfall", self.climate_weights.rainfall),
            ("climate_weights.temperature", self.climate_weights.temperature),
            ("climate_weights.altitude", self.climate_weights.altitude),
            ("climate_weights.climate_tier", self.climate_weights.climate_tier),
            ("climate_weights.drought", self.climate_weights.drought),
            ("climate_weights.waterlogging", self.climate_weights.waterlogging),
            ("soil_weights.ph", self.soil_weights.ph),
            ("soil_weights.organic_matter", self.soil_weights.organic_matter),
            ("soil_weights.drainage", self.soil_weights.drainage),
            ("soil_weights.texture", self.soil_weights.texture),
            ("soil_weights.nutrients", self.soil_weights.nutrients),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return invalid(format!("{} must be a non-negative number, got {}", name, w));
            }
        }
        if self.composite_weights.sum() <= 0.0 {
            return invalid("composite weights must not all be zero".into());
        }

        let rw = self.risk_weights;
        for (name, w) in [
            ("risk_weights.drought", rw.drought),
            ("risk_weights.heat", rw.heat),
            ("risk_weights.climate_volatility", rw.climate_volatility),
            ("risk_weights.pest_disease", rw.pest_disease),
            ("risk_weights.market", rw.market),
            ("risk_weights.soil_constraint", rw.soil_constraint),
        ] {
            if !w.is_finite() || w < 0.0 {
                return invalid(format!("{} must be a non-negative number, got {}", name, w));
            }
        }
        if !(self.risk_weights.sum() > 0.0) {
            return invalid("risk weights must not all be zero".into());
        }

        let b = self.weight_bounds;
        if !(0.0..=1.0).contains(&b.min) || !(0.0..=1.0).contains(&b.max) || b.min > b.max {
            return invalid(format!("weight bounds [{}, {}] must be an ordered sub-range of [0, 1]", b.min, b.max));
        }
        if 4.0 * b.min > 1.0 || 4.0 * b.max < 1.0 {
            return invalid(format!("weight bounds [{}, {}] cannot hold four weights summing to 1", b.min, b.max));
        }

        let r = self.risk_bounds;
        if !(0.0 < r.low_below && r.low_below < r.medium_below && r.medium_below <= 1.0) {
            return invalid(format!(
                "risk bounds must satisfy 0 < low ({}) < medium ({}) <= 1",
                r.low_below, r.medium_below
            ));
        }

        let m = self.margins;
        for (name, v) in [
            ("margins.ph", m.ph),
            ("margins.organic_matter_pct", m.organic_matter_pct),
            ("margins.drainage_classes", m.drainage_classes),
            ("margins.texture_classes", m.texture_classes),
            ("margins.rainfall_mm", m.rainfall_mm),
            ("margins.temperature_c", m.temperature_c),
            ("margins.altitude_m", m.altitude_m),
        ] {
            if !v.is_finite() || v < 0.0 {
                return invalid(format!("{} must be non-negative, got {}", name, v));
            }
        }

        // Imputed sub-scores must stay at or below 0.9
        if !(self.imputed_score_cap > 0.0 && self.imputed_score_cap <= 0.9) {
            return invalid(format!("imputed_score_cap must lie in (0, 0.9], got {}", self.imputed_score_cap));
        }
        if !(self.similarity_bandwidth > 0.0) {
            return invalid("similarity_bandwidth must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.fallback_confidence_factor) {
            return invalid("fallback_confidence_factor must lie in [0, 1]".into());
        }
        if self.interval_widening < 0.0 || !self.interval_widening.is_finite() {
            return invalid("interval_widening must be non-negative".into());
        }
        if self.history_window_seasons == 0 {
            return invalid("history_window_seasons must be at least 1".into());
        }
        if self.min_history_samples == 0 {
            return invalid("min_history_samples must be at least 1".into());
        }
        if self.max_results == 0 {
            return invalid("max_results must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_relative_eq!(CompositeWeights::default().sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(RiskWeights::default().sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_resolve_clamps_overrides_and_renormalizes() {
        let overrides = WeightOverrides { climate: Some(0.9), soil: Some(0.0), ..Default::default() };
        let w = CompositeWeights::default().resolve(
            Some(&overrides),
            RiskTolerance::Moderate,
            WeightBounds::default(),
            &ToleranceMultipliers::default(),
        );
        // 0.60 / (0.60 + 0.05 + 0.20 + 0.15)
        assert_relative_eq!(w.climate, 0.60, epsilon = 1e-12);
        assert_relative_eq!(w.soil, 0.05, epsilon = 1e-12);
        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_conservative_tolerance_raises_risk_weight() {
        let base = CompositeWeights::default();
        let bounds = WeightBounds::default();
        let mult = ToleranceMultipliers::default();
        let conservative = base.resolve(None, RiskTolerance::Conservative, bounds, &mult);
        let moderate = base.resolve(None, RiskTolerance::Moderate, bounds, &mult);
        let aggressive = base.resolve(None, RiskTolerance::Aggressive, bounds, &mult);
        assert!(conservative.risk > moderate.risk);
        assert!(moderate.risk > aggressive.risk);
        assert_relative_eq!(moderate.risk, 0.20, epsilon = 1e-12);
    }

    #[test]
    fn test_risk_bounds_buckets() {
        let b = RiskBounds::default();
        assert_eq!(b.level(0.0), RiskLevel::Low);
        assert_eq!(b.level(0.35), RiskLevel::Medium);
        assert_eq!(b.level(0.649), RiskLevel::Medium);
        assert_eq!(b.level(0.65), RiskLevel::High);
    }

    #[test]
    fn test_validate_rejects_bad_cap() {
        let config = EngineConfig { imputed_score_cap: 1.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        let config = EngineConfig { imputed_score_cap: 0.95, ..Default::default() };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        let config = EngineConfig { imputed_score_cap: 0.9, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_risk_weight() {
        let mut config = EngineConfig::default();
        config.risk_weights.market = -0.1;
        assert!(config.risk_weights.sum() > 0.0);
        match config.validate() {
            Err(EngineError::InvalidConfig(msg)) => assert!(msg.contains("risk_weights.market")),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_infeasible_bounds() {
        let config = EngineConfig { weight_bounds: WeightBounds { min: 0.3, max: 0.6 }, ..Default::default() };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_resolved_weights_stay_within_bounds() {
        // 0.60 + 3 × 0.05 renormalizes climate to 0.8 before pinning
        let overrides = WeightOverrides { climate: Some(0.6), soil: Some(0.05), risk: Some(0.05), market: Some(0.05) };
        let bounds = WeightBounds::default();
        let w = CompositeWeights::default().resolve(
            Some(&overrides),
            RiskTolerance::Moderate,
            bounds,
            &ToleranceMultipliers::default(),
        );
        assert_relative_eq!(w.climate, 0.60, epsilon = 1e-12);
        assert_relative_eq!(w.soil, 0.40 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-12);

        // Conservative scaling of a maximal risk override
        let overrides = WeightOverrides { risk: Some(0.6), ..Default::default() };
        let w = CompositeWeights::default().resolve(
            Some(&overrides),
            RiskTolerance::Conservative,
            bounds,
            &ToleranceMultipliers::default(),
        );
        for v in [w.climate, w.soil, w.risk, w.market] {
            assert!(v >= bounds.min - 1e-12 && v <= bounds.max + 1e-12, "weight {} out of bounds", v);
        }
        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"max_results": 3, "soil_weights": {"ph": 0.5}}"#).unwrap();
        assert_eq!(config.max_results, 3);
        assert_eq!(config.soil_weights.ph, 0.5);
        assert_eq!(config.soil_weights.texture, 0.10);
        assert_eq!(config.min_history_samples, 5);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = EngineConfig::load(Path::new("/nonexistent/engine.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read engine config"));
    }
}
