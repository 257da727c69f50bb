//! Yield Predictor
//!
//! With enough historical performance records the expected yield is a
//! Nadaraya–Watson kernel regression: records observed under conditions
//! similar to this farm's weigh more. Similarity is a Gaussian kernel on the
//! RMS normalized distance over the dimensions known on both sides
//! (rainfall, pH, organic matter, temperature).
//!
//! Without enough history the estimate falls back to
//! `yield_potential × (0.5·climate + 0.5·soil)` using the pure compatibility
//! scorer, and is flagged low-confidence.
//!
//! The interval half-width is `base × (1 + widening × (1 − confidence))`, so
//! the interval widens monotonically as confidence falls.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::EngineConfig;
use crate::features::{Feature, FeatureVector};
use crate::profiles::PerformanceRecord;
use crate::utils::normalization::{
    finite, ScaleRange, ORGANIC_MATTER_PCT, SEASONAL_RAINFALL_MM, SOIL_PH, TEMPERATURE_C,
    YIELD_T_HA,
};

use super::compatibility;
use super::confidence::confidence_level;

/// Distance used when a record shares no known dimension with the farm
const UNKNOWN_DISTANCE: f64 = 0.5;

/// Minimum relative spread of a history-based estimate
const HISTORY_SPREAD_FLOOR: f64 = 0.10;

/// Relative spread of a fallback estimate
const FALLBACK_SPREAD: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum YieldMethod {
    HistoricalNeighbors { records: usize, effective_samples: f64 },
    PotentialFallback,
}

impl YieldMethod {
    pub fn is_fallback(&self) -> bool {
        matches!(self, YieldMethod::PotentialFallback)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldEstimate {
    pub expected_t_ha: f64,
    pub lower_t_ha: f64,
    pub upper_t_ha: f64,
    pub method: YieldMethod,
    pub confidence: f64,
    pub low_confidence: bool,
}

/// Interval half-width for a base spread at a given confidence
pub fn interval_half_width(base_spread: f64, confidence: f64, widening: f64) -> f64 {
    base_spread.max(0.0) * (1.0 + widening * (1.0 - confidence.clamp(0.0, 1.0)))
}

pub fn predict(fv: &FeatureVector, history: &[PerformanceRecord], config: &EngineConfig) -> YieldEstimate {
    let usable: Vec<&PerformanceRecord> = history
        .iter()
        .filter(|r| r.yield_t_ha.is_finite() && r.yield_t_ha >= 0.0)
        .collect();

    if usable.len() >= config.min_history_samples {
        from_history(fv, &usable, config)
    } else {
        from_potential(fv, config)
    }
}

fn from_history(fv: &FeatureVector, records: &[&PerformanceRecord], config: &EngineConfig) -> YieldEstimate {
    let bandwidth = config.similarity_bandwidth;
    let weights: Vec<f64> = records
        .iter()
        .map(|r| {
            let d = record_distance(fv, r) / bandwidth;
            (-0.5 * d * d).exp()
        })
        .collect();

    let sum_w: f64 = weights.iter().sum();
    let weights = if sum_w > f64::MIN_POSITIVE {
        weights
    } else {
        vec![1.0; records.len()]
    };
    let sum_w: f64 = weights.iter().sum();
    let sum_w2: f64 = weights.iter().map(|w| w * w).sum();

    let expected = records
        .iter()
        .zip(&weights)
        .map(|(r, w)| w * r.yield_t_ha)
        .sum::<f64>()
        / sum_w;
    let variance = records
        .iter()
        .zip(&weights)
        .map(|(r, w)| w * (r.yield_t_ha - expected).powi(2))
        .sum::<f64>()
        / sum_w;
    let effective_samples = if sum_w2 > 0.0 { sum_w * sum_w / sum_w2 } else { 0.0 };

    let confidence = confidence_level(fv, false, config);
    let base = variance.sqrt().max(HISTORY_SPREAD_FLOOR * expected);
    let method = YieldMethod::HistoricalNeighbors { records: records.len(), effective_samples };
    build(expected, base, confidence, method, config)
}

fn from_potential(fv: &FeatureVector, config: &EngineConfig) -> YieldEstimate {
    let potential = fv
        .known_value(Feature::YieldPotential)
        .map(|v| YIELD_T_HA.unscale(v))
        .unwrap_or_else(|| fv.crop_type.typical_yield_t_ha());

    let compat = compatibility::score(fv, config);
    let factor = 0.5 * compat.climate.score + 0.5 * compat.soil.score;
    let expected = potential * factor;

    let confidence = confidence_level(fv, true, config);
    build(expected, FALLBACK_SPREAD * expected, confidence, YieldMethod::PotentialFallback, config)
}

fn build(expected: f64, base: f64, confidence: f64, method: YieldMethod, config: &EngineConfig) -> YieldEstimate {
    let expected = expected.max(0.0);
    let half = interval_half_width(base, confidence, config.interval_widening);
    let low_confidence = method.is_fallback() || confidence < config.low_confidence_threshold;
    YieldEstimate {
        expected_t_ha: expected,
        lower_t_ha: (expected - half).max(0.0),
        upper_t_ha: expected + half,
        method,
        confidence,
        low_confidence,
    }
}

/// RMS normalized distance over dimensions known for both farm and record
fn record_distance(fv: &FeatureVector, record: &PerformanceRecord) -> f64 {
    let dims: [(Feature, Option<f64>, ScaleRange); 4] = [
        (Feature::SeasonalRainfall, record.rainfall_mm, SEASONAL_RAINFALL_MM),
        (Feature::SoilPh, record.soil_ph, SOIL_PH),
        (Feature::OrganicMatter, record.organic_matter_pct, ORGANIC_MATTER_PCT),
        (Feature::MeanTemperature, record.mean_temp_c, TEMPERATURE_C),
    ];

    let diffs: SmallVec<[f64; 4]> = dims
        .iter()
        .filter_map(|(feature, raw, range)| {
            let farm = fv.known_value(*feature)?;
            let observed = range.scale(finite(*raw)?);
            Some(farm - observed)
        })
        .collect();

    if diffs.is_empty() {
        UNKNOWN_DISTANCE
    } else {
        (diffs.iter().map(|d| d * d).sum::<f64>() / diffs.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::CropType;
    use approx::assert_relative_eq;

    fn farm_fv() -> FeatureVector {
        let mut fv = FeatureVector::blank("farm", "seed", "Longe 5", CropType::Maize);
        fv.set(Feature::SeasonalRainfall, SEASONAL_RAINFALL_MM.scale(900.0));
        fv.set(Feature::SoilPh, SOIL_PH.scale(6.0));
        fv
    }

    fn record(year: i32, yield_t_ha: f64, rainfall: f64, ph: f64) -> PerformanceRecord {
        PerformanceRecord {
            year,
            yield_t_ha,
            rainfall_mm: Some(rainfall),
            soil_ph: Some(ph),
            organic_matter_pct: None,
            mean_temp_c: None,
        }
    }

    #[test]
    fn test_similar_records_dominate() {
        let history = vec![
            record(2018, 5.0, 900.0, 6.0),
            record(2019, 5.2, 920.0, 6.1),
            record(2020, 4.8, 880.0, 5.9),
            record(2021, 1.0, 100.0, 4.0),
            record(2022, 1.2, 80.0, 3.9),
        ];
        let est = predict(&farm_fv(), &history, &EngineConfig::default());
        assert!(matches!(est.method, YieldMethod::HistoricalNeighbors { records: 5, .. }));
        assert!(est.expected_t_ha > 4.7 && est.expected_t_ha < 5.3, "{}", est.expected_t_ha);
        assert!(est.lower_t_ha <= est.expected_t_ha && est.expected_t_ha <= est.upper_t_ha);
    }

    #[test]
    fn test_too_few_records_fall_back() {
        let history = vec![record(2021, 5.0, 900.0, 6.0)];
        let mut fv = farm_fv();
        fv.set(Feature::YieldPotential, YIELD_T_HA.scale(8.0));
        let est = predict(&fv, &history, &EngineConfig::default());
        assert_eq!(est.method, YieldMethod::PotentialFallback);
        assert!(est.low_confidence);
        assert!(est.expected_t_ha <= 8.0);
    }

    #[test]
    fn test_fallback_uses_crop_typical_yield() {
        let fv = FeatureVector::blank("farm", "seed", "Local beans", CropType::Beans);
        let est = predict(&fv, &[], &EngineConfig::default());
        let compat = compatibility::score(&fv, &EngineConfig::default());
        let factor = 0.5 * compat.climate.score + 0.5 * compat.soil.score;
        assert_relative_eq!(est.expected_t_ha, 1.5 * factor, epsilon = 1e-9);
    }

    #[test]
    fn test_interval_widens_as_confidence_falls() {
        let mut previous = 0.0;
        for step in 0..=10 {
            let confidence = 1.0 - step as f64 / 10.0;
            let w = interval_half_width(1.0, confidence, 2.0);
            assert!(w >= previous);
            previous = w;
        }
        assert_relative_eq!(interval_half_width(1.0, 1.0, 2.0), 1.0);
        assert_relative_eq!(interval_half_width(1.0, 0.0, 2.0), 3.0);
    }

    #[test]
    fn test_lower_bound_never_negative() {
        let fv = FeatureVector::blank("farm", "seed", "Test", CropType::Millet);
        let est = predict(&fv, &[], &EngineConfig::default());
        assert!(est.lower_t_ha >= 0.0);
    }

    #[test]
    fn test_invalid_records_ignored() {
        let mut history = vec![record(2018, f64::NAN, 900.0, 6.0); 6];
        history.push(record(2019, 5.0, 900.0, 6.0));
        let est = predict(&farm_fv(), &history, &EngineConfig::default());
        assert_eq!(est.method, YieldMethod::PotentialFallback);
    }
}
