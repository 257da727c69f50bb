//! Confidence level
//!
//! Weighted completeness of the inputs the scores depend on. Soil carries
//! the largest share (0.55), so a farm with no soil data can never reach the
//! low-confidence threshold of 0.5. A fallback yield estimate scales the
//! result down further.

use crate::config::EngineConfig;
use crate::features::{Feature, FeatureVector};
use crate::profiles::ClimateTier;

/// (feature, weight) groups; all weights sum to 1
const SOIL_WEIGHTS: [(Feature, f64); 7] = [
    (Feature::SoilPh, 0.15),
    (Feature::OrganicMatter, 0.10),
    (Feature::Nitrogen, 0.06),
    (Feature::Phosphorus, 0.06),
    (Feature::Potassium, 0.06),
    (Feature::SoilTexture, 0.06),
    (Feature::Drainage, 0.06),
];

const CLIMATE_WEIGHTS: [(Feature, f64); 7] = [
    (Feature::SeasonalRainfall, 0.08),
    (Feature::MeanTemperature, 0.06),
    (Feature::DroughtFrequency, 0.05),
    (Feature::RainfallDeficit, 0.04),
    (Feature::RainfallVolatility, 0.03),
    (Feature::Altitude, 0.02),
    // the one-hot block is known or unknown as a whole
    (Feature::FarmTier(ClimateTier::Tropical), 0.02),
];

const SEED_WEIGHTS: [(Feature, f64); 6] = [
    (Feature::DroughtTolerance, 0.03),
    (Feature::HeatTolerance, 0.02),
    (Feature::FloodTolerance, 0.02),
    (Feature::PestResistance, 0.02),
    (Feature::DiseaseResistance, 0.02),
    (Feature::YieldPotential, 0.04),
];

/// Weighted share of known inputs, on [0, 1]
pub fn completeness(fv: &FeatureVector) -> f64 {
    SOIL_WEIGHTS
        .iter()
        .chain(CLIMATE_WEIGHTS.iter())
        .chain(SEED_WEIGHTS.iter())
        .filter(|(f, _)| fv.is_known(*f))
        .map(|(_, w)| w)
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Confidence of a candidate's scores and yield estimate
pub fn confidence_level(fv: &FeatureVector, yield_from_fallback: bool, config: &EngineConfig) -> f64 {
    let c = completeness(fv);
    if yield_from_fallback {
        c * config.fallback_confidence_factor
    } else {
        c
    }
}
