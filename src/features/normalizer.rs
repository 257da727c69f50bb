//! Trait Normalizer
//!
//! Maps raw farm, seed and climate-history records onto a [`FeatureVector`].
//!
//! Numeric fields are scaled against fixed ranges and clamped; categorical
//! fields go through the shared ordinal tables; anything absent becomes the
//! neutral value with `known = false`. Only a missing farm location or seed
//! crop type is fatal.
//!
//! Climate history is summarized once per request ([`HistorySummary`]) and
//! reused for every seed in the catalog.

use crate::error::{EngineError, RequiredField, Result, Subject};
use crate::profiles::{ClimateHistory, ClimateTier, FarmProfile, SeedProfile};
use crate::utils::normalization::{
    self, finite, ALTITUDE_M, MATURITY_DAYS, NITROGEN_PPM, ORGANIC_MATTER_PCT, PHOSPHORUS_PPM,
    POTASSIUM_PPM, RAINFALL_CV, RAINFALL_DEFICIT, SEASONAL_RAINFALL_MM, SOIL_PH, TEMPERATURE_C,
    TEMPERATURE_DEVIATION_C, YIELD_T_HA,
};

use super::feature_vector::{Feature, FeatureVector};

/// Default number of most recent seasons compared against the long-term record
pub const DEFAULT_HISTORY_WINDOW: usize = 3;

/// Derived statistics of a farm's climate history (raw units)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySummary {
    pub rainfall_observations: usize,
    pub temperature_observations: usize,
    pub long_term_median_rainfall_mm: Option<f64>,
    pub long_term_mean_rainfall_mm: Option<f64>,
    pub recent_mean_rainfall_mm: Option<f64>,
    pub long_term_mean_temp_c: Option<f64>,
    /// Fractional shortfall of recent rainfall below the long-term median (≥ 0)
    pub rainfall_deficit: Option<f64>,
    /// RMS deviation of recent rainfall from the long-term mean, over that mean
    pub rainfall_cv: Option<f64>,
    /// RMS deviation of recent temperature from the long-term mean (°C)
    pub temperature_deviation_c: Option<f64>,
}

impl HistorySummary {
    pub fn from_history(history: &ClimateHistory, window: usize) -> Self {
        let rainfall = history.rainfall_series();
        let temperature = history.temperature_series();

        let mut summary = HistorySummary {
            rainfall_observations: rainfall.len(),
            temperature_observations: temperature.len(),
            long_term_mean_rainfall_mm: mean(&rainfall),
            long_term_mean_temp_c: mean(&temperature),
            ..Default::default()
        };

        if rainfall.len() >= 2 {
            let recent = recent_window(&rainfall, window);
            let median = median(&rainfall);
            let long_mean = summary.long_term_mean_rainfall_mm;
            let recent_mean = mean(recent);

            summary.long_term_median_rainfall_mm = median;
            summary.recent_mean_rainfall_mm = recent_mean;

            if let (Some(median), Some(recent_mean)) = (median, recent_mean) {
                if median > 0.0 {
                    summary.rainfall_deficit = Some(((median - recent_mean) / median).max(0.0));
                }
            }
            if let Some(long_mean) = long_mean.filter(|m| *m > 0.0) {
                summary.rainfall_cv = rms_deviation(recent, long_mean).map(|d| d / long_mean);
            }
        }

        if temperature.len() >= 2 {
            let recent = recent_window(&temperature, window);
            if let Some(long_mean) = summary.long_term_mean_temp_c {
                summary.temperature_deviation_c = rms_deviation(recent, long_mean);
            }
        }

        summary
    }
}

/// Last `window` observations, always leaving at least one older observation
fn recent_window(series: &[f64], window: usize) -> &[f64] {
    let take = window.max(1).min(series.len().saturating_sub(1)).max(1);
    &series[series.len() - take..]
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn rms_deviation(values: &[f64], center: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let ms = values.iter().map(|v| (v - center).powi(2)).sum::<f64>() / values.len() as f64;
    Some(ms.sqrt())
}

/// Builds feature vectors for one farm against any number of seeds
#[derive(Debug, Clone)]
pub struct Normalizer {
    history_window: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl Normalizer {
    pub fn new(history_window: usize) -> Self {
        Self { history_window: history_window.max(1) }
    }

    pub fn summarize(&self, history: &ClimateHistory) -> HistorySummary {
        HistorySummary::from_history(history, self.history_window)
    }

    pub fn normalize(
        &self,
        farm: &FarmProfile,
        seed: &SeedProfile,
        history: &ClimateHistory,
    ) -> Result<FeatureVector> {
        let summary = self.summarize(history);
        self.normalize_with_summary(farm, seed, &summary)
    }

    /// Same as [`Normalizer::normalize`] with a precomputed history summary
    pub fn normalize_with_summary(
        &self,
        farm: &FarmProfile,
        seed: &SeedProfile,
        summary: &HistorySummary,
    ) -> Result<FeatureVector> {
        validate_farm(farm)?;
        let crop_type = seed.crop_type.ok_or_else(|| {
            EngineError::incomplete(Subject::Seed(seed.id.clone()), RequiredField::CropType)
        })?;

        let mut fv = FeatureVector::blank(&farm.id, &seed.id, &seed.variety_name, crop_type);
        encode_farm(&mut fv, farm, summary);
        encode_seed(&mut fv, seed);
        Ok(fv)
    }
}

/// Farm-level hard requirements (location present and plausible)
pub fn validate_farm(farm: &FarmProfile) -> Result<()> {
    match farm.location {
        Some(loc) if loc.is_valid() => Ok(()),
        _ => Err(EngineError::incomplete(
            Subject::Farm(farm.id.clone()),
            RequiredField::Location,
        )),
    }
}

/// Convenience wrapper using the default history window
pub fn normalize(
    farm: &FarmProfile,
    seed: &SeedProfile,
    history: &ClimateHistory,
) -> Result<FeatureVector> {
    Normalizer::default().normalize(farm, seed, history)
}

// ============================================================================
// Encoding
// ============================================================================

fn encode_farm(fv: &mut FeatureVector, farm: &FarmProfile, summary: &HistorySummary) {
    let soil = &farm.soil;
    fv.set_opt(Feature::SoilPh, finite(soil.ph).map(|v| SOIL_PH.scale(v)));
    fv.set_opt(
        Feature::OrganicMatter,
        finite(soil.organic_matter_pct).map(|v| ORGANIC_MATTER_PCT.scale(v)),
    );
    fv.set_opt(Feature::Nitrogen, finite(soil.nitrogen_ppm).map(|v| NITROGEN_PPM.scale(v)));
    fv.set_opt(Feature::Phosphorus, finite(soil.phosphorus_ppm).map(|v| PHOSPHORUS_PPM.scale(v)));
    fv.set_opt(Feature::Potassium, finite(soil.potassium_ppm).map(|v| POTASSIUM_PPM.scale(v)));
    fv.set_opt(Feature::SoilTexture, soil.texture.map(|t| t.ordinal()));
    fv.set_opt(Feature::Drainage, soil.drainage.map(|d| d.ordinal()));

    let climate = &farm.climate;
    let rainfall = finite(climate.seasonal_rainfall_mm).or(summary.long_term_mean_rainfall_mm);
    let mean_temp = finite(climate.mean_temp_c).or(summary.long_term_mean_temp_c);
    fv.set_opt(Feature::SeasonalRainfall, rainfall.map(|v| SEASONAL_RAINFALL_MM.scale(v)));
    fv.set_opt(Feature::MeanTemperature, mean_temp.map(|v| TEMPERATURE_C.scale(v)));
    fv.set_opt(Feature::MaxTemperature, finite(climate.max_temp_c).map(|v| TEMPERATURE_C.scale(v)));
    fv.set_opt(Feature::Altitude, finite(climate.altitude_m).map(|v| ALTITUDE_M.scale(v)));
    fv.set_level(Feature::DroughtFrequency, climate.drought_frequency);
    fv.set_level(Feature::PestPressure, climate.pest_pressure);

    fv.set_opt(Feature::RainfallDeficit, summary.rainfall_deficit.map(|v| RAINFALL_DEFICIT.scale(v)));
    fv.set_opt(Feature::RainfallVolatility, summary.rainfall_cv.map(|v| RAINFALL_CV.scale(v)));
    fv.set_opt(
        Feature::TemperatureVolatility,
        summary.temperature_deviation_c.map(|v| TEMPERATURE_DEVIATION_C.scale(v)),
    );

    fv.set(Feature::Irrigation, if farm.infrastructure.irrigation { 1.0 } else { 0.0 });

    if let Some(tier) = climate.climate_tier() {
        for t in ClimateTier::ALL {
            fv.set(Feature::FarmTier(t), if t == tier { 1.0 } else { 0.0 });
        }
    }
}

fn encode_seed(fv: &mut FeatureVector, seed: &SeedProfile) {
    fv.set_level(Feature::DroughtTolerance, seed.tolerances.drought);
    fv.set_level(Feature::HeatTolerance, seed.tolerances.heat);
    fv.set_level(Feature::FloodTolerance, seed.tolerances.flood);
    fv.set_level(Feature::PestResistance, seed.resistances.pest);
    fv.set_level(Feature::DiseaseResistance, seed.resistances.disease);
    fv.set_opt(
        Feature::YieldPotential,
        finite(seed.yield_potential_t_ha).map(|v| YIELD_T_HA.scale(v)),
    );
    fv.set_opt(Feature::MaturityDays, seed.maturity_days.map(|d| MATURITY_DAYS.scale(d as f64)));
    fv.set_level(Feature::MarketDemand, seed.market.demand);
    fv.set_opt(
        Feature::PriceVolatility,
        finite(seed.market.price_volatility).map(normalization::clamp_unit),
    );

    let soil = &seed.soil_requirements;
    if let Some(r) = soil.ph.filter(|r| r.is_finite()) {
        fv.set(Feature::PhMin, SOIL_PH.scale(r.min));
        fv.set(Feature::PhMax, SOIL_PH.scale(r.max));
    }
    if let Some(r) = soil.organic_matter_pct.filter(|r| r.is_finite()) {
        fv.set(Feature::OrganicMatterMin, ORGANIC_MATTER_PCT.scale(r.min));
        fv.set(Feature::OrganicMatterMax, ORGANIC_MATTER_PCT.scale(r.max));
    }
    if let Some(r) = soil.drainage {
        let (lo, hi) = if r.min <= r.max { (r.min, r.max) } else { (r.max, r.min) };
        fv.set(Feature::DrainageMin, lo.ordinal());
        fv.set(Feature::DrainageMax, hi.ordinal());
    }
    if let (Some(lo), Some(hi)) = (
        soil.preferred_textures.iter().min(),
        soil.preferred_textures.iter().max(),
    ) {
        fv.set(Feature::TextureMin, lo.ordinal());
        fv.set(Feature::TextureMax, hi.ordinal());
    }
    fv.set_level(Feature::NitrogenDemand, soil.nitrogen_demand);
    fv.set_level(Feature::PhosphorusDemand, soil.phosphorus_demand);
    fv.set_level(Feature::PotassiumDemand, soil.potassium_demand);

    let climate = &seed.climate_requirements;
    if let Some(r) = climate.rainfall_mm.filter(|r| r.is_finite()) {
        fv.set(Feature::RainfallMin, SEASONAL_RAINFALL_MM.scale(r.min));
        fv.set(Feature::RainfallMax, SEASONAL_RAINFALL_MM.scale(r.max));
    }
    if let Some(r) = climate.temperature_c.filter(|r| r.is_finite()) {
        fv.set(Feature::TemperatureMin, TEMPERATURE_C.scale(r.min));
        fv.set(Feature::TemperatureMax, TEMPERATURE_C.scale(r.max));
    }
    if let Some(r) = climate.altitude_m.filter(|r| r.is_finite()) {
        fv.set(Feature::AltitudeMin, ALTITUDE_M.scale(r.min));
        fv.set(Feature::AltitudeMax, ALTITUDE_M.scale(r.max));
    }
    if !climate.climate_tiers.is_empty() {
        for t in ClimateTier::ALL {
            let adapted = climate.climate_tiers.contains(&t);
            fv.set(Feature::SeedTier(t), if adapted { 1.0 } else { 0.0 });
        }
    }
}
