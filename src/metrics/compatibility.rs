//! Compatibility Scorer: climate and soil sub-scores
//!
//! A component is computed only when the seed states the requirement. If the
//! requirement is stated but the farm measurement is imputed, the component
//! is scored from the neutral value and marked imputed, which caps the whole
//! sub-score below 0.9. The waterlogging and drought components are always
//! computed: every seed has some flood and drought response, stated or not.
//!
//! Range fits compare in normalized space; farm and seed share the scaling
//! range, so a raw-unit margin converts exactly via `ScaleRange::fraction`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::EngineConfig;
use crate::features::{Feature, FeatureVector};
use crate::profiles::{match_tiers, DrainageClass, Level, SoilTexture};
use crate::utils::envelope::{compare_to_range, RangeComparison};
use crate::utils::normalization::{
    ScaleRange, ALTITUDE_M, NITROGEN_PPM, ORGANIC_MATTER_PCT, PHOSPHORUS_PPM, POTASSIUM_PPM,
    SEASONAL_RAINFALL_MM, SOIL_PH, TEMPERATURE_C,
};

use super::{ScoreComponent, ScoreSignal, SignalBuffer, SubScore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    pub climate: SubScore,
    pub soil: SubScore,
}

/// Score both sub-scores for one feature vector
pub fn score(fv: &FeatureVector, config: &EngineConfig) -> CompatibilityResult {
    CompatibilityResult {
        climate: score_climate(fv, config),
        soil: score_soil(fv, config),
    }
}

// ============================================================================
// Shared range component
// ============================================================================

/// How a range component renders its raw values
#[derive(Clone, Copy)]
enum Units {
    Scaled { range: ScaleRange, unit: &'static str, decimals: usize },
    Drainage,
    Texture,
}

impl Units {
    fn render(&self, normalized: f64) -> String {
        match *self {
            Units::Scaled { range, unit, decimals } => {
                format!("{:.*}{}", decimals, range.unscale(normalized), unit)
            }
            Units::Drainage => DrainageClass::from_ordinal(normalized).display_text().to_string(),
            Units::Texture => SoilTexture::from_ordinal(normalized).display_text().to_string(),
        }
    }
}

struct RangeSpec {
    component: ScoreComponent,
    value: Feature,
    min: Feature,
    max: Feature,
    /// Margin in normalized units
    margin: f64,
    weight: f64,
    label: &'static str,
    units: Units,
}

/// Range component, or `None` when the seed states no such requirement
fn range_component(fv: &FeatureVector, spec: &RangeSpec, imputed: &mut Vec<Feature>) -> Option<ScoreSignal> {
    if !fv.all_known(&[spec.min, spec.max]) {
        return None;
    }

    let comp = compare_to_range(fv.value(spec.value), fv.value(spec.min), fv.value(spec.max));
    let score = comp.score_with_margin(spec.margin);
    let is_imputed = !fv.is_known(spec.value);
    if is_imputed {
        imputed.push(spec.value);
    }

    let detail = range_detail(spec, &comp, is_imputed);
    Some(ScoreSignal::new(spec.component, score, spec.weight, is_imputed, detail))
}

fn range_detail(spec: &RangeSpec, comp: &RangeComparison, imputed: bool) -> String {
    let required = match spec.units {
        Units::Drainage | Units::Texture if (comp.max - comp.min).abs() < 1e-9 => spec.units.render(comp.min),
        _ => format!("{}-{}", spec.units.render(comp.min), spec.units.render(comp.max)),
    };
    if imputed {
        format!("{} unknown (imputed) against required {}", spec.label, required)
    } else {
        format!(
            "{} {} {} required {}",
            spec.label,
            spec.units.render(comp.value),
            comp.fit.display_text(),
            required
        )
    }
}

// ============================================================================
// Climate
// ============================================================================

pub fn score_climate(fv: &FeatureVector, config: &EngineConfig) -> SubScore {
    let w = &config.climate_weights;
    let m = &config.margins;
    let mut imputed = Vec::new();
    let mut signals: SignalBuffer = SmallVec::new();

    let ranges = [
        RangeSpec {
            component: ScoreComponent::Rainfall,
            value: Feature::SeasonalRainfall,
            min: Feature::RainfallMin,
            max: Feature::RainfallMax,
            margin: SEASONAL_RAINFALL_MM.fraction(m.rainfall_mm),
            weight: w.rainfall,
            label: "seasonal rainfall",
            units: Units::Scaled { range: SEASONAL_RAINFALL_MM, unit: " mm", decimals: 0 },
        },
        RangeSpec {
            component: ScoreComponent::Temperature,
            value: Feature::MeanTemperature,
            min: Feature::TemperatureMin,
            max: Feature::TemperatureMax,
            margin: TEMPERATURE_C.fraction(m.temperature_c),
            weight: w.temperature,
            label: "mean temperature",
            units: Units::Scaled { range: TEMPERATURE_C, unit: " °C", decimals: 1 },
        },
        RangeSpec {
            component: ScoreComponent::Altitude,
            value: Feature::Altitude,
            min: Feature::AltitudeMin,
            max: Feature::AltitudeMax,
            margin: ALTITUDE_M.fraction(m.altitude_m),
            weight: w.altitude,
            label: "altitude",
            units: Units::Scaled { range: ALTITUDE_M, unit: " m", decimals: 0 },
        },
    ];
    signals.extend(ranges.iter().filter_map(|spec| range_component(fv, spec, &mut imputed)));

    if let Some(signal) = tier_component(fv, w.climate_tier, &mut imputed) {
        signals.push(signal);
    }

    let drought_weight = if fv.under_climate_stress() {
        w.drought * w.drought_stress_multiplier
    } else {
        w.drought
    };
    signals.push(drought_component(fv, drought_weight, &mut imputed));
    signals.push(waterlogging_component(fv, w.waterlogging, &mut imputed));

    SubScore::combine(signals, imputed, config.imputed_score_cap)
}

fn tier_component(fv: &FeatureVector, weight: f64, imputed: &mut Vec<Feature>) -> Option<ScoreSignal> {
    let seed_tiers = fv.seed_tiers();
    if seed_tiers.is_empty() {
        return None;
    }

    let signal = match fv.farm_tier() {
        Some(farm_tier) => {
            let m = match_tiers(farm_tier, &seed_tiers);
            ScoreSignal::new(
                ScoreComponent::ClimateTier,
                m.score(),
                weight,
                false,
                format!("{} ({})", m.display_text(), farm_tier.display_name()),
            )
        }
        None => {
            imputed.push(Feature::FarmTier(seed_tiers[0]));
            ScoreSignal::new(
                ScoreComponent::ClimateTier,
                crate::utils::NEUTRAL_VALUE,
                weight,
                true,
                "farm climate zone unknown (imputed)".to_string(),
            )
        }
    };
    Some(signal)
}

fn drought_component(fv: &FeatureVector, weight: f64, imputed: &mut Vec<Feature>) -> ScoreSignal {
    let (exposure, exposure_imputed) = fv.drought_exposure();
    let tolerance = fv.value(Feature::DroughtTolerance);
    let tolerance_imputed = !fv.is_known(Feature::DroughtTolerance);

    if exposure_imputed {
        imputed.push(Feature::DroughtFrequency);
    }
    if tolerance_imputed {
        imputed.push(Feature::DroughtTolerance);
    }

    let score = 1.0 - (exposure - tolerance).max(0.0);
    let detail = format!(
        "drought exposure {} ({:.2}) against {} drought tolerance",
        Level::from_ordinal(exposure).display_text(),
        exposure,
        if tolerance_imputed { "unknown" } else { Level::from_ordinal(tolerance).display_text() },
    );
    ScoreSignal::new(
        ScoreComponent::Drought,
        score,
        weight,
        exposure_imputed || tolerance_imputed,
        detail,
    )
}

fn waterlogging_component(fv: &FeatureVector, weight: f64, imputed: &mut Vec<Feature>) -> ScoreSignal {
    let drainage_imputed = !fv.is_known(Feature::Drainage);
    let tolerance_imputed = !fv.is_known(Feature::FloodTolerance);
    if drainage_imputed {
        imputed.push(Feature::Drainage);
    }
    if tolerance_imputed {
        imputed.push(Feature::FloodTolerance);
    }

    let exposure = 1.0 - fv.value(Feature::Drainage);
    let tolerance = fv.value(Feature::FloodTolerance);
    let score = 1.0 - (exposure - tolerance).max(0.0);

    let drainage = if drainage_imputed {
        "unknown".to_string()
    } else {
        DrainageClass::from_ordinal(fv.value(Feature::Drainage)).display_text().to_string()
    };
    let detail = format!(
        "{} drainage against {} flood tolerance",
        drainage,
        if tolerance_imputed { "unknown" } else { Level::from_ordinal(tolerance).display_text() },
    );
    ScoreSignal::new(
        ScoreComponent::Waterlogging,
        score,
        weight,
        drainage_imputed || tolerance_imputed,
        detail,
    )
}

// ============================================================================
// Soil
// ============================================================================

pub fn score_soil(fv: &FeatureVector, config: &EngineConfig) -> SubScore {
    let w = &config.soil_weights;
    let m = &config.margins;
    let mut imputed = Vec::new();
    let mut signals: SignalBuffer = SmallVec::new();

    let ranges = [
        RangeSpec {
            component: ScoreComponent::SoilPh,
            value: Feature::SoilPh,
            min: Feature::PhMin,
            max: Feature::PhMax,
            margin: SOIL_PH.fraction(m.ph),
            weight: w.ph,
            label: "soil pH",
            units: Units::Scaled { range: SOIL_PH, unit: "", decimals: 1 },
        },
        RangeSpec {
            component: ScoreComponent::OrganicMatter,
            value: Feature::OrganicMatter,
            min: Feature::OrganicMatterMin,
            max: Feature::OrganicMatterMax,
            margin: ORGANIC_MATTER_PCT.fraction(m.organic_matter_pct),
            weight: w.organic_matter,
            label: "organic matter",
            units: Units::Scaled { range: ORGANIC_MATTER_PCT, unit: "%", decimals: 1 },
        },
        RangeSpec {
            component: ScoreComponent::Drainage,
            value: Feature::Drainage,
            min: Feature::DrainageMin,
            max: Feature::DrainageMax,
            margin: m.drainage_classes * DrainageClass::STEP,
            weight: w.drainage,
            label: "drainage",
            units: Units::Drainage,
        },
        RangeSpec {
            component: ScoreComponent::Texture,
            value: Feature::SoilTexture,
            min: Feature::TextureMin,
            max: Feature::TextureMax,
            margin: m.texture_classes * SoilTexture::STEP,
            weight: w.texture,
            label: "soil texture",
            units: Units::Texture,
        },
    ];
    signals.extend(ranges.iter().filter_map(|spec| range_component(fv, spec, &mut imputed)));

    if let Some(signal) = nutrient_component(fv, w.nutrients, &mut imputed) {
        signals.push(signal);
    }

    SubScore::combine(signals, imputed, config.imputed_score_cap)
}

/// Availability threshold (ppm) a nutrient demand level calls for
pub fn nutrient_threshold_ppm(nutrient: Feature, demand: Level) -> Option<f64> {
    let [low, medium, high] = match nutrient {
        Feature::Nitrogen => [20.0, 40.0, 60.0],
        Feature::Phosphorus => [15.0, 25.0, 40.0],
        Feature::Potassium => [80.0, 120.0, 200.0],
        _ => return None,
    };
    Some(match demand {
        Level::Low => low,
        Level::Medium => medium,
        Level::High => high,
    })
}

fn nutrient_component(fv: &FeatureVector, weight: f64, imputed: &mut Vec<Feature>) -> Option<ScoreSignal> {
    let nutrients = [
        (Feature::Nitrogen, Feature::NitrogenDemand, NITROGEN_PPM, "N"),
        (Feature::Phosphorus, Feature::PhosphorusDemand, PHOSPHORUS_PPM, "P"),
        (Feature::Potassium, Feature::PotassiumDemand, POTASSIUM_PPM, "K"),
    ];

    let mut fits: SmallVec<[f64; 3]> = SmallVec::new();
    let mut parts: SmallVec<[String; 3]> = SmallVec::new();
    let mut any_imputed = false;

    for (available, demand, range, symbol) in nutrients {
        let Some(demand_ordinal) = fv.known_value(demand) else {
            continue;
        };
        let level = Level::from_ordinal(demand_ordinal);
        let Some(threshold) = nutrient_threshold_ppm(available, level) else {
            continue;
        };

        let known = fv.is_known(available);
        if !known {
            any_imputed = true;
            imputed.push(available);
        }
        let ppm = range.unscale(fv.value(available));
        fits.push((ppm / threshold).min(1.0));
        parts.push(if known {
            format!("{} {:.0} ppm vs {:.0} needed", symbol, ppm, threshold)
        } else {
            format!("{} unknown vs {:.0} needed", symbol, threshold)
        });
    }

    if fits.is_empty() {
        return None;
    }
    let score = fits.iter().sum::<f64>() / fits.len() as f64;
    let detail = format!("nutrient supply: {}", parts.join(", "));
    Some(ScoreSignal::new(ScoreComponent::Nutrients, score, weight, any_imputed, detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{ClimateTier, CropType};
    use approx::assert_relative_eq;

    fn blank() -> FeatureVector {
        FeatureVector::blank("farm", "seed", "Test", CropType::Maize)
    }

    fn with_ph(fv: &mut FeatureVector, farm_ph: Option<f64>, seed: (f64, f64)) {
        fv.set_opt(Feature::SoilPh, farm_ph.map(|v| SOIL_PH.scale(v)));
        fv.set(Feature::PhMin, SOIL_PH.scale(seed.0));
        fv.set(Feature::PhMax, SOIL_PH.scale(seed.1));
    }

    #[test]
    fn test_ph_inside_range_scores_one() {
        let mut fv = blank();
        with_ph(&mut fv, Some(6.5), (5.5, 7.5));
        let soil = score_soil(&fv, &EngineConfig::default());
        assert_eq!(soil.score, 1.0);
        assert!(!soil.imputed);
        assert_eq!(soil.signals.len(), 1);
        assert!(soil.signals[0].detail.contains("6.5 within required 5.5-7.5"));
    }

    #[test]
    fn test_ph_decays_outside_range() {
        let config = EngineConfig::default();
        let mut fv = blank();
        with_ph(&mut fv, Some(4.75), (5.5, 7.5));
        let soil = score_soil(&fv, &config);
        assert_relative_eq!(soil.score, 0.5, epsilon = 1e-9);

        with_ph(&mut fv, Some(3.9), (5.5, 7.5));
        assert_eq!(score_soil(&fv, &config).score, 0.0);
    }

    #[test]
    fn test_unstated_soil_requirement_is_neutral_and_imputed() {
        let mut fv = blank();
        fv.set(Feature::SoilPh, SOIL_PH.scale(6.0));
        let soil = score_soil(&fv, &EngineConfig::default());
        assert_eq!(soil.score, 0.5);
        assert!(soil.imputed);
    }

    #[test]
    fn test_imputed_farm_ph_caps_score() {
        let mut fv = blank();
        // neutral pH 6.25 sits inside the range, but must not read as a perfect fit
        with_ph(&mut fv, None, (5.5, 7.5));
        let soil = score_soil(&fv, &EngineConfig::default());
        assert_eq!(soil.score, 0.89);
        assert_eq!(soil.imputed_features, vec![Feature::SoilPh]);
    }

    #[test]
    fn test_nutrient_thresholds() {
        assert_eq!(nutrient_threshold_ppm(Feature::Nitrogen, Level::High), Some(60.0));
        assert_eq!(nutrient_threshold_ppm(Feature::Phosphorus, Level::Low), Some(15.0));
        assert_eq!(nutrient_threshold_ppm(Feature::Potassium, Level::Medium), Some(120.0));
        assert_eq!(nutrient_threshold_ppm(Feature::SoilPh, Level::Medium), None);
    }

    #[test]
    fn test_nutrient_fit_caps_at_one() {
        let mut fv = blank();
        fv.set(Feature::Nitrogen, NITROGEN_PPM.scale(20.0));
        fv.set_level(Feature::NitrogenDemand, Some(Level::Medium));
        fv.set(Feature::Potassium, POTASSIUM_PPM.scale(300.0));
        fv.set_level(Feature::PotassiumDemand, Some(Level::High));
        let soil = score_soil(&fv, &EngineConfig::default());
        // N 20/40 = 0.5, K capped at 1.0
        assert_relative_eq!(soil.score, 0.75, epsilon = 1e-9);
    }

    #[test]
    fn test_drought_match_under_stress() {
        let config = EngineConfig::default();
        let mut fv = blank();
        fv.set_level(Feature::DroughtFrequency, Some(Level::High));
        fv.set_level(Feature::DroughtTolerance, Some(Level::Low));
        fv.set(Feature::Irrigation, 0.0);
        fv.set_level(Feature::FloodTolerance, Some(Level::Medium));
        fv.set(Feature::Drainage, DrainageClass::Good.ordinal());

        let climate = score_climate(&fv, &config);
        let drought = climate
            .signals
            .iter()
            .find(|s| s.component == ScoreComponent::Drought)
            .unwrap();
        assert_relative_eq!(drought.score, 1.0 - (0.85 - 0.15), epsilon = 1e-9);
        // stressed drought weight 0.45 against waterlogging 0.15
        assert_relative_eq!(drought.weight, 0.75, epsilon = 1e-9);
    }

    #[test]
    fn test_tier_match_scores() {
        let config = EngineConfig::default();
        let mut fv = blank();
        for t in ClimateTier::ALL {
            fv.set(Feature::FarmTier(t), if t == ClimateTier::Mediterranean { 1.0 } else { 0.0 });
        }
        fv.set(Feature::SeedTier(ClimateTier::HumidTemperate), 1.0);
        let climate = score_climate(&fv, &config);
        let tier = climate
            .signals
            .iter()
            .find(|s| s.component == ScoreComponent::ClimateTier)
            .unwrap();
        assert_eq!(tier.score, 0.6);
        assert!(!tier.imputed);
    }

    #[test]
    fn test_waterlogging_always_computed() {
        let fv = blank();
        let climate = score_climate(&fv, &EngineConfig::default());
        assert!(climate.signals.iter().any(|s| s.component == ScoreComponent::Waterlogging));
        assert!(climate.imputed);
        assert!(climate.score <= 0.89);
    }
}
