//! Risk Assessor
//!
//! Six sub-risks, each on [0, 1], combine into a weighted risk score clipped
//! to [0, 1]. Every measured sub-risk above the factor threshold surfaces as
//! its own [`RiskFactor`], so no material risk hides inside the aggregate.
//! A sub-risk resting on imputed inputs still counts toward the score but is
//! never reported as a factor; its inputs appear as data-gap warnings.
//!
//! The farmer's risk tolerance never changes `risk_score`; it only decides
//! whether the resulting bucket is admitted (see `within_tolerance`).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::EngineConfig;
use crate::features::{Feature, FeatureVector};
use crate::profiles::{Level, RequestParameters};
use crate::utils::envelope::compare_to_range;
use crate::utils::normalization::{clamp_unit, SOIL_PH, TEMPERATURE_C};

/// Heat stress starts above this daily maximum (°C)
const HEAT_ONSET_C: f64 = 30.0;
/// Degrees above onset at which heat exposure saturates
const HEAT_SPAN_C: f64 = 10.0;
/// Typical gap between seasonal mean and maximum temperature (°C)
const MEAN_TO_MAX_OFFSET_C: f64 = 6.0;
/// Soil constraint when the seed states no pH range
const UNSTATED_SOIL_CONSTRAINT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn display_text(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    Drought,
    Heat,
    ClimateVolatility,
    PestDisease,
    Market,
    SoilConstraint,
}

impl RiskKind {
    pub fn display_text(&self) -> &'static str {
        match self {
            RiskKind::Drought => "drought",
            RiskKind::Heat => "heat stress",
            RiskKind::ClimateVolatility => "climate volatility",
            RiskKind::PestDisease => "pest and disease",
            RiskKind::Market => "market price",
            RiskKind::SoilConstraint => "soil constraint",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A measured sub-risk above the reporting threshold
pub struct RiskFactor {
    pub kind: RiskKind,
    pub severity: f64,
    pub description: String,
}

/// One evaluated sub-risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRisk {
    pub kind: RiskKind,
    pub value: f64,
    pub weight: f64,
    pub imputed: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub level: RiskLevel,
    pub risk_factors: Vec<RiskFactor>,
    pub sub_risks: Vec<SubRisk>,
    pub imputed_features: Vec<Feature>,
    /// Whether the request's risk tolerance admits `level`
    pub within_tolerance: bool,
}

pub fn assess(fv: &FeatureVector, params: &RequestParameters, config: &EngineConfig) -> RiskAssessment {
    let w = &config.risk_weights;
    let mut imputed = Vec::new();
    let mut subs: SmallVec<[SubRisk; 6]> = SmallVec::new();

    subs.push(drought_risk(fv, w.drought, &mut imputed));
    subs.push(heat_risk(fv, w.heat, &mut imputed));
    subs.push(volatility_risk(fv, w.climate_volatility, &mut imputed));
    subs.push(pest_risk(fv, w.pest_disease, &mut imputed));
    subs.push(market_risk(fv, w.market, &mut imputed));
    subs.push(soil_risk(fv, w.soil_constraint, config, &mut imputed));

    let total_weight: f64 = subs.iter().map(|s| s.weight.max(0.0)).sum();
    let raw = if total_weight > 0.0 {
        subs.iter().map(|s| s.weight.max(0.0) * s.value).sum::<f64>() / total_weight
    } else {
        0.0
    };

    let any_imputed = subs.iter().any(|s| s.imputed);
    let mut risk_score = clamp_unit(raw);
    if any_imputed {
        risk_score = risk_score.min(config.imputed_score_cap);
    }

    let risk_factors = subs
        .iter()
        .filter(|s| !s.imputed && s.value > config.risk_factor_threshold)
        .map(|s| RiskFactor { kind: s.kind, severity: s.value, description: s.description.clone() })
        .collect();

    imputed.sort();
    imputed.dedup();

    let level = config.risk_bounds.level(risk_score);
    RiskAssessment {
        risk_score,
        level,
        risk_factors,
        sub_risks: subs.into_vec(),
        imputed_features: imputed,
        within_tolerance: params.risk_tolerance.admits(level),
    }
}

/// Known value, or the neutral value recorded as imputed
fn take(fv: &FeatureVector, feature: Feature, imputed: &mut Vec<Feature>) -> (f64, bool) {
    if fv.is_known(feature) {
        (fv.value(feature), false)
    } else {
        imputed.push(feature);
        (fv.value(feature), true)
    }
}

fn level_text(value: f64, imputed: bool) -> &'static str {
    if imputed {
        "unknown"
    } else {
        Level::from_ordinal(value).display_text()
    }
}

fn drought_risk(fv: &FeatureVector, weight: f64, imputed: &mut Vec<Feature>) -> SubRisk {
    let (exposure, exposure_imputed) = fv.drought_exposure();
    if exposure_imputed {
        imputed.push(Feature::DroughtFrequency);
    }
    let (tolerance, tol_imputed) = take(fv, Feature::DroughtTolerance, imputed);
    let value = clamp_unit(exposure * (1.0 - tolerance));
    let exposure_text = if exposure_imputed {
        "Drought exposure unknown".to_string()
    } else {
        format!("Drought exposure {:.2}", exposure)
    };
    SubRisk {
        kind: RiskKind::Drought,
        value,
        weight,
        imputed: exposure_imputed || tol_imputed,
        description: format!(
            "{} against {} drought tolerance (risk {:.2})",
            exposure_text,
            level_text(tolerance, tol_imputed),
            value
        ),
    }
}

fn heat_risk(fv: &FeatureVector, weight: f64, imputed: &mut Vec<Feature>) -> SubRisk {
    let max_temp = fv
        .known_value(Feature::MaxTemperature)
        .map(|v| TEMPERATURE_C.unscale(v))
        .or_else(|| {
            fv.known_value(Feature::MeanTemperature)
                .map(|v| TEMPERATURE_C.unscale(v) + MEAN_TO_MAX_OFFSET_C)
        });

    let (exposure, exposure_imputed) = match max_temp {
        Some(t) => (clamp_unit((t - HEAT_ONSET_C) / HEAT_SPAN_C), false),
        None => {
            imputed.push(Feature::MaxTemperature);
            (0.5, true)
        }
    };
    let (tolerance, tol_imputed) = take(fv, Feature::HeatTolerance, imputed);
    let value = clamp_unit(exposure * (1.0 - tolerance));

    let temp_text = match max_temp {
        Some(t) => format!("maximum temperature around {:.1} °C", t),
        None => "maximum temperature unknown".to_string(),
    };
    SubRisk {
        kind: RiskKind::Heat,
        value,
        weight,
        imputed: exposure_imputed || tol_imputed,
        description: format!(
            "Heat stress: {} against {} heat tolerance (risk {:.2})",
            temp_text,
            level_text(tolerance, tol_imputed),
            value
        ),
    }
}

fn volatility_risk(fv: &FeatureVector, weight: f64, imputed: &mut Vec<Feature>) -> SubRisk {
    let (rain, rain_imputed) = take(fv, Feature::RainfallVolatility, imputed);
    let (temp, temp_imputed) = take(fv, Feature::TemperatureVolatility, imputed);
    let value = clamp_unit(0.6 * rain + 0.4 * temp);
    let volatility_text = |v: f64, unknown: bool| if unknown { "unknown".to_string() } else { format!("{:.2}", v) };
    let description = if rain_imputed && temp_imputed {
        "Climate volatility unknown; too little climate history".to_string()
    } else {
        format!(
            "Recent seasons deviate from the long-term climate record (rainfall volatility {}, temperature volatility {})",
            volatility_text(rain, rain_imputed),
            volatility_text(temp, temp_imputed)
        )
    };
    SubRisk {
        kind: RiskKind::ClimateVolatility,
        value,
        weight,
        imputed: rain_imputed || temp_imputed,
        description,
    }
}

fn pest_risk(fv: &FeatureVector, weight: f64, imputed: &mut Vec<Feature>) -> SubRisk {
    let (pressure, pressure_imputed) = take(fv, Feature::PestPressure, imputed);
    let (pest, pest_imputed) = take(fv, Feature::PestResistance, imputed);
    let (disease, disease_imputed) = take(fv, Feature::DiseaseResistance, imputed);
    let resistance = 0.5 * (pest + disease);
    let value = clamp_unit(pressure * (1.0 - resistance));
    SubRisk {
        kind: RiskKind::PestDisease,
        value,
        weight,
        imputed: pressure_imputed || pest_imputed || disease_imputed,
        description: format!(
            "{} regional pest pressure against {} pest and {} disease resistance",
            capitalize(level_text(pressure, pressure_imputed)),
            level_text(pest, pest_imputed),
            level_text(disease, disease_imputed)
        ),
    }
}

fn market_risk(fv: &FeatureVector, weight: f64, imputed: &mut Vec<Feature>) -> SubRisk {
    let (volatility, vol_imputed) = take(fv, Feature::PriceVolatility, imputed);
    SubRisk {
        kind: RiskKind::Market,
        value: volatility,
        weight,
        imputed: vol_imputed,
        description: if vol_imputed {
            "Price volatility unknown".to_string()
        } else {
            format!("Historical price volatility {:.2}", volatility)
        },
    }
}

fn soil_risk(fv: &FeatureVector, weight: f64, config: &EngineConfig, imputed: &mut Vec<Feature>) -> SubRisk {
    if !fv.all_known(&[Feature::PhMin, Feature::PhMax]) {
        imputed.push(Feature::PhMin);
        return SubRisk {
            kind: RiskKind::SoilConstraint,
            value: UNSTATED_SOIL_CONSTRAINT,
            weight,
            imputed: true,
            description: "Soil constraint unknown; variety states no soil pH range".to_string(),
        };
    }

    let (ph, ph_imputed) = take(fv, Feature::SoilPh, imputed);
    let comp = compare_to_range(ph, fv.value(Feature::PhMin), fv.value(Feature::PhMax));
    let fit = comp.score_with_margin(SOIL_PH.fraction(config.margins.ph));
    let value = clamp_unit(1.0 - fit);

    let description = if ph_imputed {
        "Soil pH unknown; pH constraint cannot be ruled out".to_string()
    } else {
        format!(
            "Soil pH {:.1} is {} the required {:.1}-{:.1}",
            SOIL_PH.unscale(ph),
            comp.fit.display_text(),
            SOIL_PH.unscale(comp.min),
            SOIL_PH.unscale(comp.max)
        )
    };
    SubRisk { kind: RiskKind::SoilConstraint, value, weight, imputed: ph_imputed, description }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
