//! Seed variety records
//!
//! Requirement ranges are stated in the same physical units as the farm
//! profile. A missing range means the variety states no requirement, which
//! the compatibility scorer treats as "not applicable" rather than as a fit.

use serde::{Deserialize, Serialize};

use super::climate_tier::ClimateTier;
use super::levels::{DrainageClass, Level, SoilTexture};

/// Crop types grown across the supported regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    Maize,
    Beans,
    Cassava,
    SweetPotato,
    Groundnuts,
    Rice,
    Sorghum,
    Millet,
    Banana,
    Coffee,
}

impl CropType {
    pub fn display_name(&self) -> &'static str {
        match self {
            CropType::Maize => "maize",
            CropType::Beans => "beans",
            CropType::Cassava => "cassava",
            CropType::SweetPotato => "sweet potato",
            CropType::Groundnuts => "groundnuts",
            CropType::Rice => "rice",
            CropType::Sorghum => "sorghum",
            CropType::Millet => "millet",
            CropType::Banana => "banana",
            CropType::Coffee => "coffee",
        }
    }

    /// Typical smallholder yield (t/ha), used when a variety states no potential
    pub fn typical_yield_t_ha(&self) -> f64 {
        match self {
            CropType::Maize => 4.5,
            CropType::Beans => 1.5,
            CropType::Cassava => 15.0,
            CropType::SweetPotato => 10.0,
            CropType::Groundnuts => 1.2,
            CropType::Rice => 3.5,
            CropType::Sorghum => 2.0,
            CropType::Millet => 1.5,
            CropType::Banana => 15.0,
            CropType::Coffee => 1.0,
        }
    }

    /// Default seed rate (kg/ha). Vegetatively propagated crops have none.
    pub fn default_seed_rate_kg_ha(&self) -> Option<f64> {
        match self {
            CropType::Maize => Some(25.0),
            CropType::Beans => Some(80.0),
            CropType::Groundnuts => Some(100.0),
            CropType::Rice => Some(60.0),
            CropType::Sorghum => Some(10.0),
            CropType::Millet => Some(8.0),
            CropType::Cassava | CropType::SweetPotato | CropType::Banana | CropType::Coffee => None,
        }
    }

    pub fn is_legume(&self) -> bool {
        matches!(self, CropType::Beans | CropType::Groundnuts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarietyClass {
    Traditional,
    Improved,
    Hybrid,
}

/// Closed numeric range in physical units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainageRange {
    pub min: DrainageClass,
    pub max: DrainageClass,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilRequirements {
    pub ph: Option<ValueRange>,
    pub organic_matter_pct: Option<ValueRange>,
    pub drainage: Option<DrainageRange>,
    pub preferred_textures: Vec<SoilTexture>,
    pub nitrogen_demand: Option<Level>,
    pub phosphorus_demand: Option<Level>,
    pub potassium_demand: Option<Level>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateRequirements {
    pub rainfall_mm: Option<ValueRange>,
    pub temperature_c: Option<ValueRange>,
    pub altitude_m: Option<ValueRange>,
    pub climate_tiers: Vec<ClimateTier>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub drought: Option<Level>,
    pub heat: Option<Level>,
    pub flood: Option<Level>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resistances {
    pub pest: Option<Level>,
    pub disease: Option<Level>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSignal {
    pub demand: Option<Level>,
    /// Historical price volatility on [0, 1]
    pub price_volatility: Option<f64>,
}

/// One observed outcome and the conditions it was observed under
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub year: i32,
    pub yield_t_ha: f64,
    #[serde(default)]
    pub rainfall_mm: Option<f64>,
    #[serde(default)]
    pub soil_ph: Option<f64>,
    #[serde(default)]
    pub organic_matter_pct: Option<f64>,
    #[serde(default)]
    pub mean_temp_c: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedProfile {
    pub id: String,
    pub variety_name: String,
    #[serde(default)]
    pub crop_type: Option<CropType>,
    #[serde(default)]
    pub variety_class: Option<VarietyClass>,
    #[serde(default)]
    pub maturity_days: Option<u32>,
    #[serde(default)]
    pub yield_potential_t_ha: Option<f64>,
    #[serde(default)]
    pub tolerances: Tolerances,
    #[serde(default)]
    pub resistances: Resistances,
    #[serde(default)]
    pub soil_requirements: SoilRequirements,
    #[serde(default)]
    pub climate_requirements: ClimateRequirements,
    #[serde(default)]
    pub trait_tags: Vec<String>,
    #[serde(default)]
    pub seed_rate_kg_ha: Option<f64>,
    #[serde(default)]
    pub seed_price_per_kg: Option<f64>,
    #[serde(default)]
    pub input_cost_per_ha: Option<f64>,
    #[serde(default)]
    pub market: MarketSignal,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub historical_performance: Vec<PerformanceRecord>,
}

fn default_available() -> bool {
    true
}

impl SeedProfile {
    /// Minimal available seed of the given crop; remaining fields empty
    pub fn new(id: impl Into<String>, variety_name: impl Into<String>, crop_type: CropType) -> Self {
        Self {
            id: id.into(),
            variety_name: variety_name.into(),
            crop_type: Some(crop_type),
            variety_class: None,
            maturity_days: None,
            yield_potential_t_ha: None,
            tolerances: Tolerances::default(),
            resistances: Resistances::default(),
            soil_requirements: SoilRequirements::default(),
            climate_requirements: ClimateRequirements::default(),
            trait_tags: Vec::new(),
            seed_rate_kg_ha: None,
            seed_price_per_kg: None,
            input_cost_per_ha: None,
            market: MarketSignal::default(),
            is_available: true,
            historical_performance: Vec::new(),
        }
    }

    /// Stated seed rate, else the crop default
    pub fn effective_seed_rate_kg_ha(&self) -> Option<f64> {
        self.seed_rate_kg_ha
            .filter(|r| r.is_finite() && *r >= 0.0)
            .or_else(|| self.crop_type.and_then(|c| c.default_seed_rate_kg_ha()))
    }
}
