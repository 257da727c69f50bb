//! Feature Vector
//!
//! Explicit tagged schema for the normalized representation of one
//! (farm, seed) pair. Every dimension lives on [0, 1] and carries a parallel
//! `known` bit; a missing datum is stored as the neutral value with
//! `known = false` and is never silently treated as zero.

use serde::{Deserialize, Serialize};

use crate::profiles::{ClimateTier, CropType, Level};
use crate::utils::normalization::{self, NEUTRAL_VALUE};

/// Which side of the pair a feature describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSource {
    Farm,
    Seed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    // Farm soil
    SoilPh,
    OrganicMatter,
    Nitrogen,
    Phosphorus,
    Potassium,
    SoilTexture,
    Drainage,

    // Farm climate and context
    SeasonalRainfall,
    MeanTemperature,
    MaxTemperature,
    Altitude,
    DroughtFrequency,
    RainfallDeficit,
    RainfallVolatility,
    TemperatureVolatility,
    PestPressure,
    Irrigation,
    FarmTier(ClimateTier),

    // Seed traits
    DroughtTolerance,
    HeatTolerance,
    FloodTolerance,
    PestResistance,
    DiseaseResistance,
    YieldPotential,
    MaturityDays,
    MarketDemand,
    PriceVolatility,

    // Seed requirements
    PhMin,
    PhMax,
    OrganicMatterMin,
    OrganicMatterMax,
    DrainageMin,
    DrainageMax,
    TextureMin,
    TextureMax,
    RainfallMin,
    RainfallMax,
    TemperatureMin,
    TemperatureMax,
    AltitudeMin,
    AltitudeMax,
    NitrogenDemand,
    PhosphorusDemand,
    PotassiumDemand,
    SeedTier(ClimateTier),
}

const FARM_TIER_OFFSET: usize = 17;
const SEED_TRAIT_OFFSET: usize = FARM_TIER_OFFSET + 6;
const REQUIREMENT_OFFSET: usize = SEED_TRAIT_OFFSET + 9;
const SEED_TIER_OFFSET: usize = REQUIREMENT_OFFSET + 17;

impl Feature {
    pub const COUNT: usize = SEED_TIER_OFFSET + 6;

    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::SoilPh,
        Feature::OrganicMatter,
        Feature::Nitrogen,
        Feature::Phosphorus,
        Feature::Potassium,
        Feature::SoilTexture,
        Feature::Drainage,
        Feature::SeasonalRainfall,
        Feature::MeanTemperature,
        Feature::MaxTemperature,
        Feature::Altitude,
        Feature::DroughtFrequency,
        Feature::RainfallDeficit,
        Feature::RainfallVolatility,
        Feature::TemperatureVolatility,
        Feature::PestPressure,
        Feature::Irrigation,
        Feature::FarmTier(ClimateTier::Tropical),
        Feature::FarmTier(ClimateTier::Mediterranean),
        Feature::FarmTier(ClimateTier::HumidTemperate),
        Feature::FarmTier(ClimateTier::Continental),
        Feature::FarmTier(ClimateTier::BorealPolar),
        Feature::FarmTier(ClimateTier::Arid),
        Feature::DroughtTolerance,
        Feature::HeatTolerance,
        Feature::FloodTolerance,
        Feature::PestResistance,
        Feature::DiseaseResistance,
        Feature::YieldPotential,
        Feature::MaturityDays,
        Feature::MarketDemand,
        Feature::PriceVolatility,
        Feature::PhMin,
        Feature::PhMax,
        Feature::OrganicMatterMin,
        Feature::OrganicMatterMax,
        Feature::DrainageMin,
        Feature::DrainageMax,
        Feature::TextureMin,
        Feature::TextureMax,
        Feature::RainfallMin,
        Feature::RainfallMax,
        Feature::TemperatureMin,
        Feature::TemperatureMax,
        Feature::AltitudeMin,
        Feature::AltitudeMax,
        Feature::NitrogenDemand,
        Feature::PhosphorusDemand,
        Feature::PotassiumDemand,
        Feature::SeedTier(ClimateTier::Tropical),
        Feature::SeedTier(ClimateTier::Mediterranean),
        Feature::SeedTier(ClimateTier::HumidTemperate),
        Feature::SeedTier(ClimateTier::Continental),
        Feature::SeedTier(ClimateTier::BorealPolar),
        Feature::SeedTier(ClimateTier::Arid),
    ];

    /// Slot in the value/known arrays
    pub fn index(self) -> usize {
        match self {
            Feature::SoilPh => 0,
            Feature::OrganicMatter => 1,
            Feature::Nitrogen => 2,
            Feature::Phosphorus => 3,
            Feature::Potassium => 4,
            Feature::SoilTexture => 5,
            Feature::Drainage => 6,
            Feature::SeasonalRainfall => 7,
            Feature::MeanTemperature => 8,
            Feature::MaxTemperature => 9,
            Feature::Altitude => 10,
            Feature::DroughtFrequency => 11,
            Feature::RainfallDeficit => 12,
            Feature::RainfallVolatility => 13,
            Feature::TemperatureVolatility => 14,
            Feature::PestPressure => 15,
            Feature::Irrigation => 16,
            Feature::FarmTier(t) => FARM_TIER_OFFSET + t.index(),
            Feature::DroughtTolerance => SEED_TRAIT_OFFSET,
            Feature::HeatTolerance => SEED_TRAIT_OFFSET + 1,
            Feature::FloodTolerance => SEED_TRAIT_OFFSET + 2,
            Feature::PestResistance => SEED_TRAIT_OFFSET + 3,
            Feature::DiseaseResistance => SEED_TRAIT_OFFSET + 4,
            Feature::YieldPotential => SEED_TRAIT_OFFSET + 5,
            Feature::MaturityDays => SEED_TRAIT_OFFSET + 6,
            Feature::MarketDemand => SEED_TRAIT_OFFSET + 7,
            Feature::PriceVolatility => SEED_TRAIT_OFFSET + 8,
            Feature::PhMin => REQUIREMENT_OFFSET,
            Feature::PhMax => REQUIREMENT_OFFSET + 1,
            Feature::OrganicMatterMin => REQUIREMENT_OFFSET + 2,
            Feature::OrganicMatterMax => REQUIREMENT_OFFSET + 3,
            Feature::DrainageMin => REQUIREMENT_OFFSET + 4,
            Feature::DrainageMax => REQUIREMENT_OFFSET + 5,
            Feature::TextureMin => REQUIREMENT_OFFSET + 6,
            Feature::TextureMax => REQUIREMENT_OFFSET + 7,
            Feature::RainfallMin => REQUIREMENT_OFFSET + 8,
            Feature::RainfallMax => REQUIREMENT_OFFSET + 9,
            Feature::TemperatureMin => REQUIREMENT_OFFSET + 10,
            Feature::TemperatureMax => REQUIREMENT_OFFSET + 11,
            Feature::AltitudeMin => REQUIREMENT_OFFSET + 12,
            Feature::AltitudeMax => REQUIREMENT_OFFSET + 13,
            Feature::NitrogenDemand => REQUIREMENT_OFFSET + 14,
            Feature::PhosphorusDemand => REQUIREMENT_OFFSET + 15,
            Feature::PotassiumDemand => REQUIREMENT_OFFSET + 16,
            Feature::SeedTier(t) => SEED_TIER_OFFSET + t.index(),
        }
    }

    pub fn source(self) -> FeatureSource {
        if self.index() < SEED_TRAIT_OFFSET {
            FeatureSource::Farm
        } else {
            FeatureSource::Seed
        }
    }

    /// Human-readable name used in warnings and reasoning
    pub fn label(self) -> &'static str {
        match self {
            Feature::SoilPh => "soil pH",
            Feature::OrganicMatter => "soil organic matter",
            Feature::Nitrogen => "soil nitrogen",
            Feature::Phosphorus => "soil phosphorus",
            Feature::Potassium => "soil potassium",
            Feature::SoilTexture => "soil texture",
            Feature::Drainage => "soil drainage",
            Feature::SeasonalRainfall => "seasonal rainfall",
            Feature::MeanTemperature => "mean temperature",
            Feature::MaxTemperature => "maximum temperature",
            Feature::Altitude => "altitude",
            Feature::DroughtFrequency => "drought frequency",
            Feature::RainfallDeficit => "recent rainfall deficit",
            Feature::RainfallVolatility => "rainfall volatility",
            Feature::TemperatureVolatility => "temperature volatility",
            Feature::PestPressure => "regional pest pressure",
            Feature::Irrigation => "irrigation",
            Feature::FarmTier(_) => "farm climate zone",
            Feature::DroughtTolerance => "drought tolerance",
            Feature::HeatTolerance => "heat tolerance",
            Feature::FloodTolerance => "flood tolerance",
            Feature::PestResistance => "pest resistance",
            Feature::DiseaseResistance => "disease resistance",
            Feature::YieldPotential => "yield potential",
            Feature::MaturityDays => "days to maturity",
            Feature::MarketDemand => "market demand",
            Feature::PriceVolatility => "price volatility",
            Feature::PhMin | Feature::PhMax => "required pH range",
            Feature::OrganicMatterMin | Feature::OrganicMatterMax => "required organic matter range",
            Feature::DrainageMin | Feature::DrainageMax => "required drainage range",
            Feature::TextureMin | Feature::TextureMax => "preferred soil textures",
            Feature::RainfallMin | Feature::RainfallMax => "required rainfall range",
            Feature::TemperatureMin | Feature::TemperatureMax => "required temperature range",
            Feature::AltitudeMin | Feature::AltitudeMax => "required altitude range",
            Feature::NitrogenDemand => "nitrogen demand",
            Feature::PhosphorusDemand => "phosphorus demand",
            Feature::PotassiumDemand => "potassium demand",
            Feature::SeedTier(_) => "adapted climate zones",
        }
    }
}

/// Normalized (farm, seed) pair. Ephemeral: built per request, never persisted.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub farm_id: String,
    pub seed_id: String,
    pub seed_name: String,
    pub crop_type: CropType,
    values: [f64; Feature::COUNT],
    known: [bool; Feature::COUNT],
}

impl FeatureVector {
    /// All dimensions neutral and unknown
    pub fn blank(
        farm_id: impl Into<String>,
        seed_id: impl Into<String>,
        seed_name: impl Into<String>,
        crop_type: CropType,
    ) -> Self {
        Self {
            farm_id: farm_id.into(),
            seed_id: seed_id.into(),
            seed_name: seed_name.into(),
            crop_type,
            values: [NEUTRAL_VALUE; Feature::COUNT],
            known: [false; Feature::COUNT],
        }
    }

    /// Record a known normalized value (clamped to [0, 1])
    pub fn set(&mut self, feature: Feature, value: f64) {
        let i = feature.index();
        if value.is_finite() {
            self.values[i] = value.clamp(0.0, 1.0);
            self.known[i] = true;
        } else {
            self.values[i] = NEUTRAL_VALUE;
            self.known[i] = false;
        }
    }

    /// Record an optional value; `None` leaves the slot neutral and unknown
    pub fn set_opt(&mut self, feature: Feature, value: Option<f64>) {
        if let Some(v) = value {
            self.set(feature, v);
        }
    }

    pub fn set_level(&mut self, feature: Feature, level: Option<Level>) {
        self.set_opt(feature, level.map(Level::ordinal));
    }

    pub fn value(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn is_known(&self, feature: Feature) -> bool {
        self.known[feature.index()]
    }

    pub fn known_value(&self, feature: Feature) -> Option<f64> {
        self.is_known(feature).then(|| self.value(feature))
    }

    pub fn all_known(&self, features: &[Feature]) -> bool {
        features.iter().all(|f| self.is_known(*f))
    }

    /// Features from `features` that are imputed
    pub fn imputed_among(&self, features: &[Feature]) -> Vec<Feature> {
        features.iter().copied().filter(|f| !self.is_known(*f)).collect()
    }

    /// (feature, value, known) for every dimension in schema order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64, bool)> + '_ {
        Feature::ALL
            .iter()
            .map(move |f| (*f, self.values[f.index()], self.known[f.index()]))
    }

    pub fn known_count(&self) -> usize {
        self.known.iter().filter(|k| **k).count()
    }

    /// Farm climate tier when the one-hot block is known
    pub fn farm_tier(&self) -> Option<ClimateTier> {
        ClimateTier::ALL
            .iter()
            .copied()
            .find(|t| self.is_known(Feature::FarmTier(*t)) && self.value(Feature::FarmTier(*t)) >= 0.5)
    }

    /// Tiers the seed states it is adapted to (empty when unstated)
    pub fn seed_tiers(&self) -> Vec<ClimateTier> {
        ClimateTier::ALL
            .iter()
            .copied()
            .filter(|t| self.is_known(Feature::SeedTier(*t)) && self.value(Feature::SeedTier(*t)) >= 0.5)
            .collect()
    }

    /// Farm drought exposure: the larger of known drought frequency and
    /// recent rainfall deficit, halved under irrigation.
    ///
    /// Returns `(exposure, imputed)`; with neither input known the neutral
    /// value is used and the exposure is imputed.
    pub fn drought_exposure(&self) -> (f64, bool) {
        let parts = [
            self.known_value(Feature::DroughtFrequency),
            self.known_value(Feature::RainfallDeficit),
        ];
        let base = parts.iter().flatten().copied().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.max(v)))
        });

        let (raw, imputed) = match base {
            Some(v) => (v, false),
            None => (NEUTRAL_VALUE, true),
        };

        let irrigated = self.known_value(Feature::Irrigation).unwrap_or(0.0) >= 0.5;
        let exposure = if irrigated { raw * 0.5 } else { raw };
        (normalization::clamp_unit(exposure), imputed)
    }

    /// Known recent rainfall below the long-term median, or known high
    /// drought frequency
    pub fn under_climate_stress(&self) -> bool {
        let deficit = self
            .known_value(Feature::RainfallDeficit)
            .map_or(false, |d| d > 0.0);
        let frequent_drought = self
            .known_value(Feature::DroughtFrequency)
            .map_or(false, |d| d >= Level::High.ordinal() - 1e-9);
        deficit || frequent_drought
    }
}
