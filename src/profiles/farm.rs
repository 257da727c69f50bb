//! Farm records
//!
//! A farm profile is an immutable per-request snapshot. Everything below the
//! location is optional: the normalizer imputes what is absent and the
//! scorers record the imputation.

use serde::{Deserialize, Serialize};

use super::climate_tier::ClimateTier;
use super::levels::{DrainageClass, Level, SoilTexture};
use super::request::Season;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Soil test results. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilProfile {
    pub ph: Option<f64>,
    pub organic_matter_pct: Option<f64>,
    pub nitrogen_ppm: Option<f64>,
    pub phosphorus_ppm: Option<f64>,
    pub potassium_ppm: Option<f64>,
    pub texture: Option<SoilTexture>,
    pub drainage: Option<DrainageClass>,
}

impl SoilProfile {
    /// True when no soil measurement at all is available
    pub fn is_empty(&self) -> bool {
        self.ph.is_none()
            && self.organic_matter_pct.is_none()
            && self.nitrogen_ppm.is_none()
            && self.phosphorus_ppm.is_none()
            && self.potassium_ppm.is_none()
            && self.texture.is_none()
            && self.drainage.is_none()
    }
}

/// Climate summary for the farm's location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateSummary {
    pub seasonal_rainfall_mm: Option<f64>,
    pub mean_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub altitude_m: Option<f64>,
    pub drought_frequency: Option<Level>,
    pub koppen_zone: Option<String>,
    pub pest_pressure: Option<Level>,
}

impl ClimateSummary {
    pub fn climate_tier(&self) -> Option<ClimateTier> {
        self.koppen_zone.as_deref().and_then(ClimateTier::from_koppen)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Infrastructure {
    pub irrigation: bool,
    pub storage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub soil: SoilProfile,
    #[serde(default)]
    pub climate: ClimateSummary,
    #[serde(default)]
    pub infrastructure: Infrastructure,
    #[serde(default)]
    pub size_ha: Option<f64>,
}

/// One observed season at the farm's location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonClimate {
    pub year: i32,
    pub season: Season,
    #[serde(default)]
    pub rainfall_mm: Option<f64>,
    #[serde(default)]
    pub mean_temp_c: Option<f64>,
}

/// Multi-season climate series, kept in chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SeasonClimate>", into = "Vec<SeasonClimate>")]
pub struct ClimateHistory {
    seasons: Vec<SeasonClimate>,
}

impl ClimateHistory {
    pub fn new(mut seasons: Vec<SeasonClimate>) -> Self {
        seasons.sort_by_key(|s| (s.year, s.season));
        Self { seasons }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn seasons(&self) -> &[SeasonClimate] {
        &self.seasons
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }

    /// Finite rainfall observations, oldest first
    pub fn rainfall_series(&self) -> Vec<f64> {
        self.seasons
            .iter()
            .filter_map(|s| s.rainfall_mm)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .collect()
    }

    /// Finite mean-temperature observations, oldest first
    pub fn temperature_series(&self) -> Vec<f64> {
        self.seasons
            .iter()
            .filter_map(|s| s.mean_temp_c)
            .filter(|v| v.is_finite())
            .collect()
    }
}

impl From<Vec<SeasonClimate>> for ClimateHistory {
    fn from(seasons: Vec<SeasonClimate>) -> Self {
        ClimateHistory::new(seasons)
    }
}

impl From<ClimateHistory> for Vec<SeasonClimate> {
    fn from(history: ClimateHistory) -> Self {
        history.seasons
    }
}

/// What a farm directory hands the engine: the profile plus its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmRecord {
    pub profile: FarmProfile,
    #[serde(default)]
    pub climate_history: ClimateHistory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_sorted_chronologically() {
        let history = ClimateHistory::new(vec![
            SeasonClimate { year: 2023, season: Season::B, rainfall_mm: Some(500.0), mean_temp_c: None },
            SeasonClimate { year: 2022, season: Season::B, rainfall_mm: Some(400.0), mean_temp_c: None },
            SeasonClimate { year: 2023, season: Season::A, rainfall_mm: Some(450.0), mean_temp_c: None },
        ]);
        assert_eq!(history.rainfall_series(), vec![400.0, 450.0, 500.0]);
    }

    #[test]
    fn test_rainfall_series_skips_invalid() {
        let history = ClimateHistory::new(vec![
            SeasonClimate { year: 2021, season: Season::A, rainfall_mm: Some(f64::NAN), mean_temp_c: Some(22.0) },
            SeasonClimate { year: 2022, season: Season::A, rainfall_mm: Some(-5.0), mean_temp_c: None },
            SeasonClimate { year: 2023, season: Season::A, rainfall_mm: None, mean_temp_c: Some(23.0) },
        ]);
        assert!(history.rainfall_series().is_empty());
        assert_eq!(history.temperature_series(), vec![22.0, 23.0]);
    }

    #[test]
    fn test_soil_profile_is_empty() {
        assert!(SoilProfile::default().is_empty());
        let soil = SoilProfile { ph: Some(6.1), ..Default::default() };
        assert!(!soil.is_empty());
    }

    #[test]
    fn test_farm_deserializes_with_sparse_fields() {
        let json = r#"{"id": "f1", "location": {"latitude": 0.35, "longitude": 32.6}}"#;
        let farm: FarmProfile = serde_json::from_str(json).unwrap();
        assert!(farm.soil.is_empty());
        assert!(farm.location.unwrap().is_valid());
        assert!(!farm.infrastructure.irrigation);
    }

    #[test]
    fn test_climate_tier_from_zone() {
        let climate = ClimateSummary { koppen_zone: Some("Aw".into()), ..Default::default() };
        assert_eq!(climate.climate_tier(), Some(ClimateTier::Tropical));
        assert_eq!(ClimateSummary::default().climate_tier(), None);
    }
}
