//! Shared fixtures: three Ugandan farms and a small seed catalog

#![allow(dead_code)]

use seed_recommender::{
    ClimateHistory, ClimateSummary, CropType, DrainageClass, DrainageRange, FarmProfile,
    GeoLocation, Infrastructure, Level, PerformanceRecord, SeasonClimate, Season, SeedProfile,
    SoilProfile, SoilTexture, ValueRange, ClimateTier,
};

pub fn farm(id: &str, latitude: f64, longitude: f64) -> FarmProfile {
    FarmProfile {
        id: id.to_string(),
        name: id.to_string(),
        location: Some(GeoLocation { latitude, longitude }),
        soil: SoilProfile::default(),
        climate: ClimateSummary::default(),
        infrastructure: Infrastructure::default(),
        size_ha: Some(1.0),
    }
}

/// Lake Victoria crescent: bimodal rain, mildly acid soils
pub fn kampala_farm() -> FarmProfile {
    let mut f = farm("kampala-01", 0.35, 32.58);
    f.soil = SoilProfile {
        ph: Some(5.8),
        organic_matter_pct: Some(3.1),
        nitrogen_ppm: Some(35.0),
        phosphorus_ppm: Some(20.0),
        potassium_ppm: Some(140.0),
        texture: Some(SoilTexture::SandyClayLoam),
        drainage: Some(DrainageClass::Good),
    };
    f.climate = ClimateSummary {
        seasonal_rainfall_mm: Some(1100.0),
        mean_temp_c: Some(22.0),
        max_temp_c: Some(28.0),
        altitude_m: Some(1190.0),
        drought_frequency: Some(Level::Low),
        koppen_zone: Some("Af".to_string()),
        pest_pressure: Some(Level::Medium),
    };
    f
}

/// Northern savanna: hotter, one long season, frequent dry spells
pub fn gulu_farm() -> FarmProfile {
    let mut f = farm("gulu-07", 2.78, 32.30);
    f.soil = SoilProfile {
        ph: Some(6.2),
        organic_matter_pct: Some(1.8),
        texture: Some(SoilTexture::SandyLoam),
        drainage: Some(DrainageClass::Excellent),
        ..Default::default()
    };
    f.climate = ClimateSummary {
        seasonal_rainfall_mm: Some(750.0),
        mean_temp_c: Some(25.5),
        max_temp_c: Some(33.0),
        altitude_m: Some(1100.0),
        drought_frequency: Some(Level::High),
        koppen_zone: Some("Aw".to_string()),
        pest_pressure: Some(Level::High),
    };
    f
}

/// South-western highlands: cooler, no soil test on record
pub fn mbarara_farm() -> FarmProfile {
    let mut f = farm("mbarara-03", -0.61, 30.65);
    f.climate = ClimateSummary {
        seasonal_rainfall_mm: Some(950.0),
        mean_temp_c: Some(19.5),
        max_temp_c: None,
        altitude_m: Some(1450.0),
        drought_frequency: Some(Level::Medium),
        koppen_zone: Some("Cwb".to_string()),
        pest_pressure: None,
    };
    f
}

pub fn history(rainfall: &[f64]) -> ClimateHistory {
    let seasons = rainfall
        .iter()
        .enumerate()
        .map(|(i, r)| SeasonClimate {
            year: 2018 + (i / 2) as i32,
            season: if i % 2 == 0 { Season::A } else { Season::B },
            rainfall_mm: Some(*r),
            mean_temp_c: Some(22.0),
        })
        .collect();
    ClimateHistory::new(seasons)
}

pub fn longe_5() -> SeedProfile {
    let mut s = SeedProfile::new("longe-5", "Longe 5", CropType::Maize);
    s.maturity_days = Some(115);
    s.yield_potential_t_ha = Some(5.0);
    s.tolerances.drought = Some(Level::Medium);
    s.tolerances.heat = Some(Level::Medium);
    s.tolerances.flood = Some(Level::Low);
    s.resistances.pest = Some(Level::Medium);
    s.resistances.disease = Some(Level::High);
    s.soil_requirements.ph = Some(ValueRange::new(5.5, 7.0));
    s.soil_requirements.organic_matter_pct = Some(ValueRange::new(2.0, 6.0));
    s.soil_requirements.drainage = Some(DrainageRange { min: DrainageClass::Fair, max: DrainageClass::Excellent });
    s.soil_requirements.nitrogen_demand = Some(Level::High);
    s.climate_requirements.rainfall_mm = Some(ValueRange::new(800.0, 1400.0));
    s.climate_requirements.temperature_c = Some(ValueRange::new(18.0, 30.0));
    s.climate_requirements.climate_tiers = vec![ClimateTier::Tropical, ClimateTier::HumidTemperate];
    s.seed_price_per_kg = Some(6.0);
    s.input_cost_per_ha = Some(150.0);
    s.market.demand = Some(Level::High);
    s.market.price_volatility = Some(0.3);
    s
}

pub fn nabe_15() -> SeedProfile {
    let mut s = SeedProfile::new("nabe-15", "NABE 15", CropType::Beans);
    s.maturity_days = Some(85);
    s.yield_potential_t_ha = Some(2.0);
    s.tolerances.drought = Some(Level::Low);
    s.resistances.disease = Some(Level::Medium);
    s.soil_requirements.ph = Some(ValueRange::new(5.8, 7.2));
    s.soil_requirements.phosphorus_demand = Some(Level::High);
    s.climate_requirements.rainfall_mm = Some(ValueRange::new(600.0, 1200.0));
    s.climate_requirements.temperature_c = Some(ValueRange::new(16.0, 26.0));
    s.seed_price_per_kg = Some(5.0);
    s.market.demand = Some(Level::Medium);
    s
}

pub fn nase_14() -> SeedProfile {
    let mut s = SeedProfile::new("nase-14", "NASE 14", CropType::Cassava);
    s.maturity_days = Some(360);
    s.yield_potential_t_ha = Some(25.0);
    s.tolerances.drought = Some(Level::High);
    s.tolerances.heat = Some(Level::High);
    s.soil_requirements.ph = Some(ValueRange::new(4.5, 7.5));
    s.climate_requirements.rainfall_mm = Some(ValueRange::new(500.0, 2000.0));
    s.climate_requirements.climate_tiers = vec![ClimateTier::Tropical, ClimateTier::Arid];
    s.input_cost_per_ha = Some(100.0);
    s
}

pub fn sekedo() -> SeedProfile {
    let mut s = SeedProfile::new("sekedo", "Sekedo", CropType::Sorghum);
    s.tolerances.drought = Some(Level::High);
    s.tolerances.heat = Some(Level::High);
    s.seed_price_per_kg = Some(3.0);
    s
}

pub fn catalog() -> Vec<SeedProfile> {
    vec![longe_5(), nabe_15(), nase_14(), sekedo()]
}

pub fn trials(yields: &[(f64, f64, f64)]) -> Vec<PerformanceRecord> {
    yields
        .iter()
        .enumerate()
        .map(|(i, (y, rain, ph))| PerformanceRecord {
            year: 2015 + i as i32,
            yield_t_ha: *y,
            rainfall_mm: Some(*rain),
            soil_ph: Some(*ph),
            organic_matter_pct: None,
            mean_temp_c: None,
        })
        .collect()
}
