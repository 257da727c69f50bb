use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use seed_recommender::{
    ClimateHistory, ClimateSummary, CropType, DrainageClass, EngineConfig, FarmProfile, GeoLocation,
    Level, PerformanceRecord, RecommendationEngine, RequestParameters, RiskTolerance, Season,
    SeasonClimate, SeedProfile, SoilProfile, SoilTexture, ValueRange,
};

const CROPS: [CropType; 5] = [CropType::Maize, CropType::Beans, CropType::Sorghum, CropType::Rice, CropType::Cassava];
const LEVELS: [Level; 3] = [Level::Low, Level::Medium, Level::High];

fn bench_farm() -> FarmProfile {
    FarmProfile {
        id: "bench-farm".into(),
        name: "Bench farm".into(),
        location: Some(GeoLocation { latitude: 0.45, longitude: 33.2 }),
        soil: SoilProfile {
            ph: Some(5.9),
            organic_matter_pct: Some(2.7),
            nitrogen_ppm: Some(28.0),
            phosphorus_ppm: Some(14.0),
            potassium_ppm: Some(110.0),
            texture: Some(SoilTexture::SandyClayLoam),
            drainage: Some(DrainageClass::Good),
        },
        climate: ClimateSummary {
            seasonal_rainfall_mm: Some(1050.0),
            mean_temp_c: Some(23.0),
            max_temp_c: Some(29.5),
            altitude_m: Some(1150.0),
            drought_frequency: Some(Level::Medium),
            koppen_zone: Some("Aw".into()),
            pest_pressure: Some(Level::Medium),
        },
        infrastructure: Default::default(),
        size_ha: Some(2.0),
    }
}

fn bench_history() -> ClimateHistory {
    let seasons = (0..20)
        .map(|i| SeasonClimate {
            year: 2005 + i / 2,
            season: if i % 2 == 0 { Season::A } else { Season::B },
            rainfall_mm: Some(850.0 + ((i * 37) % 400) as f64),
            mean_temp_c: Some(22.0 + ((i * 7) % 5) as f64 * 0.3),
        })
        .collect();
    ClimateHistory::new(seasons)
}

/// Deterministic catalog with a mix of sparse and fully described varieties
fn bench_catalog(size: usize) -> Vec<SeedProfile> {
    (0..size)
        .map(|i| {
            let crop = CROPS[i % CROPS.len()];
            let mut s = SeedProfile::new(format!("seed-{:04}", i), format!("Variety {:04}", i), crop);
            s.tolerances.drought = Some(LEVELS[i % 3]);
            s.tolerances.heat = Some(LEVELS[(i / 3) % 3]);
            s.resistances.pest = Some(LEVELS[(i / 2) % 3]);
            s.market.demand = Some(LEVELS[(i / 5) % 3]);
            s.yield_potential_t_ha = Some(crop.typical_yield_t_ha() * (0.8 + (i % 7) as f64 * 0.08));
            if i % 4 != 0 {
                let ph_min = 5.0 + (i % 5) as f64 * 0.2;
                s.soil_requirements.ph = Some(ValueRange::new(ph_min, ph_min + 1.5));
                s.climate_requirements.rainfall_mm = Some(ValueRange::new(600.0, 1300.0));
                s.climate_requirements.temperature_c = Some(ValueRange::new(17.0, 30.0));
            }
            if i % 3 == 0 {
                s.historical_performance = (0..8)
                    .map(|k| PerformanceRecord {
                        year: 2010 + k,
                        yield_t_ha: crop.typical_yield_t_ha() * (0.7 + (k % 4) as f64 * 0.1),
                        rainfall_mm: Some(800.0 + (k * 60) as f64),
                        soil_ph: Some(5.5 + (k % 3) as f64 * 0.3),
                        organic_matter_pct: None,
                        mean_temp_c: None,
                    })
                    .collect();
            }
            s
        })
        .collect()
}

fn bench_recommend(c: &mut Criterion) {
    let engine = match RecommendationEngine::new(EngineConfig::default()) {
        Ok(engine) => engine,
        Err(e) => panic!("default config rejected: {}", e),
    };
    let farm = bench_farm();
    let history = bench_history();
    let params = RequestParameters::new(Season::B, 2025).with_risk_tolerance(RiskTolerance::Aggressive);

    let mut group = c.benchmark_group("recommend");
    for size in [50usize, 500, 2000] {
        let catalog = bench_catalog(size);

        group.bench_with_input(BenchmarkId::new("parallel", size), &catalog, |b, catalog| {
            b.iter(|| engine.recommend(black_box(&farm), &history, black_box(catalog), &params))
        });
        group.bench_with_input(BenchmarkId::new("sequential", size), &catalog, |b, catalog| {
            b.iter(|| engine.recommend_sequential(black_box(&farm), &history, black_box(catalog), &params))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_recommend);
criterion_main!(benches);
