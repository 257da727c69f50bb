//! Planting guidance attached to each recommendation
//!
//! Window, expected harvest, seed rate, fertilizer hints and an estimated
//! cost per hectare. All of it is derived from the farm record, the seed
//! record and the request; nothing here feeds back into scoring except the
//! cost estimate, which the budget filter reads.

use chrono::{Days, NaiveDate};

use crate::features::Feature;
use crate::metrics::compatibility::nutrient_threshold_ppm;
use crate::profiles::{FarmProfile, Level, RequestParameters, Season, SeedProfile};
use crate::recommendation::{PlantingRecommendation, PlantingWindow};

/// Days either side of an explicit planting date
const EXPLICIT_DATE_SLACK_DAYS: u64 = 7;

/// Default sowing window for a season, as (month, day) pairs
fn season_window(season: Season) -> ((u32, u32), (u32, u32)) {
    match season {
        Season::A => ((3, 15), (4, 15)),
        Season::B => ((9, 1), (10, 15)),
        Season::Perennial => ((3, 15), (4, 30)),
    }
}

pub fn planting_window(params: &RequestParameters) -> Option<PlantingWindow> {
    if let Some(date) = params.planting_date {
        let slack = Days::new(EXPLICIT_DATE_SLACK_DAYS);
        return Some(PlantingWindow {
            start: date.checked_sub_days(slack)?,
            end: date.checked_add_days(slack)?,
        });
    }

    let ((sm, sd), (em, ed)) = season_window(params.season);
    Some(PlantingWindow {
        start: NaiveDate::from_ymd_opt(params.year, sm, sd)?,
        end: NaiveDate::from_ymd_opt(params.year, em, ed)?,
    })
}

pub fn expected_harvest(window: Option<PlantingWindow>, seed: &SeedProfile) -> Option<NaiveDate> {
    let days = seed.maturity_days?;
    window?.start.checked_add_days(Days::new(u64::from(days)))
}

/// Seed cost at the effective seed rate plus stated input cost.
/// `None` when either the seed price or the seed rate is unknown.
pub fn estimated_cost_per_ha(seed: &SeedProfile) -> Option<f64> {
    let price = seed.seed_price_per_kg.filter(|p| p.is_finite() && *p >= 0.0)?;
    let rate = seed.effective_seed_rate_kg_ha()?;
    let inputs = seed
        .input_cost_per_ha
        .filter(|c| c.is_finite() && *c >= 0.0)
        .unwrap_or(0.0);
    Some(rate * price + inputs)
}

/// Soil amendments suggested by comparing the farm's soil to the variety's
/// stated needs
pub fn fertilizer_hints(farm: &FarmProfile, seed: &SeedProfile) -> Vec<String> {
    let soil = &farm.soil;
    if soil.is_empty() {
        return vec!["Soil test recommended before planting; no soil data on record".to_string()];
    }

    let req = &seed.soil_requirements;
    let mut hints = Vec::new();

    if let (Some(ph), Some(range)) = (soil.ph.filter(|v| v.is_finite()), req.ph) {
        if ph < range.min {
            hints.push(format!(
                "Apply agricultural lime to raise soil pH from {:.1} toward {:.1}",
                ph, range.min
            ));
        } else if ph > range.max {
            hints.push(format!(
                "Apply elemental sulfur or acidifying organic matter to lower soil pH from {:.1} toward {:.1}",
                ph, range.max
            ));
        }
    }

    let nutrients = [
        (Feature::Nitrogen, soil.nitrogen_ppm, req.nitrogen_demand),
        (Feature::Phosphorus, soil.phosphorus_ppm, req.phosphorus_demand),
        (Feature::Potassium, soil.potassium_ppm, req.potassium_demand),
    ];
    for (nutrient, available, demand) in nutrients {
        let (Some(available), Some(demand)) = (available.filter(|v| v.is_finite()), demand) else {
            continue;
        };
        let Some(threshold) = nutrient_threshold_ppm(nutrient, demand) else {
            continue;
        };
        if available < threshold {
            hints.push(nutrient_hint(nutrient, available, threshold, demand, seed));
        }
    }

    if let (Some(om), Some(range)) = (soil.organic_matter_pct.filter(|v| v.is_finite()), req.organic_matter_pct) {
        if om < range.min {
            hints.push(format!(
                "Incorporate compost or well-rotted manure: organic matter {:.1}% is below the required {:.1}%",
                om, range.min
            ));
        }
    }

    if hints.is_empty() {
        hints.push("Soil meets the stated requirements; apply a maintenance dressing of compost or balanced NPK".to_string());
    }
    hints
}

fn nutrient_hint(nutrient: Feature, available: f64, threshold: f64, demand: Level, seed: &SeedProfile) -> String {
    let legume = seed.crop_type.map(|c| c.is_legume()).unwrap_or(false);
    match nutrient {
        Feature::Nitrogen if legume => format!(
            "Nitrogen is low ({:.0} ppm); inoculate seed with rhizobia and apply a small starter dose",
            available
        ),
        Feature::Nitrogen => format!(
            "Top-dress nitrogen (urea or CAN): {:.0} ppm available, {} demand needs {:.0} ppm",
            available,
            demand.display_text(),
            threshold
        ),
        Feature::Phosphorus => format!(
            "Apply phosphate (DAP or TSP) at planting: {:.0} ppm available, {} demand needs {:.0} ppm",
            available,
            demand.display_text(),
            threshold
        ),
        _ => format!(
            "Apply potash (MOP): {:.0} ppm available, {} demand needs {:.0} ppm",
            available,
            demand.display_text(),
            threshold
        ),
    }
}

pub fn plan(farm: &FarmProfile, seed: &SeedProfile, params: &RequestParameters) -> PlantingRecommendation {
    let window = planting_window(params);
    PlantingRecommendation {
        window,
        expected_harvest: expected_harvest(window, seed),
        seed_rate_kg_ha: seed.effective_seed_rate_kg_ha(),
        fertilizer_hints: fertilizer_hints(farm, seed),
        estimated_cost_per_ha: estimated_cost_per_ha(seed),
    }
}
