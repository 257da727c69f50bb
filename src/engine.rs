//! Recommendation engine
//!
//! Stateless pipeline for one request:
//!
//! 1. Validate the farm (missing location is fatal)
//! 2. Select candidates: availability, then crop filter
//! 3. Score every candidate in parallel (see [`crate::scorer`])
//! 4. Rank, filter and truncate (see [`crate::ranking`])
//! 5. Attach planting guidance and reasoning
//!
//! The same inputs and configuration always yield the same output.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{EngineError, RequiredField, Result, Subject};
use crate::explanation::planting;
use crate::explanation::{ReasoningContext, ReasoningGenerator};
use crate::features::validate_farm;
use crate::profiles::{ClimateHistory, FarmProfile, RequestParameters, SeedProfile};
use crate::ranking::{rank, RankedCandidate};
use crate::recommendation::{
    recommendation_id, Exclusion, ExclusionReason, NoCandidatesReason, Recommendation,
    RecommendationSet, RecommendationStatus, SeedReference,
};
use crate::scorer::CatalogScorer;

/// Self-contained request: everything the engine needs in one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub farm: FarmProfile,
    #[serde(default)]
    pub climate_history: ClimateHistory,
    pub catalog: Vec<SeedProfile>,
    pub params: RequestParameters,
}

/// Holds a validated configuration; cheap to share across threads
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn recommend(
        &self,
        farm: &FarmProfile,
        history: &ClimateHistory,
        catalog: &[SeedProfile],
        params: &RequestParameters,
    ) -> Result<RecommendationSet> {
        run(farm, history, catalog, params, &self.config, true)
    }

    /// Same result as [`RecommendationEngine::recommend`] on a single thread
    pub fn recommend_sequential(
        &self,
        farm: &FarmProfile,
        history: &ClimateHistory,
        catalog: &[SeedProfile],
        params: &RequestParameters,
    ) -> Result<RecommendationSet> {
        run(farm, history, catalog, params, &self.config, false)
    }

    pub fn handle(&self, request: &RecommendationRequest) -> Result<RecommendationSet> {
        self.recommend(&request.farm, &request.climate_history, &request.catalog, &request.params)
    }
}

/// Run one request with an explicit configuration
pub fn recommend(
    farm: &FarmProfile,
    history: &ClimateHistory,
    catalog: &[SeedProfile],
    params: &RequestParameters,
    config: &EngineConfig,
) -> Result<RecommendationSet> {
    run(farm, history, catalog, params, config, true)
}

fn run(
    farm: &FarmProfile,
    history: &ClimateHistory,
    catalog: &[SeedProfile],
    params: &RequestParameters,
    config: &EngineConfig,
    parallel: bool,
) -> Result<RecommendationSet> {
    let start = Instant::now();
    validate_farm(farm)?;

    let mut excluded = Vec::new();
    let selected = match select_candidates(catalog, params, &mut excluded)? {
        Ok(selected) => selected,
        Err(reason) => {
            info!(farm = %farm.id, reason = %reason.display_text(), "no candidates");
            return Ok(RecommendationSet::no_candidates(&farm.id, params.season, params.year, reason, excluded));
        }
    };

    let scorer = CatalogScorer::new(farm, history, params, config);
    let candidates = if parallel {
        scorer.score_all_parallel(&selected)?
    } else {
        scorer.score_all(&selected)?
    };
    let scored = candidates.len();

    let outcome = rank(candidates, params, config);
    excluded.extend(outcome.excluded);

    if let Some(reason) = outcome.no_candidates {
        info!(farm = %farm.id, reason = %reason.display_text(), "no candidates after filtering");
        return Ok(RecommendationSet::no_candidates(&farm.id, params.season, params.year, reason, excluded));
    }

    let recommendations: Vec<Recommendation> = outcome
        .ranked
        .iter()
        .enumerate()
        .map(|(i, ranked)| build_recommendation(farm, params, config, i + 1, ranked))
        .collect();

    info!(
        farm = %farm.id,
        catalog = catalog.len(),
        scored,
        returned = recommendations.len(),
        excluded = excluded.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "recommendations generated"
    );

    Ok(RecommendationSet {
        farm_id: farm.id.clone(),
        season: params.season,
        year: params.year,
        status: RecommendationStatus::Ranked,
        recommendations,
        excluded,
    })
}

/// Candidate seeds in catalog order, or the reason there are none.
/// A seed missing its crop type is fatal; unavailable seeds are skipped first.
fn select_candidates<'a>(
    catalog: &'a [SeedProfile],
    params: &RequestParameters,
    excluded: &mut Vec<Exclusion>,
) -> Result<std::result::Result<Vec<&'a SeedProfile>, NoCandidatesReason>> {
    if catalog.is_empty() {
        return Ok(Err(NoCandidatesReason::EmptyCatalog));
    }

    let mut any_available = false;
    let mut selected = Vec::with_capacity(catalog.len());
    for seed in catalog {
        if !seed.is_available {
            excluded.push(Exclusion { seed_id: seed.id.clone(), reason: ExclusionReason::Unavailable });
            continue;
        }
        any_available = true;

        let crop_type = seed
            .crop_type
            .ok_or_else(|| EngineError::incomplete(Subject::Seed(seed.id.clone()), RequiredField::CropType))?;

        match params.crop_type {
            Some(wanted) if wanted != crop_type => {
                excluded.push(Exclusion {
                    seed_id: seed.id.clone(),
                    reason: ExclusionReason::CropTypeMismatch { crop_type },
                });
            }
            _ => selected.push(seed),
        }
    }

    debug!(selected = selected.len(), excluded = excluded.len(), "candidate selection");
    if !any_available {
        return Ok(Err(NoCandidatesReason::NoAvailableSeeds));
    }
    if selected.is_empty() {
        // only reachable with a crop filter
        if let Some(crop) = params.crop_type {
            return Ok(Err(NoCandidatesReason::NoCropMatch(crop)));
        }
    }
    Ok(Ok(selected))
}

fn build_recommendation(
    farm: &FarmProfile,
    params: &RequestParameters,
    config: &EngineConfig,
    rank: usize,
    ranked: &RankedCandidate,
) -> Recommendation {
    let c = &ranked.candidate;
    let seed = c.seed;

    let reasoning = ReasoningGenerator::generate(&ReasoningContext {
        candidate: c,
        composite: ranked.composite,
        params,
        estimated_cost_per_ha: ranked.estimated_cost_per_ha,
        exceeds_risk_tolerance: ranked.exceeds_risk_tolerance,
        config,
    });

    let low_confidence = c.yield_estimate.low_confidence
        || c.breakdown.confidence_level < config.low_confidence_threshold;

    Recommendation {
        id: recommendation_id(&farm.id, params.season, params.year, &seed.id),
        farm_id: farm.id.clone(),
        seed: SeedReference {
            id: seed.id.clone(),
            variety_name: seed.variety_name.clone(),
            crop_type: c.crop_type,
        },
        rank,
        compatibility_score: ranked.composite,
        scores: c.breakdown.clone(),
        predicted_yield: c.yield_estimate.clone(),
        risk_level: c.risk.level,
        risk_factors: c.risk.risk_factors.clone(),
        reasoning,
        planting: planting::plan(farm, seed, params),
        exceeds_risk_tolerance: ranked.exceeds_risk_tolerance,
        low_confidence,
        warnings: c.warnings.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{CropType, GeoLocation, Season};

    fn farm() -> FarmProfile {
        FarmProfile {
            id: "f1".into(),
            name: String::new(),
            location: Some(GeoLocation { latitude: 1.3, longitude: 32.4 }),
            soil: Default::default(),
            climate: Default::default(),
            infrastructure: Default::default(),
            size_ha: None,
        }
    }

    #[test]
    fn test_select_skips_unavailable_before_crop_check() {
        let mut missing_crop = SeedProfile::new("s0", "Old stock", CropType::Maize);
        missing_crop.crop_type = None;
        missing_crop.is_available = false;
        let catalog = vec![missing_crop, SeedProfile::new("s1", "Longe 5", CropType::Maize)];

        let mut excluded = Vec::new();
        let selected = select_candidates(&catalog, &RequestParameters::new(Season::A, 2025), &mut excluded)
            .unwrap()
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(excluded[0].reason, ExclusionReason::Unavailable);
    }

    #[test]
    fn test_select_records_crop_mismatch() {
        let catalog = vec![
            SeedProfile::new("m", "Maize", CropType::Maize),
            SeedProfile::new("b", "Beans", CropType::Beans),
        ];
        let params = RequestParameters::new(Season::A, 2025).with_crop_type(CropType::Beans);
        let mut excluded = Vec::new();
        let selected = select_candidates(&catalog, &params, &mut excluded).unwrap().unwrap();
        assert_eq!(selected[0].id, "b");
        assert_eq!(excluded[0].reason, ExclusionReason::CropTypeMismatch { crop_type: CropType::Maize });
    }

    #[test]
    fn test_ranks_are_one_based_and_contiguous() {
        let catalog: Vec<SeedProfile> = (0..4)
            .map(|i| SeedProfile::new(format!("s{}", i), format!("Variety {}", i), CropType::Sorghum))
            .collect();
        let params = RequestParameters::new(Season::B, 2025).with_risk_tolerance(crate::profiles::RiskTolerance::Aggressive);
        let engine = RecommendationEngine::default();
        let set = engine.recommend(&farm(), &ClimateHistory::empty(), &catalog, &params).unwrap();

        let ranks: Vec<usize> = set.recommendations.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert!(set.recommendations.iter().all(|r| r.id.starts_with("f1:B-2025:")));
    }

    #[test]
    fn test_max_results_truncates() {
        let catalog: Vec<SeedProfile> = (0..6)
            .map(|i| SeedProfile::new(format!("s{}", i), format!("Variety {}", i), CropType::Beans))
            .collect();
        let mut params = RequestParameters::new(Season::A, 2025).with_risk_tolerance(crate::profiles::RiskTolerance::Aggressive);
        params.max_results = Some(2);
        let set = RecommendationEngine::default()
            .recommend(&farm(), &ClimateHistory::empty(), &catalog, &params)
            .unwrap();
        assert_eq!(set.recommendations.len(), 2);
    }
}
