//! Catalog Scorer - per-request coordinator
//!
//! Normalizes each candidate seed against the farm and runs the
//! compatibility scorer, yield predictor and risk assessor on it. Includes
//! both sequential and parallel (Rayon) implementations; they produce
//! identical results in identical order.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::features::{Feature, FeatureVector, HistorySummary, Normalizer};
use crate::metrics::{
    self, CompatibilityResult, RiskAssessment, ScoreBreakdown, SubScore, YieldEstimate,
};
use crate::profiles::{ClimateHistory, CropType, FarmProfile, RequestParameters, SeedProfile};
use crate::recommendation::ImputedDataWarning;

/// Everything computed for one (farm, seed) pair before ranking
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub seed: &'a SeedProfile,
    pub crop_type: CropType,
    pub breakdown: ScoreBreakdown,
    pub yield_estimate: YieldEstimate,
    pub risk: RiskAssessment,
    pub warnings: Vec<ImputedDataWarning>,
}

/// Scores catalog seeds for one farm and one request
pub struct CatalogScorer<'a> {
    farm: &'a FarmProfile,
    params: &'a RequestParameters,
    config: &'a EngineConfig,
    normalizer: Normalizer,
    summary: HistorySummary,
}

impl<'a> CatalogScorer<'a> {
    /// Summarizes the climate history once for the whole catalog
    pub fn new(
        farm: &'a FarmProfile,
        history: &ClimateHistory,
        params: &'a RequestParameters,
        config: &'a EngineConfig,
    ) -> Self {
        let normalizer = Normalizer::new(config.history_window_seasons);
        let summary = normalizer.summarize(history);
        Self { farm, params, config, normalizer, summary }
    }

    pub fn history_summary(&self) -> &HistorySummary {
        &self.summary
    }

    /// Score one seed sequentially
    pub fn score_candidate(&self, seed: &'a SeedProfile) -> Result<Candidate<'a>> {
        let fv = self.normalizer.normalize_with_summary(self.farm, seed, &self.summary)?;

        let compat = metrics::score(&fv, self.config);
        let market = metrics::score_market(&fv, self.params.market_preference, self.config);
        let yield_estimate = metrics::predict(&fv, &seed.historical_performance, self.config);
        let risk = metrics::assess(&fv, self.params, self.config);

        Ok(self.assemble(seed, &fv, compat, market, yield_estimate, risk))
    }

    /// Score one seed, running the scorer beside the yield predictor and
    /// risk assessor
    pub fn score_candidate_parallel(&self, seed: &'a SeedProfile) -> Result<Candidate<'a>> {
        let fv = self.normalizer.normalize_with_summary(self.farm, seed, &self.summary)?;

        let ((compat, market), (yield_estimate, risk)) = rayon::join(
            || {
                (
                    metrics::score(&fv, self.config),
                    metrics::score_market(&fv, self.params.market_preference, self.config),
                )
            },
            || {
                rayon::join(
                    || metrics::predict(&fv, &seed.historical_performance, self.config),
                    || metrics::assess(&fv, self.params, self.config),
                )
            },
        );

        Ok(self.assemble(seed, &fv, compat, market, yield_estimate, risk))
    }

    /// Score seeds one after another (debugging and equivalence checks)
    pub fn score_all(&self, seeds: &[&'a SeedProfile]) -> Result<Vec<Candidate<'a>>> {
        seeds.iter().map(|seed| self.score_candidate(*seed)).collect()
    }

    /// Score seeds across CPU cores; output order matches input order
    pub fn score_all_parallel(&self, seeds: &[&'a SeedProfile]) -> Result<Vec<Candidate<'a>>> {
        seeds
            .par_iter()
            .map(|seed| self.score_candidate_parallel(*seed))
            .collect()
    }

    fn assemble(
        &self,
        seed: &'a SeedProfile,
        fv: &FeatureVector,
        compat: CompatibilityResult,
        market: SubScore,
        yield_estimate: YieldEstimate,
        risk: RiskAssessment,
    ) -> Candidate<'a> {
        let mut imputed: Vec<Feature> = compat
            .climate
            .imputed_features
            .iter()
            .chain(&compat.soil.imputed_features)
            .chain(&market.imputed_features)
            .chain(&risk.imputed_features)
            .copied()
            .collect();
        imputed.sort();
        imputed.dedup();

        let mut signals = compat.climate.signals;
        signals.extend(compat.soil.signals);
        signals.extend(market.signals);

        let warnings: Vec<ImputedDataWarning> = imputed
            .iter()
            .map(|f| ImputedDataWarning::new(&self.farm.id, &seed.id, *f))
            .collect();

        let breakdown = ScoreBreakdown {
            climate_score: compat.climate.score,
            soil_score: compat.soil.score,
            risk_score: risk.risk_score,
            market_score: market.score,
            confidence_level: yield_estimate.confidence,
            signals,
            imputed_features: imputed,
        };

        debug!(
            seed = %seed.id,
            climate = breakdown.climate_score,
            soil = breakdown.soil_score,
            risk = breakdown.risk_score,
            market = breakdown.market_score,
            confidence = breakdown.confidence_level,
            "scored candidate"
        );
        if breakdown.confidence_level < self.config.low_confidence_threshold {
            warn!(
                seed = %seed.id,
                imputed = warnings.len(),
                confidence = breakdown.confidence_level,
                "candidate scored mostly from imputed data"
            );
        }

        Candidate { seed, crop_type: fv.crop_type, breakdown, yield_estimate, risk, warnings }
    }
}
