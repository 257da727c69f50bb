//! Ranker
//!
//! Composite scoring, hard filters and a total deterministic order.
//!
//! Filters run in order: budget, then risk tolerance. When the risk filter
//! would empty a non-empty set, the single lowest-risk candidate survives,
//! flagged `exceeds_risk_tolerance`.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::config::{CompositeWeights, EngineConfig};
use crate::explanation::planting::estimated_cost_per_ha;
use crate::metrics::ScoreBreakdown;
use crate::profiles::RequestParameters;
use crate::recommendation::{Exclusion, ExclusionReason, NoCandidatesReason};
use crate::scorer::Candidate;

/// A candidate that passed (or was retained through) the hard filters
#[derive(Debug, Clone)]
pub struct RankedCandidate<'a> {
    pub candidate: Candidate<'a>,
    pub composite: f64,
    pub estimated_cost_per_ha: Option<f64>,
    pub exceeds_risk_tolerance: bool,
}

#[derive(Debug, Clone)]
pub struct RankingOutcome<'a> {
    /// Best first, truncated to the result limit
    pub ranked: Vec<RankedCandidate<'a>>,
    pub excluded: Vec<Exclusion>,
    /// Set when the filters removed every candidate
    pub no_candidates: Option<NoCandidatesReason>,
}

/// Weighted mean of climate, soil, `1 - risk` and market
pub fn composite_score(breakdown: &ScoreBreakdown, weights: &CompositeWeights) -> f64 {
    let w = weights.normalized();
    let value = w.climate * breakdown.climate_score
        + w.soil * breakdown.soil_score
        + w.risk * (1.0 - breakdown.risk_score)
        + w.market * breakdown.market_score;
    value.clamp(0.0, 1.0)
}

/// Effective composite weights for a request
pub fn request_weights(params: &RequestParameters, config: &EngineConfig) -> CompositeWeights {
    config.composite_weights.resolve(
        params.weights.as_ref(),
        params.risk_tolerance,
        config.weight_bounds,
        &config.tolerance_multipliers,
    )
}

/// Total order: composite desc, confidence desc, predicted yield desc,
/// variety name asc, seed id asc
pub fn compare_ranked(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.composite
        .total_cmp(&a.composite)
        .then_with(|| {
            b.candidate
                .breakdown
                .confidence_level
                .total_cmp(&a.candidate.breakdown.confidence_level)
        })
        .then_with(|| {
            b.candidate
                .yield_estimate
                .expected_t_ha
                .total_cmp(&a.candidate.yield_estimate.expected_t_ha)
        })
        .then_with(|| a.candidate.seed.variety_name.cmp(&b.candidate.seed.variety_name))
        .then_with(|| a.candidate.seed.id.cmp(&b.candidate.seed.id))
}

pub fn rank<'a>(candidates: Vec<Candidate<'a>>, params: &RequestParameters, config: &EngineConfig) -> RankingOutcome<'a> {
    let weights = request_weights(params, config);
    let mut excluded = Vec::new();

    // Budget filter
    let budget = params.effective_budget();
    if let (None, Some(raw)) = (budget, params.budget_per_hectare) {
        warn!(budget = raw, "unusable budget per hectare; ranking without a budget");
    }
    let had_candidates = !candidates.is_empty();
    let mut within_budget: Vec<RankedCandidate<'a>> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let cost = estimated_cost_per_ha(candidate.seed);
        if let (Some(budget), Some(cost)) = (budget, cost) {
            if cost > budget {
                excluded.push(Exclusion {
                    seed_id: candidate.seed.id.clone(),
                    reason: ExclusionReason::OverBudget { estimated_cost_per_ha: cost, budget_per_ha: budget },
                });
                continue;
            }
        }
        let composite = composite_score(&candidate.breakdown, &weights);
        within_budget.push(RankedCandidate {
            candidate,
            composite,
            estimated_cost_per_ha: cost,
            exceeds_risk_tolerance: false,
        });
    }

    if had_candidates && within_budget.is_empty() {
        debug!(excluded = excluded.len(), "every candidate over budget");
        return RankingOutcome { ranked: Vec::new(), excluded, no_candidates: Some(NoCandidatesReason::OverBudget) };
    }

    // Risk tolerance filter
    let (mut admitted, rejected): (Vec<_>, Vec<_>) = within_budget
        .into_iter()
        .partition(|r| r.candidate.risk.within_tolerance);

    let rejected = if admitted.is_empty() && !rejected.is_empty() {
        let (fallback, rest) = retain_lowest_risk(rejected);
        admitted.push(fallback);
        rest
    } else {
        rejected
    };
    for r in rejected {
        excluded.push(Exclusion {
            seed_id: r.candidate.seed.id.clone(),
            reason: ExclusionReason::ExceedsRiskTolerance { level: r.candidate.risk.level },
        });
    }

    admitted.sort_by(compare_ranked);
    let limit = params
        .max_results
        .filter(|n| *n > 0)
        .unwrap_or(config.max_results);
    admitted.truncate(limit);

    RankingOutcome { ranked: admitted, excluded, no_candidates: None }
}

/// Split off the lowest-risk candidate (ties broken by rank order) and flag it
fn retain_lowest_risk<'a>(mut rejected: Vec<RankedCandidate<'a>>) -> (RankedCandidate<'a>, Vec<RankedCandidate<'a>>) {
    let mut best = 0;
    for i in 1..rejected.len() {
        let ord = rejected[i]
            .candidate
            .risk
            .risk_score
            .total_cmp(&rejected[best].candidate.risk.risk_score)
            .then_with(|| compare_ranked(&rejected[i], &rejected[best]));
        if ord == Ordering::Less {
            best = i;
        }
    }
    let mut kept = rejected.remove(best);
    kept.exceeds_risk_tolerance = true;
    (kept, rejected)
}
