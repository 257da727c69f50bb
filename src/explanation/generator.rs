//! Reasoning generator
//!
//! Turns a ranked candidate's computed scores into ordered factual statements.

use crate::config::EngineConfig;
use crate::metrics::{RiskLevel, YieldMethod};
use crate::profiles::RequestParameters;
use crate::scorer::Candidate;

use super::fragments::generate_signal_fragments;
use super::types::FitLabel;

/// Everything the reasoning for one ranked candidate may refer to
pub struct ReasoningContext<'a> {
    pub candidate: &'a Candidate<'a>,
    pub composite: f64,
    pub params: &'a RequestParameters,
    pub estimated_cost_per_ha: Option<f64>,
    pub exceeds_risk_tolerance: bool,
    pub config: &'a EngineConfig,
}

/// Builds the ordered reasoning list for a recommendation
pub struct ReasoningGenerator;

impl ReasoningGenerator {
    /// Statements in a fixed order: summary, strengths, limitations, yield
    /// source, risk, data gaps, budget, target yield, tolerance flag.
    /// Every statement is derived from a computed value.
    pub fn generate(ctx: &ReasoningContext) -> Vec<String> {
        let c = ctx.candidate;
        let mut reasoning = vec![Self::generate_summary(ctx)];

        let fragment = generate_signal_fragments(&c.breakdown.signals, ctx.config.significance_threshold);
        reasoning.extend(fragment.strengths);
        reasoning.extend(fragment.limitations);

        reasoning.push(Self::generate_yield(ctx));
        reasoning.extend(Self::generate_risk(ctx));
        reasoning.extend(Self::generate_data_quality(ctx));

        if let Some(text) = Self::generate_budget(ctx) {
            reasoning.push(text);
        }
        if let Some(text) = Self::generate_target(ctx) {
            reasoning.push(text);
        }
        if ctx.exceeds_risk_tolerance {
            reasoning.push(format!(
                "Risk level {} exceeds the {} risk tolerance; shown because no candidate met it",
                c.risk.level.display_text(),
                ctx.params.risk_tolerance.display_text()
            ));
        }
        reasoning
    }

    fn generate_summary(ctx: &ReasoningContext) -> String {
        let c = ctx.candidate;
        let b = &c.breakdown;
        format!(
            "{} ({}): {} overall fit {:.2} (climate {:.2}, soil {:.2}, market {:.2})",
            c.seed.variety_name,
            c.crop_type.display_name(),
            FitLabel::from_score(ctx.composite).display_text(),
            ctx.composite,
            b.climate_score,
            b.soil_score,
            b.market_score
        )
    }

    fn generate_yield(ctx: &ReasoningContext) -> String {
        let y = &ctx.candidate.yield_estimate;
        match &y.method {
            YieldMethod::HistoricalNeighbors { records, effective_samples } => format!(
                "Expected yield {:.1} t/ha (range {:.1}-{:.1}) from {} historical trials weighted by similarity to this farm ({:.1} effective)",
                y.expected_t_ha, y.lower_t_ha, y.upper_t_ha, records, effective_samples
            ),
            YieldMethod::PotentialFallback => format!(
                "Expected yield {:.1} t/ha (range {:.1}-{:.1}) estimated from yield potential scaled by climate and soil fit; fewer than {} historical trials available",
                y.expected_t_ha, y.lower_t_ha, y.upper_t_ha, ctx.config.min_history_samples
            ),
        }
    }

    fn generate_risk(ctx: &ReasoningContext) -> Vec<String> {
        let risk = &ctx.candidate.risk;
        let mut out = Vec::with_capacity(1 + risk.risk_factors.len());
        let headline = match risk.level {
            RiskLevel::Low => "Low overall risk",
            RiskLevel::Medium => "Medium overall risk",
            RiskLevel::High => "High overall risk",
        };
        if risk.risk_factors.is_empty() {
            out.push(format!("{} ({:.2}); no individual risk stands out", headline, risk.risk_score));
        } else {
            out.push(format!(
                "{} ({:.2}) with {} notable risk factor(s)",
                headline,
                risk.risk_score,
                risk.risk_factors.len()
            ));
            for factor in &risk.risk_factors {
                out.push(format!("Risk - {}", factor.description));
            }
        }
        out
    }

    fn generate_data_quality(ctx: &ReasoningContext) -> Vec<String> {
        let b = &ctx.candidate.breakdown;
        let mut out = Vec::new();
        if !b.imputed_features.is_empty() {
            let labels: Vec<&str> = b.imputed_features.iter().map(|f| f.label()).collect();
            out.push(format!("Neutral values used for missing data: {}", labels.join(", ")));
        }
        if b.confidence_level < ctx.config.low_confidence_threshold {
            out.push(format!(
                "Low confidence ({:.2}); treat this recommendation as indicative",
                b.confidence_level
            ));
        }
        out
    }

    fn generate_budget(ctx: &ReasoningContext) -> Option<String> {
        let budget = ctx.params.effective_budget()?;
        Some(match ctx.estimated_cost_per_ha {
            Some(cost) => format!(
                "Estimated cost {:.0} per ha is within the budget of {:.0} per ha",
                cost, budget
            ),
            None => format!(
                "Cost per ha unknown; the budget of {:.0} per ha could not be checked",
                budget
            ),
        })
    }

    fn generate_target(ctx: &ReasoningContext) -> Option<String> {
        let target = ctx.params.target_yield_t_ha.filter(|t| t.is_finite())?;
        let expected = ctx.candidate.yield_estimate.expected_t_ha;
        Some(if expected >= target {
            format!("Expected yield meets the target of {:.1} t/ha", target)
        } else {
            format!(
                "Expected yield falls {:.1} t/ha short of the target of {:.1} t/ha",
                target - expected,
                target
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{
        RiskAssessment, RiskFactor, RiskKind, ScoreBreakdown, ScoreComponent, ScoreSignal, YieldEstimate,
    };
    use crate::features::Feature;
    use crate::profiles::{CropType, RiskTolerance, Season, SeedProfile};

    fn candidate(seed: &SeedProfile) -> Candidate<'_> {
        Candidate {
            seed,
            crop_type: CropType::Maize,
            breakdown: ScoreBreakdown {
                climate_score: 0.9,
                soil_score: 0.3,
                risk_score: 0.5,
                market_score: 0.6,
                confidence_level: 0.4,
                signals: vec![
                    ScoreSignal::new(ScoreComponent::Rainfall, 1.0, 0.4, false, "rainfall 950 mm within required 800-1200".into()),
                    ScoreSignal::new(ScoreComponent::SoilPh, 0.1, 0.5, false, "soil pH 4.6 below required 5.5-7.0".into()),
                ],
                imputed_features: vec![Feature::Drainage],
            },
            yield_estimate: YieldEstimate {
                expected_t_ha: 3.0,
                lower_t_ha: 2.0,
                upper_t_ha: 4.0,
                method: YieldMethod::PotentialFallback,
                confidence: 0.4,
                low_confidence: true,
            },
            risk: RiskAssessment {
                risk_score: 0.5,
                level: RiskLevel::Medium,
                risk_factors: vec![RiskFactor {
                    kind: RiskKind::SoilConstraint,
                    severity: 0.7,
                    description: "Soil pH 4.6 is below the required 5.5-7.0".into(),
                }],
                sub_risks: Vec::new(),
                imputed_features: Vec::new(),
                within_tolerance: false,
            },
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_reasoning_order_and_content() {
        let seed = SeedProfile::new("s1", "Longe 5", CropType::Maize);
        let c = candidate(&seed);
        let params = RequestParameters::new(Season::A, 2025)
            .with_budget(200.0)
            .with_target_yield(4.0)
            .with_risk_tolerance(RiskTolerance::Conservative);
        let config = EngineConfig::default();
        let ctx = ReasoningContext {
            candidate: &c,
            composite: 0.62,
            params: &params,
            estimated_cost_per_ha: None,
            exceeds_risk_tolerance: true,
            config: &config,
        };
        let r = ReasoningGenerator::generate(&ctx);

        assert!(r[0].starts_with("Longe 5 (maize): Fair overall fit 0.62"));
        assert!(r[1].starts_with("Favourable rainfall"));
        assert!(r[2].starts_with("Limiting soil pH"));
        assert!(r[3].contains("estimated from yield potential"));
        assert!(r[4].starts_with("Medium overall risk"));
        assert!(r[5].contains("Soil pH 4.6"));
        assert!(r[6].contains("drainage"));
        assert!(r[7].starts_with("Low confidence"));
        assert!(r[8].contains("could not be checked"));
        assert!(r[9].contains("1.0 t/ha short"));
        assert!(r[10].contains("conservative"));
        assert_eq!(r.len(), 11);
    }

    #[test]
    fn test_minimal_request_has_no_budget_or_target_lines() {
        let seed = SeedProfile::new("s1", "Longe 5", CropType::Maize);
        let c = candidate(&seed);
        let params = RequestParameters::new(Season::A, 2025);
        let config = EngineConfig::default();
        let ctx = ReasoningContext {
            candidate: &c,
            composite: 0.62,
            params: &params,
            estimated_cost_per_ha: Some(120.0),
            exceeds_risk_tolerance: false,
            config: &config,
        };
        let r = ReasoningGenerator::generate(&ctx);
        assert!(!r.iter().any(|s| s.contains("budget") || s.contains("target")));
    }
}
