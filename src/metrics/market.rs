//! Market potential sub-score
//!
//! `0.4 + 0.5 × demand`, plus a small bonus when the requested market
//! channel suits the variety's demand (export wants high demand; local and
//! regional sales are served by medium or better). Ranges 0.475 to 0.875.

use smallvec::SmallVec;

use crate::config::EngineConfig;
use crate::features::{Feature, FeatureVector};
use crate::profiles::{Level, MarketPreference};

use super::{ScoreComponent, ScoreSignal, SignalBuffer, SubScore};

const BASE: f64 = 0.4;
const DEMAND_SPAN: f64 = 0.5;
const PREFERENCE_BONUS: f64 = 0.05;

pub fn score_market(
    fv: &FeatureVector,
    preference: Option<MarketPreference>,
    config: &EngineConfig,
) -> SubScore {
    let demand_known = fv.is_known(Feature::MarketDemand);
    let demand = fv.value(Feature::MarketDemand);
    let level = Level::from_ordinal(demand);

    let matches_channel = demand_known
        && match preference {
            Some(MarketPreference::Export) => level == Level::High,
            Some(MarketPreference::Local) | Some(MarketPreference::Regional) => level >= Level::Medium,
            None => false,
        };

    let mut score = BASE + DEMAND_SPAN * demand;
    if matches_channel {
        score += PREFERENCE_BONUS;
    }

    let detail = if demand_known {
        let mut text = format!("{} market demand", level.display_text());
        if matches_channel {
            text.push_str(" suits the preferred market channel");
        }
        text
    } else {
        "market demand unknown (imputed)".to_string()
    };

    let mut signals: SignalBuffer = SmallVec::new();
    signals.push(ScoreSignal::new(ScoreComponent::MarketDemand, score, 1.0, !demand_known, detail));
    let imputed = if demand_known { Vec::new() } else { vec![Feature::MarketDemand] };
    SubScore::combine(signals, imputed, config.imputed_score_cap)
}
