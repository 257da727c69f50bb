//! Climate Tier Classification
//!
//! 6-tier Köppen grouping shared by farms (from their Köppen zone) and seeds
//! (the tiers a variety is bred or proven for). Both sides are one-hot
//! encoded in the feature vector; matching is exact, adjacent or none.

use serde::{Deserialize, Serialize};

/// Climate tier groupings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateTier {
    /// Af, Am, Aw
    Tropical,

    /// Csa, Csb, Csc
    Mediterranean,

    /// Cfa, Cfb, Cfc, Cwa, Cwb, Cwc (East African highlands land here)
    HumidTemperate,

    /// Dfa, Dfb, Dsa, Dsb, Dwa, Dwb
    Continental,

    /// Dfc, Dfd, Dwc, Dwd, ET, EF
    BorealPolar,

    /// BWh, BWk, BSh, BSk
    Arid,
}

impl ClimateTier {
    pub const ALL: [ClimateTier; 6] = [
        ClimateTier::Tropical,
        ClimateTier::Mediterranean,
        ClimateTier::HumidTemperate,
        ClimateTier::Continental,
        ClimateTier::BorealPolar,
        ClimateTier::Arid,
    ];

    /// Convert a Köppen zone code to a tier. Unrecognized codes yield `None`.
    pub fn from_koppen(zone: &str) -> Option<Self> {
        let mut chars = zone.trim().chars();
        let group = chars.next()?;
        let second = chars.next();
        let third = chars.next();

        match group {
            'A' => Some(ClimateTier::Tropical),
            'B' => Some(ClimateTier::Arid),
            'C' if second == Some('s') => Some(ClimateTier::Mediterranean),
            'C' => Some(ClimateTier::HumidTemperate),
            'D' if matches!(third, Some('c') | Some('d')) => Some(ClimateTier::BorealPolar),
            'D' => Some(ClimateTier::Continental),
            'E' => Some(ClimateTier::BorealPolar),
            _ => None,
        }
    }

    /// Position within the one-hot block
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ClimateTier::Tropical => "Tropical",
            ClimateTier::Mediterranean => "Mediterranean",
            ClimateTier::HumidTemperate => "Humid Temperate",
            ClimateTier::Continental => "Continental",
            ClimateTier::BorealPolar => "Boreal/Polar",
            ClimateTier::Arid => "Arid",
        }
    }

    /// Related tiers a variety may adapt to with some management
    pub fn adjacent_tiers(&self) -> &'static [ClimateTier] {
        match self {
            ClimateTier::Tropical => &[],
            ClimateTier::Mediterranean => &[ClimateTier::HumidTemperate, ClimateTier::Arid],
            ClimateTier::HumidTemperate => &[ClimateTier::Mediterranean, ClimateTier::Continental],
            ClimateTier::Continental => &[ClimateTier::HumidTemperate, ClimateTier::BorealPolar],
            ClimateTier::BorealPolar => &[ClimateTier::Continental],
            ClimateTier::Arid => &[ClimateTier::Mediterranean],
        }
    }

    pub fn is_adjacent_to(&self, other: &ClimateTier) -> bool {
        self.adjacent_tiers().contains(other)
    }
}

/// Result of matching a farm tier against a seed's tier list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierMatch {
    Exact,
    Adjacent,
    None,
}

impl TierMatch {
    pub fn score(&self) -> f64 {
        match self {
            TierMatch::Exact => 1.0,
            TierMatch::Adjacent => 0.6,
            TierMatch::None => 0.2,
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            TierMatch::Exact => "variety is adapted to the farm's climate zone",
            TierMatch::Adjacent => "variety is adapted to a related climate zone",
            TierMatch::None => "variety is not adapted to the farm's climate zone",
        }
    }
}

pub fn match_tiers(farm_tier: ClimateTier, seed_tiers: &[ClimateTier]) -> TierMatch {
    if seed_tiers.contains(&farm_tier) {
        TierMatch::Exact
    } else if seed_tiers.iter().any(|t| farm_tier.is_adjacent_to(t)) {
        TierMatch::Adjacent
    } else {
        TierMatch::None
    }
}
