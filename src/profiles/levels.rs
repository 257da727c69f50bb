//! Shared categorical scales
//!
//! Farm and seed records use the SAME categorical scales so that a farm's
//! exposure and a seed's tolerance land on comparable ordinals after
//! normalization.

use serde::{Deserialize, Serialize};

/// Three-step level shared by tolerances, resistances, exposures and demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// Position on the unit interval
    pub fn ordinal(self) -> f64 {
        match self {
            Level::Low => 0.15,
            Level::Medium => 0.5,
            Level::High => 0.85,
        }
    }

    /// Nearest level for a normalized ordinal
    pub fn from_ordinal(value: f64) -> Self {
        if value < 0.325 {
            Level::Low
        } else if value < 0.675 {
            Level::Medium
        } else {
            Level::High
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

/// Soil drainage class, poorest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainageClass {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl DrainageClass {
    pub const ALL: [DrainageClass; 4] = [
        DrainageClass::Poor,
        DrainageClass::Fair,
        DrainageClass::Good,
        DrainageClass::Excellent,
    ];

    /// One class expressed in normalized units
    pub const STEP: f64 = 1.0 / 3.0;

    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn ordinal(self) -> f64 {
        self.rank() as f64 * Self::STEP
    }

    pub fn from_ordinal(value: f64) -> Self {
        let idx = (value.clamp(0.0, 1.0) / Self::STEP).round() as usize;
        Self::ALL[idx.min(Self::ALL.len() - 1)]
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            DrainageClass::Poor => "poor",
            DrainageClass::Fair => "fair",
            DrainageClass::Good => "good",
            DrainageClass::Excellent => "excellent",
        }
    }
}

/// USDA soil texture classes ordered fine → coarse
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilTexture {
    Clay,
    SiltyClay,
    SandyClay,
    SiltyClayLoam,
    ClayLoam,
    SandyClayLoam,
    Silt,
    SiltLoam,
    Loam,
    SandyLoam,
    LoamySand,
    Sand,
}

impl SoilTexture {
    pub const ALL: [SoilTexture; 12] = [
        SoilTexture::Clay,
        SoilTexture::SiltyClay,
        SoilTexture::SandyClay,
        SoilTexture::SiltyClayLoam,
        SoilTexture::ClayLoam,
        SoilTexture::SandyClayLoam,
        SoilTexture::Silt,
        SoilTexture::SiltLoam,
        SoilTexture::Loam,
        SoilTexture::SandyLoam,
        SoilTexture::LoamySand,
        SoilTexture::Sand,
    ];

    /// One texture class expressed in normalized units
    pub const STEP: f64 = 1.0 / 11.0;

    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn ordinal(self) -> f64 {
        self.rank() as f64 * Self::STEP
    }

    pub fn from_ordinal(value: f64) -> Self {
        let idx = (value.clamp(0.0, 1.0) / Self::STEP).round() as usize;
        Self::ALL[idx.min(Self::ALL.len() - 1)]
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            SoilTexture::Clay => "clay",
            SoilTexture::SiltyClay => "silty clay",
            SoilTexture::SandyClay => "sandy clay",
            SoilTexture::SiltyClayLoam => "silty clay loam",
            SoilTexture::ClayLoam => "clay loam",
            SoilTexture::SandyClayLoam => "sandy clay loam",
            SoilTexture::Silt => "silt",
            SoilTexture::SiltLoam => "silt loam",
            SoilTexture::Loam => "loam",
            SoilTexture::SandyLoam => "sandy loam",
            SoilTexture::LoamySand => "loamy sand",
            SoilTexture::Sand => "sand",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_level_ordinals() {
        assert_eq!(Level::Low.ordinal(), 0.15);
        assert_eq!(Level::Medium.ordinal(), 0.5);
        assert_eq!(Level::High.ordinal(), 0.85);
    }

    #[test]
    fn test_level_from_ordinal_round_trips() {
        for level in [Level::Low, Level::Medium, Level::High] {
            assert_eq!(Level::from_ordinal(level.ordinal()), level);
        }
    }

    #[test]
    fn test_drainage_ordinals() {
        assert_eq!(DrainageClass::Poor.ordinal(), 0.0);
        assert_relative_eq!(DrainageClass::Good.ordinal(), 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(DrainageClass::Excellent.ordinal(), 1.0, epsilon = 1e-12);
        assert_eq!(DrainageClass::from_ordinal(0.6), DrainageClass::Good);
    }

    #[test]
    fn test_texture_order_fine_to_coarse() {
        assert_eq!(SoilTexture::Clay.ordinal(), 0.0);
        assert_relative_eq!(SoilTexture::Sand.ordinal(), 1.0, epsilon = 1e-12);
        assert!(SoilTexture::Loam.ordinal() > SoilTexture::ClayLoam.ordinal());
        assert_eq!(SoilTexture::from_ordinal(SoilTexture::Loam.ordinal()), SoilTexture::Loam);
    }

    #[test]
    fn test_level_serde_snake_case() {
        let json = serde_json::to_string(&Level::High).unwrap();
        assert_eq!(json, "\"high\"");
        let texture: SoilTexture = serde_json::from_str("\"sandy_clay_loam\"").unwrap();
        assert_eq!(texture, SoilTexture::SandyClayLoam);
    }
}
