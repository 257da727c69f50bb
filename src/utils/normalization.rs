//! Normalization Utilities
//!
//! Converts raw agronomic measurements onto the unit interval using fixed,
//! domain-bounded ranges. Farm and seed records are scaled against the SAME
//! range, so a farm's pH and a seed's pH requirement stay directly comparable
//! after normalization.
//!
//! Out-of-range inputs are clamped, never rejected. Non-finite inputs are
//! treated as missing by the caller (see [`finite`]).

use serde::{Deserialize, Serialize};

/// Neutral value substituted for any missing feature (always paired with a
/// `known = false` mask bit)
pub const NEUTRAL_VALUE: f64 = 0.5;

/// Closed physical range used to scale a raw measurement onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub lo: f64,
    pub hi: f64,
}

impl ScaleRange {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn width(&self) -> f64 {
        (self.hi - self.lo).max(f64::EPSILON)
    }

    /// Scale a raw value onto [0, 1], clamping at the bounds
    pub fn scale(&self, raw: f64) -> f64 {
        ((raw - self.lo) / self.width()).clamp(0.0, 1.0)
    }

    /// Inverse of [`ScaleRange::scale`] (for values that were not clamped)
    pub fn unscale(&self, normalized: f64) -> f64 {
        self.lo + normalized * self.width()
    }

    /// Express a raw-unit distance (e.g. a tolerance margin) in normalized units
    pub fn fraction(&self, raw_distance: f64) -> f64 {
        raw_distance / self.width()
    }
}

// ============================================================================
// Fixed scaling ranges
// ============================================================================

/// Soil pH (H2O)
pub const SOIL_PH: ScaleRange = ScaleRange::new(3.5, 9.0);

/// Soil organic matter (%)
pub const ORGANIC_MATTER_PCT: ScaleRange = ScaleRange::new(0.0, 10.0);

/// Available nitrogen (ppm)
pub const NITROGEN_PPM: ScaleRange = ScaleRange::new(0.0, 100.0);

/// Available phosphorus (ppm)
pub const PHOSPHORUS_PPM: ScaleRange = ScaleRange::new(0.0, 80.0);

/// Exchangeable potassium (ppm)
pub const POTASSIUM_PPM: ScaleRange = ScaleRange::new(0.0, 400.0);

/// Seasonal rainfall (mm)
pub const SEASONAL_RAINFALL_MM: ScaleRange = ScaleRange::new(0.0, 2500.0);

/// Air temperature (°C), used for mean and maximum temperature
pub const TEMPERATURE_C: ScaleRange = ScaleRange::new(0.0, 40.0);

/// Altitude above sea level (m)
pub const ALTITUDE_M: ScaleRange = ScaleRange::new(0.0, 3000.0);

/// Grain/tuber yield (t/ha)
pub const YIELD_T_HA: ScaleRange = ScaleRange::new(0.0, 20.0);

/// Days from planting to maturity
pub const MATURITY_DAYS: ScaleRange = ScaleRange::new(0.0, 365.0);

/// Coefficient of variation of recent seasonal rainfall around the long-term mean
pub const RAINFALL_CV: ScaleRange = ScaleRange::new(0.0, 0.6);

/// RMS deviation of recent seasonal temperature from the long-term mean (°C)
pub const TEMPERATURE_DEVIATION_C: ScaleRange = ScaleRange::new(0.0, 3.0);

/// Recent rainfall shortfall below the long-term median (fraction; 50% → 1.0)
pub const RAINFALL_DEFICIT: ScaleRange = ScaleRange::new(0.0, 0.5);

/// Filter out NaN and infinities so they are treated as missing data
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Clamp a score into [0, 1]; NaN collapses to the neutral value
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        NEUTRAL_VALUE
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scale_clamps_out_of_range() {
        assert_eq!(SOIL_PH.scale(2.0), 0.0);
        assert_eq!(SOIL_PH.scale(11.0), 1.0);
        assert_relative_eq!(SOIL_PH.scale(6.25), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_unscale_recovers_in_range_value() {
        let v = SEASONAL_RAINFALL_MM.scale(875.0);
        assert_relative_eq!(SEASONAL_RAINFALL_MM.unscale(v), 875.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fraction_of_ph_margin() {
        // 1.5 pH units over a 5.5-unit scale
        assert_relative_eq!(SOIL_PH.fraction(1.5), 1.5 / 5.5, epsilon = 1e-12);
    }

    #[test]
    fn test_finite_drops_nan() {
        assert_eq!(finite(Some(f64::NAN)), None);
        assert_eq!(finite(Some(f64::INFINITY)), None);
        assert_eq!(finite(Some(3.0)), Some(3.0));
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(f64::NAN), NEUTRAL_VALUE);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
    }
}
