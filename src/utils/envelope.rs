//! Range Comparator
//!
//! Compares a farm value against a seed's stated requirement range
//! `[min, max]`. Inside the range scores 1.0; outside, the score decays
//! linearly to 0 at a tolerance margin beyond the nearest boundary.

/// Where a value sits relative to a requirement range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFit {
    /// value < min
    BelowRange,
    /// min <= value <= max
    WithinRange,
    /// value > max
    AboveRange,
}

impl RangeFit {
    pub fn display_text(&self) -> &'static str {
        match self {
            RangeFit::BelowRange => "below",
            RangeFit::WithinRange => "within",
            RangeFit::AboveRange => "above",
        }
    }
}

/// Result of a range comparison with distance context
#[derive(Debug, Clone, Copy)]
pub struct RangeComparison {
    pub fit: RangeFit,

    /// Value being compared
    pub value: f64,

    /// Lower bound of the requirement
    pub min: f64,

    /// Upper bound of the requirement
    pub max: f64,

    /// Absolute distance to the nearest boundary (0 if within range)
    pub distance_from_range: f64,
}

impl RangeComparison {
    pub fn is_within_range(&self) -> bool {
        self.fit == RangeFit::WithinRange
    }

    /// Linear decay: 1.0 inside, 0.0 at `margin` beyond the boundary
    ///
    /// A non-positive margin turns the comparison into a hard pass/fail.
    pub fn score_with_margin(&self, margin: f64) -> f64 {
        if self.is_within_range() {
            return 1.0;
        }
        if margin <= 0.0 {
            return 0.0;
        }
        (1.0 - self.distance_from_range / margin).max(0.0)
    }
}

/// Compare `value` against `[min, max]`. Reversed bounds are swapped.
pub fn compare_to_range(value: f64, min: f64, max: f64) -> RangeComparison {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    let (fit, distance) = if value < min {
        (RangeFit::BelowRange, min - value)
    } else if value > max {
        (RangeFit::AboveRange, value - max)
    } else {
        (RangeFit::WithinRange, 0.0)
    };

    RangeComparison {
        fit,
        value,
        min,
        max,
        distance_from_range: distance,
    }
}
