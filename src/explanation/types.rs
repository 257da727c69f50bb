use serde::{Deserialize, Serialize};

/// Qualitative band for a score on [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitLabel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl FitLabel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.85 => FitLabel::Excellent,
            s if s >= 0.70 => FitLabel::Good,
            s if s >= 0.50 => FitLabel::Fair,
            _ => FitLabel::Poor,
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            FitLabel::Excellent => "Excellent",
            FitLabel::Good => "Good",
            FitLabel::Fair => "Fair",
            FitLabel::Poor => "Poor",
        }
    }
}

/// Statements contributed by one group of signals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReasoningFragment {
    pub strengths: Vec<String>,
    pub limitations: Vec<String>,
}

impl ReasoningFragment {
    /// Create an empty fragment
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a fragment with only a strength
    pub fn with_strength(text: String) -> Self {
        Self { strengths: vec![text], limitations: Vec::new() }
    }

    /// Create a fragment with only a limitation
    pub fn with_limitation(text: String) -> Self {
        Self { strengths: Vec::new(), limitations: vec![text] }
    }

    pub fn merge(&mut self, other: ReasoningFragment) {
        self.strengths.extend(other.strengths);
        self.limitations.extend(other.limitations);
    }

    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty() && self.limitations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_label_bands() {
        assert_eq!(FitLabel::from_score(0.9), FitLabel::Excellent);
        assert_eq!(FitLabel::from_score(0.7), FitLabel::Good);
        assert_eq!(FitLabel::from_score(0.55), FitLabel::Fair);
        assert_eq!(FitLabel::from_score(0.2), FitLabel::Poor);
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut f = ReasoningFragment::with_strength("a".into());
        f.merge(ReasoningFragment::with_limitation("b".into()));
        f.merge(ReasoningFragment::with_strength("c".into()));
        assert_eq!(f.strengths, vec!["a", "c"]);
        assert_eq!(f.limitations, vec!["b"]);
    }
}
