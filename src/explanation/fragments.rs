//! Reasoning fragments built from scoring signals
//!
//! Only material signals are mentioned: those carrying at least the
//! significance threshold of their sub-score's weight. Imputed signals never
//! count as strengths or limitations; the generator reports them as data
//! gaps instead.

use crate::metrics::ScoreSignal;

use super::types::ReasoningFragment;

/// Component fit at or above which a signal is a strength
pub const STRENGTH_THRESHOLD: f64 = 0.75;

/// Component fit at or below which a signal is a limitation
pub const LIMITATION_THRESHOLD: f64 = 0.40;

/// Generate the fragment for a single signal
pub fn generate_signal_fragment(signal: &ScoreSignal, significance_threshold: f64) -> ReasoningFragment {
    if signal.imputed || signal.weight < significance_threshold {
        return ReasoningFragment::empty();
    }

    if signal.score >= STRENGTH_THRESHOLD {
        ReasoningFragment::with_strength(format!(
            "Favourable {}: {}",
            signal.component.display_text(),
            signal.detail
        ))
    } else if signal.score <= LIMITATION_THRESHOLD {
        ReasoningFragment::with_limitation(format!(
            "Limiting {}: {}",
            signal.component.display_text(),
            signal.detail
        ))
    } else {
        ReasoningFragment::empty()
    }
}

/// Fragments for every signal, in signal order
pub fn generate_signal_fragments(signals: &[ScoreSignal], significance_threshold: f64) -> ReasoningFragment {
    let mut fragment = ReasoningFragment::empty();
    for signal in signals {
        fragment.merge(generate_signal_fragment(signal, significance_threshold));
    }
    fragment
}
