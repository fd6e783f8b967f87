use crate::emotion::{round3, EmotionLabel};
use crate::models::{FlowMetrics, FlowPattern};

/// Minimum valence change between the first and last turn that counts as a
/// rising or falling trajectory.
const TREND_DELTA: f64 = 0.2;

/// Flip count at or above which an otherwise flat trajectory is a reversal.
const REVERSAL_FLIPS: usize = 3;

/// Flip count up to which a negative-to-positive trajectory is a U-shape.
const U_SHAPE_MAX_FLIPS: usize = 2;

/// Conversation-level metrics over the smoothed per-turn arg-max labels.
pub fn compute_metrics(labels: &[EmotionLabel]) -> FlowMetrics {
    let (Some(first), Some(last)) = (labels.first(), labels.last()) else {
        return FlowMetrics::empty();
    };

    let valences: Vec<f64> = labels.iter().map(EmotionLabel::valence).collect();
    let flips = count_flips(labels);

    FlowMetrics {
        flips,
        positive_ratio: round3(positive_ratio(&valences)),
        longest_negative_run: longest_negative_run(&valences),
        peak_arousal_turn: peak_arousal_turn(labels),
        pattern: classify_pattern(first.valence(), last.valence(), flips),
    }
}

/// Turns whose label differs from the previous turn's.
pub fn count_flips(labels: &[EmotionLabel]) -> usize {
    labels.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

pub fn positive_ratio(valences: &[f64]) -> f64 {
    if valences.is_empty() {
        return 0.0;
    }
    valences.iter().filter(|&&v| v > 0.0).count() as f64 / valences.len() as f64
}

pub fn longest_negative_run(valences: &[f64]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for &valence in valences {
        if valence < 0.0 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

/// Index of the highest-arousal turn; the earliest wins on ties.
pub fn peak_arousal_turn(labels: &[EmotionLabel]) -> Option<usize> {
    let mut peak: Option<(usize, f64)> = None;
    for (turn, label) in labels.iter().enumerate() {
        let arousal = label.arousal();
        match peak {
            Some((_, best)) if arousal <= best => {}
            _ => peak = Some((turn, arousal)),
        }
    }
    peak.map(|(turn, _)| turn)
}

/// Rule-based trajectory classification. Rules are checked in order and the
/// first match wins.
pub fn classify_pattern(first_valence: f64, last_valence: f64, flips: usize) -> FlowPattern {
    let delta = last_valence - first_valence;

    if first_valence < 0.0 && last_valence > 0.0 && flips <= U_SHAPE_MAX_FLIPS {
        FlowPattern::UShape
    } else if delta >= TREND_DELTA {
        FlowPattern::Rising
    } else if delta <= -TREND_DELTA {
        FlowPattern::Falling
    } else if flips >= REVERSAL_FLIPS {
        FlowPattern::SharpReversal
    } else {
        FlowPattern::Stable
    }
}
