use crate::emotion::{round3, Distribution, EmotionLabel, LABEL_COUNT};
use crate::models::Segment;
use crate::segmentation::algorithm::SegmentSpan;

/// Compute a finalized span's statistics.
///
/// The dominant label is the arg-max of the summed smoothed distributions.
/// Valence and arousal means average the lookup values of each turn's
/// arg-max label. All scalars are rounded to 3 decimals.
pub fn summarize_span(span: SegmentSpan, smoothed: &[Distribution], confidences: &[f64]) -> Segment {
    let turns = &smoothed[span.start..=span.end];
    let count = turns.len() as f64;

    let dominant = dominant_label(turns);

    let mean_conf = (span.start..=span.end)
        .map(|turn| confidences.get(turn).copied().unwrap_or(0.0))
        .sum::<f64>()
        / count;

    let (valence_sum, arousal_sum) = turns.iter().fold((0.0, 0.0), |(v, a), distribution| {
        let (label, _) = distribution.argmax();
        (v + label.valence(), a + label.arousal())
    });

    Segment {
        start_turn: span.start,
        end_turn: span.end,
        dominant,
        mean_conf: round3(mean_conf),
        valence_mean: round3(valence_sum / count),
        arousal_mean: round3(arousal_sum / count),
    }
}

/// Arg-max of the summed distributions.
pub fn dominant_label(turns: &[Distribution]) -> EmotionLabel {
    let mut summed = [0.0; LABEL_COUNT];
    for distribution in turns {
        for (slot, value) in summed.iter_mut().zip(distribution.as_array().iter()) {
            *slot += value;
        }
    }
    Distribution::normalize_or_uniform(summed).argmax().0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_average_over_the_span() {
        let smoothed = vec![
            Distribution::certain(EmotionLabel::Hurt),
            Distribution::new([0.0, 0.0, 0.0, 0.0, 0.45, 0.55]).unwrap(),
            Distribution::new([0.0, 0.0, 0.0, 0.0, 0.3, 0.7]).unwrap(),
            Distribution::certain(EmotionLabel::Joy),
        ];
        let confidences = [0.9, 0.55, 0.7, 0.2];

        let segment = summarize_span(SegmentSpan { start: 0, end: 2 }, &smoothed, &confidences);
        // hurt sums to 1.75, sadness to 1.25
        assert_eq!(segment.dominant, EmotionLabel::Hurt);
        assert_eq!(segment.mean_conf, 0.717);
        assert_eq!(segment.valence_mean, -1.0);
        assert_eq!(segment.arousal_mean, -1.0);
        assert_eq!((segment.start_turn, segment.end_turn), (0, 2));
    }

    #[test]
    fn mixed_valence_is_averaged() {
        let smoothed = vec![
            Distribution::certain(EmotionLabel::Joy),
            Distribution::certain(EmotionLabel::Joy),
            Distribution::certain(EmotionLabel::Anger),
        ];
        let segment = summarize_span(SegmentSpan { start: 0, end: 2 }, &smoothed, &[1.0; 3]);
        assert_eq!(segment.dominant, EmotionLabel::Joy);
        assert_eq!(segment.valence_mean, 0.333);
        // (0.3 + 0.3 + 1.0) / 3
        assert_eq!(segment.arousal_mean, 0.533);
        assert_eq!(segment.mean_conf, 1.0);
    }
}
