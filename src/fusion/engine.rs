use serde::{Deserialize, Serialize};

use crate::emotion::{
    clamp01, distribution::DEGENERATE_SUM, Distribution, EmotionLabel, Observation, LABEL_COUNT,
};
use crate::fusion::config::FusionConfig;

/// Per-turn fusion output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub label: EmotionLabel,
    pub confidence: f64,
    pub distribution: Distribution,
    pub text_weight: f64,
    pub face_weight: f64,
}

/// Confidence-weighted combination of the text and facial observations.
///
/// When neither source carries any weight the text source is used alone, so
/// a turn with no usable evidence fuses to the text distribution (uniform if
/// the text was unobserved as well).
pub fn fuse(text: &Observation, face: &Observation, config: &FusionConfig) -> FusionResult {
    let mut text_weight = config.text_weight * clamp01(text.quality());
    let mut face_weight = config.face_weight * clamp01(face.quality());
    if text_weight <= DEGENERATE_SUM && face_weight <= DEGENERATE_SUM {
        text_weight = 1.0;
        face_weight = 0.0;
    }

    let text_distribution = text.distribution_or_uniform();
    let face_distribution = face.distribution_or_uniform();

    let mut combined = [0.0; LABEL_COUNT];
    for (index, slot) in combined.iter_mut().enumerate() {
        *slot = text_weight * text_distribution.as_array()[index]
            + face_weight * face_distribution.as_array()[index];
    }

    let distribution = Distribution::normalize_or_uniform(combined);
    let (label, confidence) = distribution.argmax();

    FusionResult {
        label,
        confidence,
        distribution,
        text_weight,
        face_weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(probs: [f64; LABEL_COUNT], quality: f64) -> Observation {
        Observation::observed(Distribution::new(probs).unwrap(), quality)
    }

    #[test]
    fn weights_follow_source_confidence() {
        let config = FusionConfig::default();
        let text = observed([1.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.5);
        let face = observed([0.0, 0.0, 0.0, 0.0, 0.0, 1.0], 1.0);

        let result = fuse(&text, &face, &config);
        assert!((result.text_weight - 0.3).abs() < 1e-12);
        assert!((result.face_weight - 0.4).abs() < 1e-12);
        // 0.3 / 0.7 joy vs 0.4 / 0.7 sadness
        assert_eq!(result.label, EmotionLabel::Sadness);
        assert!((result.confidence - 0.4 / 0.7).abs() < 1e-9);
        assert!((result.distribution.prob(EmotionLabel::Joy) - 0.3 / 0.7).abs() < 1e-9);
    }

    #[test]
    fn zero_confidence_falls_back_to_text_only() {
        let config = FusionConfig::default();
        let text = observed([0.1, 0.1, 0.5, 0.1, 0.1, 0.1], 0.0);
        let face = observed([0.0, 0.0, 0.0, 0.0, 1.0, 0.0], 0.0);

        let result = fuse(&text, &face, &config);
        assert_eq!(result.text_weight, 1.0);
        assert_eq!(result.face_weight, 0.0);
        assert_eq!(result.label, EmotionLabel::Anger);
        assert!(result.distribution.as_array().iter().all(|p| p.is_finite()));
        assert!((result.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn nothing_observed_fuses_to_uniform() {
        let result = fuse(
            &Observation::Unobserved,
            &Observation::Unobserved,
            &FusionConfig::default(),
        );
        assert_eq!(result.distribution, Distribution::uniform());
        assert_eq!(result.label, EmotionLabel::Joy);
    }

    #[test]
    fn unobserved_face_does_not_dilute_text() {
        let config = FusionConfig::default();
        let text = observed([0.0, 0.0, 0.0, 0.8, 0.2, 0.0], 0.9);
        let result = fuse(&text, &Observation::Unobserved, &config);
        assert_eq!(result.face_weight, 0.0);
        assert!((result.distribution.prob(EmotionLabel::Anxiety) - 0.8).abs() < 1e-9);
    }
}
