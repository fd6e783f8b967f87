//! Turns raw classifier payloads into six-label distributions.

use crate::emotion::{
    clamp01, distribution::DEGENERATE_SUM, Distribution, EmotionLabel, FacialLabel, Observation,
    LABEL_COUNT,
};
use crate::fusion::config::FusionConfig;
use crate::fusion::payload::{
    parse_facial_payload, parse_text_payload, FacialEmotionPayload, TextEmotionPayload,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Build the facial observation for a turn from its stored payload.
/// Missing or malformed payloads are `Unobserved`.
pub fn facial_observation(raw: Option<&str>, config: &FusionConfig) -> Observation {
    let Some(raw) = raw else {
        return Observation::Unobserved;
    };
    match parse_facial_payload(raw) {
        Ok(payload) => facial_from_payload(&payload, config),
        Err(err) => {
            log_warn!("ignoring malformed facial payload: {err}");
            Observation::Unobserved
        }
    }
}

/// Build the text observation for a turn from its stored payload.
pub fn text_observation(raw: Option<&str>, config: &FusionConfig) -> Observation {
    let Some(raw) = raw else {
        return Observation::Unobserved;
    };
    match parse_text_payload(raw) {
        Ok(payload) => text_from_payload(&payload, config),
        Err(err) => {
            log_warn!("ignoring malformed text payload: {err}");
            Observation::Unobserved
        }
    }
}

pub fn facial_from_payload(payload: &FacialEmotionPayload, config: &FusionConfig) -> Observation {
    let mut weights = [0.0; FacialLabel::COUNT];

    let quality = if !payload.frames.is_empty() {
        let mut confidence_sum = 0.0;
        let mut contributing = 0usize;

        for frame in &payload.frames {
            let Some(label) = FacialLabel::parse(&frame.label) else {
                continue;
            };
            if !frame.confidence.is_finite() || frame.confidence < config.frame_confidence_floor {
                continue;
            }
            let confidence = clamp01(frame.confidence);
            weights[label.index()] += confidence.powf(config.frame_confidence_gamma);
            confidence_sum += confidence;
            contributing += 1;
        }

        if contributing == 0 {
            return Observation::Unobserved;
        }
        confidence_sum / contributing as f64
    } else {
        for (key, count) in &payload.counts {
            if let Some(label) = FacialLabel::parse(key) {
                if count.is_finite() && *count > 0.0 {
                    weights[label.index()] += count;
                }
            }
        }
        if weights.iter().sum::<f64>() <= DEGENERATE_SUM {
            return Observation::Unobserved;
        }
        // Counted detections already cleared the classifier's floor upstream.
        payload
            .avg_confidence
            .map(clamp01)
            .unwrap_or(config.frame_confidence_floor)
    };

    Observation::observed(
        smoothed_without_neutral(weights, config.dirichlet_alpha),
        quality,
    )
}

/// Dirichlet-smooth seven facial weights, then drop the neutral mass and
/// rescale the six emotions.
pub fn smoothed_without_neutral(weights: [f64; FacialLabel::COUNT], alpha: f64) -> Distribution {
    let total: f64 = weights.iter().sum::<f64>() + alpha * FacialLabel::COUNT as f64;
    if total <= DEGENERATE_SUM {
        return Distribution::uniform();
    }

    let smoothed = weights.map(|w| (w + alpha) / total);
    let neutral = smoothed[FacialLabel::Neutral.index()];
    if neutral >= 1.0 - DEGENERATE_SUM {
        return Distribution::uniform();
    }

    let mut emotions = [0.0; LABEL_COUNT];
    for (slot, value) in emotions.iter_mut().zip(smoothed.iter()) {
        *slot = value / (1.0 - neutral);
    }
    Distribution::normalize_or_uniform(emotions)
}

pub fn text_from_payload(payload: &TextEmotionPayload, config: &FusionConfig) -> Observation {
    if let Some(probabilities) = &payload.probabilities {
        let mut weights = [0.0; LABEL_COUNT];
        for (key, value) in probabilities {
            if let (Some(label), Some(p)) = (EmotionLabel::parse(key), value.as_f64()) {
                weights[label.index()] += p.max(0.0);
            }
        }
        return match Distribution::try_normalize(weights) {
            Some(distribution) => {
                let confidence = payload
                    .confidence
                    .unwrap_or_else(|| distribution.argmax().1);
                Observation::observed(distribution, confidence)
            }
            None => Observation::Unobserved,
        };
    }

    match payload.label.as_deref().and_then(EmotionLabel::parse) {
        Some(label) => {
            let confidence = clamp01(payload.confidence.unwrap_or(0.0));
            Observation::observed(
                pseudo_distribution(label, confidence, config.pseudo_min_epsilon),
                confidence,
            )
        }
        None => Observation::Unobserved,
    }
}

/// Spread `epsilon = max(min_epsilon, 1 - confidence)` evenly over the five
/// other labels and give the rest to `label`.
pub fn pseudo_distribution(label: EmotionLabel, confidence: f64, min_epsilon: f64) -> Distribution {
    let epsilon = clamp01(min_epsilon.max(1.0 - clamp01(confidence)));
    let share = epsilon / (LABEL_COUNT - 1) as f64;
    let mut weights = [share; LABEL_COUNT];
    weights[label.index()] = 1.0 - epsilon;
    Distribution::normalize_or_uniform(weights)
}
