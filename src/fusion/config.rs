use serde::{Deserialize, Serialize};

/// Constants for the distribution builder and the fusion weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Exponent applied to a facial frame's confidence before it is counted.
    pub frame_confidence_gamma: f64,

    /// Facial frames below this confidence are discarded.
    pub frame_confidence_floor: f64,

    /// Dirichlet concentration added to each of the seven facial labels.
    pub dirichlet_alpha: f64,

    /// Minimum mass spread over the other labels when a text classifier
    /// only reports a single label.
    pub pseudo_min_epsilon: f64,

    /// Fusion weights (lambda) applied to each source's confidence
    pub text_weight: f64,
    pub face_weight: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            frame_confidence_gamma: 1.5,
            frame_confidence_floor: 0.5,
            dirichlet_alpha: 0.5,
            pseudo_min_epsilon: 0.1,
            text_weight: 0.6,
            face_weight: 0.4,
        }
    }
}
