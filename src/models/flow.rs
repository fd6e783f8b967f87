//! Emotion-flow output models.
//!
//! These are the shapes persisted per conversation and handed to downstream
//! consumers (diary and album generation). Numeric scalars are rounded to 3
//! decimals when the values are produced, so serializing the same analysis
//! twice always yields the same bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::emotion::EmotionLabel;
use crate::segmentation::SegmentationConfig;

/// A run of consecutive turns sharing one dominant emotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_turn: usize,
    pub end_turn: usize,
    pub dominant: EmotionLabel,
    pub mean_conf: f64,
    pub valence_mean: f64,
    pub arousal_mean: f64,
}

/// Overall shape of a conversation's emotional trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowPattern {
    #[serde(rename = "U-shape")]
    UShape,
    #[serde(rename = "rising")]
    Rising,
    #[serde(rename = "falling")]
    Falling,
    #[serde(rename = "sharp-reversal")]
    SharpReversal,
    #[serde(rename = "stable")]
    Stable,
}

impl FlowPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowPattern::UShape => "U-shape",
            FlowPattern::Rising => "rising",
            FlowPattern::Falling => "falling",
            FlowPattern::SharpReversal => "sharp-reversal",
            FlowPattern::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    pub flips: usize,
    pub positive_ratio: f64,
    pub longest_negative_run: usize,
    /// `None` only for a conversation without analyzable turns.
    pub peak_arousal_turn: Option<usize>,
    pub pattern: FlowPattern,
}

impl FlowMetrics {
    /// Metrics reported when there is nothing to analyze.
    pub fn empty() -> Self {
        Self {
            flips: 0,
            positive_ratio: 0.0,
            longest_negative_run: 0,
            peak_arousal_turn: None,
            pattern: FlowPattern::Stable,
        }
    }
}

/// Parameters recorded next to every result so older results stay
/// interpretable after defaults change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowParams {
    pub window: usize,
    pub beta: f64,
    pub tau: f64,
    pub min_segment_len: usize,
    pub cooldown: usize,
    pub labels: Vec<String>,
}

impl From<&SegmentationConfig> for FlowParams {
    fn from(config: &SegmentationConfig) -> Self {
        Self {
            window: config.window,
            beta: config.smoothing_beta,
            tau: config.majority_threshold,
            min_segment_len: config.min_segment_len,
            cooldown: config.cooldown_turns,
            labels: EmotionLabel::ALL
                .iter()
                .map(|label| label.as_str().to_string())
                .collect(),
        }
    }
}

/// The conversation-level result object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionFlow {
    pub segments: Vec<Segment>,
    pub metrics: FlowMetrics,
    pub params: FlowParams,
    pub input_hash: String,
    pub generated_at: DateTime<Utc>,
}
