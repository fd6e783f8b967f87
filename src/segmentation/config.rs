use serde::{Deserialize, Serialize};

/// Configuration for smoothing and segmentation with tunable thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// EMA factor: weight kept from the previous smoothed value
    pub smoothing_beta: f64,

    /// Number of recent arg-max labels considered for a majority vote
    pub window: usize,

    /// Share of the window a new label needs before a change is declared
    pub majority_threshold: f64,

    /// A segment must span this many turns before it can be closed
    /// (the final segment is exempt)
    pub min_segment_len: usize,

    /// Turns after a change during which no new change is declared
    pub cooldown_turns: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            smoothing_beta: 0.4,
            window: 3,
            majority_threshold: 0.6,
            min_segment_len: 2,
            cooldown_turns: 2,
        }
    }
}
