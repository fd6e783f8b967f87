pub mod distribution;
pub mod label;
pub mod observation;

pub use distribution::{round3, Distribution, DistributionError};
pub use label::{EmotionLabel, FacialLabel, LABEL_COUNT};
pub use observation::{clamp01, Observation};
