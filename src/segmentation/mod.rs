pub mod algorithm;
pub mod config;
pub mod scoring;
pub mod smoothing;

pub use algorithm::segment_conversation;
pub use config::SegmentationConfig;
pub use smoothing::smooth;
