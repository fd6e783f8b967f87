pub mod flow;

pub use flow::{EmotionFlow, FlowMetrics, FlowParams, FlowPattern, Segment};
