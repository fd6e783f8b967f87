pub mod builder;
pub mod config;
pub mod engine;
pub mod payload;

pub use builder::{facial_observation, text_observation};
pub use config::FusionConfig;
pub use engine::{fuse, FusionResult};
pub use payload::{FacialEmotionPayload, FacialFrame, TextEmotionPayload};
