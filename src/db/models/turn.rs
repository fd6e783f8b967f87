//! Turn data models.
//!
//! A turn row carries the raw classifier payloads as written by upstream
//! classifiers, and the fusion result once the conversation was analyzed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::emotion::{Distribution, EmotionLabel};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub id: String,
    pub conversation_id: String,
    pub ordinal: u64,
    pub speaker: Speaker,
    pub content: Option<String>,
    pub facial_payload: Option<String>,
    pub text_payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(
        conversation_id: impl Into<String>,
        ordinal: u64,
        speaker: Speaker,
        content: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            ordinal,
            speaker,
            content,
            facial_payload: None,
            text_payload: None,
            created_at: Utc::now(),
        }
    }
}

/// Stored fusion result of one analyzed turn, as read by downstream
/// consumers such as diary generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TurnFusionRecord {
    pub turn_id: String,
    pub ordinal: u64,
    pub distribution: Distribution,
    pub label: EmotionLabel,
    pub confidence: f64,
    pub fused_at: DateTime<Utc>,
}
