//! Classifier payloads as stored on a turn.
//!
//! Both payloads arrive as JSON text written by upstream classifiers. Parsing
//! is lenient: unknown fields are ignored and every field is optional, so an
//! empty object is a valid (contentless) payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FacialFrame {
    pub label: String,
    pub confidence: f64,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// Facial classifier output: per-frame detections, or aggregated counts when
/// per-frame detail was not kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FacialEmotionPayload {
    pub frames: Vec<FacialFrame>,
    pub counts: BTreeMap<String, f64>,
    pub avg_confidence: Option<f64>,
}

/// Text classifier output: a full probability map, or a single label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextEmotionPayload {
    /// Values are kept as raw JSON so that stray non-numeric entries are
    /// skipped instead of failing the whole payload.
    pub probabilities: Option<BTreeMap<String, Value>>,
    pub label: Option<String>,
    pub confidence: Option<f64>,
}

pub fn parse_facial_payload(raw: &str) -> serde_json::Result<FacialEmotionPayload> {
    serde_json::from_str(raw)
}

pub fn parse_text_payload(raw: &str) -> serde_json::Result<TextEmotionPayload> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facial_payload_accepts_either_shape() {
        let frames = parse_facial_payload(
            r#"{"frames":[{"label":"joy","confidence":0.9,"timestamp":1.5}]}"#,
        )
        .unwrap();
        assert_eq!(frames.frames.len(), 1);
        assert!(frames.counts.is_empty());

        let counts =
            parse_facial_payload(r#"{"counts":{"sadness":3,"neutral":1},"avg_confidence":0.7}"#)
                .unwrap();
        assert_eq!(counts.counts.get("sadness"), Some(&3.0));
        assert_eq!(counts.avg_confidence, Some(0.7));
    }

    #[test]
    fn text_payload_tolerates_extra_keys() {
        let payload = parse_text_payload(
            r#"{"probabilities":{"joy":0.8,"sadness":0.2,"debug":"x"},"confidence":0.9,"model":"v2"}"#,
        )
        .unwrap();
        let probabilities = payload.probabilities.unwrap();
        assert_eq!(probabilities.len(), 3);
        assert_eq!(payload.confidence, Some(0.9));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_facial_payload("{frames:").is_err());
        assert!(parse_text_payload(r#"{"confidence":"high"}"#).is_err());
    }
}
