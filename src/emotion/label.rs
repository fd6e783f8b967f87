use serde::{Deserialize, Serialize};

/// Number of emotion categories that take part in fusion.
pub const LABEL_COUNT: usize = 6;

/// The fixed emotion label set. Declaration order is the canonical order used
/// for iteration, tie-breaking and hashing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Joy,
    #[serde(alias = "surprise")]
    Embarrassment,
    Anger,
    Anxiety,
    Hurt,
    Sadness,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; LABEL_COUNT] = [
        EmotionLabel::Joy,
        EmotionLabel::Embarrassment,
        EmotionLabel::Anger,
        EmotionLabel::Anxiety,
        EmotionLabel::Hurt,
        EmotionLabel::Sadness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Joy => "joy",
            EmotionLabel::Embarrassment => "embarrassment",
            EmotionLabel::Anger => "anger",
            EmotionLabel::Anxiety => "anxiety",
            EmotionLabel::Hurt => "hurt",
            EmotionLabel::Sadness => "sadness",
        }
    }

    /// Position of the label in [`EmotionLabel::ALL`].
    pub fn index(&self) -> usize {
        match self {
            EmotionLabel::Joy => 0,
            EmotionLabel::Embarrassment => 1,
            EmotionLabel::Anger => 2,
            EmotionLabel::Anxiety => 3,
            EmotionLabel::Hurt => 4,
            EmotionLabel::Sadness => 5,
        }
    }

    /// Lenient parse used for classifier payloads. Case and surrounding
    /// whitespace are ignored; `surprise` is accepted for `embarrassment`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "joy" => Some(EmotionLabel::Joy),
            "embarrassment" | "surprise" => Some(EmotionLabel::Embarrassment),
            "anger" => Some(EmotionLabel::Anger),
            "anxiety" => Some(EmotionLabel::Anxiety),
            "hurt" => Some(EmotionLabel::Hurt),
            "sadness" => Some(EmotionLabel::Sadness),
            _ => None,
        }
    }

    /// +1 for joy, -1 for every other label.
    pub fn valence(&self) -> f64 {
        match self {
            EmotionLabel::Joy => 1.0,
            _ => -1.0,
        }
    }

    pub fn arousal(&self) -> f64 {
        match self {
            EmotionLabel::Joy => 0.3,
            EmotionLabel::Embarrassment | EmotionLabel::Anger | EmotionLabel::Anxiety => 1.0,
            EmotionLabel::Hurt | EmotionLabel::Sadness => -1.0,
        }
    }
}

/// Labels emitted by the facial classifier: the six emotions plus neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacialLabel {
    Emotion(EmotionLabel),
    Neutral,
}

impl FacialLabel {
    /// Number of facial categories, neutral included.
    pub const COUNT: usize = LABEL_COUNT + 1;

    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("neutral") {
            return Some(FacialLabel::Neutral);
        }
        EmotionLabel::parse(value).map(FacialLabel::Emotion)
    }

    /// Slot in a 7-wide weight vector; neutral takes the last slot.
    pub fn index(&self) -> usize {
        match self {
            FacialLabel::Emotion(label) => label.index(),
            FacialLabel::Neutral => LABEL_COUNT,
        }
    }
}
