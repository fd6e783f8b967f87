use std::collections::BTreeMap;

use serde::{de, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::label::{EmotionLabel, LABEL_COUNT};

/// Sums at or below this are treated as "no mass" and fall back to uniform.
pub const DEGENERATE_SUM: f64 = 1e-9;

/// Allowed deviation of a distribution's total from 1.
pub const SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum DistributionError {
    #[error("probability for {label} is {value}, expected a finite value in [0, 1]")]
    OutOfRange { label: &'static str, value: f64 },
    #[error("probabilities sum to {0}, expected 1")]
    BadSum(f64),
    #[error("unknown emotion label '{0}'")]
    UnknownLabel(String),
}

/// A probability vector over the six emotion labels.
///
/// Every constructor guarantees each entry lies in `[0, 1]` and the entries
/// sum to 1 within [`SUM_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution([f64; LABEL_COUNT]);

impl Distribution {
    /// Validating constructor for already-normalized probabilities.
    pub fn new(probs: [f64; LABEL_COUNT]) -> Result<Self, DistributionError> {
        for (label, value) in EmotionLabel::ALL.iter().zip(probs.iter()) {
            if !value.is_finite() || *value < 0.0 || *value > 1.0 {
                return Err(DistributionError::OutOfRange {
                    label: label.as_str(),
                    value: *value,
                });
            }
        }
        let total: f64 = probs.iter().sum();
        if (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(DistributionError::BadSum(total));
        }
        Ok(Self(probs))
    }

    pub fn uniform() -> Self {
        Self([1.0 / LABEL_COUNT as f64; LABEL_COUNT])
    }

    /// All mass on one label.
    pub fn certain(label: EmotionLabel) -> Self {
        let mut probs = [0.0; LABEL_COUNT];
        probs[label.index()] = 1.0;
        Self(probs)
    }

    /// Normalize non-negative weights. Negative or non-finite weights count
    /// as zero. Returns `None` when the remaining mass is degenerate.
    pub fn try_normalize(weights: [f64; LABEL_COUNT]) -> Option<Self> {
        let cleaned = weights.map(|w| if w.is_finite() && w > 0.0 { w } else { 0.0 });
        let total: f64 = cleaned.iter().sum();
        if total.is_finite() {
            if total <= DEGENERATE_SUM {
                return None;
            }
            return Some(Self(cleaned.map(|w| w / total)));
        }

        // Finite weights whose sum overflows: rescale by the largest first.
        let peak = cleaned.iter().copied().fold(0.0, f64::max);
        let scaled = cleaned.map(|w| w / peak);
        let total: f64 = scaled.iter().sum();
        Some(Self(scaled.map(|w| w / total)))
    }

    pub fn normalize_or_uniform(weights: [f64; LABEL_COUNT]) -> Self {
        Self::try_normalize(weights).unwrap_or_else(Self::uniform)
    }

    pub fn prob(&self, label: EmotionLabel) -> f64 {
        self.0[label.index()]
    }

    pub fn as_array(&self) -> &[f64; LABEL_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f64)> + '_ {
        EmotionLabel::ALL.iter().copied().zip(self.0.iter().copied())
    }

    /// Highest-probability label. Ties go to the label that comes first in
    /// [`EmotionLabel::ALL`].
    pub fn argmax(&self) -> (EmotionLabel, f64) {
        let mut best = (EmotionLabel::ALL[0], self.0[0]);
        for (label, value) in self.iter().skip(1) {
            if value > best.1 {
                best = (label, value);
            }
        }
        best
    }

    /// Each probability rounded to 3 decimals, in canonical label order.
    pub fn rounded(&self) -> [f64; LABEL_COUNT] {
        self.0.map(round3)
    }
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(LABEL_COUNT))?;
        for (label, value) in self.iter() {
            map.serialize_entry(label.as_str(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Distribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        let mut probs = [0.0; LABEL_COUNT];
        for (key, value) in raw {
            let label = EmotionLabel::parse(&key)
                .ok_or_else(|| de::Error::custom(DistributionError::UnknownLabel(key.clone())))?;
            probs[label.index()] = value;
        }
        Distribution::new(probs).map_err(de::Error::custom)
    }
}
