use super::distribution::Distribution;

/// Outcome of turning one classifier payload into a distribution.
///
/// `Unobserved` covers missing, malformed and contentless payloads. It reads
/// as a uniform distribution with zero quality so it never outweighs a real
/// observation during fusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Observed {
        distribution: Distribution,
        /// Classifier confidence in `[0, 1]`.
        quality: f64,
    },
    Unobserved,
}

impl Observation {
    pub fn observed(distribution: Distribution, quality: f64) -> Self {
        Observation::Observed {
            distribution,
            quality: clamp01(quality),
        }
    }

    pub fn is_observed(&self) -> bool {
        matches!(self, Observation::Observed { .. })
    }

    pub fn distribution_or_uniform(&self) -> Distribution {
        match self {
            Observation::Observed { distribution, .. } => *distribution,
            Observation::Unobserved => Distribution::uniform(),
        }
    }

    pub fn quality(&self) -> f64 {
        match self {
            Observation::Observed { quality, .. } => *quality,
            Observation::Unobserved => 0.0,
        }
    }
}

/// Clamp to `[0, 1]`; NaN maps to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
