use crate::emotion::{Distribution, LABEL_COUNT};

/// Exponential moving average over a conversation's fused distributions.
///
/// The first value passes through unchanged; every later value is
/// `(1 - beta) * fused + beta * previous_smoothed`, renormalized. Each step
/// depends on the previous smoothed value, so this is a left-to-right scan.
pub fn smooth(fused: &[Distribution], beta: f64) -> Vec<Distribution> {
    fused
        .iter()
        .scan(None::<Distribution>, |previous, current| {
            let next = match previous {
                None => *current,
                Some(prev) => blend(current, prev, beta),
            };
            *previous = Some(next);
            Some(next)
        })
        .collect()
}

fn blend(current: &Distribution, previous: &Distribution, beta: f64) -> Distribution {
    let mut mixed = [0.0; LABEL_COUNT];
    for (index, slot) in mixed.iter_mut().enumerate() {
        *slot = (1.0 - beta) * current.as_array()[index] + beta * previous.as_array()[index];
    }
    Distribution::normalize_or_uniform(mixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionLabel;

    #[test]
    fn first_value_is_untouched() {
        let fused = vec![Distribution::certain(EmotionLabel::Anger)];
        assert_eq!(smooth(&fused, 0.4), fused);
        assert!(smooth(&[], 0.4).is_empty());
    }

    #[test]
    fn later_values_carry_previous_mass() {
        let fused = vec![
            Distribution::certain(EmotionLabel::Joy),
            Distribution::certain(EmotionLabel::Sadness),
            Distribution::certain(EmotionLabel::Sadness),
        ];
        let smoothed = smooth(&fused, 0.4);

        assert!((smoothed[1].prob(EmotionLabel::Joy) - 0.4).abs() < 1e-12);
        assert!((smoothed[1].prob(EmotionLabel::Sadness) - 0.6).abs() < 1e-12);
        assert!((smoothed[2].prob(EmotionLabel::Joy) - 0.16).abs() < 1e-12);
        assert!((smoothed[2].prob(EmotionLabel::Sadness) - 0.84).abs() < 1e-12);
    }

    #[test]
    fn smoothed_values_stay_normalized() {
        let fused: Vec<Distribution> = (0..20)
            .map(|i| {
                Distribution::normalize_or_uniform([
                    i as f64 + 1.0,
                    0.3,
                    (i % 3) as f64,
                    0.01,
                    2.0,
                    (20 - i) as f64,
                ])
            })
            .collect();
        for distribution in smooth(&fused, 0.4) {
            let total: f64 = distribution.as_array().iter().sum();
            assert!((total - 1.0).abs() < 1e-6);
        }
    }
}
