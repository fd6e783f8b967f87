//! Deterministic fingerprint of an analysis' inputs.
//!
//! The digest covers the conversation id, the ordered turn ids and each
//! turn's fused (pre-smoothing) distribution rounded to 3 decimals. A stored
//! result whose hash matches a fresh fingerprint is still current.

use std::fmt::{self, Write};

use sha1::{Digest, Sha1};

use crate::emotion::{Distribution, EmotionLabel};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_error;

/// Reported when there is nothing to hash or the encoding could not be built.
pub const SENTINEL_HASH: &str = "sha1:0";

pub fn input_hash<'a, I>(conversation_id: &str, turns: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Distribution)>,
{
    match encode_inputs(conversation_id, turns) {
        Ok(encoded) => format!("sha1:{}", hex::encode(Sha1::digest(encoded.as_bytes()))),
        Err(err) => {
            log_error!("failed to encode inputs of conversation {conversation_id}: {err}");
            SENTINEL_HASH.to_string()
        }
    }
}

/// `conversation=<id>|turns=<n>|<turnId>:<label>=<val>,...|...`
pub fn encode_inputs<'a, I>(conversation_id: &str, turns: I) -> Result<String, fmt::Error>
where
    I: IntoIterator<Item = (&'a str, &'a Distribution)>,
{
    let mut body = String::new();
    let mut count = 0usize;

    for (turn_id, distribution) in turns {
        write!(body, "|{turn_id}:")?;
        for (position, (label, value)) in EmotionLabel::ALL
            .iter()
            .zip(distribution.rounded().iter())
            .enumerate()
        {
            if position > 0 {
                body.push(',');
            }
            write!(body, "{}={:.3}", label.as_str(), value)?;
        }
        count += 1;
    }

    let mut encoded = String::with_capacity(body.len() + conversation_id.len() + 32);
    write!(encoded, "conversation={conversation_id}|turns={count}")?;
    encoded.push_str(&body);
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_stable_and_rounded() {
        let joy = Distribution::certain(EmotionLabel::Joy);
        let mixed = Distribution::new([0.1234, 0.0, 0.0, 0.0, 0.0, 0.8766]).unwrap();
        let encoded = encode_inputs("c1", [("t1", &joy), ("t2", &mixed)]).unwrap();
        assert_eq!(
            encoded,
            "conversation=c1|turns=2\
             |t1:joy=1.000,embarrassment=0.000,anger=0.000,anxiety=0.000,hurt=0.000,sadness=0.000\
             |t2:joy=0.123,embarrassment=0.000,anger=0.000,anxiety=0.000,hurt=0.000,sadness=0.877"
        );
    }

    #[test]
    fn identical_inputs_hash_identically() {
        let turns = vec![
            ("t1".to_string(), Distribution::uniform()),
            ("t2".to_string(), Distribution::certain(EmotionLabel::Anger)),
        ];
        let first = input_hash("c1", turns.iter().map(|(id, d)| (id.as_str(), d)));
        let second = input_hash("c1", turns.iter().map(|(id, d)| (id.as_str(), d)));
        assert_eq!(first, second);
        assert!(first.starts_with("sha1:"));
        assert_eq!(first.len(), "sha1:".len() + 40);

        let other_conversation = input_hash("c2", turns.iter().map(|(id, d)| (id.as_str(), d)));
        assert_ne!(first, other_conversation);
    }

    #[test]
    fn sub_rounding_noise_does_not_change_the_hash() {
        let a = Distribution::new([0.5, 0.5, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let b = Distribution::new([0.50001, 0.49999, 0.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(input_hash("c", [("t", &a)]), input_hash("c", [("t", &b)]));
    }
}
