//! Whole-pipeline entry points taking a hex key and a flat score buffer.

use log::debug;
use num_bigint::BigUint;

use crate::distinguishing::DistinguishingTable;
use crate::error::Result;
use crate::key::Key;
use crate::rank::{log2_rank, rank_for_key};

/// A score-space transform applied to a [`DistinguishingTable`] before
/// quantization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    Absolute,
    TranslateToPositive,
    Normalise,
    Logarithm(f64),
}

impl Transform {
    /// Turns higher-is-better scores such as absolute correlations into
    /// additive, lower-is-better ones. Zero scores are lifted before the
    /// logarithm is taken.
    pub fn correlation_pipeline(log_base: f64) -> [Transform; 4] {
        [
            Transform::TranslateToPositive,
            Transform::Normalise,
            Transform::Logarithm(log_base),
            Transform::Absolute,
        ]
    }

    /// Apply `transforms` in order.
    pub fn apply_all(transforms: &[Transform], table: &mut DistinguishingTable) {
        for transform in transforms {
            transform.apply(table);
        }
    }

    pub fn apply(&self, table: &mut DistinguishingTable) {
        match *self {
            Transform::Absolute => table.apply_absolute_value(),
            Transform::TranslateToPositive => table.translate_vectors_to_positive(),
            Transform::Normalise => table.normalise_distinguishing_vectors(),
            Transform::Logarithm(base) => table.take_logarithm(base),
        }
    }
}

/// Rank of `key_hex` given raw distinguishing scores.
///
/// The scores must already satisfy the rank model: the most likely subkey
/// has the lowest score and scores are additive across vectors. Run
/// correlation scores through [`Transform::correlation_pipeline`] first.
///
/// The key is `vector_count * vector_size_bits` bits long, hex encoded
/// little-endian.
pub fn rank_key(
    key_hex: &str,
    precision_bits: u32,
    vector_count: usize,
    vector_size_bits: u32,
    scores: &[f64],
) -> Result<BigUint> {
    let key_bits = vector_count * vector_size_bits as usize;
    let key = Key::from_hex(key_bits, key_hex)?;
    let table = DistinguishingTable::new(vector_count, vector_size_bits, scores.to_vec())?;
    let weights = table.map_to_weight(precision_bits)?;
    let rank = rank_for_key(&key, &weights)?;
    debug!("rank of {}-bit key at {} bits of precision: {}", key_bits, precision_bits, rank);
    Ok(rank)
}

/// `log2` of [`rank_key`]. A rank of 0 yields negative infinity.
pub fn log_rank_key(
    key_hex: &str,
    precision_bits: u32,
    vector_count: usize,
    vector_size_bits: u32,
    scores: &[f64],
) -> Result<f64> {
    let rank = rank_key(key_hex, precision_bits, vector_count, vector_size_bits, scores)?;
    Ok(log2_rank(&rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RankError;

    // Lower score is better; vector 0 prefers subkey 2, vector 1 subkey 1.
    const SCORES: [f64; 8] = [4.0, 3.0, 1.0, 4.0, 3.0, 1.0, 2.0, 4.0];

    #[test]
    fn test_rank_key_best_candidate() {
        // 0b0110: subkey 2 then subkey 1
        assert_eq!(
            rank_key("06", 8, 2, 2, &SCORES).unwrap(),
            BigUint::from(0u32)
        );
        assert_eq!(log_rank_key("06", 8, 2, 2, &SCORES).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_rank_key_worst_candidate() {
        // 0b1100: subkey 0 then subkey 3 are both worst
        let rank = rank_key("0C", 8, 2, 2, &SCORES).unwrap();
        assert!(rank >= BigUint::from(12u32));
        assert!(rank < BigUint::from(16u32));
        let log_rank = log_rank_key("0C", 8, 2, 2, &SCORES).unwrap();
        assert!(log_rank > 3.0 && log_rank < 4.0);
    }

    #[test]
    fn test_rank_key_errors() {
        assert!(matches!(
            rank_key("0606", 8, 2, 2, &SCORES),
            Err(RankError::KeyLength { .. })
        ));
        assert!(matches!(
            rank_key("06", 8, 2, 2, &SCORES[..7]),
            Err(RankError::TableShape { .. })
        ));
        assert_eq!(
            rank_key("06", 1, 2, 2, &SCORES),
            Err(RankError::PrecisionTooLow(1))
        );
        assert!(matches!(
            rank_key("06", 8, 2, 2, &[0.0; 8]),
            Err(RankError::DegenerateScores(_))
        ));
    }

    #[test]
    fn test_transforms_apply_in_order() {
        let mut table = DistinguishingTable::new(1, 1, vec![-0.5, 0.25]).unwrap();
        for transform in [Transform::Absolute, Transform::Logarithm(2.0)] {
            transform.apply(&mut table);
        }
        assert!((table.score(0, 0) + 1.0).abs() < 1e-12);
        assert!((table.score(0, 1) + 2.0).abs() < 1e-12);

        Transform::TranslateToPositive.apply(&mut table);
        Transform::Normalise.apply(&mut table);
        let sum: f64 = table.scores().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_pipeline_handles_zero_correlation() {
        let mut table = DistinguishingTable::new(1, 2, vec![0.0, 0.9, 0.3, 0.0]).unwrap();
        Transform::apply_all(&Transform::correlation_pipeline(2.0), &mut table);
        assert!(table.scores().iter().all(|s| s.is_finite() && *s >= 0.0));
        // strongest correlation gets the lowest score
        assert!(table.score(0, 1) < table.score(0, 2));
        assert!(table.score(0, 2) < table.score(0, 0));

        let weights = table.map_to_weight(8).unwrap();
        assert_eq!(weights.minimum_weight(), weights.weight(0, 1));
    }
}
