//! Path counting rank computation.
//!
//! Implements the path counting rank algorithm of Martin et al.:
//!
//! - *How to Enumerate Your Keys Accurately and Efficiently After a Side
//!   Channel Attack*, D. P. Martin, J. F. O'Connell, E. Oswald, M. Stam,
//!   ASIACRYPT 2015.
//! - *Characterisation and Estimation of the Key Rank Distribution in the
//!   Context of Side Channel Evaluations*, D. P. Martin, L. Mather,
//!   E. Oswald, M. Stam, ASIACRYPT 2016.
//!
//! The rank of a key is the number of full-key candidates with a strictly
//! lower total weight. A perfect attack has rank 0, and ties with the known
//! key do not count: if three keys including the true one share the best
//! weight, the rank is still 0.
//!
//! [`approximate_rank`] gives a cheap estimate from per-vector subkey ranks
//! without quantizing the scores.

pub mod approximate;
pub mod coordinate;
pub mod graph;

use log::{debug, trace};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

pub use approximate::approximate_rank;
pub use coordinate::GraphCoordinate;
pub use graph::PathCountGraph;

use crate::error::{RankError, Result};
use crate::key::Key;
use crate::weight::WeightTable;

fn row_length(max_weight: u64) -> Result<usize> {
    if max_weight == 0 {
        return Err(RankError::ZeroWeight);
    }
    usize::try_from(max_weight).map_err(|_| RankError::WeightTooLarge(max_weight))
}

/// Rank of a known key under `table`.
pub fn rank_for_key(key: &Key, table: &WeightTable) -> Result<BigUint> {
    let key_weight = table.weight_for_key(key)?;
    debug!("key weight {}", key_weight);
    rank_for_weight(key_weight, table)
}

/// Number of key candidates whose total weight is strictly below
/// `max_weight`.
///
/// Ranking a key is the same as ranking its weight; for enumeration
/// problems `max_weight` can be any bound.
pub fn rank_for_weight(max_weight: u64, table: &WeightTable) -> Result<BigUint> {
    let row = row_length(max_weight)?;
    let vector_count = table.vector_count();
    let vector_size = table.vector_size();
    let mut graph = PathCountGraph::new(vector_count, row);

    for vector_index in (1..vector_count).rev() {
        for subkey_index in (0..vector_size).rev() {
            for weight_index in (0..row).rev() {
                let coord = GraphCoordinate::standard(vector_index, subkey_index, weight_index);
                graph.visit(coord, table);
            }
        }
        graph.rotate_buffers();
        trace!("vector {} of {} counted", vector_index, vector_count);
    }

    // Only the weight 0 node of vector 0 contributes to the answer.
    for subkey_index in (0..vector_size).rev() {
        graph.visit(GraphCoordinate::standard(0, subkey_index, 0), table);
    }
    Ok(graph.first().clone())
}

/// Rank every weight bound from `max_weight` down to 1 in one traversal.
///
/// Entry `i` of the result is `rank_for_weight(max_weight - i, table)`.
pub fn rank_all_weights(max_weight: u64, table: &WeightTable) -> Result<Vec<BigUint>> {
    let row = row_length(max_weight)?;
    let vector_count = table.vector_count();
    let vector_size = table.vector_size();
    let mut graph = PathCountGraph::new(vector_count, row);

    for vector_index in (0..vector_count).rev() {
        for subkey_index in (0..vector_size).rev() {
            for weight_index in (0..row).rev() {
                let coord = GraphCoordinate::standard(vector_index, subkey_index, weight_index);
                graph.visit(coord, table);
            }
        }
        graph.rotate_buffers();
    }
    Ok(graph.into_previous_row())
}

/// `log2(rank)` without overflowing `f64` for ranks of any size.
///
/// A rank of 0 yields negative infinity.
pub fn log2_rank(rank: &BigUint) -> f64 {
    let bits = rank.bits();
    if bits == 0 {
        return f64::NEG_INFINITY;
    }
    let shift = bits.saturating_sub(64);
    let top = (rank >> shift).to_u64().unwrap_or(u64::MAX);
    (top as f64).log2() + shift as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_table(weights: &[u64]) -> WeightTable {
        WeightTable::new(2, 2, weights.to_vec()).unwrap()
    }

    /// Count candidates below `max_weight` by listing them all.
    fn brute_force(max_weight: u64, table: &WeightTable) -> BigUint {
        let mut count = 0u64;
        let candidates = 1u64 << (table.vector_count() as u32 * table.vector_size_bits());
        for candidate in 0..candidates {
            let weight: u64 = (0..table.vector_count())
                .map(|v| {
                    let subkey = (candidate >> (v as u32 * table.vector_size_bits()))
                        & (table.vector_size() as u64 - 1);
                    table.weight(v, subkey as usize)
                })
                .sum();
            if weight < max_weight {
                count += 1;
            }
        }
        BigUint::from(count)
    }

    #[test]
    fn test_rank_for_key_worked_examples() {
        let key = Key::from_hex(4, "06").unwrap();
        let table = worked_table(&[0, 1, 3, 0, 0, 2, 3, 0]);
        assert_eq!(rank_for_key(&key, &table).unwrap(), BigUint::from(14u32));

        let table = worked_table(&[11, 15, 3, 6, 7, 2, 6, 19]);
        assert_eq!(rank_for_key(&key, &table).unwrap(), BigUint::from(0u32));
    }

    #[test]
    fn test_rank_for_weight_worked_examples() {
        let key = Key::from_hex(4, "06").unwrap();
        let table = worked_table(&[0, 1, 3, 0, 0, 2, 3, 0]);
        let key_weight = table.weight_for_key(&key).unwrap();
        assert_eq!(key_weight, 5);
        assert_eq!(
            rank_for_weight(key_weight, &table).unwrap(),
            BigUint::from(14u32)
        );
    }

    #[test]
    fn test_rank_matches_brute_force() {
        let table = WeightTable::new(3, 3, (0..24).map(|i| (i * 7 + 3) % 11).collect()).unwrap();
        for max_weight in 1..35 {
            assert_eq!(
                rank_for_weight(max_weight, &table).unwrap(),
                brute_force(max_weight, &table),
                "max weight {}",
                max_weight
            );
        }
    }

    #[test]
    fn test_rank_is_monotonic() {
        let table = worked_table(&[4, 1, 3, 2, 5, 2, 3, 1]);
        let mut last = BigUint::from(0u32);
        for max_weight in 1..12 {
            let rank = rank_for_weight(max_weight, &table).unwrap();
            assert!(rank >= last);
            last = rank;
        }
        // every candidate fits under a large enough bound
        assert_eq!(last, BigUint::from(16u32));
    }

    #[test]
    fn test_ties_do_not_count() {
        // subkeys 0 and 3 of both vectors share the minimum weight
        let table = worked_table(&[1, 5, 5, 1, 1, 5, 5, 1]);
        let key = Key::from_hex(4, "00").unwrap();
        assert_eq!(rank_for_key(&key, &table).unwrap(), BigUint::from(0u32));
        let tied = Key::from_hex(4, "0F").unwrap();
        assert_eq!(rank_for_key(&tied, &table).unwrap(), BigUint::from(0u32));
    }

    #[test]
    fn test_zero_weight_rejected() {
        let table = worked_table(&[0, 1, 3, 0, 0, 2, 3, 0]);
        assert_eq!(rank_for_weight(0, &table), Err(RankError::ZeroWeight));
        assert_eq!(rank_all_weights(0, &table), Err(RankError::ZeroWeight));

        // key 0b0000 selects weight 0 in both vectors
        let key = Key::from_hex(4, "00").unwrap();
        assert_eq!(rank_for_key(&key, &table), Err(RankError::ZeroWeight));
    }

    #[test]
    fn test_rank_all_weights_matches_individual_ranks() {
        let table = worked_table(&[0, 1, 3, 0, 0, 2, 3, 0]);
        let ranks = rank_all_weights(6, &table).unwrap();
        let expected: Vec<BigUint> = (1..=6)
            .rev()
            .map(|weight| rank_for_weight(weight, &table).unwrap())
            .collect();
        assert_eq!(ranks, expected);
    }

    #[test]
    fn test_rank_exceeds_fixed_width() {
        // 17 vectors of 8 bits, all weight 1: every one of the 2^136
        // candidates has weight 17
        let table = WeightTable::new(17, 8, vec![1; 17 << 8]).unwrap();
        let rank = rank_for_weight(18, &table).unwrap();
        assert_eq!(rank, BigUint::from(1u32) << 136usize);
        assert_eq!(log2_rank(&rank), 136.0);
        assert_eq!(rank_for_weight(17, &table).unwrap(), BigUint::from(0u32));
    }

    #[test]
    fn test_log2_rank() {
        assert_eq!(log2_rank(&BigUint::from(0u32)), f64::NEG_INFINITY);
        assert_eq!(log2_rank(&BigUint::from(1u32)), 0.0);
        assert_eq!(log2_rank(&BigUint::from(1024u32)), 10.0);
        let big = (BigUint::from(3u32) << 200usize) + 12345u32;
        assert!((log2_rank(&big) - (200.0 + 3f64.log2())).abs() < 1e-9);
    }
}
