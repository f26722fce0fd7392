use crate::bit_window::BitWindow;
use crate::distinguishing::required_elements;
use crate::error::{RankError, Result};
use crate::key::Key;

/// Integer weights for every subkey candidate of every distinguishing vector.
///
/// Lower weight means a more likely subkey. Weights are additive across
/// vectors, so the weight of a full key is the sum of its subkey weights.
/// Usually produced by [`crate::DistinguishingTable::map_to_weight`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightTable {
    vector_count: usize,
    vector_size_bits: u32,
    vector_size: usize,
    weights: Vec<u64>,
}

impl WeightTable {
    pub fn new(vector_count: usize, vector_size_bits: u32, weights: Vec<u64>) -> Result<Self> {
        let required = required_elements(vector_count, vector_size_bits)?;
        if weights.len() != required {
            return Err(RankError::TableShape {
                required,
                supplied: weights.len(),
            });
        }
        Ok(WeightTable {
            vector_count,
            vector_size_bits,
            vector_size: 1usize << vector_size_bits,
            weights,
        })
    }

    pub fn weight(&self, vector_index: usize, subkey_index: usize) -> u64 {
        self.weights[vector_index * self.vector_size + subkey_index]
    }

    /// Total weight of a full key candidate.
    ///
    /// Vector `v` is indexed by the key bits in the window
    /// `[v * vector_size_bits, (v + 1) * vector_size_bits - 1]`.
    pub fn weight_for_key(&self, key: &Key) -> Result<u64> {
        let mut sum = 0u64;
        for vector_index in 0..self.vector_count {
            let bit_offset = vector_index as u32 * self.vector_size_bits;
            let window = BitWindow::new(bit_offset, self.vector_size_bits)?;
            let subkey = key.subkey_value(&window)? as usize;
            let weight = self.weight(vector_index, subkey);
            sum = sum
                .checked_add(weight)
                .ok_or(RankError::WeightTooLarge(weight))?;
        }
        Ok(sum)
    }

    /// Shift every weight by the same amount so the global minimum becomes
    /// `new_minimum_weight`. Raising weights saturates at `u64::MAX`.
    pub fn rebase(&mut self, new_minimum_weight: u64) {
        let min_value = self.minimum_weight();
        if min_value >= new_minimum_weight {
            let shift = min_value - new_minimum_weight;
            for weight in self.weights.iter_mut() {
                *weight -= shift;
            }
        } else {
            let shift = new_minimum_weight - min_value;
            for weight in self.weights.iter_mut() {
                *weight = weight.saturating_add(shift);
            }
        }
    }

    pub fn minimum_weight(&self) -> u64 {
        self.weights.iter().copied().min().unwrap_or(0)
    }

    pub fn maximum_weight(&self) -> u64 {
        self.weights.iter().copied().max().unwrap_or(0)
    }

    pub fn vector_count(&self) -> usize {
        self.vector_count
    }

    pub fn vector_size_bits(&self) -> u32 {
        self.vector_size_bits
    }

    pub fn vector_size(&self) -> usize {
        self.vector_size
    }

    pub fn weights(&self) -> &[u64] {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(vector_count: usize, vector_size_bits: u32, weights: &[u64]) -> WeightTable {
        WeightTable::new(vector_count, vector_size_bits, weights.to_vec()).unwrap()
    }

    #[test]
    fn test_weight_lookup() {
        let weights = table(2, 2, &[3, 4, 6, 7, 0, 1, 3, 4]);
        assert_eq!(weights.weight(0, 0), 3);
        assert_eq!(weights.weight(0, 3), 7);
        assert_eq!(weights.weight(1, 0), 0);
        assert_eq!(weights.weight(1, 2), 3);
    }

    #[test]
    fn test_shape_mismatch() {
        assert_eq!(
            WeightTable::new(3, 2, vec![0; 11]),
            Err(RankError::TableShape {
                required: 12,
                supplied: 11
            })
        );
    }

    #[test]
    fn test_weight_for_key_6_bits() {
        let weights = table(3, 2, &[4, 3, 1, 1, 6, 4, 3, 1, 5, 7, 8, 9]);
        let key = Key::from_hex(6, "09").unwrap();
        assert_eq!(weights.weight_for_key(&key).unwrap(), 3 + 3 + 5);
    }

    #[test]
    fn test_weight_for_key_36_bits() {
        let vector_size = 1usize << 12;
        let mut raw = vec![0u64; 3 * vector_size];
        raw[513] = 3;
        raw[vector_size + 48] = 3;
        raw[2 * vector_size + 772] = 5;
        let weights = table(3, 12, &raw);
        let key = Key::from_hex(36, "0102030403").unwrap();
        assert_eq!(weights.weight_for_key(&key).unwrap(), 3 + 3 + 5);
    }

    #[test]
    fn test_weight_for_key_short_key() {
        // a 4-bit key stores 8 bits; the last window covers bits 8 and 9
        let weights = table(5, 2, &[0; 20]);
        let key = Key::from_hex(4, "05").unwrap();
        assert!(matches!(
            weights.weight_for_key(&key),
            Err(RankError::WindowOutOfRange { .. })
        ));
    }

    #[test]
    fn test_weight_for_key_overflow() {
        let weights = table(2, 1, &[u64::MAX; 4]);
        let key = Key::from_hex(2, "00").unwrap();
        assert_eq!(
            weights.weight_for_key(&key),
            Err(RankError::WeightTooLarge(u64::MAX))
        );
    }

    #[test]
    fn test_rebase_down() {
        let mut weights = table(3, 2, &[9, 3, 4, 1, 6, 4, 3, 1, 5, 7, 4, 1]);
        weights.rebase(0);
        assert_eq!(weights.weights(), &[8, 2, 3, 0, 5, 3, 2, 0, 4, 6, 3, 0]);

        let mut weights = table(3, 2, &[10, 4, 5, 3, 7, 5, 4, 3, 6, 8, 5, 3]);
        weights.rebase(1);
        assert_eq!(weights.weights(), &[8, 2, 3, 1, 5, 3, 2, 1, 4, 6, 3, 1]);
    }

    #[test]
    fn test_rebase_up() {
        let mut weights = table(3, 2, &[9, 3, 4, 0, 6, 4, 3, 0, 5, 7, 4, 0]);
        weights.rebase(1);
        assert_eq!(weights.weights(), &[10, 4, 5, 1, 7, 5, 4, 1, 6, 8, 5, 1]);

        let mut weights = table(3, 2, &[10, 4, 5, 1, 7, 5, 4, 1, 6, 8, 5, 1]);
        weights.rebase(3);
        assert_eq!(weights.weights(), &[12, 6, 7, 3, 9, 7, 6, 3, 8, 10, 7, 3]);
        assert_eq!(weights.minimum_weight(), 3);
    }

    #[test]
    fn test_rebase_to_current_minimum_is_noop() {
        let original = table(3, 2, &[4, 3, 1, 2, 6, 4, 3, 1, 5, 7, 4, 1]);
        let mut weights = original.clone();
        weights.rebase(1);
        assert_eq!(weights, original);
    }

    #[test]
    fn test_minimum_and_maximum() {
        let weights = table(3, 2, &[4, 3, 1, 0, 6, 4, 3, 0, 5, 7, 4, 1]);
        assert_eq!(weights.minimum_weight(), 0);
        assert_eq!(weights.maximum_weight(), 7);
    }
}
