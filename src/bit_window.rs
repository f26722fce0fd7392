use crate::error::{RankError, Result};

/// A contiguous range of bits inside a key.
///
/// Indexes are taken left-to-right over the key's byte array, zero-indexed:
/// the window covers bits `[bit_start, bit_start + bit_count - 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitWindow {
    bit_start: u32,
    bit_count: u32,
    bit_end: u32,
}

impl BitWindow {
    /// Create a window of `bit_count` bits starting at `bit_start`.
    ///
    /// Fails with [`RankError::EmptyWindow`] when `bit_count` is zero.
    pub fn new(bit_start: u32, bit_count: u32) -> Result<Self> {
        if bit_count == 0 {
            return Err(RankError::EmptyWindow);
        }
        Ok(BitWindow {
            bit_start,
            bit_count,
            bit_end: bit_start.saturating_add(bit_count - 1),
        })
    }

    pub fn bit_start(&self) -> u32 {
        self.bit_start
    }

    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    /// Index of the last bit covered by the window.
    pub fn bit_end(&self) -> u32 {
        self.bit_end
    }

    /// Number of distinct values a subkey of this width can take.
    ///
    /// Saturates at `u64::MAX` for windows of 64 bits or more.
    pub fn total_possible_values(&self) -> u64 {
        1u64.checked_shl(self.bit_count).unwrap_or(u64::MAX)
    }

    /// True when `other` lies entirely inside this window.
    pub fn encapsulates(&self, other: &BitWindow) -> bool {
        self.bit_start <= other.bit_start && self.bit_end >= other.bit_end
    }
}
