use num_bigint::BigUint;

use crate::bit_window::BitWindow;
use crate::error::{RankError, Result};

/// A fixed-length key, stored little-endian as bytes.
///
/// Bit 0 is the first bit of byte 0. Within a byte, bit offset `i` is
/// `(byte >> i) & 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Key {
    length_bits: usize,
    bytes: Vec<u8>,
}

fn byte_count(length_bits: usize) -> usize {
    length_bits.div_ceil(8)
}

impl Key {
    /// Wrap an exact byte representation of a `length_bits`-bit key.
    pub fn new(length_bits: usize, bytes: Vec<u8>) -> Result<Self> {
        let expected = byte_count(length_bits);
        if bytes.len() != expected {
            return Err(RankError::KeyLength {
                length_bits,
                expected,
                supplied: bytes.len(),
            });
        }
        Ok(Key { length_bits, bytes })
    }

    /// Decode a little-endian hex string (e.g. `"000102030405060708090A0B0C0D0E0F"`).
    pub fn from_hex(length_bits: usize, hex_key: &str) -> Result<Self> {
        let bytes = hex::decode(hex_key.trim())?;
        Key::new(length_bits, bytes)
    }

    pub fn length_bits(&self) -> usize {
        self.length_bits
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Extract the bits covered by `window`.
    ///
    /// The first extracted bit lands in the least significant position of
    /// the result, the second in the next position, and so on.
    pub fn subkey_value(&self, window: &BitWindow) -> Result<u64> {
        let stored_bits = self.bytes.len() * 8;
        if window.bit_end() as usize >= stored_bits {
            return Err(RankError::WindowOutOfRange {
                bit_start: window.bit_start(),
                bit_end: window.bit_end(),
                key_bits: stored_bits,
            });
        }
        if window.bit_count() > u64::BITS {
            return Err(RankError::WindowTooWide {
                bit_count: window.bit_count(),
            });
        }

        let mut value = 0u64;
        for (state_bit, bit) in (window.bit_start()..=window.bit_end()).enumerate() {
            let byte_idx = bit as usize / 8;
            let bit_idx = bit % 8;
            let bit_value = ((self.bytes[byte_idx] >> bit_idx) & 1) as u64;
            value |= bit_value << state_bit;
        }
        Ok(value)
    }

    /// The key read as a little-endian integer.
    pub fn as_integer_value(&self) -> BigUint {
        BigUint::from_bytes_le(&self.bytes)
    }
}
