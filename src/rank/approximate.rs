use num_bigint::BigUint;

use crate::bit_window::BitWindow;
use crate::distinguishing::DistinguishingTable;
use crate::error::Result;
use crate::key::Key;

/// Estimate a key's rank as the product of its per-vector subkey ranks.
///
/// `better(a, b)` returns true when score `a` beats score `b`: pass
/// `|a, b| a > b` for raw CPA scores or `|a, b| a < b` once scores are
/// lower-is-better. Subkey ranks here start at 1, so a perfect attack gives
/// 1 rather than 0. Ties with the correct subkey do not count.
pub fn approximate_rank<F>(table: &DistinguishingTable, key: &Key, better: F) -> Result<BigUint>
where
    F: Fn(f64, f64) -> bool,
{
    let vector_size_bits = table.vector_size_bits();
    let mut estimate = BigUint::from(1u32);
    for vector_index in 0..table.vector_count() {
        let window = BitWindow::new(vector_index as u32 * vector_size_bits, vector_size_bits)?;
        let correct = key.subkey_value(&window)? as usize;
        let correct_score = table.score(vector_index, correct);

        let beaten_by = (0..table.vector_size())
            .filter(|&subkey| subkey != correct)
            .filter(|&subkey| better(table.score(vector_index, subkey), correct_score))
            .count();
        estimate *= BigUint::from(beaten_by + 1);
    }
    Ok(estimate)
}
