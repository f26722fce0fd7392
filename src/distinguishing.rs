//! Real-valued distinguishing scores and the transforms applied before
//! quantization.
//!
//! A [`DistinguishingTable`] holds the scores of every subkey candidate for
//! every distinguishing vector of an attack, vector-major: the score for
//! vector `v`, subkey `s` lives at `v * vector_size + s`. All vectors target
//! the same number of key bits (e.g. sixteen 8-bit SubBytes attacks on
//! AES-128).
//!
//! The transforms mutate the table in place. [`DistinguishingTable::map_to_weight`]
//! reads the final scores and produces an independent [`WeightTable`].

use log::debug;

use crate::bit_window::BitWindow;
use crate::error::{RankError, Result};
use crate::weight::WeightTable;

/// Offset added by [`DistinguishingTable::translate_vectors_to_positive`] so no
/// score is zero after translation.
pub const TRANSLATE_EPSILON: f64 = 0.000001;

/// Base used by [`DistinguishingTable::take_logarithm`] when none is given.
pub const DEFAULT_LOG_BASE: f64 = 2.0;

/// Minimum weight of a freshly quantized [`WeightTable`].
pub const REBASE_MINIMUM: u64 = 1;

/// Check the shape parameters shared by score and weight tables and return
/// the number of elements the table must hold.
pub(crate) fn required_elements(vector_count: usize, vector_size_bits: u32) -> Result<usize> {
    if vector_count == 0 {
        return Err(RankError::NoVectors);
    }
    if vector_size_bits == 0 || vector_size_bits > 32 {
        return Err(RankError::VectorSizeBits(vector_size_bits));
    }
    Ok(vector_count * (1usize << vector_size_bits))
}

/// Sum with Kahan compensation to limit rounding drift over long vectors.
fn kahan_sum(scores: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for &score in scores {
        let y = score - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }
    sum
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistinguishingTable {
    vector_count: usize,
    vector_size_bits: u32,
    vector_size: usize,
    scores: Vec<f64>,
}

impl DistinguishingTable {
    /// Build a table from a flat, vector-major score buffer.
    pub fn new(vector_count: usize, vector_size_bits: u32, scores: Vec<f64>) -> Result<Self> {
        let required = required_elements(vector_count, vector_size_bits)?;
        if scores.len() != required {
            return Err(RankError::TableShape {
                required,
                supplied: scores.len(),
            });
        }
        Ok(DistinguishingTable {
            vector_count,
            vector_size_bits,
            vector_size: 1usize << vector_size_bits,
            scores,
        })
    }

    pub fn score(&self, vector_index: usize, subkey_index: usize) -> f64 {
        self.scores[vector_index * self.vector_size + subkey_index]
    }

    /// Divide every vector by its own sum so each vector sums to 1.0.
    ///
    /// Scores must already be non-negative.
    pub fn normalise_distinguishing_vectors(&mut self) {
        for vector in self.scores.chunks_mut(self.vector_size) {
            let multiplier = 1.0 / kahan_sum(vector);
            for score in vector.iter_mut() {
                *score *= multiplier;
            }
        }
    }

    pub fn apply_absolute_value(&mut self) {
        for score in self.scores.iter_mut() {
            *score = score.abs();
        }
    }

    /// Shift the whole table so its minimum is [`TRANSLATE_EPSILON`] above
    /// zero. Does nothing if every score is already positive.
    pub fn translate_vectors_to_positive(&mut self) {
        let min_value = self.scores.iter().copied().fold(f64::INFINITY, f64::min);
        if min_value <= 0.0 {
            let shift = min_value - TRANSLATE_EPSILON;
            for score in self.scores.iter_mut() {
                *score -= shift;
            }
        }
    }

    /// Replace every score with `log_base(score)`.
    pub fn take_logarithm(&mut self, base: f64) {
        let ln_base = base.ln();
        for score in self.scores.iter_mut() {
            *score = score.ln() / ln_base;
        }
    }

    /// Quantize the scores into integer weights with `precision_bits` bits of
    /// resolution.
    ///
    /// The largest score maps to `2^precision_bits`; every other score is
    /// scaled by the same multiplier and truncated. The resulting table is
    /// rebased so its minimum weight is [`REBASE_MINIMUM`], which keeps the
    /// rank traversal short.
    pub fn map_to_weight(&self, precision_bits: u32) -> Result<WeightTable> {
        if precision_bits <= 1 {
            return Err(RankError::PrecisionTooLow(precision_bits));
        }

        let max_score = self
            .scores
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let alpha = max_score.log2();
        if alpha.is_infinite() || alpha.is_nan() {
            return Err(RankError::DegenerateScores(max_score));
        }
        let multiplier = 2f64.powf(precision_bits as f64 - alpha);
        debug!(
            "mapping scores to weights: max score {}, multiplier {}",
            max_score, multiplier
        );

        let raw = self
            .scores
            .iter()
            .map(|&score| quantize(score, multiplier))
            .collect::<Result<Vec<i64>>>()?;
        // Lift into the unsigned domain before the rebase fixes the minimum.
        // Both ends lie within QUANTIZED_LIMIT of zero, so the span fits.
        let floor = raw.iter().copied().min().unwrap_or(0);
        let weights = raw.iter().map(|&w| w.abs_diff(floor)).collect();

        let mut table = WeightTable::new(self.vector_count, self.vector_size_bits, weights)?;
        table.rebase(REBASE_MINIMUM);
        Ok(table)
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

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }
}

/// Largest magnitude a scaled score may take before truncation.
const QUANTIZED_LIMIT: f64 = (1u64 << 62) as f64;

fn quantize(score: f64, multiplier: f64) -> Result<i64> {
    let scaled = (score * multiplier).trunc();
    if !scaled.is_finite() || scaled.abs() >= QUANTIZED_LIMIT {
        return Err(RankError::ScoreOutOfRange(score));
    }
    Ok(scaled as i64)
}

/// Assembles a [`DistinguishingTable`] one distinguishing vector at a time.
#[derive(Clone, Debug)]
pub struct DistinguishingTableBuilder {
    vector_count: usize,
    vector_size_bits: u32,
    scores: Vec<f64>,
}

impl DistinguishingTableBuilder {
    /// Start from an all-zero table of the given shape.
    pub fn new(vector_count: usize, vector_size_bits: u32) -> Result<Self> {
        let required = required_elements(vector_count, vector_size_bits)?;
        Ok(DistinguishingTableBuilder {
            vector_count,
            vector_size_bits,
            scores: vec![0.0; required],
        })
    }

    /// Copy in the scores for the vector targeting `key_portion`.
    ///
    /// The window must describe exactly one whole vector and `scores` must
    /// hold one score per candidate value of that window.
    pub fn add_scores(&mut self, key_portion: BitWindow, scores: &[f64]) -> Result<&mut Self> {
        let key_bits = self.vector_count * self.vector_size_bits as usize;
        if key_portion.bit_count() != self.vector_size_bits
            || key_portion.bit_start() % self.vector_size_bits != 0
            || key_portion.bit_end() as usize >= key_bits
        {
            return Err(RankError::BuilderWindow {
                bit_start: key_portion.bit_start(),
                bit_end: key_portion.bit_end(),
                vector_size_bits: self.vector_size_bits,
                key_bits,
            });
        }
        let required = key_portion.total_possible_values();
        if scores.len() as u64 != required {
            return Err(RankError::BuilderScoreCount {
                required,
                supplied: scores.len(),
            });
        }

        let vector_index = (key_portion.bit_start() / self.vector_size_bits) as usize;
        let offset = vector_index * scores.len();
        self.scores[offset..offset + scores.len()].copy_from_slice(scores);
        Ok(self)
    }

    pub fn build(&self) -> Result<DistinguishingTable> {
        DistinguishingTable::new(self.vector_count, self.vector_size_bits, self.scores.clone())
    }
}
