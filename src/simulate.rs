//! Simulated Hamming-weight CPA attacks on the first AES-128 round.
//!
//! Each attack leaks `HW(Sbox(p ^ k)) + noise` for every key byte, with
//! Gaussian noise of variance `2 / snr` (the Hamming weight of a uniform
//! byte has variance 2). Every subkey hypothesis is correlated against the
//! leakage and the absolute Pearson correlation becomes its score.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distinguishing::DistinguishingTable;
use crate::error::Result;

pub const AES_KEY_BYTES: usize = 16;

const SUBKEYS: usize = 256;

/// AES forward S-box.
const SBOX: [u8; 256] = [
    0x63, 0x7C, 0x77, 0x7B, 0xF2, 0x6B, 0x6F, 0xC5, 0x30, 0x01, 0x67, 0x2B, 0xFE, 0xD7, 0xAB, 0x76,
    0xCA, 0x82, 0xC9, 0x7D, 0xFA, 0x59, 0x47, 0xF0, 0xAD, 0xD4, 0xA2, 0xAF, 0x9C, 0xA4, 0x72, 0xC0,
    0xB7, 0xFD, 0x93, 0x26, 0x36, 0x3F, 0xF7, 0xCC, 0x34, 0xA5, 0xE5, 0xF1, 0x71, 0xD8, 0x31, 0x15,
    0x04, 0xC7, 0x23, 0xC3, 0x18, 0x96, 0x05, 0x9A, 0x07, 0x12, 0x80, 0xE2, 0xEB, 0x27, 0xB2, 0x75,
    0x09, 0x83, 0x2C, 0x1A, 0x1B, 0x6E, 0x5A, 0xA0, 0x52, 0x3B, 0xD6, 0xB3, 0x29, 0xE3, 0x2F, 0x84,
    0x53, 0xD1, 0x00, 0xED, 0x20, 0xFC, 0xB1, 0x5B, 0x6A, 0xCB, 0xBE, 0x39, 0x4A, 0x4C, 0x58, 0xCF,
    0xD0, 0xEF, 0xAA, 0xFB, 0x43, 0x4D, 0x33, 0x85, 0x45, 0xF9, 0x02, 0x7F, 0x50, 0x3C, 0x9F, 0xA8,
    0x51, 0xA3, 0x40, 0x8F, 0x92, 0x9D, 0x38, 0xF5, 0xBC, 0xB6, 0xDA, 0x21, 0x10, 0xFF, 0xF3, 0xD2,
    0xCD, 0x0C, 0x13, 0xEC, 0x5F, 0x97, 0x44, 0x17, 0xC4, 0xA7, 0x7E, 0x3D, 0x64, 0x5D, 0x19, 0x73,
    0x60, 0x81, 0x4F, 0xDC, 0x22, 0x2A, 0x90, 0x88, 0x46, 0xEE, 0xB8, 0x14, 0xDE, 0x5E, 0x0B, 0xDB,
    0xE0, 0x32, 0x3A, 0x0A, 0x49, 0x06, 0x24, 0x5C, 0xC2, 0xD3, 0xAC, 0x62, 0x91, 0x95, 0xE4, 0x79,
    0xE7, 0xC8, 0x37, 0x6D, 0x8D, 0xD5, 0x4E, 0xA9, 0x6C, 0x56, 0xF4, 0xEA, 0x65, 0x7A, 0xAE, 0x08,
    0xBA, 0x78, 0x25, 0x2E, 0x1C, 0xA6, 0xB4, 0xC6, 0xE8, 0xDD, 0x74, 0x1F, 0x4B, 0xBD, 0x8B, 0x8A,
    0x70, 0x3E, 0xB5, 0x66, 0x48, 0x03, 0xF6, 0x0E, 0x61, 0x35, 0x57, 0xB9, 0x86, 0xC1, 0x1D, 0x9E,
    0xE1, 0xF8, 0x98, 0x11, 0x69, 0xD9, 0x8E, 0x94, 0x9B, 0x1E, 0x87, 0xE9, 0xCE, 0x55, 0x28, 0xDF,
    0x8C, 0xA1, 0x89, 0x0D, 0xBF, 0xE6, 0x42, 0x68, 0x41, 0x99, 0x2D, 0x0F, 0xB0, 0x54, 0xBB, 0x16,
];

#[inline(always)]
fn hamming_weight(value: u8) -> f64 {
    value.count_ones() as f64
}

fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let (mut x, mut x2, mut y, mut y2, mut xy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&a, &b) in xs.iter().zip(ys) {
        x += a;
        x2 += a * a;
        y += b;
        y2 += b * b;
        xy += a * b;
    }
    let x_mean = x / n;
    let y_mean = y / n;
    let numerator = xy - n * x_mean * y_mean;
    let denominator = (x2 - n * x_mean * x_mean).sqrt() * (y2 - n * y_mean * y_mean).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Generates independent CPA attacks against one fixed AES-128 key.
pub struct SimulatedHwCpa {
    key: [u8; AES_KEY_BYTES],
    trace_count: usize,
    snr: f64,
    noise_sigma: f64,
    rng: StdRng,
}

impl SimulatedHwCpa {
    pub fn new(key: [u8; AES_KEY_BYTES], trace_count: usize, snr: f64, seed: u64) -> Self {
        SimulatedHwCpa {
            key,
            trace_count,
            snr,
            noise_sigma: (2.0 / snr).sqrt(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Standard normal sample via the Box-Muller transform.
    fn gaussian(&mut self) -> f64 {
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Run a fresh attack with new plaintexts and noise.
    ///
    /// Returns a 16-vector, 8-bit table of absolute correlations.
    pub fn next_attack(&mut self) -> Result<DistinguishingTable> {
        let mut scores = vec![0.0; AES_KEY_BYTES * SUBKEYS];
        let mut plaintexts = vec![0u8; self.trace_count];
        let mut traces = vec![0.0; self.trace_count];
        let mut hypotheses = vec![0.0; self.trace_count];

        for byte_index in 0..AES_KEY_BYTES {
            self.rng.fill(plaintexts.as_mut_slice());
            for trace_index in 0..self.trace_count {
                let intermediate = SBOX[(plaintexts[trace_index] ^ self.key[byte_index]) as usize];
                traces[trace_index] =
                    hamming_weight(intermediate) + self.noise_sigma * self.gaussian();
            }

            for subkey in 0..SUBKEYS {
                for (hypothesis, &plaintext) in hypotheses.iter_mut().zip(&plaintexts) {
                    *hypothesis = hamming_weight(SBOX[(plaintext ^ subkey as u8) as usize]);
                }
                let corr = pearson_correlation(&traces, &hypotheses);
                scores[byte_index * SUBKEYS + subkey] = corr.abs();
            }
        }
        debug!(
            "simulated CPA with {} traces at SNR {}",
            self.trace_count, self.snr
        );
        DistinguishingTable::new(AES_KEY_BYTES, 8, scores)
    }

    pub fn key(&self) -> &[u8; AES_KEY_BYTES] {
        &self.key
    }

    pub fn key_hex(&self) -> String {
        hex::encode(self.key)
    }

    pub fn trace_count(&self) -> usize {
        self.trace_count
    }

    pub fn snr(&self) -> f64 {
        self.snr
    }
}
