//! Key Rank Computation for Side-Channel Attacks
//!
//! This crate computes the exact *rank* of a cryptographic key from the
//! per-subkey distinguishing scores of a side-channel attack: the number of
//! full-key candidates that score strictly better than the known key.
//!
//! # Pipeline
//! 1. Load raw scores into a [`DistinguishingTable`] and transform them so
//!    the most likely subkey has the lowest, additive score.
//! 2. Quantize into a [`WeightTable`] with [`DistinguishingTable::map_to_weight`].
//! 3. Count candidates lighter than the key with [`rank::rank_for_key`].
//!
//! Ranks are [`num_bigint::BigUint`]: for AES-128 they range up to 2^128.
//!
//! # Example
//! ```
//! use keyrank::{rank, Key, WeightTable};
//! use num_bigint::BigUint;
//!
//! let weights = WeightTable::new(2, 2, vec![0, 1, 3, 0, 0, 2, 3, 0]).unwrap();
//! let key = Key::from_hex(4, "06").unwrap();
//! let rank = rank::rank_for_key(&key, &weights).unwrap();
//! assert_eq!(rank, BigUint::from(14u32));
//! ```

pub mod bit_window;
pub mod distinguishing;
pub mod error;
pub mod glue;
pub mod key;
pub mod rank;
pub mod simulate;
pub mod weight;

pub use bit_window::BitWindow;
pub use distinguishing::{
    DistinguishingTable, DistinguishingTableBuilder, DEFAULT_LOG_BASE, REBASE_MINIMUM,
    TRANSLATE_EPSILON,
};
pub use error::{RankError, Result};
pub use glue::{log_rank_key, rank_key, Transform};
pub use key::Key;
pub use rank::{GraphCoordinate, PathCountGraph};
pub use simulate::SimulatedHwCpa;
pub use weight::WeightTable;
