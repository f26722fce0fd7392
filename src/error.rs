//! Error type shared by every stage of the rank pipeline.

/// Invalid-argument conditions raised while building tables, keys and ranks.
///
/// Every variant is raised synchronously before any traversal work starts,
/// except [`RankError::DegenerateScores`] which is detected after the table
/// has been scanned for its maximum.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankError {
    #[error("cannot construct a bit window with a window size of 0")]
    EmptyWindow,

    #[error("bit window of {bit_count} bits is wider than the 64-bit subkey value")]
    WindowTooWide { bit_count: u32 },

    #[error("cannot extract subkey value for bit window [{bit_start}, {bit_end}] from a key of {key_bits} bits")]
    WindowOutOfRange {
        bit_start: u32,
        bit_end: u32,
        key_bits: usize,
    },

    #[error("key specified to have length {length_bits} bits ({expected} bytes), but {supplied} bytes were supplied")]
    KeyLength {
        length_bits: usize,
        expected: usize,
        supplied: usize,
    },

    #[error("invalid hex key: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("vector size of {0} bits is not supported (must be between 1 and 32)")]
    VectorSizeBits(u32),

    #[error("a table needs at least one distinguishing vector")]
    NoVectors,

    #[error("required a table of {required} elements, supplied {supplied} elements")]
    TableShape { required: usize, supplied: usize },

    #[error("cannot map scores to weights at {0} bits of precision (need at least 2)")]
    PrecisionTooLow(u32),

    #[error("maximum score is {0}; cannot map scores to weights")]
    DegenerateScores(f64),

    #[error("score {0} cannot be quantized into a 64-bit weight")]
    ScoreOutOfRange(f64),

    #[error("the weight to rank up to must be > 0")]
    ZeroWeight,

    #[error("weight {0} is too large to rank")]
    WeightTooLarge(u64),

    #[error("bit window [{bit_start}, {bit_end}] does not define a full distinguishing vector of {vector_size_bits} bits within a {key_bits}-bit key")]
    BuilderWindow {
        bit_start: u32,
        bit_end: u32,
        vector_size_bits: u32,
        key_bits: usize,
    },

    #[error("bit window defines scores for {required} key candidates, but {supplied} scores were supplied")]
    BuilderScoreCount { required: u64, supplied: usize },
}

pub type Result<T> = std::result::Result<T, RankError>;
