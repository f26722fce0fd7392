/// A node of the path count graph.
///
/// Standard nodes are addressed by `(vector, subkey, weight)`, zero-indexed.
/// The two sentinels terminate every path: `Accept` when a full key has
/// been assembled under the weight bound, `Reject` once the bound is met.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphCoordinate {
    Standard {
        vector_index: usize,
        subkey_index: usize,
        weight_index: usize,
    },
    Accept,
    Reject,
}

impl GraphCoordinate {
    pub fn standard(vector_index: usize, subkey_index: usize, weight_index: usize) -> Self {
        GraphCoordinate::Standard {
            vector_index,
            subkey_index,
            weight_index,
        }
    }

    pub fn is_reject(&self) -> bool {
        matches!(self, GraphCoordinate::Reject)
    }
}
