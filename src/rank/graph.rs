use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::coordinate::GraphCoordinate;
use crate::weight::WeightTable;

/// Rolling storage for the path count traversal.
///
/// The full graph is `vector_count x vector_size x key_weight` nodes, but a
/// traversal only ever reads the row of the vector it just finished and
/// writes the row it is computing. Two rows of `key_weight` counts are
/// allocated once and swapped after every vector.
///
/// Every subkey of a vector accumulates into the same weight slot, so the
/// stored value at `(v, w)` is the sum over all subkey choices at `v`.
#[derive(Clone, Debug)]
pub struct PathCountGraph {
    vector_count: usize,
    key_weight: usize,
    current: Vec<BigUint>,
    previous: Vec<BigUint>,
    accept_value: BigUint,
    reject_value: BigUint,
}

impl PathCountGraph {
    pub fn new(vector_count: usize, key_weight: usize) -> Self {
        PathCountGraph {
            vector_count,
            key_weight,
            current: vec![BigUint::zero(); key_weight],
            previous: vec![BigUint::zero(); key_weight],
            accept_value: BigUint::one(),
            reject_value: BigUint::zero(),
        }
    }

    /// Value at `(vector 0, weight 0)`. Only meaningful once the traversal
    /// has visited every subkey of vector 0.
    pub fn first(&self) -> &BigUint {
        &self.current[0]
    }

    /// Where the edge taken by choosing `coord`'s subkey leads.
    pub fn right_child_index(&self, coord: GraphCoordinate, table: &WeightTable) -> GraphCoordinate {
        match coord {
            GraphCoordinate::Standard {
                vector_index,
                subkey_index,
                weight_index,
            } => {
                let extended =
                    (weight_index as u64).saturating_add(table.weight(vector_index, subkey_index));
                if extended >= self.key_weight as u64 {
                    GraphCoordinate::Reject
                } else if vector_index + 1 != self.vector_count {
                    GraphCoordinate::standard(vector_index + 1, 0, extended as usize)
                } else {
                    GraphCoordinate::Accept
                }
            }
            sentinel => sentinel,
        }
    }

    /// Value held by a child node, read from the finished row.
    pub fn right_child(&self, child: GraphCoordinate) -> &BigUint {
        node_value(child, &self.previous, &self.accept_value, &self.reject_value)
    }

    /// Add `value` into the slot for `coord`. Sentinels have no slot.
    pub fn set(&mut self, coord: GraphCoordinate, value: &BigUint) {
        add_to_slot(&mut self.current, coord, value);
    }

    /// Follow `coord`'s outgoing edge and accumulate the child's value.
    pub fn visit(&mut self, coord: GraphCoordinate, table: &WeightTable) {
        let child = self.right_child_index(coord, table);
        if child.is_reject() {
            return;
        }
        // Same as right_child + set, borrowing the two rows separately.
        let value = node_value(child, &self.previous, &self.accept_value, &self.reject_value);
        add_to_slot(&mut self.current, coord, value);
    }

    /// Finish a vector: the computed row becomes the previous row and the
    /// current row is cleared for reuse.
    pub fn rotate_buffers(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
        for value in self.current.iter_mut() {
            value.set_zero();
        }
    }

    pub fn previous_row(&self) -> &[BigUint] {
        &self.previous
    }

    pub(crate) fn into_previous_row(self) -> Vec<BigUint> {
        self.previous
    }
}

fn node_value<'a>(
    child: GraphCoordinate,
    previous: &'a [BigUint],
    accept_value: &'a BigUint,
    reject_value: &'a BigUint,
) -> &'a BigUint {
    match child {
        GraphCoordinate::Accept => accept_value,
        GraphCoordinate::Reject => reject_value,
        GraphCoordinate::Standard { weight_index, .. } => &previous[weight_index],
    }
}

fn add_to_slot(row: &mut [BigUint], coord: GraphCoordinate, value: &BigUint) {
    if let GraphCoordinate::Standard { weight_index, .. } = coord {
        row[weight_index] += value;
    }
}
