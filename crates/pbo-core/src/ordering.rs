//! Canonical bit ordering shared by clique table producers and consumers.
//!
//! A clique over variables `(v_0, .., v_{k-1})` stores its `2^k` energies in a
//! table indexed by a bitmask. Bit `i` of the mask is the label of `v_i`, the
//! variable at position `i` of the clique's own ordering. The term builder
//! encodes with [`assignment_labels`]; the reducer decodes with the same rule,
//! so these functions are the single source of truth for that layout.

use crate::Label;

/// Largest clique arity whose table index still fits the bitmask arithmetic.
pub const MAX_SUPPORTED_ORDER: usize = 30;

/// Number of table entries for a clique of the given arity.
pub fn table_len(arity: usize) -> usize {
    debug_assert!(arity <= MAX_SUPPORTED_ORDER);
    1usize << arity
}

/// Decodes `mask` into per-position labels, writing `out.len()` entries.
pub fn assignment_labels(mask: usize, out: &mut [Label]) {
    for (position, label) in out.iter_mut().enumerate() {
        *label = (mask >> position) & 1;
    }
}

/// Encodes per-position binary labels into their table index.
///
/// Any non-zero label counts as `1`.
pub fn assignment_index(labels: &[Label]) -> usize {
    labels
        .iter()
        .enumerate()
        .filter(|(_, &label)| label != 0)
        .fold(0, |mask, (position, _)| mask | (1 << position))
}

/// Returns whether position `position` is labelled `1` in `mask`.
pub fn bit_is_set(mask: usize, position: usize) -> bool {
    (mask >> position) & 1 == 1
}
