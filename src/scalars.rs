//! Scalar field access: a total order on vertices plus its two permutations.
//!
//! The sweep never reads raw scalar values. It only compares vertices through
//! the total order fixed at construction, so ties must already be broken here
//! (the `from_*` constructors break them by vertex id).

use crate::error::TreeError;
use crate::types::VertexId;

/// A scalar field reduced to its vertex order.
///
/// Holds the ascending permutation (`sorted_vertices`) and its inverse
/// (`mirror_vertices`): `mirror_vertices[v]` is the rank of `v` in the
/// ascending order. All comparisons reduce to integer rank compares, which
/// makes them total by construction.
#[derive(Debug, Clone)]
pub struct Scalars {
    sorted_vertices: Vec<VertexId>,
    mirror_vertices: Vec<u32>,
}

impl Scalars {
    /// Order `f32` values ascending, ties broken by vertex id.
    ///
    /// Uses `total_cmp`, so NaNs sort after all ordinary values instead of
    /// poisoning the order.
    pub fn from_f32(values: &[f32]) -> Self {
        let mut sorted: Vec<VertexId> = (0..values.len() as u32).collect();
        sorted.sort_unstable_by(|&a, &b| {
            values[a as usize]
                .total_cmp(&values[b as usize])
                .then(a.cmp(&b))
        });
        Self::from_permutation(sorted)
    }

    /// Order `f64` values ascending, ties broken by vertex id.
    pub fn from_f64(values: &[f64]) -> Self {
        let mut sorted: Vec<VertexId> = (0..values.len() as u32).collect();
        sorted.sort_unstable_by(|&a, &b| {
            values[a as usize]
                .total_cmp(&values[b as usize])
                .then(a.cmp(&b))
        });
        Self::from_permutation(sorted)
    }

    /// Order `Ord` values ascending, ties broken by vertex id.
    pub fn from_ord<T: Ord>(values: &[T]) -> Self {
        let mut sorted: Vec<VertexId> = (0..values.len() as u32).collect();
        sorted.sort_unstable_by(|&a, &b| {
            values[a as usize].cmp(&values[b as usize]).then(a.cmp(&b))
        });
        Self::from_permutation(sorted)
    }

    /// Use a caller-supplied ascending vertex order directly.
    ///
    /// `sorted` must be a permutation of `0..sorted.len()`; anything else is
    /// rejected so a broken caller-side sort fails loudly instead of
    /// producing a silently wrong tree.
    pub fn from_sorted(sorted: Vec<VertexId>) -> Result<Self, TreeError> {
        let len = sorted.len();
        let mut seen = vec![false; len];
        for &v in &sorted {
            let idx = v as usize;
            if idx >= len {
                return Err(TreeError::InvalidOrder {
                    len,
                    message: format!("vertex {} out of range", v),
                });
            }
            if seen[idx] {
                return Err(TreeError::InvalidOrder {
                    len,
                    message: format!("vertex {} appears twice", v),
                });
            }
            seen[idx] = true;
        }
        Ok(Self::from_permutation(sorted))
    }

    fn from_permutation(sorted: Vec<VertexId>) -> Self {
        let mut mirror = vec![0u32; sorted.len()];
        for (rank, &v) in sorted.iter().enumerate() {
            mirror[v as usize] = rank as u32;
        }
        Self {
            sorted_vertices: sorted,
            mirror_vertices: mirror,
        }
    }

    /// Number of vertices in the field.
    #[inline]
    pub fn size(&self) -> usize {
        self.sorted_vertices.len()
    }

    /// Strict "a below b" in the ascending order.
    #[inline]
    pub fn is_lower(&self, a: VertexId, b: VertexId) -> bool {
        self.mirror_vertices[a as usize] < self.mirror_vertices[b as usize]
    }

    /// Strict "a above b" in the ascending order.
    #[inline]
    pub fn is_higher(&self, a: VertexId, b: VertexId) -> bool {
        self.mirror_vertices[a as usize] > self.mirror_vertices[b as usize]
    }

    /// Vertices in ascending order.
    #[inline]
    pub fn sorted_vertices(&self) -> &[VertexId] {
        &self.sorted_vertices
    }

    /// Rank of each vertex in the ascending order (inverse permutation).
    #[inline]
    pub fn mirror_vertices(&self) -> &[u32] {
        &self.mirror_vertices
    }
}
