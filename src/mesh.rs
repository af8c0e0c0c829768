//! Mesh access for the sweep: vertex neighborhoods only.

use crate::types::VertexId;

/// Neighborhood queries on a simplicial mesh.
///
/// The sweep only ever asks for the 1-ring of a vertex; no edges, triangles
/// or global topology are required. Implementations must be consistent
/// (if `b` is a neighbor of `a` then `a` is a neighbor of `b`) and stable
/// for the duration of a build.
pub trait Mesh: Sync {
    /// Number of neighbors of `v`.
    fn neighbor_count(&self, v: VertexId) -> usize;

    /// The `i`-th neighbor of `v`, `i < neighbor_count(v)`.
    fn neighbor(&self, v: VertexId, i: usize) -> VertexId;
}

/// Flat CSR adjacency container implementing [`Mesh`].
#[derive(Debug, Clone)]
pub struct AdjacencyMesh {
    offsets: Vec<u32>,
    neighbors: Vec<VertexId>,
}

impl AdjacencyMesh {
    /// Build from an undirected edge list over `num_vertices` vertices.
    ///
    /// Edges are symmetrized and deduplicated; self-loops are dropped.
    pub fn from_edges(num_vertices: usize, edges: &[(VertexId, VertexId)]) -> Self {
        let mut adjacency: Vec<Vec<VertexId>> = vec![Vec::new(); num_vertices];
        for &(a, b) in edges {
            if a == b {
                continue;
            }
            debug_assert!(
                (a as usize) < num_vertices && (b as usize) < num_vertices,
                "edge ({}, {}) out of range for {} vertices",
                a,
                b,
                num_vertices
            );
            adjacency[a as usize].push(b);
            adjacency[b as usize].push(a);
        }

        let mut offsets = Vec::with_capacity(num_vertices + 1);
        let mut neighbors = Vec::with_capacity(edges.len() * 2);
        offsets.push(0);
        for list in &mut adjacency {
            list.sort_unstable();
            list.dedup();
            neighbors.extend_from_slice(list);
            offsets.push(neighbors.len() as u32);
        }

        Self { offsets, neighbors }
    }

    /// A path graph: vertices `0..n` chained in index order.
    pub fn path(n: usize) -> Self {
        let edges: Vec<(VertexId, VertexId)> = (1..n)
            .map(|i| ((i - 1) as VertexId, i as VertexId))
            .collect();
        Self::from_edges(n, &edges)
    }

    /// A 4-connected `width` x `height` grid, vertex `r * width + c`.
    pub fn grid_2d(width: usize, height: usize) -> Self {
        let mut edges = Vec::with_capacity(2 * width * height);
        for r in 0..height {
            for c in 0..width {
                let v = (r * width + c) as VertexId;
                if c + 1 < width {
                    edges.push((v, v + 1));
                }
                if r + 1 < height {
                    edges.push((v, v + width as VertexId));
                }
            }
        }
        Self::from_edges(width * height, &edges)
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }
}

impl Mesh for AdjacencyMesh {
    #[inline]
    fn neighbor_count(&self, v: VertexId) -> usize {
        let v = v as usize;
        (self.offsets[v + 1] - self.offsets[v]) as usize
    }

    #[inline]
    fn neighbor(&self, v: VertexId, i: usize) -> VertexId {
        self.neighbors[self.offsets[v as usize] as usize + i]
    }
}
