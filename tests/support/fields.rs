#![allow(dead_code)]

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sweeptree::{AdjacencyMesh, MergeTree, VertexId};

/// Uniform random field in [0, 1).
pub fn random_field(n: usize, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0.0..1.0)).collect()
}

/// A random permutation of 0..n as scalars: every value distinct, so the
/// order carries no id tie-breaks.
pub fn distinct_field(n: usize, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut values: Vec<f32> = (0..n).map(|i| i as f32).collect();
    values.shuffle(&mut rng);
    values
}

/// Three mutually adjacent vertices.
pub fn triangle_mesh() -> AdjacencyMesh {
    AdjacencyMesh::from_edges(3, &[(0, 1), (1, 2), (0, 2)])
}

/// Two disjoint path components of `len` vertices each.
pub fn two_chains(len: usize) -> AdjacencyMesh {
    let mut edges = Vec::new();
    for i in 1..len {
        edges.push(((i - 1) as VertexId, i as VertexId));
        edges.push(((len + i - 1) as VertexId, (len + i) as VertexId));
    }
    AdjacencyMesh::from_edges(2 * len, &edges)
}

/// Canonical combinatorial form, independent of node and arc ids:
/// live arcs as (down vertex, up vertex, sorted region), sorted.
pub fn canonical_form(tree: &MergeTree) -> Vec<(VertexId, VertexId, Vec<VertexId>)> {
    let mut arcs: Vec<_> = tree
        .iter_arcs()
        .filter(|(_, a)| !a.is_merged())
        .map(|(_, a)| {
            let mut region = a.region().to_vec();
            region.sort_unstable();
            (
                tree.node(a.down_node()).vertex(),
                tree.node(a.up_node()).vertex(),
                region,
            )
        })
        .collect();
    arcs.sort();
    arcs
}

/// Every mesh vertex must be attributed exactly once: either it carries a
/// node or it lies in a single arc region.
pub fn assert_partition(tree: &MergeTree, n: usize) {
    let mut counts = vec![0u32; n];
    for (_, node) in tree.iter_nodes() {
        counts[node.vertex() as usize] += 1;
    }
    for (_, arc) in tree.iter_arcs() {
        if arc.is_merged() {
            continue;
        }
        for &v in arc.region() {
            counts[v as usize] += 1;
        }
    }
    for (v, &c) in counts.iter().enumerate() {
        assert_eq!(c, 1, "vertex {} attributed {} times\n{}", v, c, tree.format_tree());
    }
}

/// Vertices of the tree's leaves, sorted.
pub fn leaf_vertices(tree: &MergeTree) -> Vec<VertexId> {
    let mut verts: Vec<_> = tree
        .leaves()
        .iter()
        .map(|&l| tree.node(l).vertex())
        .collect();
    verts.sort_unstable();
    verts
}

/// Vertices of the tree's roots, sorted.
pub fn root_vertices(tree: &MergeTree) -> Vec<VertexId> {
    let mut verts: Vec<_> = tree
        .roots()
        .iter()
        .map(|&r| tree.node(r).vertex())
        .collect();
    verts.sort_unstable();
    verts
}
