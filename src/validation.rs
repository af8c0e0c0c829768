//! Structural validation for merge trees.
//!
//! Checks the combinatorial invariants a correct build must satisfy: leaf
//! count matching the field's extrema, monotone arcs, and the segmentation
//! partition (every vertex on exactly one node or in exactly one region).
//! Useful for debugging, testing, and catching order inconsistencies in
//! caller-supplied comparators.

use crate::mesh::Mesh;
use crate::scalars::Scalars;
use crate::tree::MergeTree;
use crate::types::{Corresponding, NodeId, VertexId};
use rustc_hash::FxHashSet;

/// Detailed validation report for a merge tree.
///
/// Produced by [`validate`]; expects a tree built with segmentation.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub num_nodes: usize,
    pub num_arcs: usize,
    pub num_leaves: usize,
    /// Local sweep minima counted directly on the mesh.
    pub expected_leaves: usize,
    pub num_roots: usize,

    /// Arcs whose down node is not below their up node in sweep order.
    pub non_monotone_arcs: usize,
    /// Vertices on no node and in no region.
    pub unattributed_vertices: usize,
    /// Vertices attributed more than once across nodes and regions.
    pub multiply_attributed_vertices: usize,
    /// Nodes whose vertex does not map back to them.
    pub mismatched_node_vertices: usize,
    /// Non-leaf, non-root nodes with fewer than two incident arcs.
    pub low_degree_internal_nodes: usize,
}

impl ValidationReport {
    /// True when every invariant holds exactly.
    pub fn is_valid(&self) -> bool {
        self.num_leaves == self.expected_leaves
            && self.non_monotone_arcs == 0
            && self.unattributed_vertices == 0
            && self.multiply_attributed_vertices == 0
            && self.mismatched_node_vertices == 0
            && self.low_degree_internal_nodes == 0
    }

    /// Format a summary of any issues found.
    pub fn summary(&self) -> String {
        if self.is_valid() {
            return "valid".to_string();
        }
        let mut issues = Vec::new();
        if self.num_leaves != self.expected_leaves {
            issues.push(format!(
                "{} leaves (expected {})",
                self.num_leaves, self.expected_leaves
            ));
        }
        if self.non_monotone_arcs > 0 {
            issues.push(format!("{} non-monotone arcs", self.non_monotone_arcs));
        }
        if self.unattributed_vertices > 0 {
            issues.push(format!(
                "{} unattributed vertices",
                self.unattributed_vertices
            ));
        }
        if self.multiply_attributed_vertices > 0 {
            issues.push(format!(
                "{} multiply attributed vertices",
                self.multiply_attributed_vertices
            ));
        }
        if self.mismatched_node_vertices > 0 {
            issues.push(format!(
                "{} mismatched node vertices",
                self.mismatched_node_vertices
            ));
        }
        if self.low_degree_internal_nodes > 0 {
            issues.push(format!(
                "{} low-degree internal nodes",
                self.low_degree_internal_nodes
            ));
        }
        issues.join(", ")
    }
}

/// Validate a tree built (with segmentation) over `mesh` and `scalars`.
pub fn validate<M: Mesh>(tree: &MergeTree, mesh: &M, scalars: &Scalars) -> ValidationReport {
    let n = scalars.size();

    // Count the field's local sweep minima directly.
    let mut expected_leaves = 0usize;
    for v in 0..n as VertexId {
        let nb = mesh.neighbor_count(v);
        let has_lower = (0..nb).any(|i| tree.vert_lower(scalars, mesh.neighbor(v, i), v));
        if !has_lower {
            expected_leaves += 1;
        }
    }

    // Attribution counts over node vertices and live arc regions.
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
    let unattributed_vertices = counts.iter().filter(|&&c| c == 0).count();
    let multiply_attributed_vertices = counts.iter().filter(|&&c| c > 1).count();

    let mut non_monotone_arcs = 0usize;
    for (_, arc) in tree.iter_arcs() {
        if arc.is_merged() {
            continue;
        }
        let down = tree.node(arc.down_node()).vertex();
        let up = tree.node(arc.up_node()).vertex();
        if down != up && !tree.vert_lower(scalars, down, up) {
            non_monotone_arcs += 1;
        }
    }

    let mut mismatched_node_vertices = 0usize;
    for (id, node) in tree.iter_nodes() {
        match tree.corresponding(node.vertex()) {
            Corresponding::Node(back) if back == id => {}
            _ => mismatched_node_vertices += 1,
        }
    }

    let leaf_set: FxHashSet<NodeId> = tree.leaves().iter().copied().collect();
    let root_set: FxHashSet<NodeId> = tree.roots().iter().copied().collect();
    let mut low_degree_internal_nodes = 0usize;
    for (id, node) in tree.iter_nodes() {
        if leaf_set.contains(&id) || root_set.contains(&id) {
            continue;
        }
        if node.up_arcs().len() + node.down_arcs().len() < 2 {
            low_degree_internal_nodes += 1;
        }
    }

    ValidationReport {
        num_nodes: tree.num_nodes(),
        num_arcs: tree.num_arcs(),
        num_leaves: tree.leaves().len(),
        expected_leaves,
        num_roots: tree.roots().len(),
        non_monotone_arcs,
        unattributed_vertices,
        multiply_attributed_vertices,
        mismatched_node_vertices,
        low_degree_internal_nodes,
    }
}
