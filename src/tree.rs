//! Merge tree storage and access.
//!
//! A [`MergeTree`] is the output of a build: flat arenas of nodes and
//! super-arcs referencing each other by id, the leaf and root lists, the
//! vertex correspondence map and, when requested, one segmentation region per
//! arc. It also carries the editing operations a contour tree assembler needs
//! (node insertion, arc merging, node removal).

use crate::scalars::Scalars;
use crate::sweep::log_enabled;
use crate::types::{ArcId, Corresponding, NodeId, TreeType, VertexId, NULL_ARC, NULL_NODE};
use std::fmt::Write as _;

/// An internal vertex of the tree: a leaf, a saddle, or a root.
#[derive(Debug, Clone)]
pub struct Node {
    vertex: VertexId,
    origin: VertexId,
    up_arcs: Vec<ArcId>,
    down_arcs: Vec<ArcId>,
}

impl Node {
    pub(crate) fn new(
        vertex: VertexId,
        origin: VertexId,
        up_arcs: Vec<ArcId>,
        down_arcs: Vec<ArcId>,
    ) -> Self {
        Self {
            vertex,
            origin,
            up_arcs,
            down_arcs,
        }
    }

    /// Mesh vertex this node sits on.
    #[inline]
    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    /// Leaf from which the containing component emanates.
    #[inline]
    pub fn origin(&self) -> VertexId {
        self.origin
    }

    /// Arcs leaving this node upward in sweep order.
    #[inline]
    pub fn up_arcs(&self) -> &[ArcId] {
        &self.up_arcs
    }

    /// Arcs arriving from below in sweep order.
    #[inline]
    pub fn down_arcs(&self) -> &[ArcId] {
        &self.down_arcs
    }

    /// True for a sweep extremum (no incoming arc).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.down_arcs.is_empty()
    }

    /// True for a component top (no outgoing arc).
    #[inline]
    pub fn is_root(&self) -> bool {
        self.up_arcs.is_empty()
    }
}

/// A directed tree edge from a down node to an up node, carrying its
/// segmentation region.
#[derive(Debug, Clone)]
pub struct SuperArc {
    down_node: NodeId,
    up_node: NodeId,
    last_visited: VertexId,
    nb_seen: i32,
    replacant: ArcId,
    merged: bool,
    region: Vec<VertexId>,
}

impl SuperArc {
    pub(crate) fn new(
        down_node: NodeId,
        up_node: NodeId,
        last_visited: VertexId,
        nb_seen: i32,
        region: Vec<VertexId>,
    ) -> Self {
        Self {
            down_node,
            up_node,
            last_visited,
            nb_seen,
            replacant: NULL_ARC,
            merged: false,
            region,
        }
    }

    #[inline]
    pub fn down_node(&self) -> NodeId {
        self.down_node
    }

    #[inline]
    pub fn up_node(&self) -> NodeId {
        self.up_node
    }

    /// Highest vertex seen along this arc during the sweep.
    #[inline]
    pub fn last_visited(&self) -> VertexId {
        self.last_visited
    }

    /// Regular vertices attributed to this arc, in sweep order.
    #[inline]
    pub fn region(&self) -> &[VertexId] {
        &self.region
    }

    #[inline]
    pub fn region_size(&self) -> usize {
        self.region.len()
    }

    /// Arc that replaced this one after a merge, if any.
    #[inline]
    pub fn replacant(&self) -> Option<ArcId> {
        (self.replacant != NULL_ARC).then_some(self.replacant)
    }

    /// True once this arc has been folded into another by [`MergeTree::merge_arc`].
    #[inline]
    pub fn is_merged(&self) -> bool {
        self.merged
    }

    /// Vertices counted on this arc during the sweep (region size plus one).
    #[inline]
    pub fn visit_count(&self) -> i32 {
        self.nb_seen
    }
}

/// A merge tree (join or split) over a scalar field.
#[derive(Debug, Clone)]
pub struct MergeTree {
    tree_type: TreeType,
    nodes: Vec<Node>,
    arcs: Vec<SuperArc>,
    leaves: Vec<NodeId>,
    roots: Vec<NodeId>,
    vert2tree: Vec<Corresponding>,
}

impl MergeTree {
    pub(crate) fn from_parts(
        tree_type: TreeType,
        nodes: Vec<Node>,
        arcs: Vec<SuperArc>,
        leaves: Vec<NodeId>,
        roots: Vec<NodeId>,
        vert2tree: Vec<Corresponding>,
    ) -> Self {
        Self {
            tree_type,
            nodes,
            arcs,
            leaves,
            roots,
            vert2tree,
        }
    }

    /// A tree with no nodes and no arcs (empty input).
    pub(crate) fn empty(tree_type: TreeType) -> Self {
        Self {
            tree_type,
            nodes: Vec::new(),
            arcs: Vec::new(),
            leaves: Vec::new(),
            roots: Vec::new(),
            vert2tree: Vec::new(),
        }
    }

    #[inline]
    pub fn tree_type(&self) -> TreeType {
        self.tree_type
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn arc(&self, id: ArcId) -> &SuperArc {
        &self.arcs[id as usize]
    }

    /// Node ids of the sweep extrema, in launch order.
    #[inline]
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// Node ids closing each connected component.
    #[inline]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as NodeId, n))
    }

    pub fn iter_arcs(&self) -> impl Iterator<Item = (ArcId, &SuperArc)> {
        self.arcs.iter().enumerate().map(|(i, a)| (i as ArcId, a))
    }

    /// What `v` corresponds to in the tree.
    #[inline]
    pub fn corresponding(&self, v: VertexId) -> Corresponding {
        self.vert2tree[v as usize]
    }

    /// Sweep-order comparator for this tree type.
    #[inline]
    pub fn vert_lower(&self, scalars: &Scalars, a: VertexId, b: VertexId) -> bool {
        match self.tree_type {
            TreeType::Split => scalars.is_higher(a, b),
            _ => scalars.is_lower(a, b),
        }
    }

    /// Rank of a vertex in this tree's sweep order.
    #[inline]
    fn sweep_rank(&self, scalars: &Scalars, v: VertexId) -> u32 {
        let rank = scalars.mirror_vertices()[v as usize];
        match self.tree_type {
            TreeType::Split => u32::MAX - rank,
            _ => rank,
        }
    }

    /// Node ids sorted by the sweep order of their vertices.
    pub fn sorted_nodes(&self, scalars: &Scalars) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = (0..self.nodes.len() as NodeId).collect();
        ids.sort_unstable_by_key(|&a| self.sweep_rank(scalars, self.nodes[a as usize].vertex));
        ids
    }

    // ------------------------------------------------------------------
    // Editing operations (contour tree assembly)
    // ------------------------------------------------------------------

    fn make_node_at(&mut self, vertex: VertexId, origin: VertexId) -> NodeId {
        if let Corresponding::Node(n) = self.vert2tree[vertex as usize] {
            return n;
        }
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::new(vertex, origin, Vec::new(), Vec::new()));
        self.vert2tree[vertex as usize] = Corresponding::Node(id);
        id
    }

    /// Split an arc at `vertex`, inserting a node there.
    ///
    /// `vertex` must currently correspond to an arc region (or to a node whose
    /// up arc was superseded, in which case the replacant arc is split). The
    /// existing arc keeps the portion below the new node; a new arc from the
    /// new node to the old up node takes the portion above. Returns the new
    /// arc, or `None` when the vertex corresponds to nothing splittable.
    pub fn insert_node(
        &mut self,
        vertex: VertexId,
        scalars: &Scalars,
        with_segmentation: bool,
    ) -> Option<ArcId> {
        // A vertex already promoted to a node may sit on a superseded arc;
        // refresh its correspondence through the replacant chain first.
        if let Corresponding::Node(my) = self.vert2tree[vertex as usize] {
            let up0 = *self.nodes[my as usize].up_arcs.first()?;
            let arc = &self.arcs[up0 as usize];
            let live = if arc.replacant == NULL_ARC {
                up0
            } else {
                arc.replacant
            };
            self.vert2tree[vertex as usize] = Corresponding::Arc(live);
        }

        let current_arc = match self.vert2tree[vertex as usize] {
            Corresponding::Arc(a) => a,
            _ => {
                if log_enabled() {
                    eprintln!("[sweeptree] insert_node on unattributed vertex {}", vertex);
                }
                return None;
            }
        };

        let up_node = self.arcs[current_arc as usize].up_node;
        let origin = self.nodes[self.arcs[current_arc as usize].down_node as usize].origin;
        let new_node = self.make_node_at(vertex, origin);

        // New arc spans the upper part; the split arc is retargeted below it.
        let new_arc = self.arcs.len() as ArcId;
        self.arcs.push(SuperArc::new(
            new_node,
            up_node,
            self.arcs[current_arc as usize].last_visited,
            0,
            Vec::new(),
        ));
        self.nodes[new_node as usize].up_arcs.push(new_arc);
        self.nodes[up_node as usize].down_arcs.push(new_arc);

        self.arcs[current_arc as usize].up_node = new_node;
        self.nodes[up_node as usize]
            .down_arcs
            .retain(|&a| a != current_arc);
        self.nodes[new_node as usize].down_arcs.push(current_arc);

        if with_segmentation {
            // Region is kept in sweep order; cut it at the inserted vertex.
            let split_idx = {
                let region = &self.arcs[current_arc as usize].region;
                region.partition_point(|&u| self.vert_lower(scalars, u, vertex))
            };
            let mut upper = self.arcs[current_arc as usize].region.split_off(split_idx);
            if upper.first() == Some(&vertex) {
                upper.remove(0);
            }
            for &u in &upper {
                self.vert2tree[u as usize] = Corresponding::Arc(new_arc);
            }
            self.arcs[new_arc as usize].region = upper;
        }

        Some(new_arc)
    }

    /// Fold `sa` into `recept`: the region moves over, `sa` records its
    /// replacant and is marked merged. With `change_connectivity` the arc is
    /// also detached from its endpoints' adjacency lists.
    pub fn merge_arc(
        &mut self,
        sa: ArcId,
        recept: ArcId,
        change_connectivity: bool,
        scalars: &Scalars,
    ) {
        debug_assert!(
            (sa as usize) < self.arcs.len() && (recept as usize) < self.arcs.len(),
            "merge_arc out of range: {} -> {}",
            sa,
            recept
        );
        if sa == recept {
            return;
        }

        let region = std::mem::take(&mut self.arcs[sa as usize].region);
        for &v in &region {
            self.vert2tree[v as usize] = Corresponding::Arc(recept);
        }
        self.arcs[recept as usize].region.extend(region);
        let mut recept_region = std::mem::take(&mut self.arcs[recept as usize].region);
        recept_region.sort_unstable_by_key(|&v| self.sweep_rank(scalars, v));
        self.arcs[recept as usize].region = recept_region;

        self.arcs[sa as usize].replacant = recept;
        self.arcs[sa as usize].merged = true;

        if change_connectivity {
            let up = self.arcs[sa as usize].up_node;
            let down = self.arcs[sa as usize].down_node;
            self.nodes[up as usize].down_arcs.retain(|&a| a != sa);
            self.nodes[down as usize].up_arcs.retain(|&a| a != sa);
        }
    }

    /// Remove a node of degree at most two, reconnecting its arcs.
    ///
    /// A root with several children cannot be removed; the call is logged and
    /// ignored. Removing a pass-through node concatenates the two arc
    /// regions onto the surviving down arc.
    pub fn del_node(&mut self, node: NodeId) {
        let (nb_up, nb_down) = {
            let n = &self.nodes[node as usize];
            (n.up_arcs.len(), n.down_arcs.len())
        };

        if nb_up == 0 {
            // Root.
            if nb_down != 1 {
                if log_enabled() {
                    eprintln!(
                        "[sweeptree] del_node keeps root {} with {} down arcs",
                        node, nb_down
                    );
                }
                return;
            }
            let down_arc = self.nodes[node as usize].down_arcs[0];
            let down_node = self.arcs[down_arc as usize].down_node;
            self.nodes[down_node as usize]
                .up_arcs
                .retain(|&a| a != down_arc);
            self.nodes[node as usize].down_arcs.clear();
            return;
        }

        if nb_down < 2 {
            let up_arc = self.nodes[node as usize].up_arcs[0];
            let up_node = self.arcs[up_arc as usize].up_node;
            self.nodes[up_node as usize]
                .down_arcs
                .retain(|&a| a != up_arc);
            self.nodes[node as usize].up_arcs.clear();

            if nb_down == 1 {
                // Reconnect the down arc past the removed node.
                let down_arc = self.nodes[node as usize].down_arcs[0];
                self.arcs[down_arc as usize].up_node = up_node;
                self.nodes[up_node as usize].down_arcs.push(down_arc);
                self.nodes[node as usize].down_arcs.clear();

                let upper_region = std::mem::take(&mut self.arcs[up_arc as usize].region);
                for &v in &upper_region {
                    self.vert2tree[v as usize] = Corresponding::Arc(down_arc);
                }
                self.arcs[down_arc as usize].region.extend(upper_region);
            }
            return;
        }

        if log_enabled() {
            eprintln!(
                "[sweeptree] del_node keeps node {} with {} down arcs",
                node, nb_down
            );
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// One-line description of an arc: endpoints and region size.
    pub fn format_arc(&self, a: ArcId) -> String {
        let arc = &self.arcs[a as usize];
        let down = self.nodes[arc.down_node as usize].vertex;
        let up = if arc.up_node == NULL_NODE {
            "open".to_string()
        } else {
            self.nodes[arc.up_node as usize].vertex.to_string()
        };
        format!("{} : {} -- {}  segm #{}", a, down, up, arc.region.len())
    }

    /// One-line description of a node: vertex and adjacent arc ids.
    pub fn format_node(&self, n: NodeId) -> String {
        let node = &self.nodes[n as usize];
        let mut out = format!("{} : ({}) \\", n, node.vertex);
        for &d in &node.down_arcs {
            let _ = write!(out, " +{}", d);
        }
        out.push_str(" /");
        for &u in &node.up_arcs {
            let _ = write!(out, " +{}", u);
        }
        out
    }

    /// Multi-line dump of the whole tree, for debugging and test output.
    pub fn format_tree(&self) -> String {
        let mut out = String::new();
        out.push_str("Nodes----------\n");
        for n in 0..self.nodes.len() as NodeId {
            let _ = writeln!(out, "{}", self.format_node(n));
        }
        out.push_str("Arcs-----------\n");
        for a in 0..self.arcs.len() as ArcId {
            let _ = writeln!(out, "{}", self.format_arc(a));
        }
        out.push_str("Leaves:");
        for &l in &self.leaves {
            let _ = write!(out, " {}", self.nodes[l as usize].vertex);
        }
        out.push_str("\nRoots:");
        for &r in &self.roots {
            let _ = write!(out, " {}", self.nodes[r as usize].vertex);
        }
        out.push('\n');
        out
    }
}
