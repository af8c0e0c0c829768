//! Shared tree storage for the concurrent build phases.
//!
//! Nodes and super-arcs live in preallocated slabs whose slots are reserved
//! by an atomic fetch-and-add; after reservation only the owning task writes
//! a slot's fields. Vertex-indexed maps (correspondence, union-find handle,
//! propagation mark, valence, opened-saddle bit) are flat atomic arrays.
//!
//! Node adjacency lists are the one place a plain atomic does not fit; they
//! sit behind per-node mutexes that the arbitration protocol keeps
//! single-owner (so uncontended) during the sweep.

use crate::sweep::log_enabled;
use crate::sweep::uf::NULL_UF;
use crate::tree::{MergeTree, Node, SuperArc};
use crate::types::{
    ArcId, Corresponding, NodeId, TreeType, VertexId, NULL_ARC, NULL_NODE, NULL_VERTEX,
};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct NodeLinks {
    up: Vec<ArcId>,
    down: Vec<ArcId>,
}

struct NodeSlot {
    vertex: AtomicU32,
    origin: AtomicU32,
    links: Mutex<NodeLinks>,
}

impl NodeSlot {
    fn empty() -> Self {
        Self {
            vertex: AtomicU32::new(NULL_VERTEX),
            origin: AtomicU32::new(NULL_VERTEX),
            links: Mutex::new(NodeLinks::default()),
        }
    }
}

struct ArcSlot {
    down_node: AtomicU32,
    up_node: AtomicU32,
    last_visited: AtomicU32,
    nb_seen: AtomicI32,
}

impl ArcSlot {
    fn empty() -> Self {
        Self {
            down_node: AtomicU32::new(NULL_NODE),
            up_node: AtomicU32::new(NULL_NODE),
            last_visited: AtomicU32::new(NULL_VERTEX),
            nb_seen: AtomicI32::new(0),
        }
    }
}

pub(crate) struct TreeData {
    nodes: Vec<NodeSlot>,
    nodes_len: AtomicUsize,
    arcs: Vec<ArcSlot>,
    arcs_len: AtomicUsize,
    roots: Vec<AtomicU32>,
    roots_len: AtomicUsize,
    leaves: Vec<NodeId>,
    vert2tree: Vec<AtomicI64>,
    ufs: Vec<AtomicU32>,
    propagation: Vec<AtomicU32>,
    valences: Vec<AtomicI32>,
    opened_nodes: Vec<AtomicBool>,
    active_tasks: AtomicUsize,
}

impl TreeData {
    /// Vertex-indexed maps only; the node/arc slabs are sized once the leaf
    /// count is known (see [`TreeData::alloc_skeleton`]).
    pub fn new(num_vertices: usize) -> Self {
        Self {
            nodes: Vec::new(),
            nodes_len: AtomicUsize::new(0),
            arcs: Vec::new(),
            arcs_len: AtomicUsize::new(0),
            roots: Vec::new(),
            roots_len: AtomicUsize::new(0),
            leaves: Vec::new(),
            vert2tree: (0..num_vertices).map(|_| AtomicI64::new(0)).collect(),
            ufs: (0..num_vertices).map(|_| AtomicU32::new(NULL_UF)).collect(),
            propagation: (0..num_vertices).map(|_| AtomicU32::new(NULL_UF)).collect(),
            valences: (0..num_vertices).map(|_| AtomicI32::new(0)).collect(),
            opened_nodes: (0..num_vertices).map(|_| AtomicBool::new(false)).collect(),
            active_tasks: AtomicUsize::new(0),
        }
    }

    /// Size the slabs for a sweep started from `nb_leaves` extrema.
    ///
    /// A merge tree over L leaves has at most 2L + 1 nodes and super-arcs
    /// (leaves, one saddle per fusion, one root per component, plus the
    /// synthetic trunk root).
    pub fn alloc_skeleton(&mut self, nb_leaves: usize) {
        let cap = 2 * nb_leaves + 1;
        self.nodes = (0..cap).map(|_| NodeSlot::empty()).collect();
        self.arcs = (0..cap).map(|_| ArcSlot::empty()).collect();
        self.roots = (0..nb_leaves + 1).map(|_| AtomicU32::new(NULL_NODE)).collect();
    }

    /// After precompute, every node is a leaf; the leaves list is the
    /// identity over the node range.
    pub fn fill_leaves(&mut self) {
        let nb = self.nodes_len.load(Ordering::Acquire);
        self.leaves = (0..nb as NodeId).collect();
    }

    #[inline]
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes_len.load(Ordering::Acquire)
    }

    #[inline]
    pub fn num_arcs(&self) -> usize {
        self.arcs_len.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Create (or return the existing) node on `vertex`.
    ///
    /// Callers never race on the same vertex: node creation happens in
    /// precompute (distinct chunks), at a saddle (single winning task) or in
    /// the sequential trunk.
    pub fn make_node(&self, vertex: VertexId, origin: VertexId) -> NodeId {
        debug_assert!(
            (vertex as usize) < self.vert2tree.len(),
            "make_node on out-of-range vertex {}",
            vertex
        );
        if let Corresponding::Node(n) = self.corresponding(vertex) {
            return n;
        }
        let id = self.nodes_len.fetch_add(1, Ordering::AcqRel);
        debug_assert!(id < self.nodes.len(), "node slab exhausted at {}", id);
        let slot = &self.nodes[id];
        slot.vertex.store(vertex, Ordering::Release);
        slot.origin.store(origin, Ordering::Release);
        self.set_corresponding_node(vertex, id as NodeId);
        id as NodeId
    }

    #[inline]
    pub fn node_vertex(&self, n: NodeId) -> VertexId {
        self.nodes[n as usize].vertex.load(Ordering::Acquire)
    }

    /// First up arc of a node. Trunk backbone nodes have exactly one.
    pub fn first_up_arc(&self, n: NodeId) -> ArcId {
        let links = self.nodes[n as usize].links.lock().expect("node links poisoned");
        debug_assert!(!links.up.is_empty(), "node {} has no up arc", n);
        links.up[0]
    }

    fn add_up_arc(&self, n: NodeId, a: ArcId) {
        self.nodes[n as usize]
            .links
            .lock()
            .expect("node links poisoned")
            .up
            .push(a);
    }

    fn add_down_arc(&self, n: NodeId, a: ArcId) {
        self.nodes[n as usize]
            .links
            .lock()
            .expect("node links poisoned")
            .down
            .push(a);
    }

    // ------------------------------------------------------------------
    // Super-arcs
    // ------------------------------------------------------------------

    /// Open a new arc growing up from `down`; its up node is not known yet.
    pub fn open_super_arc(&self, down: NodeId) -> ArcId {
        if (down as usize) >= self.num_nodes() {
            if log_enabled() {
                eprintln!("[sweeptree] open_super_arc on inexistent node {}", down);
            }
            debug_assert!(false, "open_super_arc on inexistent node {}", down);
            return NULL_ARC;
        }
        let id = self.arcs_len.fetch_add(1, Ordering::AcqRel);
        debug_assert!(id < self.arcs.len(), "arc slab exhausted at {}", id);
        self.arcs[id].down_node.store(down, Ordering::Release);
        self.add_up_arc(down, id as ArcId);
        id as ArcId
    }

    /// Create an arc with both endpoints known (trunk chain).
    pub fn make_super_arc(&self, down: NodeId, up: NodeId) -> ArcId {
        let id = self.arcs_len.fetch_add(1, Ordering::AcqRel);
        debug_assert!(id < self.arcs.len(), "arc slab exhausted at {}", id);
        self.arcs[id].down_node.store(down, Ordering::Release);
        self.arcs[id].up_node.store(up, Ordering::Release);
        self.add_up_arc(down, id as ArcId);
        self.add_down_arc(up, id as ArcId);
        id as ArcId
    }

    /// Close an open arc on `up`.
    pub fn close_super_arc(&self, a: ArcId, up: NodeId) {
        if (a as usize) >= self.num_arcs() || (up as usize) >= self.num_nodes() {
            if log_enabled() {
                eprintln!("[sweeptree] close_super_arc({}, {}) out of range", a, up);
            }
            debug_assert!(false, "close_super_arc({}, {}) out of range", a, up);
            return;
        }
        self.arcs[a as usize].up_node.store(up, Ordering::Release);
        self.add_down_arc(up, a);
    }

    /// Record a visited vertex on an arc: remembers it as the highest seen
    /// and bumps the visit count used later as the segment size.
    pub fn set_last_visited(&self, a: ArcId, v: VertexId) {
        let slot = &self.arcs[a as usize];
        slot.last_visited.store(v, Ordering::Release);
        slot.nb_seen.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub fn last_visited(&self, a: ArcId) -> VertexId {
        self.arcs[a as usize].last_visited.load(Ordering::Acquire)
    }

    /// Flush an accumulated trunk visit count onto an arc.
    #[inline]
    pub fn add_visits(&self, a: ArcId, count: i32) {
        if count != 0 {
            self.arcs[a as usize].nb_seen.fetch_add(count, Ordering::AcqRel);
        }
    }

    /// The root vertex closes an arc but becomes a node, not a region vertex.
    #[inline]
    pub fn decr_nb_seen(&self, a: ArcId) {
        self.arcs[a as usize].nb_seen.fetch_sub(1, Ordering::AcqRel);
    }

    #[inline]
    pub fn nb_seen(&self, a: ArcId) -> i32 {
        self.arcs[a as usize].nb_seen.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Vertex-indexed maps
    // ------------------------------------------------------------------

    #[inline]
    pub fn corresponding(&self, v: VertexId) -> Corresponding {
        Corresponding::decode(self.vert2tree[v as usize].load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_corresponding_arc(&self, v: VertexId, a: ArcId) {
        self.vert2tree[v as usize].store(Corresponding::Arc(a).encode(), Ordering::Release);
    }

    #[inline]
    fn set_corresponding_node(&self, v: VertexId, n: NodeId) {
        self.vert2tree[v as usize].store(Corresponding::Node(n).encode(), Ordering::Release);
    }

    /// Node sitting on `v`. Only call when `v` is known to be a node vertex.
    pub fn corresponding_node_id(&self, v: VertexId) -> NodeId {
        match self.corresponding(v) {
            Corresponding::Node(n) => n,
            other => {
                debug_assert!(false, "vertex {} is not a node ({:?})", v, other);
                NULL_NODE
            }
        }
    }

    #[inline]
    pub fn uf_of(&self, v: VertexId) -> u32 {
        self.ufs[v as usize].load(Ordering::SeqCst)
    }

    /// Publish the class owning `v`. Sequentially consistent so that a front
    /// observing the handle also observes every write made before it.
    #[inline]
    pub fn publish_uf(&self, v: VertexId, cell: u32) {
        self.ufs[v as usize].store(cell, Ordering::SeqCst);
    }

    #[inline]
    pub fn propagation_of(&self, v: VertexId) -> u32 {
        self.propagation[v as usize].load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_propagation(&self, v: VertexId, cell: u32) {
        self.propagation[v as usize].store(cell, Ordering::Release);
    }

    #[inline]
    pub fn set_valence(&self, v: VertexId, val: i32) {
        self.valences[v as usize].store(val, Ordering::Relaxed);
    }

    /// Atomic capture-and-subtract; returns the pre-decrement value, which is
    /// what decides the last arrival at a vertex.
    #[inline]
    pub fn valence_sub(&self, v: VertexId, decr: i32) -> i32 {
        self.valences[v as usize].fetch_sub(decr, Ordering::SeqCst)
    }

    #[inline]
    pub fn set_opened(&self, v: VertexId, opened: bool) {
        self.opened_nodes[v as usize].store(opened, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_opened(&self, v: VertexId) -> bool {
        self.opened_nodes[v as usize].load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Task accounting and roots
    // ------------------------------------------------------------------

    #[inline]
    pub fn set_active_tasks(&self, n: usize) {
        self.active_tasks.store(n, Ordering::SeqCst);
    }

    #[inline]
    pub fn active_tasks(&self) -> usize {
        self.active_tasks.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn task_done(&self) {
        self.active_tasks.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn push_root(&self, n: NodeId) {
        let id = self.roots_len.fetch_add(1, Ordering::AcqRel);
        debug_assert!(id < self.roots.len(), "roots slab exhausted at {}", id);
        self.roots[id].store(n, Ordering::Release);
    }

    /// Sequential-phase check used by the trunk to avoid double-recording.
    pub fn has_root(&self, n: NodeId) -> bool {
        let len = self.roots_len.load(Ordering::Acquire);
        self.roots[..len]
            .iter()
            .any(|r| r.load(Ordering::Acquire) == n)
    }

    // ------------------------------------------------------------------
    // Final assembly
    // ------------------------------------------------------------------

    /// Turn the shared build state into a plain [`MergeTree`].
    ///
    /// `regions` holds one sweep-sorted vertex list per arc (empty lists when
    /// segmentation was skipped).
    pub fn finalize(self, tree_type: TreeType, mut regions: Vec<Vec<VertexId>>) -> MergeTree {
        let nb_nodes = self.nodes_len.load(Ordering::Acquire);
        let nb_arcs = self.arcs_len.load(Ordering::Acquire);
        regions.resize(nb_arcs, Vec::new());

        let mut nodes = Vec::with_capacity(nb_nodes);
        for slot in self.nodes.into_iter().take(nb_nodes) {
            let links = slot.links.into_inner().expect("node links poisoned");
            nodes.push(Node::new(
                slot.vertex.into_inner(),
                slot.origin.into_inner(),
                links.up,
                links.down,
            ));
        }

        let mut arcs = Vec::with_capacity(nb_arcs);
        for (slot, region) in self.arcs.into_iter().take(nb_arcs).zip(regions) {
            debug_assert!(
                slot.up_node.load(Ordering::Acquire) != NULL_NODE,
                "arc left open after trunk"
            );
            arcs.push(SuperArc::new(
                slot.down_node.into_inner(),
                slot.up_node.into_inner(),
                slot.last_visited.into_inner(),
                slot.nb_seen.into_inner(),
                region,
            ));
        }

        let nb_roots = self.roots_len.load(Ordering::Acquire);
        let roots = self.roots[..nb_roots]
            .iter()
            .map(|r| r.load(Ordering::Acquire))
            .collect();

        let vert2tree = self
            .vert2tree
            .into_iter()
            .map(|raw| Corresponding::decode(raw.into_inner()))
            .collect();

        MergeTree::from_parts(tree_type, nodes, arcs, self.leaves, roots, vert2tree)
    }
}
