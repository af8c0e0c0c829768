//! Task-parallel merge tree construction.
//!
//! The pipeline has four phases: a chunked precompute (valences and leaves),
//! the leaf-task sweep (one wavefront per extremum racing to the saddles),
//! the sequential trunk closure, and the data-parallel segmentation. The
//! first and last phases are bulk loops with a barrier; the sweep is dynamic
//! task parallelism over a shared [`store::TreeData`] and [`uf::UfArena`].

macro_rules! maybe_par_into_iter {
    ($v:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            $v.into_par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $v.into_iter()
        }
    }};
}

macro_rules! maybe_par_iter_mut {
    ($v:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            $v.par_iter_mut()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $v.iter_mut()
        }
    }};
}

mod leaf_tasks;
mod state;
mod store;
mod timing;
mod trunk;
mod uf;

use crate::error::TreeError;
use crate::mesh::Mesh;
use crate::scalars::Scalars;
use crate::tree::MergeTree;
use crate::types::{TreeType, VertexId};
use crate::TreeParams;
use std::sync::OnceLock;
use store::TreeData;
use timing::{Timer, TimingBuilder};
use uf::UfArena;

/// Diagnostics are written to stderr when `SWEEPTREE_LOG=1` is set.
pub(crate) fn log_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        std::env::var("SWEEPTREE_LOG")
            .ok()
            .map_or(false, |v| v == "1" || v.eq_ignore_ascii_case("true"))
    })
}

/// The caller's total order reduced to this tree's sweep direction.
///
/// Both tree types run the same ascending code path over `verts`; a split
/// tree simply sweeps the reversed permutation.
pub(crate) struct SweepOrder {
    pos: Vec<u32>,
    verts: Vec<VertexId>,
}

impl SweepOrder {
    pub fn new(scalars: &Scalars, tree_type: TreeType) -> Self {
        match tree_type {
            TreeType::Split => {
                let verts: Vec<VertexId> =
                    scalars.sorted_vertices().iter().rev().copied().collect();
                let mut pos = vec![0u32; verts.len()];
                for (rank, &v) in verts.iter().enumerate() {
                    pos[v as usize] = rank as u32;
                }
                Self { pos, verts }
            }
            _ => Self {
                pos: scalars.mirror_vertices().to_vec(),
                verts: scalars.sorted_vertices().to_vec(),
            },
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.verts.len()
    }

    /// Sweep rank of a vertex.
    #[inline]
    pub fn pos(&self, v: VertexId) -> u32 {
        self.pos[v as usize]
    }

    /// Vertex at a sweep rank.
    #[inline]
    pub fn vertex_at(&self, rank: usize) -> VertexId {
        self.verts[rank]
    }

    #[inline]
    pub fn is_lower(&self, a: VertexId, b: VertexId) -> bool {
        self.pos[a as usize] < self.pos[b as usize]
    }
}

/// Shared read-only view handed to every phase and task.
pub(crate) struct Ctx<'a, M: Mesh> {
    pub mesh: &'a M,
    pub order: &'a SweepOrder,
    pub params: &'a TreeParams,
    pub data: &'a TreeData,
    pub uf: &'a UfArena,
}

impl<M: Mesh> Clone for Ctx<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: Mesh> Copy for Ctx<'_, M> {}

fn current_num_threads() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads().max(1)
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}

/// Chunk length for a bulk loop over `len` items.
pub(crate) fn chunk_size(len: usize, params: &TreeParams) -> usize {
    chunk_size_for(len, params.tasks_per_thread, params.min_chunk_size)
}

pub(crate) fn chunk_size_for(len: usize, tasks_per_thread: usize, floor: usize) -> usize {
    let tasks = tasks_per_thread.max(1) * current_num_threads();
    (len / tasks).max(floor.max(1))
}

/// Run the full pipeline for one tree.
pub(crate) fn build<M: Mesh>(
    mesh: &M,
    scalars: &Scalars,
    params: &TreeParams,
) -> Result<MergeTree, TreeError> {
    if params.tree_type == TreeType::Contour {
        return Err(TreeError::UnsupportedTreeType(TreeType::Contour));
    }
    let n = scalars.size();
    if n == 0 {
        return Ok(MergeTree::empty(params.tree_type));
    }

    let mut tb = TimingBuilder::new();
    let order = SweepOrder::new(scalars, params.tree_type);
    let mut data = TreeData::new(n);

    let t = Timer::start();
    let leaf_verts = leaf_tasks::precompute(mesh, &order, &data, chunk_size(n, params));
    data.alloc_skeleton(leaf_verts.len());
    for &v in &leaf_verts {
        // Leaf node ids follow vertex order; each leaf is its own origin.
        data.make_node(v, v);
    }
    data.fill_leaves();
    tb.set_precompute(t.elapsed());

    if log_enabled() {
        eprintln!("[sweeptree] {} tree: {} leaves", params.tree_type, leaf_verts.len());
    }

    let leaf_ranks: Vec<u32> = leaf_verts.iter().map(|&v| order.pos(v)).collect();
    let uf = UfArena::new(&leaf_ranks);
    let ctx = Ctx {
        mesh,
        order: &order,
        params,
        data: &data,
        uf: &uf,
    };

    let t = Timer::start();
    leaf_tasks::leaf_sweep(ctx);
    tb.set_leaf_sweep(t.elapsed());

    let t = Timer::start();
    let backbone = trunk::trunk(ctx);
    tb.set_trunk(t.elapsed());
    if log_enabled() {
        eprintln!("[sweeptree] backbone spans {} vertices", backbone);
    }

    let regions = if params.compute_segmentation {
        let t = Timer::start();
        let regions = trunk::build_segmentation(ctx);
        tb.set_segmentation(t.elapsed());
        regions
    } else {
        Vec::new()
    };

    let tree = data.finalize(params.tree_type, regions);
    tb.finish().report(params.tree_type, n);
    Ok(tree)
}
