//! Trunk closure and segmentation.
//!
//! Once at most one front survives, the remaining saddles form a single
//! ascending chain. Closing them is sequential and short; attributing the
//! trunk's regular vertices and building the per-arc regions is data
//! parallel again.

#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;

use crate::mesh::Mesh;
use crate::sweep::leaf_tasks::close_on_backbone;
use crate::sweep::{chunk_size, chunk_size_for, Ctx};
use crate::types::{ArcId, Corresponding, VertexId, NULL_VERTEX};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// The trunk works on a short chain; finer chunks than the bulk phases keep
/// all workers busy on it.
const TRUNK_TASKS_PER_THREAD: usize = 40;

/// Close the saddles the sweep left open, chain them with super-arcs up to a
/// root at the global sweep maximum, and attribute the trunk's vertices.
/// Returns the number of vertices spanned by the backbone.
pub(super) fn trunk<M: Mesh>(ctx: Ctx<'_, M>) -> usize {
    let data = ctx.data;
    let n = ctx.order.len();

    let mut pending: Vec<VertexId> = (0..n as u32).filter(|&v| data.is_opened(v)).collect();
    pending.sort_unstable_by_key(|&v| ctx.order.pos(v));

    for &v in &pending {
        close_on_backbone(ctx, v);
    }

    let nb = pending.len();
    for i in 1..nb {
        let na = data.make_super_arc(
            data.corresponding_node_id(pending[i - 1]),
            data.corresponding_node_id(pending[i]),
        );
        data.set_last_visited(na, pending[i]);
    }

    if nb == 0 {
        // Every component closed its own root during the sweep.
        return 0;
    }

    let last_arc = data.open_super_arc(data.corresponding_node_id(pending[nb - 1]));
    let root_vert = ctx.order.vertex_at(n - 1);
    let root_node = data.make_node(root_vert, NULL_VERTEX);
    data.close_super_arc(last_arc, root_node);
    data.set_last_visited(last_arc, root_vert);
    if !data.has_root(root_node) {
        data.push_root(root_node);
    }

    let begin = ctx.order.pos(pending[0]) as usize;
    assign_trunk(ctx, &pending, begin, n);
    n - begin
}

/// Walk the sweep-sorted trunk range in parallel chunks, attributing each
/// still-nil vertex to the up arc of the backbone node below it. Visit
/// counts accumulate locally and flush with one atomic add per backbone
/// segment, plus one at the chunk boundary even mid-segment.
fn assign_trunk<M: Mesh>(ctx: Ctx<'_, M>, pending: &[VertexId], begin: usize, stop: usize) {
    let span = stop - begin;
    if span == 0 {
        return;
    }
    let chunk = chunk_size_for(span, TRUNK_TASKS_PER_THREAD, ctx.params.min_chunk_size);
    let chunk_nb = span.div_ceil(chunk);

    maybe_par_into_iter!(0..chunk_nb).for_each(|chunk_id| {
        let lower = begin + chunk_id * chunk;
        let upper = stop.min(begin + (chunk_id + 1) * chunk);
        let mut last_in_range = 0usize;
        let mut acc = 0i32;
        for i in lower..upper {
            let s = ctx.order.vertex_at(i);
            if ctx.data.corresponding(s).is_nil() {
                let old = last_in_range;
                last_in_range = vert_in_range(ctx, pending, s, last_in_range);
                let this_arc = up_arc_from_vert(ctx, pending[last_in_range]);
                ctx.data.set_corresponding_arc(s, this_arc);
                if old == last_in_range {
                    acc += 1;
                } else {
                    ctx.data.add_visits(up_arc_from_vert(ctx, pending[old]), acc);
                    acc = 1;
                }
            }
        }
        ctx.data
            .add_visits(up_arc_from_vert(ctx, pending[last_in_range]), acc);
    });
}

/// Index of the highest backbone vertex not above `v`, advancing from `last`.
fn vert_in_range<M: Mesh>(
    ctx: Ctx<'_, M>,
    range: &[VertexId],
    v: VertexId,
    last: usize,
) -> usize {
    let mut idx = last;
    while idx + 1 < range.len() && ctx.order.is_lower(range[idx + 1], v) {
        idx += 1;
    }
    idx
}

fn up_arc_from_vert<M: Mesh>(ctx: Ctx<'_, M>, v: VertexId) -> ArcId {
    ctx.data.first_up_arc(ctx.data.corresponding_node_id(v))
}

/// Gather each arc's region from the correspondence map.
///
/// Sizes come from the sweep visit counts (`max(0, seen - 1)`; the start
/// vertex of every arc is a node). Vertices are scattered into per-arc
/// slices at atomically reserved positions, then each region is sorted in
/// sweep order.
pub(super) fn build_segmentation<M: Mesh>(ctx: Ctx<'_, M>) -> Vec<Vec<VertexId>> {
    let data = ctx.data;
    let nb_arcs = data.num_arcs();
    if nb_arcs == 0 {
        return Vec::new();
    }
    let n = ctx.order.len();

    let sizes: Vec<usize> = (0..nb_arcs as ArcId)
        .map(|a| (data.nb_seen(a) - 1).max(0) as usize)
        .collect();
    let mut offsets = vec![0usize; nb_arcs + 1];
    for a in 0..nb_arcs {
        offsets[a + 1] = offsets[a] + sizes[a];
    }

    let slots: Vec<AtomicU32> = (0..offsets[nb_arcs])
        .map(|_| AtomicU32::new(NULL_VERTEX))
        .collect();
    let cursors: Vec<AtomicUsize> = (0..nb_arcs).map(|_| AtomicUsize::new(0)).collect();

    let chunk = chunk_size(n, ctx.params);
    let chunk_nb = n.div_ceil(chunk);
    maybe_par_into_iter!(0..chunk_nb).for_each(|chunk_id| {
        let lower = chunk_id * chunk;
        let upper = n.min(lower + chunk);
        for i in lower..upper {
            let v = ctx.order.vertex_at(i);
            if let Corresponding::Arc(sa) = data.corresponding(v) {
                let sa = sa as usize;
                let slot = cursors[sa].fetch_add(1, Ordering::Relaxed);
                if slot < sizes[sa] {
                    slots[offsets[sa] + slot].store(v, Ordering::Relaxed);
                }
            }
        }
    });

    let mut regions: Vec<Vec<VertexId>> = (0..nb_arcs)
        .map(|a| {
            slots[offsets[a]..offsets[a + 1]]
                .iter()
                .map(|s| s.load(Ordering::Relaxed))
                .filter(|&v| v != NULL_VERTEX)
                .collect()
        })
        .collect();

    maybe_par_iter_mut!(&mut regions).for_each(|region: &mut Vec<VertexId>| {
        region.sort_unstable_by_key(|&v| ctx.order.pos(v));
    });

    regions
}
