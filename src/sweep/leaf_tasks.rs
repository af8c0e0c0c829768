//! Extremum extraction and the leaf-task sweep.
//!
//! Precompute counts each vertex's lower neighbors (its valence) and creates
//! one leaf node per local sweep minimum. The sweep then launches one task
//! per leaf; each task grows a monotone wavefront until it reaches a saddle,
//! where the valence arbitration elects the last arriving front to fuse every
//! class that stopped there and keep going.

#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;

use crate::mesh::Mesh;
use crate::sweep::store::TreeData;
use crate::sweep::uf::NULL_UF;
use crate::sweep::{Ctx, SweepOrder};
use crate::types::{Corresponding, NodeId, VertexId, NULL_VERTEX};

/// Chunked scan of all vertices: fill the valences array and collect the
/// leaf vertices (valence zero), in vertex id order.
pub(super) fn precompute<M: Mesh>(
    mesh: &M,
    order: &SweepOrder,
    data: &TreeData,
    chunk: usize,
) -> Vec<VertexId> {
    let n = order.len();
    let chunk_nb = n.div_ceil(chunk);

    let per_chunk: Vec<Vec<VertexId>> = maybe_par_into_iter!(0..chunk_nb)
        .map(|chunk_id| {
            let lower = chunk_id * chunk;
            let upper = n.min(lower + chunk);
            let mut found = Vec::new();
            for v in lower..upper {
                let v = v as VertexId;
                let nb_neigh = mesh.neighbor_count(v);
                let mut val = 0i32;
                for i in 0..nb_neigh {
                    if order.is_lower(mesh.neighbor(v, i), v) {
                        val += 1;
                    }
                }
                data.set_valence(v, val);
                if val == 0 {
                    found.push(v);
                }
            }
            found
        })
        .collect();

    per_chunk.concat()
}

/// Launch one task per leaf and run the wavefront phase to completion.
pub(super) fn leaf_sweep<M: Mesh>(ctx: Ctx<'_, M>) {
    let nb_leaves = ctx.data.leaves().len();
    debug_assert!(nb_leaves > 0, "leaf sweep on an empty tree");

    // Monotone field: a single extremum, nothing to race. Hand the whole
    // backbone to the trunk.
    if nb_leaves == 1 {
        let v = ctx.data.node_vertex(0);
        ctx.data.set_opened(v, true);
        ctx.data.publish_uf(v, 0);
        return;
    }

    ctx.data.set_active_tasks(nb_leaves);

    // Simulated priority: launch leaves in sweep order.
    let mut launch: Vec<NodeId> = ctx.data.leaves().to_vec();
    launch.sort_unstable_by_key(|&l| ctx.order.pos(ctx.data.node_vertex(l)));

    // Leaf vertices have no lower neighbor, so no other front can ever visit
    // them; seeding every handle before the spawns keeps task start order
    // irrelevant.
    for &l in &launch {
        ctx.data.publish_uf(ctx.data.node_vertex(l), l);
    }

    #[cfg(feature = "parallel")]
    rayon::scope(|s| {
        for &l in &launch {
            let v = ctx.data.node_vertex(l);
            s.spawn(move |_| leaf_task(ctx, v));
        }
    });

    #[cfg(not(feature = "parallel"))]
    for &l in &launch {
        leaf_task(ctx, ctx.data.node_vertex(l));
    }
}

enum TaskOutcome {
    /// The front stopped: lost a saddle, closed a root, or handed over to
    /// the trunk.
    Done,
    /// Won a saddle; resume from it as the new start vertex.
    Continue(VertexId),
}

fn leaf_task<M: Mesh>(ctx: Ctx<'_, M>, leaf_vert: VertexId) {
    let mut start_vert = leaf_vert;
    let mut scratch = Vec::new();
    loop {
        match process_task(ctx, start_vert, &mut scratch) {
            TaskOutcome::Done => return,
            TaskOutcome::Continue(saddle) => start_vert = saddle,
        }
    }
}

fn process_task<M: Mesh>(
    ctx: Ctx<'_, M>,
    start_vert: VertexId,
    scratch: &mut Vec<u32>,
) -> TaskOutcome {
    let data = ctx.data;

    let start_uf = ctx.uf.find(data.uf_of(start_vert));
    ctx.uf.ensure_state(start_uf);
    ctx.uf.enqueue_all(start_uf, &[ctx.order.pos(start_vert)]);

    // The start vertex may sit in the queue several times after a merge.
    let mut seen_first = false;

    let start_node = data.corresponding_node_id(start_vert);
    let current_arc = data.open_super_arc(start_node);
    ctx.uf.add_arc_to_close(start_uf, current_arc);

    while let Some(pos) = ctx.uf.pop_min(start_uf) {
        let current_vert = ctx.order.vertex_at(pos as usize);

        // Accept nil or node vertices; an arc vertex is already owned
        // further downstream by this or another front (duplicate enqueue).
        if data.corresponding(current_vert).is_arc() {
            continue;
        }
        if current_vert == start_vert {
            if seen_first {
                continue;
            }
            seen_first = true;
        }

        let (is_saddle, is_last) = propagate(ctx, current_vert, start_uf, scratch);

        data.publish_uf(current_vert, start_uf);

        if is_saddle {
            if is_last {
                if data.active_tasks() == 1 {
                    // Only the backbone remains; the trunk closes it.
                    return TaskOutcome::Done;
                }
                close_and_merge_on_saddle(ctx, current_vert);
                data.set_opened(current_vert, false);
                return TaskOutcome::Continue(current_vert);
            }

            data.task_done();
            return TaskOutcome::Done;
        }

        if current_vert != start_vert {
            data.set_corresponding_arc(current_vert, current_arc);
        }
        data.set_last_visited(current_arc, current_vert);
    }

    // Queue drained: this front reached the top of its component.
    let close_vert = data.last_visited(current_arc);
    let close_node = match data.corresponding(close_vert) {
        Corresponding::Node(n) => n,
        _ => data.make_node(close_vert, NULL_VERTEX),
    };
    data.close_super_arc(current_arc, close_node);
    data.decr_nb_seen(current_arc);
    data.push_root(close_node);
    TaskOutcome::Done
}

/// Visit the neighborhood of `current_vert` for the class rooted at
/// `cur_root`: enqueue unseen upper neighbors, detect foreign fronts below,
/// and decrement the valence by the same-class arrivals.
///
/// Returns `(became_saddle, is_last)`; the pre-decrement valence capture is
/// what makes the last-arrival election race free.
fn propagate<M: Mesh>(
    ctx: Ctx<'_, M>,
    current_vert: VertexId,
    cur_root: u32,
    scratch: &mut Vec<u32>,
) -> (bool, bool) {
    let data = ctx.data;
    let mut became_saddle = false;
    let mut decr = 0i32;
    scratch.clear();

    let nb_neigh = ctx.mesh.neighbor_count(current_vert);
    for i in 0..nb_neigh {
        let neigh = ctx.mesh.neighbor(current_vert, i);
        if ctx.order.is_lower(neigh, current_vert) {
            let neigh_uf = data.uf_of(neigh);
            if neigh_uf == NULL_UF || ctx.uf.find(neigh_uf) != cur_root {
                // Someone else's sublevel set touches this vertex.
                became_saddle = true;
            } else {
                decr += 1;
            }
        } else {
            let mark = data.propagation_of(neigh);
            if mark == NULL_UF || ctx.uf.find(mark) != cur_root {
                scratch.push(ctx.order.pos(neigh));
                data.set_propagation(neigh, cur_root);
            }
        }
    }
    ctx.uf.enqueue_all(cur_root, scratch);

    // Mark the tentative saddle before the valence capture: the capture's
    // seq-cst chain then orders every arrival's mark before the winning
    // task's clear, whatever the thread timing.
    if became_saddle {
        data.set_opened(current_vert, true);
    }

    let old_valence = data.valence_sub(current_vert, decr);
    (became_saddle, old_valence == decr)
}

/// Last arrival at a sweep saddle: fuse every class that stopped here, close
/// their open arcs on a node at the saddle, and collapse their queues so the
/// continuation resumes with all pending work.
pub(super) fn close_and_merge_on_saddle<M: Mesh>(ctx: Ctx<'_, M>, saddle: VertexId) {
    let data = ctx.data;
    let close_node = data.make_node(saddle, NULL_VERTEX);

    let mut rep = ctx.uf.find(data.uf_of(saddle));
    let nb_neigh = ctx.mesh.neighbor_count(saddle);
    for i in 0..nb_neigh {
        let neigh = ctx.mesh.neighbor(saddle, i);
        if !ctx.order.is_lower(neigh, saddle) {
            continue;
        }
        let neigh_uf = data.uf_of(neigh);
        debug_assert!(
            neigh_uf != NULL_UF,
            "unvisited lower neighbor {} at sweep saddle {}",
            neigh,
            saddle
        );
        if ctx.uf.find(neigh_uf) != rep {
            rep = ctx.uf.make_union(rep, neigh_uf);
        }
    }
    data.publish_uf(saddle, rep);

    close_arcs_on(ctx, close_node, rep);
    ctx.uf.merge_states(rep);
    ctx.uf.set_extremum(rep, ctx.order.pos(saddle));
}

/// Trunk variant: lower neighbors strictly inside the trunk were never
/// visited and carry no class, so skip them instead of asserting.
pub(super) fn close_on_backbone<M: Mesh>(ctx: Ctx<'_, M>, saddle: VertexId) {
    let data = ctx.data;
    let close_node = data.make_node(saddle, NULL_VERTEX);

    let mut rep = ctx.uf.find(data.uf_of(saddle));
    let nb_neigh = ctx.mesh.neighbor_count(saddle);
    for i in 0..nb_neigh {
        let neigh = ctx.mesh.neighbor(saddle, i);
        if !ctx.order.is_lower(neigh, saddle) {
            continue;
        }
        let neigh_uf = data.uf_of(neigh);
        if neigh_uf != NULL_UF && ctx.uf.find(neigh_uf) != rep {
            rep = ctx.uf.make_union(rep, neigh_uf);
        }
    }
    data.publish_uf(saddle, rep);

    close_arcs_on(ctx, close_node, rep);
}

fn close_arcs_on<M: Mesh>(ctx: Ctx<'_, M>, close_node: NodeId, rep: u32) {
    for sa in ctx.uf.take_open_arcs(rep) {
        ctx.data.close_super_arc(sa, close_node);
    }
}
