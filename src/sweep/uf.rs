//! Lock-free union-find over wavefronts, carrying each front's pending work.
//!
//! One cell per leaf. The parent links form the usual disjoint-set forest;
//! `find` uses path halving with release/acquire semantics so that a thread
//! observing a parent link also observes every write published before the
//! union that installed it. `make_union` attaches the front whose extremum is
//! earlier in sweep order under the more advanced one, so the representative
//! is always the front that has swept furthest.
//!
//! The representative additionally owns the class's open arcs and front
//! queues. That payload sits behind a per-cell mutex, but the saddle
//! arbitration protocol guarantees a single owner at any time (the task
//! driving the front while it is alive, the winning task once every arrival
//! has quiesced), so the lock is never contended and nothing blocks on it.

use crate::sweep::state::FrontState;
use crate::types::ArcId;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Sentinel for "no union-find cell".
pub(crate) const NULL_UF: u32 = u32::MAX;

#[derive(Default)]
struct UfPayload {
    open_arcs: Vec<ArcId>,
    states: Vec<FrontState>,
}

struct UfCell {
    parent: AtomicU32,
    /// Sweep rank of the front's current extremum (starting leaf, then the
    /// most recent merge saddle).
    extremum: AtomicU32,
    payload: Mutex<UfPayload>,
}

pub(crate) struct UfArena {
    cells: Vec<UfCell>,
}

impl UfArena {
    /// One singleton cell per leaf, seeded with the leaf's sweep rank.
    pub fn new(leaf_ranks: &[u32]) -> Self {
        let cells = leaf_ranks
            .iter()
            .enumerate()
            .map(|(i, &rank)| UfCell {
                parent: AtomicU32::new(i as u32),
                extremum: AtomicU32::new(rank),
                payload: Mutex::new(UfPayload::default()),
            })
            .collect();
        Self { cells }
    }

    /// Representative of `x`'s class, compressing by path halving.
    pub fn find(&self, mut x: u32) -> u32 {
        debug_assert!((x as usize) < self.cells.len(), "uf cell {} out of range", x);
        loop {
            let p = self.cells[x as usize].parent.load(Ordering::Acquire);
            if p == x {
                return x;
            }
            let gp = self.cells[p as usize].parent.load(Ordering::Acquire);
            if gp == p {
                return p;
            }
            // Point x at its grandparent; a lost race just skips one hop.
            let _ = self.cells[x as usize].parent.compare_exchange_weak(
                p,
                gp,
                Ordering::Release,
                Ordering::Relaxed,
            );
            x = gp;
        }
    }

    /// Union the classes of `a` and `b`, transferring the absorbed class's
    /// open arcs and front queues onto the surviving representative.
    /// Returns the new representative.
    pub fn make_union(&self, a: u32, b: u32) -> u32 {
        loop {
            let ra = self.find(a);
            let rb = self.find(b);
            if ra == rb {
                return ra;
            }
            let ea = self.cells[ra as usize].extremum.load(Ordering::Acquire);
            let eb = self.cells[rb as usize].extremum.load(Ordering::Acquire);
            // The earlier front goes under the more advanced one.
            let (winner, loser) = if ea < eb { (rb, ra) } else { (ra, rb) };
            if self.cells[loser as usize]
                .parent
                .compare_exchange(loser, winner, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let (arcs, states) = {
                    let mut p = self.lock_payload(loser);
                    (std::mem::take(&mut p.open_arcs), std::mem::take(&mut p.states))
                };
                let mut w = self.lock_payload(winner);
                w.open_arcs.extend(arcs);
                w.states.extend(states);
                return winner;
            }
        }
    }

    fn lock_payload(&self, cell: u32) -> std::sync::MutexGuard<'_, UfPayload> {
        self.cells[cell as usize]
            .payload
            .lock()
            .expect("uf payload poisoned")
    }

    pub fn set_extremum(&self, root: u32, sweep_rank: u32) {
        self.cells[root as usize]
            .extremum
            .store(sweep_rank, Ordering::Release);
    }

    /// Record an arc this class will have to close at its next saddle.
    pub fn add_arc_to_close(&self, root: u32, arc: ArcId) {
        self.lock_payload(root).open_arcs.push(arc);
    }

    /// Drain the class's open arcs for closing.
    pub fn take_open_arcs(&self, root: u32) -> Vec<ArcId> {
        std::mem::take(&mut self.lock_payload(root).open_arcs)
    }

    /// Make sure the class has a front queue to work with.
    pub fn ensure_state(&self, root: u32) {
        let mut p = self.lock_payload(root);
        if p.states.is_empty() {
            p.states.push(FrontState::new());
        }
    }

    /// Enqueue candidate sweep ranks on the class's first front queue.
    pub fn enqueue_all(&self, root: u32, sweep_ranks: &[u32]) {
        if sweep_ranks.is_empty() {
            return;
        }
        let mut p = self.lock_payload(root);
        debug_assert!(!p.states.is_empty(), "enqueue on a class with no state");
        let state = &mut p.states[0];
        for &r in sweep_ranks {
            state.push(r);
        }
    }

    /// Pop the sweep-minimum pending vertex of the class's first front queue.
    pub fn pop_min(&self, root: u32) -> Option<u32> {
        let mut p = self.lock_payload(root);
        p.states.first_mut().and_then(|s| s.pop_min())
    }

    /// Collapse all of the class's front queues into the first one.
    pub fn merge_states(&self, root: u32) {
        let mut p = self.lock_payload(root);
        if p.states.len() < 2 {
            return;
        }
        let mut rest = p.states.split_off(1);
        let first = &mut p.states[0];
        for s in rest.drain(..) {
            first.merge(s);
        }
    }
}
