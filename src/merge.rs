//! Randomized triangle-to-quad merging with retry and fallback.
//!
//! Automatic quadrangulation is a greedy randomized maximal matching over the
//! "triangles adjacent via a shared edge" graph. A perfect matching is not
//! guaranteed for every shuffle, so a pass can leave residual triangles; the
//! pipeline then widens its search, and failing that restores the
//! pre-pipeline snapshot and reshuffles. The contract is strict: it either
//! converges to zero active triangles or reverts to the exact starting mesh.
//!
//! The whole algorithm is a caller-ticked step machine; one [`AutoMerge::step`]
//! call runs one pass, and pacing (animation, batching) belongs to the caller.

use crate::constants::{MERGE_FALLBACK_CAP, MERGE_RETRIES};
use crate::editor::delete_edge_single;
use crate::topology::{EdgeId, Topology, TriId};

/// Outcome of one tick of a caller-paced algorithm.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// Work remains; call `step` again.
    Progress,
    /// The algorithm reached its goal.
    Done,
    /// The algorithm gave up; state has been fully reverted.
    Failed,
}

/// Resumable automatic quadrangulation over a triangulated mesh.
pub struct AutoMerge {
    /// Pre-pipeline mesh, restored wholesale on reshuffle or failure.
    snapshot: Topology,
    retries_left: usize,
}

impl AutoMerge {
    /// Snapshot the mesh and prepare a merge pipeline.
    pub fn new(topo: &Topology) -> Self {
        Self {
            snapshot: topo.clone(),
            retries_left: MERGE_RETRIES,
        }
    }

    /// Run one merge pass.
    ///
    /// A stalled pass first attempts a bounded exhaustive-scan fallback; if
    /// that also yields nothing, the mesh is restored to the snapshot and a
    /// retry begins with a fresh shuffle. Exhausting all retries restores the
    /// snapshot and reports [`StepStatus::Failed`].
    pub fn step(&mut self, topo: &mut Topology) -> StepStatus {
        if topo.active_tri_count() == 0 {
            return StepStatus::Done;
        }
        let mut merged = merge_pass(topo);
        if merged == 0 {
            merged = fallback_merges(topo, MERGE_FALLBACK_CAP);
        }
        if topo.active_tri_count() == 0 {
            return StepStatus::Done;
        }
        if merged > 0 {
            return StepStatus::Progress;
        }
        *topo = self.snapshot.clone();
        if self.retries_left == 0 {
            return StepStatus::Failed;
        }
        self.retries_left -= 1;
        StepStatus::Progress
    }
}

/// Drive an [`AutoMerge`] pipeline to completion. Returns whether the mesh
/// ended with zero active triangles.
pub fn quadrangulate(topo: &mut Topology) -> bool {
    let mut auto = AutoMerge::new(topo);
    loop {
        match auto.step(topo) {
            StepStatus::Progress => {}
            StepStatus::Done => return true,
            StepStatus::Failed => return false,
        }
    }
}

/// A mergeable pair: two active triangles and the edge between them.
struct Candidate {
    edge: EdgeId,
    tris: [TriId; 2],
}

/// All active triangle pairs sharing exactly one edge.
fn candidates(topo: &Topology) -> Vec<Candidate> {
    let active = topo.active_tris();
    let mut out = Vec::new();
    for (i, &t0) in active.iter().enumerate() {
        for &t1 in &active[i + 1..] {
            let shared: Vec<_> = topo.tris[t0]
                .verts
                .into_iter()
                .filter(|v| topo.tris[t1].verts.contains(v))
                .collect();
            if shared.len() != 2 {
                continue;
            }
            if let Some(edge) = topo.edge_between(shared[0], shared[1]) {
                out.push(Candidate {
                    edge,
                    tris: [t0, t1],
                });
            }
        }
    }
    out
}

/// One greedy randomized matching pass. Returns the number of merges applied.
fn merge_pass(topo: &mut Topology) -> usize {
    let mut pairs = candidates(topo);
    fastrand::shuffle(&mut pairs);

    let mut consumed: Vec<TriId> = Vec::new();
    let mut merged = 0;
    for c in pairs {
        if consumed.contains(&c.tris[0]) || consumed.contains(&c.tris[1]) {
            continue;
        }
        if delete_edge_single(topo, c.edge) {
            consumed.extend_from_slice(&c.tris);
            merged += 1;
        }
    }
    merged
}

/// Deadlock breaker: merge any shared-edge pair found by exhaustive scan,
/// ignoring the matching heuristic, up to `cap` merges.
fn fallback_merges(topo: &mut Topology, cap: usize) -> usize {
    let mut merged = 0;
    while merged < cap {
        let Some(c) = candidates(topo).into_iter().next() else {
            break;
        };
        if !delete_edge_single(topo, c.edge) {
            break;
        }
        merged += 1;
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SPACING;
    use crate::grid::build_grid;

    #[test]
    fn test_quadrangulate_radius_one_fan() {
        fastrand::seed(7);
        let mut topo = build_grid(1, SPACING);
        assert_eq!(topo.active_tri_count(), 6);
        assert!(quadrangulate(&mut topo));
        assert_eq!(topo.active_tri_count(), 0);
        assert_eq!(topo.active_quad_count(), 3);
    }

    #[test]
    fn test_quadrangulate_all_or_revert() {
        for seed in 0..8 {
            fastrand::seed(seed);
            let mut topo = build_grid(3, SPACING);
            let tris_before = topo.active_tri_count();
            let quads_before = topo.active_quad_count();
            if quadrangulate(&mut topo) {
                assert_eq!(topo.active_tri_count(), 0);
                assert_eq!(topo.active_quad_count(), tris_before / 2 + quads_before);
            } else {
                assert_eq!(topo.active_tri_count(), tris_before);
                assert_eq!(topo.active_quad_count(), quads_before);
            }
        }
    }

    #[test]
    fn test_merged_quads_have_neighbor_boundaries() {
        fastrand::seed(42);
        let mut topo = build_grid(2, SPACING);
        assert!(quadrangulate(&mut topo));
        for qid in topo.active_quads() {
            let verts = topo.quads[qid].verts;
            for i in 0..4 {
                let a = verts[i];
                let b = verts[(i + 1) % 4];
                assert!(topo.verts[a].neighbors.contains(&b), "{a} next to {b}");
            }
        }
    }

    #[test]
    fn test_step_reports_done_on_already_quadrangulated_mesh() {
        fastrand::seed(1);
        let mut topo = build_grid(1, SPACING);
        assert!(quadrangulate(&mut topo));
        let mut auto = AutoMerge::new(&topo);
        assert_eq!(auto.step(&mut topo), StepStatus::Done);
    }
}

