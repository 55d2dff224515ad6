//! Iterative smoothing of a pure-quad mesh.
//!
//! The default strategy pulls every movable vertex toward the area-weighted
//! mean of its adjacent quad centroids by a small fixed fraction per
//! iteration. An alternate strategy nudges the vertices of over- and
//! under-sized quads along the centroid axis instead.
//!
//! Each call to [`Relaxer::step`] is one iteration: all displacements are
//! computed from one consistent snapshot of positions and applied together,
//! so application order is irrelevant. Border vertices never move, and a mesh
//! that still contains active triangles is refused outright.

use crate::constants::{AREA_BAND_HIGH, AREA_BAND_LOW, AREA_BAND_STEP, RELAX_STRENGTH};
use crate::merge::StepStatus;
use crate::topology::{Topology, VertexId, VertexKind};

/// Which smoothing rule a [`Relaxer`] applies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RelaxStyle {
    /// Area-weighted centroid pull. The default.
    #[default]
    AreaWeighted,
    /// Fixed-step nudge on quads outside the mean-area deviation band.
    DeviationBand,
}

/// Caller-ticked mesh relaxation.
#[derive(Debug, Default)]
pub struct Relaxer {
    pub style: RelaxStyle,
}

impl Relaxer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: RelaxStyle) -> Self {
        Self { style }
    }

    /// Run one relaxation iteration.
    ///
    /// Refuses (no state change, [`StepStatus::Failed`]) while any triangle
    /// is active; relaxation is defined on pure-quad meshes only. Otherwise
    /// always reports [`StepStatus::Progress`] — convergence is the caller's
    /// judgement.
    pub fn step(&self, topo: &mut Topology) -> StepStatus {
        if topo.active_tri_count() > 0 {
            return StepStatus::Failed;
        }
        let moves = match self.style {
            RelaxStyle::AreaWeighted => area_weighted_moves(topo),
            RelaxStyle::DeviationBand => deviation_band_moves(topo),
        };
        for (vid, dx, dy) in moves {
            topo.verts[vid].x += dx;
            topo.verts[vid].y += dy;
        }
        topo.refresh_all_midpoints();
        StepStatus::Progress
    }
}

#[inline]
fn movable(topo: &Topology, vid: VertexId) -> bool {
    let v = &topo.verts[vid];
    v.visible && v.kind != VertexKind::Border
}

/// Displacements toward the area-weighted mean of adjacent quad centroids.
/// Quad areas are recomputed first; motion changes them every iteration.
fn area_weighted_moves(topo: &mut Topology) -> Vec<(VertexId, f64, f64)> {
    topo.recompute_quad_areas();
    let mut moves = Vec::new();
    for vid in 0..topo.verts.len() {
        if !movable(topo, vid) || topo.verts[vid].quads.is_empty() {
            continue;
        }
        let mut weight_sum = 0.0;
        let mut tx = 0.0;
        let mut ty = 0.0;
        for &qid in &topo.verts[vid].quads {
            let quad = &topo.quads[qid];
            let weight = if quad.area > 0.0 { quad.area } else { 1.0 };
            let (cx, cy) = topo.centroid(&quad.verts);
            weight_sum += weight;
            tx += cx * weight;
            ty += cy * weight;
        }
        let (x, y) = topo.position(vid);
        let dx = (tx / weight_sum - x) * RELAX_STRENGTH;
        let dy = (ty / weight_sum - y) * RELAX_STRENGTH;
        moves.push((vid, dx, dy));
    }
    moves
}

/// Fixed-step displacements for quads whose area falls outside the
/// deviation band around the mean: oversized quads pull their vertices
/// toward the centroid, undersized ones push them away.
fn deviation_band_moves(topo: &mut Topology) -> Vec<(VertexId, f64, f64)> {
    topo.recompute_quad_areas();
    let active = topo.active_quads();
    if active.is_empty() {
        return Vec::new();
    }
    let mean = active.iter().map(|&q| topo.quads[q].area).sum::<f64>() / active.len() as f64;

    let mut moves = Vec::new();
    for qid in active {
        let area = topo.quads[qid].area;
        let sign = if area > mean * AREA_BAND_HIGH {
            1.0
        } else if area < mean * AREA_BAND_LOW {
            -1.0
        } else {
            continue;
        };
        let verts = topo.quads[qid].verts;
        let (cx, cy) = topo.centroid(&verts);
        for vid in verts {
            if !movable(topo, vid) {
                continue;
            }
            let (x, y) = topo.position(vid);
            let (dx, dy) = (cx - x, cy - y);
            let len = (dx * dx + dy * dy).sqrt();
            if len == 0.0 {
                continue;
            }
            moves.push((
                vid,
                dx / len * AREA_BAND_STEP * sign,
                dy / len * AREA_BAND_STEP * sign,
            ));
        }
    }
    moves
}
