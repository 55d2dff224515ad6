//! Mirrored mesh editing: every edit applies to a whole symmetry orbit.
//!
//! A vertex move displaces the vertex and its two 120/240-degree orbit peers
//! by the correspondingly rotated displacement, so the three board sectors
//! stay congruent. An edge deletion resolves the orbit-mirrored counterpart
//! edges and applies the single-edge merge primitive to each.
//!
//! Illegal gestures (pinned vertex, edge without exactly two triangles) are
//! silent no-ops, matching a direct-manipulation interaction model.

use std::collections::BTreeSet;

use crate::constants::{COS_120, SIN_120};
use crate::topology::{EdgeId, Topology, VertexId};

/// Rotate a displacement vector by 120 degrees counterclockwise.
#[inline]
fn rot120(dx: f64, dy: f64) -> (f64, f64) {
    (dx * COS_120 - dy * SIN_120, dx * SIN_120 + dy * COS_120)
}

/// Move a vertex and its orbit peers by a rigid 3-fold symmetric displacement.
///
/// Border vertices and the board center are pinned; the call is then a no-op.
/// Returns whether anything moved.
pub fn move_vertex(topo: &mut Topology, id: VertexId, dx: f64, dy: f64) -> bool {
    if !topo.verts[id].editable() {
        return false;
    }
    let (dx1, dy1) = rot120(dx, dy);
    let (dx2, dy2) = rot120(dx1, dy1);
    let moved = [
        topo.verts[id].orbit_member(0),
        topo.verts[id].orbit_member(1),
        topo.verts[id].orbit_member(2),
    ];
    let deltas = [(dx, dy), (dx1, dy1), (dx2, dy2)];
    for (vid, (ddx, ddy)) in moved.into_iter().zip(deltas) {
        topo.verts[vid].x += ddx;
        topo.verts[vid].y += ddy;
    }
    topo.refresh_midpoints_touching(&moved);
    true
}

/// Delete an edge and its orbit-mirrored counterparts, merging each adjacent
/// triangle pair into a quad.
///
/// Counterpart edges are resolved by mapping both endpoints through their
/// orbits index-wise; near symmetry boundaries the counterparts may coincide,
/// which collapses harmlessly into repeat no-op applications.
/// Returns the number of edges actually merged.
pub fn delete_edge(topo: &mut Topology, eid: EdgeId) -> usize {
    if !topo.edges[eid].active {
        return 0;
    }
    let (a, b) = (topo.edges[eid].a, topo.edges[eid].b);
    let mut targets: BTreeSet<EdgeId> = BTreeSet::new();
    for i in 0..3 {
        let pa = topo.verts[a].orbit_member(i);
        let pb = topo.verts[b].orbit_member(i);
        if let Some(peer) = topo.edge_between(pa, pb) {
            targets.insert(peer);
        }
    }
    let mut merged = 0;
    for peer in targets {
        if delete_edge_single(topo, peer) {
            merged += 1;
        }
    }
    merged
}

/// The single-edge merge primitive: replace an edge and its two adjacent
/// triangles with one quad.
///
/// Requires exactly 2 active triangles sharing the edge; otherwise a no-op.
/// The new quad is {endpointA, apex0, endpointB, apex1} ordered by angle
/// around the centroid so its boundary is simple.
pub fn delete_edge_single(topo: &mut Topology, eid: EdgeId) -> bool {
    if !topo.edges[eid].active {
        return false;
    }
    let sharing = topo.tris_sharing_edge(eid);
    if sharing.len() != 2 {
        return false;
    }
    let (a, b) = (topo.edges[eid].a, topo.edges[eid].b);
    let apex = |tid: usize| -> VertexId {
        topo.tris[tid]
            .verts
            .into_iter()
            .find(|&v| v != a && v != b)
            .expect("triangle has a vertex off the shared edge")
    };
    let (apex0, apex1) = (apex(sharing[0]), apex(sharing[1]));

    topo.deactivate_edge(eid);
    topo.deactivate_tri(sharing[0]);
    topo.deactivate_tri(sharing[1]);
    let quad = topo.angle_sorted([a, apex0, b, apex1]);
    topo.add_quad(quad);
    true
}
