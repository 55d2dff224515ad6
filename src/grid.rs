//! Initial board construction: triangulated hex lattice plus symmetry orbits.
//!
//! The builder enumerates axial coordinates of a hex disk, connects the 6
//! lattice directions, emits the full triangulation, and computes each
//! vertex's 3-fold rotation orbit. A disk of radius R always yields exactly
//! `1 + 3R(R+1)` vertices.

use std::collections::HashMap;

use crate::constants::{AXIAL_DIRS, SQRT3};
use crate::topology::{Orbit, Topology, VertexId, VertexKind};

/// Hex distance from the origin in axial coordinates.
#[inline]
fn hex_dist(q: i32, r: i32) -> i32 {
    q.abs().max(r.abs()).max((q + r).abs())
}

/// Project axial coordinates onto the plane.
#[inline]
fn project(q: i32, r: i32, spacing: f64) -> (f64, f64) {
    (
        spacing * (q as f64 + r as f64 / 2.0),
        spacing * r as f64 * SQRT3 / 2.0,
    )
}

/// Build the triangulated hex disk of the given radius.
///
/// Vertices are assigned ids in a fixed q-then-r scan order. Vertices at
/// exactly distance R are classified [`VertexKind::Border`]; everything else
/// is interior, with distance 0 being the unique center.
pub fn build_grid(radius: i32, spacing: f64) -> Topology {
    let mut topo = Topology::new();
    let mut by_axial: HashMap<(i32, i32), VertexId> = HashMap::new();

    // Vertices, fixed scan order.
    for q in -radius..=radius {
        for r in -radius..=radius {
            if hex_dist(q, r) > radius {
                continue;
            }
            let kind = if hex_dist(q, r) == radius {
                VertexKind::Border
            } else {
                VertexKind::Interior
            };
            let (x, y) = project(q, r, spacing);
            let id = topo.add_vertex(x, y, kind, q, r);
            by_axial.insert((q, r), id);
        }
    }

    // One canonical edge per adjacent unordered pair.
    for (&(q, r), &id) in &by_axial {
        for (dq, dr) in AXIAL_DIRS {
            if let Some(&nid) = by_axial.get(&(q + dq, r + dr)) {
                if id < nid {
                    topo.add_edge(id, nid);
                }
            }
        }
    }

    // Triangles: for each vertex and each consecutive direction pair, emit
    // the triangle once, keyed by the minimum id of the triple.
    let mut cells: Vec<((i32, i32), VertexId)> = by_axial.iter().map(|(&c, &v)| (c, v)).collect();
    cells.sort_by_key(|&(_, v)| v);
    for ((q, r), id) in cells {
        for i in 0..6 {
            let (dq1, dr1) = AXIAL_DIRS[i];
            let (dq2, dr2) = AXIAL_DIRS[(i + 1) % 6];
            let n1 = by_axial.get(&(q + dq1, r + dr1));
            let n2 = by_axial.get(&(q + dq2, r + dr2));
            if let (Some(&a), Some(&b)) = (n1, n2) {
                if id < a && id < b {
                    topo.add_triangle([id, a, b]);
                }
            }
        }
    }

    // Symmetry orbits: 120 degrees maps (q, r) -> (-q - r, q), 240 degrees
    // maps (q, r) -> (r, -q - r). Only the center maps onto itself, so it
    // alone gets the explicit size-1 orbit.
    for id in 0..topo.verts.len() {
        let (q, r) = (topo.verts[id].q, topo.verts[id].r);
        if q == 0 && r == 0 {
            topo.verts[id].orbit = Orbit::Fixed;
            continue;
        }
        let p120 = by_axial.get(&(-q - r, q)).copied().unwrap_or(id);
        let p240 = by_axial.get(&(r, -q - r)).copied().unwrap_or(id);
        topo.verts[id].orbit = Orbit::Trio([id, p120, p240]);
    }

    topo
}

/// The 6 extremal rim vertices, one per hex corner direction.
///
/// Each corner is the vertex with the strictly maximal projection onto that
/// corner's unit direction; ties keep the earlier vertex.
pub fn corner_vertices(topo: &Topology) -> [VertexId; 6] {
    let mut corners = [0usize; 6];
    for (i, corner) in corners.iter_mut().enumerate() {
        let theta = std::f64::consts::PI / 3.0 * i as f64;
        let (ux, uy) = (theta.cos(), theta.sin());
        let mut best = 0usize;
        let mut best_proj = f64::NEG_INFINITY;
        for v in &topo.verts {
            if !v.visible {
                continue;
            }
            let proj = v.x * ux + v.y * uy;
            if proj > best_proj {
                best_proj = proj;
                best = v.id;
            }
        }
        *corner = best;
    }
    corners
}
