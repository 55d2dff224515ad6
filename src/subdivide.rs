//! All-quad subdivision of a mixed triangle/quad mesh.
//!
//! Every active face is split around one new center vertex and one shared
//! midpoint vertex per boundary edge, emitting one child quad per original
//! vertex. Triangles become 3 quads, quads become 4. Source faces are
//! deactivated permanently, and afterwards the edge arena is discarded and
//! rebuilt purely from the surviving quad set.

use std::collections::HashMap;

use crate::topology::{Topology, VertexId, VertexKind};

/// Split every active face into per-vertex quads, leaving zero active
/// triangles.
pub fn subdivide(topo: &mut Topology) {
    let tris = topo.active_tris();
    let quads = topo.active_quads();
    // Midpoint vertices are shared between the two faces of an edge, keyed by
    // the unordered endpoint pair.
    let mut midcache: HashMap<(VertexId, VertexId), VertexId> = HashMap::new();

    for tid in tris {
        let verts = topo.tris[tid].verts.to_vec();
        split_face(topo, &verts, &mut midcache);
        topo.deactivate_tri(tid);
    }
    for qid in quads {
        let verts = topo.quads[qid].verts.to_vec();
        split_face(topo, &verts, &mut midcache);
        topo.deactivate_quad(qid);
    }

    topo.rebuild_edges_from_quads();
}

/// Emit one child quad per boundary vertex of a face:
/// {vertex, forward midpoint, face center, backward midpoint}.
fn split_face(
    topo: &mut Topology,
    boundary: &[VertexId],
    midcache: &mut HashMap<(VertexId, VertexId), VertexId>,
) {
    let n = boundary.len();
    let mids: Vec<VertexId> = (0..n)
        .map(|i| midpoint_vertex(topo, boundary[i], boundary[(i + 1) % n], midcache))
        .collect();
    let (cx, cy) = topo.centroid(boundary);
    let center = topo.add_vertex(cx, cy, VertexKind::Center, 0, 0);

    for i in 0..n {
        let forward = mids[i];
        let backward = mids[(i + n - 1) % n];
        topo.add_quad([boundary[i], forward, center, backward]);
    }
}

/// Get or create the midpoint vertex of an edge. The midpoint inherits the
/// border kind only when both parent endpoints sit on the rim.
fn midpoint_vertex(
    topo: &mut Topology,
    a: VertexId,
    b: VertexId,
    midcache: &mut HashMap<(VertexId, VertexId), VertexId>,
) -> VertexId {
    let key = if a < b { (a, b) } else { (b, a) };
    if let Some(&mid) = midcache.get(&key) {
        return mid;
    }
    let (ax, ay) = topo.position(a);
    let (bx, by) = topo.position(b);
    let kind = if topo.verts[a].kind == VertexKind::Border && topo.verts[b].kind == VertexKind::Border
    {
        VertexKind::Border
    } else {
        VertexKind::Midpoint
    };
    let mid = topo.add_vertex((ax + bx) / 2.0, (ay + by) / 2.0, kind, 0, 0);
    midcache.insert(key, mid);
    mid
}
