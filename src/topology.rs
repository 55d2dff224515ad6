//! Shared mutable mesh state: vertices, faces, and adjacency.
//!
//! All mesh algorithms operate on a single [`Topology`] value threaded through
//! every operation. Entities live in arenas indexed by plain `usize` ids; ids
//! are never reused and entities are never removed, only deactivated. That
//! keeps ids stable across undo/redo and save/load.
//!
//! Edges are derived state: they can always be rebuilt from the active face
//! set, and [`Topology::rebuild_edges_from_quads`] does exactly that after
//! subdivision or load instead of patching old edges.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Stable arena index of a vertex.
pub type VertexId = usize;
/// Stable arena index of an edge (stable until the next full edge rebuild).
pub type EdgeId = usize;
/// Stable arena index of a triangle.
pub type TriId = usize;
/// Stable arena index of a quad.
pub type QuadId = usize;

/// How a vertex came to exist, and whether it sits on the board rim.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VertexKind {
    /// Lattice vertex at exactly hex distance R from the center. Immovable.
    Border,
    /// Lattice vertex strictly inside the rim.
    Interior,
    /// Edge midpoint created by subdivision.
    Midpoint,
    /// Face center created by subdivision.
    Center,
}

/// The 3-fold rotational symmetry class of a vertex.
///
/// `Trio` lists the vertex itself followed by its 120- and 240-degree images
/// about the board center. `Fixed` is the explicit size-1 orbit: the unique
/// center vertex, and every vertex derived after grid build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orbit {
    Fixed,
    Trio([VertexId; 3]),
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub id: VertexId,
    pub x: f64,
    pub y: f64,
    pub kind: VertexKind,
    /// Axial lattice coordinates. Derived vertices carry (0, 0).
    pub q: i32,
    pub r: i32,
    /// Ids of vertices connected by an active edge.
    pub neighbors: BTreeSet<VertexId>,
    /// Active triangles this vertex belongs to.
    pub tris: BTreeSet<TriId>,
    /// Active quads this vertex belongs to.
    pub quads: BTreeSet<QuadId>,
    pub orbit: Orbit,
    pub visible: bool,
}

impl Vertex {
    /// The i-th member of this vertex's symmetry orbit (i in 0..3).
    /// A `Fixed` orbit answers with the vertex itself for every index.
    pub fn orbit_member(&self, i: usize) -> VertexId {
        match self.orbit {
            Orbit::Fixed => self.id,
            Orbit::Trio(ids) => ids[i],
        }
    }

    /// Whether mirrored editing may displace this vertex.
    /// Border vertices and the center (the only `Fixed` lattice vertex) are
    /// pinned.
    pub fn editable(&self) -> bool {
        self.kind == VertexKind::Interior && matches!(self.orbit, Orbit::Trio(_))
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    /// Canonically ordered endpoints, `a < b`.
    pub a: VertexId,
    pub b: VertexId,
    /// Cached midpoint, refreshed whenever an endpoint moves.
    pub mid: (f64, f64),
    pub active: bool,
}

#[derive(Clone, Debug)]
pub struct Triangle {
    pub verts: [VertexId; 3],
    pub active: bool,
}

#[derive(Clone, Debug)]
pub struct Quad {
    /// Boundary vertices ordered by angle around the centroid, so the
    /// boundary is simple.
    pub verts: [VertexId; 4],
    pub active: bool,
    /// Cached shoelace area, recomputed by the relaxer every iteration.
    pub area: f64,
}

/// The whole mesh: vertex/edge/face arenas plus the derived edge lookup.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    pub verts: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub tris: Vec<Triangle>,
    pub quads: Vec<Quad>,
    /// (a, b) -> edge id for canonical endpoint pairs. Derived; rebuilt
    /// together with the edge arena.
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,
}

#[inline]
fn canonical(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b { (a, b) } else { (b, a) }
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Vertices
    // =========================================================================

    pub fn add_vertex(&mut self, x: f64, y: f64, kind: VertexKind, q: i32, r: i32) -> VertexId {
        let id = self.verts.len();
        self.verts.push(Vertex {
            id,
            x,
            y,
            kind,
            q,
            r,
            neighbors: BTreeSet::new(),
            tris: BTreeSet::new(),
            quads: BTreeSet::new(),
            orbit: Orbit::Fixed,
            visible: true,
        });
        id
    }

    #[inline]
    pub fn position(&self, id: VertexId) -> (f64, f64) {
        let v = &self.verts[id];
        (v.x, v.y)
    }

    /// Centroid of a set of vertices.
    pub fn centroid(&self, ids: &[VertexId]) -> (f64, f64) {
        let mut cx = 0.0;
        let mut cy = 0.0;
        for &id in ids {
            cx += self.verts[id].x;
            cy += self.verts[id].y;
        }
        let n = ids.len() as f64;
        (cx / n, cy / n)
    }

    /// Sort 4 vertices by angle around their shared centroid, yielding a
    /// simple (non-self-intersecting) quad boundary.
    pub fn angle_sorted(&self, ids: [VertexId; 4]) -> [VertexId; 4] {
        let (cx, cy) = self.centroid(&ids);
        let mut sorted = ids;
        sorted.sort_by(|&p, &q| {
            let ap = (self.verts[p].y - cy).atan2(self.verts[p].x - cx);
            let aq = (self.verts[q].y - cy).atan2(self.verts[q].x - cx);
            ap.partial_cmp(&aq).unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    // =========================================================================
    // Edges
    // =========================================================================

    /// Create (or return the existing) active edge between two vertices,
    /// registering the mutual neighbor relation.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        let key = canonical(a, b);
        if let Some(&eid) = self.edge_index.get(&key) {
            if self.edges[eid].active {
                return eid;
            }
        }
        let eid = self.edges.len();
        let mid = self.midpoint_of(key.0, key.1);
        self.edges.push(Edge {
            a: key.0,
            b: key.1,
            mid,
            active: true,
        });
        self.edge_index.insert(key, eid);
        self.verts[a].neighbors.insert(b);
        self.verts[b].neighbors.insert(a);
        eid
    }

    /// Active edge between two vertices, if any.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_index
            .get(&canonical(a, b))
            .copied()
            .filter(|&eid| self.edges[eid].active)
    }

    /// Deactivate an edge and drop the neighbor relation between its
    /// endpoints. No-op on an already inactive edge.
    pub fn deactivate_edge(&mut self, eid: EdgeId) {
        if !self.edges[eid].active {
            return;
        }
        self.edges[eid].active = false;
        let (a, b) = (self.edges[eid].a, self.edges[eid].b);
        self.verts[a].neighbors.remove(&b);
        self.verts[b].neighbors.remove(&a);
    }

    #[inline]
    fn midpoint_of(&self, a: VertexId, b: VertexId) -> (f64, f64) {
        (
            (self.verts[a].x + self.verts[b].x) / 2.0,
            (self.verts[a].y + self.verts[b].y) / 2.0,
        )
    }

    /// Refresh the cached midpoint of every active edge touching one of the
    /// given vertices.
    pub fn refresh_midpoints_touching(&mut self, moved: &[VertexId]) {
        for eid in 0..self.edges.len() {
            let (a, b, active) = {
                let e = &self.edges[eid];
                (e.a, e.b, e.active)
            };
            if active && (moved.contains(&a) || moved.contains(&b)) {
                self.edges[eid].mid = self.midpoint_of(a, b);
            }
        }
    }

    /// Refresh every active edge midpoint. Used after a relaxation sweep
    /// where most vertices moved.
    pub fn refresh_all_midpoints(&mut self) {
        for eid in 0..self.edges.len() {
            let (a, b, active) = {
                let e = &self.edges[eid];
                (e.a, e.b, e.active)
            };
            if active {
                self.edges[eid].mid = self.midpoint_of(a, b);
            }
        }
    }

    // =========================================================================
    // Faces
    // =========================================================================

    pub fn add_triangle(&mut self, verts: [VertexId; 3]) -> TriId {
        let tid = self.tris.len();
        self.tris.push(Triangle {
            verts,
            active: true,
        });
        for &v in &verts {
            self.verts[v].tris.insert(tid);
        }
        tid
    }

    /// Register a quad whose boundary order the caller already established.
    pub fn add_quad(&mut self, verts: [VertexId; 4]) -> QuadId {
        let qid = self.quads.len();
        let area = self.shoelace(&verts);
        self.quads.push(Quad {
            verts,
            active: true,
            area,
        });
        for &v in &verts {
            self.verts[v].quads.insert(qid);
        }
        qid
    }

    /// Deactivate a triangle and remove it from its vertices' owning sets.
    pub fn deactivate_tri(&mut self, tid: TriId) {
        if !self.tris[tid].active {
            return;
        }
        self.tris[tid].active = false;
        for v in self.tris[tid].verts {
            self.verts[v].tris.remove(&tid);
        }
    }

    /// Deactivate a quad and remove it from its vertices' owning sets.
    pub fn deactivate_quad(&mut self, qid: QuadId) {
        if !self.quads[qid].active {
            return;
        }
        self.quads[qid].active = false;
        for v in self.quads[qid].verts {
            self.verts[v].quads.remove(&qid);
        }
    }

    /// Active triangles having both endpoints of the given edge.
    pub fn tris_sharing_edge(&self, eid: EdgeId) -> Vec<TriId> {
        let e = &self.edges[eid];
        self.verts[e.a]
            .tris
            .iter()
            .copied()
            .filter(|tid| self.tris[*tid].active && self.tris[*tid].verts.contains(&e.b))
            .collect()
    }

    /// Shoelace area of a simple polygon given by vertex ids.
    pub fn shoelace(&self, ids: &[VertexId]) -> f64 {
        let mut acc = 0.0;
        for i in 0..ids.len() {
            let p = &self.verts[ids[i]];
            let q = &self.verts[ids[(i + 1) % ids.len()]];
            acc += p.x * q.y - q.x * p.y;
        }
        acc.abs() / 2.0
    }

    /// Recompute every active quad's cached area from current positions.
    pub fn recompute_quad_areas(&mut self) {
        for qid in 0..self.quads.len() {
            if self.quads[qid].active {
                let verts = self.quads[qid].verts;
                self.quads[qid].area = self.shoelace(&verts);
            }
        }
    }

    // =========================================================================
    // Whole-mesh maintenance
    // =========================================================================

    /// Discard the entire edge arena and rebuild edges, neighbor sets, and
    /// visibility purely from the active quad set.
    ///
    /// Callable only once no triangle is active (after subdivision or load);
    /// a vertex not referenced by any active quad is marked invisible.
    pub fn rebuild_edges_from_quads(&mut self) {
        self.edges.clear();
        self.edge_index.clear();
        for v in &mut self.verts {
            v.neighbors.clear();
            v.visible = false;
        }
        for qid in 0..self.quads.len() {
            if !self.quads[qid].active {
                continue;
            }
            let verts = self.quads[qid].verts;
            for i in 0..4 {
                self.add_edge(verts[i], verts[(i + 1) % 4]);
                self.verts[verts[i]].visible = true;
            }
        }
    }

    // =========================================================================
    // Counts
    // =========================================================================

    pub fn active_tri_count(&self) -> usize {
        self.tris.iter().filter(|t| t.active).count()
    }

    pub fn active_quad_count(&self) -> usize {
        self.quads.iter().filter(|q| q.active).count()
    }

    pub fn visible_vert_count(&self) -> usize {
        self.verts.iter().filter(|v| v.visible).count()
    }

    /// Ids of all active triangles, in arena order.
    pub fn active_tris(&self) -> Vec<TriId> {
        (0..self.tris.len()).filter(|&t| self.tris[t].active).collect()
    }

    /// Ids of all active quads, in arena order.
    pub fn active_quads(&self) -> Vec<QuadId> {
        (0..self.quads.len()).filter(|&q| self.quads[q].active).collect()
    }
}
