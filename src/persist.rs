//! JSON persistence of quadrangulated meshes.
//!
//! A save always happens post-quadrangulation, so only vertices and quads are
//! written; edges, neighbor sets, and visibility are derived and get rebuilt
//! on load purely from the quad list. Loading fails closed: any missing or
//! inconsistent field yields a [`LoadError`] and the caller's live state is
//! never touched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::MESH_FORMAT_VERSION;
use crate::topology::{Orbit, Topology, VertexKind};

/// Persisted mesh document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshFile {
    pub version: u32,
    pub hex_radius: i32,
    pub spacing: f64,
    pub vertices: Vec<VertexRecord>,
    pub quads: Vec<QuadRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexRecord {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub kind: VertexKind,
    pub q: i32,
    pub r: i32,
    /// 1 id (fixed orbit) or 3 ids (the vertex plus its rotated images).
    pub orbit: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadRecord {
    pub verts: [usize; 4],
}

/// Why a persisted mesh was rejected.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported mesh format version {0}")]
    Version(u32),
    #[error("vertex record {index} has id {id}; ids must be dense and in order")]
    VertexIds { index: usize, id: usize },
    #[error("vertex {0} has a malformed symmetry orbit")]
    MalformedOrbit(usize),
    #[error("quad {0} references an unknown or repeated vertex")]
    MalformedQuad(usize),
    #[error("malformed mesh JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A successfully reconstructed mesh plus the build parameters it was saved
/// with.
#[derive(Debug)]
pub struct LoadedMesh {
    pub topo: Topology,
    pub hex_radius: i32,
    pub spacing: f64,
}

/// Serialize the mesh. Every vertex is written (ids must stay stable for the
/// quad references); only active quads are, and triangles never are.
pub fn to_file(topo: &Topology, hex_radius: i32, spacing: f64) -> MeshFile {
    let vertices = topo
        .verts
        .iter()
        .map(|v| VertexRecord {
            id: v.id,
            x: v.x,
            y: v.y,
            kind: v.kind,
            q: v.q,
            r: v.r,
            orbit: match v.orbit {
                Orbit::Fixed => vec![v.id],
                Orbit::Trio(ids) => ids.to_vec(),
            },
        })
        .collect();
    let quads = topo
        .active_quads()
        .into_iter()
        .map(|qid| QuadRecord {
            verts: topo.quads[qid].verts,
        })
        .collect();
    MeshFile {
        version: MESH_FORMAT_VERSION,
        hex_radius,
        spacing,
        vertices,
        quads,
    }
}

/// Rebuild a mesh from a persisted document.
///
/// Edges, neighbor sets, and visibility are reconstructed from the quad list
/// alone. Every validation failure rejects the whole document.
pub fn from_file(file: &MeshFile) -> Result<LoadedMesh, LoadError> {
    if file.version != MESH_FORMAT_VERSION {
        return Err(LoadError::Version(file.version));
    }

    let mut topo = Topology::new();
    let n = file.vertices.len();
    for (index, rec) in file.vertices.iter().enumerate() {
        if rec.id != index {
            return Err(LoadError::VertexIds { index, id: rec.id });
        }
        topo.add_vertex(rec.x, rec.y, rec.kind, rec.q, rec.r);
    }
    for rec in &file.vertices {
        topo.verts[rec.id].orbit = match rec.orbit.as_slice() {
            &[only] if only == rec.id => Orbit::Fixed,
            &[a, b, c] if a == rec.id && b < n && c < n => Orbit::Trio([a, b, c]),
            _ => return Err(LoadError::MalformedOrbit(rec.id)),
        };
    }

    for (i, quad) in file.quads.iter().enumerate() {
        let verts = quad.verts;
        let distinct = verts
            .iter()
            .all(|v| *v < n && verts.iter().filter(|w| *w == v).count() == 1);
        if !distinct {
            return Err(LoadError::MalformedQuad(i));
        }
        topo.add_quad(verts);
    }

    topo.rebuild_edges_from_quads();
    Ok(LoadedMesh {
        topo,
        hex_radius: file.hex_radius,
        spacing: file.spacing,
    })
}

/// Serialize the mesh to a JSON string.
pub fn save_json(topo: &Topology, hex_radius: i32, spacing: f64) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&to_file(topo, hex_radius, spacing))
}

/// Parse and rebuild a mesh from a JSON string, failing closed.
pub fn load_json(json: &str) -> Result<LoadedMesh, LoadError> {
    let file: MeshFile = serde_json::from_str(json)?;
    from_file(&file)
}
