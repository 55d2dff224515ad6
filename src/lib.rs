//! Hexgoban: a procedural hexagonal Go board builder and rules engine.
//!
//! This crate builds a triangulated hex-lattice mesh, lets the user sculpt it
//! under enforced 3-fold rotational symmetry, converts it into an all-quad
//! board, smooths it, and then plays Go on the resulting irregular graph.
//!
//! ## Modules
//!
//! - [`constants`] - Lattice dimensions and algorithm parameters
//! - [`topology`] - The shared mutable mesh (vertices, edges, faces, adjacency)
//! - [`grid`] - Initial hex lattice construction and symmetry orbits
//! - [`editor`] - Mirrored vertex moves and edge deletions
//! - [`merge`] - Randomized triangle-to-quad merging with retry
//! - [`subdivide`] - All-quad subdivision
//! - [`relax`] - Area-weighted mesh smoothing
//! - [`game`] - Go rules: groups, liberties, ko, scoring
//! - [`history`] - Whole-state snapshot undo/redo
//! - [`persist`] - JSON mesh save/load
//! - [`session`] - Facade tying everything together for a host UI
//!
//! ## Example
//!
//! ```
//! use hexgoban::session::Session;
//!
//! // Build a board, quadrangulate it, and play the first stone.
//! let mut session = Session::new(2);
//! assert!(session.merge_auto());
//! session.subdivide();
//! session.relax(10);
//!
//! let vertex = session.topo.verts.iter().find(|v| v.visible).unwrap().id;
//! session.place_stone(vertex).unwrap();
//! ```

pub mod constants;
pub mod editor;
pub mod game;
pub mod grid;
pub mod history;
pub mod merge;
pub mod persist;
pub mod relax;
pub mod session;
pub mod subdivide;
pub mod topology;
