//! Host-facing facade over the mesh editor and the rules engine.
//!
//! A [`Session`] owns the live mesh and game state, wraps every mutating
//! entry point with history capture, and exposes the read-only surface a UI
//! needs: live counts, the current interaction mode, hover descriptors,
//! undo/redo availability, game status, and the score breakdown.
//!
//! [`Session::run_shell`] drives the whole surface over a line-oriented text
//! protocol on stdin/stdout, one command per line:
//!
//! - `new <radius>` - rebuild the lattice
//! - `move <vertex> <dx> <dy>` - mirrored vertex move
//! - `delete-edge <a> <b>` - mirrored edge merge
//! - `merge-auto` - run automatic quadrangulation to completion
//! - `subdivide` - all-quad subdivision
//! - `relax <iterations>` - relaxation ticks
//! - `play <vertex>` / `pass` / `dead <vertex>` / `score` - game operations
//! - `undo` / `redo` - context-dependent history
//! - `describe <vertex>` / `status` - read-only queries
//! - `save <path>` / `load <path>` - mesh persistence
//! - `quit`

use std::io::{self, BufRead, Write};

use anyhow::Context;

use crate::constants::{DEFAULT_RADIUS, SPACING};
use crate::editor;
use crate::game::{Game, MoveError, ScoreBreakdown, Stone};
use crate::grid::build_grid;
use crate::history::{History, Snapshot};
use crate::merge::{AutoMerge, StepStatus};
use crate::persist;
use crate::relax::Relaxer;
use crate::topology::{Orbit, Topology, VertexId};

/// What the user is currently interacting with; selects the history context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    EditMesh,
    AutoMerge,
    Relax,
    Play,
}

/// Live entity counts for the UI.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Counts {
    pub triangles: usize,
    pub quads: usize,
    pub vertices: usize,
}

/// Owner of all live state plus the per-context histories.
pub struct Session {
    pub topo: Topology,
    pub game: Game,
    pub mode: Mode,
    hex_radius: i32,
    spacing: f64,
    mesh_history: History,
    game_history: History,
    auto: Option<AutoMerge>,
    relaxer: Relaxer,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS)
    }
}

impl Session {
    pub fn new(hex_radius: i32) -> Self {
        let topo = build_grid(hex_radius, SPACING);
        let game = Game::new();
        let mesh_history = History::new(Snapshot::mesh(&topo));
        let game_history = History::new(Snapshot::game(&game));
        Self {
            topo,
            game,
            mode: Mode::EditMesh,
            hex_radius,
            spacing: SPACING,
            mesh_history,
            game_history,
            auto: None,
            relaxer: Relaxer::new(),
        }
    }

    // =========================================================================
    // Read-only surface
    // =========================================================================

    pub fn counts(&self) -> Counts {
        Counts {
            triangles: self.topo.active_tri_count(),
            quads: self.topo.active_quad_count(),
            vertices: self.topo.visible_vert_count(),
        }
    }

    /// Hover descriptor for a vertex id.
    pub fn describe_vertex(&self, vid: VertexId) -> Option<String> {
        let v = self.topo.verts.get(vid)?;
        if !v.visible {
            return None;
        }
        let orbit = match v.orbit {
            Orbit::Fixed => format!("[{}]", v.id),
            Orbit::Trio([a, b, c]) => format!("[{a}, {b}, {c}]"),
        };
        Some(format!(
            "v{} {:?} at ({:.1}, {:.1}), {} neighbors, orbit {}",
            v.id,
            v.kind,
            v.x,
            v.y,
            v.neighbors.len(),
            orbit
        ))
    }

    /// Hover descriptor for the active edge between two vertices.
    pub fn describe_edge(&self, a: VertexId, b: VertexId) -> Option<String> {
        let eid = self.topo.edge_between(a, b)?;
        let e = &self.topo.edges[eid];
        Some(format!(
            "edge {}-{} mid ({:.1}, {:.1}), {} adjacent triangles",
            e.a,
            e.b,
            e.mid.0,
            e.mid.1,
            self.topo.tris_sharing_edge(eid).len()
        ))
    }

    pub fn can_undo(&self) -> bool {
        self.context().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.context().can_redo()
    }

    pub fn score(&self) -> ScoreBreakdown {
        self.game.score(&self.topo)
    }

    /// One-line summary of mesh and game state.
    pub fn status(&self) -> String {
        let counts = self.counts();
        let turn = match self.game.to_play {
            Stone::Black => "black",
            Stone::White => "white",
        };
        format!(
            "mode {:?}: {} triangles, {} quads, {} vertices | {} to play, captures B{} W{} | undo {} redo {}",
            self.mode,
            counts.triangles,
            counts.quads,
            counts.vertices,
            turn,
            self.game.captures_black,
            self.game.captures_white,
            self.can_undo(),
            self.can_redo(),
        )
    }

    // =========================================================================
    // Mesh operations
    // =========================================================================

    /// Rebuild the lattice from scratch, resetting both histories.
    pub fn rebuild(&mut self, hex_radius: i32) {
        *self = Session::new(hex_radius);
    }

    pub fn move_vertex(&mut self, vid: VertexId, dx: f64, dy: f64) -> bool {
        if vid >= self.topo.verts.len() {
            return false;
        }
        let applied = editor::move_vertex(&mut self.topo, vid, dx, dy);
        if applied {
            self.mesh_history.capture("move vertex", Snapshot::mesh(&self.topo));
        }
        applied
    }

    /// Mirrored edge deletion, addressed by endpoint pair.
    pub fn delete_edge(&mut self, a: VertexId, b: VertexId) -> bool {
        let Some(eid) = self.topo.edge_between(a, b) else {
            return false;
        };
        let merged = editor::delete_edge(&mut self.topo, eid);
        if merged > 0 {
            self.mesh_history.capture("delete edge", Snapshot::mesh(&self.topo));
        }
        merged > 0
    }

    /// Run automatic quadrangulation to completion. Either the mesh becomes
    /// all-quad or it is exactly the pre-call mesh.
    pub fn merge_auto(&mut self) -> bool {
        self.mode = Mode::AutoMerge;
        self.auto = Some(AutoMerge::new(&self.topo));
        loop {
            match self.step_once() {
                StepStatus::Progress => {}
                StepStatus::Done => return true,
                StepStatus::Failed => return false,
            }
        }
    }

    /// One tick of whichever step-driven algorithm the mode selects.
    pub fn step_once(&mut self) -> StepStatus {
        match self.mode {
            Mode::AutoMerge => {
                let Some(auto) = self.auto.as_mut() else {
                    return StepStatus::Done;
                };
                let status = auto.step(&mut self.topo);
                match status {
                    StepStatus::Progress => {}
                    StepStatus::Done => {
                        self.auto = None;
                        self.mode = Mode::EditMesh;
                        self.mesh_history.capture("auto merge", Snapshot::mesh(&self.topo));
                    }
                    StepStatus::Failed => {
                        self.auto = None;
                        self.mode = Mode::EditMesh;
                    }
                }
                status
            }
            Mode::Relax => self.relaxer.step(&mut self.topo),
            Mode::EditMesh | Mode::Play => StepStatus::Done,
        }
    }

    pub fn subdivide(&mut self) {
        crate::subdivide::subdivide(&mut self.topo);
        self.mesh_history.capture("subdivide", Snapshot::mesh(&self.topo));
    }

    /// Run relaxation iterations. Refused while triangles remain.
    pub fn relax(&mut self, iterations: usize) -> bool {
        let previous = self.mode;
        self.mode = Mode::Relax;
        for _ in 0..iterations {
            if self.relaxer.step(&mut self.topo) == StepStatus::Failed {
                self.mode = previous;
                return false;
            }
        }
        self.mode = Mode::EditMesh;
        self.mesh_history.capture("relax", Snapshot::mesh(&self.topo));
        true
    }

    // =========================================================================
    // Game operations
    // =========================================================================

    pub fn place_stone(&mut self, vid: VertexId) -> Result<(), MoveError> {
        self.mode = Mode::Play;
        self.game.place_stone(&self.topo, vid)?;
        self.game_history.capture("play", Snapshot::game(&self.game));
        Ok(())
    }

    pub fn pass(&mut self) {
        self.mode = Mode::Play;
        self.game.pass();
        self.game_history.capture("pass", Snapshot::game(&self.game));
    }

    pub fn toggle_dead(&mut self, vid: VertexId) {
        self.game.toggle_dead(&self.topo, vid);
        self.game_history.capture("toggle dead", Snapshot::game(&self.game));
    }

    // =========================================================================
    // History
    // =========================================================================

    fn context(&self) -> &History {
        match self.mode {
            Mode::Play => &self.game_history,
            _ => &self.mesh_history,
        }
    }

    /// Undo within the current interaction context.
    pub fn undo(&mut self) -> bool {
        let context = match self.mode {
            Mode::Play => &mut self.game_history,
            _ => &mut self.mesh_history,
        };
        let Some(snap) = context.undo() else {
            return false;
        };
        let snap = snap.clone();
        snap.restore(&mut self.topo, &mut self.game);
        true
    }

    /// Redo within the current interaction context.
    pub fn redo(&mut self) -> bool {
        let context = match self.mode {
            Mode::Play => &mut self.game_history,
            _ => &mut self.mesh_history,
        };
        let Some(snap) = context.redo() else {
            return false;
        };
        let snap = snap.clone();
        snap.restore(&mut self.topo, &mut self.game);
        true
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub fn save_json(&self) -> serde_json::Result<String> {
        persist::save_json(&self.topo, self.hex_radius, self.spacing)
    }

    /// Replace the live mesh from JSON. On error the live mesh is untouched.
    pub fn load_json(&mut self, json: &str) -> Result<(), persist::LoadError> {
        let loaded = persist::load_json(json)?;
        self.topo = loaded.topo;
        self.hex_radius = loaded.hex_radius;
        self.spacing = loaded.spacing;
        self.game = Game::new();
        self.mesh_history = History::new(Snapshot::mesh(&self.topo));
        self.game_history = History::new(Snapshot::game(&self.game));
        Ok(())
    }

    // =========================================================================
    // Shell
    // =========================================================================

    /// Run the interactive command loop on stdin/stdout.
    pub fn run_shell(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line.context("reading command")?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            writeln!(stdout, "{prefix} {message}")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Execute one shell command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "new" => match args.first().map(|a| a.parse::<i32>()) {
                Some(Ok(radius)) if radius >= 1 => {
                    self.rebuild(radius);
                    (true, self.status())
                }
                _ => (false, "usage: new <radius>".to_string()),
            },

            "move" => {
                let parsed = (
                    args.first().and_then(|a| a.parse::<usize>().ok()),
                    args.get(1).and_then(|a| a.parse::<f64>().ok()),
                    args.get(2).and_then(|a| a.parse::<f64>().ok()),
                );
                match parsed {
                    (Some(vid), Some(dx), Some(dy)) => {
                        if self.move_vertex(vid, dx, dy) {
                            (true, String::new())
                        } else {
                            (true, "ignored: vertex is pinned".to_string())
                        }
                    }
                    _ => (false, "usage: move <vertex> <dx> <dy>".to_string()),
                }
            }

            "delete-edge" => {
                let parsed = (
                    args.first().and_then(|a| a.parse::<usize>().ok()),
                    args.get(1).and_then(|a| a.parse::<usize>().ok()),
                );
                match parsed {
                    (Some(a), Some(b)) => {
                        if self.delete_edge(a, b) {
                            (true, String::new())
                        } else {
                            (true, "ignored: edge is not mergeable".to_string())
                        }
                    }
                    _ => (false, "usage: delete-edge <a> <b>".to_string()),
                }
            }

            "merge-auto" => {
                if self.merge_auto() {
                    (true, format!("{} quads", self.counts().quads))
                } else {
                    (false, "quadrangulation failed; mesh restored".to_string())
                }
            }

            "subdivide" => {
                self.subdivide();
                (true, format!("{} quads", self.counts().quads))
            }

            "relax" => {
                let iterations = args
                    .first()
                    .and_then(|a| a.parse::<usize>().ok())
                    .unwrap_or(1);
                if self.relax(iterations) {
                    (true, String::new())
                } else {
                    (false, "relaxation refused: triangles remain".to_string())
                }
            }

            "play" => match args.first().map(|a| a.parse::<usize>()) {
                Some(Ok(vid)) => match self.place_stone(vid) {
                    Ok(()) => (true, String::new()),
                    Err(err) => (false, err.to_string()),
                },
                _ => (false, "usage: play <vertex>".to_string()),
            },

            "pass" => {
                self.pass();
                (true, String::new())
            }

            "dead" => match args.first().map(|a| a.parse::<usize>()) {
                Some(Ok(vid)) => {
                    self.toggle_dead(vid);
                    (true, String::new())
                }
                _ => (false, "usage: dead <vertex>".to_string()),
            },

            "score" => {
                let s = self.score();
                (
                    true,
                    format!(
                        "black {} ({} stones + {} territory), white {} ({} stones + {} territory + {} komi)",
                        s.black_total,
                        s.black_stones,
                        s.black_territory,
                        s.white_total,
                        s.white_stones,
                        s.white_territory,
                        s.komi
                    ),
                )
            }

            "undo" => {
                if self.undo() {
                    (true, String::new())
                } else {
                    (false, "nothing to undo".to_string())
                }
            }

            "redo" => {
                if self.redo() {
                    (true, String::new())
                } else {
                    (false, "nothing to redo".to_string())
                }
            }

            "describe" => match args.first().map(|a| a.parse::<usize>()) {
                Some(Ok(vid)) => match self.describe_vertex(vid) {
                    Some(text) => (true, text),
                    None => (false, "no visible vertex with that id".to_string()),
                },
                _ => (false, "usage: describe <vertex>".to_string()),
            },

            "status" => (true, self.status()),

            "save" => match args.first() {
                Some(path) => match self.save_and_write(path) {
                    Ok(()) => (true, String::new()),
                    Err(err) => (false, format!("{err:#}")),
                },
                None => (false, "usage: save <path>".to_string()),
            },

            "load" => match args.first() {
                Some(path) => match self.read_and_load(path) {
                    Ok(()) => (true, self.status()),
                    Err(err) => (false, format!("{err:#}")),
                },
                None => (false, "usage: load <path>".to_string()),
            },

            "quit" => (true, String::new()),

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn save_and_write(&self, path: &str) -> anyhow::Result<()> {
        let json = self.save_json().context("serializing mesh")?;
        std::fs::write(path, json).with_context(|| format!("writing {path}"))?;
        Ok(())
    }

    fn read_and_load(&mut self, path: &str) -> anyhow::Result<()> {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        self.load_json(&json).context("rebuilding mesh")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_track_operations() {
        fastrand::seed(3);
        let mut session = Session::new(2);
        let before = session.counts();
        assert_eq!(before.quads, 0);
        assert!(session.merge_auto());
        assert_eq!(session.counts().triangles, 0);
        session.subdivide();
        assert_eq!(session.counts().triangles, 0);
        assert!(session.counts().quads > before.quads);
    }

    #[test]
    fn test_undo_context_follows_mode() {
        fastrand::seed(5);
        let mut session = Session::new(2);
        assert!(session.merge_auto());
        session.subdivide();

        // Game context: play then undo removes the stone, not the mesh state.
        let vid = session.topo.verts.iter().find(|v| v.visible).unwrap().id;
        session.place_stone(vid).unwrap();
        let quads = session.counts().quads;
        assert!(session.undo());
        assert!(session.game.board.is_empty());
        assert_eq!(session.counts().quads, quads);

        // Mesh context: undo walks mesh snapshots.
        session.mode = Mode::EditMesh;
        assert!(session.undo());
        assert!(session.counts().triangles > 0 || session.counts().quads < quads);
    }

    #[test]
    fn test_shell_execute_round_trip() {
        let mut session = Session::new(1);
        let (ok, _) = session.execute("merge-auto", &[]);
        assert!(ok);
        let (ok, msg) = session.execute("status", &[]);
        assert!(ok && msg.contains("quads"));
        let (ok, _) = session.execute("bogus", &[]);
        assert!(!ok);
    }

    #[test]
    fn test_describe_vertex_and_edge() {
        let session = Session::new(1);
        let text = session.describe_vertex(0).expect("vertex 0 visible");
        assert!(text.contains("v0"));
        let v = &session.topo.verts[0];
        let &n = v.neighbors.iter().next().unwrap();
        assert!(session.describe_edge(0, n).is_some());
        assert!(session.describe_edge(0, 0).is_none());
    }

    #[test]
    fn test_failed_load_keeps_live_mesh() {
        let mut session = Session::new(2);
        let quads_before = session.counts();
        assert!(session.load_json("{broken").is_err());
        assert_eq!(session.counts(), quads_before);
    }
}
