//! Whole-state snapshot undo/redo.
//!
//! Undo covers two heterogeneous kinds of mutation — mesh edits and game
//! moves — so snapshots are a tagged union of full deep copies rather than
//! per-operation inverse deltas. Memory is traded for correctness: restoring
//! is a wholesale replacement, never a patch, and snapshots never alias live
//! state.

use crate::game::Game;
use crate::topology::Topology;

/// A full copy of one kind of restorable state.
#[derive(Clone, Debug)]
pub enum Snapshot {
    MeshEdit(Box<Topology>),
    GameMove(Box<Game>),
}

impl Snapshot {
    /// Deep-copy the mesh into a snapshot.
    pub fn mesh(topo: &Topology) -> Self {
        Snapshot::MeshEdit(Box::new(topo.clone()))
    }

    /// Deep-copy the game state into a snapshot.
    pub fn game(game: &Game) -> Self {
        Snapshot::GameMove(Box::new(game.clone()))
    }

    /// Reconstruct live state from this snapshot, replacing whichever kind
    /// of state the snapshot holds.
    pub fn restore(&self, topo: &mut Topology, game: &mut Game) {
        match self {
            Snapshot::MeshEdit(saved) => *topo = (**saved).clone(),
            Snapshot::GameMove(saved) => *game = (**saved).clone(),
        }
    }
}

/// An append-only snapshot stack with a cursor.
///
/// `capture` truncates any redo tail beyond the cursor, appends, and
/// advances; `undo`/`redo` move the cursor and hand back the snapshot to
/// restore from.
#[derive(Debug)]
pub struct History {
    entries: Vec<(String, Snapshot)>,
    index: usize,
}

impl History {
    /// Start a history whose baseline is the given snapshot.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            entries: vec![("initial".to_string(), initial)],
            index: 0,
        }
    }

    /// Record a new snapshot after a mutation, discarding any redo tail.
    pub fn capture(&mut self, label: &str, snap: Snapshot) {
        self.entries.truncate(self.index + 1);
        self.entries.push((label.to_string(), snap));
        self.index = self.entries.len() - 1;
    }

    /// Step the cursor back one entry and return the snapshot to restore.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index].1)
    }

    /// Step the cursor forward one entry and return the snapshot to restore.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index].1)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Label of the entry the cursor currently points at.
    pub fn current_label(&self) -> &str {
        &self.entries[self.index].0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SPACING;
    use crate::editor::move_vertex;
    use crate::grid::build_grid;

    #[test]
    fn test_undo_restores_exact_mesh() {
        let mut topo = build_grid(2, SPACING);
        let mut game = Game::new();
        let mut history = History::new(Snapshot::mesh(&topo));

        let id = topo.verts.iter().find(|v| v.editable()).unwrap().id;
        let before = topo.position(id);
        move_vertex(&mut topo, id, 4.0, 4.0);
        history.capture("move", Snapshot::mesh(&topo));

        let snap = history.undo().expect("one undo available").clone();
        snap.restore(&mut topo, &mut game);
        assert_eq!(topo.position(id), before);
        assert!(!history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn test_capture_truncates_redo_tail() {
        let topo = build_grid(1, SPACING);
        let mut history = History::new(Snapshot::mesh(&topo));
        history.capture("a", Snapshot::mesh(&topo));
        history.capture("b", Snapshot::mesh(&topo));
        history.undo();
        assert!(history.can_redo());
        history.capture("c", Snapshot::mesh(&topo));
        assert!(!history.can_redo());
        assert_eq!(history.current_label(), "c");
    }

    #[test]
    fn test_snapshots_do_not_alias_live_state() {
        let mut topo = build_grid(2, SPACING);
        let mut game = Game::new();
        let mut history = History::new(Snapshot::mesh(&topo));
        history.capture("baseline", Snapshot::mesh(&topo));

        let id = topo.verts.iter().find(|v| v.editable()).unwrap().id;
        let neighbors_before = topo.verts[id].neighbors.clone();
        // Mutate live sets after the capture; the snapshot must not follow.
        topo.verts[id].neighbors.clear();

        let snap = history.undo().unwrap().clone();
        snap.restore(&mut topo, &mut game);
        assert_eq!(topo.verts[id].neighbors, neighbors_before);
    }

    #[test]
    fn test_redo_round_trip_for_game_moves() {
        let topo = build_grid(1, SPACING);
        let mut game = Game::new();
        let mut history = History::new(Snapshot::game(&game));

        game.place_stone(&topo, 0).unwrap();
        history.capture("play 0", Snapshot::game(&game));

        let mut scratch_topo = topo.clone();
        let undone = history.undo().unwrap().clone();
        undone.restore(&mut scratch_topo, &mut game);
        assert!(game.board.is_empty());

        let redone = history.redo().unwrap().clone();
        redone.restore(&mut scratch_topo, &mut game);
        assert_eq!(game.board.len(), 1);
    }
}
