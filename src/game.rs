//! Go rules on an irregular board graph.
//!
//! This module provides the game logic for playing Go on the mesh:
//! - Stone placement keyed by mesh vertex ids
//! - Connected-group search and liberty counting over current neighbor sets
//! - Suicide and simple-ko validation with atomic commit-or-revert
//! - Dead-stone marking and Tromp-Taylor area scoring
//!
//! The board graph is whatever the mesh currently is; neighbor sets change
//! between games as edges are merged, and the engine just follows them.

use std::collections::{BTreeMap, BTreeSet};

use crate::constants::KOMI;
use crate::topology::{Topology, VertexId};

/// Stone color. Black moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stone {
    Black,
    White,
}

impl Stone {
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }
}

/// Result of attempting an illegal move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// Point already carries a stone
    Occupied,
    /// Point is not a visible vertex of the current mesh
    NotVisible,
    /// Move would leave its own group without liberties
    Suicide,
    /// Move recreates the board from immediately before the opponent's last move
    Ko,
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveError::Occupied => write!(f, "illegal move: point not empty"),
            MoveError::NotVisible => write!(f, "illegal move: not a board point"),
            MoveError::Suicide => write!(f, "illegal move: suicide"),
            MoveError::Ko => write!(f, "illegal move: retakes ko"),
        }
    }
}

/// One entry of the move history.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameMove {
    Play(VertexId),
    Pass,
}

/// Stone placement by vertex id.
pub type BoardMap = BTreeMap<VertexId, Stone>;

/// Full state of one game on the current mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    pub board: BoardMap,
    pub to_play: Stone,
    /// Stones captured by Black.
    pub captures_black: u32,
    /// Stones captured by White.
    pub captures_white: u32,
    /// Board from immediately before the last committed move; the simple-ko
    /// reference.
    ko_snapshot: Option<BoardMap>,
    pub moves: Vec<GameMove>,
    /// Vertices whose stones are marked dead for scoring.
    pub dead: BTreeSet<VertexId>,
    pub komi: f32,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self {
            board: BoardMap::new(),
            to_play: Stone::Black,
            captures_black: 0,
            captures_white: 0,
            ko_snapshot: None,
            moves: Vec::new(),
            dead: BTreeSet::new(),
            komi: KOMI,
        }
    }

    /// The connected same-color group containing the given stone.
    /// Order-independent; follows the mesh's current neighbor sets.
    pub fn group(&self, topo: &Topology, vid: VertexId) -> BTreeSet<VertexId> {
        group_in(&self.board, topo, vid)
    }

    /// Number of distinct empty, visible points adjacent to the group at the
    /// given stone.
    pub fn group_liberties(&self, topo: &Topology, vid: VertexId) -> usize {
        let group = self.group(topo, vid);
        liberties_in(&self.board, topo, &group)
    }

    /// Play a stone for the current player.
    ///
    /// The operation is atomic: it either fully commits (captures counted,
    /// ko reference updated, player switched, history appended) or leaves no
    /// observable state change behind.
    ///
    /// # Errors
    /// - [`MoveError::NotVisible`] if the vertex is not on the current board
    /// - [`MoveError::Occupied`] if the point carries a stone
    /// - [`MoveError::Suicide`] if the group would end with zero liberties
    /// - [`MoveError::Ko`] if the result recreates the previous board
    pub fn place_stone(&mut self, topo: &Topology, vid: VertexId) -> Result<(), MoveError> {
        if vid >= topo.verts.len() || !topo.verts[vid].visible {
            return Err(MoveError::NotVisible);
        }
        if self.board.contains_key(&vid) {
            return Err(MoveError::Occupied);
        }

        // Work on a scratch board; commit only once every check passes.
        let mut next = self.board.clone();
        next.insert(vid, self.to_play);

        let mut captured = 0u32;
        let enemy = self.to_play.opponent();
        for &n in &topo.verts[vid].neighbors {
            if next.get(&n) != Some(&enemy) {
                continue;
            }
            let group = group_in(&next, topo, n);
            if liberties_in(&next, topo, &group) == 0 {
                for dead in group {
                    next.remove(&dead);
                    captured += 1;
                }
            }
        }

        let own = group_in(&next, topo, vid);
        if liberties_in(&next, topo, &own) == 0 {
            // No capture freed space for the placed group.
            return Err(MoveError::Suicide);
        }

        if self.ko_snapshot.as_ref() == Some(&next) {
            return Err(MoveError::Ko);
        }

        match self.to_play {
            Stone::Black => self.captures_black += captured,
            Stone::White => self.captures_white += captured,
        }
        self.ko_snapshot = Some(std::mem::replace(&mut self.board, next));
        self.to_play = enemy;
        self.moves.push(GameMove::Play(vid));
        Ok(())
    }

    /// Pass. Switches the player and moves the ko reference forward, so any
    /// ko becomes retakable after the intervening turn.
    pub fn pass(&mut self) {
        self.ko_snapshot = Some(self.board.clone());
        self.to_play = self.to_play.opponent();
        self.moves.push(GameMove::Pass);
    }

    /// Toggle the dead mark on the whole group at the given stone.
    pub fn toggle_dead(&mut self, topo: &Topology, vid: VertexId) {
        if !self.board.contains_key(&vid) {
            return;
        }
        let group = self.group(topo, vid);
        if group.iter().any(|v| self.dead.contains(v)) {
            for v in group {
                self.dead.remove(&v);
            }
        } else {
            self.dead.extend(group);
        }
    }

    /// Tromp-Taylor area score over the current board.
    ///
    /// Living stones count for their color. Every maximal connected region of
    /// points that are empty or dead-marked scores for a color only when all
    /// live stones on its border share that color; mixed borders are neutral.
    /// Komi is added to White only.
    pub fn score(&self, topo: &Topology) -> ScoreBreakdown {
        let live = |vid: &VertexId| -> Option<Stone> {
            if self.dead.contains(vid) {
                None
            } else {
                self.board.get(vid).copied()
            }
        };

        let mut black_stones = 0u32;
        let mut white_stones = 0u32;
        for vid in self.board.keys() {
            match live(vid) {
                Some(Stone::Black) => black_stones += 1,
                Some(Stone::White) => white_stones += 1,
                None => {}
            }
        }

        let mut black_territory = 0u32;
        let mut white_territory = 0u32;
        let mut seen: BTreeSet<VertexId> = BTreeSet::new();
        for v in &topo.verts {
            if !v.visible || seen.contains(&v.id) || live(&v.id).is_some() {
                continue;
            }
            // Flood-fill the maximal empty-or-dead region around v.
            let mut region = BTreeSet::new();
            let mut border_colors = BTreeSet::new();
            let mut stack = vec![v.id];
            while let Some(p) = stack.pop() {
                if !region.insert(p) {
                    continue;
                }
                for &n in &topo.verts[p].neighbors {
                    if !topo.verts[n].visible {
                        continue;
                    }
                    match live(&n) {
                        Some(color) => {
                            border_colors.insert(color);
                        }
                        None => {
                            if !region.contains(&n) {
                                stack.push(n);
                            }
                        }
                    }
                }
            }
            seen.extend(region.iter().copied());
            let size = region.len() as u32;
            match (
                border_colors.contains(&Stone::Black),
                border_colors.contains(&Stone::White),
            ) {
                (true, false) => black_territory += size,
                (false, true) => white_territory += size,
                // Mixed or unbordered regions are neutral.
                _ => {}
            }
        }

        let black_total = (black_stones + black_territory) as f32;
        let white_total = (white_stones + white_territory) as f32 + self.komi;
        ScoreBreakdown {
            black_stones,
            white_stones,
            black_territory,
            white_territory,
            komi: self.komi,
            black_total,
            white_total,
        }
    }
}

/// Score record exposed to the host UI.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreBreakdown {
    pub black_stones: u32,
    pub white_stones: u32,
    pub black_territory: u32,
    pub white_territory: u32,
    pub komi: f32,
    pub black_total: f32,
    pub white_total: f32,
}

/// Flood-fill the same-color group containing `start` over visible neighbors.
fn group_in(board: &BoardMap, topo: &Topology, start: VertexId) -> BTreeSet<VertexId> {
    let Some(&color) = board.get(&start) else {
        return BTreeSet::new();
    };
    let mut group = BTreeSet::new();
    let mut stack = vec![start];
    while let Some(p) = stack.pop() {
        if !group.insert(p) {
            continue;
        }
        for &n in &topo.verts[p].neighbors {
            if topo.verts[n].visible && board.get(&n) == Some(&color) && !group.contains(&n) {
                stack.push(n);
            }
        }
    }
    group
}

/// Distinct empty, visible points adjacent to any stone of the group.
fn liberties_in(board: &BoardMap, topo: &Topology, group: &BTreeSet<VertexId>) -> usize {
    let mut libs = BTreeSet::new();
    for &p in group {
        for &n in &topo.verts[p].neighbors {
            if topo.verts[n].visible && !board.contains_key(&n) {
                libs.insert(n);
            }
        }
    }
    libs.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::VertexKind;

    /// Build an arbitrary test graph from an edge list.
    fn graph(verts: usize, edges: &[(usize, usize)]) -> Topology {
        let mut topo = Topology::new();
        for i in 0..verts {
            topo.add_vertex(i as f64, 0.0, VertexKind::Interior, 0, 0);
        }
        for &(a, b) in edges {
            topo.add_edge(a, b);
        }
        topo
    }

    /// Place stones directly, bypassing legality. Test setup only.
    fn setpos(game: &mut Game, black: &[usize], white: &[usize]) {
        for &v in black {
            game.board.insert(v, Stone::Black);
        }
        for &v in white {
            game.board.insert(v, Stone::White);
        }
    }

    #[test]
    fn test_group_and_liberties_on_path() {
        // 0 - 1 - 2 - 3 - 4, black stones at 1 and 2.
        let topo = graph(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let mut game = Game::new();
        setpos(&mut game, &[1, 2], &[]);
        let group = game.group(&topo, 1);
        assert_eq!(group, BTreeSet::from([1, 2]));
        assert_eq!(game.group_liberties(&topo, 1), 2); // points 0 and 3
    }

    #[test]
    fn test_capture_single_stone() {
        // White stone at 1 flanked by black; black takes its last liberty.
        let topo = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let mut game = Game::new();
        setpos(&mut game, &[0], &[1]);
        game.place_stone(&topo, 2).expect("capturing move is legal");
        assert_eq!(game.board.get(&1), None);
        assert_eq!(game.captures_black, 1);
        assert_eq!(game.to_play, Stone::White);
    }

    #[test]
    fn test_suicide_rejected_without_state_change() {
        // Point 1 flanked by white stones that keep outside liberties.
        let topo = graph(5, &[(0, 1), (1, 2), (2, 3), (0, 4)]);
        let mut game = Game::new();
        setpos(&mut game, &[], &[0, 2]);
        let before = game.clone();
        assert_eq!(game.place_stone(&topo, 1), Err(MoveError::Suicide));
        assert_eq!(game, before);
    }

    #[test]
    fn test_capture_beats_suicide() {
        // Point 1 flanked by white, but the white stone at 2 is itself in
        // atari; playing 1 captures it and is legal.
        let topo = graph(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]);
        let mut game = Game::new();
        setpos(&mut game, &[3], &[0, 2]);
        game.place_stone(&topo, 1).expect("capture resolves liberties");
        assert_eq!(game.board.get(&2), None);
    }

    #[test]
    fn test_simple_ko_cycle() {
        // K(0) - V(1) adjacent; K's other neighbors black, V's white, each
        // support stone keeping an outside liberty. 10-11-12 is a free path
        // well away from the ko for the intervening exchange.
        let topo = graph(
            13,
            &[
                (0, 1), // K - V
                (0, 2),
                (0, 3), // K - b1, b2
                (1, 4),
                (1, 5), // V - w1, w2
                (2, 6),
                (3, 7),
                (4, 8),
                (5, 9), // outside liberties
                (10, 11),
                (11, 12),
            ],
        );
        let mut game = Game::new();
        setpos(&mut game, &[2, 3], &[4, 5]);
        game.board.insert(1, Stone::Black); // black stone on V, in atari
        game.to_play = Stone::White;

        // White captures V by playing K.
        game.place_stone(&topo, 0).expect("white takes the ko");
        assert_eq!(game.board.get(&1), None);
        assert_eq!(game.captures_white, 1);

        // Black's immediate recapture at V reproduces the prior board: ko.
        assert_eq!(game.place_stone(&topo, 1), Err(MoveError::Ko));

        // After any intervening move by each side, the retake is accepted.
        game.place_stone(&topo, 10).expect("black plays elsewhere");
        game.place_stone(&topo, 12).expect("white answers elsewhere");
        game.place_stone(&topo, 1).expect("ko retake is legal now");
        assert_eq!(game.board.get(&0), None);
    }

    #[test]
    fn test_pass_lifts_ko() {
        let topo = graph(
            10,
            &[
                (0, 1),
                (0, 2),
                (0, 3),
                (1, 4),
                (1, 5),
                (2, 6),
                (3, 7),
                (4, 8),
                (5, 9),
            ],
        );
        let mut game = Game::new();
        setpos(&mut game, &[2, 3], &[4, 5]);
        game.board.insert(1, Stone::Black);
        game.to_play = Stone::White;
        game.place_stone(&topo, 0).unwrap();
        assert_eq!(game.place_stone(&topo, 1), Err(MoveError::Ko));
        game.pass(); // black passes
        game.pass(); // white passes
        game.place_stone(&topo, 1).expect("ko retake after passes");
    }

    #[test]
    fn test_score_single_color_territory() {
        // b - e - e - b: the empty run scores fully for black.
        let topo = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let mut game = Game::new();
        setpos(&mut game, &[0, 3], &[]);
        let score = game.score(&topo);
        assert_eq!(score.black_stones, 2);
        assert_eq!(score.black_territory, 2);
        assert_eq!(score.white_total, game.komi);
    }

    #[test]
    fn test_score_mixed_border_is_neutral() {
        // b - e - w: the empty point borders both colors.
        let topo = graph(3, &[(0, 1), (1, 2)]);
        let mut game = Game::new();
        setpos(&mut game, &[0], &[2]);
        let score = game.score(&topo);
        assert_eq!(score.black_territory, 0);
        assert_eq!(score.white_territory, 0);
    }

    #[test]
    fn test_dead_marked_stones_become_territory() {
        // b - w - b with the white stone marked dead: region {1} borders only
        // black, and the dead stone no longer counts for white.
        let topo = graph(3, &[(0, 1), (1, 2)]);
        let mut game = Game::new();
        setpos(&mut game, &[0, 2], &[1]);
        game.toggle_dead(&topo, 1);
        let score = game.score(&topo);
        assert_eq!(score.white_stones, 0);
        assert_eq!(score.black_territory, 1);
        // Toggling again revives the group.
        game.toggle_dead(&topo, 1);
        assert_eq!(game.score(&topo).white_stones, 1);
    }

    #[test]
    fn test_stone_off_board_rejected() {
        let mut topo = graph(2, &[(0, 1)]);
        topo.verts[1].visible = false;
        let mut game = Game::new();
        assert_eq!(game.place_stone(&topo, 1), Err(MoveError::NotVisible));
        assert_eq!(game.place_stone(&topo, 99), Err(MoveError::NotVisible));
    }
}
