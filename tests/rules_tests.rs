//! Rules-engine tests: legality, capture, ko, and scoring, both on crafted
//! graphs and on boards produced by the full mesh pipeline.

use hexgoban::constants::SPACING;
use hexgoban::game::{Game, GameMove, MoveError, Stone};
use hexgoban::grid::build_grid;
use hexgoban::merge::quadrangulate;
use hexgoban::subdivide::subdivide;
use hexgoban::topology::{Topology, VertexKind};

// =============================================================================
// Helper functions
// =============================================================================

/// Build an arbitrary board graph from an edge list.
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

/// Quadrangulated and subdivided board for full-pipeline games.
fn pipeline_board(radius: i32) -> Topology {
    for seed in 0..32 {
        fastrand::seed(seed);
        let mut topo = build_grid(radius, SPACING);
        if quadrangulate(&mut topo) {
            subdivide(&mut topo);
            return topo;
        }
    }
    panic!("quadrangulation never converged for radius {radius}");
}

// =============================================================================
// Suicide
// =============================================================================

#[test]
fn test_suicide_leaves_board_byte_identical() {
    // Point 2 is fully enclosed by white stones that keep outside liberties.
    let topo = graph(
        7,
        &[(0, 2), (1, 2), (2, 3), (0, 4), (1, 5), (3, 6)],
    );
    let mut game = Game::new();
    setpos(&mut game, &[], &[0, 1, 3]);
    let before = game.clone();
    assert_eq!(game.place_stone(&topo, 2), Err(MoveError::Suicide));
    assert_eq!(game, before, "rejected suicide must not disturb any state");
}

#[test]
fn test_surrounded_point_on_pipeline_board() {
    // On a real board, fill every neighbor of a point with white (giving each
    // white stone outside liberties), then black's play there is suicide.
    let topo = pipeline_board(1);
    let target = topo
        .verts
        .iter()
        .find(|v| {
            v.visible
                && v.neighbors.len() >= 2
                && v.neighbors
                    .iter()
                    .all(|&n| topo.verts[n].neighbors.iter().any(|&m| m != v.id))
        })
        .expect("an interior point")
        .id;
    let mut game = Game::new();
    for &n in &topo.verts[target].neighbors {
        game.board.insert(n, Stone::White);
    }
    // Each enclosing stone must keep a liberty besides the target.
    let enclosers_alive = topo.verts[target].neighbors.iter().all(|&n| {
        topo.verts[n]
            .neighbors
            .iter()
            .any(|&m| m != target && !game.board.contains_key(&m))
    });
    assert!(enclosers_alive, "test setup requires outside liberties");

    let before = game.clone();
    assert_eq!(game.place_stone(&topo, target), Err(MoveError::Suicide));
    assert_eq!(game, before);
}

// =============================================================================
// Ko
// =============================================================================

/// The classic ko shape as a graph: K and V adjacent, K otherwise walled by
/// black, V otherwise walled by white, every wall stone keeping an outside
/// liberty. The 10-11-12 path is open space for ko threats.
fn ko_shape() -> (Topology, Game) {
    let topo = graph(
        13,
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
            (10, 11),
            (11, 12),
        ],
    );
    let mut game = Game::new();
    setpos(&mut game, &[2, 3], &[4, 5]);
    game.board.insert(1, Stone::Black);
    game.to_play = Stone::White;
    (topo, game)
}

#[test]
fn test_ko_retake_rejected_then_allowed() {
    let (topo, mut game) = ko_shape();

    // White captures the black stone on V by playing K.
    game.place_stone(&topo, 0).expect("white takes the ko");
    assert_eq!(game.captures_white, 1);

    // Black's immediate recapture recreates the pre-white board: rejected.
    let before = game.clone();
    assert_eq!(game.place_stone(&topo, 1), Err(MoveError::Ko));
    assert_eq!(game, before);

    // After one intervening exchange the retake is legal.
    game.place_stone(&topo, 10).expect("black ko threat");
    game.place_stone(&topo, 12).expect("white answers");
    game.place_stone(&topo, 1).expect("black retakes");
    assert_eq!(game.captures_black, 1);
    assert_eq!(
        game.moves.last(),
        Some(&GameMove::Play(1)),
        "retake recorded in history"
    );
}

#[test]
fn test_ko_lifted_by_either_sides_intervening_pass() {
    let (topo, mut game) = ko_shape();
    game.place_stone(&topo, 0).unwrap();
    assert_eq!(game.place_stone(&topo, 1), Err(MoveError::Ko));
    game.pass();
    game.pass();
    game.place_stone(&topo, 1).expect("retake after passes");
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn test_black_only_region_scores_for_black() {
    // Ring of 6 with black on opposite points: both empty arcs border only
    // black.
    let topo = graph(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)]);
    let mut game = Game::new();
    setpos(&mut game, &[0, 3], &[]);
    let score = game.score(&topo);
    assert_eq!(score.black_stones, 2);
    assert_eq!(score.black_territory, 4);
    assert_eq!(score.white_total, game.komi);
}

#[test]
fn test_mixed_region_is_neutral_for_both() {
    let topo = graph(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)]);
    let mut game = Game::new();
    setpos(&mut game, &[0], &[3]);
    let score = game.score(&topo);
    assert_eq!(score.black_territory, 0);
    assert_eq!(score.white_territory, 0);
    assert_eq!(score.black_total, 1.0);
    assert_eq!(score.white_total, 1.0 + game.komi);
}

#[test]
fn test_full_game_on_pipeline_board_scores() {
    let topo = pipeline_board(1);
    let mut game = Game::new();
    let open: Vec<_> = topo.verts.iter().filter(|v| v.visible).map(|v| v.id).collect();

    let mut placed = 0;
    for vid in open {
        if game.place_stone(&topo, vid).is_ok() {
            placed += 1;
        }
        if placed == 6 {
            break;
        }
    }
    assert_eq!(placed, 6);
    let score = game.score(&topo);
    // Captures may have removed stones; the breakdown must match the board.
    assert_eq!(
        score.black_stones + score.white_stones,
        game.board.len() as u32
    );
    // Area scoring can never exceed the board.
    let board_points = topo.visible_vert_count() as u32;
    assert!(score.black_stones + score.black_territory <= board_points);
    assert!(score.white_stones + score.white_territory <= board_points);
}
