use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::search::legal_moves;

fn board(text: &str) -> Board {
    text.parse().unwrap()
}

fn at(board: &Board, x: usize, y: usize) -> CellId {
    board.topology().cell_at(x, y).unwrap()
}

/// Everything observable about a board, for before/after comparisons
fn snapshot(board: &Board) -> (String, Vec<CellState>, Vec<u16>, Vec<u16>, Vec<u8>) {
    let players = 1..=board.players();
    (
        board.to_string(),
        board.cells().to_vec(),
        players.clone().map(|p| board.override_stones(p)).collect(),
        players.clone().map(|p| board.bombs(p)).collect(),
        players.map(|p| board.color_of(p)).collect(),
    )
}

const DIAGONAL: &str = "\
2
0
0 0
5 5
1 0 0 0 0
0 2 0 0 0
0 0 2 0 0
0 0 0 2 0
0 0 0 0 0
";

#[test]
fn test_diagonal_capture() {
    let mut b = board(DIAGONAL);
    let corner = at(&b, 4, 4);

    assert!(b.is_playing_move_legal(corner, 1, false));
    assert!(b.try_playing_move(corner, 1, Choice::None));

    for i in 0..5 {
        assert_eq!(b.state(at(&b, i, i)), Some(CellState::Stone(1)));
    }
    assert_eq!(b.stone_count(1), 5);
    assert_eq!(b.stone_count(2), 0);
}

/// Only the diagonal is free, every free cell has a capture for player 1
const DIAGONAL_FREE: &str = "\
2
0
0 0
5 5
0 2 2 2 1
1 0 2 2 1
1 2 0 2 2
1 2 2 0 2
1 2 2 2 0
";

#[test]
fn test_only_diagonal_cells_are_valid() {
    let original = board(DIAGONAL_FREE);
    let before = snapshot(&original);

    for y in 0..5 {
        for x in 0..5 {
            let cell = at(&original, x, y);
            assert_eq!(original.is_playing_move_legal(cell, 1, true), x == y, "cell ({x}, {y})");

            let mut b = original.clone();
            assert_eq!(b.try_playing_move(cell, 1, Choice::None), x == y, "cell ({x}, {y})");
            if x != y {
                assert_eq!(snapshot(&b), before, "cell ({x}, {y})");
            }
        }
    }
    assert_eq!(snapshot(&original), before);
}

#[test]
fn test_move_without_capture_is_refused() {
    let mut b = board(DIAGONAL);
    let before = snapshot(&b);
    let cell = at(&b, 4, 0);

    assert!(!b.is_playing_move_legal(cell, 1, true));
    assert!(!b.try_playing_move(cell, 1, Choice::None));
    assert_eq!(snapshot(&b), before);
}

#[test]
fn test_out_of_range_is_refused() {
    let mut b = board(DIAGONAL);
    let before = snapshot(&b);
    let outside = b.cell_count() as CellId;

    assert_eq!(b.state(outside), None);
    assert!(!b.is_playing_move_legal(outside, 1, true));
    assert!(!b.try_playing_move(outside, 1, Choice::None));
    assert!(!b.try_bombing_move(outside, 1));

    // Unknown actors
    let corner = at(&b, 4, 4);
    assert!(!b.try_playing_move(corner, 0, Choice::None));
    assert!(!b.try_playing_move(corner, 3, Choice::None));
    assert!(!b.try_move(Move::new(corner, 9, Choice::None), Phase::Playing));
    assert_eq!(snapshot(&b), before);
}

const BOMBING: &str = "\
2
0
1 1
5 5
1 1 1 1 1
1 2 2 2 1
1 2 1 2 1
1 2 2 2 1
1 1 1 1 1
";

#[test]
fn test_bomb_destroys_square() {
    let mut b = board(BOMBING);
    assert_eq!(b.bombs(1), 1);
    assert!(b.try_bombing_move(at(&b, 2, 2), 1));
    assert_eq!(b.bombs(1), 0);

    for y in 0..5 {
        for x in 0..5 {
            let inside = (1..=3).contains(&x) && (1..=3).contains(&y);
            let state = b.state(at(&b, x, y)).unwrap();
            assert_eq!(state == CellState::Destroyed, inside, "cell ({x}, {y})");
        }
    }
    assert_eq!(b.stone_count(1), 16);
    assert_eq!(b.stone_count(2), 0);
}

#[test]
fn test_bomb_refused_without_bombs_or_on_destroyed() {
    let mut b = board(BOMBING);
    assert!(b.try_bombing_move(at(&b, 2, 2), 1));
    let before = snapshot(&b);

    // Player 1 is out of bombs
    assert!(!b.try_bombing_move(at(&b, 0, 0), 1));
    // Player 2 targets a destroyed cell
    assert!(!b.try_bombing_move(at(&b, 1, 1), 2));
    assert_eq!(snapshot(&b), before);

    assert!(b.try_move(Move::new(at(&b, 4, 4), 2, Choice::None), Phase::Bombing));
    assert_eq!(b.bombs(2), 0);
}

#[test]
fn test_override_onto_stone() {
    let mut b = board("2\n1\n0 0\n1 3\n1 2 2\n");
    assert!(b.is_playing_move_legal(2, 1, true));
    assert!(!b.is_playing_move_legal(2, 1, false));
    assert!(!b.try_playing_move_with(2, 1, Choice::None, false));

    assert!(b.try_playing_move(2, 1, Choice::None));
    assert_eq!(b.override_stones(1), 0);
    assert_eq!(b.stone_count(1), 3);
}

#[test]
fn test_override_needs_a_stone_left() {
    let mut b = board("2\n0\n0 0\n1 3\n1 2 2\n");
    let before = snapshot(&b);
    assert!(!b.is_playing_move_legal(2, 1, true));
    assert!(!b.try_playing_move(2, 1, Choice::None));
    assert_eq!(snapshot(&b), before);
}

#[test]
fn test_expansion_claim_without_capture() {
    let mut b = board("2\n1\n0 0\n1 3\nx 0 2\n");
    assert_eq!(b.stone_count(1), 0);
    assert!(b.is_playing_move_legal(0, 1, true));
    assert!(!b.is_playing_move_legal(0, 1, false));

    assert!(b.try_playing_move(0, 1, Choice::None));
    assert_eq!(b.state(0), Some(CellState::Stone(1)));
    assert_eq!(b.override_stones(1), 0);
}

#[test]
fn test_expansion_capture_consumes_override() {
    let mut b = board("2\n1\n0 0\n1 3\nx 2 1\n");
    assert!(b.try_playing_move(0, 1, Choice::None));
    assert_eq!(b.override_stones(1), 0);
    assert_eq!(b.stone_count(1), 3);
}

#[test]
fn test_bonus_grants_chosen_resource() {
    let text = "2\n0\n0 0\n1 3\nb 2 1\n";

    let mut b = board(text);
    assert!(b.try_playing_move(0, 1, Choice::Bomb));
    assert_eq!((b.bombs(1), b.override_stones(1)), (1, 0));

    let mut b = board(text);
    assert!(b.try_playing_move(0, 1, Choice::OverrideStone));
    assert_eq!((b.bombs(1), b.override_stones(1)), (0, 1));

    let mut b = board(text);
    let before = snapshot(&b);
    assert!(!b.try_playing_move(0, 1, Choice::None));
    assert!(!b.try_playing_move(0, 1, Choice::Player(2)));
    assert_eq!(snapshot(&b), before);
}

#[test]
fn test_choice_swaps_identities() {
    let mut b = board("2\n0\n0 0\n1 5\nc 2 1 2 1\n");
    assert_eq!(b.reachable_choice_cells(), 1);
    assert!(b.try_playing_move(0, 1, Choice::Player(2)));

    // Painted with the color player 1 had, now owned by player 2
    for cell in 0..3 {
        assert_eq!(b.state(cell), Some(CellState::Stone(1)));
    }
    assert_eq!(b.owner_at(0), Some(2));
    assert_eq!(b.owner_at(3), Some(1));
    assert_eq!(b.stone_count(2), 4);
    assert_eq!(b.stone_count(1), 1);
    assert_eq!(b.color_of(1), 2);
    assert_eq!(b.reachable_choice_cells(), 0);
}

#[test]
fn test_choice_payload_validated_first() {
    let mut b = board("2\n0\n0 0\n1 3\nc 2 1\n");
    let before = snapshot(&b);
    assert!(!b.try_playing_move(0, 1, Choice::None));
    assert!(!b.try_playing_move(0, 1, Choice::Player(3)));
    assert!(!b.try_playing_move(0, 1, Choice::Bomb));
    assert_eq!(snapshot(&b), before);
}

#[test]
fn test_inversion_rotates_identities() {
    let mut b = board("3\n0\n0 0\n1 5\ni 2 1 2 1\n");
    assert_eq!(b.reachable_inversion_cells(), 1);
    assert!(b.try_playing_move(0, 1, Choice::None));

    // Color 1 passes to player 2, color 2 to player 3
    assert_eq!(b.owner_at(0), Some(2));
    assert_eq!(b.owner_at(3), Some(3));
    assert_eq!(b.color_of(1), 3);
    assert_eq!(b.stone_count(2), 4);
    assert_eq!(b.stone_count(3), 1);
    assert_eq!(b.stone_count(1), 0);
    assert_eq!(b.reachable_inversion_cells(), 0);
    assert!(b.identity().is_permutation());
}

#[test]
fn test_disqualified_player_cannot_move() {
    let mut b = board(DIAGONAL);
    b.disqualify(1);
    assert!(!b.is_active(1));
    assert_eq!(b.active_players().collect::<Vec<_>>(), vec![2]);
    assert!(!b.try_playing_move(at(&b, 4, 4), 1, Choice::None));
    assert_eq!(b.tournament_points(1), 0);
}

#[test]
fn test_tournament_points() {
    let b = board("3\n0\n0 0\n1 6\n1 1 1 2 2 3\n");
    assert_eq!(b.stone_counts()[1..=3], [3, 2, 1]);
    assert_eq!(b.tournament_points(1), 25);
    assert_eq!(b.tournament_points(2), 11);
    assert_eq!(b.tournament_points(3), 5);

    // Ties share the better rank
    let b = board("3\n0\n0 0\n1 4\n1 1 2 2\n");
    assert_eq!(b.tournament_points(1), 25);
    assert_eq!(b.tournament_points(2), 25);
    assert_eq!(b.tournament_points(3), 5);
}

#[test]
fn test_evaluation_is_pure() {
    let b = board(DIAGONAL);
    let before = snapshot(&b);
    for player in 1..=2 {
        for phase in [Phase::Playing, Phase::Bombing] {
            assert_eq!(b.evaluate(player, phase), b.evaluate(player, phase));
        }
        assert_eq!(b.evaluate_end_of_game(player), b.evaluate_end_of_game(player));
    }
    assert_eq!(snapshot(&b), before);
}

#[test]
fn test_display() {
    let b = board("2\n0\n0 0\n2 2\n1 0\n0 -\n");
    assert_eq!(b.to_string(), "1' 0 \n0  - \n");
}

const PLAYOUT: &str = "\
3
2
1 1
8 8
0 0 0 0 0 0 0 0
0 b 0 0 0 0 c 0
0 0 1 2 3 0 0 0
0 0 3 1 2 0 0 0
0 0 2 3 1 0 0 0
0 x 0 0 0 0 i 0
0 0 0 - - 0 0 0
0 0 0 0 0 0 0 0
0 3 6 <-> 7 3 2
";

/// Random legal moves, cycling through players, until nobody can move
fn random_moves(board: &Board, seed: u64) -> Vec<(Move, Phase)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut b = board.clone();
    let mut moves = Vec::new();

    for phase in [Phase::Playing, Phase::Bombing] {
        let mut idle = 0;
        let mut player = 1;
        while idle < b.players() {
            let legal = legal_moves(&b, player, phase, true);
            if legal.is_empty() {
                idle += 1;
            } else {
                idle = 0;
                let mv = legal[rng.random_range(0..legal.len())];
                assert!(b.try_move(mv, phase));
                moves.push((mv, phase));
            }
            player = player % b.players() + 1;
        }
    }
    moves
}

#[test]
fn test_clone_then_mutate_is_independent() {
    let original = board(PLAYOUT);
    let before = snapshot(&original);

    for seed in [1, 7, 42] {
        let moves = random_moves(&original, seed);
        assert!(!moves.is_empty());
        assert_eq!(snapshot(&original), before);

        // Replaying the same sequence on two clones gives the same board
        let mut a = original.clone();
        let mut b = original.clone();
        for &(mv, phase) in &moves {
            assert!(a.try_move(mv, phase));
            assert!(b.try_move(mv, phase));
        }
        assert_eq!(snapshot(&a), snapshot(&b));
        for player in 1..=3 {
            assert_eq!(a.evaluate_end_of_game(player), b.evaluate_end_of_game(player));
            assert_eq!(a.stability_mask(0), b.stability_mask(0));
        }
        assert!(a.identity().is_permutation());
    }
}
