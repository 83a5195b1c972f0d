//! Heuristic evaluation of board positions
//!
//! Three phase-specific evaluations, all from the perspective of one player:
//! - Playing phase: resources, stone stability, frontier exposure and rank
//! - Bombing phase: stone counts relative to the other players
//! - End of game: final rank only
//!
//! All three are pure functions of the board.

use crate::board::{Board, CellId, CellState, DIRECTIONS, MAX_PLAYERS};

use super::weights::{stability_tier, threat_tier, EvalWeight};

/// Value of a single stone from its stability and surroundings
fn stone_rating(board: &Board, cell: CellId) -> i64 {
    let topology = board.topology();
    let influence = topology.influence(cell);
    let locked = board.stability_mask(cell).count_ones();
    let mut score = stability_tier(locked, influence);

    let mut strongest = 0u8;
    for dir in 0..DIRECTIONS {
        let Some(next) = topology.neighbour(cell, dir) else {
            continue;
        };
        match board.cells()[next as usize] {
            CellState::Bonus => {
                return EvalWeight::BONUS_NEIGHBOUR.saturating_mul(topology.weights().override_stone);
            }
            CellState::Stone(_) => {}
            _ => strongest = strongest.max(topology.base_stability(cell, dir)),
        }
    }
    if u32::from(strongest) > locked {
        score = threat_tier(strongest, influence);
    }
    score
}

/// Stone next to an empty or capturable special cell
fn is_frontier(board: &Board, cell: CellId) -> bool {
    board
        .topology()
        .neighbours(cell)
        .iter()
        .flatten()
        .any(|&n| {
            matches!(
                board.cells()[n as usize],
                CellState::Empty | CellState::Bonus | CellState::Choice | CellState::Inversion
            )
        })
}

/// Playing-phase value for `player`.
///
/// Every player gets a rating (resources plus stone values); stones are
/// credited to the player expected to own them once all reachable inversion
/// cells are resolved. The result weighs the own rating against the others
/// and subtracts a large penalty per player rated higher. While reachable
/// choice cells remain, a leading position still counts half the players as
/// ahead.
#[must_use]
pub fn evaluate_playing(board: &Board, player: u8) -> i64 {
    let n = board.players() as usize;
    if n == 0 || !(1..=n).contains(&(player as usize)) {
        return 0;
    }
    let topology = board.topology();
    let weights = topology.weights();
    let offset = board.reachable_inversion_cells() as usize;
    let slot = |owner: u8| (owner as usize - 1 + offset) % n;

    let mut rating = [0i64; MAX_PLAYERS];
    for p in 1..=n as u8 {
        rating[p as usize - 1] = i64::from(board.override_stones(p))
            .saturating_mul(weights.override_stone)
            .saturating_add(i64::from(board.bombs(p)).saturating_mul(weights.bomb));
    }

    for (cell, state) in board.cells().iter().enumerate() {
        let CellState::Stone(color) = *state else {
            continue;
        };
        let cell = cell as CellId;
        let mut value = stone_rating(board, cell);
        if is_frontier(board, cell) {
            value = value.saturating_add(EvalWeight::FRONTIER * topology.influence(cell));
        }
        let total = &mut rating[slot(board.owner_of(color))];
        *total = total.saturating_add(value);
    }

    let own_slot = slot(player);
    let own = rating[own_slot];
    let mut others = 0;
    let mut better = 0i64;
    for (i, &r) in rating.iter().enumerate().take(n) {
        if i == own_slot {
            continue;
        }
        others = r.saturating_add(others);
        if r > own {
            better += 1;
        }
    }
    if board.reachable_choice_cells() > 0 && better == 0 {
        better = n as i64 / 2;
    }

    (n as i64)
        .saturating_mul(own)
        .saturating_sub(others)
        .saturating_sub(better * EvalWeight::BETTER_PLAYER)
}

/// Bombing-phase value for `player`.
///
/// A strict lead (no other active player at or above the own stone count)
/// earns a large constant bonus. Otherwise the stones of every player at or
/// above are subtracted.
#[must_use]
pub fn evaluate_bombing(board: &Board, player: u8) -> i64 {
    let n = board.players() as i64;
    let counts = board.stone_counts();
    let own = counts.get(player as usize).copied().unwrap_or(0) as i64;

    let mut above = 0i64;
    let mut below = 0i64;
    let mut challenged = false;
    for p in board.active_players().filter(|&p| p != player) {
        let count = counts[p as usize] as i64;
        if count >= own {
            above += count;
            challenged = true;
        } else {
            below += count;
        }
    }

    if challenged {
        own * (n - 1) - above
    } else {
        EvalWeight::MAX_BOARD_SIDE * EvalWeight::MAX_BOARD_SIDE * n + own * (n - 1) - below
    }
}

/// Terminal value for `player`: a near-maximum if nobody has strictly more
/// stones (fewer ties rank higher), else a near-minimum ordered by the
/// number of players ahead.
#[must_use]
pub fn evaluate_end_of_game(board: &Board, player: u8) -> i64 {
    let counts = board.stone_counts();
    let own = counts.get(player as usize).copied().unwrap_or(0);

    let mut more = 0;
    let mut equal = 0;
    for p in 1..=board.players() {
        let count = counts[p as usize];
        if count > own {
            more += 1;
        } else if count == own {
            equal += 1;
        }
    }

    if more == 0 {
        EvalWeight::WIN - equal
    } else {
        EvalWeight::LOSS + (EvalWeight::MAX_PLAYERS - more)
    }
}
