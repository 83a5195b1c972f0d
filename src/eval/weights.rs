//! Evaluation weights
//!
//! Hand-tuned constants of the playing, bombing and end-of-game evaluations.
//! The two resource weights (override stone, bomb) depend on the board and
//! live in [`Topology::weights`](crate::board::Topology::weights).

/// Scoring constants for evaluation
pub struct EvalWeight;

impl EvalWeight {
    // Stability
    /// Stone value per influence by number of locked line families (0..=4)
    pub const STABILITY_TIERS: [i64; 5] = [15, 25, 60, 120, 400];
    /// Stone value per influence when a free neighbour is more border-bound
    /// than the stone is locked, indexed by that neighbour strength (1..=4)
    pub const THREAT_TIERS: [i64; 4] = [-25, -60, -120, -400];
    /// Multiple of the override-stone weight lost by a stone next to a bonus cell
    pub const BONUS_NEIGHBOUR: i64 = -400;

    /// Per influence, stones bordering free cells
    pub const FRONTIER: i64 = -8;

    /// Penalty per player rated above the evaluated one
    pub const BETTER_PLAYER: i64 = 10_000_000;

    // Bombing phase
    /// Largest board side, scales the bonus for a strict lead
    pub const MAX_BOARD_SIDE: i64 = 50;

    // End of game
    /// Largest player count, keeps losing values ordered by rank
    pub const MAX_PLAYERS: i64 = 8;
    pub const WIN: i64 = i32::MAX as i64;
    pub const LOSS: i64 = i32::MIN as i64;
}

/// Stability value of a stone with `locked` families and the given influence
#[inline]
pub fn stability_tier(locked: u32, influence: i64) -> i64 {
    EvalWeight::STABILITY_TIERS[locked.min(4) as usize] * influence
}

/// Negative value of a stone threatened by a neighbour of strength `strength`
#[inline]
pub fn threat_tier(strength: u8, influence: i64) -> i64 {
    let index = strength.clamp(1, 4) as usize - 1;
    EvalWeight::THREAT_TIERS[index] * influence
}
