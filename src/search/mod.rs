//! Search module for the Reversi engine
//!
//! Contains:
//! - Two-stage cooperative deadline
//! - Lazy child generation with special-cell sub-options
//! - Paranoid turn order with the pass and phase-switch rule
//! - Minimax / alpha-beta search with iterative deepening, move ordering
//!   and aspiration windows

pub mod alphabeta;
pub mod deadline;
pub mod movegen;
pub mod turn;

use std::fmt;

pub use alphabeta::{RootOutcome, SearchResult, SearchStats, Searcher, ABORTED};
pub use deadline::Deadline;
pub use movegen::{legal_moves, Children};
pub use turn::{Ply, TurnOrder};

/// Search algorithm variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// Full paranoid minimax
    Minimax,
    /// Minimax with alpha-beta pruning
    AlphaBeta,
    /// Alpha-beta with children ordered by the previous depth
    #[default]
    AlphaBetaOrdered,
    /// Ordered alpha-beta with a narrow window around the previous score
    Aspiration,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Minimax,
        Algorithm::AlphaBeta,
        Algorithm::AlphaBetaOrdered,
        Algorithm::Aspiration,
    ];

    /// Numeric code as used on the command line of a match client (1..=4)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Algorithm::Minimax),
            2 => Some(Algorithm::AlphaBeta),
            3 => Some(Algorithm::AlphaBetaOrdered),
            4 => Some(Algorithm::Aspiration),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Algorithm::Minimax => 1,
            Algorithm::AlphaBeta => 2,
            Algorithm::AlphaBetaOrdered => 3,
            Algorithm::Aspiration => 4,
        }
    }

    #[inline]
    pub fn prunes(self) -> bool {
        self != Algorithm::Minimax
    }

    #[inline]
    pub fn is_ordered(self) -> bool {
        matches!(self, Algorithm::AlphaBetaOrdered | Algorithm::Aspiration)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Minimax => "minimax",
            Algorithm::AlphaBeta => "alpha-beta",
            Algorithm::AlphaBetaOrdered => "alpha-beta + ordering",
            Algorithm::Aspiration => "aspiration windows",
        })
    }
}

/// Tunables of the search driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Subtracted from a move's time limit for communication latency
    pub reserve_ms: u64,
    /// Hard ceiling of a depth-limited search
    pub fallback_ms: u64,
    /// Depth ceiling of a time-limited search
    pub max_depth: u32,
    /// Branching factor assumed before the first timed search
    pub initial_branching_factor: u32,
    /// Aspiration half-width per board cell. Tiny next to the penalty for
    /// each higher-rated player, so most depths fail at least once and fall
    /// back to the widened or unbounded window.
    pub window_size: i64,
    /// Widened aspiration half-width per board cell after a failure
    pub window_resize: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            reserve_ms: 150,
            fallback_ms: 120_000,
            max_depth: 100,
            initial_branching_factor: 15,
            window_size: 5,
            window_resize: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_codes() {
        for algorithm in Algorithm::ALL {
            assert_eq!(Algorithm::from_code(algorithm.code()), Some(algorithm));
        }
        assert_eq!(Algorithm::from_code(0), None);
        assert_eq!(Algorithm::from_code(5), None);
    }

    #[test]
    fn test_only_minimax_skips_pruning() {
        assert!(!Algorithm::Minimax.prunes());
        assert!(Algorithm::Aspiration.prunes());
        assert!(Algorithm::Aspiration.is_ordered());
        assert!(!Algorithm::AlphaBeta.is_ordered());
    }
}
