//! Main AI engine driving the search for one move decision
//!
//! The engine turns a turn request (time or depth limit, player, phase,
//! algorithm) into a deadline and a search, and keeps what persists between
//! moves: the branching-factor estimate that decides when to stop
//! deepening, and the on-time / timed-out counters.
//!
//! # Example
//!
//! ```
//! use reversi::{AIEngine, Algorithm, Board, Phase};
//!
//! let board: Board = "2\n0\n0 0\n4 4\n0 0 0 0\n0 1 2 0\n0 2 1 0\n0 0 0 0\n"
//!     .parse()
//!     .unwrap();
//! let mut engine = AIEngine::new();
//!
//! // Depth-limited search for player 1
//! let result = engine.get_next_move_with_stats(&board, 3, 0, 1, Algorithm::AlphaBeta, Phase::Playing);
//! println!("Best move: {:?}", result.best_move);
//! println!("Depth: {}, nodes: {}", result.depth, result.nodes);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::board::{Board, Move, Phase};
use crate::search::{Algorithm, Deadline, SearchConfig, SearchResult, SearchStats, Searcher};

/// Result of a move search with detailed statistics.
#[derive(Debug, Clone)]
pub struct MoveResult {
    /// Best move found, if any
    pub best_move: Option<Move>,
    /// Score of the committed depth
    pub score: i64,
    /// Deepest committed depth
    pub depth: u32,
    /// Number of nodes searched
    pub nodes: u64,
    /// Time taken in milliseconds
    pub time_ms: u64,
    pub stats: SearchStats,
    pub algorithm: Algorithm,
    /// Set when the hard deadline cut the search
    pub aborted: bool,
}

impl MoveResult {
    #[inline]
    fn from_search(result: SearchResult, algorithm: Algorithm, time_ms: u64) -> Self {
        Self {
            best_move: result.best_move,
            score: result.score,
            depth: result.depth,
            nodes: result.nodes,
            time_ms,
            stats: result.stats,
            algorithm,
            aborted: result.aborted,
        }
    }

    #[inline]
    fn no_move(algorithm: Algorithm, time_ms: u64) -> Self {
        Self {
            best_move: None,
            score: 0,
            depth: 0,
            nodes: 0,
            time_ms,
            stats: SearchStats::default(),
            algorithm,
            aborted: false,
        }
    }
}

/// Outcome counters of time-limited searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingStats {
    /// Searches that ended before the hard deadline
    pub on_time: u64,
    /// Searches cut by the hard deadline
    pub timeouts: u64,
}

/// Main AI engine.
///
/// # Configuration
///
/// - Algorithm used by [`get_move`](Self::get_move)
/// - Depth limit (0 means time-limited)
/// - Time limit per move
/// - Search tunables ([`SearchConfig`])
pub struct AIEngine {
    config: SearchConfig,
    algorithm: Algorithm,
    max_depth: u32,
    time_limit: Duration,
    branching_factor: u32,
    timing: TimingStats,
    stop: Arc<AtomicBool>,
}

impl AIEngine {
    /// Create a new AI engine with default settings.
    ///
    /// Default configuration:
    /// - Ordered alpha-beta
    /// - Time-limited, 1000ms per move
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Algorithm::AlphaBetaOrdered, 0, 1000)
    }

    /// Create an AI engine with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - Search variant
    /// * `max_depth` - Depth limit, 0 for a time-limited search
    /// * `time_limit_ms` - Time limit in milliseconds
    ///
    /// # Example
    ///
    /// ```
    /// use reversi::{AIEngine, Algorithm};
    ///
    /// let engine = AIEngine::with_config(Algorithm::Aspiration, 0, 2000);
    /// assert_eq!(engine.branching_factor(), 15);
    /// ```
    #[must_use]
    pub fn with_config(algorithm: Algorithm, max_depth: u32, time_limit_ms: u64) -> Self {
        let config = SearchConfig::default();
        Self {
            config,
            algorithm,
            max_depth,
            time_limit: Duration::from_millis(time_limit_ms),
            branching_factor: config.initial_branching_factor,
            timing: TimingStats::default(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the search tunables and reset the branching-factor estimate
    #[must_use]
    pub fn with_search_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self.branching_factor = config.initial_branching_factor;
        self
    }

    /// Best move with the engine's configured algorithm and limits
    #[must_use]
    pub fn get_move(&mut self, board: &Board, player: u8, phase: Phase) -> Option<Move> {
        let time_ms = self.time_limit.as_millis() as u64;
        self.get_next_move(board, self.max_depth, time_ms, player, self.algorithm, phase)
    }

    /// Best move for `player`, or `None` if the player has no legal move.
    ///
    /// With `depth_limit == 0` the search is time-limited by
    /// `time_limit_ms`, otherwise it stops at `depth_limit`.
    #[must_use]
    pub fn get_next_move(
        &mut self,
        board: &Board,
        depth_limit: u32,
        time_limit_ms: u64,
        player: u8,
        algorithm: Algorithm,
        phase: Phase,
    ) -> Option<Move> {
        self.get_next_move_with_stats(board, depth_limit, time_limit_ms, player, algorithm, phase)
            .best_move
    }

    /// Get the best move with detailed search statistics.
    ///
    /// # Time management
    ///
    /// A time-limited search gets `time_limit_ms` minus the reserve as its
    /// hard budget, and stops starting new depths after
    /// `budget / branching_factor`. A depth-limited search only has a
    /// generous fallback ceiling.
    pub fn get_next_move_with_stats(
        &mut self,
        board: &Board,
        depth_limit: u32,
        time_limit_ms: u64,
        player: u8,
        algorithm: Algorithm,
        phase: Phase,
    ) -> MoveResult {
        let start = Instant::now();
        if !board.is_active(player) {
            debug!("player {player} is not active, no move");
            return MoveResult::no_move(algorithm, 0);
        }

        self.stop.store(false, Ordering::Relaxed);
        let timed = depth_limit == 0;
        let (deadline, max_depth) = if timed {
            let budget =
                Duration::from_millis(time_limit_ms.saturating_sub(self.config.reserve_ms));
            let deadline = Deadline::from_budget(budget, self.branching_factor);
            (deadline, self.config.max_depth)
        } else {
            let ceiling = Duration::from_millis(self.config.fallback_ms);
            (Deadline::new(ceiling, ceiling), depth_limit)
        };
        let deadline = deadline.with_stop(Arc::clone(&self.stop));
        debug!(
            "player {player} {phase:?}: {algorithm}, soft {:?}, hard {:?}, depth <= {max_depth}",
            deadline.soft_limit(),
            deadline.hard_limit()
        );

        let mut searcher = Searcher::new(board, player, phase, &deadline, self.config);
        let result = searcher.run(board, algorithm, max_depth);

        if timed {
            if result.aborted {
                self.timing.timeouts += 1;
            } else {
                self.timing.on_time += 1;
                self.update_branching_factor(&result);
            }
        }

        let time_ms = start.elapsed().as_millis() as u64;
        info!(
            "player {player}: {:?} score {} depth {} nodes {} in {time_ms}ms{}",
            result.best_move.map(|mv| (mv.cell, mv.choice)),
            result.score,
            result.depth,
            result.nodes,
            if result.aborted { " (aborted)" } else { "" }
        );
        MoveResult::from_search(result, algorithm, time_ms)
    }

    /// Branching factor estimate from the committed depth: the integer
    /// `depth`-th root of its node count, plus 2 as a safety margin.
    fn update_branching_factor(&mut self, result: &SearchResult) {
        let nodes = result.nodes_last_depth;
        let estimate = match result.depth {
            0 => return,
            1 => u32::try_from(nodes).unwrap_or(u32::MAX),
            depth => (nodes as f64).powf(1.0 / f64::from(depth)).floor() as u32,
        };
        self.branching_factor = estimate.saturating_add(2);
        debug!("branching factor now {}", self.branching_factor);
    }

    /// Flag that aborts the running search when set from another thread
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
    }

    /// Set the depth limit, 0 for a time-limited search
    pub fn set_max_depth(&mut self, depth: u32) {
        self.max_depth = depth;
    }

    pub fn set_time_limit(&mut self, time_ms: u64) {
        self.time_limit = Duration::from_millis(time_ms);
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[must_use]
    pub fn time_limit_ms(&self) -> u64 {
        self.time_limit.as_millis() as u64
    }

    #[must_use]
    pub fn branching_factor(&self) -> u32 {
        self.branching_factor
    }

    #[must_use]
    pub fn timing_stats(&self) -> TimingStats {
        self.timing
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl Default for AIEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const OPENING: &str = "2\n0\n0 0\n4 4\n0 0 0 0\n0 1 2 0\n0 2 1 0\n0 0 0 0\n";

    fn board(text: &str) -> Board {
        text.parse().unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = AIEngine::new();
        assert_eq!(engine.algorithm(), Algorithm::AlphaBetaOrdered);
        assert_eq!(engine.max_depth(), 0);
        assert_eq!(engine.time_limit_ms(), 1000);
        assert_eq!(engine.branching_factor(), 15);
        assert_eq!(engine.timing_stats(), TimingStats::default());
    }

    #[test]
    fn test_engine_with_config() {
        let engine = AIEngine::with_config(Algorithm::Minimax, 4, 300);
        assert_eq!(engine.algorithm(), Algorithm::Minimax);
        assert_eq!(engine.max_depth(), 4);
        assert_eq!(engine.time_limit_ms(), 300);
    }

    #[test]
    fn test_depth_limited_search_reaches_depth() {
        let b = board(OPENING);
        let mut engine = AIEngine::new();
        let result =
            engine.get_next_move_with_stats(&b, 3, 0, 1, Algorithm::AlphaBeta, Phase::Playing);
        assert_eq!(result.depth, 3);
        assert!(!result.aborted);
        let mv = result.best_move.unwrap();
        assert!(b.clone().try_move(mv, Phase::Playing));
        assert_eq!(engine.timing_stats(), TimingStats::default(), "only timed searches count");
    }

    #[test]
    fn test_time_limited_search_returns_a_move() {
        let b = board(OPENING);
        let mut engine = AIEngine::new();
        for algorithm in Algorithm::ALL {
            let result =
                engine.get_next_move_with_stats(&b, 0, 400, 2, algorithm, Phase::Playing);
            assert!(result.depth >= 1, "{algorithm}");
            assert!(b.clone().try_move(result.best_move.unwrap(), Phase::Playing));
        }
        let timing = engine.timing_stats();
        assert_eq!(timing.on_time + timing.timeouts, 4);
    }

    #[test]
    fn test_budget_below_reserve_still_moves() {
        let b = board(OPENING);
        let mut engine = AIEngine::new();
        let mv = engine.get_next_move(&b, 0, 100, 1, Algorithm::AlphaBetaOrdered, Phase::Playing);
        assert!(b.clone().try_move(mv.unwrap(), Phase::Playing));
        assert_eq!(engine.timing_stats().timeouts, 1);
    }

    #[test]
    fn test_branching_factor_learned_from_search() {
        let b = board("2\n0\n0 0\n1 3\n1 2 0\n");
        let mut engine = AIEngine::new();
        let result =
            engine.get_next_move_with_stats(&b, 0, 2000, 1, Algorithm::AlphaBetaOrdered, Phase::Playing);
        assert!(!result.aborted);
        assert!(engine.branching_factor() < 15);
        assert!(engine.branching_factor() >= 2);
        assert_eq!(engine.timing_stats().on_time, 1);
    }

    #[test]
    fn test_inactive_player_gets_no_move() {
        let mut b = board(OPENING);
        b.disqualify(2);
        let mut engine = AIEngine::new();
        assert_eq!(engine.get_move(&b, 2, Phase::Playing), None);
    }

    #[test]
    fn test_stop_handle_cancels_search() {
        let b = board(OPENING);
        let mut engine = AIEngine::with_config(Algorithm::Minimax, 30, 0);
        let stop = engine.stop_handle();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            stop.store(true, Ordering::Relaxed);
        });
        let result = engine.get_next_move_with_stats(&b, 30, 0, 1, Algorithm::Minimax, Phase::Playing);
        canceller.join().unwrap();
        assert!(result.aborted);
        assert!(result.depth >= 1);
        assert!(b.clone().try_move(result.best_move.unwrap(), Phase::Playing));
    }

    #[test]
    fn test_setters() {
        let mut engine = AIEngine::default();
        engine.set_algorithm(Algorithm::Aspiration);
        engine.set_max_depth(6);
        engine.set_time_limit(250);
        assert_eq!(engine.algorithm(), Algorithm::Aspiration);
        assert_eq!(engine.max_depth(), 6);
        assert_eq!(engine.time_limit_ms(), 250);
    }
}
