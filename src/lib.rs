//! Reversi engine for a multiplayer variant with special cells
//!
//! A game-playing agent for up to 8 players on arbitrary boards:
//! - Up to 50x50 cells with holes and wrap-around transitions
//! - Override stones to capture onto occupied cells
//! - Bonus, choice, inversion and expansion cells
//! - A playing phase followed by a bombing phase
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Board description parsing, topology and mutable board state
//! - [`rules`]: Captures, bomb blasts, stability and reachability
//! - [`eval`]: Phase-specific position evaluation
//! - [`search`]: Paranoid minimax / alpha-beta with iterative deepening
//! - [`engine`]: Time management and search driver per move
//! - [`ui`]: Local match viewer
//!
//! # Quick Start
//!
//! ```
//! use reversi::{AIEngine, Algorithm, Board, Phase};
//!
//! let mut board: Board = "2\n0\n0 0\n4 4\n0 0 0 0\n0 1 2 0\n0 2 1 0\n0 0 0 0\n"
//!     .parse()
//!     .unwrap();
//! let mut engine = AIEngine::with_config(Algorithm::AlphaBetaOrdered, 3, 0);
//!
//! // Player 1 moves
//! if let Some(mv) = engine.get_move(&board, 1, Phase::Playing) {
//!     assert!(board.try_move(mv, Phase::Playing));
//!     println!("{board}");
//! }
//! ```
//!
//! # Logging
//!
//! The crate logs through the `log` facade and never installs a logger.

pub mod board;
pub mod engine;
pub mod eval;
pub mod rules;
pub mod search;
pub mod ui;

// Re-export commonly used types for convenience
pub use board::{Board, CellId, CellState, Choice, MapError, Move, Phase, Topology};
pub use engine::{AIEngine, MoveResult, TimingStats};
pub use search::{Algorithm, Deadline, SearchConfig};
