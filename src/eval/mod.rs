//! Position evaluation
//!
//! - [`heuristic`]: the playing, bombing and end-of-game evaluations
//! - [`weights`]: tuned constants shared by them

pub mod heuristic;
pub mod weights;

pub use heuristic::{evaluate_bombing, evaluate_end_of_game, evaluate_playing};
pub use weights::EvalWeight;
