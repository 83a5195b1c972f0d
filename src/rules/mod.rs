//! Game rules for the Reversi variant
//!
//! This module implements the rule machinery behind [`Board`](crate::Board):
//! - Capture runs over the link graph
//! - Bomb explosions
//! - Stability bookkeeping (line free counts, locks, propagation)
//! - Reachability of special cells and neighbouring players

pub mod bomb;
pub mod capture;
pub mod reach;
pub mod stability;

// Re-exports for convenient access
pub use bomb::blast;
pub use capture::{captured_cells, has_capture};
pub use reach::{neighbouring_players, reachable_specials};
