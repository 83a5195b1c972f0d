//! GUI module for local matches
//!
//! This module provides a native Rust GUI using egui/eframe. Any mix of
//! human and engine players can play a full two-phase match.

mod app;
mod board_view;
mod game_state;
mod theme;

pub use app::ReversiApp;
pub use game_state::{Controller, EngineSettings, GameState, Standing};
