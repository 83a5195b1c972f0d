//! Reversi engine viewer
//!
//! Loads a board description from the path given as first argument, or a
//! small built-in board, and opens a local match window.

use std::fs::File;
use std::process::ExitCode;

use reversi::ui::ReversiApp;
use reversi::{Board, MapError};

const DEMO_BOARD: &str = "\
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

fn load_board() -> Result<Board, MapError> {
    match std::env::args().nth(1) {
        Some(path) => Board::from_reader(File::open(path)?),
        None => DEMO_BOARD.parse(),
    }
}

fn main() -> ExitCode {
    let board = match load_board() {
        Ok(board) => board,
        Err(err) => {
            eprintln!("cannot load board: {err}");
            return ExitCode::FAILURE;
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Reversi Engine"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Reversi Engine",
        options,
        Box::new(|cc| Ok(Box::new(ReversiApp::new(cc, board)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("viewer error: {err}");
            ExitCode::FAILURE
        }
    }
}
