//! Child generation
//!
//! Children are produced lazily in a fixed order: canonical cell order, or
//! the order of a given cell list. A bonus cell yields one child per reward,
//! a choice cell one child per target player, every other cell at most one.
//! Each child owns its own copy of the board content.

use std::ops::Range;
use std::slice;

use crate::board::{Board, CellId, CellState, Choice, Move, Phase};

/// Sub-option `index` of a move onto a cell in `state`
fn nth_choice(state: CellState, index: u8, players: u8) -> Option<Choice> {
    match state {
        CellState::Bonus => [Choice::Bomb, Choice::OverrideStone]
            .get(index as usize)
            .copied(),
        CellState::Choice => (index < players).then_some(Choice::Player(index + 1)),
        _ => (index == 0).then_some(Choice::None),
    }
}

enum Cells<'a> {
    All(Range<CellId>),
    Listed(slice::Iter<'a, CellId>),
}

impl Iterator for Cells<'_> {
    type Item = CellId;

    fn next(&mut self) -> Option<CellId> {
        match self {
            Cells::All(range) => range.next(),
            Cells::Listed(iter) => iter.next().copied(),
        }
    }
}

/// Lazy iterator over `(move, resulting board)` pairs
pub struct Children<'a> {
    board: &'a Board,
    player: u8,
    phase: Phase,
    allow_override: bool,
    cells: Cells<'a>,
    /// Cell whose sub-options are being expanded
    current: Option<(CellId, CellState)>,
    next_choice: u8,
}

impl<'a> Children<'a> {
    /// All cells in canonical order
    pub fn new(board: &'a Board, player: u8, phase: Phase, allow_override: bool) -> Self {
        let cells = Cells::All(0..board.cell_count() as CellId);
        Self::with_cells(board, player, phase, allow_override, cells)
    }

    /// Only the given cells, in the given order
    pub fn ordered(
        board: &'a Board,
        player: u8,
        phase: Phase,
        allow_override: bool,
        order: &'a [CellId],
    ) -> Self {
        Self::with_cells(board, player, phase, allow_override, Cells::Listed(order.iter()))
    }

    fn with_cells(
        board: &'a Board,
        player: u8,
        phase: Phase,
        allow_override: bool,
        cells: Cells<'a>,
    ) -> Self {
        Self {
            board,
            player,
            phase,
            allow_override,
            cells,
            current: None,
            next_choice: 0,
        }
    }

    fn next_playing(&mut self) -> Option<(Move, Board)> {
        loop {
            if let Some((cell, state)) = self.current {
                while let Some(choice) = nth_choice(state, self.next_choice, self.board.players()) {
                    self.next_choice += 1;
                    let mut child = self.board.clone();
                    if child.try_playing_move_with(cell, self.player, choice, self.allow_override) {
                        return Some((Move::new(cell, self.player, choice), child));
                    }
                }
                self.current = None;
            }

            let cell = self.cells.next()?;
            if self.board.is_playing_move_legal(cell, self.player, self.allow_override) {
                let state = self.board.state(cell)?;
                self.current = Some((cell, state));
                self.next_choice = 0;
            }
        }
    }

    fn next_bombing(&mut self) -> Option<(Move, Board)> {
        if self.board.bombs(self.player) == 0 {
            return None;
        }
        loop {
            let cell = self.cells.next()?;
            if self.board.state(cell) == Some(CellState::Destroyed) {
                continue;
            }
            let mut child = self.board.clone();
            if child.try_bombing_move(cell, self.player) {
                return Some((Move::new(cell, self.player, Choice::None), child));
            }
        }
    }
}

impl Iterator for Children<'_> {
    type Item = (Move, Board);

    fn next(&mut self) -> Option<Self::Item> {
        match self.phase {
            Phase::Playing => self.next_playing(),
            Phase::Bombing => self.next_bombing(),
        }
    }
}

/// All legal moves of `player`, without the resulting boards
pub fn legal_moves(board: &Board, player: u8, phase: Phase, allow_override: bool) -> Vec<Move> {
    Children::new(board, player, phase, allow_override)
        .map(|(mv, _)| mv)
        .collect()
}
