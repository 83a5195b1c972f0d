//! Board representation for the multiplayer Reversi variant
//!
//! The board is split in two layers:
//! - [`Topology`]: immutable geometry (neighbour links, lines, influence),
//!   built once per game and shared between all clones through an `Arc`
//! - [`Board`]: per-branch mutable content (cells, resources, identity map,
//!   stability cache) that is cloned for every search branch

pub mod board;
pub mod identity;
pub mod parser;
pub mod topology;

#[cfg(test)]
mod tests;

// Re-exports
pub use board::Board;
pub use identity::IdentityMap;
pub use parser::{Endpoint, MapDescription, MapError, Transition};
pub use topology::{Topology, Weights};

/// Dense index of an existing (non-void) cell
pub type CellId = u16;

/// Maximum number of players in a game
pub const MAX_PLAYERS: usize = 8;
/// Maximum board width and height
pub const MAX_DIMENSION: usize = 50;
/// Number of neighbour directions
pub const DIRECTIONS: usize = 8;
/// Number of line families (vertical, antidiagonal, horizontal, diagonal)
pub const LINE_FAMILIES: usize = 4;
/// Stability mask of a stone locked on every line family
pub const FULLY_STABLE: u8 = 0b1111;

/// Grid offsets `(dx, dy)` per direction, clockwise starting north.
/// Direction `d` and `d + 4` are opposite, `d % 4` is the line family.
pub const DIRECTION_OFFSETS: [(i32, i32); DIRECTIONS] = [
    (0, -1),  // N
    (1, -1),  // NE
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
];

/// Direction pointing the other way
#[inline]
pub const fn opposite(dir: usize) -> usize {
    (dir + 4) % DIRECTIONS
}

/// Content of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    Empty,
    /// Removed by a bomb, permanently out of play
    Destroyed,
    /// Stone of the given color (1..=8)
    Stone(u8),
    Bonus,
    Choice,
    Inversion,
    Expansion,
}

impl CellState {
    /// Free cells count toward a line's remaining capacity
    #[inline]
    pub fn is_free(self) -> bool {
        matches!(
            self,
            CellState::Empty | CellState::Bonus | CellState::Choice | CellState::Inversion
        )
    }

    #[inline]
    pub fn is_stone(self) -> bool {
        matches!(self, CellState::Stone(_))
    }

    /// Cells an override stone can be placed on
    #[inline]
    pub fn is_occupied(self) -> bool {
        matches!(self, CellState::Stone(_) | CellState::Expansion)
    }

    /// Parse a grid token. `None` for unknown tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "0" => Some(CellState::Empty),
            "b" => Some(CellState::Bonus),
            "c" => Some(CellState::Choice),
            "i" => Some(CellState::Inversion),
            "x" => Some(CellState::Expansion),
            _ => match token.parse::<u8>() {
                Ok(color @ 1..=8) => Some(CellState::Stone(color)),
                _ => None,
            },
        }
    }

    /// Single character used by the text rendering
    pub fn symbol(self) -> char {
        match self {
            CellState::Empty => '0',
            CellState::Destroyed => '-',
            CellState::Stone(color) => char::from(b'0' + color),
            CellState::Bonus => 'b',
            CellState::Choice => 'c',
            CellState::Inversion => 'i',
            CellState::Expansion => 'x',
        }
    }
}

/// Sub-option attached to a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Choice {
    #[default]
    None,
    /// Player to swap colors with on a choice cell
    Player(u8),
    /// Take a bomb from a bonus cell
    Bomb,
    /// Take an override stone from a bonus cell
    OverrideStone,
}

impl Choice {
    /// Wire code of the bonus bomb option
    pub const BOMB_CODE: u8 = 20;
    /// Wire code of the bonus override-stone option
    pub const OVERRIDE_CODE: u8 = 21;

    /// Decode the collaborator's numeric choice
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Choice::None),
            1..=8 => Some(Choice::Player(code)),
            Self::BOMB_CODE => Some(Choice::Bomb),
            Self::OVERRIDE_CODE => Some(Choice::OverrideStone),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Choice::None => 0,
            Choice::Player(p) => p,
            Choice::Bomb => Self::BOMB_CODE,
            Choice::OverrideStone => Self::OVERRIDE_CODE,
        }
    }
}

/// A move of one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub cell: CellId,
    pub player: u8,
    pub choice: Choice,
}

impl Move {
    #[inline]
    pub fn new(cell: CellId, player: u8, choice: Choice) -> Self {
        Self {
            cell,
            player,
            choice,
        }
    }
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Placing stones and resolving special cells
    #[default]
    Playing,
    /// Destroying cells with bombs
    Bombing,
}
