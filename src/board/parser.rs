//! Board description format
//!
//! ```text
//! <players>
//! <override stones>
//! <bombs> <radius>
//! <height> <width>
//! <height rows of width tokens: - 0 1..8 b c i x>
//! <x1> <y1> <d1> <-> <x2> <y2> <d2>   (zero or more)
//! ```
//!
//! Tokens are whitespace separated, line breaks carry no meaning.

use std::io::Read;
use std::iter::Peekable;
use std::str::{FromStr, SplitWhitespace};

use thiserror::Error;

use super::{CellState, DIRECTIONS, MAX_DIMENSION, MAX_PLAYERS};

/// Errors raised while loading a board description
#[derive(Debug, Error)]
pub enum MapError {
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEnd(&'static str),
    #[error("invalid {field}: {token:?}")]
    InvalidNumber { field: &'static str, token: String },
    #[error("player count {0} outside 1..=8")]
    PlayerCount(usize),
    #[error("board size {width}x{height} outside 1..=50")]
    Dimensions { width: usize, height: usize },
    #[error("unknown cell token {token:?} at ({x}, {y})")]
    CellToken { token: String, x: usize, y: usize },
    #[error("stone of color {color} at ({x}, {y}) but only {players} players")]
    StoneColor {
        color: u8,
        x: usize,
        y: usize,
        players: u8,
    },
    #[error("expected `<->` in transition, found {0:?}")]
    TransitionSeparator(String),
    #[error("transition endpoint ({x}, {y}) is not a board cell")]
    TransitionEndpoint { x: usize, y: usize },
    #[error("direction {0} outside 0..=7")]
    Direction(usize),
    #[error("failed to read board description")]
    Io(#[from] std::io::Error),
}

/// One side of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub x: usize,
    pub y: usize,
    pub dir: u8,
}

/// Explicit non-grid link between two cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Endpoint,
    pub to: Endpoint,
}

/// Parsed board description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDescription {
    pub players: u8,
    pub override_stones: u16,
    pub bombs: u16,
    pub radius: u8,
    pub width: usize,
    pub height: usize,
    /// Row-major grid, `None` for void cells
    pub grid: Vec<Option<CellState>>,
    pub transitions: Vec<Transition>,
}

impl MapDescription {
    /// Read and parse a description from any reader
    pub fn from_reader(mut reader: impl Read) -> Result<Self, MapError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        text.parse()
    }

    /// Cell content at `(x, y)`, `None` for void or out of bounds
    pub fn cell(&self, x: usize, y: usize) -> Option<CellState> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.grid[y * self.width + x]
    }
}

struct Tokens<'a> {
    inner: Peekable<SplitWhitespace<'a>>,
}

impl<'a> Tokens<'a> {
    fn next(&mut self, field: &'static str) -> Result<&'a str, MapError> {
        self.inner.next().ok_or(MapError::UnexpectedEnd(field))
    }

    fn number<T: FromStr>(&mut self, field: &'static str) -> Result<T, MapError> {
        let token = self.next(field)?;
        token.parse().map_err(|_| MapError::InvalidNumber {
            field,
            token: token.to_string(),
        })
    }

    fn endpoint(&mut self, grid: &MapDescription) -> Result<Endpoint, MapError> {
        let x: usize = self.number("transition x")?;
        let y: usize = self.number("transition y")?;
        let dir: usize = self.number("transition direction")?;
        if dir >= DIRECTIONS {
            return Err(MapError::Direction(dir));
        }
        if grid.cell(x, y).is_none() {
            return Err(MapError::TransitionEndpoint { x, y });
        }
        Ok(Endpoint {
            x,
            y,
            dir: dir as u8,
        })
    }
}

impl FromStr for MapDescription {
    type Err = MapError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut tokens = Tokens {
            inner: text.split_whitespace().peekable(),
        };

        let players: usize = tokens.number("player count")?;
        if players == 0 || players > MAX_PLAYERS {
            return Err(MapError::PlayerCount(players));
        }
        let override_stones = tokens.number("override stone count")?;
        let bombs = tokens.number("bomb count")?;
        let radius = tokens.number("explosion radius")?;
        let height: usize = tokens.number("height")?;
        let width: usize = tokens.number("width")?;
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(MapError::Dimensions { width, height });
        }

        let mut desc = MapDescription {
            players: players as u8,
            override_stones,
            bombs,
            radius,
            width,
            height,
            grid: Vec::with_capacity(width * height),
            transitions: Vec::new(),
        };

        for y in 0..height {
            for x in 0..width {
                let token = tokens.next("grid")?;
                let cell = if token == "-" {
                    None
                } else {
                    let state = CellState::from_token(token).ok_or_else(|| MapError::CellToken {
                        token: token.to_string(),
                        x,
                        y,
                    })?;
                    if let CellState::Stone(color) = state {
                        if color > desc.players {
                            return Err(MapError::StoneColor {
                                color,
                                x,
                                y,
                                players: desc.players,
                            });
                        }
                    }
                    Some(state)
                };
                desc.grid.push(cell);
            }
        }

        while tokens.inner.peek().is_some() {
            let from = tokens.endpoint(&desc)?;
            let separator = tokens.next("transition")?;
            if separator != "<->" {
                return Err(MapError::TransitionSeparator(separator.to_string()));
            }
            let to = tokens.endpoint(&desc)?;
            desc.transitions.push(Transition { from, to });
        }

        Ok(desc)
    }
}
