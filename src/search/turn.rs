//! Turn order and per-ply state of the paranoid search
//!
//! The searching player maximises, every other player minimises. Only the
//! players near the searching player take turns in the playing phase; all
//! active players take part in the bombing phase.

use crate::board::{Board, Phase};

/// Who moves after whom, per phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOrder {
    root: u8,
    playing: Vec<u8>,
    bombing: Vec<u8>,
}

impl TurnOrder {
    pub fn new(board: &Board, root: u8) -> Self {
        let n = board.players();
        let playing = board.neighbouring_players(root);
        let bombing = std::iter::once(root)
            .chain(root.saturating_add(1)..=n)
            .chain(1..root)
            .filter(|&p| board.is_active(p))
            .collect();
        Self {
            root,
            playing,
            bombing,
        }
    }

    /// The maximising player
    #[inline]
    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn players(&self, phase: Phase) -> &[u8] {
        match phase {
            Phase::Playing => &self.playing,
            Phase::Bombing => &self.bombing,
        }
    }

    /// Player after `turn`. A player outside the list hands over to its head.
    pub fn next(&self, phase: Phase, turn: u8) -> u8 {
        let list = self.players(phase);
        match list.iter().position(|&p| p == turn) {
            Some(i) => list[(i + 1) % list.len()],
            None => list.first().copied().unwrap_or(turn),
        }
    }
}

/// State of one node: who moves, remaining depth and the pass bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ply {
    pub turn: u8,
    pub depth: u32,
    pub phase: Phase,
    /// Consecutive players in this phase that had no move
    pub passes: usize,
    pub allow_override: bool,
}

impl Ply {
    pub fn root(order: &TurnOrder, depth: u32, phase: Phase, allow_override: bool) -> Self {
        Self {
            turn: order.root(),
            depth,
            phase,
            passes: 0,
            allow_override,
        }
    }

    #[inline]
    pub fn is_max(&self, order: &TurnOrder) -> bool {
        self.turn == order.root()
    }

    /// Node reached after `turn` moved
    pub fn child(self, order: &TurnOrder) -> Self {
        Self {
            turn: order.next(self.phase, self.turn),
            depth: self.depth.saturating_sub(1),
            passes: 0,
            ..self
        }
    }

    /// Node to search instead when `turn` has no move, `None` at the end of the game.
    ///
    /// Retries the next player at the same depth until every considered
    /// player passed, then re-enables override stones, then moves on to the
    /// bombing phase.
    pub fn after_no_move(self, order: &TurnOrder) -> Option<Self> {
        if self.passes < order.players(self.phase).len() {
            return Some(Self {
                turn: order.next(self.phase, self.turn),
                passes: self.passes + 1,
                ..self
            });
        }
        if !self.allow_override {
            return Some(Self {
                passes: 0,
                allow_override: true,
                ..self
            });
        }
        match self.phase {
            Phase::Playing => Some(Self {
                turn: order.next(Phase::Bombing, self.turn),
                phase: Phase::Bombing,
                passes: 0,
                ..self
            }),
            Phase::Bombing => None,
        }
    }
}
