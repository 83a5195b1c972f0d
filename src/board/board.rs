//! Board content with resources, identity map and stability cache

use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;

use super::parser::{MapDescription, MapError};
use super::{CellId, CellState, Choice, IdentityMap, Move, Phase, Topology, FULLY_STABLE, MAX_PLAYERS};
use crate::eval;
use crate::rules::{bomb, capture, reach, stability};

/// Tournament points by number of players ahead
const TOURNAMENT_POINTS: [u8; 5] = [25, 11, 5, 2, 1];

/// Mutable game state of one search branch.
///
/// Cloning copies the per-cell arrays only, the [`Topology`] is shared.
#[derive(Debug, Clone)]
pub struct Board {
    topology: Arc<Topology>,
    cells: Vec<CellState>,
    /// Locked line families per cell
    stable: Vec<u8>,
    /// Free cells left per line
    free: Vec<u16>,
    override_stones: [u16; MAX_PLAYERS + 1],
    bombs: [u16; MAX_PLAYERS + 1],
    identity: IdentityMap,
    reachable_choice: u16,
    reachable_inversion: u16,
    disqualified: [bool; MAX_PLAYERS + 1],
}

impl Board {
    /// Build the topology and the initial content of a description
    pub fn from_description(desc: &MapDescription) -> Result<Self, MapError> {
        let topology = Arc::new(Topology::build(desc)?);
        let cells: Vec<CellState> = desc.grid.iter().flatten().copied().collect();

        let mut override_stones = [0; MAX_PLAYERS + 1];
        let mut bombs = [0; MAX_PLAYERS + 1];
        for p in 1..=desc.players as usize {
            override_stones[p] = desc.override_stones;
            bombs[p] = desc.bombs;
        }

        let (reachable_choice, reachable_inversion) = reach::reachable_specials(&topology, &cells);

        let mut board = Self {
            stable: vec![0; cells.len()],
            free: vec![0; topology.line_count()],
            cells,
            override_stones,
            bombs,
            identity: IdentityMap::new(desc.players),
            reachable_choice,
            reachable_inversion,
            disqualified: [false; MAX_PLAYERS + 1],
            topology,
        };
        stability::reset(&board.topology, &board.cells, &mut board.stable, &mut board.free);

        log::info!(
            "board loaded: {} players, {} cells, {} lines, {} reachable choice / {} inversion cells",
            desc.players,
            board.cells.len(),
            board.topology.line_count(),
            reachable_choice,
            reachable_inversion
        );
        Ok(board)
    }

    /// Read a description from any reader
    pub fn from_reader(reader: impl Read) -> Result<Self, MapError> {
        Self::from_description(&MapDescription::from_reader(reader)?)
    }

    #[inline]
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    #[inline]
    pub fn players(&self) -> u8 {
        self.identity.players()
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Content of a cell, `None` outside the board
    #[inline]
    pub fn state(&self, cell: CellId) -> Option<CellState> {
        self.cells.get(cell as usize).copied()
    }

    #[inline]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    #[inline]
    pub fn override_stones(&self, player: u8) -> u16 {
        self.override_stones.get(player as usize).copied().unwrap_or(0)
    }

    #[inline]
    pub fn bombs(&self, player: u8) -> u16 {
        self.bombs.get(player as usize).copied().unwrap_or(0)
    }

    #[inline]
    pub fn identity(&self) -> &IdentityMap {
        &self.identity
    }

    /// Color currently played by `player`
    #[inline]
    pub fn color_of(&self, player: u8) -> u8 {
        self.identity.color_of(player)
    }

    /// Player currently owning `color`
    #[inline]
    pub fn owner_of(&self, color: u8) -> u8 {
        self.identity.owner_of(color)
    }

    /// Owner of the stone on `cell`, if any
    pub fn owner_at(&self, cell: CellId) -> Option<u8> {
        match self.state(cell)? {
            CellState::Stone(color) => Some(self.owner_of(color)),
            _ => None,
        }
    }

    #[inline]
    pub fn reachable_choice_cells(&self) -> u16 {
        self.reachable_choice
    }

    #[inline]
    pub fn reachable_inversion_cells(&self) -> u16 {
        self.reachable_inversion
    }

    /// Locked line families of a cell as a 4-bit mask
    #[inline]
    pub fn stability_mask(&self, cell: CellId) -> u8 {
        self.stable.get(cell as usize).copied().unwrap_or(0)
    }

    /// True for a stone locked on all 4 line families
    pub fn is_stable(&self, cell: CellId) -> bool {
        self.state(cell).is_some_and(CellState::is_stone) && self.stability_mask(cell) == FULLY_STABLE
    }

    #[inline]
    pub fn is_disqualified(&self, player: u8) -> bool {
        self.disqualified.get(player as usize).copied().unwrap_or(true)
    }

    pub fn disqualify(&mut self, player: u8) {
        if (1..=self.players()).contains(&player) {
            log::info!("player {} disqualified", player);
            self.disqualified[player as usize] = true;
        }
    }

    /// Player id in range and not disqualified
    #[inline]
    pub fn is_active(&self, player: u8) -> bool {
        (1..=self.players()).contains(&player) && !self.disqualified[player as usize]
    }

    pub fn active_players(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=self.players()).filter(move |&p| self.is_active(p))
    }

    /// Stones currently owned by `player`
    pub fn stone_count(&self, player: u8) -> usize {
        if !(1..=self.players()).contains(&player) {
            return 0;
        }
        let color = self.color_of(player);
        self.cells
            .iter()
            .filter(|&&c| c == CellState::Stone(color))
            .count()
    }

    /// Stone counts indexed by player (index 0 unused)
    pub fn stone_counts(&self) -> [usize; MAX_PLAYERS + 1] {
        let mut counts = [0; MAX_PLAYERS + 1];
        for state in &self.cells {
            if let CellState::Stone(color) = *state {
                counts[self.owner_of(color) as usize] += 1;
            }
        }
        counts
    }

    /// Points awarded for the current standings: 25, 11, 5, 2, 1 by players ahead
    pub fn tournament_points(&self, player: u8) -> u8 {
        if !self.is_active(player) {
            return 0;
        }
        let counts = self.stone_counts();
        let ahead = (1..=self.players())
            .filter(|&p| counts[p as usize] > counts[player as usize])
            .count();
        TOURNAMENT_POINTS.get(ahead).copied().unwrap_or(0)
    }

    /// Players to consider in the search for `player`, see [`reach::neighbouring_players`]
    pub fn neighbouring_players(&self, player: u8) -> Vec<u8> {
        reach::neighbouring_players(
            &self.topology,
            &self.cells,
            &self.identity,
            &self.disqualified,
            player,
        )
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Apply a collaborator move in the given phase
    pub fn try_move(&mut self, mv: Move, phase: Phase) -> bool {
        match phase {
            Phase::Playing => self.try_playing_move(mv.cell, mv.player, mv.choice),
            Phase::Bombing => self.try_bombing_move(mv.cell, mv.player),
        }
    }

    /// Validate and apply a playing-phase move. Refused moves leave the board untouched.
    pub fn try_playing_move(&mut self, cell: CellId, actor: u8, choice: Choice) -> bool {
        self.try_playing_move_with(cell, actor, choice, true)
    }

    /// Like [`try_playing_move`](Self::try_playing_move), optionally refusing
    /// moves that need an override stone.
    pub fn try_playing_move_with(
        &mut self,
        cell: CellId,
        actor: u8,
        choice: Choice,
        allow_override: bool,
    ) -> bool {
        if !self.topology.contains(cell) || !self.is_active(actor) {
            return false;
        }
        let state = self.cells[cell as usize];
        let players = self.players();

        // Payload checks before any mutation
        match (state, choice) {
            (CellState::Destroyed, _) => return false,
            (CellState::Choice, Choice::Player(p)) if (1..=players).contains(&p) => {}
            (CellState::Choice, _) => return false,
            (CellState::Bonus, Choice::Bomb | Choice::OverrideStone) => {}
            (CellState::Bonus, _) => return false,
            _ => {}
        }
        let a = actor as usize;
        if state.is_occupied() && (!allow_override || self.override_stones[a] == 0) {
            return false;
        }

        let color = self.identity.color_of(actor);
        let captured = capture::captured_cells(&self.topology, &self.cells, cell, color);

        if captured.is_empty() {
            if state != CellState::Expansion {
                return false;
            }
            // Territorial claim
            self.override_stones[a] -= 1;
            self.cells[cell as usize] = CellState::Stone(color);
            stability::propagate(&self.topology, &self.cells, &mut self.stable);
            return true;
        }

        match (state, choice) {
            (CellState::Choice, Choice::Player(target)) => {
                self.identity.swap(actor, target);
                self.reachable_choice = self.reachable_choice.saturating_sub(1);
            }
            (CellState::Bonus, Choice::Bomb) => self.bombs[a] = self.bombs[a].saturating_add(1),
            (CellState::Bonus, _) => {
                self.override_stones[a] = self.override_stones[a].saturating_add(1)
            }
            (CellState::Inversion, _) => {
                self.identity.rotate();
                self.reachable_inversion = self.reachable_inversion.saturating_sub(1);
            }
            (CellState::Stone(_) | CellState::Expansion, _) => self.override_stones[a] -= 1,
            _ => {}
        }

        if state.is_free() {
            stability::occupy(&self.topology, &mut self.stable, &mut self.free, cell);
        }

        // Painted with the color the actor had before a swap or rotation
        self.cells[cell as usize] = CellState::Stone(color);
        for c in captured {
            self.cells[c as usize] = CellState::Stone(color);
        }

        if matches!(state, CellState::Choice | CellState::Inversion) {
            stability::reset(&self.topology, &self.cells, &mut self.stable, &mut self.free);
        } else {
            stability::propagate(&self.topology, &self.cells, &mut self.stable);
        }
        true
    }

    /// Cheap legality test used by move generation, no payload involved
    pub fn is_playing_move_legal(&self, cell: CellId, actor: u8, allow_override: bool) -> bool {
        if !self.topology.contains(cell) || !self.is_active(actor) {
            return false;
        }
        let state = self.cells[cell as usize];
        if state == CellState::Destroyed {
            return false;
        }
        if state.is_occupied() && (!allow_override || self.override_stones[actor as usize] == 0) {
            return false;
        }
        state == CellState::Expansion
            || capture::has_capture(&self.topology, &self.cells, cell, self.color_of(actor))
    }

    /// Validate and apply a bomb. Refused bombs leave the board untouched.
    pub fn try_bombing_move(&mut self, cell: CellId, actor: u8) -> bool {
        if !self.topology.contains(cell) || !self.is_active(actor) {
            return false;
        }
        if self.bombs[actor as usize] == 0 || self.cells[cell as usize] == CellState::Destroyed {
            return false;
        }

        let radius = self.topology.explosion_radius();
        for c in bomb::blast(&self.topology, &self.cells, cell, radius) {
            self.cells[c as usize] = CellState::Destroyed;
        }
        self.bombs[actor as usize] -= 1;
        true
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Heuristic value of the playing phase for `player`
    pub fn evaluate_playing(&self, player: u8) -> i64 {
        eval::evaluate_playing(self, player)
    }

    /// Heuristic value of the bombing phase for `player`
    pub fn evaluate_bombing(&self, player: u8) -> i64 {
        eval::evaluate_bombing(self, player)
    }

    /// Terminal value once nobody can move in either phase
    pub fn evaluate_end_of_game(&self, player: u8) -> i64 {
        eval::evaluate_end_of_game(self, player)
    }

    /// Phase-dependent leaf evaluation
    #[inline]
    pub fn evaluate(&self, player: u8, phase: Phase) -> i64 {
        match phase {
            Phase::Playing => self.evaluate_playing(player),
            Phase::Bombing => self.evaluate_bombing(player),
        }
    }
}

impl FromStr for Board {
    type Err = MapError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_description(&text.parse()?)
    }
}

/// Grid rendering: owner digit per stone, `'` marks fully stable stones,
/// `-` for void and destroyed cells.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topology = &self.topology;
        for y in 0..topology.height() {
            for x in 0..topology.width() {
                if x > 0 {
                    f.write_str(" ")?;
                }
                let Some(cell) = topology.cell_at(x, y) else {
                    f.write_str("- ")?;
                    continue;
                };
                match self.cells[cell as usize] {
                    CellState::Stone(color) => {
                        let mark = if self.is_stable(cell) { '\'' } else { ' ' };
                        write!(f, "{}{}", self.owner_of(color), mark)?;
                    }
                    other => write!(f, "{} ", other.symbol())?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
