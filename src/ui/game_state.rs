//! Match state management for the viewer

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::board::{Board, CellId, CellState, Choice, Move, Phase, MAX_PLAYERS};
use crate::search::{legal_moves, Algorithm};
use crate::{AIEngine, MoveResult};

/// Who picks the moves of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Controller {
    #[default]
    Human,
    Engine,
}

/// Engine settings shared by every engine-controlled player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub algorithm: Algorithm,
    /// 0 for a time-limited search
    pub depth_limit: u32,
    pub time_limit_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::AlphaBetaOrdered,
            depth_limit: 0,
            time_limit_ms: 1000,
        }
    }
}

/// AI computation state
pub enum AiState {
    Idle,
    Thinking {
        receiver: Receiver<MoveResult>,
        start_time: Instant,
        stop: Arc<AtomicBool>,
    },
}

/// Move timer for tracking thinking time
pub struct MoveTimer {
    pub start_time: Option<Instant>,
    pub last_move_duration: Option<Duration>,
    pub ai_thinking_time: Option<Duration>,
}

impl Default for MoveTimer {
    fn default() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_move_duration: None,
            ai_thinking_time: None,
        }
    }
}

impl MoveTimer {
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn stop(&mut self) -> Duration {
        let duration = self.elapsed();
        self.last_move_duration = Some(duration);
        self.start_time = None;
        duration
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.map_or(Duration::ZERO, |t| t.elapsed())
    }

    pub fn set_ai_time(&mut self, duration: Duration) {
        self.ai_thinking_time = Some(duration);
    }
}

/// One row of the standings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub player: u8,
    pub stones: usize,
    pub points: u8,
    pub override_stones: u16,
    pub bombs: u16,
    pub disqualified: bool,
}

/// Main match state
pub struct GameState {
    initial: Board,
    pub board: Board,
    pub phase: Phase,
    pub current: u8,
    pub controllers: [Controller; MAX_PLAYERS],
    pub engine: EngineSettings,
    pub game_over: bool,
    pub last_move: Option<Move>,
    pub move_history: Vec<(Move, Phase)>,
    pub last_ai_result: Option<MoveResult>,
    pub ai_state: AiState,
    pub move_timer: MoveTimer,
    pub suggested_move: Option<Move>,
    pub message: Option<String>,
    /// Reward taken on bonus cells
    pub bonus_choice: Choice,
    /// Player swapped with on choice cells
    pub swap_target: u8,
    /// Players that passed in a row in the current phase
    passes: usize,
}

impl GameState {
    /// Player 1 is human, everyone else is played by the engine
    pub fn new(board: Board) -> Self {
        let mut controllers = [Controller::Engine; MAX_PLAYERS];
        controllers[0] = Controller::Human;
        let mut state = Self {
            initial: board.clone(),
            board,
            phase: Phase::Playing,
            current: 1,
            controllers,
            engine: EngineSettings::default(),
            game_over: false,
            last_move: None,
            move_history: Vec::new(),
            last_ai_result: None,
            ai_state: AiState::Idle,
            move_timer: MoveTimer::default(),
            suggested_move: None,
            message: None,
            bonus_choice: Choice::OverrideStone,
            swap_target: 1,
            passes: 0,
        };
        state.settle();
        state
    }

    pub fn reset(&mut self) {
        self.cancel_ai();
        self.board = self.initial.clone();
        self.phase = Phase::Playing;
        self.current = 1;
        self.game_over = false;
        self.last_move = None;
        self.move_history.clear();
        self.last_ai_result = None;
        self.move_timer = MoveTimer::default();
        self.suggested_move = None;
        self.message = None;
        self.passes = 0;
        self.settle();
    }

    pub fn players(&self) -> u8 {
        self.board.players()
    }

    pub fn controller(&self, player: u8) -> Controller {
        self.controllers
            .get(usize::from(player).wrapping_sub(1))
            .copied()
            .unwrap_or_default()
    }

    /// Check if it's a human's turn
    pub fn is_human_turn(&self) -> bool {
        !self.game_over && self.controller(self.current) == Controller::Human
    }

    /// Check if it's the AI's turn
    pub fn is_ai_turn(&self) -> bool {
        !self.game_over && self.controller(self.current) == Controller::Engine
    }

    /// Check if AI is currently thinking
    pub fn is_ai_thinking(&self) -> bool {
        matches!(self.ai_state, AiState::Thinking { .. })
    }

    /// Payload a human move onto `cell` carries
    pub fn choice_for(&self, cell: CellId) -> Choice {
        match self.board.state(cell) {
            Some(CellState::Bonus) => self.bonus_choice,
            Some(CellState::Choice) => Choice::Player(self.swap_target),
            _ => Choice::None,
        }
    }

    /// Whether the current player may move onto `cell`
    pub fn is_legal(&self, cell: CellId) -> bool {
        match self.phase {
            Phase::Playing => self.board.is_playing_move_legal(cell, self.current, true),
            Phase::Bombing => {
                self.board.bombs(self.current) > 0
                    && self.board.state(cell).is_some_and(|s| s != CellState::Destroyed)
            }
        }
    }

    /// Attempt a human move onto `cell`
    pub fn try_play(&mut self, cell: CellId) -> Result<(), String> {
        if self.game_over {
            return Err("Game is over".to_string());
        }
        if self.is_ai_thinking() {
            return Err("AI is thinking".to_string());
        }
        if !self.is_human_turn() {
            return Err("Not your turn".to_string());
        }

        let mv = Move::new(cell, self.current, self.choice_for(cell));
        if !self.execute_move(mv) {
            warn!("rejected {:?} move of player {} on cell {cell}", self.phase, mv.player);
            return Err(format!("Invalid move on cell {cell}"));
        }
        Ok(())
    }

    /// Apply a move (for both human and AI) and hand over the turn
    fn execute_move(&mut self, mv: Move) -> bool {
        if !self.board.try_move(mv, self.phase) {
            return false;
        }
        self.move_history.push((mv, self.phase));
        self.last_move = Some(mv);
        self.suggested_move = None;
        self.message = None;
        self.move_timer.stop();

        self.passes = 0;
        self.current = self.next_active(self.current);
        self.settle();
        self.move_timer.start();
        true
    }

    /// Active player after `player` in id order
    fn next_active(&self, player: u8) -> u8 {
        let n = u16::from(self.players());
        (1..=n)
            .map(|step| ((u16::from(player) + step - 1) % n.max(1) + 1) as u8)
            .find(|&p| self.board.is_active(p))
            .unwrap_or(player)
    }

    fn has_move(&self, player: u8) -> bool {
        self.board.is_active(player)
            && !legal_moves(&self.board, player, self.phase, true).is_empty()
    }

    /// Skip players without a move, switch to the bombing phase once
    /// nobody can place, end the game once nobody can bomb.
    fn settle(&mut self) {
        let active = self.board.active_players().count();
        loop {
            if active == 0 {
                self.finish();
                return;
            }
            if self.has_move(self.current) {
                return;
            }
            self.passes += 1;
            if self.passes < active {
                self.current = self.next_active(self.current);
                continue;
            }
            match self.phase {
                Phase::Playing => {
                    info!("nobody can place a stone, bombing phase begins");
                    self.phase = Phase::Bombing;
                    self.passes = 0;
                    self.current = self.next_active(0);
                }
                Phase::Bombing => {
                    self.finish();
                    return;
                }
            }
        }
    }

    fn finish(&mut self) {
        self.game_over = true;
        self.move_timer.stop();
        let summary: Vec<String> = self
            .standings()
            .iter()
            .map(|s| format!("{}: {} stones, {} points", s.player, s.stones, s.points))
            .collect();
        info!("game over: {}", summary.join("; "));
    }

    /// Remove the current player from the match
    pub fn disqualify_current(&mut self) {
        if self.game_over {
            return;
        }
        self.cancel_ai();
        let player = self.current;
        self.board.disqualify(player);
        self.message = Some(format!("Player {player} disqualified"));
        self.passes = 0;
        self.current = self.next_active(player);
        self.settle();
    }

    /// Players ranked by stone count
    pub fn standings(&self) -> Vec<Standing> {
        let counts = self.board.stone_counts();
        let mut rows: Vec<Standing> = (1..=self.players())
            .map(|p| Standing {
                player: p,
                stones: counts[p as usize],
                points: self.board.tournament_points(p),
                override_stones: self.board.override_stones(p),
                bombs: self.board.bombs(p),
                disqualified: self.board.is_disqualified(p),
            })
            .collect();
        rows.sort_by(|a, b| b.stones.cmp(&a.stones));
        rows
    }

    /// Start AI thinking
    pub fn start_ai_thinking(&mut self) {
        if !self.is_ai_turn() || self.is_ai_thinking() {
            return;
        }

        let board = self.board.clone();
        let player = self.current;
        let phase = self.phase;
        let settings = self.engine;

        let engine =
            AIEngine::with_config(settings.algorithm, settings.depth_limit, settings.time_limit_ms);
        let stop = engine.stop_handle();
        let (tx, rx) = channel();

        thread::spawn(move || {
            let mut engine = engine;
            let result = engine.get_next_move_with_stats(
                &board,
                settings.depth_limit,
                settings.time_limit_ms,
                player,
                settings.algorithm,
                phase,
            );
            let _ = tx.send(result);
        });

        self.ai_state = AiState::Thinking {
            receiver: rx,
            start_time: Instant::now(),
            stop,
        };
    }

    /// Ask the running search to return its best move so far
    pub fn stop_ai(&self) {
        if let AiState::Thinking { stop, .. } = &self.ai_state {
            stop.store(true, Ordering::Relaxed);
        }
    }

    /// Abort a running search and drop its result
    pub fn cancel_ai(&mut self) {
        self.stop_ai();
        self.ai_state = AiState::Idle;
    }

    /// Check if AI has finished thinking
    pub fn check_ai_result(&mut self) {
        let result = match &self.ai_state {
            AiState::Thinking {
                receiver,
                start_time,
                ..
            } => match receiver.try_recv() {
                Ok(result) => Some((result, start_time.elapsed())),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    self.ai_state = AiState::Idle;
                    self.message = Some("AI error".to_string());
                    return;
                }
            },
            AiState::Idle => None,
        };

        if let Some((move_result, elapsed)) = result {
            self.ai_state = AiState::Idle;
            self.move_timer.set_ai_time(elapsed);
            let best = move_result.best_move;
            self.last_ai_result = Some(move_result);

            match best {
                Some(mv) if self.execute_move(mv) => {}
                Some(mv) => {
                    warn!("engine move {mv:?} rejected");
                    self.message = Some("AI move rejected".to_string());
                    self.disqualify_current();
                }
                None => {
                    self.message = Some("AI could not find a move".to_string());
                    self.disqualify_current();
                }
            }
        }
    }

    /// Get AI thinking elapsed time
    pub fn ai_thinking_elapsed(&self) -> Option<Duration> {
        match &self.ai_state {
            AiState::Thinking { start_time, .. } => Some(start_time.elapsed()),
            AiState::Idle => None,
        }
    }

    /// Quick engine suggestion for the current player
    pub fn request_suggestion(&mut self) {
        if self.game_over || self.is_ai_thinking() {
            return;
        }
        let mut engine = AIEngine::with_config(Algorithm::AlphaBetaOrdered, 3, 0);
        let result = engine.get_next_move_with_stats(
            &self.board,
            3,
            0,
            self.current,
            Algorithm::AlphaBetaOrdered,
            self.phase,
        );
        self.suggested_move = result.best_move;
        self.last_ai_result = Some(result);
    }

    /// Undo back to the last move of a human player
    pub fn undo(&mut self) {
        if self.move_history.is_empty() {
            return;
        }
        self.cancel_ai();

        let keep = self
            .move_history
            .iter()
            .rposition(|(mv, _)| self.controller(mv.player) == Controller::Human)
            .unwrap_or(self.move_history.len() - 1);
        let moves: Vec<_> = self.move_history.drain(..keep).collect();

        self.reset();
        for (mv, _) in moves {
            self.execute_move(mv);
        }
    }
}
