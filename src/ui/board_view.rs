//! Board rendering for the viewer

use egui::{Align2, CornerRadius, FontId, Painter, Pos2, Rect, Sense, Stroke, Vec2};

use crate::board::{Board, CellId, CellState, Move};

use super::theme::*;

/// What the board view needs besides the board itself
pub struct ViewContext {
    pub current: u8,
    pub last_move: Option<Move>,
    pub suggested_move: Option<Move>,
    pub game_over: bool,
}

/// Board view handles rendering and input for the game board
pub struct BoardView {
    /// Cached cell size for coordinate calculations
    cell_size: f32,
    /// Board drawing area
    board_rect: Rect,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            cell_size: 30.0,
            board_rect: Rect::NOTHING,
        }
    }
}

impl BoardView {
    /// Render the board and return the clicked cell if any.
    /// `is_legal` decides the hover preview and which clicks count.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        board: &Board,
        view: &ViewContext,
        is_legal: impl Fn(CellId) -> bool,
    ) -> Option<CellId> {
        let topology = board.topology();
        let (width, height) = (topology.width() as f32, topology.height() as f32);
        let available = ui.available_size() - Vec2::splat(20.0);

        self.cell_size = ((available.x - 2.0 * BOARD_MARGIN) / width)
            .min((available.y - 2.0 * BOARD_MARGIN) / height)
            .clamp(4.0, MAX_CELL_SIZE);
        let size = Vec2::new(width, height) * self.cell_size + Vec2::splat(2.0 * BOARD_MARGIN);

        let (response, painter) = ui.allocate_painter(size, Sense::click());
        self.board_rect = response.rect;
        painter.rect_filled(self.board_rect, CornerRadius::same(4), BOARD_BG);

        for cell in 0..board.cell_count() as CellId {
            self.draw_cell(&painter, board, cell);
        }

        if let Some(mv) = view.last_move {
            painter.circle_filled(self.center(board, mv.cell), LAST_MOVE_MARKER_RADIUS, LAST_MOVE_MARKER);
        }
        if let Some(mv) = view.suggested_move {
            let radius = self.cell_size * STONE_RADIUS_RATIO;
            let center = self.center(board, mv.cell);
            painter.circle_stroke(center, radius, Stroke::new(2.0, suggestion()));
            painter.text(center, Align2::CENTER_CENTER, "?", self.font(0.4), suggestion());
        }

        if view.game_over {
            return None;
        }
        let cell = response.hover_pos().and_then(|p| self.screen_to_cell(board, p))?;
        let legal = is_legal(cell);
        let rect = self.cell_rect(board, cell).shrink(1.0);
        let color = if legal { hover_valid() } else { hover_invalid() };
        painter.rect_filled(rect, CornerRadius::same(2), color);
        if legal {
            let radius = self.cell_size * STONE_RADIUS_RATIO;
            painter.circle_stroke(rect.center(), radius, Stroke::new(2.0, player_color(view.current)));
        }

        (response.clicked() && legal).then_some(cell)
    }

    fn draw_cell(&self, painter: &Painter, board: &Board, cell: CellId) {
        let rect = self.cell_rect(board, cell);
        let Some(state) = board.state(cell) else {
            return;
        };
        let fill = match state {
            CellState::Destroyed => CELL_DESTROYED,
            CellState::Bonus => CELL_BONUS,
            CellState::Choice => CELL_CHOICE,
            CellState::Inversion => CELL_INVERSION,
            CellState::Expansion => CELL_EXPANSION,
            CellState::Empty | CellState::Stone(_) => CELL_EMPTY,
        };
        painter.rect_filled(rect.shrink(0.5), CornerRadius::same(0), fill);
        painter.rect_stroke(
            rect,
            CornerRadius::same(0),
            Stroke::new(GRID_LINE_WIDTH, GRID_LINE),
            egui::StrokeKind::Inside,
        );

        match state {
            CellState::Stone(color) => self.draw_stone(painter, board, cell, board.owner_of(color)),
            CellState::Bonus | CellState::Choice | CellState::Inversion | CellState::Expansion => {
                let label = state.symbol().to_string();
                painter.text(rect.center(), Align2::CENTER_CENTER, label, self.font(0.45), TEXT_PRIMARY);
            }
            CellState::Empty | CellState::Destroyed => {}
        }
    }

    /// Stone in the owner's color, with the owner digit and a stability ring
    fn draw_stone(&self, painter: &Painter, board: &Board, cell: CellId, owner: u8) {
        let center = self.center(board, cell);
        let radius = self.cell_size * STONE_RADIUS_RATIO;

        painter.circle_filled(
            center + Vec2::splat(1.5),
            radius,
            egui::Color32::from_rgba_unmultiplied(0, 0, 0, 60),
        );
        painter.circle_filled(center, radius, player_color(owner));
        if board.is_stable(cell) {
            painter.circle_stroke(center, radius, Stroke::new(2.0, STABLE_MARKER));
        }
        if self.cell_size >= 14.0 {
            painter.text(center, Align2::CENTER_CENTER, owner.to_string(), self.font(0.4), label_on(owner));
        }
    }

    fn font(&self, ratio: f32) -> FontId {
        FontId::proportional((self.cell_size * ratio).max(6.0))
    }

    fn cell_rect(&self, board: &Board, cell: CellId) -> Rect {
        let (x, y) = board.topology().coords(cell);
        let min = self.board_rect.min
            + Vec2::splat(BOARD_MARGIN)
            + Vec2::new(x as f32, y as f32) * self.cell_size;
        Rect::from_min_size(min, Vec2::splat(self.cell_size))
    }

    fn center(&self, board: &Board, cell: CellId) -> Pos2 {
        self.cell_rect(board, cell).center()
    }

    /// Convert screen coordinates to a cell, `None` off the board or on void
    pub fn screen_to_cell(&self, board: &Board, screen_pos: Pos2) -> Option<CellId> {
        let relative = screen_pos - self.board_rect.min - Vec2::splat(BOARD_MARGIN);
        if relative.x < 0.0 || relative.y < 0.0 {
            return None;
        }
        let x = (relative.x / self.cell_size).floor() as usize;
        let y = (relative.y / self.cell_size).floor() as usize;
        board.topology().cell_at(x, y)
    }
}
