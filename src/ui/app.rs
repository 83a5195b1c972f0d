//! Main application for the viewer

use eframe::egui;
use egui::{CentralPanel, Context, CornerRadius, Frame, RichText, SidePanel, TopBottomPanel};

use crate::board::{Board, Choice, Phase};
use crate::search::Algorithm;

use super::board_view::{BoardView, ViewContext};
use super::game_state::{Controller, GameState};
use super::theme::*;

/// Local match viewer
pub struct ReversiApp {
    state: GameState,
    board_view: BoardView,
    show_debug: bool,
}

impl ReversiApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, board: Board) -> Self {
        Self {
            state: GameState::new(board),
            board_view: BoardView::default(),
            show_debug: true,
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &Context) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Game", |ui| {
                    if ui.button("Restart (N)").clicked() {
                        self.state.reset();
                        ui.close_menu();
                    }
                    if ui.button("Undo (U)").clicked() {
                        self.state.undo();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Disqualify current player").clicked() {
                        self.state.disqualify_current();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Engine", |ui| {
                    for algorithm in Algorithm::ALL {
                        ui.radio_value(&mut self.state.engine.algorithm, algorithm, algorithm.to_string());
                    }
                    ui.separator();
                    ui.add(
                        egui::Slider::new(&mut self.state.engine.depth_limit, 0..=12)
                            .text("depth (0 = timed)"),
                    );
                    ui.add(
                        egui::Slider::new(&mut self.state.engine.time_limit_ms, 200..=10_000)
                            .text("time ms"),
                    );
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_debug, "Debug Panel (D)");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let phase = match self.state.phase {
                        Phase::Playing => "Playing phase",
                        Phase::Bombing => "Bombing phase",
                    };
                    ui.label(format!("{} players - {phase}", self.state.players()));
                });
            });
        });
    }

    /// Render the side panel with match info and debug
    fn render_side_panel(&mut self, ctx: &Context) {
        SidePanel::right("info_panel")
            .min_width(260.0)
            .max_width(300.0)
            .frame(Frame::new().fill(PANEL_BG))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(12.0);
                    self.render_turn_card(ui);
                    ui.add_space(10.0);
                    self.render_standings_card(ui);
                    ui.add_space(10.0);
                    self.render_controllers_card(ui);
                    ui.add_space(10.0);
                    self.render_choices_card(ui);

                    if self.show_debug {
                        ui.add_space(10.0);
                        self.render_debug_card(ui);
                    }

                    if let Some(msg) = &self.state.message {
                        ui.add_space(10.0);
                        Self::render_message_card(ui, msg);
                    }
                });
            });
    }

    /// Helper to create a card frame
    fn card_frame() -> Frame {
        Frame::new()
            .fill(CARD_BG)
            .corner_radius(CornerRadius::same(8))
            .inner_margin(12.0)
    }

    fn render_turn_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            if self.state.game_over {
                ui.label(RichText::new("GAME OVER").size(18.0).strong().color(WIN_HIGHLIGHT));
                return;
            }
            let player = self.state.current;
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(egui::Vec2::splat(40.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 18.0, player_color(player));
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    player.to_string(),
                    egui::FontId::proportional(20.0),
                    label_on(player),
                );
                ui.add_space(10.0);
                ui.vertical(|ui| {
                    ui.label(RichText::new(format!("PLAYER {player}")).size(16.0).strong().color(TEXT_PRIMARY));
                    let (status, color) = if self.state.is_ai_thinking() {
                        ("Engine thinking...", TIMER_WARNING)
                    } else if self.state.is_human_turn() {
                        ("Your turn", TIMER_NORMAL)
                    } else {
                        ("Waiting", TEXT_SECONDARY)
                    };
                    ui.label(RichText::new(status).size(12.0).color(color));
                });
            });

            ui.add_space(6.0);
            if let Some(elapsed) = self.state.ai_thinking_elapsed() {
                let secs = elapsed.as_secs_f32();
                let limit = self.state.engine.time_limit_ms as f32 / 1000.0;
                let color = if secs < limit * 0.5 {
                    TIMER_NORMAL
                } else if secs < limit {
                    TIMER_WARNING
                } else {
                    TIMER_CRITICAL
                };
                ui.label(RichText::new(format!("{secs:.2}s")).size(22.0).strong().color(color));
                if ui.button("Stop search").clicked() {
                    self.state.stop_ai();
                }
            } else {
                let elapsed = self.state.move_timer.elapsed();
                ui.label(RichText::new(format!("{:.1}s", elapsed.as_secs_f32())).size(20.0).color(TEXT_PRIMARY));
            }
            if let Some(ai_time) = self.state.move_timer.ai_thinking_time {
                ui.label(RichText::new(format!("Last engine move: {:.3}s", ai_time.as_secs_f32())).size(10.0).color(TEXT_SECONDARY));
            }
        });
    }

    fn render_standings_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("STANDINGS").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);
            egui::Grid::new("standings").striped(true).show(ui, |ui| {
                for header in ["", "stones", "pts", "ovr", "bombs"] {
                    ui.label(RichText::new(header).size(10.0).color(TEXT_MUTED));
                }
                ui.end_row();
                for row in self.state.standings() {
                    let name = RichText::new(format!("P{}", row.player)).strong().color(player_color(row.player));
                    ui.label(if row.disqualified { name.strikethrough() } else { name });
                    ui.label(row.stones.to_string());
                    ui.label(row.points.to_string());
                    ui.label(row.override_stones.to_string());
                    ui.label(row.bombs.to_string());
                    ui.end_row();
                }
            });
        });
    }

    fn render_controllers_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("CONTROLLERS").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);
            for player in 1..=self.state.players() {
                let slot = &mut self.state.controllers[player as usize - 1];
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("P{player}")).color(player_color(player)));
                    ui.radio_value(slot, Controller::Human, "Human");
                    ui.radio_value(slot, Controller::Engine, "Engine");
                });
            }
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if ui.button("Undo").clicked() {
                    self.state.undo();
                }
                if ui.button("Hint").clicked() {
                    self.state.request_suggestion();
                }
            });
            ui.label(RichText::new(format!("Move #{}", self.state.move_history.len())).size(11.0).color(TEXT_SECONDARY));
        });
    }

    /// Payload of human moves onto bonus and choice cells
    fn render_choices_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("SPECIAL CELLS").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label("Bonus:");
                ui.radio_value(&mut self.state.bonus_choice, Choice::Bomb, "Bomb");
                ui.radio_value(&mut self.state.bonus_choice, Choice::OverrideStone, "Override");
            });
            ui.horizontal(|ui| {
                ui.label("Swap with:");
                let players = self.state.players();
                egui::ComboBox::from_id_salt("swap_target")
                    .selected_text(format!("P{}", self.state.swap_target))
                    .show_ui(ui, |ui| {
                        for p in 1..=players {
                            ui.selectable_value(&mut self.state.swap_target, p, format!("P{p}"));
                        }
                    });
            });
        });
    }

    fn render_debug_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("ENGINE DEBUG").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);

            let Some(result) = &self.state.last_ai_result else {
                ui.label(RichText::new("Waiting for engine...").size(10.0).color(TEXT_MUTED));
                return;
            };
            ui.label(RichText::new(result.algorithm.to_string()).size(11.0).strong().color(TIMER_NORMAL));
            ui.label(RichText::new(format!("Score: {}", result.score)).size(10.0).color(TEXT_SECONDARY));
            ui.label(RichText::new(format!("Depth {} in {}ms{}", result.depth, result.time_ms,
                if result.aborted { " (aborted)" } else { "" })).size(10.0).color(TEXT_SECONDARY));
            ui.label(RichText::new(format!("{} nodes, {} leaves", result.nodes, result.stats.leaf_evaluations)).size(10.0).color(TEXT_MUTED));
            ui.label(RichText::new(format!(
                "cutoffs {} ({:.0}% first), re-searches {}",
                result.stats.cutoffs,
                result.stats.first_move_rate(),
                result.stats.window_failures
            )).size(10.0).color(TEXT_MUTED));

            if let Some(mv) = result.best_move {
                let (x, y) = self.state.board.topology().coords(mv.cell);
                let payload = match mv.choice {
                    Choice::None => String::new(),
                    choice => format!(" [{}]", choice.code()),
                };
                ui.add_space(4.0);
                ui.label(RichText::new(format!("-> ({x}, {y}){payload}")).size(12.0).strong().color(WIN_HIGHLIGHT));
            }
        });
    }

    fn render_message_card(ui: &mut egui::Ui, msg: &str) {
        Frame::new()
            .fill(egui::Color32::from_rgb(80, 60, 30))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(RichText::new(msg).size(11.0).color(TEXT_PRIMARY));
            });
    }

    /// Render the main board
    fn render_board(&mut self, ctx: &Context) {
        CentralPanel::default().show(ctx, |ui| {
            let view = ViewContext {
                current: self.state.current,
                last_move: self.state.last_move,
                suggested_move: self.state.suggested_move,
                game_over: self.state.game_over,
            };
            let state = &self.state;
            let clicked = self.board_view.show(ui, &state.board, &view, |cell| {
                state.is_human_turn() && state.is_legal(cell)
            });

            if let Some(cell) = clicked {
                if let Err(msg) = self.state.try_play(cell) {
                    self.state.message = Some(msg);
                }
            }
        });
    }

    /// Handle keyboard shortcuts
    fn handle_input(&mut self, ctx: &Context) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::D) {
                self.show_debug = !self.show_debug;
            }
            if i.key_pressed(egui::Key::H) {
                self.state.request_suggestion();
            }
            if i.key_pressed(egui::Key::U) {
                self.state.undo();
            }
            if i.key_pressed(egui::Key::N) {
                self.state.reset();
            }
        });
    }
}

impl eframe::App for ReversiApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);
        self.state.check_ai_result();

        if self.state.is_ai_turn() && !self.state.is_ai_thinking() {
            self.state.start_ai_thinking();
        }

        self.render_menu_bar(ctx);
        self.render_side_panel(ctx);
        self.render_board(ctx);

        if self.state.is_ai_thinking() || !self.state.game_over {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
