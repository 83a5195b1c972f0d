//! Theme constants for the viewer

use egui::Color32;

// Board colors
pub const BOARD_BG: Color32 = Color32::from_rgb(34, 92, 60);
pub const CELL_EMPTY: Color32 = Color32::from_rgb(46, 125, 80);
pub const CELL_DESTROYED: Color32 = Color32::from_rgb(28, 28, 30);
pub const GRID_LINE: Color32 = Color32::from_rgb(20, 60, 38);

// Special cells
pub const CELL_BONUS: Color32 = Color32::from_rgb(214, 170, 40);
pub const CELL_CHOICE: Color32 = Color32::from_rgb(90, 120, 210);
pub const CELL_INVERSION: Color32 = Color32::from_rgb(170, 80, 190);
pub const CELL_EXPANSION: Color32 = Color32::from_rgb(120, 120, 125);

/// Stone color per player id (index 0 = player 1)
pub const PLAYER_COLORS: [Color32; 8] = [
    Color32::from_rgb(25, 25, 30),
    Color32::from_rgb(250, 250, 252),
    Color32::from_rgb(220, 60, 60),
    Color32::from_rgb(60, 130, 230),
    Color32::from_rgb(240, 200, 50),
    Color32::from_rgb(150, 80, 200),
    Color32::from_rgb(240, 140, 40),
    Color32::from_rgb(60, 200, 200),
];

pub fn player_color(player: u8) -> Color32 {
    PLAYER_COLORS
        .get(usize::from(player).wrapping_sub(1))
        .copied()
        .unwrap_or(Color32::GRAY)
}

/// Readable label color on top of a player's stone
pub fn label_on(player: u8) -> Color32 {
    match player {
        2 | 5 | 8 => Color32::from_rgb(30, 30, 35),
        _ => Color32::from_rgb(240, 240, 245),
    }
}

// Markers
pub const LAST_MOVE_MARKER: Color32 = Color32::from_rgb(230, 60, 60);
pub const STABLE_MARKER: Color32 = Color32::from_rgb(50, 220, 50);
pub const WIN_HIGHLIGHT: Color32 = Color32::from_rgb(50, 220, 50);

pub fn hover_valid() -> Color32 {
    Color32::from_rgba_unmultiplied(255, 255, 255, 70)
}

pub fn hover_invalid() -> Color32 {
    Color32::from_rgba_unmultiplied(255, 50, 50, 100)
}

pub fn suggestion() -> Color32 {
    Color32::from_rgba_unmultiplied(255, 255, 255, 120)
}

// Panel colors
pub const PANEL_BG: Color32 = Color32::from_rgb(25, 27, 31);
pub const CARD_BG: Color32 = Color32::from_rgb(35, 38, 43);
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 165, 175);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 125, 135);

// Timer colors
pub const TIMER_NORMAL: Color32 = Color32::from_rgb(80, 200, 120);
pub const TIMER_WARNING: Color32 = Color32::from_rgb(255, 180, 50);
pub const TIMER_CRITICAL: Color32 = Color32::from_rgb(255, 70, 70);

// Sizes
pub const BOARD_MARGIN: f32 = 16.0;
pub const STONE_RADIUS_RATIO: f32 = 0.42;
pub const GRID_LINE_WIDTH: f32 = 1.0;
pub const LAST_MOVE_MARKER_RADIUS: f32 = 4.0;
pub const MAX_CELL_SIZE: f32 = 48.0;
