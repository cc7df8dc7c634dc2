use ratatui::style::{Color, Modifier, Style};

// Palette
pub const BRAND: Color = Color::Rgb(64, 128, 192);
pub const SAVED: Color = Color::Rgb(96, 160, 96);
pub const UNSAVED: Color = Color::Rgb(192, 160, 64);
pub const FAILED: Color = Color::Rgb(192, 64, 64);
pub const DIM: Color = Color::Rgb(128, 128, 128);
pub const TEXT: Color = Color::White;
pub const SELECTION_BG: Color = Color::Rgb(48, 48, 64);
pub const STATUS_BG: Color = Color::Rgb(32, 32, 40);

fn fg(color: Color) -> Style {
    Style::default().fg(color)
}

pub fn title_style() -> Style {
    fg(BRAND).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(SELECTION_BG).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    fg(TEXT)
}

pub fn muted_style() -> Style {
    fg(DIM)
}

/// Labels and section headings
pub fn highlight_style() -> Style {
    fg(UNSAVED)
}

/// Rows whose id is still a client placeholder
pub fn pending_style() -> Style {
    fg(UNSAVED).add_modifier(Modifier::ITALIC)
}

pub fn success_style() -> Style {
    fg(SAVED)
}

pub fn error_style() -> Style {
    fg(FAILED)
}

pub fn border_style(focused: bool) -> Style {
    fg(if focused { BRAND } else { DIM })
}

pub fn status_bar_style() -> Style {
    fg(TEXT).bg(STATUS_BG)
}

/// Key names in help text and prompts
pub fn help_key_style() -> Style {
    highlight_style().add_modifier(Modifier::BOLD)
}
