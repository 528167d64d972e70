use ratatui::style::{Color, Modifier, Style};

pub const PROMPT: Color = Color::Rgb(0x22, 0xc5, 0x5e);
pub const PROMPT_ERROR: Color = Color::Rgb(0xef, 0x44, 0x44);
pub const ERROR_TEXT: Color = Color::Rgb(0xef, 0x44, 0x44);
pub const ECHO_TEXT: Color = Color::Rgb(0x9c, 0xa3, 0xaf);
pub const STATUS_BAR: Color = Color::Rgb(0x40, 0x40, 0x40);

pub fn prompt_style() -> Style {
    Style::default().fg(PROMPT).add_modifier(Modifier::BOLD)
}

pub fn prompt_error_style() -> Style {
    Style::default().fg(PROMPT_ERROR).add_modifier(Modifier::BOLD)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR_TEXT)
}

pub fn echo_style() -> Style {
    Style::default().fg(ECHO_TEXT)
}

pub fn epitaph_style() -> Style {
    Style::default().fg(ECHO_TEXT).add_modifier(Modifier::ITALIC)
}

pub fn status_style() -> Style {
    Style::default().bg(STATUS_BAR)
}
