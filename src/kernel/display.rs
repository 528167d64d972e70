//! The terminal's panes: output scrollback, the in-progress input line,
//! and the optional full-screen overlay.
//!
//! Only the terminal process (and the overlay's owner) mutate this;
//! the renderer reads it every frame.

use ratatui::text::{Line, Text};

use crate::terminal::LineBuffer;

#[derive(Debug)]
pub struct Display {
    lines: Vec<Line<'static>>,
    scrollback: usize,
    /// How many lines have already been flushed to stdout in headless
    /// mode.
    drained: usize,
    pub input: LineBuffer,
    pub overlay: Option<Overlay>,
    pub width: u16,
    pub height: u16,
}

/// Full-screen UI region used by raw-input programs (the editor).
#[derive(Debug, Default)]
pub struct Overlay {
    pub lines: Vec<Line<'static>>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub status: Line<'static>,
}

impl Display {
    pub fn new(scrollback: usize) -> Self {
        Display {
            lines: Vec::new(),
            scrollback: scrollback.max(1),
            drained: 0,
            input: LineBuffer::default(),
            overlay: None,
            width: 80,
            height: 24,
        }
    }

    /// Append rendered output, trimming the scrollback from the front.
    pub fn push(&mut self, text: Text<'static>) {
        self.lines.extend(text.lines);
        if self.lines.len() > self.scrollback {
            let excess = self.lines.len() - self.scrollback;
            self.lines.drain(..excess);
            self.drained = self.drained.saturating_sub(excess);
        }
    }

    pub fn push_line(&mut self, line: Line<'static>) {
        self.push(Text::from(line));
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.drained = 0;
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    /// Plain-text form of the whole pane.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(line_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Lines appended since the last drain, for incremental headless
    /// printing.
    pub fn drain_new(&mut self) -> Vec<String> {
        let fresh = self.lines[self.drained..].iter().map(line_text).collect();
        self.drained = self.lines.len();
        fresh
    }
}

fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}
