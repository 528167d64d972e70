//! Modal full-screen editor (`vi`).
//!
//! Runs with raw input: every keystroke arrives verbatim. The buffer is
//! one string per line; the cursor remembers a virtual column across
//! vertical motion. `z` writes the file and exits, `q` exits without
//! saving; save failures go to stderr and the editor stays open.

mod motion;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::text::Line;

use crate::kernel::{codes, Kernel, Overlay, Pid, Program};
use crate::output::Output;
use crate::services::{Completion, StorageReply, Token};
use crate::ui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Insert,
}

enum Wait {
    Load,
    Save,
}

pub struct Editor {
    path: String,
    buffer: Vec<String>,
    mode: Mode,
    line: usize,
    col: usize,
    virtual_col: usize,
    token: Token,
    waiting: Option<Wait>,
}

impl Default for Editor {
    fn default() -> Self {
        Editor {
            path: String::new(),
            buffer: vec![String::new()],
            mode: Mode::Normal,
            line: 0,
            col: 0,
            virtual_col: 0,
            token: 0,
            waiting: None,
        }
    }
}

impl Editor {
    fn line_chars(&self) -> Vec<char> {
        self.buffer[self.line].chars().collect()
    }

    fn line_len(&self) -> usize {
        self.buffer[self.line].chars().count()
    }

    /// Largest valid column in normal mode (the last character).
    fn max_normal_col(&self) -> usize {
        self.line_len().saturating_sub(1)
    }

    fn byte_index(&self, col: usize) -> usize {
        let line = &self.buffer[self.line];
        line.char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    fn set_col(&mut self, col: usize) {
        self.col = col;
        self.virtual_col = col;
    }

    fn clamp_vertical(&mut self) {
        self.col = self.virtual_col.min(self.max_normal_col());
    }

    fn handle_normal(&mut self, k: &mut Kernel, pid: Pid, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') => self.set_col(self.col.saturating_sub(1)),
            KeyCode::Char('l') => self.set_col((self.col + 1).min(self.max_normal_col())),
            KeyCode::Char('j') => {
                if self.line + 1 < self.buffer.len() {
                    self.line += 1;
                    self.clamp_vertical();
                }
            }
            KeyCode::Char('k') => {
                if self.line > 0 {
                    self.line -= 1;
                    self.clamp_vertical();
                }
            }
            KeyCode::Char('w') => self.word_forward(),
            KeyCode::Char('b') => self.word_back(),
            KeyCode::Char('^') => self.set_col(0),
            KeyCode::Char('$') => self.set_col(self.max_normal_col()),
            KeyCode::Char('i') => self.mode = Mode::Insert,
            KeyCode::Char('a') => {
                self.col = (self.col + 1).min(self.line_len());
                self.virtual_col = self.col;
                self.mode = Mode::Insert;
            }
            KeyCode::Char('o') => {
                self.buffer.insert(self.line + 1, String::new());
                self.line += 1;
                self.set_col(0);
                self.mode = Mode::Insert;
            }
            KeyCode::Char('z') => self.save(k, pid),
            KeyCode::Char('q') => k.exit(pid, codes::SUCCESS),
            _ => {}
        }
    }

    fn handle_insert(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.col = self.col.min(self.max_normal_col());
                self.virtual_col = self.col;
            }
            KeyCode::Char(ch) => {
                let at = self.byte_index(self.col);
                self.buffer[self.line].insert(at, ch);
                self.set_col(self.col + 1);
            }
            KeyCode::Enter => {
                let at = self.byte_index(self.col);
                let rest = self.buffer[self.line].split_off(at);
                self.buffer.insert(self.line + 1, rest);
                self.line += 1;
                self.set_col(0);
            }
            KeyCode::Backspace => {
                if self.col > 0 {
                    let at = self.byte_index(self.col - 1);
                    self.buffer[self.line].remove(at);
                    self.set_col(self.col - 1);
                } else if self.line > 0 {
                    let removed = self.buffer.remove(self.line);
                    self.line -= 1;
                    let joined_at = self.line_len();
                    self.buffer[self.line].push_str(&removed);
                    self.set_col(joined_at);
                }
            }
            _ => {}
        }
    }

    fn word_forward(&mut self) {
        let chars = self.line_chars();
        match motion::next_word_start(&chars, self.col) {
            Some(col) => self.set_col(col),
            None => {
                if self.line + 1 < self.buffer.len() {
                    self.line += 1;
                    let chars = self.line_chars();
                    let first = chars
                        .iter()
                        .position(|c| !c.is_whitespace())
                        .unwrap_or(0);
                    self.set_col(first);
                }
            }
        }
    }

    fn word_back(&mut self) {
        let chars = self.line_chars();
        match motion::prev_word_start(&chars, self.col) {
            Some(col) => self.set_col(col),
            None => {
                if self.line > 0 {
                    self.line -= 1;
                    let chars = self.line_chars();
                    let col = motion::prev_word_start(&chars, chars.len()).unwrap_or(0);
                    self.set_col(col);
                }
            }
        }
    }

    fn save(&mut self, k: &mut Kernel, pid: Pid) {
        self.token = k.services.next_token();
        self.waiting = Some(Wait::Save);
        let content = self.buffer.join("\n");
        let path = self.path.clone();
        k.services.storage_write(pid, self.token, &path, &content);
    }

    fn refresh(&self, k: &mut Kernel) {
        let lines = self
            .buffer
            .iter()
            .map(|l| Line::from(l.clone()))
            .collect();
        let mode = match self.mode {
            Mode::Insert => "-- INSERT --",
            Mode::Normal => "",
        };
        let status = format!(
            "{}  {}:{}  {}",
            self.path,
            self.line + 1,
            self.col + 1,
            mode
        );
        k.display.overlay = Some(Overlay {
            lines,
            cursor_line: self.line,
            cursor_col: self.col,
            status: Line::from(ratatui::text::Span::styled(status, theme::status_style())),
        });
    }
}

impl Program for Editor {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        let path = k.core(pid).and_then(|c| c.args.first().cloned());
        let Some(path) = path else {
            k.write_err(pid, Output::text("vi: missing operand"));
            return Some(codes::FAILURE);
        };
        self.path = path.clone();
        if let Some(core) = k.core_mut(pid) {
            core.raw_input = true;
            core.owns_overlay = true;
        }
        self.token = k.services.next_token();
        self.waiting = Some(Wait::Load);
        k.services.storage_read(pid, self.token, &path);
        None
    }

    fn on_input(&mut self, k: &mut Kernel, pid: Pid, key: KeyEvent) {
        if matches!(self.waiting, Some(Wait::Load)) {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return;
        }
        match self.mode {
            Mode::Normal => self.handle_normal(k, pid, key),
            Mode::Insert => self.handle_insert(key),
        }
        if k.core(pid).is_some_and(|c| c.is_running()) {
            self.refresh(k);
        }
    }

    fn on_completion(&mut self, k: &mut Kernel, pid: Pid, token: Token, result: Completion) {
        if token != self.token {
            return;
        }
        match self.waiting.take() {
            Some(Wait::Load) => {
                if let Completion::Storage(Ok(StorageReply::Content(content))) = result {
                    self.buffer = content.split('\n').map(str::to_string).collect();
                    if self.buffer.is_empty() {
                        self.buffer.push(String::new());
                    }
                }
                self.refresh(k);
            }
            Some(Wait::Save) => match result {
                Completion::Storage(Ok(_)) => k.exit(pid, codes::SUCCESS),
                Completion::Storage(Err(err)) => {
                    k.write_err(pid, Output::text(format!("vi: {err}")));
                    self.refresh(k);
                }
                _ => {}
            },
            None => {}
        }
    }

    // A full-screen program swallows stream EOF; only `q`, `z`, or an
    // interrupt closes it.
    fn on_eof(&mut self, _k: &mut Kernel, _pid: Pid) {}
}
