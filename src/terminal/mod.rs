//! The controlling terminal: owns the keyboard, the input line, the
//! prompt and the output pane. Keystrokes are routed to the foreground
//! process — assembled into lines by the discipline below, or forwarded
//! verbatim when the foreground asked for raw input.

mod line_buffer;

pub use line_buffer::LineBuffer;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::text::{Line, Span};

use crate::kernel::{Kernel, Pid, Program};
use crate::output::Output;
use crate::ui::theme;

pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Terminal
    }

    fn handle_key(&mut self, k: &mut Kernel, key: KeyEvent) {
        let fg = k.foreground();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char(c) if ctrl => match c {
                'c' => {
                    k.display.input.clear();
                    let job = k.core(fg).map(|c| c.job.clone()).unwrap_or_default();
                    for member in job {
                        k.interrupt(member);
                    }
                }
                'd' => {
                    if k.display.input.is_empty() {
                        if let Some(exit_input) = k.core(fg).and_then(|c| c.exit_input.clone()) {
                            self.echo_entry(k, fg, &exit_input);
                        }
                        k.eof(fg);
                    }
                }
                'l' => k.display.clear(),
                'u' => {
                    if k.core(fg).is_some_and(|c| c.input_enabled) {
                        k.display.input.clear();
                    }
                }
                _ => {}
            },
            KeyCode::Char(ch) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
                k.display.input.insert(ch);
            }
            KeyCode::Enter => self.accept_line(k, fg),
            KeyCode::Left => k.display.input.left(),
            KeyCode::Right => k.display.input.right(),
            KeyCode::Up => self.history_prev(k, fg),
            KeyCode::Down => self.history_next(k, fg),
            KeyCode::Backspace => {
                k.display.input.backspace();
            }
            KeyCode::Delete => k.display.input.delete(),
            // Reserved for completion.
            KeyCode::Tab => {}
            _ => {}
        }
    }

    fn accept_line(&mut self, k: &mut Kernel, fg: Pid) {
        let line = k.display.input.take();
        let (echo, password) = k
            .core(fg)
            .map(|c| (c.echo, c.password))
            .unwrap_or((false, false));

        if echo {
            let shown = if password {
                "*".repeat(line.chars().count())
            } else {
                line.clone()
            };
            self.echo_entry(k, fg, &shown);
        }

        if !password && !line.trim().is_empty() {
            if let Some(core) = k.core_mut(fg) {
                core.history.retain(|h| h != &line);
                core.history.push(line.clone());
            }
        }

        k.write(fg, Output::text(line));

        if let Some(core) = k.core_mut(fg) {
            core.history_index = core.history.len();
        }
    }

    /// Echo `prompt + text` into the output pane.
    fn echo_entry(&mut self, k: &mut Kernel, fg: Pid, text: &str) {
        let mut line = k
            .core(fg)
            .and_then(|c| c.prompt.as_ref())
            .map(|p| p.render().lines.into_iter().next().unwrap_or_default())
            .unwrap_or_default();
        line.spans.push(Span::styled(
            text.to_string(),
            theme::echo_style(),
        ));
        k.echo_line(line);
    }

    fn history_prev(&mut self, k: &mut Kernel, fg: Pid) {
        let entry = {
            let Some(core) = k.core_mut(fg) else { return };
            if core.history_index == 0 {
                return;
            }
            let at_end = core.history_index == core.history.len();
            core.history_index -= 1;
            (at_end, core.history[core.history_index].clone())
        };
        if entry.0 {
            k.display.input.save_newest();
        }
        k.display.input.set(&entry.1);
    }

    fn history_next(&mut self, k: &mut Kernel, fg: Pid) {
        let next = {
            let Some(core) = k.core_mut(fg) else { return };
            if core.history_index >= core.history.len() {
                return;
            }
            core.history_index += 1;
            if core.history_index == core.history.len() {
                None
            } else {
                Some(core.history[core.history_index].clone())
            }
        };
        match next {
            Some(entry) => k.display.input.set(&entry),
            None => {
                let newest = k.display.input.take_newest();
                k.display.input.set(&newest);
            }
        }
    }
}

impl Program for Terminal {
    fn on_input(&mut self, k: &mut Kernel, pid: Pid, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let fg = k.foreground();
        if fg != pid && k.core(fg).is_some_and(|c| c.raw_input) {
            k.input(fg, key);
            return;
        }
        self.handle_key(k, key);
    }

    /// Output lands in the pane; the terminal never refuses a write.
    fn on_write(&mut self, k: &mut Kernel, _pid: Pid, payload: Output) -> bool {
        k.display.push(payload.render());
        true
    }

    /// The root child returned: the session is over.
    fn on_return(&mut self, k: &mut Kernel, pid: Pid, _child: Pid, code: i32) {
        k.echo_line(Line::from(Span::styled(
            format!("[returned {code}]"),
            theme::epitaph_style(),
        )));
        if let Some(core) = k.core_mut(pid) {
            core.input_enabled = false;
        }
        k.end_session(code);
    }

    // A TTY neither ends nor aborts with its children's streams.
    fn on_eof(&mut self, _k: &mut Kernel, _pid: Pid) {}

    fn on_interrupt(&mut self, _k: &mut Kernel, _pid: Pid) {}
}

impl Default for Terminal {
    fn default() -> Self {
        Terminal::new()
    }
}
