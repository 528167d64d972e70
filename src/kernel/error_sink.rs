//! The stderr endpoint: an always-live process that restyles whatever it
//! receives and forwards it to the controlling terminal.

use ratatui::text::{Line, Span, Text};

use crate::output::Output;
use crate::ui::theme;

use super::{Kernel, Pid, Program};

pub struct ErrorSink;

impl Program for ErrorSink {
    fn on_write(&mut self, k: &mut Kernel, pid: Pid, payload: Output) -> bool {
        let styled: Vec<Line<'static>> = payload
            .str()
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), theme::error_style())))
            .collect();
        k.write_out(pid, Output::Raw(Text::from(styled)));
        true
    }

    // The sink outlives every job; end-of-input and interrupts are
    // meaningless here.
    fn on_eof(&mut self, _k: &mut Kernel, _pid: Pid) {}

    fn on_interrupt(&mut self, _k: &mut Kernel, _pid: Pid) {}
}
