//! Session bootstrap: terminal, error sink, shell, wired and launched.

use crate::config::Config;
use crate::kernel::error_sink::ErrorSink;
use crate::kernel::{Kernel, Pid};
use crate::services::Services;
use crate::shell::Shell;
use crate::terminal::Terminal;

pub struct Session {
    pub kernel: Kernel,
    pub tty: Pid,
    pub shell: Pid,
}

/// Build the root process tree. The terminal is the root TTY; the error
/// sink forwards styled stderr into it; the shell is the terminal's
/// child, foreground from the moment it executes. A `script` store key
/// puts the shell in script mode.
pub fn boot(
    config: &Config,
    services: Services,
    interactive: bool,
    script: Option<String>,
) -> Session {
    let mut kernel = Kernel::new(services, config.terminal.scrollback_lines);

    let tty = kernel.spawn("term", None, Box::new(Terminal::new()));
    if let Some(core) = kernel.core_mut(tty) {
        core.tty = true;
    }
    kernel.set_tty(tty);
    kernel.execute(tty, Vec::new());

    let sink = kernel.spawn("stderr", None, Box::new(ErrorSink));
    if let Some(core) = kernel.core_mut(sink) {
        core.stdout = Some(tty);
    }
    kernel.execute(sink, Vec::new());

    let shell = kernel.spawn("sh", Some(tty), Box::new(Shell::new(config, interactive)));
    if let Some(core) = kernel.core_mut(shell) {
        core.stdin = Some(tty);
        core.stdout = Some(tty);
        core.stderr = Some(sink);
        core.variables.extend(config.variables.clone());
    }
    let args = script.map(|path| vec![path]).unwrap_or_default();
    kernel.execute(shell, args);

    Session { kernel, tty, shell }
}
