//! Event loops: the interactive TUI session and the headless
//! (script / piped) variant that prints the pane to stdout.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::runtime::Builder;

use crate::config::Config;
use crate::kernel::Kernel;
use crate::services::{Services, Storage};
use crate::session::{self, Session};
use crate::ui::events::{AppEvent, EventHandler};
use crate::ui::render::draw;
use crate::ui::terminal_guard::setup_terminal;

const TICK_RATE: Duration = Duration::from_millis(100);
const SETTLE_POLL: Duration = Duration::from_millis(25);

/// Interactive session. Returns the shell's exit code.
pub fn run(config: Config) -> io::Result<i32> {
    let (mut terminal, guard) = setup_terminal()?;

    let events = EventHandler::new(TICK_RATE);
    let async_runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| io::Error::other(err.to_string()))?;

    let storage = match config.storage.resolved_path() {
        Some(path) => Storage::open(path),
        None => Storage::in_memory(),
    };
    let services = Services::new(storage, events.sender(), Some(async_runtime.handle().clone()));
    let Session { mut kernel, .. } = session::boot(&config, services, true, None);

    // Forward OS signals into the event loop.
    let signal_events = events.sender();
    async_runtime.spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = signal_events.send(AppEvent::Shutdown);
    });

    if let Ok(size) = terminal.size() {
        kernel.display.width = size.width;
        kernel.display.height = size.height;
    }

    let code = loop {
        terminal.draw(|frame| draw(frame, &kernel))?;
        if let Some(code) = kernel.session_end() {
            break code;
        }

        match events.next(TICK_RATE) {
            Ok(AppEvent::Key(key)) => kernel.deliver_key(key),
            Ok(AppEvent::Paste(text)) => {
                for ch in text.chars().filter(|c| !c.is_control()) {
                    kernel.deliver_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
                }
            }
            Ok(AppEvent::Tick) => {}
            Ok(AppEvent::Resize(cols, rows)) => {
                kernel.display.width = cols;
                kernel.display.height = rows;
            }
            Ok(AppEvent::Complete {
                pid,
                token,
                result,
                guard,
            }) => {
                kernel.complete(pid, token, result);
                drop(guard);
            }
            Ok(AppEvent::Shutdown) => break kernel.session_end().unwrap_or(130),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break kernel.session_end().unwrap_or(0),
        }
    };

    // Final frame so the epitaph is visible before teardown.
    terminal.draw(|frame| draw(frame, &kernel))?;
    drop(guard);
    async_runtime.shutdown_timeout(Duration::from_secs(2));
    Ok(code)
}

/// Headless session: commands come from a script in the store or from
/// host stdin; rendered output goes to host stdout as plain text.
pub fn run_headless(config: Config, script: Option<String>) -> io::Result<i32> {
    let (tx, rx) = mpsc::channel();
    let async_runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| io::Error::other(err.to_string()))?;

    let storage = match config.storage.resolved_path() {
        Some(path) => Storage::open(path),
        None => Storage::in_memory(),
    };
    let services = Services::new(storage, tx, Some(async_runtime.handle().clone()));
    let script_mode = script.is_some();
    let Session { mut kernel, .. } = session::boot(&config, services, false, script);

    let stdout = io::stdout();
    pump_settled(&mut kernel, &rx, &stdout);

    if !script_mode {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if kernel.session_end().is_some() {
                break;
            }
            kernel.type_line(&line);
            pump_settled(&mut kernel, &rx, &stdout);
        }
        // End of piped input behaves like Ctrl-D on an empty line. The
        // first EOF lands on whatever holds the foreground; repeat until
        // the shell itself sees one and returns.
        for _ in 0..8 {
            if kernel.session_end().is_some() {
                break;
            }
            kernel.deliver_key(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
            pump_settled(&mut kernel, &rx, &stdout);
        }
    }

    // Drain until the shell returns.
    while kernel.session_end().is_none() {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => apply_completion(&mut kernel, event),
            Err(RecvTimeoutError::Timeout) => {
                if kernel.services.outstanding() == 0 {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
        flush_output(&mut kernel, &stdout);
    }
    flush_output(&mut kernel, &stdout);

    async_runtime.shutdown_timeout(Duration::from_secs(2));
    Ok(kernel.session_end().unwrap_or(0))
}

/// Process completions until no operation is outstanding, printing
/// output as it appears.
fn pump_settled(kernel: &mut Kernel, rx: &Receiver<AppEvent>, stdout: &io::Stdout) {
    loop {
        while let Ok(event) = rx.try_recv() {
            apply_completion(kernel, event);
        }
        flush_output(kernel, stdout);
        if kernel.session_end().is_some() || kernel.services.outstanding() == 0 {
            return;
        }
        match rx.recv_timeout(SETTLE_POLL) {
            Ok(event) => apply_completion(kernel, event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

fn apply_completion(kernel: &mut Kernel, event: AppEvent) {
    if let AppEvent::Complete {
        pid,
        token,
        result,
        guard,
    } = event
    {
        kernel.complete(pid, token, result);
        drop(guard);
    }
}

fn flush_output(kernel: &mut Kernel, stdout: &io::Stdout) {
    let fresh = kernel.display.drain_new();
    if fresh.is_empty() {
        return;
    }
    let mut out = stdout.lock();
    for line in fresh {
        let _ = writeln!(out, "{line}");
    }
    let _ = out.flush();
}
