//! Shared test harness: an in-memory session with a typed keyboard and
//! a completion pump.

#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use seashell::config::Config;
use seashell::kernel::{Kernel, Pid};
use seashell::services::{Services, Storage};
use seashell::session::{self, Session};
use seashell::ui::events::AppEvent;

pub struct Harness {
    pub kernel: Kernel,
    pub tty: Pid,
    pub shell: Pid,
    rx: Receiver<AppEvent>,
}

impl Harness {
    /// Non-interactive session, empty store.
    pub fn new() -> Self {
        HarnessBuilder::default().build()
    }

    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// Type a command line and settle every pending completion.
    pub fn line(&mut self, command: &str) {
        self.kernel.type_line(command);
        self.pump();
    }

    pub fn key(&mut self, code: KeyCode) {
        self.kernel.deliver_key(KeyEvent::new(code, KeyModifiers::NONE));
        self.pump();
    }

    pub fn ctrl(&mut self, c: char) {
        self.kernel
            .deliver_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
        self.pump();
    }

    /// Dispatch queued completions until the channel is empty.
    pub fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            if let AppEvent::Complete {
                pid,
                token,
                result,
                guard,
            } = event
            {
                self.kernel.complete(pid, token, result);
                drop(guard);
            }
        }
    }

    /// Block until async tasks (timers, HTTP) have reported in, up to
    /// `timeout`.
    pub fn pump_until_settled(&mut self, timeout: std::time::Duration) {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            self.pump();
            if self.kernel.services.outstanding() == 0 || std::time::Instant::now() > deadline {
                return;
            }
            if let Ok(event) = self.rx.recv_timeout(std::time::Duration::from_millis(20)) {
                if let AppEvent::Complete {
                    pid,
                    token,
                    result,
                    guard,
                } = event
                {
                    self.kernel.complete(pid, token, result);
                    drop(guard);
                }
            }
        }
    }

    /// Plain-text contents of the output pane.
    pub fn screen(&self) -> String {
        self.kernel.display.text()
    }

    /// A shell environment variable.
    pub fn var(&self, name: &str) -> Option<String> {
        self.kernel
            .core(self.shell)
            .and_then(|c| c.variables.get(name).cloned())
    }

    /// The shell's `$?`.
    pub fn status(&self) -> String {
        self.var("?").unwrap_or_default()
    }

    pub fn foreground(&self) -> Pid {
        self.kernel.foreground()
    }

    pub fn stored(&self, path: &str) -> Option<String> {
        self.kernel.services.storage.read(path).ok()
    }
}

#[derive(Default)]
pub struct HarnessBuilder {
    interactive: bool,
    script: Option<String>,
    variables: Vec<(String, String)>,
    seed: Vec<(String, String)>,
    runtime: Option<tokio::runtime::Handle>,
}

impl HarnessBuilder {
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    pub fn script(mut self, path: &str) -> Self {
        self.script = Some(path.to_string());
        self
    }

    /// Seed a shell environment variable (config `[variables]`).
    pub fn variable(mut self, name: &str, value: &str) -> Self {
        self.variables.push((name.to_string(), value.to_string()));
        self
    }

    /// Seed a file into the store before boot.
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.seed.push((path.to_string(), content.to_string()));
        self
    }

    /// Attach a tokio runtime so timers and HTTP work.
    pub fn runtime(mut self, handle: tokio::runtime::Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> Harness {
        let mut config = Config::default();
        for (name, value) in self.variables {
            config.variables.insert(name, value);
        }

        let mut storage = Storage::in_memory();
        for (path, content) in &self.seed {
            storage.write(path, content);
        }

        let (tx, rx) = mpsc::channel();
        let services = Services::new(storage, tx, self.runtime);
        let Session { kernel, tty, shell } =
            session::boot(&config, services, self.interactive, self.script);

        let mut harness = Harness {
            kernel,
            tty,
            shell,
            rx,
        };
        // Settle startup reads (profile / script).
        harness.pump();
        harness
    }
}
