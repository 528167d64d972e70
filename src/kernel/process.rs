//! Process state machine and the hook interface every runnable unit
//! implements.

use std::collections::HashMap;

use crossterm::event::KeyEvent;

use crate::output::Output;
use crate::services::{Completion, Token};

use super::{Kernel, Pid};

/// Conventional exit codes.
pub mod codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 127;
    pub const INTERRUPTED: i32 = 130;
}

/// Monotonic lifecycle: Ready → Running → Terminated. Operations on a
/// process in the wrong state are no-ops, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    Terminated,
}

/// Bookkeeping shared by every process, owned by the kernel table.
///
/// `stdin`/`stdout`/`stderr` are pids — weak links into the table, never
/// owning references. Ownership runs parent → children only.
#[derive(Debug)]
pub struct ProcessCore {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    pub parent: Option<Pid>,
    pub children: Vec<Pid>,
    /// Peer pids of the pipeline this process belongs to. A lone
    /// process has `job == [self]`.
    pub job: Vec<Pid>,
    pub stdin: Option<Pid>,
    pub stdout: Option<Pid>,
    pub stderr: Option<Pid>,
    pub args: Vec<String>,
    /// Snapshot-copied from the parent at spawn; mutations never
    /// propagate upward.
    pub variables: HashMap<String, String>,
    pub history: Vec<String>,
    pub history_index: usize,
    pub input_enabled: bool,
    pub echo: bool,
    pub password: bool,
    /// Receive key events instead of assembled lines.
    pub raw_input: bool,
    /// This process owns a terminal. Only the root terminal qualifies.
    pub tty: bool,
    /// The full-screen overlay belongs to this process and is dropped
    /// when it terminates.
    pub owns_overlay: bool,
    /// Literal string echoed on end-of-input (e.g. "exit").
    pub exit_input: Option<String>,
    pub prompt: Option<Output>,
    pub input_ended: bool,
    pub exit_code: Option<i32>,
}

impl ProcessCore {
    pub(super) fn new(pid: Pid, name: &str) -> Self {
        ProcessCore {
            pid,
            name: name.to_string(),
            state: ProcessState::Ready,
            parent: None,
            children: Vec::new(),
            job: vec![pid],
            stdin: None,
            stdout: None,
            stderr: None,
            args: Vec::new(),
            variables: HashMap::new(),
            history: Vec::new(),
            history_index: 0,
            input_enabled: true,
            echo: true,
            password: false,
            raw_input: false,
            tty: false,
            owns_overlay: false,
            exit_input: None,
            prompt: None,
            input_ended: false,
            exit_code: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }
}

/// Behavior hooks. The kernel drives the lifecycle; implementations only
/// fill in what happens at each point.
pub trait Program {
    /// Runs once when the process starts. Returning `Some(code)` exits
    /// immediately with that code; `None` keeps the process running.
    fn on_execute(&mut self, _k: &mut Kernel, _pid: Pid) -> Option<i32> {
        None
    }

    /// A payload arrived on stdin. Returning `false` disables further
    /// input, which the producer observes on its next write.
    fn on_write(&mut self, _k: &mut Kernel, _pid: Pid, _payload: Output) -> bool {
        true
    }

    /// A raw key event, delivered only to `raw_input` foregrounds.
    fn on_input(&mut self, _k: &mut Kernel, _pid: Pid, _key: KeyEvent) {}

    fn on_eof(&mut self, k: &mut Kernel, pid: Pid) {
        default_eof(k, pid);
    }

    fn on_interrupt(&mut self, k: &mut Kernel, pid: Pid) {
        default_interrupt(k, pid);
    }

    /// A child process terminated with `code`.
    fn on_return(&mut self, _k: &mut Kernel, _pid: Pid, _child: Pid, _code: i32) {}

    /// An asynchronous operation finished. Compare `token` against the
    /// one stored when the operation was started; a mismatch is stale.
    fn on_completion(&mut self, _k: &mut Kernel, _pid: Pid, _token: Token, _result: Completion) {}
}

/// Default end-of-input: exit normally while still accepting input.
pub fn default_eof(k: &mut Kernel, pid: Pid) {
    if k.core(pid).is_some_and(|c| c.input_enabled) {
        k.exit(pid, codes::SUCCESS);
    }
}

/// Default interrupt: bubble to the parent, then exit 130.
pub fn default_interrupt(k: &mut Kernel, pid: Pid) {
    if let Some(parent) = k.core(pid).and_then(|c| c.parent) {
        k.interrupt(parent);
    }
    k.exit(pid, codes::INTERRUPTED);
}
