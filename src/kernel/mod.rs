//! The cooperative process runtime.
//!
//! Every runnable unit — terminal, shell, builtins, editor — lives in one
//! process table keyed by pid. Stream endpoints (`stdin`/`stdout`/
//! `stderr`) are pids too, so the stream graph is a process graph;
//! ownership runs parent → children only. Writes fan out synchronously
//! along a pipeline: a write from stage *i* reaches the terminal before
//! control returns to stage *i*.
//!
//! Hook dispatch takes the boxed program out of its table slot for the
//! duration of the call, which makes reentrant calls into *other*
//! processes plain recursion. A call targeting a process whose program is
//! currently out (its own hook is somewhere on the stack) is queued in
//! that process's mailbox and delivered when the hook unwinds, preserving
//! arrival order.

pub mod adapters;
pub mod display;
pub mod error_sink;
pub mod process;

use std::collections::{HashMap, VecDeque};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::text::Line;
use tracing::trace;

use crate::output::Output;
use crate::services::{Completion, Services, Token};

pub use display::{Display, Overlay};
pub use process::{codes, default_eof, default_interrupt, ProcessCore, ProcessState, Program};

pub type Pid = u64;

/// Deferred hook call for a busy program.
enum Op {
    Write(Output),
    Input(KeyEvent),
    Eof,
    Interrupt,
    Return { child: Pid, code: i32 },
    Complete { token: Token, result: Completion },
}

enum Outcome {
    /// Target gone or no longer eligible.
    NotRun,
    /// Queued in the target's mailbox.
    Deferred,
    Unit,
    /// `on_write` keep-producing flag.
    Keep(bool),
}

struct Entry {
    core: ProcessCore,
    program: Option<Box<dyn Program>>,
    mailbox: VecDeque<Op>,
}

pub struct Kernel {
    table: HashMap<Pid, Entry>,
    next_pid: Pid,
    tty: Pid,
    pub services: Services,
    pub display: Display,
    session_end: Option<i32>,
}

impl Kernel {
    pub fn new(services: Services, scrollback: usize) -> Self {
        Kernel {
            table: HashMap::new(),
            next_pid: 0,
            tty: 0,
            services,
            display: Display::new(scrollback),
            session_end: None,
        }
    }

    /// Create a READY process. The environment map is snapshot-copied
    /// from the parent at this point; later parent mutations are not
    /// seen.
    pub fn spawn(&mut self, name: &str, parent: Option<Pid>, program: Box<dyn Program>) -> Pid {
        self.next_pid += 1;
        let pid = self.next_pid;
        let mut core = ProcessCore::new(pid, name);
        core.parent = parent;
        if let Some(vars) = parent.and_then(|p| self.core(p)).map(|c| c.variables.clone()) {
            core.variables = vars;
        }
        self.table.insert(
            pid,
            Entry {
                core,
                program: Some(program),
                mailbox: VecDeque::new(),
            },
        );
        pid
    }

    pub fn core(&self, pid: Pid) -> Option<&ProcessCore> {
        self.table.get(&pid).map(|e| &e.core)
    }

    pub fn core_mut(&mut self, pid: Pid) -> Option<&mut ProcessCore> {
        self.table.get_mut(&pid).map(|e| &mut e.core)
    }

    pub fn set_tty(&mut self, pid: Pid) {
        self.tty = pid;
    }

    pub fn tty(&self) -> Pid {
        self.tty
    }

    /// The unique process currently receiving keyboard input: the tty's
    /// stdout, or the tty itself when no child holds the line.
    pub fn foreground(&self) -> Pid {
        self.core(self.tty)
            .and_then(|c| c.stdout)
            .filter(|pid| self.table.contains_key(pid))
            .unwrap_or(self.tty)
    }

    pub fn session_end(&self) -> Option<i32> {
        self.session_end
    }

    pub fn end_session(&mut self, code: i32) {
        self.session_end.get_or_insert(code);
    }

    /// Live process table snapshot for `ps`, sorted by pid.
    pub fn processes(&self) -> Vec<(Pid, String, ProcessState)> {
        let mut rows: Vec<_> = self
            .table
            .values()
            .map(|e| (e.core.pid, e.core.name.clone(), e.core.state))
            .collect();
        rows.sort_by_key(|r| r.0);
        rows
    }

    // --- lifecycle operations ---

    /// READY → RUNNING. Records args, claims the foreground by pointing
    /// the upstream's stdout at self, registers with the parent, then
    /// runs the startup hook. A hook returning a number exits with it;
    /// an already-dead upstream delivers EOF immediately.
    pub fn execute(&mut self, pid: Pid, args: Vec<String>) {
        let stdin = {
            let Some(core) = self.core_mut(pid) else { return };
            if core.state != ProcessState::Ready {
                return;
            }
            core.state = ProcessState::Running;
            core.args = args;
            core.stdin
        };
        if let Some(up) = stdin {
            if let Some(up_core) = self.core_mut(up) {
                up_core.stdout = Some(pid);
            }
        }
        if let Some(parent) = self.core(pid).and_then(|c| c.parent) {
            if let Some(parent_core) = self.core_mut(parent) {
                if !parent_core.children.contains(&pid) {
                    parent_core.children.push(pid);
                }
            }
        }

        let code = self.run_execute_hook(pid);

        let upstream_dead = stdin
            .is_some_and(|up| self.core(up).is_none_or(|c| c.state == ProcessState::Terminated));
        if upstream_dead {
            self.eof(pid);
        }
        if let Some(code) = code {
            self.exit(pid, code);
        }
    }

    /// Deliver a payload iff the target is RUNNING with input enabled.
    /// Returns `false` when the target cannot (or will no longer)
    /// accept writes, letting the producer stop.
    pub fn write(&mut self, dst: Pid, payload: Output) -> bool {
        let eligible = self
            .core(dst)
            .is_some_and(|c| c.is_running() && c.input_enabled);
        if !eligible {
            return false;
        }
        match self.dispatch(dst, Op::Write(payload)) {
            Outcome::Keep(keep) => keep,
            // Queued behind the target's running hook; the producer
            // learns about a shutoff on its next write.
            Outcome::Deferred => true,
            _ => false,
        }
    }

    /// Write to `pid`'s stdout, if wired.
    pub fn write_out(&mut self, pid: Pid, payload: Output) -> bool {
        match self.core(pid).and_then(|c| c.stdout) {
            Some(dst) => self.write(dst, payload),
            None => false,
        }
    }

    /// Write to `pid`'s stderr, if wired.
    pub fn write_err(&mut self, pid: Pid, payload: Output) -> bool {
        match self.core(pid).and_then(|c| c.stderr) {
            Some(dst) => self.write(dst, payload),
            None => false,
        }
    }

    /// At-most-once end-of-input.
    pub fn eof(&mut self, pid: Pid) {
        {
            let Some(core) = self.core_mut(pid) else { return };
            if !core.is_running() || core.input_ended {
                return;
            }
            core.input_ended = true;
        }
        self.dispatch(pid, Op::Eof);
    }

    pub fn interrupt(&mut self, pid: Pid) {
        if self.core(pid).is_some_and(|c| c.is_running()) {
            self.dispatch(pid, Op::Interrupt);
        }
    }

    /// Deliver a raw key event to a raw-input process.
    pub fn input(&mut self, pid: Pid, key: KeyEvent) {
        if self.core(pid).is_some_and(|c| c.is_running()) {
            self.dispatch(pid, Op::Input(key));
        }
    }

    /// Route an async completion to its process. Terminated targets
    /// swallow the result.
    pub fn complete(&mut self, pid: Pid, token: Token, result: Completion) {
        if self.core(pid).is_some_and(|c| c.is_running()) {
            self.dispatch(pid, Op::Complete { token, result });
        }
    }

    /// RUNNING → TERMINATED, at most once. Children are exited first
    /// (depth-first), EOF cascades downstream, the parent reclaims the
    /// foreground once the whole job has returned, and the job's table
    /// entries are reaped after the parent is notified.
    pub fn exit(&mut self, pid: Pid, code: i32) {
        let owns_overlay = {
            let Some(core) = self.core_mut(pid) else { return };
            if !core.is_running() {
                return;
            }
            core.state = ProcessState::Terminated;
            core.input_enabled = false;
            core.exit_code = Some(code);
            core.owns_overlay
        };
        trace!(pid, code, "process exit");
        if owns_overlay {
            self.display.overlay = None;
        }

        let children = self.core(pid).map(|c| c.children.clone()).unwrap_or_default();
        for child in children {
            self.exit(child, codes::SUCCESS);
        }

        let Some((stdout, stderr, job, parent)) = self
            .core(pid)
            .map(|core| (core.stdout, core.stderr, core.job.clone(), core.parent))
        else {
            return;
        };
        if let Some(out) = stdout {
            self.eof(out);
        }
        if let Some(err) = stderr {
            self.eof(err);
        }

        let returned = job
            .iter()
            .all(|m| self.core(*m).is_none_or(|c| c.state == ProcessState::Terminated));

        if returned {
            let fg = self.foreground();
            if job.contains(&fg) {
                let new_fg = parent
                    .filter(|p| self.core(*p).is_some_and(|c| c.is_running()))
                    .unwrap_or(self.tty);
                if let Some(tty_core) = self.core_mut(self.tty) {
                    tty_core.stdout = Some(new_fg);
                }
            }
        }

        if let Some(parent) = parent {
            let notify = {
                if let Some(parent_core) = self.core_mut(parent) {
                    parent_core.children.retain(|c| *c != pid);
                    parent_core.is_running()
                } else {
                    false
                }
            };
            if notify {
                self.dispatch(parent, Op::Return { child: pid, code });
            }
        }

        if returned {
            for member in job {
                self.table.remove(&member);
            }
        }
    }

    // --- keyboard entry points ---

    /// Hand a key event to the controlling terminal.
    pub fn deliver_key(&mut self, key: KeyEvent) {
        if self.session_end.is_some() {
            return;
        }
        let tty = self.tty;
        self.dispatch(tty, Op::Input(key));
    }

    /// Type a full line followed by Enter, through the regular line
    /// discipline.
    pub fn type_line(&mut self, line: &str) {
        for ch in line.chars() {
            self.deliver_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
        self.deliver_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    }

    /// Append a pre-rendered line to the output pane, bypassing stream
    /// delivery. Used by the terminal for echo and epitaph lines.
    pub fn echo_line(&mut self, line: Line<'static>) {
        self.display.push_line(line);
    }

    // --- dispatch ---

    fn run_execute_hook(&mut self, pid: Pid) -> Option<i32> {
        let Some(entry) = self.table.get_mut(&pid) else {
            return None;
        };
        let Some(mut program) = entry.program.take() else {
            return None;
        };
        let code = program.on_execute(self, pid);
        self.restore_program(pid, program);
        code
    }

    fn dispatch(&mut self, pid: Pid, op: Op) -> Outcome {
        let Some(entry) = self.table.get_mut(&pid) else {
            return Outcome::NotRun;
        };
        let Some(mut program) = entry.program.take() else {
            entry.mailbox.push_back(op);
            return Outcome::Deferred;
        };
        let outcome = self.run_op(program.as_mut(), pid, op);
        self.restore_program(pid, program);
        outcome
    }

    /// Put a program back in its slot and drain whatever queued up
    /// behind it. A reaped entry just drops the program.
    fn restore_program(&mut self, pid: Pid, mut program: Box<dyn Program>) {
        loop {
            let Some(entry) = self.table.get_mut(&pid) else {
                return;
            };
            let Some(op) = entry.mailbox.pop_front() else {
                entry.program = Some(program);
                return;
            };
            self.run_op(program.as_mut(), pid, op);
        }
    }

    fn run_op(&mut self, program: &mut dyn Program, pid: Pid, op: Op) -> Outcome {
        // Deferred ops may outlive their target's eligibility; re-check.
        let (running, input_enabled) = match self.core(pid) {
            Some(core) => (core.is_running(), core.input_enabled),
            None => return Outcome::NotRun,
        };
        if !running {
            return Outcome::NotRun;
        }
        match op {
            Op::Write(payload) => {
                if !input_enabled {
                    return Outcome::NotRun;
                }
                let keep = program.on_write(self, pid, payload);
                if !keep {
                    if let Some(core) = self.core_mut(pid) {
                        core.input_enabled = false;
                    }
                }
                Outcome::Keep(keep)
            }
            Op::Input(key) => {
                program.on_input(self, pid, key);
                Outcome::Unit
            }
            Op::Eof => {
                program.on_eof(self, pid);
                Outcome::Unit
            }
            Op::Interrupt => {
                program.on_interrupt(self, pid);
                Outcome::Unit
            }
            Op::Return { child, code } => {
                program.on_return(self, pid, child, code);
                Outcome::Unit
            }
            Op::Complete { token, result } => {
                program.on_completion(self, pid, token, result);
                Outcome::Unit
            }
        }
    }
}
