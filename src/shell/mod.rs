//! The shell: line parser, job queue, and pipeline scheduler.
//!
//! One job runs at a time. Stages are spawned with the shell as parent,
//! wired stdin→stdout along the pipe, and launched right to left so
//! every producer already has a running consumer. Completion flows back
//! through `on_return`; the last stage's code becomes `$?` and the
//! prompt color.

pub mod parser;
pub mod special;

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::builtins;
use crate::config::Config;
use crate::kernel::{codes, Kernel, Pid, ProcessState, Program};
use crate::output::Output;
use crate::services::{Completion, StorageReply, Token};
use crate::ui::theme;

use parser::{parse_commands, ParsedJob};

const DEFAULT_HIST_SIZE: usize = 100;

/// What a pending storage completion means to the shell.
enum Wait {
    Profile,
    Script,
    HistLoad,
    HistWrite,
}

pub struct Shell {
    interactive: bool,
    profile: String,
    greeting: String,
    queue: VecDeque<ParsedJob>,
    current_job: Vec<Pid>,
    job_running: bool,
    last_code: i32,
    stdin_ended: bool,
    script: bool,
    script_loaded: bool,
    hist_loaded: bool,
    hist_inflight: bool,
    hist_dirty: bool,
    waiting: HashMap<Token, Wait>,
}

impl Shell {
    pub fn new(config: &Config, interactive: bool) -> Self {
        Shell {
            interactive,
            profile: config.shell.profile.clone(),
            greeting: config.terminal.greeting.clone(),
            queue: VecDeque::new(),
            current_job: Vec::new(),
            job_running: false,
            last_code: 0,
            stdin_ended: false,
            script: false,
            script_loaded: false,
            hist_loaded: false,
            hist_inflight: false,
            hist_dirty: false,
            waiting: HashMap::new(),
        }
    }

    /// Parse a command buffer into the job queue, reporting bad lines
    /// without dropping the good ones.
    fn ingest(&mut self, k: &mut Kernel, pid: Pid, text: &str) {
        for parsed in parse_commands(text) {
            match parsed {
                Ok(job) => self.queue.push_back(job),
                Err(err) => {
                    k.write_err(pid, Output::text(format!("sh: {err}")));
                    self.set_code(k, pid, codes::FAILURE);
                }
            }
        }
    }

    /// Launch the next runnable job, or settle the queue: exit when the
    /// input source is exhausted, otherwise fall back to the prompt.
    fn pump(&mut self, k: &mut Kernel, pid: Pid) {
        if self.job_running {
            return;
        }
        while let Some(job) = self.queue.pop_front() {
            if self.launch(k, pid, job) {
                self.job_running = true;
                return;
            }
        }
        let script_done = self.script && self.script_loaded;
        if script_done || self.stdin_ended {
            let code = self.last_code;
            k.exit(pid, code);
        }
    }

    fn launch(&mut self, k: &mut Kernel, shell: Pid, job: ParsedJob) -> bool {
        let vars = k.core(shell).map(|c| c.variables.clone()).unwrap_or_default();
        let stages: Vec<Vec<String>> = job
            .stages
            .iter()
            .map(|tokens| tokens.iter().map(|t| resolve_token(t, &vars)).collect())
            .collect();

        let mut programs = Vec::new();
        for stage in &stages {
            let name = stage[0].clone();
            let program = special::build(k, shell, &name).or_else(|| builtins::build(&name));
            let Some(program) = program else {
                k.write_err(shell, Output::text(format!("sh: command not found: {name}")));
                self.set_code(k, shell, codes::NOT_FOUND);
                return false;
            };
            programs.push((name, program));
        }

        let (sin, sout, serr) = k
            .core(shell)
            .map(|c| (c.stdin, c.stdout, c.stderr))
            .unwrap_or((None, None, None));

        let pids: Vec<Pid> = programs
            .into_iter()
            .map(|(name, program)| k.spawn(&name, Some(shell), program))
            .collect();
        for (i, pid) in pids.iter().enumerate() {
            if let Some(core) = k.core_mut(*pid) {
                core.stdin = if i == 0 { sin } else { Some(pids[i - 1]) };
                core.stdout = if i + 1 == pids.len() {
                    sout
                } else {
                    Some(pids[i + 1])
                };
                core.stderr = serr;
                core.job = pids.clone();
            }
        }
        self.current_job = pids.clone();
        debug!(job = ?stages.iter().map(|s| s[0].as_str()).collect::<Vec<_>>(), "launching job");

        // Right to left: every downstream stage is already receiving by
        // the time its producer starts.
        for i in (0..pids.len()).rev() {
            k.execute(pids[i], stages[i][1..].to_vec());
        }
        true
    }

    fn set_code(&mut self, k: &mut Kernel, shell: Pid, code: i32) {
        self.last_code = code;
        if let Some(core) = k.core_mut(shell) {
            core.variables.insert("?".to_string(), code.to_string());
            core.prompt = Some(prompt(code != 0));
        }
    }

    /// Lazily merge `HIST_FILE` into memory on the first accepted line,
    /// then keep the file trailing the last `HIST_SIZE` entries with at
    /// most one write in flight.
    fn persist_history(&mut self, k: &mut Kernel, pid: Pid) {
        let file = k
            .core(pid)
            .and_then(|c| c.variables.get("HIST_FILE").cloned());
        let Some(file) = file else { return };
        if !self.hist_loaded {
            self.hist_loaded = true;
            self.hist_dirty = true;
            let token = k.services.next_token();
            self.waiting.insert(token, Wait::HistLoad);
            k.services.storage_read(pid, token, &file);
            return;
        }
        self.schedule_hist_write(k, pid);
    }

    fn schedule_hist_write(&mut self, k: &mut Kernel, pid: Pid) {
        if self.hist_inflight {
            self.hist_dirty = true;
            return;
        }
        let Some((file, tail)) = k.core(pid).and_then(|core| {
            let file = core.variables.get("HIST_FILE")?.clone();
            let size = core
                .variables
                .get("HIST_SIZE")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_HIST_SIZE);
            let start = core.history.len().saturating_sub(size);
            Some((file, core.history[start..].join("\n")))
        }) else {
            return;
        };
        self.hist_dirty = false;
        self.hist_inflight = true;
        let token = k.services.next_token();
        self.waiting.insert(token, Wait::HistWrite);
        k.services.storage_write(pid, token, &file, &tail);
    }
}

impl Program for Shell {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        if let Some(core) = k.core_mut(pid) {
            core.prompt = Some(prompt(false));
            core.exit_input = Some("exit".to_string());
            core.variables
                .entry("?".to_string())
                .or_insert_with(|| "0".to_string());
        }
        let script_path = k.core(pid).and_then(|c| c.args.first().cloned());
        if let Some(path) = script_path {
            self.script = true;
            let token = k.services.next_token();
            self.waiting.insert(token, Wait::Script);
            k.services.storage_read(pid, token, &path);
        } else if self.interactive {
            let profile = self.profile.clone();
            let token = k.services.next_token();
            self.waiting.insert(token, Wait::Profile);
            k.services.storage_read(pid, token, &profile);
        }
        None
    }

    fn on_write(&mut self, k: &mut Kernel, pid: Pid, payload: Output) -> bool {
        let text = payload.str();
        self.ingest(k, pid, &text);
        self.persist_history(k, pid);
        self.pump(k, pid);
        true
    }

    fn on_return(&mut self, k: &mut Kernel, pid: Pid, child: Pid, code: i32) {
        if self.current_job.last() == Some(&child) {
            self.set_code(k, pid, code);
        }
        let returned = self
            .current_job
            .iter()
            .all(|m| k.core(*m).is_none_or(|c| c.state == ProcessState::Terminated));
        if returned && self.job_running {
            self.job_running = false;
            self.current_job.clear();
            self.pump(k, pid);
        }
    }

    fn on_eof(&mut self, k: &mut Kernel, pid: Pid) {
        self.stdin_ended = true;
        self.pump(k, pid);
    }

    /// Ctrl-C reaches the shell by bubbling up from an interrupted job;
    /// the shell drops what was queued and stays at the prompt.
    fn on_interrupt(&mut self, _k: &mut Kernel, _pid: Pid) {
        self.queue.clear();
    }

    fn on_completion(&mut self, k: &mut Kernel, pid: Pid, token: Token, result: Completion) {
        let Some(wait) = self.waiting.remove(&token) else {
            return;
        };
        match wait {
            Wait::Profile => match result {
                Completion::Storage(Ok(StorageReply::Content(text))) => {
                    self.ingest(k, pid, &text);
                    self.pump(k, pid);
                }
                _ => {
                    if !self.greeting.is_empty() {
                        let greeting = self.greeting.clone();
                        k.write_out(pid, Output::text(greeting));
                    }
                }
            },
            Wait::Script => {
                self.script_loaded = true;
                match result {
                    Completion::Storage(Ok(StorageReply::Content(text))) => {
                        self.ingest(k, pid, &text);
                    }
                    Completion::Storage(Err(err)) => {
                        k.write_err(pid, Output::text(format!("sh: {err}")));
                        self.set_code(k, pid, codes::FAILURE);
                    }
                    _ => {}
                }
                self.pump(k, pid);
            }
            Wait::HistLoad => {
                if let Completion::Storage(Ok(StorageReply::Content(text))) = result {
                    let lines: Vec<String> = text
                        .lines()
                        .filter(|l| !l.is_empty())
                        .map(str::to_string)
                        .collect();
                    if let Some(core) = k.core_mut(pid) {
                        core.history.splice(0..0, lines);
                        core.history_index = core.history.len();
                    }
                }
                if self.hist_dirty {
                    self.schedule_hist_write(k, pid);
                }
            }
            Wait::HistWrite => {
                self.hist_inflight = false;
                if let Completion::Storage(Err(err)) = result {
                    warn!(%err, "history write failed");
                }
                if self.hist_dirty {
                    self.schedule_hist_write(k, pid);
                }
            }
        }
    }
}

fn resolve_token(token: &str, vars: &HashMap<String, String>) -> String {
    match token.strip_prefix('$') {
        Some(name) if !name.is_empty() => vars.get(name).cloned().unwrap_or_default(),
        _ => token.to_string(),
    }
}

fn prompt(error: bool) -> Output {
    let style = if error {
        theme::prompt_error_style()
    } else {
        theme::prompt_style()
    };
    Output::styled("$ ", style)
}
