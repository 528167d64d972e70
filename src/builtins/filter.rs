//! Stream filters: head, tail, grep. All three decompose incoming
//! payloads with `items()` and re-emit arrays of whole items.

use std::collections::VecDeque;

use regex::Regex;

use crate::kernel::{codes, Kernel, Pid, Program};
use crate::output::Output;

const DEFAULT_COUNT: usize = 10;

fn parse_count(k: &mut Kernel, pid: Pid, name: &str) -> Result<usize, i32> {
    let arg = k.core(pid).and_then(|c| c.args.first().cloned());
    match arg {
        None => Ok(DEFAULT_COUNT),
        Some(raw) => raw.parse().map_err(|_| {
            k.write_err(pid, Output::text(format!("{name}: invalid count: {raw}")));
            codes::FAILURE
        }),
    }
}

/// Emit the first N items across however many writes they arrive in,
/// then exit — the upstream observes the cutoff on its next write.
#[derive(Default)]
pub struct Head {
    limit: usize,
    taken: Vec<Output>,
}

impl Program for Head {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        match parse_count(k, pid, "head") {
            Ok(0) => Some(codes::SUCCESS),
            Ok(limit) => {
                self.limit = limit;
                None
            }
            Err(code) => Some(code),
        }
    }

    fn on_write(&mut self, k: &mut Kernel, pid: Pid, payload: Output) -> bool {
        for item in payload.items() {
            self.taken.push(item);
            if self.taken.len() == self.limit {
                let collected = std::mem::take(&mut self.taken);
                k.write_out(pid, Output::rows(collected));
                k.exit(pid, codes::SUCCESS);
                return false;
            }
        }
        true
    }

    fn on_eof(&mut self, k: &mut Kernel, pid: Pid) {
        if !self.taken.is_empty() {
            let collected = std::mem::take(&mut self.taken);
            k.write_out(pid, Output::rows(collected));
        }
        k.exit(pid, codes::SUCCESS);
    }
}

/// Ring buffer of the last N items, flushed as a single array on EOF.
#[derive(Default)]
pub struct Tail {
    limit: usize,
    ring: VecDeque<Output>,
}

impl Program for Tail {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        match parse_count(k, pid, "tail") {
            Ok(limit) => {
                self.limit = limit;
                None
            }
            Err(code) => Some(code),
        }
    }

    fn on_write(&mut self, _k: &mut Kernel, _pid: Pid, payload: Output) -> bool {
        for item in payload.items() {
            self.ring.push_back(item);
            if self.ring.len() > self.limit {
                self.ring.pop_front();
            }
        }
        true
    }

    fn on_eof(&mut self, k: &mut Kernel, pid: Pid) {
        if !self.ring.is_empty() {
            let items = std::mem::take(&mut self.ring).into_iter().collect();
            k.write_out(pid, Output::rows(items));
        }
        k.exit(pid, codes::SUCCESS);
    }
}

/// Keep items whose string form matches the pattern. Exits 1 when
/// nothing matched, like its namesake.
#[derive(Default)]
pub struct Grep {
    pattern: Option<Regex>,
    matched: bool,
}

impl Program for Grep {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        let raw = k.core(pid).and_then(|c| c.args.first().cloned());
        let Some(raw) = raw else {
            k.write_err(pid, Output::text("grep: missing operand"));
            return Some(codes::FAILURE);
        };
        match Regex::new(&raw) {
            Ok(pattern) => {
                self.pattern = Some(pattern);
                None
            }
            Err(_) => {
                k.write_err(pid, Output::text(format!("grep: invalid pattern: {raw}")));
                Some(codes::FAILURE)
            }
        }
    }

    fn on_write(&mut self, k: &mut Kernel, pid: Pid, payload: Output) -> bool {
        let Some(pattern) = &self.pattern else {
            return false;
        };
        let hits: Vec<Output> = payload
            .items()
            .into_iter()
            .filter(|item| pattern.is_match(&item.str()))
            .collect();
        if !hits.is_empty() {
            self.matched = true;
            k.write_out(pid, Output::rows(hits));
        }
        true
    }

    fn on_eof(&mut self, k: &mut Kernel, pid: Pid) {
        let code = if self.matched { codes::SUCCESS } else { codes::FAILURE };
        k.exit(pid, code);
    }
}
