//! File utilities over the flat store: cat, ls, mv, rm, tee.

use std::collections::VecDeque;

use crate::kernel::{codes, default_eof, Kernel, Pid, Program};
use crate::output::Output;
use crate::services::{Completion, StorageReply, Token};

/// Concatenate files, or pass the stream through when run bare.
#[derive(Default)]
pub struct Cat {
    pending: VecDeque<String>,
    streaming: bool,
    token: Token,
    failed: bool,
}

impl Cat {
    fn request_next(&mut self, k: &mut Kernel, pid: Pid) {
        match self.pending.pop_front() {
            Some(path) => {
                self.token = k.services.next_token();
                k.services.storage_read(pid, self.token, &path);
            }
            None => {
                let code = if self.failed { codes::FAILURE } else { codes::SUCCESS };
                k.exit(pid, code);
            }
        }
    }
}

impl Program for Cat {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        let args = k.core(pid).map(|c| c.args.clone()).unwrap_or_default();
        if args.is_empty() {
            self.streaming = true;
            return None;
        }
        self.pending = args.into_iter().collect();
        self.request_next(k, pid);
        None
    }

    fn on_write(&mut self, k: &mut Kernel, pid: Pid, payload: Output) -> bool {
        if self.streaming {
            k.write_out(pid, payload);
        }
        true
    }

    fn on_eof(&mut self, k: &mut Kernel, pid: Pid) {
        // In file mode, upstream EOF is irrelevant; reads drive the exit.
        if self.streaming {
            default_eof(k, pid);
        }
    }

    fn on_completion(&mut self, k: &mut Kernel, pid: Pid, token: Token, result: Completion) {
        if token != self.token {
            return;
        }
        match result {
            Completion::Storage(Ok(StorageReply::Content(content))) => {
                k.write_out(pid, Output::text(content));
            }
            Completion::Storage(Err(err)) => {
                k.write_err(pid, Output::text(format!("cat: {err}")));
                self.failed = true;
            }
            _ => {}
        }
        self.request_next(k, pid);
    }
}

/// List every key in the store as a multicolumn array.
#[derive(Default)]
pub struct Ls {
    token: Token,
}

impl Program for Ls {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        self.token = k.services.next_token();
        k.services.storage_list(pid, self.token);
        None
    }

    fn on_completion(&mut self, k: &mut Kernel, pid: Pid, token: Token, result: Completion) {
        if token != self.token {
            return;
        }
        if let Completion::Storage(Ok(StorageReply::Listing(keys))) = result {
            if !keys.is_empty() {
                let items = keys.into_iter().map(Output::text).collect();
                k.write_out(pid, Output::columns(items));
            }
            k.exit(pid, codes::SUCCESS);
        }
    }
}

#[derive(Default)]
pub struct Mv {
    token: Token,
}

impl Program for Mv {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        let args = k.core(pid).map(|c| c.args.clone()).unwrap_or_default();
        let [path, target] = args.as_slice() else {
            k.write_err(pid, Output::text("mv: missing operand"));
            return Some(codes::FAILURE);
        };
        self.token = k.services.next_token();
        k.services.storage_rename(pid, self.token, path, target);
        None
    }

    fn on_completion(&mut self, k: &mut Kernel, pid: Pid, token: Token, result: Completion) {
        if token != self.token {
            return;
        }
        match result {
            Completion::Storage(Ok(_)) => k.exit(pid, codes::SUCCESS),
            Completion::Storage(Err(err)) => {
                k.write_err(pid, Output::text(format!("mv: {err}")));
                k.exit(pid, codes::FAILURE);
            }
            _ => {}
        }
    }
}

/// Remove keys; removal of an absent key is not an error.
#[derive(Default)]
pub struct Rm {
    pending: VecDeque<String>,
    token: Token,
}

impl Rm {
    fn request_next(&mut self, k: &mut Kernel, pid: Pid) {
        match self.pending.pop_front() {
            Some(path) => {
                self.token = k.services.next_token();
                k.services.storage_remove(pid, self.token, &path);
            }
            None => k.exit(pid, codes::SUCCESS),
        }
    }
}

impl Program for Rm {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        let args = k.core(pid).map(|c| c.args.clone()).unwrap_or_default();
        if args.is_empty() {
            k.write_err(pid, Output::text("rm: missing operand"));
            return Some(codes::FAILURE);
        }
        self.pending = args.into_iter().collect();
        self.request_next(k, pid);
        None
    }

    fn on_completion(&mut self, k: &mut Kernel, pid: Pid, token: Token, _result: Completion) {
        if token == self.token {
            self.request_next(k, pid);
        }
    }
}

/// Copy the stream to a file and to stdout.
#[derive(Default)]
pub struct Tee {
    path: Option<String>,
    collected: Vec<String>,
    token: Token,
}

impl Program for Tee {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        let path = k.core(pid).and_then(|c| c.args.first().cloned());
        let Some(path) = path else {
            k.write_err(pid, Output::text("tee: missing operand"));
            return Some(codes::FAILURE);
        };
        self.path = Some(path);
        None
    }

    fn on_write(&mut self, k: &mut Kernel, pid: Pid, payload: Output) -> bool {
        self.collected.push(payload.str());
        k.write_out(pid, payload);
        true
    }

    fn on_eof(&mut self, k: &mut Kernel, pid: Pid) {
        let Some(path) = self.path.clone() else {
            k.exit(pid, codes::FAILURE);
            return;
        };
        self.token = k.services.next_token();
        let content = self.collected.join("\n");
        k.services.storage_write(pid, self.token, &path, &content);
    }

    fn on_completion(&mut self, k: &mut Kernel, pid: Pid, token: Token, _result: Completion) {
        if token == self.token {
            k.exit(pid, codes::SUCCESS);
        }
    }
}
