//! `curl`: one GET against the network facade, abortable on interrupt.

use crate::kernel::{codes, default_interrupt, Kernel, Pid, Program};
use crate::output::Output;
use crate::services::{Completion, TaskHandle, Token};

#[derive(Default)]
pub struct Curl {
    handle: Option<TaskHandle>,
    token: Token,
}

impl Program for Curl {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        let url = k.core(pid).and_then(|c| c.args.first().cloned());
        let Some(url) = url else {
            k.write_err(pid, Output::text("curl: missing operand"));
            return Some(codes::FAILURE);
        };
        self.token = k.services.next_token();
        match k.services.request(pid, self.token, "GET", &url, 0) {
            Some(handle) => {
                self.handle = Some(handle);
                None
            }
            None => {
                k.write_err(pid, Output::text("curl: network unavailable"));
                Some(codes::FAILURE)
            }
        }
    }

    fn on_completion(&mut self, k: &mut Kernel, pid: Pid, token: Token, result: Completion) {
        if token != self.token {
            return;
        }
        self.handle = None;
        if let Completion::Http(result) = result {
            match result {
                Ok(body) => {
                    k.write_out(pid, Output::text(body));
                    k.exit(pid, codes::SUCCESS);
                }
                Err(err) => {
                    k.write_err(pid, Output::text(format!("curl: {err}")));
                    k.exit(pid, codes::FAILURE);
                }
            }
        }
    }

    fn on_interrupt(&mut self, k: &mut Kernel, pid: Pid) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        default_interrupt(k, pid);
    }
}

impl Drop for Curl {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
