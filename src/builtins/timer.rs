//! `sleep`: an abortable timer.

use crate::kernel::{codes, default_interrupt, Kernel, Pid, Program};
use crate::output::Output;
use crate::services::{Completion, TaskHandle, Token};

#[derive(Default)]
pub struct Sleep {
    handle: Option<TaskHandle>,
    token: Token,
}

impl Program for Sleep {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        let raw = k.core(pid).and_then(|c| c.args.first().cloned());
        let Some(raw) = raw else {
            k.write_err(pid, Output::text("sleep: missing operand"));
            return Some(codes::FAILURE);
        };
        let Ok(seconds) = raw.parse::<f64>() else {
            k.write_err(pid, Output::text(format!("sleep: invalid time interval: {raw}")));
            return Some(codes::FAILURE);
        };
        let ms = (seconds.max(0.0) * 1000.0) as u64;
        self.token = k.services.next_token();
        match k.services.timeout(pid, self.token, ms) {
            Some(handle) => {
                self.handle = Some(handle);
                None
            }
            None => {
                k.write_err(pid, Output::text("sleep: timers unavailable"));
                Some(codes::FAILURE)
            }
        }
    }

    fn on_completion(&mut self, k: &mut Kernel, pid: Pid, token: Token, result: Completion) {
        if token == self.token && matches!(result, Completion::Timer) {
            self.handle = None;
            k.exit(pid, codes::SUCCESS);
        }
    }

    fn on_interrupt(&mut self, k: &mut Kernel, pid: Pid) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        default_interrupt(k, pid);
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
