//! Session utilities: clear, ps.

use crate::kernel::{codes, Kernel, Pid, ProcessState, Program};
use crate::output::Output;

pub struct Clear;

impl Program for Clear {
    fn on_execute(&mut self, k: &mut Kernel, _pid: Pid) -> Option<i32> {
        k.display.clear();
        Some(codes::SUCCESS)
    }
}

pub struct Ps;

impl Program for Ps {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        let mut rows = vec![Output::text(format!("{:>5}  {:<12} {}", "PID", "STATE", "CMD"))];
        for (proc_pid, name, state) in k.processes() {
            let state = match state {
                ProcessState::Ready => "ready",
                ProcessState::Running => "running",
                ProcessState::Terminated => "terminated",
            };
            rows.push(Output::text(format!("{proc_pid:>5}  {state:<12} {name}")));
        }
        k.write_out(pid, Output::rows(rows));
        Some(codes::SUCCESS)
    }
}
