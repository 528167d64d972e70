//! Adapter processes: just enough `Program` to wrap a closure, so that
//! simple built-ins and special forms stay one-liners at their call
//! sites.

use crate::output::Output;

use super::{default_eof, Kernel, Pid, Program};

type WriteFn = Box<dyn FnMut(&mut Kernel, Pid, Output) -> bool>;
type EofFn = Box<dyn FnMut(&mut Kernel, Pid)>;
type CallFn = Box<dyn FnOnce(&mut Kernel, Pid)>;

/// Input-enabled process invoking a callback on each write.
pub struct Monitor {
    on_payload: WriteFn,
    on_end: Option<EofFn>,
}

impl Monitor {
    pub fn new(on_payload: impl FnMut(&mut Kernel, Pid, Output) -> bool + 'static) -> Self {
        Monitor {
            on_payload: Box::new(on_payload),
            on_end: None,
        }
    }

    pub fn with_eof(
        on_payload: impl FnMut(&mut Kernel, Pid, Output) -> bool + 'static,
        on_end: impl FnMut(&mut Kernel, Pid) + 'static,
    ) -> Self {
        Monitor {
            on_payload: Box::new(on_payload),
            on_end: Some(Box::new(on_end)),
        }
    }
}

impl Program for Monitor {
    fn on_write(&mut self, k: &mut Kernel, pid: Pid, payload: Output) -> bool {
        (self.on_payload)(k, pid, payload)
    }

    fn on_eof(&mut self, k: &mut Kernel, pid: Pid) {
        match self.on_end.as_mut() {
            Some(f) => f(k, pid),
            None => default_eof(k, pid),
        }
    }
}

/// Emits a fixed payload and exits 0.
pub struct Printer {
    payload: Option<Output>,
}

impl Printer {
    pub fn new(payload: Output) -> Self {
        Printer {
            payload: Some(payload),
        }
    }
}

impl Program for Printer {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        if let Some(payload) = self.payload.take() {
            k.write_out(pid, payload);
        }
        Some(0)
    }
}

/// Runs a one-shot effect and exits 0. The effect may itself exit the
/// process (or a parent) with a different code first.
pub struct Caller {
    action: Option<CallFn>,
}

impl Caller {
    pub fn new(action: impl FnOnce(&mut Kernel, Pid) + 'static) -> Self {
        Caller {
            action: Some(Box::new(action)),
        }
    }
}

impl Program for Caller {
    fn on_execute(&mut self, k: &mut Kernel, pid: Pid) -> Option<i32> {
        if let Some(action) = self.action.take() {
            action(k, pid);
        }
        Some(0)
    }
}
