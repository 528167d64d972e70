//! Special forms: commands that share the shell's environment instead of
//! running as regular built-ins. Each is an adapter process wired to
//! reach back into its parent's variable map.

use crate::kernel::adapters::{Caller, Monitor, Printer};
use crate::kernel::{codes, Kernel, Pid, Program};
use crate::output::Output;

/// Build a special-form process. `shell` is the owning shell, whose
/// history and variables these forms observe and mutate.
pub fn build(k: &Kernel, shell: Pid, name: &str) -> Option<Box<dyn Program>> {
    match name {
        "history" => {
            let joined = k
                .core(shell)
                .map(|c| c.history.join("\n"))
                .unwrap_or_default();
            Some(Box::new(Printer::new(Output::text(joined))))
        }
        "read" => Some(Box::new(Monitor::new(|k, pid, payload| {
            match k.core(pid).and_then(|c| c.args.first().cloned()) {
                Some(name) => {
                    let value = payload.str();
                    assign_in_parent(k, pid, &name, &value);
                    k.exit(pid, codes::SUCCESS);
                }
                None => {
                    k.write_err(pid, Output::text("read: missing operand"));
                    k.exit(pid, codes::FAILURE);
                }
            }
            false
        }))),
        "echo" => Some(Box::new(Caller::new(|k, pid| {
            let args = k.core(pid).map(|c| c.args.clone()).unwrap_or_default();
            k.write_out(pid, Output::text(args.join(" ")));
        }))),
        "set" => Some(Box::new(Caller::new(|k, pid| {
            let args = k.core(pid).map(|c| c.args.clone()).unwrap_or_default();
            let Some(name) = args.first().cloned() else {
                k.write_err(pid, Output::text("set: missing operand"));
                k.exit(pid, codes::FAILURE);
                return;
            };
            let value = args[1..].join(" ");
            assign_in_parent(k, pid, &name, &value);
        }))),
        "exit" => Some(Box::new(Caller::new(|k, pid| {
            let args = k.core(pid).map(|c| c.args.clone()).unwrap_or_default();
            let code = match args.first() {
                None => codes::SUCCESS,
                Some(raw) => match raw.parse::<i32>() {
                    Ok(code) => code,
                    Err(_) => {
                        k.write_err(
                            pid,
                            Output::text(format!("sh: exit: {raw}: numeric argument required")),
                        );
                        codes::USAGE
                    }
                },
            };
            if let Some(shell) = k.core(pid).and_then(|c| c.parent) {
                k.exit(shell, code);
            }
        }))),
        _ => None,
    }
}

fn assign_in_parent(k: &mut Kernel, pid: Pid, name: &str, value: &str) {
    let Some(parent) = k.core(pid).and_then(|c| c.parent) else {
        return;
    };
    if let Some(parent_core) = k.core_mut(parent) {
        parent_core
            .variables
            .insert(name.to_string(), value.to_string());
    }
}
