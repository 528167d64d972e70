//! Kernel-level lifecycle invariants: at-most-once execute/exit/EOF,
//! write gating, environment snapshots, interrupt defaults.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use seashell::kernel::{Kernel, Pid, ProcessState, Program};
use seashell::output::Output;
use seashell::services::{Services, Storage};

type Log = Arc<Mutex<Vec<String>>>;

/// Records every hook invocation without reacting to any of them.
struct Recorder {
    log: Log,
}

impl Recorder {
    fn spawn(k: &mut Kernel, name: &str, parent: Option<Pid>) -> (Pid, Log) {
        let log: Log = Arc::default();
        let pid = k.spawn(
            name,
            parent,
            Box::new(Recorder {
                log: Arc::clone(&log),
            }),
        );
        (pid, log)
    }
}

impl Program for Recorder {
    fn on_execute(&mut self, _k: &mut Kernel, _pid: Pid) -> Option<i32> {
        self.log.lock().unwrap().push("execute".into());
        None
    }

    fn on_write(&mut self, _k: &mut Kernel, _pid: Pid, payload: Output) -> bool {
        self.log.lock().unwrap().push(format!("write:{}", payload.str()));
        true
    }

    fn on_eof(&mut self, _k: &mut Kernel, _pid: Pid) {
        self.log.lock().unwrap().push("eof".into());
    }

    fn on_interrupt(&mut self, _k: &mut Kernel, _pid: Pid) {
        self.log.lock().unwrap().push("interrupt".into());
    }

    fn on_return(&mut self, _k: &mut Kernel, _pid: Pid, child: Pid, code: i32) {
        self.log.lock().unwrap().push(format!("return:{child}:{code}"));
    }
}

/// All-defaults program, for exercising the default hook behavior.
struct Defaulted;

impl Program for Defaulted {}

// These tests never pump completions, so the channel receiver is
// dropped immediately; the services layer tolerates that.
fn kernel() -> Kernel {
    let (tx, _rx) = mpsc::channel();
    Kernel::new(Services::new(Storage::in_memory(), tx, None), 100)
}

#[test]
fn execute_is_effective_at_most_once() {
    let mut k = kernel();
    let (pid, log) = Recorder::spawn(&mut k, "p", None);
    k.execute(pid, vec!["first".into()]);
    k.execute(pid, vec!["second".into()]);

    assert_eq!(log.lock().unwrap().as_slice(), ["execute"]);
    assert_eq!(k.core(pid).unwrap().args, vec!["first"]);
    assert_eq!(k.core(pid).unwrap().state, ProcessState::Running);
}

#[test]
fn exit_is_effective_at_most_once() {
    let mut k = kernel();
    let (parent, log) = Recorder::spawn(&mut k, "parent", None);
    k.execute(parent, vec![]);
    let (child, _) = Recorder::spawn(&mut k, "child", Some(parent));
    k.execute(child, vec![]);

    k.exit(child, 7);
    k.exit(child, 9);

    // One return notification, with the first code.
    let events = log.lock().unwrap();
    assert_eq!(
        events.iter().filter(|e| e.starts_with("return:")).count(),
        1
    );
    assert!(events.contains(&format!("return:{child}:7")));
}

#[test]
fn eof_is_delivered_at_most_once() {
    let mut k = kernel();
    let (pid, log) = Recorder::spawn(&mut k, "p", None);
    k.execute(pid, vec![]);
    k.eof(pid);
    k.eof(pid);
    assert_eq!(
        log.lock().unwrap().iter().filter(|e| *e == "eof").count(),
        1
    );
}

#[test]
fn writes_require_running_and_enabled() {
    let mut k = kernel();
    let (pid, log) = Recorder::spawn(&mut k, "p", None);

    // READY: dropped.
    assert!(!k.write(pid, Output::text("early")));

    k.execute(pid, vec![]);
    assert!(k.write(pid, Output::text("ok")));

    k.core_mut(pid).unwrap().input_enabled = false;
    assert!(!k.write(pid, Output::text("disabled")));

    k.core_mut(pid).unwrap().input_enabled = true;
    k.exit(pid, 0);
    assert!(!k.write(pid, Output::text("dead")));

    assert_eq!(log.lock().unwrap().as_slice(), ["execute", "write:ok"]);
}

#[test]
fn on_write_false_disables_further_input() {
    struct Refuser;
    impl Program for Refuser {
        fn on_write(&mut self, _k: &mut Kernel, _pid: Pid, _payload: Output) -> bool {
            false
        }
    }

    let mut k = kernel();
    let pid = k.spawn("refuser", None, Box::new(Refuser));
    k.execute(pid, vec![]);

    assert!(!k.write(pid, Output::text("one")));
    assert!(!k.core(pid).unwrap().input_enabled);
    assert!(!k.write(pid, Output::text("two")));
}

#[test]
fn child_variables_are_a_snapshot() {
    let mut k = kernel();
    let (parent, _) = Recorder::spawn(&mut k, "parent", None);
    k.core_mut(parent)
        .unwrap()
        .variables
        .insert("X".into(), "1".into());
    k.execute(parent, vec![]);

    let (child, _) = Recorder::spawn(&mut k, "child", Some(parent));
    assert_eq!(k.core(child).unwrap().variables.get("X").unwrap(), "1");

    // Child mutations never propagate upward.
    k.core_mut(child)
        .unwrap()
        .variables
        .insert("X".into(), "2".into());
    assert_eq!(k.core(parent).unwrap().variables.get("X").unwrap(), "1");

    // Parent mutations after the snapshot are invisible to the child.
    k.core_mut(parent)
        .unwrap()
        .variables
        .insert("Y".into(), "3".into());
    assert!(!k.core(child).unwrap().variables.contains_key("Y"));
}

#[test]
fn default_interrupt_bubbles_and_exits_130() {
    let mut k = kernel();
    let (parent, log) = Recorder::spawn(&mut k, "parent", None);
    k.execute(parent, vec![]);
    let child = k.spawn("child", Some(parent), Box::new(Defaulted));
    k.execute(child, vec![]);

    k.interrupt(child);

    let events = log.lock().unwrap();
    assert!(events.contains(&"interrupt".to_string()));
    assert!(events.contains(&format!("return:{child}:130")));
}

#[test]
fn default_eof_exits_zero() {
    let mut k = kernel();
    let (parent, log) = Recorder::spawn(&mut k, "parent", None);
    k.execute(parent, vec![]);
    let child = k.spawn("child", Some(parent), Box::new(Defaulted));
    k.execute(child, vec![]);

    k.eof(child);
    assert!(log.lock().unwrap().contains(&format!("return:{child}:0")));
}

#[test]
fn execute_delivers_eof_when_upstream_already_terminated() {
    let mut k = kernel();
    let (upstream, _) = Recorder::spawn(&mut k, "up", None);
    k.execute(upstream, vec![]);
    k.exit(upstream, 0);

    let (pid, log) = Recorder::spawn(&mut k, "down", None);
    k.core_mut(pid).unwrap().stdin = Some(upstream);
    k.execute(pid, vec![]);

    let events = log.lock().unwrap();
    assert_eq!(events.as_slice(), ["execute", "eof"]);
}

#[test]
fn exit_cascades_to_children_depth_first() {
    let mut k = kernel();
    let (root, _) = Recorder::spawn(&mut k, "root", None);
    k.execute(root, vec![]);
    let (mid, _) = Recorder::spawn(&mut k, "mid", Some(root));
    k.execute(mid, vec![]);
    let (leaf, _) = Recorder::spawn(&mut k, "leaf", Some(mid));
    k.execute(leaf, vec![]);

    k.exit(root, 0);

    // The whole tree is gone (each single-process job reaps itself).
    assert!(k.core(root).is_none());
    assert!(k.core(mid).is_none());
    assert!(k.core(leaf).is_none());
}

#[test]
fn execute_hook_code_exits_immediately() {
    struct OneShot;
    impl Program for OneShot {
        fn on_execute(&mut self, _k: &mut Kernel, _pid: Pid) -> Option<i32> {
            Some(42)
        }
    }

    let mut k = kernel();
    let (parent, log) = Recorder::spawn(&mut k, "parent", None);
    k.execute(parent, vec![]);
    let child = k.spawn("child", Some(parent), Box::new(OneShot));
    k.execute(child, vec![]);

    assert!(log.lock().unwrap().contains(&format!("return:{child}:42")));
}

#[test]
fn exit_delivers_eof_downstream() {
    let mut k = kernel();
    let (down, log) = Recorder::spawn(&mut k, "down", None);
    k.execute(down, vec![]);
    let (up, _) = Recorder::spawn(&mut k, "up", None);
    k.core_mut(up).unwrap().stdout = Some(down);
    k.execute(up, vec![]);

    k.exit(up, 0);
    assert!(log.lock().unwrap().contains(&"eof".to_string()));
}
