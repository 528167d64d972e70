//! Adapter processes at the kernel level, plus payload-exact filter
//! assertions that the pane view cannot make.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use seashell::builtins;
use seashell::kernel::adapters::{Caller, Monitor, Printer};
use seashell::kernel::{Kernel, Pid, Program};
use seashell::output::Output;
use seashell::services::{Services, Storage};

type Captured = Arc<Mutex<Vec<Output>>>;

/// Stays running forever, collecting everything written to it.
struct Capture {
    seen: Captured,
}

impl Capture {
    fn spawn(k: &mut Kernel) -> (Pid, Captured) {
        let seen: Captured = Arc::default();
        let pid = k.spawn(
            "capture",
            None,
            Box::new(Capture {
                seen: Arc::clone(&seen),
            }),
        );
        k.execute(pid, vec![]);
        (pid, seen)
    }
}

impl Program for Capture {
    fn on_write(&mut self, _k: &mut Kernel, _pid: Pid, payload: Output) -> bool {
        self.seen.lock().unwrap().push(payload);
        true
    }

    fn on_eof(&mut self, _k: &mut Kernel, _pid: Pid) {}
}

fn kernel() -> Kernel {
    let (tx, _rx) = mpsc::channel();
    Kernel::new(Services::new(Storage::in_memory(), tx, None), 100)
}

#[test]
fn printer_emits_once_and_returns_zero() {
    let mut k = kernel();
    let (out, seen) = Capture::spawn(&mut k);

    let printer = k.spawn("printer", None, Box::new(Printer::new(Output::text("hi"))));
    k.core_mut(printer).unwrap().stdout = Some(out);
    k.execute(printer, vec![]);

    assert_eq!(seen.lock().unwrap().as_slice(), [Output::text("hi")]);
    assert!(k.core(printer).is_none());
}

#[test]
fn caller_runs_its_effect_and_exits() {
    let mut k = kernel();
    let ran = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&ran);
    let caller = k.spawn(
        "caller",
        None,
        Box::new(Caller::new(move |_k, _pid| {
            *flag.lock().unwrap() = true;
        })),
    );
    k.execute(caller, vec![]);

    assert!(*ran.lock().unwrap());
    assert!(k.core(caller).is_none());
}

#[test]
fn monitor_sees_every_write_and_custom_eof() {
    let mut k = kernel();
    let writes: Captured = Arc::default();
    let seen = Arc::clone(&writes);
    let eof_hit = Arc::new(Mutex::new(false));
    let eof_flag = Arc::clone(&eof_hit);

    let monitor = k.spawn(
        "monitor",
        None,
        Box::new(Monitor::with_eof(
            move |_k, _pid, payload| {
                seen.lock().unwrap().push(payload);
                true
            },
            move |k, pid| {
                *eof_flag.lock().unwrap() = true;
                k.exit(pid, 7);
            },
        )),
    );
    k.execute(monitor, vec![]);

    k.write(monitor, Output::text("a"));
    k.write(monitor, Output::text("b"));
    k.eof(monitor);

    assert_eq!(writes.lock().unwrap().len(), 2);
    assert!(*eof_hit.lock().unwrap());
    assert!(k.core(monitor).is_none());
}

#[test]
fn tail_flushes_exactly_one_array() {
    let mut k = kernel();
    let (out, seen) = Capture::spawn(&mut k);

    let tail = k.spawn("tail", None, builtins::build("tail").unwrap());
    k.core_mut(tail).unwrap().stdout = Some(out);
    k.execute(tail, vec!["3".into()]);

    for n in 1..=5 {
        k.write(tail, Output::text(n.to_string()));
    }
    k.eof(tail);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "tail must emit a single payload");
    assert_eq!(seen[0].str(), "3\n4\n5");
    assert_eq!(seen[0].items().len(), 3);
}

#[test]
fn head_emits_exactly_the_first_n() {
    let mut k = kernel();
    let (out, seen) = Capture::spawn(&mut k);

    let head = k.spawn("head", None, builtins::build("head").unwrap());
    k.core_mut(head).unwrap().stdout = Some(out);
    k.execute(head, vec!["2".into()]);

    // The cutoff lands mid-payload, so this write already reports it.
    assert!(!k.write(
        head,
        Output::rows(vec![Output::text("a"), Output::text("ab"), Output::text("abc")])
    ));
    assert!(!k.write(head, Output::text("late")));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].str(), "a\nab");
}
