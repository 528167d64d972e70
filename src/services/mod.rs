//! Promise-style facades over the host: timers, HTTP, and the flat
//! virtual filesystem.
//!
//! Every operation returns to the event loop before its result is seen:
//! completions are posted to the application event channel as
//! `AppEvent::Complete` and dispatched back into the owning process with
//! a token. A process that re-arms (or has terminated) simply ignores a
//! stale token, the same way the UI ignores output from a stale PTY
//! generation.

mod net;
pub mod storage;
mod timer;

use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::kernel::Pid;
use crate::ui::events::AppEvent;

pub use net::HttpError;
pub use storage::{Storage, StorageError};

pub type Token = u64;

/// Result of a completed asynchronous operation.
#[derive(Debug, Clone)]
pub enum Completion {
    Timer,
    Http(Result<String, HttpError>),
    Storage(Result<StorageReply, StorageError>),
}

#[derive(Debug, Clone)]
pub enum StorageReply {
    Content(String),
    Listing(Vec<String>),
    Done,
}

/// Keeps the outstanding-operation count alive while a completion is in
/// flight (queued on the channel or held by a spawned task). Dropping
/// the guard — including by aborting the task — settles the operation.
#[derive(Debug, Clone)]
pub struct OpGuard(#[allow(dead_code)] Arc<()>);

/// Abortable handle for an in-flight timer or HTTP task.
#[derive(Debug)]
pub struct TaskHandle {
    inner: tokio::task::AbortHandle,
}

impl TaskHandle {
    pub fn abort(&self) {
        self.inner.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

pub struct Services {
    pub storage: Storage,
    events: Sender<AppEvent>,
    runtime: Option<tokio::runtime::Handle>,
    next_token: Token,
    ops: Arc<()>,
}

impl Services {
    pub fn new(
        storage: Storage,
        events: Sender<AppEvent>,
        runtime: Option<tokio::runtime::Handle>,
    ) -> Self {
        Services {
            storage,
            events,
            runtime,
            next_token: 0,
            ops: Arc::new(()),
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.next_token += 1;
        self.next_token
    }

    /// Operations whose completion has not yet been dispatched.
    pub fn outstanding(&self) -> usize {
        Arc::strong_count(&self.ops) - 1
    }

    fn guard(&self) -> OpGuard {
        OpGuard(Arc::clone(&self.ops))
    }

    fn post(&self, pid: Pid, token: Token, result: Completion) {
        let _ = self.events.send(AppEvent::Complete {
            pid,
            token,
            result,
            guard: self.guard(),
        });
    }

    // --- storage ---
    //
    // The mutation applies now; only the acknowledgment is deferred.

    pub fn storage_read(&mut self, pid: Pid, token: Token, path: &str) {
        let result = self.storage.read(path).map(StorageReply::Content);
        self.post(pid, token, Completion::Storage(result));
    }

    pub fn storage_write(&mut self, pid: Pid, token: Token, path: &str, content: &str) {
        self.storage.write(path, content);
        self.post(pid, token, Completion::Storage(Ok(StorageReply::Done)));
    }

    pub fn storage_append(&mut self, pid: Pid, token: Token, path: &str, content: &str) {
        self.storage.append(path, content);
        self.post(pid, token, Completion::Storage(Ok(StorageReply::Done)));
    }

    pub fn storage_list(&mut self, pid: Pid, token: Token) {
        let listing = self.storage.list();
        self.post(
            pid,
            token,
            Completion::Storage(Ok(StorageReply::Listing(listing))),
        );
    }

    pub fn storage_rename(&mut self, pid: Pid, token: Token, path: &str, target: &str) {
        let result = self.storage.rename(path, target).map(|()| StorageReply::Done);
        self.post(pid, token, Completion::Storage(result));
    }

    pub fn storage_remove(&mut self, pid: Pid, token: Token, path: &str) {
        self.storage.remove(path);
        self.post(pid, token, Completion::Storage(Ok(StorageReply::Done)));
    }

    // --- timers / network ---

    /// Resolves with `Completion::Timer` after `ms`. Returns `None` when
    /// no async runtime is attached (synchronous test kernels).
    pub fn timeout(&mut self, pid: Pid, token: Token, ms: u64) -> Option<TaskHandle> {
        let runtime = self.runtime.as_ref()?;
        let events = self.events.clone();
        let guard = self.guard();
        let handle = runtime.spawn(timer::fire(ms, pid, token, events, guard));
        Some(TaskHandle {
            inner: handle.abort_handle(),
        })
    }

    /// HTTP request resolving with the body on 200, rejecting with the
    /// status (or a transport message) otherwise. `timeout_ms = 0` means
    /// no timeout.
    pub fn request(
        &mut self,
        pid: Pid,
        token: Token,
        method: &str,
        url: &str,
        timeout_ms: u64,
    ) -> Option<TaskHandle> {
        let runtime = self.runtime.as_ref()?;
        let events = self.events.clone();
        let guard = self.guard();
        let handle = runtime.spawn(net::fetch(
            method.to_string(),
            url.to_string(),
            timeout_ms,
            pid,
            token,
            events,
            guard,
        ));
        Some(TaskHandle {
            inner: handle.abort_handle(),
        })
    }
}
