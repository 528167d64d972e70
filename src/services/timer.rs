use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::kernel::Pid;
use crate::ui::events::AppEvent;

use super::{Completion, OpGuard, Token};

pub(super) async fn fire(
    ms: u64,
    pid: Pid,
    token: Token,
    events: Sender<AppEvent>,
    guard: OpGuard,
) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    let _ = events.send(AppEvent::Complete {
        pid,
        token,
        result: Completion::Timer,
        guard,
    });
}
