use std::str::FromStr;
use std::sync::mpsc::Sender;
use std::time::Duration;

use thiserror::Error;

use crate::kernel::Pid;
use crate::ui::events::AppEvent;

use super::{Completion, OpGuard, Token};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Non-200 response status.
    #[error("{0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
}

pub(super) async fn fetch(
    method: String,
    url: String,
    timeout_ms: u64,
    pid: Pid,
    token: Token,
    events: Sender<AppEvent>,
    guard: OpGuard,
) {
    let result = perform(&method, &url, timeout_ms).await;
    let _ = events.send(AppEvent::Complete {
        pid,
        token,
        result: Completion::Http(result),
        guard,
    });
}

async fn perform(method: &str, url: &str, timeout_ms: u64) -> Result<String, HttpError> {
    let mut builder = reqwest::Client::builder();
    if timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(timeout_ms));
    }
    let client = builder
        .build()
        .map_err(|err| HttpError::Transport(err.to_string()))?;
    let method = reqwest::Method::from_str(method)
        .map_err(|_| HttpError::Transport(format!("bad method: {method}")))?;

    let response = client
        .request(method, url)
        .send()
        .await
        .map_err(|err| HttpError::Transport(err.to_string()))?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(HttpError::Status(response.status().as_u16()));
    }
    response
        .text()
        .await
        .map_err(|err| HttpError::Transport(err.to_string()))
}
