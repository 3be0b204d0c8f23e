use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CtagsError {
    #[error("{0} is not available")]
    NotFound(String),
    #[error("{command} timed out after {}s", timeout.as_secs())]
    Timeout {
        command: String,
        timeout: Duration,
    },
    #[error("failed to launch {command}: {reason}")]
    LaunchFailed {
        command: String,
        reason: String,
    },
    #[error("{command} failed: {reason}")]
    Failed {
        command: String,
        reason: String,
    },
}
