use std::path::PathBuf;

use thiserror::Error;

/// Reasons the helper could not be brought up. Logged, never surfaced to the client.
#[derive(Debug, Error)]
pub enum HelperError {
    #[error("helper binary `{0}` not found in the workspace or on PATH")]
    NotFound(String),
    #[error("failed to spawn {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("helper process has no {0} pipe")]
    MissingPipe(&'static str),
    #[error("helper health check failed")]
    HealthCheckFailed,
}
