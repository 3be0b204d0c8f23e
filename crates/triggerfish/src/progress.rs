//! Work-done progress reporting via the LSP `$/progress` notification.
//!
//! ```ignore
//! let token = ProgressToken::begin(&client, "Indexing workspace", None).await;
//! token.report(Some("12/40 files".into()), Some(30)).await;
//! token.end(Some("40 files indexed".into())).await;
//! ```

use std::{
    panic::AssertUnwindSafe,
    sync::atomic::{AtomicU64, Ordering},
};

use futures::FutureExt;
use tower_lsp::{Client, lsp_types::*};
use tracing::{debug, warn};

static NEXT_PROGRESS_ID: AtomicU64 = AtomicU64::new(1);
const PROGRESS_TITLE_PREFIX: &str = "triggerfish:";

/// A handle to an active work-done progress session.
///
/// Dropping the handle without calling [`end`](Self::end) still ends the
/// session, with a "Cancelled" message.
pub struct ProgressToken {
    client: Option<Client>,
    token: Option<NumberOrString>,
}

impl ProgressToken {
    /// Create the token on the client and send the `Begin` notification.
    ///
    /// The create request runs in the background; editors that reject it still
    /// get the notifications.
    pub async fn begin(
        client: &Client,
        title: &str,
        message: Option<String>,
    ) -> Self {
        let id = NEXT_PROGRESS_ID.fetch_add(1, Ordering::Relaxed);
        let token = NumberOrString::String(format!("triggerfish/{}/{id}", title.trim()));
        let display_title = prefixed_progress_title(title);

        // The pending response must stay alive until the client answers.
        let create_client = client.clone();
        let create_token = token.clone();
        tokio::spawn(async move {
            let result = AssertUnwindSafe(create_client.send_request::<request::WorkDoneProgressCreate>(
                WorkDoneProgressCreateParams {
                    token: create_token,
                },
            ))
            .catch_unwind()
            .await;
            match result {
                Ok(Ok(())) => {},
                Ok(Err(error)) => debug!("workDoneProgress/create failed: {error}"),
                Err(_) => warn!("workDoneProgress/create panicked (client may have disconnected)"),
            }
        });

        let begin = WorkDoneProgress::Begin(WorkDoneProgressBegin {
            title: display_title.clone(),
            cancellable: Some(false),
            message,
            percentage: Some(0),
        });
        if !send_progress(client, token.clone(), begin).await {
            warn!("progress begin notification panicked (client may have disconnected)");
            return Self {
                client: None,
                token: None,
            };
        }

        debug!("progress begin: {display_title}");
        Self {
            client: Some(client.clone()),
            token: Some(token),
        }
    }

    /// Intermediate update. `percentage` is clamped to 100.
    pub async fn report(
        &self,
        message: Option<String>,
        percentage: Option<u32>,
    ) {
        let (Some(client), Some(token)) = (&self.client, &self.token) else {
            return;
        };
        let report = WorkDoneProgress::Report(WorkDoneProgressReport {
            cancellable: Some(false),
            message,
            percentage: percentage.map(|p| p.min(100)),
        });
        send_progress(client, token.clone(), report).await;
    }

    pub async fn end(
        mut self,
        message: Option<String>,
    ) {
        let (Some(client), Some(token)) = (self.client.take(), self.token.take()) else {
            return;
        };
        debug!("progress end: {token:?}");
        send_progress(&client, token, WorkDoneProgress::End(WorkDoneProgressEnd {
            message,
        }))
        .await;
    }
}

impl Drop for ProgressToken {
    fn drop(&mut self) {
        if let (Some(client), Some(token)) = (self.client.take(), self.token.take()) {
            debug!("progress cancelled (drop): {token:?}");
            tokio::spawn(async move {
                send_progress(&client, token, WorkDoneProgress::End(WorkDoneProgressEnd {
                    message: Some("Cancelled".to_string()),
                }))
                .await;
            });
        }
    }
}

/// Returns `false` if sending panicked.
async fn send_progress(
    client: &Client,
    token: NumberOrString,
    value: WorkDoneProgress,
) -> bool {
    AssertUnwindSafe(client.send_notification::<notification::Progress>(ProgressParams {
        token,
        value: ProgressParamsValue::WorkDone(value),
    }))
    .catch_unwind()
    .await
    .is_ok()
}

fn prefixed_progress_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.starts_with(PROGRESS_TITLE_PREFIX) {
        return trimmed.to_owned();
    }
    format!("{PROGRESS_TITLE_PREFIX} {trimmed}")
}

/// Percentage of `done` out of `total`; an empty job counts as complete.
pub(crate) fn percentage(
    done: usize,
    total: usize,
) -> u32 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u32
}

#[cfg(test)]
#[path = "../tests/src/progress_tests.rs"]
mod tests;
