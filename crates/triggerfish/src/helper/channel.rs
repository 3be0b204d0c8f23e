use std::time::Duration;

use futures::FutureExt;
use serde_json::{Map, Value};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines},
    sync::Mutex,
};
use tracing::{debug, error};

use crate::helper::protocol::{HelperRequest, decode_response};

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

struct ChannelIo {
    reader: Lines<BufReader<BoxedReader>>,
    writer: BoxedWriter,
}

/// Correlated request/response exchange over a pair of byte streams.
///
/// At most one request is in flight: the lock is held from the write until
/// the matching response has been read or abandoned. Every failure is logged
/// and reported as `None`.
pub struct HelperChannel {
    io: Mutex<ChannelIo>,
}

impl HelperChannel {
    pub fn new(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        let reader: BoxedReader = Box::new(reader);
        let writer: BoxedWriter = Box::new(writer);
        Self {
            io: Mutex::new(ChannelIo {
                reader: BufReader::new(reader).lines(),
                writer,
            }),
        }
    }

    /// Send `method` with `params` and wait up to `timeout` for its response.
    pub async fn request(
        &self,
        method: &str,
        params: &Value,
        timeout: Duration,
    ) -> Option<Map<String, Value>> {
        let request = HelperRequest::new(method, params);
        let line = match request.to_line() {
            Ok(line) => line,
            Err(err) => {
                error!("failed to encode helper request {method}: {err}");
                return None;
            },
        };

        let mut io = self.io.lock().await;
        io.discard_stale_lines();

        if let Err(err) = io.send(&line).await {
            error!("helper communication error on {method}: {err}");
            return None;
        }

        let response = match tokio::time::timeout(timeout, io.reader.next_line()).await {
            Ok(Ok(Some(response))) => response,
            Ok(Ok(None)) => {
                error!("helper closed its output during {method}");
                return None;
            },
            Ok(Err(err)) => {
                error!("helper communication error on {method}: {err}");
                return None;
            },
            Err(_) => {
                error!("helper request timeout: {method} after {}ms", timeout.as_millis());
                return None;
            },
        };

        match decode_response(&response, &request.id) {
            Ok(result) => Some(result),
            Err(err) => {
                error!("helper request {method} failed: {err}");
                None
            },
        }
    }
}

impl ChannelIo {
    async fn send(
        &mut self,
        line: &str,
    ) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await
    }

    /// Drop complete lines that arrived after an earlier request gave up on them.
    fn discard_stale_lines(&mut self) {
        while let Some(Ok(Some(stale))) = self.reader.next_line().now_or_never() {
            debug!("discarding stale helper output: {stale}");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/helper/channel_tests.rs"]
mod tests;
