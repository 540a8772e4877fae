//! Command loop - reads extension requests, dispatches, replies.
//!
//! Strictly sequential: one request in flight at a time, exactly one
//! response per recognized request. The loop ends cleanly when the extension
//! closes its end of the pipe; a framing or decode failure ends it with an
//! error, since the stream can no longer be realigned.

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::bridge::codec::{FrameError, JsonCodec};
use crate::bridge::protocol::{ACTION_START, Request, Response};
use crate::launcher::ServerSpawner;

/// The host side of the native messaging channel.
///
/// Generic over the byte streams and the spawner so tests can substitute
/// in-memory pipes and scripted launch outcomes.
pub struct Host<R, W, S> {
    requests: FramedRead<R, JsonCodec<Request>>,
    responses: FramedWrite<W, JsonCodec<Response>>,
    spawner: S,
}

impl<R, W, S> Host<R, W, S>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    S: ServerSpawner,
{
    pub fn new(reader: R, writer: W, spawner: S) -> Self {
        Self {
            requests: FramedRead::new(reader, JsonCodec::new()),
            responses: FramedWrite::new(writer, JsonCodec::new()),
            spawner,
        }
    }

    /// Run until the extension closes its end of the channel.
    ///
    /// Launch failures are reported to the extension as `success=false` and
    /// the loop keeps going; channel failures propagate out.
    pub async fn run(mut self) -> Result<(), FrameError> {
        while let Some(request) = self.requests.next().await {
            let request = request?;

            match request.action() {
                Some(ACTION_START) => {
                    let response = self.launch();
                    // send() flushes, so the frame is fully on the wire
                    // before the next read is issued.
                    self.responses.send(response).await?;
                }
                action => {
                    tracing::debug!(?action, "ignoring unrecognized action");
                }
            }
        }

        tracing::info!("request stream closed, exiting");
        Ok(())
    }

    fn launch(&self) -> Response {
        match self.spawner.spawn() {
            Ok(spawned) => {
                tracing::info!(pid = spawned.pid, "server started");
                Response::ok("Server started successfully")
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to start server");
                Response::failed(e.to_string())
            }
        }
    }
}
