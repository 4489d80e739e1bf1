//! IO task owning the controller link.
//!
//! One tokio task owns the transport exclusively and runs every query as a
//! complete exchange (command, ACK, ENQ, payload) before it looks at the
//! next request. Callers on any task talk to it through [`GaugeIo`], so two
//! concurrent polls queue up instead of interleaving their bytes on the
//! wire.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use maxigauge_core::error::{Error, Result};
use maxigauge_core::transport::Transport;
use maxigauge_core::{escape_bytes, hex_dump};

use crate::protocol::{self, Acknowledgement, ENQUIRY, LineResult, MAX_LINE, Reply};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Configuration for the IO task.
#[derive(Debug, Clone)]
pub struct IoConfig {
    /// Upper bound for reading one reply line.
    pub command_timeout: Duration,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_millis(1000),
        }
    }
}

/// A request sent from the driver to the IO task.
pub enum Request {
    /// Run one query exchange.
    Query {
        command: String,
        reply: oneshot::Sender<Result<Reply>>,
    },
    /// Stop the task and hand the transport back.
    Shutdown {
        reply: oneshot::Sender<Box<dyn Transport>>,
    },
}

/// Handle to the IO task.
pub struct GaugeIo {
    tx: mpsc::Sender<Request>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl GaugeIo {
    /// Queue a query and wait for its outcome.
    ///
    /// Fails with [`Error::NotConnected`] if the task has stopped.
    pub async fn query(&self, command: String) -> Result<Reply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Query {
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::NotConnected)?;

        reply_rx.await.map_err(|_| Error::NotConnected)?
    }

    /// Stop the task without waiting. Any exchange in progress finishes
    /// first; queued requests fail with [`Error::NotConnected`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Shut down the IO task and recover the transport.
    pub async fn shutdown(self) -> Result<Box<dyn Transport>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let _ = self.tx.send(Request::Shutdown { reply: reply_tx }).await;
        let transport = reply_rx.await.map_err(|_| Error::NotConnected)?;
        let _ = self.task.await;
        Ok(transport)
    }
}

// ---------------------------------------------------------------------------
// Spawn
// ---------------------------------------------------------------------------

/// Spawn the IO task. Returns the handle for sending queries.
pub fn spawn_io_task(transport: Box<dyn Transport>, config: IoConfig) -> GaugeIo {
    let (tx, rx) = mpsc::channel::<Request>(32);
    let cancel = CancellationToken::new();

    let session = Session {
        transport,
        rx_buf: Vec::new(),
    };
    let task = tokio::spawn(io_loop(session, config, rx, cancel.clone()));

    GaugeIo { tx, cancel, task }
}

// ---------------------------------------------------------------------------
// IO loop
// ---------------------------------------------------------------------------

async fn io_loop(
    mut session: Session,
    config: IoConfig,
    mut rx: mpsc::Receiver<Request>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("gauge IO task cancelled");
                break;
            }

            req = rx.recv() => match req {
                Some(Request::Query { command, reply }) => {
                    let result = session.query(&command, config.command_timeout).await;
                    let _ = reply.send(result);
                }
                Some(Request::Shutdown { reply }) => {
                    debug!("gauge IO task shutdown requested");
                    let _ = reply.send(session.transport);
                    return;
                }
                None => {
                    debug!("request channel closed, exiting gauge IO task");
                    break;
                }
            }
        }
    }

    // Dropped without a shutdown request: release the port here.
    if let Err(e) = session.transport.close().await {
        warn!(error = %e, "failed to close transport on IO task exit");
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The open link: transport plus the bytes read but not yet consumed.
struct Session {
    transport: Box<dyn Transport>,
    rx_buf: Vec<u8>,
}

impl Session {
    /// Run one command/ACK/ENQ/payload exchange.
    async fn query(&mut self, command: &str, timeout: Duration) -> Result<Reply> {
        debug!(command, "query");
        self.discard_stale().await?;

        self.transport.send(&protocol::encode_command(command)).await?;
        let first = self.read_line(timeout).await?;
        debug!(
            reply = %escape_bytes(&first),
            hex = %hex_dump(&first),
            "reply"
        );

        match protocol::classify(&first) {
            Acknowledgement::Ack => {
                debug!(command, "received ACK, proceeding with ENQ");
                self.transport.send(&ENQUIRY).await?;
                let payload = self.read_line(timeout).await?;
                debug!(
                    reply = %escape_bytes(&payload),
                    hex = %hex_dump(&payload),
                    "payload"
                );
                Ok(Reply::Payload(
                    String::from_utf8_lossy(&payload).into_owned(),
                ))
            }
            Acknowledgement::Nak => {
                error!(command, "query resulted in NAK");
                Ok(Reply::Rejected)
            }
            Acknowledgement::Unexpected => {
                let reply = Reply::Unexpected(first);
                error!(command, "{reply}");
                Ok(reply)
            }
        }
    }

    /// Drop anything left over from an earlier exchange (a reply that
    /// arrived after its read timed out, or a second line in one chunk).
    async fn discard_stale(&mut self) -> Result<()> {
        let mut chunk = [0u8; 256];
        while self.rx_buf.len() <= MAX_LINE {
            match self.transport.receive(&mut chunk, Duration::ZERO).await {
                Ok(n) => self.rx_buf.extend_from_slice(&chunk[..n]),
                Err(Error::Timeout) => break,
                Err(e) => return Err(e),
            }
        }
        if !self.rx_buf.is_empty() {
            debug!(hex = %hex_dump(&self.rx_buf), "discarding stale bytes");
            self.rx_buf.clear();
        }
        Ok(())
    }

    /// Read one CR LF terminated line, waiting at most `timeout` overall.
    async fn read_line(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; 256];

        loop {
            if let LineResult::Line { body, consumed } = protocol::decode_line(&self.rx_buf) {
                self.rx_buf.drain(..consumed);
                return Ok(body);
            }

            if self.rx_buf.len() > MAX_LINE {
                warn!(len = self.rx_buf.len(), "reply line overflow, clearing buffer");
                self.rx_buf.clear();
                return Err(Error::Protocol(format!(
                    "no line terminator within {MAX_LINE} bytes"
                )));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout);
            }
            let n = self.transport.receive(&mut chunk, remaining).await?;
            self.rx_buf.extend_from_slice(&chunk[..n]);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
