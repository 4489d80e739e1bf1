//! Scripted mock transport for testing the handshake engine.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs. Besides the raw [`expect`](MockTransport::expect)
//! it knows the controller's framing, so a full ACK/ENQ exchange can be
//! scripted in one call.
//!
//! # Example
//!
//! ```
//! use maxigauge_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // "PR1\r" -> ACK line, then ENQ -> "0,1.234e-05\r\n"
//! mock.expect_exchange("PR1", "0,1.234e-05");
//! assert_eq!(mock.remaining_expectations(), 2);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use maxigauge_core::control::{ACK, ENQ, NAK, READ_TERMINATOR, WRITE_TERMINATOR};
use maxigauge_core::error::{Error, Result};
use maxigauge_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes to return when the matching request is received.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing without a controller attached.
///
/// Expectations are consumed in order. Each `send()` is matched against the
/// next expectation and arms its response for the following `receive()`
/// calls. A send that does not match, or a send with no expectations left,
/// fails with [`Error::Protocol`]. A `receive()` with nothing pending fails
/// with [`Error::Timeout`], the same way a silent controller would.
#[derive(Debug)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    /// The response data pending for the next `receive()` call.
    pending_response: Option<Vec<u8>>,
    /// How many bytes of the pending response have been read so far.
    response_cursor: usize,
    /// Largest chunk handed out per `receive()` (0 = unlimited).
    chunk_size: usize,
    connected: bool,
    /// Error message returned by `close()`, if set.
    close_error: Option<String>,
    /// Log of all bytes sent through this transport.
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: None,
            response_cursor: 0,
            chunk_size: 0,
            connected: true,
            close_error: None,
            sent_log: Vec::new(),
        }
    }

    /// Add an expected raw request/response pair.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Expect the command line `command` (CR appended) and answer with the
    /// raw line `reply` (CR LF appended).
    pub fn expect_command(&mut self, command: &str, reply: &[u8]) {
        let mut request = command.as_bytes().to_vec();
        request.extend_from_slice(WRITE_TERMINATOR);
        self.expect(&request, &line(reply));
    }

    /// Expect a bare ENQ byte and answer with the payload line `payload`.
    pub fn expect_enquiry(&mut self, payload: &str) {
        self.expect(&[ENQ], &line(payload.as_bytes()));
    }

    /// Script a complete successful exchange: `command` is acknowledged, then
    /// the ENQ is answered with `payload`.
    pub fn expect_exchange(&mut self, command: &str, payload: &str) {
        self.expect_command(command, &[ACK]);
        self.expect_enquiry(payload);
    }

    /// Script a rejected command: `command` is answered with a NAK line.
    pub fn expect_rejection(&mut self, command: &str) {
        self.expect_command(command, &[NAK]);
    }

    /// Hand out responses at most `size` bytes per `receive()` call, to
    /// exercise reassembly of lines split across reads.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size;
    }

    /// Return a reference to all data that has been sent through this transport.
    ///
    /// Each element is the byte slice from one `send()` call.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state of the mock transport.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Make `close()` fail with [`Error::Transport`], as a port that
    /// cannot be released would.
    pub fn fail_close(&mut self, message: &str) {
        self.close_error = Some(message.to_string());
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn line(body: &[u8]) -> Vec<u8> {
    let mut out = body.to_vec();
    out.extend_from_slice(READ_TERMINATOR);
    out
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        let expectation = self
            .expectations
            .pop_front()
            .ok_or_else(|| Error::Protocol("no more expectations in mock transport".into()))?;
        if data != expectation.request.as_slice() {
            return Err(Error::Protocol(format!(
                "unexpected send data: expected {:02X?}, got {:02X?}",
                expectation.request, data
            )));
        }
        self.pending_response = Some(expectation.response);
        self.response_cursor = 0;
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let Some(response) = self.pending_response.as_ref() else {
            return Err(Error::Timeout);
        };

        let remaining = &response[self.response_cursor..];
        if remaining.is_empty() {
            self.pending_response = None;
            self.response_cursor = 0;
            return Err(Error::Timeout);
        }
        let mut n = remaining.len().min(buf.len());
        if self.chunk_size > 0 {
            n = n.min(self.chunk_size);
        }
        buf[..n].copy_from_slice(&remaining[..n]);
        self.response_cursor += n;
        if self.response_cursor >= response.len() {
            self.pending_response = None;
            self.response_cursor = 0;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response = None;
        self.response_cursor = 0;
        match &self.close_error {
            Some(message) => Err(Error::Transport(message.clone())),
            None => Ok(()),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn recv_all(mock: &mut MockTransport) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        while let Ok(n) = mock.receive(&mut buf, Duration::from_millis(10)).await {
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[tokio::test]
    async fn expect_command_appends_terminators() {
        let mut mock = MockTransport::new();
        mock.expect_command("PR1", &[ACK]);

        mock.send(b"PR1\r").await.unwrap();
        assert_eq!(recv_all(&mut mock).await, b"\x06\r\n");
    }

    #[tokio::test]
    async fn expect_exchange_scripts_ack_then_payload() {
        let mut mock = MockTransport::new();
        mock.expect_exchange("PR2", "0,5.0e-03");

        mock.send(b"PR2\r").await.unwrap();
        assert_eq!(recv_all(&mut mock).await, b"\x06\r\n");
        mock.send(&[ENQ]).await.unwrap();
        assert_eq!(recv_all(&mut mock).await, b"0,5.0e-03\r\n");
        assert_eq!(mock.remaining_expectations(), 0);
        assert_eq!(mock.sent_data(), &[b"PR2\r".to_vec(), vec![ENQ]]);
    }

    #[tokio::test]
    async fn expect_rejection_answers_nak() {
        let mut mock = MockTransport::new();
        mock.expect_rejection("PR3");

        mock.send(b"PR3\r").await.unwrap();
        assert_eq!(recv_all(&mut mock).await, b"\x15\r\n");
    }

    #[tokio::test]
    async fn wrong_data_errors() {
        let mut mock = MockTransport::new();
        mock.expect_command("PR1", &[ACK]);

        let result = mock.send(b"PR4\r").await;
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn send_without_expectation_errors() {
        let mut mock = MockTransport::new();
        let result = mock.send(&[ENQ]).await;
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn receive_without_send_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn chunked_receive_splits_response() {
        let mut mock = MockTransport::new();
        mock.set_chunk_size(2);
        mock.expect(b"X", b"ABCDE");
        mock.send(b"X").await.unwrap();

        let mut buf = [0u8; 64];
        let n = mock.receive(&mut buf, Duration::from_millis(10)).await.unwrap();
        assert_eq!(&buf[..n], b"AB");
        assert_eq!(recv_all(&mut mock).await, b"CDE");
    }

    #[tokio::test]
    async fn close_disconnects() {
        let mut mock = MockTransport::new();
        assert!(mock.is_connected());

        mock.close().await.unwrap();
        mock.close().await.unwrap();
        assert!(!mock.is_connected());

        let result = mock.send(b"PR1\r").await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn close_failure_is_reported() {
        let mut mock = MockTransport::new();
        mock.fail_close("port busy");

        let result = mock.close().await;
        assert!(matches!(result, Err(Error::Transport(ref msg)) if msg == "port busy"));
        assert!(!mock.is_connected());
    }

    #[tokio::test]
    async fn set_connected_false_blocks_io() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);

        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }
}
