//! Transport trait for controller communication.
//!
//! The [`Transport`] trait abstracts over the physical link to the gauge
//! controller. The real implementation is the serial port in
//! `maxigauge-transport`; tests use `MockTransport` from
//! `maxigauge-test-harness`.
//!
//! The transport is byte-oriented. Line framing (CR on write, CR LF on read)
//! and the ACK/ENQ handshake live in the `maxigauge` crate so that the raw
//! ENQ byte can be written without a terminator.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a controller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes, blocking until they have been handed to the port.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes into `buf`, waiting up to `timeout` for data.
    ///
    /// Returns the number of bytes read, or
    /// [`Error::Timeout`](crate::error::Error::Timeout) if nothing arrived
    /// before the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport. Must be idempotent.
    ///
    /// After `close()`, `send()` and `receive()` return
    /// [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently open.
    fn is_connected(&self) -> bool;
}
