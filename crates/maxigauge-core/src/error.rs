//! Error types for the Maxigauge driver.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Only failures the caller has to act on
//! are errors: a NAK or a garbled reply from the controller is reported in
//! the log and degrades to an empty reply instead.

/// The error type for all Maxigauge operations.
///
/// Transport faults (port cannot be opened, read timed out, link dropped)
/// are hard errors. Protocol-level rejections are not represented here
/// because the handshake engine recovers from them locally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open/configure failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// A framing error on the line protocol (e.g. a reply line that never
    /// terminates and overflows the receive buffer).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for a reply line from the controller.
    ///
    /// This typically means the controller is powered off, the baud rate is
    /// wrong, or the cable is not connected.
    #[error("timeout waiting for response")]
    Timeout,

    /// An invalid parameter was passed to a driver method or builder.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A sensor channel index outside 1..=6.
    #[error("channel {0} out of range (expected 1-6)")]
    ChannelOutOfRange(u8),

    /// The driver is closed, or the transport was never opened.
    #[error("not connected")]
    NotConnected,

    /// The connection to the controller was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
