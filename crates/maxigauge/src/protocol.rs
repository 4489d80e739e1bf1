//! Line framing and handshake classification for the Maxigauge protocol.
//!
//! The controller speaks line-oriented ASCII with single control bytes
//! mixed in:
//!
//! ```text
//! host -> PR1<CR>
//! ctrl -> <ACK><CR><LF>            (or <NAK><CR><LF> if rejected)
//! host -> <ENQ>                    (raw, no terminator)
//! ctrl -> 0,1.2340E-05<CR><LF>
//! ```
//!
//! This module holds the pure pieces of that exchange: encoding a command
//! line, extracting reply lines from a receive buffer, and classifying the
//! first reply line. The IO task in [`crate::io`] drives them against a
//! transport.

use std::fmt;

use bytes::{BufMut, BytesMut};

use maxigauge_core::control::{ACK, ENQ, NAK, READ_TERMINATOR, WRITE_TERMINATOR};
use maxigauge_core::hex_dump;

/// Upper bound on buffered reply bytes without a line terminator.
/// Controller lines are under 40 bytes; anything longer is line noise.
pub const MAX_LINE: usize = 8192;

/// The single byte that asks the controller to send its pending reply.
pub const ENQUIRY: [u8; 1] = [ENQ];

/// Result of attempting to extract one reply line from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineResult {
    /// A complete line was found.
    Line {
        /// The line content without the CR LF terminator.
        body: Vec<u8>,
        /// Number of bytes consumed from the buffer, terminator included.
        consumed: usize,
    },
    /// No terminator yet. More data is needed.
    Incomplete,
}

/// How the controller answered the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    /// ACK present: a reply is waiting to be fetched with ENQ.
    Ack,
    /// NAK present (and no ACK): the command was rejected.
    Nak,
    /// Neither control byte present.
    Unexpected,
}

/// Outcome of one complete query exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The command was acknowledged; this is the line returned after ENQ.
    Payload(String),
    /// The controller answered NAK.
    Rejected,
    /// The first reply line carried neither ACK nor NAK. Holds its raw bytes.
    Unexpected(Vec<u8>),
}

impl Reply {
    /// The payload text, or an empty string for a rejected or garbled
    /// exchange.
    pub fn into_text(self) -> String {
        match self {
            Reply::Payload(text) => text,
            Reply::Rejected | Reply::Unexpected(_) => String::new(),
        }
    }

    pub fn is_payload(&self) -> bool {
        matches!(self, Reply::Payload(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Payload(text) => write!(f, "{text}"),
            Reply::Rejected => write!(f, "command rejected (NAK)"),
            Reply::Unexpected(raw) => {
                write!(f, "did not receive ACK, got {} instead", hex_dump(raw))
            }
        }
    }
}

/// Encode a command line for transmission (command text plus CR).
///
/// # Example
///
/// ```
/// use maxigauge::protocol::encode_command;
///
/// assert_eq!(encode_command("PR1"), b"PR1\r");
/// assert_eq!(encode_command("SEN,0,0,0,2,0,0"), b"SEN,0,0,0,2,0,0\r");
/// ```
pub fn encode_command(command: &str) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(command.len() + WRITE_TERMINATOR.len());
    buf.put_slice(command.as_bytes());
    buf.put_slice(WRITE_TERMINATOR);
    buf.to_vec()
}

/// Extract the first CR LF terminated line from `buf`.
///
/// # Example
///
/// ```
/// use maxigauge::protocol::{decode_line, LineResult};
///
/// match decode_line(b"\x06\r\n0,1.0E-05") {
///     LineResult::Line { body, consumed } => {
///         assert_eq!(body, b"\x06");
///         assert_eq!(consumed, 3);
///     }
///     LineResult::Incomplete => panic!("expected a line"),
/// }
/// ```
pub fn decode_line(buf: &[u8]) -> LineResult {
    match buf
        .windows(READ_TERMINATOR.len())
        .position(|w| w == READ_TERMINATOR)
    {
        Some(pos) => LineResult::Line {
            body: buf[..pos].to_vec(),
            consumed: pos + READ_TERMINATOR.len(),
        },
        None => LineResult::Incomplete,
    }
}

/// Classify the first reply line of an exchange.
///
/// ACK anywhere in the line wins, even if a NAK or other bytes are also
/// present; the controller echoes varying content around the control byte.
pub fn classify(line: &[u8]) -> Acknowledgement {
    if line.contains(&ACK) {
        Acknowledgement::Ack
    } else if line.contains(&NAK) {
        Acknowledgement::Nak
    } else {
        Acknowledgement::Unexpected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_appends_carriage_return_only() {
        assert_eq!(encode_command("PR6"), b"PR6\r");
        assert_eq!(encode_command(""), b"\r");
    }

    #[test]
    fn enquiry_is_a_bare_byte() {
        assert_eq!(ENQUIRY, [0x05]);
    }

    #[test]
    fn decode_empty_and_unterminated() {
        assert_eq!(decode_line(b""), LineResult::Incomplete);
        assert_eq!(decode_line(b"0,1.0E-05"), LineResult::Incomplete);
        // A bare CR is the write terminator, not a read terminator.
        assert_eq!(decode_line(b"0,1.0E-05\r"), LineResult::Incomplete);
    }

    #[test]
    fn decode_payload_line() {
        assert_eq!(
            decode_line(b"0,1.234e-05\r\n"),
            LineResult::Line {
                body: b"0,1.234e-05".to_vec(),
                consumed: 13,
            }
        );
    }

    #[test]
    fn decode_empty_line() {
        assert_eq!(
            decode_line(b"\r\nrest"),
            LineResult::Line {
                body: Vec::new(),
                consumed: 2,
            }
        );
    }

    #[test]
    fn decode_returns_first_of_several_lines() {
        assert_eq!(
            decode_line(b"\x06PR1\r\n0,1.0\r\n"),
            LineResult::Line {
                body: b"\x06PR1".to_vec(),
                consumed: 6,
            }
        );
    }

    #[test]
    fn classify_ack_anywhere() {
        assert_eq!(classify(&[ACK]), Acknowledgement::Ack);
        assert_eq!(classify(b"\x06PR1"), Acknowledgement::Ack);
        assert_eq!(classify(b"PR1\x06"), Acknowledgement::Ack);
        assert_eq!(classify(&[NAK, ACK]), Acknowledgement::Ack);
    }

    #[test]
    fn classify_nak() {
        assert_eq!(classify(&[NAK]), Acknowledgement::Nak);
        assert_eq!(classify(b"xx\x15"), Acknowledgement::Nak);
    }

    #[test]
    fn classify_garbage() {
        assert_eq!(classify(b"???"), Acknowledgement::Unexpected);
        assert_eq!(classify(b""), Acknowledgement::Unexpected);
        assert_eq!(classify(&[ENQ]), Acknowledgement::Unexpected);
    }

    #[test]
    fn reply_text_mapping() {
        assert_eq!(Reply::Payload("0,1.0".into()).into_text(), "0,1.0");
        assert_eq!(Reply::Rejected.into_text(), "");
        assert_eq!(Reply::Unexpected(b"???".to_vec()).into_text(), "");
    }

    #[test]
    fn reply_diagnostic_includes_hex_dump() {
        let msg = Reply::Unexpected(b"???".to_vec()).to_string();
        assert!(msg.contains("3F 3F 3F"), "got: {msg}");
        assert!(Reply::Rejected.to_string().contains("NAK"));
    }
}
