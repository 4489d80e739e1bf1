//! Control characters and line terminators used on the controller link.

/// Acknowledge: the controller accepted the command and has a reply pending.
pub const ACK: u8 = 0x06;

/// Negative acknowledge: the controller rejected the command.
pub const NAK: u8 = 0x15;

/// Enquiry: asks the controller to transmit the pending reply. Sent raw.
pub const ENQ: u8 = 0x05;

/// End of text. Reserved; the driver never sends or expects it.
pub const ETX: u8 = 0x03;

/// Appended to every command line written to the controller.
pub const WRITE_TERMINATOR: &[u8] = b"\r";

/// Terminates every line read back from the controller.
pub const READ_TERMINATOR: &[u8] = b"\r\n";
