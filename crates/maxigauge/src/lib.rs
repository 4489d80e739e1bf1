//! Pfeiffer Maxigauge driver.
//!
//! The Maxigauge is a six-channel vacuum pressure controller on a serial
//! line. Every command is answered with an ACK or NAK line; after an ACK the
//! host sends a bare ENQ byte to fetch the actual reply. This crate provides:
//!
//! - **Protocol codec** ([`protocol`]) -- CR-terminated command encoding,
//!   CR LF line extraction, and ACK/NAK classification of the first reply.
//! - **Command builders** ([`commands`]) -- `PR{n}` pressure queries and
//!   `SEN` sensor masks, plus decoding of `status,pressure` replies.
//! - **IO task** ([`io`]) -- a single task that owns the transport and runs
//!   one complete handshake at a time.
//! - **Driver** ([`gauge`]) -- [`Maxigauge`], the high-level API.
//! - **Builder** ([`builder`]) -- [`MaxigaugeBuilder`] for serial settings
//!   and timeouts.
//!
//! # Example
//!
//! ```
//! use maxigauge::commands::{cmd_read_pressure, decode_reading};
//! use maxigauge::protocol::encode_command;
//! use maxigauge::{Channel, Reading};
//!
//! let cmd = cmd_read_pressure(Channel::new(2).unwrap());
//! assert_eq!(encode_command(&cmd), b"PR2\r");
//!
//! assert_eq!(decode_reading("0,8.5000E-06"), Reading::Value(8.5e-6));
//! assert_eq!(decode_reading("5,"), Reading::Invalid);
//! ```

pub mod builder;
pub mod commands;
pub mod gauge;
pub mod io;
pub mod protocol;

pub use builder::MaxigaugeBuilder;
pub use gauge::Maxigauge;
pub use protocol::Reply;

pub use maxigauge_core::{
    CHANNEL_COUNT, Channel, ChannelMask, Error, Reading, Result, SensorAction, Transport,
};
pub use maxigauge_transport::SerialConfig;
