//! maxigauge-core: Core traits, types, and error definitions for the
//! Maxigauge pressure controller driver.
//!
//! The transport and handshake crates build on these types; host
//! applications can depend on them without pulling in a serial stack.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`Channel`], [`ChannelMask`], [`SensorAction`] -- channel addressing
//! - [`Reading`] -- a pressure value or the invalid sentinel
//! - [`Error`] / [`Result`] -- error handling

pub mod control;
pub mod error;
pub mod helpers;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use helpers::{escape_bytes, format_pressure, hex_dump};
pub use transport::Transport;
pub use types::*;
