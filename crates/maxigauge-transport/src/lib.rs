//! Transport implementations for the Maxigauge driver.
//!
//! Provides [`SerialTransport`], the tokio-serial implementation of the
//! [`Transport`](maxigauge_core::Transport) trait from `maxigauge-core`,
//! along with its line configuration types.

pub mod serial;

pub use serial::{
    DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits, resolve_port_name,
};
