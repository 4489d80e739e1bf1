//! maxigauge-test-harness: mock transport for the Maxigauge driver.
//!
//! [`MockTransport`] lets the handshake engine be tested deterministically
//! without a controller on the serial line.

pub mod mock_serial;

pub use mock_serial::MockTransport;
