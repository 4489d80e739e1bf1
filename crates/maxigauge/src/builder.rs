//! MaxigaugeBuilder -- fluent builder for constructing [`Maxigauge`] instances.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters and the reply timeout before the transport is
//! opened.
//!
//! # Example
//!
//! ```no_run
//! use maxigauge::builder::MaxigaugeBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> maxigauge_core::Result<()> {
//! let gauge = MaxigaugeBuilder::new()
//!     .serial_port("ASRL/dev/ttyUSB0::INSTR")
//!     .baud_rate(38_400)
//!     .command_timeout(Duration::from_millis(500))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use maxigauge_core::error::{Error, Result};
use maxigauge_core::transport::Transport;
use maxigauge_transport::{SerialConfig, SerialTransport};

use crate::gauge::Maxigauge;
use crate::io::IoConfig;

/// Fluent builder for [`Maxigauge`].
pub struct MaxigaugeBuilder {
    serial_port: Option<String>,
    serial_config: SerialConfig,
    command_timeout: Duration,
}

impl Default for MaxigaugeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MaxigaugeBuilder {
    /// Create a builder with the controller defaults (9600 8N1, 1 s timeout).
    pub fn new() -> Self {
        MaxigaugeBuilder {
            serial_port: None,
            serial_config: SerialConfig::default(),
            command_timeout: IoConfig::default().command_timeout,
        }
    }

    /// Set the serial port: a device path (`/dev/ttyS0`, `COM3`) or a VISA
    /// serial resource (`ASRL/dev/ttyS0::INSTR`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the baud rate.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.serial_config.baud_rate = baud;
        self
    }

    /// Replace the whole line configuration.
    pub fn serial_config(mut self, config: SerialConfig) -> Self {
        self.serial_config = config;
        self
    }

    /// Set how long to wait for each reply line.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    fn io_config(&self) -> Result<IoConfig> {
        if self.command_timeout.is_zero() {
            return Err(Error::InvalidParameter(
                "command_timeout must be greater than zero".into(),
            ));
        }
        Ok(IoConfig {
            command_timeout: self.command_timeout,
        })
    }

    /// Build a [`Maxigauge`] with a caller-provided transport.
    ///
    /// This is the entry point for tests (pass a `MockTransport` from
    /// `maxigauge-test-harness`) and for links other than a local serial
    /// port.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<Maxigauge> {
        let config = self.io_config()?;
        Ok(Maxigauge::new(transport, config, None))
    }

    /// Build a [`Maxigauge`] on a serial port.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    pub async fn build(self) -> Result<Maxigauge> {
        let port = self
            .serial_port
            .as_deref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;
        let config = self.io_config()?;

        let transport = SerialTransport::open_with_config(port, self.serial_config.clone()).await?;
        let port_name = transport.port_name().to_string();
        Ok(Maxigauge::new(Box::new(transport), config, Some(port_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maxigauge_test_harness::MockTransport;

    #[test]
    fn builder_defaults() {
        let builder = MaxigaugeBuilder::new();
        assert!(builder.serial_port.is_none());
        assert_eq!(builder.serial_config.baud_rate, 9600);
        assert_eq!(builder.command_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn builder_fluent_chain() {
        let builder = MaxigaugeBuilder::new()
            .serial_port("/dev/ttyUSB0")
            .baud_rate(19_200)
            .command_timeout(Duration::from_millis(300));

        assert_eq!(builder.serial_port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(builder.serial_config.baud_rate, 19_200);
        assert_eq!(builder.command_timeout, Duration::from_millis(300));
    }

    #[test]
    fn serial_config_replaces_baud() {
        let builder = MaxigaugeBuilder::new().baud_rate(38_400).serial_config(SerialConfig {
            baud_rate: 9600,
            ..Default::default()
        });
        assert_eq!(builder.serial_config.baud_rate, 9600);
    }

    #[tokio::test]
    async fn builder_with_transport_is_connected() {
        let gauge = MaxigaugeBuilder::new()
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();
        assert!(gauge.is_connected().await);
    }

    #[tokio::test]
    async fn builder_serial_port_required_for_build() {
        let result = MaxigaugeBuilder::new().build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_rejects_zero_timeout() {
        let result = MaxigaugeBuilder::new()
            .command_timeout(Duration::ZERO)
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_missing_device_is_transport_error() {
        let result = MaxigaugeBuilder::new()
            .serial_port("/dev/maxigauge-does-not-exist")
            .build()
            .await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
