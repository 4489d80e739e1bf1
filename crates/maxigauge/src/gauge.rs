//! Maxigauge -- driver for a six-channel Pfeiffer Maxigauge controller.
//!
//! Ties the command builders in [`commands`] to the IO task in [`io`].
//! The driver is either open (an IO task owns the transport) or closed;
//! every operation on a closed driver fails with [`Error::NotConnected`].

use tokio::sync::RwLock;
use tracing::{debug, info};

use maxigauge_core::error::{Error, Result};
use maxigauge_core::transport::Transport;
use maxigauge_core::{CHANNEL_COUNT, Channel, ChannelMask, Reading};

use crate::builder::MaxigaugeBuilder;
use crate::commands;
use crate::io::{self, GaugeIo, IoConfig};
use crate::protocol::Reply;

/// A connected Maxigauge controller.
///
/// Constructed via [`MaxigaugeBuilder`] or [`Maxigauge::connect`]. All
/// methods take `&self`; concurrent calls are queued by the IO task and run
/// one complete exchange at a time.
pub struct Maxigauge {
    io: RwLock<Option<GaugeIo>>,
    port_name: Option<String>,
}

impl Maxigauge {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        config: IoConfig,
        port_name: Option<String>,
    ) -> Self {
        Maxigauge {
            io: RwLock::new(Some(io::spawn_io_task(transport, config))),
            port_name,
        }
    }

    /// Open the serial port `resource` with default settings (9600 8N1,
    /// one second timeout).
    ///
    /// `resource` is a device path such as `/dev/ttyS0` or a VISA serial
    /// resource such as `ASRL/dev/ttyS0::INSTR`.
    ///
    /// ```no_run
    /// # async fn example() -> maxigauge_core::Result<()> {
    /// let gauge = maxigauge::Maxigauge::connect("/dev/ttyS0").await?;
    /// let reading = gauge.read_sensor(1).await?;
    /// println!("channel 1: {reading}");
    /// gauge.close().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(resource: &str) -> Result<Self> {
        MaxigaugeBuilder::new().serial_port(resource).build().await
    }

    /// The serial port this driver was opened on, if it was opened by name.
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Whether the driver is open.
    pub async fn is_connected(&self) -> bool {
        self.io.read().await.is_some()
    }

    /// Send `command` and return the payload fetched after the ACK.
    ///
    /// A NAK or an unrecognised first reply yields an empty string; the
    /// cause is logged. Only transport failures and a closed driver are
    /// errors.
    pub async fn query(&self, command: &str) -> Result<String> {
        Ok(self.query_reply(command).await?.into_text())
    }

    /// Like [`query`](Self::query), but reports whether the controller
    /// answered, rejected the command, or sent something unrecognisable.
    pub async fn query_reply(&self, command: &str) -> Result<Reply> {
        let guard = self.io.read().await;
        let io = guard.as_ref().ok_or(Error::NotConnected)?;
        io.query(command.to_string()).await
    }

    /// Read the pressure on `channel` (1-6).
    ///
    /// A sensor that is off, missing or faulted gives
    /// [`Reading::Invalid`], not an error.
    pub async fn read_sensor(&self, channel: u8) -> Result<Reading> {
        let channel = Channel::new(channel)?;
        self.read_channel(channel).await
    }

    /// Read all six channels in order, one exchange each.
    pub async fn read_all(&self) -> Result<[Reading; CHANNEL_COUNT]> {
        let mut readings = [Reading::Invalid; CHANNEL_COUNT];
        for channel in Channel::all() {
            readings[channel.index()] = self.read_channel(channel).await?;
        }
        Ok(readings)
    }

    async fn read_channel(&self, channel: Channel) -> Result<Reading> {
        let reply = self.query(&commands::cmd_read_pressure(channel)).await?;
        let reading = commands::decode_reading(&reply);
        debug!(channel = channel.number(), %reading, "pressure reading");
        Ok(reading)
    }

    /// Switch the sensor on `channel` (1-6) on or off, leaving the other
    /// channels unchanged.
    ///
    /// The controller's answer is not checked beyond the handshake; a NAK
    /// shows up in the log only.
    pub async fn set_channel_enabled(&self, channel: u8, enabled: bool) -> Result<()> {
        let channel = Channel::new(channel)?;
        self.query(&commands::cmd_set_channel_enabled(channel, enabled))
            .await?;
        Ok(())
    }

    /// Switch the sensor on `channel` on.
    pub async fn enable_sensor(&self, channel: u8) -> Result<()> {
        self.set_channel_enabled(channel, true).await
    }

    /// Switch the sensor on `channel` off.
    pub async fn disable_sensor(&self, channel: u8) -> Result<()> {
        self.set_channel_enabled(channel, false).await
    }

    /// Send an arbitrary `SEN` mask, e.g. to change several channels at once.
    pub async fn set_channel_mask(&self, mask: &ChannelMask) -> Result<()> {
        self.query(&commands::cmd_sensor_mask(mask)).await?;
        Ok(())
    }

    /// Stop the IO task and close the transport.
    ///
    /// Calling `close()` on a closed driver does nothing.
    pub async fn close(&self) -> Result<()> {
        let Some(io) = self.io.write().await.take() else {
            return Ok(());
        };
        let mut transport = io.shutdown().await?;
        transport.close().await?;
        info!(port = self.port_name.as_deref().unwrap_or("-"), "Maxigauge closed");
        Ok(())
    }
}

impl Drop for Maxigauge {
    fn drop(&mut self) {
        if let Some(io) = self.io.get_mut().as_ref() {
            debug!("Maxigauge dropped while open, stopping IO task");
            io.cancel();
        }
    }
}
