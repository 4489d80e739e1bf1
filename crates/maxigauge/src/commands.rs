//! Maxigauge command builders and reply parsers.
//!
//! All functions are pure: they build command text or decode reply text
//! without doing any I/O. The handshake (CR framing, ACK, ENQ) is added by
//! the IO task.
//!
//! # Command reference
//!
//! | Command | Meaning | Reply payload |
//! |---|---|---|
//! | `PR{n}` | read pressure of channel `n` | `status,pressure` |
//! | `SEN,{m1..m6}` | switch sensors on/off per mask | not inspected |

use maxigauge_core::{Channel, ChannelMask, Reading, SensorAction};

/// Build a "read pressure" command (`PR{n}`).
pub fn cmd_read_pressure(channel: Channel) -> String {
    format!("PR{}", channel.number())
}

/// Build a "sensor on/off" command (`SEN,{mask}`).
pub fn cmd_sensor_mask(mask: &ChannelMask) -> String {
    format!("SEN,{mask}")
}

/// Build the `SEN` command that switches a single channel on or off and
/// leaves the other five unchanged.
///
/// # Example
///
/// ```
/// use maxigauge::commands::cmd_set_channel_enabled;
/// use maxigauge_core::Channel;
///
/// let ch4 = Channel::new(4).unwrap();
/// assert_eq!(cmd_set_channel_enabled(ch4, true), "SEN,0,0,0,2,0,0");
/// assert_eq!(cmd_set_channel_enabled(ch4, false), "SEN,0,0,0,1,0,0");
/// ```
pub fn cmd_set_channel_enabled(channel: Channel, enabled: bool) -> String {
    let action = if enabled {
        SensorAction::Enable
    } else {
        SensorAction::Disable
    };
    cmd_sensor_mask(&ChannelMask::single(channel, action))
}

/// The two fields of a `PR{n}` reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureReply<'a> {
    /// Raw status token as sent by the controller.
    pub status: &'a str,
    pub pressure: f64,
}

/// Split a `PR{n}` reply into its status token and pressure.
///
/// The reply must contain exactly two comma-separated fields and the second
/// must parse as a floating-point number (surrounding whitespace allowed).
/// Returns `None` otherwise.
pub fn parse_pressure_reply(reply: &str) -> Option<PressureReply<'_>> {
    let (status, pressure) = reply.split_once(',')?;
    if pressure.contains(',') {
        return None;
    }
    let pressure = pressure.trim().parse::<f64>().ok()?;
    Some(PressureReply { status, pressure })
}

/// Decode a `PR{n}` reply into a [`Reading`].
///
/// Never fails: an empty, malformed or non-numeric reply is
/// [`Reading::Invalid`], which is what a switched-off or missing sensor
/// produces.
///
/// # Example
///
/// ```
/// use maxigauge::commands::decode_reading;
/// use maxigauge_core::Reading;
///
/// assert_eq!(decode_reading("0,1.234e-05"), Reading::Value(1.234e-05));
/// assert_eq!(decode_reading(""), Reading::Invalid);
/// ```
pub fn decode_reading(reply: &str) -> Reading {
    match parse_pressure_reply(reply) {
        Some(parsed) => Reading::from_f64(parsed.pressure),
        None => Reading::Invalid,
    }
}
