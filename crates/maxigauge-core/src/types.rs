//! Core types used throughout the Maxigauge driver.
//!
//! A controller has six sensor channels. Channels are addressed by their
//! 1-based number on the wire (`PR1`..`PR6`) and by position in the
//! enable/disable mask (`SEN,m1,...,m6`).

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::helpers::format_pressure;

/// Number of sensor channels on the controller.
pub const CHANNEL_COUNT: usize = 6;

/// A validated sensor channel number in `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel(u8);

impl Channel {
    /// Validate a 1-based channel number.
    ///
    /// Returns [`Error::ChannelOutOfRange`] for anything outside `1..=6`.
    pub fn new(number: u8) -> Result<Self> {
        if (1..=CHANNEL_COUNT as u8).contains(&number) {
            Ok(Channel(number))
        } else {
            Err(Error::ChannelOutOfRange(number))
        }
    }

    /// All six channels in ascending order.
    pub fn all() -> impl Iterator<Item = Channel> {
        (1..=CHANNEL_COUNT as u8).map(Channel)
    }

    /// The 1-based channel number used in commands.
    pub fn number(&self) -> u8 {
        self.0
    }

    /// The 0-based position of this channel in a [`ChannelMask`].
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a `SEN` command does to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SensorAction {
    /// Leave the channel as it is.
    NoChange = 0,
    /// Switch the sensor off.
    Disable = 1,
    /// Switch the sensor on.
    Enable = 2,
}

impl SensorAction {
    /// The mask digit for this action.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Per-channel payload of the `SEN` command.
///
/// Each slot holds a [`SensorAction`] code. Codes above 2 are reserved by
/// the controller; they are stored and rendered unchanged so that a mask
/// parsed from user input reaches the wire exactly as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelMask([u8; CHANNEL_COUNT]);

impl ChannelMask {
    /// A mask that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mask that applies `action` to `channel` and leaves the rest alone.
    pub fn single(channel: Channel, action: SensorAction) -> Self {
        Self::new().with(channel, action)
    }

    /// Return a copy of this mask with `channel` set to `action`.
    pub fn with(mut self, channel: Channel, action: SensorAction) -> Self {
        self.0[channel.index()] = action.code();
        self
    }

    /// Wrap raw mask codes, including reserved values.
    pub fn from_raw(codes: [u8; CHANNEL_COUNT]) -> Self {
        ChannelMask(codes)
    }

    /// The raw mask codes.
    pub fn as_raw(&self) -> &[u8; CHANNEL_COUNT] {
        &self.0
    }
}

impl fmt::Display for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{code}")?;
        }
        Ok(())
    }
}

/// Error returned when a string cannot be parsed into a [`ChannelMask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChannelMaskError(String);

impl fmt::Display for ParseChannelMaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid channel mask '{}': expected {CHANNEL_COUNT} comma-separated codes",
            self.0
        )
    }
}

impl std::error::Error for ParseChannelMaskError {}

impl FromStr for ChannelMask {
    type Err = ParseChannelMaskError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let err = || ParseChannelMaskError(s.to_string());
        let mut codes = [0u8; CHANNEL_COUNT];
        let mut fields = s.split(',');
        for slot in codes.iter_mut() {
            let field = fields.next().ok_or_else(err)?;
            *slot = field.trim().parse().map_err(|_| err())?;
        }
        if fields.next().is_some() {
            return Err(err());
        }
        Ok(ChannelMask(codes))
    }
}

/// One pressure reading from a sensor channel.
///
/// `Invalid` is an ordinary outcome: a switched-off, missing or faulted
/// sensor does not produce a parsable reply, and a polling loop should keep
/// going when it sees one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// A finite pressure in the unit configured on the controller.
    Value(f64),
    /// No usable value could be decoded.
    Invalid,
}

impl Reading {
    /// Wrap a decoded number. Non-finite values become [`Reading::Invalid`].
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Reading::Value(value)
        } else {
            Reading::Invalid
        }
    }

    /// The pressure, or `f64::NAN` for an invalid reading.
    pub fn as_f64(&self) -> f64 {
        match self {
            Reading::Value(v) => *v,
            Reading::Invalid => f64::NAN,
        }
    }

    /// The pressure, if one was decoded.
    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(*v),
            Reading::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Reading::Value(_))
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_pressure(self.as_f64()))
    }
}

impl From<Reading> for f64 {
    fn from(reading: Reading) -> f64 {
        reading.as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(n: u8) -> Channel {
        Channel::new(n).unwrap()
    }

    #[test]
    fn channel_accepts_one_through_six() {
        for n in 1..=6 {
            let c = Channel::new(n).unwrap();
            assert_eq!(c.number(), n);
            assert_eq!(c.index(), (n - 1) as usize);
        }
    }

    #[test]
    fn channel_rejects_out_of_range() {
        assert!(matches!(Channel::new(0), Err(Error::ChannelOutOfRange(0))));
        assert!(matches!(Channel::new(7), Err(Error::ChannelOutOfRange(7))));
        assert!(matches!(
            Channel::new(255),
            Err(Error::ChannelOutOfRange(255))
        ));
    }

    #[test]
    fn channel_all_is_ordered() {
        let numbers: Vec<u8> = Channel::all().map(|c| c.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn mask_enable_single_channel() {
        let mask = ChannelMask::single(ch(4), SensorAction::Enable);
        assert_eq!(mask.as_raw(), &[0, 0, 0, 2, 0, 0]);
        assert_eq!(mask.to_string(), "0,0,0,2,0,0");
    }

    #[test]
    fn mask_disable_single_channel() {
        let mask = ChannelMask::single(ch(1), SensorAction::Disable);
        assert_eq!(mask.to_string(), "1,0,0,0,0,0");
    }

    #[test]
    fn mask_edges() {
        assert_eq!(
            ChannelMask::single(ch(6), SensorAction::Enable).to_string(),
            "0,0,0,0,0,2"
        );
        assert_eq!(ChannelMask::new().to_string(), "0,0,0,0,0,0");
    }

    #[test]
    fn mask_with_combines_channels() {
        let mask = ChannelMask::new()
            .with(ch(2), SensorAction::Enable)
            .with(ch(5), SensorAction::Disable);
        assert_eq!(mask.to_string(), "0,2,0,0,1,0");
    }

    #[test]
    fn mask_reserved_codes_round_trip() {
        let mask: ChannelMask = "0,3,0,9,0,0".parse().unwrap();
        assert_eq!(mask.as_raw(), &[0, 3, 0, 9, 0, 0]);
        assert_eq!(mask.to_string(), "0,3,0,9,0,0");
        assert_eq!(ChannelMask::from_raw([7, 0, 0, 0, 0, 1]).to_string(), "7,0,0,0,0,1");
    }

    #[test]
    fn mask_parse_rejects_wrong_length() {
        assert!("0,0,0,0,0".parse::<ChannelMask>().is_err());
        assert!("0,0,0,0,0,0,0".parse::<ChannelMask>().is_err());
        assert!("".parse::<ChannelMask>().is_err());
    }

    #[test]
    fn mask_parse_rejects_non_numeric() {
        let err = "0,x,0,0,0,0".parse::<ChannelMask>().unwrap_err();
        assert!(err.to_string().contains("0,x,0,0,0,0"));
        assert!("0,-1,0,0,0,0".parse::<ChannelMask>().is_err());
    }

    #[test]
    fn reading_value_and_sentinel() {
        let r = Reading::Value(1.234e-5);
        assert!(r.is_valid());
        assert_eq!(r.value(), Some(1.234e-5));
        assert_eq!(r.as_f64(), 1.234e-5);

        let r = Reading::Invalid;
        assert!(!r.is_valid());
        assert_eq!(r.value(), None);
        assert!(r.as_f64().is_nan());
    }

    #[test]
    fn reading_from_non_finite_is_invalid() {
        assert_eq!(Reading::from_f64(f64::NAN), Reading::Invalid);
        assert_eq!(Reading::from_f64(f64::INFINITY), Reading::Invalid);
        assert_eq!(Reading::from_f64(2.0), Reading::Value(2.0));
    }

    #[test]
    fn reading_display() {
        assert_eq!(Reading::Value(1.234e-5).to_string(), "1.234e-05");
        assert_eq!(Reading::Invalid.to_string(), "     nan");
    }

    #[test]
    fn reading_into_f64() {
        let v: f64 = Reading::Value(3.5).into();
        assert_eq!(v, 3.5);
        let v: f64 = Reading::Invalid.into();
        assert!(v.is_nan());
    }
}
