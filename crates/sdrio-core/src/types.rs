//! Core types used throughout sdrio.
//!
//! These types provide a vendor-agnostic abstraction layer over SDR device
//! backends: stream direction, sample formats, and the key/value argument
//! maps used for enumeration filters and device attributes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Direction of a stream relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Device to host (receive).
    Rx,
    /// Host to device (transmit).
    Tx,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rx => write!(f, "RX"),
            Direction::Tx => write!(f, "TX"),
        }
    }
}

/// Host-side sample format of a stream.
///
/// Samples cross the sdrio API boundary as `num_complex::Complex32`
/// regardless of the device's native format; this enum describes the format
/// requested when opening a stream, which backends may use to pick a wire
/// representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// Complex 32-bit IEEE 754 float pairs, range `[-1.0, 1.0]`.
    Cf32,
    /// Complex 16-bit signed integer pairs.
    Cs16,
}

impl SampleFormat {
    /// The conventional format marker string (e.g. `"CF32"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleFormat::Cf32 => "CF32",
            SampleFormat::Cs16 => "CS16",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string cannot be parsed into a [`SampleFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFormatError(String);

impl fmt::Display for ParseFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sample format: {}", self.0)
    }
}

impl std::error::Error for ParseFormatError {}

impl FromStr for SampleFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CF32" => Ok(SampleFormat::Cf32),
            "CS16" => Ok(SampleFormat::Cs16),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// An ordered key/value attribute map.
///
/// Serves double duty as the enumeration filter (`"driver=sim"`) and as the
/// device descriptor returned by enumeration. Parsed from and formatted to
/// the conventional comma-separated `key=value` form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceArgs(BTreeMap<String, String>);

impl DeviceArgs {
    /// Create an empty argument map.
    pub fn new() -> Self {
        DeviceArgs(BTreeMap::new())
    }

    /// Set a key, replacing any existing value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this map satisfies `filter`: every key in the filter is
    /// present here with an equal value. An empty filter matches everything.
    ///
    /// This is the matching rule enumeration uses to select devices.
    pub fn matches(&self, filter: &DeviceArgs) -> bool {
        filter
            .0
            .iter()
            .all(|(k, v)| self.0.get(k).is_some_and(|have| have == v))
    }
}

/// Error returned when an argument string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseArgsError(String);

impl fmt::Display for ParseArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed device args entry: '{}'", self.0)
    }
}

impl std::error::Error for ParseArgsError {}

impl FromStr for DeviceArgs {
    type Err = ParseArgsError;

    /// Parse `"driver=sim, serial=0001"`. Whitespace around keys, values,
    /// and separators is trimmed; empty entries are skipped; an entry with
    /// no `=` is an error.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut args = DeviceArgs::new();
        for entry in s.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| ParseArgsError(entry.to_string()))?;
            args.set(key.trim(), value.trim());
        }
        Ok(args)
    }
}

impl fmt::Display for DeviceArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
            first = false;
        }
        Ok(())
    }
}

/// A closed numeric range, used for gain and frequency limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Lower bound (inclusive).
    pub minimum: f64,
    /// Upper bound (inclusive).
    pub maximum: f64,
}

impl Range {
    /// Create a new range.
    pub fn new(minimum: f64, maximum: f64) -> Self {
        Range { minimum, maximum }
    }

    /// Check whether a value falls within this range (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && value <= self.maximum
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", Pretty(self.minimum), Pretty(self.maximum))
    }
}

// Integral values print without a trailing ".0".
struct Pretty(f64);

impl fmt::Display for Pretty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == self.0.trunc() && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Static information about a stream channel, as reported by the device.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    /// Antenna port names selectable on this channel.
    pub antennas: Vec<String>,
    /// Overall gain range in dB.
    pub gain_range: Range,
    /// Tunable RF frequency range in Hz.
    pub frequency_range: Range,
    /// Sample rates the channel supports, in samples/second.
    pub sample_rates: Vec<f64>,
}

/// Static information about an open device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Backend driver name (e.g. `"sim"`).
    pub driver: String,
    /// Human-readable device label.
    pub label: String,
    /// Hardware attribute map (serial number, firmware revision, ...).
    pub attributes: DeviceArgs,
}
