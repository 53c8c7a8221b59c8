//! The `Device` trait -- unified interface for SDR device backends.
//!
//! Applications program against `dyn Device` without knowing which backend
//! is in use. A backend provides RF configuration, the hardware clock, and
//! stream construction; the streaming engine in `sdrio-engine` then drives
//! the streams.

use async_trait::async_trait;

use crate::error::Result;
use crate::stream::{RxStream, TxStream};
use crate::types::{ChannelInfo, DeviceInfo, Direction, SampleFormat};

/// Unified asynchronous interface to an SDR device session.
///
/// Configuration methods take `&self`; backends serialize access to their
/// own state internally. Stream handles returned by the `open_*_stream`
/// methods are exclusively owned by the caller and must not outlive the
/// device session they came from.
#[async_trait]
pub trait Device: Send + Sync {
    /// Static information about the device (driver, label, attributes).
    fn info(&self) -> &DeviceInfo;

    /// Number of stream channels available in the given direction.
    fn num_channels(&self, direction: Direction) -> usize;

    /// Static information about one channel: antennas, gain range,
    /// frequency range, supported sample rates.
    fn channel_info(&self, direction: Direction, channel: usize) -> Result<ChannelInfo>;

    /// Set the master clock rate in Hz. Backends may coerce the value to
    /// the nearest rate the hardware supports.
    async fn set_master_clock_rate(&self, rate_hz: f64) -> Result<()>;

    /// The current master clock rate in Hz.
    async fn master_clock_rate(&self) -> Result<f64>;

    /// Tune a channel's RF center frequency in Hz.
    async fn set_frequency(&self, direction: Direction, channel: usize, freq_hz: f64)
        -> Result<()>;

    /// A channel's current RF center frequency in Hz.
    async fn frequency(&self, direction: Direction, channel: usize) -> Result<f64>;

    /// Set a channel's baseband sample rate in samples/second.
    async fn set_sample_rate(&self, direction: Direction, channel: usize, rate: f64)
        -> Result<()>;

    /// A channel's current baseband sample rate in samples/second.
    async fn sample_rate(&self, direction: Direction, channel: usize) -> Result<f64>;

    /// Set a channel's overall gain in dB.
    async fn set_gain(&self, direction: Direction, channel: usize, gain_db: f64) -> Result<()>;

    /// A channel's current overall gain in dB.
    async fn gain(&self, direction: Direction, channel: usize) -> Result<f64>;

    /// Select a channel's antenna port by name.
    async fn set_antenna(&self, direction: Direction, channel: usize, name: &str) -> Result<()>;

    /// A channel's currently selected antenna port.
    async fn antenna(&self, direction: Direction, channel: usize) -> Result<String>;

    /// Read the hardware clock in nanoseconds.
    ///
    /// The counter is monotonic non-decreasing *while at least one receive
    /// stream is active*; with no active receive stream it freezes (a
    /// vendor constraint this layer documents but does not detect -- a
    /// frozen value is indistinguishable from a quiet clock). Reads are
    /// eventually-consistent snapshots of a device-wide counter.
    async fn hardware_time(&self) -> Result<i64>;

    /// Set the hardware clock to a known value in nanoseconds.
    ///
    /// Typically called once at session start with 0. The same receive-path
    /// precondition as [`hardware_time`](Device::hardware_time) applies: the
    /// clock will not advance from the new value until a receive stream is
    /// active.
    async fn set_hardware_time(&self, ns: i64) -> Result<()>;

    /// Open a receive stream on the given channels.
    async fn open_rx_stream(
        &self,
        format: SampleFormat,
        channels: &[usize],
    ) -> Result<Box<dyn RxStream>>;

    /// Open a transmit stream on the given channels.
    async fn open_tx_stream(
        &self,
        format: SampleFormat,
        channels: &[usize],
    ) -> Result<Box<dyn TxStream>>;
}
