//! The simulated device and its builder.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use sdrio_core::device::Device;
use sdrio_core::error::{Error, Result};
use sdrio_core::log::{LogLevel, LogObserver, TracingLog};
use sdrio_core::stream::{RxStream, StatusEvent, TxStream};
use sdrio_core::types::{ChannelInfo, DeviceArgs, DeviceInfo, Direction, Range, SampleFormat};
use sdrio_core::StreamFlags;

use crate::clock::SimClock;
use crate::stream::{SimRxStream, SimTxStream, StatusStep, TxStep, WriteCall};

/// The canonical descriptor the simulated backend answers enumeration with.
fn descriptor() -> DeviceArgs {
    let mut args = DeviceArgs::new();
    args.set("driver", "sim")
        .set("label", "sdrio simulated device")
        .set("serial", "0001");
    args
}

/// Enumerate simulated devices matching `filter`.
///
/// The backend presents exactly one device; it is returned when its
/// descriptor satisfies the filter (every filter key present with an equal
/// value). An empty filter matches.
pub fn enumerate(filter: &DeviceArgs) -> Vec<DeviceArgs> {
    let descriptor = descriptor();
    if descriptor.matches(filter) {
        vec![descriptor]
    } else {
        Vec::new()
    }
}

/// Open the simulated device matching `args`, with default configuration.
///
/// Returns [`Error::NoDevice`] when the filter matches nothing, mirroring
/// the enumerate-then-make flow applications use.
pub fn open(args: &DeviceArgs) -> Result<SimDevice> {
    if enumerate(args).is_empty() {
        return Err(Error::NoDevice(args.to_string()));
    }
    Ok(SimDevice::builder().build())
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Per-channel RF settings.
#[derive(Debug, Clone)]
pub(crate) struct ChannelState {
    pub(crate) frequency: f64,
    pub(crate) sample_rate: f64,
    pub(crate) gain: f64,
    pub(crate) antenna: String,
}

/// Mutable device state, shared between the device and its streams.
pub(crate) struct State {
    pub(crate) master_clock_rate: f64,
    pub(crate) channels: HashMap<(Direction, usize), ChannelState>,
    pub(crate) clock: SimClock,
    pub(crate) tx_steps: std::collections::VecDeque<TxStep>,
    pub(crate) status: std::collections::VecDeque<StatusStep>,
    pub(crate) write_log: Vec<WriteCall>,
    pub(crate) poll_count: u32,
}

pub(crate) struct Shared {
    state: Mutex<State>,
    pub(crate) log: Arc<dyn LogObserver>,
    pub(crate) mtu: usize,
}

impl Shared {
    /// Lock the device state. A poisoned lock only means a holder panicked
    /// mid-update; the inner state is still served.
    pub(crate) fn locked(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Fluent builder for [`SimDevice`].
///
/// All configuration has defaults that model a small single-channel
/// transceiver, so the simplest usage is `SimDevice::builder().build()`.
/// Scripting methods ([`tx_step`](SimDeviceBuilder::tx_step),
/// [`status_event`](SimDeviceBuilder::status_event)) pre-load per-call
/// behavior for deterministic tests.
pub struct SimDeviceBuilder {
    attributes: DeviceArgs,
    num_rx: usize,
    num_tx: usize,
    mtu: usize,
    log: Option<Arc<dyn LogObserver>>,
    tx_steps: Vec<TxStep>,
    status: Vec<StatusStep>,
}

impl SimDeviceBuilder {
    fn new() -> Self {
        SimDeviceBuilder {
            attributes: descriptor(),
            num_rx: 1,
            num_tx: 1,
            mtu: 8192,
            log: None,
            tx_steps: Vec::new(),
            status: Vec::new(),
        }
    }

    /// Set or replace a hardware attribute in the device descriptor.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// Number of receive channels (default 1).
    pub fn rx_channels(mut self, n: usize) -> Self {
        self.num_rx = n;
        self
    }

    /// Number of transmit channels (default 1).
    pub fn tx_channels(mut self, n: usize) -> Self {
        self.num_tx = n;
        self
    }

    /// Maximum samples per partial transfer (default 8192, minimum 1).
    pub fn mtu(mut self, samples: usize) -> Self {
        self.mtu = samples.max(1);
        self
    }

    /// Inject the log observer the device reports through.
    ///
    /// Defaults to [`TracingLog`], which forwards into `tracing`.
    pub fn log_observer(mut self, observer: Arc<dyn LogObserver>) -> Self {
        self.log = Some(observer);
        self
    }

    /// Append one scripted transmit step.
    ///
    /// Each `write_partial` call consumes one step; when the script runs
    /// out, the device accepts up to the MTU per call.
    pub fn tx_step(mut self, step: TxStep) -> Self {
        self.tx_steps.push(step);
        self
    }

    /// Append a sequence of scripted transmit steps.
    pub fn tx_steps(mut self, steps: impl IntoIterator<Item = TxStep>) -> Self {
        self.tx_steps.extend(steps);
        self
    }

    /// Pre-queue a status event for `poll_status` to return.
    pub fn status_event(mut self, flags: StreamFlags, time_ns: i64) -> Self {
        self.status.push(StatusStep::Event(StatusEvent { flags, time_ns }));
        self
    }

    /// Pre-queue a fatal status failure for `poll_status` to return.
    pub fn status_failure(mut self, code: i32) -> Self {
        self.status.push(StatusStep::Fail(code));
        self
    }

    /// Construct the device.
    pub fn build(self) -> SimDevice {
        let template = ChannelInfo {
            antennas: vec!["BAND1".into(), "BAND2".into()],
            gain_range: Range::new(0.0, 64.0),
            frequency_range: Range::new(100.0e3, 3.8e9),
            sample_rates: vec![125.0e3, 250.0e3, 625.0e3, 1.25e6, 2.5e6, 5.0e6, 10.0e6],
        };

        let mut channels = HashMap::new();
        let default_channel = ChannelState {
            frequency: 100.0e6,
            sample_rate: 625.0e3,
            gain: 0.0,
            antenna: "BAND1".into(),
        };
        for ch in 0..self.num_rx {
            channels.insert((Direction::Rx, ch), default_channel.clone());
        }
        for ch in 0..self.num_tx {
            channels.insert((Direction::Tx, ch), default_channel.clone());
        }

        let info = DeviceInfo {
            driver: "sim".into(),
            label: self
                .attributes
                .get("label")
                .unwrap_or("sdrio simulated device")
                .to_string(),
            attributes: self.attributes,
        };

        SimDevice {
            info,
            num_rx: self.num_rx,
            num_tx: self.num_tx,
            channel_template: template,
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    master_clock_rate: 32.0e6,
                    channels,
                    clock: SimClock::new(),
                    tx_steps: self.tx_steps.into(),
                    status: self.status.into(),
                    write_log: Vec::new(),
                    poll_count: 0,
                }),
                log: self.log.unwrap_or_else(|| Arc::new(TracingLog)),
                mtu: self.mtu,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// SimDevice
// ---------------------------------------------------------------------------

/// A simulated SDR device session.
///
/// Implements the full [`Device`] trait against in-memory state. Streams
/// opened from it share the device-wide hardware clock and the scripted
/// transfer/status queues configured on the builder.
pub struct SimDevice {
    info: DeviceInfo,
    num_rx: usize,
    num_tx: usize,
    channel_template: ChannelInfo,
    shared: Arc<Shared>,
}

impl SimDevice {
    /// Start building a simulated device.
    pub fn builder() -> SimDeviceBuilder {
        SimDeviceBuilder::new()
    }

    /// Every `write_partial` call any transmit stream has received, in
    /// order: requested length, accepted length, flags, and timestamp.
    pub fn tx_write_log(&self) -> Vec<WriteCall> {
        self.shared.locked().write_log.clone()
    }

    /// Number of `poll_status` calls streams have received.
    pub fn poll_count(&self) -> u32 {
        self.shared.locked().poll_count
    }

    fn channel_state<'a>(
        state: &'a mut State,
        direction: Direction,
        channel: usize,
    ) -> Result<&'a mut ChannelState> {
        state
            .channels
            .get_mut(&(direction, channel))
            .ok_or_else(|| Error::InvalidParameter(format!("no {direction} channel {channel}")))
    }
}

#[async_trait]
impl Device for SimDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn num_channels(&self, direction: Direction) -> usize {
        match direction {
            Direction::Rx => self.num_rx,
            Direction::Tx => self.num_tx,
        }
    }

    fn channel_info(&self, direction: Direction, channel: usize) -> Result<ChannelInfo> {
        if channel >= self.num_channels(direction) {
            return Err(Error::InvalidParameter(format!(
                "no {direction} channel {channel}"
            )));
        }
        Ok(self.channel_template.clone())
    }

    async fn set_master_clock_rate(&self, rate_hz: f64) -> Result<()> {
        if rate_hz <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "master clock rate must be positive, got {rate_hz}"
            )));
        }
        self.shared.locked().master_clock_rate = rate_hz;
        self.shared
            .log
            .log(LogLevel::Debug, &format!("master clock rate set to {rate_hz} Hz"));
        Ok(())
    }

    async fn master_clock_rate(&self) -> Result<f64> {
        Ok(self.shared.locked().master_clock_rate)
    }

    async fn set_frequency(
        &self,
        direction: Direction,
        channel: usize,
        freq_hz: f64,
    ) -> Result<()> {
        if !self.channel_template.frequency_range.contains(freq_hz) {
            return Err(Error::InvalidParameter(format!(
                "frequency {freq_hz} Hz outside {}",
                self.channel_template.frequency_range
            )));
        }
        let mut state = self.shared.locked();
        Self::channel_state(&mut state, direction, channel)?.frequency = freq_hz;
        Ok(())
    }

    async fn frequency(&self, direction: Direction, channel: usize) -> Result<f64> {
        let mut state = self.shared.locked();
        Ok(Self::channel_state(&mut state, direction, channel)?.frequency)
    }

    async fn set_sample_rate(
        &self,
        direction: Direction,
        channel: usize,
        rate: f64,
    ) -> Result<()> {
        if rate <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "sample rate must be positive, got {rate}"
            )));
        }
        let mut state = self.shared.locked();
        Self::channel_state(&mut state, direction, channel)?.sample_rate = rate;
        Ok(())
    }

    async fn sample_rate(&self, direction: Direction, channel: usize) -> Result<f64> {
        let mut state = self.shared.locked();
        Ok(Self::channel_state(&mut state, direction, channel)?.sample_rate)
    }

    async fn set_gain(&self, direction: Direction, channel: usize, gain_db: f64) -> Result<()> {
        if !self.channel_template.gain_range.contains(gain_db) {
            return Err(Error::InvalidParameter(format!(
                "gain {gain_db} dB outside {}",
                self.channel_template.gain_range
            )));
        }
        let mut state = self.shared.locked();
        Self::channel_state(&mut state, direction, channel)?.gain = gain_db;
        Ok(())
    }

    async fn gain(&self, direction: Direction, channel: usize) -> Result<f64> {
        let mut state = self.shared.locked();
        Ok(Self::channel_state(&mut state, direction, channel)?.gain)
    }

    async fn set_antenna(&self, direction: Direction, channel: usize, name: &str) -> Result<()> {
        if !self.channel_template.antennas.iter().any(|a| a == name) {
            return Err(Error::InvalidParameter(format!("unknown antenna '{name}'")));
        }
        let mut state = self.shared.locked();
        Self::channel_state(&mut state, direction, channel)?.antenna = name.to_string();
        Ok(())
    }

    async fn antenna(&self, direction: Direction, channel: usize) -> Result<String> {
        let mut state = self.shared.locked();
        Ok(Self::channel_state(&mut state, direction, channel)?.antenna.clone())
    }

    async fn hardware_time(&self) -> Result<i64> {
        Ok(self.shared.locked().clock.now_ns())
    }

    async fn set_hardware_time(&self, ns: i64) -> Result<()> {
        self.shared.locked().clock.set_ns(ns);
        self.shared
            .log
            .log(LogLevel::Info, &format!("hardware time set to {ns} ns"));
        Ok(())
    }

    async fn open_rx_stream(
        &self,
        format: SampleFormat,
        channels: &[usize],
    ) -> Result<Box<dyn RxStream>> {
        self.validate_stream_channels(Direction::Rx, channels)?;
        self.shared.log.log(
            LogLevel::Info,
            &format!("opened RX stream ({format}) on channels {channels:?}"),
        );
        Ok(Box::new(SimRxStream::new(
            Arc::clone(&self.shared),
            format,
            channels.to_vec(),
        )))
    }

    async fn open_tx_stream(
        &self,
        format: SampleFormat,
        channels: &[usize],
    ) -> Result<Box<dyn TxStream>> {
        self.validate_stream_channels(Direction::Tx, channels)?;
        self.shared.log.log(
            LogLevel::Info,
            &format!("opened TX stream ({format}) on channels {channels:?}"),
        );
        Ok(Box::new(SimTxStream::new(
            Arc::clone(&self.shared),
            format,
            channels.to_vec(),
        )))
    }
}

impl SimDevice {
    fn validate_stream_channels(&self, direction: Direction, channels: &[usize]) -> Result<()> {
        if channels.len() != 1 {
            return Err(Error::Unsupported(
                "sim backend streams a single channel".into(),
            ));
        }
        if channels[0] >= self.num_channels(direction) {
            return Err(Error::InvalidParameter(format!(
                "no {direction} channel {}",
                channels[0]
            )));
        }
        Ok(())
    }
}
