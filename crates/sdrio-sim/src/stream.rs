//! Simulated receive and transmit streams.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use sdrio_core::error::{Error, Result};
use sdrio_core::flags::StreamFlags;
use sdrio_core::log::LogLevel;
use sdrio_core::stream::{ReadChunk, RxStream, StatusEvent, TxStream};
use sdrio_core::types::SampleFormat;
use sdrio_core::Complex32;

use crate::device::Shared;

/// One scripted behavior for a transmit `write_partial` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStep {
    /// Accept up to this many samples (capped by the request and the MTU).
    Accept(usize),
    /// Report no progress: zero samples moved, no error.
    Busy,
    /// Fail with this device status code.
    Fail(i32),
}

/// Record of one `write_partial` call as the device saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteCall {
    /// Samples the caller offered.
    pub requested: usize,
    /// Samples the device accepted.
    pub accepted: usize,
    /// Flags attached to the call.
    pub flags: StreamFlags,
    /// Timestamp attached to the call, if any.
    pub at_ns: Option<i64>,
}

/// One scripted `poll_status` outcome.
#[derive(Debug, Clone, Copy)]
pub(crate) enum StatusStep {
    Event(StatusEvent),
    Fail(i32),
}

// ---------------------------------------------------------------------------
// Receive stream
// ---------------------------------------------------------------------------

/// Simulated receive stream.
///
/// Yields zeroed samples in chunks of at most one MTU. The first chunk
/// after activation carries `HAS_TIME` and the hardware clock value, the
/// way timestamped receive paths deliver their first buffer. While active,
/// it keeps the device-wide hardware clock running.
pub(crate) struct SimRxStream {
    shared: Arc<Shared>,
    format: SampleFormat,
    channels: Vec<usize>,
    active: bool,
    /// The next chunk is the first since activation and gets a timestamp.
    fresh: bool,
}

impl SimRxStream {
    pub(crate) fn new(shared: Arc<Shared>, format: SampleFormat, channels: Vec<usize>) -> Self {
        SimRxStream {
            shared,
            format,
            channels,
            active: false,
            fresh: false,
        }
    }
}

#[async_trait]
impl RxStream for SimRxStream {
    fn channels(&self) -> &[usize] {
        &self.channels
    }

    fn format(&self) -> SampleFormat {
        self.format
    }

    fn mtu(&self) -> usize {
        self.shared.mtu
    }

    async fn activate(
        &mut self,
        _flags: StreamFlags,
        _time_ns: Option<i64>,
        _num_elems: usize,
    ) -> Result<()> {
        if self.active {
            return Err(Error::InvalidParameter("stream already active".into()));
        }
        self.active = true;
        self.fresh = true;
        self.shared.locked().clock.rx_activated();
        self.shared
            .log
            .log(LogLevel::Info, "RX stream activated, hardware clock running");
        Ok(())
    }

    async fn deactivate(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.shared.locked().clock.rx_deactivated();
        self.shared.log.log(LogLevel::Info, "RX stream deactivated");
        Ok(())
    }

    async fn read_partial(
        &mut self,
        buf: &mut [Complex32],
        _timeout: Duration,
    ) -> Result<ReadChunk> {
        if !self.active {
            return Err(Error::NotActive);
        }

        let samples = buf.len().min(self.shared.mtu);
        buf[..samples].fill(Complex32::new(0.0, 0.0));

        let (flags, time_ns) = if self.fresh && samples > 0 {
            self.fresh = false;
            let now = self.shared.locked().clock.now_ns();
            (StreamFlags::HAS_TIME, Some(now))
        } else {
            (StreamFlags::NONE, None)
        };

        Ok(ReadChunk {
            samples,
            flags,
            time_ns,
        })
    }
}

impl Drop for SimRxStream {
    fn drop(&mut self) {
        // An active stream dropped without deactivate must still release
        // the clock, or it would run forever.
        if self.active {
            self.shared.locked().clock.rx_deactivated();
        }
    }
}

// ---------------------------------------------------------------------------
// Transmit stream
// ---------------------------------------------------------------------------

/// Simulated transmit stream.
///
/// Consumes one scripted [`TxStep`] per `write_partial` call, falling back
/// to accepting an MTU's worth once the script is exhausted. Fully
/// consuming a request that carries `END_BURST` queues the asynchronous
/// burst-completion status event; completion is never signaled by the
/// write call itself.
pub(crate) struct SimTxStream {
    shared: Arc<Shared>,
    format: SampleFormat,
    channels: Vec<usize>,
    active: bool,
}

impl SimTxStream {
    pub(crate) fn new(shared: Arc<Shared>, format: SampleFormat, channels: Vec<usize>) -> Self {
        SimTxStream {
            shared,
            format,
            channels,
            active: false,
        }
    }
}

#[async_trait]
impl TxStream for SimTxStream {
    fn channels(&self) -> &[usize] {
        &self.channels
    }

    fn format(&self) -> SampleFormat {
        self.format
    }

    fn mtu(&self) -> usize {
        self.shared.mtu
    }

    async fn activate(
        &mut self,
        _flags: StreamFlags,
        _time_ns: Option<i64>,
        _num_elems: usize,
    ) -> Result<()> {
        if self.active {
            return Err(Error::InvalidParameter("stream already active".into()));
        }
        self.active = true;
        self.shared.log.log(LogLevel::Info, "TX stream activated");
        Ok(())
    }

    async fn deactivate(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.shared.log.log(LogLevel::Info, "TX stream deactivated");
        Ok(())
    }

    async fn write_partial(
        &mut self,
        samples: &[Complex32],
        flags: StreamFlags,
        at_ns: Option<i64>,
        timeout: Duration,
    ) -> Result<usize> {
        if !self.active {
            return Err(Error::NotActive);
        }

        let outcome = {
            let mut state = self.shared.locked();
            let step = state
                .tx_steps
                .pop_front()
                .unwrap_or(TxStep::Accept(self.shared.mtu));

            let outcome = match step {
                TxStep::Accept(n) => Ok(n.min(samples.len()).min(self.shared.mtu)),
                TxStep::Busy => Ok(0),
                TxStep::Fail(code) => Err(Error::from_status("write_partial", code, flags)),
            };

            state.write_log.push(WriteCall {
                requested: samples.len(),
                accepted: *outcome.as_ref().unwrap_or(&0),
                flags,
                at_ns,
            });

            // A fully consumed END_BURST request closes the burst; the
            // device reports the flush through the status channel.
            if let Ok(accepted) = &outcome {
                if flags.contains(StreamFlags::END_BURST) && *accepted == samples.len() {
                    let time_ns = state.clock.now_ns();
                    state.status.push_back(StatusStep::Event(StatusEvent {
                        flags: StreamFlags::END_BURST | StreamFlags::HAS_TIME,
                        time_ns,
                    }));
                }
            }

            outcome
        };

        if matches!(outcome, Ok(0)) {
            // A real device blocks for buffer space before giving up.
            sleep(timeout).await;
        }
        outcome
    }

    async fn poll_status(&mut self, _mask: u32, timeout: Duration) -> Result<StatusEvent> {
        let step = {
            let mut state = self.shared.locked();
            state.poll_count += 1;
            state.status.pop_front()
        };

        match step {
            Some(StatusStep::Event(event)) => Ok(event),
            Some(StatusStep::Fail(code)) => {
                Err(Error::from_status("poll_status", code, StreamFlags::NONE))
            }
            None => {
                sleep(timeout).await;
                Err(Error::Timeout)
            }
        }
    }
}
