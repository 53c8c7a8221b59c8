//! Stream traits -- the channel abstraction the streaming engine drives.
//!
//! A stream is an open, direction-specific session against a device,
//! obtained from [`Device::open_rx_stream`](crate::device::Device::open_rx_stream)
//! or [`Device::open_tx_stream`](crate::device::Device::open_tx_stream).
//! Streams guarantee only *partial* progress per call: a single
//! `read_partial`/`write_partial` moves some prefix of the requested span,
//! possibly zero samples. The engine in `sdrio-engine` builds complete
//! transfers on top of this contract.
//!
//! All transfer methods take `&mut self`: partial transfers on one stream
//! must be issued strictly in sequence from one task, and exclusive borrows
//! make that the only possibility without external synchronization.

use std::time::Duration;

use async_trait::async_trait;
use num_complex::Complex32;

use crate::error::Result;
use crate::flags::StreamFlags;
use crate::types::SampleFormat;

/// The result of one partial read: how many samples landed in the buffer,
/// plus the flags and hardware timestamp the device attached to the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadChunk {
    /// Samples written to the front of the caller's buffer. May be zero.
    pub samples: usize,
    /// Flags describing the chunk (`HAS_TIME`, `END_BURST`, ...).
    pub flags: StreamFlags,
    /// Hardware timestamp of the first sample, when `flags` contains
    /// [`StreamFlags::HAS_TIME`].
    pub time_ns: Option<i64>,
}

/// An asynchronous burst-completion or error notification from the device.
///
/// Produced by [`TxStream::poll_status`]. Fatal conditions surface as
/// `Err` from the poll itself; an `Ok` event carries the flags and the
/// hardware timestamp at which the reported condition occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEvent {
    /// Flags describing the event (`END_BURST` marks a flushed burst).
    pub flags: StreamFlags,
    /// Hardware time at which the event occurred, in nanoseconds.
    pub time_ns: i64,
}

/// A receive stream: device to host.
#[async_trait]
pub trait RxStream: Send {
    /// Channel indices this stream was opened on.
    fn channels(&self) -> &[usize];

    /// Sample format requested at open time.
    fn format(&self) -> SampleFormat;

    /// Maximum number of samples a single `read_partial` call can move.
    ///
    /// Always greater than zero. The engine uses this to recognize the
    /// final chunk of a transfer.
    fn mtu(&self) -> usize;

    /// Activate the stream.
    ///
    /// `time_ns` schedules activation at a hardware timestamp; `num_elems`
    /// bounds a finite burst (0 means stream until deactivated). While at
    /// least one receive stream on the device is active, the hardware clock
    /// advances; see [`Device::hardware_time`](crate::device::Device::hardware_time).
    async fn activate(
        &mut self,
        flags: StreamFlags,
        time_ns: Option<i64>,
        num_elems: usize,
    ) -> Result<()>;

    /// Deactivate the stream. Safe to call on an inactive stream.
    async fn deactivate(&mut self) -> Result<()>;

    /// Read up to `buf.len()` samples, waiting at most `timeout`.
    ///
    /// Moves some prefix of the requested span -- possibly zero samples,
    /// which is not an error. Returns [`Error::Timeout`](crate::error::Error::Timeout)
    /// if nothing arrives within the deadline, or a fatal
    /// [`Error::Stream`](crate::error::Error::Stream) on protocol errors
    /// (overflow, corruption).
    async fn read_partial(&mut self, buf: &mut [Complex32], timeout: Duration)
        -> Result<ReadChunk>;
}

/// A transmit stream: host to device.
#[async_trait]
pub trait TxStream: Send {
    /// Channel indices this stream was opened on.
    fn channels(&self) -> &[usize];

    /// Sample format requested at open time.
    fn format(&self) -> SampleFormat;

    /// Maximum number of samples a single `write_partial` call can move.
    ///
    /// Always greater than zero. The engine uses this to recognize the
    /// final chunk of a transfer and attach [`StreamFlags::END_BURST`] to
    /// exactly that call.
    fn mtu(&self) -> usize;

    /// Activate the stream. See [`RxStream::activate`].
    async fn activate(
        &mut self,
        flags: StreamFlags,
        time_ns: Option<i64>,
        num_elems: usize,
    ) -> Result<()>;

    /// Deactivate the stream. Safe to call on an inactive stream.
    async fn deactivate(&mut self) -> Result<()>;

    /// Write some prefix of `samples`, waiting at most `timeout` for buffer
    /// space.
    ///
    /// `flags` are advisory hints for this call only ([`StreamFlags::END_BURST`]
    /// marks the burst's final chunk; [`StreamFlags::HAS_TIME`] makes
    /// `at_ns` meaningful as the burst's target transmit time). Returns the
    /// number of samples accepted, which may be zero -- a legitimate
    /// no-progress outcome the caller retries.
    async fn write_partial(
        &mut self,
        samples: &[Complex32],
        flags: StreamFlags,
        at_ns: Option<i64>,
        timeout: Duration,
    ) -> Result<usize>;

    /// Wait up to `timeout` for an asynchronous status event.
    ///
    /// `mask` selects which of the stream's channels to report on (bit N
    /// covers channel index N; 0 means all). Completion of a burst is *only*
    /// learned here -- the final `write_partial` of a burst returning does
    /// not mean the device has flushed it. Returns
    /// [`Error::Timeout`](crate::error::Error::Timeout) when no event
    /// arrives in time; that is an expected outcome, not a failure.
    async fn poll_status(&mut self, mask: u32, timeout: Duration) -> Result<StatusEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_chunk_carries_time_only_with_flag() {
        let chunk = ReadChunk {
            samples: 100,
            flags: StreamFlags::HAS_TIME,
            time_ns: Some(5_000),
        };
        assert!(chunk.flags.contains(StreamFlags::HAS_TIME));
        assert_eq!(chunk.time_ns, Some(5_000));
    }

    #[test]
    fn status_event_flags_decode() {
        let ev = StatusEvent {
            flags: StreamFlags::END_BURST | StreamFlags::HAS_TIME,
            time_ns: 1_000_000,
        };
        assert_eq!(ev.flags.to_string(), "END_BURST HAS_TIME");
    }
}
