//! Whole-buffer transfers over partial-progress streams.
//!
//! A stream call moves some prefix of the requested span -- possibly zero
//! samples. [`write_all`] and [`read_all`] loop until the caller's entire
//! buffer has moved, advancing the view by each call's progress and keeping
//! the one-shot request flags straight:
//!
//! - `HAS_TIME` (with its timestamp) rides the first call and is cleared as
//!   soon as any samples move, so retries of later chunks never replay it.
//! - `END_BURST` is attached only to the final chunk of the transfer --
//!   recognized as the point where the remaining span fits in one device
//!   transfer unit ([`TxStream::mtu`]) -- so the device sees the burst
//!   boundary exactly once, on the call that completes the buffer.
//!
//! A zero-progress call with no error is retried with unchanged flags; the
//! per-call timeout bounds total wall clock. Any error aborts immediately:
//! protocol errors are not recoverable within a single transfer attempt.

use std::time::Duration;

use tracing::{debug, warn};

use sdrio_core::error::Result;
use sdrio_core::flags::StreamFlags;
use sdrio_core::stream::{RxStream, TxStream};
use sdrio_core::Complex32;

/// The result of a completed [`read_all`]: the sample count plus the flags
/// and hardware timestamp the device attached to the first chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Total samples delivered. Equals the caller's buffer length.
    pub samples: usize,
    /// Flags from the first non-empty chunk.
    pub flags: StreamFlags,
    /// Hardware timestamp of the first sample, when the device provided one.
    pub time_ns: Option<i64>,
}

/// Write an entire sample buffer through a transmit stream.
///
/// Issues as many partial writes as the device requires. `flags` applies to
/// the transfer as a whole; the one-shot bits (`END_BURST`, `HAS_TIME`) are
/// placed on individual calls as described in the module docs. `at_ns` is
/// the burst's target transmit time and is only meaningful together with
/// [`StreamFlags::HAS_TIME`] semantics -- passing `Some` attaches the
/// timestamp to the first call.
///
/// Returns the total samples moved, which on success equals `samples.len()`.
/// An empty buffer succeeds trivially. On error the transfer aborts with no
/// retry; samples moved before the failure stay consumed by the device.
pub async fn write_all<S>(
    stream: &mut S,
    samples: &[Complex32],
    flags: StreamFlags,
    at_ns: Option<i64>,
    timeout: Duration,
) -> Result<usize>
where
    S: TxStream + ?Sized,
{
    if samples.is_empty() {
        return Ok(0);
    }

    let mtu = stream.mtu();
    let want_end_burst = flags.contains(StreamFlags::END_BURST);
    let mut base = flags;
    base.remove(StreamFlags::END_BURST | StreamFlags::HAS_TIME);

    let mut offset = 0usize;
    let mut pending_time = at_ns;
    let mut calls = 0u32;

    while offset < samples.len() {
        let remaining = &samples[offset..];
        let mut call_flags = base;
        if pending_time.is_some() {
            call_flags.insert(StreamFlags::HAS_TIME);
        }
        if want_end_burst && remaining.len() <= mtu {
            call_flags.insert(StreamFlags::END_BURST);
        }

        let moved = match stream
            .write_partial(remaining, call_flags, pending_time, timeout)
            .await
        {
            Ok(n) => n,
            Err(err) => {
                warn!(
                    moved = offset,
                    requested = samples.len(),
                    %err,
                    "write transfer aborted"
                );
                return Err(err);
            }
        };
        calls += 1;

        debug_assert!(moved <= remaining.len(), "device over-reported progress");
        if moved > 0 {
            offset += moved;
            pending_time = None;
        }
        // moved == 0 with no error: legitimate no-progress outcome. Re-issue
        // with unchanged flags and timestamp.
    }

    debug!(total = offset, calls, "write transfer complete");
    Ok(offset)
}

/// Fill an entire sample buffer from a receive stream.
///
/// Issues as many partial reads as the device requires; zero-progress calls
/// are retried. The flags and hardware timestamp of the first non-empty
/// chunk are captured into the returned [`ReadOutcome`] so callers can
/// correlate the buffer's start with the hardware clock.
pub async fn read_all<S>(
    stream: &mut S,
    buf: &mut [Complex32],
    timeout: Duration,
) -> Result<ReadOutcome>
where
    S: RxStream + ?Sized,
{
    let mut outcome = ReadOutcome {
        samples: 0,
        flags: StreamFlags::NONE,
        time_ns: None,
    };
    if buf.is_empty() {
        return Ok(outcome);
    }

    let total = buf.len();
    let mut calls = 0u32;

    while outcome.samples < total {
        let chunk = match stream.read_partial(&mut buf[outcome.samples..], timeout).await {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!(
                    moved = outcome.samples,
                    requested = total,
                    %err,
                    "read transfer aborted"
                );
                return Err(err);
            }
        };
        calls += 1;

        debug_assert!(
            chunk.samples <= total - outcome.samples,
            "device over-reported progress"
        );
        if outcome.samples == 0 && chunk.samples > 0 {
            outcome.flags = chunk.flags;
            outcome.time_ns = chunk.time_ns;
        }
        outcome.samples += chunk.samples;
    }

    debug!(total = outcome.samples, calls, "read transfer complete");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdrio_core::error::{Error, ERR_UNDERFLOW};
    use sdrio_core::types::SampleFormat;
    use sdrio_core::Device;
    use sdrio_sim::{SimDevice, TxStep};

    fn samples(len: usize) -> Vec<Complex32> {
        vec![Complex32::new(0.5, -0.5); len]
    }

    async fn open_tx(device: &SimDevice) -> Box<dyn TxStream> {
        let mut tx = device
            .open_tx_stream(SampleFormat::Cf32, &[0])
            .await
            .unwrap();
        tx.activate(StreamFlags::NONE, None, 0).await.unwrap();
        tx
    }

    #[tokio::test(start_paused = true)]
    async fn completes_across_scripted_partials() {
        // Partial sizes sum to the buffer length: 300 + 200 + 500 = 1000.
        let device = SimDevice::builder()
            .mtu(4096)
            .tx_steps([TxStep::Accept(300), TxStep::Accept(200), TxStep::Accept(500)])
            .build();
        let mut tx = open_tx(&device).await;

        let buf = samples(1000);
        let moved = write_all(tx.as_mut(), &buf, StreamFlags::NONE, None, timeout())
            .await
            .unwrap();
        assert_eq!(moved, 1000);

        let log = device.tx_write_log();
        assert_eq!(log.len(), 3);
        assert_eq!(
            log.iter().map(|c| c.accepted).sum::<usize>(),
            1000,
            "no silent loss or duplication"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn never_requests_more_than_remaining() {
        let device = SimDevice::builder()
            .mtu(4096)
            .tx_steps([TxStep::Accept(700), TxStep::Accept(200), TxStep::Accept(100)])
            .build();
        let mut tx = open_tx(&device).await;

        let buf = samples(1000);
        write_all(tx.as_mut(), &buf, StreamFlags::NONE, None, timeout())
            .await
            .unwrap();

        let log = device.tx_write_log();
        let mut remaining = 1000usize;
        for call in &log {
            assert!(call.requested <= remaining, "requested {} of {remaining}", call.requested);
            remaining -= call.accepted;
        }
        assert_eq!(remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn end_burst_attached_only_to_completing_call() {
        // MTU 400: the first two requests exceed one transfer unit, so only
        // the final chunk may carry END_BURST.
        let device = SimDevice::builder()
            .mtu(400)
            .tx_steps([TxStep::Accept(400), TxStep::Accept(300), TxStep::Accept(300)])
            .build();
        let mut tx = open_tx(&device).await;

        let buf = samples(1000);
        let moved = write_all(tx.as_mut(), &buf, StreamFlags::END_BURST, None, timeout())
            .await
            .unwrap();
        assert_eq!(moved, 1000);

        let log = device.tx_write_log();
        assert_eq!(log.len(), 3);
        let with_end: Vec<_> = log
            .iter()
            .enumerate()
            .filter(|(_, c)| c.flags.contains(StreamFlags::END_BURST))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(with_end, vec![2], "END_BURST must ride only the final chunk");
    }

    #[tokio::test(start_paused = true)]
    async fn end_burst_not_replayed_on_earlier_retries() {
        // A zero-progress retry happens while more than one MTU remains;
        // that retried call must not carry END_BURST.
        let device = SimDevice::builder()
            .mtu(400)
            .tx_steps([
                TxStep::Accept(400),
                TxStep::Busy,
                TxStep::Accept(400),
                TxStep::Accept(200),
            ])
            .build();
        let mut tx = open_tx(&device).await;

        let buf = samples(1000);
        write_all(tx.as_mut(), &buf, StreamFlags::END_BURST, None, timeout())
            .await
            .unwrap();

        let log = device.tx_write_log();
        assert_eq!(log.len(), 4);
        for call in &log[..3] {
            assert!(!call.flags.contains(StreamFlags::END_BURST));
        }
        assert!(log[3].flags.contains(StreamFlags::END_BURST));
    }

    #[tokio::test(start_paused = true)]
    async fn timestamp_rides_first_call_only() {
        let device = SimDevice::builder()
            .mtu(4096)
            .tx_steps([TxStep::Accept(600), TxStep::Accept(400)])
            .build();
        let mut tx = open_tx(&device).await;

        let buf = samples(1000);
        write_all(
            tx.as_mut(),
            &buf,
            StreamFlags::HAS_TIME,
            Some(1_000_000),
            timeout(),
        )
        .await
        .unwrap();

        let log = device.tx_write_log();
        assert_eq!(log.len(), 2);
        assert!(log[0].flags.contains(StreamFlags::HAS_TIME));
        assert_eq!(log[0].at_ns, Some(1_000_000));
        assert!(!log[1].flags.contains(StreamFlags::HAS_TIME));
        assert_eq!(log[1].at_ns, None);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_progress_retries_with_unchanged_flags() {
        let device = SimDevice::builder()
            .mtu(4096)
            .tx_steps([TxStep::Busy, TxStep::Busy, TxStep::Accept(100)])
            .build();
        let mut tx = open_tx(&device).await;

        let buf = samples(100);
        write_all(
            tx.as_mut(),
            &buf,
            StreamFlags::END_BURST | StreamFlags::HAS_TIME,
            Some(42),
            timeout(),
        )
        .await
        .unwrap();

        let log = device.tx_write_log();
        assert_eq!(log.len(), 3);
        // All three calls are the same logical request; flags and timestamp
        // must be identical across the no-progress retries.
        for call in &log {
            assert_eq!(call.requested, 100);
            assert!(call.flags.contains(StreamFlags::END_BURST));
            assert!(call.flags.contains(StreamFlags::HAS_TIME));
            assert_eq!(call.at_ns, Some(42));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_short_circuits() {
        let device = SimDevice::builder()
            .mtu(4096)
            .tx_steps([
                TxStep::Accept(250),
                TxStep::Fail(ERR_UNDERFLOW),
                TxStep::Accept(750),
            ])
            .build();
        let mut tx = open_tx(&device).await;

        let buf = samples(1000);
        let err = write_all(tx.as_mut(), &buf, StreamFlags::NONE, None, timeout())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Stream {
                code: ERR_UNDERFLOW,
                ..
            }
        ));

        // The loop stopped at the failure: no further calls were issued.
        let log = device.tx_write_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].accepted, 250);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_buffer_succeeds_without_calls() {
        let device = SimDevice::builder().build();
        let mut tx = open_tx(&device).await;

        let moved = write_all(tx.as_mut(), &[], StreamFlags::END_BURST, None, timeout())
            .await
            .unwrap();
        assert_eq!(moved, 0);
        assert!(device.tx_write_log().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn single_chunk_carries_end_burst_and_time_together() {
        let device = SimDevice::builder().mtu(4096).build();
        let mut tx = open_tx(&device).await;

        let buf = samples(100);
        write_all(
            tx.as_mut(),
            &buf,
            StreamFlags::END_BURST | StreamFlags::HAS_TIME,
            Some(7),
            timeout(),
        )
        .await
        .unwrap();

        let log = device.tx_write_log();
        assert_eq!(log.len(), 1);
        assert!(log[0].flags.contains(StreamFlags::END_BURST | StreamFlags::HAS_TIME));
    }

    #[tokio::test(start_paused = true)]
    async fn read_fills_buffer_and_captures_first_timestamp() {
        let device = SimDevice::builder().mtu(256).build();
        let mut rx = device
            .open_rx_stream(SampleFormat::Cf32, &[0])
            .await
            .unwrap();
        rx.activate(StreamFlags::NONE, None, 0).await.unwrap();

        let mut buf = samples(1000);
        let outcome = read_all(rx.as_mut(), &mut buf, timeout()).await.unwrap();
        assert_eq!(outcome.samples, 1000);
        assert!(outcome.flags.contains(StreamFlags::HAS_TIME));
        assert!(outcome.time_ns.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn read_empty_buffer_is_trivial() {
        let device = SimDevice::builder().build();
        let mut rx = device
            .open_rx_stream(SampleFormat::Cf32, &[0])
            .await
            .unwrap();

        // No activation needed: an empty read never touches the stream.
        let mut buf: Vec<Complex32> = Vec::new();
        let outcome = read_all(rx.as_mut(), &mut buf, timeout()).await.unwrap();
        assert_eq!(outcome.samples, 0);
        assert_eq!(outcome.flags, StreamFlags::NONE);
    }

    fn timeout() -> Duration {
        Duration::from_millis(100)
    }
}
