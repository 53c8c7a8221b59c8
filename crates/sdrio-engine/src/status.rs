//! Burst-completion polling.
//!
//! The final `write_partial` of a burst returning does not mean the device
//! has flushed it; completion arrives asynchronously on the stream's status
//! channel. [`await_burst_end`] is the confirmer half of that protocol: it
//! polls until the device reports `END_BURST`, pacing itself with an
//! injected [`PollPolicy`] rather than a hard-coded sleep.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use sdrio_core::error::{Error, Result};
use sdrio_core::flags::StreamFlags;
use sdrio_core::stream::{StatusEvent, TxStream};

/// Pacing for a status polling loop.
///
/// `interval` is the sleep between consecutive polls; `max_attempts` bounds
/// the loop so a device that never reports completion cannot hang the
/// caller forever. Both are policy knobs, not correctness requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between consecutive polls.
    pub interval: Duration,
    /// Maximum number of poll calls before giving up with a timeout.
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Create a policy with the given interval and attempt bound.
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        PollPolicy {
            interval,
            max_attempts,
        }
    }
}

impl Default for PollPolicy {
    /// 100 ms between polls, at most 100 attempts.
    fn default() -> Self {
        PollPolicy {
            interval: Duration::from_millis(100),
            max_attempts: 100,
        }
    }
}

/// Poll a transmit stream until the device confirms a burst was flushed.
///
/// Each poll waits up to `timeout`; between polls the loop sleeps
/// `policy.interval`. Events whose flags lack [`StreamFlags::END_BURST`]
/// and per-poll timeouts both count as attempts and the loop continues.
/// A fatal error from the device propagates immediately. When
/// `policy.max_attempts` polls have produced no burst end, returns
/// [`Error::Timeout`].
pub async fn await_burst_end<S>(
    stream: &mut S,
    mask: u32,
    timeout: Duration,
    policy: &PollPolicy,
) -> Result<StatusEvent>
where
    S: TxStream + ?Sized,
{
    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            sleep(policy.interval).await;
        }

        match stream.poll_status(mask, timeout).await {
            Ok(event) if event.flags.contains(StreamFlags::END_BURST) => {
                debug!(flags = %event.flags, time_ns = event.time_ns, "burst end confirmed");
                return Ok(event);
            }
            Ok(event) => {
                debug!(flags = %event.flags, "status event without burst end");
            }
            Err(Error::Timeout) => {
                debug!(attempt, "status poll timed out, continuing");
            }
            Err(err) => return Err(err),
        }
    }

    Err(Error::Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdrio_core::error::ERR_STREAM;
    use sdrio_core::types::SampleFormat;
    use sdrio_core::Device;
    use sdrio_sim::SimDevice;

    async fn open_tx(device: &SimDevice) -> Box<dyn TxStream> {
        let mut tx = device
            .open_tx_stream(SampleFormat::Cf32, &[0])
            .await
            .unwrap();
        tx.activate(StreamFlags::NONE, None, 0).await.unwrap();
        tx
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_first_burst_end() {
        let device = SimDevice::builder()
            .status_event(StreamFlags::END_BURST | StreamFlags::HAS_TIME, 5_000)
            .build();
        let mut tx = open_tx(&device).await;

        let event = await_burst_end(
            tx.as_mut(),
            0,
            Duration::from_millis(10),
            &PollPolicy::default(),
        )
        .await
        .unwrap();
        assert!(event.flags.contains(StreamFlags::END_BURST));
        assert_eq!(event.time_ns, 5_000);
        assert_eq!(device.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loops_until_burst_end() {
        // Scripted sequence {flags=0, flags=0, flags=END_BURST}: the loop
        // must terminate after exactly three polls.
        let device = SimDevice::builder()
            .status_event(StreamFlags::NONE, 1_000)
            .status_event(StreamFlags::NONE, 2_000)
            .status_event(StreamFlags::END_BURST, 3_000)
            .build();
        let mut tx = open_tx(&device).await;

        let event = await_burst_end(
            tx.as_mut(),
            0,
            Duration::from_millis(10),
            &PollPolicy::default(),
        )
        .await
        .unwrap();
        assert!(event.flags.contains(StreamFlags::END_BURST));
        assert_eq!(event.time_ns, 3_000);
        assert_eq!(device.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn per_poll_timeouts_continue_until_attempts_exhausted() {
        let device = SimDevice::builder().build();
        let mut tx = open_tx(&device).await;

        let policy = PollPolicy::new(Duration::from_millis(100), 5);
        let err = await_burst_end(tx.as_mut(), 0, Duration::from_millis(10), &policy)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(device.poll_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_poll_error_propagates_immediately() {
        let device = SimDevice::builder()
            .status_failure(ERR_STREAM)
            .status_event(StreamFlags::END_BURST, 9_000)
            .build();
        let mut tx = open_tx(&device).await;

        let err = await_burst_end(
            tx.as_mut(),
            0,
            Duration::from_millis(10),
            &PollPolicy::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Stream { code: ERR_STREAM, .. }));
        assert_eq!(device.poll_count(), 1);
    }
}
