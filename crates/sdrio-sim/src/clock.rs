//! Simulated hardware clock.
//!
//! Models the device-wide nanosecond counter, including the vendor quirk
//! the rest of the stack has to live with: the counter advances only while
//! at least one receive stream is active. With no active receive stream it
//! freezes at its current value; setting it while frozen leaves it frozen
//! at the new value.

use tokio::time::Instant;

/// Device-wide nanosecond counter driven by receive-stream activity.
#[derive(Debug)]
pub(crate) struct SimClock {
    /// Counter value at the last rebase point.
    base_ns: i64,
    /// When the clock started running, if it is running.
    running_since: Option<Instant>,
    /// Number of currently active receive streams.
    active_rx: u32,
}

impl SimClock {
    pub(crate) fn new() -> Self {
        SimClock {
            base_ns: 0,
            running_since: None,
            active_rx: 0,
        }
    }

    /// Current counter value.
    pub(crate) fn now_ns(&self) -> i64 {
        let elapsed = self
            .running_since
            .map_or(0, |since| since.elapsed().as_nanos() as i64);
        self.base_ns + elapsed
    }

    /// Rebase the counter to `ns`.
    pub(crate) fn set_ns(&mut self, ns: i64) {
        self.base_ns = ns;
        if self.running_since.is_some() {
            self.running_since = Some(Instant::now());
        }
    }

    /// A receive stream became active; the first one starts the clock.
    pub(crate) fn rx_activated(&mut self) {
        self.active_rx += 1;
        if self.active_rx == 1 {
            self.running_since = Some(Instant::now());
        }
    }

    /// A receive stream went inactive; the last one freezes the clock.
    pub(crate) fn rx_deactivated(&mut self) {
        let frozen = self.now_ns();
        self.active_rx = self.active_rx.saturating_sub(1);
        self.base_ns = frozen;
        self.running_since = (self.active_rx > 0).then(Instant::now);
    }
}
