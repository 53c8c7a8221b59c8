//! # sdrio -- Vendor-Neutral SDR Streaming
//!
//! `sdrio` is an asynchronous Rust library for moving complex baseband
//! samples between applications and software-defined radio hardware through
//! a vendor-neutral API: enumerate devices, configure RF parameters, stream
//! whole buffers over channels that only guarantee partial progress per
//! call, and correlate transfers against the device's hardware clock.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use sdrio::{write_all, await_burst_end, PollPolicy};
//! use sdrio::{Complex32, Device, SampleFormat, StreamFlags, TxStream};
//!
//! #[tokio::main]
//! async fn main() -> sdrio::Result<()> {
//!     let device = sdrio::sim::open(&"driver=sim".parse().unwrap())?;
//!     device.set_frequency(sdrio::Direction::Tx, 0, 144.295e6).await?;
//!
//!     let mut tx = device.open_tx_stream(SampleFormat::Cf32, &[0]).await?;
//!     tx.activate(StreamFlags::NONE, None, 0).await?;
//!
//!     let burst = vec![Complex32::new(0.5, 0.0); 30_000];
//!     let timeout = Duration::from_millis(500);
//!     write_all(tx.as_mut(), &burst, StreamFlags::END_BURST, None, timeout).await?;
//!     await_burst_end(tx.as_mut(), 0, timeout, &PollPolicy::default()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate          | Purpose                                              |
//! |----------------|------------------------------------------------------|
//! | `sdrio-core`   | Traits ([`Device`], [`RxStream`], [`TxStream`]), types, errors |
//! | `sdrio-engine` | Chunked transfer loop, status poller, clock driver   |
//! | `sdrio-sim`    | Simulated device backend for testing and development |
//! | **`sdrio`**    | This facade crate -- re-exports everything           |
//!
//! All device backends implement the [`Device`] trait, so application code
//! can work with `dyn Device` and remain vendor-agnostic.
//!
//! ## The streaming contract
//!
//! A stream call moves *some prefix* of the requested span, possibly zero
//! samples. [`write_all`] and [`read_all`] turn that into whole-buffer
//! transfers, placing the one-shot burst flags (`END_BURST`, `HAS_TIME`)
//! on exactly the calls that should carry them. Burst completion is
//! reported asynchronously: after the final write returns, poll with
//! [`await_burst_end`] until the device confirms the flush.
//!
//! ## The hardware clock
//!
//! Devices timestamp transfers with a monotonic nanosecond counter that --
//! on the supported hardware -- only advances while a receive stream is
//! active. Transmit-only applications hold a [`ClockDriver`] open for the
//! duration of any timed work. Convert counts for display with
//! [`ns_to_secs`], keeping in mind its documented 53-bit precision limit.

pub use sdrio_core::*;

/// The sdrio library version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use sdrio_engine::{
    await_burst_end, read_all, write_all, ClockDriver, PollPolicy, ReadOutcome,
};

/// Simulated device backend.
///
/// Provides [`SimDevice`](sim::SimDevice) and its builder for testing and
/// development without hardware, including scripted partial transfers and
/// the receive-driven hardware clock.
#[cfg(feature = "sim")]
pub mod sim {
    pub use sdrio_sim::*;
}
