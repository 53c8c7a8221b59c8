//! sdrio-sim: Simulated device backend for sdrio.
//!
//! This crate provides [`SimDevice`], a full [`Device`](sdrio_core::Device)
//! implementation with no hardware behind it, for deterministic testing of
//! the streaming engine and for exercising applications end to end.
//!
//! The simulation reproduces the behaviors that matter to the engine:
//!
//! - transfers move a *partial* span per call, scriptable per call via
//!   [`TxStep`] (accept N samples, report no progress, fail with a status
//!   code)
//! - burst completions are reported asynchronously through the status
//!   channel, never by the final write itself
//! - the hardware clock advances only while a receive stream is active --
//!   the same vendor constraint real devices exhibit
//!
//! Every write and poll is recorded so tests can assert on exactly what the
//! engine requested ([`SimDevice::tx_write_log`], [`SimDevice::poll_count`]).

mod clock;
mod device;
mod stream;

pub use device::{enumerate, open, SimDevice, SimDeviceBuilder};
pub use stream::{TxStep, WriteCall};
