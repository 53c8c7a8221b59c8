//! sdrio-core: Core traits, types, and error definitions for sdrio.
//!
//! This crate defines the vendor-agnostic abstractions that all sdrio
//! backends implement. Applications and the streaming engine depend on
//! these types without pulling in any specific device backend.
//!
//! # Key types
//!
//! - [`Device`] -- the unified trait for an SDR device session
//! - [`RxStream`] / [`TxStream`] -- direction-specific sample streams
//! - [`StreamFlags`] -- per-transfer flag bitmask
//! - [`LogObserver`] -- injected sink for device log messages
//! - [`Error`] / [`Result`] -- error handling

pub mod device;
pub mod error;
pub mod flags;
pub mod log;
pub mod stream;
pub mod time;
pub mod types;

// Re-export key types at crate root for ergonomic `use sdrio_core::*`.
pub use device::Device;
pub use error::{status_to_str, Error, Result};
pub use flags::StreamFlags;
pub use log::{LogLevel, LogObserver, TracingLog};
pub use stream::{ReadChunk, RxStream, StatusEvent, TxStream};
pub use time::{ns_to_secs, secs_to_ns, MAX_EXACT_NS};
pub use types::*;

/// Complex baseband sample type used at the API boundary.
pub use num_complex::Complex32;
