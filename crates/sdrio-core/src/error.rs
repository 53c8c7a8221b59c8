//! Error types for sdrio.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. The taxonomy separates the three
//! conditions the streaming engine treats differently: timeouts (retryable
//! at the caller's discretion), fatal stream errors (never retried within a
//! transfer), and configuration failures.

use crate::flags::StreamFlags;

/// Device status code: the operation timed out.
pub const ERR_TIMEOUT: i32 = -1;
/// Device status code: non-specific stream error.
pub const ERR_STREAM: i32 = -2;
/// Device status code: transfer data was corrupted.
pub const ERR_CORRUPTION: i32 = -3;
/// Device status code: receive ring overflowed, samples were dropped.
pub const ERR_OVERFLOW: i32 = -4;
/// Device status code: the requested operation is not supported.
pub const ERR_NOT_SUPPORTED: i32 = -5;
/// Device status code: a requested timestamp was in the past or invalid.
pub const ERR_TIME: i32 = -6;
/// Device status code: transmit ring underflowed, the device ran dry.
pub const ERR_UNDERFLOW: i32 = -7;

/// Decode a numeric device status code into descriptive text.
///
/// Used purely for diagnostics -- control flow decisions are made on the
/// numeric code (or on the [`Error`] variant it maps to), never on this
/// string.
pub fn status_to_str(code: i32) -> &'static str {
    match code {
        ERR_TIMEOUT => "TIMEOUT",
        ERR_STREAM => "STREAM_ERROR",
        ERR_CORRUPTION => "CORRUPTION",
        ERR_OVERFLOW => "OVERFLOW",
        ERR_NOT_SUPPORTED => "NOT_SUPPORTED",
        ERR_TIME => "TIME_ERROR",
        ERR_UNDERFLOW => "UNDERFLOW",
        _ => "UNKNOWN",
    }
}

/// The error type for all sdrio operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Timed out waiting for data, buffer space, or a status event.
    ///
    /// Distinguished from fatal errors: a timeout is a legitimate outcome of
    /// a bounded wait and callers (notably the status poller) may continue
    /// after one.
    #[error("timeout waiting on stream")]
    Timeout,

    /// A fatal stream-protocol error reported by the device.
    ///
    /// Carries the operation name, the raw status code with its decoded
    /// text, and the flags in effect, which is enough context to reproduce
    /// the failure. The streaming engine aborts immediately on this variant
    /// and never retries.
    #[error("{op}: device returned {code} [{}] flags = [{flags}]", status_to_str(*.code))]
    Stream {
        /// The operation that failed (e.g. `"write_partial"`).
        op: &'static str,
        /// The raw negative status code from the device.
        code: i32,
        /// The flags that were in effect for the failed call.
        flags: StreamFlags,
    },

    /// An invalid parameter was passed to a device or stream operation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested operation is not supported by this device.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A transfer or poll was issued on a stream that is not active.
    #[error("stream not active")]
    NotActive,

    /// The stream was closed while an operation was outstanding.
    #[error("stream closed")]
    StreamClosed,

    /// No device matched the enumeration filter.
    #[error("no device found matching \"{0}\"")]
    NoDevice(String),

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map a raw negative device status code to an [`Error`].
    ///
    /// `ERR_TIMEOUT` becomes [`Error::Timeout`]; every other code becomes a
    /// fatal [`Error::Stream`] carrying the failing operation and flags.
    pub fn from_status(op: &'static str, code: i32, flags: StreamFlags) -> Self {
        if code == ERR_TIMEOUT {
            Error::Timeout
        } else {
            Error::Stream { op, code, flags }
        }
    }

    /// Whether this error is the distinguished timeout condition.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_decode() {
        assert_eq!(status_to_str(ERR_TIMEOUT), "TIMEOUT");
        assert_eq!(status_to_str(ERR_STREAM), "STREAM_ERROR");
        assert_eq!(status_to_str(ERR_CORRUPTION), "CORRUPTION");
        assert_eq!(status_to_str(ERR_OVERFLOW), "OVERFLOW");
        assert_eq!(status_to_str(ERR_NOT_SUPPORTED), "NOT_SUPPORTED");
        assert_eq!(status_to_str(ERR_TIME), "TIME_ERROR");
        assert_eq!(status_to_str(ERR_UNDERFLOW), "UNDERFLOW");
        assert_eq!(status_to_str(-99), "UNKNOWN");
        assert_eq!(status_to_str(0), "UNKNOWN");
    }

    #[test]
    fn stream_error_display_includes_context() {
        let e = Error::Stream {
            op: "write_partial",
            code: ERR_UNDERFLOW,
            flags: StreamFlags::END_BURST,
        };
        let msg = e.to_string();
        assert!(msg.contains("write_partial"), "{msg}");
        assert!(msg.contains("-7"), "{msg}");
        assert!(msg.contains("UNDERFLOW"), "{msg}");
        assert!(msg.contains("END_BURST"), "{msg}");
    }

    #[test]
    fn from_status_maps_timeout() {
        let e = Error::from_status("poll_status", ERR_TIMEOUT, StreamFlags::NONE);
        assert!(e.is_timeout());
    }

    #[test]
    fn from_status_maps_fatal() {
        let e = Error::from_status("read_partial", ERR_OVERFLOW, StreamFlags::NONE);
        assert!(!e.is_timeout());
        assert!(matches!(
            e,
            Error::Stream {
                op: "read_partial",
                code: ERR_OVERFLOW,
                ..
            }
        ));
    }

    #[test]
    fn error_display_timeout() {
        assert_eq!(Error::Timeout.to_string(), "timeout waiting on stream");
    }

    #[test]
    fn error_display_not_active() {
        assert_eq!(Error::NotActive.to_string(), "stream not active");
    }

    #[test]
    fn error_display_no_device() {
        let e = Error::NoDevice("driver=lime".into());
        assert_eq!(e.to_string(), "no device found matching \"driver=lime\"");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
