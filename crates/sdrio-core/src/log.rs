//! Device log message routing.
//!
//! Device backends produce free-form diagnostic messages (DMA state
//! changes, calibration notices, dropped-packet warnings). Rather than a
//! process-wide registered callback, the sink is an explicit [`LogObserver`]
//! passed to the device session at construction, so applications control
//! routing per device and tests can capture output deterministically.
//!
//! The observer is fire-and-forget: the device layer never blocks on it and
//! expects no backpressure.

use std::fmt;

/// Severity of a device log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// The device is unusable.
    Fatal,
    /// An operation failed.
    Error,
    /// Something unexpected but recoverable happened.
    Warning,
    /// Normal operational messages.
    Info,
    /// Verbose diagnostics.
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Fatal => "FATAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        };
        write!(f, "{s}")
    }
}

/// Sink for device log messages.
///
/// Implementations must be cheap and non-blocking; the device layer calls
/// [`log`](LogObserver::log) from latency-sensitive paths.
pub trait LogObserver: Send + Sync {
    /// Deliver one log message.
    fn log(&self, level: LogLevel, message: &str);
}

/// A [`LogObserver`] that forwards device messages into `tracing`.
///
/// This is the default sink: device diagnostics land in the same subscriber
/// pipeline as the library's own events.
#[derive(Debug, Default)]
pub struct TracingLog;

impl LogObserver for TracingLog {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Fatal | LogLevel::Error => tracing::error!(target: "sdrio::device", "{message}"),
            LogLevel::Warning => tracing::warn!(target: "sdrio::device", "{message}"),
            LogLevel::Info => tracing::info!(target: "sdrio::device", "{message}"),
            LogLevel::Debug => tracing::debug!(target: "sdrio::device", "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Capture(Mutex<Vec<(LogLevel, String)>>);

    impl LogObserver for Capture {
        fn log(&self, level: LogLevel, message: &str) {
            if let Ok(mut entries) = self.0.lock() {
                entries.push((level, message.to_string()));
            }
        }
    }

    #[test]
    fn level_display() {
        assert_eq!(LogLevel::Fatal.to_string(), "FATAL");
        assert_eq!(LogLevel::Warning.to_string(), "WARNING");
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
    }

    #[test]
    fn level_ordering() {
        // Fatal is the most severe; Debug the least.
        assert!(LogLevel::Fatal < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn observer_receives_messages() {
        let capture = Capture(Mutex::new(Vec::new()));
        capture.log(LogLevel::Info, "stream activated");
        capture.log(LogLevel::Warning, "ring nearly full");

        let entries = capture.0.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (LogLevel::Info, "stream activated".into()));
        assert_eq!(entries[1], (LogLevel::Warning, "ring nearly full".into()));
    }

    #[test]
    fn observer_is_object_safe() {
        let _: Box<dyn LogObserver> = Box::new(TracingLog);
    }
}
