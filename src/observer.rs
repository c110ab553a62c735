//! Observation hooks for engine traffic.
//!
//! The driver reports every command it writes, every line it receives and
//! every protocol state it enters to an [`EngineObserver`]. The default
//! observer is [`LoggingObserver`], which forwards to `tracing`; supply your
//! own to collect metrics or capture transcripts.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use libuci::{EngineDriver, EngineObserver};
//!
//! struct Transcript;
//!
//! impl EngineObserver for Transcript {
//!     fn on_command(&self, command: &str) {
//!         println!("> {command}");
//!     }
//!
//!     fn on_line(&self, line: &str) {
//!         println!("< {line}");
//!     }
//! }
//!
//! let driver = EngineDriver::builder()
//!     .observer(Arc::new(Transcript))
//!     .build()?;
//! ```

use crate::driver::DriverState;
use crate::Error;

/// Observer for engine protocol traffic.
///
/// # Implementation Notes
///
/// - Implementations must be lightweight; they run inline with protocol I/O.
/// - Methods have default empty implementations for selective observation.
pub trait EngineObserver: Send + Sync {
    /// Called after a command line is written to the engine.
    fn on_command(&self, command: &str) {
        let _ = command;
    }

    /// Called for each line received from the engine during a read.
    fn on_line(&self, line: &str) {
        let _ = line;
    }

    /// Called when the driver's protocol state machine advances.
    fn on_state(&self, state: DriverState) {
        let _ = state;
    }

    /// Called when an exchange with the engine fails.
    fn on_error(&self, error: &Error) {
        let _ = error;
    }
}

/// Observer that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}

/// Logging observer that forwards engine traffic to `tracing`.
///
/// Errors are always logged at `warn`; the configured level applies to
/// commands, lines and state changes.
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver {
    level: LogLevel,
}

/// Log level for LoggingObserver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at trace level.
    Trace,
    /// Log at debug level (default).
    #[default]
    Debug,
    /// Log at info level.
    Info,
}

impl LoggingObserver {
    /// Create a new logging observer with debug level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging observer with a specific level.
    pub fn with_level(level: LogLevel) -> Self {
        Self { level }
    }

    /// The level traffic is logged at.
    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl EngineObserver for LoggingObserver {
    fn on_command(&self, command: &str) {
        match self.level {
            LogLevel::Trace => tracing::trace!(%command, "engine_command"),
            LogLevel::Debug => tracing::debug!(%command, "engine_command"),
            LogLevel::Info => tracing::info!(%command, "engine_command"),
        }
    }

    fn on_line(&self, line: &str) {
        // info lines from a long search can be very wide
        let display_line = if line.len() > 200 {
            let mut end = 200;
            while !line.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... ({} bytes total)", &line[..end], line.len())
        } else {
            line.to_string()
        };

        match self.level {
            LogLevel::Trace => tracing::trace!(line = %display_line, "engine_line"),
            LogLevel::Debug => tracing::debug!(line = %display_line, "engine_line"),
            LogLevel::Info => tracing::info!(line = %display_line, "engine_line"),
        }
    }

    fn on_state(&self, state: DriverState) {
        match self.level {
            LogLevel::Trace => tracing::trace!(%state, "engine_state"),
            LogLevel::Debug => tracing::debug!(%state, "engine_state"),
            LogLevel::Info => tracing::info!(%state, "engine_state"),
        }
    }

    fn on_error(&self, error: &Error) {
        tracing::warn!(
            %error,
            partial_lines = error.partial_lines().len(),
            "engine_error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn engine_observer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn EngineObserver>();
        assert_send_sync::<LoggingObserver>();
        assert_send_sync::<NoopObserver>();
    }

    #[derive(Default)]
    struct CountingObserver {
        commands: AtomicUsize,
        lines: AtomicUsize,
        states: Mutex<Vec<DriverState>>,
    }

    impl EngineObserver for CountingObserver {
        fn on_command(&self, _command: &str) {
            self.commands.fetch_add(1, Ordering::Relaxed);
        }

        fn on_line(&self, _line: &str) {
            self.lines.fetch_add(1, Ordering::Relaxed);
        }

        fn on_state(&self, state: DriverState) {
            self.states.lock().unwrap().push(state);
        }
    }

    #[test]
    fn counting_observer_tracks_calls() {
        let observer = CountingObserver::default();

        observer.on_command("uci");
        observer.on_command("isready");
        observer.on_line("uciok");
        observer.on_state(DriverState::Ready);

        assert_eq!(observer.commands.load(Ordering::Relaxed), 2);
        assert_eq!(observer.lines.load(Ordering::Relaxed), 1);
        assert_eq!(*observer.states.lock().unwrap(), vec![DriverState::Ready]);
    }

    #[test]
    fn default_trait_methods_are_no_ops() {
        let observer = NoopObserver;
        observer.on_command("uci");
        observer.on_line("uciok");
        observer.on_state(DriverState::Spawned);
        observer.on_error(&Error::Cancelled);
    }

    #[test]
    fn logging_observer_handles_wide_multibyte_lines() {
        let observer = LoggingObserver::with_level(LogLevel::Trace);
        let line = "\u{00e9}".repeat(150);
        observer.on_line(&line);
        assert_eq!(observer.level(), LogLevel::Trace);
    }

    #[test]
    fn arc_observer_works() {
        let observer: Arc<dyn EngineObserver> = Arc::new(CountingObserver::default());
        observer.on_command("quit");
    }
}
