use std::time::Duration;

/// Errors that can occur when driving a UCI engine.
///
/// Errors are organized by category:
/// - Configuration errors: detected at `build()` time
/// - Spawn errors: failed to start the engine process
/// - IO errors: failures writing commands to the engine
/// - Stream errors: the engine's output failed or ended before a match
/// - Runtime errors: deadlines and cancellation
///
/// An invalid position is *not* an error; the driver answers it with an
/// empty result.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration errors (detected at build() time)
    // -------------------------------------------------------------------------
    /// Invalid configuration provided to builder.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -------------------------------------------------------------------------
    // Spawn errors
    // -------------------------------------------------------------------------
    /// Engine executable not found.
    #[error("engine executable not found: {path}")]
    EngineNotFound { path: String },

    /// Failed to spawn the engine subprocess.
    #[error("failed to spawn engine process: {0}")]
    ProcessSpawn(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // IO errors
    // -------------------------------------------------------------------------
    /// IO error writing to the engine subprocess.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Stream errors
    // -------------------------------------------------------------------------
    /// Reading the engine's output failed before the awaited line arrived.
    #[error("engine output stream failed after {} line(s): {source}", .lines.len())]
    Stream {
        #[source]
        source: std::io::Error,
        /// Lines received before the failure.
        lines: Vec<String>,
    },

    /// The engine closed its output before the awaited line arrived.
    #[error("engine output closed after {} line(s) without the expected response", .lines.len())]
    StreamClosed {
        /// Lines received before the close.
        lines: Vec<String>,
    },

    /// The session was already terminated.
    #[error("engine session already terminated")]
    SessionTerminated,

    // -------------------------------------------------------------------------
    // Runtime errors
    // -------------------------------------------------------------------------
    /// A read exceeded its deadline.
    #[error("engine did not respond within {0:?}")]
    Timeout(Duration),

    /// A read was cancelled through its cancellation token.
    #[error("engine request cancelled")]
    Cancelled,
}

/// A specialized Result type for libuci operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io(source)
    }

    /// Lines the engine produced before a stream failure, if any.
    pub fn partial_lines(&self) -> &[String] {
        match self {
            Error::Stream { lines, .. } | Error::StreamClosed { lines } => lines,
            _ => &[],
        }
    }

    /// Check if this error came from talking to the engine rather than from
    /// configuration or process creation.
    pub fn is_engine_communication(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Stream { .. }
                | Error::StreamClosed { .. }
                | Error::SessionTerminated
                | Error::Timeout(_)
                | Error::Cancelled
        )
    }

    /// Check if this error is retryable with a fresh engine process.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::Io(_) | Error::Stream { .. } | Error::StreamClosed { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
