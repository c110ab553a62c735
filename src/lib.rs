//! # libuci
//!
//! Async Rust driver for UCI chess engines.
//!
//! This library runs an engine such as Stockfish as a subprocess and speaks
//! the Universal Chess Interface to it:
//! - One engine process per evaluation, torn down afterwards
//! - Line-oriented output matching that tolerates arbitrary chunking
//! - Per-read deadlines and cancellation
//! - Observation hooks for protocol traffic
//!
//! ## Quick Start
//!
//! ```ignore
//! use libuci::{EngineDriver, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let driver = EngineDriver::new()?;
//!     let lines = driver
//!         .evaluate("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
//!         .await?;
//!     println!("{}", lines.join("\n"));
//!     Ok(())
//! }
//! ```
//!
//! ## Parsed results
//!
//! ```ignore
//! if let Some(best) = driver.best_move(fen).await? {
//!     println!("play {}", best.mv);
//! }
//! ```
//!
//! ## Configuration
//!
//! ```ignore
//! use std::time::Duration;
//! use libuci::{config::names, EngineDriver};
//!
//! let driver = EngineDriver::builder()
//!     .engine_path("/usr/games/stockfish")
//!     .movetime(Duration::from_millis(500))
//!     .timeout(Duration::from_secs(5))
//!     .option(names::THREADS, 4)
//!     .build()?;
//! ```
//!
//! ## Lower-level access
//!
//! [`EngineProcess`] exposes the session primitives the driver is built
//! from: write a command, then [`read_until`](EngineProcess::read_until) a
//! predicate accepts a line.

pub mod config;
pub mod driver;
mod error;
pub mod observer;
pub mod position;
pub mod process;
pub mod protocol;

pub use error::{Error, Result};

// Re-export the main driver types at crate root
pub use driver::{DriverState, EngineDriver, EngineDriverBuilder, ProcessSpawner, Spawner};

// Re-export commonly used config types at crate root
pub use config::{EngineConfig, EngineConfigBuilder, EngineOption};

// Re-export observation and validation types at crate root
pub use observer::{EngineObserver, LogLevel, LoggingObserver, NoopObserver};
pub use position::{validate_fen, FenError, FenValidator, PositionValidator, Validation};

// Re-export commonly used protocol and process types at crate root
pub use process::EngineProcess;
pub use protocol::{BestMove, UciCommand};

// Cancellation tokens appear in the public API.
pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    /// All major public types must be Send + Sync for use across async tasks.
    #[test]
    fn public_types_are_send_sync() {
        // Driver types
        assert_send_sync::<EngineDriver>();
        assert_send_sync::<EngineDriverBuilder>();
        assert_send_sync::<DriverState>();

        // Configuration types
        assert_send_sync::<EngineConfig>();
        assert_send_sync::<EngineConfigBuilder>();
        assert_send_sync::<EngineOption>();

        // Collaborators
        assert_send_sync::<LoggingObserver>();
        assert_send_sync::<FenValidator>();
        assert_send_sync::<Validation>();

        // Protocol and process types
        assert_send_sync::<UciCommand>();
        assert_send_sync::<BestMove>();
        assert_send_sync::<EngineProcess>();

        // Error type
        assert_send_sync::<Error>();
    }

    #[test]
    fn evaluate_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}
        let driver = EngineDriver::builder().build().unwrap();
        let future = driver.evaluate("");
        assert_send(&future);
    }
}
