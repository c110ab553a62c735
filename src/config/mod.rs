//! Configuration for the engine driver.
//!
//! This module provides:
//!
//! - [`EngineConfig`] and [`EngineConfigBuilder`] for configuring the driver
//! - [`EngineOption`] for `setoption` values sent during the handshake
//! - Well-known option names in [`names`]
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use libuci::config::{names, EngineConfig};
//!
//! let config = EngineConfig::builder()
//!     .engine_path("/usr/games/stockfish")
//!     .option(names::THREADS, 4)
//!     .option(names::HASH, 256)
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//! ```
//!
//! # Engine path
//!
//! The engine executable is resolved at build time:
//!
//! 1. [`EngineConfigBuilder::engine_path`] if set
//! 2. the `UCI_ENGINE_PATH` environment variable
//! 3. `./stockfish`

pub mod builder;
pub mod options;

pub use builder::{
    EngineConfig, EngineConfigBuilder, DEFAULT_ENGINE_PATH, DEFAULT_MOVETIME, DEFAULT_QUIT_GRACE,
    DEFAULT_TIMEOUT_MARGIN, ENV_ENGINE_PATH,
};
pub use options::{names, EngineOption};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_exports_accessible() {
        let _: EngineOption = EngineOption::new(names::HASH, 16);
        let _: &str = DEFAULT_ENGINE_PATH;
        let _: &str = ENV_ENGINE_PATH;
        assert!(!DEFAULT_MOVETIME.is_zero());
        assert!(!DEFAULT_QUIT_GRACE.is_zero());
        assert!(!DEFAULT_TIMEOUT_MARGIN.is_zero());
    }

    #[test]
    fn builder_accessible() {
        let _ = EngineConfig::builder();
    }
}
