//! High-level engine driver for evaluating positions.
//!
//! This module provides [`EngineDriver`], the main entry point for asking a
//! UCI engine for its move in a position.
//!
//! # Example
//!
//! ```ignore
//! use libuci::{EngineDriver, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let driver = EngineDriver::new()?;
//!
//!     let lines = driver
//!         .evaluate("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
//!         .await?;
//!     println!("{}", lines.join("\n"));
//!
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{EngineConfig, EngineConfigBuilder, EngineOption};
use crate::observer::EngineObserver;
use crate::position::{PositionValidator, Validation};
use crate::process::EngineProcess;
use crate::protocol::{is_bestmove, is_readyok, is_uciok, BestMove, UciCommand};
use crate::Result;

/// Protocol state of a single evaluation.
///
/// States advance strictly in declaration order; an evaluation never moves
/// backwards. A failed evaluation jumps straight to `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverState {
    /// The engine process is running.
    Spawned,
    /// `uci` was sent.
    HandshakeSent,
    /// The engine answered `readyok`.
    Ready,
    /// `ucinewgame` and `position fen` were sent.
    PositionSet,
    /// `go movetime` was sent.
    ComputeRequested,
    /// The `bestmove` line arrived.
    ResultReceived,
    /// The process was told to quit or was killed.
    Terminated,
}

impl DriverState {
    /// Wire-style name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverState::Spawned => "spawned",
            DriverState::HandshakeSent => "handshake_sent",
            DriverState::Ready => "ready",
            DriverState::PositionSet => "position_set",
            DriverState::ComputeRequested => "compute_requested",
            DriverState::ResultReceived => "result_received",
            DriverState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Starts engine sessions for the driver.
///
/// The default [`ProcessSpawner`] launches the configured executable.
/// Implement this to run evaluations against something else, such as an
/// in-memory engine built with [`EngineProcess::from_io`].
///
/// The driver applies the config's observer, timeout and quit grace to the
/// returned session.
pub trait Spawner: Send + Sync {
    /// Start a fresh engine session.
    fn spawn(&self, config: &EngineConfig) -> Result<EngineProcess>;
}

/// Spawns the configured engine executable as an OS process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn(&self, config: &EngineConfig) -> Result<EngineProcess> {
        EngineProcess::spawn(config)
    }
}

/// Drives a UCI engine through one evaluation per call.
///
/// Every call to [`evaluate`](Self::evaluate) spawns its own engine
/// process, runs the handshake, sends the position, waits for `bestmove`
/// and tells the engine to quit.
///
/// # Thread Safety
///
/// `EngineDriver` is `Send + Sync` and cheap to clone. Concurrent calls each
/// get their own process and never share output.
#[derive(Clone)]
pub struct EngineDriver {
    config: Arc<EngineConfig>,
    spawner: Arc<dyn Spawner>,
}

impl EngineDriver {
    /// Create a driver with the default configuration.
    ///
    /// The engine is `$UCI_ENGINE_PATH` if set, otherwise `./stockfish`.
    /// Each read gives up after the movetime plus
    /// [`DEFAULT_TIMEOUT_MARGIN`](crate::config::DEFAULT_TIMEOUT_MARGIN).
    pub fn new() -> Result<Self> {
        let config = EngineConfig::builder().build()?;
        Ok(Self::with_config(config))
    }

    /// Create a driver with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
            spawner: Arc::new(ProcessSpawner),
        }
    }

    /// Create a builder for configuring a new driver.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let driver = EngineDriver::builder()
    ///     .engine_path("/usr/games/stockfish")
    ///     .movetime(Duration::from_millis(500))
    ///     .timeout(Duration::from_secs(5))
    ///     .build()?;
    /// ```
    pub fn builder() -> EngineDriverBuilder {
        EngineDriverBuilder::new()
    }

    /// Get the driver's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate a position and return the engine's output.
    ///
    /// Returns every line the engine printed after `go`, ending with the
    /// `bestmove` line. An empty or invalid position yields an empty vector
    /// and no engine is started.
    ///
    /// # Errors
    ///
    /// Spawn errors, write errors and read errors. A failed read kills the
    /// engine before the error is returned; nothing partial is returned.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let lines = driver.evaluate("8/8/8/8/8/8/8/K1k5 w - - 0 1").await?;
    /// assert!(lines.last().is_some_and(|l| l.starts_with("bestmove")));
    /// ```
    pub async fn evaluate(&self, position: &str) -> Result<Vec<String>> {
        self.evaluate_with_cancel(position, &CancellationToken::new())
            .await
    }

    /// Like [`evaluate`](Self::evaluate), but stops early when `cancel`
    /// fires.
    ///
    /// Cancellation kills the engine and returns
    /// [`Error::Cancelled`](crate::Error::Cancelled).
    pub async fn evaluate_with_cancel(
        &self,
        position: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        if !self.accepts(position) {
            return Ok(Vec::new());
        }

        let observer = self.config.observer();
        let mut process = match self.spawn() {
            Ok(process) => process,
            Err(e) => {
                observer.on_error(&e);
                return Err(e);
            }
        };
        tracing::debug!(pid = ?process.pid(), "evaluating position");

        match self.exchange(&mut process, position, cancel).await {
            Ok(lines) => {
                process.terminate().await;
                self.enter(DriverState::Terminated);
                Ok(lines)
            }
            Err(e) => {
                tracing::debug!(pid = ?process.pid(), error = %e, "evaluation failed");
                observer.on_error(&e);
                process.kill();
                self.enter(DriverState::Terminated);
                Err(e)
            }
        }
    }

    /// Evaluate a position and parse the engine's chosen move.
    ///
    /// Returns `None` for an empty or invalid position, and when the engine
    /// has no legal move to offer.
    pub async fn best_move(&self, position: &str) -> Result<Option<BestMove>> {
        let lines = self.evaluate(position).await?;
        Ok(BestMove::from_lines(lines.as_slice()))
    }

    fn accepts(&self, position: &str) -> bool {
        if position.trim().is_empty() {
            tracing::debug!("empty position, skipping evaluation");
            return false;
        }

        match self.config.validator().validate(position) {
            Validation::Valid => true,
            Validation::Invalid(reason) => {
                tracing::debug!(%position, %reason, "invalid position, skipping evaluation");
                false
            }
        }
    }

    fn spawn(&self) -> Result<EngineProcess> {
        let process = self
            .spawner
            .spawn(&self.config)?
            .with_observer(Arc::clone(self.config.observer()))
            .with_timeout(self.config.timeout())
            .with_quit_grace(self.config.quit_grace());
        self.enter(DriverState::Spawned);
        Ok(process)
    }

    async fn exchange(
        &self,
        process: &mut EngineProcess,
        position: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        process.write(&UciCommand::Uci).await?;
        self.enter(DriverState::HandshakeSent);
        process.read_until_with(is_uciok, cancel).await?;

        for option in self.config.options() {
            process.write(&option.to_command()).await?;
        }

        process.write(&UciCommand::IsReady).await?;
        process.read_until_with(is_readyok, cancel).await?;
        self.enter(DriverState::Ready);

        process.write(&UciCommand::NewGame).await?;
        process
            .write(&UciCommand::PositionFen(position.to_string()))
            .await?;
        self.enter(DriverState::PositionSet);

        process
            .write(&UciCommand::GoMovetime(self.config.movetime()))
            .await?;
        self.enter(DriverState::ComputeRequested);

        let lines = process.read_until_with(is_bestmove, cancel).await?;
        self.enter(DriverState::ResultReceived);
        Ok(lines)
    }

    fn enter(&self, state: DriverState) {
        self.config.observer().on_state(state);
    }
}

impl fmt::Debug for EngineDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineDriver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for creating an [`EngineDriver`] with custom configuration.
///
/// Wraps [`EngineConfigBuilder`] and adds the choice of [`Spawner`].
#[derive(Default)]
pub struct EngineDriverBuilder {
    config: EngineConfigBuilder,
    spawner: Option<Arc<dyn Spawner>>,
}

impl EngineDriverBuilder {
    /// Create a new driver builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the driver with the configured options.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<EngineDriver> {
        let config = self.config.build()?;
        Ok(EngineDriver {
            config: Arc::new(config),
            spawner: self.spawner.unwrap_or_else(|| Arc::new(ProcessSpawner)),
        })
    }

    // -------------------------------------------------------------------------
    // Process options
    // -------------------------------------------------------------------------

    /// Set the engine executable path.
    pub fn engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = self.config.engine_path(path);
        self
    }

    /// Append an argument for the engine executable.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.config = self.config.arg(arg);
        self
    }

    /// Set the working directory for the engine process.
    pub fn working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = self.config.working_directory(path);
        self
    }

    /// Add an environment variable for the engine process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config = self.config.env(key, value);
        self
    }

    /// Set whether to inherit the parent's environment.
    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.config = self.config.inherit_env(inherit);
        self
    }

    /// Use `spawner` instead of launching the executable.
    pub fn spawner(mut self, spawner: Arc<dyn Spawner>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    // -------------------------------------------------------------------------
    // Protocol options
    // -------------------------------------------------------------------------

    /// Set the search time per evaluation.
    pub fn movetime(mut self, movetime: Duration) -> Self {
        self.config = self.config.movetime(movetime);
        self
    }

    /// Send a `setoption` during the handshake.
    pub fn option(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.config = self.config.option(name, value);
        self
    }

    /// Send a prepared [`EngineOption`] during the handshake.
    pub fn engine_option(mut self, option: EngineOption) -> Self {
        self.config = self.config.engine_option(option);
        self
    }

    // -------------------------------------------------------------------------
    // Deadlines
    // -------------------------------------------------------------------------

    /// Set the deadline for each read from the engine.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.config = self.config.timeout(duration);
        self
    }

    /// Disable the read deadline.
    pub fn no_timeout(mut self) -> Self {
        self.config = self.config.no_timeout();
        self
    }

    /// Set the grace period between `quit` and a forced kill.
    pub fn quit_grace(mut self, grace: Duration) -> Self {
        self.config = self.config.quit_grace(grace);
        self
    }

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------

    /// Set an observer for protocol traffic.
    pub fn observer(mut self, observer: Arc<dyn EngineObserver>) -> Self {
        self.config = self.config.observer(observer);
        self
    }

    /// Set the position validator.
    pub fn validator(mut self, validator: Arc<dyn PositionValidator>) -> Self {
        self.config = self.config.validator(validator);
        self
    }
}

impl fmt::Debug for EngineDriverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineDriverBuilder")
            .field("config", &self.config)
            .field("custom_spawner", &self.spawner.is_some())
            .finish()
    }
}
