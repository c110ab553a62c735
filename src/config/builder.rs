//! Engine configuration and builder.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use libuci::config::EngineConfig;
//!
//! let config = EngineConfig::builder()
//!     .engine_path("/usr/games/stockfish")
//!     .movetime(Duration::from_millis(500))
//!     .timeout(Duration::from_secs(5))
//!     .option("Threads", 2)
//!     .build()?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::options::EngineOption;
use crate::observer::{EngineObserver, LoggingObserver};
use crate::position::{FenValidator, PositionValidator};
use crate::{Error, Result};

/// Environment variable that overrides the default engine path.
pub const ENV_ENGINE_PATH: &str = "UCI_ENGINE_PATH";

/// Engine executable used when neither the builder nor the environment
/// names one.
pub const DEFAULT_ENGINE_PATH: &str = "./stockfish";

/// Search time requested with `go movetime` by default.
pub const DEFAULT_MOVETIME: Duration = Duration::from_millis(2000);

/// Added to the movetime to form the read deadline when none is set.
pub const DEFAULT_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// Time a process gets to exit after `quit` before it is killed.
pub const DEFAULT_QUIT_GRACE: Duration = Duration::from_secs(1);

/// Configuration for driving a UCI engine.
///
/// Use [`EngineConfig::builder()`] to create a new configuration.
#[derive(Clone)]
pub struct EngineConfig {
    // Process options
    pub(crate) engine_path: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) working_directory: Option<PathBuf>,
    pub(crate) env_vars: HashMap<String, String>,
    pub(crate) inherit_env: bool,

    // Protocol options
    pub(crate) movetime: Duration,
    pub(crate) options: Vec<EngineOption>,

    // Deadlines
    pub(crate) timeout: Option<Duration>,
    pub(crate) quit_grace: Duration,

    // Collaborators
    pub(crate) observer: Arc<dyn EngineObserver>,
    pub(crate) validator: Arc<dyn PositionValidator>,
}

impl EngineConfig {
    /// Create a new builder for EngineConfig.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Path of the engine executable.
    pub fn engine_path(&self) -> &Path {
        &self.engine_path
    }

    /// Arguments passed to the engine executable.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Search time sent with `go movetime`.
    pub fn movetime(&self) -> Duration {
        self.movetime
    }

    /// Deadline applied to each read.
    ///
    /// Defaults to the movetime plus [`DEFAULT_TIMEOUT_MARGIN`]; `None` only
    /// when disabled with [`EngineConfigBuilder::no_timeout`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Grace period between `quit` and a forced kill.
    pub fn quit_grace(&self) -> Duration {
        self.quit_grace
    }

    /// Options sent with `setoption` during the handshake.
    pub fn options(&self) -> &[EngineOption] {
        &self.options
    }

    /// Get the working directory if set.
    pub fn working_directory(&self) -> Option<&PathBuf> {
        self.working_directory.as_ref()
    }

    /// The observer receiving protocol traffic.
    pub fn observer(&self) -> &Arc<dyn EngineObserver> {
        &self.observer
    }

    /// The validator consulted before spawning.
    pub fn validator(&self) -> &Arc<dyn PositionValidator> {
        &self.validator
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("engine_path", &self.engine_path)
            .field("args", &self.args)
            .field("working_directory", &self.working_directory)
            .field("env_vars", &self.env_vars.keys().collect::<Vec<_>>())
            .field("inherit_env", &self.inherit_env)
            .field("movetime", &self.movetime)
            .field("options", &self.options)
            .field("timeout", &self.timeout)
            .field("quit_grace", &self.quit_grace)
            .finish_non_exhaustive()
    }
}

/// Builder for [`EngineConfig`].
///
/// [`build()`](EngineConfigBuilder::build) validates the configuration. The
/// engine executable itself is only looked up at spawn time.
#[derive(Clone)]
pub struct EngineConfigBuilder {
    engine_path: Option<PathBuf>,
    args: Vec<String>,
    working_directory: Option<PathBuf>,
    env_vars: HashMap<String, String>,
    inherit_env: bool,
    movetime: Duration,
    options: Vec<EngineOption>,
    timeout: Option<Duration>,
    no_timeout: bool,
    quit_grace: Duration,
    observer: Option<Arc<dyn EngineObserver>>,
    validator: Option<Arc<dyn PositionValidator>>,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self {
            engine_path: None,
            args: Vec::new(),
            working_directory: None,
            env_vars: HashMap::new(),
            inherit_env: true,
            movetime: DEFAULT_MOVETIME,
            options: Vec::new(),
            timeout: None,
            no_timeout: false,
            quit_grace: DEFAULT_QUIT_GRACE,
            observer: None,
            validator: None,
        }
    }
}

impl fmt::Debug for EngineConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfigBuilder")
            .field("engine_path", &self.engine_path)
            .field("movetime", &self.movetime)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl EngineConfigBuilder {
    // -------------------------------------------------------------------------
    // Process options
    // -------------------------------------------------------------------------

    /// Path to the engine executable (default: `$UCI_ENGINE_PATH`, then
    /// `./stockfish`).
    pub fn engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.engine_path = Some(path.into());
        self
    }

    /// Append an argument for the engine executable (default: none).
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Working directory for the engine process.
    pub fn working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(path.into());
        self
    }

    /// Add/override environment variable for the engine process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Don't inherit parent environment (default: inherit).
    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    // -------------------------------------------------------------------------
    // Protocol options
    // -------------------------------------------------------------------------

    /// Search time per request (default: 2 seconds).
    pub fn movetime(mut self, movetime: Duration) -> Self {
        self.movetime = movetime;
        self
    }

    /// Send `setoption name <name> value <value>` during the handshake.
    pub fn option(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.options.push(EngineOption::new(name, value));
        self
    }

    /// Send a prepared [`EngineOption`] during the handshake.
    pub fn engine_option(mut self, option: EngineOption) -> Self {
        self.options.push(option);
        self
    }

    // -------------------------------------------------------------------------
    // Deadlines
    // -------------------------------------------------------------------------

    /// Deadline for each read from the engine (default: movetime plus
    /// [`DEFAULT_TIMEOUT_MARGIN`]).
    ///
    /// The deadline must exceed the movetime.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self.no_timeout = false;
        self
    }

    /// Wait for the engine indefinitely.
    ///
    /// An engine that never answers then hangs the request unless the
    /// caller cancels it.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self.no_timeout = true;
        self
    }

    /// Time an engine gets to exit after `quit` before being killed
    /// (default: 1 second).
    pub fn quit_grace(mut self, grace: Duration) -> Self {
        self.quit_grace = grace;
        self
    }

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------

    /// Observer for protocol traffic (default: [`LoggingObserver`]).
    pub fn observer(mut self, observer: Arc<dyn EngineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validator consulted before spawning (default: [`FenValidator`]).
    pub fn validator(mut self, validator: Arc<dyn PositionValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    // -------------------------------------------------------------------------
    // Build
    // -------------------------------------------------------------------------

    /// Build the configuration.
    ///
    /// This validates:
    /// - movetime is non-zero
    /// - the timeout, if set, is longer than the movetime
    ///
    /// An unset timeout becomes the movetime plus [`DEFAULT_TIMEOUT_MARGIN`].
    /// - option names are non-empty and single-line
    /// - the working directory exists if specified
    pub fn build(self) -> Result<EngineConfig> {
        if self.movetime.is_zero() {
            return Err(Error::InvalidConfig("movetime must be positive".into()));
        }

        if let Some(timeout) = self.timeout {
            if timeout <= self.movetime {
                return Err(Error::InvalidConfig(format!(
                    "timeout ({timeout:?}) must exceed movetime ({:?})",
                    self.movetime
                )));
            }
        }

        for option in &self.options {
            let multiline = |s: &str| s.contains('\n') || s.contains('\r');
            if option.name.trim().is_empty() {
                return Err(Error::InvalidConfig("option name must not be empty".into()));
            }
            if multiline(option.name.as_str()) || option.value.as_deref().is_some_and(multiline) {
                return Err(Error::InvalidConfig(format!(
                    "option {:?} must not contain line breaks",
                    option.name
                )));
            }
        }

        if let Some(ref dir) = self.working_directory {
            if !dir.exists() {
                return Err(Error::InvalidConfig(format!(
                    "working directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        let timeout = match self.timeout {
            Some(timeout) => Some(timeout),
            None if self.no_timeout => None,
            None => Some(self.movetime.saturating_add(DEFAULT_TIMEOUT_MARGIN)),
        };

        let engine_path = self
            .engine_path
            .or_else(|| std::env::var_os(ENV_ENGINE_PATH).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE_PATH));

        Ok(EngineConfig {
            engine_path,
            args: self.args,
            working_directory: self.working_directory,
            env_vars: self.env_vars,
            inherit_env: self.inherit_env,
            movetime: self.movetime,
            options: self.options,
            timeout,
            quit_grace: self.quit_grace,
            observer: self
                .observer
                .unwrap_or_else(|| Arc::new(LoggingObserver::new())),
            validator: self.validator.unwrap_or_else(|| Arc::new(FenValidator::new())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Validation;

    #[test]
    fn defaults() {
        let config = EngineConfig::builder()
            .engine_path("./stockfish")
            .build()
            .unwrap();

        assert_eq!(config.engine_path(), Path::new("./stockfish"));
        assert!(config.args().is_empty());
        assert_eq!(config.movetime(), DEFAULT_MOVETIME);
        assert_eq!(config.quit_grace(), DEFAULT_QUIT_GRACE);
        assert_eq!(
            config.timeout(),
            Some(DEFAULT_MOVETIME + DEFAULT_TIMEOUT_MARGIN)
        );
        assert!(config.options().is_empty());
        assert!(config.inherit_env, "inherit_env should default to true");
    }

    #[test]
    fn builder_chains_options() {
        let config = EngineConfig::builder()
            .engine_path("/usr/games/stockfish")
            .arg("--uci")
            .movetime(Duration::from_millis(100))
            .timeout(Duration::from_secs(5))
            .quit_grace(Duration::from_millis(50))
            .option("Threads", 2)
            .engine_option(EngineOption::button("Clear Hash"))
            .env("KEY", "VALUE")
            .inherit_env(false)
            .build()
            .unwrap();

        assert_eq!(config.args(), ["--uci".to_string()]);
        assert_eq!(config.movetime(), Duration::from_millis(100));
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.options().len(), 2);
        assert_eq!(config.env_vars.get("KEY"), Some(&"VALUE".to_string()));
        assert!(!config.inherit_env);
    }

    #[test]
    fn default_timeout_follows_movetime() {
        let config = EngineConfig::builder()
            .movetime(Duration::from_millis(500))
            .build()
            .unwrap();
        assert_eq!(
            config.timeout(),
            Some(Duration::from_millis(500) + DEFAULT_TIMEOUT_MARGIN)
        );
    }

    #[test]
    fn no_timeout_disables_deadline() {
        let config = EngineConfig::builder().no_timeout().build().unwrap();
        assert_eq!(config.timeout(), None);

        let config = EngineConfig::builder()
            .no_timeout()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_movetime_rejected() {
        let result = EngineConfig::builder().movetime(Duration::ZERO).build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn timeout_must_exceed_movetime() {
        let result = EngineConfig::builder()
            .movetime(Duration::from_secs(2))
            .timeout(Duration::from_secs(1))
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn bad_option_names_rejected() {
        let result = EngineConfig::builder().option("  ", 1).build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        let result = EngineConfig::builder().option("Hash", "1\ngo").build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn invalid_working_directory() {
        let result = EngineConfig::builder()
            .working_directory("/nonexistent/path/that/does/not/exist")
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn custom_validator() {
        let validator: Arc<dyn PositionValidator> = Arc::new(|_: &str| Validation::Valid);
        let config = EngineConfig::builder()
            .validator(validator)
            .build()
            .unwrap();
        assert!(config.validator().validate("anything").is_valid());
    }

    #[test]
    fn default_validator_is_fen() {
        let config = EngineConfig::builder().build().unwrap();
        assert!(!config.validator().validate("not-a-fen").is_valid());
    }

    #[test]
    fn debug_hides_env_values() {
        let config = EngineConfig::builder()
            .env("SECRET", "hunter2")
            .build()
            .unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("SECRET"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineConfig>();
        assert_send_sync::<EngineConfigBuilder>();
    }
}
