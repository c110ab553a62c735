//! Process spawning and lifecycle management.

use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::io::{spawn_pump, ChunkReceiver, ProcessWriter};
use super::reader::read_until_with;
use crate::config::{EngineConfig, DEFAULT_QUIT_GRACE};
use crate::observer::{EngineObserver, LoggingObserver};
use crate::protocol::UciCommand;
use crate::{Error, Result};

/// A running engine session.
///
/// Owns the engine process for its whole life: spawn, any number of
/// [`write`](Self::write) / [`read_until`](Self::read_until) exchanges, then
/// [`terminate`](Self::terminate). Reads take `&mut self`, so at most one
/// read is pending per session.
///
/// # Cancellation
///
/// Dropping an `EngineProcess` will kill the subprocess if it's still running.
pub struct EngineProcess {
    child: Option<Child>,
    writer: Option<ProcessWriter>,
    chunks: ChunkReceiver,
    pump: JoinHandle<()>,
    pid: Option<u32>,
    observer: Arc<dyn EngineObserver>,
    timeout: Option<Duration>,
    quit_grace: Duration,
    terminated: bool,
}

impl EngineProcess {
    /// Spawn the configured engine executable.
    ///
    /// The engine gets piped stdin/stdout and a discarded stderr.
    pub fn spawn(config: &EngineConfig) -> Result<Self> {
        let mut cmd = build_command(config);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::EngineNotFound {
                    path: config.engine_path().display().to_string(),
                }
            } else {
                Error::ProcessSpawn(e)
            }
        })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.start_kill();
            return Err(Error::ProcessSpawn(std::io::Error::new(
                std::io::ErrorKind::Other,
                "engine stdio was not captured",
            )));
        };

        let pid = child.id();
        tracing::debug!(?pid, path = %config.engine_path().display(), "spawned engine");

        let mut process = Self::from_io(stdin, stdout)
            .with_observer(Arc::clone(config.observer()))
            .with_timeout(config.timeout())
            .with_quit_grace(config.quit_grace());
        process.child = Some(child);
        process.pid = pid;
        Ok(process)
    }

    /// Build a session over arbitrary stdin/stdout halves.
    ///
    /// There is no process to kill; `terminate` and `kill` only close the
    /// streams. Useful for in-memory pipes in tests and for engines reached
    /// over a socket.
    pub fn from_io<W, R>(stdin: W, stdout: R) -> Self
    where
        W: AsyncWrite + Send + Sync + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let (chunks, pump) = spawn_pump(stdout);
        Self {
            child: None,
            writer: Some(ProcessWriter::new(stdin)),
            chunks,
            pump,
            pid: None,
            observer: Arc::new(LoggingObserver::new()),
            timeout: None,
            quit_grace: DEFAULT_QUIT_GRACE,
            terminated: false,
        }
    }

    /// Report traffic to `observer` instead of the default logger.
    pub fn with_observer(mut self, observer: Arc<dyn EngineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Apply `timeout` to every [`read_until`](Self::read_until).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Time the engine gets to exit after `quit` before it is killed.
    pub fn with_quit_grace(mut self, grace: Duration) -> Self {
        self.quit_grace = grace;
        self
    }

    /// Write one command line to the engine.
    pub async fn write(&mut self, command: &UciCommand) -> Result<()> {
        self.write_raw(&command.to_string()).await
    }

    /// Write an arbitrary line to the engine; a `\n` is appended.
    pub async fn write_raw(&mut self, line: &str) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::SessionTerminated)?;
        writer.write_line(line).await?;
        self.observer.on_command(line);
        Ok(())
    }

    /// Read until `predicate` accepts a line, under the session's timeout.
    ///
    /// See [`read_until`](super::read_until) for the matching rules.
    pub async fn read_until<P>(&mut self, predicate: P) -> Result<Vec<String>>
    where
        P: Fn(&str) -> bool,
    {
        let cancel = CancellationToken::new();
        self.read_until_with(predicate, &cancel).await
    }

    /// Read until `predicate` accepts a line, or until `cancel` fires or the
    /// session's timeout expires.
    ///
    /// Timeouts and cancellation kill the process: its output is no longer
    /// in step with the exchange.
    pub async fn read_until_with<P>(
        &mut self,
        predicate: P,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>>
    where
        P: Fn(&str) -> bool,
    {
        if self.terminated {
            return Err(Error::SessionTerminated);
        }

        let result = read_until_with(&mut self.chunks, predicate, self.timeout, cancel).await;

        match &result {
            Ok(lines) => {
                for line in lines {
                    self.observer.on_line(line);
                }
            }
            Err(e) => {
                for line in e.partial_lines() {
                    self.observer.on_line(line);
                }
                if matches!(e, Error::Timeout(_) | Error::Cancelled) {
                    self.kill();
                }
            }
        }

        result
    }

    /// Ask the engine to quit and detach from it.
    ///
    /// Sends `quit`, closes stdin and hands the process to a background
    /// task that kills it if it is still running after the grace period.
    /// Does not wait for the exit. Calling it again is a no-op.
    pub async fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;

        if let Some(mut writer) = self.writer.take() {
            let quit = UciCommand::Quit.to_string();
            match writer.write_line(&quit).await {
                Ok(()) => self.observer.on_command(&quit),
                Err(e) => tracing::debug!(error = %e, pid = ?self.pid, "could not send quit"),
            }
            let _ = writer.shutdown().await;
        }

        if let Some(child) = self.child.take() {
            reap(child, self.quit_grace, self.pid);
        }
    }

    /// Kill the engine immediately. Calling it again is a no-op.
    pub fn kill(&mut self) {
        self.terminated = true;
        self.writer = None;
        self.pump.abort();

        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, pid = ?self.pid, "kill failed");
            }
            // tokio reaps dropped children in the background
        }
    }

    /// Get the process ID of the engine, if it is an OS process.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Whether `terminate` or `kill` has run.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        // Try to kill the process if it's still running
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
        self.pump.abort();
    }
}

impl fmt::Debug for EngineProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineProcess")
            .field("pid", &self.pid)
            .field("timeout", &self.timeout)
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}

/// Wait up to `grace` for `child` to exit in the background, then kill it.
fn reap(mut child: Child, grace: Duration, pid: Option<u32>) {
    tokio::spawn(async move {
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => tracing::trace!(?pid, %status, "engine exited"),
            Ok(Err(e)) => tracing::debug!(?pid, error = %e, "waiting for engine failed"),
            Err(_) => {
                tracing::debug!(?pid, ?grace, "engine ignored quit, killing");
                let _ = child.kill().await;
            }
        }
    });
}

/// Build a tokio Command from the config.
fn build_command(config: &EngineConfig) -> Command {
    let mut cmd = Command::new(config.engine_path());
    cmd.args(config.args());

    // Set working directory if specified
    if let Some(dir) = config.working_directory() {
        cmd.current_dir(dir);
    }

    // Set environment
    if !config.inherit_env {
        cmd.env_clear();
    }
    cmd.envs(&config.env_vars);

    cmd
}
