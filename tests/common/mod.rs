//! Test utilities for libuci integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;

use libuci::{DriverState, EngineConfig, EngineObserver, EngineProcess, Error, Result, Spawner};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// What the scripted engine does when it receives a command.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Write the bytes in one go.
    Send(String),
    /// Write each piece separately, yielding in between.
    Chunks(Vec<String>),
    /// Write the bytes, then close stdout.
    SendThenClose(String),
    /// Close stdout and stop reading commands.
    Close,
}

/// A fake engine spawner backed by in-memory pipes.
///
/// Each spawn starts a task that reads commands line by line and answers
/// the first matching rule. Commands without a rule are recorded and
/// ignored, like a real engine ignores `ucinewgame` or `setoption`.
pub struct ScriptedEngine {
    rules: Vec<(String, Reply)>,
    spawns: AtomicUsize,
    commands: Arc<Mutex<Vec<String>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ScriptedEngine {
    /// An engine that never answers anything.
    pub fn silent() -> Self {
        Self {
            rules: Vec::new(),
            spawns: AtomicUsize::new(0),
            commands: Arc::new(Mutex::new(Vec::new())),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// An engine that completes the handshake and answers `go` with
    /// `go_reply`.
    pub fn standard(go_reply: &str) -> Self {
        Self::silent()
            .on("uci", Reply::Send("id name Scripted\nid author libuci\nuciok\n".into()))
            .on("isready", Reply::Send("readyok\n".into()))
            .on("go", Reply::Send(go_reply.into()))
    }

    /// Answer commands equal to `command`, or starting with `command `.
    ///
    /// Later rules take precedence over earlier ones.
    pub fn on(mut self, command: &str, reply: Reply) -> Self {
        self.rules.insert(0, (command.to_string(), reply));
        self
    }

    /// Number of engines spawned so far.
    pub fn spawns(&self) -> usize {
        self.spawns.load(Ordering::SeqCst)
    }

    /// Every command received, across all spawns.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Wait for every spawned engine task to finish.
    pub async fn join(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap());
        for task in tasks {
            task.await.unwrap();
        }
    }
}

impl Spawner for ScriptedEngine {
    fn spawn(&self, _config: &EngineConfig) -> Result<EngineProcess> {
        self.spawns.fetch_add(1, Ordering::SeqCst);

        let (host_in, engine_in) = tokio::io::duplex(4096);
        let (mut engine_out, host_out) = tokio::io::duplex(4096);
        let rules = self.rules.clone();
        let commands = Arc::clone(&self.commands);

        let task = tokio::spawn(async move {
            let mut lines = BufReader::new(engine_in).lines();
            while let Ok(Some(command)) = lines.next_line().await {
                commands.lock().unwrap().push(command.clone());
                if command == "quit" {
                    break;
                }

                let reply = rules.iter().find(|(prefix, _)| {
                    command == *prefix || command.starts_with(&format!("{prefix} "))
                });
                let ok = match reply {
                    None => true,
                    Some((_, Reply::Send(text))) => write(&mut engine_out, text).await,
                    Some((_, Reply::Chunks(pieces))) => {
                        let mut ok = true;
                        for piece in pieces {
                            ok = ok && write(&mut engine_out, piece).await;
                            tokio::task::yield_now().await;
                        }
                        ok
                    }
                    Some((_, Reply::SendThenClose(text))) => {
                        write(&mut engine_out, text).await;
                        false
                    }
                    Some((_, Reply::Close)) => false,
                };
                if !ok {
                    break;
                }
            }
        });
        self.tasks.lock().unwrap().push(task);

        Ok(EngineProcess::from_io(host_in, host_out))
    }
}

async fn write(out: &mut tokio::io::DuplexStream, text: &str) -> bool {
    out.write_all(text.as_bytes()).await.is_ok() && out.flush().await.is_ok()
}

/// Observer that keeps everything it is told.
#[derive(Default)]
pub struct RecordingObserver {
    pub commands: Mutex<Vec<String>>,
    pub lines: Mutex<Vec<String>>,
    pub states: Mutex<Vec<DriverState>>,
    pub errors: Mutex<Vec<String>>,
}

impl EngineObserver for RecordingObserver {
    fn on_command(&self, command: &str) {
        self.commands.lock().unwrap().push(command.to_string());
    }

    fn on_line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    fn on_state(&self, state: DriverState) {
        self.states.lock().unwrap().push(state);
    }

    fn on_error(&self, error: &Error) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}
