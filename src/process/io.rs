//! I/O primitives for communicating with the engine subprocess.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{Error, Result};

/// Size of the buffer each stdout read fills at most.
pub const CHUNK_SIZE: usize = 4096;

/// Chunks buffered between the pump task and the reader.
pub const CHANNEL_CAPACITY: usize = 64;

/// A raw chunk of engine output, or the error that ended the stream.
pub type Chunk = std::io::Result<Vec<u8>>;

/// Receiving end of a session's output channel.
///
/// The channel closes when the engine's stdout reaches EOF. A read error is
/// delivered as a final `Err` item before the close.
pub type ChunkReceiver = mpsc::Receiver<Chunk>;

/// Start a task that forwards raw chunks from `stdout` into a channel.
///
/// Chunks are forwarded in arrival order without any framing; line
/// splitting happens on the receiving side.
pub fn spawn_pump<R>(stdout: R) -> (ChunkReceiver, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = tokio::spawn(pump(stdout, tx));
    (rx, handle)
}

async fn pump<R>(mut stdout: R, tx: mpsc::Sender<Chunk>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        // Check if the session is still interested
        if tx.is_closed() {
            return;
        }

        match stdout.read(&mut buf).await {
            Ok(0) => {
                tracing::trace!("engine stdout reached EOF");
                return;
            }
            Ok(n) => {
                if tx.send(Ok(buf[..n].to_vec())).await.is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!(error = %e, "engine stdout read failed");
                let _ = tx.send(Err(e)).await;
                return;
            }
        }
    }
}

/// Writes newline-terminated commands to the engine's stdin.
pub struct ProcessWriter {
    stdin: Box<dyn AsyncWrite + Send + Sync + Unpin>,
}

impl ProcessWriter {
    /// Create a new writer from any async byte sink.
    pub fn new<W>(stdin: W) -> Self
    where
        W: AsyncWrite + Send + Sync + Unpin + 'static,
    {
        Self {
            stdin: Box::new(stdin),
        }
    }

    /// Write `command` followed by `\n` and flush.
    ///
    /// Backpressure is left to the OS pipe.
    pub async fn write_line(&mut self, command: &str) -> Result<()> {
        let mut line = String::with_capacity(command.len() + 1);
        line.push_str(command);
        line.push('\n');

        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(Error::io)?;
        self.stdin.flush().await.map_err(Error::io)?;
        Ok(())
    }

    /// Close the engine's stdin, signalling end of input.
    pub async fn shutdown(mut self) -> Result<()> {
        self.stdin.shutdown().await.map_err(Error::io)
    }
}
