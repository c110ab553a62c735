//! Waiting for a matching line on an engine's output.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout as tokio_timeout;
use tokio_util::sync::CancellationToken;

use super::io::ChunkReceiver;
use super::lines::LineAccumulator;
use crate::{Error, Result};

/// Read chunks until `predicate` accepts a line, returning every line seen.
///
/// After each chunk the predicate is tried on the newest complete line and,
/// failing that, on the unterminated backlog. A backlog match is appended as
/// the final line, so a terminal line the engine did not newline-terminate
/// still ends the read. The predicate runs at most twice per chunk.
///
/// The call settles exactly once:
/// - `Ok(lines)` on a match
/// - [`Error::Stream`] if the stream delivers an I/O error
/// - [`Error::StreamClosed`] if the stream ends first
///
/// Both errors carry the lines received so far. The line buffer and backlog
/// live only for this call; chunks that arrive after the match stay in the
/// channel for the next read.
///
/// There is no deadline here; see [`read_until_with`].
pub async fn read_until<P>(chunks: &mut ChunkReceiver, predicate: P) -> Result<Vec<String>>
where
    P: Fn(&str) -> bool,
{
    let mut accumulator = LineAccumulator::new();
    let mut lines: Vec<String> = Vec::new();

    loop {
        match chunks.recv().await {
            Some(Ok(chunk)) => {
                lines.extend(accumulator.feed(&chunk));

                if lines.last().is_some_and(|line| predicate(line.as_str())) {
                    discard_backlog(&accumulator);
                    return Ok(lines);
                }

                if !accumulator.is_empty() && predicate(&*accumulator.backlog()) {
                    lines.push(accumulator.take_backlog());
                    return Ok(lines);
                }
            }
            Some(Err(source)) => return Err(Error::Stream { source, lines }),
            None => return Err(Error::StreamClosed { lines }),
        }
    }
}

/// [`read_until`] bounded by an optional deadline and a cancellation token.
///
/// Expiry settles with [`Error::Timeout`], cancellation with
/// [`Error::Cancelled`]. Lines gathered before either are dropped. Callers
/// owning the process are expected to kill it afterwards, since its output
/// position is unknown.
pub async fn read_until_with<P>(
    chunks: &mut ChunkReceiver,
    predicate: P,
    deadline: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<Vec<String>>
where
    P: Fn(&str) -> bool,
{
    let read = async {
        match deadline {
            Some(duration) => with_timeout(duration, read_until(chunks, predicate)).await,
            None => read_until(chunks, predicate).await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = read => result,
    }
}

/// Wrap a future with a timeout.
///
/// If the future doesn't complete within the given duration,
/// returns `Error::Timeout`.
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio_timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(duration)),
    }
}

fn discard_backlog(accumulator: &LineAccumulator) {
    if !accumulator.is_empty() {
        tracing::trace!(backlog = %accumulator.backlog(), "discarding output after matched line");
    }
}
