//! Process management for UCI engines.
//!
//! This module handles spawning and talking to the engine subprocess. Each
//! evaluation spawns its own process and tears it down afterwards.
//!
//! # Architecture
//!
//! ```text
//! libuci                                          engine
//! ┌───────────────┐                             ┌──────────┐
//! │ EngineProcess │────stdin (commands)────────▶│          │
//! │               │                             │          │
//! │ read_until ◀──┼── mpsc ◀── pump task ◀──────│ stdout   │
//! └───────────────┘                             └──────────┘
//! ```
//!
//! The pump task forwards raw stdout chunks. [`read_until`] splits them into
//! lines with a [`LineAccumulator`] and stops at the first line a predicate
//! accepts.
//!
//! # Output framing
//!
//! Lines end at `\n`; surrounding whitespace (including a trailing `\r`) is
//! trimmed. A partial line still waiting for its newline is the backlog, and
//! can end a read on its own.

mod io;
mod lines;
mod reader;
mod spawn;

pub use io::{spawn_pump, Chunk, ChunkReceiver, ProcessWriter, CHANNEL_CAPACITY, CHUNK_SIZE};
pub use lines::LineAccumulator;
pub use reader::{read_until, read_until_with, with_timeout};
pub use spawn::EngineProcess;
