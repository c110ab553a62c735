//! UCI protocol vocabulary.
//!
//! The driver only speaks the subset of UCI needed to ask an engine for a
//! move in a given position:
//!
//! ```text
//! host                          engine
//!  │── uci ───────────────────────▶│
//!  │◀──────────── id ... / uciok ──│
//!  │── setoption name .. value .. ▶│   (zero or more)
//!  │── isready ───────────────────▶│
//!  │◀────────────────── readyok ───│
//!  │── ucinewgame ────────────────▶│
//!  │── position fen <fen> ────────▶│
//!  │── go movetime <ms> ──────────▶│
//!  │◀──────── info ... / bestmove ─│
//!  │── quit ──────────────────────▶│
//! ```
//!
//! # Example
//!
//! ```
//! use libuci::protocol::{BestMove, UciCommand};
//!
//! assert_eq!(UciCommand::IsReady.to_string(), "isready");
//!
//! let best = BestMove::parse("bestmove e2e4 ponder e7e5").unwrap();
//! assert_eq!(best.mv, "e2e4");
//! ```

mod commands;
mod responses;

pub use commands::UciCommand;
pub use responses::{
    is_bestmove, is_readyok, is_uciok, BestMove, BESTMOVE_PREFIX, READYOK, UCIOK,
};
