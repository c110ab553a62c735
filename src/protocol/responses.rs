//! Response tokens and the parsed search result.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Acknowledges `uci` once the engine has listed its id and options.
pub const UCIOK: &str = "uciok";

/// Acknowledges `isready`.
pub const READYOK: &str = "readyok";

/// Prefix of the line that ends a search.
pub const BESTMOVE_PREFIX: &str = "bestmove";

/// Returns true for the `uciok` acknowledgement.
pub fn is_uciok(line: &str) -> bool {
    line == UCIOK
}

/// Returns true for the `readyok` acknowledgement.
pub fn is_readyok(line: &str) -> bool {
    line == READYOK
}

/// Returns true for a line reporting the search result.
pub fn is_bestmove(line: &str) -> bool {
    line.starts_with(BESTMOVE_PREFIX)
}

/// The move an engine settled on, with its optional expected reply.
///
/// Moves are kept in the engine's long algebraic notation (`e2e4`, `e7e8q`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BestMove {
    /// The move to play.
    #[serde(rename = "move")]
    pub mv: String,
    /// The reply the engine expects and would ponder on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ponder: Option<String>,
}

impl BestMove {
    /// Parse a `bestmove <move> [ponder <move>]` line.
    ///
    /// Returns `None` for lines that are not `bestmove` lines and for
    /// `bestmove (none)`, which engines send when the side to move has no
    /// legal move.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        if words.next()? != BESTMOVE_PREFIX {
            return None;
        }

        let mv = words.next()?;
        if mv == "(none)" || mv == "0000" {
            return None;
        }

        let ponder = match (words.next(), words.next()) {
            (Some("ponder"), Some(reply)) => Some(reply.to_string()),
            _ => None,
        };

        Some(Self {
            mv: mv.to_string(),
            ponder,
        })
    }

    /// Find and parse the last `bestmove` line among `lines`.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Option<Self> {
        lines
            .iter()
            .rev()
            .map(|line| line.as_ref())
            .find(|line| is_bestmove(line))
            .and_then(Self::parse)
    }
}

impl fmt::Display for BestMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ponder {
            Some(ponder) => write!(f, "{BESTMOVE_PREFIX} {} ponder {ponder}", self.mv),
            None => write!(f, "{BESTMOVE_PREFIX} {}", self.mv),
        }
    }
}
