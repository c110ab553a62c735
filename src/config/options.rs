//! Type-safe engine options.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::UciCommand;

/// An engine option sent with `setoption` during the handshake.
///
/// `value` is `None` for button options such as `Clear Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl EngineOption {
    /// Create an option with a value.
    pub fn new(name: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            value: Some(value.to_string()),
        }
    }

    /// Create a button option (no value).
    pub fn button(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// The `setoption` command for this option.
    pub fn to_command(&self) -> UciCommand {
        UciCommand::SetOption {
            name: self.name.clone(),
            value: self.value.clone(),
        }
    }
}

/// Well-known option names understood by Stockfish and most UCI engines.
pub mod names {
    /// Search threads.
    pub const THREADS: &str = "Threads";
    /// Transposition table size in MB.
    pub const HASH: &str = "Hash";
    /// Number of principal variations reported.
    pub const MULTI_PV: &str = "MultiPV";
    /// Strength limit (Stockfish: 0 to 20).
    pub const SKILL_LEVEL: &str = "Skill Level";
    /// Enables `UCI_Elo`.
    pub const LIMIT_STRENGTH: &str = "UCI_LimitStrength";
    /// Target playing strength when `UCI_LimitStrength` is on.
    pub const ELO: &str = "UCI_Elo";
}
