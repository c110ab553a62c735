//! Commands sent to the engine.

use std::fmt;
use std::time::Duration;

/// A command written to the engine's stdin, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    /// `uci`: switch the engine to UCI mode; answered by `uciok`.
    Uci,
    /// `isready`: synchronize; answered by `readyok`.
    IsReady,
    /// `setoption name <name> [value <value>]`.
    SetOption {
        name: String,
        value: Option<String>,
    },
    /// `ucinewgame`: the next position belongs to a new game.
    NewGame,
    /// `position fen <fen>`.
    PositionFen(String),
    /// `go movetime <ms>`: search for exactly this long; answered by `bestmove`.
    GoMovetime(Duration),
    /// `quit`: exit the engine process.
    Quit,
}

impl fmt::Display for UciCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciCommand::Uci => write!(f, "uci"),
            UciCommand::IsReady => write!(f, "isready"),
            UciCommand::SetOption { name, value: None } => write!(f, "setoption name {name}"),
            UciCommand::SetOption {
                name,
                value: Some(value),
            } => write!(f, "setoption name {name} value {value}"),
            UciCommand::NewGame => write!(f, "ucinewgame"),
            UciCommand::PositionFen(fen) => write!(f, "position fen {fen}"),
            UciCommand::GoMovetime(budget) => write!(f, "go movetime {}", budget.as_millis()),
            UciCommand::Quit => write!(f, "quit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format() {
        assert_eq!(UciCommand::Uci.to_string(), "uci");
        assert_eq!(UciCommand::IsReady.to_string(), "isready");
        assert_eq!(UciCommand::NewGame.to_string(), "ucinewgame");
        assert_eq!(UciCommand::Quit.to_string(), "quit");
        assert_eq!(
            UciCommand::GoMovetime(Duration::from_millis(2000)).to_string(),
            "go movetime 2000"
        );
        assert_eq!(
            UciCommand::PositionFen("8/8/8/8/8/8/8/K1k5 w - - 0 1".into()).to_string(),
            "position fen 8/8/8/8/8/8/8/K1k5 w - - 0 1"
        );
    }

    #[test]
    fn setoption_with_and_without_value() {
        let with_value = UciCommand::SetOption {
            name: "Threads".into(),
            value: Some("4".into()),
        };
        assert_eq!(with_value.to_string(), "setoption name Threads value 4");

        let button = UciCommand::SetOption {
            name: "Clear Hash".into(),
            value: None,
        };
        assert_eq!(button.to_string(), "setoption name Clear Hash");
    }

    #[test]
    fn movetime_truncates_to_millis() {
        let cmd = UciCommand::GoMovetime(Duration::from_micros(1_500_900));
        assert_eq!(cmd.to_string(), "go movetime 1500");
    }
}
