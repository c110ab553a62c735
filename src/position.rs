//! Position validation before a descriptor reaches the engine.
//!
//! Engines tend to crash or hang on malformed positions, so the driver asks a
//! [`PositionValidator`] first and answers invalid input with an empty
//! result. The bundled [`FenValidator`] checks that a FEN string is well
//! formed; it does not decide move legality. Plug in a full rules library
//! by implementing the trait.

/// Outcome of validating a position descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The descriptor may be sent to the engine.
    Valid,
    /// The descriptor must not be sent to the engine.
    Invalid(FenError),
}

impl Validation {
    /// Whether the descriptor passed validation.
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

impl From<Result<(), FenError>> for Validation {
    fn from(result: Result<(), FenError>) -> Self {
        match result {
            Ok(()) => Validation::Valid,
            Err(e) => Validation::Invalid(e),
        }
    }
}

/// Rules collaborator consulted before any engine process is spawned.
pub trait PositionValidator: Send + Sync {
    /// Validate a position descriptor.
    fn validate(&self, descriptor: &str) -> Validation;
}

impl<F> PositionValidator for F
where
    F: Fn(&str) -> Validation + Send + Sync,
{
    fn validate(&self, descriptor: &str) -> Validation {
        self(descriptor)
    }
}

/// Reasons a FEN string is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// The descriptor is empty.
    #[error("FEN is empty")]
    Empty,

    /// FEN string does not have exactly 6 fields.
    #[error("FEN must have 6 fields, found {found}")]
    WrongFieldCount { found: usize },

    /// Placement field does not have 8 ranks.
    #[error("FEN placement must have 8 ranks, found {found}")]
    WrongRankCount { found: usize },

    /// A rank does not describe exactly 8 files.
    #[error("rank {rank} describes {files} files, expected 8")]
    WrongFileCount { rank: usize, files: usize },

    /// Two empty-square counts follow each other, as in `44`.
    #[error("rank {rank} has consecutive empty-square counts")]
    ConsecutiveDigits { rank: usize },

    /// Invalid piece character in the placement field.
    #[error("invalid piece character '{char}' in FEN")]
    InvalidPiece { char: char },

    /// A pawn stands on the first or last rank.
    #[error("pawn on back rank {rank}")]
    PawnOnBackRank { rank: usize },

    /// A side does not have exactly one king.
    #[error("expected one king per side, found {white} white and {black} black")]
    KingCount { white: usize, black: usize },

    /// Invalid side to move (must be 'w' or 'b').
    #[error("invalid side to move '{found}', expected 'w' or 'b'")]
    InvalidSideToMove { found: String },

    /// Castling field is not a subset of `KQkq` in that order, or `-`.
    #[error("invalid castling field '{found}'")]
    InvalidCastling { found: String },

    /// Invalid en passant field.
    #[error("invalid en passant square '{found}'")]
    InvalidEnPassant { found: String },

    /// Halfmove clock or fullmove number is not a number in range.
    #[error("invalid move counter '{found}'")]
    InvalidCounter { found: String },

    /// The descriptor contains a line break, which would split the command.
    #[error("FEN contains a line break")]
    LineBreak,
}

/// Structural FEN validator.
///
/// Requires all six fields. Rejects placements an engine cannot represent
/// (pawns on a back rank, missing kings) but does not check for check or
/// move legality.
#[derive(Debug, Clone, Copy, Default)]
pub struct FenValidator;

impl FenValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }
}

impl PositionValidator for FenValidator {
    fn validate(&self, descriptor: &str) -> Validation {
        validate_fen(descriptor).into()
    }
}

/// Check that `fen` is a well-formed FEN string.
pub fn validate_fen(fen: &str) -> Result<(), FenError> {
    if fen.contains(|c: char| c == '\n' || c == '\r') {
        return Err(FenError::LineBreak);
    }

    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.is_empty() {
        return Err(FenError::Empty);
    }
    if fields.len() != 6 {
        return Err(FenError::WrongFieldCount {
            found: fields.len(),
        });
    }

    validate_placement(fields[0])?;

    let white_to_move = match fields[1] {
        "w" => true,
        "b" => false,
        other => {
            return Err(FenError::InvalidSideToMove {
                found: other.to_string(),
            })
        }
    };

    validate_castling(fields[2])?;
    validate_en_passant(fields[3], white_to_move)?;

    let halfmove = fields[4];
    if !is_counter(halfmove) {
        return Err(FenError::InvalidCounter {
            found: halfmove.to_string(),
        });
    }

    let fullmove = fields[5];
    if !is_counter(fullmove) || fullmove.parse::<u32>().map_or(true, |n| n == 0) {
        return Err(FenError::InvalidCounter {
            found: fullmove.to_string(),
        });
    }

    Ok(())
}

fn validate_placement(placement: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount { found: ranks.len() });
    }

    let mut white_kings = 0;
    let mut black_kings = 0;

    for (rank_idx, rank) in ranks.iter().enumerate() {
        let back_rank = rank_idx == 0 || rank_idx == 7;
        let mut files = 0;
        let mut previous_was_digit = false;
        for c in rank.chars() {
            let is_digit = c.is_ascii_digit();
            if is_digit && previous_was_digit {
                return Err(FenError::ConsecutiveDigits { rank: rank_idx });
            }
            previous_was_digit = is_digit;

            match c {
                '1'..='8' => files += c as usize - '0' as usize,
                'P' | 'p' if back_rank => {
                    return Err(FenError::PawnOnBackRank { rank: 8 - rank_idx })
                }
                'P' | 'N' | 'B' | 'R' | 'Q' | 'p' | 'n' | 'b' | 'r' | 'q' => files += 1,
                'K' => {
                    white_kings += 1;
                    files += 1;
                }
                'k' => {
                    black_kings += 1;
                    files += 1;
                }
                _ => return Err(FenError::InvalidPiece { char: c }),
            }
        }
        if files != 8 {
            return Err(FenError::WrongFileCount {
                rank: rank_idx,
                files,
            });
        }
    }

    if white_kings != 1 || black_kings != 1 {
        return Err(FenError::KingCount {
            white: white_kings,
            black: black_kings,
        });
    }

    Ok(())
}

fn validate_castling(castling: &str) -> Result<(), FenError> {
    if castling == "-" {
        return Ok(());
    }

    // Each right may appear once, in KQkq order.
    let mut order = "KQkq".chars();
    let valid = !castling.is_empty() && castling.chars().all(|c| order.any(|right| right == c));

    if valid {
        Ok(())
    } else {
        Err(FenError::InvalidCastling {
            found: castling.to_string(),
        })
    }
}

fn is_counter(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit()) && field.parse::<u32>().is_ok()
}

fn validate_en_passant(field: &str, white_to_move: bool) -> Result<(), FenError> {
    if field == "-" {
        return Ok(());
    }

    let mut chars = field.chars();
    let valid = match (chars.next(), chars.next(), chars.next()) {
        (Some(file), Some(rank), None) => {
            // The target square sits behind the pawn that just moved.
            let expected_rank = if white_to_move { '6' } else { '3' };
            ('a'..='h').contains(&file) && rank == expected_rank
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FenError::InvalidEnPassant {
            found: field.to_string(),
        })
    }
}
