use crate::types::{Color, GameStatus, Move};

/// Caller contract violations. Nothing here is a recoverable runtime
/// condition; stray UI input is ignored rather than reported.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: Move, reason: &'static str },
    #[error("game is already over ({0:?})")]
    GameOver(GameStatus),
    #[error("{0} has no legal moves")]
    NoLegalMove(Color),
    #[error("invalid board: {0}")]
    InvalidBoard(String),
    #[error("ply {ply} is past the end of a {len}-move history")]
    PlyOutOfRange { ply: usize, len: usize },
    #[error("invalid square notation: {0:?}")]
    InvalidNotation(String),
    #[error("unknown difficulty: {0:?}")]
    UnknownDifficulty(String),
}

impl GameError {
    pub(crate) fn illegal(mv: &Move, reason: &'static str) -> Self {
        Self::IllegalMove {
            mv: mv.clone(),
            reason,
        }
    }
}
