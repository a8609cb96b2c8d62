//! American checkers: rules engine and a minimax opponent.
//!
//! [`Board`] owns move generation (mandatory capture, multi-jump chains,
//! promotion ending a jump), move application and terminal detection.
//! [`GameState`] is the value a caller passes around between turns, and
//! [`ai`] picks moves for the computer side using only the board's public
//! operations.

use wasm_bindgen::prelude::*;

pub mod ai;
pub mod board;
pub mod error;
pub mod game;
pub mod types;
pub mod wasm;

pub use ai::{AiPlayer, Evaluator, MaterialEvaluator, Searcher};
pub use board::{Board, Grid};
pub use error::GameError;
pub use game::{FirstLegalMoveSelector, GameState, MoveSelector};
pub use types::{
    CapturedPieces, Color, Difficulty, GameStatus, Move, Piece, PieceCount, PieceKind, Position,
};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
