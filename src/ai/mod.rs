//! Move selection for the computer opponent. Everything here talks to the
//! rules only through [`Board`]'s public move generation and application.

pub mod evaluate;
pub mod player;
pub mod search;

use rand::Rng;

use crate::board::Board;
use crate::types::{Color, Difficulty, Move};

pub use evaluate::{Evaluator, MaterialEvaluator};
pub use player::AiPlayer;
pub use search::{Searcher, WIN_SCORE};

/// Picks a move for `color` with the default evaluator and no deadline.
pub fn best_move<R: Rng + ?Sized>(
    board: &Board,
    color: Color,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<Move> {
    Searcher::new(&MaterialEvaluator).best_move(board, color, difficulty, rng)
}
