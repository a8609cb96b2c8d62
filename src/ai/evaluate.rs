use crate::board::Board;
use crate::types::{BOARD_SIZE, Color, PieceKind};

pub const MAN_VALUE: i32 = 100;
pub const KING_VALUE: i32 = 300;
pub const CENTER_BONUS: i32 = 10;
pub const ADVANCEMENT_BONUS: i32 = 5;
pub const BACK_ROW_BONUS: i32 = 15;

/// Static score of a board, positive when `perspective` is ahead.
pub trait Evaluator {
    fn evaluate(&self, board: &Board, perspective: Color) -> i32;
}

/// Material plus small positional terms: centre control for every piece,
/// advancement and an unmoved back rank for men.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, board: &Board, perspective: Color) -> i32 {
        let mut score = 0;

        for color in [perspective, perspective.opponent()] {
            let sign = if color == perspective { 1 } else { -1 };
            let count = board.count(color);
            score += sign * (count.men as i32 * MAN_VALUE + count.kings as i32 * KING_VALUE);

            for (pos, piece) in board.pieces(color) {
                if center_distance_doubled(pos.row, pos.col) < 6 {
                    score += sign * CENTER_BONUS;
                }
                if piece.kind == PieceKind::Man {
                    let advanced = (pos.row as i32 - color.home_row() as i32).abs();
                    score += sign * advanced * ADVANCEMENT_BONUS;
                    if pos.row == color.home_row() {
                        score += sign * BACK_ROW_BONUS;
                    }
                }
            }
        }

        score
    }
}

/// Twice the Manhattan distance from the board centre (3.5, 3.5).
fn center_distance_doubled(row: u8, col: u8) -> i32 {
    let last = BOARD_SIZE as i32 - 1;
    (2 * row as i32 - last).abs() + (2 * col as i32 - last).abs()
}
