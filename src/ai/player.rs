use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::evaluate::MaterialEvaluator;
use crate::ai::search::Searcher;
use crate::board::Board;
use crate::game::MoveSelector;
use crate::types::{Color, Difficulty, Move};

/// Computer opponent. Owns its random source so easy-level play is
/// reproducible from a seed.
#[derive(Debug, Clone)]
pub struct AiPlayer {
    rng: ChaCha8Rng,
    evaluator: MaterialEvaluator,
    timeout: Option<Duration>,
}

impl AiPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            evaluator: MaterialEvaluator,
            timeout: None,
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            evaluator: MaterialEvaluator,
            timeout: None,
        }
    }

    /// Bounds every search to `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }
}

impl MoveSelector for AiPlayer {
    fn select_move(
        &mut self,
        board: &Board,
        color: Color,
        difficulty: Difficulty,
    ) -> Option<Move> {
        let mut searcher = match self.timeout {
            Some(timeout) => Searcher::with_timeout(&self.evaluator, timeout),
            None => Searcher::new(&self.evaluator),
        };
        searcher.best_move(board, color, difficulty, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;
    use crate::types::GameStatus;

    #[test]
    fn same_seed_plays_the_same_game() {
        let play = |seed| {
            let mut red = AiPlayer::new(seed);
            let mut black = AiPlayer::new(seed + 1);
            let mut state = GameState::new();
            for _ in 0..20 {
                if state.status != GameStatus::Playing {
                    break;
                }
                let player = match state.current_turn {
                    Color::Red => &mut red,
                    Color::Black => &mut black,
                };
                state = state.ai_move(player, Difficulty::Easy).unwrap();
            }
            state.moves
        };

        assert_eq!(play(11), play(11));
    }

    #[test]
    fn ai_moves_are_always_legal() {
        let mut ai = AiPlayer::new(5);
        let mut state = GameState::new();
        for _ in 0..10 {
            if state.status != GameStatus::Playing {
                break;
            }
            let mv = ai
                .select_move(&state.board, state.current_turn, Difficulty::Medium)
                .unwrap();
            assert!(state.board.is_legal(state.current_turn, &mv));
            state = state.play(&mv).unwrap();
        }
        assert_eq!(state.board_at(state.moves.len()).unwrap(), state.board);
    }

    #[test]
    fn timed_player_still_moves() {
        let mut ai = AiPlayer::new(1).with_timeout(Duration::ZERO);
        let board = Board::new();

        let mv = ai.select_move(&board, Color::Black, Difficulty::Expert);

        assert!(mv.is_some());
    }
}
