use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::Rng;
use web_time::Instant;

use crate::ai::evaluate::Evaluator;
use crate::board::Board;
use crate::types::{Color, Difficulty, Move};

/// Score of a decided game, from the winner's side.
pub const WIN_SCORE: i32 = 100_000;
const MIN_SCORE: i32 = i32::MIN;
const MAX_SCORE: i32 = i32::MAX;
/// Easy difficulty picks at random among this many best root moves.
const EASY_CANDIDATES: usize = 3;
/// Nodes between deadline checks.
const CLOCK_INTERVAL: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchResult {
    Complete(i32),
    Interrupted,
}

/// Depth-limited minimax with alpha-beta pruning. No move ordering, no
/// transposition table, no iterative deepening.
pub struct Searcher<'a, E: ?Sized> {
    evaluator: &'a E,
    start_time: Instant,
    timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
    timed_out: bool,
    nodes: u64,
}

impl<'a, E: Evaluator + ?Sized> Searcher<'a, E> {
    /// Searcher that always runs to its full depth.
    pub fn new(evaluator: &'a E) -> Self {
        Self {
            evaluator,
            start_time: Instant::now(),
            timeout: None,
            cancel: None,
            timed_out: false,
            nodes: 0,
        }
    }

    pub fn with_timeout(evaluator: &'a E, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::new(evaluator)
        }
    }

    /// Stops the search as soon as `flag` is set.
    pub fn with_cancel(self, flag: Arc<AtomicBool>) -> Self {
        Self {
            cancel: Some(flag),
            ..self
        }
    }

    /// Whether the last search was cut short by the deadline or cancel flag.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Nodes visited by the last search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Chooses a move for `color`.
    ///
    /// Returns `None` when `color` has no legal move and the only move
    /// without searching when there is exactly one. Every root move is
    /// scored with a search one ply shallower than the difficulty's depth.
    /// Easy picks uniformly from the top three scores using `rng`; the other
    /// levels take the first move with the maximum score.
    ///
    /// If the search is interrupted, the choice is made among the root
    /// moves scored so far, or the first legal move if none were.
    pub fn best_move<R: Rng + ?Sized>(
        &mut self,
        board: &Board,
        color: Color,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Option<Move> {
        self.start_time = Instant::now();
        self.timed_out = false;
        self.nodes = 0;

        let moves = board.all_valid_moves(color);
        if moves.len() <= 1 {
            return moves.into_iter().next();
        }

        let depth = difficulty.depth().saturating_sub(1);
        let mut scored: Vec<(Move, i32)> = Vec::with_capacity(moves.len());
        for mv in &moves {
            let next = board.play(mv);
            match self.minimax(&next, depth, MIN_SCORE, MAX_SCORE, false, color) {
                SearchResult::Complete(score) => {
                    log::debug!("{color} root {mv}: {score}");
                    scored.push((mv.clone(), score));
                }
                SearchResult::Interrupted => {
                    log::warn!(
                        "search interrupted after {} of {} root moves ({} nodes)",
                        scored.len(),
                        moves.len(),
                        self.nodes
                    );
                    break;
                }
            }
        }

        if scored.is_empty() {
            return moves.into_iter().next();
        }

        let chosen = if difficulty == Difficulty::Easy {
            // Stable sort keeps enumeration order among equal scores.
            scored.sort_by(|(_, left), (_, right)| right.cmp(left));
            scored.truncate(EASY_CANDIDATES);
            let pick = rng.gen_range(0..scored.len());
            scored.swap_remove(pick)
        } else {
            let mut best = 0;
            for (idx, (_, score)) in scored.iter().enumerate() {
                if *score > scored[best].1 {
                    best = idx;
                }
            }
            scored.swap_remove(best)
        };

        log::debug!(
            "{color} {difficulty:?} chooses {} ({}), {} nodes",
            chosen.0,
            chosen.1,
            self.nodes
        );
        Some(chosen.0)
    }

    /// Minimax value of `board` for `perspective`, where `maximizing` says
    /// whether `perspective` is to move. `None` if interrupted.
    pub fn search(
        &mut self,
        board: &Board,
        depth: u8,
        alpha: i32,
        beta: i32,
        maximizing: bool,
        perspective: Color,
    ) -> Option<i32> {
        match self.minimax(board, depth, alpha, beta, maximizing, perspective) {
            SearchResult::Complete(score) => Some(score),
            SearchResult::Interrupted => None,
        }
    }

    fn minimax(
        &mut self,
        board: &Board,
        depth: u8,
        alpha: i32,
        beta: i32,
        maximizing: bool,
        perspective: Color,
    ) -> SearchResult {
        if self.should_stop() {
            self.timed_out = true;
            return SearchResult::Interrupted;
        }
        self.nodes += 1;

        let to_move = if maximizing {
            perspective
        } else {
            perspective.opponent()
        };

        // A side that cannot move has lost, whatever depth remains.
        let moves = board.all_valid_moves(to_move);
        if moves.is_empty() {
            let score = if to_move == perspective {
                -WIN_SCORE
            } else {
                WIN_SCORE
            };
            return SearchResult::Complete(score);
        }

        if depth == 0 {
            return SearchResult::Complete(self.evaluator.evaluate(board, perspective));
        }

        let mut alpha = alpha;
        let mut beta = beta;
        let mut best = if maximizing { MIN_SCORE } else { MAX_SCORE };

        for mv in &moves {
            let next = board.play(mv);
            let score = match self.minimax(&next, depth - 1, alpha, beta, !maximizing, perspective) {
                SearchResult::Complete(score) => score,
                SearchResult::Interrupted => return SearchResult::Interrupted,
            };

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        SearchResult::Complete(best)
    }

    fn should_stop(&self) -> bool {
        if let Some(flag) = &self.cancel
            && flag.load(Ordering::Relaxed)
        {
            return true;
        }
        match self.timeout {
            Some(timeout) => {
                self.nodes % CLOCK_INTERVAL == 0 && self.start_time.elapsed() >= timeout
            }
            None => false,
        }
    }
}
