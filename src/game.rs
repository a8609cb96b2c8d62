use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::GameError;
use crate::types::{CapturedPieces, Color, Difficulty, GameStatus, Move, Position};

/// Chooses a move for `color`, or `None` when it has none.
pub trait MoveSelector {
    fn select_move(&mut self, board: &Board, color: Color, difficulty: Difficulty)
    -> Option<Move>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSelector;

impl MoveSelector for FirstLegalMoveSelector {
    fn select_move(
        &mut self,
        board: &Board,
        color: Color,
        _difficulty: Difficulty,
    ) -> Option<Move> {
        board.all_valid_moves(color).into_iter().next()
    }
}

/// Everything a caller needs to run one game. Every transition returns a
/// new value; the receiver is left as it was, so earlier states stay valid
/// for replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub current_turn: Color,
    pub status: GameStatus,
    pub moves: Vec<Move>,
    pub selected_piece: Option<Position>,
    pub valid_moves: Vec<Move>,
    pub captured_pieces: CapturedPieces,
    pub must_capture: bool,
}

impl GameState {
    /// Fresh game: initial board, Black to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_turn: Color::Black,
            status: GameStatus::Playing,
            moves: Vec::new(),
            selected_piece: None,
            valid_moves: Vec::new(),
            captured_pieces: CapturedPieces::default(),
            must_capture: false,
        }
    }

    /// Plays `mv` for the side to move without checking it against the
    /// legal move list. Only structural errors from [`Board::apply_move`]
    /// are reported.
    pub fn make_move(&self, mv: &Move) -> Result<GameState, GameError> {
        let board = self.board.apply_move(mv)?;
        Ok(self.advance(board, mv.clone()))
    }

    /// Checked move for transports: the game must be running and `mv` must
    /// match a legal move by its endpoints. The engine's own copy of the
    /// move is recorded, so a forged capture list has no effect.
    pub fn play(&self, mv: &Move) -> Result<GameState, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::GameOver(self.status));
        }
        let legal = self
            .board
            .find_legal(self.current_turn, mv)
            .ok_or_else(|| GameError::illegal(mv, "not a legal move for the side to move"))?;
        let board = self.board.play(&legal);
        Ok(self.advance(board, legal))
    }

    /// Asks `selector` for a move and plays it after validating it.
    pub fn ai_move(
        &self,
        selector: &mut dyn MoveSelector,
        difficulty: Difficulty,
    ) -> Result<GameState, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::GameOver(self.status));
        }
        let selected = selector
            .select_move(&self.board, self.current_turn, difficulty)
            .ok_or(GameError::NoLegalMove(self.current_turn))?;
        if !self.board.is_legal(self.current_turn, &selected) {
            return Err(GameError::illegal(&selected, "AI selected an illegal move"));
        }
        self.play(&selected)
    }

    /// Selects the piece on `pos` for the side to move.
    ///
    /// Stray input is tolerated: once the game is over, or when a capture is
    /// pending and this piece cannot capture, the state comes back
    /// unchanged. An empty square or an opposing piece clears the selection.
    pub fn select_piece(&self, pos: Position) -> GameState {
        if self.status != GameStatus::Playing {
            return self.clone();
        }

        let own = matches!(self.board.piece_at(pos), Some(p) if p.color == self.current_turn);
        if !own {
            return GameState {
                selected_piece: None,
                valid_moves: Vec::new(),
                ..self.clone()
            };
        }

        let all = self.board.all_valid_moves(self.current_turn);
        let must_capture = all.iter().any(Move::is_capture);
        let piece_moves: Vec<Move> = all.into_iter().filter(|m| m.from == pos).collect();
        if must_capture && piece_moves.is_empty() {
            return self.clone();
        }

        GameState {
            selected_piece: Some(pos),
            valid_moves: piece_moves,
            must_capture,
            ..self.clone()
        }
    }

    /// Moves the selected piece to `to`. `None` when nothing is selected or
    /// no valid move of the selection ends on `to`.
    pub fn move_selected(&self, to: Position) -> Option<GameState> {
        self.selected_piece?;
        let mv = self.valid_moves.iter().find(|m| m.to == to)?;
        self.play(mv).ok()
    }

    /// `loser` concedes; also used by callers when a clock runs out.
    pub fn resign(&self, loser: Color) -> GameState {
        if self.status.is_over() {
            return self.clone();
        }
        log::debug!("{loser} resigns");
        GameState {
            status: loser.opponent().wins(),
            selected_piece: None,
            valid_moves: Vec::new(),
            must_capture: false,
            ..self.clone()
        }
    }

    /// Board after the first `ply` moves of the history, replayed from the
    /// initial position. Ply 0 is the initial board.
    pub fn board_at(&self, ply: usize) -> Result<Board, GameError> {
        if ply > self.moves.len() {
            return Err(GameError::PlyOutOfRange {
                ply,
                len: self.moves.len(),
            });
        }
        self.moves[..ply]
            .iter()
            .try_fold(Board::new(), |board, mv| board.apply_move(mv))
    }

    pub fn winner(&self) -> Option<Color> {
        self.status.winner()
    }

    fn advance(&self, board: Board, mv: Move) -> GameState {
        let mover = self.current_turn;
        let opponent = mover.opponent();
        let mut captured_pieces = self.captured_pieces;
        captured_pieces.add(opponent, mv.captures.len() as u32);
        let status = board.game_status(opponent);

        log::trace!("{mover} plays {mv}; status {status:?}");

        let mut moves = self.moves.clone();
        moves.push(mv);

        GameState {
            board,
            current_turn: opponent,
            status,
            moves,
            selected_piece: None,
            valid_moves: Vec::new(),
            captured_pieces,
            must_capture: false,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Piece;

    struct FixedMoveSelector {
        mv: Move,
    }

    impl MoveSelector for FixedMoveSelector {
        fn select_move(&mut self, _: &Board, _: Color, _: Difficulty) -> Option<Move> {
            Some(self.mv.clone())
        }
    }

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn state_with(board: Board, turn: Color) -> GameState {
        GameState {
            board,
            current_turn: turn,
            ..GameState::new()
        }
    }

    fn capture_board() -> Board {
        Board::from_pieces(&[
            (pos(5, 2), Piece::man(Color::Red)),
            (pos(6, 7), Piece::man(Color::Red)),
            (pos(4, 3), Piece::man(Color::Black)),
            (pos(0, 1), Piece::man(Color::Black)),
        ])
        .unwrap()
    }

    #[test]
    fn initial_state_is_correct() {
        let state = GameState::new();

        assert_eq!(state.current_turn, Color::Black);
        assert_eq!(state.status, GameStatus::Playing);
        assert!(state.moves.is_empty());
        assert_eq!(state.selected_piece, None);
        assert_eq!(state.captured_pieces, CapturedPieces::default());
        assert!(!state.must_capture);
    }

    #[test]
    fn make_move_flips_turn_and_records_history() {
        let state = GameState::new();
        let mv = state.board.all_valid_moves(Color::Black).remove(0);

        let next = state.make_move(&mv).unwrap();

        assert_eq!(next.current_turn, Color::Red);
        assert_eq!(next.moves, vec![mv]);
        assert_eq!(next.status, GameStatus::Playing);
        // The previous state is unchanged.
        assert!(state.moves.is_empty());
        assert_eq!(state.board, Board::new());
    }

    #[test]
    fn captures_are_counted_against_the_opponent() {
        let state = state_with(capture_board(), Color::Red);
        let mv = state.board.all_valid_moves(Color::Red).remove(0);

        let next = state.make_move(&mv).unwrap();

        assert_eq!(next.captured_pieces.black, 1);
        assert_eq!(next.captured_pieces.red, 0);
        assert_eq!(next.current_turn, Color::Black);
    }

    #[test]
    fn last_capture_ends_the_game() {
        let board = Board::from_pieces(&[
            (pos(5, 2), Piece::man(Color::Red)),
            (pos(4, 3), Piece::man(Color::Black)),
        ])
        .unwrap();
        let state = state_with(board, Color::Red);
        let mv = state.board.all_valid_moves(Color::Red).remove(0);

        let next = state.play(&mv).unwrap();

        assert_eq!(next.status, GameStatus::RedWins);
        assert_eq!(next.winner(), Some(Color::Red));
        assert!(matches!(next.play(&mv), Err(GameError::GameOver(_))));
    }

    #[test]
    fn play_rejects_illegal_moves() {
        let state = GameState::new();

        let backwards = Move::simple(pos(2, 1), pos(1, 0), false);
        assert!(matches!(
            state.play(&backwards),
            Err(GameError::IllegalMove { .. })
        ));

        let wrong_side = Move::simple(pos(5, 0), pos(4, 1), false);
        assert!(state.play(&wrong_side).is_err());
    }

    #[test]
    fn play_records_the_engine_move_not_the_forged_one() {
        let state = state_with(capture_board(), Color::Red);
        let forged = Move::simple(pos(5, 2), pos(3, 4), false);

        let next = state.play(&forged).unwrap();

        assert_eq!(next.moves[0].captures, vec![pos(4, 3)]);
        assert_eq!(next.board.piece_at(pos(4, 3)), None);
    }

    #[test]
    fn selecting_own_piece_lists_its_moves() {
        let state = GameState::new().select_piece(pos(2, 1));

        assert_eq!(state.selected_piece, Some(pos(2, 1)));
        assert_eq!(state.valid_moves.len(), 2);
        assert!(!state.must_capture);
    }

    #[test]
    fn selecting_empty_or_opposing_square_clears_selection() {
        let selected = GameState::new().select_piece(pos(2, 1));

        let empty = selected.select_piece(pos(3, 2));
        assert_eq!(empty.selected_piece, None);
        assert!(empty.valid_moves.is_empty());

        let opposing = selected.select_piece(pos(5, 0));
        assert_eq!(opposing.selected_piece, None);
    }

    #[test]
    fn selecting_non_capturing_piece_during_capture_is_ignored() {
        let state = state_with(capture_board(), Color::Red);

        let ignored = state.select_piece(pos(6, 7));
        assert_eq!(ignored, state);

        let capturer = state.select_piece(pos(5, 2));
        assert_eq!(capturer.selected_piece, Some(pos(5, 2)));
        assert!(capturer.must_capture);
        assert_eq!(capturer.valid_moves.len(), 1);
    }

    #[test]
    fn selection_is_ignored_after_game_end() {
        let state = GameState::new().resign(Color::Black);
        assert_eq!(state.status, GameStatus::RedWins);
        assert_eq!(state.select_piece(pos(2, 1)), state);
    }

    #[test]
    fn move_selected_plays_matching_destination() {
        let state = GameState::new();
        assert!(state.move_selected(pos(3, 0)).is_none());

        let selected = state.select_piece(pos(2, 1));
        assert!(selected.move_selected(pos(4, 4)).is_none());

        let next = selected.move_selected(pos(3, 0)).unwrap();
        assert_eq!(next.board.piece_at(pos(3, 0)), Some(Piece::man(Color::Black)));
        assert_eq!(next.selected_piece, None);
        assert!(next.valid_moves.is_empty());
        assert_eq!(next.current_turn, Color::Red);
    }

    #[test]
    fn board_at_replays_history() {
        let mut state = GameState::new();
        let mut boards = vec![state.board];
        for _ in 0..6 {
            let mv = state.board.all_valid_moves(state.current_turn).remove(0);
            state = state.play(&mv).unwrap();
            boards.push(state.board);
        }

        for (ply, board) in boards.iter().enumerate() {
            assert_eq!(&state.board_at(ply).unwrap(), board);
        }
        assert!(matches!(
            state.board_at(7),
            Err(GameError::PlyOutOfRange { ply: 7, len: 6 })
        ));
    }

    #[test]
    fn ai_move_plays_selector_choice() {
        let state = GameState::new();
        let next = state
            .ai_move(&mut FirstLegalMoveSelector, Difficulty::Easy)
            .unwrap();

        assert_eq!(next.moves.len(), 1);
        assert_eq!(next.current_turn, Color::Red);
    }

    #[test]
    fn ai_move_rejects_illegal_selection() {
        let mut selector = FixedMoveSelector {
            mv: Move::simple(pos(2, 1), pos(1, 0), false),
        };

        let err = GameState::new()
            .ai_move(&mut selector, Difficulty::Medium)
            .unwrap_err();

        assert!(err.to_string().contains("AI selected an illegal move"));
    }

    #[test]
    fn ai_move_without_moves_is_an_error() {
        let board = Board::from_pieces(&[(pos(2, 1), Piece::man(Color::Black))]).unwrap();
        let state = state_with(board, Color::Red);

        assert_eq!(
            state.ai_move(&mut FirstLegalMoveSelector, Difficulty::Easy),
            Err(GameError::NoLegalMove(Color::Red))
        );
    }

    #[test]
    fn game_state_serializes_with_field_names() {
        let state = GameState::new().select_piece(pos(2, 1));
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["current_turn"], "black");
        assert_eq!(json["status"], "playing");
        assert_eq!(json["selected_piece"]["row"], 2);
        assert_eq!(json["captured_pieces"]["red"], 0);

        let back: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
