use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::types::{
    BOARD_SIZE, Color, GameStatus, Move, Piece, PieceCount, PieceKind, Position,
};

const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
const BLACK_START_ROWS: std::ops::Range<u8> = 0..3;
const RED_START_ROWS: std::ops::Range<u8> = 5..8;

/// Wire form of a board: row-major grid, `None` for an empty square.
pub type Grid = [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE];

static INITIAL_BOARD: Lazy<Board> = Lazy::new(|| {
    let mut board = Board::empty();
    for idx in 0..NUM_SQUARES {
        let pos = Position::from_index(idx);
        if !pos.is_dark() {
            continue;
        }
        if BLACK_START_ROWS.contains(&pos.row) {
            board.put(pos, Piece::man(Color::Black));
        } else if RED_START_ROWS.contains(&pos.row) {
            board.put(pos, Piece::man(Color::Red));
        }
    }
    board
});

/// Checkers board held as three bitboards. Bit `row * 8 + col` is set in
/// `black`/`red` for an occupied square and in `kings` when that piece is
/// crowned. Only dark squares are ever set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Grid", try_from = "Grid")]
pub struct Board {
    black: u64,
    red: u64,
    kings: u64,
}

/// Partial capture chain awaiting expansion.
struct Chain {
    at: Position,
    captures: Vec<Position>,
    jumped: u64,
    crowned: bool,
}

impl Board {
    /// Creates the initial board: Black men on the dark squares of rows
    /// 0-2, Red men on rows 5-7.
    pub fn new() -> Self {
        *INITIAL_BOARD
    }

    pub const fn empty() -> Self {
        Self {
            black: 0,
            red: 0,
            kings: 0,
        }
    }

    /// Builds a custom position. Every square must be a distinct dark
    /// square on the board.
    pub fn from_pieces(pieces: &[(Position, Piece)]) -> Result<Self, GameError> {
        let mut board = Self::empty();
        for &(pos, piece) in pieces {
            if !pos.is_on_board() || !pos.is_dark() {
                return Err(GameError::InvalidBoard(format!(
                    "piece placed on non-playable square {pos:?}"
                )));
            }
            if board.piece_at(pos).is_some() {
                return Err(GameError::InvalidBoard(format!(
                    "square {pos} listed twice"
                )));
            }
            board.put(pos, piece);
        }
        Ok(board)
    }

    /// Returns the piece at `pos`; off-board positions read as empty.
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        if !pos.is_on_board() {
            return None;
        }
        let square = bit(pos.index());
        let color = if (self.black & square) != 0 {
            Color::Black
        } else if (self.red & square) != 0 {
            Color::Red
        } else {
            return None;
        };
        let kind = if (self.kings & square) != 0 {
            PieceKind::King
        } else {
            PieceKind::Man
        };
        Some(Piece { color, kind })
    }

    pub fn count(&self, color: Color) -> PieceCount {
        let side = self.side(color);
        PieceCount {
            men: (side & !self.kings).count_ones(),
            kings: (side & self.kings).count_ones(),
        }
    }

    /// Pieces of `color` in row-major order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        squares(self.side(color)).filter_map(move |pos| self.piece_at(pos).map(|p| (pos, p)))
    }

    pub fn to_grid(&self) -> Grid {
        let mut grid: Grid = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (row, cells) in grid.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = self.piece_at(Position::new(row as u8, col as u8));
            }
        }
        grid
    }

    /// Legal moves of the piece on `pos`, ignoring what other pieces of the
    /// same side could do. Captures, when available, exclude simple steps.
    pub fn valid_moves_for_piece(&self, pos: Position) -> Vec<Move> {
        let Some(piece) = self.piece_at(pos) else {
            return Vec::new();
        };

        let captures = self.capture_moves(pos, piece);
        if !captures.is_empty() {
            return captures;
        }
        self.simple_moves(pos, piece)
    }

    /// All legal moves for `color`. If any piece can capture, only captures
    /// are returned. An empty list means the side cannot move.
    pub fn all_valid_moves(&self, color: Color) -> Vec<Move> {
        let mut captures = Vec::new();
        let mut simple = Vec::new();

        for (pos, _) in self.pieces(color) {
            for mv in self.valid_moves_for_piece(pos) {
                if mv.is_capture() {
                    captures.push(mv);
                } else {
                    simple.push(mv);
                }
            }
        }

        if captures.is_empty() { simple } else { captures }
    }

    /// Whether `mv` matches a legal move for `color` by its endpoints.
    pub fn is_legal(&self, color: Color, mv: &Move) -> bool {
        self.find_legal(color, mv).is_some()
    }

    /// The generated legal move whose endpoints match `mv`.
    pub fn find_legal(&self, color: Color, mv: &Move) -> Option<Move> {
        match self.piece_at(mv.from) {
            Some(piece) if piece.color == color => self
                .all_valid_moves(color)
                .into_iter()
                .find(|legal| legal.same_path(mv)),
            _ => None,
        }
    }

    /// Applies `mv` and returns the resulting board.
    ///
    /// Only structural checks are made (squares on the board, a mover on
    /// `from`, `to` free, opposing pieces on every capture square); callers
    /// are expected to have validated the move with [`Board::is_legal`].
    pub fn apply_move(&self, mv: &Move) -> Result<Board, GameError> {
        if !mv.from.is_on_board() || !mv.to.is_on_board() {
            return Err(GameError::illegal(mv, "square off the board"));
        }
        let piece = self
            .piece_at(mv.from)
            .ok_or_else(|| GameError::illegal(mv, "no piece on the origin square"))?;
        if mv.to != mv.from && self.piece_at(mv.to).is_some() {
            return Err(GameError::illegal(mv, "destination is occupied"));
        }
        for &captured in &mv.captures {
            match self.piece_at(captured) {
                Some(victim) if victim.color != piece.color => {}
                _ => {
                    return Err(GameError::illegal(
                        mv,
                        "capture square holds no opposing piece",
                    ));
                }
            }
        }

        Ok(self.play(mv))
    }

    /// Unchecked application for moves produced by the generator.
    pub(crate) fn play(&self, mv: &Move) -> Board {
        let mut next = *self;
        let Some(piece) = next.take(mv.from) else {
            return next;
        };
        for &captured in &mv.captures {
            next.take(captured);
        }
        let placed = if mv.is_promotion {
            piece.promoted()
        } else {
            piece
        };
        next.put(mv.to, placed);
        next
    }

    /// Status with `to_move` next to play: a side that cannot move (no
    /// pieces or all blocked) has lost.
    pub fn game_status(&self, to_move: Color) -> GameStatus {
        if self.all_valid_moves(to_move).is_empty() {
            to_move.opponent().wins()
        } else {
            GameStatus::Playing
        }
    }

    fn simple_moves(&self, from: Position, piece: Piece) -> Vec<Move> {
        let occupied = self.occupied();
        piece
            .directions()
            .iter()
            .filter_map(|&(dr, dc)| from.offset(dr, dc))
            .filter(|to| (occupied & bit(to.index())) == 0)
            .map(|to| Move::simple(from, to, piece.promotes_on(to.row)))
            .collect()
    }

    /// Capture chains from `from`, depth first in direction order. A chain
    /// stops when no jump is available from its landing square or when the
    /// jump crowns a man.
    fn capture_moves(&self, from: Position, piece: Piece) -> Vec<Move> {
        let opponents = self.side(piece.color.opponent());
        let vacated = bit(from.index());
        let mut moves = Vec::new();
        let mut stack = vec![Chain {
            at: from,
            captures: Vec::new(),
            jumped: 0,
            crowned: false,
        }];

        while let Some(chain) = stack.pop() {
            if chain.crowned {
                moves.push(chain.into_move(from));
                continue;
            }

            // Jumped pieces are lifted as the chain proceeds.
            let occupied = (self.occupied() & !chain.jumped & !vacated) | bit(chain.at.index());
            let mut next = Vec::new();

            for &(dr, dc) in piece.directions() {
                let (Some(over), Some(land)) =
                    (chain.at.offset(dr, dc), chain.at.offset(2 * dr, 2 * dc))
                else {
                    continue;
                };
                let over_bit = bit(over.index());
                if (opponents & over_bit) == 0
                    || (chain.jumped & over_bit) != 0
                    || (occupied & bit(land.index())) != 0
                {
                    continue;
                }

                let mut captures = chain.captures.clone();
                captures.push(over);
                next.push(Chain {
                    at: land,
                    captures,
                    jumped: chain.jumped | over_bit,
                    crowned: piece.promotes_on(land.row),
                });
            }

            if next.is_empty() {
                if !chain.captures.is_empty() {
                    moves.push(chain.into_move(from));
                }
            } else {
                stack.extend(next.into_iter().rev());
            }
        }

        moves
    }

    fn side(&self, color: Color) -> u64 {
        match color {
            Color::Black => self.black,
            Color::Red => self.red,
        }
    }

    fn occupied(&self) -> u64 {
        self.black | self.red
    }

    fn put(&mut self, pos: Position, piece: Piece) {
        let square = bit(pos.index());
        self.take(pos);
        match piece.color {
            Color::Black => self.black |= square,
            Color::Red => self.red |= square,
        }
        if piece.is_king() {
            self.kings |= square;
        }
    }

    fn take(&mut self, pos: Position) -> Option<Piece> {
        let piece = self.piece_at(pos)?;
        let keep = !bit(pos.index());
        self.black &= keep;
        self.red &= keep;
        self.kings &= keep;
        Some(piece)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    fn into_move(self, from: Position) -> Move {
        Move {
            from,
            to: self.at,
            captures: self.captures,
            is_promotion: self.crowned,
        }
    }
}

impl From<Board> for Grid {
    fn from(board: Board) -> Self {
        board.to_grid()
    }
}

impl TryFrom<Grid> for Board {
    type Error = GameError;

    fn try_from(grid: Grid) -> Result<Self, Self::Error> {
        let pieces: Vec<(Position, Piece)> = grid
            .iter()
            .enumerate()
            .flat_map(|(row, cells)| {
                cells.iter().enumerate().filter_map(move |(col, cell)| {
                    cell.map(|piece| (Position::new(row as u8, col as u8), piece))
                })
            })
            .collect();
        Self::from_pieces(&pieces)
    }
}

fn bit(idx: usize) -> u64 {
    if idx < NUM_SQUARES { 1u64 << idx } else { 0 }
}

fn squares(mut mask: u64) -> impl Iterator<Item = Position> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let idx = mask.trailing_zeros() as usize;
        mask &= mask - 1;
        Some(Position::from_index(idx))
    })
}
