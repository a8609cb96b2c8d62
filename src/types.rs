use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const BOARD_SIZE: usize = 8;

/// Side colour. Black always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    /// Row delta of a forward step for this side's men.
    pub fn forward(self) -> i8 {
        match self {
            Self::Red => -1,
            Self::Black => 1,
        }
    }

    /// Home edge: row 0 for Black, row 7 for Red.
    pub fn home_row(self) -> u8 {
        match self {
            Self::Red => BOARD_SIZE as u8 - 1,
            Self::Black => 0,
        }
    }

    /// Row on which this side's men are crowned.
    pub fn promotion_row(self) -> u8 {
        self.opponent().home_row()
    }

    /// Status meaning this side has won.
    pub fn wins(self) -> GameStatus {
        match self {
            Self::Red => GameStatus::RedWins,
            Self::Black => GameStatus::BlackWins,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Man,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

const KING_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const RED_MAN_DIRECTIONS: [(i8, i8); 2] = [(-1, -1), (-1, 1)];
const BLACK_MAN_DIRECTIONS: [(i8, i8); 2] = [(1, -1), (1, 1)];

impl Piece {
    pub const fn man(color: Color) -> Self {
        Self {
            color,
            kind: PieceKind::Man,
        }
    }

    pub const fn king(color: Color) -> Self {
        Self {
            color,
            kind: PieceKind::King,
        }
    }

    pub fn is_king(self) -> bool {
        self.kind == PieceKind::King
    }

    pub fn promoted(self) -> Self {
        Self::king(self.color)
    }

    /// Diagonal step directions this piece may move and capture along.
    pub fn directions(self) -> &'static [(i8, i8)] {
        match (self.kind, self.color) {
            (PieceKind::King, _) => &KING_DIRECTIONS,
            (PieceKind::Man, Color::Red) => &RED_MAN_DIRECTIONS,
            (PieceKind::Man, Color::Black) => &BLACK_MAN_DIRECTIONS,
        }
    }

    /// Whether arriving on `row` crowns this piece.
    pub fn promotes_on(self, row: u8) -> bool {
        self.kind == PieceKind::Man && row == self.color.promotion_row()
    }
}

/// A board coordinate. Row 0 is Black's home edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn is_on_board(self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// Playable squares are the dark ones, where `row + col` is odd.
    pub fn is_dark(self) -> bool {
        (self.row as u16 + self.col as u16) % 2 == 1
    }

    /// Square reached by stepping `(dr, dc)`, or `None` off the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = self.row as i16 + dr as i16;
        let col = self.col as i16 + dc as i16;
        let range = 0..BOARD_SIZE as i16;
        if range.contains(&row) && range.contains(&col) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    pub(crate) fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    pub(crate) fn from_index(idx: usize) -> Self {
        Self::new((idx / BOARD_SIZE) as u8, (idx % BOARD_SIZE) as u8)
    }
}

impl fmt::Display for Position {
    /// Algebraic notation: `a`-`h` for columns, rank 8 on row 0.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_on_board() {
            return write!(f, "({}, {})", self.row, self.col);
        }
        let file = (b'a' + self.col) as char;
        let rank = BOARD_SIZE as i16 - self.row as i16;
        write!(f, "{file}{rank}")
    }
}

impl FromStr for Position {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GameError::InvalidNotation(s.to_string());
        let mut chars = s.chars();
        let file = chars.next().ok_or_else(bad)?;
        let rank = chars.as_str().parse::<u8>().map_err(|_| bad())?;
        if !('a'..='h').contains(&file) || !(1..=BOARD_SIZE as u8).contains(&rank) {
            return Err(bad());
        }
        Ok(Self::new(BOARD_SIZE as u8 - rank, file as u8 - b'a'))
    }
}

/// One turn's move. `captures` lists jumped squares in jump order and is
/// empty for a simple step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    #[serde(default)]
    pub captures: Vec<Position>,
    #[serde(default)]
    pub is_promotion: bool,
}

impl Move {
    pub fn simple(from: Position, to: Position, is_promotion: bool) -> Self {
        Self {
            from,
            to,
            captures: Vec::new(),
            is_promotion,
        }
    }

    pub fn is_capture(&self) -> bool {
        !self.captures.is_empty()
    }

    /// Legality matching compares endpoints only.
    pub fn same_path(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture() { 'x' } else { '-' };
        write!(f, "{}{}{}", self.from, sep, self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    Playing,
    RedWins,
    BlackWins,
    /// Never produced by the rules engine.
    Draw,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        matches!(self, Self::RedWins | Self::BlackWins | Self::Draw)
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            Self::RedWins => Some(Color::Red),
            Self::BlackWins => Some(Color::Black),
            _ => None,
        }
    }
}

/// Pieces each colour has lost so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPieces {
    pub red: u32,
    pub black: u32,
}

impl CapturedPieces {
    pub fn get(&self, color: Color) -> u32 {
        match color {
            Color::Red => self.red,
            Color::Black => self.black,
        }
    }

    pub(crate) fn add(&mut self, color: Color, n: u32) {
        match color {
            Color::Red => self.red += n,
            Color::Black => self.black += n,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PieceCount {
    pub men: u32,
    pub kings: u32,
}

impl PieceCount {
    pub fn total(&self) -> u32 {
        self.men + self.kings
    }
}

/// AI strength, mapped to a fixed search depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Search depth in plies.
    pub fn depth(self) -> u8 {
        match self {
            Self::Easy => 2,
            Self::Medium => 4,
            Self::Hard => 6,
            Self::Expert => 8,
        }
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "expert" => Ok(Self::Expert),
            other => Err(GameError::UnknownDifficulty(other.to_string())),
        }
    }
}
