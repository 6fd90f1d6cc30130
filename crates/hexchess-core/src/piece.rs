//! Piece kinds, colors, and move generation dispatch.

use crate::board::Board;
use crate::hex::{Direction, HexCoord};
use crate::moves;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side a piece belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Both colors, White first
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// The other side
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Direction pawns of this color advance in
    pub fn forward(self) -> Direction {
        match self {
            Color::White => Direction::Up,
            Color::Black => Direction::Down,
        }
    }

    /// The two diagonal-forward directions pawns of this color capture along
    pub fn capture_directions(self) -> [Direction; 2] {
        match self {
            Color::White => [Direction::RightUp, Direction::LeftUp],
            Color::Black => [Direction::RightDown, Direction::LeftDown],
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}

/// Kind of piece.
///
/// Discriminants match the spritesheet order used by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Rook = 2,
    Bishop = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    /// All piece kinds in sprite order
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Index into a piece spritesheet
    pub const fn sprite_index(self) -> u8 {
        self as u8
    }
}

/// A piece on the board. Its position is the key it is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    pub const fn pawn(color: Color) -> Self {
        Self::new(PieceKind::Pawn, color)
    }

    pub const fn knight(color: Color) -> Self {
        Self::new(PieceKind::Knight, color)
    }

    pub const fn rook(color: Color) -> Self {
        Self::new(PieceKind::Rook, color)
    }

    pub const fn bishop(color: Color) -> Self {
        Self::new(PieceKind::Bishop, color)
    }

    pub const fn queen(color: Color) -> Self {
        Self::new(PieceKind::Queen, color)
    }

    pub const fn king(color: Color) -> Self {
        Self::new(PieceKind::King, color)
    }

    /// Index into the spritesheet of this piece's color
    pub const fn sprite_index(&self) -> u8 {
        self.kind.sprite_index()
    }

    /// Destinations this piece could move to from `position`.
    ///
    /// The result is not filtered against the board region; callers check
    /// `Board::contains` before using a destination.
    pub fn valid_moves(
        &self,
        position: HexCoord,
        board: &Board,
        en_passant_target: Option<HexCoord>,
    ) -> Vec<HexCoord> {
        match self.kind {
            PieceKind::Pawn => moves::pawn_moves(self.color, position, board, en_passant_target),
            PieceKind::Knight => moves::knight_moves(self.color, position, board),
            PieceKind::Rook => moves::rook_moves(self.color, position, board),
            PieceKind::Bishop => moves::bishop_moves(self.color, position, board),
            PieceKind::Queen => moves::queen_moves(self.color, position, board),
            PieceKind::King => moves::king_moves(self.color, position, board),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.color, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_order() {
        let indices: Vec<u8> = PieceKind::ALL.iter().map(|k| k.sprite_index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(Piece::king(Color::Black).sprite_index(), 5);
    }

    #[test]
    fn test_pawn_directions_mirror() {
        for color in Color::ALL {
            let forward = color.forward();
            assert_eq!(color.opponent().forward(), forward.opposite());
            for capture in color.capture_directions() {
                // Each capture direction is adjacent to forward
                assert!(capture == forward.next() || capture == forward.previous());
            }
        }
    }

    #[test]
    fn test_opponent() {
        assert_eq!(Color::White.opponent(), Color::Black);
        assert_eq!(Color::Black.opponent().opponent(), Color::Black);
    }

    #[test]
    fn test_display() {
        assert_eq!(Piece::knight(Color::White).to_string(), "White Knight");
    }
}
