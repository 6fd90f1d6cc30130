//! Move requests players submit and the events applying them produces.

use crate::hex::HexCoord;
use crate::piece::{Color, Piece};
use serde::{Deserialize, Serialize};

/// A request to move the piece on `from` to `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: HexCoord,
    pub to: HexCoord,
}

impl MoveRequest {
    pub const fn new(from: HexCoord, to: HexCoord) -> Self {
        Self { from, to }
    }
}

/// One applied move, as kept in the game history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub piece: Piece,
    pub from: HexCoord,
    pub to: HexCoord,
    /// Piece removed by this move, on `to` or on the en-passant pawn cell
    pub captured: Option<Piece>,
    pub en_passant: bool,
    pub double_step: bool,
}

/// Events that occur as a result of applying a move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A piece changed cells
    PieceMoved {
        piece: Piece,
        from: HexCoord,
        to: HexCoord,
    },

    /// A piece was taken off its cell by a capture onto that cell
    PieceCaptured { piece: Piece, at: HexCoord },

    /// A pawn was taken en passant; `at` is where it stood, not where the
    /// capturing pawn landed
    EnPassantCapture {
        piece: Piece,
        at: HexCoord,
        landed: HexCoord,
    },

    /// A pawn advanced two cells and may be taken en passant next turn
    DoubleStep { pawn: HexCoord, target: HexCoord },

    /// The other side is now to move
    TurnChanged { previous: Color, next: Color },

    /// The side to move has no way out of check
    Checkmate { winner: Color, king: HexCoord },
}
