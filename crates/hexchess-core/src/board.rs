//! Board representation: the hexagonal cell region and piece placement.
//!
//! This module contains:
//! - The radius-5 hexagon of playable cells
//! - The cell -> piece mapping
//! - The fixed starting layout
//! - A JSON-friendly flattening for renderers

use crate::hex::{HexCoord, TileShade};
use crate::piece::{Color, Piece, PieceKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Radius of the standard board (distance from centre to edge)
pub const BOARD_RADIUS: i32 = 5;

/// Starting position for both colors.
///
/// Black's half is White's half rotated 180 degrees about the centre.
pub const STARTING_LAYOUT: [(HexCoord, PieceKind, Color); 36] = [
    (HexCoord::new(-1, -4), PieceKind::King, Color::White),
    (HexCoord::new(1, -5), PieceKind::Queen, Color::White),
    (HexCoord::new(0, -3), PieceKind::Bishop, Color::White),
    (HexCoord::new(0, -4), PieceKind::Bishop, Color::White),
    (HexCoord::new(0, -5), PieceKind::Bishop, Color::White),
    (HexCoord::new(-3, -2), PieceKind::Rook, Color::White),
    (HexCoord::new(3, -5), PieceKind::Rook, Color::White),
    (HexCoord::new(-2, -3), PieceKind::Knight, Color::White),
    (HexCoord::new(2, -5), PieceKind::Knight, Color::White),
    (HexCoord::new(-4, -1), PieceKind::Pawn, Color::White),
    (HexCoord::new(-3, -1), PieceKind::Pawn, Color::White),
    (HexCoord::new(-2, -1), PieceKind::Pawn, Color::White),
    (HexCoord::new(-1, -1), PieceKind::Pawn, Color::White),
    (HexCoord::new(0, -1), PieceKind::Pawn, Color::White),
    (HexCoord::new(1, -2), PieceKind::Pawn, Color::White),
    (HexCoord::new(2, -3), PieceKind::Pawn, Color::White),
    (HexCoord::new(3, -4), PieceKind::Pawn, Color::White),
    (HexCoord::new(4, -5), PieceKind::Pawn, Color::White),
    (HexCoord::new(1, 4), PieceKind::King, Color::Black),
    (HexCoord::new(-1, 5), PieceKind::Queen, Color::Black),
    (HexCoord::new(0, 3), PieceKind::Bishop, Color::Black),
    (HexCoord::new(0, 4), PieceKind::Bishop, Color::Black),
    (HexCoord::new(0, 5), PieceKind::Bishop, Color::Black),
    (HexCoord::new(-3, 5), PieceKind::Rook, Color::Black),
    (HexCoord::new(3, 2), PieceKind::Rook, Color::Black),
    (HexCoord::new(-2, 5), PieceKind::Knight, Color::Black),
    (HexCoord::new(2, 3), PieceKind::Knight, Color::Black),
    (HexCoord::new(-4, 5), PieceKind::Pawn, Color::Black),
    (HexCoord::new(-3, 4), PieceKind::Pawn, Color::Black),
    (HexCoord::new(-2, 3), PieceKind::Pawn, Color::Black),
    (HexCoord::new(-1, 2), PieceKind::Pawn, Color::Black),
    (HexCoord::new(0, 1), PieceKind::Pawn, Color::Black),
    (HexCoord::new(1, 1), PieceKind::Pawn, Color::Black),
    (HexCoord::new(2, 1), PieceKind::Pawn, Color::Black),
    (HexCoord::new(3, 1), PieceKind::Pawn, Color::Black),
    (HexCoord::new(4, 1), PieceKind::Pawn, Color::Black),
];

/// Serde adapter storing a cell map as a list of `[cell, value]` pairs.
///
/// JSON objects only take string keys, so struct-keyed maps go over the wire
/// as arrays.
mod cell_map {
    use crate::hex::HexCoord;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<V, S>(map: &HashMap<HexCoord, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        let mut entries: Vec<(&HexCoord, &V)> = map.iter().collect();
        entries.sort_by_key(|(cell, _)| (cell.q(), cell.r()));
        serializer.collect_seq(entries)
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<HashMap<HexCoord, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let entries: Vec<(HexCoord, V)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

/// The game board: playable region plus piece placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Radius of the hexagonal region
    radius: i32,
    /// Playable cells
    cells: HashSet<HexCoord>,
    /// At most one piece per cell; absence means empty
    #[serde(with = "cell_map")]
    pieces: HashMap<HexCoord, Piece>,
}

impl Board {
    /// Create a hexagonal board of the given radius with no pieces
    pub fn empty(radius: i32) -> Self {
        let mut cells = HashSet::new();
        for q in -radius..=radius {
            let r1 = (-radius).max(-q - radius);
            let r2 = radius.min(-q + radius);
            for r in r1..=r2 {
                cells.insert(HexCoord::new(q, r));
            }
        }

        Self {
            radius,
            cells,
            pieces: HashMap::new(),
        }
    }

    /// Create the standard radius-5 board with no pieces
    pub fn empty_standard() -> Self {
        Self::empty(BOARD_RADIUS)
    }

    /// Create the standard board with the starting layout
    pub fn standard() -> Self {
        let mut board = Self::empty_standard();
        for (cell, kind, color) in STARTING_LAYOUT {
            board.place(cell, Piece::new(kind, color));
        }
        board
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Whether a cell belongs to the playable region
    pub fn contains(&self, cell: &HexCoord) -> bool {
        self.cells.contains(cell)
    }

    /// All playable cells (unordered)
    pub fn cells(&self) -> impl Iterator<Item = &HexCoord> {
        self.cells.iter()
    }

    /// Number of playable cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The piece on a cell, if any
    pub fn piece_at(&self, cell: &HexCoord) -> Option<&Piece> {
        self.pieces.get(cell)
    }

    pub fn is_occupied(&self, cell: &HexCoord) -> bool {
        self.pieces.contains_key(cell)
    }

    /// All placed pieces with their cells (unordered)
    pub fn pieces(&self) -> impl Iterator<Item = (&HexCoord, &Piece)> {
        self.pieces.iter()
    }

    /// Pieces of one color with their cells (unordered)
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (&HexCoord, &Piece)> {
        self.pieces.iter().filter(move |(_, piece)| piece.color == color)
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Cells holding a king of the given color
    pub fn find_kings(&self, color: Color) -> Vec<HexCoord> {
        self.pieces_of(color)
            .filter(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(cell, _)| *cell)
            .collect()
    }

    /// Put a piece on a cell, returning whatever was there
    pub fn place(&mut self, cell: HexCoord, piece: Piece) -> Option<Piece> {
        self.pieces.insert(cell, piece)
    }

    /// Take the piece off a cell
    pub fn remove(&mut self, cell: &HexCoord) -> Option<Piece> {
        self.pieces.remove(cell)
    }

    /// Move whatever stands on `from` to `to`, returning the piece that was on `to`
    pub fn relocate(&mut self, from: &HexCoord, to: HexCoord) -> Option<Piece> {
        match self.pieces.remove(from) {
            Some(piece) => self.pieces.insert(to, piece),
            None => None,
        }
    }

    /// Convert to JSON-friendly format (arrays instead of maps)
    pub fn to_json_friendly(&self) -> BoardJson {
        let mut cells: Vec<CellJson> = self
            .cells
            .iter()
            .map(|cell| {
                let offset = cell.to_offset();
                CellJson {
                    q: cell.q(),
                    r: cell.r(),
                    x: offset.x,
                    y: offset.y,
                    shade: cell.tile_shade(),
                    piece: self.pieces.get(cell).copied(),
                }
            })
            .collect();
        cells.sort_by_key(|c| (c.q, c.r));

        BoardJson {
            radius: self.radius,
            cells,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

/// JSON-friendly board representation with arrays instead of maps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardJson {
    pub radius: i32,
    pub cells: Vec<CellJson>,
}

/// One cell for renderers: cube and offset position, shade, occupant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellJson {
    pub q: i32,
    pub r: i32,
    pub x: i32,
    pub y: i32,
    pub shade: TileShade,
    pub piece: Option<Piece>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{BLACK_PAWN_START, WHITE_PAWN_START};

    #[test]
    fn test_standard_region_has_91_cells() {
        let board = Board::empty_standard();
        assert_eq!(board.cell_count(), 91);
        assert!(board.contains(&HexCoord::new(5, -5)));
        assert!(board.contains(&HexCoord::new(-5, 0)));
        assert!(!board.contains(&HexCoord::new(5, 1)));
        assert!(!board.contains(&HexCoord::new(3, 3)));
    }

    #[test]
    fn test_region_sizes_by_radius() {
        // 3R(R+1) + 1 cells
        for radius in 0..=6 {
            let board = Board::empty(radius);
            assert_eq!(board.cell_count() as i32, 3 * radius * (radius + 1) + 1);
        }
    }

    #[test]
    fn test_starting_layout() {
        let board = Board::standard();
        assert_eq!(board.piece_count(), 36);
        for (cell, _) in board.pieces() {
            assert!(board.contains(cell), "{cell} is off the board");
        }
        assert_eq!(board.pieces_of(Color::White).count(), 18);
        assert_eq!(board.pieces_of(Color::Black).count(), 18);
        assert_eq!(board.find_kings(Color::White), vec![HexCoord::new(-1, -4)]);
        assert_eq!(board.find_kings(Color::Black), vec![HexCoord::new(1, 4)]);
    }

    #[test]
    fn test_starting_layout_is_rotationally_symmetric() {
        let board = Board::standard();
        for (cell, piece) in board.pieces() {
            let mirrored = board.piece_at(&-*cell).copied();
            assert_eq!(
                mirrored,
                Some(Piece::new(piece.kind, piece.color.opponent())),
                "no counterpart for {cell}"
            );
        }
    }

    #[test]
    fn test_pawns_stand_on_start_cells() {
        let board = Board::standard();
        for cell in WHITE_PAWN_START {
            assert_eq!(board.piece_at(&cell), Some(&Piece::pawn(Color::White)));
        }
        for cell in BLACK_PAWN_START {
            assert_eq!(board.piece_at(&cell), Some(&Piece::pawn(Color::Black)));
        }
    }

    #[test]
    fn test_place_remove_relocate() {
        let mut board = Board::empty_standard();
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, -1);

        assert_eq!(board.place(a, Piece::rook(Color::White)), None);
        assert!(board.is_occupied(&a));

        board.place(b, Piece::pawn(Color::Black));
        let captured = board.relocate(&a, b);
        assert_eq!(captured, Some(Piece::pawn(Color::Black)));
        assert!(!board.is_occupied(&a));
        assert_eq!(board.piece_at(&b), Some(&Piece::rook(Color::White)));

        assert_eq!(board.relocate(&a, b), None);
        assert_eq!(board.remove(&b), Some(Piece::rook(Color::White)));
        assert_eq!(board.piece_count(), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let board = Board::standard();
        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(board, restored);
    }

    #[test]
    fn test_json_friendly() {
        let board = Board::standard();
        let json = board.to_json_friendly();
        assert_eq!(json.cells.len(), 91);
        assert_eq!(json.cells.iter().filter(|c| c.piece.is_some()).count(), 36);

        let king = json
            .cells
            .iter()
            .find(|c| c.q == -1 && c.r == -4)
            .unwrap();
        assert_eq!(king.piece, Some(Piece::king(Color::White)));
        let offset = HexCoord::new(-1, -4).to_offset();
        assert_eq!((king.x, king.y), (offset.x, offset.y));
    }
}
