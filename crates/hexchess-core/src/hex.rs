//! Hex coordinate system using cube coordinates (q, r, s).
//!
//! This module provides the foundational geometry for the board:
//! - `HexCoord`: Identifies individual hex cells, with q + r + s = 0
//! - `Direction`: The six unit directions around a cell, in ordinal order
//! - `OffsetCoord`: Rectangular grid position used by display consumers
//!
//! All three cube components are stored so the zero-sum invariant can be
//! checked at every construction boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use thiserror::Error;

/// Errors raised when building a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum HexError {
    #[error("Invalid cube coordinate ({q}, {r}, {s}): q + r + s must be 0")]
    InvalidCoordinate { q: i32, r: i32, s: i32 },

    #[error("Coordinate ({q}, {r}) has no representable s component")]
    OutOfRange { q: i32, r: i32 },
}

/// True mathematical modulo: the result is always in `0..n` for positive `n`.
///
/// `%` truncates toward zero and yields negative remainders for negative
/// operands, which breaks the offset mapping on the left half of the board.
pub fn modulo(a: i32, n: i32) -> i32 {
    a.rem_euclid(n)
}

/// One of the six neighbor directions of a hex cell.
///
/// Ordinal order matters: direction `i` combined with direction `(i + 1) % 6`
/// gives broad diagonal `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    RightUp,
    RightDown,
    Down,
    LeftDown,
    LeftUp,
}

impl Direction {
    /// All directions in ordinal order
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::RightUp,
        Direction::RightDown,
        Direction::Down,
        Direction::LeftDown,
        Direction::LeftUp,
    ];

    /// Ordinal of this direction (0-5)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction for an ordinal, wrapping around the table
    pub fn from_index(index: i32) -> Direction {
        Self::ALL[modulo(index, 6) as usize]
    }

    /// Unit vector of this direction
    pub const fn unit(self) -> HexCoord {
        match self {
            Direction::Up => HexCoord::new(0, 1),
            Direction::RightUp => HexCoord::new(1, 0),
            Direction::RightDown => HexCoord::new(1, -1),
            Direction::Down => HexCoord::new(0, -1),
            Direction::LeftDown => HexCoord::new(-1, 0),
            Direction::LeftUp => HexCoord::new(-1, 1),
        }
    }

    /// Next direction in ordinal order
    pub fn next(self) -> Direction {
        Self::from_index(self.index() as i32 + 1)
    }

    /// Previous direction in ordinal order
    pub fn previous(self) -> Direction {
        Self::from_index(self.index() as i32 - 1)
    }

    /// The direction pointing the other way
    pub fn opposite(self) -> Direction {
        Self::from_index(self.index() as i32 + 3)
    }

    /// Broad diagonal: this direction's unit vector plus the next one's
    pub fn diagonal(self) -> HexCoord {
        self.unit() + self.next().unit()
    }
}

/// Shade of a cell in the three-colour board pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileShade {
    Grey,
    White,
    Black,
}

/// Position on the rectangular display grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct OffsetCoord {
    /// Column on the display grid
    pub x: i32,
    /// Row on the display grid
    pub y: i32,
}

impl OffsetCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Deserialize)]
struct CubeTriple {
    q: i32,
    r: i32,
    s: i32,
}

impl TryFrom<CubeTriple> for HexCoord {
    type Error = HexError;

    fn try_from(raw: CubeTriple) -> Result<Self, Self::Error> {
        HexCoord::try_new(raw.q, raw.r, raw.s)
    }
}

/// Cube coordinate of a hex cell.
///
/// - `q` grows toward the right of the board
/// - `r` grows toward the top of the board
/// - `s` is kept so that q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "CubeTriple")]
pub struct HexCoord {
    q: i32,
    r: i32,
    s: i32,
}

impl HexCoord {
    /// The centre cell
    pub const ORIGIN: HexCoord = HexCoord::new(0, 0);

    /// Create a coordinate from q and r, deriving s = -q - r
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    /// Create a coordinate from all three components, rejecting q + r + s != 0
    pub fn try_new(q: i32, r: i32, s: i32) -> Result<Self, HexError> {
        if q as i64 + r as i64 + s as i64 != 0 {
            return Err(HexError::InvalidCoordinate { q, r, s });
        }
        Ok(Self { q, r, s })
    }

    /// Create a coordinate from q and r, failing when s = -q - r overflows.
    ///
    /// Use this for values from outside the engine; `new` is for cells known
    /// to be small.
    pub fn try_axial(q: i32, r: i32) -> Result<Self, HexError> {
        q.checked_neg()
            .and_then(|neg_q| neg_q.checked_sub(r))
            .map(|s| Self { q, r, s })
            .ok_or(HexError::OutOfRange { q, r })
    }

    pub const fn q(&self) -> i32 {
        self.q
    }

    pub const fn r(&self) -> i32 {
        self.r
    }

    pub const fn s(&self) -> i32 {
        self.s
    }

    /// Component-wise product.
    ///
    /// Products of valid coordinates are generally not valid cube coordinates,
    /// so the result goes through the same check as `try_new`.
    pub fn mul_componentwise(&self, other: &HexCoord) -> Result<HexCoord, HexError> {
        Self::try_new(self.q * other.q, self.r * other.r, self.s * other.s)
    }

    /// The adjacent cell in a direction
    pub fn neighbor(&self, direction: Direction) -> HexCoord {
        *self + direction.unit()
    }

    /// The cell `steps` cells away in a direction
    pub fn step(&self, direction: Direction, steps: i32) -> HexCoord {
        *self + direction.unit() * steps
    }

    /// The six neighboring cells in ordinal direction order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Distance used by the move applier: the floored Euclidean length of the
    /// cube difference vector.
    ///
    /// This is not the hex-step count. A straight three-step line has
    /// distance 4, and one broad-diagonal step has distance 2. The double-step
    /// pawn rule depends on these exact values.
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let diff = *self - *other;
        let squared = diff.q * diff.q + diff.r * diff.r + diff.s * diff.s;
        (squared as f64).sqrt().floor() as u32
    }

    /// Number of single steps between two cells
    pub fn hex_distance(&self, other: &HexCoord) -> u32 {
        let diff = *self - *other;
        diff.q
            .unsigned_abs()
            .max(diff.r.unsigned_abs())
            .max(diff.s.unsigned_abs())
    }

    /// Convert to the rectangular display grid
    pub fn to_offset(&self) -> OffsetCoord {
        let x = self.r + (self.q - modulo(self.q, 2)).div_euclid(2);
        OffsetCoord::new(x, self.q)
    }

    /// Convert from the rectangular display grid
    pub fn from_offset(offset: OffsetCoord) -> Self {
        let q = offset.y;
        let r = offset.x - (offset.y - modulo(offset.y, 2)).div_euclid(2);
        Self::new(q, r)
    }

    /// Like `from_offset`, for grid positions from outside the engine
    pub fn try_from_offset(offset: OffsetCoord) -> Result<Self, HexError> {
        let q = offset.y;
        let half = (offset.y - modulo(offset.y, 2)).div_euclid(2);
        let r = offset
            .x
            .checked_sub(half)
            .ok_or(HexError::OutOfRange { q, r: offset.x })?;
        Self::try_axial(q, r)
    }

    /// Shade of this cell in the board's three-colour pattern
    pub fn tile_shade(&self) -> TileShade {
        const SHADES: [TileShade; 3] = [TileShade::Grey, TileShade::White, TileShade::Black];
        SHADES[modulo(modulo(self.q * 2, 3) + modulo(self.r, 3), 3) as usize]
    }
}

impl Add for HexCoord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            q: self.q + other.q,
            r: self.r + other.r,
            s: self.s + other.s,
        }
    }
}

impl Sub for HexCoord {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            q: self.q - other.q,
            r: self.r - other.r,
            s: self.s - other.s,
        }
    }
}

impl Mul<i32> for HexCoord {
    type Output = Self;

    fn mul(self, factor: i32) -> Self {
        Self {
            q: self.q * factor,
            r: self.r * factor,
            s: self.s * factor,
        }
    }
}

impl Neg for HexCoord {
    type Output = Self;

    fn neg(self) -> Self {
        self * -1
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s)
    }
}
