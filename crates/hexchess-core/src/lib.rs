//! Hexchess - a chess rules engine for a hexagonal board
//!
//! This crate provides the core game logic, including:
//! - Cube coordinate system for the 91-cell hexagonal board
//! - Board representation and the standard starting layout
//! - Move generation for all six piece kinds
//! - Game state machine with turn order, captures and en passant
//!
//! # Architecture
//!
//! The engine is platform-agnostic. It can be compiled to:
//! - Native Rust for server-side game hosting
//! - WebAssembly for client-side play
//!
//! # Modules
//!
//! - [`hex`]: Cube coordinates, directions and offset-grid mapping
//! - [`piece`]: Colors, piece kinds and per-piece move dispatch
//! - [`moves`]: Move generation rules
//! - [`board`]: Board region and piece placement
//! - [`check`]: Attack detection and the checkmate hook
//! - [`game`]: Game state machine

pub mod actions;
pub mod board;
pub mod check;
pub mod game;
pub mod hex;
pub mod moves;
pub mod piece;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameEvent, MoveRecord, MoveRequest};
pub use board::{Board, BoardJson, CellJson, BOARD_RADIUS};
pub use check::CheckmateRule;
pub use game::{EnPassant, GamePhase, GameState, KingCells, MoveRejected, Rules, SetupError};
pub use hex::{Direction, HexCoord, HexError, OffsetCoord, TileShade};
pub use piece::{Color, Piece, PieceKind};
