//! Core game state machine.
//!
//! `GameState` owns the board and is the only thing that mutates it. Move
//! generation and check detection only ever see `&Board`.

use crate::actions::{GameEvent, MoveRecord, MoveRequest};
use crate::board::Board;
use crate::check::{self, CheckmateRule};
use crate::hex::HexCoord;
use crate::piece::{Color, Piece, PieceKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Moves are being played
    InProgress,

    /// The checkmate hook fired
    Finished { winner: Color },
}

/// Why a move request was not applied. The state is untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MoveRejected {
    #[error("Game is over")]
    GameOver,

    #[error("Destination {0} is not on the board")]
    OffBoard(HexCoord),

    #[error("No piece on {0}")]
    NoPiece(HexCoord),

    #[error("Not your turn")]
    NotYourTurn,

    #[error("{piece} on {from} cannot move to {to}")]
    IllegalDestination {
        piece: Piece,
        from: HexCoord,
        to: HexCoord,
    },

    #[error("Kings cannot be captured")]
    KingCapture,
}

/// Errors building a game from a custom position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SetupError {
    #[error("{0} has no king")]
    MissingKing(Color),

    #[error("{0} has more than one king")]
    DuplicateKing(Color),

    #[error("Piece on {0} is outside the board")]
    OffBoard(HexCoord),
}

/// Pawn that just advanced two cells and the cell it skipped over.
///
/// Lives for exactly one opposing move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnPassant {
    /// Cell a capturing pawn lands on
    pub target: HexCoord,
    /// Cell of the pawn that gets removed
    pub pawn: HexCoord,
}

/// Current cell of each king, updated whenever a king moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingCells {
    pub white: HexCoord,
    pub black: HexCoord,
}

impl KingCells {
    pub fn get(&self, color: Color) -> HexCoord {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn set(&mut self, color: Color, cell: HexCoord) {
        match color {
            Color::White => self.white = cell,
            Color::Black => self.black = cell,
        }
    }
}

/// Rule switches for a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Rules {
    /// How the checkmate hook answers after each move
    pub checkmate: CheckmateRule,
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// The game board
    board: Board,
    /// Color whose move it is
    side_to_move: Color,
    /// Set by a double step, cleared after the next move
    en_passant: Option<EnPassant>,
    /// King positions, kept in sync with the board
    kings: KingCells,
    /// Current game phase
    phase: GamePhase,
    rules: Rules,
    /// Moves applied so far
    history: Vec<MoveRecord>,
}

impl GameState {
    /// Create a game from the standard starting layout with White to move
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Create a standard game with custom rules
    pub fn with_rules(rules: Rules) -> Self {
        Self {
            board: Board::standard(),
            side_to_move: Color::White,
            en_passant: None,
            kings: KingCells {
                white: HexCoord::new(-1, -4),
                black: HexCoord::new(1, 4),
            },
            phase: GamePhase::InProgress,
            rules,
            history: Vec::new(),
        }
    }

    /// Create a game from a custom position. Every piece must stand on a board
    /// cell and each color needs exactly one king.
    pub fn from_board(board: Board, side_to_move: Color, rules: Rules) -> Result<Self, SetupError> {
        let mut outside: Vec<HexCoord> = board
            .pieces()
            .map(|(cell, _)| *cell)
            .filter(|cell| !board.contains(cell))
            .collect();
        outside.sort_by_key(|cell| (cell.q(), cell.r()));
        if let Some(&cell) = outside.first() {
            return Err(SetupError::OffBoard(cell));
        }

        let white = Self::single_king(&board, Color::White)?;
        let black = Self::single_king(&board, Color::Black)?;

        Ok(Self {
            board,
            side_to_move,
            en_passant: None,
            kings: KingCells { white, black },
            phase: GamePhase::InProgress,
            rules,
            history: Vec::new(),
        })
    }

    fn single_king(board: &Board, color: Color) -> Result<HexCoord, SetupError> {
        match board.find_kings(color).as_slice() {
            [cell] => Ok(*cell),
            [] => Err(SetupError::MissingKing(color)),
            _ => Err(SetupError::DuplicateKing(color)),
        }
    }

    /// Read-only view of the board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn en_passant(&self) -> Option<EnPassant> {
        self.en_passant
    }

    /// Cell a pawn may capture into en passant this move, if any
    pub fn en_passant_target(&self) -> Option<HexCoord> {
        self.en_passant.map(|ep| ep.target)
    }

    pub fn king_cell(&self, color: Color) -> HexCoord {
        self.kings.get(color)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Number of moves applied so far
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Finished { .. })
    }

    /// Get the winner if the game is finished
    pub fn winner(&self) -> Option<Color> {
        match self.phase {
            GamePhase::Finished { winner } => Some(winner),
            GamePhase::InProgress => None,
        }
    }

    /// Destinations the piece on `from` may move to: its generated moves that
    /// lie on the board and do not capture a king.
    ///
    /// Empty when `from` holds no piece. Does not look at whose turn it is.
    pub fn valid_moves(&self, from: HexCoord) -> Vec<HexCoord> {
        let piece = match self.board.piece_at(&from) {
            Some(piece) => piece,
            None => return Vec::new(),
        };

        piece
            .valid_moves(from, &self.board, self.en_passant_target())
            .into_iter()
            .filter(|to| self.board.contains(to) && !self.holds_king(to))
            .collect()
    }

    /// Every move the side to move may request, sorted by cell
    pub fn all_valid_moves(&self) -> Vec<MoveRequest> {
        if self.is_finished() {
            return Vec::new();
        }

        let mut moves: Vec<MoveRequest> = self
            .board
            .pieces_of(self.side_to_move)
            .flat_map(|(from, _)| {
                self.valid_moves(*from)
                    .into_iter()
                    .map(move |to| MoveRequest::new(*from, to))
            })
            .collect();
        moves.sort_by_key(|m| (m.from.q(), m.from.r(), m.to.q(), m.to.r()));
        moves
    }

    /// Whether the king of `color` is currently attacked
    pub fn is_in_check(&self, color: Color) -> bool {
        check::is_in_check(self.kings.get(color), &self.board)
    }

    /// The checkmate hook for `color`, answered according to the game's rules
    pub fn is_checkmate(&self, color: Color) -> bool {
        let en_passant = if color == self.side_to_move {
            self.en_passant
        } else {
            None
        };
        check::is_checkmate(
            self.kings.get(color),
            &self.board,
            en_passant,
            self.rules.checkmate,
        )
    }

    /// Apply a move request
    pub fn apply(&mut self, request: MoveRequest) -> Result<Vec<GameEvent>, MoveRejected> {
        self.request_move(request.from, request.to)
    }

    /// Move the piece on `from` to `to` if that is a legal move for the side
    /// to move.
    ///
    /// On rejection nothing changes. On success the events describe what
    /// happened, in order.
    pub fn request_move(
        &mut self,
        from: HexCoord,
        to: HexCoord,
    ) -> Result<Vec<GameEvent>, MoveRejected> {
        let piece = match self.validate_move(from, to) {
            Ok(piece) => piece,
            Err(rejection) => {
                trace!(%from, %to, %rejection, "move rejected");
                return Err(rejection);
            }
        };

        let mover = piece.color;
        let mut events = vec![GameEvent::PieceMoved { piece, from, to }];
        let mut record = MoveRecord {
            piece,
            from,
            to,
            captured: None,
            en_passant: false,
            double_step: false,
        };

        // Capture onto the destination
        if let Some(target) = self.board.piece_at(&to).copied() {
            if target.color != mover {
                self.board.remove(&to);
                record.captured = Some(target);
                debug!(%to, captured = %target, "piece captured");
                events.push(GameEvent::PieceCaptured { piece: target, at: to });
            }
        }

        // En passant: the victim stands beside the landing cell
        if piece.kind == PieceKind::Pawn {
            if let Some(ep) = self.en_passant.filter(|ep| ep.target == to) {
                if let Some(victim) = self.board.remove(&ep.pawn) {
                    record.captured = Some(victim);
                    debug!(at = %ep.pawn, landed = %to, "en passant capture");
                    events.push(GameEvent::EnPassantCapture {
                        piece: victim,
                        at: ep.pawn,
                        landed: to,
                    });
                }
                record.en_passant = true;
            }
        }

        // Whatever was left over from the previous move expires now
        self.en_passant = None;

        if piece.kind == PieceKind::Pawn && from.distance_to(&to) == 2 {
            let target = HexCoord::new((from.q() + to.q()) / 2, (from.r() + to.r()) / 2);
            self.en_passant = Some(EnPassant { target, pawn: to });
            record.double_step = true;
            events.push(GameEvent::DoubleStep { pawn: to, target });
        }

        self.board.relocate(&from, to);
        if piece.kind == PieceKind::King {
            self.kings.set(mover, to);
        }

        self.side_to_move = mover.opponent();
        self.history.push(record);
        debug!(%piece, %from, %to, ply = self.history.len(), "move applied");
        events.push(GameEvent::TurnChanged {
            previous: mover,
            next: self.side_to_move,
        });

        if self.is_checkmate(self.side_to_move) {
            let king = self.kings.get(self.side_to_move);
            self.phase = GamePhase::Finished { winner: mover };
            info!(winner = %mover, %king, "checkmate");
            events.push(GameEvent::Checkmate {
                winner: mover,
                king,
            });
        }

        Ok(events)
    }

    fn validate_move(&self, from: HexCoord, to: HexCoord) -> Result<Piece, MoveRejected> {
        if self.is_finished() {
            return Err(MoveRejected::GameOver);
        }
        if !self.board.contains(&to) {
            return Err(MoveRejected::OffBoard(to));
        }
        let piece = *self
            .board
            .piece_at(&from)
            .ok_or(MoveRejected::NoPiece(from))?;
        if piece.color != self.side_to_move {
            return Err(MoveRejected::NotYourTurn);
        }
        if !piece
            .valid_moves(from, &self.board, self.en_passant_target())
            .contains(&to)
        {
            return Err(MoveRejected::IllegalDestination { piece, from, to });
        }
        if self.holds_king(&to) {
            return Err(MoveRejected::KingCapture);
        }
        Ok(piece)
    }

    fn holds_king(&self, cell: &HexCoord) -> bool {
        self.board
            .piece_at(cell)
            .is_some_and(|piece| piece.kind == PieceKind::King)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
