//! Attack detection and the checkmate hook.
//!
//! Attacks are derived from ordinary move generation: a cell is attacked when
//! some enemy piece lists it as a destination.

use crate::board::Board;
use crate::game::EnPassant;
use crate::hex::HexCoord;
use crate::piece::{Color, Piece, PieceKind};
use serde::{Deserialize, Serialize};

/// How the checkmate hook answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckmateRule {
    /// Never report checkmate; games only end when players stop
    #[default]
    Disabled,
    /// Search every reply of the defending side
    Detect,
}

/// Whether any piece of `attacker` can move onto `cell`
pub fn is_attacked(cell: HexCoord, attacker: Color, board: &Board) -> bool {
    board
        .pieces_of(attacker)
        .any(|(from, piece)| piece.valid_moves(*from, board, None).contains(&cell))
}

/// Whether the king standing on `king_cell` is attacked
pub fn is_in_check(king_cell: HexCoord, board: &Board) -> bool {
    match board.piece_at(&king_cell) {
        Some(king) => is_attacked(king_cell, king.color.opponent(), board),
        None => false,
    }
}

/// Whether the king on `king_cell` is in check and no move of its side
/// gets it out.
///
/// Replies are the same moves the applier accepts: generated destinations on
/// the board, excluding captures of the enemy king.
pub fn is_checkmated(king_cell: HexCoord, board: &Board, en_passant: Option<EnPassant>) -> bool {
    let color = match board.piece_at(&king_cell) {
        Some(piece) if piece.kind == PieceKind::King => piece.color,
        _ => return false,
    };
    if !is_attacked(king_cell, color.opponent(), board) {
        return false;
    }

    let target = en_passant.map(|ep| ep.target);
    for (from, piece) in board.pieces_of(color) {
        for to in piece.valid_moves(*from, board, target) {
            if !board.contains(&to) || holds_king(board, &to) {
                continue;
            }
            let scratch = play_on_copy(board, *from, to, piece, en_passant);
            let king_after = if *from == king_cell { to } else { king_cell };
            if !is_attacked(king_after, color.opponent(), &scratch) {
                return false;
            }
        }
    }
    true
}

/// The checkmate hook consulted by the game after every move
pub fn is_checkmate(
    king_cell: HexCoord,
    board: &Board,
    en_passant: Option<EnPassant>,
    rule: CheckmateRule,
) -> bool {
    match rule {
        CheckmateRule::Disabled => false,
        CheckmateRule::Detect => is_checkmated(king_cell, board, en_passant),
    }
}

fn holds_king(board: &Board, cell: &HexCoord) -> bool {
    board
        .piece_at(cell)
        .is_some_and(|piece| piece.kind == PieceKind::King)
}

/// Board after `piece` moves `from` -> `to`, including an en-passant removal
fn play_on_copy(
    board: &Board,
    from: HexCoord,
    to: HexCoord,
    piece: &Piece,
    en_passant: Option<EnPassant>,
) -> Board {
    let mut scratch = board.clone();
    if let Some(ep) = en_passant {
        if piece.kind == PieceKind::Pawn && ep.target == to {
            scratch.remove(&ep.pawn);
        }
    }
    scratch.relocate(&from, to);
    scratch
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Black king on the top edge, boxed in by three white rooks
    fn mated_position() -> (Board, HexCoord) {
        let mut board = Board::empty_standard();
        let king = HexCoord::new(0, 5);
        board.place(king, Piece::king(Color::Black));
        board.place(HexCoord::new(0, -5), Piece::king(Color::White));
        board.place(HexCoord::new(0, 2), Piece::rook(Color::White));
        board.place(HexCoord::new(-4, 4), Piece::rook(Color::White));
        board.place(HexCoord::new(4, 0), Piece::rook(Color::White));
        (board, king)
    }

    #[test]
    fn test_attacks_follow_move_generation() {
        let mut board = Board::empty_standard();
        board.place(HexCoord::ORIGIN, Piece::rook(Color::White));
        board.place(HexCoord::new(0, 2), Piece::pawn(Color::Black));

        assert!(is_attacked(HexCoord::new(0, 2), Color::White, &board));
        assert!(!is_attacked(HexCoord::new(0, 3), Color::White, &board));
        assert!(!is_attacked(HexCoord::ORIGIN, Color::Black, &board));
    }

    #[test]
    fn test_pawn_push_does_not_attack() {
        let mut board = Board::empty_standard();
        board.place(HexCoord::ORIGIN, Piece::pawn(Color::White));
        board.place(HexCoord::new(0, 1), Piece::king(Color::Black));
        assert!(!is_in_check(HexCoord::new(0, 1), &board));

        board.place(HexCoord::new(1, 0), Piece::king(Color::Black));
        assert!(is_in_check(HexCoord::new(1, 0), &board));
    }

    #[test]
    fn test_starting_position_is_not_check() {
        let board = Board::standard();
        assert!(!is_in_check(HexCoord::new(-1, -4), &board));
        assert!(!is_in_check(HexCoord::new(1, 4), &board));
        assert!(!is_checkmated(HexCoord::new(1, 4), &board, None));
    }

    #[test]
    fn test_detects_mate() {
        let (board, king) = mated_position();
        assert!(is_in_check(king, &board));
        assert!(is_checkmated(king, &board, None));
    }

    #[test]
    fn test_escape_square_prevents_mate() {
        let (mut board, king) = mated_position();
        board.remove(&HexCoord::new(4, 0));
        assert!(is_in_check(king, &board));
        assert!(!is_checkmated(king, &board, None));
    }

    #[test]
    fn test_disabled_hook_never_reports_mate() {
        let (board, king) = mated_position();
        assert!(!is_checkmate(king, &board, None, CheckmateRule::Disabled));
        assert!(is_checkmate(king, &board, None, CheckmateRule::Detect));
    }

    #[test]
    fn test_non_king_cell_is_never_mated() {
        let (board, _) = mated_position();
        assert!(!is_checkmated(HexCoord::new(0, 2), &board, None));
        assert!(!is_checkmated(HexCoord::new(3, 0), &board, None));
    }
}
