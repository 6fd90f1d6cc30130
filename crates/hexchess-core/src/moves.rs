//! Move generation for each piece kind.
//!
//! Every function here is a pure query over a read-only board. Destinations
//! may fall outside the board region; the caller filters them.

use crate::board::Board;
use crate::hex::{Direction, HexCoord};
use crate::piece::Color;

/// Upper bound on ray length. The board spans at most 11 cells in a line.
pub const MAX_RAY_STEPS: i32 = 11;

/// Cells a pawn of each color may double-step from
pub const WHITE_PAWN_START: [HexCoord; 9] = [
    HexCoord::new(-4, -1),
    HexCoord::new(-3, -1),
    HexCoord::new(-2, -1),
    HexCoord::new(-1, -1),
    HexCoord::new(0, -1),
    HexCoord::new(1, -2),
    HexCoord::new(2, -3),
    HexCoord::new(3, -4),
    HexCoord::new(4, -5),
];

pub const BLACK_PAWN_START: [HexCoord; 9] = [
    HexCoord::new(-4, 5),
    HexCoord::new(-3, 4),
    HexCoord::new(-2, 3),
    HexCoord::new(-1, 2),
    HexCoord::new(0, 1),
    HexCoord::new(1, 1),
    HexCoord::new(2, 1),
    HexCoord::new(3, 1),
    HexCoord::new(4, 1),
];

/// Whether `position` is one of the pawn starting cells of `color`
pub fn is_pawn_start(color: Color, position: HexCoord) -> bool {
    match color {
        Color::White => WHITE_PAWN_START.contains(&position),
        Color::Black => BLACK_PAWN_START.contains(&position),
    }
}

/// The twelve knight jumps: two steps along one direction, then one step
/// along each of its neighbors in the direction table
pub fn knight_offsets() -> [HexCoord; 12] {
    let mut offsets = [HexCoord::ORIGIN; 12];
    for (i, dir) in Direction::ALL.iter().enumerate() {
        let base = dir.unit() * 2;
        offsets[i * 2] = base + dir.previous().unit();
        offsets[i * 2 + 1] = base + dir.next().unit();
    }
    offsets
}

pub fn pawn_moves(
    color: Color,
    position: HexCoord,
    board: &Board,
    en_passant_target: Option<HexCoord>,
) -> Vec<HexCoord> {
    let mut moves = Vec::new();
    let forward = color.forward();

    let single = position.neighbor(forward);
    if !board.is_occupied(&single) {
        moves.push(single);

        let double = position.step(forward, 2);
        if is_pawn_start(color, position) && !board.is_occupied(&double) {
            moves.push(double);
        }
    }

    for direction in color.capture_directions() {
        let target = position.neighbor(direction);
        let is_en_passant = en_passant_target == Some(target);
        let holds_enemy = board
            .piece_at(&target)
            .is_some_and(|piece| piece.color != color);
        if is_en_passant || holds_enemy {
            moves.push(target);
        }
    }

    moves
}

pub fn knight_moves(color: Color, position: HexCoord, board: &Board) -> Vec<HexCoord> {
    knight_offsets()
        .into_iter()
        .map(|offset| position + offset)
        .filter(|target| !is_friendly(color, target, board))
        .collect()
}

pub fn rook_moves(color: Color, position: HexCoord, board: &Board) -> Vec<HexCoord> {
    let mut moves = Vec::new();
    for direction in Direction::ALL {
        cast_ray(color, position, direction.unit(), board, &mut moves);
    }
    moves
}

pub fn bishop_moves(color: Color, position: HexCoord, board: &Board) -> Vec<HexCoord> {
    let mut moves = Vec::new();
    for direction in Direction::ALL {
        cast_ray(color, position, direction.diagonal(), board, &mut moves);
    }
    moves
}

pub fn queen_moves(color: Color, position: HexCoord, board: &Board) -> Vec<HexCoord> {
    let mut moves = Vec::new();
    for direction in Direction::ALL {
        cast_ray(color, position, direction.diagonal(), board, &mut moves);
        cast_ray(color, position, direction.unit(), board, &mut moves);
    }
    moves
}

pub fn king_moves(color: Color, position: HexCoord, board: &Board) -> Vec<HexCoord> {
    let mut moves = Vec::new();
    for direction in Direction::ALL {
        for target in [position + direction.diagonal(), position + direction.unit()] {
            if !is_friendly(color, &target, board) {
                moves.push(target);
            }
        }
    }
    moves
}

/// Walk from `origin` along `step` until a piece or the step cap.
///
/// Empty cells are collected; the first occupied cell is collected only if
/// it holds an enemy piece.
fn cast_ray(color: Color, origin: HexCoord, step: HexCoord, board: &Board, moves: &mut Vec<HexCoord>) {
    for distance in 1..=MAX_RAY_STEPS {
        let target = origin + step * distance;
        match board.piece_at(&target) {
            Some(piece) => {
                if piece.color != color {
                    moves.push(target);
                }
                break;
            }
            None => moves.push(target),
        }
    }
}

fn is_friendly(color: Color, target: &HexCoord, board: &Board) -> bool {
    board
        .piece_at(target)
        .is_some_and(|piece| piece.color == color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn empty_board() -> Board {
        Board::empty_standard()
    }

    #[test]
    fn test_knight_offsets_are_distinct() {
        let offsets = knight_offsets();
        let unique: HashSet<_> = offsets.iter().collect();
        assert_eq!(unique.len(), 12);
        assert_eq!(offsets[0], HexCoord::new(-1, 3));
        assert_eq!(offsets[1], HexCoord::new(1, 2));
        assert_eq!(offsets[11], HexCoord::new(-2, 3));
        for offset in offsets {
            assert_eq!(HexCoord::ORIGIN.hex_distance(&offset), 3);
        }
    }

    #[test]
    fn test_pawn_start_tables_are_rotations() {
        for cell in WHITE_PAWN_START {
            assert!(BLACK_PAWN_START.contains(&-cell));
        }
    }

    #[test]
    fn test_white_pawn_double_step_from_start() {
        let mut board = empty_board();
        let start = HexCoord::new(-4, -1);
        board.place(start, Piece::pawn(Color::White));

        let moves = pawn_moves(Color::White, start, &board, None);
        assert_eq!(moves, vec![HexCoord::new(-4, 0), HexCoord::new(-4, 1)]);
    }

    #[test]
    fn test_white_pawn_single_step_elsewhere() {
        let mut board = empty_board();
        let position = HexCoord::new(-4, 0);
        board.place(position, Piece::pawn(Color::White));

        let moves = pawn_moves(Color::White, position, &board, None);
        assert_eq!(moves, vec![HexCoord::new(-4, 1)]);
    }

    #[test]
    fn test_pawn_blocked_forward_has_no_double_step() {
        let mut board = empty_board();
        let start = HexCoord::new(0, 1);
        board.place(start, Piece::pawn(Color::Black));
        board.place(HexCoord::new(0, 0), Piece::knight(Color::White));

        let moves = pawn_moves(Color::Black, start, &board, None);
        assert!(moves.is_empty());
    }

    #[test]
    fn test_pawn_double_step_blocked_at_destination() {
        let mut board = empty_board();
        let start = HexCoord::new(0, 1);
        board.place(start, Piece::pawn(Color::Black));
        board.place(HexCoord::new(0, -1), Piece::rook(Color::Black));

        let moves = pawn_moves(Color::Black, start, &board, None);
        assert_eq!(moves, vec![HexCoord::new(0, 0)]);
    }

    #[test]
    fn test_pawn_captures_only_enemies() {
        let mut board = empty_board();
        let position = HexCoord::new(0, 0);
        board.place(position, Piece::pawn(Color::White));
        board.place(HexCoord::new(1, 0), Piece::bishop(Color::Black));
        board.place(HexCoord::new(-1, 1), Piece::bishop(Color::White));

        let moves = pawn_moves(Color::White, position, &board, None);
        assert_eq!(moves, vec![HexCoord::new(0, 1), HexCoord::new(1, 0)]);
    }

    #[test]
    fn test_pawn_en_passant_target_is_reachable_when_empty() {
        let mut board = empty_board();
        let position = HexCoord::new(-3, 3);
        board.place(position, Piece::pawn(Color::White));
        board.place(HexCoord::new(-3, 4), Piece::pawn(Color::Black));
        board.place(HexCoord::new(-4, 3), Piece::pawn(Color::Black));

        let target = HexCoord::new(-4, 4);
        let moves = pawn_moves(Color::White, position, &board, Some(target));
        assert_eq!(moves, vec![target]);
    }

    #[test]
    fn test_black_pawn_moves_down() {
        let mut board = empty_board();
        let position = HexCoord::new(2, 0);
        board.place(position, Piece::pawn(Color::Black));
        board.place(HexCoord::new(3, -1), Piece::queen(Color::White));
        board.place(HexCoord::new(1, 0), Piece::queen(Color::White));

        let moves = pawn_moves(Color::Black, position, &board, None);
        assert_eq!(
            moves,
            vec![HexCoord::new(2, -1), HexCoord::new(3, -1), HexCoord::new(1, 0)]
        );
    }

    #[test]
    fn test_knight_has_twelve_moves_in_open_board() {
        let mut board = empty_board();
        board.place(HexCoord::ORIGIN, Piece::knight(Color::White));
        let moves = knight_moves(Color::White, HexCoord::ORIGIN, &board);
        assert_eq!(moves.len(), 12);
        assert!(moves.iter().all(|m| board.contains(m)));
    }

    #[test]
    fn test_knight_skips_friendly_targets() {
        let mut board = empty_board();
        board.place(HexCoord::ORIGIN, Piece::knight(Color::White));
        board.place(HexCoord::new(1, 2), Piece::pawn(Color::White));
        board.place(HexCoord::new(-1, 3), Piece::pawn(Color::Black));

        let moves = knight_moves(Color::White, HexCoord::ORIGIN, &board);
        assert_eq!(moves.len(), 11);
        assert!(!moves.contains(&HexCoord::new(1, 2)));
        assert!(moves.contains(&HexCoord::new(-1, 3)));
    }

    #[test]
    fn test_knight_candidates_may_leave_board() {
        let board = empty_board();
        let corner = HexCoord::new(5, -5);
        let moves = knight_moves(Color::Black, corner, &board);
        assert_eq!(moves.len(), 12);
        assert!(moves.iter().any(|m| !board.contains(m)));
    }

    #[test]
    fn test_rook_stops_at_enemy() {
        let mut board = empty_board();
        let origin = HexCoord::new(0, -2);
        board.place(origin, Piece::rook(Color::White));
        board.place(origin.step(Direction::Up, 3), Piece::pawn(Color::Black));

        let moves = rook_moves(Color::White, origin, &board);
        let up_ray: Vec<HexCoord> = moves
            .iter()
            .copied()
            .filter(|m| m.q() == 0 && m.r() > origin.r())
            .collect();
        assert_eq!(
            up_ray,
            vec![
                origin.step(Direction::Up, 1),
                origin.step(Direction::Up, 2),
                origin.step(Direction::Up, 3),
            ]
        );
    }

    #[test]
    fn test_rook_stops_before_friend() {
        let mut board = empty_board();
        let origin = HexCoord::ORIGIN;
        board.place(origin, Piece::rook(Color::Black));
        board.place(HexCoord::new(2, 0), Piece::pawn(Color::Black));

        let moves = rook_moves(Color::Black, origin, &board);
        assert!(moves.contains(&HexCoord::new(1, 0)));
        assert!(!moves.contains(&HexCoord::new(2, 0)));
        assert!(!moves.contains(&HexCoord::new(3, 0)));
    }

    #[test]
    fn test_unblocked_rays_run_eleven_steps() {
        let board = empty_board();
        let moves = rook_moves(Color::White, HexCoord::ORIGIN, &board);
        assert_eq!(moves.len(), 6 * MAX_RAY_STEPS as usize);
        let on_board = moves.iter().filter(|m| board.contains(m)).count();
        assert_eq!(on_board, 30);
    }

    #[test]
    fn test_bishop_uses_broad_diagonals() {
        let board = empty_board();
        let moves = bishop_moves(Color::White, HexCoord::ORIGIN, &board);
        let first_steps: Vec<HexCoord> = moves
            .chunks(MAX_RAY_STEPS as usize)
            .map(|ray| ray[0])
            .collect();
        let diagonals: Vec<HexCoord> = Direction::ALL.iter().map(|d| d.diagonal()).collect();
        assert_eq!(first_steps, diagonals);
        let on_board = moves.iter().filter(|m| board.contains(m)).count();
        assert_eq!(on_board, 12);
    }

    #[test]
    fn test_queen_is_rook_plus_bishop() {
        let mut board = empty_board();
        let origin = HexCoord::new(1, -1);
        board.place(HexCoord::new(1, 1), Piece::pawn(Color::Black));
        board.place(HexCoord::new(3, -2), Piece::pawn(Color::White));

        let queen: HashSet<_> = queen_moves(Color::White, origin, &board).into_iter().collect();
        let mut combined: HashSet<_> = rook_moves(Color::White, origin, &board).into_iter().collect();
        combined.extend(bishop_moves(Color::White, origin, &board));
        assert_eq!(queen, combined);
    }

    #[test]
    fn test_king_steps_once_in_twelve_directions() {
        let mut board = empty_board();
        board.place(HexCoord::new(0, 1), Piece::pawn(Color::White));
        board.place(HexCoord::new(1, 1), Piece::pawn(Color::Black));

        let moves = king_moves(Color::White, HexCoord::ORIGIN, &board);
        assert_eq!(moves.len(), 11);
        assert!(!moves.contains(&HexCoord::new(0, 1)));
        assert!(moves.contains(&HexCoord::new(1, 1)));
        assert_eq!(moves[0], HexCoord::new(1, 1));
    }
}
