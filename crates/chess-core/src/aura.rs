//! Squares controlled by a side ("aura").
//!
//! Attacks are pseudo-legal: pins and checks are ignored, sliders stop on
//! the first occupied square and include it.

use std::collections::BTreeSet;

use crate::{Color, Piece, Position, Square};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

fn steps(from: Square, offsets: &[(i8, i8)]) -> Vec<Square> {
    offsets
        .iter()
        .filter_map(|&(df, dr)| from.offset(df, dr))
        .collect()
}

impl Position {
    /// Squares attacked by the piece standing on `from`.
    pub fn attacks_from(&self, from: Square) -> Vec<Square> {
        let Some((piece, color)) = self.piece_at(from) else {
            return Vec::new();
        };

        match piece {
            Piece::Pawn => {
                let dr = color.sign() as i8;
                steps(from, &[(-1, dr), (1, dr)])
            }
            Piece::Knight => steps(from, &KNIGHT_OFFSETS),
            Piece::King => steps(from, &KING_OFFSETS),
            Piece::Bishop => self.rays(from, &DIAGONAL),
            Piece::Rook => self.rays(from, &ORTHOGONAL),
            Piece::Queen => {
                let mut squares = self.rays(from, &ORTHOGONAL);
                squares.extend(self.rays(from, &DIAGONAL));
                squares
            }
        }
    }

    fn rays(&self, from: Square, directions: &[(i8, i8)]) -> Vec<Square> {
        let mut squares = Vec::new();
        for &(df, dr) in directions {
            let mut current = from;
            while let Some(next) = current.offset(df, dr) {
                squares.push(next);
                if self.piece_at(next).is_some() {
                    break;
                }
                current = next;
            }
        }
        squares
    }

    /// Every square attacked by at least one piece of `color`.
    pub fn aura(&self, color: Color) -> BTreeSet<Square> {
        self.pieces()
            .filter(|(_, _, c)| *c == color)
            .flat_map(|(sq, _, _)| self.attacks_from(sq))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn startpos_aura() {
        let pos = Position::startpos();
        let white = pos.aura(Color::White);
        // Pawns cover the whole third rank.
        for file in "abcdefgh".chars() {
            assert!(white.contains(&sq(&format!("{file}3"))));
        }
        assert!(!white.contains(&sq("e4")));
        assert!(!white.contains(&sq("a1")));
        let mirrored: BTreeSet<Square> = pos
            .mirror()
            .aura(Color::White)
            .into_iter()
            .map(Square::flip_rank)
            .collect();
        assert_eq!(pos.aura(Color::Black), mirrored);
    }

    #[test]
    fn sliders_stop_on_blockers() {
        let pos = Position::parse("4k3/8/8/8/3p4/8/8/3RK3 w - - 0 1");
        let rook = pos.attacks_from(Square::D1);
        assert!(rook.contains(&sq("d4")));
        assert!(!rook.contains(&sq("d5")));
        assert!(rook.contains(&Square::C1));
        assert!(rook.contains(&Square::E1));
        assert!(!rook.contains(&Square::F1));
    }

    #[test]
    fn pawn_attacks_diagonally_forward() {
        let pos = Position::parse("4k3/8/8/3p4/8/8/4P3/4K3 w - - 0 1");
        let mut white = pos.attacks_from(sq("e2"));
        white.sort();
        assert_eq!(white, vec![sq("d3"), sq("f3")]);
        let mut black = pos.attacks_from(sq("d5"));
        black.sort();
        assert_eq!(black, vec![sq("c4"), sq("e4")]);
    }

    #[test]
    fn empty_square_attacks_nothing() {
        assert!(Position::startpos().attacks_from(sq("e4")).is_empty());
    }
}
