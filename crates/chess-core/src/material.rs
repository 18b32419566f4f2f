//! Material counting, dead-position detection and game phase.

use crate::{Color, Piece, Position, Square};

/// Coarse stage of the game, derived from the pieces left on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

impl GamePhase {
    /// Phase weight above which the game is still in the opening.
    pub const OPENING_THRESHOLD: u32 = 20;
    /// Phase weight above which the game is in the middlegame.
    pub const MIDDLEGAME_THRESHOLD: u32 = 10;

    /// Classifies a summed phase weight.
    pub const fn from_weight(weight: u32) -> Self {
        if weight > Self::OPENING_THRESHOLD {
            GamePhase::Opening
        } else if weight > Self::MIDDLEGAME_THRESHOLD {
            GamePhase::Middlegame
        } else {
            GamePhase::Endgame
        }
    }
}

impl Position {
    /// Material of one side in pawns.
    pub fn material(&self, color: Color) -> u32 {
        self.pieces()
            .filter(|(_, _, c)| *c == color)
            .map(|(_, piece, _)| piece.value())
            .sum()
    }

    /// Material of both sides in pawns.
    pub fn total_material(&self) -> u32 {
        self.material(Color::White) + self.material(Color::Black)
    }

    /// Number of pieces of one side, kings excluded.
    pub fn piece_count(&self, color: Color) -> u32 {
        self.pieces()
            .filter(|(_, piece, c)| *c == color && *piece != Piece::King)
            .count() as u32
    }

    /// Number of pieces of the given kind and color.
    pub fn count(&self, piece: Piece, color: Color) -> u32 {
        self.pieces()
            .filter(|(_, p, c)| *p == piece && *c == color)
            .count() as u32
    }

    /// Square of the king of `color`, if it is on the board.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, piece, c)| *piece == Piece::King && *c == color)
            .map(|(sq, _, _)| sq)
    }

    /// King distance between two squares.
    #[inline]
    pub fn square_distance(&self, a: Square, b: Square) -> u8 {
        a.distance(b)
    }

    /// True when neither side can ever deliver mate.
    ///
    /// Covers king against king, a single minor piece on the board, and
    /// one bishop each on squares of the same color. Any pawn, rook or
    /// queen means there is still mating material.
    pub fn insufficient_material(&self) -> bool {
        let mut minors: Vec<(Piece, Color, Square)> = Vec::new();
        for (sq, piece, color) in self.pieces() {
            match piece {
                Piece::King => {}
                Piece::Pawn | Piece::Rook | Piece::Queen => return false,
                Piece::Knight | Piece::Bishop => minors.push((piece, color, sq)),
            }
        }

        match minors.as_slice() {
            [] | [_] => true,
            [(Piece::Bishop, c1, s1), (Piece::Bishop, c2, s2)] => {
                c1 != c2 && s1.is_light() == s2.is_light()
            }
            _ => false,
        }
    }

    /// Opening, middlegame or endgame from the remaining pieces.
    pub fn game_phase(&self) -> GamePhase {
        let weight = self
            .pieces()
            .map(|(_, piece, _)| piece.phase_weight())
            .sum();
        GamePhase::from_weight(weight)
    }
}
