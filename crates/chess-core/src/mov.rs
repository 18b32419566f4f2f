//! Move requests and the visible side effects of applying them.

use std::fmt;

use crate::{Color, Piece, Square};

/// A move as asked for by a caller: from, to and an optional promotion.
///
/// Nothing about legality is known yet; a [`MoveGenerator`] decides that.
///
/// [`MoveGenerator`]: crate::MoveGenerator
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl MoveRequest {
    /// Creates a move request.
    #[inline]
    pub const fn new(from: Square, to: Square, promotion: Option<Piece>) -> Self {
        MoveRequest {
            from,
            to,
            promotion,
        }
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.promotion {
            Some(piece) => format!(
                "{}{}{}",
                self.from,
                self.to,
                piece.to_fen_char(Color::Black)
            ),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Parses a move from UCI notation.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            Some(c) => Some(Piece::from_promotion_char(c)?),
            None => None,
        };
        Some(MoveRequest::new(from, to, promotion))
    }
}

impl fmt::Debug for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MoveRequest({})", self.to_uci())
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// A secondary board change implied by a move.
///
/// The resulting position already contains these changes; they are listed
/// separately so a board view can animate them without diffing positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// The pawn arriving on `square` becomes `piece` of `color`.
    Promote {
        square: Square,
        piece: Piece,
        color: Color,
    },
    /// The castling rook travels from `from` to `to`.
    CastleRookMove { from: Square, to: Square },
    /// The pawn taken en passant disappears from `square`.
    EnPassantCapture { square: Square },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_uci() {
        let m = MoveRequest::from_uci("e2e4").unwrap();
        assert_eq!(m.from.to_algebraic(), "e2");
        assert_eq!(m.to.to_algebraic(), "e4");
        assert_eq!(m.promotion, None);
        assert_eq!(m.to_uci(), "e2e4");
    }

    #[test]
    fn move_uci_promotions() {
        let m = MoveRequest::from_uci("e7e8Q").unwrap();
        assert_eq!(m.promotion, Some(Piece::Queen));
        assert_eq!(m.to_uci(), "e7e8q");
        assert_eq!(
            MoveRequest::from_uci("a2a1n").unwrap().promotion,
            Some(Piece::Knight)
        );
        assert!(MoveRequest::from_uci("e7e8x").is_none());
        assert!(MoveRequest::from_uci("e7e8k").is_none());
    }

    #[test]
    fn move_from_uci_edge_cases() {
        assert!(MoveRequest::from_uci("e2").is_none());
        assert!(MoveRequest::from_uci("e2e").is_none());
        assert!(MoveRequest::from_uci("e2e4qq").is_none());
        assert!(MoveRequest::from_uci("e2e9").is_none());
        assert!(MoveRequest::from_uci("é2e4").is_none());
    }

    #[test]
    fn move_debug_display() {
        let m = MoveRequest::new(Square::E1, Square::G1, None);
        assert_eq!(format!("{:?}", m), "MoveRequest(e1g1)");
        assert_eq!(format!("{}", m), "e1g1");
    }
}
