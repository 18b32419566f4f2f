//! Applying validated moves to a [`Position`].
//!
//! Legality is not decided here. A [`MoveGenerator`] confirms the move and
//! reports what kind of move it is; this module then updates the board,
//! clocks and rights, and lists the side effects a board view has to show.

use thiserror::Error;
use tracing::trace;

use crate::{CastleSide, Color, MoveRequest, Piece, Position, Rank, SideEffect, Square};

/// Errors returned by [`Position::apply_move`]. The position is untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("illegal move: {0}")]
    Illegal(String),

    #[error("no piece on {0}")]
    EmptySquare(Square),
}

/// What the move generator knows about a legal move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedMove {
    /// Piece the pawn turns into, if the move promotes.
    pub promotion: Option<Piece>,
    pub is_kingside_castle: bool,
    pub is_queenside_castle: bool,
    pub is_en_passant: bool,
    /// Standard algebraic notation of the move in the pre-move position.
    pub san: String,
}

/// An external legality checker.
///
/// Implementations own the full chess rules (checks, pins, castling
/// through attacked squares). The position model only asks whether a
/// request is legal and how it should be interpreted.
pub trait MoveGenerator {
    /// Returns the interpretation of `request` in `position`, or `None`
    /// if the move is not legal there.
    fn validate(&self, position: &Position, request: &MoveRequest) -> Option<ValidatedMove>;
}

/// Result of a successful [`Position::apply_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub position: Position,
    /// At most one entry: promotion, castling rook or en passant victim.
    pub side_effects: Vec<SideEffect>,
    pub san: String,
}

/// Square of the pawn captured en passant on `target`.
fn en_passant_victim(target: Square) -> Square {
    let rank = match target.rank() {
        Rank::R6 => Rank::R5,
        Rank::R5 => Rank::R6,
        Rank::R3 => Rank::R4,
        Rank::R4 => Rank::R3,
        other => other,
    };
    Square::new(target.file(), rank)
}

impl Position {
    /// Plays `request` and returns the new position with its side effects.
    ///
    /// Side effects are worked out on the pre-move board, checked in the
    /// order promotion, kingside castle, queenside castle, en passant.
    pub fn apply_move(
        &self,
        request: &MoveRequest,
        rules: &impl MoveGenerator,
    ) -> Result<AppliedMove, MoveError> {
        let (piece, color) = self
            .piece_at(request.from)
            .ok_or(MoveError::EmptySquare(request.from))?;
        let validated = rules
            .validate(self, request)
            .ok_or_else(|| MoveError::Illegal(request.to_uci()))?;

        let castle_side = if validated.is_kingside_castle {
            Some(CastleSide::King)
        } else if validated.is_queenside_castle {
            Some(CastleSide::Queen)
        } else {
            None
        };

        let mut side_effects = Vec::with_capacity(1);
        let mut dest = request.to;
        if let Some(promoted) = validated.promotion {
            side_effects.push(SideEffect::Promote {
                square: request.to,
                piece: promoted,
                color,
            });
        } else if let Some(side) = castle_side {
            let (from, to) = side.rook_move(color);
            side_effects.push(SideEffect::CastleRookMove { from, to });
            dest = Square::new(side.king_target_file(), color.back_rank());
        } else if validated.is_en_passant {
            side_effects.push(SideEffect::EnPassantCapture {
                square: en_passant_victim(request.to),
            });
        }

        let mut next = self.clone();
        let capture = castle_side.is_none() && self.piece_at(request.to).is_some();
        next.squares[request.from.index() as usize] = None;

        for effect in &side_effects {
            match *effect {
                SideEffect::CastleRookMove { from, to } => {
                    next.squares[from.index() as usize] = None;
                    next.squares[to.index() as usize] = Some((Piece::Rook, color));
                }
                SideEffect::EnPassantCapture { square } => {
                    next.squares[square.index() as usize] = None;
                }
                SideEffect::Promote { .. } => {}
            }
        }
        let landed = validated.promotion.unwrap_or(piece);
        next.squares[dest.index() as usize] = Some((landed, color));

        if piece == Piece::King {
            next.castling.remove_color(color);
        }
        next.castling.remove_for_corner(request.from);
        next.castling.remove_for_corner(request.to);

        next.en_passant = None;
        if piece == Piece::Pawn {
            let (from_rank, to_rank) = (request.from.rank().index(), request.to.rank().index());
            if from_rank.abs_diff(to_rank) == 2 {
                next.en_passant = Rank::from_index((from_rank + to_rank) / 2)
                    .map(|rank| Square::new(request.from.file(), rank));
            }
        }

        if piece == Piece::Pawn || capture || validated.is_en_passant {
            next.halfmove_clock = 0;
        } else {
            next.halfmove_clock = next.halfmove_clock.saturating_add(1);
        }
        if color == Color::Black {
            next.fullmove_number = next.fullmove_number.saturating_add(1);
        }
        next.side_to_move = color.opposite();

        trace!(mv = %request, san = %validated.san, "applied move");
        Ok(AppliedMove {
            position: next,
            side_effects,
            san: validated.san,
        })
    }
}
