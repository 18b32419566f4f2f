//! FEN (Forsyth-Edwards Notation) field handling.
//!
//! Reading is deliberately forgiving: missing trailing fields are padded
//! from `w - - 0 1` and unreadable clocks fall back to their defaults.
//! Only the piece placement can be rejected, and [`Position::parse`]
//! turns that rejection into the initial position.
//!
//! [`Position::parse`]: crate::Position::parse

use thiserror::Error;

use crate::{Color, Piece, Square};

/// Reasons a piece placement is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("empty FEN")]
    Empty,

    #[error("invalid piece placement: expected 7 separators, got {0}")]
    SeparatorCount(usize),

    #[error("invalid character '{0}' in rank {1}")]
    InvalidCharacter(char, usize),

    #[error("rank {0} describes more than 8 squares")]
    RankOverflow(usize),

    #[error("more than one {0} king")]
    TooManyKings(Color),
}

/// Board contents indexed by square.
pub(crate) type Board = [Option<(Piece, Color)>; 64];

/// The six raw FEN fields after padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenFields {
    /// Piece placement string (e.g., "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR")
    pub piece_placement: String,
    /// Active color field, kept verbatim
    pub active_color: String,
    /// Castling availability (e.g., "KQkq", "-")
    pub castling: String,
    /// En passant target square (e.g., "e3", "-")
    pub en_passant: String,
    /// Halfmove clock (for 50-move rule)
    pub halfmove_clock: u32,
    /// Fullmove number
    pub fullmove_number: u32,
}

impl FenFields {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Defaults for the five fields after the piece placement.
    const DEFAULT_TAIL: [&'static str; 5] = ["w", "-", "-", "0", "1"];

    /// Splits a FEN string into its six fields.
    ///
    /// Fields missing at the end are taken from `w - - 0 1`, starting at
    /// the first missing one. Extra fields are ignored.
    pub fn split(fen: &str) -> Result<Self, FenError> {
        let mut parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.is_empty() {
            return Err(FenError::Empty);
        }
        let present = parts.len() - 1;
        parts.extend(Self::DEFAULT_TAIL.iter().skip(present));

        Ok(FenFields {
            piece_placement: parts[0].to_string(),
            active_color: parts[1].to_string(),
            castling: parts[2].to_string(),
            en_passant: parts[3].to_string(),
            halfmove_clock: parts[4].parse().unwrap_or(0),
            fullmove_number: parts[5].parse().ok().filter(|n| *n > 0).unwrap_or(1),
        })
    }

    /// Decodes the piece placement field into a board.
    pub(crate) fn board(&self) -> Result<Board, FenError> {
        let placement = &self.piece_placement;
        let separators = placement.matches('/').count();
        if separators != 7 {
            return Err(FenError::SeparatorCount(separators));
        }

        let mut board: Board = [None; 64];
        let mut kings = [0u8; 2];
        for (i, rank_str) in placement.split('/').enumerate() {
            let rank_number = 8 - i;
            let rank = 7 - i;
            let mut file = 0usize;

            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    file += digit as usize;
                } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                    if file >= 8 {
                        return Err(FenError::RankOverflow(rank_number));
                    }
                    if piece == Piece::King {
                        kings[color.index()] += 1;
                        if kings[color.index()] > 1 {
                            return Err(FenError::TooManyKings(color));
                        }
                    }
                    board[rank * 8 + file] = Some((piece, color));
                    file += 1;
                } else {
                    return Err(FenError::InvalidCharacter(c, rank_number));
                }
            }
            if file > 8 {
                return Err(FenError::RankOverflow(rank_number));
            }
        }

        Ok(board)
    }

    /// Reads the side to move; anything but `b` means White.
    pub(crate) fn side_to_move(&self) -> Color {
        if self.active_color == "b" {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Reads the en passant square; anything unreadable means none.
    pub(crate) fn en_passant_square(&self) -> Option<Square> {
        Square::from_algebraic(&self.en_passant)
    }

    /// Joins the six fields back into a FEN string.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.piece_placement,
            self.active_color,
            self.castling,
            self.en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_startpos() {
        let fen = FenFields::split(FenFields::STARTPOS).unwrap();
        assert_eq!(fen.active_color, "w");
        assert_eq!(fen.castling, "KQkq");
        assert_eq!(fen.en_passant, "-");
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(fen.to_fen(), FenFields::STARTPOS);
    }

    #[test]
    fn pads_missing_fields_from_defaults() {
        let fen = FenFields::split("8/8/8/8/8/8/8/8").unwrap();
        assert_eq!(fen.to_fen(), "8/8/8/8/8/8/8/8 w - - 0 1");

        let fen = FenFields::split("8/8/8/8/8/8/8/8 b KQ").unwrap();
        assert_eq!(fen.to_fen(), "8/8/8/8/8/8/8/8 b KQ - 0 1");

        let fen = FenFields::split("8/8/8/8/8/8/8/8 b - e3 7").unwrap();
        assert_eq!(fen.halfmove_clock, 7);
        assert_eq!(fen.fullmove_number, 1);
    }

    #[test]
    fn unreadable_clocks_use_defaults() {
        let fen = FenFields::split("8/8/8/8/8/8/8/8 w - - abc 0").unwrap();
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
    }

    #[test]
    fn empty_input() {
        assert_eq!(FenFields::split("   "), Err(FenError::Empty));
    }

    #[test]
    fn board_rejects_wrong_separator_count() {
        let fen = FenFields::split("8/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(fen.board(), Err(FenError::SeparatorCount(6)));
    }

    #[test]
    fn board_rejects_invalid_character() {
        let fen =
            FenFields::split("rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert_eq!(fen.board(), Err(FenError::InvalidCharacter('X', 2)));
    }

    #[test]
    fn board_rejects_overflowing_rank() {
        let fen = FenFields::split("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").unwrap();
        assert_eq!(fen.board(), Err(FenError::RankOverflow(8)));

        let fen = FenFields::split("8/8/8/8/8/8/8/44p").unwrap();
        assert_eq!(fen.board(), Err(FenError::RankOverflow(1)));
    }

    #[test]
    fn board_rejects_second_king() {
        let fen = FenFields::split("k6k/8/8/8/8/8/8/K7").unwrap();
        assert_eq!(fen.board(), Err(FenError::TooManyKings(Color::Black)));
    }

    #[test]
    fn short_rank_is_padded_with_empty_squares() {
        let fen = FenFields::split("k/8/8/8/8/8/8/K").unwrap();
        let board = fen.board().unwrap();
        assert_eq!(board[56], Some((Piece::King, Color::Black)));
        assert_eq!(board[0], Some((Piece::King, Color::White)));
        assert_eq!(board.iter().flatten().count(), 2);
    }

    #[test]
    fn side_and_en_passant_readers() {
        let fen = FenFields::split("8/8/8/8/8/8/8/8 b - d6").unwrap();
        assert_eq!(fen.side_to_move(), Color::Black);
        assert_eq!(fen.en_passant_square(), Square::from_algebraic("d6"));

        let fen = FenFields::split("8/8/8/8/8/8/8/8 x - none").unwrap();
        assert_eq!(fen.side_to_move(), Color::White);
        assert_eq!(fen.en_passant_square(), None);
    }

    #[test]
    fn fen_error_display() {
        assert!(format!("{}", FenError::SeparatorCount(3)).contains('3'));
        assert!(format!("{}", FenError::InvalidCharacter('x', 4)).contains('x'));
        assert!(format!("{}", FenError::TooManyKings(Color::White)).contains("White"));
    }
}
