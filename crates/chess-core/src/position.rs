//! Chess position representation.
//!
//! A [`Position`] is a value: applying a move produces a new one. Castling
//! rights and the en passant square are stored as read from FEN or as left
//! by the last move, but every reader re-derives them from the board, so a
//! stale right never reaches the caller or the emitted FEN.

use tracing::debug;

use crate::fen::Board;
use crate::{Color, FenError, FenFields, File, Piece, Rank, Square};

/// The two castling directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    /// File the rook starts on.
    #[inline]
    pub const fn rook_file(self) -> File {
        match self {
            CastleSide::King => File::H,
            CastleSide::Queen => File::A,
        }
    }

    /// File the king lands on.
    #[inline]
    pub const fn king_target_file(self) -> File {
        match self {
            CastleSide::King => File::G,
            CastleSide::Queen => File::C,
        }
    }

    /// The rook's journey when `color` castles on this side.
    pub const fn rook_move(self, color: Color) -> (Square, Square) {
        match (color, self) {
            (Color::White, CastleSide::King) => (Square::H1, Square::F1),
            (Color::White, CastleSide::Queen) => (Square::A1, Square::D1),
            (Color::Black, CastleSide::King) => (Square::H8, Square::F8),
            (Color::Black, CastleSide::Queen) => (Square::A8, Square::D8),
        }
    }
}

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::King) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queen) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::King) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queen) => Self::BLACK_QUEENSIDE,
        }
    }

    /// Reads a FEN castling field, ignoring anything but `KQkq`.
    pub fn from_fen_field(field: &str) -> Self {
        let mut rights = Self::NONE;
        for c in field.chars() {
            match c {
                'K' => rights.0 |= Self::WHITE_KINGSIDE,
                'Q' => rights.0 |= Self::WHITE_QUEENSIDE,
                'k' => rights.0 |= Self::BLACK_KINGSIDE,
                'q' => rights.0 |= Self::BLACK_QUEENSIDE,
                _ => {}
            }
        }
        rights
    }

    /// Writes the FEN castling field (`-` when empty).
    pub fn to_fen_field(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ]
        .iter()
        .filter(|(flag, _)| self.0 & flag != 0)
        .map(|(_, c)| *c)
        .collect()
    }

    /// Returns true if `color` may still castle on `side`.
    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::flag(color, side) != 0
    }

    /// Removes one right.
    #[inline]
    pub fn remove(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::flag(color, side);
    }

    /// Removes castling rights for a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.remove(color, CastleSide::King);
        self.remove(color, CastleSide::Queen);
    }

    /// Removes the right tied to a rook corner, if `sq` is one.
    pub fn remove_for_corner(&mut self, sq: Square) {
        for color in Color::ALL {
            for side in [CastleSide::King, CastleSide::Queen] {
                if sq == Square::new(side.rook_file(), color.back_rank()) {
                    self.remove(color, side);
                }
            }
        }
    }

    /// Swaps White's rights with Black's.
    #[inline]
    pub const fn mirror(self) -> Self {
        CastlingRights(((self.0 & 0b0011) << 2) | ((self.0 & 0b1100) >> 2))
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Complete chess position state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(crate) squares: Board,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) side_to_move: Color,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];

        let mut squares: Board = [None; 64];
        for (file, piece) in BACK_RANK.into_iter().enumerate() {
            squares[file] = Some((piece, Color::White));
            squares[8 + file] = Some((Piece::Pawn, Color::White));
            squares[48 + file] = Some((Piece::Pawn, Color::Black));
            squares[56 + file] = Some((piece, Color::Black));
        }

        Position {
            squares,
            castling: CastlingRights::ALL,
            en_passant: None,
            side_to_move: Color::White,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parses a FEN string, falling back to the initial position when the
    /// piece placement cannot be read. Never fails.
    pub fn parse(fen: &str) -> Self {
        Self::try_parse(fen).unwrap_or_else(|err| {
            debug!(%err, fen, "unreadable FEN, using the initial position");
            Self::startpos()
        })
    }

    /// Parses a FEN string, reporting why the piece placement was refused.
    ///
    /// Every other field is read leniently (see [`FenFields::split`]).
    pub fn try_parse(fen: &str) -> Result<Self, FenError> {
        let fields = FenFields::split(fen)?;
        Ok(Position {
            squares: fields.board()?,
            castling: CastlingRights::from_fen_field(&fields.castling),
            en_passant: fields.en_passant_square(),
            side_to_move: fields.side_to_move(),
            halfmove_clock: fields.halfmove_clock,
            fullmove_number: fields.fullmove_number,
        })
    }

    /// Converts the position to a FEN string.
    ///
    /// Castling rights and the en passant square are re-derived first.
    pub fn to_fen(&self) -> String {
        FenFields {
            piece_placement: self.placement(),
            active_color: self.side_to_move.to_fen_char().to_string(),
            castling: self.castling_rights().to_fen_field(),
            en_passant: self
                .en_passant()
                .map_or_else(|| "-".to_string(), Square::to_algebraic),
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_fen()
    }

    fn placement(&self) -> String {
        let mut placement = String::new();
        for rank in Rank::ALL.into_iter().rev() {
            let mut empty_count = 0;
            for file in File::ALL {
                match self.piece_at(Square::new(file, rank)) {
                    Some((piece, color)) => {
                        if empty_count > 0 {
                            placement.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        placement.push(piece.to_fen_char(color));
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                placement.push_str(&empty_count.to_string());
            }
            if rank != Rank::R1 {
                placement.push('/');
            }
        }
        placement
    }

    /// Returns the piece and color at the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        self.squares[sq.index() as usize]
    }

    /// Iterates over every occupied square.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece, Color)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|(piece, color)| (sq, piece, color)))
    }

    /// The side to move.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Halfmove clock for the 50-move rule.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Fullmove number (starts at 1, increments after Black's move).
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Half-moves played since the first move of the game, saturating at
    /// `u32::MAX` for absurd move numbers.
    pub fn ply(&self) -> u32 {
        self.fullmove_number
            .saturating_sub(1)
            .saturating_mul(2)
            .saturating_add(self.side_to_move.index() as u32)
    }

    /// Castling rights still backed by a king and rook on their home squares.
    pub fn castling_rights(&self) -> CastlingRights {
        let mut rights = self.castling;
        for color in Color::ALL {
            let rank = color.back_rank();
            let king_home = self.piece_at(Square::new(File::E, rank)) == Some((Piece::King, color));
            for side in [CastleSide::King, CastleSide::Queen] {
                let rook_home = self.piece_at(Square::new(side.rook_file(), rank))
                    == Some((Piece::Rook, color));
                if !king_home || !rook_home {
                    rights.remove(color, side);
                }
            }
        }
        rights
    }

    /// The en passant target, kept only if a pawn stands ready to take it.
    pub fn en_passant(&self) -> Option<Square> {
        let target = self.en_passant?;
        let (capturer, rank) = match target.rank() {
            Rank::R6 => (Color::White, Rank::R5),
            Rank::R3 => (Color::Black, Rank::R4),
            _ => return None,
        };
        let pawn_square = Square::new(target.file(), rank);
        let ready = [-1, 1].into_iter().any(|df| {
            pawn_square
                .offset(df, 0)
                .is_some_and(|sq| self.piece_at(sq) == Some((Piece::Pawn, capturer)))
        });
        ready.then_some(target)
    }

    /// Returns the position with colors swapped and the board flipped
    /// top to bottom. Applying it twice gives back the original.
    pub fn mirror(&self) -> Position {
        let mut squares: Board = [None; 64];
        for (sq, piece, color) in self.pieces() {
            squares[sq.flip_rank().index() as usize] = Some((piece, color.opposite()));
        }
        Position {
            squares,
            castling: self.castling.mirror(),
            en_passant: self.en_passant.map(Square::flip_rank),
            side_to_move: self.side_to_move.opposite(),
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
