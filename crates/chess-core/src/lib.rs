//! Core types for chess.
//!
//! This crate provides the position model used by the review pipeline:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Position`] with a lenient FEN parser and a canonical FEN writer
//! - [`MoveRequest`] and [`SideEffect`] for move application
//! - [`MoveGenerator`], the seam to an external legality checker
//!
//! # Example
//!
//! ```
//! use chess_core::{GamePhase, Position};
//!
//! let position = Position::parse("garbage");
//! assert_eq!(position, Position::startpos());
//! assert_eq!(position.game_phase(), GamePhase::Opening);
//! ```

mod apply;
mod aura;
mod color;
mod fen;
mod material;
mod mov;
mod piece;
mod position;
mod square;

pub use apply::{AppliedMove, MoveError, MoveGenerator, ValidatedMove};
pub use color::Color;
pub use fen::{FenError, FenFields};
pub use material::GamePhase;
pub use mov::{MoveRequest, SideEffect};
pub use piece::Piece;
pub use position::{CastleSide, CastlingRights, Position};
pub use square::{File, Rank, Square};
