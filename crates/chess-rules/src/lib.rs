//! Standard chess rules for the [`chess_core`] position model.
//!
//! [`StandardRules`] is the [`MoveGenerator`](chess_core::MoveGenerator)
//! used by the review pipeline. Legality, castling and en passant
//! detection, and SAN text all come from the `shakmaty` crate; the
//! position model keeps its own board and only asks for a verdict.
//!
//! # Example
//!
//! ```
//! use chess_core::{MoveRequest, Position};
//! use chess_rules::StandardRules;
//!
//! let request = MoveRequest::from_uci("e2e4").unwrap();
//! let applied = Position::startpos().apply_move(&request, &StandardRules).unwrap();
//! assert_eq!(applied.san, "e4");
//! ```

mod pgn;
mod standard;

pub use pgn::pgn_movetext;
pub use standard::StandardRules;
