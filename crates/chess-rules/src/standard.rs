//! Standard chess rules (FIDE), delegated to `shakmaty`.

use chess_core::{MoveGenerator, MoveRequest, Piece, Position, ValidatedMove};
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Move, Position as _};
use tracing::debug;

/// Standard chess rules.
///
/// Positions that are not a legal setup (no king, side not to move in
/// check, pawns on the back rank) have no legal moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    fn board(position: &Position) -> Option<Chess> {
        let fen = position.to_fen();
        let parsed: Fen = fen.parse().ok()?;
        match parsed.into_position::<Chess>(CastlingMode::Standard) {
            Ok(board) => Some(board),
            Err(err) => {
                debug!(%err, fen = %fen, "position rejected by the rules");
                None
            }
        }
    }

    /// Every legal move in `position`, in UCI form.
    pub fn legal_moves(&self, position: &Position) -> Vec<MoveRequest> {
        let Some(board) = Self::board(position) else {
            return Vec::new();
        };
        board
            .legal_moves()
            .iter()
            .filter_map(|mv| MoveRequest::from_uci(&mv.to_uci(CastlingMode::Standard).to_string()))
            .collect()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self, position: &Position) -> bool {
        Self::board(position).is_some_and(|board| board.is_check())
    }

    /// Returns true if the side to move is checkmated.
    pub fn is_checkmate(&self, position: &Position) -> bool {
        Self::board(position).is_some_and(|board| board.is_checkmate())
    }
}

impl MoveGenerator for StandardRules {
    fn validate(&self, position: &Position, request: &MoveRequest) -> Option<ValidatedMove> {
        let mut board = Self::board(position)?;
        let uci: UciMove = request.to_uci().parse().ok()?;
        let mv = uci.to_move(&board).ok()?;

        let (is_kingside_castle, is_queenside_castle) = match mv {
            Move::Castle { king, rook } => {
                let kingside = rook.file() > king.file();
                (kingside, !kingside)
            }
            _ => (false, false),
        };
        let is_en_passant = matches!(mv, Move::EnPassant { .. });
        let promotion = mv
            .promotion()
            .and_then(|role| Piece::from_promotion_char(role.char()));

        let mut san = San::from_move(&board, mv).to_string();
        board.play_unchecked(mv);
        if board.is_checkmate() {
            san.push('#');
        } else if board.is_check() {
            san.push('+');
        }

        Some(ValidatedMove {
            promotion,
            is_kingside_castle,
            is_queenside_castle,
            is_en_passant,
            san,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_has_twenty_moves() {
        let moves = StandardRules.legal_moves(&Position::startpos());
        assert_eq!(moves.len(), 20);
        assert!(moves.contains(&MoveRequest::from_uci("g1f3").unwrap()));
    }

    #[test]
    fn validate_reports_san() {
        let request = MoveRequest::from_uci("g1f3").unwrap();
        let validated = StandardRules
            .validate(&Position::startpos(), &request)
            .unwrap();
        assert_eq!(validated.san, "Nf3");
        assert_eq!(validated.promotion, None);
        assert!(!validated.is_en_passant);
    }

    #[test]
    fn unplayable_setup_has_no_moves() {
        // Black king missing.
        let position = Position::parse("8/8/8/8/8/8/8/4K3 w - - 0 1");
        assert!(StandardRules.legal_moves(&position).is_empty());
        let request = MoveRequest::from_uci("e1e2").unwrap();
        assert_eq!(StandardRules.validate(&position, &request), None);
    }

    #[test]
    fn check_and_mate_detection() {
        let mated = Position::parse("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(StandardRules.is_check(&mated));
        assert!(StandardRules.is_checkmate(&mated));
        assert!(!StandardRules.is_check(&Position::startpos()));
    }

    #[test]
    fn mate_suffix() {
        let position = Position::parse("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2");
        let request = MoveRequest::from_uci("d8h4").unwrap();
        let validated = StandardRules.validate(&position, &request).unwrap();
        assert_eq!(validated.san, "Qh4#");
    }
}
