//! Numbered PGN move text.

use chess_core::{Color, MoveRequest, Position};
use tracing::debug;

use crate::StandardRules;

/// Renders UCI moves played from `start` as PGN move text, e.g.
/// `1. e4 e5 2. Nf3`.
///
/// A game starting with Black to move opens with `n... `. Rendering stops
/// at the first move that cannot be read or is not legal.
pub fn pgn_movetext<S: AsRef<str>>(start: &Position, moves: &[S]) -> String {
    let mut text = String::new();
    let mut position = start.clone();

    for (i, uci) in moves.iter().enumerate() {
        let uci = uci.as_ref();
        let Some(request) = MoveRequest::from_uci(uci) else {
            debug!(uci, "unreadable move, stopping move text");
            break;
        };
        let applied = match position.apply_move(&request, &StandardRules) {
            Ok(applied) => applied,
            Err(err) => {
                debug!(%err, "stopping move text");
                break;
            }
        };

        let number = position.fullmove_number();
        match position.side_to_move() {
            Color::White => {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&format!("{}. {}", number, applied.san));
            }
            Color::Black if i == 0 => text.push_str(&format!("{}... {}", number, applied.san)),
            Color::Black => text.push_str(&format!(" {}", applied.san)),
        }
        position = applied.position;
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_move_text() {
        let text = pgn_movetext(&Position::startpos(), &["e2e4", "e7e5", "g1f3"]);
        assert_eq!(text, "1. e4 e5 2. Nf3");
    }

    #[test]
    fn black_to_move_first() {
        let start = Position::parse("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
        let text = pgn_movetext(&start, &["c7c5", "g1f3"]);
        assert_eq!(text, "1... c5 2. Nf3");
    }

    #[test]
    fn stops_at_illegal_move() {
        let moves = vec!["e2e4".to_string(), "e2e4".to_string(), "d2d4".to_string()];
        assert_eq!(pgn_movetext(&Position::startpos(), &moves), "1. e4");
        assert_eq!(pgn_movetext::<&str>(&Position::startpos(), &[]), "");
    }
}
