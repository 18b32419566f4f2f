//! Variables available to formulas.

use std::collections::HashMap;

use chess_core::{Color, Position};

use crate::{gmo, MultiEngineResponse};

/// Total material of the initial position, in pawns.
const INITIAL_MATERIAL: f64 = 78.0;

/// Values are rounded to this many decimals before use.
const DECIMALS: i32 = 10;

fn rounded(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS);
    (value * scale).round() / scale
}

/// The named values a formula can read for one position.
///
/// | name    | value |
/// |---------|-------|
/// | `xpiec` | pieces of the side to move, king excluded |
/// | `xpie`  | pieces of both sides, kings excluded |
/// | `xmov`  | material on the board relative to the initial 78 |
/// | `xeval` | best score in centipawns, White's point of view |
/// | `xstm`  | `1` with White to move, `-1` with Black |
/// | `xplm`  | half-moves played |
/// | `xshow` | `0.01`, centipawns to pawns |
/// | `xgmo`  | [`gmo`](crate::gmo) of the response |
/// | `xmat`  | material of both sides |
/// | `xpow`  | material of the side to move |
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaContext {
    vars: HashMap<String, f64>,
    empty: bool,
}

impl FormulaContext {
    /// Derives every variable from the position before the move and the
    /// engine's candidates for it.
    pub fn build(position: &Position, response: &MultiEngineResponse) -> Self {
        let mover = position.side_to_move();
        let stm = match mover {
            Color::White => 1.0,
            Color::Black => -1.0,
        };
        let best_cp = response
            .best()
            .map_or(0, |best| best.eval.centipawns_abs()) as f64;
        let total_material = position.total_material() as f64;

        let vars = [
            ("xpiec", position.piece_count(mover) as f64),
            (
                "xpie",
                (position.piece_count(Color::White) + position.piece_count(Color::Black)) as f64,
            ),
            ("xmov", total_material / INITIAL_MATERIAL),
            ("xeval", best_cp * stm),
            ("xstm", stm),
            ("xplm", position.ply() as f64),
            ("xshow", 0.01),
            ("xgmo", gmo(response)),
            ("xmat", total_material),
            ("xpow", position.material(mover) as f64),
        ];

        FormulaContext {
            vars: vars
                .into_iter()
                .map(|(name, value)| (name.to_string(), rounded(value)))
                .collect(),
            empty: response.is_empty(),
        }
    }

    /// True when the engine offered no candidates; every index is then `0.0`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Value of one variable.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.vars.get(name).copied()
    }

    /// All variables, as handed to [`Formula::eval`](super::Formula::eval).
    pub fn variables(&self) -> &HashMap<String, f64> {
        &self.vars
    }
}
