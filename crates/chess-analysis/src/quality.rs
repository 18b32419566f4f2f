//! Move quality classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, EngineResponse, Evaluation, MultiEngineResponse};

/// Classification of a played move against the engine's candidates.
///
/// There is no ordering between labels: a [`Severity::Neutral`] move can
/// lose more centipawns than a [`Severity::Good`] one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The engine's best move, found without deep search
    Best,
    /// Unique best move the engine only settled on at high depth
    VeryGood,
    /// Unique best move found at medium depth
    Good,
    /// Unique best move found at shallow but non-trivial depth
    Interesting,
    /// Within tolerance but not the best score
    Neutral,
    /// Noticeable loss
    Inaccuracy,
    /// Significant loss
    Mistake,
    /// Major loss
    Blunder,
}

impl Severity {
    /// Conventional annotation glyph, if the label has one.
    pub const fn glyph(self) -> &'static str {
        match self {
            Severity::VeryGood => "!!",
            Severity::Good => "!",
            Severity::Interesting => "!?",
            Severity::Inaccuracy => "?!",
            Severity::Mistake => "?",
            Severity::Blunder => "??",
            Severity::Best | Severity::Neutral => "",
        }
    }

    /// Returns true for inaccuracies, mistakes and blunders.
    pub const fn is_error(self) -> bool {
        matches!(self, Severity::Inaccuracy | Severity::Mistake | Severity::Blunder)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Best => "best",
            Severity::VeryGood => "very good",
            Severity::Good => "good",
            Severity::Interesting => "interesting",
            Severity::Neutral => "neutral",
            Severity::Inaccuracy => "inaccuracy",
            Severity::Mistake => "mistake",
            Severity::Blunder => "blunder",
        };
        f.write_str(name)
    }
}

/// Cutoffs used to classify moves.
///
/// Centipawn cutoffs apply to centipawn loss. Mate cutoffs apply to the
/// change in mate distance, in moves, whenever a mate score is involved.
/// Depth cutoffs pick the label of a unique best move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub inaccuracy_cp: i32,
    pub mistake_cp: i32,
    pub blunder_cp: i32,
    pub inaccuracy_mate: i32,
    pub mistake_mate: i32,
    pub blunder_mate: i32,
    pub speculative_depth: u32,
    pub good_depth: u32,
    pub very_good_depth: u32,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            inaccuracy_cp: 50,
            mistake_cp: 100,
            blunder_cp: 200,
            inaccuracy_mate: 2,
            mistake_mate: 5,
            blunder_mate: 10,
            speculative_depth: 3,
            good_depth: 5,
            very_good_depth: 8,
        }
    }
}

impl SeverityThresholds {
    /// Thresholds with the given centipawn cutoffs and default mate and
    /// depth cutoffs.
    pub fn with_centipawns(inaccuracy_cp: i32, mistake_cp: i32, blunder_cp: i32) -> Self {
        Self {
            inaccuracy_cp,
            mistake_cp,
            blunder_cp,
            ..Self::default()
        }
    }

    /// Checks that every group of cutoffs is positive and strictly ascending.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ascending = |a: i64, b: i64, c: i64| 0 < a && a < b && b < c;
        let checks = [
            (
                "centipawn",
                ascending(
                    self.inaccuracy_cp.into(),
                    self.mistake_cp.into(),
                    self.blunder_cp.into(),
                ),
            ),
            (
                "mate",
                ascending(
                    self.inaccuracy_mate.into(),
                    self.mistake_mate.into(),
                    self.blunder_mate.into(),
                ),
            ),
            (
                "depth",
                ascending(
                    self.speculative_depth.into(),
                    self.good_depth.into(),
                    self.very_good_depth.into(),
                ),
            ),
        ];
        match checks.iter().find(|(_, ok)| !ok) {
            Some((group, _)) => Err(ConfigError::InvalidThresholds(format!(
                "{} cutoffs must be positive and strictly ascending",
                group
            ))),
            None => Ok(()),
        }
    }

    fn by_cp_loss(&self, loss: i64) -> Option<Severity> {
        if loss >= i64::from(self.blunder_cp) {
            Some(Severity::Blunder)
        } else if loss >= i64::from(self.mistake_cp) {
            Some(Severity::Mistake)
        } else if loss >= i64::from(self.inaccuracy_cp) {
            Some(Severity::Inaccuracy)
        } else {
            None
        }
    }

    fn by_mate_delta(&self, delta: i64) -> Option<Severity> {
        if delta >= i64::from(self.blunder_mate) {
            Some(Severity::Blunder)
        } else if delta >= i64::from(self.mistake_mate) {
            Some(Severity::Mistake)
        } else if delta >= i64::from(self.inaccuracy_mate) {
            Some(Severity::Inaccuracy)
        } else {
            None
        }
    }

    /// The error label for playing `played` instead of `best`, or `None`
    /// when the move is within tolerance.
    ///
    /// Mate scores are never put on the centipawn scale here.
    pub fn error(&self, best: Evaluation, played: Evaluation) -> Option<Severity> {
        match (best, played) {
            (Evaluation::Centipawns(b), Evaluation::Centipawns(p)) => {
                self.by_cp_loss(i64::from(b) - i64::from(p))
            }
            // Slower mate: each extra move counts.
            (Evaluation::Mate(b), Evaluation::Mate(p)) if b > 0 && p > 0 => {
                self.by_mate_delta(i64::from(p) - i64::from(b))
            }
            // Faster defeat.
            (Evaluation::Mate(b), Evaluation::Mate(p)) if b <= 0 && p <= 0 => {
                self.by_mate_delta(i64::from(b.unsigned_abs()) - i64::from(p.unsigned_abs()))
            }
            // From mating to being mated.
            (Evaluation::Mate(b), Evaluation::Mate(_)) if b > 0 => Some(Severity::Blunder),
            (Evaluation::Mate(b), Evaluation::Centipawns(p)) if b > 0 => {
                if p >= self.blunder_cp {
                    Some(Severity::Mistake)
                } else {
                    Some(Severity::Blunder)
                }
            }
            (Evaluation::Centipawns(_), Evaluation::Mate(p)) if p <= 0 => Some(Severity::Blunder),
            // The played move does at least as well as the "best" one.
            _ => None,
        }
    }

    /// Label for a move within tolerance.
    ///
    /// A unique best score is graded by the depth the engine settled on it; a best
    /// score shared with other candidates is [`Severity::Best`]; anything
    /// else is [`Severity::Neutral`].
    pub fn within_tolerance(&self, rank: usize, unique: bool, depth: u32) -> Severity {
        match (rank, unique) {
            (1, true) if depth >= self.very_good_depth => Severity::VeryGood,
            (1, true) if depth >= self.good_depth => Severity::Good,
            (1, true) if depth >= self.speculative_depth => Severity::Interesting,
            (1, _) => Severity::Best,
            _ => Severity::Neutral,
        }
    }
}

/// Classifies `played` among the candidates of `response`.
///
/// Returns `None` when the response is empty or does not contain the
/// played move; the move then counts as not analysed.
pub fn classify(
    response: &MultiEngineResponse,
    played: &EngineResponse,
    thresholds: &SeverityThresholds,
) -> Option<Severity> {
    let best = response.best()?;
    if let Some(error) = thresholds.error(best.eval, played.eval) {
        return Some(error);
    }
    let rank = response.score_rank(played.eval);
    let unique = response.count_with_score(played.eval) == 1;
    // The search depth says nothing about when the move was found.
    let found = response.best_found_depth.unwrap_or(0);
    Some(thresholds.within_tolerance(rank, unique, found))
}
