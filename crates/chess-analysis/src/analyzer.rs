//! Game analysis with move quality classification.
//!
//! This module provides the [`MoveClassifier`] for labelling played moves
//! against the engine's candidates and folding a whole game into
//! [`GameAnalysis`] statistics.

use chess_core::{Color, MoveError, MoveGenerator, MoveRequest, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::formula::{FormulaContext, FormulaSet};
use crate::quality::classify;
use crate::{
    gmo, AnalysisConfig, Evaluation, GameAnalysis, MultiEngineResponse, PositionalIndices,
    Severity, SeverityThresholds,
};

/// Analysis result for a single move.
///
/// Built once and never recomputed unless the move is re-analysed with
/// `delete_previous` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveAnalysisRecord {
    /// The move that was played (in UCI notation)
    pub played: String,
    /// The best move according to the engine
    pub best_move: Option<String>,
    /// `None` when the move could not be classified
    pub severity: Option<Severity>,
    /// Centipawns lost against the best move, never negative
    pub cp_loss: i32,
    /// Distinct-score rank of the played move (1 = best)
    pub rank: Option<usize>,
    pub best_eval: Option<Evaluation>,
    pub played_eval: Option<Evaluation>,
    pub gmo: f64,
    pub indices: PositionalIndices,
}

impl MoveAnalysisRecord {
    /// Returns true if the move received a severity label.
    #[inline]
    pub fn is_analysed(&self) -> bool {
        self.severity.is_some()
    }
}

/// One ply of a game with its engine candidates and cached analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPly {
    /// The move in UCI notation
    #[serde(rename = "move")]
    pub mv: String,
    /// Side that played the move; filled in by [`MoveClassifier::analyze_game`]
    #[serde(default = "default_color")]
    pub color: Color,
    /// Opening book moves are counted but not classified
    #[serde(default)]
    pub book: bool,
    #[serde(default)]
    pub response: MultiEngineResponse,
    #[serde(default)]
    pub analysis: Option<MoveAnalysisRecord>,
}

fn default_color() -> Color {
    Color::White
}

impl AnalyzedPly {
    pub fn new(mv: impl Into<String>, response: MultiEngineResponse) -> Self {
        Self {
            mv: mv.into(),
            color: Color::White,
            book: false,
            response,
            analysis: None,
        }
    }

    /// Marks the ply as an opening book move.
    pub fn book(mut self) -> Self {
        self.book = true;
        self
    }
}

/// Classifies moves and computes positional indices.
#[derive(Debug, Clone)]
pub struct MoveClassifier {
    thresholds: SeverityThresholds,
    domination_cp: i32,
    formulas: FormulaSet,
}

impl MoveClassifier {
    /// Creates a classifier, reading formulas from `config.formula_dir`.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_formulas(config, FormulaSet::load(&config.formula_dir))
    }

    /// Creates a classifier with formulas already loaded.
    pub fn with_formulas(config: &AnalysisConfig, formulas: FormulaSet) -> Self {
        Self {
            thresholds: config.thresholds.clone(),
            domination_cp: config.domination_cp,
            formulas,
        }
    }

    pub fn thresholds(&self) -> &SeverityThresholds {
        &self.thresholds
    }

    pub fn formulas(&self) -> &FormulaSet {
        &self.formulas
    }

    /// Severity of `played` among the candidates, if it can be decided.
    pub fn severity(&self, response: &MultiEngineResponse, played: &str) -> Option<Severity> {
        classify(response, response.find(played)?, &self.thresholds)
    }

    /// Analyses the move `played` from `position`.
    ///
    /// An empty response, or one without the played move, yields a record
    /// without severity. Indices are computed whenever candidates exist.
    pub fn analyze_move(
        &self,
        position: &Position,
        played: &str,
        response: &MultiEngineResponse,
    ) -> MoveAnalysisRecord {
        let context = FormulaContext::build(position, response);
        let indices = PositionalIndices::compute(&self.formulas, &context);
        let best = response.best();
        let played_response = response.find(played);

        let severity = played_response.and_then(|p| classify(response, p, &self.thresholds));
        let cp_loss = match (best, played_response) {
            (Some(b), Some(p)) => b
                .eval
                .centipawns_abs()
                .saturating_sub(p.eval.centipawns_abs())
                .max(0),
            _ => 0,
        };
        if severity.is_none() {
            debug!(played, candidates = response.len(), "move not classified");
        }

        MoveAnalysisRecord {
            played: played.to_string(),
            best_move: best.map(|b| b.uci.clone()),
            severity,
            cp_loss,
            rank: played_response.map(|p| response.score_rank(p.eval)),
            best_eval: best.map(|b| b.eval),
            played_eval: played_response.map(|p| p.eval),
            gmo: gmo(response),
            indices,
        }
    }

    /// Fills the analysis slot of `ply`.
    ///
    /// A cached record is kept unless `delete_previous` is set. Book moves
    /// are never analysed.
    pub fn analyze_ply<'a>(
        &self,
        ply: &'a mut AnalyzedPly,
        position: &Position,
        delete_previous: bool,
    ) -> Option<&'a MoveAnalysisRecord> {
        if ply.book {
            return None;
        }
        if ply.analysis.is_none() || delete_previous {
            ply.analysis = Some(self.analyze_move(position, &ply.mv, &ply.response));
        }
        ply.analysis.as_ref()
    }

    /// Replays a game from `start`, analysing every ply.
    ///
    /// # Errors
    ///
    /// Returns a [`MoveError`] at the first move that cannot be read or
    /// played; plies before it keep their analysis.
    #[instrument(skip_all, fields(plies = plies.len()))]
    pub fn analyze_game(
        &self,
        start: &Position,
        plies: &mut [AnalyzedPly],
        rules: &impl MoveGenerator,
        delete_previous: bool,
    ) -> Result<GameAnalysis, MoveError> {
        let mut position = start.clone();
        for ply in plies.iter_mut() {
            let request =
                MoveRequest::from_uci(&ply.mv).ok_or_else(|| MoveError::Illegal(ply.mv.clone()))?;
            ply.color = position.side_to_move();
            self.analyze_ply(ply, &position, delete_previous);
            position = position.apply_move(&request, rules)?.position;
        }
        Ok(GameAnalysis::from_plies(plies, self.domination_cp))
    }
}
