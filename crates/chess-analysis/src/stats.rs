//! Per-colour statistics folded from analysed plies.

use std::collections::BTreeMap;

use chess_core::Color;
use serde::{Deserialize, Serialize};

use crate::{AnalyzedPly, IndexKind, MoveAnalysisRecord, PositionalIndices, Severity};

/// Counters and sums for the moves of one colour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorStats {
    pub best: u32,
    pub very_good: u32,
    pub good: u32,
    pub interesting: u32,
    /// Acceptable moves that were not the best
    pub neutral: u32,
    pub inaccuracy: u32,
    pub mistake: u32,
    pub blunder: u32,
    /// Opening book moves, never classified
    pub book: u32,
    /// Moves the engine gave no usable answer for
    pub not_analyzed: u32,
    /// Classified moves by distinct-score rank
    pub ranks: BTreeMap<usize, u32>,
    /// Total centipawns lost over classified moves
    pub cp_lost: i64,
    /// Number of classified moves
    pub analysed: u32,
    /// Classified moves whose best score exceeded the domination cutoff
    pub dominated: u32,
    /// Index sums over moves that had engine candidates
    pub index_sums: PositionalIndices,
    /// Number of moves contributing to `index_sums`
    pub indexed: u32,
}

impl ColorStats {
    /// Adds one ply to the counters.
    pub fn record(&mut self, ply: &AnalyzedPly, domination_cp: i32) {
        if ply.book {
            self.book += 1;
            return;
        }
        let Some(record) = &ply.analysis else {
            self.not_analyzed += 1;
            return;
        };
        if record.best_move.is_some() {
            self.index_sums.accumulate(&record.indices);
            self.indexed += 1;
        }
        match record.severity {
            Some(severity) => self.record_classified(record, severity, domination_cp),
            None => self.not_analyzed += 1,
        }
    }

    fn record_classified(
        &mut self,
        record: &MoveAnalysisRecord,
        severity: Severity,
        domination_cp: i32,
    ) {
        let counter = match severity {
            Severity::Best => &mut self.best,
            Severity::VeryGood => &mut self.very_good,
            Severity::Good => &mut self.good,
            Severity::Interesting => &mut self.interesting,
            Severity::Neutral => &mut self.neutral,
            Severity::Inaccuracy => &mut self.inaccuracy,
            Severity::Mistake => &mut self.mistake,
            Severity::Blunder => &mut self.blunder,
        };
        *counter += 1;

        self.analysed += 1;
        self.cp_lost += i64::from(record.cp_loss);
        if let Some(rank) = record.rank {
            *self.ranks.entry(rank).or_insert(0) += 1;
        }
        if record
            .best_eval
            .is_some_and(|eval| eval.centipawns_abs() > domination_cp)
        {
            self.dominated += 1;
        }
    }

    /// Number of moves with the given label.
    pub fn count(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Best => self.best,
            Severity::VeryGood => self.very_good,
            Severity::Good => self.good,
            Severity::Interesting => self.interesting,
            Severity::Neutral => self.neutral,
            Severity::Inaccuracy => self.inaccuracy,
            Severity::Mistake => self.mistake,
            Severity::Blunder => self.blunder,
        }
    }

    /// Every ply of this colour, book and unanalysed included.
    pub fn total_moves(&self) -> u32 {
        self.analysed + self.book + self.not_analyzed
    }

    /// Average loss per classified move, in pawns.
    pub fn average_cp_lost(&self) -> f64 {
        if self.analysed == 0 {
            return 0.0;
        }
        self.cp_lost as f64 / f64::from(self.analysed) / 100.0
    }

    /// Percentage of classified moves played from a dominating position.
    pub fn domination_percent(&self) -> f64 {
        if self.analysed == 0 {
            return 0.0;
        }
        f64::from(self.dominated) * 100.0 / f64::from(self.analysed)
    }

    /// Mean of one index over the moves that had engine candidates.
    pub fn index_average(&self, kind: IndexKind) -> f64 {
        if self.indexed == 0 {
            return 0.0;
        }
        self.index_sums.get(kind) / f64::from(self.indexed)
    }
}

/// Statistics of a whole game, one [`ColorStats`] per side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameAnalysis {
    pub white: ColorStats,
    pub black: ColorStats,
}

impl GameAnalysis {
    /// Folds plies into per-colour statistics, using each ply's `color`.
    pub fn from_plies(plies: &[AnalyzedPly], domination_cp: i32) -> Self {
        let mut analysis = GameAnalysis::default();
        for ply in plies {
            analysis.stats_mut(ply.color).record(ply, domination_cp);
        }
        analysis
    }

    pub fn stats(&self, color: Color) -> &ColorStats {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    fn stats_mut(&mut self, color: Color) -> &mut ColorStats {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Game-wide value of an index: the mean of the two colour averages.
    ///
    /// A side that played more moves does not weigh more.
    pub fn index_total(&self, kind: IndexKind) -> f64 {
        (self.white.index_average(kind) + self.black.index_average(kind)) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Evaluation, MultiEngineResponse};

    fn ply(color: Color, severity: Option<Severity>, cp_loss: i32, complexity: f64) -> AnalyzedPly {
        let indices = PositionalIndices {
            complexity,
            ..PositionalIndices::default()
        };
        AnalyzedPly {
            mv: "e2e4".to_string(),
            color,
            book: false,
            response: MultiEngineResponse::default(),
            analysis: Some(MoveAnalysisRecord {
                played: "e2e4".to_string(),
                best_move: Some("e2e4".to_string()),
                severity,
                cp_loss,
                rank: severity.map(|_| 1),
                best_eval: Some(Evaluation::Centipawns(150)),
                played_eval: Some(Evaluation::Centipawns(150 - cp_loss)),
                gmo: 1.0,
                indices,
            }),
        }
    }

    #[test]
    fn test_counters_by_color() {
        let mut book = ply(Color::White, None, 0, 0.0);
        book.book = true;
        book.analysis = None;
        let mut unanswered = ply(Color::Black, None, 0, 0.0);
        unanswered.analysis = None;

        let plies = vec![
            book,
            unanswered,
            ply(Color::White, Some(Severity::Blunder), 300, 10.0),
            ply(Color::Black, Some(Severity::Best), 0, 10.0),
            ply(Color::White, Some(Severity::Neutral), 10, 10.0),
        ];
        let game = GameAnalysis::from_plies(&plies, 100);

        assert_eq!(game.white.book, 1);
        assert_eq!(game.white.blunder, 1);
        assert_eq!(game.white.count(Severity::Neutral), 1);
        assert_eq!(game.white.analysed, 2);
        assert_eq!(game.white.total_moves(), 3);
        assert_eq!(game.black.not_analyzed, 1);
        assert_eq!(game.black.best, 1);
        assert_eq!(game.white.ranks.get(&1), Some(&2));
    }

    #[test]
    fn test_average_cp_lost_in_pawns() {
        let plies = vec![
            ply(Color::White, Some(Severity::Blunder), 300, 0.0),
            ply(Color::White, Some(Severity::Best), 0, 0.0),
        ];
        let game = GameAnalysis::from_plies(&plies, 100);
        assert_eq!(game.white.average_cp_lost(), 1.5);
        assert_eq!(game.black.average_cp_lost(), 0.0);
    }

    #[test]
    fn test_domination_percent() {
        let plies = vec![
            ply(Color::White, Some(Severity::Best), 0, 0.0),
            ply(Color::White, Some(Severity::Best), 0, 0.0),
        ];
        assert_eq!(GameAnalysis::from_plies(&plies, 100).white.domination_percent(), 100.0);
        assert_eq!(GameAnalysis::from_plies(&plies, 150).white.domination_percent(), 0.0);
    }

    #[test]
    fn test_index_total_is_mean_of_colour_means() {
        let plies = vec![
            ply(Color::White, Some(Severity::Best), 0, 10.0),
            ply(Color::Black, Some(Severity::Best), 0, 20.0),
            ply(Color::Black, Some(Severity::Best), 0, 20.0),
            ply(Color::Black, Some(Severity::Best), 0, 20.0),
        ];
        let game = GameAnalysis::from_plies(&plies, 100);
        assert_eq!(game.white.index_average(IndexKind::Complexity), 10.0);
        assert_eq!(game.black.index_average(IndexKind::Complexity), 20.0);
        // Pooling the four moves would give 17.5.
        assert_eq!(game.index_total(IndexKind::Complexity), 15.0);
    }

    #[test]
    fn test_unclassified_move_still_contributes_indices() {
        let plies = vec![ply(Color::White, None, 0, 40.0)];
        let game = GameAnalysis::from_plies(&plies, 100);
        assert_eq!(game.white.not_analyzed, 1);
        assert_eq!(game.white.analysed, 0);
        assert_eq!(game.white.index_average(IndexKind::Complexity), 40.0);
    }
}
