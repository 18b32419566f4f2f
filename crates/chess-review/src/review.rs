//! Review input, the review run itself and its two renderings.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use chess_analysis::{AnalyzedPly, GameAnalysis, MoveClassifier};
use chess_core::Position;
use chess_rules::{pgn_movetext, StandardRules};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A game as handed to the reviewer: an optional start position and the
/// plies with their engine candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewInput {
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(default)]
    pub moves: Vec<AnalyzedPly>,
}

impl ReviewInput {
    /// Reads a JSON review input from disk.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// The start position. Unreadable FEN text falls back to the initial
    /// position, as the position parser does.
    pub fn start(&self) -> Position {
        match self.fen.as_deref() {
            Some(fen) => {
                if let Err(err) = Position::try_parse(fen) {
                    warn!(fen, %err, "start position not valid FEN, using the initial position");
                }
                Position::parse(fen)
            }
            None => Position::startpos(),
        }
    }
}

/// The result of reviewing one game.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub fen: String,
    pub pgn: String,
    pub moves: Vec<AnalyzedPly>,
    pub statistics: GameAnalysis,
}

/// Classifies every ply of `input`.
///
/// Plies that already carry an analysis keep it unless `reanalyse` is set.
pub fn run(
    classifier: &MoveClassifier,
    mut input: ReviewInput,
    reanalyse: bool,
) -> anyhow::Result<Review> {
    let start = input.start();
    let statistics = classifier
        .analyze_game(&start, &mut input.moves, &StandardRules, reanalyse)
        .context("replaying the game")?;
    let pgn = pgn_movetext(&start, &input.moves.iter().map(|p| &p.mv).collect::<Vec<_>>());
    info!(plies = input.moves.len(), "game reviewed");

    Ok(Review {
        fen: start.to_fen(),
        pgn,
        moves: input.moves,
        statistics,
    })
}

impl Review {
    /// One line per ply followed by the statistics table.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "{}", self.pgn)?;
        writeln!(out)?;
        for (i, ply) in self.moves.iter().enumerate() {
            let verdict = match (&ply.analysis, ply.book) {
                (_, true) => "book".to_string(),
                (Some(record), _) => match record.severity {
                    Some(severity) => format!(
                        "{} {} (loss {:.2}, best {})",
                        severity,
                        severity.glyph(),
                        f64::from(record.cp_loss) / 100.0,
                        record.best_move.as_deref().unwrap_or("-")
                    ),
                    None => "not analysed".to_string(),
                },
                (None, false) => "not analysed".to_string(),
            };
            writeln!(out, "{:>3} {:<6} {}", i + 1, ply.mv, verdict)?;
        }
        writeln!(out)?;
        out.push_str(&self.statistics.summary());
        Ok(())
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serializing the review")
    }
}
