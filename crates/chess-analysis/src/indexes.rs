//! Positional indices and the `gmo` dispersion statistic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::formula::{FormulaContext, FormulaSet};
use crate::MultiEngineResponse;

/// The six formula-driven positional indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Complexity,
    WinProbability,
    Narrowness,
    EfficientMobility,
    PiecesActivity,
    ExchangeTendency,
}

impl IndexKind {
    pub const ALL: [IndexKind; 6] = [
        IndexKind::Complexity,
        IndexKind::WinProbability,
        IndexKind::Narrowness,
        IndexKind::EfficientMobility,
        IndexKind::PiecesActivity,
        IndexKind::ExchangeTendency,
    ];

    /// Stem of the resource file, `<stem>.formula`.
    pub const fn file_stem(self) -> &'static str {
        match self {
            IndexKind::Complexity => "complexity",
            IndexKind::WinProbability => "winprobability",
            IndexKind::Narrowness => "narrowness",
            IndexKind::EfficientMobility => "efficientmobility",
            IndexKind::PiecesActivity => "piecesactivity",
            IndexKind::ExchangeTendency => "exchangetendency",
        }
    }

    /// Human-readable name for reports.
    pub const fn name(self) -> &'static str {
        match self {
            IndexKind::Complexity => "Complexity",
            IndexKind::WinProbability => "Win probability",
            IndexKind::Narrowness => "Narrowness",
            IndexKind::EfficientMobility => "Efficient mobility",
            IndexKind::PiecesActivity => "Pieces activity",
            IndexKind::ExchangeTendency => "Exchange tendency",
        }
    }

    /// Describes a percentage on a seven-step scale.
    pub fn label(self, value: f64) -> &'static str {
        match value {
            v if v < 5.0 => "extremely low",
            v if v < 15.0 => "very low",
            v if v < 35.0 => "low",
            v if v < 65.0 => "moderate",
            v if v < 85.0 => "high",
            v if v < 95.0 => "very high",
            _ => "extremely high",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values of the six indices for one analysed move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionalIndices {
    pub complexity: f64,
    pub win_probability: f64,
    pub narrowness: f64,
    pub efficient_mobility: f64,
    pub pieces_activity: f64,
    pub exchange_tendency: f64,
}

impl PositionalIndices {
    /// Evaluates every index. Failures and empty responses give `0.0`.
    pub fn compute(formulas: &FormulaSet, context: &FormulaContext) -> Self {
        let mut indices = Self::default();
        for kind in IndexKind::ALL {
            indices.set(kind, formulas.index(kind, context));
        }
        indices
    }

    pub fn get(&self, kind: IndexKind) -> f64 {
        match kind {
            IndexKind::Complexity => self.complexity,
            IndexKind::WinProbability => self.win_probability,
            IndexKind::Narrowness => self.narrowness,
            IndexKind::EfficientMobility => self.efficient_mobility,
            IndexKind::PiecesActivity => self.pieces_activity,
            IndexKind::ExchangeTendency => self.exchange_tendency,
        }
    }

    pub fn set(&mut self, kind: IndexKind, value: f64) {
        let slot = match kind {
            IndexKind::Complexity => &mut self.complexity,
            IndexKind::WinProbability => &mut self.win_probability,
            IndexKind::Narrowness => &mut self.narrowness,
            IndexKind::EfficientMobility => &mut self.efficient_mobility,
            IndexKind::PiecesActivity => &mut self.pieces_activity,
            IndexKind::ExchangeTendency => &mut self.exchange_tendency,
        };
        *slot = value;
    }

    /// Adds `other` field by field.
    pub fn accumulate(&mut self, other: &PositionalIndices) {
        for kind in IndexKind::ALL {
            self.set(kind, self.get(kind) + other.get(kind));
        }
    }
}

/// Band edges for [`gmo_from_distances`], in centipawns.
const GMO_BANDS: [i32; 3] = [34, 68, 101];

/// Dispersion of candidate scores around the best one.
///
/// Every candidate, the best included, is placed by its distance from the
/// best score into `< 34`, `< 68` or `< 101` centipawns; candidates further
/// away are ignored. With `n1, n2, n3` the band counts,
/// `gmo = n1 + n2^0.8 + n3^0.5`. An empty response gives `0.0`.
pub fn gmo(response: &MultiEngineResponse) -> f64 {
    let Some(best) = response.best() else {
        return 0.0;
    };
    let best_cp = best.eval.centipawns_abs();
    let distances: Vec<i32> = response
        .responses
        .iter()
        .map(|r| best_cp.saturating_sub(r.eval.centipawns_abs()).saturating_abs())
        .collect();
    gmo_from_distances(&distances)
}

/// [`gmo`] over precomputed absolute distances from the best score.
pub fn gmo_from_distances(distances: &[i32]) -> f64 {
    let mut counts = [0u32; 3];
    for &distance in distances {
        if let Some(band) = GMO_BANDS.iter().position(|&edge| distance < edge) {
            counts[band] += 1;
        }
    }
    counts[0] as f64 + (counts[1] as f64).powf(0.8) + (counts[2] as f64).powf(0.5)
}
