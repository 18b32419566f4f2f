//! Move classification and positional indices for game review.
//!
//! This crate takes the engine's ranked candidates for each position of a
//! game and turns them into move labels and per-colour statistics.
//!
//! # Overview
//!
//! - [`Evaluation`] - Position evaluation (centipawn or mate score)
//! - [`MultiEngineResponse`] - Best-first multi-PV candidates for one position
//! - [`formula`] - Sandboxed arithmetic used for the positional indices
//! - [`MoveClassifier`] - Labels played moves and computes indices
//! - [`GameAnalysis`] - Per-colour statistics with a text summary
//!
//! # Example
//!
//! ```
//! use chess_analysis::{
//!     AnalysisConfig, EngineResponse, Evaluation, FormulaSet, MoveClassifier,
//!     MultiEngineResponse, Severity,
//! };
//! use chess_core::Position;
//!
//! let classifier = MoveClassifier::with_formulas(&AnalysisConfig::default(), FormulaSet::default());
//! let response = MultiEngineResponse::new(
//!     vec![
//!         EngineResponse::new("e2e4", Evaluation::Centipawns(40), 18),
//!         EngineResponse::new("g1h3", Evaluation::Centipawns(-180), 18),
//!     ],
//!     18,
//! );
//! let record = classifier.analyze_move(&Position::startpos(), "g1h3", &response);
//! assert_eq!(record.severity, Some(Severity::Blunder));
//! ```

mod analyzer;
mod config;
mod evaluation;
pub mod formula;
mod indexes;
mod quality;
mod report;
mod response;
mod stats;

pub use analyzer::{AnalyzedPly, MoveAnalysisRecord, MoveClassifier};
pub use config::{AnalysisConfig, ConfigError};
pub use evaluation::Evaluation;
pub use formula::{Formula, FormulaError, FormulaSet};
pub use indexes::{gmo, gmo_from_distances, IndexKind, PositionalIndices};
pub use quality::{classify, Severity, SeverityThresholds};
pub use response::{EngineResponse, MultiEngineResponse};
pub use stats::{ColorStats, GameAnalysis};
