//! Loading formulas and computing index values from them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::{Formula, FormulaContext, FormulaError, COMPLEXITY_VARIABLE, MAX_XCOMPL_DEPTH};
use crate::IndexKind;

/// The parsed formula for each index, read once.
///
/// Indices without a usable formula evaluate to `0.0`.
#[derive(Debug, Clone, Default)]
pub struct FormulaSet {
    formulas: BTreeMap<IndexKind, Formula>,
}

impl FormulaSet {
    /// Reads `<dir>/<index>.formula` for every index.
    ///
    /// Missing, unreadable or unparsable files are logged and skipped.
    pub fn load(dir: &Path) -> Self {
        let mut formulas = BTreeMap::new();
        for kind in IndexKind::ALL {
            let path = dir.join(format!("{}.formula", kind.file_stem()));
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(path = %path.display(), %err, "formula file not readable");
                    continue;
                }
            };
            match Formula::parse(&text) {
                Ok(formula) => {
                    formulas.insert(kind, formula);
                }
                Err(err) => warn!(path = %path.display(), %err, "formula does not parse"),
            }
        }
        debug!(dir = %dir.display(), loaded = formulas.len(), "formulas loaded");
        FormulaSet { formulas }
    }

    /// Builds a set from formula text held in memory.
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (IndexKind, &'a str)>,
    ) -> Result<Self, FormulaError> {
        let formulas = sources
            .into_iter()
            .map(|(kind, text)| Formula::parse(text).map(|formula| (kind, formula)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(FormulaSet { formulas })
    }

    pub fn get(&self, kind: IndexKind) -> Option<&Formula> {
        self.formulas.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Value of one index, or `0.0` if it cannot be computed.
    pub fn index(&self, kind: IndexKind, context: &FormulaContext) -> f64 {
        if context.is_empty() {
            return 0.0;
        }
        match self.evaluate(kind, context) {
            Ok(value) => value,
            Err(err @ FormulaError::RecursionLimit(_)) => {
                warn!(index = %kind, %err, "formula recursion stopped");
                0.0
            }
            Err(err) => {
                debug!(index = %kind, %err, "formula failed, using 0");
                0.0
            }
        }
    }

    /// Value of one index, with the reason when it cannot be computed.
    pub fn evaluate(&self, kind: IndexKind, context: &FormulaContext) -> Result<f64, FormulaError> {
        self.evaluate_at(kind, context, 0)
    }

    fn evaluate_at(
        &self,
        kind: IndexKind,
        context: &FormulaContext,
        depth: usize,
    ) -> Result<f64, FormulaError> {
        if depth > MAX_XCOMPL_DEPTH {
            return Err(FormulaError::RecursionLimit(MAX_XCOMPL_DEPTH));
        }
        let formula = self.get(kind).ok_or(FormulaError::Missing(kind))?;
        if !formula.references(COMPLEXITY_VARIABLE) {
            return formula.eval(context.variables());
        }

        // A complexity value that fails for any other reason reads as 0.
        let complexity = match self.evaluate_at(IndexKind::Complexity, context, depth + 1) {
            Ok(value) => value,
            Err(err @ FormulaError::RecursionLimit(_)) => return Err(err),
            Err(err) => {
                debug!(%err, "complexity unavailable, xcompl = 0");
                0.0
            }
        };
        let mut vars = context.variables().clone();
        vars.insert(COMPLEXITY_VARIABLE.to_string(), complexity);
        formula.eval(&vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineResponse, Evaluation, MultiEngineResponse};
    use chess_core::Position;

    fn context() -> FormulaContext {
        let response = MultiEngineResponse::new(
            vec![
                EngineResponse::new("e2e4", Evaluation::Centipawns(30), 12),
                EngineResponse::new("d2d4", Evaluation::Centipawns(25), 12),
            ],
            12,
        );
        FormulaContext::build(&Position::startpos(), &response)
    }

    #[test]
    fn test_index_evaluates_formula() {
        let set = FormulaSet::from_sources([(IndexKind::Complexity, "xgmo * 10 + xpie")]).unwrap();
        assert_eq!(set.index(IndexKind::Complexity, &context()), 50.0);
    }

    #[test]
    fn test_missing_formula_is_zero() {
        let set = FormulaSet::default();
        assert_eq!(set.index(IndexKind::Narrowness, &context()), 0.0);
        assert_eq!(
            set.evaluate(IndexKind::Narrowness, &context()),
            Err(FormulaError::Missing(IndexKind::Narrowness))
        );
    }

    #[test]
    fn test_failing_formula_is_zero() {
        let set = FormulaSet::from_sources([(IndexKind::WinProbability, "xeval / (xstm - 1)")]).unwrap();
        assert_eq!(set.index(IndexKind::WinProbability, &context()), 0.0);
    }

    #[test]
    fn test_empty_response_is_zero() {
        let set = FormulaSet::from_sources([(IndexKind::Complexity, "1 + 1")]).unwrap();
        let ctx = FormulaContext::build(&Position::startpos(), &MultiEngineResponse::default());
        for kind in IndexKind::ALL {
            assert_eq!(set.index(kind, &ctx), 0.0);
        }
    }

    #[test]
    fn test_xcompl_uses_complexity() {
        let set = FormulaSet::from_sources([
            (IndexKind::Complexity, "xgmo * 10"),
            (IndexKind::Narrowness, "100 - xcompl"),
        ])
        .unwrap();
        assert_eq!(set.index(IndexKind::Narrowness, &context()), 80.0);
    }

    #[test]
    fn test_xcompl_without_complexity_reads_zero() {
        let set = FormulaSet::from_sources([(IndexKind::Narrowness, "100 - xcompl")]).unwrap();
        assert_eq!(set.index(IndexKind::Narrowness, &context()), 100.0);
    }

    #[test]
    fn test_self_referencing_complexity_hits_the_limit() {
        let set = FormulaSet::from_sources([
            (IndexKind::Complexity, "xcompl + 1"),
            (IndexKind::Narrowness, "xcompl * 2"),
        ])
        .unwrap();
        let ctx = context();
        assert_eq!(
            set.evaluate(IndexKind::Complexity, &ctx),
            Err(FormulaError::RecursionLimit(MAX_XCOMPL_DEPTH))
        );
        assert_eq!(set.index(IndexKind::Complexity, &ctx), 0.0);
        assert_eq!(set.index(IndexKind::Narrowness, &ctx), 0.0);
    }

    #[test]
    fn test_from_sources_rejects_bad_text() {
        let result = FormulaSet::from_sources([(IndexKind::Complexity, "xgmo +")]);
        assert_eq!(result.unwrap_err(), FormulaError::UnexpectedEnd);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("complexity.formula"), "xgmo * 10\n").unwrap();
        std::fs::write(dir.path().join("narrowness.formula"), "xgmo +").unwrap();
        let set = FormulaSet::load(dir.path());
        assert_eq!(set.len(), 1);
        assert!(set.get(IndexKind::Narrowness).is_none());
        assert_eq!(set.index(IndexKind::Complexity, &context()), 20.0);
    }

    #[test]
    fn test_load_skips_deeply_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        let levels = 200_000;
        let hostile = format!("{}xgmo{}", "(".repeat(levels), ")".repeat(levels));
        std::fs::write(dir.path().join("complexity.formula"), hostile).unwrap();
        let nested = format!("{}xgmo{}", "abs(".repeat(80), ")".repeat(80));
        std::fs::write(dir.path().join("narrowness.formula"), nested).unwrap();
        std::fs::write(dir.path().join("winprobability.formula"), "50").unwrap();

        let set = FormulaSet::load(dir.path());
        assert_eq!(set.len(), 1);
        assert!(set.get(IndexKind::Complexity).is_none());
        assert!(set.get(IndexKind::Narrowness).is_none());
        assert_eq!(set.index(IndexKind::WinProbability, &context()), 50.0);
    }
}
