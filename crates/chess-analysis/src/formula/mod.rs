//! Positional-index formulas.
//!
//! A formula is a one-line arithmetic expression over a fixed set of
//! context variables (`xgmo`, `xeval`, ...) and a small function table.
//! Formula text comes from user-replaceable `<index>.formula` files, so
//! every failure is reported as a [`FormulaError`] and the public index
//! API turns it into `0.0`.
//!
//! ```
//! use std::collections::HashMap;
//! use chess_analysis::formula::Formula;
//!
//! let formula = Formula::parse("min(100, xgmo ** 2 * 10)").unwrap();
//! let vars = HashMap::from([("xgmo".to_string(), 3.0)]);
//! assert_eq!(formula.eval(&vars).unwrap(), 90.0);
//! ```

mod context;
mod lexer;
mod parser;
mod set;

use thiserror::Error;

use crate::IndexKind;

pub use context::FormulaContext;
pub use parser::Formula;
pub use set::FormulaSet;

/// Name of the variable that pulls in the complexity formula's result.
pub const COMPLEXITY_VARIABLE: &str = "xcompl";

/// Deepest chain of `xcompl` evaluations before giving up.
pub const MAX_XCOMPL_DEPTH: usize = 4;

/// Reasons a formula cannot produce a value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    #[error("unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{name}() takes {expected} arguments, got {got}")]
    Arity {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("division by zero")]
    ZeroDivision,

    #[error("math domain error in {0}")]
    Domain(&'static str),

    #[error("result is not a finite number")]
    NonFinite,

    #[error("complexity formula nested more than {0} levels deep")]
    RecursionLimit(usize),

    #[error("expression nested more than {0} levels deep")]
    TooDeep(usize),

    #[error("formula longer than {0} tokens")]
    TooLong(usize),

    #[error("no {0} formula loaded")]
    Missing(IndexKind),
}
