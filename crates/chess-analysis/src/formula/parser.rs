//! Recursive-descent parser and evaluator.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/' | '//' | '%') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('**' unary)?
//! primary := number | name | name '(' args ')' | '(' sum ')'
//! ```
//!
//! `**` is right-associative and binds tighter than a leading minus, so
//! `-2 ** 2` is `-4` and `2 ** -1` is `0.5`.
//!
//! Formulas come from files on disk, so both the token count and the
//! nesting of `unary` are capped to keep parsing and evaluation off the
//! end of the stack.

use std::collections::{BTreeSet, HashMap};

use super::lexer::{tokenize, Token};
use super::FormulaError;

/// Deepest nesting of signs, powers, parentheses and calls.
const MAX_NESTING: usize = 64;

/// Longest formula accepted, in tokens.
const MAX_TOKENS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Var(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

/// A parsed formula, ready to be evaluated many times.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parses formula text.
    pub fn parse(text: &str) -> Result<Self, FormulaError> {
        let tokens = tokenize(text)?;
        if tokens.len() > MAX_TOKENS {
            return Err(FormulaError::TooLong(MAX_TOKENS));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.sum()?;
        if let Some(token) = parser.peek() {
            return Err(FormulaError::UnexpectedToken(token.describe()));
        }
        Ok(Formula {
            source: text.trim().to_string(),
            expr,
        })
    }

    /// The formula text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every variable name the formula reads.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        collect_vars(&self.expr, &mut names);
        names
    }

    /// Returns true if the formula reads `name`.
    pub fn references(&self, name: &str) -> bool {
        self.variables().contains(name)
    }

    /// Evaluates the formula with the given variable values.
    pub fn eval(&self, vars: &HashMap<String, f64>) -> Result<f64, FormulaError> {
        eval(&self.expr, vars)
    }
}

fn collect_vars<'a>(expr: &'a Expr, names: &mut BTreeSet<&'a str>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Var(name) => {
            names.insert(name.as_str());
        }
        Expr::Neg(inner) => collect_vars(inner, names),
        Expr::Binary(_, lhs, rhs) => {
            collect_vars(lhs, names);
            collect_vars(rhs, names);
        }
        Expr::Call(_, args) => args.iter().for_each(|arg| collect_vars(arg, names)),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, FormulaError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(FormulaError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), FormulaError> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(FormulaError::UnexpectedToken(token.describe()))
        }
    }

    fn sum(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.product()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn product(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::DoubleSlash) => BinOp::FloorDiv,
                Some(Token::Percent) => BinOp::Mod,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    /// Every recursive path of the grammar passes through here, so this
    /// is where nesting is counted.
    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if self.depth >= MAX_NESTING {
            return Err(FormulaError::TooDeep(MAX_NESTING));
        }
        self.depth += 1;
        let expr = self.signed();
        self.depth -= 1;
        expr
    }

    fn signed(&mut self) -> Result<Expr, FormulaError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.primary()?;
        if self.eat(&Token::DoubleStar) {
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        match self.next()? {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::Ident(name) => {
                if !self.eat(&Token::LParen) {
                    return Ok(Expr::Var(name));
                }
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.sum()?);
                        if self.eat(&Token::Comma) {
                            continue;
                        }
                        self.expect(Token::RParen)?;
                        break;
                    }
                }
                Ok(Expr::Call(name, args))
            }
            Token::LParen => {
                let inner = self.sum()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(FormulaError::UnexpectedToken(other.describe())),
        }
    }
}

fn finite(value: f64) -> Result<f64, FormulaError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::NonFinite)
    }
}

fn eval(expr: &Expr, vars: &HashMap<String, f64>) -> Result<f64, FormulaError> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Var(name) => vars
            .get(name)
            .copied()
            .ok_or_else(|| FormulaError::UnknownVariable(name.clone())),
        Expr::Neg(inner) => Ok(-eval(inner, vars)?),
        Expr::Binary(op, lhs, rhs) => {
            let a = eval(lhs, vars)?;
            let b = eval(rhs, vars)?;
            binary(*op, a, b)
        }
        Expr::Call(name, args) => {
            let values = args
                .iter()
                .map(|arg| eval(arg, vars))
                .collect::<Result<Vec<f64>, FormulaError>>()?;
            call(name, &values)
        }
    }
}

fn binary(op: BinOp, a: f64, b: f64) -> Result<f64, FormulaError> {
    let value = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div | BinOp::FloorDiv | BinOp::Mod if b == 0.0 => {
            return Err(FormulaError::ZeroDivision)
        }
        BinOp::Div => a / b,
        BinOp::FloorDiv => (a / b).floor(),
        // Floored modulo: the result takes the sign of the divisor.
        BinOp::Mod => a - b * (a / b).floor(),
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(FormulaError::ZeroDivision);
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err(FormulaError::Domain("**"));
            }
            a.powf(b)
        }
    };
    finite(value)
}

fn arity(name: &str, expected: &'static str, got: usize, ok: bool) -> Result<(), FormulaError> {
    if ok {
        Ok(())
    } else {
        Err(FormulaError::Arity {
            name: name.to_string(),
            expected,
            got,
        })
    }
}

/// Python-style rounding: halves go to the even neighbour.
fn round_to(value: f64, digits: i32) -> f64 {
    if digits == 0 {
        return value.round_ties_even();
    }
    let scale = 10f64.powi(digits);
    (value * scale).round_ties_even() / scale
}

fn call(name: &str, args: &[f64]) -> Result<f64, FormulaError> {
    let n = args.len();
    let value = match name {
        "abs" => {
            arity(name, "1", n, n == 1)?;
            args[0].abs()
        }
        "round" => {
            arity(name, "1 or 2", n, n == 1 || n == 2)?;
            let digits = args.get(1).map_or(0, |d| *d as i32);
            round_to(args[0], digits)
        }
        "min" => {
            arity(name, "at least 2", n, n >= 2)?;
            args.iter().copied().fold(f64::INFINITY, f64::min)
        }
        "max" => {
            arity(name, "at least 2", n, n >= 2)?;
            args.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
        "pow" => {
            arity(name, "2", n, n == 2)?;
            binary(BinOp::Pow, args[0], args[1])?
        }
        "sqrt" => {
            arity(name, "1", n, n == 1)?;
            if args[0] < 0.0 {
                return Err(FormulaError::Domain("sqrt"));
            }
            args[0].sqrt()
        }
        "log" => {
            arity(name, "1 or 2", n, n == 1 || n == 2)?;
            if args[0] <= 0.0 || args.get(1).is_some_and(|base| *base <= 0.0) {
                return Err(FormulaError::Domain("log"));
            }
            match args.get(1) {
                None => args[0].ln(),
                Some(base) if *base == 1.0 => return Err(FormulaError::ZeroDivision),
                Some(base) => args[0].ln() / base.ln(),
            }
        }
        "exp" => {
            arity(name, "1", n, n == 1)?;
            args[0].exp()
        }
        _ => return Err(FormulaError::UnknownFunction(name.to_string())),
    };
    finite(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(text: &str) -> Result<f64, FormulaError> {
        let vars = HashMap::from([("x".to_string(), 3.0), ("y".to_string(), -2.0)]);
        Formula::parse(text)?.eval(&vars)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval_str("1 + 2 * 3").unwrap(), 7.0);
        assert_eq!(eval_str("(1 + 2) * 3").unwrap(), 9.0);
        assert_eq!(eval_str("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(eval_str("2 * x ** 2").unwrap(), 18.0);
    }

    #[test]
    fn test_power_binds_right_and_above_negation() {
        assert_eq!(eval_str("2 ** 3 ** 2").unwrap(), 512.0);
        assert_eq!(eval_str("-2 ** 2").unwrap(), -4.0);
        assert_eq!(eval_str("2 ** -1").unwrap(), 0.5);
        assert_eq!(eval_str("(-2) ** 2").unwrap(), 4.0);
    }

    #[test]
    fn test_floor_division_and_modulo() {
        assert_eq!(eval_str("7 // 2").unwrap(), 3.0);
        assert_eq!(eval_str("-7 // 2").unwrap(), -4.0);
        assert_eq!(eval_str("-7 % 3").unwrap(), 2.0);
        assert_eq!(eval_str("7 % -3").unwrap(), -2.0);
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval_str("abs(y)").unwrap(), 2.0);
        assert_eq!(eval_str("min(x, y, 10)").unwrap(), -2.0);
        assert_eq!(eval_str("max(x, y)").unwrap(), 3.0);
        assert_eq!(eval_str("pow(2, 10)").unwrap(), 1024.0);
        assert_eq!(eval_str("sqrt(16)").unwrap(), 4.0);
        assert_eq!(eval_str("log(1000, 10)").unwrap().round(), 3.0);
        assert_eq!(eval_str("exp(0)").unwrap(), 1.0);
        assert_eq!(eval_str("log(1)").unwrap(), 0.0);
    }

    #[test]
    fn test_round_ties_to_even() {
        assert_eq!(eval_str("round(2.5)").unwrap(), 2.0);
        assert_eq!(eval_str("round(3.5)").unwrap(), 4.0);
        assert_eq!(eval_str("round(-0.5)").unwrap(), -0.0);
        assert_eq!(eval_str("round(3.14159, 2)").unwrap(), 3.14);
    }

    #[test]
    fn test_errors() {
        assert_eq!(eval_str("1 / 0"), Err(FormulaError::ZeroDivision));
        assert_eq!(eval_str("x % 0"), Err(FormulaError::ZeroDivision));
        assert_eq!(eval_str("0 ** -1"), Err(FormulaError::ZeroDivision));
        assert_eq!(eval_str("sqrt(y)"), Err(FormulaError::Domain("sqrt")));
        assert_eq!(eval_str("log(0)"), Err(FormulaError::Domain("log")));
        assert_eq!(eval_str("log(5, 1)"), Err(FormulaError::ZeroDivision));
        assert_eq!(eval_str("y ** 0.5"), Err(FormulaError::Domain("**")));
        assert_eq!(eval_str("exp(1000)"), Err(FormulaError::NonFinite));
        assert_eq!(
            eval_str("z + 1"),
            Err(FormulaError::UnknownVariable("z".to_string()))
        );
        assert_eq!(
            eval_str("eval(1)"),
            Err(FormulaError::UnknownFunction("eval".to_string()))
        );
        assert!(matches!(eval_str("min(1)"), Err(FormulaError::Arity { .. })));
        assert!(matches!(eval_str("abs()"), Err(FormulaError::Arity { .. })));
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(eval_str(""), Err(FormulaError::UnexpectedEnd));
        assert_eq!(eval_str("1 +"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(eval_str("(1 + 2"), Err(FormulaError::UnexpectedEnd));
        assert!(matches!(eval_str("1 2"), Err(FormulaError::UnexpectedToken(_))));
        assert!(matches!(eval_str("max(1,)"), Err(FormulaError::UnexpectedToken(_))));
        assert!(matches!(eval_str("* 3"), Err(FormulaError::UnexpectedToken(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |levels: usize| format!("{}1{}", "(".repeat(levels), ")".repeat(levels));
        assert_eq!(eval_str(&nested(40)).unwrap(), 1.0);
        assert_eq!(eval_str(&nested(100)), Err(FormulaError::TooDeep(MAX_NESTING)));
        assert_eq!(
            eval_str(&format!("{}1", "-".repeat(100))),
            Err(FormulaError::TooDeep(MAX_NESTING))
        );
        assert_eq!(
            eval_str(&format!("{}1", "2 ** ".repeat(100))),
            Err(FormulaError::TooDeep(MAX_NESTING))
        );
        assert_eq!(
            eval_str(&format!("{}1{}", "abs(".repeat(100), ")".repeat(100))),
            Err(FormulaError::TooDeep(MAX_NESTING))
        );
        // Far past any stack limit: rejected before parsing starts.
        assert_eq!(
            eval_str(&nested(200_000)),
            Err(FormulaError::TooLong(MAX_TOKENS))
        );
    }

    #[test]
    fn test_token_limit() {
        let chain = vec!["1"; 400].join(" + ");
        assert_eq!(eval_str(&chain).unwrap(), 400.0);
        let long = vec!["1"; 1000].join(" + ");
        assert_eq!(eval_str(&long), Err(FormulaError::TooLong(MAX_TOKENS)));
    }

    #[test]
    fn test_variables() {
        let formula = Formula::parse("max(xgmo, 1) * xcompl - xgmo").unwrap();
        let names: Vec<&str> = formula.variables().into_iter().collect();
        assert_eq!(names, vec!["xcompl", "xgmo"]);
        assert!(formula.references("xcompl"));
        assert!(!formula.references("xeval"));
        assert_eq!(formula.source(), "max(xgmo, 1) * xcompl - xgmo");
    }
}
