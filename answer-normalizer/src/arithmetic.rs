//! Binary arithmetic found in a question ("what is 7 * 6?").

use regex::Regex;

use crate::errors::NormalizerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Expr {
    pub lhs: f64,
    pub op: Op,
    pub rhs: f64,
}

impl Expr {
    /// `None` for division by zero or a non-finite result.
    pub fn eval(&self) -> Option<f64> {
        let v = match self.op {
            Op::Add => self.lhs + self.rhs,
            Op::Sub => self.lhs - self.rhs,
            Op::Mul => self.lhs * self.rhs,
            Op::Div if self.rhs == 0.0 => return None,
            Op::Div => self.lhs / self.rhs,
        };
        v.is_finite().then_some(v)
    }
}

pub struct ExprParser {
    re: Regex,
}

impl ExprParser {
    pub fn new() -> Result<Self, NormalizerError> {
        Ok(Self {
            re: Regex::new(
                r"(?i)^\s*(?:(?:what's|what\s+is|how\s+much\s+is|calculate|compute|solve|evaluate)\s+)?(-?\d+(?:\.\d+)?)\s*(\+|-|\*|/|x|×|÷|plus|minus|times|multiplied by|divided by|over)\s*(-?\d+(?:\.\d+)?)\s*=?\s*[?.!]*\s*$",
            )?,
        })
    }

    /// The expression when `question` is nothing but a binary expression,
    /// optionally led by "what is", "calculate" and similar.
    pub fn parse(&self, question: &str) -> Option<Expr> {
        let c = self.re.captures(question)?;
        let lhs = c.get(1)?.as_str().parse::<f64>().ok()?;
        let rhs = c.get(3)?.as_str().parse::<f64>().ok()?;
        let op = match c.get(2)?.as_str().to_lowercase().as_str() {
            "+" | "plus" => Op::Add,
            "-" | "minus" => Op::Sub,
            "*" | "x" | "×" | "times" | "multiplied by" => Op::Mul,
            "/" | "÷" | "divided by" | "over" => Op::Div,
            _ => return None,
        };
        Some(Expr { lhs, op, rhs })
    }
}

/// Integers print without decimals; everything else with at most six,
/// trailing zeros trimmed.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{v:.6}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
