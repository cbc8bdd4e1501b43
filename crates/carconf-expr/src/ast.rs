use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Parsed availability expression.
///
/// `And(vec![])` is the always-true expression produced by an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Code(String),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

/// A set of currently selected codes an expression can be evaluated against.
pub trait Selection {
    fn contains_code(&self, code: &str) -> bool;
}

impl Selection for [String] {
    fn contains_code(&self, code: &str) -> bool {
        self.iter().any(|candidate| candidate == code)
    }
}

impl Selection for Vec<String> {
    fn contains_code(&self, code: &str) -> bool {
        self.as_slice().contains_code(code)
    }
}

impl Selection for [&str] {
    fn contains_code(&self, code: &str) -> bool {
        self.contains(&code)
    }
}

impl Selection for HashSet<String> {
    fn contains_code(&self, code: &str) -> bool {
        self.contains(code)
    }
}

impl Selection for BTreeSet<String> {
    fn contains_code(&self, code: &str) -> bool {
        self.contains(code)
    }
}

impl Expr {
    pub fn always() -> Self {
        Expr::And(Vec::new())
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Expr::And(items) if items.is_empty())
    }

    pub fn evaluate<S: Selection + ?Sized>(&self, selected: &S) -> bool {
        match self {
            Expr::Code(code) => selected.contains_code(code),
            Expr::Not(inner) => !inner.evaluate(selected),
            Expr::And(items) => items.iter().all(|item| item.evaluate(selected)),
            Expr::Or(items) => items.iter().any(|item| item.evaluate(selected)),
        }
    }

    /// Every code referenced by the expression, in source order.
    pub fn codes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_codes(&mut out);
        out
    }

    fn collect_codes<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Code(code) => out.push(code),
            Expr::Not(inner) => inner.collect_codes(out),
            Expr::And(items) | Expr::Or(items) => {
                for item in items {
                    item.collect_codes(out);
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn joined(f: &mut fmt::Formatter<'_>, items: &[Expr], op: &str) -> fmt::Result {
            f.write_str("(")?;
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    f.write_str(op)?;
                }
                write!(f, "{item}")?;
            }
            f.write_str(")")
        }
        match self {
            Expr::Code(code) => f.write_str(code),
            Expr::Not(inner) => write!(f, "~{inner}"),
            Expr::And(items) => joined(f, items, "&"),
            Expr::Or(items) => joined(f, items, "|"),
        }
    }
}
