//! Availability expressions for option catalogs.
//!
//! Catalog elements carry boolean strings over option codes (`&`, `|`, `~`,
//! parentheses) that say when an element is standard or available and which
//! codes it pulls in. This crate tokenizes and parses them into an [`Expr`]
//! tree, evaluates them against a set of selected codes, and splits enable-code
//! channels into [`Segregation`] alternatives.

#![deny(unsafe_code)]

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod segregate;

pub use ast::{Expr, Selection};
pub use error::{ExpressionError, Result};
pub use parser::parse;
pub use segregate::{Comprehension, Conjunction, Segregation, comprehend, segregate};

/// Parse and evaluate `expr` against `selected` in one step.
///
/// The empty string is always true.
pub fn evaluate<S: Selection + ?Sized>(expr: &str, selected: &S) -> Result<bool> {
    Ok(parse(expr)?.evaluate(selected))
}
