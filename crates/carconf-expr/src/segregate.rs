//! Splitting an enable-code channel into individually satisfiable alternatives.
//!
//! A channel string such as `W1&(red|blue)&~L2` is read as a conjunction of
//! required codes (`W1`), OR terms (`red|blue`) and excluded codes (`L2`).
//! Each OR term is expanded into its own alternatives, so `(X1&X2)|X3`
//! offers `X1&X2` or `X3`. Each combination of one alternative per OR term,
//! joined with the required codes, is a [`Segregation`] the resolver can try
//! on its own.

use crate::ast::Expr;
use crate::error::Result;
use crate::parser::parse;

/// Codes that must all be activated plus codes that must stay off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conjunction {
    pub and: Vec<String>,
    pub not: Vec<String>,
}

impl Conjunction {
    fn required(code: &str) -> Self {
        Self {
            and: vec![code.to_string()],
            not: Vec::new(),
        }
    }

    fn merge(&mut self, other: &Conjunction) {
        push_unique(&mut self.and, &other.and);
        push_unique(&mut self.not, &other.not);
    }
}

/// The conjunctive reading of a channel expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comprehension {
    pub and: Vec<String>,
    pub not: Vec<String>,
    /// One entry per OR term, each listing that term's alternatives.
    pub or: Vec<Vec<Conjunction>>,
}

impl Comprehension {
    /// Every code each OR term can activate, one list per term.
    pub fn or_groups(&self) -> Vec<Vec<String>> {
        self.or
            .iter()
            .map(|alternatives| {
                let mut codes = Vec::new();
                for alternative in alternatives {
                    push_unique(&mut codes, &alternative.and);
                }
                codes
            })
            .collect()
    }
}

/// One alternative of a channel expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segregation {
    /// Codes that must all be activated.
    pub and: Vec<String>,
    /// Codes disabled when this alternative is accepted.
    pub not: Vec<String>,
    /// The OR groups the alternative was drawn from, if the channel had any.
    pub or_groups: Option<Vec<Vec<String>>>,
}

impl Segregation {
    pub fn is_trivial(&self) -> bool {
        self.and.is_empty()
    }
}

/// Read an expression as required codes, excluded codes and OR terms.
///
/// A negated term excludes every code it mentions, whatever its inner
/// structure. A top-level term with a single alternative is folded into the
/// required and excluded codes.
pub fn comprehend(expr: &Expr) -> Comprehension {
    let mut base = Conjunction::default();
    let mut or = Vec::new();
    let mut conjuncts = Vec::new();
    flatten_and(expr, &mut conjuncts);
    for term in conjuncts {
        let mut alternatives = disjuncts(term);
        if alternatives.len() == 1 {
            if let Some(only) = alternatives.pop() {
                base.merge(&only);
            }
        } else {
            or.push(alternatives);
        }
    }
    Comprehension {
        and: base.and,
        not: base.not,
        or,
    }
}

fn flatten_and<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::And(items) => {
            for item in items {
                flatten_and(item, out);
            }
        }
        other => out.push(other),
    }
}

/// Disjunctive normal form of `expr`, duplicates removed.
fn disjuncts(expr: &Expr) -> Vec<Conjunction> {
    match expr {
        Expr::Code(code) => vec![Conjunction::required(code)],
        Expr::Not(inner) => vec![Conjunction {
            and: Vec::new(),
            not: owned_codes(inner),
        }],
        Expr::And(items) => {
            let factors: Vec<Vec<Conjunction>> = items.iter().map(disjuncts).collect();
            let mut out = Vec::new();
            for combo in cartesian(&factors) {
                let mut merged = Conjunction::default();
                for part in &combo {
                    merged.merge(part);
                }
                if !out.contains(&merged) {
                    out.push(merged);
                }
            }
            out
        }
        Expr::Or(items) => {
            let mut out = Vec::new();
            for alternative in items.iter().flat_map(disjuncts) {
                if !out.contains(&alternative) {
                    out.push(alternative);
                }
            }
            out
        }
    }
}

fn owned_codes(expr: &Expr) -> Vec<String> {
    let mut out = Vec::new();
    for code in expr.codes() {
        if !out.iter().any(|seen: &String| seen == code) {
            out.push(code.to_string());
        }
    }
    out
}

fn push_unique(target: &mut Vec<String>, codes: &[String]) {
    for code in codes {
        if !target.contains(code) {
            target.push(code.clone());
        }
    }
}

/// Parse a channel string and expand it into its individual alternatives.
///
/// An empty string yields a single trivially satisfied segregation.
pub fn segregate(input: &str) -> Result<Vec<Segregation>> {
    let expr = parse(input)?;
    Ok(segregations(&comprehend(&expr)))
}

pub fn segregations(comprehension: &Comprehension) -> Vec<Segregation> {
    if comprehension.or.is_empty() {
        return vec![Segregation {
            and: comprehension.and.clone(),
            not: comprehension.not.clone(),
            or_groups: None,
        }];
    }
    let or_groups = comprehension.or_groups();
    cartesian(&comprehension.or)
        .into_iter()
        .map(|combo| {
            let mut merged = Conjunction {
                and: comprehension.and.clone(),
                not: comprehension.not.clone(),
            };
            for alternative in &combo {
                merged.merge(alternative);
            }
            Segregation {
                and: merged.and,
                not: merged.not,
                or_groups: Some(or_groups.clone()),
            }
        })
        .collect()
}

/// Cartesian product; the first group varies slowest.
fn cartesian<T: Clone>(groups: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut combos: Vec<Vec<T>> = vec![Vec::new()];
    for group in groups {
        combos = combos
            .iter()
            .flat_map(|prefix| {
                group.iter().map(move |code| {
                    let mut next = prefix.clone();
                    next.push(code.clone());
                    next
                })
            })
            .collect();
    }
    combos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_keeps_first_group_outermost() {
        let groups = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["x".to_string(), "y".to_string()],
        ];
        let combos = cartesian(&groups);
        assert_eq!(
            combos,
            vec![vec!["a", "x"], vec!["a", "y"], vec!["b", "x"], vec!["b", "y"]]
        );
    }
}
