//! Recursive-descent parser.
//!
//! ```text
//! or      := and ('|' and)*
//! and     := unary ('&' unary)*
//! unary   := '~' unary | primary
//! primary := CODE | '(' or ')'
//! ```

use crate::ast::Expr;
use crate::error::{ExpressionError, Result};
use crate::lexer::{Spanned, Token, tokenize};

/// Parse an availability expression. The empty string parses to [`Expr::always`].
pub fn parse(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(Expr::always());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(spanned) => Err(ExpressionError::UnexpectedToken {
            offset: spanned.offset,
            found: spanned.token.to_string(),
        }),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek().is_some_and(|spanned| &spanned.token == token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut items = vec![self.parse_and()?];
        while self.eat(&Token::Or) {
            items.push(self.parse_and()?);
        }
        Ok(collapse(items, Expr::Or))
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut items = vec![self.parse_unary()?];
        while self.eat(&Token::And) {
            items.push(self.parse_unary()?);
        }
        Ok(collapse(items, Expr::And))
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(spanned) = self.tokens.get(self.pos).cloned() else {
            return Err(ExpressionError::UnexpectedEnd {
                expected: "a code or '('",
            });
        };
        self.pos += 1;
        match spanned.token {
            Token::Code(code) => Ok(Expr::Code(code)),
            Token::LParen => {
                let inner = self.parse_or()?;
                if self.eat(&Token::RParen) {
                    Ok(inner)
                } else {
                    Err(ExpressionError::UnclosedParen {
                        offset: spanned.offset,
                    })
                }
            }
            other => Err(ExpressionError::UnexpectedToken {
                offset: spanned.offset,
                found: other.to_string(),
            }),
        }
    }
}

fn collapse(mut items: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    if items.len() == 1 {
        items.remove(0)
    } else {
        wrap(items)
    }
}
