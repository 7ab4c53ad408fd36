mod expressions;

use crate::ast::Expr;
use crate::error::{ParseError, Span};
use crate::lexer::{SpannedToken, Token, tokenize};
use anyhow::{Result, bail};

/// How deep `!`, parentheses, arrays and argument lists may nest.
pub const MAX_NESTING: usize = 128;

/// Recursive-descent parser for rule expressions.
///
/// Consumes a sequence of [`SpannedToken`]s and produces a single [`Expr`].
/// Use the free function [`parse()`] for a convenient entry point.
pub struct Parser {
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
    depth: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    /// Runs `parse` one nesting level deeper, failing past [`MAX_NESTING`].
    pub(super) fn nested<T>(&mut self, opened_at: Span, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            bail!(ParseError::TooDeep {
                limit: MAX_NESTING,
                span: opened_at,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    #[inline]
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|st| &st.token)
    }

    #[inline]
    pub(super) fn advance(&mut self) -> Option<SpannedToken> {
        if self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    pub(super) fn expect(&mut self, expected: Token) -> Result<Span> {
        match self.advance() {
            Some(st) if st.token == expected => Ok(st.span),
            Some(st) => bail!(ParseError::UnexpectedToken {
                expected: expected.display_name(),
                found: st.token.display_name(),
                span: st.span,
            }),
            None => bail!(ParseError::UnexpectedEof {
                expected: expected.display_name(),
            }),
        }
    }

    /// Parses a comma separated list of expressions up to (and including)
    /// the `close` token. The opening token must already be consumed.
    pub(super) fn parse_list(&mut self, close: Token) -> Result<(Vec<Expr>, Span)> {
        let mut items = Vec::new();

        if self.peek() == Some(&close) {
            let end = self.expect(close)?;
            return Ok((items, end));
        }

        loop {
            items.push(self.parse_expression()?);

            if matches!(self.peek(), Some(Token::Comma)) {
                self.advance();
            } else {
                break;
            }
        }

        let end = self.expect(close)?;
        Ok((items, end))
    }
}

/// Parses a token stream into a single [`Expr`].
///
/// The whole stream must be consumed. Errors are returned as
/// `anyhow::Error` wrapping a [`ParseError`].
pub fn parse(tokens: Vec<SpannedToken>) -> Result<Expr> {
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expression()?;

    if let Some(st) = parser.advance() {
        bail!(ParseError::TrailingInput {
            found: st.token.display_name(),
            span: st.span,
        });
    }

    Ok(expr)
}

/// Tokenizes and parses `source` in one step.
pub fn parse_str(source: &str) -> Result<Expr> {
    let tokens = tokenize(source).map_err(ParseError::from)?;
    parse(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    #[test]
    fn test_parse_equality() {
        let expr = parse_str("1 == 1").unwrap();
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::Eq, .. }));
    }

    #[test]
    fn test_parse_call_with_array_argument() {
        let expr = parse_str(r#"$hasFileExtensions([".ts", ".rs"])"#).unwrap();
        let (name, args) = expr.as_call().unwrap();
        assert_eq!(name, "hasFileExtensions");
        assert_eq!(args.len(), 1);
        assert!(matches!(&args[0], Expr::Array(items, _) if items.len() == 2));
    }

    #[test]
    fn test_parse_empty_input_fails() {
        let err = parse_str("").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_parse_trailing_tokens_fail() {
        let err = parse_str("1 1").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::TrailingInput { .. })
        ));
    }

    #[test]
    fn test_nesting_at_limit_parses() {
        let src = format!("{}true", "!".repeat(MAX_NESTING));
        assert!(parse_str(&src).is_ok());
    }

    #[test]
    fn test_nesting_past_limit_fails() {
        let src = format!("{}true", "!".repeat(MAX_NESTING + 1));
        let err = parse_str(&src).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::TooDeep { limit: MAX_NESTING, .. })
        ));
    }
}
