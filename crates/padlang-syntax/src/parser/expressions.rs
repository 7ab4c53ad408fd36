//! Expression parsing methods for the recursive-descent parser.

use super::Parser;
use crate::ast::*;
use crate::error::{ParseError, Span};
use crate::lexer::{SpannedToken, Token};
use anyhow::{Result, bail};

impl Parser {
    pub fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_logical_and()?;

        while matches!(self.peek(), Some(Token::OrOr)) {
            self.advance();
            let right = self.parse_logical_and()?;
            let span = left.span().merge(right.span());

            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::Or,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_comparison()?;

        while matches!(self.peek(), Some(Token::AndAnd)) {
            self.advance();
            let right = self.parse_comparison()?;
            let span = left.span().merge(right.span());

            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::And,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_unary()?;

        let op = match self.peek() {
            Some(Token::Eq) => BinaryOp::Eq,
            Some(Token::Ne) => BinaryOp::Ne,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Ge) => BinaryOp::Ge,
            _ => return Ok(left),
        };
        self.advance();

        let right = self.parse_unary()?;
        let span = left.span().merge(right.span());

        Ok(Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
            span,
        })
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if matches!(self.peek(), Some(Token::Bang)) {
            let start_span = self.advance().expect("peek confirmed Bang token").span;
            let expr = self.nested(start_span, Self::parse_unary)?;
            let span = start_span.merge(expr.span());

            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(expr),
                span,
            });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(st) = self.advance() else {
            bail!(ParseError::UnexpectedEof {
                expected: "expression".to_string(),
            });
        };

        match st.token {
            Token::True => Ok(Expr::Bool(true, st.span)),
            Token::False => Ok(Expr::Bool(false, st.span)),
            Token::Int(n) => Ok(Expr::Int(n, st.span)),
            Token::String(s) => Ok(Expr::String(s, st.span)),

            Token::LeftBracket => {
                let (items, end_span) = self.nested(st.span, |p| p.parse_list(Token::RightBracket))?;
                Ok(Expr::Array(items, st.span.merge(&end_span)))
            }

            Token::LeftParen => {
                let expr = self.nested(st.span, Self::parse_expression)?;
                self.expect(Token::RightParen)?;
                Ok(expr)
            }

            Token::Dollar => self.parse_reference(st.span),

            other => bail!(ParseError::UnexpectedToken {
                expected: "expression".to_string(),
                found: other.display_name(),
                span: st.span,
            }),
        }
    }

    /// Parses what follows a `$`: a variable, or a call when an argument
    /// list is attached.
    fn parse_reference(&mut self, dollar_span: Span) -> Result<Expr> {
        let (name, id_span) = match self.advance() {
            Some(SpannedToken {
                token: Token::Identifier(id),
                span,
            }) => (id, span),
            Some(st) => bail!(ParseError::UnexpectedToken {
                expected: "identifier after '$'".to_string(),
                found: st.token.display_name(),
                span: st.span,
            }),
            None => bail!(ParseError::UnexpectedEof {
                expected: "identifier after '$'".to_string(),
            }),
        };

        if let Some(Token::LeftParen) = self.peek() {
            let open_span = self.advance().expect("peek confirmed LeftParen token").span;
            let (args, end_span) = self.nested(open_span, |p| p.parse_list(Token::RightParen))?;

            return Ok(Expr::Call {
                name,
                args,
                span: dollar_span.merge(&end_span),
            });
        }

        Ok(Expr::Variable(name, dollar_span.merge(&id_span)))
    }
}
