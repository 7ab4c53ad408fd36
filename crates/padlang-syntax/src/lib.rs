//! # padlang syntax
//!
//! Lexer, parser, and expression tree for the padlang rule language.
//!
//! ## Overview
//!
//! Rules attached to pull-request workflows are single expressions:
//!
//! - **Lexer**: Tokenizes an expression into a stream of tokens
//! - **Parser**: Builds an [`Expr`] tree using recursive descent
//! - **AST**: Type-safe representation of one rule expression or action call
//!
//! ## Example
//!
//! ```rust
//! use padlang_syntax::{tokenize, parse};
//!
//! let tokens = tokenize(r#"$author() == "jane" && !$isDraft()"#).expect("Tokenization failed");
//! let expr = parse(tokens).expect("Parsing failed");
//!
//! assert!(matches!(expr, padlang_syntax::Expr::Binary { .. }));
//! ```
//!
//! ## Grammar Overview
//!
//! ```text
//! expr    := or
//! or      := and ( "||" and )*
//! and     := cmp ( "&&" cmp )*
//! cmp     := unary ( ( "==" | "!=" | "<" | "<=" | ">" | ">=" ) unary )?
//! unary   := "!" unary | primary
//! primary := INT | STRING | "true" | "false" | "[" list "]"
//!          | "$" IDENT ( "(" list ")" )? | "(" expr ")"
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use error::{LexError, ParseError, Span};
pub use lexer::{SpannedToken, Token, tokenize};
pub use parser::{MAX_NESTING, parse, parse_str};
