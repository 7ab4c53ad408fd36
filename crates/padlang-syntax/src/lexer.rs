use crate::error::{LexError, Span};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

static KEYWORDS: Lazy<HashMap<&'static str, Token>> = Lazy::new(|| {
    let mut m = HashMap::with_capacity(2);
    m.insert("true", Token::True);
    m.insert("false", Token::False);
    m
});

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    True,
    False,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Comma,
    Dollar,
    Identifier(String),
    String(String),
    Int(i64),
}

impl Token {
    pub fn display_name(&self) -> String {
        match self {
            Token::True => "keyword 'true'".to_string(),
            Token::False => "keyword 'false'".to_string(),
            Token::Eq => "'=='".to_string(),
            Token::Ne => "'!='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Le => "'<='".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Ge => "'>='".to_string(),
            Token::AndAnd => "'&&'".to_string(),
            Token::OrOr => "'||'".to_string(),
            Token::Bang => "'!'".to_string(),
            Token::LeftBracket => "'['".to_string(),
            Token::RightBracket => "']'".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dollar => "'$'".to_string(),
            Token::Identifier(s) => format!("'{}'", s),
            Token::String(s) => format!("string \"{}\"", s),
            Token::Int(n) => format!("number {}", n),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut tokens = Vec::with_capacity(input.len() / 4);
    let mut chars = input.chars().peekable();

    let mut line = 1;
    let mut col = 1;
    let mut offset = 0;

    let bump = |ch: char, line: &mut usize, col: &mut usize, offset: &mut usize| {
        if ch == '\n' {
            *line += 1;
            *col = 1;
        } else {
            *col += 1;
        }
        *offset += ch.len_utf8();
    };

    while let Some(&ch) = chars.peek() {
        let start_line = line;
        let start_col = col;
        let start_offset = offset;

        macro_rules! push {
            ($token:expr) => {
                tokens.push(SpannedToken {
                    token: $token,
                    span: Span::new(start_line, start_col, start_offset, offset),
                })
            };
        }

        match ch {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);
            }

            '"' => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);

                let mut string = String::new();
                let mut escaped = false;
                let mut terminated = false;

                while let Some(&ch) = chars.peek() {
                    chars.next();
                    bump(ch, &mut line, &mut col, &mut offset);

                    if escaped {
                        string.push(match ch {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            _ => ch,
                        });
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == '"' {
                        terminated = true;
                        break;
                    } else {
                        string.push(ch);
                    }
                }

                if !terminated {
                    return Err(LexError::UnterminatedString {
                        span: Span::new(start_line, start_col, start_offset, offset),
                    });
                }

                push!(Token::String(string));
            }

            '0'..='9' => {
                let mut num_str = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
                        num_str.push(ch);
                        chars.next();
                        bump(ch, &mut line, &mut col, &mut offset);
                    } else {
                        break;
                    }
                }

                let num = num_str.parse::<i64>().map_err(|_| LexError::InvalidNumber {
                    text: num_str,
                    span: Span::new(start_line, start_col, start_offset, offset),
                })?;

                push!(Token::Int(num));
            }

            '=' => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);

                if chars.peek() == Some(&'=') {
                    chars.next();
                    bump('=', &mut line, &mut col, &mut offset);
                    push!(Token::Eq);
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: '=',
                        span: Span::new(start_line, start_col, start_offset, offset),
                        suggestion: Some("==".to_string()),
                    });
                }
            }

            '!' => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);

                if chars.peek() == Some(&'=') {
                    chars.next();
                    bump('=', &mut line, &mut col, &mut offset);
                    push!(Token::Ne);
                } else {
                    push!(Token::Bang);
                }
            }

            '<' | '>' => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);

                let or_equal = chars.peek() == Some(&'=');
                if or_equal {
                    chars.next();
                    bump('=', &mut line, &mut col, &mut offset);
                }

                push!(match (ch, or_equal) {
                    ('<', true) => Token::Le,
                    ('<', false) => Token::Lt,
                    (_, true) => Token::Ge,
                    (_, false) => Token::Gt,
                });
            }

            '&' | '|' => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);

                if chars.peek() == Some(&ch) {
                    chars.next();
                    bump(ch, &mut line, &mut col, &mut offset);
                    push!(if ch == '&' { Token::AndAnd } else { Token::OrOr });
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch,
                        span: Span::new(start_line, start_col, start_offset, offset),
                        suggestion: Some(format!("{ch}{ch}")),
                    });
                }
            }

            '[' | ']' | '(' | ')' | ',' | '$' => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);
                push!(match ch {
                    '[' => Token::LeftBracket,
                    ']' => Token::RightBracket,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    ',' => Token::Comma,
                    _ => Token::Dollar,
                });
            }

            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                        bump(ch, &mut line, &mut col, &mut offset);
                    } else {
                        break;
                    }
                }

                let token = KEYWORDS
                    .get(ident.as_str())
                    .cloned()
                    .unwrap_or(Token::Identifier(ident));
                push!(token);
            }

            _ => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);
                return Err(LexError::UnexpectedChar {
                    ch,
                    span: Span::new(start_line, start_col, start_offset, offset),
                    suggestion: None,
                });
            }
        }
    }

    Ok(tokens)
}
