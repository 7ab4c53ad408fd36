use std::fmt;

/// Renders a one-line caret diagnostic pointing at `span` inside `source`.
///
/// Rule expressions are single-line, so only the offending line is shown.
pub fn format_error_with_source(error_msg: &str, source: &str, span: Span) -> String {
    let line_idx = span.line.saturating_sub(1);

    let Some(error_line) = source.lines().nth(line_idx) else {
        return format!("{} at line {}", error_msg, span.line);
    };

    let mut output = String::new();
    output.push_str(&format!("  --> {}:{}\n", span.line, span.col));
    output.push_str(&format!("   | {}\n", error_line));
    output.push_str(&format!(
        "   | {}{} {}",
        " ".repeat(span.col.saturating_sub(1)),
        "^".repeat(span.end.saturating_sub(span.start).max(1)),
        error_msg
    ));

    output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(line: usize, col: usize, start: usize, end: usize) -> Self {
        Self { line, col, start, end }
    }

    pub fn single(line: usize, col: usize, offset: usize) -> Self {
        Self { line, col, start: offset, end: offset + 1 }
    }

    pub fn merge(&self, other: &Span) -> Self {
        Self {
            line: self.line.min(other.line),
            col: if self.line == other.line { self.col.min(other.col) } else { self.col },
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone)]
pub enum LexError {
    UnexpectedChar { ch: char, span: Span, suggestion: Option<String> },
    UnterminatedString { span: Span },
    InvalidNumber { text: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedChar { ch, suggestion, .. } => {
                write!(f, "unexpected character '{}'", ch)?;
                if let Some(s) = suggestion {
                    write!(f, " (did you mean '{}'?)", s)?;
                }
                Ok(())
            }
            LexError::UnterminatedString { .. } => {
                write!(f, "unterminated string literal")
            }
            LexError::InvalidNumber { text, .. } => {
                write!(f, "invalid number: '{}'", text)
            }
        }
    }
}

impl std::error::Error for LexError {}

#[derive(Debug, Clone)]
pub enum ParseError {
    UnexpectedToken { expected: String, found: String, span: Span },
    UnexpectedEof { expected: String },
    TrailingInput { found: String, span: Span },
    TooDeep { limit: usize, span: Span },
    LexError(LexError),
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. } => Some(*span),
            ParseError::UnexpectedEof { .. } => None,
            ParseError::TrailingInput { span, .. } => Some(*span),
            ParseError::TooDeep { span, .. } => Some(*span),
            ParseError::LexError(e) => Some(e.span()),
        }
    }

    /// Formats the error together with the offending source line, if any.
    pub fn render(&self, source: &str) -> String {
        match self.span() {
            Some(span) => format_error_with_source(&self.to_string(), source, span),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { expected, found, .. } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            ParseError::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {}", expected)
            }
            ParseError::TrailingInput { found, .. } => {
                write!(f, "unexpected {} after end of expression", found)
            }
            ParseError::TooDeep { limit, .. } => {
                write!(f, "expression nested more than {} levels deep", limit)
            }
            ParseError::LexError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::LexError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_spans_on_same_line() {
        let a = Span::new(1, 3, 2, 5);
        let b = Span::new(1, 8, 7, 10);
        assert_eq!(a.merge(&b), Span::new(1, 3, 2, 10));
    }

    #[test]
    fn render_points_at_column() {
        let err = ParseError::UnexpectedToken {
            expected: "expression".to_string(),
            found: "')'".to_string(),
            span: Span::single(1, 4, 3),
        };
        let rendered = err.render("1 =)");
        assert!(rendered.contains("--> 1:4"));
        assert!(rendered.contains("   |    ^ expected expression, found ')'"));
    }

    #[test]
    fn eof_has_no_span() {
        let err = ParseError::UnexpectedEof { expected: "')'".to_string() };
        assert!(err.span().is_none());
        assert_eq!(err.render("$f("), "unexpected end of input, expected ')'");
    }
}
