use std::fmt;

use squill_common::span::LineIndex;

/// What the parser does when it hits an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorLevel {
    /// Fail at the first error.
    Immediate,
    /// Collect errors and surface them as warnings; parsing still succeeds.
    Warn,
    /// Collect errors, fail once parsing completes.
    #[default]
    Raise,
    /// Collect errors silently; parsing succeeds.
    Ignore,
}

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub error_level: ErrorLevel,
    /// Stop collecting errors past this count. Must be at least 1.
    pub max_errors: usize,
    /// Nesting depth cap; exceeding it is an error, not a stack overflow.
    pub max_nesting: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            error_level: ErrorLevel::Raise,
            max_errors: 100,
            max_nesting: 1024,
        }
    }
}

/// The specific kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Expected one thing, saw another.
    UnexpectedToken,
    /// Statement truncated.
    UnexpectedEof,
    /// The nesting depth cap was reached.
    NestingLimitExceeded,
    /// The lexer emitted an Unknown token and the parser reached it.
    UnknownToken,
}

/// A parse error with location and a one-line snippet of the source.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: u32,
    pub col: u32,
    /// The offending source line.
    pub snippet: String,
}

impl ParseError {
    /// Build an error pointing at `(line, col)`, slicing the snippet out of
    /// the original source.
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        line: u32,
        col: u32,
        source: &str,
    ) -> Self {
        let index = LineIndex::new(source);
        let snippet = index
            .line_range(line, source)
            .map(|(start, end)| source[start as usize..end as usize].to_string())
            .unwrap_or_default();
        Self {
            kind,
            message: message.into(),
            line,
            col,
            snippet,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} at line {}, col {}", self.message, self.line, self.col)?;
        writeln!(f, "  {}", self.snippet)?;
        write!(f, "  {}^", " ".repeat(self.col.saturating_sub(1) as usize))
    }
}

impl std::error::Error for ParseError {}

/// All errors from one parse, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseErrors {
    pub errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new(errors: Vec<ParseError>) -> Self {
        Self { errors }
    }

    pub fn first(&self) -> &ParseError {
        &self.errors[0]
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_points_at_column() {
        let err = ParseError::new(
            ParseErrorKind::UnexpectedToken,
            "expected FROM",
            1,
            8,
            "select ,",
        );
        let rendered = err.to_string();
        assert!(rendered.contains("line 1, col 8"));
        assert!(rendered.contains("select ,"));
        assert!(rendered.ends_with("       ^"));
    }

    #[test]
    fn snippet_is_the_right_line() {
        let err = ParseError::new(
            ParseErrorKind::UnexpectedEof,
            "statement truncated",
            2,
            1,
            "select 1;\nselect",
        );
        assert_eq!(err.snippet, "select");
    }

    #[test]
    fn defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.error_level, ErrorLevel::Raise);
        assert_eq!(config.max_errors, 100);
        assert_eq!(config.max_nesting, 1024);
    }
}
