// Squill -- a multi-dialect SQL processing library.
//
// Text goes in, a typed expression tree comes out, optionally rewritten by
// the optimizer, and back to text in the same or another dialect:
//
//   text -> Lexer -> [Token] -> Parser -> Expr -> (optimize) -> Generator -> text
//
// This crate is the facade: the convenience functions below run the whole
// pipeline against a dialect name resolved through the registry. The
// pieces are separately usable via the re-exports.

use std::fmt;

pub use squill_ast::{Expr, ExprKind};
pub use squill_common::{KeywordTrie, LineIndex, Span, Token, TokenCategory, TokenKind};
pub use squill_dialects::{lookup, register, Dialect, DialectNotFound, DialectRegistry};
pub use squill_gen::{GenConfig, Generator, Normalization, Transforms};
pub use squill_lexer::{Lexer, LexerConfig, QuoteEscape};
pub use squill_optimizer::{OptimizeConfig, OptimizeContext, Schema, Scope, ScopeKind};
pub use squill_parser::{ErrorLevel, ParseError, ParseErrors, ParserConfig};

/// Everything that can go wrong at the facade level.
#[derive(Debug)]
pub enum Error {
    Parse(ParseErrors),
    Dialect(DialectNotFound),
    /// `parse_one` on input with no statements.
    EmptyInput,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::Dialect(e) => write!(f, "{e}"),
            Error::EmptyInput => write!(f, "no statement found in input"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseErrors> for Error {
    fn from(e: ParseErrors) -> Self {
        Error::Parse(e)
    }
}

impl From<DialectNotFound> for Error {
    fn from(e: DialectNotFound) -> Self {
        Error::Dialect(e)
    }
}

fn resolve(dialect: Option<&str>) -> Result<std::sync::Arc<dyn Dialect>, Error> {
    Ok(lookup(dialect.unwrap_or("ANSI"))?)
}

/// Parse SQL text into a list of statements. `dialect` is a
/// case-insensitive registry name, defaulting to ANSI.
pub fn parse(sql: &str, dialect: Option<&str>) -> Result<Vec<Expr>, Error> {
    Ok(resolve(dialect)?.parse(sql)?)
}

/// Parse and return the first statement; empty input is an error.
pub fn parse_one(sql: &str, dialect: Option<&str>) -> Result<Expr, Error> {
    resolve(dialect)?
        .parse_one(sql)?
        .ok_or(Error::EmptyInput)
}

/// Generate SQL text for a tree in the given dialect.
pub fn generate(expr: &Expr, dialect: Option<&str>) -> Result<String, Error> {
    Ok(resolve(dialect)?.generate(expr, &GenConfig::default()))
}

/// Parse and re-emit in canonical form.
pub fn format(sql: &str, dialect: Option<&str>) -> Result<String, Error> {
    Ok(resolve(dialect)?.format(sql)?)
}

/// Parse in `source` dialect, emit in `target` dialect.
pub fn transpile(sql: &str, source: &str, target: &str) -> Result<String, Error> {
    let source = lookup(source)?;
    let target = lookup(target)?;
    Ok(source.transpile(sql, target.as_ref())?)
}

/// Optimize a tree under a dialect's context. Without a config, the
/// default preset applies.
pub fn optimize(
    expr: Expr,
    dialect: Option<&str>,
    config: Option<&OptimizeConfig>,
) -> Result<Expr, Error> {
    let dialect = resolve(dialect)?;
    let default = OptimizeConfig::default();
    Ok(dialect.optimize(expr, config.unwrap_or(&default)))
}

/// Parse the first statement and optimize it.
pub fn parse_and_optimize(
    sql: &str,
    dialect: Option<&str>,
    config: Option<&OptimizeConfig>,
) -> Result<Expr, Error> {
    let expr = parse_one(sql, dialect)?;
    optimize(expr, dialect, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_dialect_errors() {
        let err = format("select 1", Some("no_such")).unwrap_err();
        assert!(matches!(err, Error::Dialect(_)));
    }

    #[test]
    fn empty_input_behaviors() {
        assert!(parse("", None).unwrap().is_empty());
        assert!(parse("   -- comment only", None).unwrap().is_empty());
        assert!(matches!(parse_one("", None), Err(Error::EmptyInput)));
    }

    #[test]
    fn generate_of_null_literal() {
        assert_eq!(generate(&Expr::Null, None).unwrap(), "NULL");
    }

    #[test]
    fn parse_errors_surface_through_the_facade() {
        let err = parse("select from t", None).unwrap_err();
        let Error::Parse(errors) = err else { panic!("expected parse error") };
        assert_eq!(errors.first().line, 1);
    }
}
