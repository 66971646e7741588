//! The built-in dialects.
//!
//! Each differs from ANSI only through its identifier/string quoting, its
//! normalization strategy, keyword additions, and a small transform table.
//! The base generator stays dialect-agnostic; everything here is a knob.

use squill_ast::{Expr, ExprKind};
use squill_gen::{Generator, Normalization, Transform, Transforms};
use squill_lexer::{LexerConfig, QuoteEscape};

use crate::Dialect;

#[derive(Debug)]
pub struct Ansi;

impl Dialect for Ansi {
    fn name(&self) -> &'static str {
        "ANSI"
    }
}

#[derive(Debug)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "POSTGRES"
    }

    fn normalization(&self) -> Normalization {
        Normalization::Lowercase
    }
}

#[derive(Debug)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "MYSQL"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn lexer_config(&self) -> LexerConfig {
        // Backticks quote identifiers; both quote styles are strings, with
        // backslash escapes.
        LexerConfig::default()
            .identifier_quote_only('`', '`')
            .with_string_quote('\'', QuoteEscape::Backslash)
            .with_string_quote('"', QuoteEscape::Backslash)
    }

    fn transforms(&self) -> Transforms {
        fn coalesce_as_ifnull(g: &Generator, e: &Expr) -> Option<String> {
            let Expr::Function { name, args, distinct: false } = e else { return None };
            if !name.eq_ignore_ascii_case("coalesce") || args.len() != 2 {
                return None;
            }
            Some(format!("IFNULL({}, {})", g.sql(&args[0]), g.sql(&args[1])))
        }
        let mut transforms = Transforms::default();
        transforms.insert(ExprKind::Function, coalesce_as_ifnull as Transform);
        transforms
    }
}

#[derive(Debug)]
pub struct BigQuery;

impl Dialect for BigQuery {
    fn name(&self) -> &'static str {
        "BIGQUERY"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn lexer_config(&self) -> LexerConfig {
        LexerConfig::default()
            .identifier_quote_only('`', '`')
            .with_string_quote('\'', QuoteEscape::Backslash)
            .with_string_quote('"', QuoteEscape::Backslash)
    }
}

#[derive(Debug)]
pub struct Snowflake;

impl Dialect for Snowflake {
    fn name(&self) -> &'static str {
        "SNOWFLAKE"
    }

    fn normalization(&self) -> Normalization {
        Normalization::Uppercase
    }
}

#[derive(Debug)]
pub struct DuckDb;

impl Dialect for DuckDb {
    fn name(&self) -> &'static str {
        "DUCKDB"
    }
}

#[derive(Debug)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "SQLITE"
    }

    fn lexer_config(&self) -> LexerConfig {
        // SQLite also accepts bracket quoting.
        LexerConfig::default().with_identifier_quote('[', ']')
    }
}

#[derive(Debug)]
pub struct Hive;

impl Dialect for Hive {
    fn name(&self) -> &'static str {
        "HIVE"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn normalization(&self) -> Normalization {
        Normalization::Lowercase
    }

    fn lexer_config(&self) -> LexerConfig {
        LexerConfig::default()
            .identifier_quote_only('`', '`')
            .with_string_quote('\'', QuoteEscape::Backslash)
            .with_string_quote('"', QuoteEscape::Backslash)
    }
}

#[derive(Debug)]
pub struct Spark;

impl Dialect for Spark {
    fn name(&self) -> &'static str {
        "SPARK"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn lexer_config(&self) -> LexerConfig {
        Hive.lexer_config()
    }
}

#[derive(Debug)]
pub struct ClickHouse;

impl Dialect for ClickHouse {
    fn name(&self) -> &'static str {
        "CLICKHOUSE"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn lexer_config(&self) -> LexerConfig {
        LexerConfig::default()
            .identifier_quote_only('`', '`')
            .with_string_quote('\'', QuoteEscape::Backslash)
    }
}

#[derive(Debug)]
pub struct Trino;

impl Dialect for Trino {
    fn name(&self) -> &'static str {
        "TRINO"
    }
}

#[derive(Debug)]
pub struct Redshift;

impl Dialect for Redshift {
    fn name(&self) -> &'static str {
        "REDSHIFT"
    }

    fn normalization(&self) -> Normalization {
        Normalization::Lowercase
    }
}

#[derive(Debug)]
pub struct Tsql;

impl Dialect for Tsql {
    fn name(&self) -> &'static str {
        "T-SQL"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('[', ']')
    }

    fn lexer_config(&self) -> LexerConfig {
        LexerConfig::default().with_identifier_quote('[', ']')
    }

    fn transforms(&self) -> Transforms {
        fn limit_as_top(g: &Generator, e: &Expr) -> Option<String> {
            let Expr::Limit { this } = e else { return None };
            Some(format!("{} {}", g.keyword("TOP"), g.sql(this)))
        }
        let mut transforms = Transforms::default();
        transforms.insert(ExprKind::Limit, limit_as_top as Transform);
        transforms
    }
}

#[derive(Debug)]
pub struct Oracle;

impl Dialect for Oracle {
    fn name(&self) -> &'static str {
        "ORACLE"
    }

    fn normalization(&self) -> Normalization {
        Normalization::Uppercase
    }
}

#[derive(Debug)]
pub struct Databricks;

impl Dialect for Databricks {
    fn name(&self) -> &'static str {
        "DATABRICKS"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn lexer_config(&self) -> LexerConfig {
        Hive.lexer_config()
    }
}

#[derive(Debug)]
pub struct Drill;

impl Dialect for Drill {
    fn name(&self) -> &'static str {
        "DRILL"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn lexer_config(&self) -> LexerConfig {
        LexerConfig::default().identifier_quote_only('`', '`')
    }

    fn transforms(&self) -> Transforms {
        // Drill federates over workspace.schema.table paths with each part
        // backtick-quoted.
        fn backtick_workspace_path(g: &Generator, e: &Expr) -> Option<String> {
            let Expr::WorkspacePath { expressions } = e else { return None };
            Some(
                expressions
                    .iter()
                    .map(|part| match part {
                        Expr::Identifier { name, .. } => format!("`{name}`"),
                        other => g.sql(other),
                    })
                    .collect::<Vec<_>>()
                    .join("."),
            )
        }
        let mut transforms = Transforms::default();
        transforms.insert(ExprKind::WorkspacePath, backtick_workspace_path as Transform);
        transforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_rewrites_two_arg_coalesce() {
        let out = MySql.format("select coalesce(a, 0) from t").unwrap();
        assert_eq!(out, "SELECT IFNULL(a, 0) FROM t");
        // Three arguments fall through to the default.
        let out = MySql.format("select coalesce(a, b, 0) from t").unwrap();
        assert_eq!(out, "SELECT COALESCE(a, b, 0) FROM t");
    }

    #[test]
    fn tsql_emits_top_for_limit() {
        let out = Ansi.transpile("select a from t limit 10", &Tsql).unwrap();
        assert_eq!(out, "SELECT a FROM t TOP 10");
    }

    #[test]
    fn drill_backticks_workspace_paths() {
        let out = Drill.format("select a from dfs.tmp.logs").unwrap();
        assert_eq!(out, "SELECT a FROM `dfs`.`tmp`.`logs`");
    }

    #[test]
    fn snowflake_uppercases_unquoted_identifiers() {
        let out = Ansi.transpile("select a from t", &Snowflake).unwrap();
        assert_eq!(out, "SELECT A FROM T");
    }

    #[test]
    fn sqlite_accepts_bracket_identifiers() {
        let out = Sqlite.format("select [my col] from t").unwrap();
        assert_eq!(out, "SELECT \"my col\" FROM t");
    }

    #[test]
    fn mysql_backslash_string_escapes() {
        let out = MySql.format(r"select 'a\'b' from t").unwrap();
        assert_eq!(out, "SELECT 'a''b' FROM t");
    }
}
