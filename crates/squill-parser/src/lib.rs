// Squill parser: token stream -> expression tree.
//
// Statement grammar is recursive descent; expressions use an iterative
// operator-precedence climb so deep operator chains cannot overflow the
// native call stack. Error handling is policy-driven: immediate, raise,
// warn, or ignore, with skip-to-statement-boundary recovery.

pub mod error;
mod parser;

pub use error::{ErrorLevel, ParseError, ParseErrorKind, ParseErrors, ParserConfig};

use squill_ast::Expr;
use squill_common::Token;
use squill_lexer::{Lexer, LexerConfig};

/// Parse SQL text into a list of statements.
///
/// The lexer configuration decides quoting and keywords (the dialect's
/// contribution); the parser configuration decides the error policy.
pub fn parse(
    sql: &str,
    lexer_config: &LexerConfig,
    config: &ParserConfig,
) -> Result<Vec<Expr>, ParseErrors> {
    let tokens = Lexer::tokenize(sql, lexer_config);
    parse_tokens(tokens, sql, config)
}

/// Parse an already-lexed token stream. `source` is only used for error
/// snippets.
pub fn parse_tokens(
    tokens: Vec<Token>,
    source: &str,
    config: &ParserConfig,
) -> Result<Vec<Expr>, ParseErrors> {
    let mut parser = parser::Parser::new(tokens, source, config.clone());
    let (statements, errors) = parser.parse_statements();
    match config.error_level {
        ErrorLevel::Immediate | ErrorLevel::Raise => {
            if errors.is_empty() {
                Ok(statements)
            } else {
                Err(ParseErrors::new(errors))
            }
        }
        ErrorLevel::Warn => {
            for err in &errors {
                log::warn!("{err}");
            }
            Ok(statements)
        }
        ErrorLevel::Ignore => Ok(statements),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squill_ast::{Expr, ExprKind};

    fn parse_ok(sql: &str) -> Vec<Expr> {
        parse(sql, &LexerConfig::default(), &ParserConfig::default())
            .unwrap_or_else(|e| panic!("parse failed for {sql:?}: {e}"))
    }

    fn parse_one(sql: &str) -> Expr {
        let mut stmts = parse_ok(sql);
        assert_eq!(stmts.len(), 1, "expected one statement in {sql:?}");
        stmts.pop().unwrap()
    }

    #[test]
    fn empty_input_yields_no_statements() {
        assert!(parse_ok("").is_empty());
        assert!(parse_ok("   -- just a comment\n").is_empty());
        assert!(parse_ok(";;;").is_empty());
    }

    #[test]
    fn simple_select_shape() {
        let stmt = parse_one("select a, b from t where x = 1");
        let Expr::Select { projections, from, r#where, .. } = stmt else {
            panic!("expected Select");
        };
        assert_eq!(projections.len(), 2);
        assert!(from.is_some());
        let where_clause = r#where.expect("where clause");
        let Expr::Where { this } = *where_clause else { panic!("expected Where") };
        assert_eq!(this.kind(), ExprKind::Eq);
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let stmt = parse_one("select 1 + 2 * 3");
        let Expr::Select { projections, .. } = stmt else { panic!() };
        let Expr::Add { right, .. } = &projections[0] else {
            panic!("expected Add at the top");
        };
        assert_eq!(right.kind(), ExprKind::Mul);
    }

    #[test]
    fn same_precedence_is_left_associative() {
        let stmt = parse_one("select 1 - 2 + 3");
        let Expr::Select { projections, .. } = stmt else { panic!() };
        let Expr::Add { left, .. } = &projections[0] else {
            panic!("expected Add at the top");
        };
        assert_eq!(left.kind(), ExprKind::Sub);
    }

    #[test]
    fn comparisons_bind_tighter_than_and() {
        let stmt = parse_one("select * from t where a = 1 and b = 2");
        let Expr::Select { r#where, .. } = stmt else { panic!() };
        let Expr::Where { this } = *r#where.unwrap() else { panic!() };
        let Expr::And { left, right } = *this else { panic!("expected And") };
        assert_eq!(left.kind(), ExprKind::Eq);
        assert_eq!(right.kind(), ExprKind::Eq);
    }

    #[test]
    fn between_owns_its_and() {
        let stmt = parse_one("select * from t where a between 1 and 2 and b");
        let Expr::Select { r#where, .. } = stmt else { panic!() };
        let Expr::Where { this } = *r#where.unwrap() else { panic!() };
        let Expr::And { left, .. } = *this else { panic!("expected outer And") };
        assert_eq!(left.kind(), ExprKind::Between);
    }

    #[test]
    fn like_does_not_absorb_and() {
        let stmt = parse_one("select * from t where x like 'a%' and y");
        let Expr::Select { r#where, .. } = stmt else { panic!() };
        let Expr::Where { this } = *r#where.unwrap() else { panic!() };
        let Expr::And { left, .. } = *this else { panic!("expected And") };
        assert_eq!(left.kind(), ExprKind::Like);
    }

    #[test]
    fn not_binds_below_comparison() {
        let stmt = parse_one("select * from t where not a = 1");
        let Expr::Select { r#where, .. } = stmt else { panic!() };
        let Expr::Where { this } = *r#where.unwrap() else { panic!() };
        let Expr::Not { this } = *this else { panic!("expected Not") };
        assert_eq!(this.kind(), ExprKind::Eq);
    }

    #[test]
    fn is_null_and_is_not_null() {
        let stmt = parse_one("select * from t where a is null and b is not null");
        let Expr::Select { r#where, .. } = stmt else { panic!() };
        let Expr::Where { this } = *r#where.unwrap() else { panic!() };
        let Expr::And { left, right } = *this else { panic!() };
        assert_eq!(left.kind(), ExprKind::IsNull);
        assert_eq!(right.kind(), ExprKind::IsNotNull);
    }

    #[test]
    fn in_list_and_in_subquery() {
        let stmt = parse_one("select * from t where a in (1, 2) and b in (select x from u)");
        let Expr::Select { r#where, .. } = stmt else { panic!() };
        let Expr::Where { this } = *r#where.unwrap() else { panic!() };
        let Expr::And { left, right } = *this else { panic!() };
        assert_eq!(left.kind(), ExprKind::InList);
        assert_eq!(right.kind(), ExprKind::InSubquery);
    }

    #[test]
    fn count_star_parses() {
        let stmt = parse_one("SELECT COUNT(*) FROM t");
        let Expr::Select { projections, .. } = stmt else { panic!() };
        let Expr::Function { name, args, .. } = &projections[0] else {
            panic!("expected function");
        };
        assert_eq!(name, "COUNT");
        assert_eq!(args, &vec![Expr::Star]);
    }

    #[test]
    fn keyword_as_function_name() {
        let stmt = parse_one("SELECT REPLACE(a, 'x', 'y') FROM t");
        let Expr::Select { projections, .. } = stmt else { panic!() };
        let Expr::Function { name, args, .. } = &projections[0] else {
            panic!("expected function");
        };
        assert_eq!(name, "REPLACE");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn union_all_and_union() {
        let stmt = parse_one("select a from t1 union all select a from t2 union select a from t3");
        // Left-associative: (t1 UNION ALL t2) UNION t3.
        let Expr::Union { left, distinct, .. } = stmt else { panic!() };
        assert!(distinct);
        let Expr::Union { distinct: inner, .. } = *left else { panic!() };
        assert!(!inner);
    }

    #[test]
    fn with_binds_ctes_in_order() {
        let stmt = parse_one("with a as (select 1), b as (select 2) select * from a");
        let Expr::With { ctes, recursive, .. } = stmt else { panic!() };
        assert!(!recursive);
        assert_eq!(ctes.len(), 2);
        let Expr::Cte { alias, .. } = &ctes[0] else { panic!() };
        assert_eq!(alias.name(), Some("a"));
    }

    #[test]
    fn derived_table_alias_lands_on_subquery() {
        let stmt = parse_one("select * from (select a from t) s");
        let Expr::Select { from, .. } = stmt else { panic!() };
        let Expr::From { expressions } = *from.unwrap() else { panic!() };
        let Expr::Subquery { alias, .. } = &expressions[0] else {
            panic!("expected Subquery");
        };
        assert_eq!(alias.as_ref().and_then(|a| a.name()), Some("s"));
    }

    #[test]
    fn parenthesized_group_is_paren_not_subquery() {
        let stmt = parse_one("select (1 + 2) * 3");
        let Expr::Select { projections, .. } = stmt else { panic!() };
        let Expr::Mul { left, .. } = &projections[0] else { panic!() };
        assert_eq!(left.kind(), ExprKind::Paren);
    }

    #[test]
    fn scalar_subquery_in_expression_position() {
        let stmt = parse_one("select (select max(x) from t)");
        let Expr::Select { projections, .. } = stmt else { panic!() };
        assert_eq!(projections[0].kind(), ExprKind::Subquery);
    }

    #[test]
    fn qualified_column_and_star() {
        let stmt = parse_one("select t.a, t.* from t");
        let Expr::Select { projections, .. } = stmt else { panic!() };
        let Expr::Column { table, this } = &projections[0] else { panic!() };
        assert_eq!(table.as_ref().and_then(|t| t.name()), Some("t"));
        assert_eq!(this.name(), Some("a"));
        let Expr::Column { this: star, .. } = &projections[1] else { panic!() };
        assert_eq!(star.kind(), ExprKind::Star);
    }

    #[test]
    fn quoted_identifier_round_trip() {
        let stmt = parse_one(r#"select "order" from t"#);
        let Expr::Select { projections, .. } = stmt else { panic!() };
        let Expr::Column { this, .. } = &projections[0] else { panic!() };
        let Expr::Identifier { name, quoted } = this.as_ref() else { panic!() };
        assert_eq!(name, "order");
        assert!(quoted);
    }

    #[test]
    fn deep_addition_chain_parses_iteratively() {
        let mut sql = String::from("select a");
        for _ in 0..5000 {
            sql.push_str(" + a");
        }
        let stmt = parse_one(&sql);
        assert_eq!(stmt.kind(), ExprKind::Select);
    }

    #[test]
    fn nesting_cap_reports_an_error() {
        let config = ParserConfig { max_nesting: 16, ..ParserConfig::default() };
        let sql = format!("select {}1{}", "(".repeat(64), ")".repeat(64));
        let err = parse(&sql, &LexerConfig::default(), &config).unwrap_err();
        assert_eq!(err.first().kind, ParseErrorKind::NestingLimitExceeded);
    }

    #[test]
    fn error_carries_location_and_snippet() {
        let err = parse(
            "select a,\nfrom t",
            &LexerConfig::default(),
            &ParserConfig::default(),
        )
        .unwrap_err();
        let first = err.first();
        assert_eq!(first.line, 2);
        assert_eq!(first.snippet, "from t");
    }

    #[test]
    fn raise_collects_multiple_errors() {
        let err = parse(
            "select ; select ; select 1",
            &LexerConfig::default(),
            &ParserConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn immediate_stops_at_first_error() {
        let config = ParserConfig {
            error_level: ErrorLevel::Immediate,
            ..ParserConfig::default()
        };
        let err = parse("select ; select ;", &LexerConfig::default(), &config).unwrap_err();
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn ignore_recovers_and_returns_good_statements() {
        let config = ParserConfig {
            error_level: ErrorLevel::Ignore,
            ..ParserConfig::default()
        };
        let stmts = parse("select ; select 1", &LexerConfig::default(), &config).unwrap();
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn max_errors_caps_collection() {
        let config = ParserConfig { max_errors: 1, ..ParserConfig::default() };
        let err = parse(
            "select ; select ; select ;",
            &LexerConfig::default(),
            &config,
        )
        .unwrap_err();
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn insert_update_delete_shapes() {
        let stmt = parse_one("insert into t (a, b) values (1, 2), (3, 4)");
        let Expr::Insert { columns, source, .. } = stmt else { panic!() };
        assert_eq!(columns.len(), 2);
        let Expr::Values { rows } = *source else { panic!() };
        assert_eq!(rows.len(), 2);

        let stmt = parse_one("update t set a = 1, b = b + 1 where id = 3");
        let Expr::Update { assignments, r#where, .. } = stmt else { panic!() };
        assert_eq!(assignments.len(), 2);
        assert!(r#where.is_some());

        let stmt = parse_one("delete from t where id = 3");
        assert_eq!(stmt.kind(), ExprKind::Delete);
    }

    #[test]
    fn create_table_with_constraints() {
        let stmt = parse_one(
            "create table t (id int not null, name varchar(20) default 'x', primary key (id))",
        );
        let Expr::Create { kind, columns, .. } = stmt else { panic!() };
        assert_eq!(kind, "TABLE");
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[2].kind(), ExprKind::PrimaryKey);
        let Expr::ColumnDef { nullable, .. } = &columns[0] else { panic!() };
        assert!(!nullable);
    }

    #[test]
    fn alter_table_actions() {
        let stmt = parse_one("alter table t add column c int, drop column d");
        let Expr::Alter { actions, .. } = stmt else { panic!() };
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind(), ExprKind::AddColumn);
        assert_eq!(actions[1].kind(), ExprKind::DropColumn);
    }

    #[test]
    fn window_function_over_clause() {
        let stmt = parse_one("select sum(x) over (partition by g order by y desc) from t");
        let Expr::Select { projections, .. } = stmt else { panic!() };
        let Expr::Window { partition_by, order_by, .. } = &projections[0] else {
            panic!("expected Window");
        };
        assert_eq!(partition_by.len(), 1);
        let Expr::Ordered { desc, .. } = &order_by[0] else { panic!() };
        assert!(desc);
    }

    #[test]
    fn multiple_statements_split_on_semicolons() {
        let stmts = parse_ok("select 1; select 2;\nselect 3");
        assert_eq!(stmts.len(), 3);
    }
}
