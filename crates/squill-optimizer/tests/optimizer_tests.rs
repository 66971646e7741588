//! End-to-end optimizer tests: parse, optimize, generate, compare.

use squill_gen::{GenConfig, Generator};
use squill_lexer::LexerConfig;
use squill_optimizer::{optimize, OptimizeConfig, OptimizeContext};
use squill_parser::ParserConfig;

fn parse_one(sql: &str) -> squill_ast::Expr {
    squill_parser::parse(sql, &LexerConfig::default(), &ParserConfig::default())
        .unwrap_or_else(|e| panic!("parse failed for {sql:?}: {e}"))
        .into_iter()
        .next()
        .expect("one statement")
}

fn optimized(sql: &str, config: &OptimizeConfig) -> String {
    let expr = optimize(parse_one(sql), &OptimizeContext::default(), config);
    Generator::new(GenConfig::default()).generate(&expr)
}

#[test]
fn default_preset_simplifies_where() {
    assert_eq!(
        optimized("SELECT * FROM t WHERE TRUE AND x = 5", &OptimizeConfig::default()),
        "SELECT * FROM t WHERE x = 5"
    );
}

#[test]
fn canonicalize_flips_literal_comparisons() {
    assert_eq!(
        optimized("SELECT * FROM t WHERE 5 < x", &OptimizeConfig::default()),
        "SELECT * FROM t WHERE x > 5"
    );
}

#[test]
fn unused_cte_is_eliminated() {
    assert_eq!(
        optimized(
            "WITH unused AS (SELECT 1), used AS (SELECT a FROM t) SELECT * FROM used",
            &OptimizeConfig::default(),
        ),
        "WITH used AS (SELECT a FROM t) SELECT * FROM used"
    );
}

#[test]
fn minimal_preset_only_simplifies() {
    // 5 < x stays untouched without canonicalize.
    assert_eq!(
        optimized("SELECT * FROM t WHERE 5 < x AND TRUE", &OptimizeConfig::minimal()),
        "SELECT * FROM t WHERE 5 < x"
    );
}

#[test]
fn reserved_identifier_gets_quoted() {
    assert_eq!(
        optimized("SELECT \"order\" FROM t", &OptimizeConfig::default()),
        "SELECT \"order\" FROM t"
    );
    // A bare identifier spelled like a keyword cannot reach the parser as a
    // column, but hand-built trees can carry one; quote_identifiers covers
    // names with odd characters too.
    assert_eq!(
        optimized("SELECT a FROM t", &OptimizeConfig::default()),
        "SELECT a FROM t"
    );
}

#[test]
fn aggressive_pushes_and_merges() {
    assert_eq!(
        optimized(
            "SELECT s.a FROM (SELECT a FROM t) s WHERE s.a = 1",
            &OptimizeConfig::aggressive(),
        ),
        "SELECT a FROM t WHERE a = 1"
    );
}

#[test]
fn pushdown_respects_barriers_end_to_end() {
    assert_eq!(
        optimized(
            "SELECT s.a FROM (SELECT DISTINCT a FROM t) s WHERE s.a = 1",
            &OptimizeConfig::aggressive(),
        ),
        "SELECT s.a FROM (SELECT DISTINCT a FROM t) AS s WHERE s.a = 1"
    );
}

#[test]
fn full_pipeline_is_idempotent() {
    let samples = [
        "SELECT * FROM t WHERE TRUE AND x = 5",
        "SELECT s.a FROM (SELECT a, b FROM t) s WHERE s.a = 1",
        "WITH unused AS (SELECT 1), used AS (SELECT a FROM t) SELECT * FROM used",
        "SELECT a FROM t WHERE NOT (x = 1 AND y = 2)",
        "SELECT a FROM t1 UNION ALL SELECT a FROM t2",
    ];
    for sql in samples {
        let ctx = OptimizeContext::default();
        let config = OptimizeConfig::aggressive();
        let once = optimize(parse_one(sql), &ctx, &config);
        let twice = optimize(once.clone(), &ctx, &config);
        assert_eq!(twice, once, "pipeline not idempotent for {sql:?}");
    }
}

#[test]
fn normalize_predicates_applies_de_morgan() {
    let config = OptimizeConfig {
        normalize_predicates: true,
        ..OptimizeConfig::minimal()
    };
    assert_eq!(
        optimized("SELECT a FROM t WHERE NOT (x = 1 AND y = 2)", &config),
        "SELECT a FROM t WHERE x <> 1 OR y <> 2"
    );
}

#[test]
fn optimizer_preserves_order_by() {
    assert_eq!(
        optimized(
            "SELECT a FROM t WHERE TRUE AND b = 2 ORDER BY a DESC LIMIT 3",
            &OptimizeConfig::aggressive(),
        ),
        "SELECT a FROM t WHERE b = 2 ORDER BY a DESC LIMIT 3"
    );
}
