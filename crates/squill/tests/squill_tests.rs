//! Whole-pipeline tests: the canonical formatting scenarios, the
//! round-trip guarantee, and cross-dialect transpilation.

use insta::assert_snapshot;
use squill::{format, parse_and_optimize, transpile, OptimizeConfig};

fn optimized(sql: &str, config: OptimizeConfig) -> String {
    let expr = parse_and_optimize(sql, None, Some(&config)).expect("parse and optimize");
    squill::generate(&expr, None).expect("generate")
}

// ── Canonical formatting ───────────────────────────────────────────────

#[test]
fn canonical_select() {
    assert_snapshot!(
        format("select a,b from t where x=1", None).unwrap(),
        @"SELECT a, b FROM t WHERE x = 1"
    );
}

#[test]
fn count_star() {
    assert_snapshot!(
        format("SELECT COUNT(*) FROM t", None).unwrap(),
        @"SELECT COUNT(*) FROM t"
    );
}

#[test]
fn union_all() {
    assert_snapshot!(
        format("SELECT a FROM t1 UNION ALL SELECT a FROM t2", None).unwrap(),
        @"SELECT a FROM t1 UNION ALL SELECT a FROM t2"
    );
}

#[test]
fn with_cte() {
    assert_snapshot!(
        format("WITH c AS (SELECT 1 AS x) SELECT x FROM c", None).unwrap(),
        @"WITH c AS (SELECT 1 AS x) SELECT x FROM c"
    );
}

#[test]
fn optimize_default_simplifies() {
    assert_snapshot!(
        optimized("SELECT * FROM t WHERE TRUE AND x = 5", OptimizeConfig::default()),
        @"SELECT * FROM t WHERE x = 5"
    );
}

#[test]
fn optimize_canonicalizes_comparison() {
    assert_snapshot!(
        optimized("SELECT * FROM t WHERE 5 < x", OptimizeConfig::default()),
        @"SELECT * FROM t WHERE x > 5"
    );
}

#[test]
fn optimize_eliminates_unused_cte() {
    assert_snapshot!(
        optimized(
            "WITH unused AS (SELECT 1), used AS (SELECT a FROM t) SELECT * FROM used",
            OptimizeConfig::default()
        ),
        @"WITH used AS (SELECT a FROM t) SELECT * FROM used"
    );
}

// ── Round-trip stability ───────────────────────────────────────────────

#[test]
fn round_trip_is_stable() {
    let queries = [
        "select a, b from t where x = 1 and y like 'a%'",
        "select distinct a from t order by a desc limit 10 offset 5",
        "select count(*), max(b) from t group by a having count(*) > 1",
        "select t.a, u.b from t inner join u on t.id = u.id",
        "select a from t1 union all select a from t2",
        "with c as (select 1 as x) select x from c",
        "select case when a > 1 then 'big' else 'small' end from t",
        "select cast(a as int), b::varchar from t",
        "select * from t where a between 1 and 10 and b in (1, 2, 3)",
        "select a from t where b is null and c is not null",
        "select sum(x) over (partition by g order by y) from t",
        "insert into t (a, b) values (1, 2)",
        "update t set a = 1 where id = 2",
        "delete from t where id = 3",
        "create table t (id int not null, name varchar(20))",
        "drop table if exists t",
        "select \"quoted name\" from t",
        "select -x + 3 from t",
        "select a from (select a from u) sub where sub.a > 0",
        "select exists (select 1 from t) from u",
    ];
    for sql in queries {
        let first = format(sql, None).unwrap();
        let second = format(&first, None).unwrap();
        assert_eq!(second, first, "round trip unstable for {sql:?}");
    }
}

#[test]
fn round_trip_across_dialects() {
    let queries = [
        "select a from t where x = 1",
        "select `my col` from `my table`",
    ];
    for sql in queries {
        let first = format(sql, Some("mysql")).unwrap();
        let second = format(&first, Some("mysql")).unwrap();
        assert_eq!(second, first, "mysql round trip unstable for {sql:?}");
    }
}

// ── Transpilation ──────────────────────────────────────────────────────

#[test]
fn transpile_requoting() {
    assert_snapshot!(
        transpile(r#"select "col a" from t"#, "ansi", "mysql").unwrap(),
        @"SELECT `col a` FROM t"
    );
    assert_snapshot!(
        transpile("select `col a` from t", "mysql", "ansi").unwrap(),
        @r#"SELECT "col a" FROM t"#
    );
}

#[test]
fn transpile_is_identity_within_a_dialect() {
    let sql = "SELECT a, b FROM t WHERE x = 1";
    assert_eq!(transpile(sql, "ansi", "ansi").unwrap(), sql);
}

// ── Aggressive optimization end to end ─────────────────────────────────

#[test]
fn aggressive_pipeline_flattens() {
    assert_snapshot!(
        optimized(
            "SELECT s.a FROM (SELECT a, b FROM t) s WHERE TRUE AND s.a = 1",
            OptimizeConfig::aggressive()
        ),
        @"SELECT a FROM t WHERE a = 1"
    );
}
