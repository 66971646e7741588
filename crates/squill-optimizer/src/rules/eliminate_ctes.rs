//! Remove CTEs that nothing references.

use squill_ast::Expr;

use super::Rule;
use crate::scope::Scope;
use crate::OptimizeContext;

pub struct EliminateCtes;

impl Rule for EliminateCtes {
    fn name(&self) -> &'static str {
        "eliminate_ctes"
    }

    fn apply(&self, expr: Expr, _ctx: &OptimizeContext) -> Expr {
        expr.transform(&mut |e| match e {
            with @ Expr::With { .. } => eliminate(with),
            other => other,
        })
    }
}

/// Drop zero-reference CTEs from a WITH, repeating until stable: a CTE kept
/// alive only by another dead CTE goes away on a later round. When the list
/// empties, the WITH unwraps to its inner query.
fn eliminate(mut node: Expr) -> Expr {
    loop {
        let scope = Scope::build(&node);
        let (ctes, this, recursive) = match node {
            Expr::With { ctes, this, recursive } => (ctes, this, recursive),
            other => return other,
        };
        let before = ctes.len();
        let kept: Vec<Expr> = ctes
            .into_iter()
            .filter(|cte| match cte {
                Expr::Cte { alias, .. } => {
                    let name = alias.name().unwrap_or_default();
                    scope.ref_count(name) > 0
                }
                _ => true,
            })
            .collect();
        if kept.is_empty() {
            return *this;
        }
        let removed = before - kept.len();
        node = Expr::With { ctes: kept, this, recursive };
        if removed == 0 {
            return node;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(sql: &str) -> Expr {
        squill_parser::parse(
            sql,
            &squill_lexer::LexerConfig::default(),
            &squill_parser::ParserConfig::default(),
        )
        .expect("parse")
        .into_iter()
        .next()
        .expect("one statement")
    }

    fn run(sql: &str) -> Expr {
        EliminateCtes.apply(parse_one(sql), &OptimizeContext::default())
    }

    #[test]
    fn drops_unused_cte() {
        let out = run("with unused as (select 1), used as (select a from t) select * from used");
        let Expr::With { ctes, .. } = out else { panic!("expected With") };
        assert_eq!(ctes.len(), 1);
        let Expr::Cte { alias, .. } = &ctes[0] else { panic!() };
        assert_eq!(alias.name(), Some("used"));
    }

    #[test]
    fn unwraps_when_all_ctes_die() {
        let out = run("with unused as (select 1) select a from t");
        assert!(matches!(out, Expr::Select { .. }));
    }

    #[test]
    fn dead_chain_cascades() {
        // b references a, but nothing references b: both go.
        let out = run("with a as (select 1 as x), b as (select x from a) select c from t");
        assert!(matches!(out, Expr::Select { .. }));
    }

    #[test]
    fn live_chain_survives() {
        let out = run("with a as (select 1 as x), b as (select x from a) select * from b");
        let Expr::With { ctes, .. } = out else { panic!() };
        assert_eq!(ctes.len(), 2);
    }

    #[test]
    fn idempotent() {
        let once = run("with unused as (select 1), used as (select a from t) select * from used");
        let twice = EliminateCtes.apply(once.clone(), &OptimizeContext::default());
        assert_eq!(twice, once);
    }
}
