//! Prune derived-table projections the outer query never reads.

use rustc_hash::FxHashSet;
use squill_ast::Expr;

use super::{columns_shallow, Rule};
use crate::OptimizeContext;

pub struct ProjectionPushdown;

impl Rule for ProjectionPushdown {
    fn name(&self) -> &'static str {
        "projection_pushdown"
    }

    fn apply(&self, expr: Expr, _ctx: &OptimizeContext) -> Expr {
        expr.transform(&mut |e| match e {
            select @ Expr::Select { .. } => prune(select),
            other => other,
        })
    }
}

fn prune(outer: Expr) -> Expr {
    let Expr::Select {
        projections,
        distinct,
        mut from,
        mut joins,
        r#where,
        group_by,
        having,
        order_by,
        limit,
        offset,
    } = outer
    else {
        unreachable!("prune is only called on Select nodes");
    };

    // Names the outer select reads, from any clause.
    let mut refs = Vec::new();
    let mut star = false;
    for p in &projections {
        star = star || has_star(p);
        columns_shallow(p, &mut refs);
    }
    for clause in [&r#where, &having, &limit, &offset].into_iter().flat_map(|o| o.as_ref()) {
        columns_shallow(clause, &mut refs);
    }
    for e in group_by.iter().chain(order_by.iter()) {
        columns_shallow(e, &mut refs);
    }
    for join in &joins {
        if let Expr::Join { on: Some(on), .. } = join {
            columns_shallow(on, &mut refs);
        }
    }

    if !star {
        let used: FxHashSet<String> = refs.into_iter().map(|(_, name)| name.to_lowercase()).collect();
        if let Some(from_box) = from.as_mut() {
            if let Expr::From { expressions } = from_box.as_mut() {
                for target in expressions.iter_mut() {
                    prune_target(target, &used);
                }
            }
        }
        for join in joins.iter_mut() {
            if let Expr::Join { this, .. } = join {
                prune_target(this.as_mut(), &used);
            }
        }
    }

    Expr::Select {
        projections,
        distinct,
        from,
        joins,
        r#where,
        group_by,
        having,
        order_by,
        limit,
        offset,
    }
}

fn has_star(expr: &Expr) -> bool {
    match expr {
        Expr::Star => true,
        Expr::Column { this, .. } => matches!(this.as_ref(), Expr::Star),
        _ => false,
    }
}

fn prune_target(target: &mut Expr, used: &FxHashSet<String>) {
    let Expr::Subquery { this: inner, .. } = target else { return };
    let Expr::Select {
        projections,
        distinct,
        group_by,
        having,
        order_by,
        ..
    } = inner.as_mut()
    else {
        return;
    };
    // Removing columns under DISTINCT changes which rows are distinct.
    if *distinct {
        return;
    }
    if projections.iter().any(has_star) {
        return;
    }

    // The inner select's own trailing clauses may name projection aliases.
    let mut self_refs = Vec::new();
    for e in group_by.iter().chain(order_by.iter()) {
        columns_shallow(e, &mut self_refs);
    }
    if let Some(h) = having {
        columns_shallow(h, &mut self_refs);
    }
    let self_used: FxHashSet<String> =
        self_refs.into_iter().map(|(_, name)| name.to_lowercase()).collect();

    let keep_flags: Vec<bool> = projections
        .iter()
        .map(|p| match p.output_name() {
            // An unnamed projection cannot be referenced by name; keep it,
            // since dropping it could surprise positional consumers.
            None => true,
            Some(name) => {
                let key = name.to_lowercase();
                used.contains(&key) || self_used.contains(&key)
            }
        })
        .collect();
    // A select must project something; when nothing survives, leave it be.
    if keep_flags.iter().all(|keep| !keep) {
        return;
    }
    let mut flags = keep_flags.into_iter();
    projections.retain(|_| flags.next().unwrap_or(true));
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

    fn run(sql: &str) -> String {
        let out = ProjectionPushdown.apply(parse_one(sql), &OptimizeContext::default());
        squill_gen::Generator::new(squill_gen::GenConfig::default()).generate(&out)
    }

    #[test]
    fn drops_unused_inner_columns() {
        assert_eq!(
            run("select s.a from (select a, b, c from t) s"),
            "SELECT s.a FROM (SELECT a FROM t) AS s"
        );
    }

    #[test]
    fn where_references_keep_columns() {
        assert_eq!(
            run("select s.a from (select a, b from t) s where s.b = 1"),
            "SELECT s.a FROM (SELECT a, b FROM t) AS s WHERE s.b = 1"
        );
    }

    #[test]
    fn star_outer_keeps_everything() {
        assert_eq!(
            run("select * from (select a, b from t) s"),
            "SELECT * FROM (SELECT a, b FROM t) AS s"
        );
    }

    #[test]
    fn star_inner_is_untouched() {
        assert_eq!(
            run("select s.a from (select * from t) s"),
            "SELECT s.a FROM (SELECT * FROM t) AS s"
        );
    }

    #[test]
    fn all_unused_keeps_projections() {
        // Nothing references s; pruning to zero columns would be invalid.
        assert_eq!(
            run("select 1 from (select a, b from t) s"),
            "SELECT 1 FROM (SELECT a, b FROM t) AS s"
        );
    }

    #[test]
    fn idempotent() {
        let once = ProjectionPushdown.apply(
            parse_one("select s.a from (select a, b from t) s"),
            &OptimizeContext::default(),
        );
        let twice = ProjectionPushdown.apply(once.clone(), &OptimizeContext::default());
        assert_eq!(twice, once);
    }
}
