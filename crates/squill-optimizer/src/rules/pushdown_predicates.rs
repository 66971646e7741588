//! Move WHERE conjuncts into the derived tables they filter.
//!
//! A conjunct moves into a subquery when every column it touches is
//! produced by that subquery and the subquery is transparent to filtering:
//! no DISTINCT, no GROUP BY/HAVING, no LIMIT/OFFSET, no aggregation. Those
//! are the pushdown barriers; hitting one means the conjunct stays put.

use rustc_hash::FxHashMap;
use squill_ast::Expr;

use super::{
    columns_shallow, combine_conjuncts, conjuncts, contains_aggregate, contains_subquery, map_columns_shallow,
    Rule,
};
use crate::OptimizeContext;

pub struct PushdownPredicates;

impl Rule for PushdownPredicates {
    fn name(&self) -> &'static str {
        "pushdown_predicates"
    }

    fn apply(&self, expr: Expr, _ctx: &OptimizeContext) -> Expr {
        expr.transform(&mut pushdown)
    }
}

fn pushdown(expr: Expr) -> Expr {
    match expr {
        Expr::Select {
            projections,
            distinct,
            from,
            joins,
            r#where: Some(where_box),
            group_by,
            having,
            order_by,
            limit,
            offset,
        } => {
            let predicate = match *where_box {
                Expr::Where { this } => *this,
                other => other,
            };
            let mut from = from;
            let mut joins = joins;
            let mut remaining = Vec::new();
            for conjunct in conjuncts(predicate) {
                if try_push(&mut from, &mut joins, &conjunct) {
                    continue;
                }
                remaining.push(conjunct);
            }
            let r#where = combine_conjuncts(remaining)
                .map(|p| Box::new(Expr::Where { this: Box::new(p) }));
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
        other => other,
    }
}

fn try_push(from: &mut Option<Box<Expr>>, joins: &mut Vec<Expr>, conjunct: &Expr) -> bool {
    if contains_subquery(conjunct) {
        return false;
    }
    let mut cols = Vec::new();
    columns_shallow(conjunct, &mut cols);
    if cols.is_empty() {
        return false;
    }

    if let Some(from_box) = from {
        if let Expr::From { expressions } = from_box.as_mut() {
            if expressions.len() == 1 {
                // Unqualified references are only provably the subquery's
                // when it is the sole source.
                let unqualified_ok = joins.is_empty();
                if let Some(target) = expressions.first_mut() {
                    if push_into_subquery(target, conjunct, &cols, unqualified_ok) {
                        return true;
                    }
                }
            }
        }
    }
    for join in joins.iter_mut() {
        if let Expr::Join { this, .. } = join {
            if push_into_subquery(this.as_mut(), conjunct, &cols, false) {
                return true;
            }
        }
    }
    false
}

fn push_into_subquery(
    target: &mut Expr,
    conjunct: &Expr,
    cols: &[(Option<String>, String)],
    allow_unqualified: bool,
) -> bool {
    let Expr::Subquery { this: inner, alias } = target else {
        return false;
    };
    let alias_name = alias
        .as_ref()
        .and_then(|a| a.name())
        .map(|s| s.to_lowercase());

    for (qualifier, _) in cols {
        match qualifier {
            None if allow_unqualified => {}
            None => return false,
            Some(q) => {
                if Some(q.to_lowercase()) != alias_name {
                    return false;
                }
            }
        }
    }

    let (replacements, star) = {
        let Expr::Select {
            projections,
            distinct,
            group_by,
            having,
            limit,
            offset,
            ..
        } = inner.as_ref()
        else {
            // Set operations and WITH are barriers.
            return false;
        };
        if *distinct
            || !group_by.is_empty()
            || having.is_some()
            || limit.is_some()
            || offset.is_some()
            || projections.iter().any(contains_aggregate)
        {
            return false;
        }
        let star = projections.iter().any(|p| matches!(p, Expr::Star));
        let mut replacements: FxHashMap<String, Expr> = FxHashMap::default();
        for p in projections {
            match p {
                Expr::Column { .. } => {
                    if let Some(name) = p.output_name() {
                        replacements.insert(name.to_lowercase(), p.clone());
                    }
                }
                Expr::Alias { this, alias } => {
                    if let Some(name) = alias.name() {
                        replacements.insert(name.to_lowercase(), this.as_ref().clone());
                    }
                }
                _ => {}
            }
        }
        if !star {
            for (_, name) in cols {
                if !replacements.contains_key(&name.to_lowercase()) {
                    return false;
                }
            }
        }
        (replacements, star)
    };

    let rewritten = map_columns_shallow(conjunct.clone(), &mut |col| match col {
        Expr::Column { table: _, this } => {
            let key = this.name().map(|n| n.to_lowercase());
            if let Some(rep) = key.as_ref().and_then(|k| replacements.get(k)) {
                rep.clone()
            } else {
                debug_assert!(star, "unresolved column should have aborted the push");
                Expr::Column { table: None, this }
            }
        }
        other => other,
    });

    let Expr::Select { r#where, .. } = inner.as_mut() else {
        return false;
    };
    let combined = match r#where.take() {
        Some(w) => {
            let existing = match *w {
                Expr::Where { this } => *this,
                other => other,
            };
            Expr::and(existing, rewritten)
        }
        None => rewritten,
    };
    *r#where = Some(Box::new(Expr::Where { this: Box::new(combined) }));
    true
}
