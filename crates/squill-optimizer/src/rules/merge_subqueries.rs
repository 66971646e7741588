//! Inline derived tables into their parent select.
//!
//! `SELECT ... FROM (SELECT cols FROM t WHERE p) s ...` flattens to
//! `SELECT ... FROM t WHERE p AND ...` when the inner select is transparent:
//! no aggregation, no DISTINCT, no GROUP BY/HAVING, no LIMIT/OFFSET, no
//! joins, no set operations. Outer references through the alias are
//! rewritten to the inner projections they name.

use rustc_hash::FxHashMap;
use squill_ast::Expr;

use super::{columns_shallow, contains_aggregate, map_columns_shallow, Rule};
use crate::OptimizeContext;

pub struct MergeSubqueries;

impl Rule for MergeSubqueries {
    fn name(&self) -> &'static str {
        "merge_subqueries"
    }

    fn apply(&self, expr: Expr, _ctx: &OptimizeContext) -> Expr {
        expr.transform(&mut |e| match e {
            select @ Expr::Select { .. } => merge(select),
            other => other,
        })
    }
}

struct Plan {
    replacements: FxHashMap<String, Expr>,
    star: bool,
}

fn merge(outer: Expr) -> Expr {
    let Some(plan) = plan_merge(&outer) else { return outer };

    let Expr::Select {
        projections,
        distinct,
        from,
        joins: _,
        r#where,
        group_by,
        having,
        order_by,
        limit,
        offset,
    } = outer
    else {
        unreachable!("plan_merge only accepts a Select");
    };
    let Some(from_box) = from else { unreachable!("plan_merge requires a FROM") };
    let Expr::From { mut expressions } = *from_box else {
        unreachable!("plan_merge requires a FROM")
    };
    let Expr::Subquery { this: inner, .. } = expressions.remove(0) else {
        unreachable!("plan_merge requires a derived table")
    };
    let Expr::Select {
        from: inner_from,
        joins: inner_joins,
        r#where: inner_where,
        ..
    } = *inner
    else {
        unreachable!("plan_merge requires an inner Select")
    };

    let mut rewrite = |e: Expr| {
        map_columns_shallow(e, &mut |col| match col {
            Expr::Column { table: _, this } => {
                let key = this.name().map(|n| n.to_lowercase());
                match key.as_ref().and_then(|k| plan.replacements.get(k)) {
                    Some(rep) => rep.clone(),
                    None => Expr::Column { table: None, this },
                }
            }
            other => other,
        })
    };

    let projections = projections.into_iter().map(&mut rewrite).collect();
    let group_by = group_by.into_iter().map(&mut rewrite).collect();
    let order_by = order_by.into_iter().map(&mut rewrite).collect();
    let having = having.map(|h| Box::new(rewrite(*h)));
    let limit = limit.map(|l| Box::new(rewrite(*l)));
    let offset = offset.map(|o| Box::new(rewrite(*o)));

    let outer_pred = r#where.map(|w| match *w {
        Expr::Where { this } => rewrite(*this),
        other => rewrite(other),
    });
    let inner_pred = inner_where.map(|w| match *w {
        Expr::Where { this } => *this,
        other => other,
    });
    let combined = match (inner_pred, outer_pred) {
        (Some(i), Some(o)) => Some(Expr::and(i, o)),
        (Some(i), None) => Some(i),
        (None, Some(o)) => Some(o),
        (None, None) => None,
    };

    Expr::Select {
        projections,
        distinct,
        from: inner_from,
        joins: inner_joins,
        r#where: combined.map(|p| Box::new(Expr::Where { this: Box::new(p) })),
        group_by,
        having,
        order_by,
        limit,
        offset,
    }
}

/// Decide whether the outer select's sole source can be inlined, and build
/// the alias-to-expression replacement map if so.
fn plan_merge(outer: &Expr) -> Option<Plan> {
    let Expr::Select { projections, from, joins, r#where, group_by, having, order_by, limit, offset, .. } = outer
    else {
        return None;
    };
    if !joins.is_empty() {
        return None;
    }
    let Expr::From { expressions } = from.as_ref()?.as_ref() else {
        return None;
    };
    let [Expr::Subquery { this: inner, alias }] = expressions.as_slice() else {
        return None;
    };
    let Expr::Select {
        projections: inner_projections,
        distinct: inner_distinct,
        joins: inner_joins,
        group_by: inner_group_by,
        having: inner_having,
        order_by: inner_order_by,
        limit: inner_limit,
        offset: inner_offset,
        ..
    } = inner.as_ref()
    else {
        return None;
    };
    if *inner_distinct
        || !inner_joins.is_empty()
        || !inner_group_by.is_empty()
        || inner_having.is_some()
        || !inner_order_by.is_empty()
        || inner_limit.is_some()
        || inner_offset.is_some()
        || inner_projections.iter().any(contains_aggregate)
    {
        return None;
    }

    let star = matches!(inner_projections.as_slice(), [Expr::Star]);
    let mut replacements = FxHashMap::default();
    for p in inner_projections {
        match p {
            Expr::Star => {}
            Expr::Column { .. } => {
                replacements.insert(p.output_name()?.to_lowercase(), p.clone());
            }
            Expr::Alias { this, alias } => {
                replacements.insert(alias.name()?.to_lowercase(), this.as_ref().clone());
            }
            _ => return None,
        }
    }

    // A bare star outside can only merge with a bare star inside; anything
    // else would change the outer column set.
    let outer_has_star = projections
        .iter()
        .any(|p| matches!(p, Expr::Star) || matches!(p, Expr::Column { this, .. } if matches!(this.as_ref(), Expr::Star)));
    if outer_has_star && !star {
        return None;
    }

    // Every outer reference must resolve through the alias or the inner
    // projections.
    let alias_name = alias
        .as_ref()
        .and_then(|a| a.name())
        .map(|s| s.to_lowercase());
    let mut refs = Vec::new();
    for p in projections {
        columns_shallow(p, &mut refs);
    }
    for clause in [r#where, having, limit, offset].into_iter().flat_map(|o| o.as_ref()) {
        columns_shallow(clause, &mut refs);
    }
    for e in group_by.iter().chain(order_by.iter()) {
        columns_shallow(e, &mut refs);
    }
    for (qualifier, name) in refs {
        if let Some(q) = qualifier {
            if Some(q.to_lowercase()) != alias_name {
                return None;
            }
        }
        if !star && !replacements.contains_key(&name.to_lowercase()) {
            return None;
        }
    }

    Some(Plan { replacements, star })
}
