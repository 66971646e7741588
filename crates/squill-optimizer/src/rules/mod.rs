//! The rewrite-rule catalogue.
//!
//! Each rule is a pure `Expr -> Expr` function over the whole tree,
//! implemented with `transform`. A rule that cannot apply leaves the tree
//! untouched; no rule ever fails. Every rule is idempotent: applying it to
//! its own output yields the same tree.

mod canonicalize;
mod eliminate_ctes;
mod merge_subqueries;
mod normalize_predicates;
mod projection_pushdown;
mod pushdown_predicates;
mod qualify_columns;
mod quote_identifiers;
mod simplify;

pub use canonicalize::Canonicalize;
pub use eliminate_ctes::EliminateCtes;
pub use merge_subqueries::MergeSubqueries;
pub use normalize_predicates::NormalizePredicates;
pub use projection_pushdown::ProjectionPushdown;
pub use pushdown_predicates::PushdownPredicates;
pub use qualify_columns::QualifyColumns;
pub use quote_identifiers::QuoteIdentifiers;
pub use simplify::Simplify;

use squill_ast::Expr;

use crate::OptimizeContext;

/// A single rewrite rule in the pipeline.
pub trait Rule {
    /// Machine-readable rule name, matching its config flag.
    fn name(&self) -> &'static str;

    /// Rewrite the tree. Must be semantics-preserving and idempotent.
    fn apply(&self, expr: Expr, ctx: &OptimizeContext) -> Expr;
}

// ── Shared helpers ─────────────────────────────────────────────────────

/// Flatten an AND tree into its conjuncts, left to right. Iterative so a
/// long predicate chain cannot deepen the call stack.
pub(crate) fn conjuncts(expr: Expr) -> Vec<Expr> {
    let mut out = Vec::new();
    let mut stack = vec![expr];
    while let Some(e) = stack.pop() {
        match e {
            Expr::And { left, right } => {
                stack.push(*right);
                stack.push(*left);
            }
            other => out.push(other),
        }
    }
    out
}

/// Rebuild conjuncts as a right-leaning AND tree.
pub(crate) fn combine_conjuncts(mut list: Vec<Expr>) -> Option<Expr> {
    let last = list.pop()?;
    Some(list.into_iter().rev().fold(last, |acc, e| Expr::and(e, acc)))
}

/// Negate a comparison in place: Ok(negated) on success, Err(original)
/// when the node is not a negatable comparison.
pub(crate) fn negate_comparison(expr: Expr) -> Result<Expr, Expr> {
    match expr {
        Expr::Eq { left, right } => Ok(Expr::Neq { left, right }),
        Expr::Neq { left, right } => Ok(Expr::Eq { left, right }),
        Expr::Lt { left, right } => Ok(Expr::Gte { left, right }),
        Expr::Gt { left, right } => Ok(Expr::Lte { left, right }),
        Expr::Lte { left, right } => Ok(Expr::Gt { left, right }),
        Expr::Gte { left, right } => Ok(Expr::Lt { left, right }),
        other => Err(other),
    }
}

const AGGREGATES: &[&str] = &["COUNT", "SUM", "AVG", "MIN", "MAX"];

/// Whether an expression contains an aggregate call or a window, without
/// descending into nested queries.
pub(crate) fn contains_aggregate(expr: &Expr) -> bool {
    if is_query_boundary(expr) {
        return false;
    }
    match expr {
        Expr::Function { name, .. }
            if AGGREGATES.iter().any(|a| a.eq_ignore_ascii_case(name)) =>
        {
            true
        }
        Expr::Window { .. } => true,
        _ => expr.children().iter().any(|c| contains_aggregate(c)),
    }
}

/// Whether an expression contains a nested query, without crossing into it.
pub(crate) fn contains_subquery(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Subquery { .. }
            | Expr::Exists { .. }
            | Expr::InSubquery { .. }
            | Expr::Select { .. }
            | Expr::With { .. }
    ) || expr.children().iter().any(|c| contains_subquery(c))
}

fn is_query_boundary(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Subquery { .. } | Expr::Select { .. } | Expr::With { .. } | Expr::Exists { .. }
    )
}

/// Collect `(qualifier, name)` pairs for every column reference in an
/// expression, without descending into nested queries.
pub(crate) fn columns_shallow(expr: &Expr, out: &mut Vec<(Option<String>, String)>) {
    if is_query_boundary(expr) {
        return;
    }
    if let Expr::Column { table, this } = expr {
        let qualifier = table.as_ref().and_then(|t| t.name()).map(str::to_string);
        if let Some(name) = this.name() {
            out.push((qualifier, name.to_string()));
        }
        return;
    }
    if let Expr::InSubquery { this, .. } = expr {
        columns_shallow(this, out);
        return;
    }
    for child in expr.children() {
        columns_shallow(child, out);
    }
}

/// Rewrite every column reference in an expression through `f`, without
/// descending into nested queries. `f` receives the whole Column node.
pub(crate) fn map_columns_shallow(expr: Expr, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
    match expr {
        col @ Expr::Column { .. } => f(col),
        boundary @ (Expr::Subquery { .. }
        | Expr::Select { .. }
        | Expr::With { .. }
        | Expr::Exists { .. }) => boundary,
        Expr::InSubquery { this, query } => Expr::InSubquery {
            this: Box::new(map_columns_shallow(*this, f)),
            query,
        },
        other => other.map_children(&mut |child| map_columns_shallow(child, f)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conjunct_flattening_and_rebuild() {
        let e = Expr::and(
            Expr::and(Expr::column("a"), Expr::column("b")),
            Expr::column("c"),
        );
        let parts = conjuncts(e);
        assert_eq!(parts.len(), 3);
        let rebuilt = combine_conjuncts(parts).unwrap();
        // Right-leaning: a AND (b AND c).
        let Expr::And { right, .. } = &rebuilt else { panic!() };
        assert!(matches!(right.as_ref(), Expr::And { .. }));
    }

    #[test]
    fn aggregate_detection_stops_at_subqueries() {
        let agg = Expr::Function {
            name: "count".into(),
            args: vec![Expr::Star],
            distinct: false,
        };
        assert!(contains_aggregate(&agg));
        let nested = Expr::Exists {
            query: Box::new(Expr::Select {
                projections: vec![agg],
                distinct: false,
                from: None,
                joins: vec![],
                r#where: None,
                group_by: vec![],
                having: None,
                order_by: vec![],
                limit: None,
                offset: None,
            }),
        };
        assert!(!contains_aggregate(&nested));
    }
}
