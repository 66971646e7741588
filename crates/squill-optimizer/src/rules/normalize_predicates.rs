//! Predicate normalization toward conjunctive normal form.
//!
//! De Morgan under NOT, flattened AND/OR operand lists, duplicate operands
//! removed, direct contradictions collapsed to FALSE, and the result
//! rebuilt as right-leaning binary trees. Applied to WHERE, HAVING, and
//! join ON conditions.

use squill_ast::Expr;

use super::{combine_conjuncts, negate_comparison, Rule};
use crate::OptimizeContext;

pub struct NormalizePredicates;

impl Rule for NormalizePredicates {
    fn name(&self) -> &'static str {
        "normalize_predicates"
    }

    fn apply(&self, expr: Expr, _ctx: &OptimizeContext) -> Expr {
        expr.transform(&mut |e| match e {
            Expr::Where { this } => Expr::Where { this: Box::new(normalize(*this)) },
            Expr::Having { this } => Expr::Having { this: Box::new(normalize(*this)) },
            Expr::Join { kind, this, on: Some(on) } => Expr::Join {
                kind,
                this,
                on: Some(Box::new(normalize(*on))),
            },
            other => other,
        })
    }
}

fn normalize(predicate: Expr) -> Expr {
    let pushed = push_not(predicate, false);

    let mut conjs: Vec<Expr> = Vec::new();
    for conjunct in flatten(pushed, true) {
        let normalized = normalize_disjunct(conjunct);
        if !conjs.contains(&normalized) {
            conjs.push(normalized);
        }
    }

    // x AND NOT x is FALSE outright.
    for a in &conjs {
        let negated = Expr::Not { this: Box::new(a.clone()) };
        if conjs.contains(&negated) {
            return Expr::boolean(false);
        }
    }

    combine_conjuncts(conjs).unwrap_or_else(|| Expr::boolean(true))
}

/// Flatten one OR level, dedupe, rebuild right-leaning.
fn normalize_disjunct(expr: Expr) -> Expr {
    let mut operands: Vec<Expr> = Vec::new();
    for operand in flatten(expr, false) {
        if !operands.contains(&operand) {
            operands.push(operand);
        }
    }
    let last = match operands.pop() {
        Some(last) => last,
        None => return Expr::boolean(true),
    };
    operands.into_iter().rev().fold(last, |acc, e| Expr::or(e, acc))
}

/// Iteratively flatten an AND (`and = true`) or OR tree into operands,
/// seeing through parentheses around the same connective.
fn flatten(expr: Expr, and: bool) -> Vec<Expr> {
    let mut out = Vec::new();
    let mut stack = vec![expr];
    while let Some(e) = stack.pop() {
        match e {
            Expr::And { left, right } if and => {
                stack.push(*right);
                stack.push(*left);
            }
            Expr::Or { left, right } if !and => {
                stack.push(*right);
                stack.push(*left);
            }
            Expr::Paren { this }
                if (and && matches!(this.as_ref(), Expr::And { .. }))
                    || (!and && matches!(this.as_ref(), Expr::Or { .. })) =>
            {
                stack.push(*this);
            }
            other => out.push(other),
        }
    }
    out
}

/// Push negation down to atoms, applying De Morgan at each connective and
/// folding double negation on the way.
fn push_not(expr: Expr, negated: bool) -> Expr {
    match expr {
        Expr::Not { this } => push_not(*this, !negated),
        Expr::And { left, right } => {
            let l = push_not(*left, negated);
            let r = push_not(*right, negated);
            if negated {
                Expr::or(l, r)
            } else {
                Expr::and(l, r)
            }
        }
        Expr::Or { left, right } => {
            let l = push_not(*left, negated);
            let r = push_not(*right, negated);
            if negated {
                Expr::and(l, r)
            } else {
                Expr::or(l, r)
            }
        }
        Expr::Paren { this }
            if matches!(this.as_ref(), Expr::And { .. } | Expr::Or { .. } | Expr::Not { .. }) =>
        {
            push_not(*this, negated)
        }
        Expr::Boolean { value } if negated => Expr::boolean(!value),
        other if negated => match negate_comparison(other) {
            Ok(negated_cmp) => negated_cmp,
            Err(original) => Expr::Not { this: Box::new(original) },
        },
        other => other,
    }
}
