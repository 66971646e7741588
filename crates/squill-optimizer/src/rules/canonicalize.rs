//! Canonical operand order and negation normal forms.
//!
//! Comparisons put the simpler side on the right (`5 < x` becomes `x > 5`),
//! NOT over a comparison becomes the inverse comparison, and redundant
//! parentheses around atoms are stripped.

use squill_ast::Expr;

use super::{negate_comparison, Rule};
use crate::OptimizeContext;

pub struct Canonicalize;

impl Rule for Canonicalize {
    fn name(&self) -> &'static str {
        "canonicalize"
    }

    fn apply(&self, expr: Expr, _ctx: &OptimizeContext) -> Expr {
        expr.transform(&mut canonicalize_node)
    }
}

fn canonicalize_node(expr: Expr) -> Expr {
    match expr {
        Expr::Lt { left, right } if flips(&left, &right) => Expr::Gt { left: right, right: left },
        Expr::Gt { left, right } if flips(&left, &right) => Expr::Lt { left: right, right: left },
        Expr::Lte { left, right } if flips(&left, &right) => Expr::Gte { left: right, right: left },
        Expr::Gte { left, right } if flips(&left, &right) => Expr::Lte { left: right, right: left },

        Expr::Not { this } => match negate_comparison(*this) {
            Ok(negated) => negated,
            Err(original) => Expr::Not { this: Box::new(original) },
        },

        Expr::Paren { this } if is_atomic(&this) => *this,

        other => other,
    }
}

fn flips(left: &Expr, right: &Expr) -> bool {
    left.is_literal() && !right.is_literal()
}

fn is_atomic(expr: &Expr) -> bool {
    expr.is_literal() || matches!(expr, Expr::Column { .. } | Expr::Identifier { .. })
}
