//! Constant folding and boolean algebra.

use squill_ast::Expr;

use super::Rule;
use crate::OptimizeContext;

pub struct Simplify;

impl Rule for Simplify {
    fn name(&self) -> &'static str {
        "simplify"
    }

    fn apply(&self, expr: Expr, _ctx: &OptimizeContext) -> Expr {
        expr.transform(&mut simplify_node)
    }
}

fn simplify_node(expr: Expr) -> Expr {
    match expr {
        Expr::Add { left, right } => fold(Arith::Add, left, right),
        Expr::Sub { left, right } => fold(Arith::Sub, left, right),
        Expr::Mul { left, right } => fold(Arith::Mul, left, right),
        Expr::Div { left, right } => fold(Arith::Div, left, right),
        Expr::Mod { left, right } => fold(Arith::Mod, left, right),

        Expr::And { left, right } => {
            if left.is_true() {
                *right
            } else if right.is_true() {
                *left
            } else if left.is_false() || right.is_false() {
                // NULL AND FALSE folds to FALSE as well; other NULL
                // combinations stay intact.
                Expr::boolean(false)
            } else if left == right {
                *left
            } else {
                Expr::And { left, right }
            }
        }
        Expr::Or { left, right } => {
            if left.is_true() || right.is_true() {
                Expr::boolean(true)
            } else if left.is_false() {
                *right
            } else if right.is_false() {
                *left
            } else if left == right {
                *left
            } else {
                Expr::Or { left, right }
            }
        }
        Expr::Not { this } => match *this {
            Expr::Not { this: inner } => *inner,
            Expr::Boolean { value } => Expr::boolean(!value),
            other => Expr::Not { this: Box::new(other) },
        },
        other => other,
    }
}

enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Fold arithmetic over two numeric literals. Division and modulo by zero
/// are left alone, as is anything that does not produce a finite number.
fn fold(op: Arith, left: Box<Expr>, right: Box<Expr>) -> Expr {
    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        let value = match op {
            Arith::Add => Some(a + b),
            Arith::Sub => Some(a - b),
            Arith::Mul => Some(a * b),
            Arith::Div if b != 0.0 => Some(a / b),
            Arith::Mod if b != 0.0 => Some(a % b),
            _ => None,
        };
        if let Some(v) = value.filter(|v| v.is_finite()) {
            return Expr::Number { value: format_number(v) };
        }
    }
    match op {
        Arith::Add => Expr::Add { left, right },
        Arith::Sub => Expr::Sub { left, right },
        Arith::Mul => Expr::Mul { left, right },
        Arith::Div => Expr::Div { left, right },
        Arith::Mod => Expr::Mod { left, right },
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simplify(e: Expr) -> Expr {
        Simplify.apply(e, &OptimizeContext::default())
    }

    #[test]
    fn folds_arithmetic() {
        let e = Expr::Add {
            left: Box::new(Expr::number("1")),
            right: Box::new(Expr::Mul {
                left: Box::new(Expr::number("2")),
                right: Box::new(Expr::number("3")),
            }),
        };
        assert_eq!(simplify(e), Expr::number("7"));
    }

    #[test]
    fn keeps_fractions_and_division_by_zero() {
        let half = Expr::Div {
            left: Box::new(Expr::number("1")),
            right: Box::new(Expr::number("2")),
        };
        assert_eq!(simplify(half), Expr::number("0.5"));

        let by_zero = Expr::Div {
            left: Box::new(Expr::number("1")),
            right: Box::new(Expr::number("0")),
        };
        assert_eq!(simplify(by_zero.clone()), by_zero);
    }

    #[test]
    fn boolean_algebra() {
        let x = || Expr::column("x");
        assert_eq!(simplify(Expr::and(Expr::boolean(true), x())), x());
        assert_eq!(simplify(Expr::and(Expr::boolean(false), x())), Expr::boolean(false));
        assert_eq!(simplify(Expr::and(x(), x())), x());
        assert_eq!(simplify(Expr::or(Expr::boolean(true), x())), Expr::boolean(true));
        assert_eq!(simplify(Expr::or(Expr::boolean(false), x())), x());
        assert_eq!(simplify(Expr::or(x(), x())), x());
    }

    #[test]
    fn not_simplifications() {
        let x = || Expr::column("x");
        assert_eq!(simplify(Expr::negate(Expr::negate(x()))), x());
        assert_eq!(simplify(Expr::negate(Expr::boolean(true))), Expr::boolean(false));
        assert_eq!(simplify(Expr::negate(Expr::boolean(false))), Expr::boolean(true));
    }

    #[test]
    fn null_propagation() {
        // NULL AND FALSE -> FALSE, NULL OR TRUE -> TRUE.
        assert_eq!(
            simplify(Expr::and(Expr::Null, Expr::boolean(false))),
            Expr::boolean(false)
        );
        assert_eq!(
            simplify(Expr::or(Expr::Null, Expr::boolean(true))),
            Expr::boolean(true)
        );
        // NULL AND x is untouched.
        let kept = Expr::and(Expr::Null, Expr::column("x"));
        assert_eq!(simplify(kept.clone()), kept);
    }

    #[test]
    fn idempotent() {
        let e = Expr::and(
            Expr::boolean(true),
            Expr::or(Expr::column("x"), Expr::boolean(false)),
        );
        let once = simplify(e);
        assert_eq!(simplify(once.clone()), once);
    }
}
