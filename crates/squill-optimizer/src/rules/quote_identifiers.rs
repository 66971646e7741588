//! Mark identifiers that must be quoted for the target dialect.

use squill_ast::Expr;

use super::Rule;
use crate::OptimizeContext;

pub struct QuoteIdentifiers;

impl Rule for QuoteIdentifiers {
    fn name(&self) -> &'static str {
        "quote_identifiers"
    }

    fn apply(&self, expr: Expr, ctx: &OptimizeContext) -> Expr {
        expr.transform(&mut |e| match e {
            Expr::Identifier { name, quoted: false } if needs_quoting(&name, ctx) => {
                Expr::Identifier { name, quoted: true }
            }
            other => other,
        })
    }
}

/// A name needs quoting when it collides with a reserved word or is not a
/// plain identifier shape.
fn needs_quoting(name: &str, ctx: &OptimizeContext) -> bool {
    ctx.is_reserved(name) || !is_plain_identifier(name)
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_get_quoted() {
        let ctx = OptimizeContext::default();
        let e = Expr::column("order");
        let out = QuoteIdentifiers.apply(e, &ctx);
        let Expr::Column { this, .. } = out else { panic!() };
        assert_eq!(*this, Expr::Identifier { name: "order".into(), quoted: true });
    }

    #[test]
    fn odd_characters_get_quoted() {
        let ctx = OptimizeContext::default();
        for name in ["my col", "1st", "a-b"] {
            let out = QuoteIdentifiers.apply(Expr::ident(name), &ctx);
            assert_eq!(out, Expr::Identifier { name: name.into(), quoted: true }, "{name}");
        }
    }

    #[test]
    fn plain_names_stay_bare() {
        let ctx = OptimizeContext::default();
        let e = Expr::ident("plain_name_1");
        assert_eq!(QuoteIdentifiers.apply(e.clone(), &ctx), e);
    }

    #[test]
    fn already_quoted_is_stable() {
        let ctx = OptimizeContext::default();
        let e = Expr::Identifier { name: "order".into(), quoted: true };
        assert_eq!(QuoteIdentifiers.apply(e.clone(), &ctx), e);
    }
}
