//! Expression parsing via iterative operator-precedence climbing.
//!
//! Binary operator chains are folded with explicit operand/operator stacks
//! instead of recursion, so inputs like a 5000-term addition parse without
//! touching the native call stack. Recursion remains only where the grammar
//! genuinely nests (parentheses, subqueries, CASE, function arguments), and
//! those paths run under the parser's depth guard.

use squill_ast::Expr;
use squill_common::{TokenCategory, TokenKind};

use super::{is_quoted, statements, PResult, Parser};

// ── Precedence levels (low to high) ────────────────────────────────────

const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_CMP: u8 = 4;
const PREC_ADD: u8 = 5;
const PREC_MUL: u8 = 6;
/// LIKE patterns bind past every binary level so `x LIKE 'a' AND y` never
/// absorbs the AND.
const PREC_LIKE_RHS: u8 = 7;

/// Binding power of an infix operator token, if it is one.
/// All levels are left-associative.
fn binary_prec(kind: TokenKind) -> Option<u8> {
    use TokenKind::{Amp, And, Caret, DPipe, Eq, Gt, GtEq, Lt, LtEq, Minus, Neq, NullSafeEq, Or, Percent, Pipe, Plus, Shl, Shr, Slash, Star, Xor};
    match kind {
        Or | Xor => Some(PREC_OR),
        And => Some(PREC_AND),
        Eq | Neq | Lt | Gt | LtEq | GtEq | NullSafeEq => Some(PREC_CMP),
        Plus | Minus | DPipe | Amp | Pipe | Caret | Shl | Shr => Some(PREC_ADD),
        Star | Slash | Percent => Some(PREC_MUL),
        _ => None,
    }
}

fn build_binary(kind: TokenKind, left: Expr, right: Expr) -> Expr {
    let left = Box::new(left);
    let right = Box::new(right);
    match kind {
        TokenKind::Or => Expr::Or { left, right },
        TokenKind::Xor => Expr::Xor { left, right },
        TokenKind::And => Expr::And { left, right },
        TokenKind::Eq => Expr::Eq { left, right },
        TokenKind::Neq => Expr::Neq { left, right },
        TokenKind::Lt => Expr::Lt { left, right },
        TokenKind::Gt => Expr::Gt { left, right },
        TokenKind::LtEq => Expr::Lte { left, right },
        TokenKind::GtEq => Expr::Gte { left, right },
        // <=> is null-safe equality; kept as a plain function call so every
        // dialect can re-spell it.
        TokenKind::NullSafeEq => Expr::Function {
            name: "NULLSAFE_EQ".to_string(),
            args: vec![*left, *right],
            distinct: false,
        },
        TokenKind::Plus => Expr::Add { left, right },
        TokenKind::Minus => Expr::Sub { left, right },
        TokenKind::Star => Expr::Mul { left, right },
        TokenKind::Slash => Expr::Div { left, right },
        TokenKind::Percent => Expr::Mod { left, right },
        TokenKind::DPipe => Expr::Function {
            name: "CONCAT".to_string(),
            args: vec![*left, *right],
            distinct: false,
        },
        TokenKind::Amp => Expr::Function {
            name: "BITAND".to_string(),
            args: vec![*left, *right],
            distinct: false,
        },
        TokenKind::Pipe => Expr::Function {
            name: "BITOR".to_string(),
            args: vec![*left, *right],
            distinct: false,
        },
        TokenKind::Caret => Expr::Function {
            name: "BITXOR".to_string(),
            args: vec![*left, *right],
            distinct: false,
        },
        TokenKind::Shl => Expr::Function {
            name: "SHIFTLEFT".to_string(),
            args: vec![*left, *right],
            distinct: false,
        },
        TokenKind::Shr => Expr::Function {
            name: "SHIFTRIGHT".to_string(),
            args: vec![*left, *right],
            distinct: false,
        },
        other => unreachable!("not a binary operator token: {other:?}"),
    }
}

/// Fold the operator stack while its top binds at least as tightly as
/// `prec`. With `prec` 0 this drains the stack.
fn reduce_to(operands: &mut Vec<Expr>, ops: &mut Vec<(TokenKind, u8)>, prec: u8) {
    while let Some(&(kind, top)) = ops.last() {
        if top < prec {
            break;
        }
        ops.pop();
        let right = operands.pop().expect("operator stack implies two operands");
        let left = operands.pop().expect("operator stack implies two operands");
        operands.push(build_binary(kind, left, right));
    }
}

/// Parse an expression at the lowest binding power.
pub(crate) fn expr(p: &mut Parser) -> PResult<Expr> {
    expr_prec(p, 0)
}

/// The core climbing loop: parse an operand, then consume postfix
/// predicates and infix operators while they bind at least `min_prec`.
pub(crate) fn expr_prec(p: &mut Parser, min_prec: u8) -> PResult<Expr> {
    let mut operands: Vec<Expr> = vec![unary(p)?];
    let mut ops: Vec<(TokenKind, u8)> = Vec::new();

    loop {
        let kind = p.current_kind();

        // Postfix predicates live at comparison precedence: they close the
        // current comparison before attaching.
        match kind {
            TokenKind::Is if PREC_CMP >= min_prec => {
                reduce_to(&mut operands, &mut ops, PREC_CMP);
                p.advance();
                let negated = p.eat(TokenKind::Not);
                let subject = operands.pop().expect("operand stack never empty");
                let replaced = if p.eat(TokenKind::Null) {
                    if negated {
                        Expr::IsNotNull { this: Box::new(subject) }
                    } else {
                        Expr::IsNull { this: Box::new(subject) }
                    }
                } else {
                    let right = unary(p)?;
                    let is = Expr::Is {
                        left: Box::new(subject),
                        right: Box::new(right),
                    };
                    if negated {
                        Expr::Not { this: Box::new(is) }
                    } else {
                        is
                    }
                };
                operands.push(replaced);
                continue;
            }
            TokenKind::Not
                if PREC_CMP >= min_prec
                    && matches!(
                        p.nth_kind(1),
                        TokenKind::In | TokenKind::Like | TokenKind::Ilike | TokenKind::Between
                    ) =>
            {
                reduce_to(&mut operands, &mut ops, PREC_CMP);
                p.advance(); // NOT
                let subject = operands.pop().expect("operand stack never empty");
                let inner = postfix_predicate(p, subject)?;
                operands.push(Expr::Not { this: Box::new(inner) });
                continue;
            }
            TokenKind::Like | TokenKind::Ilike | TokenKind::In | TokenKind::Between
                if PREC_CMP >= min_prec =>
            {
                reduce_to(&mut operands, &mut ops, PREC_CMP);
                let subject = operands.pop().expect("operand stack never empty");
                operands.push(postfix_predicate(p, subject)?);
                continue;
            }
            _ => {}
        }

        let Some(prec) = binary_prec(kind) else { break };
        if prec < min_prec {
            break;
        }
        reduce_to(&mut operands, &mut ops, prec);
        p.advance();
        ops.push((kind, prec));
        operands.push(unary(p)?);
    }

    reduce_to(&mut operands, &mut ops, 0);
    Ok(operands.pop().expect("operand stack holds the result"))
}

/// LIKE / ILIKE / IN / BETWEEN applied to an already-parsed subject.
fn postfix_predicate(p: &mut Parser, subject: Expr) -> PResult<Expr> {
    let subject = Box::new(subject);
    match p.current_kind() {
        TokenKind::Like => {
            p.advance();
            let pattern = expr_prec(p, PREC_LIKE_RHS)?;
            Ok(Expr::Like { this: subject, pattern: Box::new(pattern) })
        }
        TokenKind::Ilike => {
            p.advance();
            let pattern = expr_prec(p, PREC_LIKE_RHS)?;
            Ok(Expr::Ilike { this: subject, pattern: Box::new(pattern) })
        }
        TokenKind::Between => {
            p.advance();
            // Bounds parse above AND so the AND belongs to the BETWEEN.
            let low = expr_prec(p, PREC_NOT)?;
            p.expect(TokenKind::And)?;
            let high = expr_prec(p, PREC_NOT)?;
            Ok(Expr::Between {
                this: subject,
                low: Box::new(low),
                high: Box::new(high),
            })
        }
        TokenKind::In => {
            p.advance();
            p.expect(TokenKind::LParen)?;
            if matches!(p.current_kind(), TokenKind::Select | TokenKind::With) {
                let query = p.with_depth(statements::query)?;
                p.expect(TokenKind::RParen)?;
                Ok(Expr::InSubquery { this: subject, query: Box::new(query) })
            } else {
                let mut expressions = Vec::new();
                loop {
                    if p.at(TokenKind::RParen) {
                        break;
                    }
                    expressions.push(p.with_depth(expr)?);
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
                p.expect(TokenKind::RParen)?;
                Ok(Expr::InList { this: subject, expressions })
            }
        }
        _ => Err(p.unexpected("expected predicate")),
    }
}

/// Prefix operators. NOT chains and minus chains are consumed iteratively
/// so they cannot deepen the call stack.
fn unary(p: &mut Parser) -> PResult<Expr> {
    match p.current_kind() {
        TokenKind::Not => {
            let mut count = 0usize;
            while p.eat(TokenKind::Not) {
                count += 1;
            }
            // NOT binds below comparisons, so its operand parses at the
            // comparison level.
            let mut out = expr_prec(p, PREC_CMP)?;
            for _ in 0..count {
                out = Expr::Not { this: Box::new(out) };
            }
            Ok(out)
        }
        TokenKind::Minus => {
            let mut count = 0usize;
            while p.eat(TokenKind::Minus) {
                count += 1;
            }
            let mut out = postfix(p)?;
            for _ in 0..count {
                out = Expr::Neg { this: Box::new(out) };
            }
            Ok(out)
        }
        TokenKind::Plus => {
            // Unary plus is a no-op.
            p.advance();
            unary(p)
        }
        _ => postfix(p),
    }
}

/// A primary expression followed by its postfix operators: dot access,
/// bracket subscripts, `::` casts, and OVER windows.
fn postfix(p: &mut Parser) -> PResult<Expr> {
    let mut out = primary(p)?;
    loop {
        match p.current_kind() {
            TokenKind::Dot => {
                p.advance();
                let rhs = dot_member(p)?;
                out = merge_dot(out, rhs);
            }
            TokenKind::LBracket => {
                p.advance();
                let mut expressions = Vec::new();
                loop {
                    if p.at(TokenKind::RBracket) {
                        break;
                    }
                    expressions.push(p.with_depth(expr)?);
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
                p.expect(TokenKind::RBracket)?;
                out = Expr::Bracket { this: Box::new(out), expressions };
            }
            TokenKind::DColon => {
                p.advance();
                let to = data_type(p)?;
                out = Expr::TypedExpr { this: Box::new(out), to: Box::new(to) };
            }
            TokenKind::Over => {
                p.advance();
                out = window_spec(p, out)?;
            }
            TokenKind::Arrow => {
                p.advance();
                let path = unary(p)?;
                out = Expr::JsonExtract { this: Box::new(out), path: Box::new(path) };
            }
            _ => break,
        }
    }
    Ok(out)
}

/// The member after a `.`: an identifier, `*`, or a keyword used as a name.
fn dot_member(p: &mut Parser) -> PResult<Expr> {
    let kind = p.current_kind();
    match kind {
        TokenKind::Star => {
            p.advance();
            Ok(Expr::Star)
        }
        TokenKind::Identifier => {
            let tok = p.advance();
            let quoted = is_quoted(&tok);
            Ok(Expr::Identifier { name: tok.text, quoted })
        }
        _ if matches!(kind.category(), TokenCategory::Keyword | TokenCategory::DataType) => {
            let tok = p.advance();
            Ok(Expr::Identifier { name: tok.text, quoted: false })
        }
        _ => Err(p.unexpected("expected identifier after '.'")),
    }
}

/// `a.b` folds into a qualified column while the left side is still a bare
/// column; anything longer or stranger becomes a Dot chain.
fn merge_dot(left: Expr, rhs: Expr) -> Expr {
    match left {
        Expr::Column { table: None, this } if matches!(rhs, Expr::Identifier { .. } | Expr::Star) => {
            Expr::Column { table: Some(this), this: Box::new(rhs) }
        }
        other => Expr::Dot { left: Box::new(other), right: Box::new(rhs) },
    }
}

fn window_spec(p: &mut Parser, this: Expr) -> PResult<Expr> {
    p.expect(TokenKind::LParen)?;
    let mut partition_by = Vec::new();
    if p.eat(TokenKind::Partition) {
        p.expect(TokenKind::By)?;
        partition_by.push(p.with_depth(expr)?);
        while p.eat(TokenKind::Comma) {
            partition_by.push(p.with_depth(expr)?);
        }
    }
    let mut order_by = Vec::new();
    if p.eat(TokenKind::Order) {
        p.eat(TokenKind::By);
        order_by = ordered_list(p)?;
    }
    p.expect(TokenKind::RParen)?;
    Ok(Expr::Window {
        this: Box::new(this),
        partition_by,
        order_by,
    })
}

/// ORDER BY items: expression plus optional ASC/DESC, ascending by default.
pub(crate) fn ordered_list(p: &mut Parser) -> PResult<Vec<Expr>> {
    let mut items = Vec::new();
    loop {
        let item = p.with_depth(expr)?;
        let desc = if p.eat(TokenKind::Desc) {
            true
        } else {
            p.eat(TokenKind::Asc);
            false
        };
        items.push(Expr::Ordered { this: Box::new(item), desc });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    Ok(items)
}

fn primary(p: &mut Parser) -> PResult<Expr> {
    let kind = p.current_kind();
    match kind {
        TokenKind::Number => {
            let tok = p.advance();
            Ok(Expr::Number { value: tok.text })
        }
        TokenKind::String
        | TokenKind::ByteString
        | TokenKind::HexString
        | TokenKind::RawString
        | TokenKind::UnicodeString
        | TokenKind::NationalString => {
            let tok = p.advance();
            Ok(Expr::Str { value: tok.text })
        }
        TokenKind::Null => {
            p.advance();
            Ok(Expr::Null)
        }
        TokenKind::True => {
            p.advance();
            Ok(Expr::Boolean { value: true })
        }
        TokenKind::False => {
            p.advance();
            Ok(Expr::Boolean { value: false })
        }
        TokenKind::Star => {
            p.advance();
            Ok(Expr::Star)
        }
        TokenKind::Placeholder => {
            p.advance();
            Ok(Expr::Placeholder)
        }
        TokenKind::At | TokenKind::Colon => {
            p.advance();
            let tok = p.advance();
            if tok.text.is_empty() {
                return Err(p.unexpected("expected parameter name"));
            }
            Ok(Expr::Parameter { name: tok.text })
        }
        TokenKind::Case => case_expr(p),
        TokenKind::Cast => cast_expr(p),
        TokenKind::Exists => {
            p.advance();
            p.expect(TokenKind::LParen)?;
            let query = p.with_depth(statements::query)?;
            p.expect(TokenKind::RParen)?;
            Ok(Expr::Exists { query: Box::new(query) })
        }
        TokenKind::Interval => {
            p.advance();
            let this = primary(p)?;
            let unit = if p.at(TokenKind::Identifier) {
                p.advance().text
            } else {
                String::new()
            };
            Ok(Expr::Interval { this: Box::new(this), unit })
        }
        TokenKind::ArrayType if p.nth_kind(1) == TokenKind::LBracket => {
            p.advance();
            p.advance();
            let mut expressions = Vec::new();
            loop {
                if p.at(TokenKind::RBracket) {
                    break;
                }
                expressions.push(p.with_depth(expr)?);
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect(TokenKind::RBracket)?;
            Ok(Expr::Array { expressions })
        }
        TokenKind::LParen => p.with_depth(|p| {
            p.advance();
            if matches!(p.current_kind(), TokenKind::Select | TokenKind::With) {
                let query = statements::query(p)?;
                p.expect(TokenKind::RParen)?;
                return Ok(Expr::Subquery { this: Box::new(query), alias: None });
            }
            let first = expr(p)?;
            if p.eat(TokenKind::Comma) {
                let mut expressions = vec![first];
                loop {
                    if p.at(TokenKind::RParen) {
                        break;
                    }
                    expressions.push(expr(p)?);
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
                p.expect(TokenKind::RParen)?;
                Ok(Expr::Tuple { expressions })
            } else {
                p.expect(TokenKind::RParen)?;
                Ok(Expr::Paren { this: Box::new(first) })
            }
        }),
        TokenKind::Identifier => ident_or_function(p),
        _ if kind.is_function_keyword() => {
            if p.nth_kind(1) == TokenKind::LParen {
                let tok = p.advance();
                function_call(p, tok.text)
            } else if matches!(
                kind,
                TokenKind::Now | TokenKind::CurrentDate | TokenKind::CurrentTimestamp
            ) {
                let tok = p.advance();
                Ok(Expr::Function {
                    name: tok.text.to_uppercase(),
                    args: Vec::new(),
                    distinct: false,
                })
            } else {
                // A function keyword in primary position without arguments
                // is just a name.
                let tok = p.advance();
                Ok(Expr::Column {
                    table: None,
                    this: Box::new(Expr::Identifier { name: tok.text, quoted: false }),
                })
            }
        }
        _ if kind.category() == TokenCategory::DataType => {
            if p.nth_kind(1) == TokenKind::String {
                // Typed literal, e.g. DATE '2024-01-01'.
                let to = data_type(p)?;
                let tok = p.advance();
                Ok(Expr::Cast {
                    this: Box::new(Expr::Str { value: tok.text }),
                    to: Box::new(to),
                })
            } else if p.nth_kind(1) == TokenKind::LParen {
                let tok = p.advance();
                function_call(p, tok.text)
            } else {
                let tok = p.advance();
                Ok(Expr::Column {
                    table: None,
                    this: Box::new(Expr::Identifier { name: tok.text, quoted: false }),
                })
            }
        }
        _ => Err(p.unexpected("expected expression")),
    }
}

fn ident_or_function(p: &mut Parser) -> PResult<Expr> {
    let tok = p.advance();
    let quoted = is_quoted(&tok);
    if p.at(TokenKind::LParen) && !quoted {
        function_call(p, tok.text)
    } else {
        Ok(Expr::Column {
            table: None,
            this: Box::new(Expr::Identifier { name: tok.text, quoted }),
        })
    }
}

/// Function argument list: empty, a lone `*`, or comma-separated
/// expressions. Stops unconditionally at the closing paren so malformed
/// input cannot run away.
fn function_call(p: &mut Parser, name: String) -> PResult<Expr> {
    p.expect(TokenKind::LParen)?;
    let mut args = Vec::new();
    let mut distinct = false;
    if !p.at(TokenKind::RParen) {
        distinct = p.eat(TokenKind::Distinct);
        if p.at(TokenKind::Star) && p.nth_kind(1) == TokenKind::RParen {
            p.advance();
            args.push(Expr::Star);
        } else {
            loop {
                if p.at(TokenKind::RParen) {
                    break;
                }
                args.push(p.with_depth(expr)?);
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
    }
    p.expect(TokenKind::RParen)?;
    Ok(Expr::Function { name, args, distinct })
}

fn case_expr(p: &mut Parser) -> PResult<Expr> {
    p.advance(); // CASE
    let operand = if p.at(TokenKind::When) {
        None
    } else {
        Some(Box::new(p.with_depth(expr)?))
    };
    let mut whens = Vec::new();
    while p.eat(TokenKind::When) {
        let condition = p.with_depth(expr)?;
        p.expect(TokenKind::Then)?;
        let result = p.with_depth(expr)?;
        whens.push(Expr::When {
            condition: Box::new(condition),
            result: Box::new(result),
        });
    }
    if whens.is_empty() {
        return Err(p.unexpected("expected WHEN"));
    }
    let otherwise = if p.eat(TokenKind::Else) {
        Some(Box::new(p.with_depth(expr)?))
    } else {
        None
    };
    p.expect(TokenKind::End)?;
    Ok(Expr::Case { operand, whens, otherwise })
}

fn cast_expr(p: &mut Parser) -> PResult<Expr> {
    p.advance(); // CAST
    p.expect(TokenKind::LParen)?;
    let this = p.with_depth(expr)?;
    p.expect(TokenKind::As)?;
    let to = data_type(p)?;
    p.expect(TokenKind::RParen)?;
    Ok(Expr::Cast { this: Box::new(this), to: Box::new(to) })
}

/// A data type: built-in name or custom identifier, with an optional
/// parameter list like `DECIMAL(10, 2)`.
pub(crate) fn data_type(p: &mut Parser) -> PResult<Expr> {
    let kind = p.current_kind();
    if kind.category() != TokenCategory::DataType && kind != TokenKind::Identifier {
        return Err(p.unexpected("expected data type"));
    }
    let tok = p.advance();
    let name = tok.text.to_uppercase();
    let mut params = Vec::new();
    if p.eat(TokenKind::LParen) {
        loop {
            if p.at(TokenKind::RParen) {
                break;
            }
            params.push(p.with_depth(expr)?);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        p.expect(TokenKind::RParen)?;
    }
    Ok(Expr::DataType { name, params })
}
