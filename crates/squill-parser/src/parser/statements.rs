//! Statement-level grammar: dispatch on the leading keyword, then plain
//! recursive descent per clause.

use squill_ast::Expr;
use squill_common::TokenKind;

use super::{expressions, is_quoted, PResult, Parser};

/// Dispatch on the first token of a statement.
pub(crate) fn statement(p: &mut Parser) -> PResult<Expr> {
    match p.current_kind() {
        TokenKind::Select | TokenKind::LParen | TokenKind::With | TokenKind::Values => query(p),
        TokenKind::Insert => insert(p),
        TokenKind::Update => update(p),
        TokenKind::Delete => delete(p),
        TokenKind::Create => create(p),
        TokenKind::Drop => drop_statement(p),
        TokenKind::Alter => alter(p),
        TokenKind::Explain => {
            p.advance();
            let this = p.with_depth(statement)?;
            Ok(Expr::Explain { this: Box::new(this) })
        }
        _ => Err(p.unexpected("expected a statement")),
    }
}

/// A full query: one query term followed by any number of set operations,
/// combined left-associatively.
pub(crate) fn query(p: &mut Parser) -> PResult<Expr> {
    if p.at(TokenKind::With) {
        return with_query(p);
    }
    let mut left = query_term(p)?;
    loop {
        if p.eat(TokenKind::Union) {
            let distinct = !p.eat(TokenKind::All);
            let right = query_term(p)?;
            left = Expr::Union {
                left: Box::new(left),
                right: Box::new(right),
                distinct,
            };
        } else if p.eat(TokenKind::Intersect) {
            let right = query_term(p)?;
            left = Expr::Intersect { left: Box::new(left), right: Box::new(right) };
        } else if p.eat(TokenKind::Except) {
            let right = query_term(p)?;
            left = Expr::Except { left: Box::new(left), right: Box::new(right) };
        } else {
            break;
        }
    }
    Ok(left)
}

fn query_term(p: &mut Parser) -> PResult<Expr> {
    match p.current_kind() {
        TokenKind::Select => select(p),
        TokenKind::Values => values(p),
        TokenKind::LParen => p.with_depth(|p| {
            p.advance();
            let inner = query(p)?;
            p.expect(TokenKind::RParen)?;
            Ok(Expr::Subquery { this: Box::new(inner), alias: None })
        }),
        _ => Err(p.unexpected("expected SELECT")),
    }
}

fn with_query(p: &mut Parser) -> PResult<Expr> {
    p.expect(TokenKind::With)?;
    let recursive = p.eat(TokenKind::Recursive);
    let mut ctes = Vec::new();
    loop {
        let alias = name_identifier(p)?;
        p.expect(TokenKind::As)?;
        p.expect(TokenKind::LParen)?;
        let body = p.with_depth(query)?;
        p.expect(TokenKind::RParen)?;
        ctes.push(Expr::Cte { alias: Box::new(alias), this: Box::new(body) });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    let this = query(p)?;
    Ok(Expr::With { ctes, this: Box::new(this), recursive })
}

fn select(p: &mut Parser) -> PResult<Expr> {
    p.expect(TokenKind::Select)?;
    let distinct = p.eat(TokenKind::Distinct);

    let mut projections = Vec::new();
    loop {
        let item = expressions::expr(p)?;
        projections.push(maybe_alias(p, item)?);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }

    let from = if p.eat(TokenKind::From) {
        let mut expressions = vec![table_ref(p)?];
        while p.eat(TokenKind::Comma) {
            expressions.push(table_ref(p)?);
        }
        Some(Box::new(Expr::From { expressions }))
    } else {
        None
    };

    let joins = join_list(p)?;

    let r#where = if p.eat(TokenKind::Where) {
        Some(Box::new(Expr::Where { this: Box::new(expressions::expr(p)?) }))
    } else {
        None
    };

    let mut group_by = Vec::new();
    if p.eat(TokenKind::Group) {
        p.eat(TokenKind::By);
        group_by.push(expressions::expr(p)?);
        while p.eat(TokenKind::Comma) {
            group_by.push(expressions::expr(p)?);
        }
    }

    let having = if p.eat(TokenKind::Having) {
        Some(Box::new(Expr::Having { this: Box::new(expressions::expr(p)?) }))
    } else {
        None
    };

    let order_by = if p.eat(TokenKind::Order) {
        p.eat(TokenKind::By);
        expressions::ordered_list(p)?
    } else {
        Vec::new()
    };

    let limit = if p.eat(TokenKind::Limit) {
        Some(Box::new(Expr::Limit { this: Box::new(expressions::expr(p)?) }))
    } else {
        None
    };

    let offset = if p.eat(TokenKind::Offset) {
        Some(Box::new(Expr::Offset { this: Box::new(expressions::expr(p)?) }))
    } else {
        None
    };

    Ok(Expr::Select {
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
    })
}

fn join_list(p: &mut Parser) -> PResult<Vec<Expr>> {
    let mut joins = Vec::new();
    loop {
        let kind = if p.eat(TokenKind::Inner) {
            p.expect(TokenKind::Join)?;
            "INNER".to_string()
        } else if p.eat(TokenKind::Left) {
            let outer = p.eat(TokenKind::Outer);
            p.expect(TokenKind::Join)?;
            if outer { "LEFT OUTER".to_string() } else { "LEFT".to_string() }
        } else if p.eat(TokenKind::Right) {
            let outer = p.eat(TokenKind::Outer);
            p.expect(TokenKind::Join)?;
            if outer { "RIGHT OUTER".to_string() } else { "RIGHT".to_string() }
        } else if p.eat(TokenKind::Full) {
            let outer = p.eat(TokenKind::Outer);
            p.expect(TokenKind::Join)?;
            if outer { "FULL OUTER".to_string() } else { "FULL".to_string() }
        } else if p.eat(TokenKind::Cross) {
            p.expect(TokenKind::Join)?;
            "CROSS".to_string()
        } else if p.eat(TokenKind::Join) {
            String::new()
        } else {
            break;
        };
        let this = table_ref(p)?;
        let on = if p.eat(TokenKind::On) {
            Some(Box::new(expressions::expr(p)?))
        } else {
            None
        };
        joins.push(Expr::Join { kind, this: Box::new(this), on });
    }
    Ok(joins)
}

fn values(p: &mut Parser) -> PResult<Expr> {
    p.expect(TokenKind::Values)?;
    let mut rows = Vec::new();
    loop {
        p.expect(TokenKind::LParen)?;
        let mut expressions = Vec::new();
        loop {
            if p.at(TokenKind::RParen) {
                break;
            }
            expressions.push(p.with_depth(expressions::expr)?);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        p.expect(TokenKind::RParen)?;
        rows.push(Expr::Tuple { expressions });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    Ok(Expr::Values { rows })
}

// ── Table references ───────────────────────────────────────────────────

/// A FROM/JOIN operand with its optional alias.
fn table_ref(p: &mut Parser) -> PResult<Expr> {
    let factor = table_factor(p)?;
    maybe_table_alias(p, factor)
}

fn table_factor(p: &mut Parser) -> PResult<Expr> {
    match p.current_kind() {
        TokenKind::LParen => p.with_depth(|p| {
            p.advance();
            let inner = query(p)?;
            p.expect(TokenKind::RParen)?;
            Ok(Expr::Subquery { this: Box::new(inner), alias: None })
        }),
        TokenKind::Lateral => {
            p.advance();
            let this = table_factor(p)?;
            Ok(Expr::Lateral { this: Box::new(this) })
        }
        TokenKind::Unnest => {
            p.advance();
            p.expect(TokenKind::LParen)?;
            let mut expressions = Vec::new();
            loop {
                if p.at(TokenKind::RParen) {
                    break;
                }
                expressions.push(p.with_depth(expressions::expr)?);
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect(TokenKind::RParen)?;
            Ok(Expr::Unnest { expressions })
        }
        _ => table_name(p),
    }
}

/// A possibly-qualified table name. One or two parts make a `Table`; three
/// or more make a `WorkspacePath` (workspace.schema.table federation).
pub(crate) fn table_name(p: &mut Parser) -> PResult<Expr> {
    let mut parts = vec![name_identifier(p)?];
    while p.at(TokenKind::Dot) {
        p.advance();
        parts.push(name_identifier(p)?);
    }
    Ok(match parts.len() {
        1 => {
            let this = parts.pop().expect("one part");
            Expr::Table { db: None, this: Box::new(this) }
        }
        2 => {
            let this = parts.pop().expect("two parts");
            let db = parts.pop().expect("two parts");
            Expr::Table { db: Some(Box::new(db)), this: Box::new(this) }
        }
        _ => Expr::WorkspacePath { expressions: parts },
    })
}

/// An identifier usable as a name (table, column list entry, alias, CTE).
pub(crate) fn name_identifier(p: &mut Parser) -> PResult<Expr> {
    if !p.at(TokenKind::Identifier) {
        return Err(p.unexpected("expected identifier"));
    }
    let tok = p.advance();
    let quoted = is_quoted(&tok);
    Ok(Expr::Identifier { name: tok.text, quoted })
}

/// `expr [AS alias | alias]` for projection items.
fn maybe_alias(p: &mut Parser, this: Expr) -> PResult<Expr> {
    if p.eat(TokenKind::As) {
        let alias = name_identifier(p)?;
        return Ok(Expr::Alias { this: Box::new(this), alias: Box::new(alias) });
    }
    if p.at(TokenKind::Identifier) {
        let alias = name_identifier(p)?;
        return Ok(Expr::Alias { this: Box::new(this), alias: Box::new(alias) });
    }
    Ok(this)
}

/// Alias handling for table context: a derived table keeps the alias on the
/// Subquery node itself.
fn maybe_table_alias(p: &mut Parser, this: Expr) -> PResult<Expr> {
    let alias = if p.eat(TokenKind::As) {
        Some(name_identifier(p)?)
    } else if p.at(TokenKind::Identifier) {
        Some(name_identifier(p)?)
    } else {
        None
    };
    Ok(match (this, alias) {
        (Expr::Subquery { this, .. }, Some(alias)) => Expr::Subquery {
            this,
            alias: Some(Box::new(alias)),
        },
        (this, Some(alias)) => Expr::Alias {
            this: Box::new(this),
            alias: Box::new(alias),
        },
        (this, None) => this,
    })
}

// ── Modification statements ────────────────────────────────────────────

fn insert(p: &mut Parser) -> PResult<Expr> {
    p.expect(TokenKind::Insert)?;
    p.eat(TokenKind::Overwrite);
    p.eat(TokenKind::Into);
    let table = table_name(p)?;
    let mut columns = Vec::new();
    // A paren here is a column list unless it opens the source query.
    if p.at(TokenKind::LParen)
        && !matches!(
            p.nth_kind(1),
            TokenKind::Select | TokenKind::With | TokenKind::Values | TokenKind::LParen
        )
    {
        p.advance();
        columns.push(name_identifier(p)?);
        while p.eat(TokenKind::Comma) {
            columns.push(name_identifier(p)?);
        }
        p.expect(TokenKind::RParen)?;
    }
    let source = query(p)?;
    Ok(Expr::Insert {
        table: Box::new(table),
        columns,
        source: Box::new(source),
    })
}

fn update(p: &mut Parser) -> PResult<Expr> {
    p.expect(TokenKind::Update)?;
    let table = table_name(p)?;
    p.expect(TokenKind::Set)?;
    let mut assignments = Vec::new();
    loop {
        let column = assignment_target(p)?;
        p.expect(TokenKind::Eq)?;
        let value = expressions::expr(p)?;
        assignments.push(Expr::Assignment {
            column: Box::new(column),
            value: Box::new(value),
        });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    let r#where = if p.eat(TokenKind::Where) {
        Some(Box::new(Expr::Where { this: Box::new(expressions::expr(p)?) }))
    } else {
        None
    };
    Ok(Expr::Update {
        table: Box::new(table),
        assignments,
        r#where,
    })
}

/// The left side of a SET assignment: `col` or `tbl.col`.
fn assignment_target(p: &mut Parser) -> PResult<Expr> {
    let first = name_identifier(p)?;
    if p.eat(TokenKind::Dot) {
        let second = name_identifier(p)?;
        Ok(Expr::Column {
            table: Some(Box::new(first)),
            this: Box::new(second),
        })
    } else {
        Ok(Expr::Column { table: None, this: Box::new(first) })
    }
}

fn delete(p: &mut Parser) -> PResult<Expr> {
    p.expect(TokenKind::Delete)?;
    p.expect(TokenKind::From)?;
    let table = table_name(p)?;
    let r#where = if p.eat(TokenKind::Where) {
        Some(Box::new(Expr::Where { this: Box::new(expressions::expr(p)?) }))
    } else {
        None
    };
    Ok(Expr::Delete { table: Box::new(table), r#where })
}

// ── Schema statements ──────────────────────────────────────────────────

fn create(p: &mut Parser) -> PResult<Expr> {
    p.expect(TokenKind::Create)?;
    let temporary = p.eat(TokenKind::Temporary);
    let kind = match p.current_kind() {
        TokenKind::Table => "TABLE",
        TokenKind::View => "VIEW",
        TokenKind::Database => "DATABASE",
        _ => return Err(p.unexpected("expected TABLE, VIEW, or DATABASE")),
    }
    .to_string();
    p.advance();
    let not_exists = if p.eat(TokenKind::If) {
        p.expect(TokenKind::Not)?;
        p.expect(TokenKind::Exists)?;
        true
    } else {
        false
    };
    let this = table_name(p)?;

    let mut columns = Vec::new();
    if kind == "TABLE" && p.at(TokenKind::LParen) {
        p.advance();
        loop {
            columns.extend(table_element(p)?);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        p.expect(TokenKind::RParen)?;
    }

    let source = if p.eat(TokenKind::As) {
        Some(Box::new(p.with_depth(query)?))
    } else {
        None
    };

    Ok(Expr::Create {
        kind,
        this: Box::new(this),
        columns,
        source,
        not_exists,
        temporary,
    })
}

/// One element of a CREATE TABLE body: a column definition or a table
/// constraint. An inline PRIMARY KEY on a column comes back as a second
/// element so constraints stay uniform.
fn table_element(p: &mut Parser) -> PResult<Vec<Expr>> {
    match p.current_kind() {
        TokenKind::Primary => {
            p.advance();
            p.expect(TokenKind::Key)?;
            let expressions = paren_name_list(p)?;
            Ok(vec![Expr::PrimaryKey { expressions }])
        }
        TokenKind::Foreign => {
            p.advance();
            p.expect(TokenKind::Key)?;
            let expressions = paren_name_list(p)?;
            p.expect(TokenKind::References)?;
            let reference = table_name(p)?;
            let ref_columns = if p.at(TokenKind::LParen) {
                paren_name_list(p)?
            } else {
                Vec::new()
            };
            Ok(vec![Expr::ForeignKey {
                expressions,
                reference: Some(Box::new(reference)),
                ref_columns,
            }])
        }
        TokenKind::Unique => {
            p.advance();
            let expressions = paren_name_list(p)?;
            Ok(vec![Expr::Unique { expressions }])
        }
        _ => {
            let name = name_identifier(p)?;
            let data_type = expressions::data_type(p)?;
            let mut nullable = true;
            let mut default = None;
            let mut extra = Vec::new();
            loop {
                if p.eat(TokenKind::Not) {
                    p.expect(TokenKind::Null)?;
                    nullable = false;
                } else if p.eat(TokenKind::Null) {
                    nullable = true;
                } else if p.eat(TokenKind::Default) {
                    default = Some(Box::new(expressions::expr(p)?));
                } else if p.eat(TokenKind::Primary) {
                    p.expect(TokenKind::Key)?;
                    extra.push(Expr::PrimaryKey { expressions: vec![name.clone()] });
                } else if p.eat(TokenKind::Unique) {
                    extra.push(Expr::Unique { expressions: vec![name.clone()] });
                } else {
                    break;
                }
            }
            let mut out = vec![Expr::ColumnDef {
                this: Box::new(name),
                data_type: Box::new(data_type),
                nullable,
                default,
            }];
            out.extend(extra);
            Ok(out)
        }
    }
}

fn paren_name_list(p: &mut Parser) -> PResult<Vec<Expr>> {
    p.expect(TokenKind::LParen)?;
    let mut names = vec![name_identifier(p)?];
    while p.eat(TokenKind::Comma) {
        names.push(name_identifier(p)?);
    }
    p.expect(TokenKind::RParen)?;
    Ok(names)
}

fn drop_statement(p: &mut Parser) -> PResult<Expr> {
    p.expect(TokenKind::Drop)?;
    let kind = match p.current_kind() {
        TokenKind::Table => "TABLE",
        TokenKind::View => "VIEW",
        TokenKind::Database => "DATABASE",
        _ => return Err(p.unexpected("expected TABLE, VIEW, or DATABASE")),
    }
    .to_string();
    p.advance();
    let exists = if p.eat(TokenKind::If) {
        p.expect(TokenKind::Exists)?;
        true
    } else {
        false
    };
    let this = table_name(p)?;
    Ok(Expr::Drop { kind, this: Box::new(this), exists })
}

fn alter(p: &mut Parser) -> PResult<Expr> {
    p.expect(TokenKind::Alter)?;
    p.expect(TokenKind::Table)?;
    let this = table_name(p)?;
    let mut actions = Vec::new();
    loop {
        if p.eat(TokenKind::Add) {
            p.eat(TokenKind::Column);
            let name = name_identifier(p)?;
            let data_type = expressions::data_type(p)?;
            let mut nullable = true;
            if p.eat(TokenKind::Not) {
                p.expect(TokenKind::Null)?;
                nullable = false;
            }
            actions.push(Expr::AddColumn {
                def: Box::new(Expr::ColumnDef {
                    this: Box::new(name),
                    data_type: Box::new(data_type),
                    nullable,
                    default: None,
                }),
            });
        } else if p.eat(TokenKind::Drop) {
            p.eat(TokenKind::Column);
            let name = name_identifier(p)?;
            actions.push(Expr::DropColumn { this: Box::new(name) });
        } else if p.eat(TokenKind::Rename) {
            p.expect(TokenKind::To)?;
            let name = name_identifier(p)?;
            actions.push(Expr::RenameTo { this: Box::new(name) });
        } else if actions.is_empty() {
            return Err(p.unexpected("expected ADD, DROP, or RENAME"));
        } else {
            break;
        }
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    Ok(Expr::Alter { this: Box::new(this), actions })
}
