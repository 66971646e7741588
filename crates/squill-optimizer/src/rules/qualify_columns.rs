//! Resolve bare column references to table-qualified form.
//!
//! Schema-dependent: every source of a select must be a plain table with a
//! known column list, and a bare name must belong to exactly one of them.
//! Anything less provable is left alone.

use rustc_hash::FxHashMap;
use squill_ast::Expr;

use super::{map_columns_shallow, Rule};
use crate::OptimizeContext;

pub struct QualifyColumns;

impl Rule for QualifyColumns {
    fn name(&self) -> &'static str {
        "qualify_columns"
    }

    fn apply(&self, expr: Expr, ctx: &OptimizeContext) -> Expr {
        if ctx.schema.is_none() {
            return expr;
        }
        expr.transform(&mut |e| match e {
            select @ Expr::Select { .. } => qualify(select, ctx),
            other => other,
        })
    }
}

fn qualify(select: Expr, ctx: &OptimizeContext) -> Expr {
    let Some(owners) = column_owners(&select, ctx) else {
        return select;
    };
    let Expr::Select {
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
    } = select
    else {
        unreachable!("qualify is only called on Select nodes");
    };

    let mut rewrite = |e: Expr| {
        map_columns_shallow(e, &mut |col| match col {
            Expr::Column { table: None, this } => {
                let owner = this
                    .name()
                    .and_then(|n| owners.get(&n.to_lowercase()))
                    .and_then(|o| o.clone());
                match owner {
                    Some(owner) => Expr::Column {
                        table: Some(Box::new(Expr::ident(owner))),
                        this,
                    },
                    None => Expr::Column { table: None, this },
                }
            }
            other => other,
        })
    };

    let projections = projections.into_iter().map(&mut rewrite).collect();
    let group_by = group_by.into_iter().map(&mut rewrite).collect();
    let order_by = order_by.into_iter().map(&mut rewrite).collect();
    let r#where = r#where.map(|w| Box::new(rewrite(*w)));
    let having = having.map(|h| Box::new(rewrite(*h)));
    let joins = joins
        .into_iter()
        .map(|j| match j {
            Expr::Join { kind, this, on } => Expr::Join {
                kind,
                this,
                on: on.map(|o| Box::new(rewrite(*o))),
            },
            other => other,
        })
        .collect();

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

/// Map each column name to its unique owning source, or `None` when the
/// name is ambiguous. Returns `None` overall when any source is opaque.
fn column_owners(select: &Expr, ctx: &OptimizeContext) -> Option<FxHashMap<String, Option<String>>> {
    let schema = ctx.schema.as_ref()?;
    let Expr::Select { from, joins, .. } = select else {
        return None;
    };

    let mut sources: Vec<(String, String)> = Vec::new(); // (alias, schema key)
    let mut add_source = |e: &Expr| -> bool {
        match e {
            Expr::Table { db, this } => {
                let name = match this.name() {
                    Some(n) => n.to_lowercase(),
                    None => return false,
                };
                let key = match db.as_ref().and_then(|d| d.name()) {
                    Some(db) => format!("{}.{name}", db.to_lowercase()),
                    None => name.clone(),
                };
                sources.push((name, key));
                true
            }
            Expr::Alias { this, alias } => {
                if let (Expr::Table { db, this: table }, Some(alias)) = (this.as_ref(), alias.name()) {
                    let name = match table.name() {
                        Some(n) => n.to_lowercase(),
                        None => return false,
                    };
                    let key = match db.as_ref().and_then(|d| d.name()) {
                        Some(db) => format!("{}.{name}", db.to_lowercase()),
                        None => name,
                    };
                    sources.push((alias.to_lowercase(), key));
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    };

    if let Some(from_box) = from {
        let Expr::From { expressions } = from_box.as_ref() else {
            return None;
        };
        for e in expressions {
            if !add_source(e) {
                return None;
            }
        }
    } else {
        return None;
    }
    for join in joins {
        let Expr::Join { this, .. } = join else { return None };
        if !add_source(this) {
            return None;
        }
    }

    let mut owners: FxHashMap<String, Option<String>> = FxHashMap::default();
    for (alias, key) in &sources {
        let columns = schema.get(key)?;
        for col in columns {
            owners
                .entry(col.to_lowercase())
                .and_modify(|o| *o = None) // seen twice: ambiguous
                .or_insert_with(|| Some(alias.clone()));
        }
    }
    Some(owners)
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

    fn ctx() -> OptimizeContext {
        let mut schema = FxHashMap::default();
        schema.insert("t".to_string(), vec!["a".to_string(), "b".to_string()]);
        schema.insert("u".to_string(), vec!["b".to_string(), "c".to_string()]);
        OptimizeContext::default().with_schema(schema)
    }

    fn run(sql: &str) -> String {
        let out = QualifyColumns.apply(parse_one(sql), &ctx());
        squill_gen::Generator::new(squill_gen::GenConfig::default()).generate(&out)
    }

    #[test]
    fn qualifies_unambiguous_columns() {
        assert_eq!(
            run("select a, c from t join u on t.b = u.b"),
            "SELECT t.a, u.c FROM t JOIN u ON t.b = u.b"
        );
    }

    #[test]
    fn ambiguous_columns_stay_bare() {
        // b exists in both t and u.
        assert_eq!(
            run("select b from t join u on a = c"),
            "SELECT b FROM t JOIN u ON t.a = u.c"
        );
    }

    #[test]
    fn no_schema_means_no_rewrite() {
        let out = QualifyColumns.apply(
            parse_one("select a from t"),
            &OptimizeContext::default(),
        );
        let sql = squill_gen::Generator::new(squill_gen::GenConfig::default()).generate(&out);
        assert_eq!(sql, "SELECT a FROM t");
    }

    #[test]
    fn unknown_table_means_no_rewrite() {
        assert_eq!(run("select a from unknown_table"), "SELECT a FROM unknown_table");
    }

    #[test]
    fn idempotent() {
        let once = QualifyColumns.apply(parse_one("select a from t"), &ctx());
        let twice = QualifyColumns.apply(once.clone(), &ctx());
        assert_eq!(twice, once);
    }
}
