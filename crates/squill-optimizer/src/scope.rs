//! Per-query name-resolution scopes.
//!
//! A scope records what a point in the query can see: registered sources
//! (tables and nested scopes), CTE reference counts, and the column names
//! referenced inside it. Scopes are built on demand by rules that need
//! them, are read-only afterwards, and never form cycles: children are
//! owned, there are no parent pointers.

use rustc_hash::{FxHashMap, FxHashSet};
use squill_ast::Expr;

/// Why this scope exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    Subquery,
    DerivedTable,
    Cte,
    Union,
    Udtf,
}

/// One visible source inside a scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A plain table: its bare name and its qualified form.
    Table { name: String, qualified: String },
    /// A nested scope (CTE or derived table), by index into `children`.
    Scope(usize),
}

/// A name-resolution scope for one query level.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Source name (lower-cased) to binding.
    pub sources: FxHashMap<String, Source>,
    /// CTE name (lower-cased) to reference count within this scope's query.
    pub cte_refs: FxHashMap<String, usize>,
    /// Column names (lower-cased) referenced in this scope.
    pub columns: FxHashSet<String>,
    /// Nested scopes in registration order.
    pub children: Vec<Scope>,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            sources: FxHashMap::default(),
            cte_refs: FxHashMap::default(),
            columns: FxHashSet::default(),
            children: Vec::new(),
        }
    }

    /// Build the scope tree for a query expression.
    pub fn build(root: &Expr) -> Scope {
        let mut stack = Vec::new();
        build_scope(root, ScopeKind::Root, &mut stack)
    }

    /// Reference count of a CTE registered in this scope.
    pub fn ref_count(&self, name: &str) -> usize {
        self.cte_refs.get(&name.to_lowercase()).copied().unwrap_or(0)
    }
}

/// Stack of CTE-counter frames, one per scope under construction. Lookup
/// searches from the innermost frame out, which is what makes shadowed CTE
/// names resolve to the nearest definition.
type CteStack = Vec<FxHashMap<String, usize>>;

fn bump_cte(stack: &mut CteStack, name: &str) {
    let key = name.to_lowercase();
    for frame in stack.iter_mut().rev() {
        if let Some(count) = frame.get_mut(&key) {
            *count += 1;
            return;
        }
    }
}

fn build_scope(expr: &Expr, kind: ScopeKind, stack: &mut CteStack) -> Scope {
    let mut scope = Scope::new(kind);
    stack.push(FxHashMap::default());
    collect(expr, &mut scope, stack);
    scope.cte_refs = stack.pop().unwrap_or_default();
    scope
}

fn collect(expr: &Expr, scope: &mut Scope, stack: &mut CteStack) {
    match expr {
        Expr::With { ctes, this, .. } => {
            for cte in ctes {
                if let Expr::Cte { alias, this: body } = cte {
                    let name = alias.name().unwrap_or_default().to_lowercase();
                    // Registered before the body builds, so a recursive CTE
                    // can see itself.
                    if let Some(frame) = stack.last_mut() {
                        frame.insert(name.clone(), 0);
                    }
                    let child = build_scope(body, ScopeKind::Cte, stack);
                    scope.sources.insert(name, Source::Scope(scope.children.len()));
                    scope.children.push(child);
                }
            }
            // The outer query is this scope's primary query.
            collect(this, scope, stack);
        }
        Expr::Select {
            projections,
            from,
            joins,
            r#where,
            group_by,
            having,
            order_by,
            limit,
            offset,
            ..
        } => {
            if let Some(from) = from {
                if let Expr::From { expressions } = from.as_ref() {
                    for table in expressions {
                        register_source(table, scope, stack);
                    }
                }
            }
            for join in joins {
                if let Expr::Join { this, on, .. } = join {
                    register_source(this, scope, stack);
                    if let Some(on) = on {
                        walk_expr(on, scope, stack);
                    }
                }
            }
            for e in projections {
                walk_expr(e, scope, stack);
            }
            for clause in [r#where, having, limit, offset].into_iter().flat_map(|o| o.as_ref()) {
                walk_expr(clause, scope, stack);
            }
            for e in group_by.iter().chain(order_by.iter()) {
                walk_expr(e, scope, stack);
            }
        }
        Expr::Union { left, right, .. } => {
            let l = build_scope(left, ScopeKind::Union, stack);
            scope.children.push(l);
            let r = build_scope(right, ScopeKind::Union, stack);
            scope.children.push(r);
        }
        Expr::Intersect { left, right } | Expr::Except { left, right } => {
            let l = build_scope(left, ScopeKind::Union, stack);
            scope.children.push(l);
            let r = build_scope(right, ScopeKind::Union, stack);
            scope.children.push(r);
        }
        _ => {
            for child in expr.children() {
                collect(child, scope, stack);
            }
        }
    }
}

fn register_source(expr: &Expr, scope: &mut Scope, stack: &mut CteStack) {
    match expr {
        Expr::Alias { this, alias } => {
            let name = alias.name().unwrap_or_default().to_lowercase();
            match this.as_ref() {
                Expr::Table { db, this: table_name } => {
                    let bare = table_name.name().unwrap_or_default();
                    bump_cte(stack, bare);
                    let qualified = qualified_name(db.as_deref(), bare);
                    scope.sources.insert(name, Source::Table { name: bare.to_lowercase(), qualified });
                }
                inner => {
                    let child = build_scope(inner, ScopeKind::DerivedTable, stack);
                    scope.sources.insert(name, Source::Scope(scope.children.len()));
                    scope.children.push(child);
                }
            }
        }
        Expr::Table { db, this } => {
            let bare = this.name().unwrap_or_default();
            bump_cte(stack, bare);
            let qualified = qualified_name(db.as_deref(), bare);
            scope
                .sources
                .insert(bare.to_lowercase(), Source::Table { name: bare.to_lowercase(), qualified });
        }
        Expr::WorkspacePath { expressions } => {
            let parts: Vec<&str> = expressions.iter().filter_map(|e| e.name()).collect();
            if let Some(last) = parts.last() {
                scope.sources.insert(
                    last.to_lowercase(),
                    Source::Table {
                        name: last.to_lowercase(),
                        qualified: parts.join("."),
                    },
                );
            }
        }
        Expr::Subquery { this, alias } => {
            let child = build_scope(this, ScopeKind::DerivedTable, stack);
            let name = alias
                .as_ref()
                .and_then(|a| a.name())
                .map(|n| n.to_lowercase())
                .unwrap_or_else(|| format!("_d{}", scope.children.len()));
            scope.sources.insert(name, Source::Scope(scope.children.len()));
            scope.children.push(child);
        }
        Expr::Lateral { this } => register_source(this, scope, stack),
        Expr::Unnest { expressions } => {
            let child = Scope::new(ScopeKind::Udtf);
            scope
                .sources
                .insert(format!("_u{}", scope.children.len()), Source::Scope(scope.children.len()));
            scope.children.push(child);
            for e in expressions {
                walk_expr(e, scope, stack);
            }
        }
        other => walk_expr(other, scope, stack),
    }
}

/// Walk an expression inside a scope: record column references, bump CTE
/// counts for qualifying references, and spawn child scopes at subquery
/// boundaries.
fn walk_expr(expr: &Expr, scope: &mut Scope, stack: &mut CteStack) {
    match expr {
        Expr::Column { table, this } => {
            if let Some(name) = this.name() {
                scope.columns.insert(name.to_lowercase());
            }
            if let Some(qualifier) = table.as_ref().and_then(|t| t.name()) {
                bump_cte(stack, qualifier);
            }
        }
        Expr::Subquery { this, .. } => {
            let child = build_scope(this, ScopeKind::Subquery, stack);
            scope.children.push(child);
        }
        Expr::Exists { query } | Expr::InSubquery { query, .. } => {
            if let Expr::InSubquery { this, .. } = expr {
                walk_expr(this, scope, stack);
            }
            let child = build_scope(query, ScopeKind::Subquery, stack);
            scope.children.push(child);
        }
        Expr::Select { .. } | Expr::With { .. } => {
            let child = build_scope(expr, ScopeKind::Subquery, stack);
            scope.children.push(child);
        }
        _ => {
            for child in expr.children() {
                walk_expr(child, scope, stack);
            }
        }
    }
}

fn qualified_name(db: Option<&Expr>, name: &str) -> String {
    match db.and_then(|d| d.name()) {
        Some(db) => format!("{db}.{name}"),
        None => name.to_string(),
    }
}
