use std::collections::VecDeque;

use crate::expr::Expr;
use crate::kind::ExprKind;

impl Expr {
    /// The node's children in declaration order.
    ///
    /// This is the single source of truth for traversal: list-valued args
    /// contribute every element in order, optional args contribute when
    /// present, scalars contribute nothing.
    pub fn children(&self) -> Vec<&Expr> {
        use Expr::*;
        match self {
            Number { .. } | Str { .. } | Null | Boolean { .. } | Star | Placeholder
            | Parameter { .. } | Identifier { .. } => Vec::new(),

            Column { table, this } => opt_one(table, this),
            Table { db, this } => opt_one(db, this),
            Alias { this, alias } => vec![this, alias],
            Dot { left, right }
            | Add { left, right }
            | Sub { left, right }
            | Mul { left, right }
            | Div { left, right }
            | Mod { left, right }
            | And { left, right }
            | Or { left, right }
            | Xor { left, right }
            | Eq { left, right }
            | Neq { left, right }
            | Lt { left, right }
            | Gt { left, right }
            | Lte { left, right }
            | Gte { left, right }
            | Is { left, right }
            | Union { left, right, .. }
            | Intersect { left, right }
            | Except { left, right } => vec![left, right],

            Bracket { this, expressions } => one_list(this, expressions),
            Not { this } | Neg { this } | Paren { this } | IsNull { this } | IsNotNull { this }
            | Where { this } | Having { this } | Ordered { this, .. } | Limit { this }
            | Offset { this } | Lateral { this } | Interval { this, .. } | Explain { this }
            | Comment { this, .. } | DropColumn { this } | RenameTo { this } | Drop { this, .. } => {
                vec![this]
            }

            Like { this, pattern } | Ilike { this, pattern } => vec![this, pattern],
            InList { this, expressions } => one_list(this, expressions),
            InSubquery { this, query } => vec![this, query],
            Between { this, low, high } => vec![this, low, high],
            Exists { query } => vec![query],

            Case { operand, whens, otherwise } => {
                let mut out = Vec::new();
                if let Some(op) = operand {
                    out.push(op.as_ref());
                }
                out.extend(whens.iter());
                if let Some(e) = otherwise {
                    out.push(e.as_ref());
                }
                out
            }
            When { condition, result } => vec![condition, result],

            Cast { this, to } | TypedExpr { this, to } => vec![this, to],
            DataType { params, .. } => params.iter().collect(),
            Function { args, .. } => args.iter().collect(),

            Select {
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
                let mut out: Vec<&Expr> = projections.iter().collect();
                if let Some(f) = from {
                    out.push(f.as_ref());
                }
                out.extend(joins.iter());
                if let Some(w) = r#where {
                    out.push(w.as_ref());
                }
                out.extend(group_by.iter());
                if let Some(h) = having {
                    out.push(h.as_ref());
                }
                out.extend(order_by.iter());
                if let Some(l) = limit {
                    out.push(l.as_ref());
                }
                if let Some(o) = offset {
                    out.push(o.as_ref());
                }
                out
            }
            From { expressions } => expressions.iter().collect(),
            Join { this, on, .. } => {
                let mut out = vec![this.as_ref()];
                if let Some(on) = on {
                    out.push(on.as_ref());
                }
                out
            }
            Distinct { expressions } => expressions.iter().collect(),
            Subquery { this, alias } => {
                let mut out = vec![this.as_ref()];
                if let Some(a) = alias {
                    out.push(a.as_ref());
                }
                out
            }
            Values { rows } => rows.iter().collect(),
            Tuple { expressions } => expressions.iter().collect(),

            Insert { table, columns, source } => {
                let mut out = vec![table.as_ref()];
                out.extend(columns.iter());
                out.push(source.as_ref());
                out
            }
            Update { table, assignments, r#where } => {
                let mut out = vec![table.as_ref()];
                out.extend(assignments.iter());
                if let Some(w) = r#where {
                    out.push(w.as_ref());
                }
                out
            }
            Assignment { column, value } => vec![column, value],
            Delete { table, r#where } => {
                let mut out = vec![table.as_ref()];
                if let Some(w) = r#where {
                    out.push(w.as_ref());
                }
                out
            }

            Create { this, columns, source, .. } => {
                let mut out = vec![this.as_ref()];
                out.extend(columns.iter());
                if let Some(s) = source {
                    out.push(s.as_ref());
                }
                out
            }
            Alter { this, actions } => one_list(this, actions),
            AddColumn { def } => vec![def],
            With { ctes, this, .. } => {
                let mut out: Vec<&Expr> = ctes.iter().collect();
                out.push(this.as_ref());
                out
            }
            Cte { alias, this } => vec![alias, this],
            ColumnDef { this, data_type, default, .. } => {
                let mut out = vec![this.as_ref(), data_type.as_ref()];
                if let Some(d) = default {
                    out.push(d.as_ref());
                }
                out
            }
            PrimaryKey { expressions } | Unique { expressions } => expressions.iter().collect(),
            ForeignKey { expressions, reference, ref_columns } => {
                let mut out: Vec<&Expr> = expressions.iter().collect();
                if let Some(r) = reference {
                    out.push(r.as_ref());
                }
                out.extend(ref_columns.iter());
                out
            }

            Window { this, partition_by, order_by } => {
                let mut out = vec![this.as_ref()];
                out.extend(partition_by.iter());
                out.extend(order_by.iter());
                out
            }
            Unnest { expressions }
            | Array { expressions }
            | Struct { expressions }
            | Hint { expressions }
            | WorkspacePath { expressions } => expressions.iter().collect(),
            Map { keys, values } => keys.iter().chain(values.iter()).collect(),
            JsonExtract { this, path } => vec![this, path],
        }
    }

    /// Breadth-first stream of this node and all descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self, Order::Bfs)
    }

    /// Pre-order depth-first stream of this node and all descendants.
    pub fn walk_dfs(&self) -> Walk<'_> {
        Walk::new(self, Order::Dfs)
    }

    /// Whether any node in the subtree has the given kind.
    pub fn contains_kind(&self, kind: ExprKind) -> bool {
        self.walk().any(|e| e.kind() == kind)
    }
}

fn opt_one<'a>(opt: &'a Option<Box<Expr>>, this: &'a Expr) -> Vec<&'a Expr> {
    match opt {
        Some(e) => vec![e.as_ref(), this],
        None => vec![this],
    }
}

fn one_list<'a>(this: &'a Expr, list: &'a [Expr]) -> Vec<&'a Expr> {
    let mut out = vec![this];
    out.extend(list.iter());
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Bfs,
    Dfs,
}

/// Iterator over a subtree, yielding the root first.
///
/// BFS uses a queue; DFS uses the same deque as a stack, pushing children in
/// reverse so the stream follows source order.
pub struct Walk<'a> {
    pending: VecDeque<&'a Expr>,
    order: Order,
}

impl<'a> Walk<'a> {
    fn new(root: &'a Expr, order: Order) -> Self {
        let mut pending = VecDeque::new();
        pending.push_back(root);
        Self { pending, order }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<&'a Expr> {
        match self.order {
            Order::Bfs => {
                let node = self.pending.pop_front()?;
                self.pending.extend(node.children());
                Some(node)
            }
            Order::Dfs => {
                let node = self.pending.pop_back()?;
                for child in node.children().into_iter().rev() {
                    self.pending.push_back(child);
                }
                Some(node)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // a + b * c
    fn sample() -> Expr {
        Expr::Add {
            left: Box::new(Expr::column("a")),
            right: Box::new(Expr::Mul {
                left: Box::new(Expr::column("b")),
                right: Box::new(Expr::column("c")),
            }),
        }
    }

    fn kinds(iter: impl Iterator<Item = ExprKind>) -> Vec<ExprKind> {
        iter.collect()
    }

    #[test]
    fn bfs_yields_level_order() {
        let expr = sample();
        let got = kinds(expr.walk().map(|e| e.kind()));
        assert_eq!(
            got,
            vec![
                ExprKind::Add,
                ExprKind::Column,
                ExprKind::Mul,
                ExprKind::Identifier,
                ExprKind::Column,
                ExprKind::Column,
                ExprKind::Identifier,
                ExprKind::Identifier,
            ]
        );
    }

    #[test]
    fn dfs_is_preorder() {
        let expr = sample();
        let got = kinds(expr.walk_dfs().map(|e| e.kind()));
        assert_eq!(
            got,
            vec![
                ExprKind::Add,
                ExprKind::Column,
                ExprKind::Identifier,
                ExprKind::Mul,
                ExprKind::Column,
                ExprKind::Identifier,
                ExprKind::Column,
                ExprKind::Identifier,
            ]
        );
    }

    #[test]
    fn leaf_has_only_itself() {
        let expr = Expr::Null;
        assert_eq!(expr.walk().count(), 1);
    }

    #[test]
    fn contains_kind_sees_descendants() {
        let expr = sample();
        assert!(expr.contains_kind(ExprKind::Mul));
        assert!(!expr.contains_kind(ExprKind::Select));
    }
}
