use crate::expr::Expr;

impl Expr {
    /// Post-order structural rewrite.
    ///
    /// Every child is transformed first (lists keep their order, scalar args
    /// are carried over unchanged), the node is rebuilt from the rewritten
    /// children, and `f` is applied to the rebuilt node. The input is
    /// consumed; the returned tree shares no node with it unless `f` returns
    /// one. `transform(|e| e)` is the structural identity.
    pub fn transform<F>(self, f: &mut F) -> Expr
    where
        F: FnMut(Expr) -> Expr,
    {
        let rebuilt = self.map_children(&mut |child| child.transform(f));
        f(rebuilt)
    }

    /// Rebuild this node with each direct child passed through `f`, one
    /// level only. `transform` is this plus recursion; rules use it
    /// directly when they must stop at query boundaries.
    pub fn map_children<F>(self, f: &mut F) -> Expr
    where
        F: FnMut(Expr) -> Expr,
    {
        use Expr::*;
        match self {
            Number { .. } | Str { .. } | Null | Boolean { .. } | Star | Placeholder
            | Parameter { .. } | Identifier { .. } => self,

            Column { table, this } => Column { table: opt(table, f), this: one(this, f) },
            Table { db, this } => Table { db: opt(db, f), this: one(this, f) },
            Alias { this, alias } => Alias { this: one(this, f), alias: one(alias, f) },
            Dot { left, right } => Dot { left: one(left, f), right: one(right, f) },
            Bracket { this, expressions } => Bracket {
                this: one(this, f),
                expressions: list(expressions, f),
            },

            Add { left, right } => Add { left: one(left, f), right: one(right, f) },
            Sub { left, right } => Sub { left: one(left, f), right: one(right, f) },
            Mul { left, right } => Mul { left: one(left, f), right: one(right, f) },
            Div { left, right } => Div { left: one(left, f), right: one(right, f) },
            Mod { left, right } => Mod { left: one(left, f), right: one(right, f) },
            And { left, right } => And { left: one(left, f), right: one(right, f) },
            Or { left, right } => Or { left: one(left, f), right: one(right, f) },
            Xor { left, right } => Xor { left: one(left, f), right: one(right, f) },
            Eq { left, right } => Eq { left: one(left, f), right: one(right, f) },
            Neq { left, right } => Neq { left: one(left, f), right: one(right, f) },
            Lt { left, right } => Lt { left: one(left, f), right: one(right, f) },
            Gt { left, right } => Gt { left: one(left, f), right: one(right, f) },
            Lte { left, right } => Lte { left: one(left, f), right: one(right, f) },
            Gte { left, right } => Gte { left: one(left, f), right: one(right, f) },
            Is { left, right } => Is { left: one(left, f), right: one(right, f) },

            Not { this } => Not { this: one(this, f) },
            Neg { this } => Neg { this: one(this, f) },
            Paren { this } => Paren { this: one(this, f) },

            IsNull { this } => IsNull { this: one(this, f) },
            IsNotNull { this } => IsNotNull { this: one(this, f) },
            Like { this, pattern } => Like { this: one(this, f), pattern: one(pattern, f) },
            Ilike { this, pattern } => Ilike { this: one(this, f), pattern: one(pattern, f) },
            InList { this, expressions } => InList {
                this: one(this, f),
                expressions: list(expressions, f),
            },
            InSubquery { this, query } => InSubquery { this: one(this, f), query: one(query, f) },
            Between { this, low, high } => Between {
                this: one(this, f),
                low: one(low, f),
                high: one(high, f),
            },
            Exists { query } => Exists { query: one(query, f) },

            Case { operand, whens, otherwise } => Case {
                operand: opt(operand, f),
                whens: list(whens, f),
                otherwise: opt(otherwise, f),
            },
            When { condition, result } => When {
                condition: one(condition, f),
                result: one(result, f),
            },

            Cast { this, to } => Cast { this: one(this, f), to: one(to, f) },
            TypedExpr { this, to } => TypedExpr { this: one(this, f), to: one(to, f) },
            DataType { name, params } => DataType { name, params: list(params, f) },
            Function { name, args, distinct } => Function {
                name,
                args: list(args, f),
                distinct,
            },

            Select {
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
            } => Select {
                projections: list(projections, f),
                distinct,
                from: opt(from, f),
                joins: list(joins, f),
                r#where: opt(r#where, f),
                group_by: list(group_by, f),
                having: opt(having, f),
                order_by: list(order_by, f),
                limit: opt(limit, f),
                offset: opt(offset, f),
            },
            From { expressions } => From { expressions: list(expressions, f) },
            Join { kind, this, on } => Join {
                kind,
                this: one(this, f),
                on: opt(on, f),
            },
            Where { this } => Where { this: one(this, f) },
            Having { this } => Having { this: one(this, f) },
            Ordered { this, desc } => Ordered { this: one(this, f), desc },
            Limit { this } => Limit { this: one(this, f) },
            Offset { this } => Offset { this: one(this, f) },
            Distinct { expressions } => Distinct { expressions: list(expressions, f) },
            Subquery { this, alias } => Subquery {
                this: one(this, f),
                alias: opt(alias, f),
            },
            Values { rows } => Values { rows: list(rows, f) },
            Tuple { expressions } => Tuple { expressions: list(expressions, f) },
            Union { left, right, distinct } => Union {
                left: one(left, f),
                right: one(right, f),
                distinct,
            },
            Intersect { left, right } => Intersect { left: one(left, f), right: one(right, f) },
            Except { left, right } => Except { left: one(left, f), right: one(right, f) },

            Insert { table, columns, source } => Insert {
                table: one(table, f),
                columns: list(columns, f),
                source: one(source, f),
            },
            Update { table, assignments, r#where } => Update {
                table: one(table, f),
                assignments: list(assignments, f),
                r#where: opt(r#where, f),
            },
            Assignment { column, value } => Assignment {
                column: one(column, f),
                value: one(value, f),
            },
            Delete { table, r#where } => Delete {
                table: one(table, f),
                r#where: opt(r#where, f),
            },

            Create {
                kind,
                this,
                columns,
                source,
                not_exists,
                temporary,
            } => Create {
                kind,
                this: one(this, f),
                columns: list(columns, f),
                source: opt(source, f),
                not_exists,
                temporary,
            },
            Drop { kind, this, exists } => Drop {
                kind,
                this: one(this, f),
                exists,
            },
            Alter { this, actions } => Alter {
                this: one(this, f),
                actions: list(actions, f),
            },
            AddColumn { def } => AddColumn { def: one(def, f) },
            DropColumn { this } => DropColumn { this: one(this, f) },
            RenameTo { this } => RenameTo { this: one(this, f) },
            With { ctes, this, recursive } => With {
                ctes: list(ctes, f),
                this: one(this, f),
                recursive,
            },
            Cte { alias, this } => Cte { alias: one(alias, f), this: one(this, f) },
            ColumnDef {
                this,
                data_type,
                nullable,
                default,
            } => ColumnDef {
                this: one(this, f),
                data_type: one(data_type, f),
                nullable,
                default: opt(default, f),
            },
            PrimaryKey { expressions } => PrimaryKey { expressions: list(expressions, f) },
            ForeignKey { expressions, reference, ref_columns } => ForeignKey {
                expressions: list(expressions, f),
                reference: opt(reference, f),
                ref_columns: list(ref_columns, f),
            },
            Unique { expressions } => Unique { expressions: list(expressions, f) },

            Window { this, partition_by, order_by } => Window {
                this: one(this, f),
                partition_by: list(partition_by, f),
                order_by: list(order_by, f),
            },
            Lateral { this } => Lateral { this: one(this, f) },
            Unnest { expressions } => Unnest { expressions: list(expressions, f) },
            Array { expressions } => Array { expressions: list(expressions, f) },
            Map { keys, values } => Map {
                keys: list(keys, f),
                values: list(values, f),
            },
            Struct { expressions } => Struct { expressions: list(expressions, f) },
            JsonExtract { this, path } => JsonExtract {
                this: one(this, f),
                path: one(path, f),
            },
            Interval { this, unit } => Interval { this: one(this, f), unit },
            Explain { this } => Explain { this: one(this, f) },
            Comment { kind, this, value } => Comment {
                kind,
                this: one(this, f),
                value,
            },
            Hint { expressions } => Hint { expressions: list(expressions, f) },
            WorkspacePath { expressions } => WorkspacePath { expressions: list(expressions, f) },
        }
    }
}

fn one<F: FnMut(Expr) -> Expr>(e: Box<Expr>, f: &mut F) -> Box<Expr> {
    Box::new(f(*e))
}

fn opt<F: FnMut(Expr) -> Expr>(e: Option<Box<Expr>>, f: &mut F) -> Option<Box<Expr>> {
    e.map(|e| one(e, f))
}

fn list<F: FnMut(Expr) -> Expr>(v: Vec<Expr>, f: &mut F) -> Vec<Expr> {
    v.into_iter().map(|e| f(e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Expr {
        // (a + 1) * b
        Expr::Mul {
            left: Box::new(Expr::Paren {
                this: Box::new(Expr::Add {
                    left: Box::new(Expr::column("a")),
                    right: Box::new(Expr::number("1")),
                }),
            }),
            right: Box::new(Expr::column("b")),
        }
    }

    #[test]
    fn identity_preserves_structure() {
        let expr = sample();
        let copy = expr.clone();
        assert_eq!(copy.transform(&mut |e| e), expr);
    }

    #[test]
    fn rewrites_are_post_order() {
        // Replace every column with NULL; the rebuilt Add must already hold
        // the rewritten children when f sees it.
        let mut saw_add_with_null = false;
        let out = sample().transform(&mut |e| match e {
            Expr::Column { .. } => Expr::Null,
            Expr::Add { ref left, .. } => {
                saw_add_with_null = left.is_null_literal();
                e
            }
            other => other,
        });
        assert!(saw_add_with_null);
        assert!(out.walk().all(|e| !matches!(e, Expr::Column { .. })));
    }

    #[test]
    fn scalar_args_survive_rebuild() {
        let ordered = Expr::Ordered {
            this: Box::new(Expr::column("a")),
            desc: true,
        };
        match ordered.transform(&mut |e| e) {
            Expr::Ordered { desc, .. } => assert!(desc),
            other => panic!("unexpected variant {:?}", other.kind()),
        }
    }
}
