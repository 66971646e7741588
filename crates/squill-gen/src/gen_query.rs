//! Default renderings for query and statement forms.
//!
//! Clause order follows the statement grammar: projection, FROM, joins,
//! WHERE, GROUP BY, HAVING, ORDER BY, LIMIT, OFFSET. Clauses join with a
//! space, or a newline in pretty mode.

use squill_ast::Expr;

use crate::Generator;

impl Generator {
    pub(crate) fn select_sql(&self, expr: &Expr) -> String {
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
        } = expr
        else {
            unreachable!("select_sql requires a Select");
        };

        let mut clauses = Vec::new();
        let mut head = self.keyword("SELECT");
        if *distinct {
            head.push(' ');
            head.push_str(&self.keyword("DISTINCT"));
        }
        head.push(' ');
        head.push_str(&self.csv(projections));
        clauses.push(head);

        if let Some(from) = from {
            clauses.push(self.sql(from));
        }
        for join in joins {
            clauses.push(self.sql(join));
        }
        if let Some(w) = r#where {
            clauses.push(self.sql(w));
        }
        if !group_by.is_empty() {
            clauses.push(format!("{} {}", self.keyword("GROUP BY"), self.csv(group_by)));
        }
        if let Some(h) = having {
            clauses.push(self.sql(h));
        }
        if !order_by.is_empty() {
            clauses.push(format!("{} {}", self.keyword("ORDER BY"), self.csv(order_by)));
        }
        if let Some(l) = limit {
            clauses.push(self.sql(l));
        }
        if let Some(o) = offset {
            clauses.push(self.sql(o));
        }
        clauses.join(self.clause_sep())
    }

    pub(crate) fn join_sql(&self, kind: &str, this: &Expr, on: Option<&Expr>) -> String {
        let mut out = String::new();
        if !kind.is_empty() {
            out.push_str(&self.keyword(kind));
            out.push(' ');
        }
        out.push_str(&self.keyword("JOIN"));
        out.push(' ');
        out.push_str(&self.sql(this));
        if let Some(on) = on {
            out.push(' ');
            out.push_str(&self.keyword("ON"));
            out.push(' ');
            out.push_str(&self.sql(on));
        }
        out
    }

    pub(crate) fn subquery_sql(&self, this: &Expr, alias: Option<&Expr>) -> String {
        let mut out = format!("({})", self.sql(this));
        if let Some(alias) = alias {
            out.push(' ');
            out.push_str(&self.keyword("AS"));
            out.push(' ');
            out.push_str(&self.sql(alias));
        }
        out
    }

    pub(crate) fn with_sql(&self, ctes: &[Expr], this: &Expr, recursive: bool) -> String {
        let mut out = self.keyword("WITH");
        if recursive {
            out.push(' ');
            out.push_str(&self.keyword("RECURSIVE"));
        }
        out.push(' ');
        out.push_str(&self.csv(ctes));
        out.push_str(self.clause_sep());
        out.push_str(&self.sql(this));
        out
    }

    pub(crate) fn insert_sql(&self, table: &Expr, columns: &[Expr], source: &Expr) -> String {
        let mut out = format!("{} {}", self.keyword("INSERT INTO"), self.sql(table));
        if !columns.is_empty() {
            out.push_str(&format!(" ({})", self.csv(columns)));
        }
        out.push(' ');
        out.push_str(&self.sql(source));
        out
    }

    pub(crate) fn update_sql(
        &self,
        table: &Expr,
        assignments: &[Expr],
        r#where: Option<&Expr>,
    ) -> String {
        let mut out = format!(
            "{} {} {} {}",
            self.keyword("UPDATE"),
            self.sql(table),
            self.keyword("SET"),
            self.csv(assignments)
        );
        if let Some(w) = r#where {
            out.push(' ');
            out.push_str(&self.sql(w));
        }
        out
    }

    pub(crate) fn delete_sql(&self, table: &Expr, r#where: Option<&Expr>) -> String {
        let mut out = format!("{} {}", self.keyword("DELETE FROM"), self.sql(table));
        if let Some(w) = r#where {
            out.push(' ');
            out.push_str(&self.sql(w));
        }
        out
    }

    pub(crate) fn create_sql(&self, expr: &Expr) -> String {
        let Expr::Create {
            kind,
            this,
            columns,
            source,
            not_exists,
            temporary,
        } = expr
        else {
            unreachable!("create_sql requires a Create");
        };
        let mut out = self.keyword("CREATE");
        if *temporary {
            out.push(' ');
            out.push_str(&self.keyword("TEMPORARY"));
        }
        out.push(' ');
        out.push_str(&self.keyword(kind));
        if *not_exists {
            out.push(' ');
            out.push_str(&self.keyword("IF NOT EXISTS"));
        }
        out.push(' ');
        out.push_str(&self.sql(this));
        if !columns.is_empty() {
            out.push_str(&format!(" ({})", self.csv(columns)));
        }
        if let Some(source) = source {
            out.push(' ');
            out.push_str(&self.keyword("AS"));
            out.push(' ');
            out.push_str(&self.sql(source));
        }
        out
    }

    pub(crate) fn drop_sql(&self, kind: &str, this: &Expr, exists: bool) -> String {
        let mut out = format!("{} {}", self.keyword("DROP"), self.keyword(kind));
        if exists {
            out.push(' ');
            out.push_str(&self.keyword("IF EXISTS"));
        }
        out.push(' ');
        out.push_str(&self.sql(this));
        out
    }

    pub(crate) fn column_def_sql(
        &self,
        this: &Expr,
        data_type: &Expr,
        nullable: bool,
        default: Option<&Expr>,
    ) -> String {
        let mut out = format!("{} {}", self.sql(this), self.sql(data_type));
        if !nullable {
            out.push(' ');
            out.push_str(&self.keyword("NOT NULL"));
        }
        if let Some(d) = default {
            out.push(' ');
            out.push_str(&self.keyword("DEFAULT"));
            out.push(' ');
            out.push_str(&self.sql(d));
        }
        out
    }

    pub(crate) fn foreign_key_sql(
        &self,
        expressions: &[Expr],
        reference: Option<&Expr>,
        ref_columns: &[Expr],
    ) -> String {
        let mut out = format!("{} ({})", self.keyword("FOREIGN KEY"), self.csv(expressions));
        if let Some(r) = reference {
            out.push(' ');
            out.push_str(&self.keyword("REFERENCES"));
            out.push(' ');
            out.push_str(&self.sql(r));
            if !ref_columns.is_empty() {
                out.push_str(&format!(" ({})", self.csv(ref_columns)));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::{GenConfig, Generator};
    use squill_ast::Expr;

    fn table(name: &str) -> Expr {
        Expr::Table {
            db: None,
            this: Box::new(Expr::ident(name)),
        }
    }

    fn select_star_from(name: &str) -> Expr {
        Expr::Select {
            projections: vec![Expr::Star],
            distinct: false,
            from: Some(Box::new(Expr::From { expressions: vec![table(name)] })),
            joins: vec![],
            r#where: None,
            group_by: vec![],
            having: None,
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }

    #[test]
    fn select_clause_order() {
        let g = Generator::new(GenConfig::default());
        let select = Expr::Select {
            projections: vec![Expr::column("a")],
            distinct: true,
            from: Some(Box::new(Expr::From { expressions: vec![table("t")] })),
            joins: vec![],
            r#where: Some(Box::new(Expr::Where {
                this: Box::new(Expr::Gt {
                    left: Box::new(Expr::column("x")),
                    right: Box::new(Expr::number("1")),
                }),
            })),
            group_by: vec![Expr::column("a")],
            having: None,
            order_by: vec![Expr::Ordered { this: Box::new(Expr::column("a")), desc: true }],
            limit: Some(Box::new(Expr::Limit { this: Box::new(Expr::number("10")) })),
            offset: Some(Box::new(Expr::Offset { this: Box::new(Expr::number("5")) })),
        };
        assert_eq!(
            g.sql(&select),
            "SELECT DISTINCT a FROM t WHERE x > 1 GROUP BY a ORDER BY a DESC LIMIT 10 OFFSET 5"
        );
    }

    #[test]
    fn pretty_mode_breaks_clauses() {
        let g = Generator::new(GenConfig { pretty: true, ..GenConfig::default() });
        let out = g.sql(&select_star_from("t"));
        assert_eq!(out, "SELECT *\nFROM t");
    }

    #[test]
    fn bare_join_has_no_kind_prefix() {
        let g = Generator::new(GenConfig::default());
        let join = Expr::Join {
            kind: String::new(),
            this: Box::new(table("u")),
            on: None,
        };
        assert_eq!(g.sql(&join), "JOIN u");
    }

    #[test]
    fn create_table_full_form() {
        let g = Generator::new(GenConfig::default());
        let create = Expr::Create {
            kind: "TABLE".into(),
            this: Box::new(table("t")),
            columns: vec![
                Expr::ColumnDef {
                    this: Box::new(Expr::ident("id")),
                    data_type: Box::new(Expr::DataType { name: "INT".into(), params: vec![] }),
                    nullable: false,
                    default: None,
                },
                Expr::PrimaryKey { expressions: vec![Expr::ident("id")] },
            ],
            source: None,
            not_exists: true,
            temporary: false,
        };
        assert_eq!(
            g.sql(&create),
            "CREATE TABLE IF NOT EXISTS t (id INT NOT NULL, PRIMARY KEY (id))"
        );
    }
}
