// Squill generator: expression tree -> SQL text.
//
// A visitor with one default rendering per variant. Before the default
// runs, the node's kind is looked up in a dialect-provided transform table;
// a hit short-circuits with dialect-specific text. This keeps the base
// generator dialect-agnostic: a new dialect is a small transform table plus
// quoting/normalization knobs, not edits here.

mod gen_expr;
mod gen_query;

use rustc_hash::FxHashMap;
use squill_ast::{Expr, ExprKind};

/// Case folding applied to unquoted identifiers during generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    Uppercase,
    Lowercase,
    #[default]
    Preserve,
}

/// Output configuration.
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Quote every identifier, not just the ones that need it.
    pub identify: bool,
    /// Uppercase keywords; off means lowercase.
    pub normalize: bool,
    /// Newline-per-clause output.
    pub pretty: bool,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            identify: false,
            normalize: true,
            pretty: false,
        }
    }
}

/// A dialect override for one node kind. Returning `None` falls through to
/// the default rendering.
pub type Transform = fn(&Generator, &Expr) -> Option<String>;

/// Per-kind dialect overrides, consulted before every default visit.
pub type Transforms = FxHashMap<ExprKind, Transform>;

/// SQL text generator.
pub struct Generator {
    config: GenConfig,
    /// Identifier quote pair (open, close).
    quote: (char, char),
    normalization: Normalization,
    transforms: Transforms,
}

impl Generator {
    pub fn new(config: GenConfig) -> Self {
        Self {
            config,
            quote: ('"', '"'),
            normalization: Normalization::Preserve,
            transforms: Transforms::default(),
        }
    }

    pub fn with_quote(mut self, open: char, close: char) -> Self {
        self.quote = (open, close);
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_transforms(mut self, transforms: Transforms) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Generate SQL for a tree. Never fails on a well-formed tree.
    pub fn generate(&self, expr: &Expr) -> String {
        self.sql(expr)
    }

    /// Render one node: dialect transform first, then the default.
    pub fn sql(&self, expr: &Expr) -> String {
        if let Some(transform) = self.transforms.get(&expr.kind()) {
            if let Some(out) = transform(self, expr) {
                return out;
            }
        }
        self.default_sql(expr)
    }

    // ── Shared formatting helpers ──────────────────────────────────────

    /// A keyword in the configured case. Callers pass the canonical
    /// upper-case spelling.
    pub fn keyword(&self, kw: &str) -> String {
        if self.config.normalize {
            kw.to_string()
        } else {
            kw.to_lowercase()
        }
    }

    /// An identifier, quoted when it was quoted in the source or when
    /// `identify` forces quoting; otherwise case-folded per the dialect's
    /// normalization strategy.
    pub fn ident(&self, name: &str, quoted: bool) -> String {
        if quoted || self.config.identify {
            let (open, close) = self.quote;
            let mut out = String::with_capacity(name.len() + 2);
            out.push(open);
            for c in name.chars() {
                if c == close {
                    out.push(close);
                }
                out.push(c);
            }
            out.push(close);
            out
        } else {
            match self.normalization {
                Normalization::Uppercase => name.to_uppercase(),
                Normalization::Lowercase => name.to_lowercase(),
                Normalization::Preserve => name.to_string(),
            }
        }
    }

    /// Comma-join a list of rendered expressions.
    pub fn csv(&self, exprs: &[Expr]) -> String {
        exprs.iter().map(|e| self.sql(e)).collect::<Vec<_>>().join(", ")
    }

    /// Separator between the clauses of a statement.
    pub fn clause_sep(&self) -> &'static str {
        if self.config.pretty {
            "\n"
        } else {
            " "
        }
    }

    fn default_sql(&self, expr: &Expr) -> String {
        use Expr::*;
        match expr {
            // Literals and names render inline; everything larger delegates
            // to the per-family methods in gen_expr / gen_query.
            Number { value } => value.clone(),
            Str { value } => format!("'{}'", value.replace('\'', "''")),
            Null => self.keyword("NULL"),
            Boolean { value } => self.keyword(if *value { "TRUE" } else { "FALSE" }),
            Star => "*".to_string(),
            Placeholder => "?".to_string(),
            Parameter { name } => format!(":{name}"),
            Identifier { name, quoted } => self.ident(name, *quoted),

            Column { table, this } => self.qualified_sql(table.as_deref(), this),
            Table { db, this } => self.qualified_sql(db.as_deref(), this),
            Alias { this, alias } => {
                format!("{} {} {}", self.sql(this), self.keyword("AS"), self.sql(alias))
            }
            Dot { left, right } => format!("{}.{}", self.sql(left), self.sql(right)),
            Bracket { this, expressions } => {
                format!("{}[{}]", self.sql(this), self.csv(expressions))
            }

            Add { left, right } => self.binary_sql(left, "+", right),
            Sub { left, right } => self.binary_sql(left, "-", right),
            Mul { left, right } => self.binary_sql(left, "*", right),
            Div { left, right } => self.binary_sql(left, "/", right),
            Mod { left, right } => self.binary_sql(left, "%", right),
            And { left, right } => format!(
                "{} {} {}",
                self.and_operand_sql(left),
                self.keyword("AND"),
                self.and_operand_sql(right)
            ),
            Or { left, right } => self.binary_kw_sql(left, "OR", right),
            Xor { left, right } => self.binary_kw_sql(left, "XOR", right),
            Eq { left, right } => self.binary_sql(left, "=", right),
            Neq { left, right } => self.binary_sql(left, "<>", right),
            Lt { left, right } => self.binary_sql(left, "<", right),
            Gt { left, right } => self.binary_sql(left, ">", right),
            Lte { left, right } => self.binary_sql(left, "<=", right),
            Gte { left, right } => self.binary_sql(left, ">=", right),
            Is { left, right } => self.binary_kw_sql(left, "IS", right),

            Not { this } => format!("{} {}", self.keyword("NOT"), self.not_operand_sql(this)),
            Neg { this } => format!("-{}", self.sql(this)),
            Paren { this } => format!("({})", self.sql(this)),

            IsNull { this } => format!("{} {}", self.sql(this), self.keyword("IS NULL")),
            IsNotNull { this } => {
                format!("{} {}", self.sql(this), self.keyword("IS NOT NULL"))
            }
            Like { this, pattern } => self.binary_kw_sql(this, "LIKE", pattern),
            Ilike { this, pattern } => self.binary_kw_sql(this, "ILIKE", pattern),
            InList { this, expressions } => format!(
                "{} {} ({})",
                self.sql(this),
                self.keyword("IN"),
                self.csv(expressions)
            ),
            InSubquery { this, query } => format!(
                "{} {} ({})",
                self.sql(this),
                self.keyword("IN"),
                self.sql(query)
            ),
            Between { this, low, high } => format!(
                "{} {} {} {} {}",
                self.sql(this),
                self.keyword("BETWEEN"),
                self.sql(low),
                self.keyword("AND"),
                self.sql(high)
            ),
            Exists { query } => format!("{} ({})", self.keyword("EXISTS"), self.sql(query)),

            Case { operand, whens, otherwise } => self.case_sql(operand.as_deref(), whens, otherwise.as_deref()),
            When { condition, result } => format!(
                "{} {} {} {}",
                self.keyword("WHEN"),
                self.sql(condition),
                self.keyword("THEN"),
                self.sql(result)
            ),

            Cast { this, to } => format!(
                "{}({} {} {})",
                self.keyword("CAST"),
                self.sql(this),
                self.keyword("AS"),
                self.sql(to)
            ),
            TypedExpr { this, to } => format!("{}::{}", self.sql(this), self.sql(to)),
            DataType { name, params } => self.data_type_sql(name, params),
            Function { name, args, distinct } => self.function_sql(name, args, *distinct),

            Select { .. } => self.select_sql(expr),
            From { expressions } => format!("{} {}", self.keyword("FROM"), self.csv(expressions)),
            Join { kind, this, on } => self.join_sql(kind, this, on.as_deref()),
            Where { this } => format!("{} {}", self.keyword("WHERE"), self.sql(this)),
            Having { this } => format!("{} {}", self.keyword("HAVING"), self.sql(this)),
            Ordered { this, desc } => {
                if *desc {
                    format!("{} {}", self.sql(this), self.keyword("DESC"))
                } else {
                    self.sql(this)
                }
            }
            Limit { this } => format!("{} {}", self.keyword("LIMIT"), self.sql(this)),
            Offset { this } => format!("{} {}", self.keyword("OFFSET"), self.sql(this)),
            Distinct { expressions } => {
                format!("{} {}", self.keyword("DISTINCT"), self.csv(expressions))
            }
            Subquery { this, alias } => self.subquery_sql(this, alias.as_deref()),
            Values { rows } => format!("{} {}", self.keyword("VALUES"), self.csv(rows)),
            Tuple { expressions } => format!("({})", self.csv(expressions)),
            Union { left, right, distinct } => {
                let op = if *distinct { "UNION" } else { "UNION ALL" };
                format!("{} {} {}", self.sql(left), self.keyword(op), self.sql(right))
            }
            Intersect { left, right } => {
                format!("{} {} {}", self.sql(left), self.keyword("INTERSECT"), self.sql(right))
            }
            Except { left, right } => {
                format!("{} {} {}", self.sql(left), self.keyword("EXCEPT"), self.sql(right))
            }

            Insert { table, columns, source } => self.insert_sql(table, columns, source),
            Update { table, assignments, r#where } => {
                self.update_sql(table, assignments, r#where.as_deref())
            }
            Assignment { column, value } => {
                format!("{} = {}", self.sql(column), self.sql(value))
            }
            Delete { table, r#where } => self.delete_sql(table, r#where.as_deref()),

            Create { .. } => self.create_sql(expr),
            Drop { kind, this, exists } => self.drop_sql(kind, this, *exists),
            Alter { this, actions } => format!(
                "{} {} {}",
                self.keyword("ALTER TABLE"),
                self.sql(this),
                self.csv(actions)
            ),
            AddColumn { def } => format!("{} {}", self.keyword("ADD COLUMN"), self.sql(def)),
            DropColumn { this } => {
                format!("{} {}", self.keyword("DROP COLUMN"), self.sql(this))
            }
            RenameTo { this } => format!("{} {}", self.keyword("RENAME TO"), self.sql(this)),
            With { ctes, this, recursive } => self.with_sql(ctes, this, *recursive),
            Cte { alias, this } => format!(
                "{} {} ({})",
                self.sql(alias),
                self.keyword("AS"),
                self.sql(this)
            ),
            ColumnDef { this, data_type, nullable, default } => {
                self.column_def_sql(this, data_type, *nullable, default.as_deref())
            }
            PrimaryKey { expressions } => {
                format!("{} ({})", self.keyword("PRIMARY KEY"), self.csv(expressions))
            }
            ForeignKey { expressions, reference, ref_columns } => {
                self.foreign_key_sql(expressions, reference.as_deref(), ref_columns)
            }
            Unique { expressions } => {
                format!("{} ({})", self.keyword("UNIQUE"), self.csv(expressions))
            }

            Window { this, partition_by, order_by } => {
                self.window_sql(this, partition_by, order_by)
            }
            Lateral { this } => format!("{} {}", self.keyword("LATERAL"), self.sql(this)),
            Unnest { expressions } => {
                format!("{}({})", self.keyword("UNNEST"), self.csv(expressions))
            }
            Array { expressions } => format!("{}[{}]", self.keyword("ARRAY"), self.csv(expressions)),
            Map { keys, values } => self.map_sql(keys, values),
            Struct { expressions } => {
                format!("{}({})", self.keyword("STRUCT"), self.csv(expressions))
            }
            JsonExtract { this, path } => format!("{} -> {}", self.sql(this), self.sql(path)),
            Interval { this, unit } => {
                let mut out = format!("{} {}", self.keyword("INTERVAL"), self.sql(this));
                if !unit.is_empty() {
                    out.push(' ');
                    out.push_str(&self.keyword(&unit.to_uppercase()));
                }
                out
            }
            Explain { this } => format!("{} {}", self.keyword("EXPLAIN"), self.sql(this)),
            Comment { kind, this, value } => format!(
                "{} {} {} {} '{}'",
                self.keyword("COMMENT ON"),
                self.keyword(kind),
                self.sql(this),
                self.keyword("IS"),
                value.replace('\'', "''")
            ),
            Hint { expressions } => format!("/*+ {} */", self.csv(expressions)),
            WorkspacePath { expressions } => expressions
                .iter()
                .map(|e| self.sql(e))
                .collect::<Vec<_>>()
                .join("."),
        }
    }

    fn qualified_sql(&self, qualifier: Option<&Expr>, this: &Expr) -> String {
        match qualifier {
            Some(q) => format!("{}.{}", self.sql(q), self.sql(this)),
            None => self.sql(this),
        }
    }

    fn binary_sql(&self, left: &Expr, op: &str, right: &Expr) -> String {
        format!("{} {} {}", self.sql(left), op, self.sql(right))
    }

    fn binary_kw_sql(&self, left: &Expr, op: &str, right: &Expr) -> String {
        format!("{} {} {}", self.sql(left), self.keyword(op), self.sql(right))
    }

    /// Rewrite rules strip parentheses, so a disjunction directly under AND
    /// must re-parenthesize or the emitted text would re-parse with the
    /// wrong shape. Nested ANDs need no parens; associativity keeps them.
    fn and_operand_sql(&self, e: &Expr) -> String {
        match e.kind() {
            ExprKind::Or | ExprKind::Xor => format!("({})", self.sql(e)),
            _ => self.sql(e),
        }
    }

    /// Same, for the operand of NOT, where AND also binds looser.
    fn not_operand_sql(&self, e: &Expr) -> String {
        match e.kind() {
            ExprKind::And | ExprKind::Or | ExprKind::Xor => format!("({})", self.sql(e)),
            _ => self.sql(e),
        }
    }
}
