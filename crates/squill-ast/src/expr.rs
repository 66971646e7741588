use serde::Serialize;

use crate::kind::ExprKind;

/// A node in the SQL expression tree.
///
/// The tree is a closed sum: every construct the parser understands is a
/// variant here. Children are owned (`Box`/`Vec`); scalars (names, flags,
/// join kinds) are plain values. Nodes carry no source positions and no
/// upward links.
///
/// Conventions: binary operators carry `left` and `right`; single-child
/// wrappers carry `this`; ordered lists are `Vec<Expr>` where an empty
/// vector means the clause is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    // ── Literals ───────────────────────────────────────────────────────
    /// Numeric literal. The text is preserved as written.
    Number { value: String },
    /// String literal (unquoted content).
    Str { value: String },
    Null,
    Boolean { value: bool },
    /// `*`
    Star,
    /// `?` positional placeholder.
    Placeholder,
    /// Named or numbered parameter (`:name`, `@name`).
    Parameter { name: String },

    // ── Names ──────────────────────────────────────────────────────────
    /// A bare or quoted identifier.
    Identifier { name: String, quoted: bool },
    /// A column reference: optional table qualifier + name, both identifiers.
    Column { table: Option<Box<Expr>>, this: Box<Expr> },
    /// A table reference: optional schema qualifier + name.
    Table { db: Option<Box<Expr>>, this: Box<Expr> },
    /// `expr AS alias`.
    Alias { this: Box<Expr>, alias: Box<Expr> },
    /// `left.right` where the parts are not a plain column reference.
    Dot { left: Box<Expr>, right: Box<Expr> },
    /// `expr[offsets]`.
    Bracket { this: Box<Expr>, expressions: Vec<Expr> },

    // ── Arithmetic ─────────────────────────────────────────────────────
    Add { left: Box<Expr>, right: Box<Expr> },
    Sub { left: Box<Expr>, right: Box<Expr> },
    Mul { left: Box<Expr>, right: Box<Expr> },
    Div { left: Box<Expr>, right: Box<Expr> },
    Mod { left: Box<Expr>, right: Box<Expr> },

    // ── Logical ────────────────────────────────────────────────────────
    And { left: Box<Expr>, right: Box<Expr> },
    Or { left: Box<Expr>, right: Box<Expr> },
    Xor { left: Box<Expr>, right: Box<Expr> },

    // ── Comparison ─────────────────────────────────────────────────────
    Eq { left: Box<Expr>, right: Box<Expr> },
    Neq { left: Box<Expr>, right: Box<Expr> },
    Lt { left: Box<Expr>, right: Box<Expr> },
    Gt { left: Box<Expr>, right: Box<Expr> },
    Lte { left: Box<Expr>, right: Box<Expr> },
    Gte { left: Box<Expr>, right: Box<Expr> },
    Is { left: Box<Expr>, right: Box<Expr> },

    // ── Unary ──────────────────────────────────────────────────────────
    Not { this: Box<Expr> },
    Neg { this: Box<Expr> },
    /// Explicit parentheses that are not a subquery.
    Paren { this: Box<Expr> },

    // ── Predicates ─────────────────────────────────────────────────────
    IsNull { this: Box<Expr> },
    IsNotNull { this: Box<Expr> },
    Like { this: Box<Expr>, pattern: Box<Expr> },
    Ilike { this: Box<Expr>, pattern: Box<Expr> },
    /// `expr IN (a, b, c)`.
    InList { this: Box<Expr>, expressions: Vec<Expr> },
    /// `expr IN (SELECT ...)`.
    InSubquery { this: Box<Expr>, query: Box<Expr> },
    Between { this: Box<Expr>, low: Box<Expr>, high: Box<Expr> },
    Exists { query: Box<Expr> },

    // ── Control ────────────────────────────────────────────────────────
    Case {
        operand: Option<Box<Expr>>,
        whens: Vec<Expr>,
        otherwise: Option<Box<Expr>>,
    },
    When { condition: Box<Expr>, result: Box<Expr> },

    // ── Casts and types ────────────────────────────────────────────────
    Cast { this: Box<Expr>, to: Box<Expr> },
    /// `expr::type`.
    TypedExpr { this: Box<Expr>, to: Box<Expr> },
    DataType { name: String, params: Vec<Expr> },

    // ── Functions ──────────────────────────────────────────────────────
    Function { name: String, args: Vec<Expr>, distinct: bool },

    // ── Query ──────────────────────────────────────────────────────────
    Select {
        projections: Vec<Expr>,
        distinct: bool,
        from: Option<Box<Expr>>,
        joins: Vec<Expr>,
        r#where: Option<Box<Expr>>,
        group_by: Vec<Expr>,
        having: Option<Box<Expr>>,
        order_by: Vec<Expr>,
        limit: Option<Box<Expr>>,
        offset: Option<Box<Expr>>,
    },
    From { expressions: Vec<Expr> },
    /// `kind` is the join kind as written: `INNER`, `LEFT OUTER`, `CROSS`, ...
    Join { kind: String, this: Box<Expr>, on: Option<Box<Expr>> },
    Where { this: Box<Expr> },
    Having { this: Box<Expr> },
    /// One ORDER BY item.
    Ordered { this: Box<Expr>, desc: bool },
    Limit { this: Box<Expr> },
    Offset { this: Box<Expr> },
    /// DISTINCT over an argument list, e.g. `COUNT(DISTINCT x)`.
    Distinct { expressions: Vec<Expr> },
    /// A parenthesized query usable as expression or derived table.
    Subquery { this: Box<Expr>, alias: Option<Box<Expr>> },
    Values { rows: Vec<Expr> },
    /// A row constructor `(a, b, c)`.
    Tuple { expressions: Vec<Expr> },
    Union { left: Box<Expr>, right: Box<Expr>, distinct: bool },
    Intersect { left: Box<Expr>, right: Box<Expr> },
    Except { left: Box<Expr>, right: Box<Expr> },

    // ── Modification ───────────────────────────────────────────────────
    Insert { table: Box<Expr>, columns: Vec<Expr>, source: Box<Expr> },
    Update {
        table: Box<Expr>,
        assignments: Vec<Expr>,
        r#where: Option<Box<Expr>>,
    },
    Assignment { column: Box<Expr>, value: Box<Expr> },
    Delete { table: Box<Expr>, r#where: Option<Box<Expr>> },

    // ── Schema ─────────────────────────────────────────────────────────
    Create {
        kind: String,
        this: Box<Expr>,
        columns: Vec<Expr>,
        source: Option<Box<Expr>>,
        not_exists: bool,
        temporary: bool,
    },
    Drop { kind: String, this: Box<Expr>, exists: bool },
    Alter { this: Box<Expr>, actions: Vec<Expr> },
    AddColumn { def: Box<Expr> },
    DropColumn { this: Box<Expr> },
    RenameTo { this: Box<Expr> },
    With { ctes: Vec<Expr>, this: Box<Expr>, recursive: bool },
    Cte { alias: Box<Expr>, this: Box<Expr> },
    ColumnDef {
        this: Box<Expr>,
        data_type: Box<Expr>,
        nullable: bool,
        default: Option<Box<Expr>>,
    },
    PrimaryKey { expressions: Vec<Expr> },
    ForeignKey {
        expressions: Vec<Expr>,
        reference: Option<Box<Expr>>,
        ref_columns: Vec<Expr>,
    },
    Unique { expressions: Vec<Expr> },

    // ── Advanced ───────────────────────────────────────────────────────
    Window {
        this: Box<Expr>,
        partition_by: Vec<Expr>,
        order_by: Vec<Expr>,
    },
    Lateral { this: Box<Expr> },
    Unnest { expressions: Vec<Expr> },
    Array { expressions: Vec<Expr> },
    Map { keys: Vec<Expr>, values: Vec<Expr> },
    Struct { expressions: Vec<Expr> },
    /// `expr -> path` / JSON access.
    JsonExtract { this: Box<Expr>, path: Box<Expr> },
    Interval { this: Box<Expr>, unit: String },
    Explain { this: Box<Expr> },
    Comment { kind: String, this: Box<Expr>, value: String },
    Hint { expressions: Vec<Expr> },
    /// A federated three-level name: workspace.schema.table.
    WorkspacePath { expressions: Vec<Expr> },
}

impl Expr {
    /// The fieldless kind of this node. Used as the key of dialect
    /// transform tables and for cheap variant checks.
    pub fn kind(&self) -> ExprKind {
        use Expr::*;
        match self {
            Number { .. } => ExprKind::Number,
            Str { .. } => ExprKind::Str,
            Null => ExprKind::Null,
            Boolean { .. } => ExprKind::Boolean,
            Star => ExprKind::Star,
            Placeholder => ExprKind::Placeholder,
            Parameter { .. } => ExprKind::Parameter,
            Identifier { .. } => ExprKind::Identifier,
            Column { .. } => ExprKind::Column,
            Table { .. } => ExprKind::Table,
            Alias { .. } => ExprKind::Alias,
            Dot { .. } => ExprKind::Dot,
            Bracket { .. } => ExprKind::Bracket,
            Add { .. } => ExprKind::Add,
            Sub { .. } => ExprKind::Sub,
            Mul { .. } => ExprKind::Mul,
            Div { .. } => ExprKind::Div,
            Mod { .. } => ExprKind::Mod,
            And { .. } => ExprKind::And,
            Or { .. } => ExprKind::Or,
            Xor { .. } => ExprKind::Xor,
            Eq { .. } => ExprKind::Eq,
            Neq { .. } => ExprKind::Neq,
            Lt { .. } => ExprKind::Lt,
            Gt { .. } => ExprKind::Gt,
            Lte { .. } => ExprKind::Lte,
            Gte { .. } => ExprKind::Gte,
            Is { .. } => ExprKind::Is,
            Not { .. } => ExprKind::Not,
            Neg { .. } => ExprKind::Neg,
            Paren { .. } => ExprKind::Paren,
            IsNull { .. } => ExprKind::IsNull,
            IsNotNull { .. } => ExprKind::IsNotNull,
            Like { .. } => ExprKind::Like,
            Ilike { .. } => ExprKind::Ilike,
            InList { .. } => ExprKind::InList,
            InSubquery { .. } => ExprKind::InSubquery,
            Between { .. } => ExprKind::Between,
            Exists { .. } => ExprKind::Exists,
            Case { .. } => ExprKind::Case,
            When { .. } => ExprKind::When,
            Cast { .. } => ExprKind::Cast,
            TypedExpr { .. } => ExprKind::TypedExpr,
            DataType { .. } => ExprKind::DataType,
            Function { .. } => ExprKind::Function,
            Select { .. } => ExprKind::Select,
            From { .. } => ExprKind::From,
            Join { .. } => ExprKind::Join,
            Where { .. } => ExprKind::Where,
            Having { .. } => ExprKind::Having,
            Ordered { .. } => ExprKind::Ordered,
            Limit { .. } => ExprKind::Limit,
            Offset { .. } => ExprKind::Offset,
            Distinct { .. } => ExprKind::Distinct,
            Subquery { .. } => ExprKind::Subquery,
            Values { .. } => ExprKind::Values,
            Tuple { .. } => ExprKind::Tuple,
            Union { .. } => ExprKind::Union,
            Intersect { .. } => ExprKind::Intersect,
            Except { .. } => ExprKind::Except,
            Insert { .. } => ExprKind::Insert,
            Update { .. } => ExprKind::Update,
            Assignment { .. } => ExprKind::Assignment,
            Delete { .. } => ExprKind::Delete,
            Create { .. } => ExprKind::Create,
            Drop { .. } => ExprKind::Drop,
            Alter { .. } => ExprKind::Alter,
            AddColumn { .. } => ExprKind::AddColumn,
            DropColumn { .. } => ExprKind::DropColumn,
            RenameTo { .. } => ExprKind::RenameTo,
            With { .. } => ExprKind::With,
            Cte { .. } => ExprKind::Cte,
            ColumnDef { .. } => ExprKind::ColumnDef,
            PrimaryKey { .. } => ExprKind::PrimaryKey,
            ForeignKey { .. } => ExprKind::ForeignKey,
            Unique { .. } => ExprKind::Unique,
            Window { .. } => ExprKind::Window,
            Lateral { .. } => ExprKind::Lateral,
            Unnest { .. } => ExprKind::Unnest,
            Array { .. } => ExprKind::Array,
            Map { .. } => ExprKind::Map,
            Struct { .. } => ExprKind::Struct,
            JsonExtract { .. } => ExprKind::JsonExtract,
            Interval { .. } => ExprKind::Interval,
            Explain { .. } => ExprKind::Explain,
            Comment { .. } => ExprKind::Comment,
            Hint { .. } => ExprKind::Hint,
            WorkspacePath { .. } => ExprKind::WorkspacePath,
        }
    }

    // ── Builders ───────────────────────────────────────────────────────

    /// A bare (unquoted) identifier.
    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Identifier { name: name.into(), quoted: false }
    }

    /// An unqualified column reference.
    pub fn column(name: impl Into<String>) -> Expr {
        Expr::Column { table: None, this: Box::new(Expr::ident(name)) }
    }

    /// A numeric literal from its source text.
    pub fn number(value: impl Into<String>) -> Expr {
        Expr::Number { value: value.into() }
    }

    /// A string literal.
    pub fn string(value: impl Into<String>) -> Expr {
        Expr::Str { value: value.into() }
    }

    /// A boolean literal.
    pub fn boolean(value: bool) -> Expr {
        Expr::Boolean { value }
    }

    /// Conjunction of two expressions.
    pub fn and(left: Expr, right: Expr) -> Expr {
        Expr::And { left: Box::new(left), right: Box::new(right) }
    }

    /// Disjunction of two expressions.
    pub fn or(left: Expr, right: Expr) -> Expr {
        Expr::Or { left: Box::new(left), right: Box::new(right) }
    }

    /// Logical negation.
    pub fn negate(this: Expr) -> Expr {
        Expr::Not { this: Box::new(this) }
    }

    // ── Cheap shape checks ─────────────────────────────────────────────

    /// Whether this node is the literal `TRUE`.
    pub fn is_true(&self) -> bool {
        matches!(self, Expr::Boolean { value: true })
    }

    /// Whether this node is the literal `FALSE`.
    pub fn is_false(&self) -> bool {
        matches!(self, Expr::Boolean { value: false })
    }

    /// Whether this node is the literal `NULL`.
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Expr::Null)
    }

    /// Whether this node is a literal of any literal family.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expr::Number { .. }
                | Expr::Str { .. }
                | Expr::Null
                | Expr::Boolean { .. }
                | Expr::Star
                | Expr::Placeholder
                | Expr::Parameter { .. }
        )
    }

    /// The numeric value of a `Number`, if it parses.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number { value } => value.parse().ok(),
            _ => None,
        }
    }

    /// The inner name of an `Identifier`, or of the naming identifier of a
    /// `Column`/`Table`/`Alias`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Expr::Identifier { name, .. } => Some(name),
            Expr::Column { this, .. } | Expr::Table { this, .. } => this.name(),
            Expr::Alias { alias, .. } => alias.name(),
            _ => None,
        }
    }

    /// The output name of a projection item: its alias if present, else its
    /// column/identifier name.
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Expr::Alias { alias, .. } => alias.name(),
            _ => self.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable_per_variant() {
        assert_eq!(Expr::Null.kind(), ExprKind::Null);
        assert_eq!(Expr::number("1").kind(), ExprKind::Number);
        assert_eq!(
            Expr::and(Expr::boolean(true), Expr::boolean(false)).kind(),
            ExprKind::And
        );
    }

    #[test]
    fn builders() {
        let col = Expr::column("a");
        assert_eq!(col.name(), Some("a"));
        assert!(Expr::boolean(true).is_true());
        assert!(Expr::boolean(false).is_false());
        assert!(Expr::Null.is_null_literal());
        assert_eq!(Expr::number("1.5").as_number(), Some(1.5));
    }

    #[test]
    fn output_name_prefers_alias() {
        let aliased = Expr::Alias {
            this: Box::new(Expr::column("a")),
            alias: Box::new(Expr::ident("b")),
        };
        assert_eq!(aliased.output_name(), Some("b"));
        assert_eq!(Expr::column("a").output_name(), Some("a"));
    }

    #[test]
    fn structural_equality() {
        assert_eq!(Expr::column("x"), Expr::column("x"));
        assert_ne!(Expr::column("x"), Expr::column("y"));
    }

    #[test]
    fn serializes_for_tooling() {
        let expr = Expr::Eq {
            left: Box::new(Expr::column("a")),
            right: Box::new(Expr::number("1")),
        };
        let json = serde_json::to_string(&expr).expect("serialize");
        assert!(json.contains("\"Eq\""));
        assert!(json.contains("\"Identifier\""));
    }
}
