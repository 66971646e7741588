use serde::Serialize;

/// Fieldless mirror of [`crate::Expr`]'s variants.
///
/// Dialect transform tables are keyed by this enum, and rules use it for
/// variant checks that do not need to destructure. Kept in the same order
/// as the `Expr` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExprKind {
    Number,
    Str,
    Null,
    Boolean,
    Star,
    Placeholder,
    Parameter,
    Identifier,
    Column,
    Table,
    Alias,
    Dot,
    Bracket,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Is,
    Not,
    Neg,
    Paren,
    IsNull,
    IsNotNull,
    Like,
    Ilike,
    InList,
    InSubquery,
    Between,
    Exists,
    Case,
    When,
    Cast,
    TypedExpr,
    DataType,
    Function,
    Select,
    From,
    Join,
    Where,
    Having,
    Ordered,
    Limit,
    Offset,
    Distinct,
    Subquery,
    Values,
    Tuple,
    Union,
    Intersect,
    Except,
    Insert,
    Update,
    Assignment,
    Delete,
    Create,
    Drop,
    Alter,
    AddColumn,
    DropColumn,
    RenameTo,
    With,
    Cte,
    ColumnDef,
    PrimaryKey,
    ForeignKey,
    Unique,
    Window,
    Lateral,
    Unnest,
    Array,
    Map,
    Struct,
    JsonExtract,
    Interval,
    Explain,
    Comment,
    Hint,
    WorkspacePath,
}

impl ExprKind {
    /// Whether this kind is one of the binary arithmetic operators.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            ExprKind::Add | ExprKind::Sub | ExprKind::Mul | ExprKind::Div | ExprKind::Mod
        )
    }

    /// Whether this kind is a comparison operator.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            ExprKind::Eq
                | ExprKind::Neq
                | ExprKind::Lt
                | ExprKind::Gt
                | ExprKind::Lte
                | ExprKind::Gte
        )
    }

    /// Whether this kind starts a query (usable as a subquery body).
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            ExprKind::Select
                | ExprKind::Union
                | ExprKind::Intersect
                | ExprKind::Except
                | ExprKind::With
                | ExprKind::Values
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families() {
        assert!(ExprKind::Add.is_arithmetic());
        assert!(!ExprKind::And.is_arithmetic());
        assert!(ExprKind::Lte.is_comparison());
        assert!(!ExprKind::Is.is_comparison());
        assert!(ExprKind::With.is_query());
        assert!(!ExprKind::Where.is_query());
    }
}
