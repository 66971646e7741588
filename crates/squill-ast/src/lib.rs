// Squill AST -- the polymorphic SQL expression tree.
//
// One owned sum type covers every node the parser can produce, from literals
// up to whole statements. A node owns its children outright (no parent
// pointers, no sharing), which keeps the tree acyclic by construction and
// makes `transform` a pure structural rewrite.

pub mod expr;
pub mod kind;
pub mod transform;
pub mod walk;

pub use expr::Expr;
pub use kind::ExprKind;
pub use walk::Walk;
