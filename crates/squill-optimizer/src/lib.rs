// Squill optimizer: a fixed-order pipeline of semantics-preserving
// rewrites over the expression tree.
//
// Each rule is pure and idempotent, and a rule whose precondition fails
// simply leaves the tree untouched. Order matters: simplification and
// canonicalization run before predicate pushdown so pushed predicates are
// already canonical, and CTE elimination relies on scope-built reference
// counts.

pub mod rules;
pub mod scope;

pub use rules::Rule;
pub use scope::{Scope, ScopeKind, Source};

use rustc_hash::{FxHashMap, FxHashSet};
use squill_ast::Expr;
use squill_common::token::default_keywords;

/// Qualified table name (lower-cased) to ordered column list.
pub type Schema = FxHashMap<String, Vec<String>>;

/// What the optimizer knows about its surroundings: the dialect's reserved
/// words (for identifier quoting), an optional schema (for the
/// schema-dependent rules), and optional database/catalog names.
#[derive(Debug, Clone)]
pub struct OptimizeContext {
    reserved: FxHashSet<String>,
    pub schema: Option<Schema>,
    pub database: Option<String>,
    pub catalog: Option<String>,
}

impl Default for OptimizeContext {
    fn default() -> Self {
        Self {
            reserved: default_keywords()
                .into_iter()
                .map(|(text, _)| text.to_string())
                .collect(),
            schema: None,
            database: None,
            catalog: None,
        }
    }
}

impl OptimizeContext {
    /// Replace the reserved-word set (the dialect's contribution).
    pub fn with_reserved(mut self, reserved: impl IntoIterator<Item = String>) -> Self {
        self.reserved = reserved.into_iter().map(|w| w.to_lowercase()).collect();
        self
    }

    /// Attach a schema for the schema-dependent rules.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Whether a name collides with a reserved word.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(&name.to_lowercase())
    }
}

/// One boolean per rule, in pipeline order.
///
/// `join_reordering` and `annotate_types` are accepted so the full
/// eleven-flag interface round-trips, but perform no rewrite: reordering
/// needs table statistics the optimizer does not have, and nodes carry no
/// type slot to annotate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeConfig {
    pub simplify: bool,
    pub canonicalize: bool,
    pub quote_identifiers: bool,
    pub eliminate_ctes: bool,
    pub normalize_predicates: bool,
    pub pushdown_predicates: bool,
    pub merge_subqueries: bool,
    pub join_reordering: bool,
    pub projection_pushdown: bool,
    pub annotate_types: bool,
    pub qualify_columns: bool,
}

impl Default for OptimizeConfig {
    /// The default preset: simplify, canonicalize, quote identifiers,
    /// eliminate CTEs.
    fn default() -> Self {
        Self {
            simplify: true,
            canonicalize: true,
            quote_identifiers: true,
            eliminate_ctes: true,
            normalize_predicates: false,
            pushdown_predicates: false,
            merge_subqueries: false,
            join_reordering: false,
            projection_pushdown: false,
            annotate_types: false,
            qualify_columns: false,
        }
    }
}

impl OptimizeConfig {
    /// Only simplification.
    pub fn minimal() -> Self {
        Self {
            simplify: true,
            canonicalize: false,
            quote_identifiers: false,
            eliminate_ctes: false,
            normalize_predicates: false,
            pushdown_predicates: false,
            merge_subqueries: false,
            join_reordering: false,
            projection_pushdown: false,
            annotate_types: false,
            qualify_columns: false,
        }
    }

    /// Every rule enabled.
    pub fn aggressive() -> Self {
        Self {
            simplify: true,
            canonicalize: true,
            quote_identifiers: true,
            eliminate_ctes: true,
            normalize_predicates: true,
            pushdown_predicates: true,
            merge_subqueries: true,
            join_reordering: true,
            projection_pushdown: true,
            annotate_types: true,
            qualify_columns: true,
        }
    }
}

/// Run the enabled rules in catalogue order and return the rewritten tree.
pub fn optimize(expr: Expr, ctx: &OptimizeContext, config: &OptimizeConfig) -> Expr {
    let mut out = expr;
    for rule in pipeline(config) {
        log::debug!("applying optimizer rule {}", rule.name());
        out = rule.apply(out, ctx);
    }
    out
}

fn pipeline(config: &OptimizeConfig) -> Vec<Box<dyn Rule>> {
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();
    if config.simplify {
        rules.push(Box::new(rules::Simplify));
    }
    if config.canonicalize {
        rules.push(Box::new(rules::Canonicalize));
    }
    if config.quote_identifiers {
        rules.push(Box::new(rules::QuoteIdentifiers));
    }
    if config.eliminate_ctes {
        rules.push(Box::new(rules::EliminateCtes));
    }
    if config.normalize_predicates {
        rules.push(Box::new(rules::NormalizePredicates));
    }
    if config.pushdown_predicates {
        rules.push(Box::new(rules::PushdownPredicates));
    }
    if config.merge_subqueries {
        rules.push(Box::new(rules::MergeSubqueries));
    }
    if config.projection_pushdown {
        rules.push(Box::new(rules::ProjectionPushdown));
    }
    if config.qualify_columns {
        rules.push(Box::new(rules::QualifyColumns));
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let minimal = OptimizeConfig::minimal();
        assert!(minimal.simplify);
        assert!(!minimal.canonicalize);

        let default = OptimizeConfig::default();
        assert!(default.simplify && default.canonicalize);
        assert!(default.quote_identifiers && default.eliminate_ctes);
        assert!(!default.pushdown_predicates);

        let aggressive = OptimizeConfig::aggressive();
        assert!(aggressive.pushdown_predicates && aggressive.qualify_columns);
    }

    #[test]
    fn default_pipeline_has_four_stages() {
        assert_eq!(pipeline(&OptimizeConfig::default()).len(), 4);
        assert_eq!(pipeline(&OptimizeConfig::minimal()).len(), 1);
    }

    #[test]
    fn reserved_lookup_is_case_insensitive() {
        let ctx = OptimizeContext::default();
        assert!(ctx.is_reserved("SELECT"));
        assert!(ctx.is_reserved("select"));
        assert!(!ctx.is_reserved("not_reserved"));
    }
}
