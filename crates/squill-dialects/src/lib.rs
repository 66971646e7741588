// Squill dialects: the policy layer that binds lexer, parser, generator,
// and optimizer together for one SQL variant.
//
// A dialect contributes quoting tables, keyword changes, a normalization
// strategy, and a small generator transform table; everything else is the
// shared pipeline. Built-ins live in `builtin`, the process-wide lookup
// table in `registry`.

mod builtin;
pub mod registry;

pub use builtin::*;
pub use registry::{lookup, register, DialectNotFound, DialectRegistry};

use squill_ast::Expr;
use squill_gen::{GenConfig, Generator, Normalization, Transforms};
use squill_lexer::LexerConfig;
use squill_optimizer::{OptimizeConfig, OptimizeContext};
use squill_parser::{ParseErrors, ParserConfig};

/// One SQL variant's bundle of pipeline policy.
///
/// Every method has a default matching ANSI; a dialect overrides only what
/// it does differently. The provided end-to-end conveniences run the whole
/// pipeline with this dialect's configuration.
pub trait Dialect: Send + Sync + std::fmt::Debug {
    /// Upper-case registry name, e.g. `POSTGRES`.
    fn name(&self) -> &'static str;

    /// Case folding for unquoted identifiers during generation.
    fn normalization(&self) -> Normalization {
        Normalization::Preserve
    }

    /// Identifier quote pair.
    fn identifier_quote(&self) -> (char, char) {
        ('"', '"')
    }

    /// Tokenizer policy: quote tables and keyword vocabulary.
    fn lexer_config(&self) -> LexerConfig {
        let (open, close) = self.identifier_quote();
        LexerConfig::default().identifier_quote_only(open, close)
    }

    /// Per-variant generator overrides.
    fn transforms(&self) -> Transforms {
        Transforms::default()
    }

    /// A generator wired with this dialect's quoting, normalization, and
    /// transforms.
    fn generator(&self, config: GenConfig) -> Generator {
        let (open, close) = self.identifier_quote();
        Generator::new(config)
            .with_quote(open, close)
            .with_normalization(self.normalization())
            .with_transforms(self.transforms())
    }

    /// Optimizer context carrying this dialect's reserved words.
    fn optimize_context(&self) -> OptimizeContext {
        OptimizeContext::default()
    }

    // ── End-to-end conveniences ────────────────────────────────────────

    /// Parse SQL text into statements.
    fn parse(&self, sql: &str) -> Result<Vec<Expr>, ParseErrors> {
        squill_parser::parse(sql, &self.lexer_config(), &ParserConfig::default())
    }

    /// Parse and return the first statement, if any.
    fn parse_one(&self, sql: &str) -> Result<Option<Expr>, ParseErrors> {
        Ok(self.parse(sql)?.into_iter().next())
    }

    /// Generate SQL text for a tree.
    fn generate(&self, expr: &Expr, config: &GenConfig) -> String {
        self.generator(config.clone()).generate(expr)
    }

    /// Parse and re-emit in this dialect's canonical form. Statements join
    /// with `; `.
    fn format(&self, sql: &str) -> Result<String, ParseErrors> {
        let statements = self.parse(sql)?;
        let generator = self.generator(GenConfig::default());
        Ok(statements
            .iter()
            .map(|s| generator.generate(s))
            .collect::<Vec<_>>()
            .join("; "))
    }

    /// Parse with this dialect, emit with `target`.
    fn transpile(&self, sql: &str, target: &dyn Dialect) -> Result<String, ParseErrors> {
        let statements = self.parse(sql)?;
        let generator = target.generator(GenConfig::default());
        Ok(statements
            .iter()
            .map(|s| generator.generate(s))
            .collect::<Vec<_>>()
            .join("; "))
    }

    /// Optimize a tree under this dialect's context.
    fn optimize(&self, expr: Expr, config: &OptimizeConfig) -> Expr {
        squill_optimizer::optimize(expr, &self.optimize_context(), config)
    }

    /// Parse, optimize, and re-emit.
    fn format_with_optimization(
        &self,
        sql: &str,
        config: &OptimizeConfig,
    ) -> Result<String, ParseErrors> {
        let statements = self.parse(sql)?;
        let generator = self.generator(GenConfig::default());
        Ok(statements
            .into_iter()
            .map(|s| generator.generate(&self.optimize(s, config)))
            .collect::<Vec<_>>()
            .join("; "))
    }
}
