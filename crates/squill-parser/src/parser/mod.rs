//! Token-stream parser for SQL statements.
//!
//! The parser owns the token vector from the lexer and a cursor into it.
//! Statement parsing is plain recursive descent; expression parsing is an
//! iterative precedence climb with explicit stacks (see `expressions`),
//! because operator chains in real SQL run deep enough to exhaust the native
//! call stack. Genuine nesting (parentheses, subqueries, CASE) still
//! recurses, guarded by the `max_nesting` cap.

pub(crate) mod expressions;
pub(crate) mod statements;

use squill_ast::Expr;
use squill_common::{Token, TokenKind};

use crate::error::{ErrorLevel, ParseError, ParseErrorKind, ParserConfig};

pub(crate) type PResult<T> = Result<T, ParseError>;

/// SQL parser over a lexed token stream.
pub(crate) struct Parser<'a> {
    /// All tokens from the lexer, ending in Eof.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Original source text, for error snippets.
    source: &'a str,
    config: ParserConfig,
    /// Collected parse errors, in source order.
    errors: Vec<ParseError>,
    /// Current nesting depth for the recursion guard.
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'a str, config: ParserConfig) -> Self {
        debug_assert!(
            tokens.last().map(|t| t.kind) == Some(TokenKind::Eof),
            "token stream must end with Eof"
        );
        Self {
            tokens,
            pos: 0,
            source,
            config,
            errors: Vec::new(),
            depth: 0,
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    pub(crate) fn nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consume the current token if it matches.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume and return the current token. Past the end, keeps returning Eof.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Consume a token of the given kind or report what was found instead.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("expected {kind:?}")))
        }
    }

    // ── Errors ─────────────────────────────────────────────────────────

    /// An error at the current token.
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.current();
        let (kind, found) = match tok.kind {
            TokenKind::Eof => (ParseErrorKind::UnexpectedEof, "end of input".to_string()),
            TokenKind::Unknown => (ParseErrorKind::UnknownToken, format!("{:?}", tok.text)),
            _ => (ParseErrorKind::UnexpectedToken, format!("{:?}", tok.text)),
        };
        ParseError::new(
            kind,
            format!("{expected}, found {found}"),
            tok.line,
            tok.col,
            self.source,
        )
    }

    /// Run `f` one nesting level deeper, erroring out past the cap.
    pub(crate) fn with_depth<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= self.config.max_nesting {
            let tok = self.current();
            return Err(ParseError::new(
                ParseErrorKind::NestingLimitExceeded,
                format!("nesting depth limit ({}) exceeded", self.config.max_nesting),
                tok.line,
                tok.col,
                self.source,
            ));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    /// Record an error, honoring `max_errors`. Returns true when parsing
    /// should abort (immediate mode).
    fn record(&mut self, error: ParseError) -> bool {
        if self.errors.len() < self.config.max_errors {
            self.errors.push(error);
        }
        self.config.error_level == ErrorLevel::Immediate
    }

    /// Skip to the next statement boundary: past a `;` or to a
    /// statement-starting keyword or Eof.
    fn recover(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                kind if is_statement_start(kind) => break,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Entry point ────────────────────────────────────────────────────

    /// Parse every statement in the stream, collecting errors per the
    /// configured policy. Returns the statements and the errors; the caller
    /// decides whether the errors are fatal.
    pub(crate) fn parse_statements(&mut self) -> (Vec<Expr>, Vec<ParseError>) {
        let mut out = Vec::new();
        loop {
            while self.eat(TokenKind::Semicolon) {}
            if self.at(TokenKind::Eof) {
                break;
            }
            match statements::statement(self) {
                Ok(stmt) => {
                    out.push(stmt);
                    if !self.at(TokenKind::Eof) && !self.at(TokenKind::Semicolon) {
                        let err = self.unexpected("expected end of statement");
                        if self.record(err) {
                            break;
                        }
                        self.recover();
                    }
                }
                Err(err) => {
                    if self.record(err) {
                        break;
                    }
                    self.recover();
                }
            }
        }
        log::debug!(
            "parsed {} statement(s), {} error(s)",
            out.len(),
            self.errors.len()
        );
        (out, std::mem::take(&mut self.errors))
    }
}

/// Keywords that can begin a statement; recovery stops at these.
pub(crate) fn is_statement_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Select
            | TokenKind::Insert
            | TokenKind::Update
            | TokenKind::Delete
            | TokenKind::Create
            | TokenKind::Drop
            | TokenKind::Alter
            | TokenKind::With
            | TokenKind::Explain
    )
}

/// Whether an Identifier token was quoted in the source. The lexer strips
/// the quotes from the text but leaves them inside the span, so a quoted
/// identifier's span is wider than its text.
pub(crate) fn is_quoted(token: &Token) -> bool {
    token.kind == TokenKind::Identifier && token.span.len() as usize != token.text.len()
}
