// Squill lexer -- dialect-parameterized SQL tokenizer.
//
// One linear pass over the source text. Quoting behavior and the keyword
// vocabulary come from a [`LexerConfig`], which is how dialects change what
// the lexer recognizes without subclassing it.

mod cursor;

use cursor::Cursor;
use rustc_hash::FxHashMap;
use squill_common::token::default_keywords;
use squill_common::{KeywordTrie, Token, TokenKind};

/// How a string literal escapes its own quote character.
///
/// An explicit policy per opening quote, rather than a quote-to-escape-char
/// map: `Doubled` means `''` inside a `'` string yields one quote;
/// `Backslash` means `\'` and `\\` are the escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteEscape {
    Doubled,
    Backslash,
}

/// Everything a dialect can vary about tokenization.
///
/// The identifier-quote table maps opening to closing characters (they
/// differ for bracket quoting); the string-quote table maps each opening
/// quote to its escape policy; the keyword trie is the complete keyword
/// vocabulary.
#[derive(Debug, Clone)]
pub struct LexerConfig {
    pub identifier_quotes: FxHashMap<char, char>,
    pub string_quotes: FxHashMap<char, QuoteEscape>,
    pub keywords: KeywordTrie,
}

impl Default for LexerConfig {
    /// The ANSI configuration: `"..."` identifiers, `'...'` strings with
    /// doubled-quote escapes, and the default keyword table.
    fn default() -> Self {
        let mut identifier_quotes = FxHashMap::default();
        identifier_quotes.insert('"', '"');
        let mut string_quotes = FxHashMap::default();
        string_quotes.insert('\'', QuoteEscape::Doubled);
        Self {
            identifier_quotes,
            string_quotes,
            keywords: KeywordTrie::from_pairs(default_keywords()),
        }
    }
}

impl LexerConfig {
    /// Add (or replace) an identifier quote pair.
    pub fn with_identifier_quote(mut self, open: char, close: char) -> Self {
        self.identifier_quotes.insert(open, close);
        self
    }

    /// Replace the identifier quote table with a single pair.
    pub fn identifier_quote_only(mut self, open: char, close: char) -> Self {
        self.identifier_quotes.clear();
        self.identifier_quotes.insert(open, close);
        self
    }

    /// Add (or replace) a string quote and its escape policy.
    pub fn with_string_quote(mut self, open: char, escape: QuoteEscape) -> Self {
        self.string_quotes.insert(open, escape);
        self
    }

    /// Add a keyword to the vocabulary.
    pub fn with_keyword(mut self, word: &str, kind: TokenKind) -> Self {
        self.keywords.insert(word, kind);
        self
    }

    /// Remove a keyword from the vocabulary.
    pub fn without_keyword(mut self, word: &str) -> Self {
        self.keywords.remove(word);
        self
    }
}

/// The SQL lexer. Converts source text into a stream of tokens.
///
/// The lexer never fails: bytes it cannot place become [`TokenKind::Unknown`]
/// tokens, unterminated strings and comments run to end of input, and the
/// stream always ends with exactly one [`TokenKind::Eof`] token.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    config: &'a LexerConfig,
    /// Comments waiting to be attached to the next emitted token.
    pending_comments: Vec<String>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source text and configuration.
    pub fn new(source: &'a str, config: &'a LexerConfig) -> Self {
        Self {
            cursor: Cursor::new(source),
            config,
            pending_comments: Vec::new(),
        }
    }

    /// Tokenize the entire source into a `Vec<Token>` ending in `Eof`.
    pub fn tokenize(source: &str, config: &LexerConfig) -> Vec<Token> {
        Lexer::new(source, config).run()
    }

    fn run(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.cursor.eat_while(char::is_whitespace);

            let Some(c) = self.cursor.peek() else { break };

            // Comments never become tokens; they are buffered onto the next one.
            if c == '-' && self.cursor.peek_next() == Some('-') {
                self.line_comment();
                continue;
            }
            if c == '/' && self.cursor.peek_next() == Some('*') {
                self.block_comment();
                continue;
            }

            let token = self.next_token(c);
            let token = token.with_comments(std::mem::take(&mut self.pending_comments));
            tokens.push(token);
        }

        let eof = Token::new(
            TokenKind::Eof,
            "",
            self.cursor.line(),
            self.cursor.col(),
            self.cursor.pos(),
            self.cursor.pos(),
        )
        .with_comments(std::mem::take(&mut self.pending_comments));
        tokens.push(eof);
        tokens
    }

    fn next_token(&mut self, c: char) -> Token {
        if let Some(kind) = self.string_prefix(c) {
            return self.prefixed_string(kind);
        }
        if let Some(&escape) = self.config.string_quotes.get(&c) {
            return self.string(c, escape, TokenKind::String);
        }
        if let Some(&close) = self.config.identifier_quotes.get(&c) {
            return self.quoted_identifier(c, close);
        }
        if c.is_ascii_digit()
            || (c == '.' && self.cursor.peek_next().is_some_and(|n| n.is_ascii_digit()))
        {
            return self.number();
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return self.word();
        }
        self.operator(c)
    }

    // ── Comments ───────────────────────────────────────────────────────

    fn line_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();
        let start = self.cursor.pos();
        self.cursor.eat_while(|c| c != '\n');
        let text = self.cursor.slice(start, self.cursor.pos());
        self.pending_comments.push(text.to_string());
    }

    /// Block comment. Unterminated input runs to end of source.
    fn block_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();
        let start = self.cursor.pos();
        let end;
        loop {
            match self.cursor.peek() {
                None => {
                    end = self.cursor.pos();
                    break;
                }
                Some('*') if self.cursor.peek_next() == Some('/') => {
                    end = self.cursor.pos();
                    self.cursor.advance();
                    self.cursor.advance();
                    break;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        let text = self.cursor.slice(start, end);
        self.pending_comments.push(text.to_string());
    }

    // ── Strings and identifiers ────────────────────────────────────────

    /// String-prefix lookahead: `b'...'`, `x'...'`, `r'...'`, `n'...'`,
    /// `u&'...'`. The prefix only counts when the quote follows directly.
    fn string_prefix(&self, c: char) -> Option<TokenKind> {
        let quote_follows =
            |n: usize| self.cursor.peek_nth(n).is_some_and(|q| self.config.string_quotes.contains_key(&q));
        match c.to_ascii_lowercase() {
            'b' if quote_follows(1) => Some(TokenKind::ByteString),
            'x' if quote_follows(1) => Some(TokenKind::HexString),
            'r' if quote_follows(1) => Some(TokenKind::RawString),
            'n' if quote_follows(1) => Some(TokenKind::NationalString),
            'u' if self.cursor.peek_next() == Some('&') && quote_follows(2) => {
                Some(TokenKind::UnicodeString)
            }
            _ => None,
        }
    }

    fn prefixed_string(&mut self, kind: TokenKind) -> Token {
        let line = self.cursor.line();
        let col = self.cursor.col();
        let start = self.cursor.pos();
        // Consume the prefix up to the quote.
        while let Some(c) = self.cursor.peek() {
            if self.config.string_quotes.contains_key(&c) {
                break;
            }
            self.cursor.advance();
        }
        let quote = self.cursor.peek().unwrap_or('\'');
        let escape = *self.config.string_quotes.get(&quote).unwrap_or(&QuoteEscape::Doubled);
        let inner = self.string_body(quote, escape);
        Token::new(kind, inner, line, col, start, self.cursor.pos())
    }

    fn string(&mut self, quote: char, escape: QuoteEscape, kind: TokenKind) -> Token {
        let line = self.cursor.line();
        let col = self.cursor.col();
        let start = self.cursor.pos();
        let inner = self.string_body(quote, escape);
        Token::new(kind, inner, line, col, start, self.cursor.pos())
    }

    /// Consume an entire quoted string and return its unescaped content.
    /// An unterminated string runs to end of input.
    fn string_body(&mut self, quote: char, escape: QuoteEscape) -> String {
        self.cursor.advance(); // opening quote
        let mut inner = String::new();
        while let Some(c) = self.cursor.advance() {
            match escape {
                QuoteEscape::Doubled if c == quote => {
                    if self.cursor.peek() == Some(quote) {
                        self.cursor.advance();
                        inner.push(quote);
                    } else {
                        break;
                    }
                }
                QuoteEscape::Backslash if c == '\\' => match self.cursor.advance() {
                    Some(escaped) => inner.push(escaped),
                    None => break,
                },
                QuoteEscape::Backslash if c == quote => break,
                _ => inner.push(c),
            }
        }
        inner
    }

    /// Quoted identifier: inner text with doubled-close escapes resolved.
    /// The token text is the inner name; the span covers the quotes, which
    /// is how downstream code can tell it was quoted.
    fn quoted_identifier(&mut self, _open: char, close: char) -> Token {
        let line = self.cursor.line();
        let col = self.cursor.col();
        let start = self.cursor.pos();
        self.cursor.advance(); // opening quote
        let mut inner = String::new();
        while let Some(c) = self.cursor.advance() {
            if c == close {
                if self.cursor.peek() == Some(close) {
                    self.cursor.advance();
                    inner.push(close);
                } else {
                    break;
                }
            } else {
                inner.push(c);
            }
        }
        Token::new(TokenKind::Identifier, inner, line, col, start, self.cursor.pos())
    }

    // ── Numbers, words, operators ──────────────────────────────────────

    fn number(&mut self) -> Token {
        let line = self.cursor.line();
        let col = self.cursor.col();
        let start = self.cursor.pos();
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '.');
        // Optional scientific suffix, only when fully well-formed.
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            let next = self.cursor.peek_next();
            let digit_after_sign = matches!(next, Some('+' | '-'))
                && self.cursor.peek_nth(2).is_some_and(|d| d.is_ascii_digit());
            if next.is_some_and(|d| d.is_ascii_digit()) || digit_after_sign {
                self.cursor.advance(); // e
                if matches!(self.cursor.peek(), Some('+' | '-')) {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        Token::new(TokenKind::Number, text, line, col, start, self.cursor.pos())
    }

    fn word(&mut self) -> Token {
        let line = self.cursor.line();
        let col = self.cursor.col();
        let start = self.cursor.pos();
        self.cursor
            .eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = self
            .config
            .keywords
            .get(text)
            .unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, line, col, start, self.cursor.pos())
    }

    fn operator(&mut self, c: char) -> Token {
        let line = self.cursor.line();
        let col = self.cursor.col();
        let start = self.cursor.pos();

        // Three-char, then two-char, then one-char maximal match.
        let c2 = self.cursor.peek_next();
        let c3 = self.cursor.peek_nth(2);
        if c == '<' && c2 == Some('=') && c3 == Some('>') {
            self.cursor.advance();
            self.cursor.advance();
            self.cursor.advance();
            let text = self.cursor.slice(start, self.cursor.pos());
            return Token::new(TokenKind::NullSafeEq, text, line, col, start, self.cursor.pos());
        }

        let two = c2.map(|n| (c, n));
        let two_kind = match two {
            Some((':', ':')) => Some(TokenKind::DColon),
            Some(('=', '>')) => Some(TokenKind::FatArrow),
            Some(('-', '>')) => Some(TokenKind::Arrow),
            Some(('<', '-')) => Some(TokenKind::LArrow),
            Some(('<', '<')) => Some(TokenKind::Shl),
            Some(('>', '>')) => Some(TokenKind::Shr),
            Some(('|', '|')) => Some(TokenKind::DPipe),
            Some(('<', '>')) => Some(TokenKind::Neq),
            Some(('!', '=')) => Some(TokenKind::Neq),
            Some(('<', '=')) => Some(TokenKind::LtEq),
            Some(('>', '=')) => Some(TokenKind::GtEq),
            _ => None,
        };
        if let Some(kind) = two_kind {
            self.cursor.advance();
            self.cursor.advance();
            let text = self.cursor.slice(start, self.cursor.pos());
            return Token::new(kind, text, line, col, start, self.cursor.pos());
        }

        let one_kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Placeholder,
            '@' => TokenKind::At,
            '#' => TokenKind::Hash,
            '`' => TokenKind::Backtick,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '&' => TokenKind::Amp,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '~' => TokenKind::Tilde,
            '=' => TokenKind::Eq,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            _ => TokenKind::Unknown,
        };
        self.cursor.advance();
        let text = self.cursor.slice(start, self.cursor.pos());
        Token::new(one_kind, text, line, col, start, self.cursor.pos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let config = LexerConfig::default();
        Lexer::tokenize(source, &config)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_input_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   \n\t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("select foo FROM bar"),
            vec![
                TokenKind::Select,
                TokenKind::Identifier,
                TokenKind::From,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn case_is_preserved_in_text() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize("SeLeCt", &config);
        assert_eq!(tokens[0].kind, TokenKind::Select);
        assert_eq!(tokens[0].text, "SeLeCt");
    }

    #[test]
    fn numbers_with_scientific_suffix() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize("1 2.5 1e10 3.14E-2 1e", &config);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "2.5", "1e10", "3.14E-2", "1", "e", ""]);
        assert_eq!(tokens[4].kind, TokenKind::Number);
        assert_eq!(tokens[5].kind, TokenKind::Identifier);
    }

    #[test]
    fn string_with_doubled_quote_escape() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize("'it''s'", &config);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "it's");
        assert_eq!(tokens[0].span.start, 0);
        assert_eq!(tokens[0].span.end, 7);
    }

    #[test]
    fn string_with_backslash_escape() {
        let config = LexerConfig::default().with_string_quote('\'', QuoteEscape::Backslash);
        let tokens = Lexer::tokenize(r"'a\'b'", &config);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "a'b");
    }

    #[test]
    fn unterminated_string_runs_to_eof() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize("'abc", &config);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "abc");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn quoted_identifier_keeps_inner_text() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize(r#""order""#, &config);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "order");
        // Span is wider than the text because it covers the quotes.
        assert_eq!(tokens[0].span.len(), 7);
    }

    #[test]
    fn backtick_identifiers_when_configured() {
        let config = LexerConfig::default().with_identifier_quote('`', '`');
        let tokens = Lexer::tokenize("`my col`", &config);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "my col");
    }

    #[test]
    fn comments_attach_to_next_token() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize("-- leading\nselect /* mid */ 1", &config);
        assert_eq!(tokens[0].kind, TokenKind::Select);
        assert_eq!(tokens[0].comments, vec![" leading".to_string()]);
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].comments, vec![" mid ".to_string()]);
    }

    #[test]
    fn trailing_comment_attaches_to_eof() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize("1 -- tail", &config);
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.comments, vec![" tail".to_string()]);
    }

    #[test]
    fn unterminated_block_comment_runs_to_eof() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize("/* open", &config);
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.comments, vec![" open".to_string()]);
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn operators_prefer_longest_match() {
        assert_eq!(
            kinds("<=> <= < :: : || |"),
            vec![
                TokenKind::NullSafeEq,
                TokenKind::LtEq,
                TokenKind::Lt,
                TokenKind::DColon,
                TokenKind::Colon,
                TokenKind::DPipe,
                TokenKind::Pipe,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unknown_bytes_become_unknown_tokens() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize("a ¤ b", &config);
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
        assert_eq!(tokens[1].text, "¤");
    }

    #[test]
    fn prefixed_strings() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize("b'01' x'ff' r'raw' n'nat'", &config);
        let got: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            got,
            vec![
                TokenKind::ByteString,
                TokenKind::HexString,
                TokenKind::RawString,
                TokenKind::NationalString,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[1].text, "ff");
    }

    #[test]
    fn line_and_col_are_one_based() {
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize("select\n  x", &config);
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].col), (2, 3));
    }

    #[test]
    fn spans_reconstruct_the_input() {
        // Token spans are ordered and non-overlapping, and every byte
        // between consecutive spans is whitespace (no comments here).
        let source = "select a, 'x''y' + 1.5 from \"t\"";
        let config = LexerConfig::default();
        let tokens = Lexer::tokenize(source, &config);
        let mut pos = 0u32;
        for tok in &tokens {
            assert!(tok.span.start >= pos, "spans out of order");
            let gap = &source[pos as usize..tok.span.start as usize];
            assert!(gap.chars().all(char::is_whitespace), "gap {gap:?} not whitespace");
            pos = tok.span.end;
        }
        assert_eq!(pos as usize, source.len());
    }
}
