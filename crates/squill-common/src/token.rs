use serde::Serialize;

use crate::span::Span;

/// A token produced by the SQL lexer.
///
/// Tokens are immutable values: the lexer produces them, the parser consumes
/// them, nothing mutates them in between. `text` preserves the case of the
/// matched source slice; `line` and `col` are 1-based and refer to the
/// token's first character. Comments that preceded the token and were not
/// attached to an earlier token ride along in `comments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub col: u32,
    pub span: Span,
    pub comments: Vec<String>,
}

impl Token {
    /// Create a new token without attached comments.
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, col: u32, start: u32, end: u32) -> Self {
        debug_assert!(line >= 1, "token line must be 1-based");
        debug_assert!(col >= 1, "token col must be 1-based");
        Self {
            kind,
            text: text.into(),
            line,
            col,
            span: Span::new(start, end),
            comments: Vec::new(),
        }
    }

    /// Attach buffered comments to this token.
    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }
}

/// Category of a token kind, used by the parser and by dialect extension
/// points to reason about whole families at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenCategory {
    Punctuation,
    Operator,
    Literal,
    DataType,
    Keyword,
    Special,
}

/// Every kind of token in the SQL vocabulary.
///
/// This enum is the complete alphabet for the lexer: punctuation, operators,
/// comparisons, reserved words, built-in data-type names, function-name
/// keywords (recognized so the parser can treat them as callable even when a
/// dialect reserves them), and the special kinds. The enumeration is closed;
/// adding a variant is an API-breaking change for dialect extension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Punctuation ────────────────────────────────────────────────────
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `::`
    DColon,
    /// `?`
    Placeholder,
    /// `@`
    At,
    /// `#`
    Hash,
    /// `` ` ``
    Backtick,
    /// `=>`
    FatArrow,
    /// `->`
    Arrow,
    /// `<-`
    LArrow,

    // ── Arithmetic and bitwise operators ───────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `||`
    DPipe,

    // ── Comparison operators ───────────────────────────────────────────
    /// `=`
    Eq,
    /// `<>` or `!=`
    Neq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `<=>`
    NullSafeEq,

    // ── Reserved words ─────────────────────────────────────────────────
    Add,
    All,
    Alter,
    And,
    Any,
    As,
    Asc,
    Begin,
    Between,
    By,
    Case,
    Cast,
    Check,
    Collate,
    Column,
    Commit,
    Constraint,
    Create,
    Cross,
    Cube,
    Database,
    Default,
    Delete,
    Desc,
    Describe,
    Distinct,
    Drop,
    Else,
    End,
    Escape,
    Except,
    Exists,
    Explain,
    False,
    Filter,
    First,
    Following,
    For,
    Foreign,
    From,
    Full,
    Group,
    Having,
    If,
    Ignore,
    Ilike,
    In,
    Inner,
    Insert,
    Intersect,
    Interval,
    Into,
    Is,
    Join,
    Key,
    Last,
    Lateral,
    Leading,
    Left,
    Like,
    Limit,
    Natural,
    Not,
    Null,
    Nulls,
    Offset,
    On,
    Only,
    Or,
    Order,
    Outer,
    Over,
    Overwrite,
    Partition,
    Preceding,
    Primary,
    Qualify,
    Range,
    Recursive,
    References,
    Rename,
    Right,
    Rollback,
    Rollup,
    Row,
    Rows,
    Select,
    Semi,
    Set,
    Some,
    Table,
    Temporary,
    Then,
    To,
    Top,
    Trailing,
    True,
    Truncate,
    Unbounded,
    Union,
    Unique,
    Unnest,
    Update,
    Use,
    Using,
    Values,
    View,
    When,
    Where,
    Window,
    With,
    Xor,

    // ── Built-in data-type names ───────────────────────────────────────
    TinyIntType,
    SmallIntType,
    IntType,
    IntegerType,
    BigIntType,
    FloatType,
    DoubleType,
    RealType,
    DecimalType,
    NumericType,
    BooleanType,
    CharType,
    VarcharType,
    TextType,
    BinaryType,
    VarbinaryType,
    BlobType,
    DateType,
    TimeType,
    TimestampType,
    DatetimeType,
    JsonType,
    UuidType,
    ArrayType,
    MapType,
    StructType,

    // ── Function-name keywords ─────────────────────────────────────────
    // Reserved in some dialects, but always callable; the parser accepts
    // these in expression-primary position as function names.
    Abs,
    Avg,
    Coalesce,
    Concat,
    Count,
    CurrentDate,
    CurrentTimestamp,
    Length,
    Lower,
    Max,
    Min,
    Now,
    Replace,
    Round,
    Substring,
    Sum,
    Trim,
    Upper,

    // ── Special kinds ──────────────────────────────────────────────────
    /// End of input. Every token stream ends with exactly one of these.
    Eof,
    /// A byte the lexer could not place. Carries the single character.
    Unknown,
    /// Numeric literal.
    Number,
    /// String literal (text is the unquoted content).
    String,
    /// Identifier, bare or quoted.
    Identifier,
    /// `b'...'` byte string.
    ByteString,
    /// `x'...'` hex string.
    HexString,
    /// `r'...'` raw string.
    RawString,
    /// `u&'...'` unicode string.
    UnicodeString,
    /// `n'...'` national string.
    NationalString,
}

impl TokenKind {
    /// The category this kind belongs to.
    pub fn category(&self) -> TokenCategory {
        use TokenKind::*;
        match self {
            LParen | RParen | LBracket | RBracket | LBrace | RBrace | Comma | Dot | Semicolon
            | Colon | DColon | Placeholder | At | Hash | Backtick | FatArrow | Arrow | LArrow => {
                TokenCategory::Punctuation
            }
            Plus | Minus | Star | Slash | Percent | Amp | Pipe | Caret | Tilde | Shl | Shr
            | DPipe | Eq | Neq | Lt | Gt | LtEq | GtEq | NullSafeEq => TokenCategory::Operator,
            TinyIntType | SmallIntType | IntType | IntegerType | BigIntType | FloatType
            | DoubleType | RealType | DecimalType | NumericType | BooleanType | CharType
            | VarcharType | TextType | BinaryType | VarbinaryType | BlobType | DateType
            | TimeType | TimestampType | DatetimeType | JsonType | UuidType | ArrayType
            | MapType | StructType => TokenCategory::DataType,
            Eof | Unknown => TokenCategory::Special,
            Number | String | Identifier | ByteString | HexString | RawString | UnicodeString
            | NationalString => TokenCategory::Literal,
            _ => TokenCategory::Keyword,
        }
    }

    /// Whether this kind names a built-in data type.
    pub fn is_data_type(&self) -> bool {
        self.category() == TokenCategory::DataType
    }

    /// Whether this kind is a keyword the parser accepts as a function name.
    pub fn is_function_keyword(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Abs | Avg
                | Coalesce
                | Concat
                | Count
                | CurrentDate
                | CurrentTimestamp
                | Length
                | Lower
                | Max
                | Min
                | Now
                | Replace
                | Round
                | Substring
                | Sum
                | Trim
                | Upper
        )
    }
}

/// The default keyword table: every reserved word, data-type name, and
/// function-name keyword paired with its lower-case spelling.
///
/// Dialects start from this table when building their keyword trie and add
/// or remove entries before handing the trie to the lexer.
pub fn default_keywords() -> Vec<(&'static str, TokenKind)> {
    use TokenKind::*;
    vec![
        ("add", Add),
        ("all", All),
        ("alter", Alter),
        ("and", And),
        ("any", Any),
        ("as", As),
        ("asc", Asc),
        ("begin", Begin),
        ("between", Between),
        ("by", By),
        ("case", Case),
        ("cast", Cast),
        ("check", Check),
        ("collate", Collate),
        ("column", Column),
        ("commit", Commit),
        ("constraint", Constraint),
        ("create", Create),
        ("cross", Cross),
        ("cube", Cube),
        ("database", Database),
        ("default", Default),
        ("delete", Delete),
        ("desc", Desc),
        ("describe", Describe),
        ("distinct", Distinct),
        ("drop", Drop),
        ("else", Else),
        ("end", End),
        ("escape", Escape),
        ("except", Except),
        ("exists", Exists),
        ("explain", Explain),
        ("false", False),
        ("filter", Filter),
        ("first", First),
        ("following", Following),
        ("for", For),
        ("foreign", Foreign),
        ("from", From),
        ("full", Full),
        ("group", Group),
        ("having", Having),
        ("if", If),
        ("ignore", Ignore),
        ("ilike", Ilike),
        ("in", In),
        ("inner", Inner),
        ("insert", Insert),
        ("intersect", Intersect),
        ("interval", Interval),
        ("into", Into),
        ("is", Is),
        ("join", Join),
        ("key", Key),
        ("last", Last),
        ("lateral", Lateral),
        ("leading", Leading),
        ("left", Left),
        ("like", Like),
        ("limit", Limit),
        ("natural", Natural),
        ("not", Not),
        ("null", Null),
        ("nulls", Nulls),
        ("offset", Offset),
        ("on", On),
        ("only", Only),
        ("or", Or),
        ("order", Order),
        ("outer", Outer),
        ("over", Over),
        ("overwrite", Overwrite),
        ("partition", Partition),
        ("preceding", Preceding),
        ("primary", Primary),
        ("qualify", Qualify),
        ("range", Range),
        ("recursive", Recursive),
        ("references", References),
        ("rename", Rename),
        ("right", Right),
        ("rollback", Rollback),
        ("rollup", Rollup),
        ("row", Row),
        ("rows", Rows),
        ("select", Select),
        ("semi", Semi),
        ("set", Set),
        ("some", Some),
        ("table", Table),
        ("temporary", Temporary),
        ("then", Then),
        ("to", To),
        ("top", Top),
        ("trailing", Trailing),
        ("true", True),
        ("truncate", Truncate),
        ("unbounded", Unbounded),
        ("union", Union),
        ("unique", Unique),
        ("unnest", Unnest),
        ("update", Update),
        ("use", Use),
        ("using", Using),
        ("values", Values),
        ("view", View),
        ("when", When),
        ("where", Where),
        ("window", Window),
        ("with", With),
        ("xor", Xor),
        // Data types
        ("tinyint", TinyIntType),
        ("smallint", SmallIntType),
        ("int", IntType),
        ("integer", IntegerType),
        ("bigint", BigIntType),
        ("float", FloatType),
        ("double", DoubleType),
        ("real", RealType),
        ("decimal", DecimalType),
        ("numeric", NumericType),
        ("boolean", BooleanType),
        ("char", CharType),
        ("varchar", VarcharType),
        ("text", TextType),
        ("binary", BinaryType),
        ("varbinary", VarbinaryType),
        ("blob", BlobType),
        ("date", DateType),
        ("time", TimeType),
        ("timestamp", TimestampType),
        ("datetime", DatetimeType),
        ("json", JsonType),
        ("uuid", UuidType),
        ("array", ArrayType),
        ("map", MapType),
        ("struct", StructType),
        // Function-name keywords
        ("abs", Abs),
        ("avg", Avg),
        ("coalesce", Coalesce),
        ("concat", Concat),
        ("count", Count),
        ("current_date", CurrentDate),
        ("current_timestamp", CurrentTimestamp),
        ("length", Length),
        ("lower", Lower),
        ("max", Max),
        ("min", Min),
        ("now", Now),
        ("replace", Replace),
        ("round", Round),
        ("substring", Substring),
        ("sum", Sum),
        ("trim", Trim),
        ("upper", Upper),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_new_constructor() {
        let tok = Token::new(TokenKind::Select, "SELECT", 1, 1, 0, 6);
        assert_eq!(tok.kind, TokenKind::Select);
        assert_eq!(tok.text, "SELECT");
        assert_eq!(tok.span, Span::new(0, 6));
        assert!(tok.comments.is_empty());
    }

    #[test]
    fn token_with_comments() {
        let tok = Token::new(TokenKind::Select, "select", 2, 1, 10, 16)
            .with_comments(vec![" leading".to_string()]);
        assert_eq!(tok.comments, vec![" leading".to_string()]);
    }

    #[test]
    fn categories() {
        assert_eq!(TokenKind::Comma.category(), TokenCategory::Punctuation);
        assert_eq!(TokenKind::DPipe.category(), TokenCategory::Operator);
        assert_eq!(TokenKind::NullSafeEq.category(), TokenCategory::Operator);
        assert_eq!(TokenKind::Number.category(), TokenCategory::Literal);
        assert_eq!(TokenKind::VarcharType.category(), TokenCategory::DataType);
        assert_eq!(TokenKind::Select.category(), TokenCategory::Keyword);
        assert_eq!(TokenKind::Count.category(), TokenCategory::Keyword);
        assert_eq!(TokenKind::Eof.category(), TokenCategory::Special);
        assert_eq!(TokenKind::Unknown.category(), TokenCategory::Special);
    }

    #[test]
    fn function_keywords_are_callable() {
        assert!(TokenKind::Count.is_function_keyword());
        assert!(TokenKind::Replace.is_function_keyword());
        assert!(!TokenKind::Select.is_function_keyword());
    }

    #[test]
    fn default_keyword_table_is_lowercase_and_unique() {
        let keywords = default_keywords();
        let mut seen = std::collections::HashSet::new();
        for (text, _) in &keywords {
            assert_eq!(*text, text.to_lowercase(), "table entries are lower-case");
            assert!(seen.insert(*text), "duplicate keyword {text}");
        }
    }
}
