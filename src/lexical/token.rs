//! Contains the [`Token`] struct and its related types.

use std::{collections::HashMap, str::FromStr, sync::OnceLock};

use crate::base::source_file::{
    Position, SourceCursor, SourceElement, Span, UnexpectedEndOfInput,
};
use derive_more::From;
use enum_as_inner::EnumAsInner;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use super::{
    char_class::{self, CharClass},
    error::{InvalidBasePrefix, MissingBaseDigits},
};

/// Is an enumeration representing keywords in Kirigami.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum KeywordKind {
    Alias,
    As,
    Break,
    Const,
    Continue,
    Elif,
    Else,
    Enum,
    Export,
    Function,
    For,
    From,
    If,
    Import,
    Let,
    Loop,
    Macro,
    Pass,
    Phantom,
    Return,
    Scope,
    Static,
    Struct,
    Type,
    While,
}

impl ToString for KeywordKind {
    fn to_string(&self) -> String {
        self.as_str().to_string()
    }
}

/// Is an error that is returned when a string cannot be parsed into a [`KeywordKind`] in
/// [`FromStr`] trait implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, thiserror::Error)]
#[error("invalid string representation of keyword.")]
pub struct KeywordParseError;

impl FromStr for KeywordKind {
    type Err = KeywordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static STRING_KEYWORD_MAP: OnceLock<HashMap<&'static str, KeywordKind>> = OnceLock::new();
        let map = STRING_KEYWORD_MAP.get_or_init(|| {
            let mut map = HashMap::new();

            for keyword in Self::iter() {
                map.insert(keyword.as_str(), keyword);
            }

            map
        });

        map.get(s).copied().ok_or(KeywordParseError)
    }
}

impl KeywordKind {
    /// Gets the string representation of the keyword as a `&str`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alias => "alias",
            Self::As => "as",
            Self::Break => "break",
            Self::Const => "const",
            Self::Continue => "continue",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::Enum => "enum",
            Self::Export => "export",
            Self::Function => "fn",
            Self::For => "for",
            Self::From => "from",
            Self::If => "if",
            Self::Import => "import",
            Self::Let => "let",
            Self::Loop => "loop",
            Self::Macro => "macro",
            Self::Pass => "pass",
            Self::Phantom => "phantom",
            Self::Return => "return",
            Self::Scope => "scope",
            Self::Static => "static",
            Self::Struct => "struct",
            Self::Type => "type",
            Self::While => "while",
        }
    }
}

/// Is an enumeration representing the resolved operator or punctuation of a [`Symbol`] token.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum SymbolKind {
    Increment,
    Decrement,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    ShiftRight,
    ShiftLeft,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    NotEqual,
    Colon,
    Semicolon,
    Comma,
    Dot,
    Question,
    At,
    Backslash,
    Backtick,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Equal,
    AddEqual,
    SubtractEqual,
    MultiplyEqual,
    DivideEqual,
    ModuloEqual,
    ShiftRightEqual,
    ShiftLeftEqual,
    BitNot,
    BitAnd,
    BitOr,
    BitXor,
    BitAndEqual,
    BitOrEqual,
    BitXorEqual,
    LogicNot,
    LogicAnd,
    LogicOr,
}

impl SymbolKind {
    /// Gets the literal operator or punctuation string of the symbol.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increment => "++",
            Self::Decrement => "--",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::ShiftRight => ">>",
            Self::ShiftLeft => "<<",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::EqualEqual => "==",
            Self::NotEqual => "!=",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Question => "?",
            Self::At => "@",
            Self::Backslash => "\\",
            Self::Backtick => "`",
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::OpenBrace => "{",
            Self::CloseBrace => "}",
            Self::OpenBracket => "[",
            Self::CloseBracket => "]",
            Self::Equal => "=",
            Self::AddEqual => "+=",
            Self::SubtractEqual => "-=",
            Self::MultiplyEqual => "*=",
            Self::DivideEqual => "/=",
            Self::ModuloEqual => "%=",
            Self::ShiftRightEqual => ">>=",
            Self::ShiftLeftEqual => "<<=",
            Self::BitNot => "~",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAndEqual => "&=",
            Self::BitOrEqual => "|=",
            Self::BitXorEqual => "^=",
            Self::LogicNot => "!",
            Self::LogicAnd => "&&",
            Self::LogicOr => "||",
        }
    }
}

/// The fixed table mapping literal operator strings to their [`SymbolKind`].
///
/// Greedy longest-match scanning is only sound if the symbol-start character
/// class and the table agree on the set of first bytes, and if every proper
/// prefix of an entry is an entry itself; both are asserted when the table is
/// first built.
fn symbol_map() -> &'static HashMap<&'static str, SymbolKind> {
    static MAP: OnceLock<HashMap<&'static str, SymbolKind>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = HashMap::new();

        for kind in SymbolKind::iter() {
            map.insert(kind.as_str(), kind);
        }

        for byte in 0..=u8::MAX {
            let single = char::from(byte).to_string();
            assert_eq!(
                char_class::symbol_start().contains(byte),
                map.contains_key(single.as_str()),
                "symbol table and symbol-start class disagree on byte {byte:#04x}"
            );
        }
        for entry in map.keys() {
            for length in 1..entry.len() {
                assert!(
                    map.contains_key(&entry[..length]),
                    "symbol table entry {entry:?} has a prefix that is not an entry"
                );
            }
        }

        map
    })
}

/// Is an enumeration containing all kinds of tokens in the Kirigami programming language.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, From, EnumAsInner)]
#[allow(missing_docs)]
pub enum Token {
    WhiteSpaces(WhiteSpaces),
    Word(Word),
    Symbol(Symbol),
    Numeric(Numeric),
    StringLiteral(StringLiteral),
    Comment(Comment),
}

impl Token {
    /// Returns the span of the token.
    #[must_use]
    pub fn span(&self) -> &Span {
        match self {
            Self::WhiteSpaces(token) => &token.span,
            Self::Word(token) => &token.span,
            Self::Symbol(token) => &token.span,
            Self::Numeric(token) => &token.span,
            Self::StringLiteral(token) => &token.span,
            Self::Comment(token) => &token.span,
        }
    }

    /// Returns the human readable name of the token kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::WhiteSpaces(_) => "whitespace",
            Self::Word(_) => "word",
            Self::Symbol(_) => "symbol",
            Self::Numeric(_) => "numeric",
            Self::StringLiteral(_) => "string",
            Self::Comment(_) => "comment",
        }
    }
}

impl SourceElement for Token {
    fn span(&self) -> Span {
        match self {
            Self::WhiteSpaces(token) => token.span(),
            Self::Word(token) => token.span(),
            Self::Symbol(token) => token.span(),
            Self::Numeric(token) => token.span(),
            Self::StringLiteral(token) => token.span(),
            Self::Comment(token) => token.span(),
        }
    }
}

/// Represents a contiguous sequence of whitespace characters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhiteSpaces {
    /// Is the span that makes up the token.
    pub span: Span,
}

impl SourceElement for WhiteSpaces {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

/// Represents a contiguous sequence of characters that are valid in a word.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Is the span that makes up the token.
    pub span: Span,

    /// Is the keyword the word resolves to, if it is one.
    pub keyword: Option<KeywordKind>,
}

impl SourceElement for Word {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

/// Represents an operator or punctuation sequence resolved against the symbol table.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Is the span that makes up the token.
    pub span: Span,

    /// Is the resolved operator of the token.
    pub kind: SymbolKind,
}

impl SourceElement for Symbol {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

/// Represents a hardcoded numeric literal value in the source code.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Numeric {
    /// Is the span that makes up the token.
    pub span: Span,

    /// Is the decoded numeric value of the literal.
    ///
    /// Decoded in floating point; decimal precision is not guaranteed exact
    /// for large or fractional magnitudes.
    pub value: f64,
}

impl SourceElement for Numeric {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

/// Represents a hardcoded string literal value in the source code.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// Is the span that makes up the token.
    pub span: Span,
}

impl StringLiteral {
    /// Returns the string without the leading and trailing delimiters.
    ///
    /// Escape sequences are preserved as written; decoding them is left to a
    /// later stage.
    #[must_use]
    pub fn str_content(&self) -> &str {
        let string = self.span.str();
        &string[1..string.len() - 1]
    }
}

impl SourceElement for StringLiteral {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

/// Is an enumeration representing the two kinds of comments in the Kirigami programming language.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommentKind {
    /// A comment that starts with `#` and ends at the end of the line.
    Line,

    /// A comment that starts with `##` and ends with the next unescaped `##`.
    Block,
}

/// Represents a portion of the source code that is ignored by the compiler.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Is the span that makes up the token.
    pub span: Span,

    /// Is the kind of comment that the token represents.
    pub kind: CommentKind,
}

impl SourceElement for Comment {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

/// Is an error that can occur when invoking the [`Token::tokenize`] method.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("the cursor is at the end of the source content.")]
    EndOfSourceCode,

    #[error(transparent)]
    UnexpectedEndOfInput(#[from] UnexpectedEndOfInput),

    #[error(transparent)]
    InvalidBasePrefix(#[from] InvalidBasePrefix),

    #[error(transparent)]
    MissingBaseDigits(#[from] MissingBaseDigits),
}

/// Decode a run of digits in the given base into a floating point value.
fn digits_value(digits: &str, base: u32) -> f64 {
    digits.chars().fold(0.0, |value, digit| {
        value * f64::from(base) + f64::from(digit.to_digit(base).unwrap_or(0))
    })
}

impl Token {
    /// Creates a span from the given start position to the current position of the cursor.
    fn span_from(cursor: &SourceCursor, start: Position) -> Span {
        Span::new(cursor.source_file().clone(), start, cursor.position())
    }

    /// Consumes a maximal run of bytes from the given digit class.
    fn take_digits(
        cursor: &mut SourceCursor,
        class: &CharClass,
    ) -> Result<String, UnexpectedEndOfInput> {
        let mut digits = String::new();
        while class.contains(cursor.peek(0)) {
            digits.push(char::from(cursor.peek(0)));
            cursor.consume(1)?;
        }
        Ok(digits)
    }

    /// Handles a contiguous sequence of whitespace characters.
    fn handle_whitespace(cursor: &mut SourceCursor) -> Result<Self, TokenizeError> {
        let start = cursor.position();

        while char_class::whitespace().contains(cursor.peek(0)) {
            cursor.consume(1)?;
        }

        Ok(WhiteSpaces {
            span: Self::span_from(cursor, start),
        }
        .into())
    }

    /// Handles a word-start byte followed by a maximal run of word-continue bytes.
    fn handle_word(cursor: &mut SourceCursor) -> Result<Self, TokenizeError> {
        let start = cursor.position();

        cursor.consume(1)?;
        while char_class::word_continue().contains(cursor.peek(0)) {
            cursor.consume(1)?;
        }

        let span = Self::span_from(cursor, start);
        let keyword = KeywordKind::from_str(span.str()).ok();

        Ok(Word { span, keyword }.into())
    }

    /// Handles an operator or punctuation sequence by greedy longest-match
    /// against the symbol table.
    fn handle_symbol(cursor: &mut SourceCursor) -> Result<Self, TokenizeError> {
        let start = cursor.position();
        let map = symbol_map();

        let mut candidate = String::new();
        let mut resolved = None;

        loop {
            candidate.push(char::from(cursor.peek(0)));
            let Some(kind) = map.get(candidate.as_str()) else {
                break;
            };
            resolved = Some(*kind);
            cursor.consume(1)?;
        }

        // Table construction guarantees a single-byte entry for every
        // symbol-start byte, so the first extension always matches.
        resolved.map_or_else(
            || unreachable!("symbol-start byte without a symbol table entry"),
            |kind| {
                Ok(Symbol {
                    span: Self::span_from(cursor, start),
                    kind,
                }
                .into())
            },
        )
    }

    /// Handles the fraction and exponent tail of a decimal literal.
    ///
    /// The cursor stands right after the integer digits; missing fraction or
    /// exponent digit runs default to `0`.
    fn parse_decimal_tail(
        cursor: &mut SourceCursor,
        integer_digits: &str,
    ) -> Result<f64, TokenizeError> {
        let integer = digits_value(integer_digits, 10);

        let mut fraction = 0.0;
        if cursor.peek(0) == b'.' {
            cursor.consume(1)?;
            let digits = Self::take_digits(cursor, char_class::digit())?;
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            {
                fraction = digits_value(&digits, 10) * 10f64.powi(-(digits.len() as i32));
            }
        }

        let mut exponent = 0;
        if matches!(cursor.peek(0), b'e' | b'E') {
            cursor.consume(1)?;

            let sign = match cursor.peek(0) {
                b'-' => {
                    cursor.consume(1)?;
                    -1
                }
                b'+' => {
                    cursor.consume(1)?;
                    1
                }
                _ => 1,
            };

            let digits = Self::take_digits(cursor, char_class::digit())?;
            #[allow(clippy::cast_possible_truncation)]
            {
                exponent = sign * digits_value(&digits, 10) as i32;
            }
        }

        Ok((integer + fraction) * 10f64.powi(exponent))
    }

    /// Handles a numeric literal.
    ///
    /// If the previously emitted token is a `.` symbol, that token is
    /// retracted: it is removed from the sequence, the cursor is rewound to
    /// its start and the literal is reparsed as a fraction beginning at the
    /// dot. Otherwise the literal starts at the current digit and may carry a
    /// base modifier, a fraction and an exponent.
    fn handle_numeric(
        cursor: &mut SourceCursor,
        tokens: &mut Vec<Self>,
    ) -> Result<Self, TokenizeError> {
        let last_is_dot = tokens
            .last()
            .and_then(Self::as_symbol)
            .is_some_and(|symbol| symbol.kind == SymbolKind::Dot);

        if last_is_dot {
            let Some(Self::Symbol(dot)) = tokens.pop() else {
                unreachable!("the last token was checked to be a symbol")
            };

            cursor.seek(dot.span.start());
            let start = cursor.position();
            let value = Self::parse_decimal_tail(cursor, "")?;

            return Ok(Numeric {
                span: Self::span_from(cursor, start),
                value,
            }
            .into());
        }

        let start = cursor.position();
        let integer_digits = Self::take_digits(cursor, char_class::digit())?;

        let base: Option<u32> = match cursor.peek(0) {
            b'b' | b'B' => Some(2),
            b'q' | b'Q' => Some(4),
            b'o' | b'O' => Some(8),
            b'x' | b'X' => Some(16),
            _ => None,
        };

        if let Some(base) = base {
            let modifier = char::from(cursor.peek(0));
            if integer_digits != "0" {
                return Err(InvalidBasePrefix {
                    span: Self::span_from(cursor, start),
                    modifier,
                }
                .into());
            }
            cursor.consume(1)?;

            let class = match base {
                2 => char_class::binary_digit(),
                4 => char_class::quaternary_digit(),
                8 => char_class::octal_digit(),
                _ => char_class::hex_digit(),
            };
            let digits = Self::take_digits(cursor, class)?;
            if digits.is_empty() {
                return Err(MissingBaseDigits {
                    span: Self::span_from(cursor, start),
                    base,
                }
                .into());
            }

            return Ok(Numeric {
                span: Self::span_from(cursor, start),
                value: digits_value(&digits, base),
            }
            .into());
        }

        let value = Self::parse_decimal_tail(cursor, &integer_digits)?;

        Ok(Numeric {
            span: Self::span_from(cursor, start),
            value,
        }
        .into())
    }

    /// Handles a sequence of characters that are enclosed in matching quote
    /// delimiters.
    ///
    /// The closing delimiter counts as escaped when the byte before it is a
    /// backslash that is not itself escaped by a further backslash. Escape
    /// sequences are kept verbatim in the lexeme.
    fn handle_string(cursor: &mut SourceCursor) -> Result<Self, TokenizeError> {
        let start = cursor.position();
        let delimiter = cursor.peek(0);

        cursor.consume(1)?;
        while cursor.peek(0) != delimiter
            || (cursor.peek(-1) == b'\\' && cursor.peek(-2) != b'\\')
        {
            cursor.consume(1)?;
        }
        cursor.consume(1)?;

        Ok(StringLiteral {
            span: Self::span_from(cursor, start),
        }
        .into())
    }

    /// Handles a `#` line comment or a `##` block comment.
    ///
    /// A block comment ends at the next `##` that is not escaped by a
    /// backslash one or two bytes before it.
    fn handle_comment(cursor: &mut SourceCursor) -> Result<Self, TokenizeError> {
        let start = cursor.position();

        cursor.consume(1)?;
        let kind = if cursor.peek(0) == b'#' {
            cursor.consume(2)?;
            while cursor.peek(0) != b'#'
                || cursor.peek(-1) != b'#'
                || cursor.peek(-2) == b'\\'
                || cursor.peek(-3) == b'\\'
            {
                cursor.consume(1)?;
            }
            cursor.consume(1)?;

            CommentKind::Block
        } else {
            while cursor.peek(0) != b'\n' {
                cursor.consume(1)?;
            }

            CommentKind::Line
        };

        Ok(Comment {
            span: Self::span_from(cursor, start),
            kind,
        }
        .into())
    }

    /// Lexes one token at the current position of the cursor.
    ///
    /// The current byte is classified in the fixed priority order whitespace,
    /// word, symbol, number, string, comment; the matching variant consumes
    /// at least one byte and reports its own positions. `tokens` is the
    /// sequence emitted so far; the numeric variant may retract its last
    /// element for the dot-prefixed fraction rule.
    ///
    /// # Errors
    /// - [`TokenizeError::EndOfSourceCode`] - The cursor is at the end of the
    ///   real content.
    /// - [`TokenizeError::UnexpectedEndOfInput`] - A token ran past the end
    ///   of the real content.
    /// - [`TokenizeError::InvalidBasePrefix`] /
    ///   [`TokenizeError::MissingBaseDigits`] - A malformed numeric literal.
    pub fn tokenize(
        cursor: &mut SourceCursor,
        tokens: &mut Vec<Self>,
    ) -> Result<Self, TokenizeError> {
        if cursor.at_end() {
            return Err(TokenizeError::EndOfSourceCode);
        }

        let byte = cursor.peek(0);

        if char_class::whitespace().contains(byte) {
            Self::handle_whitespace(cursor)
        } else if char_class::word_start().contains(byte) {
            Self::handle_word(cursor)
        } else if char_class::symbol_start().contains(byte) {
            Self::handle_symbol(cursor)
        } else if char_class::digit().contains(byte) {
            Self::handle_numeric(cursor, tokens)
        } else if char_class::string_delimiter().contains(byte) {
            Self::handle_string(cursor)
        } else if char_class::comment_start().contains(byte) {
            Self::handle_comment(cursor)
        } else {
            // A byte outside every class is a defect in the classification
            // tables, not a user input error.
            unreachable!("byte {byte:#04x} matches no character class")
        }
    }
}
