//! Token types for the weft grammar language.
//!
//! The lexer produces these; the parser consumes them. The language is
//! small: identifiers (possibly dotted), three string flavors, numbers,
//! single-character connectors, and seven keywords.
//!
//! | Category | Examples | Used for |
//! |----------|----------|----------|
//! | **Descriptor** | `vowel`, `lib.Plural` | rule and function names |
//! | **QuotedString** | `'path.grm'` | string values (paths, symbols) |
//! | **DoubleQuotedString** | `"cat"` | string FSTs |
//! | **AngleString** | `<1.5>` | arc weights |
//! | **Connector** | `( ) [ ] { } , ; : = @ \| * + ? . / $ _ -` | operators |
//! | **Keyword** | `export func return import as byte utf8` | structure |

use weft_base::Span;

/// Reserved words of the grammar language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Export,
    Func,
    Return,
    Import,
    As,
    Byte,
    Utf8,
}

impl Keyword {
    /// Keyword for a lexeme, if it is one.
    pub fn lookup(text: &str) -> Option<Keyword> {
        match text {
            "export" => Some(Keyword::Export),
            "func" => Some(Keyword::Func),
            "return" => Some(Keyword::Return),
            "import" => Some(Keyword::Import),
            "as" => Some(Keyword::As),
            "byte" => Some(Keyword::Byte),
            "utf8" => Some(Keyword::Utf8),
            _ => None,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Keyword::Export => "export",
            Keyword::Func => "func",
            Keyword::Return => "return",
            Keyword::Import => "import",
            Keyword::As => "as",
            Keyword::Byte => "byte",
            Keyword::Utf8 => "utf8",
        }
    }
}

/// The characters the lexer accepts as single-character connectors.
pub const CONNECTORS: &[char] = &[
    '(', ')', '[', ']', '{', '}', ',', ';', ':', '=', '@', '|', '*', '+', '?', '.', '/', '$',
    '_', '-',
];

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Bare identifier, possibly dotted: `vowel`, `lib.Plural`.
    Descriptor(String),
    /// Single-quoted string: a string *value*.
    QuotedString(String),
    /// Double-quoted string: compiles to an FST.
    DoubleQuotedString(String),
    /// Angle-bracketed weight text.
    AngleString(String),
    Integer(i64),
    Float(f64),
    /// One of [`CONNECTORS`].
    Connector(char),
    Keyword(Keyword),
    /// End of source.
    Eof,
}

impl TokenKind {
    /// Short display form for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Descriptor(text) => format!("identifier '{}'", text),
            TokenKind::QuotedString(_) => "quoted string".to_string(),
            TokenKind::DoubleQuotedString(_) => "double-quoted string".to_string(),
            TokenKind::AngleString(_) => "weight".to_string(),
            TokenKind::Integer(value) => format!("integer {}", value),
            TokenKind::Float(value) => format!("float {}", value),
            TokenKind::Connector(c) => format!("'{}'", c),
            TokenKind::Keyword(k) => format!("keyword '{}'", k.text()),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}

/// A lexeme with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }
}
