//! The grammar AST.
//!
//! A tagged tree of owned nodes, each carrying its 1-based source line.
//! Function nodes sit behind `Arc` because namespaces hold onto them for as
//! long as any importing evaluator is alive. The tree is read-only once the
//! parser hands it over; evaluation state lives in the evaluator.

use std::sync::Arc;

/// A parsed grammar file: imports, then functions and statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub imports: Vec<Import>,
    pub functions: Vec<Arc<Function>>,
    pub statements: Vec<Statement>,
}

/// `import "path.grm" as alias;`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
    pub alias: Identifier,
    pub line: u32,
}

/// `func Name[args] { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Identifier,
    pub params: Vec<Identifier>,
    pub body: Vec<Statement>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Rule(Rule),
    Return(Return),
}

impl Statement {
    pub fn line(&self) -> u32 {
        match self {
            Statement::Rule(rule) => rule.line,
            Statement::Return(ret) => ret.line,
        }
    }
}

/// `[export] name = expr;`
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: Identifier,
    pub rhs: Expr,
    pub export: bool,
    pub line: u32,
}

/// `return expr;`
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub expr: Expr,
    pub line: u32,
}

/// A possibly-dotted name: `foo` or `lib.utils.Plural`.
///
/// The parts before the last are namespace qualifiers; the last part is the
/// identifier proper. Validity (checked at parse time): every component is
/// non-empty, uses only `[A-Za-z0-9_]`, and is neither all-numeric nor
/// all-underscore.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    full: String,
    parts: Vec<String>,
    pub line: u32,
}

impl Identifier {
    pub fn new(full: impl Into<String>, line: u32) -> Self {
        let full = full.into();
        let parts = full.split('.').map(str::to_string).collect();
        Self { full, parts, line }
    }

    /// The identifier as written in the source.
    pub fn full(&self) -> &str {
        &self.full
    }

    /// The final component: `baz` of `foo.bar.baz`.
    pub fn leaf(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or("")
    }

    /// The namespace qualifiers: `[foo, bar]` of `foo.bar.baz`.
    pub fn namespaces(&self) -> &[String] {
        &self.parts[..self.parts.len().saturating_sub(1)]
    }

    pub fn has_namespaces(&self) -> bool {
        self.parts.len() > 1
    }

    pub fn is_valid(&self) -> bool {
        self.parts.iter().all(|part| {
            !part.is_empty()
                && part.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
                && !part.bytes().all(|b| b.is_ascii_digit())
                && !part.bytes().all(|b| b == b'_')
        })
    }
}

/// A string literal with its source line.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLit {
    pub text: String,
    pub line: u32,
}

/// How a double-quoted literal is segmented into labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// One label per byte.
    Byte,
    /// One label per Unicode code point.
    Utf8,
    /// Whitespace-separated symbols looked up in an attached table.
    Symbols,
}

impl ParseMode {
    /// Integer tag passed to the `StringFst` primitive.
    pub fn tag(self) -> i64 {
        match self {
            ParseMode::Byte => 0,
            ParseMode::Utf8 => 1,
            ParseMode::Symbols => 2,
        }
    }
}

/// Repetition suffixes: `* + ? {n} {m,n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepetitionKind {
    Star,
    Plus,
    Question,
    Range(i64, i64),
}

impl RepetitionKind {
    /// Integer tag passed to the `Closure` primitive.
    pub fn tag(self) -> i64 {
        match self {
            RepetitionKind::Star => 0,
            RepetitionKind::Plus => 1,
            RepetitionKind::Question => 2,
            RepetitionKind::Range(_, _) => 3,
        }
    }
}

/// An expression node with an optional attached weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Angle-string weight text, at most one per expression.
    pub weight: Option<StringLit>,
    pub line: u32,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Self { kind, weight: None, line }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Juxtaposition.
    Concat(Box<Expr>, Box<Expr>),
    /// `|`
    Union(Box<Expr>, Box<Expr>),
    /// `-`
    Difference(Box<Expr>, Box<Expr>),
    /// `@`
    Composition(Box<Expr>, Box<Expr>),
    /// `:` (cross product)
    Rewrite(Box<Expr>, Box<Expr>),
    /// `* + ? {m,n}`
    Repetition(Box<Expr>, RepetitionKind),
    /// Reference to a rule (possibly namespace-qualified).
    Identifier(Identifier),
    /// Double-quoted literal, with a symbol-table sub-expression in
    /// `Symbols` mode.
    StringFst {
        mode: ParseMode,
        text: StringLit,
        symtab: Option<Box<Expr>>,
    },
    /// Single-quoted literal: a string value.
    StringLit(StringLit),
    /// `Name[args]`: user function or built-in.
    Call { name: Identifier, args: Vec<Expr> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_splits_namespaces() {
        let id = Identifier::new("foo.bar.baz", 1);
        assert_eq!(id.leaf(), "baz");
        assert_eq!(id.namespaces(), &["foo".to_string(), "bar".to_string()][..]);
        assert!(id.has_namespaces());
        assert!(id.is_valid());
    }

    #[test]
    fn single_component_identifier_has_no_namespaces() {
        let id = Identifier::new("vowel", 1);
        assert_eq!(id.leaf(), "vowel");
        assert!(!id.has_namespaces());
    }

    #[test]
    fn validity_rejects_bad_components() {
        assert!(!Identifier::new("", 1).is_valid());
        assert!(!Identifier::new("a..b", 1).is_valid());
        assert!(!Identifier::new("123", 1).is_valid());
        assert!(!Identifier::new("a.42", 1).is_valid());
        assert!(!Identifier::new("___", 1).is_valid());
        assert!(Identifier::new("_x.y2", 1).is_valid());
        assert!(Identifier::new("x42", 1).is_valid());
    }
}
