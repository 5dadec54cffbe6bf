//! Recursive-descent parser for the grammar language.
//!
//! One method per production, mirroring the grammar:
//!
//! ```text
//! grammar      = import* (function | statement)*
//! statement    = rule | return
//! obj          = fst_with_weight
//! fst_with_weight = fst_with_output [ANGLE_STRING]
//! fst_with_output = union_fst [":" union_fst]
//! union_fst    = composition_fst ("|" union_fst)        right-assoc
//! composition_fst = difference_fst ("@" difference_fst)*  left-assoc
//! difference_fst  = concat_fst ("-" concat_fst)*          left-assoc
//! concat_fst   = repetition_fst concat_fst?               juxtaposition
//! repetition_fst = atomic_obj suffix?
//! ```
//!
//! Semantic checks (identifier validity, repetition bounds, one weight per
//! rule) record an error and keep parsing; structural failures recover at
//! the next `;` or `}`. The grammar is only returned when no errors were
//! recorded.

use weft_base::CompileError;

use crate::ast::{
    Expr, ExprKind, Function, Grammar, Identifier, Import, ParseMode, RepetitionKind, Return,
    Rule, Statement, StringLit,
};
use crate::lexer::Lexer;
use crate::token::{Keyword, Token, TokenKind};

/// Knobs the parser needs from the compiler configuration.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Mark every rule as exported (the `--always_export` flag).
    pub always_export: bool,
}

/// Parses a grammar source file. Returns the AST, or every diagnostic
/// recorded along the way.
pub fn parse_grammar(
    source: &str,
    file: &str,
    options: &ParseOptions,
) -> Result<Grammar, Vec<CompileError>> {
    let tokens = match Lexer::new(source, file).tokenize() {
        Ok(tokens) => tokens,
        Err(err) => return Err(vec![err]),
    };
    let mut parser = Parser { tokens, pos: 0, file, errors: Vec::new(), options };
    let grammar = parser.parse();
    if parser.errors.is_empty() {
        Ok(grammar)
    } else {
        Err(parser.errors)
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    file: &'a str,
    errors: Vec<CompileError>,
    options: &'a ParseOptions,
}

impl<'a> Parser<'a> {
    fn parse(&mut self) -> Grammar {
        let mut imports = Vec::new();
        while matches!(self.peek(), TokenKind::Keyword(Keyword::Import)) {
            match self.parse_import() {
                Some(import) => imports.push(import),
                None => {
                    self.error_here("Invalid import statement.");
                    self.sync_to_semicolon();
                }
            }
        }
        let mut functions = Vec::new();
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Keyword(Keyword::Func) => match self.parse_function() {
                    Some(function) => functions.push(std::sync::Arc::new(function)),
                    None => {
                        self.error_here("Invalid function declaration.");
                        self.sync_to_rbrace();
                    }
                },
                TokenKind::Keyword(Keyword::Import) => {
                    self.error_here(
                        "import statements must occur in the first block of the grammar.",
                    );
                    self.sync_to_semicolon();
                }
                _ => match self.parse_statement() {
                    Some(statement) => statements.push(statement),
                    None => {
                        self.error_here("Invalid statement (or previous statement).");
                        self.sync_to_semicolon();
                    }
                },
            }
        }
        Grammar { imports, functions, statements }
    }

    // import "path.grm" as alias;
    fn parse_import(&mut self) -> Option<Import> {
        let line = self.line();
        self.bump(); // import
        let path = match self.peek().clone() {
            TokenKind::QuotedString(path) => {
                self.bump();
                path
            }
            _ => return None,
        };
        if !matches!(self.peek(), TokenKind::Keyword(Keyword::As)) {
            return None;
        }
        self.bump();
        let alias = self.parse_identifier()?;
        if !self.eat_connector(';') {
            return None;
        }
        Some(Import { path, alias, line })
    }

    // func Name[a, b] { ... }
    fn parse_function(&mut self) -> Option<Function> {
        self.bump(); // func
        let name = self.parse_identifier()?;
        let line = name.line;
        if !self.eat_connector('[') {
            return None;
        }
        let mut params = Vec::new();
        if !matches!(self.peek(), TokenKind::Connector(']')) {
            loop {
                params.push(self.parse_identifier()?);
                if self.eat_connector(',') {
                    continue;
                }
                break;
            }
        }
        if !self.eat_connector(']') {
            return None;
        }
        if !self.eat_connector('{') {
            return None;
        }
        let mut body = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Connector('}') => break,
                TokenKind::Eof => return None,
                TokenKind::Keyword(Keyword::Import) => {
                    self.error_here(
                        "import statements must occur in the first block of the grammar.",
                    );
                    self.sync_to_semicolon();
                }
                _ => match self.parse_statement() {
                    Some(statement) => body.push(statement),
                    None => {
                        self.error_here("Invalid statement (or previous statement).");
                        self.sync_to_semicolon();
                        if matches!(self.peek(), TokenKind::Eof) {
                            return None;
                        }
                    }
                },
            }
        }
        self.bump(); // }
        Some(Function { name, params, body, line })
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.peek() {
            TokenKind::Keyword(Keyword::Return) => {
                let line = self.line();
                self.bump();
                let expr = self.parse_obj()?;
                if !self.eat_connector(';') {
                    return None;
                }
                Some(Statement::Return(Return { expr, line }))
            }
            TokenKind::Keyword(Keyword::Export) | TokenKind::Descriptor(_) => {
                let line = self.line();
                let exported = if matches!(self.peek(), TokenKind::Keyword(Keyword::Export)) {
                    self.bump();
                    true
                } else {
                    false
                };
                // A bare descriptor might still be a rule or garbage; the
                // '=' decides.
                let name = self.parse_identifier()?;
                if !self.eat_connector('=') {
                    return None;
                }
                let rhs = self.parse_obj()?;
                if !self.eat_connector(';') {
                    return None;
                }
                Some(Statement::Rule(Rule {
                    name,
                    rhs,
                    export: exported || self.options.always_export,
                    line,
                }))
            }
            _ => None,
        }
    }

    // obj = fst_with_output [weight]
    fn parse_obj(&mut self) -> Option<Expr> {
        let mut expr = self.parse_fst_with_output()?;
        if let TokenKind::AngleString(text) = self.peek().clone() {
            let line = self.line();
            self.bump();
            if expr.weight.is_some() {
                self.error(line, "Rules may have only one weight.");
            } else {
                expr.weight = Some(StringLit { text, line });
            }
        }
        Some(expr)
    }

    // fst_with_output = union_fst [":" union_fst]
    fn parse_fst_with_output(&mut self) -> Option<Expr> {
        let left = self.parse_union()?;
        if matches!(self.peek(), TokenKind::Connector(':')) {
            let line = self.line();
            self.bump();
            let right = self.parse_union()?;
            return Some(Expr::new(ExprKind::Rewrite(Box::new(left), Box::new(right)), line));
        }
        Some(left)
    }

    // union_fst = composition_fst ("|" union_fst)   (right-assoc)
    fn parse_union(&mut self) -> Option<Expr> {
        let left = self.parse_composition()?;
        if matches!(self.peek(), TokenKind::Connector('|')) {
            let line = self.line();
            self.bump();
            let rest = self.parse_union()?;
            return Some(Expr::new(ExprKind::Union(Box::new(left), Box::new(rest)), line));
        }
        Some(left)
    }

    // composition_fst = difference_fst ("@" difference_fst)*   (left-assoc)
    fn parse_composition(&mut self) -> Option<Expr> {
        let mut left = self.parse_difference()?;
        while matches!(self.peek(), TokenKind::Connector('@')) {
            let line = self.line();
            self.bump();
            let right = self.parse_difference()?;
            left = Expr::new(ExprKind::Composition(Box::new(left), Box::new(right)), line);
        }
        Some(left)
    }

    // difference_fst = concat_fst ("-" concat_fst)*   (left-assoc)
    fn parse_difference(&mut self) -> Option<Expr> {
        let mut left = self.parse_concat()?;
        while matches!(self.peek(), TokenKind::Connector('-')) {
            let line = self.line();
            self.bump();
            let right = self.parse_concat()?;
            left = Expr::new(ExprKind::Difference(Box::new(left), Box::new(right)), line);
        }
        Some(left)
    }

    // concat_fst = repetition_fst concat_fst?   (juxtaposition)
    fn parse_concat(&mut self) -> Option<Expr> {
        let left = self.parse_repetition()?;
        if self.starts_atomic() {
            let line = left.line;
            let rest = self.parse_concat()?;
            return Some(Expr::new(ExprKind::Concat(Box::new(left), Box::new(rest)), line));
        }
        Some(left)
    }

    // repetition_fst = atomic_obj suffix?
    fn parse_repetition(&mut self) -> Option<Expr> {
        let inner = self.parse_atomic()?;
        let line = self.line();
        let kind = match self.peek() {
            TokenKind::Connector('*') => {
                self.bump();
                RepetitionKind::Star
            }
            TokenKind::Connector('+') => {
                self.bump();
                RepetitionKind::Plus
            }
            TokenKind::Connector('?') => {
                self.bump();
                RepetitionKind::Question
            }
            TokenKind::Connector('{') => {
                self.bump();
                let min = self.parse_integer()?;
                let max = if self.eat_connector(',') { self.parse_integer()? } else { min };
                if !self.eat_connector('}') {
                    return None;
                }
                if min > max {
                    self.error(line, format!("repetition bounds reversed: {} > {}", min, max));
                }
                RepetitionKind::Range(min, max)
            }
            _ => return Some(inner),
        };
        Some(Expr::new(ExprKind::Repetition(Box::new(inner), kind), line))
    }

    fn parse_atomic(&mut self) -> Option<Expr> {
        match self.peek().clone() {
            TokenKind::QuotedString(text) => {
                let line = self.line();
                self.bump();
                Some(Expr::new(ExprKind::StringLit(StringLit { text, line }), line))
            }
            TokenKind::DoubleQuotedString(text) => {
                let line = self.line();
                self.bump();
                let text = StringLit { text, line };
                let (mode, symtab) = self.parse_string_mode_suffix()?;
                Some(Expr::new(ExprKind::StringFst { mode, text, symtab }, line))
            }
            TokenKind::Descriptor(_) => {
                let name = self.parse_identifier()?;
                let line = name.line;
                if matches!(self.peek(), TokenKind::Connector('[')) {
                    let args = self.parse_call_args()?;
                    Some(Expr::new(ExprKind::Call { name, args }, line))
                } else {
                    Some(Expr::new(ExprKind::Identifier(name), line))
                }
            }
            TokenKind::Connector('(') => {
                self.bump();
                let expr = self.parse_obj()?;
                if !self.eat_connector(')') {
                    return None;
                }
                Some(expr)
            }
            _ => None,
        }
    }

    // "." then byte | utf8 | identifier | funccall
    fn parse_string_mode_suffix(&mut self) -> Option<(ParseMode, Option<Box<Expr>>)> {
        if !matches!(self.peek(), TokenKind::Connector('.')) {
            return Some((ParseMode::Byte, None));
        }
        self.bump();
        match self.peek().clone() {
            TokenKind::Keyword(Keyword::Byte) => {
                self.bump();
                Some((ParseMode::Byte, None))
            }
            TokenKind::Keyword(Keyword::Utf8) => {
                self.bump();
                Some((ParseMode::Utf8, None))
            }
            TokenKind::Descriptor(_) => {
                let name = self.parse_identifier()?;
                let line = name.line;
                let expr = if matches!(self.peek(), TokenKind::Connector('[')) {
                    let args = self.parse_call_args()?;
                    Expr::new(ExprKind::Call { name, args }, line)
                } else {
                    Expr::new(ExprKind::Identifier(name), line)
                };
                Some((ParseMode::Symbols, Some(Box::new(expr))))
            }
            _ => None,
        }
    }

    // "[" args "]" where byte/utf8 keywords become string values
    fn parse_call_args(&mut self) -> Option<Vec<Expr>> {
        self.bump(); // [
        let mut args = Vec::new();
        if matches!(self.peek(), TokenKind::Connector(']')) {
            self.bump();
            return Some(args);
        }
        loop {
            match self.peek() {
                TokenKind::Keyword(Keyword::Byte) => {
                    let line = self.line();
                    self.bump();
                    args.push(Expr::new(
                        ExprKind::StringLit(StringLit { text: "byte".to_string(), line }),
                        line,
                    ));
                }
                TokenKind::Keyword(Keyword::Utf8) => {
                    let line = self.line();
                    self.bump();
                    args.push(Expr::new(
                        ExprKind::StringLit(StringLit { text: "utf8".to_string(), line }),
                        line,
                    ));
                }
                _ => args.push(self.parse_obj()?),
            }
            if self.eat_connector(',') {
                continue;
            }
            break;
        }
        if !self.eat_connector(']') {
            return None;
        }
        Some(args)
    }

    fn parse_identifier(&mut self) -> Option<Identifier> {
        let TokenKind::Descriptor(text) = self.peek().clone() else {
            return None;
        };
        let line = self.line();
        self.bump();
        let identifier = Identifier::new(text, line);
        if !identifier.is_valid() {
            self.error(line, format!("Illegal identifier: {}", identifier.full()));
        }
        Some(identifier)
    }

    fn parse_integer(&mut self) -> Option<i64> {
        let value = match self.peek() {
            TokenKind::Integer(value) => *value,
            _ => return None,
        };
        self.bump();
        Some(value)
    }

    // ----- token plumbing -----

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos.min(self.tokens.len() - 1)].line()
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn starts_atomic(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::QuotedString(_)
                | TokenKind::DoubleQuotedString(_)
                | TokenKind::Descriptor(_)
                | TokenKind::Connector('(')
        )
    }

    fn eat_connector(&mut self, c: char) -> bool {
        if matches!(self.peek(), TokenKind::Connector(x) if *x == c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn sync_to_semicolon(&mut self) {
        loop {
            match self.peek() {
                TokenKind::Eof | TokenKind::Connector('}') => return,
                TokenKind::Connector(';') => {
                    self.bump();
                    return;
                }
                _ => self.bump(),
            }
        }
    }

    fn sync_to_rbrace(&mut self) {
        loop {
            match self.peek() {
                TokenKind::Eof => return,
                TokenKind::Connector('}') => {
                    self.bump();
                    return;
                }
                _ => self.bump(),
            }
        }
    }

    fn error(&mut self, line: u32, message: impl Into<String>) {
        self.errors.push(CompileError::new(self.file, line, message));
    }

    fn error_here(&mut self, message: impl Into<String>) {
        let line = self.line();
        self.error(line, message);
    }
}
