//! The weft grammar language front-end.
//!
//! This crate turns grammar source text into an AST and provides the two
//! read-only passes the compiler runs over it:
//!
//! ```text
//! source bytes
//!     │  lexer.rs      tokens with line tracking
//!     ▼
//! ┌──────────┐
//! │  parser  │  parser.rs  recursive descent, recovery at ; and }
//! └──────────┘
//!     │  ast.rs        Grammar / Rule / Expr …
//!     ├── printer.rs   indented AST dump (--emit_ast_only)
//!     └── counter.rs   reference counts for dead-value elimination
//! ```
//!
//! Evaluation lives in `weft-compile`; nothing here touches FSTs.

pub mod ast;
pub mod counter;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;

pub use ast::{
    Expr, ExprKind, Function, Grammar, Identifier, Import, ParseMode, RepetitionKind, Return,
    Rule, Statement, StringLit,
};
pub use counter::IdentifierCounter;
pub use lexer::Lexer;
pub use parser::{parse_grammar, ParseOptions};
pub use printer::print_ast;
pub use token::{Keyword, Token, TokenKind};
