//! Grammar evaluation: from a parsed AST to an archive of named FSTs.
//!
//! The pipeline this crate implements:
//!
//! ```text
//! Grammar AST (weft-language)
//!     │
//!     ▼
//! ┌───────────┐  namespace.rs    per-file scopes, alias children, frames
//! │ evaluator │  labels.rs       process-wide generated-label interner
//! │           │  registry.rs     built-in primitives per arc type
//! └───────────┘  stringcompile.rs  "c[token]s" → labels
//!     │
//!     ▼
//! exported FSTs ──▶ manager.rs ──▶ .far archive
//! ```
//!
//! Process-wide state (the interner, the canonical byte/utf8 symbol tables,
//! the per-weight registries) is initialized lazily and never reset between
//! compilations; tests call [`labels::reset_for_tests`] explicitly.

pub mod compiler;
pub mod config;
pub mod evaluator;
pub mod labels;
pub mod manager;
pub mod namespace;
pub mod registry;
pub mod resource_map;
pub mod stringcompile;
pub mod symbols;
pub mod value;

mod functions;

pub use compiler::{compile_grammar_to_far, GrammarCompiler};
pub use config::CompilerConfig;
pub use manager::GrammarManager;
pub use registry::{ArcType, FunctionRegistry};
pub use value::Value;

/// Archive entry that carries the generated-label symbol table. The leading
/// `*` keeps it out of the grammar's identifier space and sorts it ahead of
/// every legal rule name.
pub const STRING_FST_SYMTAB_FST: &str = "*StringFstSymbolTable";
