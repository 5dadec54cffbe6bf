//! The FST engine backing the weft grammar compiler.
//!
//! The compiler core treats this crate as its engine contract: a mutable
//! vector-backed transducer over a semiring of arc weights, a small algebra
//! of rational operations, symbol tables, and the keyed archive format that
//! compiled grammars are written to.
//!
//! # Architecture
//!
//! ```text
//! grammar evaluator
//!     │  (fixed API)
//!     ▼
//! ┌─────────────┐   semiring.rs   weights: tropical / log / log64
//! │  weft-fst   │   fst.rs        VectorFst, arcs, symbol attachments
//! │             │   algo/         concat, union, closure, compose, …
//! │             │   far.rs        name-keyed archives (.far)
//! └─────────────┘
//! ```
//!
//! Everything here is materialized: operations build new state vectors
//! eagerly rather than wrapping delayed views. Grammar-sized machines make
//! that the simpler and fast-enough choice.

pub mod algo;
pub mod far;
pub mod fst;
pub mod props;
pub mod semiring;
pub mod symtab;

pub use far::{Archive, FstIoError};
pub use fst::{Arc, Label, StateId, VectorFst, EPSILON, NO_LABEL};
pub use semiring::{Log64Weight, LogWeight, Semiring, TropicalWeight};
pub use symtab::SymbolTable;
