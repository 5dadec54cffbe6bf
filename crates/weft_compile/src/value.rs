//! The runtime value union.
//!
//! Everything a grammar expression can evaluate to: an FST over the
//! compilation's arc type, a symbol table, a string, or an integer.
//! Cloning is explicit and cheap enough for grammar-sized payloads; the
//! evaluator copies values out of environments rather than sharing them.

use weft_fst::{Semiring, SymbolTable, VectorFst};

/// A value produced during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<W: Semiring> {
    Fst(VectorFst<W>),
    Symtab(SymbolTable),
    Str(String),
    Int(i64),
}

impl<W: Semiring> Value<W> {
    /// Kind name for type-error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Fst(_) => "FST",
            Value::Symtab(_) => "symbol table",
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
        }
    }

    pub fn is_fst(&self) -> bool {
        matches!(self, Value::Fst(_))
    }

    pub fn as_fst(&self) -> Option<&VectorFst<W>> {
        match self {
            Value::Fst(fst) => Some(fst),
            _ => None,
        }
    }

    pub fn into_fst(self) -> Option<VectorFst<W>> {
        match self {
            Value::Fst(fst) => Some(fst),
            _ => None,
        }
    }

    pub fn as_symtab(&self) -> Option<&SymbolTable> {
        match self {
            Value::Symtab(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_fst::TropicalWeight;

    #[test]
    fn kind_names() {
        let fst: Value<TropicalWeight> = Value::Fst(VectorFst::new());
        assert_eq!(fst.kind_name(), "FST");
        let s: Value<TropicalWeight> = Value::Str("x".into());
        assert_eq!(s.kind_name(), "string");
        assert_eq!(Value::<TropicalWeight>::Int(3).kind_name(), "integer");
    }

    #[test]
    fn accessors_match_variants() {
        let v: Value<TropicalWeight> = Value::Int(7);
        assert_eq!(v.as_int(), Some(7));
        assert!(v.as_str().is_none());
        assert!(!v.is_fst());
    }

    #[test]
    fn clone_is_deep_for_fsts() {
        let mut fst: VectorFst<TropicalWeight> = VectorFst::epsilon_machine();
        let v: Value<TropicalWeight> = Value::Fst(fst.clone());
        let copy = v.clone();
        fst.add_state();
        assert_eq!(v, copy);
    }
}
