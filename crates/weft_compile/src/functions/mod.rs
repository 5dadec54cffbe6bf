//! Built-in primitives.
//!
//! Each submodule registers a family of built-ins; [`build_registry`]
//! assembles the full table for one arc type. Assertions need the path
//! property and are only registered for arc types that have it.

mod assertions;
mod binary;
mod io;
mod replace;
mod strings;
mod unary;

use weft_fst::{Arc as FstArc, Semiring, VectorFst};

use crate::registry::FunctionRegistry;
use crate::symbols::compat_symbols;

/// Builds the registry for one arc type.
pub fn build_registry<W: Semiring>() -> FunctionRegistry<W> {
    let mut registry = FunctionRegistry::new();
    binary::register(&mut registry);
    unary::register(&mut registry);
    strings::register(&mut registry);
    io::register(&mut registry);
    replace::register(&mut registry);
    if W::HAS_PATH {
        assertions::register(&mut registry);
    }
    registry
}

/// Concatenates a single-state machine carrying `weight` as its final
/// weight, the standard way a weight attaches to an expression result.
/// Symbol tables carry over so compatibility checks keep passing.
pub(crate) fn attach_final_weight<W: Semiring>(
    mut fst: VectorFst<W>,
    weight: W,
    save_symbols: bool,
) -> VectorFst<W> {
    let mut tail: VectorFst<W> = VectorFst::new();
    let s = tail.add_state();
    tail.set_start(s);
    tail.set_final(s, weight);
    if save_symbols {
        tail.copy_symbols_from(&fst);
    }
    weft_fst::algo::concat(&mut fst, &tail);
    fst
}

/// `--save_symbols` check for operations aligning both tapes (concat,
/// union, difference).
pub(crate) fn check_same_tapes<W: Semiring>(
    name: &str,
    left: &VectorFst<W>,
    right: &VectorFst<W>,
    save_symbols: bool,
) -> Result<(), String> {
    if !save_symbols {
        return Ok(());
    }
    if !compat_symbols(left.input_symbols(), right.input_symbols()) {
        return Err(format!(
            "{}: input symbol table of 1st argument does not match input symbol table of 2nd argument",
            name
        ));
    }
    if !compat_symbols(left.output_symbols(), right.output_symbols()) {
        return Err(format!(
            "{}: output symbol table of 1st argument does not match output symbol table of 2nd argument",
            name
        ));
    }
    Ok(())
}

/// `--save_symbols` check for composition-shaped operations: the left
/// output tape must match the right input tape.
pub(crate) fn check_inner_tapes<W: Semiring>(
    name: &str,
    left: &VectorFst<W>,
    right: &VectorFst<W>,
    save_symbols: bool,
) -> Result<(), String> {
    if !save_symbols {
        return Ok(());
    }
    if !compat_symbols(left.output_symbols(), right.input_symbols()) {
        return Err(format!(
            "{}: output symbol table of 1st argument does not match input symbol table of 2nd argument",
            name
        ));
    }
    Ok(())
}

/// Remaps every arc label of `fst` through `lookup`, used after merging an
/// imported archive's label table.
pub(crate) fn remap_arc_labels<W: Semiring>(
    fst: &mut VectorFst<W>,
    lookup: impl Fn(i64) -> Option<i64>,
) {
    for s in fst.states() {
        for arc in fst.arcs_mut(s) {
            let FstArc { ilabel, olabel, .. } = *arc;
            if let Some(new) = lookup(ilabel) {
                arc.ilabel = new;
            }
            if let Some(new) = lookup(olabel) {
                arc.olabel = new;
            }
        }
    }
}
