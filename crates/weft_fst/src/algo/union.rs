//! Union.

use crate::fst::{Arc, VectorFst};
use crate::semiring::Semiring;

/// Unions `src` into `dst` in place via a fresh super-start with epsilon
/// arcs into both operands' start states.
pub fn union<W: Semiring>(dst: &mut VectorFst<W>, src: &VectorFst<W>) {
    let old_start = dst.start();
    let offset = dst.num_states();
    for s in src.states() {
        let ns = dst.add_state();
        for arc in src.arcs(s) {
            dst.add_arc(ns, Arc::new(arc.ilabel, arc.olabel, arc.weight, arc.nextstate + offset));
        }
        let w = src.final_weight(s);
        if w != W::zero() {
            dst.set_final(ns, w);
        }
    }
    let super_start = dst.add_state();
    if let Some(s) = old_start {
        dst.add_arc(super_start, Arc::epsilon(W::one(), s));
    }
    if let Some(s) = src.start() {
        dst.add_arc(super_start, Arc::epsilon(W::one(), s + offset));
    }
    dst.set_start(super_start);
}
