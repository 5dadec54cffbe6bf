//! Cross product of two acceptors.

use crate::algo::concat::concat;
use crate::fst::{VectorFst, EPSILON};
use crate::semiring::Semiring;

/// Builds the transducer relating every string of `upper` to every string
/// of `lower`: the upper machine's outputs are erased to epsilon, the lower
/// machine's inputs likewise, and the two are concatenated. This is the
/// engine behind the rewrite operator `"cat" : "dog"`.
pub fn cross<W: Semiring>(upper: &VectorFst<W>, lower: &VectorFst<W>) -> VectorFst<W> {
    let mut up = upper.clone();
    for s in up.states() {
        for arc in up.arcs_mut(s) {
            arc.olabel = EPSILON;
        }
    }
    let mut down = lower.clone();
    for s in down.states() {
        for arc in down.arcs_mut(s) {
            arc.ilabel = EPSILON;
        }
    }
    concat(&mut up, &down);
    up.set_input_symbols(upper.input_symbols().cloned());
    up.set_output_symbols(lower.output_symbols().cloned());
    up
}
