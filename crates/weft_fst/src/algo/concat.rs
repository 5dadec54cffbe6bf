//! Concatenation.

use crate::fst::{Arc, VectorFst};
use crate::semiring::Semiring;

/// Concatenates `src` onto `dst` in place: the result relates `x·u → y·v`
/// whenever `dst` relates `x → y` and `src` relates `u → v`. Final weights
/// of `dst` become epsilon bridges into `src`'s start.
pub fn concat<W: Semiring>(dst: &mut VectorFst<W>, src: &VectorFst<W>) {
    let offset = dst.num_states();
    for s in src.states() {
        let ns = dst.add_state();
        for arc in src.arcs(s) {
            dst.add_arc(ns, Arc::new(arc.ilabel, arc.olabel, arc.weight, arc.nextstate + offset));
        }
    }
    let Some(src_start) = src.start() else {
        // Concatenating the null machine: nothing is accepted any more.
        for s in 0..offset {
            dst.set_final(s, W::zero());
        }
        return;
    };
    for s in 0..offset {
        let w = dst.final_weight(s);
        if w != W::zero() {
            dst.set_final(s, W::zero());
            dst.add_arc(s, Arc::epsilon(w, src_start + offset));
        }
    }
    for s in src.states() {
        let w = src.final_weight(s);
        if w != W::zero() {
            dst.set_final(offset + s, w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fst::VectorFst;
    use crate::semiring::TropicalWeight;
    use crate::testing::{accepts, acceptor};

    #[test]
    fn concat_joins_languages() {
        let mut ab = acceptor("ab");
        let cd = acceptor("cd");
        concat(&mut ab, &cd);
        assert!(accepts(&ab, "abcd"));
        assert!(!accepts(&ab, "ab"));
        assert!(!accepts(&ab, "cd"));
    }

    #[test]
    fn concat_with_epsilon_machine_is_identity_language() {
        let mut a = acceptor("a");
        let eps = VectorFst::epsilon_machine();
        concat(&mut a, &eps);
        assert!(accepts(&a, "a"));
        assert!(!accepts(&a, ""));
    }

    #[test]
    fn concat_with_null_machine_accepts_nothing() {
        let mut a = acceptor("a");
        let null: VectorFst<TropicalWeight> = VectorFst::new();
        concat(&mut a, &null);
        assert!(!accepts(&a, "a"));
        assert!(!accepts(&a, ""));
    }
}
