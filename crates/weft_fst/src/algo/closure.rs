//! Kleene closures and bounded repetition.

use crate::algo::concat::concat;
use crate::fst::{Arc, VectorFst};
use crate::semiring::Semiring;

/// Kleene star: zero or more repetitions.
///
/// A fresh super-state becomes the start, is final with weight `One`, and
/// absorbs the old final weights as epsilon loops back into itself, so no
/// path is counted twice in non-idempotent semirings.
pub fn closure_star<W: Semiring>(fst: &mut VectorFst<W>) {
    let Some(old_start) = fst.start() else {
        // Star of the null machine accepts exactly the empty string.
        let s = fst.add_state();
        fst.set_start(s);
        fst.set_final(s, W::one());
        return;
    };
    let hub = fst.add_state();
    for s in 0..hub {
        let w = fst.final_weight(s);
        if w != W::zero() {
            fst.set_final(s, W::zero());
            fst.add_arc(s, Arc::epsilon(w, hub));
        }
    }
    fst.set_final(hub, W::one());
    fst.add_arc(hub, Arc::epsilon(W::one(), old_start));
    fst.set_start(hub);
}

/// Kleene plus: one or more repetitions (`m · m*`).
pub fn closure_plus<W: Semiring>(fst: &mut VectorFst<W>) {
    let mut star = fst.clone();
    closure_star(&mut star);
    concat(fst, &star);
}

/// Zero or one repetition.
pub fn closure_question<W: Semiring>(fst: &mut VectorFst<W>) {
    let Some(old_start) = fst.start() else {
        let s = fst.add_state();
        fst.set_start(s);
        fst.set_final(s, W::one());
        return;
    };
    let super_start = fst.add_state();
    fst.set_final(super_start, W::one());
    fst.add_arc(super_start, Arc::epsilon(W::one(), old_start));
    fst.set_start(super_start);
}

/// Bounded repetition: between `min` and `max` copies, inclusive.
/// `concat_range(m, 0, 0)` is the empty-string acceptor. Callers guarantee
/// `min <= max`; the parser rejects reversed bounds.
pub fn concat_range<W: Semiring>(fst: &mut VectorFst<W>, min: usize, max: usize) {
    let base = fst.clone();
    let mut optional = base.clone();
    closure_question(&mut optional);
    let mut result = VectorFst::epsilon_machine();
    result.copy_symbols_from(&base);
    for _ in 0..min {
        concat(&mut result, &base);
    }
    for _ in min..max {
        concat(&mut result, &optional);
    }
    *fst = result;
}
