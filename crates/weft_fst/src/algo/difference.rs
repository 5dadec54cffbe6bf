//! Set difference against a deterministic acceptor.

use std::collections::{HashMap, VecDeque};

use crate::algo::connect::connect;
use crate::fst::{Arc, StateId, VectorFst, EPSILON};
use crate::semiring::Semiring;

// The subtrahend side of the product: either a live state of `b` or the
// dead state of its implicit completion.
type RightState = Option<StateId>;

/// Subtracts the language of `b` from the output side of `a`.
///
/// `b` must be an epsilon-free, input-deterministic, unweighted acceptor
/// (the primitive wrapper optimizes it into that shape first). The product
/// runs `a` against the complement of `b`, completed on the fly with a dead
/// state: a pair is final when `a` is final and `b` is absent or
/// non-final there. Because the result is a sublanguage of `a`, restricting
/// the complement to labels `a` actually uses is exact.
pub fn difference<W: Semiring>(a: &VectorFst<W>, b: &VectorFst<W>) -> VectorFst<W> {
    let mut out = VectorFst::new();
    out.copy_symbols_from(a);
    let Some(sa) = a.start() else {
        return out;
    };

    let mut ids: HashMap<(StateId, RightState), StateId> = HashMap::new();
    let mut queue: VecDeque<(StateId, RightState)> = VecDeque::new();

    let start_key = (sa, b.start());
    let start = state_of(start_key, a, b, &mut ids, &mut out, &mut queue);
    out.set_start(start);

    while let Some((s1, s2)) = queue.pop_front() {
        let from = ids[&(s1, s2)];
        for arc in a.arcs(s1) {
            let next_right = if arc.olabel == EPSILON {
                s2
            } else {
                s2.and_then(|r| {
                    b.arcs(r)
                        .iter()
                        .find(|barc| barc.ilabel == arc.olabel)
                        .map(|barc| barc.nextstate)
                })
            };
            let to = state_of((arc.nextstate, next_right), a, b, &mut ids, &mut out, &mut queue);
            out.add_arc(from, Arc::new(arc.ilabel, arc.olabel, arc.weight, to));
        }
    }

    connect(&mut out);
    out
}

fn state_of<W: Semiring>(
    key: (StateId, RightState),
    a: &VectorFst<W>,
    b: &VectorFst<W>,
    ids: &mut HashMap<(StateId, RightState), StateId>,
    out: &mut VectorFst<W>,
    queue: &mut VecDeque<(StateId, RightState)>,
) -> StateId {
    *ids.entry(key).or_insert_with(|| {
        let s = out.add_state();
        let right_accepts = key.1.map(|r| b.is_final(r)).unwrap_or(false);
        if !right_accepts {
            out.set_final(s, a.final_weight(key.0));
        }
        queue.push_back(key);
        s
    })
}
