//! Composition.

use std::collections::{HashMap, VecDeque};

use crate::algo::connect::connect;
use crate::fst::{Arc, StateId, VectorFst, EPSILON};
use crate::semiring::Semiring;

// Epsilon-sequencing filter states. The filter admits exactly one
// interleaving of output-epsilon moves on the left with input-epsilon moves
// on the right (all right moves before left moves between matches), so
// epsilon paths are not counted twice in non-idempotent semirings.
const FILTER_ANY: u8 = 0;
const FILTER_LEFT_EPS: u8 = 1;
const FILTER_RIGHT_EPS: u8 = 2;

/// Composes two transducers: the result relates `x → z` with weight
/// `⊕ over y of a(x→y) ⊗ b(y→z)`. Input symbols come from `a`, output
/// symbols from `b`.
pub fn compose<W: Semiring>(a: &VectorFst<W>, b: &VectorFst<W>) -> VectorFst<W> {
    let mut out = VectorFst::new();
    out.set_input_symbols(a.input_symbols().cloned());
    out.set_output_symbols(b.output_symbols().cloned());
    let (Some(sa), Some(sb)) = (a.start(), b.start()) else {
        return out;
    };

    let mut ids: HashMap<(StateId, StateId, u8), StateId> = HashMap::new();
    let mut queue: VecDeque<(StateId, StateId, u8)> = VecDeque::new();

    let start = state_of((sa, sb, FILTER_ANY), a, b, &mut ids, &mut out, &mut queue);
    out.set_start(start);

    while let Some((s1, s2, filter)) = queue.pop_front() {
        let from = ids[&(s1, s2, filter)];
        for arc1 in a.arcs(s1) {
            if arc1.olabel == EPSILON {
                // Left moves alone, emitting its input side.
                if filter != FILTER_RIGHT_EPS {
                    let key = (arc1.nextstate, s2, FILTER_LEFT_EPS);
                    let to = state_of(key, a, b, &mut ids, &mut out, &mut queue);
                    out.add_arc(from, Arc::new(arc1.ilabel, EPSILON, arc1.weight, to));
                }
            } else {
                for arc2 in b.arcs(s2) {
                    if arc2.ilabel == arc1.olabel {
                        let key = (arc1.nextstate, arc2.nextstate, FILTER_ANY);
                        let to = state_of(key, a, b, &mut ids, &mut out, &mut queue);
                        out.add_arc(
                            from,
                            Arc::new(arc1.ilabel, arc2.olabel, arc1.weight.times(arc2.weight), to),
                        );
                    }
                }
            }
        }
        if filter != FILTER_LEFT_EPS {
            // Right moves alone, emitting its output side.
            for arc2 in b.arcs(s2) {
                if arc2.ilabel == EPSILON {
                    let key = (s1, arc2.nextstate, FILTER_RIGHT_EPS);
                    let to = state_of(key, a, b, &mut ids, &mut out, &mut queue);
                    out.add_arc(from, Arc::new(EPSILON, arc2.olabel, arc2.weight, to));
                }
            }
        }
    }

    connect(&mut out);
    out
}

fn state_of<W: Semiring>(
    key: (StateId, StateId, u8),
    a: &VectorFst<W>,
    b: &VectorFst<W>,
    ids: &mut HashMap<(StateId, StateId, u8), StateId>,
    out: &mut VectorFst<W>,
    queue: &mut VecDeque<(StateId, StateId, u8)>,
) -> StateId {
    *ids.entry(key).or_insert_with(|| {
        let s = out.add_state();
        out.set_final(s, a.final_weight(key.0).times(b.final_weight(key.1)));
        queue.push_back(key);
        s
    })
}
